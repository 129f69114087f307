//! The panel controller: one session's state plus routing of UI events to the
//! planner, builder, tutor and environment check.
//!
//! Events are handled one at a time; `handle` takes `&mut self`, so a second
//! event cannot observe a half-updated session.

use std::fmt::Write as _;
use tokio::sync::mpsc::UnboundedSender;
use uuid::Uuid;

use crate::env::{self, EnvStatus, OsFamily, Tool};
use crate::exec::{Builder, StepOutcome};
use crate::plan::Planner;
use crate::prompt;
use crate::provider::DynProvider;
use crate::tutor::Tutor;
use crate::wire::{ChatMessage, PanelMessage, Plan, PlanStatus, Sender, Step, StepStatus, UiMessage};

pub const IDEA_QUESTION: &str = "What would you like to build? Describe your idea in a sentence or two.";
pub const GREETING: &str =
    "Hi! I'm BabyCoding. Start a new project and I'll plan it step by step, or just ask me anything.";

/// Everything that belongs to one conversation.
#[derive(Debug)]
pub struct Session {
    pub id: Uuid,
    /// Append-only, sent whole on every chat turn.
    pub chat_history: Vec<ChatMessage>,
    pub current_plan: Option<Plan>,
    pub planning_mode: bool,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            chat_history: vec![ChatMessage::system(prompt::system_prompt_chat())],
            current_plan: None,
            planning_mode: false,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

pub struct PanelController {
    session: Session,
    llm: DynProvider,
    planner: Planner,
    builder: Builder,
    tutor: Tutor,
    outbox: UnboundedSender<PanelMessage>,
}

impl PanelController {
    pub fn new(session: Session, llm: DynProvider, builder: Builder, outbox: UnboundedSender<PanelMessage>) -> Self {
        Self {
            session,
            planner: Planner::new(llm.clone()),
            tutor: Tutor::new(llm.clone()),
            llm,
            builder,
            outbox,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub async fn handle(&mut self, msg: UiMessage) {
        tracing::debug!(?msg, "ui event");
        match msg {
            UiMessage::StartProject => self.start_project(),
            UiMessage::Setup => self.setup().await,
            UiMessage::Chat { message } if self.session.planning_mode => self.plan_idea(&message).await,
            UiMessage::Chat { message } => self.chat(message).await,
            UiMessage::ExecuteStep { step_id } => self.execute_step(&step_id).await,
            UiMessage::VerifyStep { step_id } => self.verify_step(&step_id).await,
            UiMessage::WebviewReady => self.webview_ready(),
        }
    }

    fn post(&self, msg: PanelMessage) {
        if self.outbox.send(msg).is_err() {
            tracing::debug!("ui went away; dropping panel message");
        }
    }

    fn say(&self, sender: Sender, message: impl Into<String>) {
        self.post(PanelMessage::ChatResponse { message: message.into(), sender });
    }

    fn start_project(&mut self) {
        if let Some(old) = self.session.current_plan.take() {
            tracing::info!(plan_id = %old.id, "discarding current plan for a new project");
        }
        self.session.planning_mode = true;
        self.post(PanelMessage::UserQuestion { message: IDEA_QUESTION.to_string() });
    }

    async fn plan_idea(&mut self, idea: &str) {
        self.session.planning_mode = false;
        let planned = self.planner.create_plan(idea).await;
        match planned {
            Ok(mut plan) => {
                plan.status = PlanStatus::Active;
                let summary = plan_summary(&plan);
                self.post(PanelMessage::Plan { plan: plan.clone() });
                self.session.current_plan = Some(plan);
                self.say(Sender::Planner, summary);
            }
            Err(e) => self.say(Sender::Planner, e.to_string()),
        }
    }

    async fn chat(&mut self, message: String) {
        self.session.chat_history.push(ChatMessage::user(message));
        let reply = self.llm.generate(&self.session.chat_history).await;
        match reply {
            Ok(reply) => {
                self.session.chat_history.push(ChatMessage::assistant(reply.clone()));
                self.say(Sender::Assistant, reply);
            }
            Err(e) => {
                tracing::warn!(error = %format!("{e:#}"), "chat turn failed");
                self.say(Sender::Assistant, format!("Error: {e:#}"));
            }
        }
    }

    fn lookup(&self, step_id: &str) -> Option<Step> {
        let step = self.session.current_plan.as_ref().and_then(|p| p.step(step_id)).cloned();
        if step.is_none() {
            tracing::debug!(step_id, "no such step in the current plan; ignoring");
        }
        step
    }

    fn update_step(&mut self, step_id: &str, f: impl FnOnce(&mut Step)) {
        if let Some(step) = self.session.current_plan.as_mut().and_then(|p| p.step_mut(step_id)) {
            f(step);
        }
    }

    async fn execute_step(&mut self, step_id: &str) {
        let Some(step) = self.lookup(step_id) else { return };
        self.update_step(step_id, |s| s.status = StepStatus::Running);

        // Dispatch only; the step stays `running` until it is verified.
        let dispatched = self.builder.execute_step(&step).await;
        let narration = match dispatched {
            Ok(StepOutcome::Dispatched) => self.tutor.explain_success(&step).await,
            Err(e) => {
                let error = e.to_string();
                self.update_step(step_id, |s| {
                    s.status = StepStatus::Failed;
                    s.error = Some(error.clone());
                });
                self.tutor.explain_error(&step, &error).await
            }
        };
        self.say(Sender::Tutor, narration);
        self.refresh_plan();
    }

    async fn verify_step(&mut self, step_id: &str) {
        let Some(step) = self.lookup(step_id) else { return };
        let v = self.builder.verify_step(&step).await;

        if v.success {
            self.update_step(step_id, |s| {
                s.status = StepStatus::Completed;
                s.output = Some(v.output.clone());
                s.error = None;
            });
            self.say(Sender::Builder, format!("✅ {} is verified.\n{}", step.title, v.output.trim_end()));
        } else {
            self.update_step(step_id, |s| {
                s.status = StepStatus::Failed;
                s.output = None;
                s.error = Some(v.output.clone());
            });
            let narration = self.tutor.explain_error(&step, &v.output).await;
            self.say(Sender::Tutor, narration);
        }
        self.refresh_plan();
    }

    /// Recompute the plan status from its steps and push the plan to the UI.
    fn refresh_plan(&mut self) {
        let Some(plan) = self.session.current_plan.as_mut() else { return };
        if plan.all_steps_completed() {
            if plan.status != PlanStatus::Completed {
                plan.status = PlanStatus::Completed;
                tracing::info!(plan_id = %plan.id, "plan completed");
            }
        } else if plan.status == PlanStatus::Completed {
            plan.status = PlanStatus::Active;
            tracing::info!(plan_id = %plan.id, "plan reopened");
        }
        let plan = plan.clone();
        self.post(PanelMessage::Plan { plan });
    }

    async fn setup(&mut self) {
        let status = env::check_environment().await;
        self.say(Sender::System, env_report(&status, OsFamily::current()));
    }

    fn webview_ready(&self) {
        self.say(Sender::System, GREETING);
        if let Some(plan) = &self.session.current_plan {
            self.post(PanelMessage::Plan { plan: plan.clone() });
        }
    }
}

fn plan_summary(plan: &Plan) -> String {
    let mut out = format!("Here is your plan: {}\n", plan.title);
    if !plan.goal.is_empty() {
        let _ = writeln!(out, "Goal: {}", plan.goal);
    }
    for (i, s) in plan.steps.iter().enumerate() {
        let _ = writeln!(out, "{}. {} ({})", i + 1, s.title, s.id);
    }
    out.push_str("Run a step when you're ready.");
    out
}

pub fn env_report(status: &EnvStatus, os: OsFamily) -> String {
    let mut out = String::from("Your environment:\n");
    for tool in Tool::ALL {
        let t = status.get(tool);
        match (&t.version, t.present) {
            (Some(v), true) => { let _ = writeln!(out, "  ✔ {}: {}", tool.name(), v); }
            _ => { let _ = writeln!(out, "  ✘ {}: not found", tool.name()); }
        }
    }
    let missing = status.missing();
    if missing.is_empty() {
        out.push_str("Everything you need is installed.");
    } else {
        out.push_str("To install what's missing, run:\n");
        for cmd in env::install_commands(&missing, os) {
            let _ = writeln!(out, "  {}", cmd);
        }
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::ToolStatus;

    #[test]
    fn report_lists_install_commands_for_missing_tools() {
        let status = EnvStatus {
            git: ToolStatus { present: true, version: Some("git version 2.43.0".into()) },
            node: ToolStatus::default(),
            python: ToolStatus { present: true, version: Some("Python 3.12.1".into()) },
        };
        let r = env_report(&status, OsFamily::Linux);
        assert!(r.contains("✔ git: git version 2.43.0"));
        assert!(r.contains("✘ node: not found"));
        assert!(r.ends_with("sudo apt-get install -y nodejs npm"));
    }

    #[test]
    fn report_for_complete_environment() {
        let present = |v: &str| ToolStatus { present: true, version: Some(v.into()) };
        let status = EnvStatus { git: present("g"), node: present("v20"), python: present("p") };
        assert!(env_report(&status, OsFamily::MacOs).ends_with("Everything you need is installed."));
    }

    #[test]
    fn new_session_starts_with_chat_persona() {
        let s = Session::new();
        assert_eq!(s.chat_history.len(), 1);
        assert!(!s.planning_mode);
        assert!(s.current_plan.is_none());
    }
}
