use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// ========================================
/// Chat messages sent to the language model
/// ========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// ========================================
/// Plan model (the model's JSON output contract)
/// ========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanStatus {
    #[default]
    Planning,
    Active,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    #[default]
    Pending,
    Running,
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub name: String,
    pub definition: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub command: String,
    /// Command that confirms `command` worked. Empty means nothing to verify.
    #[serde(default)]
    pub verification: String,
    #[serde(default)]
    pub terms: Vec<Term>,
    #[serde(default)]
    pub status: StepStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    #[serde(default = "fresh_plan_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub goal: String,
    pub steps: Vec<Step>,
    #[serde(default)]
    pub status: PlanStatus,
}

fn fresh_plan_id() -> String {
    Uuid::new_v4().to_string()
}

impl Plan {
    pub fn step(&self, id: &str) -> Option<&Step> {
        self.steps.iter().find(|s| s.id == id)
    }

    pub fn step_mut(&mut self, id: &str) -> Option<&mut Step> {
        self.steps.iter_mut().find(|s| s.id == id)
    }

    pub fn all_steps_completed(&self) -> bool {
        !self.steps.is_empty() && self.steps.iter().all(|s| s.status == StepStatus::Completed)
    }
}

/// ========================================
/// Panel protocol (UI <-> controller)
/// ========================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum UiMessage {
    StartProject,
    Setup,
    Chat { message: String },
    #[serde(rename_all = "camelCase")]
    ExecuteStep { step_id: String },
    #[serde(rename_all = "camelCase")]
    VerifyStep { step_id: String },
    WebviewReady,
}

/// Which part of the assistant produced a chat bubble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    Assistant,
    Planner,
    Builder,
    Tutor,
    System,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PanelMessage {
    ChatResponse { message: String, sender: Sender },
    UserQuestion { message: String },
    Plan { plan: Plan },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_defaults_fill_optional_fields() {
        let raw = r#"{
            "title": "Snake",
            "steps": [{ "id": "step_1", "title": "Init", "command": "mkdir snake" }]
        }"#;
        let plan: Plan = serde_json::from_str(raw).unwrap();
        assert!(!plan.id.is_empty());
        assert_eq!(plan.status, PlanStatus::Planning);
        let step = &plan.steps[0];
        assert_eq!(step.status, StepStatus::Pending);
        assert!(step.verification.is_empty());
        assert!(step.terms.is_empty());
    }

    #[test]
    fn missing_steps_is_rejected() {
        let raw = r#"{ "id": "p", "title": "Snake", "goal": "play" }"#;
        assert!(serde_json::from_str::<Plan>(raw).is_err());
    }

    #[test]
    fn ui_messages_use_camel_case_tags() {
        let msg: UiMessage =
            serde_json::from_str(r#"{"type":"executeStep","stepId":"step_2"}"#).unwrap();
        assert_eq!(msg, UiMessage::ExecuteStep { step_id: "step_2".into() });

        let msg: UiMessage = serde_json::from_str(r#"{"type":"webviewReady"}"#).unwrap();
        assert_eq!(msg, UiMessage::WebviewReady);
    }

    #[test]
    fn panel_messages_serialize_with_sender() {
        let msg = PanelMessage::ChatResponse { message: "hi".into(), sender: Sender::Tutor };
        let v = serde_json::to_value(&msg).unwrap();
        assert_eq!(v["type"], "chatResponse");
        assert_eq!(v["sender"], "tutor");
    }
}
