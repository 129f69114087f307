use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::wire::{PanelMessage, Plan, PlanStatus, Sender, StepStatus, UiMessage};

/// What a console line asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleInput {
    Ui(UiMessage),
    ShowPlan,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

pub fn parse_console_line(line: &str) -> ConsoleInput {
    let line = line.trim();
    if line.is_empty() {
        return ConsoleInput::Empty;
    }
    let Some(rest) = line.strip_prefix('/') else {
        return ConsoleInput::Ui(UiMessage::Chat { message: line.to_string() });
    };
    let (cmd, arg) = match rest.split_once(char::is_whitespace) {
        Some((c, a)) => (c, a.trim()),
        None => (rest, ""),
    };
    match (cmd, arg) {
        ("new", _) => ConsoleInput::Ui(UiMessage::StartProject),
        ("setup", _) => ConsoleInput::Ui(UiMessage::Setup),
        ("run", id) if !id.is_empty() => ConsoleInput::Ui(UiMessage::ExecuteStep { step_id: id.to_string() }),
        ("verify", id) if !id.is_empty() => ConsoleInput::Ui(UiMessage::VerifyStep { step_id: id.to_string() }),
        ("plan", _) => ConsoleInput::ShowPlan,
        ("help", _) => ConsoleInput::Help,
        ("quit" | "exit", _) => ConsoleInput::Quit,
        _ => ConsoleInput::Unknown(line.to_string()),
    }
}

pub fn print_help() {
    println!("{}", "Commands:".bold());
    println!("  /new            start a new project (your next message is the idea)");
    println!("  /setup          check git, node and python");
    println!("  /run <step>     send a step's command to the terminal");
    println!("  /verify <step>  run a step's verification command");
    println!("  /plan           show the current plan");
    println!("  /quit           leave");
    println!("  anything else   chat with the assistant");
}

pub fn render(msg: &PanelMessage) {
    match msg {
        PanelMessage::ChatResponse { message, sender } => {
            println!("\n{} {}\n", sender_label(*sender), message);
        }
        PanelMessage::UserQuestion { message } => {
            println!("\n{} {}\n", "[?]".yellow().bold(), message);
        }
        PanelMessage::Plan { plan } => show_plan(plan),
    }
}

fn sender_label(sender: Sender) -> colored::ColoredString {
    match sender {
        Sender::Assistant => "[assistant]".blue().bold(),
        Sender::Planner => "[planner]".magenta().bold(),
        Sender::Builder => "[builder]".cyan().bold(),
        Sender::Tutor => "[tutor]".green().bold(),
        Sender::System => "[babycoding]".bold(),
    }
}

pub fn show_plan(plan: &Plan) {
    let status = match plan.status {
        PlanStatus::Planning => "planning".normal(),
        PlanStatus::Active => "active".yellow(),
        PlanStatus::Completed => "completed".green(),
    };
    println!("\n=== PLAN: {} ({}) ===", plan.title.bold(), status);
    if !plan.goal.is_empty() {
        println!("{}", plan.goal);
    }
    for (i, s) in plan.steps.iter().enumerate() {
        let tag = match s.status {
            StepStatus::Pending => "[PENDING]".normal(),
            StepStatus::Running => "[RUNNING]".yellow().bold(),
            StepStatus::Completed => "[DONE]".green().bold(),
            StepStatus::Failed => "[FAILED]".red().bold(),
        };
        println!("{}. {}  {} ({})", i + 1, tag, s.title, s.id.dimmed());
        println!("     $ {}", s.command.cyan());
        if !s.description.is_empty() {
            println!("     {}", s.description);
        }
        for t in &s.terms {
            println!("     {} {}", format!("{}:", t.name).bold(), t.definition);
        }
    }
    println!();
}

pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
