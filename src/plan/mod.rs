use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

use crate::errors::BabyError;
use crate::prompt;
use crate::provider::DynProvider;
use crate::wire::{ChatMessage, Plan};

static JSON_OBJECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\{.*\}").expect("static regex")
});

/// Substring from the first `{` to the last `}`; the whole text if there is none.
/// Not brace-balanced: trailing prose containing `}` is swallowed too.
pub fn extract_json(text: &str) -> &str {
    JSON_OBJECT.find(text).map(|m| m.as_str()).unwrap_or(text)
}

pub struct Planner {
    llm: DynProvider,
}

impl Planner {
    pub fn new(llm: DynProvider) -> Self {
        Self { llm }
    }

    pub async fn create_plan(&self, idea: &str) -> Result<Plan, BabyError> {
        let messages = [
            ChatMessage::system(prompt::system_prompt_plan()),
            ChatMessage::user(prompt::user_prompt_plan(idea)),
        ];

        let reply = self.llm.generate(&messages).await.map_err(|e| {
            tracing::error!(error = %format!("{e:#}"), "plan request failed");
            BabyError::plan_generation(e.to_string())
        })?;

        let plan = parse_plan(&reply).map_err(|e| {
            tracing::error!(error = %e, reply = %reply, "model reply is not a usable plan");
            BabyError::plan_generation(e)
        })?;

        tracing::info!(plan_id = %plan.id, title = %plan.title, steps = plan.steps.len(), "plan created");
        Ok(plan)
    }
}

/// Parse the model reply into a plan. Returns the reason on failure.
pub fn parse_plan(reply: &str) -> Result<Plan, String> {
    let plan: Plan = serde_json::from_str(extract_json(reply)).map_err(|e| e.to_string())?;
    if plan.steps.is_empty() {
        return Err("plan has no steps".into());
    }
    let mut seen = HashSet::new();
    for s in &plan.steps {
        if !seen.insert(s.id.as_str()) {
            return Err(format!("duplicate step id {}", s.id));
        }
    }
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_is_identity_on_json_object() {
        let raw = r#"{"a":{"b":1},"c":[{"d":2}]}"#;
        assert_eq!(extract_json(raw), raw);
        assert_eq!(extract_json(extract_json(raw)), raw);
    }

    #[test]
    fn extract_spans_first_open_to_last_close() {
        let text = "Sure!\n```json\n{\"x\": 1}\n```\nAnything else {ok}?";
        assert_eq!(extract_json(text), "{\"x\": 1}\n```\nAnything else {ok}");
    }

    #[test]
    fn extract_without_braces_returns_input() {
        assert_eq!(extract_json("no json here"), "no json here");
    }

    #[test]
    fn parse_plan_from_fenced_reply() {
        let reply = "```json\n{\"id\":\"p1\",\"title\":\"Snake\",\"goal\":\"g\",\"steps\":[{\"id\":\"step_1\",\"title\":\"t\",\"command\":\"mkdir snake\"}],\"status\":\"planning\"}\n```";
        let plan = parse_plan(reply).unwrap();
        assert_eq!(plan.title, "Snake");
        assert_eq!(plan.steps[0].command, "mkdir snake");
    }

    #[test]
    fn parse_plan_rejects_empty_steps() {
        let err = parse_plan(r#"{"id":"p","title":"t","steps":[]}"#).unwrap_err();
        assert!(err.contains("no steps"));
    }

    #[test]
    fn parse_plan_rejects_duplicate_ids() {
        let reply = r#"{"title":"t","steps":[
            {"id":"a","title":"1","command":"x"},
            {"id":"a","title":"2","command":"y"}]}"#;
        assert!(parse_plan(reply).unwrap_err().contains("duplicate"));
    }
}
