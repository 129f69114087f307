use crate::prompt;
use crate::provider::DynProvider;
use crate::wire::{ChatMessage, Step};

pub const SUCCESS_FALLBACK: &str = "Great job! You completed this step. (做得好！你完成了这一步。)";
pub const ERROR_FALLBACK: &str =
    "Something went wrong. Please check the error message in the terminal. (出错了，请检查终端的错误信息。)";

/// Narrates step results for beginners. Never fails: model errors fall back to fixed text.
pub struct Tutor {
    llm: DynProvider,
}

impl Tutor {
    pub fn new(llm: DynProvider) -> Self {
        Self { llm }
    }

    pub async fn explain_success(&self, step: &Step) -> String {
        let messages = [
            ChatMessage::system(prompt::system_prompt_tutor_success()),
            ChatMessage::user(prompt::user_prompt_tutor_success(step)),
        ];
        self.ask(&messages, SUCCESS_FALLBACK).await
    }

    pub async fn explain_error(&self, step: &Step, error_output: &str) -> String {
        let messages = [
            ChatMessage::system(prompt::system_prompt_tutor_error()),
            ChatMessage::user(prompt::user_prompt_tutor_error(step, error_output)),
        ];
        self.ask(&messages, ERROR_FALLBACK).await
    }

    async fn ask(&self, messages: &[ChatMessage], fallback: &str) -> String {
        match self.llm.generate(messages).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %format!("{e:#}"), "tutor falling back to canned reply");
                fallback.to_string()
            }
        }
    }
}
