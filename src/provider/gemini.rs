use anyhow::Result;
use async_trait::async_trait;

use crate::wire::ChatMessage;

pub const PLACEHOLDER: &str = "Gemini support coming soon!";

/// Not wired to the Gemini API yet; answers every request with a placeholder.
pub struct GeminiProvider;

#[async_trait]
impl super::Provider for GeminiProvider {
    async fn generate(&self, _messages: &[ChatMessage]) -> Result<String> {
        Ok(PLACEHOLDER.to_string())
    }
}
