use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::wire::ChatMessage;

/// Chat-completions client. Sends the role-tagged history as-is.
pub struct OpenAIProvider {
    model: String,
    api_key: String,
    api_base: String,
    client: Client,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAIProvider {
    pub fn new(model: String, api_key: String, api_base: String, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        Ok(Self {
            model,
            api_key,
            api_base,
            client: builder.build().context("build http client")?,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.api_base.trim_end_matches('/'))
    }
}

#[async_trait]
impl super::Provider for OpenAIProvider {
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String> {
        let url = self.endpoint();
        let body = ChatRequest { model: &self.model, messages };

        tracing::debug!(%url, model = %self.model, messages = messages.len(), "openai request");

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("openai request failed")?;

        let status = resp.status();
        let text = resp.text().await.context("openai read body failed")?;

        tracing::debug!(%status, bytes = text.len(), "openai response");

        if !status.is_success() {
            return Err(anyhow!("OpenAI API error ({}): {}", status, text));
        }

        let parsed: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse OpenAI response: {e}\nRaw: {text}"))?;

        Ok(parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_tolerates_trailing_slash() {
        let p = OpenAIProvider::new("m".into(), "k".into(), "http://localhost:8080/".into(), None).unwrap();
        assert_eq!(p.endpoint(), "http://localhost:8080/v1/chat/completions");
    }

    #[test]
    fn request_body_carries_roles() {
        let msgs = [ChatMessage::system("s"), ChatMessage::user("u")];
        let v = serde_json::to_value(ChatRequest { model: "gpt", messages: &msgs }).unwrap();
        assert_eq!(v["messages"][0]["role"], "system");
        assert_eq!(v["messages"][1]["content"], "u");
    }

    #[test]
    fn null_content_parses() {
        let raw = r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        assert!(parsed.choices[0].message.content.is_none());
    }
}
