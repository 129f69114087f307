use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::cli::ProviderKind;
use crate::config::Config;
use crate::errors::BabyError;
use crate::wire::ChatMessage;

pub mod gemini;
pub mod openai;

/// The one capability every model backend has: messages in, text out.
#[async_trait]
pub trait Provider: Send + Sync {
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String>;
}

pub type DynProvider = Arc<dyn Provider>;

/// Resolve the configured backend once, at session start.
pub fn make_provider(cfg: &Config) -> Result<DynProvider, BabyError> {
    match cfg.provider {
        ProviderKind::OpenAI => {
            let api_key = cfg
                .api_key
                .clone()
                .filter(|k| !k.trim().is_empty())
                .ok_or(BabyError::MissingApiKey)?;
            let provider = openai::OpenAIProvider::new(
                cfg.model.clone(),
                api_key,
                cfg.api_base.clone(),
                cfg.timeout_secs.map(Duration::from_secs),
            )
            .map_err(|e| BabyError::Provider(e.to_string()))?;
            Ok(Arc::new(provider))
        }
        ProviderKind::Gemini => Ok(Arc::new(gemini::GeminiProvider)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openai_without_key_is_a_config_error() {
        let cfg = Config::default();
        assert!(matches!(make_provider(&cfg), Err(BabyError::MissingApiKey)));
    }

    #[test]
    fn blank_key_counts_as_missing() {
        for key in ["", "   "] {
            let cfg = Config { api_key: Some(key.into()), ..Config::default() };
            assert!(matches!(make_provider(&cfg), Err(BabyError::MissingApiKey)));
        }
    }

    #[tokio::test]
    async fn gemini_stub_needs_no_key() {
        let cfg = Config { provider: ProviderKind::Gemini, ..Config::default() };
        let p = make_provider(&cfg).unwrap();
        let text = p.generate(&[ChatMessage::user("hi")]).await.unwrap();
        assert_eq!(text, gemini::PLACEHOLDER);
    }
}
