use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fs_err as fs;
use serde::Serialize;
use serde_json::to_string_pretty;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use crate::provider::{DynProvider, Provider};
use crate::wire::ChatMessage;

/// Diagnostics go to stderr, filtered by `RUST_LOG` (default `warn`).
pub fn init(debug: bool) {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) if debug => EnvFilter::new("babycoding=debug"),
        Err(_) => EnvFilter::new("warn"),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}

pub fn session_dir(root: &Path, session: Uuid) -> PathBuf {
    root.join(session.to_string())
}

#[derive(Serialize)]
struct Exchange<'a> {
    seq: usize,
    timestamp: DateTime<Utc>,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    reply: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Writes every model exchange to `<dir>/<seq>.exchange.json`. Write-only.
pub struct ExchangeRecorder {
    inner: DynProvider,
    dir: PathBuf,
    seq: AtomicUsize,
}

impl ExchangeRecorder {
    pub fn wrap(inner: DynProvider, dir: PathBuf) -> Result<DynProvider> {
        fs::create_dir_all(&dir)?;
        tracing::info!(dir = %dir.display(), "saving model exchanges");
        Ok(Arc::new(Self { inner, dir, seq: AtomicUsize::new(1) }))
    }

    fn save(&self, exchange: &Exchange<'_>) -> Result<PathBuf> {
        let p = self.dir.join(format!("{:03}.exchange.json", exchange.seq));
        fs::write(&p, to_string_pretty(exchange)?)?;
        Ok(p)
    }
}

#[async_trait]
impl Provider for ExchangeRecorder {
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String> {
        let result = self.inner.generate(messages).await;
        let exchange = Exchange {
            seq: self.seq.fetch_add(1, Ordering::SeqCst),
            timestamp: Utc::now(),
            messages,
            reply: result.as_ref().ok().map(String::as_str),
            error: result.as_ref().err().map(|e| format!("{e:#}")),
        };
        match self.save(&exchange) {
            Ok(p) => tracing::debug!(path = %p.display(), "exchange saved"),
            Err(e) => tracing::warn!(error = %e, "could not save exchange"),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::gemini::{GeminiProvider, PLACEHOLDER};

    #[tokio::test]
    async fn exchanges_are_numbered_files() {
        let root = tempfile::tempdir().unwrap();
        let dir = session_dir(root.path(), Uuid::new_v4());
        let p = ExchangeRecorder::wrap(Arc::new(GeminiProvider), dir.clone()).unwrap();

        p.generate(&[ChatMessage::user("one")]).await.unwrap();
        p.generate(&[ChatMessage::user("two")]).await.unwrap();

        let second = fs::read_to_string(dir.join("002.exchange.json")).unwrap();
        let v: serde_json::Value = serde_json::from_str(&second).unwrap();
        assert_eq!(v["messages"][0]["content"], "two");
        assert_eq!(v["reply"], PLACEHOLDER);
        assert!(dir.join("001.exchange.json").is_file());
    }
}
