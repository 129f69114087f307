use anyhow::{Context, Result};
use fs_err as fs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::cli::{Args, ProviderKind};
use crate::errors::BabyError;

pub const DEFAULT_CONFIG_FILE: &str = "babycoding.toml";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub provider: ProviderKind,
    pub model: String,
    pub api_key: Option<String>,
    pub api_base: String,
    /// No timeout on model calls unless set.
    pub timeout_secs: Option<u64>,
    pub workspace_folders: Vec<PathBuf>,
    pub save_exchanges: bool,
    pub exchange_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: ProviderKind::OpenAI,
            model: "gpt-3.5-turbo".into(),
            api_key: None,
            api_base: "https://api.openai.com".into(),
            timeout_secs: None,
            workspace_folders: Vec::new(),
            save_exchanges: false,
            exchange_dir: PathBuf::from(".babycoding").join("tx"),
        }
    }
}

impl Config {
    /// File (if any) < environment < command line.
    pub fn load(args: &Args) -> Result<Self> {
        let mut cfg = match &args.config {
            Some(p) => Self::from_file(Path::new(p))?,
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        cfg.apply_env(|k| std::env::var(k).ok());
        cfg.apply_args(args);
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))
    }

    pub fn apply_env(&mut self, get: impl Fn(&str) -> Option<String>) {
        if self.api_key.as_deref().map_or(true, |k| k.trim().is_empty()) {
            self.api_key = get("BABYCODING_API_KEY")
                .or_else(|| get("OPENAI_API_KEY"))
                .filter(|k| !k.trim().is_empty());
        }
    }

    pub fn apply_args(&mut self, args: &Args) {
        if let Some(p) = args.provider {
            self.provider = p;
        }
        if let Some(m) = &args.model {
            self.model = m.clone();
        }
        if let Some(k) = &args.api_key {
            self.api_key = Some(k.clone());
        }
        if let Some(b) = &args.api_base {
            self.api_base = b.clone();
        }
        if args.timeout_secs.is_some() {
            self.timeout_secs = args.timeout_secs;
        }
        if !args.workspace_folders.is_empty() {
            self.workspace_folders = args.workspace_folders.iter().map(PathBuf::from).collect();
        }
        if args.save_exchanges {
            self.save_exchanges = true;
        }
    }

    pub fn validate(&self) -> Result<(), BabyError> {
        if self.model.trim().is_empty() {
            return Err(BabyError::Config("model must not be empty".into()));
        }
        if self.timeout_secs == Some(0) {
            return Err(BabyError::Config("timeout_secs must be > 0".into()));
        }
        Ok(())
    }

    /// Working directory for terminal and verification commands.
    pub fn first_workspace_folder(&self) -> Option<&Path> {
        self.workspace_folders.first().map(PathBuf::as_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_values_are_overridden_by_args() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("babycoding.toml");
        fs::write(
            &path,
            "provider = \"gemini\"\nmodel = \"from-file\"\nworkspace_folders = [\"/tmp/a\"]\n",
        )
        .unwrap();

        let mut cfg = Config::from_file(&path).unwrap();
        assert_eq!(cfg.provider, ProviderKind::Gemini);
        assert_eq!(cfg.api_base, "https://api.openai.com");

        let args = Args { model: Some("gpt-4o-mini".into()), ..Default::default() };
        cfg.apply_args(&args);
        assert_eq!(cfg.model, "gpt-4o-mini");
        assert_eq!(cfg.first_workspace_folder(), Some(Path::new("/tmp/a")));
    }

    #[test]
    fn env_key_prefers_babycoding_variable() {
        let mut cfg = Config::default();
        cfg.apply_env(|k| match k {
            "BABYCODING_API_KEY" => Some("bc-key".into()),
            "OPENAI_API_KEY" => Some("oa-key".into()),
            _ => None,
        });
        assert_eq!(cfg.api_key.as_deref(), Some("bc-key"));
    }

    #[test]
    fn blank_env_key_is_ignored() {
        let mut cfg = Config::default();
        cfg.apply_env(|k| (k == "OPENAI_API_KEY").then(|| "  ".to_string()));
        assert!(cfg.api_key.is_none());
    }

    #[test]
    fn layers_apply_file_then_env_then_args() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("babycoding.toml");
        fs::write(
            &path,
            "model = \"from-file\"\napi_key = \"\"\ntimeout_secs = 30\nworkspace_folders = [\"/file\"]\n",
        )
        .unwrap();

        let mut cfg = Config::from_file(&path).unwrap();
        cfg.apply_env(|k| (k == "OPENAI_API_KEY").then(|| "env-key".to_string()));
        assert_eq!(cfg.api_key.as_deref(), Some("env-key"), "blank file key yields to env");

        let args = Args {
            api_key: Some("cli-key".into()),
            workspace_folders: vec!["/cli".into()],
            ..Default::default()
        };
        cfg.apply_args(&args);
        cfg.validate().unwrap();

        assert_eq!(cfg.model, "from-file");
        assert_eq!(cfg.timeout_secs, Some(30));
        assert_eq!(cfg.api_key.as_deref(), Some("cli-key"));
        assert_eq!(cfg.first_workspace_folder(), Some(Path::new("/cli")));
    }

    #[test]
    fn zero_timeout_is_invalid() {
        let cfg = Config { timeout_secs: Some(0), ..Config::default() };
        assert!(matches!(cfg.validate(), Err(BabyError::Config(_))));
    }
}
