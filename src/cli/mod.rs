use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    #[value(name = "openai", alias = "open-ai")]
    OpenAI,
    Gemini,
}

#[derive(Parser, Debug, Default)]
#[command(name = "babycoding", version, about = "Turn a project idea into shell steps, run them, and learn what they did")]
pub struct Args {
    /// TOML config file (defaults to ./babycoding.toml when present)
    #[arg(long)]
    pub config: Option<String>,

    #[arg(long, value_enum)]
    pub provider: Option<ProviderKind>,

    #[arg(long)]
    pub model: Option<String>,

    #[arg(long)]
    pub api_key: Option<String>,

    #[arg(long)]
    pub api_base: Option<String>,

    /// Workspace folder; commands and verifications run in the first one.
    #[arg(long = "workspace")]
    pub workspace_folders: Vec<String>,

    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Speak the panel protocol as JSON lines on stdin/stdout.
    #[arg(long, default_value_t = false)]
    pub json: bool,

    #[arg(long, default_value_t = false)]
    pub save_exchanges: bool,

    #[arg(long, default_value_t = false)]
    pub debug: bool,

    /// Hide the spinner shown while waiting on the model.
    #[arg(long = "no-progress", action = clap::ArgAction::SetFalse)]
    pub progress: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_provider_and_workspaces() {
        let args = Args::try_parse_from([
            "babycoding", "--provider", "gemini", "--workspace", "/w1", "--workspace", "/w2", "--no-progress",
        ])
        .unwrap();
        assert_eq!(args.provider, Some(ProviderKind::Gemini));
        assert_eq!(args.workspace_folders, vec!["/w1", "/w2"]);
        assert!(!args.progress);
    }

    #[test]
    fn progress_is_on_by_default() {
        let args = Args::try_parse_from(["babycoding"]).unwrap();
        assert!(args.progress);
        assert!(args.provider.is_none());
    }
}
