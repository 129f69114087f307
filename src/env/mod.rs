use serde::{Deserialize, Serialize};

use crate::exec::run_program;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolStatus {
    pub present: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvStatus {
    pub git: ToolStatus,
    pub node: ToolStatus,
    pub python: ToolStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Git,
    Node,
    Python,
}

impl Tool {
    pub const ALL: [Tool; 3] = [Tool::Git, Tool::Node, Tool::Python];

    pub fn name(self) -> &'static str {
        match self {
            Tool::Git => "git",
            Tool::Node => "node",
            Tool::Python => "python",
        }
    }
}

impl EnvStatus {
    pub fn get(&self, tool: Tool) -> &ToolStatus {
        match tool {
            Tool::Git => &self.git,
            Tool::Node => &self.node,
            Tool::Python => &self.python,
        }
    }

    pub fn missing(&self) -> Vec<Tool> {
        Tool::ALL.into_iter().filter(|t| !self.get(*t).present).collect()
    }
}

/// Recomputed from scratch on every call.
pub async fn check_environment() -> EnvStatus {
    EnvStatus {
        git: detect("git", "--version").await,
        node: detect("node", "-v").await,
        python: match detect("python", "--version").await {
            s if s.present => s,
            _ => detect("python3", "--version").await,
        },
    }
}

async fn detect(program: &str, flag: &str) -> ToolStatus {
    if which::which(program).is_err() {
        tracing::debug!(program, "not on PATH");
        return ToolStatus::default();
    }
    match run_program(program, &[flag]).await {
        Ok(r) if r.success() => {
            // Older pythons print the version on stderr.
            let text = if r.stdout.trim().is_empty() { &r.stderr } else { &r.stdout };
            ToolStatus { present: true, version: Some(text.trim().to_string()) }
        }
        Ok(r) => {
            tracing::debug!(program, status = r.status, "version check failed");
            ToolStatus::default()
        }
        Err(e) => {
            tracing::debug!(program, error = %e, "version check could not run");
            ToolStatus::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsFamily {
    Windows,
    MacOs,
    Linux,
}

impl OsFamily {
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            OsFamily::Windows
        } else if cfg!(target_os = "macos") {
            OsFamily::MacOs
        } else {
            OsFamily::Linux
        }
    }
}

/// Install commands for the missing tools, in git, node, python order.
/// Display only; nothing is executed.
pub fn install_commands(missing: &[Tool], os: OsFamily) -> Vec<String> {
    let mut commands = Vec::new();
    let wants = |t: Tool| missing.contains(&t);

    match os {
        OsFamily::Windows => {
            if wants(Tool::Git) { commands.push("winget install -e --id Git.Git".to_string()); }
            if wants(Tool::Node) { commands.push("winget install -e --id OpenJS.NodeJS".to_string()); }
            if wants(Tool::Python) { commands.push("winget install -e --id Python.Python.3".to_string()); }
        }
        OsFamily::MacOs => {
            // Display-only placeholder line.
            commands.push("echo \"Checking for Homebrew...\"".to_string());
            if wants(Tool::Git) { commands.push("brew install git".to_string()); }
            if wants(Tool::Node) { commands.push("brew install node".to_string()); }
            if wants(Tool::Python) { commands.push("brew install python".to_string()); }
        }
        OsFamily::Linux => {
            if wants(Tool::Git) { commands.push("sudo apt-get update && sudo apt-get install -y git".to_string()); }
            if wants(Tool::Node) { commands.push("sudo apt-get install -y nodejs npm".to_string()); }
            if wants(Tool::Python) { commands.push("sudo apt-get install -y python3 python3-pip".to_string()); }
        }
    }
    commands
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linux_uses_apt_in_order() {
        let cmds = install_commands(&Tool::ALL, OsFamily::Linux);
        assert_eq!(cmds.len(), 3);
        assert!(cmds.iter().all(|c| c.contains("apt-get install")));
        assert!(cmds[0].ends_with("git"));
        assert!(cmds[1].contains("nodejs"));
        assert!(cmds[2].contains("python3"));
    }

    #[test]
    fn windows_uses_winget() {
        let cmds = install_commands(&Tool::ALL, OsFamily::Windows);
        assert_eq!(
            cmds,
            vec![
                "winget install -e --id Git.Git",
                "winget install -e --id OpenJS.NodeJS",
                "winget install -e --id Python.Python.3",
            ]
        );
    }

    #[test]
    fn macos_prefixes_placeholder() {
        let cmds = install_commands(&Tool::ALL, OsFamily::MacOs);
        assert_eq!(cmds.len(), 4);
        assert!(cmds[0].starts_with("echo"));
        assert_eq!(&cmds[1..], ["brew install git", "brew install node", "brew install python"]);
    }

    #[test]
    fn only_missing_tools_are_listed() {
        let cmds = install_commands(&[Tool::Node], OsFamily::Linux);
        assert_eq!(cmds, vec!["sudo apt-get install -y nodejs npm"]);
    }

    #[test]
    fn missing_reports_absent_tools() {
        let status = EnvStatus {
            git: ToolStatus { present: true, version: Some("git version 2.43.0".into()) },
            ..Default::default()
        };
        assert_eq!(status.missing(), vec![Tool::Node, Tool::Python]);
    }
}
