use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, ChildStdin, Command};

use crate::errors::BabyError;
use crate::wire::Step;

#[derive(Debug, Clone)]
pub struct CmdResult {
    pub command: String,
    pub cwd: Option<PathBuf>,
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CmdResult {
    pub fn success(&self) -> bool {
        self.status == 0
    }
}

/// Run `cmd` through the platform shell and capture its output.
pub async fn run_shell(cmd: &str, cwd: Option<&Path>) -> Result<CmdResult> {
    let mut c = shell_command(cmd);
    if let Some(dir) = cwd {
        c.current_dir(dir);
    }
    capture(c, cmd, cwd).await
}

/// Run a program directly (no shell) and capture its output.
pub async fn run_program(program: &str, args: &[&str]) -> Result<CmdResult> {
    let mut c = Command::new(program);
    c.args(args);
    capture(c, &format!("{} {}", program, args.join(" ")), None).await
}

async fn capture(mut c: Command, display: &str, cwd: Option<&Path>) -> Result<CmdResult> {
    c.stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::piped());
    let out = c
        .output()
        .await
        .with_context(|| format!("failed to spawn command {}", display))?;

    Ok(CmdResult {
        command: display.to_string(),
        cwd: cwd.map(Path::to_path_buf),
        status: out.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&out.stdout).to_string(),
        stderr: String::from_utf8_lossy(&out.stderr).to_string(),
    })
}

#[cfg(target_os = "windows")]
fn shell_command(cmd: &str) -> Command {
    let mut c = Command::new("cmd");
    c.arg("/C").arg(cmd);
    c
}

#[cfg(not(target_os = "windows"))]
fn shell_command(cmd: &str) -> Command {
    let mut c = Command::new("sh");
    c.arg("-c").arg(cmd);
    c
}

/// Somewhere command text can be typed.
#[async_trait]
pub trait Terminal: Send {
    async fn send_text(&mut self, text: &str) -> Result<()>;
}

/// A long-lived interactive shell fed through its stdin.
///
/// Shell output is mirrored on our stderr; stdout carries panel messages.
pub struct ShellTerminal {
    cwd: Option<PathBuf>,
    session: Option<(Child, ChildStdin)>,
}

impl ShellTerminal {
    pub fn new(cwd: Option<PathBuf>) -> Self {
        Self { cwd, session: None }
    }

    fn spawn(&self) -> Result<(Child, ChildStdin)> {
        #[cfg(target_os = "windows")]
        let mut c = {
            let mut c = Command::new("cmd");
            c.arg("/Q");
            c
        };
        #[cfg(not(target_os = "windows"))]
        let mut c = Command::new("sh");

        if let Some(dir) = &self.cwd {
            c.current_dir(dir);
        }
        c.stdin(Stdio::piped())
            .stdout(std::io::stderr())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        let mut child = c.spawn().context("failed to start terminal shell")?;
        let stdin = child.stdin.take().context("terminal stdin not captured")?;
        tracing::debug!(pid = ?child.id(), cwd = ?self.cwd, "terminal shell started");
        Ok((child, stdin))
    }

    /// Reuse the running shell, or start a new one if it has exited.
    fn session(&mut self) -> Result<&mut ChildStdin> {
        let alive = match &mut self.session {
            Some((child, _)) => matches!(child.try_wait(), Ok(None)),
            None => false,
        };
        if !alive {
            self.session = Some(self.spawn()?);
        }
        match &mut self.session {
            Some((_, stdin)) => Ok(stdin),
            None => bail!("terminal shell unavailable"),
        }
    }
}

#[async_trait]
impl Terminal for ShellTerminal {
    async fn send_text(&mut self, text: &str) -> Result<()> {
        let line = format!("{}\n", text);
        let stdin = self.session()?;
        if stdin.write_all(line.as_bytes()).await.is_ok() && stdin.flush().await.is_ok() {
            return Ok(());
        }
        // The shell went away between the liveness check and the write.
        self.session = None;
        let stdin = self.session()?;
        stdin.write_all(line.as_bytes()).await.context("write to terminal")?;
        stdin.flush().await.context("flush terminal")?;
        Ok(())
    }
}

/// What `execute_step` can promise: the text was sent, nothing more.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Dispatched,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    pub success: bool,
    pub output: String,
}

pub const NO_VERIFICATION: &str = "No verification needed.";

pub struct Builder {
    terminal: Box<dyn Terminal>,
    cwd: Option<PathBuf>,
}

impl Builder {
    pub fn new(terminal: Box<dyn Terminal>, cwd: Option<PathBuf>) -> Self {
        Self { terminal, cwd }
    }

    pub fn with_shell(cwd: Option<PathBuf>) -> Self {
        Self::new(Box::new(ShellTerminal::new(cwd.clone())), cwd)
    }

    pub async fn execute_step(&mut self, step: &Step) -> Result<StepOutcome, BabyError> {
        self.terminal
            .send_text(&step.command)
            .await
            .map_err(|e| BabyError::Terminal(format!("{e:#}")))?;
        tracing::info!(step = %step.id, command = %step.command, "step dispatched");
        Ok(StepOutcome::Dispatched)
    }

    pub async fn verify_step(&self, step: &Step) -> Verification {
        let cmd = step.verification.trim();
        if cmd.is_empty() {
            return Verification { success: true, output: NO_VERIFICATION.to_string() };
        }

        match run_shell(cmd, self.cwd.as_deref()).await {
            Ok(r) if r.success() => {
                let output = if r.stdout.is_empty() { r.stderr } else { r.stdout };
                Verification { success: true, output }
            }
            Ok(r) => {
                tracing::warn!(step = %step.id, status = r.status, "verification failed");
                Verification {
                    success: false,
                    output: format!("Command failed: {}\n{}", cmd, r.stderr),
                }
            }
            Err(e) => {
                tracing::warn!(step = %step.id, error = %e, "verification could not run");
                Verification { success: false, output: format!("{e:#}") }
            }
        }
    }
}
