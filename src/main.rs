use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::{self, UnboundedReceiver};

use babycoding::cli::Args;
use babycoding::config::Config;
use babycoding::exec::Builder;
use babycoding::log::{self, ExchangeRecorder};
use babycoding::panel::{PanelController, Session};
use babycoding::provider;
use babycoding::ux::{self, ConsoleInput};
use babycoding::wire::{PanelMessage, UiMessage};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    log::init(args.debug);

    let cfg = Config::load(&args)?;
    let session = Session::new();
    tracing::debug!(session = %session.id, provider = ?cfg.provider, model = %cfg.model, "starting");

    // A missing key stops us here rather than on the first chat turn.
    let mut llm = provider::make_provider(&cfg)?;
    if cfg.save_exchanges {
        llm = ExchangeRecorder::wrap(llm, log::session_dir(&cfg.exchange_dir, session.id))?;
    }

    let builder = Builder::with_shell(cfg.first_workspace_folder().map(Path::to_path_buf));
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut panel = PanelController::new(session, llm, builder, tx);

    if args.json {
        run_json_lines(&mut panel, &mut rx).await
    } else {
        run_console(&mut panel, &mut rx, args.progress).await
    }
}

/// One `UiMessage` per stdin line in, one `PanelMessage` per stdout line out.
async fn run_json_lines(panel: &mut PanelController, rx: &mut UnboundedReceiver<PanelMessage>) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("read stdin")? {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<UiMessage>(&line) {
            Ok(msg) => panel.handle(msg).await,
            Err(e) => {
                tracing::warn!(error = %e, %line, "ignoring malformed ui message");
                continue;
            }
        }
        let mut out = std::io::stdout().lock();
        while let Ok(msg) = rx.try_recv() {
            serde_json::to_writer(&mut out, &msg)?;
            out.write_all(b"\n")?;
        }
        out.flush()?;
    }
    Ok(())
}

async fn run_console(
    panel: &mut PanelController,
    rx: &mut UnboundedReceiver<PanelMessage>,
    progress: bool,
) -> Result<()> {
    panel.handle(UiMessage::WebviewReady).await;
    drain(rx);
    ux::print_help();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush().ok();
        let Some(line) = lines.next_line().await.context("read stdin")? else { break };

        match ux::parse_console_line(&line) {
            ConsoleInput::Ui(msg) => {
                let pb = progress.then(|| ux::spinner("thinking..."));
                panel.handle(msg).await;
                if let Some(pb) = pb {
                    pb.finish_and_clear();
                }
                drain(rx);
            }
            ConsoleInput::ShowPlan => match &panel.session().current_plan {
                Some(plan) => ux::show_plan(plan),
                None => println!("No plan yet. Type /new to start a project."),
            },
            ConsoleInput::Help => ux::print_help(),
            ConsoleInput::Quit => break,
            ConsoleInput::Empty => {}
            ConsoleInput::Unknown(cmd) => println!("Unknown command: {cmd} (try /help)"),
        }
    }
    Ok(())
}

fn drain(rx: &mut UnboundedReceiver<PanelMessage>) {
    while let Ok(msg) = rx.try_recv() {
        ux::render(&msg);
    }
}
