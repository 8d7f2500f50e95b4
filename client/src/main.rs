use std::io;

use anyhow::Context;
use clap::Parser;
use crossterm::event::Event;
use crossterm::event::EventStream;
use futures::StreamExt;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use url::Url;
use webterm_client::HttpTransport;
use webterm_client::PendingExecution;
use webterm_client::RawModeGuard;
use webterm_client::TerminalSession;
use webterm_client::TerminalSurface;
use webterm_client::keys;
use webterm_core::config::find_webterm_home;
use webterm_core::config::log_dir;
use webterm_line_editor::CommandOutcome;
use webterm_line_editor::DEFAULT_PROMPT;
use webterm_line_editor::DEFAULT_TITLE;
use webterm_line_editor::EditorConfig;
use webterm_line_editor::SessionState;
use webterm_line_editor::Surface;

const LOG_FILE: &str = "webterm.log";

/// Interactive terminal for a webterm server.
#[derive(Debug, Parser)]
#[command(name = "webterm", version)]
struct Cli {
    /// Server root URL.
    #[arg(long, default_value = "http://127.0.0.1:3000")]
    server: Url,

    /// Project whose directory commands run in.
    #[arg(long)]
    project: String,

    #[arg(long, default_value = DEFAULT_PROMPT)]
    prompt: String,

    /// Title shown in the startup banner.
    #[arg(long, default_value = DEFAULT_TITLE)]
    title: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _log_guard = setup_tracing()?;
    run(cli).await
}

/// Logs go to a file: stdout belongs to the raw-mode screen.
fn setup_tracing() -> anyhow::Result<WorkerGuard> {
    let log_dir = log_dir(&find_webterm_home()?);
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("failed to create log directory {}", log_dir.display()))?;
    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(&log_dir, LOG_FILE));
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init();
    Ok(guard)
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let Cli {
        server,
        project,
        prompt,
        title,
    } = cli;
    info!("connecting to {server} for project {project}");
    let mut session = TerminalSession::new(
        HttpTransport::new(server),
        project,
        EditorConfig { prompt, title },
    );

    let _raw_mode = RawModeGuard::enable().context("failed to enable raw mode")?;
    let mut surface = TerminalSurface::new(io::stdout());
    session.start(&mut surface)?;

    let mut events = EventStream::new();
    let mut pending: Option<PendingExecution> = None;
    loop {
        tokio::select! {
            outcome = wait_for(&mut pending), if pending.is_some() => {
                pending = None;
                session.finish(outcome, &mut surface)?;
            }
            event = events.next() => {
                let Some(event) = event else {
                    break;
                };
                let event = event.context("failed to read terminal input")?;
                if let Event::Key(key) = &event
                    && keys::is_exit_key(key)
                    && session.editor().state() == SessionState::Idle
                    && session.editor().buffer().is_empty()
                {
                    surface.write("\r\n")?;
                    break;
                }
                let Some(input) = keys::event_to_input(&event) else {
                    continue;
                };
                if let Some(execution) = session.handle_input(&input, &mut surface)? {
                    pending = Some(execution);
                }
            }
        }
    }

    info!("session closed");
    Ok(())
}

async fn wait_for(pending: &mut Option<PendingExecution>) -> CommandOutcome {
    match pending.as_mut() {
        Some(execution) => execution.await,
        None => std::future::pending().await,
    }
}
