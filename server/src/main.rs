use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing::warn;
use webterm_core::Config;
use webterm_core::ConfigOverrides;
use webterm_server::AppState;

/// Runs shell commands inside project directories on behalf of webterm
/// clients.
#[derive(Debug, Parser)]
#[command(name = "webterm-server", version)]
struct Cli {
    /// Directory whose children are the project working directories.
    #[arg(long, value_name = "DIR")]
    projects_root: Option<PathBuf>,

    /// Address to bind, e.g. 127.0.0.1:3000.
    #[arg(long, value_name = "ADDR")]
    listen: Option<SocketAddr>,

    /// Execution deadline applied to every command.
    #[arg(long, value_name = "MS")]
    exec_timeout_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_tracing();

    let config = Config::load_with_cli_overrides(ConfigOverrides {
        projects_root: cli.projects_root,
        listen_addr: cli.listen,
        exec_timeout_ms: cli.exec_timeout_ms,
    })?;
    info!(
        "serving projects under {} with a {:?} deadline",
        config.projects_root.path().display(),
        config.exec_timeout
    );

    let listener = TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    webterm_server::serve(listener, AppState::from_config(&config), shutdown_signal()).await?;
    Ok(())
}

fn setup_tracing() {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for ctrl-c: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
