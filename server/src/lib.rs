//! HTTP front end for the command executor.

mod router;

use std::future::Future;
use std::io;

use tokio::net::TcpListener;
use tracing::info;

pub use router::AppState;
pub use router::router;

/// Serves the terminal API on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}
