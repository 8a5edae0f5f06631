pub mod bootstrap;
pub mod health;
pub mod lookup;

use std::future::{Future, IntoFuture};
use std::time::Duration;

use axum::Router;
use catalog_db::{DbPool, ProductResolver};
use tokio::net::TcpListener;
use tracing::{info, warn};

pub fn router(resolver: ProductResolver, db_pool: DbPool) -> Router {
    lookup::router(resolver).merge(health::router(db_pool))
}

/// Serves `app` until `shutdown` resolves, then stops accepting connections
/// and waits up to `drain` for in-flight requests before returning.
pub async fn serve_until<F>(
    listener: TcpListener,
    app: Router,
    shutdown: F,
    drain: Duration,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let (fired_tx, mut fired_rx) = tokio::sync::watch::channel(false);

    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.await;
            let _ = fired_tx.send(true);
        })
        .into_future();

    let drain_deadline = async move {
        if fired_rx.wait_for(|fired| *fired).await.is_ok() {
            tokio::time::sleep(drain).await;
        } else {
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        result = server => {
            info!(
                event_name = "system.server.drained",
                correlation_id = "shutdown",
                "in-flight requests drained"
            );
            result
        }
        _ = drain_deadline => {
            warn!(
                event_name = "system.server.drain_timeout",
                correlation_id = "shutdown",
                drain_secs = drain.as_secs(),
                "graceful shutdown window elapsed with requests still in flight"
            );
            Ok(())
        }
    }
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            warn!(error = %error, "ctrl-c handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                warn!(error = %error, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
