pub mod api;
mod middleware;

pub use api::{ApiState, build_api_router};

use axum::{Router, middleware as axum_middleware};
use tokio::net::TcpListener;
use tracing::info;

use crate::infra::error::InfraError;

use middleware::set_request_context;

/// Full application router: the post API wrapped in request-context tagging.
pub fn build_router(state: ApiState) -> Router {
    build_api_router(state).layer(axum_middleware::from_fn(set_request_context))
}

/// Serve `router` on `listener` until Ctrl+C or SIGTERM.
pub async fn serve(listener: TcpListener, router: Router) -> Result<(), InfraError> {
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!(target = "postboard::http", "server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!(target = "postboard::http", "received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            info!(target = "postboard::http", "received SIGTERM, starting shutdown");
        }
    }
}
