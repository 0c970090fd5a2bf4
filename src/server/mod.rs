//! JSON web API over the HR agent.

pub mod dto;
pub mod error;
pub mod handlers;

pub use error::ApiError;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::agent::HrAgent;
use crate::error::HrAgentError;
use crate::session::SessionRegistry;

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub agent: Arc<HrAgent>,
    pub sessions: Arc<SessionRegistry>,
}

impl AppState {
    pub fn new(agent: HrAgent) -> Self {
        Self {
            agent: Arc::new(agent),
            sessions: Arc::new(SessionRegistry::new()),
        }
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::health))
        .route("/chat", post(handlers::chat))
        .route("/sessions", get(handlers::list_sessions))
        .route(
            "/sessions/{session_id}",
            get(handlers::get_session).delete(handlers::delete_session),
        )
        .fallback(handlers::not_found)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until Ctrl-C or SIGTERM.
pub async fn serve(listener: TcpListener, state: AppState) -> Result<(), HrAgentError> {
    let addr = listener.local_addr()?;
    info!(%addr, "HR agent API listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("HR agent API stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
