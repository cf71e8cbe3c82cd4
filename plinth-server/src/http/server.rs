//! Axum server wiring.
//!
//! - Localhost-only CORS by default
//! - Request tracing
//! - Auth middleware in front of protected routes
//! - Default-deny fallback (unrouted paths answer 403)
//! - Graceful shutdown on SIGTERM/Ctrl+C

use std::sync::Arc;

use axum::Router;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::http::auth::{require_user, AuthState, Authenticator};
use crate::http::{respond, routes};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
}

/// Build the full router: open health route, protected resource routes,
/// default-deny fallback.
pub fn build_router(
    pool: PgPool,
    authenticator: Arc<dyn Authenticator>,
    cors_permissive: bool,
) -> Router {
    let cors = if cors_permissive {
        tracing::warn!("CORS: permissive mode enabled, all origins allowed");
        CorsLayer::permissive()
    } else {
        // Localhost only
        CorsLayer::new()
            .allow_origin([
                "http://localhost:3000".parse().unwrap(),
                "http://localhost:3030".parse().unwrap(),
                "http://127.0.0.1:3000".parse().unwrap(),
                "http://127.0.0.1:3030".parse().unwrap(),
            ])
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let auth_state = AuthState { authenticator };
    let protected = routes::notes::router().layer(axum::middleware::from_fn_with_state(
        auth_state,
        require_user,
    ));

    Router::new()
        .merge(routes::health::router())
        .merge(protected)
        .fallback(respond::forbidden)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(AppState { pool }))
}

/// Connect the pool, bind, and serve until a shutdown signal.
pub async fn run_server(
    config: ServerConfig,
    authenticator: Arc<dyn Authenticator>,
) -> Result<(), ServerError> {
    let pool = config.connect_pool().await?;
    let app = build_router(pool, authenticator, config.cors_permissive);

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}

/// Server error type
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
