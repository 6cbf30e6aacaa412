//! HTTP server exposing read-only lookups over the port store.

use anyhow::{Context, Result};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info, instrument};

use crate::{
    middleware::{create_cors_layer, request_logging_middleware, security_headers_middleware},
    settings::Settings,
    store::PortStore,
};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<PortStore>,
    pub settings: Settings,
}

impl AppState {
    pub fn new(store: Arc<PortStore>, settings: Settings) -> Self {
        Self { store, settings }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    ports_loaded: usize,
}

/// Create the HTTP router with all endpoints and middleware
pub fn create_router(state: AppState) -> Router {
    let cors_layer = create_cors_layer(state.settings.server.enable_cors);

    Router::new()
        .route("/health", get(health_check))
        .route("/ports/:id", get(get_port))
        .with_state(state)
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(middleware::from_fn(request_logging_middleware))
        .layer(cors_layer)
}

#[instrument(skip(state))]
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        ports_loaded: state.store.len(),
    })
}

/// Exact-key lookup: the record as JSON, or a plain-text 404.
#[instrument(skip(state))]
async fn get_port(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.store.get(&id) {
        Some(port) => Json(port.as_ref()).into_response(),
        None => {
            debug!("Port not found: {}", id);
            (StatusCode::NOT_FOUND, "Port not found").into_response()
        }
    }
}

/// Bind the configured address and serve until SIGINT or SIGTERM.
pub async fn serve(settings: &Settings, store: Arc<PortStore>) -> Result<()> {
    let addr = settings.listen_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Could not bind {}", addr))?;

    info!("Starting server on {}", addr);

    run(listener, AppState::new(store, settings.clone()), wait_for_shutdown()).await
}

/// Serve on an already-bound listener until `shutdown` resolves, then drain
/// in-flight requests.
pub async fn run<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = create_router(state);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server error")?;

    info!("HTTP server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (SIGINT or SIGTERM)
pub async fn wait_for_shutdown() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => {
                        info!("Received SIGTERM, shutting down gracefully");
                    }
                    _ = sigint.recv() => {
                        info!("Received SIGINT (Ctrl+C), shutting down gracefully");
                    }
                }
            }
            (Err(e), _) | (_, Err(e)) => {
                error!("Failed to install signal handlers: {}", e);
                wait_for_ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    wait_for_ctrl_c().await;
}

async fn wait_for_ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down gracefully"),
        Err(e) => {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
