//! HTTP bootstrap: router, middleware stack and process lifecycle.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio::signal::{self, ctrl_c};
use tower_http::services::{ServeDir, ServeFile};
use tracing::info;

pub mod config;
pub mod diagnostic;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::{Config, Environment};
pub use error::AppError;
pub use state::AppState;

pub const DIAGNOSTIC_PATH: &str = "/ssl-diagnostic";
pub const WEBHOOK_PATH: &str = "/api/webhooks/payments";

fn api_router(state: &AppState) -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/health", get(routes::health))
        .route("/api/csrf-token", get(routes::csrf_token))
        .route("/api/categories", get(routes::categories))
        .route("/api/locations", get(routes::search_locations))
        .route("/api/locations/{id}", get(routes::get_location))
        .route(
            "/api/locations/{id}/rating",
            get(routes::get_rating).post(routes::rate_location),
        )
        .route("/api/locations/{id}/quote", get(routes::quote))
        .route("/api/locations/{id}/saved", get(routes::is_saved))
        .route(
            "/api/locations/{id}/save",
            post(routes::save_location).delete(routes::unsave_location),
        )
        .route("/api/saved", get(routes::saved_locations))
        .route("/api/saved/ids", get(routes::saved_ids))
        .route("/api/map/markers", post(routes::map_markers))
        .layer(from_fn(middleware::csrf_protection))
        .layer(DefaultBodyLimit::max(state.config.body_limit))
}

/// The payment provider needs the raw, unlimited body and cannot send CSRF tokens.
fn webhook_router() -> Router<Arc<AppState>> {
    Router::new()
        .route(WEBHOOK_PATH, post(routes::payment_webhook))
        .layer(DefaultBodyLimit::disable())
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let router = Router::new()
        .merge(api_router(&state))
        .merge(webhook_router())
        .route(DIAGNOSTIC_PATH, get(diagnostic::page));

    let router = if state.config.is_production() {
        let static_dir = &state.config.static_dir;
        info!("Serving client bundle from {}", static_dir.display());
        router.fallback_service(ServeDir::new(static_dir).fallback(ServeFile::new(static_dir.join("index.html"))))
    } else {
        info!("Development mode, client assets are served by the dev server");
        router.fallback(routes::dev_fallback)
    };

    router
        .layer(from_fn_with_state(state.clone(), middleware::handle_errors))
        .layer(from_fn_with_state(state.clone(), middleware::security_headers))
        .layer(from_fn(middleware::audit_api))
        .layer(from_fn(middleware::log_requests))
        .layer(from_fn_with_state(state.clone(), middleware::redirect_to_https))
        .with_state(state)
}

pub async fn serve(state: Arc<AppState>) -> Result<()> {
    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    info!("Server running on {address} ({})", state.config.environment);

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(error) => {
                tracing::error!("Failed to listen for Ctrl+C: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(error) => {
                tracing::error!("Failed to install terminate handler: {error}");
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
}
