//! HTTP surface for the career-plan RAG backend.

use std::{env, error::Error, sync::Arc};

mod core;
mod error_handler;
mod routes;

pub use crate::core::app_state::{AppState, EnvReport};

use axum::{
    Router,
    routing::{get, post},
};
use tokio::signal;

use crate::routes::{
    career_plan::career_plan_route::generate_career_plan, health_route::health_check,
    root_route::service_info,
};

/// Builds shared state from the environment, binds, and serves until ctrl-c.
pub async fn start() -> Result<(), Box<dyn Error>> {
    let state = Arc::new(AppState::from_env());
    let app = router(state);

    let addr = bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "serving career-plan RAG backend");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// The full route table; separate from [`start`] so tests can drive it
/// without a listener.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(service_info))
        .route("/health", get(health_check))
        .route("/api/career-plan", post(generate_career_plan))
        .with_state(state)
}

/// `API_ADDRESS` wins; otherwise `0.0.0.0:{PORT}` with a default port.
fn bind_address() -> String {
    if let Ok(addr) = env::var("API_ADDRESS") {
        if !addr.trim().is_empty() {
            return addr;
        }
    }
    let port = env::var("PORT").unwrap_or_else(|_| "8000".to_string());
    format!("0.0.0.0:{port}")
}

/// Returns a future that resolves when Ctrl+C is pressed.
async fn shutdown_signal() {
    signal::ctrl_c()
        .await
        .expect("Failed to listen for shutdown signal");
}
