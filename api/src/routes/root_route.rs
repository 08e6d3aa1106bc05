//! GET / — service identity and non-secret configuration diagnostics.

use std::sync::Arc;

use axum::{Json, extract::State};
use serde_json::{Value, json};
use tracing::info;

use crate::core::app_state::AppState;

const SERVICE_NAME: &str = "Career Plan Connector (RAG Enabled)";

/// Handler: GET /
pub async fn service_info(State(state): State<Arc<AppState>>) -> Json<Value> {
    info!("root endpoint accessed");

    let status = match &state.init_warning {
        Some(warning) => format!("running with initialization errors: {warning}"),
        None => "running".to_string(),
    };

    Json(json!({
        "service": SERVICE_NAME,
        "status": status,
        "environment_variables": state.env_report.presence_map(),
    }))
}
