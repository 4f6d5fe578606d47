//! Liveness endpoints

use axum::Json;
use serde_json::json;

/// Root endpoint
pub async fn root() -> &'static str {
    "Inventario Comercial API v1.0"
}

/// Health check endpoint
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
