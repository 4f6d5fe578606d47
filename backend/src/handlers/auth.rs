//! HTTP handlers for authentication endpoints

use axum::{extract::State, Json};

use crate::error::AppResult;
use crate::services::auth::{AuthService, LoginInput, LoginResponse};
use crate::AppState;

/// Verify credentials and return the authenticated user
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> AppResult<Json<LoginResponse>> {
    let service = AuthService::new(state.db);
    let response = service.login(input).await?;
    Ok(Json(response))
}
