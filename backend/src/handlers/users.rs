//! HTTP handlers for user account endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::error::AppResult;
use crate::handlers::ListQuery;
use crate::services::user::{CreateUserInput, UpdateUserInput, UserService, Usuario};
use crate::AppState;

/// List user accounts
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Usuario>>> {
    let service = UserService::new(state.db);
    let usuarios = service.list(query.include_inactivos).await?;
    Ok(Json(usuarios))
}

/// Get a user by id
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(usuario_id): Path<i32>,
) -> AppResult<Json<Usuario>> {
    let service = UserService::new(state.db);
    let usuario = service.get_by_id(usuario_id).await?;
    Ok(Json(usuario))
}

/// Create a user account
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateUserInput>,
) -> AppResult<(StatusCode, Json<Usuario>)> {
    let service = UserService::new(state.db);
    let usuario = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(usuario)))
}

/// Update a user account
pub async fn update(
    State(state): State<AppState>,
    Path(usuario_id): Path<i32>,
    Json(input): Json<UpdateUserInput>,
) -> AppResult<Json<Usuario>> {
    let service = UserService::new(state.db);
    let usuario = service.update(usuario_id, input).await?;
    Ok(Json(usuario))
}

/// Soft-delete a user account
pub async fn delete(
    State(state): State<AppState>,
    Path(usuario_id): Path<i32>,
) -> AppResult<StatusCode> {
    let service = UserService::new(state.db);
    service.delete(usuario_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
