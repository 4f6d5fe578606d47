//! HTTP handlers for client endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::error::AppResult;
use crate::handlers::ListQuery;
use crate::services::cliente::{
    Cliente, ClienteService, CreateClienteInput, ResumenPuntos, UpdateClienteInput,
};
use crate::AppState;

/// List clients
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Cliente>>> {
    let service = ClienteService::new(state.db);
    let clientes = service.list(query.include_inactivos).await?;
    Ok(Json(clientes))
}

/// Get a client by id
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(cliente_id): Path<i32>,
) -> AppResult<Json<Cliente>> {
    let service = ClienteService::new(state.db);
    let cliente = service.get_by_id(cliente_id).await?;
    Ok(Json(cliente))
}

/// Loyalty summary for a client
pub async fn puntos(
    State(state): State<AppState>,
    Path(cliente_id): Path<i32>,
) -> AppResult<Json<ResumenPuntos>> {
    let service = ClienteService::new(state.db);
    let resumen = service.resumen_puntos(cliente_id).await?;
    Ok(Json(resumen))
}

/// Register a client
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateClienteInput>,
) -> AppResult<(StatusCode, Json<Cliente>)> {
    let service = ClienteService::new(state.db);
    let cliente = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(cliente)))
}

/// Update a client
pub async fn update(
    State(state): State<AppState>,
    Path(cliente_id): Path<i32>,
    Json(input): Json<UpdateClienteInput>,
) -> AppResult<Json<Cliente>> {
    let service = ClienteService::new(state.db);
    let cliente = service.update(cliente_id, input).await?;
    Ok(Json(cliente))
}

/// Soft-delete a client
pub async fn delete(
    State(state): State<AppState>,
    Path(cliente_id): Path<i32>,
) -> AppResult<StatusCode> {
    let service = ClienteService::new(state.db);
    service.delete(cliente_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
