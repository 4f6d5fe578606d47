//! HTTP handlers for supplier endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::error::AppResult;
use crate::handlers::ListQuery;
use crate::services::proveedor::{
    CreateProveedorInput, Proveedor, ProveedorService, UpdateProveedorInput,
};
use crate::AppState;

/// List suppliers
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Proveedor>>> {
    let service = ProveedorService::new(state.db);
    let proveedores = service.list(query.include_inactivos).await?;
    Ok(Json(proveedores))
}

/// Get a supplier by id
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(proveedor_id): Path<i32>,
) -> AppResult<Json<Proveedor>> {
    let service = ProveedorService::new(state.db);
    let proveedor = service.get_by_id(proveedor_id).await?;
    Ok(Json(proveedor))
}

/// Register a supplier
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateProveedorInput>,
) -> AppResult<(StatusCode, Json<Proveedor>)> {
    let service = ProveedorService::new(state.db);
    let proveedor = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(proveedor)))
}

/// Update a supplier
pub async fn update(
    State(state): State<AppState>,
    Path(proveedor_id): Path<i32>,
    Json(input): Json<UpdateProveedorInput>,
) -> AppResult<Json<Proveedor>> {
    let service = ProveedorService::new(state.db);
    let proveedor = service.update(proveedor_id, input).await?;
    Ok(Json(proveedor))
}

/// Soft-delete a supplier
pub async fn delete(
    State(state): State<AppState>,
    Path(proveedor_id): Path<i32>,
) -> AppResult<StatusCode> {
    let service = ProveedorService::new(state.db);
    service.delete(proveedor_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
