//! HTTP handlers for purchase endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::error::AppResult;
use crate::services::compra::{
    Compra, CompraConDetalles, CompraService, CreateCompraInput, DetalleCompra,
    DetalleCompraInput, UpdateCompraInput,
};
use crate::AppState;

/// List purchase headers
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<Compra>>> {
    let service = CompraService::new(state.db);
    let compras = service.list().await?;
    Ok(Json(compras))
}

/// Get a purchase with its lines
pub async fn get_by_folio(
    State(state): State<AppState>,
    Path(folio): Path<i32>,
) -> AppResult<Json<CompraConDetalles>> {
    let service = CompraService::new(state.db);
    let compra = service.get_by_folio(folio).await?;
    Ok(Json(compra))
}

/// Register a purchase order
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateCompraInput>,
) -> AppResult<(StatusCode, Json<CompraConDetalles>)> {
    let service = CompraService::new(state.db);
    let compra = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(compra)))
}

/// Change a purchase's state
pub async fn update(
    State(state): State<AppState>,
    Path(folio): Path<i32>,
    Json(input): Json<UpdateCompraInput>,
) -> AppResult<Json<Compra>> {
    let service = CompraService::new(state.db);
    let compra = service.update(folio, input).await?;
    Ok(Json(compra))
}

/// Cancel a pending purchase
pub async fn cancelar(
    State(state): State<AppState>,
    Path(folio): Path<i32>,
) -> AppResult<StatusCode> {
    let service = CompraService::new(state.db);
    service.cancelar(folio).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Append a line to a pending purchase
pub async fn agregar_detalle(
    State(state): State<AppState>,
    Path(folio): Path<i32>,
    Json(input): Json<DetalleCompraInput>,
) -> AppResult<(StatusCode, Json<DetalleCompra>)> {
    let service = CompraService::new(state.db);
    let detalle = service.agregar_detalle(folio, input).await?;
    Ok((StatusCode::CREATED, Json(detalle)))
}

/// Remove a line from a pending purchase
pub async fn eliminar_detalle(
    State(state): State<AppState>,
    Path((folio, folio_detalle)): Path<(i32, i32)>,
) -> AppResult<StatusCode> {
    let service = CompraService::new(state.db);
    service.eliminar_detalle(folio, folio_detalle).await?;
    Ok(StatusCode::NO_CONTENT)
}
