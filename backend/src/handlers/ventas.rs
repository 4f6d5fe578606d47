//! HTTP handlers for sales endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::error::AppResult;
use crate::services::venta::{
    CreateVentaInput, UpdateVentaInput, Venta, VentaConDetalles, VentaService,
};
use crate::AppState;

/// List sale headers
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<Venta>>> {
    let service = VentaService::new(state.db);
    let ventas = service.list().await?;
    Ok(Json(ventas))
}

/// Get a sale with its lines
pub async fn get_by_folio(
    State(state): State<AppState>,
    Path(folio): Path<i32>,
) -> AppResult<Json<VentaConDetalles>> {
    let service = VentaService::new(state.db);
    let venta = service.get_by_folio(folio).await?;
    Ok(Json(venta))
}

/// Capture a sale
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateVentaInput>,
) -> AppResult<(StatusCode, Json<VentaConDetalles>)> {
    let service = VentaService::new(state.db);
    let venta = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(venta)))
}

/// Change a sale's state
pub async fn update(
    State(state): State<AppState>,
    Path(folio): Path<i32>,
    Json(input): Json<UpdateVentaInput>,
) -> AppResult<Json<Venta>> {
    let service = VentaService::new(state.db);
    let venta = service.update(folio, input).await?;
    Ok(Json(venta))
}

/// Cancel a sale
pub async fn cancelar(
    State(state): State<AppState>,
    Path(folio): Path<i32>,
) -> AppResult<StatusCode> {
    let service = VentaService::new(state.db);
    service.cancelar(folio).await?;
    Ok(StatusCode::NO_CONTENT)
}
