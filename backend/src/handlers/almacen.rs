//! HTTP handlers for warehouse endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::error::AppResult;
use crate::services::almacen::{
    AjusteInventarioInput, AlertaInventario, Almacen, AlmacenService, CreateAlmacenInput,
    UpdateAlmacenInput,
};
use crate::AppState;

/// List every stock row
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<Almacen>>> {
    let service = AlmacenService::new(state.db);
    let almacen = service.list().await?;
    Ok(Json(almacen))
}

/// Stock alerts classified by level
pub async fn alertas(State(state): State<AppState>) -> AppResult<Json<Vec<AlertaInventario>>> {
    let service = AlmacenService::new(state.db);
    let alertas = service.alertas().await?;
    Ok(Json(alertas))
}

/// Get the stock row for an article
pub async fn get_by_codigo(
    State(state): State<AppState>,
    Path(codigo_articulo): Path<String>,
) -> AppResult<Json<Almacen>> {
    let service = AlmacenService::new(state.db);
    let almacen = service.get_by_codigo_articulo(&codigo_articulo).await?;
    Ok(Json(almacen))
}

/// Create a stock row for an article
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateAlmacenInput>,
) -> AppResult<(StatusCode, Json<Almacen>)> {
    let service = AlmacenService::new(state.db);
    let almacen = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(almacen)))
}

/// Apply a signed inventory adjustment
pub async fn ajustar(
    State(state): State<AppState>,
    Json(input): Json<AjusteInventarioInput>,
) -> AppResult<Json<Almacen>> {
    let service = AlmacenService::new(state.db);
    let almacen = service.ajustar_inventario(input).await?;
    Ok(Json(almacen))
}

/// Update a stock row
pub async fn update(
    State(state): State<AppState>,
    Path(codigo_articulo): Path<String>,
    Json(input): Json<UpdateAlmacenInput>,
) -> AppResult<Json<Almacen>> {
    let service = AlmacenService::new(state.db);
    let almacen = service.update(&codigo_articulo, input).await?;
    Ok(Json(almacen))
}

/// Remove a stock row
pub async fn delete(
    State(state): State<AppState>,
    Path(codigo_articulo): Path<String>,
) -> AppResult<StatusCode> {
    let service = AlmacenService::new(state.db);
    service.delete(&codigo_articulo).await?;
    Ok(StatusCode::NO_CONTENT)
}
