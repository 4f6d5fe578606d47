//! HTTP handlers for article catalog endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::services::articulo::{
    Articulo, ArticuloConInventario, ArticuloService, CreateArticuloInput, UpdateArticuloInput,
};
use crate::AppState;

/// Search query string plus the shared listing filter
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusquedaQuery {
    pub q: Option<String>,
    #[serde(default)]
    pub include_inactivos: bool,
}

/// Catalog read options; conInventario=true selects the joined view
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticuloQuery {
    #[serde(default)]
    pub include_inactivos: bool,
    #[serde(default)]
    pub con_inventario: bool,
}

/// List articles, optionally joined with their stock rows
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ArticuloQuery>,
) -> AppResult<Response> {
    let service = ArticuloService::new(state.db);
    if query.con_inventario {
        let articulos = service.list_con_inventario(query.include_inactivos).await?;
        Ok(Json(articulos).into_response())
    } else {
        let articulos = service.list(query.include_inactivos).await?;
        Ok(Json(articulos).into_response())
    }
}

/// List articles joined with their stock rows
pub async fn list_con_inventario(
    State(state): State<AppState>,
    Query(query): Query<ArticuloQuery>,
) -> AppResult<Json<Vec<ArticuloConInventario>>> {
    let service = ArticuloService::new(state.db);
    let articulos = service.list_con_inventario(query.include_inactivos).await?;
    Ok(Json(articulos))
}

/// Distinct categories across active articles
pub async fn categorias(State(state): State<AppState>) -> AppResult<Json<Vec<String>>> {
    let service = ArticuloService::new(state.db);
    let categorias = service.categorias().await?;
    Ok(Json(categorias))
}

/// Search active articles by code or description
pub async fn buscar(
    State(state): State<AppState>,
    Query(query): Query<BusquedaQuery>,
) -> AppResult<Json<Vec<Articulo>>> {
    let termino = query
        .q
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            AppError::ValidationError("El parámetro q es requerido".to_string())
        })?;

    let service = ArticuloService::new(state.db);
    let articulos = service.buscar(termino, query.include_inactivos).await?;
    Ok(Json(articulos))
}

/// Get an article by code, optionally joined with its stock row
pub async fn get_by_codigo(
    State(state): State<AppState>,
    Path(codigo): Path<String>,
    Query(query): Query<ArticuloQuery>,
) -> AppResult<Response> {
    let service = ArticuloService::new(state.db);
    if query.con_inventario {
        let articulo = service.get_con_inventario(&codigo).await?;
        Ok(Json(articulo).into_response())
    } else {
        let articulo = service.get_by_codigo(&codigo).await?;
        Ok(Json(articulo).into_response())
    }
}

/// Create an article
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateArticuloInput>,
) -> AppResult<(StatusCode, Json<Articulo>)> {
    let service = ArticuloService::new(state.db);
    let articulo = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(articulo)))
}

/// Update an article
pub async fn update(
    State(state): State<AppState>,
    Path(codigo): Path<String>,
    Json(input): Json<UpdateArticuloInput>,
) -> AppResult<Json<Articulo>> {
    let service = ArticuloService::new(state.db);
    let articulo = service.update(&codigo, input).await?;
    Ok(Json(articulo))
}

/// Soft-delete an article
pub async fn delete(
    State(state): State<AppState>,
    Path(codigo): Path<String>,
) -> AppResult<StatusCode> {
    let service = ArticuloService::new(state.db);
    service.delete(&codigo).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn con_inventario_solo_se_activa_con_true() {
        let query: ArticuloQuery = serde_urlencoded::from_str("conInventario=true").unwrap();
        assert!(query.con_inventario);

        let query: ArticuloQuery = serde_urlencoded::from_str("conInventario=false").unwrap();
        assert!(!query.con_inventario);

        let query: ArticuloQuery = serde_urlencoded::from_str("").unwrap();
        assert!(!query.con_inventario);
    }

    #[test]
    fn busqueda_acepta_include_inactivos() {
        let query: BusquedaQuery =
            serde_urlencoded::from_str("q=caf&includeInactivos=true").unwrap();
        assert_eq!(query.q.as_deref(), Some("caf"));
        assert!(query.include_inactivos);

        let query: BusquedaQuery = serde_urlencoded::from_str("q=caf").unwrap();
        assert!(!query.include_inactivos);
    }
}
