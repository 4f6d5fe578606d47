//! Warehouse service: stock rows, atomic inventory adjustment and alerts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use validator::Validate;

use shared::types::EstadoStock;
use shared::validation::{limpiar_opcional, stock_bounds_validos};

use crate::error::{AppError, AppResult, FieldError};

/// Default thresholds for a stock row created without explicit bounds
pub const STOCK_MINIMO_DEFAULT: i32 = 10;
pub const STOCK_MAXIMO_DEFAULT: i32 = 1000;

/// Warehouse service owning the almacen table
#[derive(Clone)]
pub struct AlmacenService {
    db: PgPool,
}

/// Stock row for an article
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Almacen {
    pub almacen_id: i32,
    pub codigo_articulo: String,
    pub cantidad: i32,
    pub stock_minimo: i32,
    pub stock_maximo: i32,
    pub ubicacion: Option<String>,
    pub ultima_actualizacion: DateTime<Utc>,
}

/// Alert entry sourced from the v_inventario_alertas view
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertaInventario {
    pub codigo: String,
    pub descripcion: String,
    pub cantidad: i32,
    pub stock_minimo: i32,
    pub estado_stock: EstadoStock,
}

/// Row for the alert view query
#[derive(Debug, FromRow)]
struct AlertaRow {
    codigo: String,
    descripcion: String,
    cantidad: i32,
    stock_minimo: i32,
    estado_stock: String,
}

/// Input for creating a stock row
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAlmacenInput {
    #[validate(length(min = 1, max = 50, message = "El código del artículo es requerido"))]
    pub codigo_articulo: String,
    #[validate(range(min = 0, message = "La cantidad debe ser mayor o igual a 0"))]
    pub cantidad: i32,
    #[validate(range(min = 0, message = "El stock mínimo debe ser mayor o igual a 0"))]
    pub stock_minimo: Option<i32>,
    #[validate(range(min = 0, message = "El stock máximo debe ser mayor o igual a 0"))]
    pub stock_maximo: Option<i32>,
    #[validate(length(max = 50, message = "La ubicación admite máximo 50 caracteres"))]
    pub ubicacion: Option<String>,
}

/// Input for updating a stock row; omitted fields stay unchanged
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAlmacenInput {
    #[validate(range(min = 0, message = "La cantidad debe ser mayor o igual a 0"))]
    pub cantidad: Option<i32>,
    #[validate(range(min = 0, message = "El stock mínimo debe ser mayor o igual a 0"))]
    pub stock_minimo: Option<i32>,
    #[validate(range(min = 0, message = "El stock máximo debe ser mayor o igual a 0"))]
    pub stock_maximo: Option<i32>,
    #[validate(length(max = 50, message = "La ubicación admite máximo 50 caracteres"))]
    pub ubicacion: Option<String>,
}

/// Input for an inventory adjustment
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AjusteInventarioInput {
    #[validate(length(min = 1, max = 50, message = "El código del artículo es requerido"))]
    pub codigo_articulo: String,
    #[validate(custom = "shared::validation::validar_ajuste_no_cero")]
    pub cantidad: i32,
    #[validate(length(min = 1, message = "El motivo es requerido"))]
    pub motivo: String,
}

const SELECT_ALMACEN: &str = "SELECT almacen_id, codigo_articulo, cantidad, stock_minimo, \
     stock_maximo, ubicacion, ultima_actualizacion FROM almacen";

fn bounds_error() -> AppError {
    AppError::Validation {
        errors: vec![FieldError {
            field: "stockMaximo".to_string(),
            message: "El stock máximo debe ser mayor o igual al stock mínimo".to_string(),
        }],
    }
}

impl AlmacenService {
    /// Create a new AlmacenService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List every stock row ordered by article code
    pub async fn list(&self) -> AppResult<Vec<Almacen>> {
        let rows = sqlx::query_as::<_, Almacen>(&format!(
            "{SELECT_ALMACEN} ORDER BY codigo_articulo"
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    /// Get the stock row for an article
    pub async fn get_by_codigo_articulo(&self, codigo_articulo: &str) -> AppResult<Almacen> {
        let almacen = sqlx::query_as::<_, Almacen>(&format!(
            "{SELECT_ALMACEN} WHERE codigo_articulo = $1"
        ))
        .bind(codigo_articulo)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| {
            AppError::NotFound("Inventario no encontrado para el artículo".to_string())
        })?;

        Ok(almacen)
    }

    /// Create a stock row for an existing article
    pub async fn create(&self, input: CreateAlmacenInput) -> AppResult<Almacen> {
        input.validate()?;
        if !stock_bounds_validos(input.stock_minimo, input.stock_maximo) {
            return Err(bounds_error());
        }

        let articulo_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM articulos WHERE codigo = $1)",
        )
        .bind(&input.codigo_articulo)
        .fetch_one(&self.db)
        .await?;

        if !articulo_exists {
            return Err(AppError::NotFound("Artículo no encontrado".to_string()));
        }

        let existing = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM almacen WHERE codigo_articulo = $1)",
        )
        .bind(&input.codigo_articulo)
        .fetch_one(&self.db)
        .await?;

        if existing {
            return Err(AppError::Conflict(
                "El artículo ya cuenta con inventario registrado".to_string(),
            ));
        }

        let almacen = sqlx::query_as::<_, Almacen>(
            r#"
            INSERT INTO almacen (codigo_articulo, cantidad, stock_minimo, stock_maximo, ubicacion)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING almacen_id, codigo_articulo, cantidad, stock_minimo, stock_maximo,
                      ubicacion, ultima_actualizacion
            "#,
        )
        .bind(&input.codigo_articulo)
        .bind(input.cantidad)
        .bind(input.stock_minimo.unwrap_or(STOCK_MINIMO_DEFAULT))
        .bind(input.stock_maximo.unwrap_or(STOCK_MAXIMO_DEFAULT))
        .bind(limpiar_opcional(input.ubicacion))
        .fetch_one(&self.db)
        .await?;

        Ok(almacen)
    }

    /// Update a stock row; fields not supplied keep their current value
    pub async fn update(
        &self,
        codigo_articulo: &str,
        input: UpdateAlmacenInput,
    ) -> AppResult<Almacen> {
        input.validate()?;
        if !stock_bounds_validos(input.stock_minimo, input.stock_maximo) {
            return Err(bounds_error());
        }

        let existing = self.get_by_codigo_articulo(codigo_articulo).await?;

        let cantidad = input.cantidad.unwrap_or(existing.cantidad);
        let stock_minimo = input.stock_minimo.unwrap_or(existing.stock_minimo);
        let stock_maximo = input.stock_maximo.unwrap_or(existing.stock_maximo);
        let ubicacion = match input.ubicacion {
            Some(valor) => limpiar_opcional(Some(valor)),
            None => existing.ubicacion,
        };

        let almacen = sqlx::query_as::<_, Almacen>(
            r#"
            UPDATE almacen
            SET cantidad = $1, stock_minimo = $2, stock_maximo = $3, ubicacion = $4,
                ultima_actualizacion = NOW()
            WHERE codigo_articulo = $5
            RETURNING almacen_id, codigo_articulo, cantidad, stock_minimo, stock_maximo,
                      ubicacion, ultima_actualizacion
            "#,
        )
        .bind(cantidad)
        .bind(stock_minimo)
        .bind(stock_maximo)
        .bind(ubicacion)
        .bind(codigo_articulo)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| {
            AppError::NotFound("Inventario no encontrado para el artículo".to_string())
        })?;

        Ok(almacen)
    }

    /// Remove the stock row for an article
    pub async fn delete(&self, codigo_articulo: &str) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM almacen WHERE codigo_articulo = $1")
            .bind(codigo_articulo)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(
                "Inventario no encontrado para el artículo".to_string(),
            ));
        }

        Ok(())
    }

    /// Apply a signed adjustment to an article's stock quantity
    ///
    /// The non-negative guard runs inside the UPDATE itself, so two
    /// concurrent adjustments on the same article cannot race past the
    /// check: the row either ends at cantidad + delta >= 0 or is untouched.
    pub async fn ajustar_inventario(&self, input: AjusteInventarioInput) -> AppResult<Almacen> {
        input.validate()?;

        let articulo_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM articulos WHERE codigo = $1)",
        )
        .bind(&input.codigo_articulo)
        .fetch_one(&self.db)
        .await?;

        if !articulo_exists {
            return Err(AppError::NotFound("Artículo no encontrado".to_string()));
        }

        let ajustado = sqlx::query_as::<_, Almacen>(
            r#"
            UPDATE almacen
            SET cantidad = cantidad + $1, ultima_actualizacion = NOW()
            WHERE codigo_articulo = $2 AND cantidad + $1 >= 0
            RETURNING almacen_id, codigo_articulo, cantidad, stock_minimo, stock_maximo,
                      ubicacion, ultima_actualizacion
            "#,
        )
        .bind(input.cantidad)
        .bind(&input.codigo_articulo)
        .fetch_optional(&self.db)
        .await?;

        match ajustado {
            Some(almacen) => {
                tracing::info!(
                    codigo = %almacen.codigo_articulo,
                    ajuste = input.cantidad,
                    motivo = %input.motivo,
                    cantidad = almacen.cantidad,
                    "Inventario ajustado"
                );
                Ok(almacen)
            }
            None => {
                let existe = sqlx::query_scalar::<_, bool>(
                    "SELECT EXISTS(SELECT 1 FROM almacen WHERE codigo_articulo = $1)",
                )
                .bind(&input.codigo_articulo)
                .fetch_one(&self.db)
                .await?;

                if existe {
                    Err(AppError::InsufficientStock(
                        "El ajuste dejaría la existencia en negativo".to_string(),
                    ))
                } else {
                    Err(AppError::NotFound(
                        "Inventario no encontrado para el artículo".to_string(),
                    ))
                }
            }
        }
    }

    /// Stock alerts classified by the v_inventario_alertas view
    pub async fn alertas(&self) -> AppResult<Vec<AlertaInventario>> {
        let rows = sqlx::query_as::<_, AlertaRow>(
            r#"
            SELECT codigo, descripcion, cantidad, stock_minimo, estado_stock
            FROM v_inventario_alertas
            ORDER BY codigo
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        rows.into_iter()
            .map(|r| {
                let estado_stock = r.estado_stock.parse::<EstadoStock>().map_err(|_| {
                    AppError::Internal(format!(
                        "Estado de stock desconocido en la vista: {}",
                        r.estado_stock
                    ))
                })?;
                Ok(AlertaInventario {
                    codigo: r.codigo,
                    descripcion: r.descripcion,
                    cantidad: r.cantidad,
                    stock_minimo: r.stock_minimo,
                    estado_stock,
                })
            })
            .collect()
    }
}
