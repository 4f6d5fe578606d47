//! Article catalog service

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use validator::Validate;

use shared::types::EstadoStock;
use shared::validation::limpiar_opcional;

use crate::error::{AppError, AppResult};
use crate::services::almacen::{STOCK_MAXIMO_DEFAULT, STOCK_MINIMO_DEFAULT};

/// Article service owning the articulos table
#[derive(Clone)]
pub struct ArticuloService {
    db: PgPool,
}

/// Catalog article
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Articulo {
    pub codigo: String,
    pub descripcion: String,
    pub precio: Decimal,
    pub costo: Decimal,
    pub categoria: Option<String>,
    pub unidad_medida: String,
    pub activo: bool,
    pub fecha_registro: DateTime<Utc>,
}

/// Article joined with its stock row, carrying the computed stock state
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticuloConInventario {
    #[serde(flatten)]
    pub articulo: Articulo,
    pub cantidad: i32,
    pub stock_minimo: i32,
    pub stock_maximo: i32,
    pub estado_stock: EstadoStock,
}

#[derive(Debug, FromRow)]
struct ArticuloInventarioRow {
    codigo: String,
    descripcion: String,
    precio: Decimal,
    costo: Decimal,
    categoria: Option<String>,
    unidad_medida: String,
    activo: bool,
    fecha_registro: DateTime<Utc>,
    cantidad: i32,
    stock_minimo: i32,
    stock_maximo: i32,
}

impl From<ArticuloInventarioRow> for ArticuloConInventario {
    fn from(r: ArticuloInventarioRow) -> Self {
        let estado_stock = EstadoStock::classify(r.cantidad, r.stock_minimo, r.stock_maximo);
        ArticuloConInventario {
            articulo: Articulo {
                codigo: r.codigo,
                descripcion: r.descripcion,
                precio: r.precio,
                costo: r.costo,
                categoria: r.categoria,
                unidad_medida: r.unidad_medida,
                activo: r.activo,
                fecha_registro: r.fecha_registro,
            },
            cantidad: r.cantidad,
            stock_minimo: r.stock_minimo,
            stock_maximo: r.stock_maximo,
            estado_stock,
        }
    }
}

/// Input for creating an article
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateArticuloInput {
    #[validate(length(min = 1, max = 50, message = "El código es requerido"))]
    pub codigo: String,
    #[validate(length(min = 1, max = 255, message = "La descripción es requerida"))]
    pub descripcion: String,
    #[validate(custom = "shared::validation::validar_precio")]
    pub precio: Decimal,
    #[validate(custom = "shared::validation::validar_monto_no_negativo")]
    pub costo: Option<Decimal>,
    #[validate(length(max = 100, message = "La categoría admite máximo 100 caracteres"))]
    pub categoria: Option<String>,
    #[validate(length(max = 20, message = "La unidad de medida admite máximo 20 caracteres"))]
    pub unidad_medida: Option<String>,
}

/// Input for updating an article; omitted fields stay unchanged
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateArticuloInput {
    #[validate(length(min = 1, max = 255, message = "La descripción es requerida"))]
    pub descripcion: Option<String>,
    #[validate(custom = "shared::validation::validar_precio")]
    pub precio: Option<Decimal>,
    #[validate(custom = "shared::validation::validar_monto_no_negativo")]
    pub costo: Option<Decimal>,
    #[validate(length(max = 100, message = "La categoría admite máximo 100 caracteres"))]
    pub categoria: Option<String>,
    #[validate(length(max = 20, message = "La unidad de medida admite máximo 20 caracteres"))]
    pub unidad_medida: Option<String>,
    pub activo: Option<bool>,
}

const SELECT_ARTICULO: &str = "SELECT codigo, descripcion, precio, costo, categoria, \
     unidad_medida, activo, fecha_registro FROM articulos";

// Listings hide soft-deleted rows unless asked; key lookups never filter.
fn sql_list(include_inactivos: bool) -> String {
    let filtro = if include_inactivos { "" } else { " WHERE activo = TRUE" };
    format!("{SELECT_ARTICULO}{filtro} ORDER BY codigo")
}

fn sql_get() -> String {
    format!("{SELECT_ARTICULO} WHERE codigo = $1")
}

fn sql_buscar(include_inactivos: bool) -> String {
    let filtro = if include_inactivos { "" } else { "activo = TRUE AND " };
    format!(
        "{SELECT_ARTICULO} WHERE {filtro}(codigo ILIKE $1 OR descripcion ILIKE $1) \
         ORDER BY codigo LIMIT 50"
    )
}

const SELECT_CON_INVENTARIO: &str = "SELECT a.codigo, a.descripcion, a.precio, a.costo, \
     a.categoria, a.unidad_medida, a.activo, a.fecha_registro, \
     al.cantidad, al.stock_minimo, al.stock_maximo \
     FROM articulos a INNER JOIN almacen al ON al.codigo_articulo = a.codigo";

impl ArticuloService {
    /// Create a new ArticuloService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List articles, active only unless include_inactivos is set
    pub async fn list(&self, include_inactivos: bool) -> AppResult<Vec<Articulo>> {
        let articulos = sqlx::query_as::<_, Articulo>(&sql_list(include_inactivos))
            .fetch_all(&self.db)
            .await?;

        Ok(articulos)
    }

    /// Get an article by code, regardless of its active flag
    pub async fn get_by_codigo(&self, codigo: &str) -> AppResult<Articulo> {
        let articulo = sqlx::query_as::<_, Articulo>(&sql_get())
            .bind(codigo)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Artículo no encontrado".to_string()))?;

        Ok(articulo)
    }

    /// List articles joined with their stock rows
    pub async fn list_con_inventario(
        &self,
        include_inactivos: bool,
    ) -> AppResult<Vec<ArticuloConInventario>> {
        let filtro = if include_inactivos { "" } else { " WHERE a.activo = TRUE" };
        let rows = sqlx::query_as::<_, ArticuloInventarioRow>(&format!(
            "{SELECT_CON_INVENTARIO}{filtro} ORDER BY a.codigo"
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(ArticuloConInventario::from).collect())
    }

    /// Get an article with its stock row, regardless of its active flag
    pub async fn get_con_inventario(&self, codigo: &str) -> AppResult<ArticuloConInventario> {
        let row = sqlx::query_as::<_, ArticuloInventarioRow>(&format!(
            "{SELECT_CON_INVENTARIO} WHERE a.codigo = $1"
        ))
        .bind(codigo)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Artículo no encontrado".to_string()))?;

        Ok(row.into())
    }

    /// Search articles by code or description, capped at 50 rows;
    /// active only unless include_inactivos is set
    pub async fn buscar(&self, termino: &str, include_inactivos: bool) -> AppResult<Vec<Articulo>> {
        let patron = format!("%{termino}%");
        let articulos = sqlx::query_as::<_, Articulo>(&sql_buscar(include_inactivos))
            .bind(patron)
            .fetch_all(&self.db)
            .await?;

        Ok(articulos)
    }

    /// Distinct categories across active articles
    pub async fn categorias(&self) -> AppResult<Vec<String>> {
        let categorias = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT categoria FROM articulos \
             WHERE categoria IS NOT NULL AND activo = TRUE ORDER BY categoria",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(categorias)
    }

    /// Create an article and its initial empty stock row in one transaction
    pub async fn create(&self, input: CreateArticuloInput) -> AppResult<Articulo> {
        input.validate()?;

        let existing = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM articulos WHERE codigo = $1)",
        )
        .bind(&input.codigo)
        .fetch_one(&self.db)
        .await?;

        if existing {
            return Err(AppError::DuplicateEntry(
                "El código del artículo ya está registrado".to_string(),
            ));
        }

        let mut tx = self.db.begin().await?;

        let articulo = sqlx::query_as::<_, Articulo>(
            r#"
            INSERT INTO articulos (codigo, descripcion, precio, costo, categoria, unidad_medida)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING codigo, descripcion, precio, costo, categoria, unidad_medida, activo,
                      fecha_registro
            "#,
        )
        .bind(&input.codigo)
        .bind(&input.descripcion)
        .bind(input.precio)
        .bind(input.costo.unwrap_or(Decimal::ZERO))
        .bind(limpiar_opcional(input.categoria))
        .bind(input.unidad_medida.unwrap_or_else(|| "PZA".to_string()))
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO almacen (codigo_articulo, cantidad, stock_minimo, stock_maximo) \
             VALUES ($1, 0, $2, $3)",
        )
        .bind(&articulo.codigo)
        .bind(STOCK_MINIMO_DEFAULT)
        .bind(STOCK_MAXIMO_DEFAULT)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(codigo = %articulo.codigo, "Artículo registrado");

        Ok(articulo)
    }

    /// Update an article; omitted fields keep their current value
    pub async fn update(&self, codigo: &str, input: UpdateArticuloInput) -> AppResult<Articulo> {
        input.validate()?;

        let existing = self.get_by_codigo(codigo).await?;

        let descripcion = input.descripcion.unwrap_or(existing.descripcion);
        let precio = input.precio.unwrap_or(existing.precio);
        let costo = input.costo.unwrap_or(existing.costo);
        let categoria = match input.categoria {
            Some(valor) => limpiar_opcional(Some(valor)),
            None => existing.categoria,
        };
        let unidad_medida = input.unidad_medida.unwrap_or(existing.unidad_medida);
        let activo = input.activo.unwrap_or(existing.activo);

        let articulo = sqlx::query_as::<_, Articulo>(
            r#"
            UPDATE articulos
            SET descripcion = $1, precio = $2, costo = $3, categoria = $4,
                unidad_medida = $5, activo = $6
            WHERE codigo = $7
            RETURNING codigo, descripcion, precio, costo, categoria, unidad_medida, activo,
                      fecha_registro
            "#,
        )
        .bind(descripcion)
        .bind(precio)
        .bind(costo)
        .bind(categoria)
        .bind(unidad_medida)
        .bind(activo)
        .bind(codigo)
        .fetch_one(&self.db)
        .await?;

        Ok(articulo)
    }

    /// Soft-delete an article by clearing its active flag
    pub async fn delete(&self, codigo: &str) -> AppResult<()> {
        let result = sqlx::query("UPDATE articulos SET activo = FALSE WHERE codigo = $1")
            .bind(codigo)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Artículo no encontrado".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listado_excluye_inactivos_por_defecto() {
        assert!(sql_list(false).contains("WHERE activo = TRUE"));
        assert!(!sql_list(true).contains("activo = TRUE"));
    }

    #[test]
    fn lectura_por_codigo_no_filtra_por_activo() {
        let sql = sql_get();
        assert!(sql.contains("WHERE codigo = $1"));
        assert!(!sql.contains("activo = TRUE"));
    }

    #[test]
    fn busqueda_respeta_include_inactivos() {
        assert!(sql_buscar(false).contains("activo = TRUE"));
        assert!(!sql_buscar(true).contains("activo = TRUE"));
        assert!(sql_buscar(true).contains("LIMIT 50"));
    }
}
