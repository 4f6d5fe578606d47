//! Purchase service: supplier orders, line edits and stock reception

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use validator::Validate;

use shared::types::iva_de;
use shared::validation::limpiar_opcional;

use crate::error::{AppError, AppResult};

/// Purchase service owning the compras and detalle_compra tables
#[derive(Clone)]
pub struct CompraService {
    db: PgPool,
}

/// Lifecycle state of a purchase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "estado_compra", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EstadoCompra {
    Pendiente,
    Recibida,
    Cancelada,
}

impl EstadoCompra {
    /// Whether a purchase may move from this state to another
    pub fn puede_transicionar(self, destino: EstadoCompra) -> bool {
        matches!(
            (self, destino),
            (EstadoCompra::Pendiente, EstadoCompra::Recibida)
                | (EstadoCompra::Pendiente, EstadoCompra::Cancelada)
        )
    }

    /// Whether the purchase's lines may still be edited
    pub fn admite_edicion(self) -> bool {
        self == EstadoCompra::Pendiente
    }
}

/// Purchase header
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Compra {
    pub folio_compra: i32,
    pub fecha: DateTime<Utc>,
    pub proveedor_id: i32,
    pub usuario_id: i32,
    pub subtotal: Decimal,
    pub iva: Decimal,
    pub total: Decimal,
    pub estado: EstadoCompra,
    pub fecha_recepcion: Option<DateTime<Utc>>,
    pub notas: Option<String>,
}

/// Purchase line; the subtotal is generated by the storage layer
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DetalleCompra {
    pub folio_detalle: i32,
    pub folio_compra: i32,
    pub codigo_articulo: String,
    pub cantidad: i32,
    pub costo_unitario: Decimal,
    pub subtotal: Decimal,
}

/// Purchase header together with its lines
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompraConDetalles {
    #[serde(flatten)]
    pub compra: Compra,
    pub detalles: Vec<DetalleCompra>,
}

/// Line item for a purchase
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DetalleCompraInput {
    #[validate(length(min = 1, max = 50, message = "El código del artículo es requerido"))]
    pub codigo_articulo: String,
    #[validate(custom = "shared::validation::validar_cantidad_positiva")]
    pub cantidad: i32,
    #[validate(custom = "shared::validation::validar_precio")]
    pub costo_unitario: Decimal,
}

/// Input for registering a purchase order
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCompraInput {
    pub proveedor_id: i32,
    pub usuario_id: i32,
    #[validate(length(max = 500, message = "Las notas admiten máximo 500 caracteres"))]
    pub notas: Option<String>,
    #[serde(default)]
    pub detalles: Vec<DetalleCompraInput>,
}

/// Input for amending a purchase: state transition and/or notes
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCompraInput {
    pub estado: Option<EstadoCompra>,
    #[validate(length(max = 500, message = "Las notas admiten máximo 500 caracteres"))]
    pub notas: Option<String>,
}

const SELECT_COMPRA: &str = "SELECT folio_compra, fecha, proveedor_id, usuario_id, subtotal, \
     iva, total, estado, fecha_recepcion, notas FROM compras";

const RETURNING_COMPRA: &str = "RETURNING folio_compra, fecha, proveedor_id, usuario_id, \
     subtotal, iva, total, estado, fecha_recepcion, notas";

const SELECT_DETALLE: &str = "SELECT folio_detalle, folio_compra, codigo_articulo, cantidad, \
     costo_unitario, subtotal FROM detalle_compra";

impl CompraService {
    /// Create a new CompraService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List purchase headers, newest first
    pub async fn list(&self) -> AppResult<Vec<Compra>> {
        let compras = sqlx::query_as::<_, Compra>(&format!("{SELECT_COMPRA} ORDER BY fecha DESC"))
            .fetch_all(&self.db)
            .await?;

        Ok(compras)
    }

    /// Get a purchase with its lines
    pub async fn get_by_folio(&self, folio_compra: i32) -> AppResult<CompraConDetalles> {
        let compra = sqlx::query_as::<_, Compra>(&format!(
            "{SELECT_COMPRA} WHERE folio_compra = $1"
        ))
        .bind(folio_compra)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Compra no encontrada".to_string()))?;

        let detalles = sqlx::query_as::<_, DetalleCompra>(&format!(
            "{SELECT_DETALLE} WHERE folio_compra = $1 ORDER BY folio_detalle"
        ))
        .bind(folio_compra)
        .fetch_all(&self.db)
        .await?;

        Ok(CompraConDetalles { compra, detalles })
    }

    /// Register a purchase order as pendiente; stock moves on reception
    pub async fn create(&self, input: CreateCompraInput) -> AppResult<CompraConDetalles> {
        input.validate()?;
        for linea in &input.detalles {
            linea.validate()?;
        }

        let subtotal: Decimal = input
            .detalles
            .iter()
            .map(|d| Decimal::from(d.cantidad) * d.costo_unitario)
            .sum();
        let iva = iva_de(subtotal);
        let total = subtotal + iva;

        let mut tx = self.db.begin().await?;

        let compra = sqlx::query_as::<_, Compra>(&format!(
            "INSERT INTO compras (proveedor_id, usuario_id, subtotal, iva, total, estado, notas) \
             VALUES ($1, $2, $3, $4, $5, 'pendiente', $6) {RETURNING_COMPRA}"
        ))
        .bind(input.proveedor_id)
        .bind(input.usuario_id)
        .bind(subtotal)
        .bind(iva)
        .bind(total)
        .bind(limpiar_opcional(input.notas))
        .fetch_one(&mut *tx)
        .await?;

        let mut detalles = Vec::with_capacity(input.detalles.len());
        for linea in &input.detalles {
            let detalle = sqlx::query_as::<_, DetalleCompra>(
                r#"
                INSERT INTO detalle_compra (folio_compra, codigo_articulo, cantidad, costo_unitario)
                VALUES ($1, $2, $3, $4)
                RETURNING folio_detalle, folio_compra, codigo_articulo, cantidad, costo_unitario,
                          subtotal
                "#,
            )
            .bind(compra.folio_compra)
            .bind(&linea.codigo_articulo)
            .bind(linea.cantidad)
            .bind(linea.costo_unitario)
            .fetch_one(&mut *tx)
            .await?;

            detalles.push(detalle);
        }

        tx.commit().await?;

        tracing::info!(folio = compra.folio_compra, total = %compra.total, "Compra registrada");

        Ok(CompraConDetalles { compra, detalles })
    }

    /// Amend a purchase: update notes and/or apply a state transition;
    /// reception stamps the date and raises stock
    pub async fn update(&self, folio_compra: i32, input: UpdateCompraInput) -> AppResult<Compra> {
        input.validate()?;

        let actual = self.get_by_folio(folio_compra).await?;

        if let Some(destino) = input.estado {
            if !actual.compra.estado.puede_transicionar(destino) {
                return Err(AppError::InvalidStateTransition(format!(
                    "Una compra {:?} no puede pasar a {:?}",
                    actual.compra.estado, destino
                )));
            }
        }

        // The note change and the transition commit or roll back together.
        let mut tx = self.db.begin().await?;

        if let Some(notas) = input.notas {
            sqlx::query("UPDATE compras SET notas = $1 WHERE folio_compra = $2")
                .bind(limpiar_opcional(Some(notas)))
                .bind(folio_compra)
                .execute(&mut *tx)
                .await?;
        }

        let compra = match input.estado {
            Some(EstadoCompra::Recibida) => Self::recibir_en(&mut tx, &actual).await?,
            Some(EstadoCompra::Cancelada) => Self::cancelar_en(&mut tx, folio_compra).await?,
            _ => {
                sqlx::query_as::<_, Compra>(&format!(
                    "{SELECT_COMPRA} WHERE folio_compra = $1"
                ))
                .bind(folio_compra)
                .fetch_one(&mut *tx)
                .await?
            }
        };

        tx.commit().await?;

        Ok(compra)
    }

    /// Cancel a pending purchase
    pub async fn cancelar(&self, folio_compra: i32) -> AppResult<()> {
        let actual = self.get_by_folio(folio_compra).await?;

        if !actual.compra.estado.puede_transicionar(EstadoCompra::Cancelada) {
            return Err(AppError::InvalidStateTransition(
                "La compra ya no está pendiente".to_string(),
            ));
        }

        let mut tx = self.db.begin().await?;
        Self::cancelar_en(&mut tx, folio_compra).await?;
        tx.commit().await?;

        Ok(())
    }

    async fn cancelar_en(
        tx: &mut Transaction<'_, Postgres>,
        folio_compra: i32,
    ) -> AppResult<Compra> {
        let compra = sqlx::query_as::<_, Compra>(&format!(
            "UPDATE compras SET estado = 'cancelada' \
             WHERE folio_compra = $1 AND estado = 'pendiente' {RETURNING_COMPRA}"
        ))
        .bind(folio_compra)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| {
            AppError::InvalidStateTransition("La compra ya no está pendiente".to_string())
        })?;

        tracing::info!(folio = compra.folio_compra, "Compra cancelada");

        Ok(compra)
    }

    async fn recibir_en(
        tx: &mut Transaction<'_, Postgres>,
        actual: &CompraConDetalles,
    ) -> AppResult<Compra> {
        let compra = sqlx::query_as::<_, Compra>(&format!(
            "UPDATE compras SET estado = 'recibida', fecha_recepcion = NOW() \
             WHERE folio_compra = $1 AND estado = 'pendiente' {RETURNING_COMPRA}"
        ))
        .bind(actual.compra.folio_compra)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| {
            AppError::InvalidStateTransition("La compra ya no está pendiente".to_string())
        })?;

        for detalle in &actual.detalles {
            sqlx::query(
                "UPDATE almacen SET cantidad = cantidad + $1, ultima_actualizacion = NOW() \
                 WHERE codigo_articulo = $2",
            )
            .bind(detalle.cantidad)
            .bind(&detalle.codigo_articulo)
            .execute(&mut **tx)
            .await?;
        }

        tracing::info!(folio = compra.folio_compra, "Compra recibida");

        Ok(compra)
    }

    /// Append a line to a pending purchase
    pub async fn agregar_detalle(
        &self,
        folio_compra: i32,
        input: DetalleCompraInput,
    ) -> AppResult<DetalleCompra> {
        input.validate()?;

        let actual = self.get_by_folio(folio_compra).await?;
        if !actual.compra.estado.admite_edicion() {
            return Err(AppError::Conflict(
                "Solo se pueden modificar los detalles de una compra pendiente".to_string(),
            ));
        }

        let mut tx = self.db.begin().await?;

        let detalle = sqlx::query_as::<_, DetalleCompra>(
            r#"
            INSERT INTO detalle_compra (folio_compra, codigo_articulo, cantidad, costo_unitario)
            VALUES ($1, $2, $3, $4)
            RETURNING folio_detalle, folio_compra, codigo_articulo, cantidad, costo_unitario,
                      subtotal
            "#,
        )
        .bind(folio_compra)
        .bind(&input.codigo_articulo)
        .bind(input.cantidad)
        .bind(input.costo_unitario)
        .fetch_one(&mut *tx)
        .await?;

        Self::recalcular_totales(&mut tx, folio_compra).await?;

        tx.commit().await?;

        Ok(detalle)
    }

    /// Remove a line from a pending purchase
    pub async fn eliminar_detalle(&self, folio_compra: i32, folio_detalle: i32) -> AppResult<()> {
        let actual = self.get_by_folio(folio_compra).await?;
        if !actual.compra.estado.admite_edicion() {
            return Err(AppError::Conflict(
                "Solo se pueden modificar los detalles de una compra pendiente".to_string(),
            ));
        }

        let mut tx = self.db.begin().await?;

        let result = sqlx::query(
            "DELETE FROM detalle_compra WHERE folio_compra = $1 AND folio_detalle = $2",
        )
        .bind(folio_compra)
        .bind(folio_detalle)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(
                "Detalle de compra no encontrado".to_string(),
            ));
        }

        Self::recalcular_totales(&mut tx, folio_compra).await?;

        tx.commit().await?;

        Ok(())
    }

    async fn recalcular_totales(
        tx: &mut Transaction<'_, Postgres>,
        folio_compra: i32,
    ) -> AppResult<()> {
        let subtotal = sqlx::query_scalar::<_, Decimal>(
            "SELECT COALESCE(SUM(subtotal), 0) FROM detalle_compra WHERE folio_compra = $1",
        )
        .bind(folio_compra)
        .fetch_one(&mut **tx)
        .await?;

        let iva = iva_de(subtotal);

        sqlx::query(
            "UPDATE compras SET subtotal = $1, iva = $2, total = $3 WHERE folio_compra = $4",
        )
        .bind(subtotal)
        .bind(iva)
        .bind(subtotal + iva)
        .bind(folio_compra)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pendiente_puede_recibirse_o_cancelarse() {
        assert!(EstadoCompra::Pendiente.puede_transicionar(EstadoCompra::Recibida));
        assert!(EstadoCompra::Pendiente.puede_transicionar(EstadoCompra::Cancelada));
        assert!(!EstadoCompra::Pendiente.puede_transicionar(EstadoCompra::Pendiente));
    }

    #[test]
    fn recibida_y_cancelada_son_terminales() {
        for estado in [EstadoCompra::Recibida, EstadoCompra::Cancelada] {
            for destino in [
                EstadoCompra::Pendiente,
                EstadoCompra::Recibida,
                EstadoCompra::Cancelada,
            ] {
                assert!(!estado.puede_transicionar(destino));
            }
        }
    }

    #[test]
    fn solo_pendiente_admite_edicion() {
        assert!(EstadoCompra::Pendiente.admite_edicion());
        assert!(!EstadoCompra::Recibida.admite_edicion());
        assert!(!EstadoCompra::Cancelada.admite_edicion());
    }
}
