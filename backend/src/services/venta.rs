//! Sales service: transactional capture, stock discount and loyalty accrual

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use validator::Validate;

use shared::types::puntos_por_total;
use shared::validation::limpiar_opcional;

use crate::error::{AppError, AppResult};

/// Sales service owning the ventas and detalle_venta tables
#[derive(Clone)]
pub struct VentaService {
    db: PgPool,
}

/// Lifecycle state of a sale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "estado_venta", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EstadoVenta {
    Completada,
    Cancelada,
}

impl EstadoVenta {
    /// Whether a sale may move from this state to another
    pub fn puede_transicionar(self, destino: EstadoVenta) -> bool {
        matches!(
            (self, destino),
            (EstadoVenta::Completada, EstadoVenta::Cancelada)
        )
    }
}

/// Sale header
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Venta {
    pub folio: i32,
    pub fecha: DateTime<Utc>,
    pub cliente_id: Option<i32>,
    pub usuario_id: i32,
    pub subtotal: Decimal,
    pub descuento: Decimal,
    pub total: Decimal,
    pub puntos_usados: i32,
    pub puntos_generados: i32,
    pub estado: EstadoVenta,
    pub notas: Option<String>,
}

/// Sale line; subtotal and total are generated by the storage layer
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DetalleVenta {
    pub folio_detalle: i32,
    pub folio_venta: i32,
    pub codigo_articulo: String,
    pub cantidad: i32,
    pub precio_unitario: Decimal,
    pub descuento_unitario: Decimal,
    pub subtotal: Decimal,
    pub total: Decimal,
}

/// Sale header together with its lines
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VentaConDetalles {
    #[serde(flatten)]
    pub venta: Venta,
    pub detalles: Vec<DetalleVenta>,
}

/// Line item for a new sale
#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DetalleVentaInput {
    #[validate(length(min = 1, max = 50, message = "El código del artículo es requerido"))]
    pub codigo_articulo: String,
    #[validate(custom = "shared::validation::validar_cantidad_positiva")]
    pub cantidad: i32,
    #[validate(custom = "shared::validation::validar_precio")]
    pub precio_unitario: Decimal,
    #[validate(custom = "shared::validation::validar_monto_no_negativo")]
    pub descuento_unitario: Option<Decimal>,
}

/// Input for capturing a sale
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateVentaInput {
    pub cliente_id: Option<i32>,
    pub usuario_id: i32,
    #[validate(custom = "shared::validation::validar_monto_no_negativo")]
    pub descuento: Option<Decimal>,
    #[validate(range(min = 0, message = "Los puntos usados deben ser mayores o iguales a 0"))]
    pub puntos_usados: Option<i32>,
    #[validate(length(max = 500, message = "Las notas admiten máximo 500 caracteres"))]
    pub notas: Option<String>,
    #[validate(length(min = 1, message = "La venta requiere al menos un detalle"))]
    pub detalles: Vec<DetalleVentaInput>,
}

/// Input for amending a sale: state transition and/or notes
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVentaInput {
    pub estado: Option<EstadoVenta>,
    #[validate(length(max = 500, message = "Las notas admiten máximo 500 caracteres"))]
    pub notas: Option<String>,
}

const SELECT_VENTA: &str = "SELECT folio, fecha, cliente_id, usuario_id, subtotal, descuento, \
     total, puntos_usados, puntos_generados, estado, notas FROM ventas";

const RETURNING_VENTA: &str = "RETURNING folio, fecha, cliente_id, usuario_id, subtotal, \
     descuento, total, puntos_usados, puntos_generados, estado, notas";

const SELECT_DETALLE: &str = "SELECT folio_detalle, folio_venta, codigo_articulo, cantidad, \
     precio_unitario, descuento_unitario, subtotal, total FROM detalle_venta";

impl VentaService {
    /// Create a new VentaService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List sale headers, newest first
    pub async fn list(&self) -> AppResult<Vec<Venta>> {
        let ventas = sqlx::query_as::<_, Venta>(&format!("{SELECT_VENTA} ORDER BY fecha DESC"))
            .fetch_all(&self.db)
            .await?;

        Ok(ventas)
    }

    /// Get a sale with its lines
    pub async fn get_by_folio(&self, folio: i32) -> AppResult<VentaConDetalles> {
        let venta = sqlx::query_as::<_, Venta>(&format!("{SELECT_VENTA} WHERE folio = $1"))
            .bind(folio)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Venta no encontrada".to_string()))?;

        let detalles = sqlx::query_as::<_, DetalleVenta>(&format!(
            "{SELECT_DETALLE} WHERE folio_venta = $1 ORDER BY folio_detalle"
        ))
        .bind(folio)
        .fetch_all(&self.db)
        .await?;

        Ok(VentaConDetalles { venta, detalles })
    }

    /// Capture a sale: header, lines, stock discount and loyalty bookkeeping
    /// run in one transaction
    pub async fn create(&self, input: CreateVentaInput) -> AppResult<VentaConDetalles> {
        input.validate()?;
        for linea in &input.detalles {
            linea.validate()?;
            let descuento = linea.descuento_unitario.unwrap_or(Decimal::ZERO);
            if descuento > linea.precio_unitario {
                return Err(AppError::ValidationError(
                    "El descuento unitario no puede exceder el precio".to_string(),
                ));
            }
        }

        let subtotal: Decimal = input
            .detalles
            .iter()
            .map(|d| {
                let descuento = d.descuento_unitario.unwrap_or(Decimal::ZERO);
                Decimal::from(d.cantidad) * (d.precio_unitario - descuento)
            })
            .sum();

        let descuento = input.descuento.unwrap_or(Decimal::ZERO);
        if descuento > subtotal {
            return Err(AppError::ValidationError(
                "El descuento no puede exceder el subtotal".to_string(),
            ));
        }
        let total = subtotal - descuento;

        let puntos_usados = input.puntos_usados.unwrap_or(0);
        if puntos_usados > 0 && input.cliente_id.is_none() {
            return Err(AppError::ValidationError(
                "No se pueden usar puntos sin cliente".to_string(),
            ));
        }

        let puntos_generados = if input.cliente_id.is_some() {
            puntos_por_total(total)
        } else {
            0
        };

        let mut tx = self.db.begin().await?;

        if let Some(cliente_id) = input.cliente_id {
            if puntos_usados > 0 {
                // The conditional guard keeps the balance from going negative
                // even under concurrent redemptions.
                let descontado = sqlx::query(
                    "UPDATE clientes SET puntos_acumulados = puntos_acumulados - $1 \
                     WHERE cliente_id = $2 AND puntos_acumulados >= $1",
                )
                .bind(puntos_usados)
                .bind(cliente_id)
                .execute(&mut *tx)
                .await?;

                if descontado.rows_affected() == 0 {
                    return Err(AppError::ValidationError(
                        "El cliente no cuenta con puntos suficientes".to_string(),
                    ));
                }
            }
        }

        let venta = sqlx::query_as::<_, Venta>(&format!(
            "INSERT INTO ventas (cliente_id, usuario_id, subtotal, descuento, total, \
             puntos_usados, puntos_generados, estado, notas) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, 'completada', $8) {RETURNING_VENTA}"
        ))
        .bind(input.cliente_id)
        .bind(input.usuario_id)
        .bind(subtotal)
        .bind(descuento)
        .bind(total)
        .bind(puntos_usados)
        .bind(puntos_generados)
        .bind(limpiar_opcional(input.notas))
        .fetch_one(&mut *tx)
        .await?;

        let mut detalles = Vec::with_capacity(input.detalles.len());
        for linea in &input.detalles {
            // Same conditional-update guard as the manual adjustment: the
            // discount only lands if the stock covers the line.
            let descontado = sqlx::query(
                "UPDATE almacen SET cantidad = cantidad - $1, ultima_actualizacion = NOW() \
                 WHERE codigo_articulo = $2 AND cantidad - $1 >= 0",
            )
            .bind(linea.cantidad)
            .bind(&linea.codigo_articulo)
            .execute(&mut *tx)
            .await?;

            if descontado.rows_affected() == 0 {
                return Err(AppError::InsufficientStock(format!(
                    "Existencia insuficiente para el artículo {}",
                    linea.codigo_articulo
                )));
            }

            let detalle = sqlx::query_as::<_, DetalleVenta>(
                r#"
                INSERT INTO detalle_venta
                    (folio_venta, codigo_articulo, cantidad, precio_unitario, descuento_unitario)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING folio_detalle, folio_venta, codigo_articulo, cantidad,
                          precio_unitario, descuento_unitario, subtotal, total
                "#,
            )
            .bind(venta.folio)
            .bind(&linea.codigo_articulo)
            .bind(linea.cantidad)
            .bind(linea.precio_unitario)
            .bind(linea.descuento_unitario.unwrap_or(Decimal::ZERO))
            .fetch_one(&mut *tx)
            .await?;

            detalles.push(detalle);
        }

        if let Some(cliente_id) = venta.cliente_id {
            Self::abonar_cliente(&mut tx, cliente_id, puntos_generados, venta.total).await?;
        }

        tx.commit().await?;

        tracing::info!(folio = venta.folio, total = %venta.total, "Venta registrada");

        Ok(VentaConDetalles { venta, detalles })
    }

    /// Amend a sale: update notes and/or apply a state transition
    pub async fn update(&self, folio: i32, input: UpdateVentaInput) -> AppResult<Venta> {
        input.validate()?;

        let actual = self.get_by_folio(folio).await?;

        if let Some(destino) = input.estado {
            if !actual.venta.estado.puede_transicionar(destino) {
                return Err(AppError::InvalidStateTransition(format!(
                    "Una venta {:?} no puede pasar a {:?}",
                    actual.venta.estado, destino
                )));
            }
        }

        // The note change and the transition commit or roll back together.
        let mut tx = self.db.begin().await?;

        if let Some(notas) = input.notas {
            sqlx::query("UPDATE ventas SET notas = $1 WHERE folio = $2")
                .bind(limpiar_opcional(Some(notas)))
                .bind(folio)
                .execute(&mut *tx)
                .await?;
        }

        let venta = match input.estado {
            Some(EstadoVenta::Cancelada) => Self::cancelar_en(&mut tx, &actual).await?,
            _ => {
                sqlx::query_as::<_, Venta>(&format!("{SELECT_VENTA} WHERE folio = $1"))
                    .bind(folio)
                    .fetch_one(&mut *tx)
                    .await?
            }
        };

        tx.commit().await?;

        Ok(venta)
    }

    /// Cancel a sale, restoring stock and reversing loyalty bookkeeping
    pub async fn cancelar(&self, folio: i32) -> AppResult<()> {
        let actual = self.get_by_folio(folio).await?;

        if !actual.venta.estado.puede_transicionar(EstadoVenta::Cancelada) {
            return Err(AppError::InvalidStateTransition(
                "La venta ya está cancelada".to_string(),
            ));
        }

        let mut tx = self.db.begin().await?;
        Self::cancelar_en(&mut tx, &actual).await?;
        tx.commit().await?;

        Ok(())
    }

    async fn cancelar_en(
        tx: &mut Transaction<'_, Postgres>,
        actual: &VentaConDetalles,
    ) -> AppResult<Venta> {
        let venta = sqlx::query_as::<_, Venta>(&format!(
            "UPDATE ventas SET estado = 'cancelada' \
             WHERE folio = $1 AND estado = 'completada' {RETURNING_VENTA}"
        ))
        .bind(actual.venta.folio)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| {
            AppError::InvalidStateTransition("La venta ya está cancelada".to_string())
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

        if let Some(cliente_id) = venta.cliente_id {
            // Reverse the loyalty bookkeeping; both columns clamp at zero.
            sqlx::query(
                "UPDATE clientes SET \
                 puntos_acumulados = GREATEST(puntos_acumulados + $1 - $2, 0), \
                 total_gastado = GREATEST(total_gastado - $3, 0) \
                 WHERE cliente_id = $4",
            )
            .bind(venta.puntos_usados)
            .bind(venta.puntos_generados)
            .bind(venta.total)
            .bind(cliente_id)
            .execute(&mut **tx)
            .await?;
        }

        tracing::info!(folio = venta.folio, "Venta cancelada");

        Ok(venta)
    }

    async fn abonar_cliente(
        tx: &mut Transaction<'_, Postgres>,
        cliente_id: i32,
        puntos: i32,
        total: Decimal,
    ) -> AppResult<()> {
        sqlx::query(
            "UPDATE clientes SET puntos_acumulados = puntos_acumulados + $1, \
             total_gastado = total_gastado + $2 WHERE cliente_id = $3",
        )
        .bind(puntos)
        .bind(total)
        .bind(cliente_id)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completada_solo_puede_cancelarse() {
        assert!(EstadoVenta::Completada.puede_transicionar(EstadoVenta::Cancelada));
        assert!(!EstadoVenta::Completada.puede_transicionar(EstadoVenta::Completada));
    }

    #[test]
    fn cancelada_es_terminal() {
        assert!(!EstadoVenta::Cancelada.puede_transicionar(EstadoVenta::Completada));
        assert!(!EstadoVenta::Cancelada.puede_transicionar(EstadoVenta::Cancelada));
    }
}
