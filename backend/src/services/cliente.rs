//! Client service with loyalty point accounting

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use validator::Validate;

use shared::types::{descuento_disponible, descuentos_disponibles};
use shared::validation::limpiar_opcional;

use crate::error::{AppError, AppResult};

/// Client service owning the clientes table
#[derive(Clone)]
pub struct ClienteService {
    db: PgPool,
}

/// Registered client
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Cliente {
    pub cliente_id: i32,
    pub usuario_id: Option<i32>,
    pub nombre_completo: String,
    pub rfc: Option<String>,
    pub direccion: Option<String>,
    pub telefono: Option<String>,
    pub puntos_acumulados: i32,
    pub total_gastado: Decimal,
    pub activo: bool,
    pub fecha_registro: DateTime<Utc>,
}

/// Loyalty summary derived from the client's accumulated points
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumenPuntos {
    #[serde(flatten)]
    pub cliente: Cliente,
    pub descuentos_disponibles: i32,
    pub descuento_disponible: bool,
}

/// Input for registering a client
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateClienteInput {
    pub usuario_id: Option<i32>,
    #[validate(length(min = 3, max = 200, message = "El nombre completo es requerido"))]
    pub nombre_completo: String,
    #[validate(custom = "shared::validation::validar_rfc")]
    pub rfc: Option<String>,
    #[validate(length(max = 300, message = "La dirección admite máximo 300 caracteres"))]
    pub direccion: Option<String>,
    #[validate(length(max = 20, message = "El teléfono admite máximo 20 caracteres"))]
    pub telefono: Option<String>,
}

/// Input for updating a client; omitted fields stay unchanged
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClienteInput {
    #[validate(length(min = 3, max = 200, message = "El nombre completo es requerido"))]
    pub nombre_completo: Option<String>,
    #[validate(custom = "shared::validation::validar_rfc")]
    pub rfc: Option<String>,
    #[validate(length(max = 300, message = "La dirección admite máximo 300 caracteres"))]
    pub direccion: Option<String>,
    #[validate(length(max = 20, message = "El teléfono admite máximo 20 caracteres"))]
    pub telefono: Option<String>,
    pub activo: Option<bool>,
}

const SELECT_CLIENTE: &str = "SELECT cliente_id, usuario_id, nombre_completo, rfc, direccion, \
     telefono, puntos_acumulados, total_gastado, activo, fecha_registro FROM clientes";

impl ClienteService {
    /// Create a new ClienteService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List clients, active only unless include_inactivos is set
    pub async fn list(&self, include_inactivos: bool) -> AppResult<Vec<Cliente>> {
        let filtro = if include_inactivos { "" } else { " WHERE activo = TRUE" };
        let clientes = sqlx::query_as::<_, Cliente>(&format!(
            "{SELECT_CLIENTE}{filtro} ORDER BY nombre_completo"
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(clientes)
    }

    /// Get a client by id, regardless of its active flag
    pub async fn get_by_id(&self, cliente_id: i32) -> AppResult<Cliente> {
        let cliente = sqlx::query_as::<_, Cliente>(&format!(
            "{SELECT_CLIENTE} WHERE cliente_id = $1"
        ))
        .bind(cliente_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Cliente no encontrado".to_string()))?;

        Ok(cliente)
    }

    /// Register a client; an RFC, when given, must not be in use by any record
    pub async fn create(&self, input: CreateClienteInput) -> AppResult<Cliente> {
        input.validate()?;

        let rfc = limpiar_opcional(input.rfc).map(|r| r.to_uppercase());

        if let Some(ref rfc) = rfc {
            let rfc_en_uso = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM clientes WHERE rfc = $1)",
            )
            .bind(rfc)
            .fetch_one(&self.db)
            .await?;

            if rfc_en_uso {
                return Err(AppError::DuplicateEntry(
                    "El RFC ya está registrado".to_string(),
                ));
            }
        }

        let cliente = sqlx::query_as::<_, Cliente>(
            r#"
            INSERT INTO clientes (usuario_id, nombre_completo, rfc, direccion, telefono)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING cliente_id, usuario_id, nombre_completo, rfc, direccion, telefono,
                      puntos_acumulados, total_gastado, activo, fecha_registro
            "#,
        )
        .bind(input.usuario_id)
        .bind(&input.nombre_completo)
        .bind(&rfc)
        .bind(limpiar_opcional(input.direccion))
        .bind(limpiar_opcional(input.telefono))
        .fetch_one(&self.db)
        .await?;

        tracing::info!(cliente_id = cliente.cliente_id, "Cliente registrado");

        Ok(cliente)
    }

    /// Update a client; a new RFC may not belong to a different client
    pub async fn update(&self, cliente_id: i32, input: UpdateClienteInput) -> AppResult<Cliente> {
        input.validate()?;

        let existing = self.get_by_id(cliente_id).await?;

        let rfc = match input.rfc {
            Some(valor) => match limpiar_opcional(Some(valor)) {
                Some(rfc) => {
                    let rfc = rfc.to_uppercase();
                    let dueno = sqlx::query_scalar::<_, Option<i32>>(
                        "SELECT MIN(cliente_id) FROM clientes WHERE rfc = $1",
                    )
                    .bind(&rfc)
                    .fetch_one(&self.db)
                    .await?;
                    if matches!(dueno, Some(id) if id != cliente_id) {
                        return Err(AppError::DuplicateEntry(
                            "El RFC ya está registrado".to_string(),
                        ));
                    }
                    Some(rfc)
                }
                None => None,
            },
            None => existing.rfc,
        };

        let nombre_completo = input.nombre_completo.unwrap_or(existing.nombre_completo);
        let direccion = match input.direccion {
            Some(valor) => limpiar_opcional(Some(valor)),
            None => existing.direccion,
        };
        let telefono = match input.telefono {
            Some(valor) => limpiar_opcional(Some(valor)),
            None => existing.telefono,
        };
        let activo = input.activo.unwrap_or(existing.activo);

        let cliente = sqlx::query_as::<_, Cliente>(
            r#"
            UPDATE clientes
            SET nombre_completo = $1, rfc = $2, direccion = $3, telefono = $4, activo = $5
            WHERE cliente_id = $6
            RETURNING cliente_id, usuario_id, nombre_completo, rfc, direccion, telefono,
                      puntos_acumulados, total_gastado, activo, fecha_registro
            "#,
        )
        .bind(nombre_completo)
        .bind(rfc)
        .bind(direccion)
        .bind(telefono)
        .bind(activo)
        .bind(cliente_id)
        .fetch_one(&self.db)
        .await?;

        Ok(cliente)
    }

    /// Soft-delete a client by clearing its active flag
    pub async fn delete(&self, cliente_id: i32) -> AppResult<()> {
        let result = sqlx::query("UPDATE clientes SET activo = FALSE WHERE cliente_id = $1")
            .bind(cliente_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Cliente no encontrado".to_string()));
        }

        Ok(())
    }

    /// Loyalty summary for a client
    pub async fn resumen_puntos(&self, cliente_id: i32) -> AppResult<ResumenPuntos> {
        let cliente = self.get_by_id(cliente_id).await?;
        let puntos = cliente.puntos_acumulados;

        Ok(ResumenPuntos {
            cliente,
            descuentos_disponibles: descuentos_disponibles(puntos),
            descuento_disponible: descuento_disponible(puntos),
        })
    }
}
