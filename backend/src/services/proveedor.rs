//! Supplier service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use validator::Validate;

use shared::validation::limpiar_opcional;

use crate::error::{AppError, AppResult};

/// Supplier service owning the proveedores table
#[derive(Clone)]
pub struct ProveedorService {
    db: PgPool,
}

/// Registered supplier
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Proveedor {
    pub proveedor_id: i32,
    pub nombre_empresa: String,
    pub rfc: Option<String>,
    pub contacto: Option<String>,
    pub email: Option<String>,
    pub telefono: Option<String>,
    pub direccion: Option<String>,
    pub activo: bool,
    pub fecha_registro: DateTime<Utc>,
}

/// Input for registering a supplier
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProveedorInput {
    #[validate(length(min = 1, max = 200, message = "El nombre de la empresa es requerido"))]
    pub nombre_empresa: String,
    #[validate(custom = "shared::validation::validar_rfc")]
    pub rfc: Option<String>,
    #[validate(length(max = 100, message = "El contacto admite máximo 100 caracteres"))]
    pub contacto: Option<String>,
    #[validate(email(message = "El email no es válido"))]
    pub email: Option<String>,
    #[validate(length(max = 20, message = "El teléfono admite máximo 20 caracteres"))]
    pub telefono: Option<String>,
    #[validate(length(max = 300, message = "La dirección admite máximo 300 caracteres"))]
    pub direccion: Option<String>,
}

/// Input for updating a supplier; omitted fields stay unchanged
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProveedorInput {
    #[validate(length(min = 1, max = 200, message = "El nombre de la empresa es requerido"))]
    pub nombre_empresa: Option<String>,
    #[validate(custom = "shared::validation::validar_rfc")]
    pub rfc: Option<String>,
    #[validate(length(max = 100, message = "El contacto admite máximo 100 caracteres"))]
    pub contacto: Option<String>,
    #[validate(email(message = "El email no es válido"))]
    pub email: Option<String>,
    #[validate(length(max = 20, message = "El teléfono admite máximo 20 caracteres"))]
    pub telefono: Option<String>,
    #[validate(length(max = 300, message = "La dirección admite máximo 300 caracteres"))]
    pub direccion: Option<String>,
    pub activo: Option<bool>,
}

const SELECT_PROVEEDOR: &str = "SELECT proveedor_id, nombre_empresa, rfc, contacto, email, \
     telefono, direccion, activo, fecha_registro FROM proveedores";

impl ProveedorService {
    /// Create a new ProveedorService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List suppliers, active only unless include_inactivos is set
    pub async fn list(&self, include_inactivos: bool) -> AppResult<Vec<Proveedor>> {
        let filtro = if include_inactivos { "" } else { " WHERE activo = TRUE" };
        let proveedores = sqlx::query_as::<_, Proveedor>(&format!(
            "{SELECT_PROVEEDOR}{filtro} ORDER BY nombre_empresa"
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(proveedores)
    }

    /// Get a supplier by id, regardless of its active flag
    pub async fn get_by_id(&self, proveedor_id: i32) -> AppResult<Proveedor> {
        let proveedor = sqlx::query_as::<_, Proveedor>(&format!(
            "{SELECT_PROVEEDOR} WHERE proveedor_id = $1"
        ))
        .bind(proveedor_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Proveedor no encontrado".to_string()))?;

        Ok(proveedor)
    }

    /// Register a supplier; an RFC, when given, must not be in use
    pub async fn create(&self, input: CreateProveedorInput) -> AppResult<Proveedor> {
        input.validate()?;

        let rfc = limpiar_opcional(input.rfc).map(|r| r.to_uppercase());

        if let Some(ref rfc) = rfc {
            let rfc_en_uso = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM proveedores WHERE rfc = $1)",
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

        let proveedor = sqlx::query_as::<_, Proveedor>(
            r#"
            INSERT INTO proveedores (nombre_empresa, rfc, contacto, email, telefono, direccion)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING proveedor_id, nombre_empresa, rfc, contacto, email, telefono, direccion,
                      activo, fecha_registro
            "#,
        )
        .bind(&input.nombre_empresa)
        .bind(&rfc)
        .bind(limpiar_opcional(input.contacto))
        .bind(limpiar_opcional(input.email))
        .bind(limpiar_opcional(input.telefono))
        .bind(limpiar_opcional(input.direccion))
        .fetch_one(&self.db)
        .await?;

        tracing::info!(proveedor_id = proveedor.proveedor_id, "Proveedor registrado");

        Ok(proveedor)
    }

    /// Update a supplier; a new RFC may not belong to a different supplier
    pub async fn update(
        &self,
        proveedor_id: i32,
        input: UpdateProveedorInput,
    ) -> AppResult<Proveedor> {
        input.validate()?;

        let existing = self.get_by_id(proveedor_id).await?;

        let rfc = match input.rfc {
            Some(valor) => match limpiar_opcional(Some(valor)) {
                Some(rfc) => {
                    let rfc = rfc.to_uppercase();
                    let dueno = sqlx::query_scalar::<_, Option<i32>>(
                        "SELECT MIN(proveedor_id) FROM proveedores WHERE rfc = $1",
                    )
                    .bind(&rfc)
                    .fetch_one(&self.db)
                    .await?;
                    if matches!(dueno, Some(id) if id != proveedor_id) {
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

        let nombre_empresa = input.nombre_empresa.unwrap_or(existing.nombre_empresa);
        let contacto = match input.contacto {
            Some(valor) => limpiar_opcional(Some(valor)),
            None => existing.contacto,
        };
        let email = match input.email {
            Some(valor) => limpiar_opcional(Some(valor)),
            None => existing.email,
        };
        let telefono = match input.telefono {
            Some(valor) => limpiar_opcional(Some(valor)),
            None => existing.telefono,
        };
        let direccion = match input.direccion {
            Some(valor) => limpiar_opcional(Some(valor)),
            None => existing.direccion,
        };
        let activo = input.activo.unwrap_or(existing.activo);

        let proveedor = sqlx::query_as::<_, Proveedor>(
            r#"
            UPDATE proveedores
            SET nombre_empresa = $1, rfc = $2, contacto = $3, email = $4, telefono = $5,
                direccion = $6, activo = $7
            WHERE proveedor_id = $8
            RETURNING proveedor_id, nombre_empresa, rfc, contacto, email, telefono, direccion,
                      activo, fecha_registro
            "#,
        )
        .bind(nombre_empresa)
        .bind(rfc)
        .bind(contacto)
        .bind(email)
        .bind(telefono)
        .bind(direccion)
        .bind(activo)
        .bind(proveedor_id)
        .fetch_one(&self.db)
        .await?;

        Ok(proveedor)
    }

    /// Soft-delete a supplier by clearing its active flag
    pub async fn delete(&self, proveedor_id: i32) -> AppResult<()> {
        let result = sqlx::query("UPDATE proveedores SET activo = FALSE WHERE proveedor_id = $1")
            .bind(proveedor_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Proveedor no encontrado".to_string()));
        }

        Ok(())
    }
}
