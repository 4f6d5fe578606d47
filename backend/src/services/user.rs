//! User account service

use bcrypt::{hash, DEFAULT_COST};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use validator::Validate;

use crate::error::{AppError, AppResult};

/// User service owning the usuarios table
#[derive(Clone)]
pub struct UserService {
    db: PgPool,
}

/// Access profile for a user account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "perfil_usuario", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Perfil {
    Admin,
    Gerente,
    Cajero,
}

/// User account as exposed over the API; never carries the password hash
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Usuario {
    pub usuario_id: i32,
    pub nombre: String,
    pub username: String,
    pub perfil: Perfil,
    pub activo: bool,
    pub fecha_registro: DateTime<Utc>,
}

/// Internal row carrying the stored hash, used only for credential checks
#[derive(Debug, FromRow)]
pub(crate) struct UsuarioConHash {
    pub usuario_id: i32,
    pub nombre: String,
    pub username: String,
    pub password_hash: String,
    pub perfil: Perfil,
    pub activo: bool,
    pub fecha_registro: DateTime<Utc>,
}

impl UsuarioConHash {
    /// Whether this stored row keeps another account from taking its
    /// username; only an active holder blocks, and never the account
    /// being edited itself.
    fn retiene_username(&self, usuario_id: Option<i32>) -> bool {
        self.activo && usuario_id != Some(self.usuario_id)
    }
}

impl From<UsuarioConHash> for Usuario {
    fn from(u: UsuarioConHash) -> Self {
        Usuario {
            usuario_id: u.usuario_id,
            nombre: u.nombre,
            username: u.username,
            perfil: u.perfil,
            activo: u.activo,
            fecha_registro: u.fecha_registro,
        }
    }
}

/// Input for creating a user account
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserInput {
    #[validate(length(min = 3, max = 100, message = "El nombre es requerido"))]
    pub nombre: String,
    #[validate(email(message = "El username debe ser un email válido"))]
    #[validate(length(max = 100, message = "El username admite máximo 100 caracteres"))]
    pub username: String,
    #[validate(length(min = 6, message = "La contraseña debe tener al menos 6 caracteres"))]
    pub password: String,
    pub perfil: Perfil,
}

/// Input for updating a user account; omitted fields stay unchanged
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserInput {
    #[validate(length(min = 3, max = 100, message = "El nombre es requerido"))]
    pub nombre: Option<String>,
    #[validate(email(message = "El username debe ser un email válido"))]
    #[validate(length(max = 100, message = "El username admite máximo 100 caracteres"))]
    pub username: Option<String>,
    #[validate(length(min = 6, message = "La contraseña debe tener al menos 6 caracteres"))]
    pub password: Option<String>,
    pub perfil: Option<Perfil>,
    pub activo: Option<bool>,
}

const SELECT_USUARIO: &str = "SELECT usuario_id, nombre, username, perfil, activo, \
     fecha_registro FROM usuarios";

impl UserService {
    /// Create a new UserService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List user accounts, active only unless include_inactivos is set
    pub async fn list(&self, include_inactivos: bool) -> AppResult<Vec<Usuario>> {
        let filtro = if include_inactivos { "" } else { " WHERE activo = TRUE" };
        let usuarios = sqlx::query_as::<_, Usuario>(&format!(
            "{SELECT_USUARIO}{filtro} ORDER BY username"
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(usuarios)
    }

    /// Get a user by id, regardless of its active flag
    pub async fn get_by_id(&self, usuario_id: i32) -> AppResult<Usuario> {
        let usuario = sqlx::query_as::<_, Usuario>(&format!(
            "{SELECT_USUARIO} WHERE usuario_id = $1"
        ))
        .bind(usuario_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Usuario no encontrado".to_string()))?;

        Ok(usuario)
    }

    /// Look up a user with its stored hash by username
    pub(crate) async fn find_with_hash(
        &self,
        username: &str,
    ) -> AppResult<Option<UsuarioConHash>> {
        // A username can appear on several rows once deactivated accounts
        // release it; prefer the active holder, then the newest row.
        let usuario = sqlx::query_as::<_, UsuarioConHash>(
            "SELECT usuario_id, nombre, username, password_hash, perfil, activo, \
             fecha_registro FROM usuarios WHERE username = $1 \
             ORDER BY activo DESC, usuario_id DESC LIMIT 1",
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await?;

        Ok(usuario)
    }

    /// Create a user account, hashing its password before storage
    ///
    /// A username held only by inactive accounts does not block creation;
    /// the partial unique index on active rows rejects a racing active
    /// duplicate and surfaces it as a conflict.
    pub async fn create(&self, input: CreateUserInput) -> AppResult<Usuario> {
        input.validate()?;

        let existing = self.find_with_hash(&input.username).await?;
        if matches!(existing, Some(ref u) if u.retiene_username(None)) {
            return Err(AppError::DuplicateEntry(
                "El username ya está registrado".to_string(),
            ));
        }

        let password_hash = hash(&input.password, DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Error al generar el hash: {e}")))?;

        let usuario = sqlx::query_as::<_, Usuario>(
            r#"
            INSERT INTO usuarios (nombre, username, password_hash, perfil)
            VALUES ($1, $2, $3, $4)
            RETURNING usuario_id, nombre, username, perfil, activo, fecha_registro
            "#,
        )
        .bind(&input.nombre)
        .bind(&input.username)
        .bind(&password_hash)
        .bind(input.perfil)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(usuario_id = usuario.usuario_id, "Usuario registrado");

        Ok(usuario)
    }

    /// Update a user; a new username may not belong to a different user
    pub async fn update(&self, usuario_id: i32, input: UpdateUserInput) -> AppResult<Usuario> {
        input.validate()?;

        let existing = self.get_by_id(usuario_id).await?;

        let username = match input.username {
            Some(valor) => {
                let dueno = self.find_with_hash(&valor).await?;
                if matches!(dueno, Some(ref u) if u.retiene_username(Some(usuario_id))) {
                    return Err(AppError::DuplicateEntry(
                        "El username ya está registrado".to_string(),
                    ));
                }
                valor
            }
            None => existing.username,
        };

        let password_hash = match input.password {
            Some(password) => Some(
                hash(&password, DEFAULT_COST)
                    .map_err(|e| AppError::Internal(format!("Error al generar el hash: {e}")))?,
            ),
            None => None,
        };

        let nombre = input.nombre.unwrap_or(existing.nombre);
        let perfil = input.perfil.unwrap_or(existing.perfil);
        let activo = input.activo.unwrap_or(existing.activo);

        let usuario = sqlx::query_as::<_, Usuario>(
            r#"
            UPDATE usuarios
            SET nombre = $1, username = $2, perfil = $3, activo = $4,
                password_hash = COALESCE($5, password_hash)
            WHERE usuario_id = $6
            RETURNING usuario_id, nombre, username, perfil, activo, fecha_registro
            "#,
        )
        .bind(nombre)
        .bind(username)
        .bind(perfil)
        .bind(activo)
        .bind(password_hash)
        .bind(usuario_id)
        .fetch_one(&self.db)
        .await?;

        Ok(usuario)
    }

    /// Soft-delete a user by clearing its active flag
    pub async fn delete(&self, usuario_id: i32) -> AppResult<()> {
        let result = sqlx::query("UPDATE usuarios SET activo = FALSE WHERE usuario_id = $1")
            .bind(usuario_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Usuario no encontrado".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usuario(usuario_id: i32, activo: bool) -> UsuarioConHash {
        UsuarioConHash {
            usuario_id,
            nombre: "Ana Prueba".to_string(),
            username: "ana@example.com".to_string(),
            password_hash: "$2b$04$hash".to_string(),
            perfil: Perfil::Cajero,
            activo,
            fecha_registro: Utc::now(),
        }
    }

    #[test]
    fn username_inactivo_se_puede_reutilizar() {
        assert!(!usuario(1, false).retiene_username(None));
        assert!(usuario(1, true).retiene_username(None));
    }

    #[test]
    fn username_propio_no_genera_conflicto() {
        let dueno = usuario(7, true);
        assert!(!dueno.retiene_username(Some(7)));
        assert!(dueno.retiene_username(Some(8)));
    }
}
