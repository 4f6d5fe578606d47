//! Credential verification

use bcrypt::verify;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::services::user::{UserService, Usuario};

/// Authentication service over the usuarios table
#[derive(Clone)]
pub struct AuthService {
    users: UserService,
}

/// Login credentials
#[derive(Debug, Deserialize, Validate)]
pub struct LoginInput {
    #[validate(length(min = 1, message = "El username es requerido"))]
    pub username: String,
    #[validate(length(min = 1, message = "La contraseña es requerida"))]
    pub password: String,
}

/// Successful login payload
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: Usuario,
}

/// True when the stored value looks like a bcrypt hash
pub fn hash_verificable(stored: &str) -> bool {
    stored.starts_with("$2")
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(db: PgPool) -> Self {
        Self {
            users: UserService::new(db),
        }
    }

    /// Verify credentials; unknown users and wrong passwords are
    /// indistinguishable in the response
    pub async fn login(&self, input: LoginInput) -> AppResult<LoginResponse> {
        input.validate()?;

        let usuario = self
            .users
            .find_with_hash(&input.username)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !hash_verificable(&usuario.password_hash) {
            tracing::warn!(username = %usuario.username, "Hash almacenado no verificable");
            return Err(AppError::InvalidCredentials);
        }

        let valido = verify(&input.password, &usuario.password_hash)
            .map_err(|_| AppError::InvalidCredentials)?;

        if !valido {
            return Err(AppError::InvalidCredentials);
        }

        tracing::info!(usuario_id = usuario.usuario_id, "Inicio de sesión correcto");

        Ok(LoginResponse {
            user: usuario.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_bcrypt_es_verificable() {
        assert!(hash_verificable("$2b$12$abcdefghijklmnopqrstuv"));
        assert!(hash_verificable("$2a$10$xyz"));
    }

    #[test]
    fn hash_plano_no_es_verificable() {
        assert!(!hash_verificable("contrasena-en-claro"));
        assert!(!hash_verificable(""));
        assert!(!hash_verificable("$1$md5hash"));
    }
}
