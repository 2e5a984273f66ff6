// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{Claims, CurrentUser, RegisterUserPayload, User},
};

/// Validade da sessão.
pub const TOKEN_TTL_DAYS: i64 = 7;

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    jwt_secret: String,
    pool: PgPool,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, jwt_secret: String, pool: PgPool) -> Self {
        Self { user_repo, jwt_secret, pool }
    }

    /// Cria o usuário e o perfil na mesma transação.
    pub async fn register_user(&self, payload: &RegisterUserPayload) -> Result<User, AppError> {
        // 1. Hashing fora da transação (não toca no banco)
        let password = payload.password.clone();
        let hashed_password = tokio::task::spawn_blocking(move || hash(&password, bcrypt::DEFAULT_COST))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        let mut tx = self.pool.begin().await?;

        // 2. Usuário
        let user = self
            .user_repo
            .create_user(
                &mut *tx,
                payload.username.trim(),
                &payload.email,
                &payload.first_name,
                &payload.last_name,
                &hashed_password,
            )
            .await?;

        // 3. Perfil (se falhar, o usuário acima é desfeito)
        self.user_repo
            .create_profile(&mut *tx, user.id, payload.telefone.as_deref().unwrap_or(""))
            .await?;

        tx.commit().await?;

        tracing::info!("👤 Usuário '{}' ({}) registrado", user.username, user.full_name());
        Ok(user)
    }

    pub async fn login_user(&self, username: &str, password: &str) -> Result<String, AppError> {
        let user = self
            .user_repo
            .find_by_username(username.trim())
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password = password.to_owned();
        let password_hash = user.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid = tokio::task::spawn_blocking(move || verify(&password, &password_hash))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        create_token(&self.jwt_secret, user.id, Utc::now())
    }

    /// Usuário dono do token, com perfil e empresa.
    pub async fn current_user(&self, token: &str) -> Result<CurrentUser, AppError> {
        let user_id = decode_token(&self.jwt_secret, token)?;
        self.user_repo
            .find_current_user(user_id)
            .await?
            .ok_or(AppError::UserNotFound)
    }
}

pub fn create_token(secret: &str, user_id: Uuid, now: DateTime<Utc>) -> Result<String, AppError> {
    let expires_at = now + Duration::days(TOKEN_TTL_DAYS);

    let claims = Claims {
        sub: user_id,
        exp: expires_at.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?)
}

/// Id do usuário de um token válido e não expirado.
pub fn decode_token(secret: &str, token: &str) -> Result<Uuid, AppError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
    .map_err(|_| AppError::InvalidToken)?;

    Ok(token_data.claims.sub)
}
