// src/db/user_repo.rs

use sqlx::{Executor, FromRow, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::auth::{CurrentUser, User, UserProfile},
};

const USER_COLUMNS: &str =
    "id, username, email, first_name, last_name, password_hash, created_at, updated_at";

// Linha do JOIN users + user_profiles + empresas usada para montar o CurrentUser
#[derive(FromRow)]
struct CurrentUserRow {
    id: Uuid,
    username: String,
    email: String,
    first_name: String,
    last_name: String,
    password_hash: String,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
    profile_id: Uuid,
    empresa_id: Option<Uuid>,
    is_empresa_owner: bool,
    telefone: String,
    profile_criado_em: chrono::DateTime<chrono::Utc>,
    profile_atualizado_em: chrono::DateTime<chrono::Utc>,
    empresa_slug: Option<String>,
}

impl From<CurrentUserRow> for CurrentUser {
    fn from(row: CurrentUserRow) -> Self {
        CurrentUser {
            user: User {
                id: row.id,
                username: row.username,
                email: row.email,
                first_name: row.first_name,
                last_name: row.last_name,
                password_hash: row.password_hash,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            profile: UserProfile {
                id: row.profile_id,
                user_id: row.id,
                empresa_id: row.empresa_id,
                is_empresa_owner: row.is_empresa_owner,
                telefone: row.telefone,
                criado_em: row.profile_criado_em,
                atualizado_em: row.profile_atualizado_em,
            },
            empresa_slug: row.empresa_slug,
        }
    }
}

// O repositório de usuários, responsável pelas tabelas 'users' e 'user_profiles'
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Busca um usuário pelo nome de usuário (login)
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);
        let maybe_user = sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe_user)
    }

    /// Usuário + perfil + slug da empresa (só se a empresa estiver ativa).
    pub async fn find_current_user(&self, user_id: Uuid) -> Result<Option<CurrentUser>, AppError> {
        let row = sqlx::query_as::<_, CurrentUserRow>(
            r#"
            SELECT
                u.id, u.username, u.email, u.first_name, u.last_name, u.password_hash,
                u.created_at, u.updated_at,
                p.id AS profile_id, p.empresa_id, p.is_empresa_owner, p.telefone,
                p.criado_em AS profile_criado_em, p.atualizado_em AS profile_atualizado_em,
                e.slug AS empresa_slug
            FROM users u
            JOIN user_profiles p ON p.user_id = u.id
            LEFT JOIN empresas e ON e.id = p.empresa_id AND e.ativo = TRUE
            WHERE u.id = $1
            "#,
        )
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(CurrentUser::from))
    }

    // Cria um novo usuário; username duplicado vira erro específico
    pub async fn create_user<'e, E>(
        &self,
        executor: E,
        username: &str,
        email: &str,
        first_name: &str,
        last_name: &str,
        password_hash: &str,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO users (username, email, first_name, last_name, password_hash)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .bind(email)
            .bind(first_name)
            .bind(last_name)
            .bind(password_hash)
            .fetch_one(executor)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_unique_violation() {
                        if let Some(constraint) = db_err.constraint() {
                            return match constraint {
                                "users_username_key" => AppError::UsernameAlreadyExists,
                                _ => AppError::UniqueConstraintViolation(constraint.to_string()),
                            };
                        }
                    }
                }
                e.into()
            })
    }

    /// Perfil criado junto com o usuário, ainda sem empresa.
    pub async fn create_profile<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        telefone: &str,
    ) -> Result<UserProfile, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let profile = sqlx::query_as::<_, UserProfile>(
            r#"
            INSERT INTO user_profiles (user_id, telefone)
            VALUES ($1, $2)
            RETURNING id, user_id, empresa_id, is_empresa_owner, telefone, criado_em, atualizado_em
            "#,
        )
            .bind(user_id)
            .bind(telefone)
            .fetch_one(executor)
            .await?;
        Ok(profile)
    }

    /// Vincula o perfil à empresa recém-criada como dono.
    /// Um perfil que já tem empresa não é sobrescrito.
    pub async fn bind_empresa<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        empresa_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE user_profiles
            SET empresa_id = $2, is_empresa_owner = TRUE, atualizado_em = NOW()
            WHERE user_id = $1 AND empresa_id IS NULL
            "#,
        )
            .bind(user_id)
            .bind(empresa_id)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::EmpresaAlreadyOwned);
        }
        Ok(())
    }
}
