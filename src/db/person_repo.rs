// src/db/person_repo.rs

use std::collections::HashSet;

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{error::AppError, slug},
    db::unique_violation,
    models::person::Person,
};

const PERSON_COLUMNS: &str = "id, empresa_id, slug, nome, email, telefone, whatsapp, cargo, \
     apresentacao, foto, linkedin, instagram, facebook, website, linktree_url, \
     ativo, criado_em, atualizado_em";

/// Campos editáveis, já com os opcionais resolvidos para string vazia.
#[derive(Debug, Clone, Default)]
pub struct PersonFields {
    pub nome: String,
    pub email: String,
    pub telefone: String,
    pub whatsapp: String,
    pub cargo: String,
    pub apresentacao: String,
    pub foto: Option<String>,
    pub linkedin: String,
    pub instagram: String,
    pub facebook: String,
    pub website: String,
    pub linktree_url: String,
}

#[derive(Clone)]
pub struct PersonRepository {
    pool: PgPool,
}

impl PersonRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_active_by_slug<'e, E>(
        &self,
        executor: E,
        empresa_id: Uuid,
        slug: &str,
    ) -> Result<Option<Person>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {} FROM pessoas WHERE empresa_id = $1 AND slug = $2 AND ativo = TRUE",
            PERSON_COLUMNS
        );
        let person = sqlx::query_as::<_, Person>(&sql)
            .bind(empresa_id)
            .bind(slug)
            .fetch_optional(executor)
            .await?;
        Ok(person)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Person>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {} FROM pessoas WHERE id = $1", PERSON_COLUMNS);
        let person = sqlx::query_as::<_, Person>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(person)
    }

    pub async fn count_active(&self, empresa_id: Uuid) -> Result<i64, AppError> {
        let (total,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM pessoas WHERE empresa_id = $1 AND ativo = TRUE")
                .bind(empresa_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(total)
    }

    /// Uma página da listagem, por nome.
    pub async fn list_active(
        &self,
        empresa_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Person>, AppError> {
        let sql = format!(
            r#"
            SELECT {} FROM pessoas
            WHERE empresa_id = $1 AND ativo = TRUE
            ORDER BY nome, criado_em
            LIMIT $2 OFFSET $3
            "#,
            PERSON_COLUMNS
        );
        let people = sqlx::query_as::<_, Person>(&sql)
            .bind(empresa_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(people)
    }

    /// Últimas pessoas cadastradas.
    pub async fn recent(&self, empresa_id: Uuid, limit: i64) -> Result<Vec<Person>, AppError> {
        let sql = format!(
            r#"
            SELECT {} FROM pessoas
            WHERE empresa_id = $1 AND ativo = TRUE
            ORDER BY criado_em DESC
            LIMIT $2
            "#,
            PERSON_COLUMNS
        );
        let people = sqlx::query_as::<_, Person>(&sql)
            .bind(empresa_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(people)
    }

    /// Slugs `base` / `base-N` já usados dentro da empresa.
    pub async fn taken_slugs<'e, E>(
        &self,
        executor: E,
        empresa_id: Uuid,
        base: &str,
    ) -> Result<HashSet<String>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT slug FROM pessoas WHERE empresa_id = $1 AND (slug = $2 OR slug LIKE $3)",
        )
            .bind(empresa_id)
            .bind(base)
            .bind(slug::suffix_pattern(base))
            .fetch_all(executor)
            .await?;
        Ok(rows.into_iter().map(|(s,)| s).collect())
    }

    pub async fn insert<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        empresa_id: Uuid,
        slug: &str,
        fields: &PersonFields,
    ) -> Result<Person, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO pessoas (
                id, empresa_id, slug, nome, email, telefone, whatsapp, cargo, apresentacao,
                foto, linkedin, instagram, facebook, website, linktree_url
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING {}
            "#,
            PERSON_COLUMNS
        );

        sqlx::query_as::<_, Person>(&sql)
            .bind(id)
            .bind(empresa_id)
            .bind(slug)
            .bind(&fields.nome)
            .bind(&fields.email)
            .bind(&fields.telefone)
            .bind(&fields.whatsapp)
            .bind(&fields.cargo)
            .bind(&fields.apresentacao)
            .bind(&fields.foto)
            .bind(&fields.linkedin)
            .bind(&fields.instagram)
            .bind(&fields.facebook)
            .bind(&fields.website)
            .bind(&fields.linktree_url)
            .fetch_one(executor)
            .await
            .map_err(|e| match unique_violation(&e) {
                Some("pessoas_empresa_slug_key") => AppError::SlugConflict(slug.to_string()),
                Some(other) => AppError::UniqueConstraintViolation(other.to_string()),
                None => e.into(),
            })
    }

    /// Atualiza os campos editáveis; o slug nunca muda.
    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        fields: &PersonFields,
    ) -> Result<Person, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE pessoas SET
                nome = $2, email = $3, telefone = $4, whatsapp = $5, cargo = $6,
                apresentacao = $7, foto = $8, linkedin = $9, instagram = $10,
                facebook = $11, website = $12, linktree_url = $13,
                atualizado_em = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            PERSON_COLUMNS
        );

        sqlx::query_as::<_, Person>(&sql)
            .bind(id)
            .bind(&fields.nome)
            .bind(&fields.email)
            .bind(&fields.telefone)
            .bind(&fields.whatsapp)
            .bind(&fields.cargo)
            .bind(&fields.apresentacao)
            .bind(&fields.foto)
            .bind(&fields.linkedin)
            .bind(&fields.instagram)
            .bind(&fields.facebook)
            .bind(&fields.website)
            .bind(&fields.linktree_url)
            .fetch_optional(executor)
            .await?
            .ok_or(AppError::PersonNotFound)
    }

    /// Desativação lógica (ativo = false).
    pub async fn deactivate(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE pessoas SET ativo = FALSE, atualizado_em = NOW() WHERE id = $1 AND ativo = TRUE",
        )
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::PersonNotFound);
        }
        Ok(())
    }
}
