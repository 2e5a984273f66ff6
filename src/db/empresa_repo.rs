// src/db/empresa_repo.rs

use std::collections::HashSet;

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{error::AppError, slug},
    db::unique_violation,
    models::{dashboard::Totais, empresa::Empresa},
};

const EMPRESA_COLUMNS: &str = "id, nome, slug, descricao, logo, cor_primaria, cor_secundaria, \
     email, telefone, website, endereco, ativo, criado_em, atualizado_em";

/// Dados já normalizados pelo serviço (defaults aplicados, slug alocado).
#[derive(Debug, Clone)]
pub struct NewEmpresa<'a> {
    pub id: Uuid,
    pub nome: &'a str,
    pub slug: &'a str,
    pub descricao: &'a str,
    pub logo: Option<&'a str>,
    pub cor_primaria: &'a str,
    pub cor_secundaria: &'a str,
    pub email: &'a str,
    pub telefone: &'a str,
    pub website: &'a str,
    pub endereco: &'a str,
}

#[derive(Clone)]
pub struct EmpresaRepository {
    pool: PgPool,
}

impl EmpresaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Empresas ativas, por nome (página inicial).
    pub async fn list_active(&self) -> Result<Vec<Empresa>, AppError> {
        let sql = format!(
            "SELECT {} FROM empresas WHERE ativo = TRUE ORDER BY nome",
            EMPRESA_COLUMNS
        );
        let empresas = sqlx::query_as::<_, Empresa>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(empresas)
    }

    pub async fn find_active_by_slug(&self, slug: &str) -> Result<Option<Empresa>, AppError> {
        let sql = format!(
            "SELECT {} FROM empresas WHERE slug = $1 AND ativo = TRUE",
            EMPRESA_COLUMNS
        );
        let empresa = sqlx::query_as::<_, Empresa>(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(empresa)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Empresa>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {} FROM empresas WHERE id = $1", EMPRESA_COLUMNS);
        let empresa = sqlx::query_as::<_, Empresa>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(empresa)
    }

    /// Slugs já usados no formato `base` ou `base-N` (inclui empresas inativas).
    pub async fn taken_slugs<'e, E>(&self, executor: E, base: &str) -> Result<HashSet<String>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT slug FROM empresas WHERE slug = $1 OR slug LIKE $2",
        )
            .bind(base)
            .bind(slug::suffix_pattern(base))
            .fetch_all(executor)
            .await?;
        Ok(rows.into_iter().map(|(s,)| s).collect())
    }

    pub async fn insert<'e, E>(&self, executor: E, new: &NewEmpresa<'_>) -> Result<Empresa, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO empresas (
                id, nome, slug, descricao, logo, cor_primaria, cor_secundaria,
                email, telefone, website, endereco
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {}
            "#,
            EMPRESA_COLUMNS
        );

        sqlx::query_as::<_, Empresa>(&sql)
            .bind(new.id)
            .bind(new.nome)
            .bind(new.slug)
            .bind(new.descricao)
            .bind(new.logo)
            .bind(new.cor_primaria)
            .bind(new.cor_secundaria)
            .bind(new.email)
            .bind(new.telefone)
            .bind(new.website)
            .bind(new.endereco)
            .fetch_one(executor)
            .await
            .map_err(|e| match unique_violation(&e) {
                Some("empresas_slug_key") => AppError::SlugConflict(new.slug.to_string()),
                Some(other) => AppError::UniqueConstraintViolation(other.to_string()),
                None => e.into(),
            })
    }

    /// Contadores de registros ativos de uma empresa.
    pub async fn totais(&self, empresa_id: Uuid) -> Result<Totais, AppError> {
        let totais = sqlx::query_as::<_, Totais>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM pessoas WHERE empresa_id = $1 AND ativo = TRUE) AS total_pessoas,
                (SELECT COUNT(*) FROM pets WHERE empresa_id = $1 AND ativo = TRUE) AS total_pets,
                (SELECT COUNT(*) FROM cartoes_nfc WHERE empresa_id = $1 AND ativo = TRUE) AS total_cartoes
            "#,
        )
            .bind(empresa_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(totais)
    }

    /// Contadores globais (página inicial pública).
    pub async fn totais_globais(&self) -> Result<Totais, AppError> {
        let totais = sqlx::query_as::<_, Totais>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM pessoas WHERE ativo = TRUE) AS total_pessoas,
                (SELECT COUNT(*) FROM pets WHERE ativo = TRUE) AS total_pets,
                (SELECT COUNT(*) FROM cartoes_nfc WHERE ativo = TRUE) AS total_cartoes
            "#,
        )
            .fetch_one(&self.pool)
            .await?;
        Ok(totais)
    }
}
