// src/db/pet_repo.rs

use std::collections::HashSet;

use chrono::NaiveDate;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{error::AppError, slug},
    db::unique_violation,
    models::pet::{Especie, Pet, Porte},
};

const PET_COLUMNS: &str = "id, empresa_id, tutor_id, slug, nome, especie, raca, porte, cor, \
     data_nascimento, foto, veterinario, telefone_veterinario, observacoes, medicamentos, \
     alergias, ativo, criado_em, atualizado_em";

/// Campos gravados em create/update. `empresa_id` vem sempre do tutor.
#[derive(Debug, Clone)]
pub struct PetFields {
    pub empresa_id: Uuid,
    pub tutor_id: Uuid,
    pub nome: String,
    pub especie: Especie,
    pub raca: String,
    pub porte: Option<Porte>,
    pub cor: String,
    pub data_nascimento: Option<NaiveDate>,
    pub foto: Option<String>,
    pub veterinario: String,
    pub telefone_veterinario: String,
    pub observacoes: String,
    pub medicamentos: String,
    pub alergias: String,
}

#[derive(Clone)]
pub struct PetRepository {
    pool: PgPool,
}

impl PetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_active_by_slug<'e, E>(
        &self,
        executor: E,
        empresa_id: Uuid,
        slug: &str,
    ) -> Result<Option<Pet>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {} FROM pets WHERE empresa_id = $1 AND slug = $2 AND ativo = TRUE",
            PET_COLUMNS
        );
        let pet = sqlx::query_as::<_, Pet>(&sql)
            .bind(empresa_id)
            .bind(slug)
            .fetch_optional(executor)
            .await?;
        Ok(pet)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Pet>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {} FROM pets WHERE id = $1", PET_COLUMNS);
        let pet = sqlx::query_as::<_, Pet>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(pet)
    }

    pub async fn count_active(&self, empresa_id: Uuid) -> Result<i64, AppError> {
        let (total,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM pets WHERE empresa_id = $1 AND ativo = TRUE")
                .bind(empresa_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(total)
    }

    pub async fn list_active(
        &self,
        empresa_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Pet>, AppError> {
        let sql = format!(
            r#"
            SELECT {} FROM pets
            WHERE empresa_id = $1 AND ativo = TRUE
            ORDER BY nome, criado_em
            LIMIT $2 OFFSET $3
            "#,
            PET_COLUMNS
        );
        let pets = sqlx::query_as::<_, Pet>(&sql)
            .bind(empresa_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(pets)
    }

    pub async fn recent(&self, empresa_id: Uuid, limit: i64) -> Result<Vec<Pet>, AppError> {
        let sql = format!(
            r#"
            SELECT {} FROM pets
            WHERE empresa_id = $1 AND ativo = TRUE
            ORDER BY criado_em DESC
            LIMIT $2
            "#,
            PET_COLUMNS
        );
        let pets = sqlx::query_as::<_, Pet>(&sql)
            .bind(empresa_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(pets)
    }

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
            "SELECT slug FROM pets WHERE empresa_id = $1 AND (slug = $2 OR slug LIKE $3)",
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
        slug: &str,
        fields: &PetFields,
    ) -> Result<Pet, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO pets (
                id, empresa_id, tutor_id, slug, nome, especie, raca, porte, cor,
                data_nascimento, foto, veterinario, telefone_veterinario,
                observacoes, medicamentos, alergias
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING {}
            "#,
            PET_COLUMNS
        );

        sqlx::query_as::<_, Pet>(&sql)
            .bind(id)
            .bind(fields.empresa_id)
            .bind(fields.tutor_id)
            .bind(slug)
            .bind(&fields.nome)
            .bind(fields.especie)
            .bind(&fields.raca)
            .bind(fields.porte)
            .bind(&fields.cor)
            .bind(fields.data_nascimento)
            .bind(&fields.foto)
            .bind(&fields.veterinario)
            .bind(&fields.telefone_veterinario)
            .bind(&fields.observacoes)
            .bind(&fields.medicamentos)
            .bind(&fields.alergias)
            .fetch_one(executor)
            .await
            .map_err(|e| match unique_violation(&e) {
                Some("pets_empresa_slug_key") => AppError::SlugConflict(slug.to_string()),
                Some(other) => AppError::UniqueConstraintViolation(other.to_string()),
                None => e.into(),
            })
    }

    /// Regrava tudo menos o slug; `empresa_id` acompanha o tutor.
    pub async fn update<'e, E>(&self, executor: E, id: Uuid, fields: &PetFields) -> Result<Pet, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE pets SET
                empresa_id = $2, tutor_id = $3, nome = $4, especie = $5, raca = $6,
                porte = $7, cor = $8, data_nascimento = $9, foto = $10,
                veterinario = $11, telefone_veterinario = $12, observacoes = $13,
                medicamentos = $14, alergias = $15, atualizado_em = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            PET_COLUMNS
        );

        sqlx::query_as::<_, Pet>(&sql)
            .bind(id)
            .bind(fields.empresa_id)
            .bind(fields.tutor_id)
            .bind(&fields.nome)
            .bind(fields.especie)
            .bind(&fields.raca)
            .bind(fields.porte)
            .bind(&fields.cor)
            .bind(fields.data_nascimento)
            .bind(&fields.foto)
            .bind(&fields.veterinario)
            .bind(&fields.telefone_veterinario)
            .bind(&fields.observacoes)
            .bind(&fields.medicamentos)
            .bind(&fields.alergias)
            .fetch_optional(executor)
            .await
            .map_err(|e| match unique_violation(&e) {
                Some(other) => AppError::UniqueConstraintViolation(other.to_string()),
                None => e.into(),
            })?
            .ok_or(AppError::PetNotFound)
    }

    pub async fn deactivate(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE pets SET ativo = FALSE, atualizado_em = NOW() WHERE id = $1 AND ativo = TRUE",
        )
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::PetNotFound);
        }
        Ok(())
    }
}
