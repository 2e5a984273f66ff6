// src/db/nfc_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::unique_violation,
    models::nfc::{CardOwner, NfcCard, NfcCardRow},
};

const CARD_COLUMNS: &str =
    "id, empresa_id, codigo_nfc, pessoa_id, pet_id, qr_code, ativo, criado_em, atualizado_em";

fn into_cards(rows: Vec<NfcCardRow>) -> Result<Vec<NfcCard>, AppError> {
    rows.into_iter().map(NfcCard::try_from).collect()
}

#[derive(Clone)]
pub struct NfcCardRepository {
    pool: PgPool,
}

impl NfcCardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Código ativo, opcionalmente restrito a uma empresa.
    pub async fn find_active_by_code(
        &self,
        codigo: &str,
        empresa_id: Option<Uuid>,
    ) -> Result<Option<NfcCard>, AppError> {
        let sql = format!(
            r#"
            SELECT {} FROM cartoes_nfc
            WHERE codigo_nfc = $1 AND ativo = TRUE
              AND ($2::uuid IS NULL OR empresa_id = $2)
            "#,
            CARD_COLUMNS
        );
        let row = sqlx::query_as::<_, NfcCardRow>(&sql)
            .bind(codigo)
            .bind(empresa_id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(NfcCard::try_from).transpose()
    }

    /// Cartão da empresa, ativo ou não (gestão).
    pub async fn find_in_empresa<'e, E>(
        &self,
        executor: E,
        empresa_id: Uuid,
        codigo: &str,
    ) -> Result<Option<NfcCard>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {} FROM cartoes_nfc WHERE empresa_id = $1 AND codigo_nfc = $2",
            CARD_COLUMNS
        );
        let row = sqlx::query_as::<_, NfcCardRow>(&sql)
            .bind(empresa_id)
            .bind(codigo)
            .fetch_optional(executor)
            .await?;
        row.map(NfcCard::try_from).transpose()
    }

    /// Todos os cartões da empresa, mais recentes primeiro.
    pub async fn list_by_empresa(&self, empresa_id: Uuid) -> Result<Vec<NfcCard>, AppError> {
        let sql = format!(
            "SELECT {} FROM cartoes_nfc WHERE empresa_id = $1 ORDER BY criado_em DESC",
            CARD_COLUMNS
        );
        let rows = sqlx::query_as::<_, NfcCardRow>(&sql)
            .bind(empresa_id)
            .fetch_all(&self.pool)
            .await?;
        into_cards(rows)
    }

    /// Cartões ativos de um dono (exibidos no perfil).
    pub async fn list_active_by_owner(&self, owner: CardOwner) -> Result<Vec<NfcCard>, AppError> {
        let (pessoa_id, pet_id) = owner.columns();
        if pessoa_id.is_none() && pet_id.is_none() {
            return Ok(Vec::new());
        }

        let sql = format!(
            r#"
            SELECT {} FROM cartoes_nfc
            WHERE ativo = TRUE
              AND (($1::uuid IS NOT NULL AND pessoa_id = $1) OR ($2::uuid IS NOT NULL AND pet_id = $2))
            ORDER BY criado_em DESC
            "#,
            CARD_COLUMNS
        );
        let rows = sqlx::query_as::<_, NfcCardRow>(&sql)
            .bind(pessoa_id)
            .bind(pet_id)
            .fetch_all(&self.pool)
            .await?;
        into_cards(rows)
    }

    /// Insere o cartão ainda sem QR. Código repetido vira 409.
    pub async fn insert<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        empresa_id: Uuid,
        codigo: &str,
        owner: CardOwner,
    ) -> Result<NfcCard, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let (pessoa_id, pet_id) = owner.columns();
        let sql = format!(
            r#"
            INSERT INTO cartoes_nfc (id, empresa_id, codigo_nfc, pessoa_id, pet_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            CARD_COLUMNS
        );

        let row = sqlx::query_as::<_, NfcCardRow>(&sql)
            .bind(id)
            .bind(empresa_id)
            .bind(codigo)
            .bind(pessoa_id)
            .bind(pet_id)
            .fetch_one(executor)
            .await
            .map_err(|e| match unique_violation(&e) {
                Some("cartoes_nfc_codigo_nfc_key") => AppError::CardCodeAlreadyExists(codigo.to_string()),
                Some(other) => AppError::UniqueConstraintViolation(other.to_string()),
                None => e.into(),
            })?;
        NfcCard::try_from(row)
    }

    /// Regrava dono, empresa derivada e status.
    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        empresa_id: Uuid,
        owner: CardOwner,
        ativo: bool,
    ) -> Result<NfcCard, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let (pessoa_id, pet_id) = owner.columns();
        let sql = format!(
            r#"
            UPDATE cartoes_nfc
            SET empresa_id = $2, pessoa_id = $3, pet_id = $4, ativo = $5, atualizado_em = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            CARD_COLUMNS
        );

        let row = sqlx::query_as::<_, NfcCardRow>(&sql)
            .bind(id)
            .bind(empresa_id)
            .bind(pessoa_id)
            .bind(pet_id)
            .bind(ativo)
            .fetch_optional(executor)
            .await?
            .ok_or(AppError::CardNotFound)?;
        NfcCard::try_from(row)
    }

    pub async fn set_qr_code<'e, E>(&self, executor: E, id: Uuid, reference: &str) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE cartoes_nfc SET qr_code = $2, atualizado_em = NOW() WHERE id = $1")
            .bind(id)
            .bind(reference)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn deactivate(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE cartoes_nfc SET ativo = FALSE, atualizado_em = NOW() WHERE id = $1 AND ativo = TRUE",
        )
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::CardNotFound);
        }
        Ok(())
    }
}
