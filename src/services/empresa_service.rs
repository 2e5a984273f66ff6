// src/services/empresa_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        slug::{self, RESERVED_EMPRESA_SLUGS},
        storage::Bucket,
    },
    db::{empresa_repo::NewEmpresa, EmpresaRepository, UserRepository},
    models::{
        auth::CurrentUser,
        empresa::{CreateEmpresaPayload, Empresa, COR_PRIMARIA_PADRAO, COR_SECUNDARIA_PADRAO},
    },
    services::retry_on_slug_conflict,
};

#[derive(Clone)]
pub struct EmpresaService {
    empresa_repo: EmpresaRepository,
    user_repo: UserRepository,
    pool: PgPool,
}

impl EmpresaService {
    pub fn new(empresa_repo: EmpresaRepository, user_repo: UserRepository, pool: PgPool) -> Self {
        Self { empresa_repo, user_repo, pool }
    }

    pub async fn find_active(&self, slug: &str) -> Result<Empresa, AppError> {
        self.empresa_repo
            .find_active_by_slug(slug)
            .await?
            .ok_or(AppError::EmpresaNotFound)
    }

    pub async fn list_active(&self) -> Result<Vec<Empresa>, AppError> {
        self.empresa_repo.list_active().await
    }

    /// Cria a empresa e torna `owner` o dono dela, tudo numa transação.
    pub async fn create_for_owner(
        &self,
        owner: &CurrentUser,
        payload: &CreateEmpresaPayload,
    ) -> Result<Empresa, AppError> {
        if let Some(logo) = payload.logo.as_deref() {
            Bucket::EmpresaLogos.check_reference(logo)?;
        }

        // Slug informado pelo cliente: normalizado, e nunca trocado por outro
        let explicit = payload
            .slug
            .as_deref()
            .map(slug::slugify)
            .filter(|s| !s.is_empty());

        if let Some(s) = &explicit {
            if RESERVED_EMPRESA_SLUGS.contains(&s.as_str()) {
                return Err(AppError::EmpresaSlugTaken(s.clone()));
            }
        }

        let id = Uuid::new_v4();
        let this = self;

        let empresa = match explicit.as_deref() {
            Some(s) => this
                .try_create(id, owner, payload, Some(s))
                .await
                .map_err(|e| match e {
                    AppError::SlugConflict(s) => AppError::EmpresaSlugTaken(s),
                    other => other,
                })?,
            None => {
                retry_on_slug_conflict("empresa", move || this.try_create(id, owner, payload, None)).await?
            }
        };

        tracing::info!("🏢 Empresa '{}' criada ({}) por {}", empresa.nome, empresa.slug, owner.user.username);
        Ok(empresa)
    }

    async fn try_create(
        &self,
        id: Uuid,
        owner: &CurrentUser,
        payload: &CreateEmpresaPayload,
        explicit_slug: Option<&str>,
    ) -> Result<Empresa, AppError> {
        let mut tx = self.pool.begin().await?;

        let slug = match explicit_slug {
            // Slug explícito ocupado não é recalculado
            Some(s) => s.to_string(),
            None => {
                let base = slug::base_slug(&payload.nome, id);
                let taken = self.empresa_repo.taken_slugs(&mut *tx, &base).await?;
                slug::allocate_empresa(&base, &taken)
            }
        };

        let new = NewEmpresa {
            id,
            nome: payload.nome.trim(),
            slug: &slug,
            descricao: payload.descricao.as_deref().unwrap_or(""),
            logo: payload.logo.as_deref(),
            cor_primaria: payload.cor_primaria.as_deref().unwrap_or(COR_PRIMARIA_PADRAO),
            cor_secundaria: payload.cor_secundaria.as_deref().unwrap_or(COR_SECUNDARIA_PADRAO),
            email: payload.email.as_deref().unwrap_or(""),
            telefone: payload.telefone.as_deref().unwrap_or(""),
            website: payload.website.as_deref().unwrap_or(""),
            endereco: payload.endereco.as_deref().unwrap_or(""),
        };

        let empresa = self.empresa_repo.insert(&mut *tx, &new).await?;
        self.user_repo.bind_empresa(&mut *tx, owner.user.id, empresa.id).await?;

        tx.commit().await?;
        Ok(empresa)
    }
}
