// src/services/person_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        pagination::{self, Page, PAGE_SIZE},
        slug,
        storage::{Bucket, MediaStorage},
    },
    db::{person_repo::PersonFields, NfcCardRepository, PersonRepository},
    models::{
        empresa::Empresa,
        nfc::CardOwner,
        person::{Person, PersonDetail, PersonPayload},
    },
    services::retry_on_slug_conflict,
};

fn text(value: &Option<String>) -> String {
    value.as_deref().map(str::trim).unwrap_or("").to_string()
}

impl PersonFields {
    /// Opcionais ausentes viram string vazia; a foto precisa estar em pessoas/.
    pub fn from_payload(payload: &PersonPayload) -> Result<Self, AppError> {
        let foto = payload.foto.clone().filter(|f| !f.trim().is_empty());
        if let Some(f) = foto.as_deref() {
            Bucket::Pessoas.check_reference(f)?;
        }

        Ok(Self {
            nome: payload.nome.trim().to_string(),
            email: payload.email.trim().to_string(),
            telefone: payload.telefone.trim().to_string(),
            whatsapp: text(&payload.whatsapp),
            cargo: text(&payload.cargo),
            apresentacao: payload.apresentacao.clone(),
            foto,
            linkedin: text(&payload.linkedin),
            instagram: text(&payload.instagram),
            facebook: text(&payload.facebook),
            website: text(&payload.website),
            linktree_url: text(&payload.linktree_url),
        })
    }
}

#[derive(Clone)]
pub struct PersonService {
    repo: PersonRepository,
    card_repo: NfcCardRepository,
    storage: MediaStorage,
    pool: PgPool,
}

impl PersonService {
    pub fn new(
        repo: PersonRepository,
        card_repo: NfcCardRepository,
        storage: MediaStorage,
        pool: PgPool,
    ) -> Self {
        Self { repo, card_repo, storage, pool }
    }

    pub async fn find_active(&self, empresa: &Empresa, slug: &str) -> Result<Person, AppError> {
        self.repo
            .find_active_by_slug(&self.pool, empresa.id, slug)
            .await?
            .ok_or(AppError::PersonNotFound)
    }

    /// Perfil público, com os cartões ativos.
    pub async fn detail(&self, empresa: Empresa, slug: &str) -> Result<PersonDetail, AppError> {
        let pessoa = self.find_active(&empresa, slug).await?;
        let cartoes_nfc = self
            .card_repo
            .list_active_by_owner(CardOwner::Person(pessoa.id))
            .await?
            .iter()
            .map(|c| c.view(&self.storage))
            .collect();

        Ok(PersonDetail { pessoa, empresa, cartoes_nfc })
    }

    pub async fn list(&self, empresa: &Empresa, page: Option<i64>) -> Result<Page<Person>, AppError> {
        let total = self.repo.count_active(empresa.id).await?;
        let (page, offset) = pagination::offset_for(page, total)?;
        let items = self.repo.list_active(empresa.id, PAGE_SIZE, offset).await?;
        Ok(Page::new(items, page, total))
    }

    pub async fn create(&self, empresa: &Empresa, payload: &PersonPayload) -> Result<Person, AppError> {
        let fields = PersonFields::from_payload(payload)?;
        let id = Uuid::new_v4();
        let empresa_id = empresa.id;
        let (this, fields_ref) = (self, &fields);

        let pessoa = retry_on_slug_conflict("pessoa", move || this.try_insert(id, empresa_id, fields_ref)).await?;

        tracing::info!("🧑 Pessoa '{}' criada em {}", pessoa.slug, empresa.slug);
        Ok(pessoa)
    }

    async fn try_insert(&self, id: Uuid, empresa_id: Uuid, fields: &PersonFields) -> Result<Person, AppError> {
        let base = slug::base_slug(&fields.nome, id);
        let taken = self.repo.taken_slugs(&self.pool, empresa_id, &base).await?;
        let candidate = slug::allocate_avoiding(&base, &taken, slug::RESERVED_PESSOA_SLUGS);
        self.repo.insert(&self.pool, id, empresa_id, &candidate, fields).await
    }

    /// Edição: o slug permanece o mesmo mesmo que o nome mude.
    pub async fn update(&self, empresa: &Empresa, slug: &str, payload: &PersonPayload) -> Result<Person, AppError> {
        let fields = PersonFields::from_payload(payload)?;
        let atual = self.find_active(empresa, slug).await?;
        self.repo.update(&self.pool, atual.id, &fields).await
    }

    pub async fn deactivate(&self, empresa: &Empresa, slug: &str) -> Result<(), AppError> {
        let atual = self.find_active(empresa, slug).await?;
        self.repo.deactivate(atual.id).await?;
        tracing::info!("🧑 Pessoa '{}' desativada em {}", slug, empresa.slug);
        Ok(())
    }
}
