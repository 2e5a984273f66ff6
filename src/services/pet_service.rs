// src/services/pet_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        pagination::{self, Page, PAGE_SIZE},
        slug,
        storage::{Bucket, MediaStorage},
    },
    db::{pet_repo::PetFields, NfcCardRepository, PersonRepository, PetRepository},
    models::{
        empresa::Empresa,
        nfc::CardOwner,
        person::Person,
        pet::{self, Pet, PetDetail, PetPayload},
    },
    services::retry_on_slug_conflict,
};

fn text(value: &Option<String>) -> String {
    value.as_deref().map(str::trim).unwrap_or("").to_string()
}

impl PetFields {
    /// Monta os campos gravados; a empresa é sempre a do tutor.
    pub fn from_payload(payload: &PetPayload, tutor: &Person) -> Result<Self, AppError> {
        let foto = payload.foto.clone().filter(|f| !f.trim().is_empty());
        if let Some(f) = foto.as_deref() {
            Bucket::Pets.check_reference(f)?;
        }

        Ok(Self {
            empresa_id: pet::derive_empresa(tutor),
            tutor_id: tutor.id,
            nome: payload.nome.trim().to_string(),
            especie: payload.especie,
            raca: text(&payload.raca),
            porte: payload.porte,
            cor: text(&payload.cor),
            data_nascimento: payload.data_nascimento,
            foto,
            veterinario: text(&payload.veterinario),
            telefone_veterinario: text(&payload.telefone_veterinario),
            observacoes: text(&payload.observacoes),
            medicamentos: text(&payload.medicamentos),
            alergias: text(&payload.alergias),
        })
    }
}

#[derive(Clone)]
pub struct PetService {
    repo: PetRepository,
    person_repo: PersonRepository,
    card_repo: NfcCardRepository,
    storage: MediaStorage,
    pool: PgPool,
}

impl PetService {
    pub fn new(
        repo: PetRepository,
        person_repo: PersonRepository,
        card_repo: NfcCardRepository,
        storage: MediaStorage,
        pool: PgPool,
    ) -> Self {
        Self { repo, person_repo, card_repo, storage, pool }
    }

    pub async fn find_active(&self, empresa: &Empresa, slug: &str) -> Result<Pet, AppError> {
        self.repo
            .find_active_by_slug(&self.pool, empresa.id, slug)
            .await?
            .ok_or(AppError::PetNotFound)
    }

    // O tutor precisa ser uma pessoa ativa da mesma empresa
    async fn tutor(&self, empresa: &Empresa, tutor_slug: &str) -> Result<Person, AppError> {
        self.person_repo
            .find_active_by_slug(&self.pool, empresa.id, tutor_slug.trim())
            .await?
            .ok_or(AppError::TutorNotFound)
    }

    pub async fn detail(&self, empresa: Empresa, slug: &str) -> Result<PetDetail, AppError> {
        let pet = self.find_active(&empresa, slug).await?;
        let tutor = self
            .person_repo
            .find_by_id(&self.pool, pet.tutor_id)
            .await?
            .ok_or(AppError::PersonNotFound)?;
        let cartoes_nfc = self
            .card_repo
            .list_active_by_owner(CardOwner::Pet(pet.id))
            .await?
            .iter()
            .map(|c| c.view(&self.storage))
            .collect();

        Ok(PetDetail {
            especie_label: pet.especie.label(),
            porte_label: pet.porte.map(|p| p.label()),
            idade: pet.idade(),
            pet,
            tutor,
            empresa,
            cartoes_nfc,
        })
    }

    pub async fn list(&self, empresa: &Empresa, page: Option<i64>) -> Result<Page<Pet>, AppError> {
        let total = self.repo.count_active(empresa.id).await?;
        let (page, offset) = pagination::offset_for(page, total)?;
        let items = self.repo.list_active(empresa.id, PAGE_SIZE, offset).await?;
        Ok(Page::new(items, page, total))
    }

    pub async fn create(&self, empresa: &Empresa, payload: &PetPayload) -> Result<Pet, AppError> {
        let tutor = self.tutor(empresa, &payload.tutor).await?;
        let fields = PetFields::from_payload(payload, &tutor)?;
        let id = Uuid::new_v4();
        let (this, fields_ref) = (self, &fields);

        let pet = retry_on_slug_conflict("pet", move || this.try_insert(id, fields_ref)).await?;

        tracing::info!("🐾 Pet '{}' criado em {} (tutor {})", pet.slug, empresa.slug, tutor.slug);
        Ok(pet)
    }

    async fn try_insert(&self, id: Uuid, fields: &PetFields) -> Result<Pet, AppError> {
        let base = slug::base_slug(&fields.nome, id);
        let taken = self.repo.taken_slugs(&self.pool, fields.empresa_id, &base).await?;
        let candidate = slug::allocate_avoiding(&base, &taken, slug::RESERVED_PET_SLUGS);
        self.repo.insert(&self.pool, id, &candidate, fields).await
    }

    /// Edição: slug mantido, empresa recalculada a partir do tutor.
    pub async fn update(&self, empresa: &Empresa, slug: &str, payload: &PetPayload) -> Result<Pet, AppError> {
        let atual = self.find_active(empresa, slug).await?;
        let tutor = self.tutor(empresa, &payload.tutor).await?;
        let fields = PetFields::from_payload(payload, &tutor)?;
        self.repo.update(&self.pool, atual.id, &fields).await
    }

    pub async fn deactivate(&self, empresa: &Empresa, slug: &str) -> Result<(), AppError> {
        let atual = self.find_active(empresa, slug).await?;
        self.repo.deactivate(atual.id).await?;
        tracing::info!("🐾 Pet '{}' desativado em {}", slug, empresa.slug);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{fixtures, pet::Especie};

    fn payload(tutor: &str) -> PetPayload {
        PetPayload {
            nome: "Rex".into(),
            especie: Especie::Cao,
            raca: None,
            porte: None,
            cor: Some(" caramelo ".into()),
            data_nascimento: None,
            foto: None,
            veterinario: None,
            telefone_veterinario: None,
            observacoes: None,
            medicamentos: None,
            alergias: None,
            tutor: tutor.into(),
        }
    }

    #[test]
    fn empresa_comes_from_tutor() {
        let acme = fixtures::empresa("Acme", "acme");
        let ana = fixtures::person(&acme, "Ana Silva", "ana-silva");

        let fields = PetFields::from_payload(&payload("ana-silva"), &ana).unwrap();
        assert_eq!(fields.empresa_id, acme.id);
        assert_eq!(fields.tutor_id, ana.id);
        assert_eq!(fields.cor, "caramelo");
        assert_eq!(fields.raca, "");
    }

    #[test]
    fn foto_must_live_in_pets_bucket() {
        let acme = fixtures::empresa("Acme", "acme");
        let ana = fixtures::person(&acme, "Ana Silva", "ana-silva");
        let mut p = payload("ana-silva");
        p.foto = Some("qr_codes/qr_X.png".into());

        assert!(PetFields::from_payload(&p, &ana).is_err());
    }
}
