// src/services/nfc_service.rs

use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        storage::{Bucket, MediaStorage},
    },
    db::{EmpresaRepository, NfcCardRepository, PersonRepository, PetRepository},
    models::{
        empresa::Empresa,
        nfc::{
            CardOwner, CardTarget, CardView, IssueCardPayload, LoadedOwner, NfcCard, OwnerRef,
            ResolvedCard, UpdateCardPayload,
        },
        person::Person,
        pet::Pet,
    },
    services::qr_service,
};

// Dono carregado do banco (versão com posse do LoadedOwner)
enum OwnerRecord {
    Unbound,
    Person(Person),
    Pet(Pet),
}

impl OwnerRecord {
    fn as_loaded(&self) -> LoadedOwner<'_> {
        match self {
            OwnerRecord::Unbound => LoadedOwner::Unbound,
            OwnerRecord::Person(p) => LoadedOwner::Person(p),
            OwnerRecord::Pet(p) => LoadedOwner::Pet(p),
        }
    }
}

/// URL a gravar no QR: só para cartões com dono e ainda sem imagem.
/// Uma imagem existente nunca é regerada, mesmo que o slug mude.
pub fn qr_target(card: &NfcCard, owner: &LoadedOwner<'_>, base_url: &str, empresa_slug: &str) -> Option<String> {
    if card.qr_code.is_some() {
        return None;
    }
    owner.public_url(base_url, empresa_slug)
}

#[derive(Clone)]
pub struct NfcService {
    card_repo: NfcCardRepository,
    empresa_repo: EmpresaRepository,
    person_repo: PersonRepository,
    pet_repo: PetRepository,
    storage: MediaStorage,
    public_base_url: String,
    pool: PgPool,
}

impl NfcService {
    pub fn new(
        card_repo: NfcCardRepository,
        empresa_repo: EmpresaRepository,
        person_repo: PersonRepository,
        pet_repo: PetRepository,
        storage: MediaStorage,
        public_base_url: String,
        pool: PgPool,
    ) -> Self {
        Self {
            card_repo,
            empresa_repo,
            person_repo,
            pet_repo,
            storage,
            public_base_url,
            pool,
        }
    }

    pub fn public_base_url(&self) -> &str {
        &self.public_base_url
    }

    pub fn storage(&self) -> &MediaStorage {
        &self.storage
    }

    // =========================================================================
    //  GESTÃO (restrita à empresa dona)
    // =========================================================================

    pub async fn list(&self, empresa: &Empresa) -> Result<Vec<CardView>, AppError> {
        let cards = self.card_repo.list_by_empresa(empresa.id).await?;
        Ok(cards.iter().map(|c| c.view(&self.storage)).collect())
    }

    /// Emite um cartão novo. A linha é gravada antes da imagem: um código
    /// repetido falha no INSERT e não toca no PNG do cartão existente.
    pub async fn issue(&self, empresa: &Empresa, payload: &IssueCardPayload) -> Result<NfcCard, AppError> {
        let owner_ref = OwnerRef::from_slugs(payload.pessoa.as_deref(), payload.pet.as_deref())?;
        let record = self.load_owner(empresa, &owner_ref).await?;
        let owner = record.as_loaded();

        let mut tx = self.pool.begin().await?;

        let card = self
            .card_repo
            .insert(
                &mut *tx,
                Uuid::new_v4(),
                owner.derive_empresa(empresa.id),
                &payload.codigo_nfc,
                owner.owner(),
            )
            .await?;
        let (card, written) = self.ensure_qr(&mut *tx, card, &owner, empresa).await?;

        self.commit_or_discard(tx, written.as_deref()).await?;

        tracing::info!("💳 Cartão '{}' emitido em {}", card.codigo_nfc, empresa.slug);
        Ok(card)
    }

    /// Troca o vínculo e/ou o status. Sem `pessoa` nem `pet` no corpo, o dono atual é mantido.
    pub async fn update(
        &self,
        empresa: &Empresa,
        codigo: &str,
        payload: &UpdateCardPayload,
    ) -> Result<NfcCard, AppError> {
        let card = self
            .card_repo
            .find_in_empresa(&self.pool, empresa.id, codigo)
            .await?
            .ok_or(AppError::CardNotFound)?;

        let record = if payload.pessoa.is_none() && payload.pet.is_none() {
            self.reload_owner(card.owner).await?
        } else {
            let owner_ref = OwnerRef::from_slugs(payload.pessoa.as_deref(), payload.pet.as_deref())?;
            self.load_owner(empresa, &owner_ref).await?
        };
        let owner = record.as_loaded();
        let ativo = payload.ativo.unwrap_or(card.ativo);

        let mut tx = self.pool.begin().await?;
        let (card, written) = self.issue_or_update(&mut *tx, &card, &owner, ativo, empresa).await?;
        self.commit_or_discard(tx, written.as_deref()).await?;

        tracing::info!("💳 Cartão '{}' atualizado em {}", card.codigo_nfc, empresa.slug);
        Ok(card)
    }

    pub async fn deactivate(&self, empresa: &Empresa, codigo: &str) -> Result<(), AppError> {
        let card = self
            .card_repo
            .find_in_empresa(&self.pool, empresa.id, codigo)
            .await?
            .ok_or(AppError::CardNotFound)?;
        self.card_repo.deactivate(card.id).await?;
        tracing::info!("💳 Cartão '{}' desativado em {}", codigo, empresa.slug);
        Ok(())
    }

    /// Regrava a empresa derivada do dono e gera o QR se ainda não existir.
    /// Devolve também a referência do PNG gravado agora, se houver.
    async fn issue_or_update(
        &self,
        conn: &mut PgConnection,
        card: &NfcCard,
        owner: &LoadedOwner<'_>,
        ativo: bool,
        empresa: &Empresa,
    ) -> Result<(NfcCard, Option<String>), AppError> {
        let empresa_id = owner.derive_empresa(card.empresa_id);
        let updated = self
            .card_repo
            .update(&mut *conn, card.id, empresa_id, owner.owner(), ativo)
            .await?;
        self.ensure_qr(conn, updated, owner, empresa).await
    }

    async fn ensure_qr(
        &self,
        conn: &mut PgConnection,
        mut card: NfcCard,
        owner: &LoadedOwner<'_>,
        empresa: &Empresa,
    ) -> Result<(NfcCard, Option<String>), AppError> {
        // O QR aponta para a empresa do cartão (derivada do dono)
        let empresa_slug = if card.empresa_id == empresa.id {
            empresa.slug.clone()
        } else {
            self.empresa_repo
                .find_by_id(&mut *conn, card.empresa_id)
                .await?
                .ok_or(AppError::EmpresaNotFound)?
                .slug
        };

        let Some(url) = qr_target(&card, owner, &self.public_base_url, &empresa_slug) else {
            return Ok((card, None));
        };

        let png = qr_service::render_png(&url)?;
        let reference = self.storage.save(Bucket::QrCodes, &card.qr_file_name(), &png).await?;
        if let Err(e) = self.card_repo.set_qr_code(&mut *conn, card.id, &reference).await {
            self.storage.discard(&reference).await;
            return Err(e);
        }

        tracing::debug!("🔳 QR de '{}' aponta para {}", card.codigo_nfc, url);
        card.qr_code = Some(reference.clone());
        Ok((card, Some(reference)))
    }

    // Sem commit, o PNG gravado nesta transação não pode ficar órfão no disco
    async fn commit_or_discard(
        &self,
        tx: Transaction<'_, Postgres>,
        written: Option<&str>,
    ) -> Result<(), AppError> {
        if let Err(e) = tx.commit().await {
            if let Some(reference) = written {
                self.storage.discard(reference).await;
            }
            return Err(e.into());
        }
        Ok(())
    }

    // Dono pedido pelo cliente, procurado entre os ativos da empresa
    async fn load_owner(&self, empresa: &Empresa, owner_ref: &OwnerRef) -> Result<OwnerRecord, AppError> {
        Ok(match owner_ref {
            OwnerRef::Unbound => OwnerRecord::Unbound,
            OwnerRef::Person(slug) => OwnerRecord::Person(
                self.person_repo
                    .find_active_by_slug(&self.pool, empresa.id, slug)
                    .await?
                    .ok_or(AppError::PersonNotFound)?,
            ),
            OwnerRef::Pet(slug) => OwnerRecord::Pet(
                self.pet_repo
                    .find_active_by_slug(&self.pool, empresa.id, slug)
                    .await?
                    .ok_or(AppError::PetNotFound)?,
            ),
        })
    }

    async fn reload_owner(&self, owner: CardOwner) -> Result<OwnerRecord, AppError> {
        Ok(match owner {
            CardOwner::Unbound => OwnerRecord::Unbound,
            CardOwner::Person(id) => OwnerRecord::Person(
                self.person_repo
                    .find_by_id(&self.pool, id)
                    .await?
                    .ok_or(AppError::PersonNotFound)?,
            ),
            CardOwner::Pet(id) => OwnerRecord::Pet(
                self.pet_repo
                    .find_by_id(&self.pool, id)
                    .await?
                    .ok_or(AppError::PetNotFound)?,
            ),
        })
    }

    // =========================================================================
    //  LEITURA (público)
    // =========================================================================

    /// Resolve um código ativo até o perfil de destino.
    /// Com `empresa_slug`, a busca fica restrita àquela empresa (que precisa estar ativa).
    pub async fn resolve(&self, codigo: &str, empresa_slug: Option<&str>) -> Result<ResolvedCard, AppError> {
        let scope = match empresa_slug {
            Some(slug) => Some(
                self.empresa_repo
                    .find_active_by_slug(slug)
                    .await?
                    .ok_or(AppError::EmpresaNotFound)?,
            ),
            None => None,
        };

        let card = self
            .card_repo
            .find_active_by_code(codigo, scope.as_ref().map(|e| e.id))
            .await?
            .ok_or(AppError::CardNotFound)?;

        let target = match card.owner {
            CardOwner::Unbound => return Err(AppError::CardNotAssociated),
            CardOwner::Person(id) => CardTarget::Person(
                self.person_repo
                    .find_by_id(&self.pool, id)
                    .await?
                    .ok_or(AppError::CardNotFound)?,
            ),
            CardOwner::Pet(id) => {
                let pet = self
                    .pet_repo
                    .find_by_id(&self.pool, id)
                    .await?
                    .ok_or(AppError::CardNotFound)?;
                let tutor = self
                    .person_repo
                    .find_by_id(&self.pool, pet.tutor_id)
                    .await?
                    .ok_or(AppError::CardNotFound)?;
                CardTarget::Pet { pet, tutor }
            }
        };

        let empresa = match scope {
            Some(e) => e,
            None => self
                .empresa_repo
                .find_by_id(&self.pool, card.empresa_id)
                .await?
                .ok_or(AppError::EmpresaNotFound)?,
        };

        Ok(ResolvedCard { card, empresa, target })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures;

    #[test]
    fn qr_target_for_bound_card_without_image() {
        let acme = fixtures::empresa("Acme", "acme");
        let ana = fixtures::person(&acme, "Ana Silva", "ana-silva");
        let card = fixtures::card(&acme, "ABC123", CardOwner::Person(ana.id));

        assert_eq!(
            qr_target(&card, &LoadedOwner::Person(&ana), "http://localhost:3000", "acme").as_deref(),
            Some("http://localhost:3000/acme/pessoa/ana-silva/")
        );
    }

    #[test]
    fn existing_image_is_never_regenerated() {
        let acme = fixtures::empresa("Acme", "acme");
        let ana = fixtures::person(&acme, "Ana Silva", "ana-silva");
        let mut card = fixtures::card(&acme, "ABC123", CardOwner::Person(ana.id));
        card.qr_code = Some("qr_codes/qr_ABC123.png".into());

        assert_eq!(qr_target(&card, &LoadedOwner::Person(&ana), "http://localhost:3000", "acme"), None);
    }

    #[test]
    fn unbound_card_has_no_qr() {
        let acme = fixtures::empresa("Acme", "acme");
        let card = fixtures::card(&acme, "LIVRE01", CardOwner::Unbound);

        assert_eq!(qr_target(&card, &LoadedOwner::Unbound, "http://localhost:3000", "acme"), None);
    }

    #[test]
    fn pet_card_points_to_singular_pet_route() {
        let acme = fixtures::empresa("Acme", "acme");
        let ana = fixtures::person(&acme, "Ana Silva", "ana-silva");
        let rex = fixtures::pet(&ana, "Rex", "rex");
        let card = fixtures::card(&acme, "PET001", CardOwner::Pet(rex.id));

        assert_eq!(
            qr_target(&card, &LoadedOwner::Pet(&rex), "https://cartoes.example", "acme").as_deref(),
            Some("https://cartoes.example/acme/pet/rex/")
        );
    }
}
