// src/models/nfc.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::{error::AppError, storage::MediaStorage},
    models::{
        empresa::Empresa,
        person::{self, Person},
        pet::{self, Pet},
    },
};

// --- TIPOS DE CARTÃO ---

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CardKind {
    /// Cartão de visita
    Pessoa,
    /// Carteirinha de pet
    Pet,
}

/// Dono do cartão: uma pessoa, um pet ou ninguém (cartão ainda não vinculado).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardOwner {
    Unbound,
    Person(Uuid),
    Pet(Uuid),
}

impl CardOwner {
    /// Monta o dono a partir das duas colunas anuláveis do banco.
    pub fn from_columns(pessoa_id: Option<Uuid>, pet_id: Option<Uuid>) -> Result<Self, AppError> {
        match (pessoa_id, pet_id) {
            (None, None) => Ok(CardOwner::Unbound),
            (Some(id), None) => Ok(CardOwner::Person(id)),
            (None, Some(id)) => Ok(CardOwner::Pet(id)),
            (Some(_), Some(_)) => Err(AppError::InvalidCardOwner),
        }
    }

    /// (pessoa_id, pet_id) para gravar.
    pub fn columns(&self) -> (Option<Uuid>, Option<Uuid>) {
        match self {
            CardOwner::Unbound => (None, None),
            CardOwner::Person(id) => (Some(*id), None),
            CardOwner::Pet(id) => (None, Some(*id)),
        }
    }

    pub fn kind(&self) -> Option<CardKind> {
        match self {
            CardOwner::Unbound => None,
            CardOwner::Person(_) => Some(CardKind::Pessoa),
            CardOwner::Pet(_) => Some(CardKind::Pet),
        }
    }
}

// Linha crua da tabela cartoes_nfc
#[derive(Debug, Clone, FromRow)]
pub struct NfcCardRow {
    pub id: Uuid,
    pub empresa_id: Uuid,
    pub codigo_nfc: String,
    pub pessoa_id: Option<Uuid>,
    pub pet_id: Option<Uuid>,
    pub qr_code: Option<String>,
    pub ativo: bool,
    pub criado_em: DateTime<Utc>,
    pub atualizado_em: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NfcCard {
    pub id: Uuid,
    pub empresa_id: Uuid,
    pub codigo_nfc: String,
    pub owner: CardOwner,
    pub qr_code: Option<String>,
    pub ativo: bool,
    pub criado_em: DateTime<Utc>,
    pub atualizado_em: DateTime<Utc>,
}

impl TryFrom<NfcCardRow> for NfcCard {
    type Error = AppError;

    fn try_from(row: NfcCardRow) -> Result<Self, Self::Error> {
        Ok(Self {
            owner: CardOwner::from_columns(row.pessoa_id, row.pet_id)?,
            id: row.id,
            empresa_id: row.empresa_id,
            codigo_nfc: row.codigo_nfc,
            qr_code: row.qr_code,
            ativo: row.ativo,
            criado_em: row.criado_em,
            atualizado_em: row.atualizado_em,
        })
    }
}

impl NfcCard {
    pub fn qr_file_name(&self) -> String {
        qr_file_name(&self.codigo_nfc)
    }

    pub fn view(&self, storage: &MediaStorage) -> CardView {
        let (pessoa_id, pet_id) = self.owner.columns();
        CardView {
            id: self.id,
            codigo_nfc: self.codigo_nfc.clone(),
            tipo: self.owner.kind(),
            pessoa_id,
            pet_id,
            qr_code_url: self.qr_code.as_deref().map(|r| storage.url(r)),
            ativo: self.ativo,
            criado_em: self.criado_em,
        }
    }
}

pub fn qr_file_name(codigo_nfc: &str) -> String {
    format!("qr_{}.png", codigo_nfc)
}

/// Dono já carregado do banco, usado para derivar a empresa e a URL do QR.
#[derive(Debug, Clone, Copy)]
pub enum LoadedOwner<'a> {
    Unbound,
    Person(&'a Person),
    Pet(&'a Pet),
}

impl LoadedOwner<'_> {
    pub fn owner(&self) -> CardOwner {
        match self {
            LoadedOwner::Unbound => CardOwner::Unbound,
            LoadedOwner::Person(p) => CardOwner::Person(p.id),
            LoadedOwner::Pet(p) => CardOwner::Pet(p.id),
        }
    }

    /// A empresa do cartão vem do dono; sem dono, fica a que já estava.
    pub fn derive_empresa(&self, current: Uuid) -> Uuid {
        match self {
            LoadedOwner::Person(p) => p.empresa_id,
            LoadedOwner::Pet(p) => p.empresa_id,
            LoadedOwner::Unbound => current,
        }
    }

    /// URL pública que vai dentro do QR Code. Cartão sem dono não tem URL.
    pub fn public_url(&self, base_url: &str, empresa_slug: &str) -> Option<String> {
        let base_url = base_url.trim_end_matches('/');
        match self {
            LoadedOwner::Person(p) => Some(format!("{}{}", base_url, person::public_path(empresa_slug, &p.slug))),
            LoadedOwner::Pet(p) => Some(format!("{}{}", base_url, pet::public_path(empresa_slug, &p.slug))),
            LoadedOwner::Unbound => None,
        }
    }
}

/// Códigos viram nome de arquivo e segmento de URL: só [A-Za-z0-9_-].
pub fn validate_card_code(value: &str) -> Result<(), ValidationError> {
    let valid = !value.is_empty()
        && value.len() <= 50
        && value.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if valid {
        Ok(())
    } else {
        let mut err = ValidationError::new("codigo_nfc");
        err.message = Some("Use de 1 a 50 letras, números, '-' ou '_'.".into());
        Err(err)
    }
}

/// Emissão de um cartão. `pessoa` e `pet` são slugs dentro da empresa; no máximo um deles.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssueCardPayload {
    #[validate(custom(function = "validate_card_code"))]
    #[schema(example = "ABC123")]
    pub codigo_nfc: String,
    #[schema(example = "ana-silva")]
    pub pessoa: Option<String>,
    pub pet: Option<String>,
}

/// Atualização de um cartão: troca o vínculo e/ou ativa/desativa.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCardPayload {
    pub pessoa: Option<String>,
    pub pet: Option<String>,
    pub ativo: Option<bool>,
}

/// Slugs do vínculo pedido pelo cliente.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnerRef {
    Unbound,
    Person(String),
    Pet(String),
}

impl OwnerRef {
    pub fn from_slugs(pessoa: Option<&str>, pet: Option<&str>) -> Result<Self, AppError> {
        let pessoa = pessoa.filter(|s| !s.trim().is_empty());
        let pet = pet.filter(|s| !s.trim().is_empty());
        match (pessoa, pet) {
            (None, None) => Ok(OwnerRef::Unbound),
            (Some(slug), None) => Ok(OwnerRef::Person(slug.to_string())),
            (None, Some(slug)) => Ok(OwnerRef::Pet(slug.to_string())),
            (Some(_), Some(_)) => Err(AppError::InvalidCardOwner),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CardView {
    pub id: Uuid,
    pub codigo_nfc: String,
    pub tipo: Option<CardKind>,
    pub pessoa_id: Option<Uuid>,
    pub pet_id: Option<Uuid>,
    pub qr_code_url: Option<String>,
    pub ativo: bool,
    pub criado_em: DateTime<Utc>,
}

// =============================================================================
//  RESOLUÇÃO (código -> perfil)
// =============================================================================

#[derive(Debug, Clone)]
pub enum CardTarget {
    Person(Person),
    Pet { pet: Pet, tutor: Person },
}

#[derive(Debug, Clone)]
pub struct ResolvedCard {
    pub card: NfcCard,
    pub empresa: Empresa,
    pub target: CardTarget,
}

impl ResolvedCard {
    /// Rota do perfil para onde o leitor é redirecionado.
    pub fn target_path(&self) -> String {
        match &self.target {
            CardTarget::Person(p) => person::detail_path(&self.empresa.slug, &p.slug),
            CardTarget::Pet { pet, .. } => pet::detail_path(&self.empresa.slug, &pet.slug),
        }
    }
}

/// Projeção pública devolvida por `/api/nfc/{codigo}/`.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(tag = "tipo", rename_all = "lowercase")]
pub enum NfcInfo {
    Pessoa {
        empresa: String,
        empresa_slug: String,
        nome: String,
        email: String,
        telefone: String,
        cargo: String,
        apresentacao: String,
        url: String,
        foto: Option<String>,
    },
    Pet {
        empresa: String,
        empresa_slug: String,
        nome: String,
        especie: String,
        raca: String,
        tutor: String,
        tutor_telefone: String,
        url: String,
        foto: Option<String>,
    },
}

impl NfcInfo {
    pub fn project(resolved: &ResolvedCard, base_url: &str, storage: &MediaStorage) -> Self {
        let base_url = base_url.trim_end_matches('/');
        let url = format!("{}{}", base_url, resolved.target_path());
        let empresa = resolved.empresa.nome.clone();
        let empresa_slug = resolved.empresa.slug.clone();

        match &resolved.target {
            CardTarget::Person(p) => NfcInfo::Pessoa {
                empresa,
                empresa_slug,
                nome: p.nome.clone(),
                email: p.email.clone(),
                telefone: p.telefone.clone(),
                cargo: p.cargo.clone(),
                apresentacao: p.apresentacao.clone(),
                url,
                foto: p.foto.as_deref().map(|f| storage.url(f)),
            },
            CardTarget::Pet { pet, tutor } => NfcInfo::Pet {
                empresa,
                empresa_slug,
                nome: pet.nome.clone(),
                especie: pet.especie.label().to_string(),
                raca: pet.raca.clone(),
                tutor: tutor.nome.clone(),
                tutor_telefone: tutor.telefone.clone(),
                url,
                foto: pet.foto.as_deref().map(|f| storage.url(f)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures;

    #[test]
    fn owner_columns_roundtrip_and_exclusivity() {
        let id = Uuid::new_v4();
        assert_eq!(CardOwner::from_columns(None, None).unwrap(), CardOwner::Unbound);
        assert_eq!(CardOwner::from_columns(Some(id), None).unwrap(), CardOwner::Person(id));
        assert_eq!(CardOwner::Pet(id).columns(), (None, Some(id)));

        let both = CardOwner::from_columns(Some(id), Some(Uuid::new_v4()));
        assert!(matches!(both, Err(AppError::InvalidCardOwner)));
    }

    #[test]
    fn row_with_two_owners_is_rejected() {
        let now = Utc::now();
        let row = NfcCardRow {
            id: Uuid::new_v4(),
            empresa_id: Uuid::new_v4(),
            codigo_nfc: "ABC123".into(),
            pessoa_id: Some(Uuid::new_v4()),
            pet_id: Some(Uuid::new_v4()),
            qr_code: None,
            ativo: true,
            criado_em: now,
            atualizado_em: now,
        };
        assert!(NfcCard::try_from(row).is_err());
    }

    #[test]
    fn kind_follows_owner() {
        assert_eq!(CardOwner::Unbound.kind(), None);
        assert_eq!(CardOwner::Person(Uuid::new_v4()).kind(), Some(CardKind::Pessoa));
        assert_eq!(CardOwner::Pet(Uuid::new_v4()).kind(), Some(CardKind::Pet));
    }

    #[test]
    fn empresa_is_derived_from_owner() {
        let acme = fixtures::empresa("Acme", "acme");
        let outra = Uuid::new_v4();
        let ana = fixtures::person(&acme, "Ana Silva", "ana-silva");
        let rex = fixtures::pet(&ana, "Rex", "rex");

        assert_eq!(LoadedOwner::Person(&ana).derive_empresa(outra), acme.id);
        assert_eq!(LoadedOwner::Pet(&rex).derive_empresa(outra), acme.id);
        // Sem dono: mantém o valor anterior
        assert_eq!(LoadedOwner::Unbound.derive_empresa(outra), outra);
    }

    #[test]
    fn public_url_encodes_singular_profile_route() {
        let acme = fixtures::empresa("Acme", "acme");
        let ana = fixtures::person(&acme, "Ana Silva", "ana-silva");
        let rex = fixtures::pet(&ana, "Rex", "rex");

        assert_eq!(
            LoadedOwner::Person(&ana).public_url("https://cartoes.example/", "acme").as_deref(),
            Some("https://cartoes.example/acme/pessoa/ana-silva/")
        );
        assert_eq!(
            LoadedOwner::Pet(&rex).public_url("https://cartoes.example", "acme").as_deref(),
            Some("https://cartoes.example/acme/pet/rex/")
        );
        assert_eq!(LoadedOwner::Unbound.public_url("https://cartoes.example", "acme"), None);
    }

    #[test]
    fn card_code_validation() {
        assert!(validate_card_code("ABC123").is_ok());
        assert!(validate_card_code("tag_01-b").is_ok());

        assert!(validate_card_code("").is_err());
        assert!(validate_card_code("../etc").is_err());
        assert!(validate_card_code("com espaço").is_err());
        assert!(validate_card_code(&"A".repeat(51)).is_err());
    }

    #[test]
    fn owner_ref_accepts_at_most_one_slug() {
        assert_eq!(OwnerRef::from_slugs(None, None).unwrap(), OwnerRef::Unbound);
        assert_eq!(OwnerRef::from_slugs(Some(""), None).unwrap(), OwnerRef::Unbound);
        assert_eq!(
            OwnerRef::from_slugs(None, Some("rex")).unwrap(),
            OwnerRef::Pet("rex".into())
        );
        assert!(OwnerRef::from_slugs(Some("ana"), Some("rex")).is_err());
    }

    #[test]
    fn projection_for_person() {
        let acme = fixtures::empresa("Acme", "acme");
        let mut ana = fixtures::person(&acme, "Ana Silva", "ana-silva");
        ana.foto = Some("pessoas/ana.jpg".into());
        let resolved = ResolvedCard {
            card: fixtures::card(&acme, "ABC123", CardOwner::Person(ana.id)),
            empresa: acme,
            target: CardTarget::Person(ana),
        };
        let storage = MediaStorage::new("/tmp/media", "https://cartoes.example");

        assert_eq!(resolved.target_path(), "/acme/pessoas/ana-silva/");

        let json = serde_json::to_value(NfcInfo::project(&resolved, "https://cartoes.example", &storage)).unwrap();
        assert_eq!(json["tipo"], "pessoa");
        assert_eq!(json["nome"], "Ana Silva");
        assert_eq!(json["empresa_slug"], "acme");
        assert_eq!(json["url"], "https://cartoes.example/acme/pessoas/ana-silva/");
        assert_eq!(json["foto"], "https://cartoes.example/media/pessoas/ana.jpg");
    }

    #[test]
    fn projection_for_pet_uses_species_label_and_tutor() {
        let acme = fixtures::empresa("Acme", "acme");
        let ana = fixtures::person(&acme, "Ana Silva", "ana-silva");
        let rex = fixtures::pet(&ana, "Rex", "rex");
        let resolved = ResolvedCard {
            card: fixtures::card(&acme, "PET001", CardOwner::Pet(rex.id)),
            empresa: acme,
            target: CardTarget::Pet { pet: rex, tutor: ana },
        };
        let storage = MediaStorage::new("/tmp/media", "https://cartoes.example");

        let json = serde_json::to_value(NfcInfo::project(&resolved, "https://cartoes.example", &storage)).unwrap();
        assert_eq!(json["tipo"], "pet");
        assert_eq!(json["especie"], "Cão");
        assert_eq!(json["tutor"], "Ana Silva");
        assert_eq!(json["tutor_telefone"], "11999990000");
        assert_eq!(json["url"], "https://cartoes.example/acme/pets/rex/");
        assert!(json["foto"].is_null());
    }
}
