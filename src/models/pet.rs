// src/models/pet.rs

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::validation::validate_not_blank,
    models::{empresa::Empresa, nfc::CardView, person::Person},
};

// Mapeia o CREATE TYPE pet_especie do banco
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "pet_especie", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Especie {
    Cao,
    Gato,
    Passaro,
    Peixe,
    Outro,
}

impl Especie {
    /// Nome exibido ao público.
    pub fn label(&self) -> &'static str {
        match self {
            Especie::Cao => "Cão",
            Especie::Gato => "Gato",
            Especie::Passaro => "Pássaro",
            Especie::Peixe => "Peixe",
            Especie::Outro => "Outro",
        }
    }
}

// Mapeia o CREATE TYPE pet_porte do banco
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "pet_porte", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Porte {
    Pequeno,
    Medio,
    Grande,
}

impl Porte {
    pub fn label(&self) -> &'static str {
        match self {
            Porte::Pequeno => "Pequeno",
            Porte::Medio => "Médio",
            Porte::Grande => "Grande",
        }
    }
}

// ---
// Pet (carteirinha)
// ---
// `empresa_id` é uma cópia de `tutor.empresa_id`, refeita a cada gravação.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    pub id: Uuid,
    pub empresa_id: Uuid,
    pub tutor_id: Uuid,
    pub slug: String,

    pub nome: String,
    pub especie: Especie,
    pub raca: String,
    pub porte: Option<Porte>,
    pub cor: String,
    pub data_nascimento: Option<NaiveDate>,

    // Referência em pets/
    pub foto: Option<String>,

    // Informações médicas
    pub veterinario: String,
    pub telefone_veterinario: String,
    pub observacoes: String,
    pub medicamentos: String,
    pub alergias: String,

    pub ativo: bool,
    pub criado_em: DateTime<Utc>,
    pub atualizado_em: DateTime<Utc>,
}

impl Pet {
    /// Idade em anos completos hoje.
    pub fn idade(&self) -> Option<i32> {
        self.data_nascimento
            .map(|nascimento| idade_em(nascimento, Utc::now().date_naive()))
    }
}

/// Anos completos entre o nascimento e `hoje`, contando o aniversário.
pub fn idade_em(nascimento: NaiveDate, hoje: NaiveDate) -> i32 {
    let mut anos = hoje.year() - nascimento.year();
    if (hoje.month(), hoje.day()) < (nascimento.month(), nascimento.day()) {
        anos -= 1;
    }
    anos
}

/// O pet sempre pertence à empresa do tutor.
pub fn derive_empresa(tutor: &Person) -> Uuid {
    tutor.empresa_id
}

/// Rota do perfil: `/{empresa}/pets/{slug}/`.
pub fn detail_path(empresa_slug: &str, pet_slug: &str) -> String {
    format!("/{}/pets/{}/", empresa_slug, pet_slug)
}

/// Caminho gravado no QR Code: `/{empresa}/pet/{slug}/`.
pub fn public_path(empresa_slug: &str, pet_slug: &str) -> String {
    format!("/{}/pet/{}/", empresa_slug, pet_slug)
}

/// Formulário de criação e edição. O tutor é o slug de uma pessoa ativa da mesma empresa.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PetPayload {
    #[validate(length(min = 1, max = 50, message = "O nome do pet é obrigatório (máx. 50)."), custom(function = "validate_not_blank"))]
    #[schema(example = "Rex")]
    pub nome: String,

    pub especie: Especie,

    #[validate(length(max = 50, message = "Raça com no máximo 50 caracteres."))]
    pub raca: Option<String>,

    pub porte: Option<Porte>,

    #[validate(length(max = 50, message = "Cor com no máximo 50 caracteres."))]
    pub cor: Option<String>,

    pub data_nascimento: Option<NaiveDate>,

    pub foto: Option<String>,

    #[validate(length(max = 100, message = "Veterinário com no máximo 100 caracteres."))]
    pub veterinario: Option<String>,

    #[validate(length(max = 20, message = "Telefone com no máximo 20 caracteres."))]
    pub telefone_veterinario: Option<String>,

    pub observacoes: Option<String>,
    pub medicamentos: Option<String>,
    pub alergias: Option<String>,

    #[validate(length(min = 1, message = "O tutor é obrigatório."))]
    #[schema(example = "ana-silva")]
    pub tutor: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PetDetail {
    pub pet: Pet,
    pub especie_label: &'static str,
    pub porte_label: Option<&'static str>,
    pub idade: Option<i32>,
    pub tutor: Person,
    pub empresa: Empresa,
    pub cartoes_nfc: Vec<CardView>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn idade_counts_birthday() {
        let nascimento = date(2020, 6, 15);
        assert_eq!(idade_em(nascimento, date(2024, 6, 14)), 3);
        assert_eq!(idade_em(nascimento, date(2024, 6, 15)), 4);
        assert_eq!(idade_em(nascimento, date(2024, 12, 1)), 4);
        assert_eq!(idade_em(nascimento, date(2020, 6, 15)), 0);
    }

    #[test]
    fn especie_labels_match_public_names() {
        assert_eq!(Especie::Cao.label(), "Cão");
        assert_eq!(Especie::Passaro.label(), "Pássaro");
        assert_eq!(Porte::Medio.label(), "Médio");
    }

    #[test]
    fn especie_serializes_as_stored_value() {
        assert_eq!(serde_json::to_value(Especie::Cao).unwrap(), "cao");
        let parsed: Especie = serde_json::from_str("\"gato\"").unwrap();
        assert_eq!(parsed, Especie::Gato);
    }

    #[test]
    fn paths() {
        assert_eq!(detail_path("acme", "rex"), "/acme/pets/rex/");
        assert_eq!(public_path("acme", "rex"), "/acme/pet/rex/");
    }

    #[test]
    fn payload_rejects_blank_name() {
        let payload: PetPayload = serde_json::from_value(serde_json::json!({
            "nome": "  ",
            "especie": "cao",
            "tutor": "ana-silva",
        }))
        .unwrap();

        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("nome"));
    }
}
