// src/models/empresa.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::common::validation::validate_not_blank;

pub const COR_PRIMARIA_PADRAO: &str = "#007bff";
pub const COR_SECUNDARIA_PADRAO: &str = "#6c757d";

// ---
// Empresa (o "tenant")
// ---
// Dona das pessoas, pets e cartões. O slug é global e nunca muda depois de criado.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Empresa {
    pub id: Uuid,
    pub nome: String,
    pub slug: String,
    pub descricao: String,

    // Identidade visual
    pub logo: Option<String>,
    pub cor_primaria: String,
    pub cor_secundaria: String,

    // Contato
    pub email: String,
    pub telefone: String,
    pub website: String,
    pub endereco: String,

    pub ativo: bool,
    pub criado_em: DateTime<Utc>,
    pub atualizado_em: DateTime<Utc>,
}

impl Empresa {
    pub fn home_path(&self) -> String {
        format!("/{}/", self.slug)
    }
}

/// Cores no formato `#RRGGBB`.
pub fn validate_hex_color(value: &str) -> Result<(), ValidationError> {
    let valid = value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit());

    if valid {
        Ok(())
    } else {
        let mut err = ValidationError::new("hex_color");
        err.message = Some("Formato: #RRGGBB".into());
        Err(err)
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEmpresaPayload {
    #[validate(length(min = 1, max = 100, message = "O nome da empresa é obrigatório (máx. 100)."), custom(function = "validate_not_blank"))]
    #[schema(example = "Acme")]
    pub nome: String,

    // Opcional: se ausente, é gerado a partir do nome
    #[validate(length(max = 100, message = "O slug deve ter no máximo 100 caracteres."))]
    pub slug: Option<String>,

    pub descricao: Option<String>,

    // Referência já armazenada em empresas/logos/
    pub logo: Option<String>,

    #[validate(custom(function = "validate_hex_color"))]
    #[schema(example = "#007bff")]
    pub cor_primaria: Option<String>,

    #[validate(custom(function = "validate_hex_color"))]
    #[schema(example = "#6c757d")]
    pub cor_secundaria: Option<String>,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,

    #[validate(length(max = 20, message = "Telefone com no máximo 20 caracteres."))]
    pub telefone: Option<String>,

    #[validate(url(message = "Website inválido."))]
    pub website: Option<String>,

    pub endereco: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_color_validation() {
        assert!(validate_hex_color("#007bff").is_ok());
        assert!(validate_hex_color("#ABCDEF").is_ok());

        assert!(validate_hex_color("007bff").is_err());
        assert!(validate_hex_color("#07bff").is_err());
        assert!(validate_hex_color("#00zbff").is_err());
    }

    #[test]
    fn payload_rejects_bad_colors() {
        let payload = CreateEmpresaPayload {
            nome: "Acme".into(),
            slug: None,
            descricao: None,
            logo: None,
            cor_primaria: Some("azul".into()),
            cor_secundaria: None,
            email: None,
            telefone: None,
            website: None,
            endereco: None,
        };

        assert!(payload.validate().is_err());
    }

    #[test]
    fn payload_rejects_blank_name() {
        let payload: CreateEmpresaPayload = serde_json::from_value(serde_json::json!({ "nome": "   " })).unwrap();

        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("nome"));
    }
}
