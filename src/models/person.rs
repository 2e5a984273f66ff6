// src/models/person.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::validation::validate_not_blank,
    models::{empresa::Empresa, nfc::CardView},
};

// ---
// Pessoa (cartão de visita)
// ---
// O slug é único dentro da empresa, não globalmente.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: Uuid,
    pub empresa_id: Uuid,
    pub slug: String,

    pub nome: String,
    pub email: String,
    pub telefone: String,
    pub whatsapp: String,
    pub cargo: String,
    pub apresentacao: String,

    // Referência em pessoas/
    pub foto: Option<String>,

    // Redes sociais
    pub linkedin: String,
    pub instagram: String,
    pub facebook: String,
    pub website: String,
    pub linktree_url: String,

    pub ativo: bool,
    pub criado_em: DateTime<Utc>,
    pub atualizado_em: DateTime<Utc>,
}

/// Rota do perfil: `/{empresa}/pessoas/{slug}/`.
pub fn detail_path(empresa_slug: &str, person_slug: &str) -> String {
    format!("/{}/pessoas/{}/", empresa_slug, person_slug)
}

/// Caminho gravado no QR Code: `/{empresa}/pessoa/{slug}/`.
pub fn public_path(empresa_slug: &str, person_slug: &str) -> String {
    format!("/{}/pessoa/{}/", empresa_slug, person_slug)
}

/// Formulário de criação e edição (o slug nunca vem do cliente).
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PersonPayload {
    #[validate(length(min = 1, max = 100, message = "O nome completo é obrigatório (máx. 100)."), custom(function = "validate_not_blank"))]
    #[schema(example = "Ana Silva")]
    pub nome: String,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,

    #[validate(length(min = 1, max = 20, message = "O telefone é obrigatório (máx. 20)."))]
    pub telefone: String,

    #[validate(length(max = 20, message = "WhatsApp com no máximo 20 caracteres."))]
    pub whatsapp: Option<String>,

    #[validate(length(max = 100, message = "Cargo com no máximo 100 caracteres."))]
    pub cargo: Option<String>,

    #[validate(length(min = 1, message = "A apresentação é obrigatória."))]
    pub apresentacao: String,

    pub foto: Option<String>,

    #[validate(url(message = "URL inválida."))]
    pub linkedin: Option<String>,
    #[validate(url(message = "URL inválida."))]
    pub instagram: Option<String>,
    #[validate(url(message = "URL inválida."))]
    pub facebook: Option<String>,
    #[validate(url(message = "URL inválida."))]
    pub website: Option<String>,
    #[validate(url(message = "URL inválida."))]
    pub linktree_url: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PersonDetail {
    pub pessoa: Person,
    pub empresa: Empresa,
    pub cartoes_nfc: Vec<CardView>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_use_plural_route_and_singular_share_link() {
        assert_eq!(detail_path("acme", "ana-silva"), "/acme/pessoas/ana-silva/");
        assert_eq!(public_path("acme", "ana-silva"), "/acme/pessoa/ana-silva/");
    }

    #[test]
    fn payload_validation() {
        let mut payload = PersonPayload {
            nome: "Ana Silva".into(),
            email: "ana@acme.com".into(),
            telefone: "11999990000".into(),
            whatsapp: None,
            cargo: Some("Diretora".into()),
            apresentacao: "Olá!".into(),
            foto: None,
            linkedin: Some("https://linkedin.com/in/ana".into()),
            instagram: None,
            facebook: None,
            website: None,
            linktree_url: None,
        };
        assert!(payload.validate().is_ok());

        payload.linkedin = Some("não é url".into());
        payload.email = "ana".into();
        let errors = payload.validate().unwrap_err();
        assert_eq!(errors.field_errors().len(), 2);
    }

    #[test]
    fn blank_name_is_rejected() {
        let payload: PersonPayload = serde_json::from_value(serde_json::json!({
            "nome": "   ",
            "email": "ana@acme.com",
            "telefone": "11999990000",
            "apresentacao": "Olá!",
        }))
        .unwrap();

        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("nome"));
    }
}
