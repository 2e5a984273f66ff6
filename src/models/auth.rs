// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    pub password_hash: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

// Perfil que liga o usuário à sua empresa
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub empresa_id: Option<Uuid>,
    pub is_empresa_owner: bool,
    pub telefone: String,
    pub criado_em: DateTime<Utc>,
    pub atualizado_em: DateTime<Utc>,
}

/// Usuário autenticado da requisição, já com o perfil e o slug da empresa.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub user: User,
    pub profile: UserProfile,
    pub empresa_slug: Option<String>,
}

// Dados para registro de um novo usuário
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserPayload {
    #[validate(length(min = 1, max = 150, message = "O nome de usuário é obrigatório (máx. 150)."))]
    #[schema(example = "ana.silva")]
    pub username: String,

    #[validate(length(min = 1, max = 30, message = "O nome é obrigatório (máx. 30)."))]
    pub first_name: String,

    #[validate(length(min = 1, max = 30, message = "O sobrenome é obrigatório (máx. 30)."))]
    pub last_name: String,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,

    #[validate(length(max = 20, message = "Telefone com no máximo 20 caracteres."))]
    pub telefone: Option<String>,

    #[validate(length(min = 8, message = "A senha deve ter no mínimo 8 caracteres."))]
    pub password: String,

    #[validate(must_match(other = "password", message = "As senhas não conferem."))]
    pub password_confirmation: String,
}

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginUserPayload {
    #[validate(length(min = 1, message = "Informe o nome de usuário."))]
    pub username: String,
    #[validate(length(min = 1, message = "Informe a senha."))]
    pub password: String,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterResponse {
    pub mensagem: String,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID do usuário)
    pub exp: usize, // Expiration time (quando o token expira)
    pub iat: usize, // Issued At (quando o token foi criado)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(password: &str, confirmation: &str) -> RegisterUserPayload {
        RegisterUserPayload {
            username: "ana".into(),
            first_name: "Ana".into(),
            last_name: "Silva".into(),
            email: "ana@acme.com".into(),
            telefone: None,
            password: password.into(),
            password_confirmation: confirmation.into(),
        }
    }

    #[test]
    fn register_requires_matching_passwords() {
        assert!(payload("segredo123", "segredo123").validate().is_ok());

        let errors = payload("segredo123", "outra-coisa").validate().unwrap_err();
        assert_eq!(errors.field_errors().len(), 1);
    }

    #[test]
    fn password_is_never_serialized() {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: "ana".into(),
            email: "ana@acme.com".into(),
            first_name: "Ana".into(),
            last_name: "Silva".into(),
            password_hash: "$2b$12$hash".into(),
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(user.full_name(), "Ana Silva");
    }
}
