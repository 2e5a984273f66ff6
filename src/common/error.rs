use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::common::flash::{self, Flash};

// Nosso tipo de erro, agora com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Nome de usuário já existe")]
    UsernameAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Usuário não encontrado")]
    UserNotFound,

    // --- Recursos não encontrados (ou inativos) ---
    #[error("Empresa não encontrada")]
    EmpresaNotFound,

    #[error("Pessoa não encontrada")]
    PersonNotFound,

    #[error("Pet não encontrado")]
    PetNotFound,

    #[error("Código NFC não encontrado")]
    CardNotFound,

    #[error("Página não encontrada")]
    PageNotFound,

    // Cartão existe mas não tem dono: não é o mesmo que "não encontrado"
    #[error("Cartão não associado")]
    CardNotAssociated,

    // --- Controle de acesso (viram redirecionamentos, nunca 403) ---
    #[error("Login necessário para {next}")]
    LoginRequired { next: String },

    #[error("Usuário sem empresa")]
    EmpresaRequired,

    #[error("Acesso negado à empresa")]
    AccessDenied,

    // O perfil já tem empresa (ex.: dois "criar empresa" simultâneos)
    #[error("Usuário já possui empresa")]
    EmpresaAlreadyOwned,

    // --- Regras de negócio ---
    #[error("Cartão deve ter no máximo um dono")]
    InvalidCardOwner,

    #[error("Tutor não encontrado nesta empresa")]
    TutorNotFound,

    #[error("Referência de mídia inválida: {0}")]
    InvalidMediaReference(String),

    #[error("Código NFC já cadastrado: {0}")]
    CardCodeAlreadyExists(String),

    #[error("Slug de empresa já em uso: {0}")]
    EmpresaSlugTaken(String),

    // Violação do UNIQUE de slug; o serviço tenta de novo com outro candidato
    #[error("Conflito de slug: {0}")]
    SlugConflict(String),

    #[error("Violação de chave única: {0}")]
    UniqueConstraintViolation(String),

    // Variante para erros de banco de dados (exemplo com sqlx)
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro de armazenamento: {0}")]
    StorageError(#[from] std::io::Error),

    #[error("Erro ao gerar QR Code: {0}")]
    QrCodeError(String),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| match &e.message {
                            Some(m) => m.to_string(),
                            None => e.code.to_string(),
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }

            AppError::LoginRequired { next } => {
                let encoded: String = url::form_urlencoded::byte_serialize(next.as_bytes()).collect();
                return flash::found(&format!("/login/?next={}", encoded));
            }
            AppError::EmpresaRequired => {
                return flash::redirect_with(
                    "/criar-empresa/",
                    Flash::error("Você precisa criar uma empresa primeiro."),
                );
            }
            AppError::AccessDenied => {
                return flash::redirect_with(
                    "/minha-empresa/",
                    Flash::error("Você não tem acesso a esta empresa."),
                );
            }
            AppError::EmpresaAlreadyOwned => {
                return flash::redirect_with(
                    "/minha-empresa/",
                    Flash::info("Você já possui uma empresa cadastrada."),
                );
            }

            AppError::UsernameAlreadyExists => (StatusCode::CONFLICT, "Este nome de usuário já está em uso.".to_string()),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "Usuário ou senha inválidos.".to_string()),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "Token de autenticação inválido ou ausente.".to_string()),
            AppError::UserNotFound => (StatusCode::NOT_FOUND, "Usuário não encontrado.".to_string()),

            AppError::EmpresaNotFound => (StatusCode::NOT_FOUND, "Empresa não encontrada.".to_string()),
            AppError::PersonNotFound => (StatusCode::NOT_FOUND, "Pessoa não encontrada.".to_string()),
            AppError::PetNotFound => (StatusCode::NOT_FOUND, "Pet não encontrado.".to_string()),
            AppError::CardNotFound => (StatusCode::NOT_FOUND, "Código NFC não encontrado".to_string()),
            AppError::PageNotFound => (StatusCode::NOT_FOUND, "Página inválida.".to_string()),
            AppError::CardNotAssociated => (StatusCode::NOT_FOUND, "Cartão não associado".to_string()),

            AppError::InvalidCardOwner => (
                StatusCode::BAD_REQUEST,
                "Um cartão pode estar ligado a uma pessoa OU a um pet, nunca aos dois.".to_string(),
            ),
            AppError::TutorNotFound => (StatusCode::BAD_REQUEST, "Tutor não encontrado nesta empresa.".to_string()),
            AppError::InvalidMediaReference(path) => (
                StatusCode::BAD_REQUEST,
                format!("Arquivo '{}' não pertence à pasta esperada.", path),
            ),

            AppError::CardCodeAlreadyExists(code) => (
                StatusCode::CONFLICT,
                format!("O código NFC '{}' já está cadastrado.", code),
            ),
            AppError::EmpresaSlugTaken(slug) => (
                StatusCode::CONFLICT,
                format!("O endereço '{}' já está em uso por outra empresa.", slug),
            ),
            AppError::UniqueConstraintViolation(constraint) => {
                tracing::warn!("Violação de chave única: {}", constraint);
                (StatusCode::CONFLICT, "Registro duplicado.".to_string())
            }

            // Todos os outros erros (banco, disco, QR, etc.) viram 500.
            // O `tracing` registra a mensagem detalhada que `thiserror` nos deu.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.".to_string())
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header;

    #[test]
    fn not_found_family_maps_to_404() {
        for err in [
            AppError::EmpresaNotFound,
            AppError::PersonNotFound,
            AppError::PetNotFound,
            AppError::CardNotFound,
            AppError::CardNotAssociated,
        ] {
            assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
        }
    }

    #[test]
    fn access_denied_redirects_instead_of_forbidden() {
        let response = AppError::AccessDenied.into_response();

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], "/minha-empresa/");
        assert!(response.headers().contains_key(header::SET_COOKIE));
    }

    #[test]
    fn login_required_keeps_next_path() {
        let response = AppError::LoginRequired { next: "/acme/pets/novo/".into() }.into_response();

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers()[header::LOCATION],
            "/login/?next=%2Facme%2Fpets%2Fnovo%2F"
        );
    }

    #[test]
    fn conflicts_map_to_409() {
        let response = AppError::CardCodeAlreadyExists("ABC123".into()).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn unique_violation_hides_constraint_name() {
        let response = AppError::UniqueConstraintViolation("pessoas_email_key".into()).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(!body.contains("pessoas_email_key"), "{}", body);
        assert!(body.contains("Registro duplicado."));
    }

    #[test]
    fn second_empresa_goes_back_to_own() {
        let response = AppError::EmpresaAlreadyOwned.into_response();

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], "/minha-empresa/");
        assert!(response.headers().contains_key(header::SET_COOKIE));
    }

    #[test]
    fn infrastructure_errors_are_500() {
        let response = AppError::QrCodeError("data too long".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
