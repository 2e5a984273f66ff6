// src/middleware/tenancy.rs

use std::collections::HashMap;

use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::{auth::CurrentUser, empresa::Empresa},
};

// Nome do parâmetro de rota com o slug da empresa
const EMPRESA_PARAM: &str = "empresa";

/// Só o usuário vinculado à empresa da URL passa; nunca responde 403.
pub fn check_access(user: &CurrentUser, empresa_slug: &str) -> Result<(), AppError> {
    match user.empresa_slug.as_deref() {
        None => Err(AppError::EmpresaRequired),
        Some(own) if own != empresa_slug => Err(AppError::AccessDenied),
        Some(_) => Ok(()),
    }
}

// O nosso extrator de área restrita: usuário logado + empresa da URL é a dele.
pub struct EmpresaAccess {
    pub user: CurrentUser,
    pub empresa: Empresa,
}

impl FromRequestParts<AppState> for EmpresaAccess {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // 1. Login
        let AuthenticatedUser(user) = AuthenticatedUser::from_request_parts(parts, state).await?;

        // 2. Slug da empresa na rota
        let Path(params) = Path::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::EmpresaNotFound)?;
        let slug = params.get(EMPRESA_PARAM).ok_or(AppError::EmpresaNotFound)?;

        // 3. Vínculo
        check_access(&user, slug)?;

        // 4. Empresa ativa
        let empresa = state.empresa_service.find_active(slug).await?;

        Ok(EmpresaAccess { user, empresa })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    use crate::models::auth::{User, UserProfile};

    fn user(empresa_slug: Option<&str>) -> CurrentUser {
        let now = Utc::now();
        let id = Uuid::new_v4();
        CurrentUser {
            user: User {
                id,
                username: "ana".into(),
                email: "ana@acme.com".into(),
                first_name: "Ana".into(),
                last_name: "Silva".into(),
                password_hash: String::new(),
                created_at: now,
                updated_at: now,
            },
            profile: UserProfile {
                id: Uuid::new_v4(),
                user_id: id,
                empresa_id: empresa_slug.map(|_| Uuid::new_v4()),
                is_empresa_owner: empresa_slug.is_some(),
                telefone: String::new(),
                criado_em: now,
                atualizado_em: now,
            },
            empresa_slug: empresa_slug.map(str::to_string),
        }
    }

    #[test]
    fn own_empresa_is_allowed() {
        assert!(check_access(&user(Some("acme")), "acme").is_ok());
    }

    #[test]
    fn other_empresa_is_denied() {
        assert!(matches!(check_access(&user(Some("acme")), "globex"), Err(AppError::AccessDenied)));
    }

    #[test]
    fn user_without_empresa_must_create_one() {
        assert!(matches!(check_access(&user(None), "acme"), Err(AppError::EmpresaRequired)));
    }
}
