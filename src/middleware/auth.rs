// src/middleware/auth.rs

use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    extract::cookie::CookieJar,
    headers::{authorization::Bearer, Authorization},
    typed_header::TypedHeaderRejection,
    TypedHeader,
};

use crate::{common::error::AppError, config::AppState, models::auth::CurrentUser};

/// Cookie com o JWT da sessão (alternativa ao cabeçalho Authorization).
pub const SESSION_COOKIE: &str = "sessao";

// Identifica o usuário em toda requisição. Token ausente, inválido ou
// expirado não é erro: a requisição segue como anônima.
pub async fn identify_user(
    State(app_state): State<AppState>,
    bearer: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let token = bearer
        .ok()
        .map(|TypedHeader(Authorization(b))| b.token().to_string())
        .or_else(|| jar.get(SESSION_COOKIE).map(|c| c.value().to_string()));

    if let Some(token) = token {
        match app_state.auth_service.current_user(&token).await {
            // Insere o usuário nos "extensions" da requisição
            Ok(user) => {
                request.extensions_mut().insert(user);
            }
            Err(AppError::InvalidToken) | Err(AppError::UserNotFound) => {
                tracing::debug!("Token inválido, seguindo como anônimo");
            }
            Err(e) => {
                tracing::warn!("Falha ao identificar usuário: {}", e);
            }
        }
    }

    next.run(request).await
}

// Extrator para obter o usuário autenticado diretamente nos handlers.
// Sem usuário, manda para o login com `next` apontando de volta.
pub struct AuthenticatedUser(pub CurrentUser);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .map(AuthenticatedUser)
            .ok_or_else(|| AppError::LoginRequired {
                next: parts
                    .uri
                    .path_and_query()
                    .map(|pq| pq.as_str().to_string())
                    .unwrap_or_else(|| "/".to_string()),
            })
    }
}

/// Usuário da requisição, se houver.
pub struct MaybeUser(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(parts.extensions.get::<CurrentUser>().cloned()))
    }
}
