// src/handlers/auth.rs

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use validator::Validate;

use crate::{
    common::{error::AppError, flash},
    config::AppState,
    middleware::auth::SESSION_COOKIE,
    models::auth::{AuthResponse, LoginUserPayload, RegisterResponse, RegisterUserPayload},
};

// POST /registrar/
#[utoipa::path(
    post,
    path = "/registrar/",
    tag = "Auth",
    request_body = RegisterUserPayload,
    responses(
        (status = 201, description = "Conta criada (usuário + perfil)", body = RegisterResponse),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "Nome de usuário já em uso")
    )
)]
pub async fn register(
    State(app_state): State<AppState>,
    Json(payload): Json<RegisterUserPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let user = app_state.auth_service.register_user(&payload).await?;

    let body = RegisterResponse {
        mensagem: format!("Conta criada para {}! Agora você pode fazer login.", user.username),
    };
    Ok((StatusCode::CREATED, Json(body)))
}

// POST /login/
#[utoipa::path(
    post,
    path = "/login/",
    tag = "Auth",
    request_body = LoginUserPayload,
    responses(
        (status = 200, description = "JWT no corpo e no cookie 'sessao'", body = AuthResponse),
        (status = 401, description = "Credenciais inválidas")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginUserPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let token = app_state
        .auth_service
        .login_user(&payload.username, &payload.password)
        .await?;

    let cookie = Cookie::build((SESSION_COOKIE, token.clone()))
        .path("/")
        .http_only(true)
        .build();

    Ok((jar.add(cookie), Json(AuthResponse { token })))
}

// POST /logout/
pub async fn logout(jar: CookieJar) -> Response {
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (jar, flash::found("/")).into_response()
}
