// src/handlers/empresa.rs

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        flash::{self, Flash},
    },
    config::AppState,
    middleware::auth::{AuthenticatedUser, MaybeUser},
    models::{
        auth::CurrentUser,
        dashboard::{EmpresaOverview, HomePage},
        empresa::{CreateEmpresaPayload, COR_PRIMARIA_PADRAO, COR_SECUNDARIA_PADRAO},
    },
};

// Quem já tem empresa não cria outra
fn already_has_empresa(user: &CurrentUser) -> Option<Response> {
    user.profile.empresa_id.map(|_| {
        flash::redirect_with(
            "/minha-empresa/",
            Flash::info("Você já possui uma empresa cadastrada."),
        )
    })
}

// GET /
#[utoipa::path(
    get,
    path = "/",
    tag = "Empresas",
    responses(
        (status = 200, description = "Empresas ativas e totais globais (anônimo)", body = HomePage),
        (status = 302, description = "Usuário logado vai para /dashboard/ ou /criar-empresa/")
    )
)]
pub async fn home(
    State(app_state): State<AppState>,
    MaybeUser(user): MaybeUser,
    jar: CookieJar,
) -> Result<Response, AppError> {
    if let Some(user) = user {
        let destino = if user.empresa_slug.is_some() { "/dashboard/" } else { "/criar-empresa/" };
        return Ok(flash::found(destino));
    }

    let (jar, mensagem) = Flash::take(jar);
    let page = app_state.dashboard_service.home(mensagem).await?;
    Ok((jar, Json(page)).into_response())
}

// GET /{empresa}/
#[utoipa::path(
    get,
    path = "/{empresa}/",
    tag = "Empresas",
    params(("empresa" = String, Path, description = "Slug da empresa")),
    responses(
        (status = 200, description = "Página inicial da empresa", body = EmpresaOverview),
        (status = 404, description = "Empresa inexistente ou inativa")
    )
)]
pub async fn empresa_home(
    State(app_state): State<AppState>,
    Path(empresa_slug): Path<String>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    let empresa = app_state.empresa_service.find_active(&empresa_slug).await?;
    let (jar, mensagem) = Flash::take(jar);
    let overview = app_state.dashboard_service.overview(empresa, mensagem).await?;
    Ok((jar, Json(overview)))
}

// GET /dashboard/
#[utoipa::path(
    get,
    path = "/dashboard/",
    tag = "Empresas",
    responses(
        (status = 200, description = "Resumo da empresa do usuário", body = EmpresaOverview),
        (status = 302, description = "Sem login ou sem empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn dashboard(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let Some(slug) = user.empresa_slug.as_deref() else {
        return Ok(flash::found("/criar-empresa/"));
    };

    let empresa = app_state.empresa_service.find_active(slug).await?;
    let (jar, mensagem) = Flash::take(jar);
    let overview = app_state.dashboard_service.overview(empresa, mensagem).await?;
    Ok((jar, Json(overview)).into_response())
}

// GET /minha-empresa/
pub async fn minha_empresa(AuthenticatedUser(user): AuthenticatedUser) -> Result<Response, AppError> {
    match (user.empresa_slug.as_deref(), user.profile.empresa_id) {
        (Some(slug), _) => Ok(flash::found(&format!("/{}/", slug))),
        // Vinculado a uma empresa desativada: não há para onde ir
        (None, Some(_)) => Err(AppError::EmpresaNotFound),
        (None, None) => Ok(flash::redirect_with(
            "/criar-empresa/",
            Flash::warning("Você precisa criar uma empresa primeiro."),
        )),
    }
}

/// Valores iniciais do formulário de criação.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CriarEmpresaPage {
    pub cor_primaria: &'static str,
    pub cor_secundaria: &'static str,
    #[schema(value_type = Option<Object>)]
    pub mensagem: Option<Flash>,
}

// GET /criar-empresa/
pub async fn criar_empresa_form(
    AuthenticatedUser(user): AuthenticatedUser,
    jar: CookieJar,
) -> Response {
    if let Some(redirect) = already_has_empresa(&user) {
        return redirect;
    }

    let (jar, mensagem) = Flash::take(jar);
    let page = CriarEmpresaPage {
        cor_primaria: COR_PRIMARIA_PADRAO,
        cor_secundaria: COR_SECUNDARIA_PADRAO,
        mensagem,
    };
    (jar, Json(page)).into_response()
}

// POST /criar-empresa/
#[utoipa::path(
    post,
    path = "/criar-empresa/",
    tag = "Empresas",
    request_body = CreateEmpresaPayload,
    responses(
        (status = 302, description = "Criada: redireciona para /{empresa}/ com mensagem"),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "Slug já em uso")
    ),
    security(("api_jwt" = []))
)]
pub async fn criar_empresa(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateEmpresaPayload>,
) -> Result<Response, AppError> {
    if let Some(redirect) = already_has_empresa(&user) {
        return Ok(redirect);
    }

    payload.validate()?;

    let empresa = app_state.empresa_service.create_for_owner(&user, &payload).await?;

    Ok(flash::redirect_with(
        &empresa.home_path(),
        Flash::success(format!("Empresa \"{}\" criada com sucesso!", empresa.nome)),
    ))
}
