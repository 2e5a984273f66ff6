// src/handlers/people.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use validator::Validate;

use crate::{
    common::{error::AppError, flash::Flash, pagination::PageQuery},
    config::AppState,
    middleware::tenancy::EmpresaAccess,
    models::person::{PersonDetail, PersonPayload},
};

// GET /{empresa}/pessoas/{slug}/  (e o alias /{empresa}/pessoa/{slug}/ do QR Code)
#[utoipa::path(
    get,
    path = "/{empresa}/pessoas/{slug}/",
    tag = "Pessoas",
    params(
        ("empresa" = String, Path, description = "Slug da empresa"),
        ("slug" = String, Path, description = "Slug da pessoa")
    ),
    responses(
        (status = 200, description = "Cartão de visita público", body = PersonDetail),
        (status = 404, description = "Empresa ou pessoa inexistente/inativa")
    )
)]
pub async fn person_detail(
    State(app_state): State<AppState>,
    Path((empresa_slug, slug)): Path<(String, String)>,
) -> Result<Json<PersonDetail>, AppError> {
    let empresa = app_state.empresa_service.find_active(&empresa_slug).await?;
    let detail = app_state.person_service.detail(empresa, &slug).await?;
    Ok(Json(detail))
}

// GET /{empresa}/pessoas/
#[utoipa::path(
    get,
    path = "/{empresa}/pessoas/",
    tag = "Pessoas",
    params(("empresa" = String, Path, description = "Slug da empresa"), PageQuery),
    responses(
        (status = 200, description = "Pessoas ativas por nome, 12 por página"),
        (status = 302, description = "Sem login ou sem acesso à empresa"),
        (status = 404, description = "Página fora do intervalo")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_people(
    State(app_state): State<AppState>,
    access: EmpresaAccess,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let page = app_state.person_service.list(&access.empresa, query.page).await?;
    Ok(Json(page))
}

// POST /{empresa}/pessoas/nova/
#[utoipa::path(
    post,
    path = "/{empresa}/pessoas/nova/",
    tag = "Pessoas",
    params(("empresa" = String, Path, description = "Slug da empresa")),
    request_body = PersonPayload,
    responses(
        (status = 201, description = "Pessoa criada com slug gerado a partir do nome"),
        (status = 400, description = "Dados inválidos"),
        (status = 302, description = "Sem login ou sem acesso à empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_person(
    State(app_state): State<AppState>,
    access: EmpresaAccess,
    jar: CookieJar,
    Json(payload): Json<PersonPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let pessoa = app_state.person_service.create(&access.empresa, &payload).await?;

    let jar = jar.add(Flash::success("Pessoa cadastrada com sucesso!").into_cookie());
    Ok((StatusCode::CREATED, jar, Json(pessoa)))
}

// PUT /{empresa}/pessoas/{slug}/
pub async fn update_person(
    State(app_state): State<AppState>,
    access: EmpresaAccess,
    Path((_, slug)): Path<(String, String)>,
    Json(payload): Json<PersonPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let pessoa = app_state.person_service.update(&access.empresa, &slug, &payload).await?;
    Ok(Json(pessoa))
}

// DELETE /{empresa}/pessoas/{slug}/
pub async fn deactivate_person(
    State(app_state): State<AppState>,
    access: EmpresaAccess,
    Path((_, slug)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    app_state.person_service.deactivate(&access.empresa, &slug).await?;
    Ok(StatusCode::NO_CONTENT)
}

