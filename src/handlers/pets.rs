// src/handlers/pets.rs

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
    models::pet::{PetDetail, PetPayload},
};

// GET /{empresa}/pets/{slug}/  (e o alias /{empresa}/pet/{slug}/ do QR Code)
#[utoipa::path(
    get,
    path = "/{empresa}/pets/{slug}/",
    tag = "Pets",
    params(
        ("empresa" = String, Path, description = "Slug da empresa"),
        ("slug" = String, Path, description = "Slug do pet")
    ),
    responses(
        (status = 200, description = "Carteirinha pública do pet", body = PetDetail),
        (status = 404, description = "Empresa ou pet inexistente/inativo")
    )
)]
pub async fn pet_detail(
    State(app_state): State<AppState>,
    Path((empresa_slug, slug)): Path<(String, String)>,
) -> Result<Json<PetDetail>, AppError> {
    let empresa = app_state.empresa_service.find_active(&empresa_slug).await?;
    let detail = app_state.pet_service.detail(empresa, &slug).await?;
    Ok(Json(detail))
}

// GET /{empresa}/pets/
#[utoipa::path(
    get,
    path = "/{empresa}/pets/",
    tag = "Pets",
    params(("empresa" = String, Path, description = "Slug da empresa"), PageQuery),
    responses(
        (status = 200, description = "Pets ativos por nome, 12 por página"),
        (status = 302, description = "Sem login ou sem acesso à empresa"),
        (status = 404, description = "Página fora do intervalo")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_pets(
    State(app_state): State<AppState>,
    access: EmpresaAccess,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let page = app_state.pet_service.list(&access.empresa, query.page).await?;
    Ok(Json(page))
}

// POST /{empresa}/pets/novo/
#[utoipa::path(
    post,
    path = "/{empresa}/pets/novo/",
    tag = "Pets",
    params(("empresa" = String, Path, description = "Slug da empresa")),
    request_body = PetPayload,
    responses(
        (status = 201, description = "Pet criado; a empresa vem do tutor"),
        (status = 400, description = "Dados inválidos ou tutor fora da empresa"),
        (status = 302, description = "Sem login ou sem acesso à empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_pet(
    State(app_state): State<AppState>,
    access: EmpresaAccess,
    jar: CookieJar,
    Json(payload): Json<PetPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let pet = app_state.pet_service.create(&access.empresa, &payload).await?;

    let jar = jar.add(Flash::success("Pet cadastrado com sucesso!").into_cookie());
    Ok((StatusCode::CREATED, jar, Json(pet)))
}

// PUT /{empresa}/pets/{slug}/
pub async fn update_pet(
    State(app_state): State<AppState>,
    access: EmpresaAccess,
    Path((_, slug)): Path<(String, String)>,
    Json(payload): Json<PetPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let pet = app_state.pet_service.update(&access.empresa, &slug, &payload).await?;
    Ok(Json(pet))
}

// DELETE /{empresa}/pets/{slug}/
pub async fn deactivate_pet(
    State(app_state): State<AppState>,
    access: EmpresaAccess,
    Path((_, slug)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    app_state.pet_service.deactivate(&access.empresa, &slug).await?;
    Ok(StatusCode::NO_CONTENT)
}
