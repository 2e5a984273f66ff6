// src/handlers/cards.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::tenancy::EmpresaAccess,
    models::nfc::{CardView, IssueCardPayload, UpdateCardPayload},
};

// GET /{empresa}/cartoes/
#[utoipa::path(
    get,
    path = "/{empresa}/cartoes/",
    tag = "Cartões",
    params(("empresa" = String, Path, description = "Slug da empresa")),
    responses(
        (status = 200, description = "Cartões da empresa, mais recentes primeiro", body = Vec<CardView>),
        (status = 302, description = "Sem login ou sem acesso à empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_cards(
    State(app_state): State<AppState>,
    access: EmpresaAccess,
) -> Result<Json<Vec<CardView>>, AppError> {
    let cards = app_state.nfc_service.list(&access.empresa).await?;
    Ok(Json(cards))
}

// POST /{empresa}/cartoes/
#[utoipa::path(
    post,
    path = "/{empresa}/cartoes/",
    tag = "Cartões",
    params(("empresa" = String, Path, description = "Slug da empresa")),
    request_body = IssueCardPayload,
    responses(
        (status = 201, description = "Cartão emitido (QR gerado se houver dono)", body = CardView),
        (status = 400, description = "Código inválido ou pessoa e pet ao mesmo tempo"),
        (status = 404, description = "Pessoa ou pet inexistente na empresa"),
        (status = 409, description = "Código NFC já cadastrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn issue_card(
    State(app_state): State<AppState>,
    access: EmpresaAccess,
    Json(payload): Json<IssueCardPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let card = app_state.nfc_service.issue(&access.empresa, &payload).await?;
    Ok((StatusCode::CREATED, Json(card.view(&app_state.storage))))
}

// PUT /{empresa}/cartoes/{codigo}/
#[utoipa::path(
    put,
    path = "/{empresa}/cartoes/{codigo}/",
    tag = "Cartões",
    params(
        ("empresa" = String, Path, description = "Slug da empresa"),
        ("codigo" = String, Path, description = "Código do cartão")
    ),
    request_body = UpdateCardPayload,
    responses(
        (status = 200, description = "Vínculo/status atualizados", body = CardView),
        (status = 404, description = "Cartão inexistente na empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_card(
    State(app_state): State<AppState>,
    access: EmpresaAccess,
    Path((_empresa, codigo)): Path<(String, String)>,
    Json(payload): Json<UpdateCardPayload>,
) -> Result<Json<CardView>, AppError> {
    let card = app_state.nfc_service.update(&access.empresa, &codigo, &payload).await?;
    Ok(Json(card.view(&app_state.storage)))
}

// DELETE /{empresa}/cartoes/{codigo}/
pub async fn deactivate_card(
    State(app_state): State<AppState>,
    access: EmpresaAccess,
    Path((_, codigo)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    app_state.nfc_service.deactivate(&access.empresa, &codigo).await?;
    Ok(StatusCode::NO_CONTENT)
}
