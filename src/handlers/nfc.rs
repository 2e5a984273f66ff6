// src/handlers/nfc.rs

use axum::{
    extract::{Path, State},
    response::Response,
    Json,
};

use crate::{
    common::{
        error::AppError,
        flash::{self, Flash},
    },
    config::AppState,
    models::nfc::{NfcInfo, ResolvedCard},
};

// Falhas conhecidas voltam para `fallback` com mensagem; o resto propaga.
fn redirect_for(result: Result<ResolvedCard, AppError>, fallback: &str) -> Result<Response, AppError> {
    match result {
        Ok(resolved) => Ok(flash::found(&resolved.target_path())),
        Err(AppError::CardNotFound) => Ok(flash::redirect_with(
            fallback,
            Flash::error("Código NFC não encontrado."),
        )),
        Err(AppError::CardNotAssociated) => Ok(flash::redirect_with(
            fallback,
            Flash::error("Cartão NFC não está associado a nenhum cadastro."),
        )),
        Err(e) => Err(e),
    }
}

fn project(app_state: &AppState, resolved: &ResolvedCard) -> NfcInfo {
    let nfc = &app_state.nfc_service;
    NfcInfo::project(resolved, nfc.public_base_url(), nfc.storage())
}

// GET /nfc/{codigo}/
pub async fn nfc_redirect(
    State(app_state): State<AppState>,
    Path(codigo): Path<String>,
) -> Result<Response, AppError> {
    redirect_for(app_state.nfc_service.resolve(&codigo, None).await, "/")
}

// GET /{empresa}/nfc/{codigo}/
pub async fn nfc_redirect_empresa(
    State(app_state): State<AppState>,
    Path((empresa_slug, codigo)): Path<(String, String)>,
) -> Result<Response, AppError> {
    let fallback = format!("/{}/", empresa_slug);
    redirect_for(
        app_state.nfc_service.resolve(&codigo, Some(&empresa_slug)).await,
        &fallback,
    )
}

// GET /api/nfc/{codigo}/
#[utoipa::path(
    get,
    path = "/api/nfc/{codigo}/",
    tag = "NFC",
    params(("codigo" = String, Path, description = "Código gravado no cartão")),
    responses(
        (status = 200, description = "Dados públicos do dono do cartão", body = NfcInfo),
        (status = 404, description = "Código NFC não encontrado / Cartão não associado")
    )
)]
pub async fn api_nfc_info(
    State(app_state): State<AppState>,
    Path(codigo): Path<String>,
) -> Result<Json<NfcInfo>, AppError> {
    let resolved = app_state.nfc_service.resolve(&codigo, None).await?;
    Ok(Json(project(&app_state, &resolved)))
}

// GET /{empresa}/api/nfc/{codigo}/
#[utoipa::path(
    get,
    path = "/{empresa}/api/nfc/{codigo}/",
    tag = "NFC",
    params(
        ("empresa" = String, Path, description = "Slug da empresa"),
        ("codigo" = String, Path, description = "Código gravado no cartão")
    ),
    responses(
        (status = 200, description = "Dados públicos do dono do cartão", body = NfcInfo),
        (status = 404, description = "Empresa, código ou vínculo inexistente")
    )
)]
pub async fn api_nfc_info_empresa(
    State(app_state): State<AppState>,
    Path((empresa_slug, codigo)): Path<(String, String)>,
) -> Result<Json<NfcInfo>, AppError> {
    let resolved = app_state.nfc_service.resolve(&codigo, Some(&empresa_slug)).await?;
    Ok(Json(project(&app_state, &resolved)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, StatusCode};

    use crate::models::{
        fixtures,
        nfc::{CardOwner, CardTarget},
    };

    #[test]
    fn resolved_card_redirects_to_profile() {
        let acme = fixtures::empresa("Acme", "acme");
        let ana = fixtures::person(&acme, "Ana Silva", "ana-silva");
        let rex = fixtures::pet(&ana, "Rex", "rex");
        let resolved = ResolvedCard {
            card: fixtures::card(&acme, "PET001", CardOwner::Pet(rex.id)),
            empresa: acme,
            target: CardTarget::Pet { pet: rex, tutor: ana },
        };

        let response = redirect_for(Ok(resolved), "/").unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], "/acme/pets/rex/");
    }

    #[test]
    fn unknown_and_unbound_codes_go_back_with_message() {
        for (err, fallback) in [(AppError::CardNotFound, "/"), (AppError::CardNotAssociated, "/acme/")] {
            let response = redirect_for(Err(err), fallback).unwrap();
            assert_eq!(response.status(), StatusCode::FOUND);
            assert_eq!(response.headers()[header::LOCATION], fallback);
            assert!(response.headers().get(header::SET_COOKIE).is_some());
        }
    }

    #[test]
    fn missing_empresa_is_not_swallowed() {
        assert!(matches!(
            redirect_for(Err(AppError::EmpresaNotFound), "/acme/"),
            Err(AppError::EmpresaNotFound)
        ));
    }
}
