// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,

        // --- Empresas ---
        handlers::empresa::home,
        handlers::empresa::empresa_home,
        handlers::empresa::dashboard,
        handlers::empresa::criar_empresa,

        // --- Pessoas ---
        handlers::people::person_detail,
        handlers::people::list_people,
        handlers::people::create_person,

        // --- Pets ---
        handlers::pets::pet_detail,
        handlers::pets::list_pets,
        handlers::pets::create_pet,

        // --- NFC ---
        handlers::nfc::api_nfc_info,
        handlers::nfc::api_nfc_info_empresa,

        // --- Cartões ---
        handlers::cards::list_cards,
        handlers::cards::issue_card,
        handlers::cards::update_card,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::User,
            models::auth::UserProfile,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,
            models::auth::RegisterResponse,

            // --- Empresas ---
            models::empresa::Empresa,
            models::empresa::CreateEmpresaPayload,
            models::dashboard::Totais,
            models::dashboard::EmpresaOverview,
            models::dashboard::HomePage,

            // --- Pessoas ---
            models::person::Person,
            models::person::PersonPayload,
            models::person::PersonDetail,

            // --- Pets ---
            models::pet::Especie,
            models::pet::Porte,
            models::pet::Pet,
            models::pet::PetPayload,
            models::pet::PetDetail,

            // --- NFC ---
            models::nfc::CardKind,
            models::nfc::CardView,
            models::nfc::IssueCardPayload,
            models::nfc::UpdateCardPayload,
            models::nfc::NfcInfo,
        )
    ),
    tags(
        (name = "Auth", description = "Registro, login e sessão"),
        (name = "Empresas", description = "Empresas (tenants) e painel"),
        (name = "Pessoas", description = "Cartões de visita digitais"),
        (name = "Pets", description = "Carteirinhas de pets"),
        (name = "NFC", description = "Resolução pública de códigos NFC"),
        (name = "Cartões", description = "Emissão e vínculo de cartões NFC")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
