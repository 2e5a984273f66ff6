// src/app.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::{services::ServeDir, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers, middleware::auth::identify_user};

/// Monta o roteador completo da aplicação.
pub fn build_router(app_state: AppState) -> Router {
    // Contas e sessão
    let auth_routes = Router::new()
        .route("/registrar/", post(handlers::auth::register))
        .route("/login/", post(handlers::auth::login))
        .route("/logout/", get(handlers::auth::logout).post(handlers::auth::logout));

    // Área do dono da empresa
    let owner_routes = Router::new()
        .route("/dashboard/", get(handlers::empresa::dashboard))
        .route("/minha-empresa/", get(handlers::empresa::minha_empresa))
        .route(
            "/criar-empresa/",
            get(handlers::empresa::criar_empresa_form).post(handlers::empresa::criar_empresa),
        );

    // Leitura de cartões (sem empresa na URL)
    let nfc_routes = Router::new()
        .route("/nfc/{codigo}/", get(handlers::nfc::nfc_redirect))
        .route("/api/nfc/{codigo}/", get(handlers::nfc::api_nfc_info));

    // Tudo que vive sob /{empresa}/
    let empresa_routes = Router::new()
        .route("/{empresa}/", get(handlers::empresa::empresa_home))
        // --- Pessoas ---
        .route("/{empresa}/pessoas/", get(handlers::people::list_people))
        .route("/{empresa}/pessoas/nova/", post(handlers::people::create_person))
        .route(
            "/{empresa}/pessoas/{slug}/",
            get(handlers::people::person_detail)
                .put(handlers::people::update_person)
                .delete(handlers::people::deactivate_person),
        )
        .route("/{empresa}/pessoa/{slug}/", get(handlers::people::person_detail))
        // --- Pets ---
        .route("/{empresa}/pets/", get(handlers::pets::list_pets))
        .route("/{empresa}/pets/novo/", post(handlers::pets::create_pet))
        .route(
            "/{empresa}/pets/{slug}/",
            get(handlers::pets::pet_detail)
                .put(handlers::pets::update_pet)
                .delete(handlers::pets::deactivate_pet),
        )
        .route("/{empresa}/pet/{slug}/", get(handlers::pets::pet_detail))
        // --- NFC ---
        .route("/{empresa}/nfc/{codigo}/", get(handlers::nfc::nfc_redirect_empresa))
        .route("/{empresa}/api/nfc/{codigo}/", get(handlers::nfc::api_nfc_info_empresa))
        .route(
            "/{empresa}/cartoes/",
            get(handlers::cards::list_cards).post(handlers::cards::issue_card),
        )
        .route(
            "/{empresa}/cartoes/{codigo}/",
            put(handlers::cards::update_card).delete(handlers::cards::deactivate_card),
        );

    let media_root = app_state.config.media_root.clone();

    Router::new()
        .route("/", get(handlers::empresa::home))
        .route("/health", get(|| async { "OK" }))
        .merge(auth_routes)
        .merge(owner_routes)
        .merge(nfc_routes)
        .merge(empresa_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest_service("/media", ServeDir::new(media_root))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            identify_user,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
