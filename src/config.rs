// src/config.rs

use std::{env, path::PathBuf, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::storage::MediaStorage,
    db::{EmpresaRepository, NfcCardRepository, PersonRepository, PetRepository, UserRepository},
    services::{
        auth::AuthService, dashboard_service::DashboardService, empresa_service::EmpresaService,
        nfc_service::NfcService, person_service::PersonService, pet_service::PetService,
    },
};

pub const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_MEDIA_ROOT: &str = "./media";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Configuração lida do ambiente (e do `.env`, se existir).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub public_base_url: String,
    pub media_root: PathBuf,
    pub bind_addr: String,
    pub max_connections: u32,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Igual a `from_env`, mas com a fonte das variáveis injetada.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = lookup("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("DATABASE_MAX_CONNECTIONS inválido: {}", raw))?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            public_base_url: lookup("PUBLIC_BASE_URL")
                .unwrap_or_else(|| DEFAULT_PUBLIC_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            media_root: lookup("MEDIA_ROOT")
                .unwrap_or_else(|| DEFAULT_MEDIA_ROOT.to_string())
                .into(),
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            max_connections,
        })
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Config,
    pub storage: MediaStorage,
    pub auth_service: AuthService,
    pub empresa_service: EmpresaService,
    pub person_service: PersonService,
    pub pet_service: PetService,
    pub nfc_service: NfcService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::with_pool(config, db_pool))
    }

    // --- Monta o gráfico de dependências ---
    pub fn with_pool(config: Config, db_pool: PgPool) -> Self {
        let storage = MediaStorage::new(config.media_root.clone(), &config.public_base_url);

        let user_repo = UserRepository::new(db_pool.clone());
        let empresa_repo = EmpresaRepository::new(db_pool.clone());
        let person_repo = PersonRepository::new(db_pool.clone());
        let pet_repo = PetRepository::new(db_pool.clone());
        let card_repo = NfcCardRepository::new(db_pool.clone());

        let auth_service = AuthService::new(user_repo.clone(), config.jwt_secret.clone(), db_pool.clone());
        let empresa_service = EmpresaService::new(empresa_repo.clone(), user_repo, db_pool.clone());
        let person_service = PersonService::new(
            person_repo.clone(),
            card_repo.clone(),
            storage.clone(),
            db_pool.clone(),
        );
        let pet_service = PetService::new(
            pet_repo.clone(),
            person_repo.clone(),
            card_repo.clone(),
            storage.clone(),
            db_pool.clone(),
        );
        let nfc_service = NfcService::new(
            card_repo,
            empresa_repo.clone(),
            person_repo.clone(),
            pet_repo.clone(),
            storage.clone(),
            config.public_base_url.clone(),
            db_pool.clone(),
        );
        let dashboard_service = DashboardService::new(empresa_repo, person_repo, pet_repo);

        Self {
            db_pool,
            config,
            storage,
            auth_service,
            empresa_service,
            person_service,
            pet_service,
            nfc_service,
            dashboard_service,
        }
    }
}
