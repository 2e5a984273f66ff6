// src/models/dashboard.rs

use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::{
    common::flash::Flash,
    models::{empresa::Empresa, person::Person, pet::Pet},
};

// Quantos registros "recentes" aparecem na página da empresa
pub const RECENTES_LIMIT: i64 = 5;

// 1. Contadores (apenas registros ativos)
#[derive(Debug, Clone, Copy, Default, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Totais {
    pub total_pessoas: i64,
    pub total_pets: i64,
    pub total_cartoes: i64,
}

// 2. Página inicial de uma empresa (e o dashboard do dono)
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmpresaOverview {
    pub empresa: Empresa,
    #[serde(flatten)]
    pub totais: Totais,
    pub pessoas_recentes: Vec<Person>,
    pub pets_recentes: Vec<Pet>,
    #[schema(value_type = Option<Object>)]
    pub mensagem: Option<Flash>,
}

// 3. Página inicial pública: empresas ativas e números globais
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HomePage {
    pub empresas: Vec<Empresa>,
    #[serde(flatten)]
    pub totais: Totais,
    #[schema(value_type = Option<Object>)]
    pub mensagem: Option<Flash>,
}
