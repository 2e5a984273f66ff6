// src/services/dashboard_service.rs

use crate::{
    common::{error::AppError, flash::Flash},
    db::{EmpresaRepository, PersonRepository, PetRepository},
    models::{
        dashboard::{EmpresaOverview, HomePage, RECENTES_LIMIT},
        empresa::Empresa,
    },
};

#[derive(Clone)]
pub struct DashboardService {
    empresa_repo: EmpresaRepository,
    person_repo: PersonRepository,
    pet_repo: PetRepository,
}

impl DashboardService {
    pub fn new(empresa_repo: EmpresaRepository, person_repo: PersonRepository, pet_repo: PetRepository) -> Self {
        Self { empresa_repo, person_repo, pet_repo }
    }

    pub async fn home(&self, mensagem: Option<Flash>) -> Result<HomePage, AppError> {
        let empresas = self.empresa_repo.list_active().await?;
        let totais = self.empresa_repo.totais_globais().await?;
        Ok(HomePage { empresas, totais, mensagem })
    }

    /// Contadores e últimos cadastros de uma empresa.
    pub async fn overview(&self, empresa: Empresa, mensagem: Option<Flash>) -> Result<EmpresaOverview, AppError> {
        let totais = self.empresa_repo.totais(empresa.id).await?;
        let pessoas_recentes = self.person_repo.recent(empresa.id, RECENTES_LIMIT).await?;
        let pets_recentes = self.pet_repo.recent(empresa.id, RECENTES_LIMIT).await?;

        Ok(EmpresaOverview {
            empresa,
            totais,
            pessoas_recentes,
            pets_recentes,
            mensagem,
        })
    }
}
