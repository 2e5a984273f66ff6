pub mod auth;
pub mod dashboard;
pub mod empresa;
pub mod nfc;
pub mod person;
pub mod pet;

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::Utc;
    use uuid::Uuid;

    use super::{
        empresa::Empresa,
        nfc::{CardOwner, NfcCard},
        person::Person,
        pet::{Especie, Pet},
    };

    pub fn empresa(nome: &str, slug: &str) -> Empresa {
        let now = Utc::now();
        Empresa {
            id: Uuid::new_v4(),
            nome: nome.into(),
            slug: slug.into(),
            descricao: String::new(),
            logo: None,
            cor_primaria: "#007bff".into(),
            cor_secundaria: "#6c757d".into(),
            email: String::new(),
            telefone: String::new(),
            website: String::new(),
            endereco: String::new(),
            ativo: true,
            criado_em: now,
            atualizado_em: now,
        }
    }

    pub fn person(empresa: &Empresa, nome: &str, slug: &str) -> Person {
        let now = Utc::now();
        Person {
            id: Uuid::new_v4(),
            empresa_id: empresa.id,
            slug: slug.into(),
            nome: nome.into(),
            email: "ana@acme.com".into(),
            telefone: "11999990000".into(),
            whatsapp: String::new(),
            cargo: "Diretora".into(),
            apresentacao: "Olá!".into(),
            foto: None,
            linkedin: String::new(),
            instagram: String::new(),
            facebook: String::new(),
            website: String::new(),
            linktree_url: String::new(),
            ativo: true,
            criado_em: now,
            atualizado_em: now,
        }
    }

    pub fn pet(tutor: &Person, nome: &str, slug: &str) -> Pet {
        let now = Utc::now();
        Pet {
            id: Uuid::new_v4(),
            empresa_id: tutor.empresa_id,
            tutor_id: tutor.id,
            slug: slug.into(),
            nome: nome.into(),
            especie: Especie::Cao,
            raca: "SRD".into(),
            porte: None,
            cor: String::new(),
            data_nascimento: None,
            foto: None,
            veterinario: String::new(),
            telefone_veterinario: String::new(),
            observacoes: String::new(),
            medicamentos: String::new(),
            alergias: String::new(),
            ativo: true,
            criado_em: now,
            atualizado_em: now,
        }
    }

    pub fn card(empresa: &Empresa, codigo: &str, owner: CardOwner) -> NfcCard {
        let now = Utc::now();
        NfcCard {
            id: Uuid::new_v4(),
            empresa_id: empresa.id,
            codigo_nfc: codigo.into(),
            owner,
            qr_code: None,
            ativo: true,
            criado_em: now,
            atualizado_em: now,
        }
    }
}
