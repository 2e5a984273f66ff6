pub mod empresa_repo;
pub use empresa_repo::EmpresaRepository;
pub mod nfc_repo;
pub use nfc_repo::NfcCardRepository;
pub mod person_repo;
pub use person_repo::PersonRepository;
pub mod pet_repo;
pub use pet_repo::PetRepository;
pub mod user_repo;
pub use user_repo::UserRepository;

/// Nome da constraint quando o erro é uma violação de UNIQUE.
pub(crate) fn unique_violation(e: &sqlx::Error) -> Option<&str> {
    match e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => db_err.constraint(),
        _ => None,
    }
}
