// src/common/storage.rs

use std::path::PathBuf;

use crate::common::error::AppError;

/// Pastas lógicas onde cada tipo de arquivo é guardado.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    EmpresaLogos,
    Pessoas,
    Pets,
    QrCodes,
}

impl Bucket {
    pub fn prefix(&self) -> &'static str {
        match self {
            Bucket::EmpresaLogos => "empresas/logos",
            Bucket::Pessoas => "pessoas",
            Bucket::Pets => "pets",
            Bucket::QrCodes => "qr_codes",
        }
    }

    /// Confere se uma referência já armazenada (ex: "pessoas/ana.jpg") pertence a esta pasta.
    pub fn check_reference(&self, reference: &str) -> Result<(), AppError> {
        let file_name = reference
            .strip_prefix(self.prefix())
            .and_then(|rest| rest.strip_prefix('/'));

        match file_name {
            Some(name) if is_plain_file_name(name) => Ok(()),
            _ => Err(AppError::InvalidMediaReference(reference.to_string())),
        }
    }
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !name.contains('\\')
}

/// Armazenamento de mídia em disco, servido publicamente em `/media/`.
#[derive(Debug, Clone)]
pub struct MediaStorage {
    root: PathBuf,
    public_base_url: String,
}

impl MediaStorage {
    pub fn new(root: impl Into<PathBuf>, public_base_url: &str) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Grava o arquivo e devolve a referência relativa ("qr_codes/qr_ABC.png").
    pub async fn save(&self, bucket: Bucket, file_name: &str, bytes: &[u8]) -> Result<String, AppError> {
        if !is_plain_file_name(file_name) {
            return Err(AppError::InvalidMediaReference(file_name.to_string()));
        }

        let dir = self.root.join(bucket.prefix());
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(dir.join(file_name), bytes).await?;

        let reference = format!("{}/{}", bucket.prefix(), file_name);
        tracing::debug!("📁 Arquivo salvo em {}", reference);
        Ok(reference)
    }

    /// Apaga um arquivo gravado por uma operação que não chegou ao fim.
    pub async fn discard(&self, reference: &str) {
        if let Err(e) = tokio::fs::remove_file(self.root.join(reference)).await {
            tracing::warn!("Não foi possível apagar {}: {}", reference, e);
        }
    }

    /// URL pública absoluta de uma referência armazenada.
    pub fn url(&self, reference: &str) -> String {
        format!("{}/media/{}", self.public_base_url, reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn references_must_live_in_their_bucket() {
        assert!(Bucket::Pessoas.check_reference("pessoas/ana.jpg").is_ok());
        assert!(Bucket::EmpresaLogos.check_reference("empresas/logos/acme.png").is_ok());

        assert!(Bucket::Pessoas.check_reference("pets/rex.jpg").is_err());
        assert!(Bucket::Pessoas.check_reference("pessoas/../segredo").is_err());
        assert!(Bucket::Pessoas.check_reference("pessoas/").is_err());
        assert!(Bucket::Pets.check_reference("petsx/rex.jpg").is_err());
    }

    #[tokio::test]
    async fn save_writes_into_bucket() {
        let dir = tempfile::tempdir().unwrap();
        let storage = MediaStorage::new(dir.path(), "https://cartoes.example/");

        let reference = storage.save(Bucket::QrCodes, "qr_ABC123.png", b"png").await.unwrap();

        assert_eq!(reference, "qr_codes/qr_ABC123.png");
        assert_eq!(std::fs::read(dir.path().join(&reference)).unwrap(), b"png");
        assert_eq!(
            storage.url(&reference),
            "https://cartoes.example/media/qr_codes/qr_ABC123.png"
        );
    }

    #[tokio::test]
    async fn discard_removes_saved_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = MediaStorage::new(dir.path(), "http://localhost:3000");

        let reference = storage.save(Bucket::QrCodes, "qr_XYZ.png", b"png").await.unwrap();
        storage.discard(&reference).await;

        assert!(!dir.path().join(&reference).exists());
        // Apagar de novo só registra o aviso
        storage.discard(&reference).await;
    }

    #[tokio::test]
    async fn save_rejects_path_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let storage = MediaStorage::new(dir.path(), "http://localhost:3000");

        let result = storage.save(Bucket::QrCodes, "../fora.png", b"x").await;
        assert!(matches!(result, Err(AppError::InvalidMediaReference(_))));
    }
}
