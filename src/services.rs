pub mod auth;
pub mod dashboard_service;
pub mod empresa_service;
pub mod nfc_service;
pub mod person_service;
pub mod pet_service;
pub mod qr_service;

use std::future::Future;

use crate::common::{error::AppError, slug::SLUG_MAX_ATTEMPTS};

/// Repete `attempt` enquanto o INSERT esbarrar no UNIQUE do slug.
/// Cada tentativa recalcula o slug a partir de uma nova consulta.
pub(crate) async fn retry_on_slug_conflict<T, F, Fut>(entidade: &str, mut attempt: F) -> Result<T, AppError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
{
    let mut ultimo = String::new();
    for tentativa in 1..=SLUG_MAX_ATTEMPTS {
        match attempt().await {
            Err(AppError::SlugConflict(slug)) => {
                tracing::warn!(
                    "⚠️ Slug '{}' de {} ocupado por outra gravação ({}/{}), recalculando",
                    slug,
                    entidade,
                    tentativa,
                    SLUG_MAX_ATTEMPTS
                );
                ultimo = slug;
            }
            other => return other,
        }
    }
    Err(AppError::SlugConflict(ultimo))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn retries_only_slug_conflicts() {
        let calls = AtomicUsize::new(0);
        let counter = &calls;
        let result = retry_on_slug_conflict("pessoa", move || async move {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            if n < 2 {
                Err(AppError::SlugConflict(format!("ana-silva-{}", n)))
            } else {
                Ok("ana-silva-2")
            }
        })
        .await;

        assert_eq!(result.unwrap(), "ana-silva-2");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let calls = AtomicUsize::new(0);
        let counter = &calls;
        let result: Result<(), _> = retry_on_slug_conflict("pet", move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(AppError::SlugConflict("rex".into()))
        })
        .await;

        assert!(matches!(result, Err(AppError::SlugConflict(_))));
        assert_eq!(calls.load(Ordering::SeqCst), SLUG_MAX_ATTEMPTS);
    }

    #[tokio::test]
    async fn other_errors_are_not_retried() {
        let calls = AtomicUsize::new(0);
        let counter = &calls;
        let result: Result<(), _> = retry_on_slug_conflict("empresa", move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(AppError::TutorNotFound)
        })
        .await;

        assert!(matches!(result, Err(AppError::TutorNotFound)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
