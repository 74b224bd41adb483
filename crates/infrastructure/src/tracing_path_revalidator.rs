use async_trait::async_trait;
use lectern_application::PathRevalidator;
use lectern_core::{AppError, AppResult};

/// Path revalidator that records invalidations in the application log.
///
/// Used when no rendering frontend is wired up to receive cache purges.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingPathRevalidator;

#[async_trait]
impl PathRevalidator for TracingPathRevalidator {
    async fn revalidate_path(&self, path: &str) -> AppResult<()> {
        if !path.starts_with('/') {
            return Err(AppError::Validation(format!(
                "revalidation path '{path}' must be absolute"
            )));
        }

        tracing::info!(path, "revalidated path");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use lectern_application::PathRevalidator;
    use lectern_core::AppError;

    use super::TracingPathRevalidator;

    #[tokio::test]
    async fn accepts_absolute_paths_only() {
        let revalidator = TracingPathRevalidator;

        assert!(revalidator.revalidate_path("/blogs/intro").await.is_ok());
        assert!(matches!(
            revalidator.revalidate_path("blogs/intro").await,
            Err(AppError::Validation(_))
        ));
    }
}
