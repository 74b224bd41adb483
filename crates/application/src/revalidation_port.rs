use async_trait::async_trait;
use lectern_core::AppResult;

/// Port used to invalidate cached renderings of a page after a mutation.
#[async_trait]
pub trait PathRevalidator: Send + Sync {
    /// Marks the cached rendering of `path` as stale.
    async fn revalidate_path(&self, path: &str) -> AppResult<()>;
}
