use async_trait::async_trait;
use explorer_core::error::Result;
use explorer_core::models::{StoredOverview, SummaryKey};

/// Port for persisting generated period overviews
///
/// `store` must replace atomically: a concurrent `load` observes either the
/// previous record or the new one in full.
#[async_trait]
pub trait OverviewStore: Send + Sync {
    /// Load the overview persisted under a key
    async fn load(&self, key: &SummaryKey) -> Result<Option<StoredOverview>>;

    /// Persist an overview, replacing any prior record for the key
    async fn store(&self, key: &SummaryKey, overview: StoredOverview) -> Result<()>;

    /// Flag every overview of a product as stale, returning how many were flagged
    async fn mark_stale(&self, product: &str) -> Result<usize>;

    /// Keys with a persisted overview for a product, in key order
    async fn list_keys(&self, product: &str) -> Result<Vec<SummaryKey>>;

    /// Remove every overview of a product, returning how many were removed
    async fn delete_product(&self, product: &str) -> Result<usize>;
}
