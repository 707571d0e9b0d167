use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::TryStreamExt;

use crate::error::Result;
use crate::models::{DatasetQuery, DatasetSummary, TimeBounds};

/// Lazily produced search results
pub type DatasetStream<'a> = BoxStream<'a, Result<DatasetSummary>>;

/// Port for the external dataset index
#[async_trait]
pub trait DatasetIndex: Send + Sync {
    /// Count datasets matching the query
    async fn count(&self, query: &DatasetQuery) -> Result<u64>;

    /// Stream datasets matching the query
    async fn search(&self, query: &DatasetQuery) -> Result<DatasetStream<'_>>;

    /// Names of all products known to the index
    async fn products(&self) -> Result<Vec<String>>;

    /// Earliest and latest time of the product's active datasets
    ///
    /// Returns `None` when the product has no active datasets.
    async fn time_bounds(&self, product: &str) -> Result<Option<TimeBounds>> {
        let mut stream = self.search(&DatasetQuery::for_product(product)).await?;
        let mut bounds: Option<TimeBounds> = None;
        while let Some(dataset) = stream.try_next().await? {
            match bounds.as_mut() {
                Some(b) => b.include(dataset.time),
                None => bounds = Some(TimeBounds::at(dataset.time)),
            }
        }
        Ok(bounds)
    }
}
