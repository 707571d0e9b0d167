//! In-memory implementations for development and testing.
//!
//! These implementations use `RwLock::unwrap()` intentionally. Lock poisoning
//! only occurs when another thread panicked while holding the lock, which is
//! an unrecoverable state. For production workloads, use the PostgreSQL backend.

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use explorer_core::error::Result;
use explorer_core::models::{
    DatasetId, DatasetQuery, DatasetSummary, StoredOverview, SummaryKey,
};
use explorer_core::ports::{DatasetIndex, DatasetStream};

use crate::ports::OverviewStore;

/// In-memory implementation of OverviewStore
///
/// Records are held behind `Arc`, so a store is a single pointer swap under
/// the write lock and readers never see a partially written overview.
#[derive(Debug, Clone, Default)]
pub struct MemoryOverviewStore {
    overviews: Arc<RwLock<BTreeMap<SummaryKey, StoredOverview>>>,
}

impl MemoryOverviewStore {
    /// Create a new in-memory overview store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of persisted overviews across all products
    pub fn len(&self) -> usize {
        self.overviews.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl OverviewStore for MemoryOverviewStore {
    async fn load(&self, key: &SummaryKey) -> Result<Option<StoredOverview>> {
        let overviews = self.overviews.read().unwrap();
        Ok(overviews.get(key).cloned())
    }

    async fn store(&self, key: &SummaryKey, overview: StoredOverview) -> Result<()> {
        let mut overviews = self.overviews.write().unwrap();
        overviews.insert(key.clone(), overview);
        Ok(())
    }

    async fn mark_stale(&self, product: &str) -> Result<usize> {
        let mut overviews = self.overviews.write().unwrap();
        let mut flagged = 0;
        for (_, stored) in overviews.iter_mut().filter(|(k, _)| k.product_name() == product) {
            if !stored.stale {
                stored.stale = true;
                flagged += 1;
            }
        }
        Ok(flagged)
    }

    async fn list_keys(&self, product: &str) -> Result<Vec<SummaryKey>> {
        let overviews = self.overviews.read().unwrap();
        Ok(overviews.keys().filter(|k| k.product_name() == product).cloned().collect())
    }

    async fn delete_product(&self, product: &str) -> Result<usize> {
        let mut overviews = self.overviews.write().unwrap();
        let before = overviews.len();
        overviews.retain(|k, _| k.product_name() != product);
        Ok(before - overviews.len())
    }
}

/// In-memory implementation of DatasetIndex
#[derive(Debug, Clone, Default)]
pub struct MemoryDatasetIndex {
    datasets: Arc<RwLock<HashMap<DatasetId, DatasetSummary>>>,
}

impl MemoryDatasetIndex {
    /// Create a new in-memory dataset index
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an index holding the given datasets
    pub fn with_datasets(datasets: impl IntoIterator<Item = DatasetSummary>) -> Self {
        let index = Self::new();
        index.add_all(datasets);
        index
    }

    /// Add or replace a dataset
    pub fn add(&self, dataset: DatasetSummary) {
        let mut datasets = self.datasets.write().unwrap();
        datasets.insert(dataset.id, dataset);
    }

    pub fn add_all(&self, new: impl IntoIterator<Item = DatasetSummary>) {
        let mut datasets = self.datasets.write().unwrap();
        for dataset in new {
            datasets.insert(dataset.id, dataset);
        }
    }

    /// Archive a dataset, returning false if it is unknown
    pub fn archive(&self, id: DatasetId, at: chrono::DateTime<chrono::Utc>) -> bool {
        let mut datasets = self.datasets.write().unwrap();
        match datasets.get_mut(&id) {
            Some(dataset) => {
                dataset.archived_time = Some(at);
                true
            }
            None => false,
        }
    }

    /// Matching datasets in identifier order
    fn matching(&self, query: &DatasetQuery) -> Vec<DatasetSummary> {
        let datasets = self.datasets.read().unwrap();
        let mut matched: Vec<DatasetSummary> =
            datasets.values().filter(|d| query.matches(d)).cloned().collect();
        matched.sort_by_key(|d| d.id);
        matched
    }
}

#[async_trait]
impl DatasetIndex for MemoryDatasetIndex {
    async fn count(&self, query: &DatasetQuery) -> Result<u64> {
        let datasets = self.datasets.read().unwrap();
        Ok(datasets.values().filter(|d| query.matches(d)).count() as u64)
    }

    async fn search(&self, query: &DatasetQuery) -> Result<DatasetStream<'_>> {
        Ok(stream::iter(self.matching(query).into_iter().map(Ok)).boxed())
    }

    async fn products(&self) -> Result<Vec<String>> {
        let datasets = self.datasets.read().unwrap();
        let mut products: Vec<String> = datasets.values().map(|d| d.product.clone()).collect();
        products.sort();
        products.dedup();
        Ok(products)
    }
}
