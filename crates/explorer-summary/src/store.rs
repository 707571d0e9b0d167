use futures::TryStreamExt;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::{Arc, Mutex};

use explorer_core::clock::{Clock, SystemClock};
use explorer_core::config::SummarySettings;
use explorer_core::error::{ExplorerError, Result};
use explorer_core::models::{
    DatasetQuery, StoredOverview, SummaryKey, SummaryState, TimePeriodOverview,
};
use explorer_core::ports::{DatasetIndex, SpatialRefCatalog};
use explorer_geo::srid::SpatialRefResolver;
use explorer_store::ports::OverviewStore;

use crate::aggregate::OverviewBuilder;

/// Generates, persists and serves period overviews
///
/// Generation for one key is serialized; different keys generate
/// concurrently. A record is written only after its generation succeeded, in
/// a single store call, so readers see either the previous record or the new
/// one.
pub struct SummaryStore {
    index: Arc<dyn DatasetIndex>,
    overviews: Arc<dyn OverviewStore>,
    resolver: SpatialRefResolver,
    clock: Arc<dyn Clock>,
    settings: SummarySettings,
    generation_locks: Mutex<HashMap<SummaryKey, Arc<tokio::sync::Mutex<()>>>>,
}

impl SummaryStore {
    pub fn new(
        index: Arc<dyn DatasetIndex>,
        overviews: Arc<dyn OverviewStore>,
        catalog: Arc<dyn SpatialRefCatalog>,
        settings: SummarySettings,
    ) -> Self {
        Self {
            index,
            overviews,
            resolver: SpatialRefResolver::new(catalog),
            clock: Arc::new(SystemClock),
            settings,
            generation_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Use a different time source for `generated_at`
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn settings(&self) -> &SummarySettings {
        &self.settings
    }

    pub fn srid_resolver(&self) -> &SpatialRefResolver {
        &self.resolver
    }

    /// The persisted overview, or `None` if it was never generated
    pub async fn get(&self, key: &SummaryKey) -> Result<Option<Arc<TimePeriodOverview>>> {
        Ok(self.overviews.load(key).await?.map(|stored| stored.overview))
    }

    /// The persisted overview with its generation metadata
    pub async fn get_stored(&self, key: &SummaryKey) -> Result<Option<StoredOverview>> {
        self.overviews.load(key).await
    }

    /// Compute the overview from the index and persist it
    pub async fn generate(&self, key: &SummaryKey) -> Result<Arc<TimePeriodOverview>> {
        let lock = self.generation_lock(key);
        let _guard = lock.lock().await;

        let overview = self.compute(key).await?;
        self.persist(key, overview).await
    }

    /// Serve the persisted overview, generating it first when it is absent or stale
    pub async fn get_or_update(&self, key: &SummaryKey) -> Result<Arc<TimePeriodOverview>> {
        match self.overviews.load(key).await? {
            Some(stored) if !stored.stale => Ok(stored.overview),
            Some(_) => {
                tracing::debug!(key = %key, "Regenerating stale overview");
                self.generate(key).await
            }
            None => self.generate(key).await,
        }
    }

    /// Presentation-facing name for [`SummaryStore::get`]
    pub async fn get_overview(&self, key: &SummaryKey) -> Result<Option<Arc<TimePeriodOverview>>> {
        self.get(key).await
    }

    /// Presentation-facing name for [`SummaryStore::generate`]
    pub async fn trigger_generation(&self, key: &SummaryKey) -> Result<Arc<TimePeriodOverview>> {
        self.generate(key).await
    }

    /// Regenerate every overview of a product
    ///
    /// Months in the product's time bounds come from the index; their years
    /// and the product overview are combined from them. Any other persisted
    /// key (days, and periods whose datasets have all been archived) is then
    /// regenerated from the index, so no stored record is left out of date.
    pub async fn refresh_all(&self, product: &str) -> Result<()> {
        let product_key = SummaryKey::product(product)?;
        let bounds = self.with_index_timeout(self.index.time_bounds(product)).await?;
        let mut refreshed = HashSet::new();

        let dataset_count = match bounds {
            Some(bounds) => {
                tracing::info!(
                    product,
                    first = %bounds.first,
                    last = %bounds.last,
                    "Refreshing overviews"
                );

                let mut years = Vec::new();
                for year in bounds.years() {
                    let mut months = Vec::with_capacity(12);
                    for month in 1..=12 {
                        let key = SummaryKey::month(product, year, month)?;
                        months.push(self.generate(&key).await?);
                        refreshed.insert(key);
                    }
                    let key = SummaryKey::year(product, year)?;
                    years.push(self.combine_into(&key, &months).await?);
                    refreshed.insert(key);
                }
                self.combine_into(&product_key, &years).await?.dataset_count
            }
            None => {
                tracing::info!(product, "Product has no datasets");
                self.generate(&product_key).await?.dataset_count
            }
        };
        refreshed.insert(product_key);

        let remaining: Vec<SummaryKey> = self
            .overviews
            .list_keys(product)
            .await?
            .into_iter()
            .filter(|key| !refreshed.contains(key))
            .collect();
        for key in &remaining {
            self.generate(key).await?;
        }

        tracing::info!(
            product,
            dataset_count,
            combined = refreshed.len(),
            direct = remaining.len(),
            "Refreshed product overviews"
        );
        Ok(())
    }

    /// Whether a key was never generated, is out of date, or is current
    pub async fn summary_state(&self, key: &SummaryKey) -> Result<SummaryState> {
        Ok(self
            .overviews
            .load(key)
            .await?
            .map(|stored| stored.state())
            .unwrap_or(SummaryState::Absent))
    }

    /// Flag every persisted overview of a product as out of date
    ///
    /// Called when datasets of the product were added, archived or changed.
    pub async fn mark_stale(&self, product: &str) -> Result<usize> {
        let flagged = self.overviews.mark_stale(product).await?;
        tracing::info!(product, flagged, "Marked overviews stale");
        Ok(flagged)
    }

    /// Keys with a persisted overview, in time order
    pub async fn list_generated(&self, product: &str) -> Result<Vec<SummaryKey>> {
        self.overviews.list_keys(product).await
    }

    /// Remove every persisted overview of a product
    pub async fn drop_product(&self, product: &str) -> Result<usize> {
        let removed = self.overviews.delete_product(product).await?;
        tracing::info!(product, removed, "Dropped product overviews");
        Ok(removed)
    }

    async fn compute(&self, key: &SummaryKey) -> Result<TimePeriodOverview> {
        // Fails before touching the index when the target SRID is unknown
        let target = self.resolver.resolve_target_crs().await?;

        let window = key.time_window();
        let period = key.timeline_period(self.settings.product_timeline_period);
        let query = DatasetQuery::for_product(key.product_name()).time(window);
        let mut builder =
            OverviewBuilder::new(period, window, target, self.settings.geometry_validity);

        let expected = self.with_index_timeout(self.index.count(&query)).await?;
        if expected > 0 {
            self.with_index_timeout(async {
                let mut stream = self.index.search(&query).await?;
                while let Some(dataset) = stream.try_next().await? {
                    builder.add_dataset(&dataset);
                }
                Ok::<_, ExplorerError>(())
            })
            .await?;
        }

        builder.finish()
    }

    async fn combine_into(
        &self,
        key: &SummaryKey,
        parts: &[Arc<TimePeriodOverview>],
    ) -> Result<Arc<TimePeriodOverview>> {
        let lock = self.generation_lock(key);
        let _guard = lock.lock().await;

        let target = self.resolver.resolve_target_crs().await?;
        let mut builder = OverviewBuilder::new(
            key.timeline_period(self.settings.product_timeline_period),
            key.time_window(),
            target,
            self.settings.geometry_validity,
        );
        for part in parts {
            builder.add_overview(part);
        }

        let overview = builder.finish()?;
        self.persist(key, overview).await
    }

    async fn persist(
        &self,
        key: &SummaryKey,
        overview: TimePeriodOverview,
    ) -> Result<Arc<TimePeriodOverview>> {
        debug_assert!(overview.is_consistent(), "inconsistent overview for {}", key);

        tracing::info!(
            key = %key,
            dataset_count = overview.dataset_count,
            footprint_count = overview.footprint_count,
            "Generated overview"
        );

        let stored = StoredOverview::new(overview, self.clock.now());
        let overview = Arc::clone(&stored.overview);
        self.overviews.store(key, stored).await?;
        Ok(overview)
    }

    async fn with_index_timeout<T>(&self, fut: impl Future<Output = Result<T>>) -> Result<T> {
        let timeout = self.settings.index_timeout;
        tokio::time::timeout(timeout, fut).await.map_err(|_| {
            ExplorerError::index_unavailable(format!(
                "no response within {}s",
                timeout.as_secs_f64()
            ))
        })?
    }

    fn generation_lock(&self, key: &SummaryKey) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.generation_locks.lock().unwrap();
        Arc::clone(locks.entry(key.clone()).or_default())
    }
}

impl std::fmt::Debug for SummaryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SummaryStore")
            .field("settings", &self.settings)
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}

