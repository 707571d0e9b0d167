//! Spatial reference resolution and caching

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::OnceCell;

use explorer_core::error::{ExplorerError, Result};
use explorer_core::models::Crs;
use explorer_core::ports::SpatialRefCatalog;

/// Built-in catalog of common EPSG codes
///
/// Used when no PostGIS `spatial_ref_sys` table is available.
#[derive(Debug, Clone)]
pub struct EpsgRegistry {
    target_srid: u32,
}

impl EpsgRegistry {
    pub fn new(target_srid: u32) -> Self {
        Self { target_srid }
    }

    /// Whether the registry knows this SRID
    pub fn is_registered(srid: u32) -> bool {
        matches!(
            srid,
            // Geographic: WGS 84, NAD83, GDA94, GDA2020
            4326 | 4269 | 4283 | 7844
            // Web Mercator, Australian Albers, Lambert (GA)
            | 3857 | 3577 | 3112
            // UTM zones (WGS 84 north and south)
            | 32601..=32660 | 32701..=32760
            // MGA zones (GDA94)
            | 28348..=28358
        )
    }
}

impl Default for EpsgRegistry {
    fn default() -> Self {
        Self::new(4326)
    }
}

#[async_trait]
impl SpatialRefCatalog for EpsgRegistry {
    async fn target_srid(&self) -> Result<u32> {
        Ok(self.target_srid)
    }

    async fn srid_name(&self, srid: u32) -> Result<Option<String>> {
        Ok(Self::is_registered(srid).then(|| format!("EPSG:{}", srid)))
    }
}

/// Cache statistics for SRID name lookups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheInfo {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Memoizing front for a [`SpatialRefCatalog`]
///
/// The target SRID is computed once. SRID names are cached per SRID; failed
/// lookups are never cached. Entries are never invalidated.
pub struct SpatialRefResolver {
    catalog: Arc<dyn SpatialRefCatalog>,
    target: OnceCell<u32>,
    names: RwLock<HashMap<u32, String>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl SpatialRefResolver {
    pub fn new(catalog: Arc<dyn SpatialRefCatalog>) -> Self {
        Self {
            catalog,
            target: OnceCell::new(),
            names: RwLock::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// SRID used for footprint unions
    pub async fn resolve_target_srid(&self) -> Result<u32> {
        let srid = self
            .target
            .get_or_try_init(|| async {
                let srid = self.catalog.target_srid().await?;
                tracing::debug!(srid, "Resolved target SRID");
                Ok::<_, ExplorerError>(srid)
            })
            .await?;
        Ok(*srid)
    }

    /// Authority name of an SRID, e.g. `EPSG:4326`
    pub async fn resolve_srid_name(&self, srid: u32) -> Result<String> {
        if let Some(name) = self.cached_name(srid) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(name);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        let name = self
            .catalog
            .srid_name(srid)
            .await?
            .ok_or(ExplorerError::UnknownSpatialReference { srid })?;

        self.names.write().unwrap().entry(srid).or_insert_with(|| name.clone());
        Ok(name)
    }

    /// Target SRID with its resolved name
    pub async fn resolve_target_crs(&self) -> Result<Crs> {
        let srid = self.resolve_target_srid().await?;
        let name = self.resolve_srid_name(srid).await?;
        Ok(Crs::new(srid, name))
    }

    pub fn cache_info(&self) -> CacheInfo {
        CacheInfo {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.names.read().unwrap().len(),
        }
    }

    fn cached_name(&self, srid: u32) -> Option<String> {
        self.names.read().unwrap().get(&srid).cloned()
    }
}

impl std::fmt::Debug for SpatialRefResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpatialRefResolver")
            .field("target", &self.target.get())
            .field("cache_info", &self.cache_info())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    /// Catalog that counts how often it is consulted
    struct CountingCatalog {
        inner: EpsgRegistry,
        target_calls: AtomicUsize,
        name_calls: AtomicUsize,
    }

    impl CountingCatalog {
        fn new() -> Self {
            Self {
                inner: EpsgRegistry::default(),
                target_calls: AtomicUsize::new(0),
                name_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SpatialRefCatalog for CountingCatalog {
        async fn target_srid(&self) -> Result<u32> {
            self.target_calls.fetch_add(1, Ordering::SeqCst);
            self.inner.target_srid().await
        }

        async fn srid_name(&self, srid: u32) -> Result<Option<String>> {
            self.name_calls.fetch_add(1, Ordering::SeqCst);
            self.inner.srid_name(srid).await
        }
    }

    #[tokio::test]
    async fn test_target_srid_is_memoized() {
        let catalog = Arc::new(CountingCatalog::new());
        let resolver = SpatialRefResolver::new(catalog.clone());

        let srid = resolver.resolve_target_srid().await.unwrap();
        let srid2 = resolver.resolve_target_srid().await.unwrap();

        assert_eq!(srid, 4326);
        assert_eq!(srid, srid2);
        assert_eq!(catalog.target_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_srid_name_cache_hits() {
        let catalog = Arc::new(CountingCatalog::new());
        let resolver = SpatialRefResolver::new(catalog.clone());
        let srid = resolver.resolve_target_srid().await.unwrap();

        assert_eq!(resolver.resolve_srid_name(srid).await.unwrap(), "EPSG:4326");
        let hits = resolver.cache_info().hits;

        assert_eq!(resolver.resolve_srid_name(srid).await.unwrap(), "EPSG:4326");
        assert!(resolver.cache_info().hits > hits);
        assert_eq!(catalog.name_calls.load(Ordering::SeqCst), 1);
        assert_eq!(resolver.cache_info().entries, 1);
    }

    #[tokio::test]
    async fn test_unknown_srid_is_not_cached() {
        let catalog = Arc::new(CountingCatalog::new());
        let resolver = SpatialRefResolver::new(catalog.clone());

        for _ in 0..2 {
            let err = resolver.resolve_srid_name(999_999).await.unwrap_err();
            assert!(matches!(err, ExplorerError::UnknownSpatialReference { srid: 999_999 }));
        }

        let info = resolver.cache_info();
        assert_eq!(info.entries, 0);
        assert_eq!(info.hits, 0);
        assert_eq!(info.misses, 2);
        assert_eq!(catalog.name_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_target_crs() {
        let resolver = SpatialRefResolver::new(Arc::new(EpsgRegistry::new(3577)));
        let crs = resolver.resolve_target_crs().await.unwrap();
        assert_eq!(crs, Crs::new(3577, "EPSG:3577"));
    }

    #[test]
    fn test_registry_covers_utm_zones() {
        assert!(EpsgRegistry::is_registered(32755));
        assert!(EpsgRegistry::is_registered(32601));
        assert!(!EpsgRegistry::is_registered(32661));
        assert!(!EpsgRegistry::is_registered(1234));
    }
}
