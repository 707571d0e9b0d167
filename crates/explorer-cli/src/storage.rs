use anyhow::Result;
use explorer_core::config::SummarySettings;
use explorer_core::ports::{DatasetIndex, SpatialRefCatalog};
use explorer_geo::srid::EpsgRegistry;
use explorer_store::memory::{MemoryDatasetIndex, MemoryOverviewStore};
use explorer_store::ports::OverviewStore;
use explorer_store::postgres::{PostgresConfig, PostgresStore};
use std::path::Path;
use std::sync::Arc;

use crate::cli::StorageBackend;
use crate::datasets::load_datasets;
use crate::errors;

/// Adapters the summary store runs against
pub struct Storage {
    pub index: Arc<dyn DatasetIndex>,
    pub overviews: Arc<dyn OverviewStore>,
    pub catalog: Arc<dyn SpatialRefCatalog>,
}

impl Storage {
    pub async fn open(
        backend: StorageBackend,
        datasets: Option<&Path>,
        settings: &SummarySettings,
    ) -> Result<Self> {
        let index = Arc::new(open_index(datasets)?);

        match backend {
            StorageBackend::Memory => Ok(Self {
                index,
                overviews: Arc::new(MemoryOverviewStore::new()),
                catalog: Arc::new(EpsgRegistry::new(settings.target_srid)),
            }),
            StorageBackend::Postgres => {
                let store = Arc::new(connect_postgres().await?.with_target_srid(settings.target_srid));
                Ok(Self { index, overviews: store.clone(), catalog: store })
            }
        }
    }
}

/// Dataset index loaded from a FeatureCollection, or empty
fn open_index(datasets: Option<&Path>) -> Result<MemoryDatasetIndex> {
    let Some(path) = datasets else {
        return Ok(MemoryDatasetIndex::new());
    };

    let loaded = load_datasets(path)
        .map_err(|e| errors::dataset_file_invalid(&path.display().to_string(), e))?;
    tracing::info!(path = %path.display(), datasets = loaded.len(), "Loaded dataset index");
    Ok(MemoryDatasetIndex::with_datasets(loaded))
}

/// Connect using DATABASE_URL, applying migrations when EXPLORER_AUTO_MIGRATE is set
pub async fn connect_postgres() -> Result<PostgresStore> {
    let config = PostgresConfig::from_env().map_err(errors::database_not_configured)?;
    let url = config.database_url.clone();

    let store = PostgresStore::new(config)
        .await
        .map_err(|e| errors::database_connection_failed(&url, e))?;
    Ok(store)
}
