use async_trait::async_trait;
use explorer_core::error::{ExplorerError, Result};
use explorer_core::ports::SpatialRefCatalog;

use super::PostgresStore;

#[async_trait]
impl SpatialRefCatalog for PostgresStore {
    async fn target_srid(&self) -> Result<u32> {
        Ok(self.target_srid)
    }

    async fn srid_name(&self, srid: u32) -> Result<Option<String>> {
        let srid = i32::try_from(srid)
            .map_err(|_| ExplorerError::UnknownSpatialReference { srid })?;

        sqlx::query_scalar::<_, String>(
            "SELECT auth_name || ':' || auth_srid FROM spatial_ref_sys WHERE srid = $1",
        )
        .bind(srid)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ExplorerError::Persistence(format!("Failed to look up SRID {}: {}", srid, e)))
    }
}
