use async_trait::async_trait;

use crate::error::Result;

/// Port for looking up spatial reference systems
#[async_trait]
pub trait SpatialRefCatalog: Send + Sync {
    /// SRID that footprint unions are computed in
    async fn target_srid(&self) -> Result<u32>;

    /// Authority name of an SRID (e.g. `EPSG:4326`), or `None` if unregistered
    async fn srid_name(&self, srid: u32) -> Result<Option<String>>;
}
