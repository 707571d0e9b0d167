//! CRS transformation

use crate::models::Crs;
use explorer_core::error::{ExplorerError, Result};
use geo::{Coord, MapCoords, MultiPolygon};
use proj::Proj;

/// Check if two CRS are the same
pub fn crs_match(crs1: &Crs, crs2: &Crs) -> bool {
    crs1.epsg == crs2.epsg
}

/// Reproject a footprint from one CRS to another
///
/// `dataset_id` is only used to label errors.
pub fn reproject_footprint(
    footprint: &MultiPolygon,
    from_crs: &Crs,
    to_crs: &Crs,
    dataset_id: &str,
) -> Result<MultiPolygon> {
    // If CRS are the same, no transformation needed
    if crs_match(from_crs, to_crs) {
        return Ok(footprint.clone());
    }

    let from_proj = from_crs.identifier();
    let to_proj = to_crs.identifier();

    let proj = Proj::new_known_crs(&from_proj, &to_proj, None).map_err(|e| {
        ExplorerError::InconsistentGeometry {
            dataset_id: dataset_id.to_string(),
            reason: format!("Failed to create projection from {} to {}: {}", from_proj, to_proj, e),
        }
    })?;
    let proj = &proj;

    footprint
        .try_map_coords(|coord| proj.convert((coord.x, coord.y)).map(|(x, y)| Coord { x, y }))
        .map_err(|e| ExplorerError::InconsistentGeometry {
            dataset_id: dataset_id.to_string(),
            reason: format!("Projection from {} to {} failed: {}", from_proj, to_proj, e),
        })
}
