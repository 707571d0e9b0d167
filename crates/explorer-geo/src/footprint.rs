//! Footprint union accumulation

use std::collections::BTreeSet;

use explorer_core::error::Result;
use explorer_core::models::{Crs, Footprint, Geometry, ValidityMode};
use geo::{BooleanOps, MultiPolygon};

use crate::models::{from_multi_polygon, to_multi_polygon};
use crate::transform::reproject_footprint;
use crate::validation::validate_footprint;

/// Accumulates the union of dataset footprints in a target CRS
///
/// Also tracks how many datasets contributed and which source CRSes they were
/// in. Footprints are folded in the order they are added, so callers wanting a
/// deterministic result must add them in a stable order.
#[derive(Debug)]
pub struct FootprintUnion {
    target: Crs,
    mode: ValidityMode,
    union: Option<MultiPolygon>,
    count: u64,
    crses: BTreeSet<String>,
    skipped: u64,
}

/// The finished union
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FootprintSummary {
    pub geometry: Option<Geometry>,
    pub count: u64,
    pub crses: BTreeSet<String>,
    pub skipped: u64,
}

impl FootprintUnion {
    pub fn new(target: Crs, mode: ValidityMode) -> Self {
        Self { target, mode, union: None, count: 0, crses: BTreeSet::new(), skipped: 0 }
    }

    /// Add one dataset's footprint
    ///
    /// Returns `Ok(true)` when the footprint contributed. An unusable footprint
    /// is skipped (`Ok(false)`) in lenient mode and is an error in strict mode.
    pub fn add(&mut self, dataset_id: &str, footprint: &Footprint) -> Result<bool> {
        match self.prepare(dataset_id, footprint) {
            Ok(polygons) => {
                self.merge(&polygons);
                self.count += 1;
                self.crses.insert(footprint.crs.identifier());
                Ok(true)
            }
            Err(err) if self.mode == ValidityMode::Lenient => {
                tracing::warn!(
                    dataset_id = %dataset_id,
                    crs = %footprint.crs.identifier(),
                    error = %err,
                    "Skipping dataset footprint"
                );
                self.skipped += 1;
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    /// Fold in an already-unioned footprint in the target CRS
    ///
    /// Used when combining finer period overviews into a coarser one.
    pub fn add_union(&mut self, geometry: &Geometry, count: u64, crses: &BTreeSet<String>) {
        if let Some(polygons) = to_multi_polygon(geometry) {
            self.merge(&polygons);
        }
        self.count += count;
        self.crses.extend(crses.iter().cloned());
    }

    pub fn finish(self) -> FootprintSummary {
        FootprintSummary {
            geometry: self.union.as_ref().and_then(from_multi_polygon),
            count: self.count,
            crses: self.crses,
            skipped: self.skipped,
        }
    }

    fn prepare(&self, dataset_id: &str, footprint: &Footprint) -> Result<MultiPolygon> {
        let polygons = to_multi_polygon(&footprint.geometry).ok_or_else(|| {
            explorer_core::ExplorerError::InconsistentGeometry {
                dataset_id: dataset_id.to_string(),
                reason: format!("{:?} footprint is not areal", footprint.geometry.geometry_type()),
            }
        })?;

        if let Some(err) = validate_footprint(&polygons).into_error(dataset_id) {
            return Err(err);
        }

        reproject_footprint(&polygons, &footprint.crs, &self.target, dataset_id)
    }

    fn merge(&mut self, polygons: &MultiPolygon) {
        self.union = Some(match self.union.take() {
            Some(current) => current.union(polygons),
            None => polygons.clone(),
        });
    }
}
