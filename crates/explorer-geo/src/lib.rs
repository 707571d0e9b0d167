//! Dataset Explorer Geo - Geometry, CRS, and footprint operations
//!
//! This crate handles geometry conversion and validation, reprojection into
//! the target SRID, footprint unions, and spatial reference resolution.

pub mod footprint;
pub mod models;
pub mod srid;
pub mod transform;
pub mod validation;
