//! Port trait definitions
//!
//! These traits define the interfaces that adapters must implement.

pub mod index;
pub mod spatial_ref;

pub use index::{DatasetIndex, DatasetStream};
pub use spatial_ref::SpatialRefCatalog;
