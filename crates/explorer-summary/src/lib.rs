//! Explorer Summary - Period overview generation
//!
//! This crate implements the summary use cases: generating per-product,
//! per-year, per-month and per-day overviews from the dataset index, keeping
//! them persisted, and serving them back.

pub mod aggregate;
pub mod store;

pub use aggregate::OverviewBuilder;
pub use store::SummaryStore;
