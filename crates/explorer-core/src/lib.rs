//! Dataset Explorer Core - Domain models, ports, and configuration
//!
//! This crate contains the period overview model, the summary key, and the
//! port definitions for the dataset index and spatial reference catalog.

pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod ports;

pub use error::{ExplorerError, Result};
