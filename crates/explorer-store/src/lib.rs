//! Dataset Explorer Store - Overview persistence ports and adapters
//!
//! This crate defines the overview persistence port and provides in-memory
//! and PostgreSQL adapters, plus an in-memory dataset index.

pub mod memory;
pub mod ports;
pub mod postgres;
