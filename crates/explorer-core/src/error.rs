//! Error types for the dataset explorer

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExplorerError {
    // Summary key errors
    #[error("Invalid summary key {key}: {reason}")]
    InvalidSummaryKey { key: String, reason: String },

    // Dataset index errors
    #[error("Dataset index unavailable: {reason}")]
    IndexUnavailable { reason: String },

    // Spatial reference errors
    #[error("Unknown spatial reference: SRID {srid} is not registered")]
    UnknownSpatialReference { srid: u32 },

    #[error("Inconsistent geometry for dataset {dataset_id}: {reason}")]
    InconsistentGeometry { dataset_id: String, reason: String },

    // Persistence errors
    #[error("Summary persistence failed: {0}")]
    Persistence(String),

    // Configuration errors
    #[error("Missing required configuration: {key}")]
    ConfigMissing { key: String },

    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ExplorerError {
    /// Shorthand for an index failure with a displayable cause
    pub fn index_unavailable(reason: impl std::fmt::Display) -> Self {
        ExplorerError::IndexUnavailable { reason: reason.to_string() }
    }
}

impl From<serde_json::Error> for ExplorerError {
    fn from(err: serde_json::Error) -> Self {
        ExplorerError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ExplorerError>;
