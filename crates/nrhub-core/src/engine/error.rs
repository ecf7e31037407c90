use thiserror::Error;

use super::config::ConfigError;
use crate::core::geometry::discrepancy::GeometryError;
use crate::core::io::traits::StoreError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Data store error: {source}")]
    Store {
        #[from]
        source: StoreError,
    },

    #[error("Geometry computation failed: {source}")]
    Geometry {
        #[from]
        source: GeometryError,
    },

    #[error("Configuration error: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Internal logic error: {0}")]
    Internal(String),
}
