//! Top-level error type for store operations.

use super::{CodecError, ConfigError};

/// Errors surfaced by the store's public operations.
/// Aggregates subsystem errors via `From` conversions.
#[derive(Debug, thiserror::Error)]
pub enum VisitError {
    #[error("max_visits must be at least 1, got {max_visits}")]
    InvalidCapacity { max_visits: usize },

    #[error("{field} of visit {visit_id} contains a NUL byte")]
    InteriorNul { visit_id: u32, field: &'static str },

    #[error("failed to persist store to {path}: {source}")]
    Persist {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

pub type VisitResult<T> = Result<T, VisitError>;
