//! # visits-core
//!
//! Foundation crate for the recent-visits store.
//! Defines the visit record types, errors, config, and constants.
//! The storage crate depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod visit;

// Re-export the most commonly used types at the crate root.
pub use config::StoreConfig;
pub use errors::{CodecError, ConfigError, VisitError, VisitResult};
pub use visit::{Timestamp, Visit};
