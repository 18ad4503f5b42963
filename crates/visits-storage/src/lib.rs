//! # visits-storage
//!
//! Bounded per-user visit store. Every mutation rewrites the whole store to a
//! single binary file; the file is reloaded on the next `VisitStore::open`.

pub mod codec;
pub mod engine;
pub mod eviction;
pub mod user_visits;

pub use engine::{AddOutcome, VisitStore};
pub use user_visits::UserVisits;
pub use visits_core::{StoreConfig, Timestamp, Visit, VisitError, VisitResult};
