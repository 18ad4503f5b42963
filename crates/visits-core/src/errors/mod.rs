//! Error handling for the recent-visits store.
//! One error enum per subsystem, `thiserror` only.

pub mod codec_error;
pub mod config_error;
pub mod visit_error;

pub use codec_error::CodecError;
pub use config_error::ConfigError;
pub use visit_error::{VisitError, VisitResult};
