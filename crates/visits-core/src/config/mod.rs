//! Configuration for the recent-visits store.
//! TOML-based, with environment overrides on top of compiled defaults.

pub mod defaults;
pub mod store_config;

pub use store_config::StoreConfig;
