//! Configuration schema and loading for the AgroGuard service.
//!
//! This crate owns the config file format (JSON5), field defaults, and the
//! environment overrides applied on top of whatever was loaded from disk.

mod error;
mod model;

/// Public error type returned by config loading and validation APIs.
pub use error::ConfigError;
/// Configuration schema models.
pub use model::*;
