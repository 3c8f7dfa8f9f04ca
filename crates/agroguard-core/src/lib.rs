//! Domain primitives for AgroGuard.
//!
//! This crate owns the disease catalog, the credential service (password
//! hashing and signed session tokens), and usage statistics aggregation
//! shared by the server and the report pipeline.

pub mod auth;
pub mod catalog;
pub mod stats;

pub use auth::{AuthError, TokenClaims, TokenIssuer, hash_password, verify_password};
/// Closed set of disease classes and their static advisories.
pub use catalog::{Advisory, DiseaseClass, advisory_for_key, display_name_for_key};
pub use stats::{UsageStats, aggregate_stats};
