//! HTTP orchestration layer for AgroGuard.
//!
//! Stateless per request: every handler resolves the caller's identity,
//! drives the store/classifier/renderer, and translates component failures
//! into the HTTP error taxonomy.

mod error;
mod identity;
mod routes;
mod state;

pub use error::ApiError;
pub use identity::current_account;
pub use routes::router;
pub use state::AppState;
