//! Durable storage for AgroGuard: accounts, predictions, and reports.
//!
//! One SQLite file holds all three tables. Every write is a single atomic
//! row insert and every read is a single row or one ordered row set, so no
//! multi-row transactions are needed.

mod database;
mod error;
mod records;

pub use database::Database;
pub use error::StoreError;
pub use records::{Account, NewPrediction, PredictionRecord, ReportListing, ReportRecord};
