//! Persisted record types.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Account record in the database.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Account {
    pub id: i64,
    pub email: String,
    pub username: String,
    /// Argon2 PHC string; never serialized into responses.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// One classification event, immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionRecord {
    pub id: i64,
    pub account_id: i64,
    pub image_name: String,
    pub predicted_class: String,
    /// Winning class probability in [0,1], not renormalized.
    pub confidence: f64,
    pub treatment: String,
    pub medicine: String,
    pub created_at: DateTime<Utc>,
}

/// Fields for inserting a new prediction.
#[derive(Debug, Clone)]
pub struct NewPrediction {
    pub account_id: i64,
    pub image_name: String,
    pub predicted_class: String,
    pub confidence: f64,
    pub treatment: String,
    pub medicine: String,
}

/// Pointer to a rendered report document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRecord {
    pub id: i64,
    pub account_id: i64,
    pub prediction_id: i64,
    pub file_path: String,
    pub created_at: DateTime<Utc>,
}

/// Report row joined with its prediction's label and confidence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportListing {
    pub id: i64,
    pub account_id: i64,
    pub prediction_id: i64,
    pub file_path: String,
    pub created_at: DateTime<Utc>,
    pub predicted_class: String,
    pub confidence: f64,
}
