//! SQLite-backed persistence gateway.

use crate::error::StoreError;
use crate::records::{Account, NewPrediction, PredictionRecord, ReportListing, ReportRecord};
use chrono::Utc;
use log::{debug, info};
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::path::Path;

/// Shared handle over the single storage file.
///
/// Statements are short and auto-committing; a mutex serializes access to
/// the underlying connection across request handlers.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) the storage file and ensure the schema exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path.as_ref())?;
        let db = Self::from_connection(conn)?;
        info!("opened storage file (path={})", path.as_ref().display());
        Ok(db)
    }

    /// In-memory database for tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
            CREATE TABLE IF NOT EXISTS accounts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                email TEXT UNIQUE NOT NULL,
                username TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS predictions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                account_id INTEGER NOT NULL,
                image_name TEXT NOT NULL,
                predicted_class TEXT NOT NULL,
                confidence REAL NOT NULL,
                treatment TEXT NOT NULL,
                medicine TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY (account_id) REFERENCES accounts(id)
            );
            CREATE TABLE IF NOT EXISTS reports (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                account_id INTEGER NOT NULL,
                prediction_id INTEGER NOT NULL,
                file_path TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY (account_id) REFERENCES accounts(id),
                FOREIGN KEY (prediction_id) REFERENCES predictions(id)
            );",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Insert a new account, returning its id.
    ///
    /// A duplicate email or username surfaces as [`StoreError::AccountExists`].
    pub fn create_account(
        &self,
        email: &str,
        username: &str,
        password_hash: &str,
    ) -> Result<i64, StoreError> {
        let conn = self.conn.lock();
        let result = conn.execute(
            "INSERT INTO accounts (email, username, password_hash, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![email, username, password_hash, Utc::now()],
        );
        match result {
            Ok(_) => {
                let id = conn.last_insert_rowid();
                info!("created account (id={}, email={})", id, email);
                Ok(id)
            }
            Err(err) if is_unique_violation(&err) => Err(StoreError::AccountExists),
            Err(err) => Err(err.into()),
        }
    }

    /// Look up an account by email.
    pub fn account_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let conn = self.conn.lock();
        let account = conn
            .query_row(
                "SELECT id, email, username, password_hash, created_at
                 FROM accounts WHERE email = ?1",
                params![email],
                account_from_row,
            )
            .optional()?;
        Ok(account)
    }

    /// Look up an account by id.
    pub fn account_by_id(&self, id: i64) -> Result<Option<Account>, StoreError> {
        let conn = self.conn.lock();
        let account = conn
            .query_row(
                "SELECT id, email, username, password_hash, created_at
                 FROM accounts WHERE id = ?1",
                params![id],
                account_from_row,
            )
            .optional()?;
        Ok(account)
    }

    /// Create the demo account if it does not exist yet.
    ///
    /// Returns the new id, or `None` when the account was already present.
    pub fn seed_demo_account(&self, password_hash: &str) -> Result<Option<i64>, StoreError> {
        const DEMO_EMAIL: &str = "demo@agroguard.com";
        if self.account_by_email(DEMO_EMAIL)?.is_some() {
            debug!("demo account already exists");
            return Ok(None);
        }
        let id = self.create_account(DEMO_EMAIL, "demo_user", password_hash)?;
        info!("seeded demo account (id={})", id);
        Ok(Some(id))
    }

    /// Insert a prediction, returning its id.
    pub fn insert_prediction(&self, prediction: &NewPrediction) -> Result<i64, StoreError> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO predictions
                 (account_id, image_name, predicted_class, confidence, treatment, medicine, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                prediction.account_id,
                prediction.image_name,
                prediction.predicted_class,
                prediction.confidence,
                prediction.treatment,
                prediction.medicine,
                Utc::now(),
            ],
        )?;
        let id = conn.last_insert_rowid();
        debug!(
            "inserted prediction (id={}, account_id={}, class={})",
            id, prediction.account_id, prediction.predicted_class
        );
        Ok(id)
    }

    /// Look up a prediction by id.
    pub fn prediction_by_id(&self, id: i64) -> Result<Option<PredictionRecord>, StoreError> {
        let conn = self.conn.lock();
        let prediction = conn
            .query_row(
                "SELECT id, account_id, image_name, predicted_class, confidence,
                        treatment, medicine, created_at
                 FROM predictions WHERE id = ?1",
                params![id],
                prediction_from_row,
            )
            .optional()?;
        Ok(prediction)
    }

    /// All predictions owned by an account, newest first.
    pub fn predictions_for_account(
        &self,
        account_id: i64,
    ) -> Result<Vec<PredictionRecord>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, account_id, image_name, predicted_class, confidence,
                    treatment, medicine, created_at
             FROM predictions WHERE account_id = ?1
             ORDER BY created_at DESC, id DESC",
        )?;
        let rows = stmt.query_map(params![account_id], prediction_from_row)?;
        let predictions = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(predictions)
    }

    /// Insert a report pointer, returning its id.
    pub fn insert_report(
        &self,
        account_id: i64,
        prediction_id: i64,
        file_path: &str,
    ) -> Result<i64, StoreError> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO reports (account_id, prediction_id, file_path, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![account_id, prediction_id, file_path, Utc::now()],
        )?;
        let id = conn.last_insert_rowid();
        debug!(
            "inserted report (id={}, account_id={}, prediction_id={})",
            id, account_id, prediction_id
        );
        Ok(id)
    }

    /// Look up a report by id.
    pub fn report_by_id(&self, id: i64) -> Result<Option<ReportRecord>, StoreError> {
        let conn = self.conn.lock();
        let report = conn
            .query_row(
                "SELECT id, account_id, prediction_id, file_path, created_at
                 FROM reports WHERE id = ?1",
                params![id],
                |row| {
                    Ok(ReportRecord {
                        id: row.get(0)?,
                        account_id: row.get(1)?,
                        prediction_id: row.get(2)?,
                        file_path: row.get(3)?,
                        created_at: row.get(4)?,
                    })
                },
            )
            .optional()?;
        Ok(report)
    }

    /// All reports owned by an account, newest first, joined with the
    /// referenced prediction's label and confidence.
    pub fn reports_for_account(&self, account_id: i64) -> Result<Vec<ReportListing>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT reports.id, reports.account_id, reports.prediction_id,
                    reports.file_path, reports.created_at,
                    predictions.predicted_class, predictions.confidence
             FROM reports
             JOIN predictions ON reports.prediction_id = predictions.id
             WHERE reports.account_id = ?1
             ORDER BY reports.created_at DESC, reports.id DESC",
        )?;
        let rows = stmt.query_map(params![account_id], |row| {
            Ok(ReportListing {
                id: row.get(0)?,
                account_id: row.get(1)?,
                prediction_id: row.get(2)?,
                file_path: row.get(3)?,
                created_at: row.get(4)?,
                predicted_class: row.get(5)?,
                confidence: row.get(6)?,
            })
        })?;
        let reports = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(reports)
    }
}

/// True when the error is a UNIQUE constraint violation.
fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

fn account_from_row(row: &Row<'_>) -> rusqlite::Result<Account> {
    Ok(Account {
        id: row.get(0)?,
        email: row.get(1)?,
        username: row.get(2)?,
        password_hash: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn prediction_from_row(row: &Row<'_>) -> rusqlite::Result<PredictionRecord> {
    Ok(PredictionRecord {
        id: row.get(0)?,
        account_id: row.get(1)?,
        image_name: row.get(2)?,
        predicted_class: row.get(3)?,
        confidence: row.get(4)?,
        treatment: row.get(5)?,
        medicine: row.get(6)?,
        created_at: row.get(7)?,
    })
}

#[cfg(test)]
mod tests {
    use super::Database;
    use crate::error::StoreError;
    use crate::records::NewPrediction;
    use pretty_assertions::assert_eq;

    fn new_prediction(account_id: i64, class: &str) -> NewPrediction {
        NewPrediction {
            account_id,
            image_name: "leaf.jpg".to_string(),
            predicted_class: class.to_string(),
            confidence: 0.93,
            treatment: "Continue regular monitoring and care".to_string(),
            medicine: "No treatment needed".to_string(),
        }
    }

    #[test]
    fn account_round_trip() {
        let db = Database::open_in_memory().expect("db");
        let id = db.create_account("a@x.com", "a", "hash").expect("create");

        let by_email = db.account_by_email("a@x.com").expect("query").expect("account");
        assert_eq!(by_email.id, id);
        assert_eq!(by_email.username, "a");

        let by_id = db.account_by_id(id).expect("query").expect("account");
        assert_eq!(by_id.email, "a@x.com");
        assert_eq!(db.account_by_email("b@x.com").expect("query"), None);
    }

    #[test]
    fn reopening_the_storage_file_keeps_rows() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("agroguard.db");

        let db = Database::open(&path).expect("db");
        let id = db.create_account("a@x.com", "a", "hash").expect("create");
        drop(db);

        let db = Database::open(&path).expect("reopen");
        let account = db.account_by_id(id).expect("query").expect("account");
        assert_eq!(account.email, "a@x.com");
    }

    #[test]
    fn duplicate_email_is_distinct_error() {
        let db = Database::open_in_memory().expect("db");
        db.create_account("a@x.com", "a", "hash").expect("create");
        let err = db.create_account("a@x.com", "other", "hash").unwrap_err();
        assert!(matches!(err, StoreError::AccountExists));
    }

    #[test]
    fn duplicate_username_is_distinct_error() {
        let db = Database::open_in_memory().expect("db");
        db.create_account("a@x.com", "a", "hash").expect("create");
        let err = db.create_account("b@x.com", "a", "hash").unwrap_err();
        assert!(matches!(err, StoreError::AccountExists));
    }

    #[test]
    fn seeding_is_idempotent() {
        let db = Database::open_in_memory().expect("db");
        assert!(db.seed_demo_account("hash").expect("seed").is_some());
        assert_eq!(db.seed_demo_account("hash").expect("seed"), None);
    }

    #[test]
    fn predictions_list_is_owner_scoped_and_newest_first() {
        let db = Database::open_in_memory().expect("db");
        let owner = db.create_account("a@x.com", "a", "hash").expect("create");
        let other = db.create_account("b@x.com", "b", "hash").expect("create");

        let first = db
            .insert_prediction(&new_prediction(owner, "Tomato___healthy"))
            .expect("insert");
        let second = db
            .insert_prediction(&new_prediction(owner, "Potato___Early_blight"))
            .expect("insert");
        db.insert_prediction(&new_prediction(other, "Tomato___Leaf_Mold"))
            .expect("insert");

        let listed = db.predictions_for_account(owner).expect("list");
        let ids: Vec<i64> = listed.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![second, first]);
        assert!(listed.iter().all(|p| p.account_id == owner));
    }

    #[test]
    fn prediction_owner_must_exist() {
        let db = Database::open_in_memory().expect("db");
        let result = db.insert_prediction(&new_prediction(42, "Tomato___healthy"));
        assert!(result.is_err());
    }

    #[test]
    fn reports_join_prediction_fields() {
        let db = Database::open_in_memory().expect("db");
        let owner = db.create_account("a@x.com", "a", "hash").expect("create");
        let prediction = db
            .insert_prediction(&new_prediction(owner, "Tomato___healthy"))
            .expect("insert");
        let first = db
            .insert_report(owner, prediction, "static/reports/report_1.pdf")
            .expect("insert");
        let second = db
            .insert_report(owner, prediction, "static/reports/report_2.pdf")
            .expect("insert");

        let listed = db.reports_for_account(owner).expect("list");
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, second);
        assert_eq!(listed[1].id, first);
        assert_eq!(listed[0].predicted_class, "Tomato___healthy");
        assert_eq!(listed[0].confidence, 0.93);

        let fetched = db.report_by_id(first).expect("query").expect("report");
        assert_eq!(fetched.file_path, "static/reports/report_1.pdf");
        assert_eq!(db.report_by_id(999).expect("query"), None);
    }
}
