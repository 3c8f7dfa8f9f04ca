//! Route table, request/response DTOs, and handlers.

use crate::error::ApiError;
use crate::identity::current_account;
use crate::state::{AppState, sanitize_filename};
use agroguard_core::{UsageStats, aggregate_stats, display_name_for_key, hash_password, verify_password};
use agroguard_report::ReportInput;
use agroguard_store::{NewPrediction, PredictionRecord, ReportListing};
use axum::extract::{Multipart, Path, State};
use axum::http::{HeaderMap, header};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;

/// Assemble the application router over shared state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/predict", post(predict))
        .route("/predictions", get(predictions))
        .route("/reports", get(reports))
        .route("/generate-report/{prediction_id}", post(generate_report))
        .route("/download-report/{report_id}", get(download_report))
        .route("/user-stats", get(user_stats))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct RegisterRequest {
    email: String,
    username: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

/// Issued on both registration and login.
#[derive(Debug, Serialize)]
struct TokenResponse {
    access_token: String,
    token_type: String,
    user_id: i64,
    username: String,
}

#[derive(Debug, Serialize)]
struct PredictionResponse {
    predicted_class: String,
    predicted_class_display: String,
    confidence: f32,
    treatment: String,
    medicine: String,
    prediction_id: i64,
}

#[derive(Debug, Serialize)]
struct PredictionsResponse {
    success: bool,
    total: usize,
    predictions: Vec<PredictionRecord>,
}

#[derive(Debug, Serialize)]
struct ReportsResponse {
    success: bool,
    reports: Vec<ReportListing>,
}

#[derive(Debug, Serialize)]
struct GenerateReportResponse {
    success: bool,
    report_id: i64,
    filename: String,
    message: String,
}

#[derive(Debug, Serialize)]
struct UserStatsResponse {
    success: bool,
    #[serde(flatten)]
    stats: UsageStats,
}

/// Service banner.
async fn root() -> Json<Value> {
    Json(json!({
        "message": "Welcome to AgroGuard AI",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Liveness probe.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// Register a new account and issue its first token.
async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    if !request.email.contains('@') {
        return Err(ApiError::Validation("Invalid email address".to_string()));
    }
    if request.username.is_empty() || request.password.is_empty() {
        return Err(ApiError::Validation(
            "Username and password must not be empty".to_string(),
        ));
    }
    if state.db.account_by_email(&request.email)?.is_some() {
        return Err(ApiError::Validation("Email already registered".to_string()));
    }

    let password_hash = hash_password(&request.password)?;
    let user_id = state
        .db
        .create_account(&request.email, &request.username, &password_hash)?;
    let access_token = state.tokens.issue(user_id, &request.email)?;
    info!("registered account (id={})", user_id);
    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
        user_id,
        username: request.username,
    }))
}

/// Log in with email and password.
///
/// Unknown email and wrong password return the same generic message.
async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let invalid = || ApiError::Unauthenticated("Invalid email or password".to_string());
    let account = state.db.account_by_email(&request.email)?.ok_or_else(invalid)?;
    if !verify_password(&request.password, &account.password_hash)? {
        return Err(invalid());
    }
    let access_token = state.tokens.issue(account.id, &account.email)?;
    info!("login (account_id={})", account.id);
    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
        user_id: account.id,
        username: account.username,
    }))
}

/// Classify an uploaded leaf image and persist the result.
async fn predict(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<PredictionResponse>, ApiError> {
    let account = current_account(&state, &headers)?;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::Validation(format!("Invalid upload: {err}")))?
    {
        if field.name() != Some("file") && field.file_name().is_none() {
            continue;
        }
        let original_name = field.file_name().unwrap_or("upload.jpg").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|err| ApiError::Validation(format!("Invalid upload: {err}")))?;
        upload = Some((original_name, data));
        break;
    }
    let (original_name, data) =
        upload.ok_or_else(|| ApiError::Validation("No file uploaded".to_string()))?;

    // Last write wins on a name collision; names are per-request in practice.
    let image_name = sanitize_filename(&original_name);
    let image_path = state.upload_path(&image_name);
    tokio::fs::write(&image_path, &data).await?;
    info!(
        "stored upload (account_id={}, name={}, bytes={})",
        account.id,
        image_name,
        data.len()
    );

    let classifier = state.classifier.clone();
    let classify_path = image_path.clone();
    let classification = tokio::task::spawn_blocking(move || classifier.classify(&classify_path))
        .await
        .map_err(|err| ApiError::Internal(err.to_string()))?
        .map_err(|err| {
            warn!("classification failed (account_id={}): {err}", account.id);
            ApiError::Dependency(format!("Prediction failed: {err}"))
        })?;

    let prediction_id = state.db.insert_prediction(&NewPrediction {
        account_id: account.id,
        image_name,
        predicted_class: classification.label.clone(),
        confidence: f64::from(classification.confidence),
        treatment: classification.treatment.clone(),
        medicine: classification.medicine.clone(),
    })?;

    Ok(Json(PredictionResponse {
        predicted_class: classification.label,
        predicted_class_display: classification.display_label,
        confidence: classification.confidence,
        treatment: classification.treatment,
        medicine: classification.medicine,
        prediction_id,
    }))
}

/// All predictions owned by the caller, newest first.
async fn predictions(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<PredictionsResponse>, ApiError> {
    let account = current_account(&state, &headers)?;
    let predictions = state.db.predictions_for_account(account.id)?;
    Ok(Json(PredictionsResponse {
        success: true,
        total: predictions.len(),
        predictions,
    }))
}

/// All reports owned by the caller, newest first.
async fn reports(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ReportsResponse>, ApiError> {
    let account = current_account(&state, &headers)?;
    let reports = state.db.reports_for_account(account.id)?;
    Ok(Json(ReportsResponse {
        success: true,
        reports,
    }))
}

/// Render a PDF report for an owned prediction and persist its pointer.
async fn generate_report(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(prediction_id): Path<i64>,
) -> Result<Json<GenerateReportResponse>, ApiError> {
    let account = current_account(&state, &headers)?;
    let prediction = state
        .db
        .prediction_by_id(prediction_id)?
        .ok_or_else(|| ApiError::NotFound("Prediction not found".to_string()))?;
    if prediction.account_id != account.id {
        return Err(ApiError::Forbidden(
            "Unauthorized access to this prediction".to_string(),
        ));
    }

    let renderer = state.renderer.clone();
    let owner_name = account.username.clone();
    let source_image = state.upload_path(&prediction.image_name);
    let display_label = display_name_for_key(&prediction.predicted_class).to_string();
    let rendered = tokio::task::spawn_blocking(move || {
        renderer.render(&ReportInput {
            owner_name: &owner_name,
            source_image: &source_image,
            display_label: &display_label,
            confidence: prediction.confidence,
            treatment: &prediction.treatment,
            medicine: &prediction.medicine,
            when: prediction.created_at,
        })
    })
    .await
    .map_err(|err| ApiError::Internal(err.to_string()))?
    .map_err(|err| ApiError::Dependency(format!("Report generation failed: {err}")))?;

    let report_id = state.db.insert_report(
        account.id,
        prediction_id,
        &rendered.path.to_string_lossy(),
    )?;
    info!(
        "generated report (report_id={}, prediction_id={}, account_id={})",
        report_id, prediction_id, account.id
    );
    Ok(Json(GenerateReportResponse {
        success: true,
        report_id,
        filename: rendered.filename,
        message: "Report generated successfully".to_string(),
    }))
}

/// Stream a previously generated report back as a PDF.
async fn download_report(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(report_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let account = current_account(&state, &headers)?;
    let report = state
        .db
        .report_by_id(report_id)?
        .ok_or_else(|| ApiError::NotFound("Report not found".to_string()))?;
    if report.account_id != account.id {
        return Err(ApiError::Forbidden(
            "Unauthorized access to this report".to_string(),
        ));
    }

    let path = std::path::Path::new(&report.file_path);
    if !path.exists() {
        return Err(ApiError::NotFound("Report file not found".to_string()));
    }
    let bytes = tokio::fs::read(path).await?;
    let download_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("report.pdf");
    let response_headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{download_name}\""),
        ),
    ];
    Ok((response_headers, bytes))
}

/// Aggregate statistics over the caller's predictions.
async fn user_stats(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UserStatsResponse>, ApiError> {
    let account = current_account(&state, &headers)?;
    let predictions = state.db.predictions_for_account(account.id)?;
    let stats = aggregate_stats(predictions.iter().map(|p| p.predicted_class.as_str()));
    Ok(Json(UserStatsResponse {
        success: true,
        stats,
    }))
}
