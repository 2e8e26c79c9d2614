//! HTTP routes for the report dashboard.
//!
//! Read-only views over whatever runs have been persisted; nothing here
//! triggers fetching or analysis.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

use mfa_common::{MfaConfig, Result};

use crate::storage::{JsonStore, ReportPaths};

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub service: String,
}

#[derive(Debug, Serialize)]
pub struct RunsResponse {
    pub dates: Vec<String>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct AnalysisEntry {
    pub name: String,
    pub categorized: bool,
}

#[derive(Debug, Serialize)]
pub struct RunResponse {
    pub date: String,
    pub analyses: Vec<AnalysisEntry>,
}

// ============================================================================
// State
// ============================================================================

/// Shared state for the dashboard handlers.
pub struct DashboardState {
    report_paths: ReportPaths,
}

impl DashboardState {
    pub fn new(config: &MfaConfig) -> Self {
        Self {
            report_paths: ReportPaths::new(&config.paths.analysis_dir),
        }
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        service: "mfa-analysis".to_string(),
    })
}

/// List run dates that have persisted reports
pub async fn list_runs(
    State(state): State<Arc<DashboardState>>,
) -> std::result::Result<Json<RunsResponse>, StatusCode> {
    let dates = JsonStore::list_date_dirs(state.report_paths.root()).map_err(|e| {
        error!(error = %e, "Failed to list run dates");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let count = dates.len();
    Ok(Json(RunsResponse { dates, count }))
}

/// List the analyses persisted for one run date
pub async fn list_run(
    State(state): State<Arc<DashboardState>>,
    Path(date): Path<String>,
) -> std::result::Result<Json<RunResponse>, StatusCode> {
    validate_date(&date)?;
    let date_dir = state.report_paths.date_dir(&date);

    let mut analyses: Vec<AnalysisEntry> = Vec::new();
    for name in JsonStore::list_subdirs(&date_dir).map_err(internal)? {
        analyses.push(AnalysisEntry {
            name,
            categorized: true,
        });
    }
    for name in JsonStore::list_json_stems(&date_dir).map_err(internal)? {
        analyses.push(AnalysisEntry {
            name,
            categorized: false,
        });
    }

    if analyses.is_empty() {
        return Err(StatusCode::NOT_FOUND);
    }

    Ok(Json(RunResponse { date, analyses }))
}

/// One analysis of one run: the category list for categorized analyses,
/// or the report body for flat ones
pub async fn get_analysis(
    State(state): State<Arc<DashboardState>>,
    Path((date, analysis)): Path<(String, String)>,
) -> std::result::Result<Json<serde_json::Value>, StatusCode> {
    validate_date(&date)?;

    let category_dir = state.report_paths.date_dir(&date).join(&analysis);
    if category_dir.is_dir() {
        let categories = JsonStore::list_json_stems(&category_dir).map_err(internal)?;
        return Ok(Json(serde_json::json!({
            "date": date,
            "analysis": analysis,
            "categories": categories,
        })));
    }

    let flat = state.report_paths.flat_report(&date, &analysis);
    if !flat.exists() {
        return Err(StatusCode::NOT_FOUND);
    }
    JsonStore::load(&flat).map(Json).map_err(internal)
}

/// One category report body
pub async fn get_category(
    State(state): State<Arc<DashboardState>>,
    Path((date, analysis, category)): Path<(String, String, String)>,
) -> std::result::Result<Json<serde_json::Value>, StatusCode> {
    validate_date(&date)?;

    let path = state.report_paths.category_report(&date, &analysis, &category);
    if !path.exists() {
        return Err(StatusCode::NOT_FOUND);
    }
    JsonStore::load(&path).map(Json).map_err(internal)
}

fn validate_date(date: &str) -> std::result::Result<(), StatusCode> {
    if date.len() == 8 && date.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(StatusCode::BAD_REQUEST)
    }
}

fn internal(e: mfa_common::Error) -> StatusCode {
    error!(error = %e, "Dashboard request failed");
    StatusCode::INTERNAL_SERVER_ERROR
}

// ============================================================================
// Router / Server
// ============================================================================

/// Build the dashboard router.
pub fn router(state: Arc<DashboardState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/runs", get(list_runs))
        .route("/api/v1/runs/:date", get(list_run))
        .route("/api/v1/runs/:date/:analysis", get(get_analysis))
        .route("/api/v1/runs/:date/:analysis/:category", get(get_category))
        .with_state(state)
}

/// Serve the dashboard until the process exits.
pub async fn serve(addr: &str, state: Arc<DashboardState>) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| mfa_common::Error::configuration(format!("bind {}: {}", addr, e)))?;

    info!(addr = %addr, "Dashboard listening");
    axum::serve(listener, router(state))
        .await
        .map_err(mfa_common::Error::from)?;
    Ok(())
}
