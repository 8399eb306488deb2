use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ats::report::ScanReport;
use crate::errors::AppError;
use crate::extract::AppJson;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRequest {
    /// Untyped so the scan sees every field the client sent.
    pub resume_data: Option<Value>,
    pub job_description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ScanResponse {
    pub success: bool,
    #[serde(flatten)]
    pub report: ScanReport,
}

/// POST /api/ats-scan
pub async fn handle_ats_scan(
    State(state): State<AppState>,
    AppJson(req): AppJson<ScanRequest>,
) -> Result<Json<ScanResponse>, AppError> {
    let resume = req
        .resume_data
        .ok_or_else(|| AppError::Validation("Resume data is required".to_string()))?;

    let report = state
        .scanner
        .scan_json(&resume, req.job_description.as_deref());
    tracing::info!(score = report.score, grade = ?report.grade, "ATS scan completed");

    Ok(Json(ScanResponse {
        success: true,
        report,
    }))
}
