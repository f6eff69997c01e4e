//! API request handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::analysis::{CheckOptions, DomainChecker};
use crate::authentication::CheckMode;
use crate::error::CheckError;
use crate::report::{generate_report, render_text_report, FullReport};
use crate::utils::validate_domain_format;

/// Shared application state
pub struct AppState {
    pub checker: DomainChecker,
}

/// Domain check request body
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckRequest {
    pub domain: Option<String>,
    /// Only honored by the preview endpoint
    pub is_preview: Option<bool>,
    /// Extra DKIM selector to probe
    pub dkim_selector: Option<String>,
}

/// Text report request body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextReportRequest {
    pub report_data: Option<FullReport>,
}

/// Full report response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    pub success: bool,
    pub report_data: FullReport,
    pub message: String,
}

/// API error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ApiError {
    pub fn new(msg: &str) -> Self {
        Self {
            error: msg.to_string(),
            message: None,
        }
    }

    pub fn with_message(msg: &str, message: String) -> Self {
        Self {
            error: msg.to_string(),
            message: Some(message),
        }
    }
}

fn bad_request(msg: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(ApiError::new(msg))).into_response()
}

fn internal_error(msg: &str, err: &CheckError) -> Response {
    error!("{}: {}", msg, err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiError::with_message(msg, err.to_string())),
    )
        .into_response()
}

fn parse_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, Response> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        warn!("Rejected request body: {}", rejection.body_text());
        bad_request("Invalid JSON in request body")
    })
}

/// Characters safe to put in a Content-Disposition file name
fn attachment_name(domain: &str) -> String {
    domain
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// GET /api/health
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// POST /api/check/preview - Redacted analysis
pub async fn check_preview(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CheckRequest>, JsonRejection>,
) -> Response {
    let req = match parse_body(payload) {
        Ok(req) => req,
        Err(response) => return response,
    };

    let domain = match req.domain {
        Some(domain) if validate_domain_format(&domain) => domain,
        _ => return bad_request("Invalid domain format. Please provide a valid domain name."),
    };

    let options = if req.is_preview.unwrap_or(true) {
        CheckOptions::preview()
    } else {
        CheckOptions::full(None)
    };

    match state.checker.check_domain(&domain, &options).await {
        Ok(result) => (
            StatusCode::OK,
            [(header::CACHE_CONTROL, "public, max-age=300")],
            Json(result),
        )
            .into_response(),
        Err(e) => internal_error("Internal server error", &e),
    }
}

/// POST /api/check/full - Detailed analysis
pub async fn check_full(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CheckRequest>, JsonRejection>,
) -> Response {
    let req = match parse_body(payload) {
        Ok(req) => req,
        Err(response) => return response,
    };

    let domain = match req.domain {
        Some(domain) if validate_domain_format(&domain) => domain,
        _ => return bad_request("Invalid domain format"),
    };

    let options = CheckOptions {
        mode: CheckMode::Full,
        dkim_selector: req.dkim_selector,
    };

    match state.checker.check_domain(&domain, &options).await {
        Ok(result) => (
            StatusCode::OK,
            [(header::CACHE_CONTROL, "no-cache, no-store, must-revalidate")],
            Json(result),
        )
            .into_response(),
        Err(CheckError::InvalidSelector(_)) => bad_request("Invalid DKIM selector"),
        Err(e) => internal_error("Internal server error", &e),
    }
}

/// POST /api/report - Full report with fixes and provider instructions
pub async fn full_report(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CheckRequest>, JsonRejection>,
) -> Response {
    let req = match parse_body(payload) {
        Ok(req) => req,
        Err(response) => return response,
    };

    let Some(domain) = req.domain.filter(|d| !d.trim().is_empty()) else {
        return bad_request("Domain is required");
    };

    match generate_report(&state.checker, &domain, req.dkim_selector).await {
        Ok(report) => (
            StatusCode::OK,
            Json(ReportResponse {
                success: true,
                report_data: report,
                message: "Full report generated successfully".to_string(),
            }),
        )
            .into_response(),
        Err(CheckError::InvalidDomain(_)) => bad_request("Invalid domain format"),
        Err(CheckError::InvalidSelector(_)) => bad_request("Invalid DKIM selector"),
        Err(e) => internal_error("Failed to generate report", &e),
    }
}

/// POST /api/report/text - Full report as a downloadable text file
pub async fn text_report(payload: Result<Json<TextReportRequest>, JsonRejection>) -> Response {
    let req = match parse_body(payload) {
        Ok(req) => req,
        Err(response) => return response,
    };

    let Some(report) = req.report_data else {
        return bad_request("Report data is required");
    };

    info!("Rendering text report for {}", report.analysis.domain);

    let domain = match report.analysis.domain.as_str() {
        "" => "unknown",
        domain => domain,
    };
    let disposition = format!(
        "attachment; filename=\"inboxshield-{}-report.txt\"",
        attachment_name(domain)
    );

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        render_text_report(&report),
    )
        .into_response()
}
