//! Report-config admin endpoints: create/list/update/delete, run-now, and
//! share-link minting.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};

use adreport_core::types::NewReportConfig;
use adreport_scheduler::SchedulerError;
use adreport_store::StoreError;

use crate::app::AppState;
use crate::http::error_response;

type HandlerResult = Result<Json<Value>, (StatusCode, Json<Value>)>;

/// POST /reports
///
/// Validate and persist a new config, then arm its job when the cadence is
/// not manual.
pub async fn create_report_config(
    State(state): State<Arc<AppState>>,
    Json(input): Json<NewReportConfig>,
) -> HandlerResult {
    input
        .validate()
        .map_err(|e| error_response(StatusCode::BAD_REQUEST, &e.to_string()))?;

    let config = state
        .store
        .create_config(&input)
        .map_err(|e| store_error(&e))?;

    if config.cadence != "manual" {
        state
            .scheduler
            .schedule_job(config.id)
            .map_err(|e| scheduler_error(&e))?;
    }

    info!(config_id = config.id, cadence = %config.cadence, "report config created");
    Ok(Json(json!({"success": true, "reportConfig": config})))
}

/// GET /reports — all configs, newest first.
pub async fn list_report_configs(State(state): State<Arc<AppState>>) -> HandlerResult {
    let configs = state.store.list_configs().map_err(|e| store_error(&e))?;
    Ok(Json(json!({"reportConfigs": configs})))
}

/// PUT /reports/{id}
///
/// Replace a config's fields and synchronously reconcile its job: a new
/// cadence re-arms, manual disarms.
pub async fn update_report_config(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(input): Json<NewReportConfig>,
) -> HandlerResult {
    input
        .validate()
        .map_err(|e| error_response(StatusCode::BAD_REQUEST, &e.to_string()))?;

    let config = state
        .store
        .update_config(id, &input)
        .map_err(|e| store_error(&e))?;

    state
        .scheduler
        .schedule_job(id)
        .map_err(|e| scheduler_error(&e))?;

    info!(config_id = id, cadence = %config.cadence, "report config updated");
    Ok(Json(json!({"success": true, "reportConfig": config})))
}

/// DELETE /reports/{id}
///
/// Stop the registry entry before the store delete so a recurrence cannot
/// fire against a removed row. A failed delete does not re-arm the job;
/// the caller must reschedule explicitly.
pub async fn delete_report_config(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> HandlerResult {
    state.scheduler.stop_job(id);
    state.store.delete_config(id).map_err(|e| store_error(&e))?;

    info!(config_id = id, "report config deleted");
    Ok(Json(
        json!({"success": true, "message": "report configuration deleted"}),
    ))
}

/// POST /reports/{id}/run — run the pipeline once, bypassing recurrence.
pub async fn run_report_now(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> HandlerResult {
    match state.scheduler.run_now(id).await {
        Ok(report) => Ok(Json(json!({
            "success": true,
            "reportId": report.id,
            "message": "report generated",
        }))),
        Err(SchedulerError::ConfigNotFound { .. }) => Err(error_response(
            StatusCode::NOT_FOUND,
            "report configuration not found",
        )),
        Err(e) => {
            warn!(config_id = id, error = %e, "run-now failed");
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &e.to_string(),
            ))
        }
    }
}

/// GET /reports/{id}/share — mint a signed, time-limited view-report link
/// for a generated report.
pub async fn share_report_link(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> HandlerResult {
    let report = state
        .store
        .get_report(&id)
        .map_err(|e| store_error(&e))?
        .ok_or_else(|| error_response(StatusCode::NOT_FOUND, "report not found"))?;

    let link = state.signer.sign(&report.id);
    Ok(Json(json!({"success": true, "link": link})))
}

fn store_error(e: &StoreError) -> (StatusCode, Json<Value>) {
    match e {
        StoreError::ConfigNotFound { .. } => {
            error_response(StatusCode::NOT_FOUND, "report configuration not found")
        }
        StoreError::ReportNotFound { .. } => {
            error_response(StatusCode::NOT_FOUND, "report not found")
        }
        other => {
            warn!(error = %other, "store operation failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &other.to_string())
        }
    }
}

fn scheduler_error(e: &SchedulerError) -> (StatusCode, Json<Value>) {
    match e {
        SchedulerError::ConfigNotFound { .. } => {
            error_response(StatusCode::NOT_FOUND, "report configuration not found")
        }
        other => {
            warn!(error = %other, "scheduler operation failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &other.to_string())
        }
    }
}
