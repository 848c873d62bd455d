use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::app::AppState;

/// GET /jobs/status — config ids with a live timer. Presence in the
/// registry implies the job is running.
pub async fn jobs_status(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({"jobs": state.scheduler.status()}))
}
