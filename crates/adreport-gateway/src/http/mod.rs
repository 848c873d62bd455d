pub mod health;
pub mod jobs;
pub mod reports;
pub mod view_report;

use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

/// JSON error body shared by all handlers.
pub(crate) fn error_response(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({"error": message})))
}
