//! Public view-report endpoint.
//!
//! A report is addressable by its opaque uuid. When `expires` and
//! `signature` query params are present the request is treated as a signed
//! capability link and verified before the report is returned.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::warn;

use crate::app::AppState;
use crate::http::error_response;
use crate::signed::SignedUrlStatus;

#[derive(Debug, Deserialize)]
pub struct SignedQuery {
    expires: Option<i64>,
    signature: Option<String>,
}

/// GET /view-report/{id}?expires=...&signature=...
pub async fn view_report(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<SignedQuery>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    if let (Some(expires), Some(signature)) = (query.expires, query.signature.as_deref()) {
        match state.signer.verify(&id, expires, signature) {
            SignedUrlStatus::Valid => {}
            SignedUrlStatus::Expired => {
                return Err(error_response(StatusCode::FORBIDDEN, "link has expired"));
            }
            SignedUrlStatus::Invalid => {
                warn!(report_id = %id, "invalid view-report signature");
                return Err(error_response(StatusCode::FORBIDDEN, "invalid signature"));
            }
        }
    }

    let report = state
        .store
        .get_report(&id)
        .map_err(|e| {
            warn!(report_id = %id, error = %e, "report lookup failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        })?
        .ok_or_else(|| error_response(StatusCode::NOT_FOUND, "report not found"))?;

    Ok(Json(json!(report)))
}
