//! Analytics API client: per-platform request shaping and the HTTP
//! collaborator the pipeline fetches report rows from.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use adreport_core::types::{CustomDateRange, DateRange, Platform, ReportConfig};

use crate::error::{PipelineError, Result};

/// Platform-specific request payload. The platform also picks the URL path
/// segment; the two shapes share only the date-window selection, which is
/// exactly one of `dateRangeEnum` / `customDateRange`.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum InsightsRequest {
    Meta(MetaInsightsRequest),
    Tiktok(TiktokInsightsRequest),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaInsightsRequest {
    pub metrics: Vec<String>,
    pub level: String,
    pub breakdowns: Vec<String>,
    pub time_increment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_range_enum: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_date_range: Option<CustomDateRange>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TiktokInsightsRequest {
    pub metrics: Vec<String>,
    pub dimensions: Vec<String>,
    pub level: String,
    pub report_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_range_enum: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_date_range: Option<CustomDateRange>,
}

impl InsightsRequest {
    /// Translate a stored config into the platform's request shape.
    pub fn for_config(config: &ReportConfig) -> Result<Self> {
        let (date_range_enum, custom_date_range) = date_window(config)?;

        Ok(match config.platform {
            Platform::Meta => InsightsRequest::Meta(MetaInsightsRequest {
                metrics: config.metrics.clone(),
                level: config.level.clone(),
                breakdowns: vec!["age".to_string()],
                time_increment: "7".to_string(),
                date_range_enum,
                custom_date_range,
            }),
            Platform::Tiktok => InsightsRequest::Tiktok(TiktokInsightsRequest {
                metrics: config.metrics.clone(),
                dimensions: vec!["stat_time_day".to_string()],
                level: config.level.clone(),
                report_type: "BASIC".to_string(),
                date_range_enum,
                custom_date_range,
            }),
        })
    }

    pub fn platform(&self) -> Platform {
        match self {
            InsightsRequest::Meta(_) => Platform::Meta,
            InsightsRequest::Tiktok(_) => Platform::Tiktok,
        }
    }
}

/// Resolve the mutually exclusive date-window pair for the outgoing request.
fn date_window(config: &ReportConfig) -> Result<(Option<String>, Option<CustomDateRange>)> {
    if config.date_range == DateRange::Custom {
        match (config.custom_date_from, config.custom_date_to) {
            (Some(from), Some(to)) => Ok((None, Some(CustomDateRange { from, to }))),
            _ => Err(PipelineError::Translate(format!(
                "config {} has a custom date range without stored dates",
                config.id
            ))),
        }
    } else {
        Ok((Some(config.date_range.to_string()), None))
    }
}

/// External analytics API the pipeline fetches report rows from.
#[async_trait]
pub trait AnalyticsApi: Send + Sync {
    /// Returns the `data` row array for the request, or a fetch error.
    async fn fetch_rows(&self, request: &InsightsRequest) -> Result<Vec<Value>>;
}

/// Production client: POST `{base_url}/{platform}` with a static
/// Authorization header.
pub struct HttpAnalyticsApi {
    client: reqwest::Client,
    base_url: String,
    auth_token: String,
}

impl HttpAnalyticsApi {
    pub fn new(base_url: String, auth_token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            auth_token,
        }
    }
}

#[async_trait]
impl AnalyticsApi for HttpAnalyticsApi {
    async fn fetch_rows(&self, request: &InsightsRequest) -> Result<Vec<Value>> {
        let url = format!("{}/{}", self.base_url, request.platform());
        debug!(%url, "fetching analytics rows");

        let resp = self
            .client
            .post(&url)
            .header("authorization", &self.auth_token)
            .json(request)
            .send()
            .await
            .map_err(|e| PipelineError::Fetch(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), body = %text, "analytics API error");
            return Err(PipelineError::Fetch(format!(
                "analytics API returned {status}: {text}"
            )));
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| PipelineError::Fetch(format!("malformed analytics body: {e}")))?;

        match body.get("data").and_then(Value::as_array) {
            Some(rows) => Ok(rows.clone()),
            None => Err(PipelineError::Fetch(
                "analytics body has no data array".to_string(),
            )),
        }
    }
}
