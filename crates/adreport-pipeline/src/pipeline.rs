use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info, warn};

use adreport_core::types::{Delivery, GeneratedReport, NewGeneratedReport, ReportConfig};
use adreport_store::{ReportStore, StoreError};

use crate::api::{AnalyticsApi, InsightsRequest};
use crate::dedupe::dedupe;
use crate::email::render_report_email;
use crate::error::Result;
use crate::mail::Mailer;
use crate::summary::Summarizer;

/// Executes one report generation: translate, fetch, dedupe, summarize,
/// persist, update run metadata, deliver.
pub struct ReportPipeline {
    store: Arc<ReportStore>,
    api: Arc<dyn AnalyticsApi>,
    summarizer: Arc<dyn Summarizer>,
    mailer: Arc<dyn Mailer>,
    /// Base URL for view-report links embedded in emails.
    view_base_url: String,
}

impl ReportPipeline {
    pub fn new(
        store: Arc<ReportStore>,
        api: Arc<dyn AnalyticsApi>,
        summarizer: Arc<dyn Summarizer>,
        mailer: Arc<dyn Mailer>,
        view_base_url: String,
    ) -> Self {
        Self {
            store,
            api,
            summarizer,
            mailer,
            view_base_url,
        }
    }

    /// Run the pipeline once for `config`. No retries; a failure before
    /// persistence is recorded into the config's last_error. Delivery
    /// failure never fails the run once a report row exists.
    pub async fn generate(&self, config: &ReportConfig) -> Result<GeneratedReport> {
        info!(config_id = config.id, platform = %config.platform, "generating report");

        let report = match self.build_and_persist(config).await {
            Ok(report) => report,
            Err(e) => {
                self.record_error(config.id, &e.to_string());
                return Err(e);
            }
        };

        self.deliver(config, &report).await;
        Ok(report)
    }

    async fn build_and_persist(&self, config: &ReportConfig) -> Result<GeneratedReport> {
        let request = InsightsRequest::for_config(config)?;
        let rows = self.api.fetch_rows(&request).await?;

        let deduped = dedupe(rows);
        debug!(config_id = config.id, rows = deduped.len(), "rows after dedupe");

        let summary = self.summarizer.summarize(&deduped).await?;

        let report = self.store.insert_report(&NewGeneratedReport {
            report_config_id: config.id,
            data: Value::Array(deduped),
            summary,
            platform: config.platform,
            date_range: config.date_range,
        })?;

        // The report exists from here on. A missing config row at this point
        // means a concurrent delete, which cascades the report away too.
        self.store
            .record_run_success(config.id, &Utc::now().to_rfc3339())?;
        Ok(report)
    }

    async fn deliver(&self, config: &ReportConfig, report: &GeneratedReport) {
        match config.delivery {
            Delivery::Email => {
                let Some(to) = config.email.as_deref() else {
                    warn!(config_id = config.id, "email delivery with no address, skipping");
                    return;
                };
                let rows = report.data.as_array().cloned().unwrap_or_default();
                let view_url = format!("{}/view-report/{}", self.view_base_url, report.id);
                let html = render_report_email(
                    config.platform,
                    config.date_range,
                    &rows,
                    &report.summary,
                    &view_url,
                );
                let subject = format!(
                    "Your {} report - {}",
                    config.platform,
                    Utc::now().format("%Y-%m-%d")
                );
                match self.mailer.send(to, &subject, &html).await {
                    Ok(()) => info!(config_id = config.id, %to, "report emailed"),
                    Err(e) => {
                        warn!(config_id = config.id, %to, error = %e, "report email failed")
                    }
                }
            }
            Delivery::Link => {
                info!(
                    config_id = config.id,
                    report_id = %report.id,
                    "report available at /view-report/{}",
                    report.id
                );
            }
        }
    }

    fn record_error(&self, config_id: i64, message: &str) {
        match self.store.record_run_error(config_id, message) {
            Ok(()) => {}
            Err(StoreError::ConfigNotFound { .. }) => {
                // Config deleted while the run was in flight; nothing to record.
                debug!(config_id, "config removed before error could be recorded");
            }
            Err(e) => warn!(config_id, error = %e, "failed to record run error"),
        }
    }
}
