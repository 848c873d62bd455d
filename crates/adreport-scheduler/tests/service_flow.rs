//! Scheduler service flows against an in-memory store and stub
//! collaborators.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::Connection;
use serde_json::{json, Value};

use adreport_core::types::{DateRange, Delivery, NewReportConfig, Platform};
use adreport_pipeline::{
    AnalyticsApi, InsightsRequest, Mailer, PipelineError, ReportPipeline, Summarizer,
};
use adreport_scheduler::{SchedulerError, SchedulerService};
use adreport_store::ReportStore;

struct StubApi {
    rows: Vec<Value>,
    fail: bool,
}

#[async_trait]
impl AnalyticsApi for StubApi {
    async fn fetch_rows(&self, _request: &InsightsRequest) -> Result<Vec<Value>, PipelineError> {
        if self.fail {
            return Err(PipelineError::Fetch("connection refused".to_string()));
        }
        Ok(self.rows.clone())
    }
}

struct StubSummarizer;

#[async_trait]
impl Summarizer for StubSummarizer {
    async fn summarize(&self, rows: &[Value]) -> Result<String, PipelineError> {
        Ok(format!("spend summary over {} rows", rows.len()))
    }
}

#[derive(Default)]
struct StubMailer {
    sent: Mutex<Vec<(String, String, String)>>,
}

#[async_trait]
impl Mailer for StubMailer {
    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), PipelineError> {
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), subject.to_string(), html.to_string()));
        Ok(())
    }
}

struct Harness {
    store: Arc<ReportStore>,
    service: SchedulerService,
    mailer: Arc<StubMailer>,
}

fn harness(rows: Vec<Value>, fail_fetch: bool) -> Harness {
    let store = Arc::new(ReportStore::new(Connection::open_in_memory().unwrap()).unwrap());
    let mailer = Arc::new(StubMailer::default());
    let mailer_dyn: Arc<dyn Mailer> = mailer.clone();
    let pipeline = Arc::new(ReportPipeline::new(
        Arc::clone(&store),
        Arc::new(StubApi {
            rows,
            fail: fail_fetch,
        }),
        Arc::new(StubSummarizer),
        mailer_dyn,
        "http://localhost:8750".to_string(),
    ));
    let service = SchedulerService::new(Arc::clone(&store), pipeline);
    Harness {
        store,
        service,
        mailer,
    }
}

fn config_input(cadence: &str) -> NewReportConfig {
    NewReportConfig {
        platform: Platform::Meta,
        metrics: vec!["spend".to_string()],
        level: "campaign".to_string(),
        date_range: DateRange::Last7,
        custom_date_range: None,
        cadence: cadence.to_string(),
        delivery: Delivery::Email,
        email: Some("a@b.com".to_string()),
    }
}

#[tokio::test]
async fn end_to_end_daily_email_run() {
    let h = harness(
        vec![
            json!({"age": "18-24", "spend": "100"}),
            json!({"age": "18-24", "spend": "100"}),
        ],
        false,
    );
    let config = h.store.create_config(&config_input("daily")).unwrap();

    h.service.schedule_job(config.id).unwrap();
    let status = h.service.status();
    assert_eq!(status.len(), 1);
    assert_eq!(status[0].config_id, config.id);
    assert!(status[0].is_running);

    let report = h.service.run_now(config.id).await.unwrap();
    assert_eq!(report.data.as_array().unwrap().len(), 1);
    assert!(!report.summary.is_empty());

    let sent = h.mailer.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].2.contains(&report.summary));
}

#[tokio::test]
async fn boot_schedules_only_non_manual_configs() {
    let h = harness(vec![], false);
    h.store.create_config(&config_input("manual")).unwrap();
    let hourly = h.store.create_config(&config_input("hourly")).unwrap();
    let daily = h.store.create_config(&config_input("daily")).unwrap();

    let armed = h.service.initialize_on_boot().unwrap();
    assert_eq!(armed, 2);

    let ids: Vec<i64> = h.service.status().iter().map(|j| j.config_id).collect();
    assert_eq!(ids, vec![hourly.id, daily.id]);
}

#[tokio::test]
async fn boot_skips_configs_with_bad_cadence() {
    let h = harness(vec![], false);
    // The store itself does not validate labels; a row written by an older
    // version can carry one the resolver no longer accepts.
    let broken = h.store.create_config(&config_input("fortnightly")).unwrap();
    let daily = h.store.create_config(&config_input("daily")).unwrap();

    let armed = h.service.initialize_on_boot().unwrap();
    assert_eq!(armed, 1);

    let ids: Vec<i64> = h.service.status().iter().map(|j| j.config_id).collect();
    assert_eq!(ids, vec![daily.id]);
    assert!(!ids.contains(&broken.id));
}

#[tokio::test]
async fn rescheduling_to_manual_unschedules() {
    let h = harness(vec![], false);
    let config = h.store.create_config(&config_input("daily")).unwrap();
    h.service.schedule_job(config.id).unwrap();
    assert_eq!(h.service.status().len(), 1);

    h.store
        .update_config(config.id, &config_input("manual"))
        .unwrap();
    h.service.schedule_job(config.id).unwrap();
    assert!(h.service.status().is_empty());
}

#[tokio::test]
async fn rescheduling_replaces_the_armed_handle() {
    let h = harness(vec![], false);
    let config = h.store.create_config(&config_input("daily")).unwrap();
    h.service.schedule_job(config.id).unwrap();
    h.store
        .update_config(config.id, &config_input("hourly"))
        .unwrap();
    h.service.schedule_job(config.id).unwrap();

    let status = h.service.status();
    assert_eq!(status.len(), 1);
    assert_eq!(status[0].cadence, "hourly");
}

#[tokio::test]
async fn schedule_job_for_unknown_config_fails() {
    let h = harness(vec![], false);
    let err = h.service.schedule_job(404).unwrap_err();
    assert!(matches!(err, SchedulerError::ConfigNotFound { id: 404 }));
}

#[tokio::test]
async fn schedule_job_with_invalid_cadence_leaves_config_unscheduled() {
    let h = harness(vec![], false);
    let config = h.store.create_config(&config_input("fortnightly")).unwrap();

    let err = h.service.schedule_job(config.id).unwrap_err();
    assert!(matches!(err, SchedulerError::InvalidCadence(_)));
    assert!(h.service.status().is_empty());
}

#[tokio::test]
async fn run_now_for_unknown_config_fails() {
    let h = harness(vec![], false);
    let err = h.service.run_now(404).await.unwrap_err();
    assert!(matches!(err, SchedulerError::ConfigNotFound { id: 404 }));
}

#[tokio::test]
async fn run_now_fetch_failure_records_error_and_persists_nothing() {
    let h = harness(vec![], true);
    let config = h.store.create_config(&config_input("daily")).unwrap();

    let err = h.service.run_now(config.id).await.unwrap_err();
    assert!(matches!(err, SchedulerError::Pipeline(_)));

    assert!(h.store.list_reports(config.id).unwrap().is_empty());
    let loaded = h.store.get_config(config.id).unwrap().unwrap();
    assert!(loaded
        .last_error
        .as_deref()
        .unwrap()
        .contains("connection refused"));
    assert!(h.mailer.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn one_failing_config_does_not_disturb_others() {
    let h = harness(vec![], true);
    let healthy = h.store.create_config(&config_input("hourly")).unwrap();
    let failing = h.store.create_config(&config_input("daily")).unwrap();

    h.service.schedule_job(healthy.id).unwrap();
    h.service.schedule_job(failing.id).unwrap();

    // A failed run for one config leaves the other's timer armed.
    let _ = h.service.run_now(failing.id).await;
    let ids: Vec<i64> = h.service.status().iter().map(|j| j.config_id).collect();
    assert_eq!(ids, vec![healthy.id, failing.id]);
}

#[tokio::test]
async fn stop_then_delete_leaves_nothing_behind() {
    let h = harness(vec![json!({"age": "18-24", "spend": "100"})], false);
    let config = h.store.create_config(&config_input("daily")).unwrap();
    h.service.schedule_job(config.id).unwrap();
    let report = h.service.run_now(config.id).await.unwrap();

    // Deletion order: stop the registry entry first so a recurrence cannot
    // fire against a removed row, then delete from the store.
    h.service.stop_job(config.id);
    h.store.delete_config(config.id).unwrap();

    assert!(h.service.status().is_empty());
    assert!(h.store.get_config(config.id).unwrap().is_none());
    assert!(h.store.get_report(&report.id).unwrap().is_none());
}

#[tokio::test]
async fn stop_job_on_unscheduled_config_is_a_no_op() {
    let h = harness(vec![], false);
    h.service.stop_job(12345);
    assert!(h.service.status().is_empty());
}
