use std::sync::Arc;

use tracing::{error, info, warn};

use adreport_core::types::GeneratedReport;
use adreport_pipeline::ReportPipeline;
use adreport_store::ReportStore;

use crate::cadence::resolve;
use crate::error::{Result, SchedulerError};
use crate::registry::{JobRegistry, JobStatus};

/// Public scheduling surface tying the store, the registry, and the
/// pipeline together. Configs are independent; one config's failure never
/// touches another's timer or in-flight run.
pub struct SchedulerService {
    store: Arc<ReportStore>,
    pipeline: Arc<ReportPipeline>,
    registry: Arc<JobRegistry>,
}

impl SchedulerService {
    pub fn new(store: Arc<ReportStore>, pipeline: Arc<ReportPipeline>) -> Self {
        Self {
            store,
            pipeline,
            registry: Arc::new(JobRegistry::new()),
        }
    }

    /// Arm (or re-arm) the job for a config. A manual cadence ensures the
    /// config is unscheduled instead. The installed fire closure reloads
    /// the config from the store before every run — metadata and even the
    /// cadence may have changed since scheduling, so a copy captured here
    /// would go stale.
    pub fn schedule_job(&self, config_id: i64) -> Result<()> {
        let config = self
            .store
            .get_config(config_id)?
            .ok_or(SchedulerError::ConfigNotFound { id: config_id })?;

        let Some(rule) = resolve(&config.cadence)? else {
            if self.registry.stop(config_id) {
                info!(config_id, "cadence set to manual, job stopped");
            }
            return Ok(());
        };

        let store = Arc::clone(&self.store);
        let pipeline = Arc::clone(&self.pipeline);
        self.registry
            .schedule(config_id, &config.cadence, rule, move || {
                let store = Arc::clone(&store);
                let pipeline = Arc::clone(&pipeline);
                async move {
                    let config = match store.get_config(config_id) {
                        Ok(Some(config)) => config,
                        Ok(None) => {
                            // Deleted between fire and reload — a normal abort.
                            info!(config_id, "config removed before fire, skipping run");
                            return;
                        }
                        Err(e) => {
                            error!(config_id, error = %e, "config reload failed, skipping run");
                            return;
                        }
                    };
                    match pipeline.generate(&config).await {
                        Ok(report) => {
                            info!(config_id, report_id = %report.id, "scheduled run complete")
                        }
                        Err(e) => warn!(config_id, error = %e, "scheduled run failed"),
                    }
                }
            });

        info!(config_id, cadence = %config.cadence, "job scheduled");
        Ok(())
    }

    /// Disarm the job. Only prevents future fires; an in-flight run is
    /// allowed to complete.
    pub fn stop_job(&self, config_id: i64) {
        if self.registry.stop(config_id) {
            info!(config_id, "job stopped");
        }
    }

    /// Run the pipeline once for a config, bypassing any recurrence.
    pub async fn run_now(&self, config_id: i64) -> Result<GeneratedReport> {
        let config = self
            .store
            .get_config(config_id)?
            .ok_or(SchedulerError::ConfigNotFound { id: config_id })?;
        Ok(self.pipeline.generate(&config).await?)
    }

    /// Rebuild the registry from the store after a process start. A single
    /// config failing to schedule is logged and skipped, never aborts the
    /// rest. Returns the number of armed jobs.
    pub fn initialize_on_boot(&self) -> Result<usize> {
        let configs = self.store.list_scheduled_configs()?;
        let total = configs.len();
        let mut armed = 0;

        for config in configs {
            match self.schedule_job(config.id) {
                Ok(()) => armed += 1,
                Err(e) => {
                    warn!(config_id = config.id, error = %e, "failed to schedule job on boot")
                }
            }
        }

        info!(armed, total, "scheduler initialized");
        Ok(armed)
    }

    pub fn status(&self) -> Vec<JobStatus> {
        self.registry.status()
    }
}
