use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;

use chrono::Utc;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cadence::Recurrence;

/// Process-wide map of config id to live timer task.
///
/// The map is the only critical section: schedule/stop/status lock it
/// briefly and never block on I/O while holding it. Entries are exactly the
/// configs armed since the last process start, so presence implies
/// liveness.
pub struct JobRegistry {
    jobs: Mutex<HashMap<i64, ArmedJob>>,
}

struct ArmedJob {
    cadence: String,
    timer: JoinHandle<()>,
}

/// One armed job as reported by `status()`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatus {
    pub config_id: i64,
    pub cadence: String,
    pub is_running: bool,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self {
            jobs: Mutex::new(HashMap::new()),
        }
    }

    /// Install a recurring job for `config_id`, replacing any existing one
    /// (idempotent reschedule — there are never two live timers for the
    /// same config).
    ///
    /// The timer task sleeps until each next fire and then spawns `fire()`
    /// detached, so stopping the job never cancels an in-flight run.
    pub fn schedule<F, Fut>(&self, config_id: i64, cadence: &str, rule: Recurrence, fire: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let timer = tokio::spawn(async move {
            loop {
                let now = Utc::now();
                let Some(next) = rule.next_fire(now) else {
                    warn!(config_id, "recurrence produced no next fire, timer stopping");
                    break;
                };
                let wait = (next - now).to_std().unwrap_or_default();
                tokio::time::sleep(wait).await;
                debug!(config_id, "recurrence fired");
                tokio::spawn(fire());
            }
        });

        let mut jobs = self.jobs.lock().unwrap();
        if let Some(old) = jobs.insert(
            config_id,
            ArmedJob {
                cadence: cadence.to_string(),
                timer,
            },
        ) {
            old.timer.abort();
            info!(config_id, "existing job replaced");
        }
    }

    /// Cancel and remove the job if present. Returns whether a job was
    /// armed; stopping an unknown id is a no-op, not an error.
    pub fn stop(&self, config_id: i64) -> bool {
        let mut jobs = self.jobs.lock().unwrap();
        match jobs.remove(&config_id) {
            Some(job) => {
                job.timer.abort();
                true
            }
            None => false,
        }
    }

    /// Currently armed jobs, ordered by config id.
    pub fn status(&self) -> Vec<JobStatus> {
        let jobs = self.jobs.lock().unwrap();
        let mut status: Vec<JobStatus> = jobs
            .iter()
            .map(|(&config_id, job)| JobStatus {
                config_id,
                cadence: job.cadence.clone(),
                is_running: true,
            })
            .collect();
        status.sort_by_key(|j| j.config_id);
        status
    }
}

impl Default for JobRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_op() -> impl std::future::Future<Output = ()> {
        async {}
    }

    #[tokio::test]
    async fn scheduling_twice_leaves_one_armed_handle() {
        let registry = JobRegistry::new();
        registry.schedule(1, "daily", Recurrence::Daily, no_op);
        registry.schedule(1, "hourly", Recurrence::Hourly, no_op);

        let status = registry.status();
        assert_eq!(status.len(), 1);
        assert_eq!(status[0].config_id, 1);
        assert_eq!(status[0].cadence, "hourly");
        assert!(status[0].is_running);
    }

    #[tokio::test]
    async fn stop_on_unscheduled_id_is_a_no_op() {
        let registry = JobRegistry::new();
        assert!(!registry.stop(42));
        assert!(registry.status().is_empty());
    }

    #[tokio::test]
    async fn status_reflects_schedule_and_stop() {
        let registry = JobRegistry::new();
        registry.schedule(1, "daily", Recurrence::Daily, no_op);
        registry.schedule(2, "hourly", Recurrence::Hourly, no_op);
        assert!(registry.stop(1));

        let status = registry.status();
        assert_eq!(status.len(), 1);
        assert_eq!(status[0].config_id, 2);
    }

    #[tokio::test]
    async fn stopped_jobs_can_be_rearmed() {
        let registry = JobRegistry::new();
        registry.schedule(1, "daily", Recurrence::Daily, no_op);
        registry.stop(1);
        registry.schedule(1, "daily", Recurrence::Daily, no_op);
        assert_eq!(registry.status().len(), 1);
    }
}
