//! `adreport-pipeline` — one report generation, end to end.
//!
//! # Steps
//!
//! | Step        | Failure behaviour                                     |
//! |-------------|-------------------------------------------------------|
//! | Translate   | aborts, recorded to the config's last_error           |
//! | Fetch       | aborts, recorded                                      |
//! | Deduplicate | pure, cannot fail                                     |
//! | Summarize   | aborts, recorded — no report without a summary        |
//! | Persist     | point of no return; the run has produced a report     |
//! | Metadata    | last_run/last_error bookkeeping on the config         |
//! | Deliver     | email is best-effort; a send failure is logged only   |
//!
//! There are no retries inside a single execution. A failed recurring run
//! simply waits for its next trigger; run-now callers get the error back.

pub mod api;
pub mod chart;
pub mod dedupe;
pub mod email;
pub mod error;
pub mod mail;
pub mod pipeline;
pub mod summary;

pub use api::{AnalyticsApi, HttpAnalyticsApi, InsightsRequest};
pub use error::{PipelineError, Result};
pub use mail::{Mailer, SmtpMailer};
pub use pipeline::ReportPipeline;
pub use summary::{OpenAiSummarizer, Summarizer};
