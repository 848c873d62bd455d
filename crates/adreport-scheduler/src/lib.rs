//! `adreport-scheduler` — recurring execution of report configs.
//!
//! # Overview
//!
//! A config's cadence label resolves to a [`cadence::Recurrence`], a pure
//! next-fire computation in UTC. The [`registry::JobRegistry`] maps config
//! ids to live timer tasks; the store stays the source of truth and the
//! registry is rebuilt from it on boot. Each fire reloads the config fresh
//! before running the pipeline, so metadata and cadence edits made after
//! scheduling are always honoured.
//!
//! # Cadence labels
//!
//! | Label                      | Behaviour                     |
//! |----------------------------|-------------------------------|
//! | `manual`                   | never scheduled               |
//! | `every_minute`/`test-minute` | top of every minute         |
//! | `hourly`                   | top of every hour             |
//! | `every12h`                 | 00:00 and 12:00 UTC           |
//! | `daily`                    | 00:00 UTC                     |

pub mod cadence;
pub mod error;
pub mod registry;
pub mod service;

pub use cadence::{resolve, Recurrence};
pub use error::{Result, SchedulerError};
pub use registry::{JobRegistry, JobStatus};
pub use service::SchedulerService;
