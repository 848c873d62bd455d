//! `adreport-store` — SQLite persistence for report configs and generated
//! reports.
//!
//! The store is the source of truth for report configurations; the
//! scheduler's in-memory job registry is rebuilt from it on every process
//! start. Generated reports are immutable rows owned by their config and
//! removed with it via `ON DELETE CASCADE`.

pub mod db;
pub mod error;
pub mod store;

pub use error::{Result, StoreError};
pub use store::ReportStore;
