use std::sync::Mutex;

use chrono::{NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension};
use tracing::debug;
use uuid::Uuid;

use adreport_core::types::{GeneratedReport, NewGeneratedReport, NewReportConfig, ReportConfig};

use crate::db::init_db;
use crate::error::{Result, StoreError};

/// Thread-safe store over a single SQLite connection.
///
/// All statements are short and never block on I/O beyond the page cache,
/// so a plain `std::sync::Mutex` is sufficient even when callers run on the
/// async runtime.
pub struct ReportStore {
    conn: Mutex<Connection>,
}

impl ReportStore {
    /// Wrap `conn`, initialising the schema if needed. Foreign keys are
    /// switched on so config deletion cascades to its generated reports.
    pub fn new(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        init_db(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    // --- report configs ----------------------------------------------------

    pub fn create_config(&self, input: &NewReportConfig) -> Result<ReportConfig> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now().to_rfc3339();
        let (from, to) = match &input.custom_date_range {
            Some(range) => (Some(range.from.to_string()), Some(range.to.to_string())),
            None => (None, None),
        };

        conn.execute(
            "INSERT INTO report_configs
             (platform, metrics, level, date_range, custom_date_from,
              custom_date_to, cadence, delivery, email, last_run, last_error,
              created_at)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,NULL,NULL,?10)",
            rusqlite::params![
                input.platform.to_string(),
                input.metrics.join(","),
                input.level,
                input.date_range.to_string(),
                from,
                to,
                input.cadence,
                input.delivery.to_string(),
                input.email,
                now,
            ],
        )?;
        let id = conn.last_insert_rowid();
        debug!(config_id = id, "report config created");

        Ok(ReportConfig {
            id,
            platform: input.platform,
            metrics: input.metrics.clone(),
            level: input.level.clone(),
            date_range: input.date_range,
            custom_date_from: input.custom_date_range.map(|r| r.from),
            custom_date_to: input.custom_date_range.map(|r| r.to),
            cadence: input.cadence.clone(),
            delivery: input.delivery,
            email: input.email.clone(),
            last_run: None,
            last_error: None,
            created_at: now,
        })
    }

    pub fn get_config(&self, id: i64) -> Result<Option<ReportConfig>> {
        let conn = self.conn.lock().unwrap();
        let raw = conn
            .query_row(
                &format!("SELECT {CONFIG_COLUMNS} FROM report_configs WHERE id = ?1"),
                [id],
                read_config_row,
            )
            .optional()?;
        raw.map(into_config).transpose()
    }

    /// All configs, newest first.
    pub fn list_configs(&self) -> Result<Vec<ReportConfig>> {
        self.query_configs(&format!(
            "SELECT {CONFIG_COLUMNS} FROM report_configs
             ORDER BY created_at DESC, id DESC"
        ))
    }

    /// Configs eligible for scheduling (cadence other than manual).
    pub fn list_scheduled_configs(&self) -> Result<Vec<ReportConfig>> {
        self.query_configs(&format!(
            "SELECT {CONFIG_COLUMNS} FROM report_configs
             WHERE cadence != 'manual' ORDER BY id"
        ))
    }

    /// Replace the user-editable fields of a config, keeping run metadata.
    pub fn update_config(&self, id: i64, input: &NewReportConfig) -> Result<ReportConfig> {
        {
            let conn = self.conn.lock().unwrap();
            let (from, to) = match &input.custom_date_range {
                Some(range) => (Some(range.from.to_string()), Some(range.to.to_string())),
                None => (None, None),
            };
            let n = conn.execute(
                "UPDATE report_configs SET
                   platform = ?1, metrics = ?2, level = ?3, date_range = ?4,
                   custom_date_from = ?5, custom_date_to = ?6, cadence = ?7,
                   delivery = ?8, email = ?9
                 WHERE id = ?10",
                rusqlite::params![
                    input.platform.to_string(),
                    input.metrics.join(","),
                    input.level,
                    input.date_range.to_string(),
                    from,
                    to,
                    input.cadence,
                    input.delivery.to_string(),
                    input.email,
                    id,
                ],
            )?;
            if n == 0 {
                return Err(StoreError::ConfigNotFound { id });
            }
        }
        self.get_config(id)?.ok_or(StoreError::ConfigNotFound { id })
    }

    /// Record a successful run: last_run set, last_error cleared.
    pub fn record_run_success(&self, id: i64, at: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let n = conn.execute(
            "UPDATE report_configs SET last_run = ?1, last_error = NULL WHERE id = ?2",
            rusqlite::params![at, id],
        )?;
        if n == 0 {
            return Err(StoreError::ConfigNotFound { id });
        }
        Ok(())
    }

    /// Record a failed run: last_error set, last_run untouched.
    pub fn record_run_error(&self, id: i64, message: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let n = conn.execute(
            "UPDATE report_configs SET last_error = ?1 WHERE id = ?2",
            rusqlite::params![message, id],
        )?;
        if n == 0 {
            return Err(StoreError::ConfigNotFound { id });
        }
        Ok(())
    }

    /// Delete a config and, via cascade, its generated reports.
    pub fn delete_config(&self, id: i64) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let n = conn.execute("DELETE FROM report_configs WHERE id = ?1", [id])?;
        if n == 0 {
            return Err(StoreError::ConfigNotFound { id });
        }
        debug!(config_id = id, "report config deleted");
        Ok(())
    }

    // --- generated reports -------------------------------------------------

    pub fn insert_report(&self, input: &NewGeneratedReport) -> Result<GeneratedReport> {
        let conn = self.conn.lock().unwrap();
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let data = serde_json::to_string(&input.data)?;

        conn.execute(
            "INSERT INTO generated_reports
             (id, report_config_id, data, summary, platform, date_range, created_at)
             VALUES (?1,?2,?3,?4,?5,?6,?7)",
            rusqlite::params![
                id,
                input.report_config_id,
                data,
                input.summary,
                input.platform.to_string(),
                input.date_range.to_string(),
                now,
            ],
        )?;
        debug!(report_id = %id, config_id = input.report_config_id, "generated report persisted");

        Ok(GeneratedReport {
            id,
            report_config_id: input.report_config_id,
            data: input.data.clone(),
            summary: input.summary.clone(),
            platform: input.platform,
            date_range: input.date_range,
            created_at: now,
        })
    }

    pub fn get_report(&self, id: &str) -> Result<Option<GeneratedReport>> {
        let conn = self.conn.lock().unwrap();
        let raw = conn
            .query_row(
                "SELECT id, report_config_id, data, summary, platform, date_range, created_at
                 FROM generated_reports WHERE id = ?1",
                [id],
                read_report_row,
            )
            .optional()?;
        raw.map(into_report).transpose()
    }

    /// Reports generated for one config, newest first.
    pub fn list_reports(&self, config_id: i64) -> Result<Vec<GeneratedReport>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, report_config_id, data, summary, platform, date_range, created_at
             FROM generated_reports WHERE report_config_id = ?1
             ORDER BY created_at DESC, id DESC",
        )?;
        let reports = stmt
            .query_map([config_id], read_report_row)?
            .filter_map(|r| r.ok())
            .filter_map(|raw| into_report(raw).ok())
            .collect();
        Ok(reports)
    }

    fn query_configs(&self, sql: &str) -> Result<Vec<ReportConfig>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(sql)?;
        let configs = stmt
            .query_map([], read_config_row)?
            .filter_map(|r| r.ok())
            .filter_map(|raw| into_config(raw).ok())
            .collect();
        Ok(configs)
    }
}

const CONFIG_COLUMNS: &str = "id, platform, metrics, level, date_range, custom_date_from, \
     custom_date_to, cadence, delivery, email, last_run, last_error, created_at";

type ConfigRow = (
    i64,
    String,
    String,
    String,
    String,
    Option<String>,
    Option<String>,
    String,
    String,
    Option<String>,
    Option<String>,
    Option<String>,
    String,
);

fn read_config_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ConfigRow> {
    Ok((
        row.get(0)?,  // id
        row.get(1)?,  // platform
        row.get(2)?,  // metrics
        row.get(3)?,  // level
        row.get(4)?,  // date_range
        row.get(5)?,  // custom_date_from
        row.get(6)?,  // custom_date_to
        row.get(7)?,  // cadence
        row.get(8)?,  // delivery
        row.get(9)?,  // email
        row.get(10)?, // last_run
        row.get(11)?, // last_error
        row.get(12)?, // created_at
    ))
}

fn into_config(raw: ConfigRow) -> Result<ReportConfig> {
    let (
        id,
        platform,
        metrics,
        level,
        date_range,
        custom_date_from,
        custom_date_to,
        cadence,
        delivery,
        email,
        last_run,
        last_error,
        created_at,
    ) = raw;

    Ok(ReportConfig {
        id,
        platform: platform.parse().map_err(StoreError::Invalid)?,
        metrics: metrics.split(',').map(str::to_string).collect(),
        level,
        date_range: date_range.parse().map_err(StoreError::Invalid)?,
        custom_date_from: parse_date(custom_date_from)?,
        custom_date_to: parse_date(custom_date_to)?,
        cadence,
        delivery: delivery.parse().map_err(StoreError::Invalid)?,
        email,
        last_run,
        last_error,
        created_at,
    })
}

fn parse_date(value: Option<String>) -> Result<Option<NaiveDate>> {
    value
        .map(|s| {
            s.parse::<NaiveDate>()
                .map_err(|e| StoreError::Invalid(format!("bad stored date '{s}': {e}")))
        })
        .transpose()
}

type ReportRow = (String, i64, String, String, String, String, String);

fn read_report_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ReportRow> {
    Ok((
        row.get(0)?, // id
        row.get(1)?, // report_config_id
        row.get(2)?, // data JSON
        row.get(3)?, // summary
        row.get(4)?, // platform
        row.get(5)?, // date_range
        row.get(6)?, // created_at
    ))
}

fn into_report(raw: ReportRow) -> Result<GeneratedReport> {
    let (id, report_config_id, data, summary, platform, date_range, created_at) = raw;
    Ok(GeneratedReport {
        id,
        report_config_id,
        data: serde_json::from_str(&data)?,
        summary,
        platform: platform.parse().map_err(StoreError::Invalid)?,
        date_range: date_range.parse().map_err(StoreError::Invalid)?,
        created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use adreport_core::types::{CustomDateRange, DateRange, Delivery, Platform};
    use serde_json::json;

    fn memory_store() -> ReportStore {
        ReportStore::new(Connection::open_in_memory().unwrap()).unwrap()
    }

    fn email_config(cadence: &str) -> NewReportConfig {
        NewReportConfig {
            platform: Platform::Meta,
            metrics: vec!["spend".to_string(), "clicks".to_string()],
            level: "campaign".to_string(),
            date_range: DateRange::Last7,
            custom_date_range: None,
            cadence: cadence.to_string(),
            delivery: Delivery::Email,
            email: Some("a@b.com".to_string()),
        }
    }

    #[test]
    fn create_and_get_round_trip() {
        let store = memory_store();
        let created = store.create_config(&email_config("daily")).unwrap();

        let loaded = store.get_config(created.id).unwrap().unwrap();
        assert_eq!(loaded.platform, Platform::Meta);
        assert_eq!(loaded.metrics, vec!["spend", "clicks"]);
        assert_eq!(loaded.cadence, "daily");
        assert_eq!(loaded.email.as_deref(), Some("a@b.com"));
        assert!(loaded.last_run.is_none());
        assert!(loaded.last_error.is_none());
    }

    #[test]
    fn get_missing_config_is_none() {
        let store = memory_store();
        assert!(store.get_config(42).unwrap().is_none());
    }

    #[test]
    fn custom_date_range_persists() {
        let store = memory_store();
        let mut input = email_config("manual");
        input.date_range = DateRange::Custom;
        input.custom_date_range = Some(CustomDateRange {
            from: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            to: NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
        });

        let created = store.create_config(&input).unwrap();
        let loaded = store.get_config(created.id).unwrap().unwrap();
        assert_eq!(loaded.date_range, DateRange::Custom);
        assert_eq!(
            loaded.custom_date_from,
            NaiveDate::from_ymd_opt(2025, 3, 1)
        );
        assert_eq!(loaded.custom_date_to, NaiveDate::from_ymd_opt(2025, 3, 31));
    }

    #[test]
    fn list_returns_newest_first() {
        let store = memory_store();
        let first = store.create_config(&email_config("manual")).unwrap();
        let second = store.create_config(&email_config("daily")).unwrap();

        let all = store.list_configs().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, second.id);
        assert_eq!(all[1].id, first.id);
    }

    #[test]
    fn scheduled_list_excludes_manual() {
        let store = memory_store();
        store.create_config(&email_config("manual")).unwrap();
        let hourly = store.create_config(&email_config("hourly")).unwrap();
        let daily = store.create_config(&email_config("daily")).unwrap();

        let scheduled = store.list_scheduled_configs().unwrap();
        let ids: Vec<i64> = scheduled.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![hourly.id, daily.id]);
    }

    #[test]
    fn update_replaces_fields_and_keeps_metadata() {
        let store = memory_store();
        let created = store.create_config(&email_config("daily")).unwrap();
        store.record_run_error(created.id, "boom").unwrap();

        let mut input = email_config("manual");
        input.metrics = vec!["impressions".to_string()];
        let updated = store.update_config(created.id, &input).unwrap();

        assert_eq!(updated.cadence, "manual");
        assert_eq!(updated.metrics, vec!["impressions"]);
        assert_eq!(updated.last_error.as_deref(), Some("boom"));
    }

    #[test]
    fn update_missing_config_fails() {
        let store = memory_store();
        let err = store.update_config(99, &email_config("daily")).unwrap_err();
        assert!(matches!(err, StoreError::ConfigNotFound { id: 99 }));
    }

    #[test]
    fn run_metadata_transitions() {
        let store = memory_store();
        let created = store.create_config(&email_config("daily")).unwrap();

        store.record_run_error(created.id, "fetch failed").unwrap();
        let loaded = store.get_config(created.id).unwrap().unwrap();
        assert_eq!(loaded.last_error.as_deref(), Some("fetch failed"));
        assert!(loaded.last_run.is_none());

        store
            .record_run_success(created.id, "2025-06-01T00:00:00Z")
            .unwrap();
        let loaded = store.get_config(created.id).unwrap().unwrap();
        assert_eq!(loaded.last_run.as_deref(), Some("2025-06-01T00:00:00Z"));
        assert!(loaded.last_error.is_none());
    }

    #[test]
    fn delete_cascades_to_reports() {
        let store = memory_store();
        let config = store.create_config(&email_config("daily")).unwrap();
        let report = store
            .insert_report(&NewGeneratedReport {
                report_config_id: config.id,
                data: json!([{"age": "18-24", "spend": "100"}]),
                summary: "short summary".to_string(),
                platform: config.platform,
                date_range: config.date_range,
            })
            .unwrap();

        store.delete_config(config.id).unwrap();
        assert!(store.get_config(config.id).unwrap().is_none());
        assert!(store.get_report(&report.id).unwrap().is_none());
    }

    #[test]
    fn delete_missing_config_fails() {
        let store = memory_store();
        let err = store.delete_config(7).unwrap_err();
        assert!(matches!(err, StoreError::ConfigNotFound { id: 7 }));
    }

    #[test]
    fn report_round_trip() {
        let store = memory_store();
        let config = store.create_config(&email_config("manual")).unwrap();
        let created = store
            .insert_report(&NewGeneratedReport {
                report_config_id: config.id,
                data: json!([{"age": "25-34", "spend": "200"}]),
                summary: "spend concentrated in 25-34".to_string(),
                platform: Platform::Meta,
                date_range: DateRange::Last7,
            })
            .unwrap();

        let loaded = store.get_report(&created.id).unwrap().unwrap();
        assert_eq!(loaded.report_config_id, config.id);
        assert_eq!(loaded.summary, "spend concentrated in 25-34");
        assert_eq!(loaded.data[0]["age"], "25-34");

        let listed = store.list_reports(config.id).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, created.id);
    }
}
