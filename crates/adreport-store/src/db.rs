use rusqlite::Connection;

use crate::error::Result;

/// Initialise the report schema in `conn`.
///
/// Creates both tables (idempotent) and an index on the owning-config
/// column so cascade deletes and per-config lookups stay cheap.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS report_configs (
            id               INTEGER PRIMARY KEY AUTOINCREMENT,
            platform         TEXT    NOT NULL,
            metrics          TEXT    NOT NULL,   -- comma-joined metric names
            level            TEXT    NOT NULL,
            date_range       TEXT    NOT NULL,
            custom_date_from TEXT,               -- YYYY-MM-DD or NULL
            custom_date_to   TEXT,               -- YYYY-MM-DD or NULL
            cadence          TEXT    NOT NULL,
            delivery         TEXT    NOT NULL,
            email            TEXT,
            last_run         TEXT,               -- RFC-3339 or NULL
            last_error       TEXT,
            created_at       TEXT    NOT NULL
        ) STRICT;

        CREATE TABLE IF NOT EXISTS generated_reports (
            id               TEXT    NOT NULL PRIMARY KEY,
            report_config_id INTEGER NOT NULL
                             REFERENCES report_configs(id) ON DELETE CASCADE,
            data             TEXT    NOT NULL,   -- JSON row array
            summary          TEXT    NOT NULL,
            platform         TEXT    NOT NULL,
            date_range       TEXT    NOT NULL,
            created_at       TEXT    NOT NULL
        ) STRICT;

        CREATE INDEX IF NOT EXISTS idx_generated_reports_config
            ON generated_reports (report_config_id);
        ",
    )?;
    Ok(())
}
