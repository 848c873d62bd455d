use chrono::{DateTime, Datelike, Duration, TimeZone, Timelike, Utc};

use crate::error::{Result, SchedulerError};

/// Resolved recurrence for a non-manual cadence. All boundaries are
/// evaluated in UTC regardless of caller locale, so fire times are
/// deterministic and testable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recurrence {
    /// Top of every minute.
    EveryMinute,
    /// Top of every hour.
    Hourly,
    /// 00:00 and 12:00 UTC.
    Every12Hours,
    /// 00:00 UTC once per day.
    Daily,
}

/// Map a cadence label to its recurrence. `manual` has none; unknown
/// labels fail and the caller must not install a job.
pub fn resolve(cadence: &str) -> Result<Option<Recurrence>> {
    match cadence {
        "manual" => Ok(None),
        // "test-minute" is the alias the form's test mode submits.
        "every_minute" | "test-minute" => Ok(Some(Recurrence::EveryMinute)),
        "hourly" => Ok(Some(Recurrence::Hourly)),
        "every12h" => Ok(Some(Recurrence::Every12Hours)),
        "daily" => Ok(Some(Recurrence::Daily)),
        other => Err(SchedulerError::InvalidCadence(other.to_string())),
    }
}

impl Recurrence {
    /// Compute the next UTC fire time strictly after `from`.
    ///
    /// Returns `None` only if the truncated candidate cannot be represented,
    /// which does not happen for valid UTC instants.
    pub fn next_fire(&self, from: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let midnight = Utc
            .with_ymd_and_hms(from.year(), from.month(), from.day(), 0, 0, 0)
            .single()?;

        match self {
            Recurrence::EveryMinute => {
                let minute = Utc
                    .with_ymd_and_hms(
                        from.year(),
                        from.month(),
                        from.day(),
                        from.hour(),
                        from.minute(),
                        0,
                    )
                    .single()?;
                Some(minute + Duration::minutes(1))
            }

            Recurrence::Hourly => {
                let hour = Utc
                    .with_ymd_and_hms(from.year(), from.month(), from.day(), from.hour(), 0, 0)
                    .single()?;
                Some(hour + Duration::hours(1))
            }

            Recurrence::Every12Hours => {
                let noon = midnight + Duration::hours(12);
                if from < noon {
                    Some(noon)
                } else {
                    Some(midnight + Duration::hours(24))
                }
            }

            Recurrence::Daily => Some(midnight + Duration::days(1)),
        }
    }
}
