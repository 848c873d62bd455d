use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Cadence labels the scheduler understands. "test-minute" is the
/// every-minute alias the form's test mode submits.
pub const CADENCES: &[&str] = &[
    "manual",
    "every_minute",
    "test-minute",
    "hourly",
    "every12h",
    "daily",
];

/// Supported ad platform. The platform drives both the outgoing request
/// shape and the level validation set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Meta,
    Tiktok,
}

impl Platform {
    /// Reporting levels the platform accepts.
    pub fn levels(&self) -> &'static [&'static str] {
        match self {
            Platform::Meta => &["account", "campaign", "adset", "ad"],
            Platform::Tiktok => &["AUCTION_ADVERTISER", "AUCTION_CAMPAIGN", "AUCTION_AD"],
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Platform::Meta => "meta",
            Platform::Tiktok => "tiktok",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "meta" => Ok(Platform::Meta),
            "tiktok" => Ok(Platform::Tiktok),
            other => Err(format!("unknown platform: {other}")),
        }
    }
}

/// Reporting window. `Custom` requires an explicit from/to date pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateRange {
    Last7,
    Last14,
    Last30,
    Lifetime,
    Custom,
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DateRange::Last7 => "last7",
            DateRange::Last14 => "last14",
            DateRange::Last30 => "last30",
            DateRange::Lifetime => "lifetime",
            DateRange::Custom => "custom",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for DateRange {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "last7" => Ok(DateRange::Last7),
            "last14" => Ok(DateRange::Last14),
            "last30" => Ok(DateRange::Last30),
            "lifetime" => Ok(DateRange::Lifetime),
            "custom" => Ok(DateRange::Custom),
            other => Err(format!("unknown date range: {other}")),
        }
    }
}

/// How a generated report reaches the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Delivery {
    Email,
    Link,
}

impl std::fmt::Display for Delivery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Delivery::Email => "email",
            Delivery::Link => "link",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for Delivery {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "email" => Ok(Delivery::Email),
            "link" => Ok(Delivery::Link),
            other => Err(format!("unknown delivery method: {other}")),
        }
    }
}

/// Explicit date window for `DateRange::Custom`, dates as YYYY-MM-DD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomDateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

/// A persisted report configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportConfig {
    /// Store-assigned row id.
    pub id: i64,
    pub platform: Platform,
    /// Metric names, never empty. Stored comma-joined in the DB.
    pub metrics: Vec<String>,
    /// Platform-dependent reporting level, validated against
    /// [`Platform::levels`].
    pub level: String,
    pub date_range: DateRange,
    /// Present exactly when `date_range` is `Custom`.
    pub custom_date_from: Option<NaiveDate>,
    pub custom_date_to: Option<NaiveDate>,
    /// Cadence label; resolved to a recurrence by the scheduler. Unknown
    /// labels fail at schedule time, leaving the config unscheduled.
    pub cadence: String,
    pub delivery: Delivery,
    /// Present exactly when `delivery` is `Email`.
    pub email: Option<String>,
    /// RFC-3339 timestamp of the last successful run, if any.
    pub last_run: Option<String>,
    /// Message of the last failed run; cleared on success.
    pub last_error: Option<String>,
    pub created_at: String,
}

/// Input for creating or replacing a report configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReportConfig {
    pub platform: Platform,
    pub metrics: Vec<String>,
    pub level: String,
    pub date_range: DateRange,
    #[serde(default)]
    pub custom_date_range: Option<CustomDateRange>,
    pub cadence: String,
    pub delivery: Delivery,
    #[serde(default)]
    pub email: Option<String>,
}

impl NewReportConfig {
    /// Enforce the config invariants before any store write:
    /// custom dates exactly when the range is custom (from <= to), an email
    /// address exactly when delivery is email, non-empty metrics, a level
    /// from the platform's set, and a known cadence label.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.metrics.is_empty() || self.metrics.iter().any(|m| m.trim().is_empty()) {
            return Err(CoreError::Validation(
                "metrics must be a non-empty list of metric names".into(),
            ));
        }

        if !self.platform.levels().contains(&self.level.as_str()) {
            return Err(CoreError::Validation(format!(
                "level '{}' is not valid for platform '{}'",
                self.level, self.platform
            )));
        }

        match (self.date_range, &self.custom_date_range) {
            (DateRange::Custom, None) => {
                return Err(CoreError::Validation(
                    "custom date range requires from and to dates".into(),
                ));
            }
            (DateRange::Custom, Some(range)) if range.from > range.to => {
                return Err(CoreError::Validation(
                    "custom date range 'from' must not be after 'to'".into(),
                ));
            }
            (DateRange::Custom, Some(_)) => {}
            (_, Some(_)) => {
                return Err(CoreError::Validation(
                    "custom dates are only allowed when dateRange is 'custom'".into(),
                ));
            }
            (_, None) => {}
        }

        match (self.delivery, &self.email) {
            (Delivery::Email, None) => {
                return Err(CoreError::Validation(
                    "email address is required when delivery method is email".into(),
                ));
            }
            (Delivery::Email, Some(addr)) if !addr.contains('@') => {
                return Err(CoreError::Validation(format!(
                    "'{addr}' is not a valid email address"
                )));
            }
            (Delivery::Link, Some(_)) => {
                return Err(CoreError::Validation(
                    "email address is only allowed when delivery method is email".into(),
                ));
            }
            _ => {}
        }

        if !CADENCES.contains(&self.cadence.as_str()) {
            return Err(CoreError::Validation(format!(
                "unknown cadence: {}",
                self.cadence
            )));
        }

        Ok(())
    }
}

/// One pipeline execution's output. Immutable once created; owned by its
/// config and removed with it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedReport {
    /// UUID v4 string — doubles as the public view-report identifier.
    pub id: String,
    pub report_config_id: i64,
    /// Deduplicated row set as returned by the analytics API.
    pub data: serde_json::Value,
    pub summary: String,
    /// Platform snapshot at generation time.
    pub platform: Platform,
    /// Date range snapshot at generation time.
    pub date_range: DateRange,
    pub created_at: String,
}

/// Input for persisting a generated report.
#[derive(Debug, Clone)]
pub struct NewGeneratedReport {
    pub report_config_id: i64,
    pub data: serde_json::Value,
    pub summary: String,
    pub platform: Platform,
    pub date_range: DateRange,
}
