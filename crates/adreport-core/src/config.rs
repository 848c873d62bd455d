use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT: u16 = 8750;
pub const DEFAULT_BIND: &str = "127.0.0.1";
/// Default lifetime of a signed view-report link.
pub const DEFAULT_LINK_TTL_HOURS: i64 = 24;

/// Top-level config (adreport.toml + ADREPORT_* env overrides).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdreportConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    #[serde(default)]
    pub summarizer: SummarizerConfig,
    #[serde(default)]
    pub smtp: SmtpConfig,
    #[serde(default)]
    pub links: LinksConfig,
}

impl Default for AdreportConfig {
    fn default() -> Self {
        Self {
            gateway: GatewayConfig::default(),
            database: DatabaseConfig::default(),
            analytics: AnalyticsConfig::default(),
            summarizer: SummarizerConfig::default(),
            smtp: SmtpConfig::default(),
            links: LinksConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// External analytics API the pipeline fetches report rows from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Base URL; the platform name is appended as the final path segment.
    #[serde(default = "default_analytics_base_url")]
    pub base_url: String,
    /// Value sent verbatim in the Authorization header.
    #[serde(default)]
    pub auth_token: String,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            base_url: default_analytics_base_url(),
            auth_token: String::new(),
        }
    }
}

/// OpenAI-compatible chat-completions endpoint used to summarize report rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizerConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_summarizer_base_url")]
    pub base_url: String,
    #[serde(default = "default_summarizer_model")]
    pub model: String,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_summarizer_base_url(),
            model: default_summarizer_model(),
        }
    }
}

/// SMTP relay for email delivery. Delivery is best-effort; a misconfigured
/// relay surfaces as logged send failures, never as pipeline failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    #[serde(default = "default_smtp_host")]
    pub host: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_smtp_from")]
    pub from: String,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: default_smtp_host(),
            port: default_smtp_port(),
            username: String::new(),
            password: String::new(),
            from: default_smtp_from(),
        }
    }
}

/// Public link construction and signing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinksConfig {
    /// Base URL prepended to /view-report/{id} paths in emails and share
    /// links.
    #[serde(default = "default_links_base_url")]
    pub base_url: String,
    /// HMAC secret for signed view-report URLs.
    #[serde(default = "default_signing_secret")]
    pub signing_secret: String,
    #[serde(default = "default_link_ttl_hours")]
    pub ttl_hours: i64,
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            base_url: default_links_base_url(),
            signing_secret: default_signing_secret(),
            ttl_hours: DEFAULT_LINK_TTL_HOURS,
        }
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}
fn default_db_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.adreport/adreport.db", home)
}
fn default_analytics_base_url() -> String {
    "https://bizdev.newform.ai/sample-data".to_string()
}
fn default_summarizer_base_url() -> String {
    "https://api.openai.com".to_string()
}
fn default_summarizer_model() -> String {
    "gpt-4o".to_string()
}
fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}
fn default_smtp_port() -> u16 {
    587
}
fn default_smtp_from() -> String {
    "Adreport Reports <reports@localhost>".to_string()
}
fn default_links_base_url() -> String {
    format!("http://{}:{}", DEFAULT_BIND, DEFAULT_PORT)
}
fn default_signing_secret() -> String {
    "change-me".to_string()
}
fn default_link_ttl_hours() -> i64 {
    DEFAULT_LINK_TTL_HOURS
}

impl AdreportConfig {
    /// Load config from a TOML file with ADREPORT_* env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. ~/.adreport/adreport.toml
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: AdreportConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("ADREPORT_").split("_"))
            .extract()
            .map_err(|e| crate::error::CoreError::Config(e.to_string()))?;

        Ok(config)
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.adreport/adreport.toml", home)
}
