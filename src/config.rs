//! Configuration module for gator.
//!
//! The configuration lives in a TOML file next to the user. Besides static
//! settings it also carries the session state (the active user), which the
//! `register` and `login` commands write back.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::{GatorError, Result};

/// Database configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/gator.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Optional log file. Logs always go to stderr as well.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Feed scraper configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScraperConfig {
    /// Time between ticks of the ingestion loop (e.g. "1m", "1h30m", "45s").
    #[serde(default = "default_scraper_interval")]
    pub interval: String,
    /// User-Agent header sent with every feed request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Maximum wait between reads of the response in seconds.
    #[serde(default = "default_read_timeout")]
    pub read_timeout_secs: u64,
    /// Total request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Maximum feed size in bytes.
    #[serde(default = "default_max_feed_size")]
    pub max_feed_size_bytes: u64,
}

fn default_scraper_interval() -> String {
    "1m".to_string()
}

fn default_user_agent() -> String {
    "gator".to_string()
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_read_timeout() -> u64 {
    20
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_feed_size() -> u64 {
    5 * 1024 * 1024 // 5MB
}

impl ScraperConfig {
    /// Parse the configured interval.
    pub fn interval(&self) -> Result<Duration> {
        parse_interval(&self.interval)
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            interval: default_scraper_interval(),
            user_agent: default_user_agent(),
            connect_timeout_secs: default_connect_timeout(),
            read_timeout_secs: default_read_timeout(),
            request_timeout_secs: default_request_timeout(),
            max_feed_size_bytes: default_max_feed_size(),
        }
    }
}

/// Display configuration for listings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DisplayConfig {
    /// Timezone for displaying dates (e.g., "Europe/Berlin", "UTC").
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Number of posts shown by `browse` when no limit is given.
    #[serde(default = "default_browse_limit")]
    pub browse_limit: i64,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_browse_limit() -> i64 {
    2
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            browse_limit: default_browse_limit(),
        }
    }
}

/// Session state.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SessionConfig {
    /// Name of the active user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_user: Option<String>,
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Scraper configuration.
    #[serde(default)]
    pub scraper: ScraperConfig,
    /// Display configuration.
    #[serde(default)]
    pub display: DisplayConfig,
    /// Session state.
    #[serde(default)]
    pub session: SessionConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(GatorError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration, writing a default file first if none exists.
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            let config = Self::default();
            config.save(path)?;
            return Ok(config);
        }
        Self::load(path)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| GatorError::Config(format!("config parse error: {e}")))
    }

    /// Write the configuration back to a TOML file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| GatorError::Config(format!("config serialize error: {e}")))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Set the active user and persist the configuration.
    pub fn set_current_user<P: AsRef<Path>>(&mut self, name: &str, path: P) -> Result<()> {
        self.session.current_user = Some(name.to_string());
        self.save(path)
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `GATOR_DB_PATH`: Override the database path
    /// - `GATOR_LOG_LEVEL`: Override the log level
    pub fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("GATOR_DB_PATH") {
            if !path.is_empty() {
                self.database.path = path;
            }
        }
        if let Ok(level) = std::env::var("GATOR_LOG_LEVEL") {
            if !level.is_empty() {
                self.logging.level = level;
            }
        }
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - The scraper interval is not a positive duration
    /// - The read or request timeout is zero
    /// - The display timezone is unknown
    pub fn validate(&self) -> Result<()> {
        self.scraper.interval()?;

        if self.scraper.read_timeout_secs == 0 {
            return Err(GatorError::Config(
                "scraper.read_timeout_secs must be greater than zero".to_string(),
            ));
        }

        if self.scraper.request_timeout_secs == 0 {
            return Err(GatorError::Config(
                "scraper.request_timeout_secs must be greater than zero".to_string(),
            ));
        }

        if self.display.timezone.parse::<chrono_tz::Tz>().is_err() {
            return Err(GatorError::Config(format!(
                "unknown timezone: {}",
                self.display.timezone
            )));
        }

        Ok(())
    }
}

/// Parse a duration such as `"1m"`, `"1h30m"`, `"45s"` or `"500ms"`.
///
/// Units are `h`, `m`, `s` and `ms`; fractions are not supported. The
/// result must be strictly positive.
pub fn parse_interval(input: &str) -> Result<Duration> {
    let s = input.trim();
    if s.is_empty() {
        return Err(GatorError::Config("interval is empty".to_string()));
    }
    if s.starts_with('-') {
        return Err(GatorError::Config(format!(
            "interval must be positive: {input}"
        )));
    }

    let invalid = || GatorError::Config(format!("invalid interval: {input}"));

    let mut total = Duration::ZERO;
    let mut rest = s.strip_prefix('+').unwrap_or(s);
    while !rest.is_empty() {
        let digits = rest.find(|c: char| !c.is_ascii_digit()).ok_or_else(invalid)?;
        if digits == 0 {
            return Err(invalid());
        }
        let value: u64 = rest[..digits].parse().map_err(|_| invalid())?;
        rest = &rest[digits..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit())
            .unwrap_or(rest.len());
        let part = match &rest[..unit_len] {
            "h" => Duration::from_secs(value.saturating_mul(3600)),
            "m" => Duration::from_secs(value.saturating_mul(60)),
            "s" => Duration::from_secs(value),
            "ms" => Duration::from_millis(value),
            _ => return Err(invalid()),
        };
        total = total.checked_add(part).ok_or_else(invalid)?;
        rest = &rest[unit_len..];
    }

    if total.is_zero() {
        return Err(GatorError::Config(format!(
            "interval must be positive: {input}"
        )));
    }
    Ok(total)
}
