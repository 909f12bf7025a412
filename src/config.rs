use config::{Config as ConfigBuilder, ConfigError, Environment, File, Map};
use serde::Deserialize;
use std::env;
use time::{Date, macros::format_description};

pub const DEV_SECRET: &str = "dev-secret-key-change-in-production";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub session: SessionConfig,
    #[serde(default)]
    pub calendar: CalendarConfig,
    #[serde(default)]
    pub completion: CompletionConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    pub secret: String,
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    #[serde(default = "default_lifetime_days")]
    pub lifetime_days: i64,
}

fn default_cookie_name() -> String {
    "advent_session".to_string()
}

fn default_lifetime_days() -> i64 {
    365
}

#[derive(Debug, Deserialize, Clone)]
pub struct CalendarConfig {
    #[serde(default = "default_start_date")]
    pub start_date: String,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "advent_activity::default_activities")]
    pub activities: Vec<String>,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            start_date: default_start_date(),
            timezone: default_timezone(),
            activities: advent_activity::default_activities(),
        }
    }
}

impl CalendarConfig {
    /// Parses `start_date` as an ISO `YYYY-MM-DD` date.
    pub fn start_date(&self) -> Result<Date, time::error::Parse> {
        Date::parse(&self.start_date, format_description!("[year]-[month]-[day]"))
    }
}

fn default_start_date() -> String {
    advent_activity::DEFAULT_START_DATE.to_string()
}

fn default_timezone() -> String {
    "UTC".to_string()
}

/// Where completion flags are kept.
#[derive(
    Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CompletionBackend {
    /// Inside the signed session cookie.
    #[default]
    Session,
    /// In `user_completions` rows.
    Database,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CompletionConfig {
    #[serde(default)]
    pub backend: CompletionBackend,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from file and environment variables
    ///
    /// Priority (highest to lowest):
    /// 1. Legacy environment variables (SECRET_KEY, ADVENT_START_DATE, DATABASE_URL,
    ///    FLASK_DEBUG or ADVENT_DEBUG)
    /// 2. Environment variables (ADVENT__DATABASE__URL, etc.)
    /// 3. Config file specified by path
    /// 4. Hardcoded defaults
    pub fn load(config_path: Option<String>) -> Result<Self, ConfigError> {
        Self::load_from(config_path, env::vars().collect())
    }

    /// Same as [`Config::load`], reading environment variables from `vars`.
    pub fn load_from(
        config_path: Option<String>,
        vars: Map<String, String>,
    ) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        builder = builder
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5000)?
            .set_default("database.url", "sqlite:advent.db")?
            .set_default("database.max_connections", 5)?
            .set_default("session.secret", DEV_SECRET)?;

        let config_file_path = config_path
            .or_else(|| vars.get("CONFIG_PATH").cloned())
            .unwrap_or_else(|| "config/default.toml".to_string());

        if std::path::Path::new(&config_file_path).exists() {
            builder = builder.add_source(File::with_name(&config_file_path));
        }

        builder = builder.add_source(
            Environment::with_prefix("ADVENT")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .source(Some(vars.clone())),
        );

        if let Some(secret) = vars.get("SECRET_KEY") {
            builder = builder.set_override("session.secret", secret.as_str())?;
        }
        if let Some(start_date) = vars.get("ADVENT_START_DATE") {
            builder = builder.set_override("calendar.start_date", start_date.as_str())?;
        }
        if let Some(database_url) = vars.get("DATABASE_URL") {
            builder = builder.set_override("database.url", database_url.as_str())?;
        }

        let debug = ["FLASK_DEBUG", "ADVENT_DEBUG"]
            .iter()
            .filter_map(|name| vars.get(*name))
            .any(|value| value.eq_ignore_ascii_case("true"));
        if debug {
            builder = builder.set_override("observability.log_level", "debug")?;
        }

        builder.build()?.try_deserialize()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.session.secret.len() < 32 {
            return Err("Session secret must be at least 32 characters long".to_string());
        }
        if self.session.lifetime_days < 1 {
            return Err("Session lifetime_days must be at least 1".to_string());
        }
        if self.database.max_connections < 1 {
            return Err("Database max_connections must be at least 1".to_string());
        }
        if self.server.port == 0 {
            return Err("Server port must be greater than 0".to_string());
        }
        if let Err(err) = self.calendar.start_date() {
            return Err(format!(
                "Calendar start_date '{}' is not a YYYY-MM-DD date: {err}",
                self.calendar.start_date
            ));
        }
        if time_tz::timezones::get_by_name(&self.calendar.timezone).is_none() {
            return Err(format!(
                "Calendar timezone '{}' is unknown",
                self.calendar.timezone
            ));
        }
        if self.calendar.activities.is_empty() {
            return Err("Calendar activities must not be empty".to_string());
        }
        Ok(())
    }
}
