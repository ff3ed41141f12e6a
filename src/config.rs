use crate::components::calendar::DEFAULT_MAX_MARKERS;
use crate::components::dashboard::DashboardSettings;
use crate::error::{config_error, env_error, CalendarResult};
use crate::utils::i18n::normalize_locale;
use chrono::Weekday;
use chrono_tz::Tz;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::warn;

/// Table the dashboard reads and writes by default
pub const DEFAULT_SCHEDULE_TABLE: &str = "calendar_schedules";

/// Path of the optional display settings file
pub const DISPLAY_CONFIG_PATH: &str = "config/dashboard.toml";

/// Display settings read from `config/dashboard.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// First column of the grid, "sunday" or "monday"
    pub week_start: String,
    /// Markers drawn per day before the overflow dot
    pub max_markers: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            week_start: "sunday".to_string(),
            max_markers: DEFAULT_MAX_MARKERS,
        }
    }
}

impl DisplayConfig {
    /// Parse a display settings file; missing keys keep their defaults
    pub fn from_toml(content: &str) -> CalendarResult<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn week_start(&self) -> CalendarResult<Weekday> {
        match self.week_start.trim().to_ascii_lowercase().as_str() {
            "sunday" | "sun" => Ok(Weekday::Sun),
            "monday" | "mon" => Ok(Weekday::Mon),
            other => Err(config_error(&format!(
                "Unsupported week_start '{}', expected sunday or monday",
                other
            ))),
        }
    }
}

/// Main configuration structure for the dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Supabase project URL; absent means the in-memory store is used
    pub supabase_url: Option<String>,
    /// Supabase anon key sent with every request
    pub supabase_anon_key: Option<String>,
    /// Table holding the schedules
    pub schedule_table: String,
    /// Redis connection string for sessions
    pub redis_url: Option<String>,
    /// JWT secret for signing/verifying tokens
    pub jwt_secret: String,
    pub admin_username: String,
    pub admin_password: String,
    /// Token expiration time in minutes
    pub token_expiration_minutes: i64,
    /// Timezone deciding which day is today
    pub timezone: String,
    /// Locale for month titles and messages
    pub locale: String,
    /// Port the web interface listens on
    pub port: u16,
    pub display: DisplayConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            supabase_url: None,
            supabase_anon_key: None,
            schedule_table: DEFAULT_SCHEDULE_TABLE.to_string(),
            redis_url: None,
            jwt_secret: "super_secret_key".to_string(),
            admin_username: "admin".to_string(),
            admin_password: "password".to_string(),
            token_expiration_minutes: 60 * 24,
            timezone: "UTC".to_string(),
            locale: "ko".to_string(),
            port: 3000,
            display: DisplayConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment and config file
    pub fn load() -> CalendarResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let defaults = Config::default();

        let token_expiration_minutes = match env::var("TOKEN_EXPIRATION_MINUTES") {
            Ok(value) => value
                .parse::<i64>()
                .map_err(|_| env_error("Invalid TOKEN_EXPIRATION_MINUTES format"))?,
            Err(_) => defaults.token_expiration_minutes,
        };

        let port = match env::var("PORT") {
            Ok(value) => value
                .parse::<u16>()
                .map_err(|_| env_error("Invalid PORT format"))?,
            Err(_) => defaults.port,
        };

        let display = if Path::new(DISPLAY_CONFIG_PATH).exists() {
            DisplayConfig::from_toml(&fs::read_to_string(DISPLAY_CONFIG_PATH)?)?
        } else {
            DisplayConfig::default()
        };

        let config = Config {
            supabase_url: non_empty_var("SUPABASE_URL"),
            supabase_anon_key: non_empty_var("SUPABASE_ANON_KEY"),
            schedule_table: non_empty_var("SCHEDULE_TABLE").unwrap_or(defaults.schedule_table),
            redis_url: non_empty_var("REDIS_URL"),
            jwt_secret: non_empty_var("JWT_SECRET").unwrap_or(defaults.jwt_secret),
            admin_username: non_empty_var("ADMIN_USERNAME").unwrap_or(defaults.admin_username),
            admin_password: non_empty_var("ADMIN_PASSWORD").unwrap_or(defaults.admin_password),
            token_expiration_minutes,
            timezone: non_empty_var("TIMEZONE").unwrap_or(defaults.timezone),
            locale: non_empty_var("LOCALE").unwrap_or(defaults.locale),
            port,
            display,
        };

        // Fail early on settings that would only break at request time
        config.timezone()?;
        config.display.week_start()?;

        for name in config.insecure_defaults() {
            warn!("{} not set, falling back to the insecure built-in default", name);
        }

        Ok(config)
    }

    pub fn timezone(&self) -> CalendarResult<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| config_error(&format!("Unknown timezone '{}'", self.timezone)))
    }

    /// Credentials still on their built-in values
    pub fn insecure_defaults(&self) -> Vec<&'static str> {
        let defaults = Config::default();
        let mut names = Vec::new();
        if self.jwt_secret == defaults.jwt_secret {
            names.push("JWT_SECRET");
        }
        if self.admin_password == defaults.admin_password {
            names.push("ADMIN_PASSWORD");
        }
        names
    }

    /// How long a login session and its dashboard live without use
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.token_expiration_minutes.max(1) as u64 * 60)
    }

    /// Supabase URL and key when both are configured
    pub fn supabase(&self) -> Option<(&str, &str)> {
        match (&self.supabase_url, &self.supabase_anon_key) {
            (Some(url), Some(key)) => Some((url.as_str(), key.as_str())),
            _ => None,
        }
    }

    /// Settings handed to every session's dashboard
    pub fn dashboard_settings(&self) -> CalendarResult<DashboardSettings> {
        Ok(DashboardSettings {
            week_start: self.display.week_start()?,
            max_markers: self.display.max_markers,
            timezone: self.timezone()?,
            locale: normalize_locale(&self.locale).to_string(),
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}
