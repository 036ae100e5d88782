// Configuration management with layered configuration (file, env)

use crate::errors::WindowError;
use crate::window::{parse_day, DaySelection, TimeWindow};
use chrono_tz::Tz;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Main settings structure containing all configuration options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub booking: BookingConfig,
    pub window: WindowConfig,
    pub telegram: TelegramConfig,
    pub watcher: WatcherConfig,
    pub observability: ObservabilityConfig,
}

/// Booking platform endpoint and credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingConfig {
    pub base_url: String,
    pub service_id: String,
    pub location_id: String,
    /// Long-lived session cookie value; required
    pub client_session: String,
    pub timeout_seconds: u64,
}

/// Which days and which time of day to watch
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Inspect today plus the following n-1 days
    pub days_ahead: Option<u32>,
    /// Explicit ISO dates; takes precedence over days_ahead
    pub specific_days: Vec<String>,
    pub start_time: String,
    pub end_time: String,
    /// IANA timezone for all wall-clock evaluation
    pub timezone: String,
}

/// Telegram bot delivery; both token and chat id must be set for delivery
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
    pub api_base: String,
    pub timeout_seconds: u64,
}

impl TelegramConfig {
    pub fn is_configured(&self) -> bool {
        self.bot_token.is_some() && self.chat_id.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatcherConfig {
    /// Kill switch; a disabled watcher exits without scanning
    pub enabled: bool,
    pub max_retries: u32,
    pub retry_base_delay_seconds: u64,
    pub retry_max_delay_seconds: u64,
    /// Watch mode only
    pub poll_interval_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub log_level: String,
    /// Prometheus exporter port for watch mode; None disables the exporter
    pub metrics_port: Option<u16>,
}

impl Settings {
    /// Load configuration with layered precedence: defaults → file → env
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from_path<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Start with default configuration
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Add local configuration (not committed to git)
            .add_source(File::from(config_dir.join("local.toml")).required(false))
            // Add environment overrides
            .add_source(
                Environment::with_prefix("SLOTWATCH")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Validate configuration settings before any network traffic
    pub fn validate(&self) -> Result<(), String> {
        if self.booking.base_url.is_empty() {
            return Err("Booking base_url cannot be empty".to_string());
        }
        if self.booking.service_id.is_empty() {
            return Err("Booking service_id cannot be empty".to_string());
        }
        if self.booking.location_id.is_empty() {
            return Err("Booking location_id cannot be empty".to_string());
        }
        if self.booking.client_session.is_empty() {
            return Err("Booking client_session cannot be empty".to_string());
        }
        if self.booking.timeout_seconds == 0 {
            return Err("Booking timeout_seconds must be greater than 0".to_string());
        }

        self.window.selection().map_err(|e| e.to_string())?;
        self.window.time_window().map_err(|e| e.to_string())?;
        self.window.tz().map_err(|e| e.to_string())?;

        if self.telegram.bot_token.is_some() != self.telegram.chat_id.is_some() {
            return Err(
                "Telegram bot_token and chat_id must be set together".to_string()
            );
        }
        if self.telegram.timeout_seconds == 0 {
            return Err("Telegram timeout_seconds must be greater than 0".to_string());
        }

        if self.watcher.max_retries > 10 {
            return Err("Watcher max_retries must be at most 10".to_string());
        }
        if self.watcher.poll_interval_seconds == 0 {
            return Err("Watcher poll_interval_seconds must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl WindowConfig {
    /// Derive the day selection; explicit dates win over days_ahead
    pub fn selection(&self) -> Result<DaySelection, WindowError> {
        let mut days = Vec::with_capacity(self.specific_days.len());
        for value in &self.specific_days {
            days.push(parse_day(value)?);
        }
        if !days.is_empty() {
            return Ok(DaySelection::Specific(days));
        }
        match self.days_ahead {
            Some(n) => Ok(DaySelection::DaysAhead(n)),
            None => Ok(DaySelection::Today),
        }
    }

    pub fn time_window(&self) -> Result<TimeWindow, WindowError> {
        TimeWindow::parse(&self.start_time, &self.end_time)
    }

    pub fn tz(&self) -> Result<Tz, WindowError> {
        Tz::from_str(&self.timezone)
            .map_err(|_| WindowError::InvalidTimezone(self.timezone.clone()))
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            booking: BookingConfig::default(),
            window: WindowConfig::default(),
            telegram: TelegramConfig::default(),
            watcher: WatcherConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.calendis.ro".to_string(),
            service_id: "8029".to_string(),
            location_id: "1651".to_string(),
            client_session: String::new(),
            timeout_seconds: 30,
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            days_ahead: None,
            specific_days: Vec::new(),
            start_time: "16:00".to_string(),
            end_time: "20:00".to_string(),
            timezone: "UTC".to_string(),
        }
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            chat_id: None,
            api_base: "https://api.telegram.org".to_string(),
            timeout_seconds: 10,
        }
    }
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_retries: 3,
            retry_base_delay_seconds: 5,
            retry_max_delay_seconds: 60,
            poll_interval_seconds: 300,
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_port: None,
        }
    }
}
