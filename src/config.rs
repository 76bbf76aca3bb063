//! Configuration management for the announcer
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{AnnouncerError, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// What to announce, where, and how often
    #[serde(default)]
    pub announcer: AnnouncerConfig,

    /// Event API settings
    #[serde(default)]
    pub meetup: MeetupConfig,

    /// Watermark store settings
    #[serde(default)]
    pub redis: RedisConfig,

    /// Chat platform settings
    #[serde(default)]
    pub slack: SlackConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Announcement behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnouncerConfig {
    /// Channel that receives scheduled announcements (None disables scheduling)
    #[serde(default)]
    pub channel: Option<String>,

    /// Minutes between check cycles
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: u64,

    /// Meetup group URL name
    #[serde(default = "default_group")]
    pub group: String,

    /// IANA timezone used to render event start times
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Thumbnail image attached to every announcement
    #[serde(default = "default_thumbnail_url")]
    pub thumbnail_url: String,
}

/// Longest accepted poll interval (one week)
pub const MAX_INTERVAL_MINUTES: u64 = 7 * 24 * 60;

fn default_interval_minutes() -> u64 {
    10
}

fn default_group() -> String {
    "Surrey-Code-Camp".to_string()
}

fn default_timezone() -> String {
    "America/Vancouver".to_string()
}

fn default_thumbnail_url() -> String {
    "https://secure.meetupstatic.com/s/img/786824251364989575000/logo/swarm/m_swarm_630x630.png"
        .to_string()
}

impl Default for AnnouncerConfig {
    fn default() -> Self {
        Self {
            channel: None,
            interval_minutes: default_interval_minutes(),
            group: default_group(),
            timezone: default_timezone(),
            thumbnail_url: default_thumbnail_url(),
        }
    }
}

/// Event API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetupConfig {
    /// API base URL; overridable so tests can point at a mock server
    #[serde(default = "default_meetup_api_base")]
    pub api_base: String,

    /// Optional request timeout in seconds (no timeout when unset)
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

fn default_meetup_api_base() -> String {
    "https://api.meetup.com".to_string()
}

impl Default for MeetupConfig {
    fn default() -> Self {
        Self {
            api_base: default_meetup_api_base(),
            timeout_seconds: None,
        }
    }
}

/// Watermark store configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RedisConfig {
    /// Connection URL, e.g. `redis://:secret@localhost:6379/2`
    #[serde(default)]
    pub url: Option<String>,
}

/// Slack configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlackConfig {
    /// Bot token used for chat.postMessage
    #[serde(default)]
    pub bot_token: Option<String>,

    /// Signing secret for verifying inbound event requests
    #[serde(default)]
    pub signing_secret: Option<String>,

    /// Web API base URL
    #[serde(default = "default_slack_api_base")]
    pub api_base: String,

    /// Address the inbound events endpoint binds to
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

fn default_slack_api_base() -> String {
    "https://slack.com/api".to_string()
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            signing_secret: None,
            api_base: default_slack_api_base(),
            listen_addr: default_listen_addr(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Enable JSON-formatted logs
    #[serde(default)]
    pub json_format: bool,

    /// Log file path (if None, stderr only)
    #[serde(default)]
    pub file_path: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
            file_path: None,
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// A missing file is not an error: defaults are used and the
    /// environment fills in the rest.
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::debug!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);
        config.normalize();

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| AnnouncerError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| AnnouncerError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(channel) = std::env::var("ANNOUNCER_CHANNEL") {
            let channel = channel.trim().to_string();
            self.announcer.channel = if channel.is_empty() {
                None
            } else {
                Some(channel)
            };
        }

        if let Ok(interval) = std::env::var("ANNOUNCER_INTERVAL_MINUTES") {
            if let Ok(value) = interval.trim().parse() {
                self.announcer.interval_minutes = value;
            } else {
                tracing::warn!("Invalid ANNOUNCER_INTERVAL_MINUTES: {}", interval);
            }
        }

        if let Ok(group) = std::env::var("ANNOUNCER_GROUP") {
            self.announcer.group = group;
        }

        if let Ok(timezone) = std::env::var("ANNOUNCER_TIMEZONE") {
            self.announcer.timezone = timezone;
        }

        if let Ok(api_base) = std::env::var("MEETUP_API_BASE") {
            self.meetup.api_base = api_base;
        }

        if let Ok(url) = std::env::var("REDIS_URL") {
            self.redis.url = Some(url).filter(|u| !u.trim().is_empty());
        }

        if let Ok(token) = std::env::var("SLACK_BOT_TOKEN") {
            self.slack.bot_token = Some(token);
        }

        if let Ok(secret) = std::env::var("SLACK_SIGNING_SECRET") {
            self.slack.signing_secret = Some(secret);
        }

        if let Ok(api_base) = std::env::var("SLACK_API_BASE") {
            self.slack.api_base = api_base;
        }

        if let Ok(addr) = std::env::var("ANNOUNCER_LISTEN_ADDR") {
            self.slack.listen_addr = addr;
        }

        if let Ok(level) = std::env::var("ANNOUNCER_LOG_LEVEL") {
            self.logging.level = level;
        }

        if let Ok(json_logs) = std::env::var("ANNOUNCER_JSON_LOGS") {
            match json_logs.to_lowercase().parse::<bool>() {
                Ok(v) => self.logging.json_format = v,
                Err(_) => {
                    tracing::warn!("Invalid value for ANNOUNCER_JSON_LOGS: {}", json_logs);
                }
            }
        }

        if let Ok(log_file) = std::env::var("ANNOUNCER_LOG_FILE") {
            self.logging.file_path = Some(PathBuf::from(log_file));
        }
    }

    /// Treat blank optional strings from any source as unset
    fn normalize(&mut self) {
        fn blank_to_none(value: &mut Option<String>) {
            *value = value
                .take()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty());
        }

        blank_to_none(&mut self.announcer.channel);
        blank_to_none(&mut self.redis.url);
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            self.logging.level = "debug".to_string();
        }
        if cli.json_logs {
            self.logging.json_format = true;
        }
        if let Some(log_file) = &cli.log_file {
            self.logging.file_path = Some(log_file.clone());
        }
    }

    /// Parsed target timezone
    ///
    /// # Errors
    ///
    /// Returns error if the configured name is not a known IANA zone
    pub fn timezone(&self) -> Result<Tz> {
        self.announcer.timezone.parse::<Tz>().map_err(|e| {
            AnnouncerError::Config(format!(
                "Invalid timezone '{}': {}",
                self.announcer.timezone, e
            ))
            .into()
        })
    }

    /// Poll interval as a duration
    ///
    /// # Errors
    ///
    /// Returns error if the interval is zero or longer than
    /// [`MAX_INTERVAL_MINUTES`]
    pub fn interval(&self) -> Result<std::time::Duration> {
        let minutes = self.announcer.interval_minutes;
        if minutes == 0 || minutes > MAX_INTERVAL_MINUTES {
            return Err(AnnouncerError::Config(format!(
                "interval_minutes must be between 1 and {}, got {}",
                MAX_INTERVAL_MINUTES, minutes
            ))
            .into());
        }
        Ok(std::time::Duration::from_secs(minutes * 60))
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        self.interval()?;

        if self.announcer.group.trim().is_empty() {
            return Err(AnnouncerError::Config("group cannot be empty".to_string()).into());
        }

        self.timezone()?;

        url::Url::parse(&self.meetup.api_base).map_err(|e| {
            AnnouncerError::Config(format!("Invalid meetup.api_base: {}", e))
        })?;

        url::Url::parse(&self.slack.api_base)
            .map_err(|e| AnnouncerError::Config(format!("Invalid slack.api_base: {}", e)))?;

        if let Some(url) = &self.redis.url {
            redis::Client::open(url.as_str())
                .map_err(|e| AnnouncerError::Config(format!("Invalid redis.url: {}", e)))?;
        }

        Ok(())
    }
}
