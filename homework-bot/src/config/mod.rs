//! Startup configuration.
//!
//! Values come from command-line flags, then the process environment, then a
//! `.env` file (loaded by `main` before parsing). They are read once and never
//! change afterwards.
//!
//! The three credentials are optional at the flag level on purpose: a missing
//! credential must reach [`Cli::resolve`] so the bot can log it and attempt a
//! last notification instead of dying inside argument parsing.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use url::Url;

use crate::notifier::TelegramConfig;
use crate::{Error, Result};

pub const DEFAULT_ENDPOINT: &str = "https://practicum.yandex.ru/api/user_api/homework_statuses/";
pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 600;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 20;
pub const DEFAULT_LOG_DIR: &str = "logs";
pub const DEFAULT_LOG_MAX_FILES: usize = 5;
pub const DEFAULT_LOG_MAX_BYTES: u64 = 50_000_000;

pub const PRACTICUM_TOKEN: &str = "PRACTICUM_TOKEN";
pub const TELEGRAM_TOKEN: &str = "TELEGRAM_TOKEN";
pub const TELEGRAM_CHAT_ID: &str = "TELEGRAM_CHAT_ID";

/// Command-line interface.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "homework-bot",
    version,
    about = "Polls the homework status API and forwards status changes to Telegram"
)]
pub struct Cli {
    /// Status API OAuth token.
    #[arg(long, env = "PRACTICUM_TOKEN", hide_env_values = true)]
    pub practicum_token: Option<String>,

    /// Telegram bot token.
    #[arg(long, env = "TELEGRAM_TOKEN", hide_env_values = true)]
    pub telegram_token: Option<String>,

    /// Telegram chat that receives notifications.
    #[arg(long, env = "TELEGRAM_CHAT_ID")]
    pub telegram_chat_id: Option<String>,

    /// Status API endpoint.
    #[arg(long, env = "HOMEWORK_API_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Telegram Bot API base URL.
    #[arg(long, env = "TELEGRAM_API_BASE", default_value = DEFAULT_TELEGRAM_API_BASE)]
    pub telegram_api_base: String,

    /// Seconds to sleep between poll cycles.
    #[arg(long, env = "POLL_INTERVAL_SECS", default_value_t = DEFAULT_POLL_INTERVAL_SECS)]
    pub poll_interval_secs: u64,

    /// Timeout in seconds for every outgoing HTTP request.
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub request_timeout_secs: u64,

    /// Directory for log files.
    #[arg(long, env = "LOG_DIR", default_value = DEFAULT_LOG_DIR)]
    pub log_dir: PathBuf,

    /// Number of rotated log files to keep.
    #[arg(long, env = "LOG_MAX_FILES", default_value_t = DEFAULT_LOG_MAX_FILES)]
    pub log_max_files: usize,

    /// Size in bytes at which the log file is rotated.
    #[arg(long, env = "LOG_MAX_BYTES", default_value_t = DEFAULT_LOG_MAX_BYTES)]
    pub log_max_bytes: u64,

    /// Also report transient failures to the chat (each distinct failure once).
    #[arg(long, env = "NOTIFY_ON_ERRORS")]
    pub notify_on_errors: bool,
}

/// Log sink settings. Available before the rest of the config is validated so
/// configuration errors themselves can be logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub dir: PathBuf,
    pub max_files: usize,
    pub max_bytes: u64,
}

/// Fully validated, immutable configuration.
#[derive(Clone)]
pub struct BotConfig {
    pub practicum_token: String,
    pub endpoint: Url,
    pub telegram: TelegramConfig,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
    pub log: LogConfig,
    pub notify_on_errors: bool,
}

impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("practicum_token", &"<redacted>")
            .field("endpoint", &self.endpoint.as_str())
            .field("telegram_api_base", &self.telegram.api_base)
            .field("telegram_chat_id", &self.telegram.chat_id)
            .field("poll_interval", &self.poll_interval)
            .field("request_timeout", &self.request_timeout)
            .field("log", &self.log)
            .field("notify_on_errors", &self.notify_on_errors)
            .finish()
    }
}

/// Treat blank values the same as absent ones.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl Cli {
    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            dir: self.log_dir.clone(),
            max_files: self.log_max_files.max(1),
            max_bytes: self.log_max_bytes.max(1),
        }
    }

    /// Telegram settings, if both the token and the chat are known.
    ///
    /// Used to send a last message when the rest of the configuration is
    /// unusable.
    pub fn telegram_config(&self) -> Option<TelegramConfig> {
        let bot_token = present(&self.telegram_token)?;
        let chat_id = present(&self.telegram_chat_id)?;
        Some(TelegramConfig {
            api_base: self.telegram_api_base.trim_end_matches('/').to_string(),
            bot_token: bot_token.to_string(),
            chat_id: chat_id.to_string(),
        })
    }

    /// Validate and freeze the configuration.
    ///
    /// All missing credentials are reported together.
    pub fn resolve(&self) -> Result<BotConfig> {
        let names: Vec<&'static str> = [
            (PRACTICUM_TOKEN, &self.practicum_token),
            (TELEGRAM_TOKEN, &self.telegram_token),
            (TELEGRAM_CHAT_ID, &self.telegram_chat_id),
        ]
        .into_iter()
        .filter(|(_, value)| present(value).is_none())
        .map(|(name, _)| name)
        .collect();

        if !names.is_empty() {
            return Err(Error::ConfigMissing { names });
        }

        let (Some(practicum_token), Some(telegram)) =
            (present(&self.practicum_token), self.telegram_config())
        else {
            return Err(Error::config("credentials disappeared during validation"));
        };

        let endpoint = Url::parse(self.endpoint.trim())
            .map_err(|e| Error::config(format!("invalid endpoint `{}`: {}", self.endpoint, e)))?;
        Url::parse(&telegram.api_base).map_err(|e| {
            Error::config(format!(
                "invalid Telegram API base `{}`: {}",
                telegram.api_base, e
            ))
        })?;

        if self.poll_interval_secs == 0 {
            return Err(Error::config("poll interval must be greater than zero"));
        }
        if self.request_timeout_secs == 0 {
            return Err(Error::config("request timeout must be greater than zero"));
        }

        Ok(BotConfig {
            practicum_token: practicum_token.to_string(),
            endpoint,
            telegram,
            poll_interval: Duration::from_secs(self.poll_interval_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            log: self.log_config(),
            notify_on_errors: self.notify_on_errors,
        })
    }
}
