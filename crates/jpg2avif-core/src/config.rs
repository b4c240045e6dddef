//! Configuration module
//!
//! Settings are read from the environment (after loading an optional `.env` file) and
//! validated once at startup. Missing values fall back to the defaults below.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

// Common constants
const SERVER_PORT: u16 = 8000;
const SERVICE_NAME: &str = "jpg2avif";
const MAX_UPLOAD_SIZE_MB: usize = 50;
const REQUEST_TIMEOUT_SECS: u64 = 300;
const HEALTH_MEMORY_WARN_PERCENT: f64 = 80.0;

const AVIFENC_PATH: &str = "avifenc";
const MIN_QUANTIZER: u8 = 0;
const MAX_QUANTIZER: u8 = 18;
const ENCODER_SPEED: u8 = 10;
const ENCODER_JOBS: u16 = 4;
const ENCODER_TIMEOUT_SECS: u64 = 120;

const NOTIFICATION_BASE_URL: &str = "http://localhost:3000";
const NOTIFICATION_TIMEOUT_SECS: u64 = 10;

/// Highest quantizer value accepted by libavif.
pub const QUANTIZER_LIMIT: u8 = 63;
/// Slowest (0) to fastest (10) encoder speed.
pub const SPEED_LIMIT: u8 = 10;

/// Console log output format
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "compact" | "text" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            other => Err(anyhow::anyhow!(
                "LOG_FORMAT must be 'compact' or 'json', got '{}'",
                other
            )),
        }
    }
}

/// HTTP server settings
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub port: u16,
    pub environment: String,
    pub service_name: String,
    pub max_upload_size_bytes: usize,
    pub request_timeout_secs: u64,
    pub health_memory_warn_percent: f64,
    pub log_format: LogFormat,
}

/// Encoder invocation policy: `--min/--max` quantizers, `--speed`, `--jobs`, plus the
/// deadline after which the child process is killed.
#[derive(Clone, Debug)]
pub struct EncoderConfig {
    pub binary_path: String,
    pub min_quantizer: u8,
    pub max_quantizer: u8,
    pub speed: u8,
    pub jobs: u16,
    pub timeout_secs: u64,
    /// Parent directory for per-request workspaces. `None` uses the system temp dir.
    pub workspace_dir: Option<PathBuf>,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            binary_path: AVIFENC_PATH.to_string(),
            min_quantizer: MIN_QUANTIZER,
            max_quantizer: MAX_QUANTIZER,
            speed: ENCODER_SPEED,
            jobs: ENCODER_JOBS,
            timeout_secs: ENCODER_TIMEOUT_SECS,
            workspace_dir: None,
        }
    }
}

impl EncoderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.binary_path.trim().is_empty() {
            return Err(anyhow::anyhow!("AVIFENC_PATH must not be empty"));
        }

        if self.min_quantizer > QUANTIZER_LIMIT || self.max_quantizer > QUANTIZER_LIMIT {
            return Err(anyhow::anyhow!(
                "AVIF quantizers must be between 0 and {}",
                QUANTIZER_LIMIT
            ));
        }

        if self.min_quantizer > self.max_quantizer {
            return Err(anyhow::anyhow!(
                "AVIF_MIN_QUANTIZER ({}) must not exceed AVIF_MAX_QUANTIZER ({})",
                self.min_quantizer,
                self.max_quantizer
            ));
        }

        if self.speed > SPEED_LIMIT {
            return Err(anyhow::anyhow!(
                "AVIF_SPEED must be between 0 and {}",
                SPEED_LIMIT
            ));
        }

        if self.jobs == 0 {
            return Err(anyhow::anyhow!("AVIF_JOBS must be at least 1"));
        }

        if self.timeout_secs == 0 {
            return Err(anyhow::anyhow!("ENCODER_TIMEOUT_SECS must be greater than 0"));
        }

        Ok(())
    }
}

/// Outbound conversion-complete callback settings
#[derive(Clone, Debug)]
pub struct NotificationConfig {
    pub enabled: bool,
    pub base_url: String,
    pub timeout_secs: u64,
    pub bucket_name: Option<String>,
    pub folder_path: Option<String>,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: NOTIFICATION_BASE_URL.to_string(),
            timeout_secs: NOTIFICATION_TIMEOUT_SECS,
            bucket_name: None,
            folder_path: None,
        }
    }
}

impl NotificationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Full callback URL (`<base>/conversion-complete`).
    pub fn endpoint(&self) -> String {
        format!(
            "{}/conversion-complete",
            self.base_url.trim_end_matches('/')
        )
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.enabled {
            return Ok(());
        }

        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(anyhow::anyhow!(
                "NOTIFICATION_BASE_URL must start with http:// or https://"
            ));
        }

        if self.timeout_secs == 0 {
            return Err(anyhow::anyhow!(
                "NOTIFICATION_TIMEOUT_SECS must be greater than 0"
            ));
        }

        Ok(())
    }
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub encoder: EncoderConfig,
    pub notification: NotificationConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let max_upload_size_mb = env::var("MAX_UPLOAD_SIZE_MB")
            .unwrap_or_else(|_| MAX_UPLOAD_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_UPLOAD_SIZE_MB);

        let server = ServerConfig {
            port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            environment,
            service_name: env::var("SERVICE_NAME").unwrap_or_else(|_| SERVICE_NAME.to_string()),
            max_upload_size_bytes: max_upload_size_mb * 1024 * 1024,
            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| REQUEST_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(REQUEST_TIMEOUT_SECS),
            health_memory_warn_percent: env::var("HEALTH_MEMORY_WARN_PERCENT")
                .unwrap_or_else(|_| HEALTH_MEMORY_WARN_PERCENT.to_string())
                .parse()
                .unwrap_or(HEALTH_MEMORY_WARN_PERCENT),
            log_format: env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "compact".to_string())
                .parse()?,
        };

        // Encoder policy values are parsed strictly; invalid values abort startup.
        let encoder = EncoderConfig {
            binary_path: env::var("AVIFENC_PATH").unwrap_or_else(|_| AVIFENC_PATH.to_string()),
            min_quantizer: parse_env("AVIF_MIN_QUANTIZER", MIN_QUANTIZER)?,
            max_quantizer: parse_env("AVIF_MAX_QUANTIZER", MAX_QUANTIZER)?,
            speed: parse_env("AVIF_SPEED", ENCODER_SPEED)?,
            jobs: parse_env("AVIF_JOBS", ENCODER_JOBS)?,
            timeout_secs: parse_env("ENCODER_TIMEOUT_SECS", ENCODER_TIMEOUT_SECS)?,
            workspace_dir: env::var("WORKSPACE_DIR")
                .ok()
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),
        };

        let notification = NotificationConfig {
            enabled: parse_env_flag("NOTIFICATION_ENABLED", true)?,
            base_url: env::var("NOTIFICATION_BASE_URL")
                .unwrap_or_else(|_| NOTIFICATION_BASE_URL.to_string()),
            timeout_secs: env::var("NOTIFICATION_TIMEOUT_SECS")
                .unwrap_or_else(|_| NOTIFICATION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(NOTIFICATION_TIMEOUT_SECS),
            bucket_name: env::var("NOTIFICATION_BUCKET_NAME")
                .ok()
                .filter(|s| !s.is_empty()),
            folder_path: env::var("NOTIFICATION_FOLDER_PATH")
                .ok()
                .filter(|s| !s.is_empty()),
        };

        let config = Config {
            server,
            encoder,
            notification,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.server.max_upload_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_UPLOAD_SIZE_MB must be greater than 0"));
        }

        if self.server.request_timeout_secs <= self.encoder.timeout_secs {
            return Err(anyhow::anyhow!(
                "REQUEST_TIMEOUT_SECS ({}) must exceed ENCODER_TIMEOUT_SECS ({})",
                self.server.request_timeout_secs,
                self.encoder.timeout_secs
            ));
        }

        self.encoder.validate()?;
        self.notification.validate()?;

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                port: SERVER_PORT,
                environment: "development".to_string(),
                service_name: SERVICE_NAME.to_string(),
                max_upload_size_bytes: MAX_UPLOAD_SIZE_MB * 1024 * 1024,
                request_timeout_secs: REQUEST_TIMEOUT_SECS,
                health_memory_warn_percent: HEALTH_MEMORY_WARN_PERCENT,
                log_format: LogFormat::Compact,
            },
            encoder: EncoderConfig::default(),
            notification: NotificationConfig::default(),
        }
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T, anyhow::Error>
where
    T: FromStr,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{} must be a valid number, got '{}'", key, raw)),
        Err(_) => Ok(default),
    }
}

fn parse_env_flag(key: &str, default: bool) -> Result<bool, anyhow::Error> {
    match env::var(key) {
        Ok(raw) => parse_flag(&raw)
            .ok_or_else(|| anyhow::anyhow!("{} must be true or false, got '{}'", key, raw)),
        Err(_) => Ok(default),
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
