//! Process configuration read from environment variables.
//!
//! | Variable                    | Default          |
//! |-----------------------------|------------------|
//! | `DATABASE_URL`              | required by the server binary |
//! | `LOG_LEVEL`                 | `info` (`debug`, `info`, `warn`, `error`) |
//! | `DEBUG`                     | `false`; `true` forces `debug` |
//! | `LOG_FORMAT`                | `text` (`text`, `json`) |
//! | `LISTEN_ADDR`               | `0.0.0.0:8080`   |
//! | `PROXMOX_CLI_PATH`          | `forge-ovh-cli`  |
//! | `PROVISIONING_PLUGIN`       | `proxmox`        |
//! | `PROVISIONING_TIMEOUT_SECS` | `30`             |
//! | `DATABASE_MAX_CONNECTIONS`  | `10`             |
//! | `DATABASE_MIN_IDLE`         | `2`              |

use crate::plugin::adapters::proxmox::{DEFAULT_CLI_PATH, PROXMOX_PLUGIN_NAME};
use crate::project::services::ProvisioningPolicy;
use serde::{Deserialize, Deserializer};
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable could not be decoded.
    #[error("failed to read configuration from the environment: {0}")]
    Env(#[from] envy::Error),

    /// `LOG_LEVEL` is not one of the accepted levels.
    #[error("invalid LOG_LEVEL: {0:?} is not valid; choose: debug, info, warn, error")]
    InvalidLogLevel(String),

    /// `LOG_FORMAT` is not one of the accepted formats.
    #[error("invalid LOG_FORMAT: {0:?} is not valid; choose: text, json")]
    InvalidLogFormat(String),

    /// `LISTEN_ADDR` is not a socket address.
    #[error("invalid LISTEN_ADDR: {0:?}")]
    InvalidListenAddr(String),

    /// `PROVISIONING_TIMEOUT_SECS` is zero.
    #[error("PROVISIONING_TIMEOUT_SECS must be greater than zero")]
    InvalidProvisioningTimeout,

    /// `DATABASE_MIN_IDLE` exceeds `DATABASE_MAX_CONNECTIONS`.
    #[error("DATABASE_MIN_IDLE ({min_idle}) exceeds DATABASE_MAX_CONNECTIONS ({max})")]
    InvalidPoolBounds {
        /// Configured idle floor.
        min_idle: u32,
        /// Configured pool ceiling.
        max: u32,
    },

    /// `DATABASE_URL` is unset or empty.
    #[error("DATABASE_URL environment variable is required")]
    MissingDatabaseUrl,
}

/// Minimum severity emitted by the logger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Verbose diagnostics.
    Debug,
    /// Normal operation.
    Info,
    /// Recoverable problems.
    Warn,
    /// Failures only.
    Error,
}

impl LogLevel {
    /// Returns the level as an `EnvFilter` directive.
    #[must_use]
    pub const fn as_directive(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    fn parse(raw: &str) -> Result<Self, ConfigError> {
        match raw {
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            other => Err(ConfigError::InvalidLogLevel(other.to_owned())),
        }
    }
}

/// Log line encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    Text,
    /// One JSON object per line.
    Json,
}

impl LogFormat {
    fn parse(raw: &str) -> Result<Self, ConfigError> {
        match raw {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::InvalidLogFormat(other.to_owned())),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    database_url: Option<String>,
    #[serde(default)]
    log_level: Option<String>,
    #[serde(default, deserialize_with = "true_flag")]
    debug: bool,
    #[serde(default)]
    log_format: Option<String>,
    #[serde(default = "default_listen_addr")]
    listen_addr: String,
    #[serde(default)]
    proxmox_cli_path: Option<String>,
    #[serde(default = "default_provisioning_plugin")]
    provisioning_plugin: String,
    #[serde(default = "default_provisioning_timeout_secs")]
    provisioning_timeout_secs: u64,
    #[serde(default = "default_max_connections")]
    database_max_connections: u32,
    #[serde(default = "default_min_idle")]
    database_min_idle: u32,
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_owned()
}

fn default_provisioning_plugin() -> String {
    PROXMOX_PLUGIN_NAME.to_owned()
}

const fn default_provisioning_timeout_secs() -> u64 {
    30
}

const fn default_max_connections() -> u32 {
    10
}

const fn default_min_idle() -> u32 {
    2
}

/// Only the literal `true` enables a flag; anything else leaves it off.
fn true_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(raw == "true")
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

/// Validated process configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    database_url: Option<String>,
    log_level: LogLevel,
    debug: bool,
    log_format: LogFormat,
    listen_addr: SocketAddr,
    proxmox_cli_path: String,
    provisioning_plugin: String,
    provisioning_timeout: Duration,
    database_max_connections: u32,
    database_min_idle: u32,
}

impl AppConfig {
    /// Reads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable is malformed or out of range.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::try_from(envy::from_env::<RawConfig>()?)
    }

    /// Reads configuration from explicit key/value pairs.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable is malformed or out of range.
    pub fn from_pairs<I>(pairs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Self::try_from(envy::from_iter::<_, RawConfig>(pairs)?)
    }

    /// Returns the database connection URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingDatabaseUrl`] when it is unset.
    pub fn database_url(&self) -> Result<&str, ConfigError> {
        self.database_url
            .as_deref()
            .ok_or(ConfigError::MissingDatabaseUrl)
    }

    /// Returns the configured level, raised to `debug` when `DEBUG=true`.
    #[must_use]
    pub const fn effective_log_level(&self) -> LogLevel {
        if self.debug {
            LogLevel::Debug
        } else {
            self.log_level
        }
    }

    /// Returns the log encoding.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Returns the HTTP listen address.
    #[must_use]
    pub const fn listen_addr(&self) -> SocketAddr {
        self.listen_addr
    }

    /// Returns the `forge-ovh-cli` executable path.
    #[must_use]
    pub fn proxmox_cli_path(&self) -> &str {
        &self.proxmox_cli_path
    }

    /// Returns the provisioning policy for new projects.
    #[must_use]
    pub fn provisioning_policy(&self) -> ProvisioningPolicy {
        ProvisioningPolicy::new(self.provisioning_plugin.clone(), self.provisioning_timeout)
    }

    /// Returns the connection pool ceiling.
    #[must_use]
    pub const fn database_max_connections(&self) -> u32 {
        self.database_max_connections
    }

    /// Returns the number of idle connections the pool keeps open.
    #[must_use]
    pub const fn database_min_idle(&self) -> u32 {
        self.database_min_idle
    }
}

impl TryFrom<RawConfig> for AppConfig {
    type Error = ConfigError;

    fn try_from(raw: RawConfig) -> Result<Self, Self::Error> {
        let log_level = non_blank(raw.log_level)
            .as_deref()
            .map_or(Ok(LogLevel::Info), LogLevel::parse)?;
        let log_format = non_blank(raw.log_format)
            .as_deref()
            .map_or(Ok(LogFormat::Text), LogFormat::parse)?;
        let listen_addr = raw
            .listen_addr
            .parse()
            .map_err(|_| ConfigError::InvalidListenAddr(raw.listen_addr.clone()))?;
        if raw.provisioning_timeout_secs == 0 {
            return Err(ConfigError::InvalidProvisioningTimeout);
        }
        if raw.database_min_idle > raw.database_max_connections {
            return Err(ConfigError::InvalidPoolBounds {
                min_idle: raw.database_min_idle,
                max: raw.database_max_connections,
            });
        }

        Ok(Self {
            database_url: non_blank(raw.database_url),
            log_level,
            debug: raw.debug,
            log_format,
            listen_addr,
            proxmox_cli_path: non_blank(raw.proxmox_cli_path)
                .unwrap_or_else(|| DEFAULT_CLI_PATH.to_owned()),
            provisioning_plugin: raw.provisioning_plugin,
            provisioning_timeout: Duration::from_secs(raw.provisioning_timeout_secs),
            database_max_connections: raw.database_max_connections,
            database_min_idle: raw.database_min_idle,
        })
    }
}
