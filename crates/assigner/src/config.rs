use std::{env, time::Duration};

use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_PORT: &str = "8080";
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_OPERATION_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct AssignerConfig {
    pub database_url: SecretString,
    pub listen_addr: String,
    pub max_connections: u32,
    /// Wait before the first connection attempt, for databases that start
    /// alongside the service.
    pub startup_delay: Duration,
    /// Deadline handed to every lifecycle operation. `None` disables it.
    pub operation_timeout: Option<Duration>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable `{0}` is not set")]
    MissingVar(&'static str),
    #[error("invalid value for environment variable `{0}`")]
    InvalidVar(&'static str),
}

impl AssignerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());

        let database_url = get("SERVER_DATABASE_URL")
            .or_else(|| get("DATABASE_URL"))
            .ok_or(ConfigError::MissingVar("DATABASE_URL"))?;

        let listen_addr = match get("SERVER_LISTEN_ADDR") {
            Some(addr) => addr,
            None => {
                let port = get("PORT").unwrap_or_else(|| DEFAULT_PORT.to_string());
                port.parse::<u16>()
                    .map_err(|_| ConfigError::InvalidVar("PORT"))?;
                format!("0.0.0.0:{port}")
            }
        };

        let max_connections = parse_or(
            get("DATABASE_MAX_CONNECTIONS"),
            "DATABASE_MAX_CONNECTIONS",
            DEFAULT_MAX_CONNECTIONS,
        )?;
        if max_connections == 0 {
            return Err(ConfigError::InvalidVar("DATABASE_MAX_CONNECTIONS"));
        }

        let startup_delay = Duration::from_secs(parse_or(
            get("STARTUP_DELAY_SECS"),
            "STARTUP_DELAY_SECS",
            0,
        )?);

        let operation_timeout = match parse_or(
            get("OPERATION_TIMEOUT_SECS"),
            "OPERATION_TIMEOUT_SECS",
            DEFAULT_OPERATION_TIMEOUT_SECS,
        )? {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        tracing::info!(
            listen_addr = %listen_addr,
            max_connections,
            startup_delay_secs = startup_delay.as_secs(),
            operation_timeout = ?operation_timeout,
            "config loaded"
        );

        Ok(Self {
            database_url: SecretString::new(database_url.into()),
            listen_addr,
            max_connections,
            startup_delay,
            operation_timeout,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    value: Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidVar(key)),
        None => Ok(default),
    }
}
