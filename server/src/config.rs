//! Process configuration, read from the environment once at startup.
//!
//! A `.env` file in the working directory is loaded first when present. Postgres settings are
//! only read (and only required) when `STORAGE_BACKEND=postgres`.

use std::{path::PathBuf, str::FromStr, time::Duration};

use boxoffice_storage_postgres::PostgresConfig;
use serde::Deserialize;
use thiserror::Error;
use tracing::Level;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(String),
    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
    #[error("environment error: {0}")]
    Env(envy::Error),
}

impl ConfigError {
    fn from_envy(prefix: &str, err: envy::Error) -> Self {
        match err {
            envy::Error::MissingValue(field) => ConfigError::Missing(format!("{prefix}{}", field.to_uppercase())),
            other => ConfigError::Env(other),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Sled,
    Postgres,
}

#[derive(Debug, Clone)]
pub enum StorageConfig {
    /// `None` means the default `~/.boxoffice` folder.
    Sled { path: Option<PathBuf> },
    Postgres(PostgresConfig),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: String,
    pub log_level: Level,
    pub operation_timeout: Option<Duration>,
    pub storage: StorageConfig,
}

#[derive(Debug, Deserialize)]
struct ProcessEnv {
    #[serde(default = "default_bind_address")]
    bind_address: String,
    #[serde(default = "default_log_level")]
    log_level: String,
    operation_timeout_ms: Option<u64>,
    #[serde(default)]
    storage_backend: StorageBackend,
    sled_path: Option<PathBuf>,
}

/// `PG_*` variables.
#[derive(Debug, Deserialize)]
struct PostgresEnv {
    host: String,
    username: String,
    password: String,
    dbname: String,
    #[serde(default = "default_max_connections")]
    max_connections: u32,
}

fn default_bind_address() -> String { "0.0.0.0:3000".to_string() }

fn default_log_level() -> String { "INFO".to_string() }

fn default_max_connections() -> u32 { 10 }

const POSTGRES_PREFIX: &str = "PG_";

impl Config {
    /// Load `.env` (if any) and read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        // a missing .env file is normal
        let _ = dotenvy::dotenv();
        Self::from_vars(std::env::vars())
    }

    pub fn from_vars(vars: impl IntoIterator<Item = (String, String)>) -> Result<Self, ConfigError> {
        let vars: Vec<(String, String)> = vars.into_iter().collect();
        let env: ProcessEnv = envy::from_iter(vars.iter().cloned()).map_err(|err| ConfigError::from_envy("", err))?;

        let log_level = Level::from_str(&env.log_level).map_err(|_| ConfigError::Invalid { var: "LOG_LEVEL", value: env.log_level.clone() })?;

        let storage = match env.storage_backend {
            StorageBackend::Sled => StorageConfig::Sled { path: env.sled_path },
            StorageBackend::Postgres => {
                let pg: PostgresEnv =
                    envy::prefixed(POSTGRES_PREFIX).from_iter(vars).map_err(|err| ConfigError::from_envy(POSTGRES_PREFIX, err))?;
                StorageConfig::Postgres(pg.into_postgres_config()?)
            }
        };

        Ok(Config {
            bind_address: env.bind_address,
            log_level,
            operation_timeout: env.operation_timeout_ms.map(Duration::from_millis),
            storage,
        })
    }
}

impl PostgresEnv {
    fn into_postgres_config(self) -> Result<PostgresConfig, ConfigError> {
        let (host, port) = split_host_port(&self.host)?;

        Ok(PostgresConfig {
            host,
            port: port.unwrap_or(DEFAULT_POSTGRES_PORT),
            username: self.username,
            password: self.password,
            dbname: self.dbname,
            max_connections: self.max_connections,
        })
    }
}

const DEFAULT_POSTGRES_PORT: u16 = 5432;

/// Split `PG_HOST` into host and optional port. Accepts `host`, `host:port`, a bare IPv6 address,
/// and `[ipv6]:port`.
fn split_host_port(raw: &str) -> Result<(String, Option<u16>), ConfigError> {
    let invalid = || ConfigError::Invalid { var: "PG_HOST", value: raw.to_string() };
    let parse_port = |port: &str| port.parse::<u16>().map_err(|_| invalid());

    if let Some(bracketed) = raw.strip_prefix('[') {
        let (addr, rest) = bracketed.split_once(']').ok_or_else(invalid)?;
        return match rest {
            "" => Ok((addr.to_string(), None)),
            _ => Ok((addr.to_string(), Some(parse_port(rest.strip_prefix(':').ok_or_else(invalid)?)?))),
        };
    }

    match raw.split_once(':') {
        // more than one colon is an unbracketed IPv6 address, which cannot carry a port
        Some((host, port)) if !port.contains(':') => Ok((host.to_string(), Some(parse_port(port)?))),
        _ => Ok((raw.to_string(), None)),
    }
}
