use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use thiserror::Error;

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::{apply_security_headers, SecurityHeaders};

const DEFAULT_DATABASE_URL: &str = "postgres://localhost/quickpass";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3001;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000,http://localhost:5173";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown storage backend: {0}")]
pub struct UnknownStorageBackend(pub String);

impl FromStr for StorageBackend {
    type Err = UnknownStorageBackend;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            _ => Err(UnknownStorageBackend(s.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub storage: StorageBackend,
    pub bind_addr: SocketAddr,
    pub max_connections: u32,
    pub allowed_origins: String,
    pub production: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from any variable source; unset variables
    /// fall back to their defaults, malformed ones are rejected.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host: IpAddr = parse_or(&lookup, "HOST", DEFAULT_HOST.parse().ok())?;
        let port: u16 = parse_or(&lookup, "PORT", Some(DEFAULT_PORT))?;
        let storage = parse_or(&lookup, "STORAGE_BACKEND", Some(StorageBackend::Postgres))?;
        let max_connections =
            parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", Some(DEFAULT_MAX_CONNECTIONS))?;

        Ok(Self {
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            storage,
            bind_addr: SocketAddr::new(host, port),
            max_connections,
            allowed_origins: lookup("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|| DEFAULT_ALLOWED_ORIGINS.to_string()),
            production: lookup("RUST_ENV")
                .map(|v| v.eq_ignore_ascii_case("production"))
                .unwrap_or(false),
        })
    }
}

fn parse_or<T, F>(lookup: &F, name: &'static str, default: Option<T>) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value: raw }),
        None => default.ok_or(ConfigError::InvalidValue {
            name,
            value: String::new(),
        }),
    }
}
