use std::str::FromStr;

use tastyroot_core::DatabaseConfig;
use thiserror::Error;

use crate::registrar::DEFAULT_MAX_BODY_BYTES;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_DATABASE_ADDR: &str = "127.0.0.1:27017";
const DEFAULT_DATABASE: &str = "godb";
const DEFAULT_COLLECTION: &str = "cats";
const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be {expected}, got {value:?}")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_body_bytes: usize,
    pub database: DatabaseConfig,
}

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// - `TASTYROOT_HOST` (default `127.0.0.1`), `PORT` (default 8000)
    /// - `TASTYROOT_MAX_BODY_BYTES` (default 1 MiB)
    /// - `TASTYROOT_DATABASE_ADDR`, `TASTYROOT_DATABASE`,
    ///   `TASTYROOT_COLLECTION`, `TASTYROOT_PAGE_SIZE` (default 10)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let string = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        let port = parse(&lookup, "PORT", "a port number", DEFAULT_PORT)?;
        let max_body_bytes = parse(
            &lookup,
            "TASTYROOT_MAX_BODY_BYTES",
            "a byte count",
            DEFAULT_MAX_BODY_BYTES,
        )?;
        let page_size: usize = parse(
            &lookup,
            "TASTYROOT_PAGE_SIZE",
            "a positive integer",
            DEFAULT_PAGE_SIZE,
        )?;
        if page_size == 0 {
            return Err(ConfigError::Invalid {
                name: "TASTYROOT_PAGE_SIZE",
                expected: "a positive integer",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            host: string("TASTYROOT_HOST", DEFAULT_HOST),
            port,
            max_body_bytes,
            database: DatabaseConfig::new(
                string("TASTYROOT_DATABASE_ADDR", DEFAULT_DATABASE_ADDR),
                string("TASTYROOT_DATABASE", DEFAULT_DATABASE),
                string("TASTYROOT_COLLECTION", DEFAULT_COLLECTION),
                page_size,
            ),
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    expected: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            name,
            expected,
            value,
        }),
        None => Ok(default),
    }
}
