//! Server configuration from environment variables.
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `STORE_BACKEND` | `postgres` | `postgres` or `memory` |
//! | `DATABASE_URL` | required for postgres | connection string |
//! | `DB_MAX_CONNECTIONS` | 10 | pool size |
//! | `SEED_FILE` | none | JSON seed for the memory backend |
//! | `SOLR_URL` | none | Solr core URL; the store searches itself when unset |
//! | `SOLR_TIMEOUT_SECS` | 10 | Solr request timeout |
//! | `HOST` / `PORT` | `0.0.0.0` / 3000 | listen address |
//! | `ALLOWED_ORIGINS` | localhost | comma-separated CORS origins |
//! | `LOG_FORMAT` | `text` | `text` or `json` |
//! | `LOG_FILE` | none | enables daily rolling file output |
//! | `LOG_ANSI` | auto | force ANSI colors on or off |

use std::path::PathBuf;
use std::str::FromStr;

use thesaurus_core::defaults::{SEARCH_TIMEOUT_SECS, SERVER_HOST, SERVER_PORT};
use thesaurus_core::{Error, Result};
use thesaurus_db::pool::DEFAULT_MAX_CONNECTIONS;

/// Origins allowed when `ALLOWED_ORIGINS` is unset or empty.
pub const DEFAULT_ALLOWED_ORIGINS: &[&str] = &["http://localhost:3000"];

/// Where resources and tenants live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(Error::Config(format!("Unknown STORE_BACKEND: {}", other))),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub json: bool,
    pub file: Option<PathBuf>,
    pub ansi: Option<bool>,
}

/// Everything the server binary needs to start.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub backend: StoreBackend,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub seed_file: Option<PathBuf>,
    pub solr_url: Option<String>,
    pub solr_timeout_secs: u64,
    pub allowed_origins: Vec<String>,
    pub log: LogConfig,
}

fn parse_number<T: FromStr>(name: &str, value: Option<String>, default: T) -> Result<T> {
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("{} must be a number, got {:?}", name, raw))),
        None => Ok(default),
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim(), "true" | "1")
}

/// Comma-separated origins, falling back to [`DEFAULT_ALLOWED_ORIGINS`].
pub fn parse_allowed_origins(raw: Option<&str>) -> Vec<String> {
    let origins: Vec<String> = raw
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    if origins.is_empty() {
        DEFAULT_ALLOWED_ORIGINS.iter().map(|s| s.to_string()).collect()
    } else {
        origins
    }
}

impl ServerConfig {
    /// Read the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`, which returns a variable's value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let backend = var("STORE_BACKEND")
            .map(|v| v.parse())
            .transpose()?
            .unwrap_or(StoreBackend::Postgres);

        let database_url = var("DATABASE_URL");
        if backend == StoreBackend::Postgres && database_url.is_none() {
            return Err(Error::Config(
                "DATABASE_URL is required when STORE_BACKEND=postgres".to_string(),
            ));
        }

        Ok(Self {
            host: var("HOST").unwrap_or_else(|| SERVER_HOST.to_string()),
            port: parse_number("PORT", var("PORT"), SERVER_PORT)?,
            backend,
            database_url,
            db_max_connections: parse_number(
                "DB_MAX_CONNECTIONS",
                var("DB_MAX_CONNECTIONS"),
                DEFAULT_MAX_CONNECTIONS,
            )?,
            seed_file: var("SEED_FILE").map(PathBuf::from),
            solr_url: var("SOLR_URL"),
            solr_timeout_secs: parse_number(
                "SOLR_TIMEOUT_SECS",
                var("SOLR_TIMEOUT_SECS"),
                SEARCH_TIMEOUT_SECS,
            )?,
            allowed_origins: parse_allowed_origins(var("ALLOWED_ORIGINS").as_deref()),
            log: LogConfig {
                json: var("LOG_FORMAT").is_some_and(|v| v.trim() == "json"),
                file: var("LOG_FILE").map(PathBuf::from),
                ansi: var("LOG_ANSI").map(|v| parse_flag(&v)),
            },
        })
    }

    /// `host:port` to bind.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<ServerConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_memory_backend_defaults() {
        let config = config(&[("STORE_BACKEND", "memory")]).unwrap();
        assert_eq!(config.backend, StoreBackend::Memory);
        assert_eq!(config.port, 3000);
        assert_eq!(config.bind_address(), "0.0.0.0:3000");
        assert!(config.solr_url.is_none());
        assert!(!config.log.json);
    }

    #[test]
    fn test_postgres_requires_database_url() {
        let err = config(&[]).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let config = config(&[("DATABASE_URL", "postgres://localhost/thesaurus")]).unwrap();
        assert_eq!(config.backend, StoreBackend::Postgres);
    }

    #[test]
    fn test_malformed_port() {
        let err = config(&[("STORE_BACKEND", "memory"), ("PORT", "http")]).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_unknown_backend() {
        assert!(config(&[("STORE_BACKEND", "redis")]).is_err());
    }

    #[test]
    fn test_log_settings() {
        let config = config(&[
            ("STORE_BACKEND", "memory"),
            ("LOG_FORMAT", "json"),
            ("LOG_ANSI", "false"),
            ("LOG_FILE", "/var/log/thesaurus/api.log"),
        ])
        .unwrap();
        assert!(config.log.json);
        assert_eq!(config.log.ansi, Some(false));
        assert_eq!(
            config.log.file.as_deref(),
            Some(std::path::Path::new("/var/log/thesaurus/api.log"))
        );
    }

    #[test]
    fn test_allowed_origins() {
        assert_eq!(
            parse_allowed_origins(Some("https://a.example, https://b.example ,")),
            vec!["https://a.example", "https://b.example"]
        );
        assert_eq!(parse_allowed_origins(Some("  ")), DEFAULT_ALLOWED_ORIGINS);
        assert_eq!(parse_allowed_origins(None), DEFAULT_ALLOWED_ORIGINS);
    }
}
