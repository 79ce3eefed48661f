use std::str::FromStr;

use bookshelf_core::admin::{clamp_page_size, DEFAULT_PAGE_SIZE};

/// Error raised when an environment variable holds an unusable value.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be {expected}, got {value:?}")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable, multi-field lines (default).
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Postgres connection string. When unset the server keeps books in
    /// memory.
    pub database_url: Option<String>,
    /// Connection pool size (default: `10`).
    pub db_max_connections: u32,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long to wait for the pool to close on shutdown (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Rows per admin change-list page (default: `100`).
    pub admin_page_size: i64,
    /// Log output format (default: pretty).
    pub log_format: LogFormat,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            database_url: None,
            db_max_connections: 10,
            request_timeout_secs: 30,
            shutdown_timeout_secs: 30,
            admin_page_size: DEFAULT_PAGE_SIZE,
            log_format: LogFormat::Pretty,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default     |
    /// |-------------------------|-------------|
    /// | `HOST`                  | `0.0.0.0`   |
    /// | `PORT`                  | `3000`      |
    /// | `DATABASE_URL`          | (memory)    |
    /// | `DB_MAX_CONNECTIONS`    | `10`        |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`        |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `30`        |
    /// | `ADMIN_PAGE_SIZE`       | `100`       |
    /// | `LOG_FORMAT`            | `pretty`    |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`ServerConfig::from_env`] but reads values through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let log_format = match var("LOG_FORMAT").as_deref().map(str::trim) {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "LOG_FORMAT",
                    expected: "`pretty` or `json`",
                    value: other.to_string(),
                })
            }
        };

        let admin_page_size: i64 = parse_var(
            var("ADMIN_PAGE_SIZE"),
            "ADMIN_PAGE_SIZE",
            "an integer",
            defaults.admin_page_size,
        )?;

        Ok(Self {
            host: var("HOST").unwrap_or(defaults.host),
            port: parse_var(var("PORT"), "PORT", "a valid u16", defaults.port)?,
            database_url: var("DATABASE_URL"),
            db_max_connections: parse_var(
                var("DB_MAX_CONNECTIONS"),
                "DB_MAX_CONNECTIONS",
                "a valid u32",
                defaults.db_max_connections,
            )?,
            request_timeout_secs: parse_var(
                var("REQUEST_TIMEOUT_SECS"),
                "REQUEST_TIMEOUT_SECS",
                "a valid u64",
                defaults.request_timeout_secs,
            )?,
            shutdown_timeout_secs: parse_var(
                var("SHUTDOWN_TIMEOUT_SECS"),
                "SHUTDOWN_TIMEOUT_SECS",
                "a valid u64",
                defaults.shutdown_timeout_secs,
            )?,
            admin_page_size: clamp_page_size(Some(admin_page_size)),
            log_format,
        })
    }
}

fn parse_var<T: FromStr>(
    raw: Option<String>,
    name: &'static str,
    expected: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            name,
            expected,
            value,
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn defaults_when_nothing_set() {
        let config = load(&[]).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert!(config.database_url.is_none());
        assert_eq!(config.admin_page_size, 100);
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn overrides_are_parsed() {
        let config = load(&[
            ("PORT", "8080"),
            ("DATABASE_URL", "postgres://localhost/books"),
            ("REQUEST_TIMEOUT_SECS", "5"),
            ("LOG_FORMAT", "json"),
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://localhost/books")
        );
        assert_eq!(config.request_timeout_secs, 5);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = load(&[("DATABASE_URL", "  "), ("PORT", "")]).unwrap();
        assert!(config.database_url.is_none());
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn invalid_port_is_an_error() {
        let err = load(&[("PORT", "eighty")]).unwrap_err();
        assert_matches!(err, ConfigError::Invalid { name: "PORT", .. });
    }

    #[test]
    fn invalid_log_format_is_an_error() {
        assert_matches!(
            load(&[("LOG_FORMAT", "xml")]),
            Err(ConfigError::Invalid { name: "LOG_FORMAT", .. })
        );
    }

    #[test]
    fn admin_page_size_is_clamped() {
        assert_eq!(load(&[("ADMIN_PAGE_SIZE", "0")]).unwrap().admin_page_size, 1);
        assert_eq!(
            load(&[("ADMIN_PAGE_SIZE", "100000")]).unwrap().admin_page_size,
            500
        );
    }
}
