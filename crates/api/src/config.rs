use axum::http::HeaderValue;
use gymdesk_core::error::CoreError;
use gymdesk_core::generation::{GenerationOptions, RangeMode};

use crate::auth::jwt::JwtConfig;

/// A configuration value was missing or malformed.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} has invalid value '{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Where schedules and sessions are persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// PostgreSQL at the given `DATABASE_URL`.
    Postgres { database_url: String },
    /// Process-local, lost on restart.
    Memory,
}

/// Log output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret (and the database URL for the postgres
/// backend) have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<HeaderValue>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    pub storage: StorageBackend,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
    /// Defaults applied to every generation request.
    pub generation: GenerationOptions,
    pub log_format: LogFormat,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default                    |
    /// |----------------------------|----------------------------|
    /// | `HOST`                     | `0.0.0.0`                  |
    /// | `PORT`                     | `3000`                     |
    /// | `CORS_ORIGINS`             | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`     | `30`                       |
    /// | `STORAGE_BACKEND`          | `postgres` (or `memory`)   |
    /// | `DATABASE_URL`             | required for `postgres`    |
    /// | `JWT_SECRET`               | required                   |
    /// | `JWT_ACCESS_EXPIRY_MINS`   | `15`                       |
    /// | `GENERATION_RANGE_MODE`    | `legacy` (or `calendar`)   |
    /// | `GENERATION_SKIP_EXISTING` | `false`                    |
    /// | `LOG_FORMAT`               | `pretty` (or `json`)       |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &'static str, default: &str| -> String {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let host = var("HOST", "0.0.0.0");
        let port: u16 = parse_var("PORT", var("PORT", "3000"))?;
        let request_timeout_secs: u64 =
            parse_var("REQUEST_TIMEOUT_SECS", var("REQUEST_TIMEOUT_SECS", "30"))?;

        let cors_origins = var("CORS_ORIGINS", "http://localhost:5173")
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|origin| {
                origin.parse::<HeaderValue>().map_err(|e| ConfigError::Invalid {
                    var: "CORS_ORIGINS",
                    value: origin.to_string(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let storage = match var("STORAGE_BACKEND", "postgres").to_ascii_lowercase().as_str() {
            "postgres" => StorageBackend::Postgres {
                database_url: lookup("DATABASE_URL")
                    .filter(|v| !v.is_empty())
                    .ok_or(ConfigError::Missing("DATABASE_URL"))?,
            },
            "memory" => StorageBackend::Memory,
            other => {
                return Err(ConfigError::Invalid {
                    var: "STORAGE_BACKEND",
                    value: other.to_string(),
                    reason: "expected 'postgres' or 'memory'".into(),
                })
            }
        };

        let jwt = JwtConfig {
            secret: lookup("JWT_SECRET")
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing("JWT_SECRET"))?,
            access_token_expiry_mins: parse_var(
                "JWT_ACCESS_EXPIRY_MINS",
                var("JWT_ACCESS_EXPIRY_MINS", "15"),
            )?,
        };

        let range_value = var("GENERATION_RANGE_MODE", "legacy");
        let range_mode: RangeMode = range_value.parse().map_err(|e: CoreError| {
            ConfigError::Invalid {
                var: "GENERATION_RANGE_MODE",
                value: range_value.clone(),
                reason: e.to_string(),
            }
        })?;
        let skip_existing: bool = parse_var(
            "GENERATION_SKIP_EXISTING",
            var("GENERATION_SKIP_EXISTING", "false").to_ascii_lowercase(),
        )?;

        let log_format = match var("LOG_FORMAT", "pretty").to_ascii_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            "json" => LogFormat::Json,
            other => {
                return Err(ConfigError::Invalid {
                    var: "LOG_FORMAT",
                    value: other.to_string(),
                    reason: "expected 'pretty' or 'json'".into(),
                })
            }
        };

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            storage,
            jwt,
            generation: GenerationOptions {
                skip_existing,
                range_mode,
            },
            log_format,
        })
    }
}

fn parse_var<T>(var: &'static str, value: String) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let parsed = value.trim().parse::<T>();
    parsed.map_err(|e| ConfigError::Invalid {
        var,
        reason: e.to_string(),
        value,
    })
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
    fn defaults_with_memory_backend() {
        let config = load(&[("STORAGE_BACKEND", "memory"), ("JWT_SECRET", "s3cret")]).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.cors_origins.len(), 1);
        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(config.jwt.access_token_expiry_mins, 15);
        assert_eq!(config.generation, GenerationOptions::default());
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn postgres_requires_database_url() {
        assert_matches!(
            load(&[("JWT_SECRET", "s3cret")]),
            Err(ConfigError::Missing("DATABASE_URL"))
        );
        let config = load(&[
            ("JWT_SECRET", "s3cret"),
            ("DATABASE_URL", "postgres://localhost/gymdesk"),
        ])
        .unwrap();
        assert_matches!(config.storage, StorageBackend::Postgres { .. });
    }

    #[test]
    fn jwt_secret_is_required() {
        assert_matches!(
            load(&[("STORAGE_BACKEND", "memory")]),
            Err(ConfigError::Missing("JWT_SECRET"))
        );
    }

    #[test]
    fn generation_settings_are_parsed() {
        let config = load(&[
            ("STORAGE_BACKEND", "memory"),
            ("JWT_SECRET", "s3cret"),
            ("GENERATION_RANGE_MODE", "calendar"),
            ("GENERATION_SKIP_EXISTING", "TRUE"),
            ("LOG_FORMAT", "json"),
        ])
        .unwrap();
        assert_eq!(config.generation.range_mode, RangeMode::Calendar);
        assert!(config.generation.skip_existing);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn invalid_values_are_reported() {
        let base = [("STORAGE_BACKEND", "memory"), ("JWT_SECRET", "s3cret")];
        for (var, value) in [
            ("PORT", "eighty"),
            ("GENERATION_RANGE_MODE", "yearly"),
            ("GENERATION_SKIP_EXISTING", "sometimes"),
            ("STORAGE_BACKEND", "sqlite"),
            ("LOG_FORMAT", "xml"),
        ] {
            let mut vars = base.to_vec();
            vars.retain(|(k, _)| *k != var);
            vars.push((var, value));
            assert_matches!(load(&vars), Err(ConfigError::Invalid { .. }), "{var}");
        }
    }
}
