use larder_core::PageSettings;
use std::{env, fmt::Display, net::SocketAddr, str::FromStr, time::Duration};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid {key} value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" | "test" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(format!("expected development or production, got {other}")),
        }
    }
}

/// Settings read once at start-up.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub environment: Environment,
    pub page_settings: PageSettings,
    /// Upper bound for a single store call, from checkout to last row
    pub query_timeout: Duration,
    pub pool_size: u32,
    /// Report per-request query counts in an X-DB-Query-Count header
    pub track_db_query_count: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup (the environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let bind_addr = try_load(&lookup, "LARDER_BIND_ADDR", "0.0.0.0:3000")?;
        let environment = try_load(&lookup, "LARDER_ENV", "development")?;
        let default_limit: u32 = try_load(&lookup, "LARDER_DEFAULT_PAGE_SIZE", "50")?;
        let max_limit: u32 = try_load(&lookup, "LARDER_MAX_PAGE_SIZE", "100")?;
        let timeout_ms: u64 = try_load(&lookup, "LARDER_QUERY_TIMEOUT_MS", "5000")?;
        let pool_size: u32 = try_load(&lookup, "LARDER_POOL_SIZE", "10")?;
        let track_db_query_count = lookup("TRACK_DB_QUERY_COUNT").is_some_and(|v| v == "1");

        if default_limit == 0 {
            return Err(invalid(
                "LARDER_DEFAULT_PAGE_SIZE",
                default_limit,
                "must be positive",
            ));
        }
        if max_limit < default_limit {
            return Err(invalid(
                "LARDER_MAX_PAGE_SIZE",
                max_limit,
                "must be at least LARDER_DEFAULT_PAGE_SIZE",
            ));
        }
        if timeout_ms == 0 {
            return Err(invalid(
                "LARDER_QUERY_TIMEOUT_MS",
                timeout_ms,
                "must be positive",
            ));
        }
        if pool_size == 0 {
            return Err(invalid("LARDER_POOL_SIZE", pool_size, "must be positive"));
        }

        Ok(Self {
            database_url,
            bind_addr,
            environment,
            page_settings: PageSettings {
                default_limit,
                max_limit,
            },
            query_timeout: Duration::from_millis(timeout_ms),
            pool_size,
            track_db_query_count,
        })
    }

    /// Error responses carry the underlying error text outside production.
    pub fn expose_error_details(&self) -> bool {
        self.environment != Environment::Production
    }
}

fn invalid(key: &'static str, value: impl Display, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn try_load<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: &str,
) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let value = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        value: value.clone(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("DATABASE_URL", "postgres://localhost/larder")]).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:3000".parse().unwrap());
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.page_settings, PageSettings::default());
        assert_eq!(config.query_timeout, Duration::from_secs(5));
        assert_eq!(config.pool_size, 10);
        assert!(config.expose_error_details());
        assert!(!config.track_db_query_count);
    }

    #[test]
    fn test_database_url_required() {
        assert!(matches!(load(&[]), Err(ConfigError::Missing("DATABASE_URL"))));
    }

    #[test]
    fn test_production_hides_details() {
        let config = load(&[
            ("DATABASE_URL", "postgres://localhost/larder"),
            ("LARDER_ENV", "Production"),
        ])
        .unwrap();
        assert!(!config.expose_error_details());
    }

    #[test]
    fn test_page_size_override() {
        let config = load(&[
            ("DATABASE_URL", "postgres://localhost/larder"),
            ("LARDER_DEFAULT_PAGE_SIZE", "52"),
        ])
        .unwrap();
        assert_eq!(config.page_settings.default_limit, 52);
    }

    #[test]
    fn test_invalid_values_rejected() {
        for (key, value) in [
            ("LARDER_DEFAULT_PAGE_SIZE", "0"),
            ("LARDER_DEFAULT_PAGE_SIZE", "many"),
            ("LARDER_MAX_PAGE_SIZE", "10"),
            ("LARDER_QUERY_TIMEOUT_MS", "0"),
            ("LARDER_POOL_SIZE", "-1"),
            ("LARDER_BIND_ADDR", "nowhere"),
            ("LARDER_ENV", "staging"),
        ] {
            let result = load(&[("DATABASE_URL", "postgres://localhost/larder"), (key, value)]);
            assert!(
                matches!(result, Err(ConfigError::Invalid { .. })),
                "{key}={value} should be rejected"
            );
        }
    }
}
