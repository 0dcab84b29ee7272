//! Store configuration.

use std::env;
use std::str::FromStr;

use common::DatabaseConfig;

/// Store configuration, loaded from `OOTH_STORE_*` environment variables.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Database connection settings
    pub database: DatabaseConfig,
    /// Apply pending migrations when connecting
    pub run_migrations: bool,
}

impl StoreConfig {
    /// Load configuration from environment variables (and `.env` if present).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let defaults = DatabaseConfig::default();
        Self {
            database: DatabaseConfig {
                url: env::var("OOTH_STORE_DATABASE_URL")
                    .or_else(|_| env::var("DATABASE_URL"))
                    .unwrap_or(defaults.url),
                max_connections: parse_var("OOTH_STORE_MAX_CONNECTIONS")
                    .unwrap_or(defaults.max_connections),
                min_connections: parse_var("OOTH_STORE_MIN_CONNECTIONS")
                    .unwrap_or(defaults.min_connections),
            },
            run_migrations: parse_var("OOTH_STORE_RUN_MIGRATIONS").unwrap_or(true),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            run_migrations: true,
        }
    }
}

/// Read and parse an environment variable, ignoring unparsable values
fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_runs_migrations() {
        let config = StoreConfig::default();
        assert!(config.run_migrations);
        assert_eq!(config.database.max_connections, 10);
    }

    #[test]
    fn test_parse_var() {
        env::set_var("OOTH_STORE_TEST_PARSE_OK", "25");
        env::set_var("OOTH_STORE_TEST_PARSE_BAD", "lots");

        assert_eq!(parse_var::<u32>("OOTH_STORE_TEST_PARSE_OK"), Some(25));
        assert_eq!(parse_var::<u32>("OOTH_STORE_TEST_PARSE_BAD"), None);
        assert_eq!(parse_var::<bool>("OOTH_STORE_TEST_PARSE_MISSING"), None);
    }
}
