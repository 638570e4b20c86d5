use config::{Config, ConfigError, File};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Database {
    pub path: String,
    pub seed_demo_data: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Feed {
    /// Lookback window for the trending feed, in (possibly fractional) days
    pub trending_days: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Pagination {
    pub default_limit: i64,
    pub max_limit: i64,
}

impl Pagination {
    /// Fill in the default limit and cap it at the maximum.
    /// Values below 1 pass through so the page validation can reject them.
    pub fn resolve_limit(&self, requested: Option<i64>) -> i64 {
        requested.unwrap_or(self.default_limit).min(self.max_limit)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: Server,
    pub database: Database,
    pub feed: Feed,
    pub pagination: Pagination,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("database.path", "stride.db")?
            .set_default("database.seed_demo_data", false)?
            .set_default("feed.trending_days", 1.0)?
            .set_default("pagination.default_limit", 20)?
            .set_default("pagination.max_limit", 100)?;

        // settings.toml is optional, checked in the working directory and then
        // in stride-server/ for runs from the workspace root
        let config_file_name = "settings.toml";
        for path in [
            PathBuf::from(config_file_name),
            PathBuf::from("stride-server").join(config_file_name),
        ] {
            if path.exists() {
                builder = builder.add_source(File::from(path).required(false));
            }
        }

        // Environment variables take priority
        for (var, key) in [
            ("HOST", "server.host"),
            ("PORT", "server.port"),
            ("DATABASE_PATH", "database.path"),
            ("SEED_DEMO_DATA", "database.seed_demo_data"),
            ("TRENDING_DAYS", "feed.trending_days"),
        ] {
            if let Ok(value) = std::env::var(var) {
                builder = builder.set_override(key, value)?;
            }
        }

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.feed.trending_days.is_finite() || self.feed.trending_days <= 0.0 {
            return Err(ConfigError::Message(
                "feed.trending_days must be a positive number".to_string(),
            ));
        }
        if self.pagination.default_limit < 1 || self.pagination.max_limit < self.pagination.default_limit {
            return Err(ConfigError::Message(
                "pagination limits must satisfy 1 <= default_limit <= max_limit".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: Server {
                host: "127.0.0.1".to_string(),
                port: 3000,
            },
            database: Database {
                path: ":memory:".to_string(),
                seed_demo_data: false,
            },
            feed: Feed { trending_days: 1.0 },
            pagination: Pagination {
                default_limit: 20,
                max_limit: 100,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_limit_defaults_and_clamps() {
        let pagination = Settings::default().pagination;
        assert_eq!(pagination.resolve_limit(None), 20);
        assert_eq!(pagination.resolve_limit(Some(5)), 5);
        assert_eq!(pagination.resolve_limit(Some(500)), 100);
        assert_eq!(pagination.resolve_limit(Some(0)), 0);
    }

    #[test]
    fn test_validate_rejects_bad_window() {
        let mut settings = Settings::default();
        assert!(settings.validate().is_ok());

        settings.feed.trending_days = 0.0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_inverted_limits() {
        let mut settings = Settings::default();
        settings.pagination.max_limit = 10;
        assert!(settings.validate().is_err());
    }
}
