//! Application configuration loaded from the environment.

use std::env;
use std::path::PathBuf;

use thiserror::Error;
use tracing::info;

use health_calendar_domain::auth::token::{JwtConfig, SecurityError};
use health_calendar_domain::database::{DatabaseConfig, DatabaseError, DatabaseType};
use health_calendar_domain::services::reminders::{DEFAULT_REMINDER_WINDOW_DAYS, MAX_REMINDER_WINDOW_DAYS};

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Security(#[from] SecurityError),
}

/// Settings shared by the server and the batch binaries
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub data_dir: PathBuf,
    pub database: DatabaseConfig,
    pub guidelines_path: PathBuf,
    pub guidelines_remote_url: Option<String>,
    pub reminder_window_days: i64,
    pub app_env: String,
}

impl AppConfig {
    /// Read every setting except the JWT configuration
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = parse_var("PORT", 3000u16)?;
        let data_dir = PathBuf::from(env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()));

        let mut database = DatabaseConfig::from_env()?;
        if database.db_type == DatabaseType::Sqlite && database.sqlite_path.is_none() {
            let path = data_dir.join("health_calendar.db");
            info!("Using database path {}", path.display());
            database.sqlite_path = Some(path.to_string_lossy().to_string());
        }

        let guidelines_path = env::var("GUIDELINES_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir.join("guidelines.json"));

        let guidelines_remote_url = env::var("GUIDELINES_REMOTE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        let reminder_window_days = check_reminder_window(parse_var(
            "REMINDER_WINDOW_DAYS",
            DEFAULT_REMINDER_WINDOW_DAYS,
        )?)?;

        Ok(Self {
            port,
            data_dir,
            database,
            guidelines_path,
            guidelines_remote_url,
            reminder_window_days,
            app_env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        })
    }

    /// JWT signing configuration; fails when `JWT_SECRET` is not set
    pub fn jwt() -> Result<JwtConfig, ConfigError> {
        Ok(JwtConfig::from_env()?)
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidValue { name, value }),
        Err(_) => Ok(default),
    }
}

/// Accept windows from 0 to `MAX_REMINDER_WINDOW_DAYS`
fn check_reminder_window(days: i64) -> Result<i64, ConfigError> {
    if !(0..=MAX_REMINDER_WINDOW_DAYS).contains(&days) {
        return Err(ConfigError::InvalidValue {
            name: "REMINDER_WINDOW_DAYS",
            value: days.to_string(),
        });
    }
    Ok(days)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_var_default_and_invalid() {
        assert_eq!(parse_var("HEALTH_CALENDAR_TEST_UNSET_VAR", 42u16).unwrap(), 42);

        env::set_var("HEALTH_CALENDAR_TEST_BAD_PORT", "forty-two");
        let err = parse_var("HEALTH_CALENDAR_TEST_BAD_PORT", 3000u16).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { name: "HEALTH_CALENDAR_TEST_BAD_PORT", .. }));
        env::remove_var("HEALTH_CALENDAR_TEST_BAD_PORT");
    }

    #[test]
    fn test_reminder_window_bounds() {
        assert_eq!(check_reminder_window(0).unwrap(), 0);
        assert_eq!(check_reminder_window(MAX_REMINDER_WINDOW_DAYS).unwrap(), MAX_REMINDER_WINDOW_DAYS);
        assert!(check_reminder_window(-1).is_err());
        assert!(matches!(
            check_reminder_window(1_000_000_000),
            Err(ConfigError::InvalidValue { name: "REMINDER_WINDOW_DAYS", .. })
        ));
    }
}
