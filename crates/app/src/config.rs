//! Runtime configuration loaded from the environment at startup.
//!
//! A `.env` file in the working directory is honoured during development; it is
//! skipped under test so tests stay hermetic.

use std::path::PathBuf;

use tracing::Level;

pub const DEFAULT_DB_URL: &str = "sqlite://data/custom-questions.sqlite3";
pub const DEFAULT_CACHE_DIR: &str = ".quiz-cache";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    pub cache_dir: PathBuf,
    /// When set, overrides are synced to this HTTP endpoint instead of `SQLite`.
    pub remote_url: Option<String>,
    pub log_level: Level,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` when a variable is set to something
    /// unusable.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` when a variable is set to something
    /// unusable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = match lookup("QUIZ_DB_URL") {
            Some(raw) if raw.trim().is_empty() => {
                return Err(ConfigError::InvalidValue(
                    "QUIZ_DB_URL".to_string(),
                    "must not be empty".to_string(),
                ));
            }
            Some(raw) => raw.trim().to_string(),
            None => DEFAULT_DB_URL.to_string(),
        };

        let cache_dir = lookup("QUIZ_CACHE_DIR")
            .filter(|raw| !raw.trim().is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_CACHE_DIR), PathBuf::from);

        let remote_url = match lookup("QUIZ_REMOTE_URL") {
            Some(raw) if raw.trim().is_empty() => None,
            Some(raw) => Some(validate_remote_url(&raw).map_err(|reason| {
                ConfigError::InvalidValue("QUIZ_REMOTE_URL".to_string(), reason)
            })?),
            None => None,
        };

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "info".to_string());
        let log_level = log_level_str.trim().parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{log_level_str}' is not a valid log level"),
            )
        })?;

        Ok(Self {
            database_url,
            cache_dir,
            remote_url,
            log_level,
        })
    }
}

/// Accepts `http://` and `https://` base URLs; trailing slashes are dropped.
pub fn validate_remote_url(raw: &str) -> Result<String, String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let rest = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .ok_or_else(|| format!("'{raw}' is not an http(s) URL"))?;
    if rest.is_empty() {
        return Err(format!("'{raw}' has no host"));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.database_url, DEFAULT_DB_URL);
        assert_eq!(config.cache_dir, PathBuf::from(DEFAULT_CACHE_DIR));
        assert_eq!(config.remote_url, None);
        assert_eq!(config.log_level, Level::INFO);
    }

    #[test]
    fn variables_override_defaults() {
        let config = Config::from_lookup(lookup(&[
            ("QUIZ_DB_URL", "sqlite://tmp/q.sqlite3"),
            ("QUIZ_CACHE_DIR", "/tmp/cache"),
            ("QUIZ_REMOTE_URL", "https://quiz.example.com/"),
            ("RUST_LOG", "debug"),
        ]))
        .unwrap();
        assert_eq!(config.database_url, "sqlite://tmp/q.sqlite3");
        assert_eq!(config.cache_dir, PathBuf::from("/tmp/cache"));
        assert_eq!(config.remote_url.as_deref(), Some("https://quiz.example.com"));
        assert_eq!(config.log_level, Level::DEBUG);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = Config::from_lookup(lookup(&[("RUST_LOG", "chatty")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(var, _) if var == "RUST_LOG"));

        let err = Config::from_lookup(lookup(&[("QUIZ_REMOTE_URL", "ftp://x")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(var, _) if var == "QUIZ_REMOTE_URL"));

        let err = Config::from_lookup(lookup(&[("QUIZ_DB_URL", "  ")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(var, _) if var == "QUIZ_DB_URL"));
    }
}
