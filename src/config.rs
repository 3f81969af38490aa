use std::env;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "http://localhost:3001/api";
pub const DEFAULT_SESSION_FILE: &str = ".admin-session.json";
const DEFAULT_REFRESH_INTERVAL_SECONDS: u64 = 60;
const DEFAULT_REFRESH_THRESHOLD_SECONDS: u64 = 120;
const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("ADMIN_API_URL is not a valid URL: {0}")]
    InvalidApiUrl(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub session_file: PathBuf,
    /// How often the proactive refresh timer ticks.
    pub refresh_interval: Duration,
    /// Remaining lifetime below which the timer refreshes the access token.
    pub refresh_threshold: Duration,
    pub http_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok(); // Load .env file

        let api_url = env::var("ADMIN_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let mut config = Config::new(api_url)?;

        if let Ok(path) = env::var("ADMIN_SESSION_FILE") {
            if !path.trim().is_empty() {
                config.session_file = PathBuf::from(path);
            }
        }
        config.refresh_interval = Duration::from_secs(seconds_from_env(
            "TOKEN_REFRESH_INTERVAL_SECONDS",
            DEFAULT_REFRESH_INTERVAL_SECONDS,
        ));
        config.refresh_threshold = Duration::from_secs(seconds_from_env(
            "TOKEN_REFRESH_THRESHOLD_SECONDS",
            DEFAULT_REFRESH_THRESHOLD_SECONDS,
        ));
        config.http_timeout = Duration::from_secs(seconds_from_env(
            "HTTP_TIMEOUT_SECONDS",
            DEFAULT_HTTP_TIMEOUT_SECONDS,
        ));

        Ok(config)
    }

    /// Builds a config for the given API base URL with every other setting at its default.
    pub fn new(api_url: impl Into<String>) -> Result<Self, ConfigError> {
        let api_url = api_url.into();
        let trimmed = api_url.trim().trim_end_matches('/');
        Url::parse(trimmed).map_err(|_| ConfigError::InvalidApiUrl(api_url.clone()))?;

        Ok(Config {
            api_url: trimmed.to_string(),
            session_file: PathBuf::from(DEFAULT_SESSION_FILE),
            refresh_interval: Duration::from_secs(DEFAULT_REFRESH_INTERVAL_SECONDS),
            refresh_threshold: Duration::from_secs(DEFAULT_REFRESH_THRESHOLD_SECONDS),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECONDS),
        })
    }
}

fn seconds_from_env(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use once_cell::sync::Lazy;
    use std::sync::Mutex;

    static ENV_MUTEX: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const KEYS: [&str; 5] = [
        "ADMIN_API_URL",
        "ADMIN_SESSION_FILE",
        "TOKEN_REFRESH_INTERVAL_SECONDS",
        "TOKEN_REFRESH_THRESHOLD_SECONDS",
        "HTTP_TIMEOUT_SECONDS",
    ];

    fn restore_env(vars: Vec<(&'static str, Option<String>)>) {
        for (key, value) in vars {
            if let Some(val) = value {
                env::set_var(key, val);
            } else {
                env::remove_var(key);
            }
        }
    }

    fn snapshot() -> Vec<(&'static str, Option<String>)> {
        KEYS.iter().map(|key| (*key, env::var(key).ok())).collect()
    }

    #[test]
    fn new_trims_trailing_slash() {
        let config = Config::new("http://api.example.com/api/").unwrap();
        assert_eq!(config.api_url, "http://api.example.com/api");
        assert_eq!(config.refresh_interval, Duration::from_secs(60));
        assert_eq!(config.refresh_threshold, Duration::from_secs(120));
    }

    #[test]
    fn new_rejects_invalid_url() {
        let err = Config::new("not a url").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidApiUrl(value) if value == "not a url"));
    }

    #[test]
    fn from_env_reads_overrides_and_ignores_garbage() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let saved = snapshot();

        env::set_var("ADMIN_API_URL", "https://manuals.example.com/api");
        env::set_var("ADMIN_SESSION_FILE", "/tmp/admin-session.json");
        env::set_var("TOKEN_REFRESH_INTERVAL_SECONDS", "15");
        env::set_var("TOKEN_REFRESH_THRESHOLD_SECONDS", "soon");
        env::remove_var("HTTP_TIMEOUT_SECONDS");

        let config = Config::from_env();
        restore_env(saved);

        let config = config.expect("config should load");
        assert_eq!(config.api_url, "https://manuals.example.com/api");
        assert_eq!(config.session_file, PathBuf::from("/tmp/admin-session.json"));
        assert_eq!(config.refresh_interval, Duration::from_secs(15));
        assert_eq!(config.refresh_threshold, Duration::from_secs(120));
        assert_eq!(config.http_timeout, Duration::from_secs(30));
    }
}
