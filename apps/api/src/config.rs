use std::str::FromStr;

use anyhow::{Context, Result};

const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;
const DEFAULT_MAX_FILES_PER_TASK: usize = 100;

/// Application configuration loaded from environment variables.
/// Every variable is optional; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Per-file upload limit.
    pub max_upload_bytes: usize,
    pub max_files_per_task: usize,
    pub seed_sample_data: bool,
    pub probe_user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8080,
            rust_log: "info".to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            max_files_per_task: DEFAULT_MAX_FILES_PER_TASK,
            seed_sample_data: true,
            probe_user_agent: default_user_agent(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();
        Ok(Config {
            port: env_or("PORT", defaults.port)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or(defaults.rust_log),
            max_upload_bytes: env_or("MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
            max_files_per_task: env_or("MAX_FILES_PER_TASK", defaults.max_files_per_task)?,
            seed_sample_data: env_or("SEED_SAMPLE_DATA", defaults.seed_sample_data)?,
            probe_user_agent: std::env::var("PROBE_USER_AGENT")
                .unwrap_or(defaults.probe_user_agent),
        })
    }

    /// Upper bound for a whole multipart request body.
    pub fn max_request_bytes(&self) -> usize {
        self.max_upload_bytes
            .saturating_mul(self.max_files_per_task)
            .saturating_add(64 * 1024)
    }
}

fn default_user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => parse_value(key, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse::<T>()
        .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.max_upload_bytes, 20 * 1024 * 1024);
        assert!(config.seed_sample_data);
        assert!(config.probe_user_agent.starts_with("recruit_api/"));
    }

    #[test]
    fn test_parse_value_reports_key() {
        let err = parse_value::<u16>("PORT", "eighty").unwrap_err();
        assert!(err.to_string().contains("PORT"));
        assert!(!parse_value::<bool>("SEED_SAMPLE_DATA", " false ").unwrap());
    }

    #[test]
    fn test_request_limit_covers_all_files() {
        let config = Config {
            max_upload_bytes: 10,
            max_files_per_task: 3,
            ..Config::default()
        };
        assert!(config.max_request_bytes() >= 30);
    }
}
