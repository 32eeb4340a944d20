use std::path::PathBuf;

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub data_file: PathBuf,
    pub request_timeout_secs: u64,
    pub cors_max_age_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server_host: "127.0.0.1".to_string(),
            server_port: 3000,
            data_file: PathBuf::from("data.json"),
            request_timeout_secs: 30,
            cors_max_age_secs: 86_400,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok(); // Load .env file if present
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let port = lookup("SERVER_PORT").or_else(|| lookup("PORT"));

        Ok(Config {
            server_host: lookup("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: match port {
                Some(raw) => raw
                    .parse()
                    .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?,
                None => defaults.server_port,
            },
            data_file: lookup("DATA_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_file),
            request_timeout_secs: parse_or(
                &lookup,
                "REQUEST_TIMEOUT_SECS",
                defaults.request_timeout_secs,
            )?,
            cors_max_age_secs: parse_or(&lookup, "CORS_MAX_AGE_SECS", defaults.cors_max_age_secs)?,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn parse_or<F>(lookup: &F, key: &str, default: u64) -> Result<u64, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid {}: {}", key, e))),
        None => Ok(default),
    }
}
