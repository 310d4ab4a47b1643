//! Quiz server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `QUIZ_HOST` - Bind address (default: 127.0.0.1)
//! - `QUIZ_PORT` - Listen port (default: 3000)
//! - `QUIZ_BASE_URL` - Public URL of the quiz site (default: <http://localhost:3000>)
//! - `LECHARE_DATA_DIR` - Directory holding `quiz_disciplines.json` / `quiz_users.json` (default: data)
//! - `LECHARE_SEED_DIR` - Directory holding `POO.json`, `GP.json`, `usuarios.json` (default: seed)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Quiz application configuration.
#[derive(Debug, Clone)]
pub struct QuizConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL, decides whether session cookies are `Secure`
    pub base_url: String,
    /// Where the store writes its JSON files
    pub data_dir: PathBuf,
    /// Where first-run seed files are read from
    pub seed_dir: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (production, staging, ...)
    pub sentry_environment: Option<String>,
}

impl QuizConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("QUIZ_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("QUIZ_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("QUIZ_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("QUIZ_PORT".to_string(), e.to_string()))?;

        Ok(Self {
            host,
            port,
            base_url: get_env_or_default("QUIZ_BASE_URL", "http://localhost:3000"),
            data_dir: get_env_or_default("LECHARE_DATA_DIR", "data").into(),
            seed_dir: get_env_or_default("LECHARE_SEED_DIR", "seed").into(),
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the site is served over HTTPS.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable, treating an empty value as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config(base_url: &str) -> QuizConfig {
        QuizConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: base_url.to_string(),
            data_dir: "data".into(),
            seed_dir: "seed".into(),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    #[test]
    fn test_socket_addr() {
        let addr = config("http://localhost:3000").socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_is_secure() {
        assert!(!config("http://localhost:3000").is_secure());
        assert!(config("https://quiz.lechare.com.br").is_secure());
    }
}
