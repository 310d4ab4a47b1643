//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ADMIN_PASSWORD` - Password for the admin panel (min 12 chars, not a placeholder)
//!
//! ## Optional
//! - `ADMIN_HOST` - Bind address (default: 127.0.0.1)
//! - `ADMIN_PORT` - Listen port (default: 3001)
//! - `ADMIN_BASE_URL` - Public URL for the admin panel (default: <http://localhost:3001>)
//! - `LECHARE_DATA_DIR` - Store directory shared with the quiz site (default: data)
//! - `LECHARE_SEED_DIR` - First-run seed files (default: seed)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//!
//! ## Optional (GitHub - enables sync)
//! - `GITHUB_TOKEN` - Token with contents write access to the repository
//! - `GITHUB_OWNER` - Repository owner (required with a token)
//! - `GITHUB_REPO` - Repository name (required with a token)
//! - `GITHUB_BRANCH` - Branch to commit to (default: main)
//! - `GITHUB_API_URL` - API base URL (default: <https://api.github.com>)
//! - `GITHUB_SNAPSHOT_PATH` - Where the disciplines snapshot is written (default: public/disciplinas.json)
//! - `GITHUB_TIMEOUT_SECS` - Per-request timeout (default: 10)
//! - `GITHUB_MAX_RETRIES` - Retries for transport errors and 5xx (default: 2)
//! - `GITHUB_RETRY_DELAY_MS` - Fixed delay between retries (default: 500)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_ADMIN_PASSWORD_LENGTH: usize = 12;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
const DEFAULT_SNAPSHOT_PATH: &str = "public/disciplinas.json";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Admin application configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the admin panel
    pub base_url: String,
    /// Admin panel password
    pub admin_password: SecretString,
    /// Store directory, shared with the quiz binary
    pub data_dir: PathBuf,
    /// First-run seed files
    pub seed_dir: PathBuf,
    /// GitHub sync configuration (optional, sync returns 503 without it)
    pub github: Option<GitHubConfig>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
}

/// GitHub contents API configuration.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct GitHubConfig {
    /// Token with contents write access
    pub token: SecretString,
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Branch commits go to
    pub branch: String,
    /// API base URL, overridable for GitHub Enterprise and tests
    pub api_url: String,
    /// Repository path of the disciplines snapshot
    pub snapshot_path: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Retries after a transport error or 5xx response
    pub max_retries: u32,
    /// Fixed delay between retries
    pub retry_delay: Duration,
}

impl std::fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("token", &"[REDACTED]")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("branch", &self.branch)
            .field("api_url", &self.api_url)
            .field("snapshot_path", &self.snapshot_path)
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .field("retry_delay", &self.retry_delay)
            .finish()
    }
}

impl GitHubConfig {
    /// Load GitHub configuration from environment.
    ///
    /// Returns `None` if `GITHUB_TOKEN` is not set (sync disabled).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a token is set without owner and repo, or a
    /// numeric setting does not parse.
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some(token) = get_optional_env("GITHUB_TOKEN") else {
            return Ok(None);
        };

        // Tokens are generated, so low entropy is suspicious but not fatal
        if let Err(e) = validate_secret_strength(&token, "GITHUB_TOKEN") {
            tracing::warn!("GITHUB_TOKEN validation warning: {e}");
        }

        let timeout_secs = get_env_or_default("GITHUB_TIMEOUT_SECS", "10")
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("GITHUB_TIMEOUT_SECS".to_string(), e.to_string())
            })?;
        let max_retries = get_env_or_default("GITHUB_MAX_RETRIES", "2")
            .parse::<u32>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("GITHUB_MAX_RETRIES".to_string(), e.to_string())
            })?;
        let retry_delay_ms = get_env_or_default("GITHUB_RETRY_DELAY_MS", "500")
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("GITHUB_RETRY_DELAY_MS".to_string(), e.to_string())
            })?;

        Ok(Some(Self {
            token: SecretString::from(token),
            owner: get_required_env("GITHUB_OWNER")?,
            repo: get_required_env("GITHUB_REPO")?,
            branch: get_env_or_default("GITHUB_BRANCH", "main"),
            api_url: get_env_or_default("GITHUB_API_URL", DEFAULT_GITHUB_API_URL),
            snapshot_path: get_env_or_default("GITHUB_SNAPSHOT_PATH", DEFAULT_SNAPSHOT_PATH),
            timeout: Duration::from_secs(timeout_secs),
            max_retries,
            retry_delay: Duration::from_millis(retry_delay_ms),
        }))
    }
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the admin password fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("ADMIN_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("ADMIN_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("ADMIN_PORT", "3001")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("ADMIN_PORT".to_string(), e.to_string()))?;
        let admin_password = get_required_secret("ADMIN_PASSWORD")?;
        validate_admin_password(&admin_password, "ADMIN_PASSWORD")?;

        Ok(Self {
            host,
            port,
            base_url: get_env_or_default("ADMIN_BASE_URL", "http://localhost:3001"),
            admin_password,
            data_dir: get_env_or_default("LECHARE_DATA_DIR", "data").into(),
            seed_dir: get_env_or_default("LECHARE_SEED_DIR", "seed").into(),
            github: GitHubConfig::from_env()?,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Returns a reference to the GitHub configuration, if available.
    #[must_use]
    pub const fn github(&self) -> Option<&GitHubConfig> {
        self.github.as_ref()
    }

    /// Whether the panel is served over HTTPS.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    Ok(SecretString::from(value))
}

/// Get an optional environment variable, treating an empty value as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Validate that the admin password is long enough and not a placeholder.
fn validate_admin_password(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.chars().count() < MIN_ADMIN_PASSWORD_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_ADMIN_PASSWORD_LENGTH,
                value.chars().count()
            ),
        ));
    }
    check_placeholder(value, var_name)
}

fn check_placeholder(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    check_placeholder(secret, var_name)?;

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}
