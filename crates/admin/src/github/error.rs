//! GitHub-related errors.

use thiserror::Error;

/// Errors that can occur when talking to the GitHub contents API.
#[derive(Debug, Error)]
pub enum GitHubError {
    /// Could not build the HTTP client.
    #[error("GitHub client configuration error: {0}")]
    Config(String),

    /// HTTP request failed after all retries (timeout, connection refused, ...).
    #[error("GitHub request failed: {0}")]
    Request(String),

    /// Failed to parse response.
    #[error("GitHub response error: {0}")]
    Response(String),

    /// Token rejected or lacking permission.
    #[error("GitHub rejected the token: {0}")]
    Unauthorized(String),

    /// The file changed since its sha was read. Never retried or forced.
    #[error("{path} was changed by someone else; reload and try again ({message})")]
    Conflict { path: String, message: String },

    /// Any other non-success status.
    #[error("GitHub API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Path has an empty or `..` segment.
    #[error("invalid repository path '{0}'")]
    InvalidPath(String),
}
