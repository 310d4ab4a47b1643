//! GitHub contents API client.
//!
//! Reads a file's current sha and writes new content conditioned on it.
//! Transport failures and 5xx responses are retried a bounded number of times
//! with a fixed delay; every other status is final.

use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, instrument, warn};

use super::error::GitHubError;
use super::types::{ApiErrorBody, ContentFile, PutContentRequest, PutContentResponse, SyncOutcome};
use crate::config::GitHubConfig;

/// GitHub REST API version header value.
const API_VERSION: &str = "2022-11-28";

/// Client for one repository and branch.
#[derive(Clone)]
pub struct GitHubClient {
    client: Client,
    token: SecretString,
    api_url: Url,
    owner: String,
    repo: String,
    branch: String,
    max_retries: u32,
    retry_delay: Duration,
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("token", &"[REDACTED]")
            .field("api_url", &self.api_url.as_str())
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("branch", &self.branch)
            .field("max_retries", &self.max_retries)
            .finish_non_exhaustive()
    }
}

impl GitHubClient {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `GitHubError::Config` if the API URL is not a base URL or the
    /// HTTP client cannot be built.
    pub fn new(config: &GitHubConfig) -> Result<Self, GitHubError> {
        let api_url = Url::parse(&config.api_url)
            .map_err(|e| GitHubError::Config(format!("invalid API URL {}: {e}", config.api_url)))?;
        if api_url.cannot_be_a_base() {
            return Err(GitHubError::Config(format!(
                "API URL cannot be a base: {}",
                config.api_url
            )));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("lechare-admin/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GitHubError::Config(e.to_string()))?;

        Ok(Self {
            client,
            token: config.token.clone(),
            api_url,
            owner: config.owner.clone(),
            repo: config.repo.clone(),
            branch: config.branch.clone(),
            max_retries: config.max_retries,
            retry_delay: config.retry_delay,
        })
    }

    /// Branch commits go to.
    #[must_use]
    pub fn branch(&self) -> &str {
        &self.branch
    }

    /// Fetch the sha of the file at `path`, or `None` if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or GitHub answers with an error.
    #[instrument(skip(self))]
    pub async fn file_sha(&self, path: &str) -> Result<Option<String>, GitHubError> {
        let mut url = self.contents_url(path)?;
        url.query_pairs_mut().append_pair("ref", &self.branch);
        let response = self
            .send(|| self.request(self.client.get(url.clone())))
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!("File does not exist yet");
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(api_error(response, path).await);
        }

        let file: ContentFile = response
            .json()
            .await
            .map_err(|e| GitHubError::Response(e.to_string()))?;
        Ok(Some(file.sha))
    }

    /// Create or update the file at `path`.
    ///
    /// `sha` must be the file's current sha, or `None` to create it.
    ///
    /// # Errors
    ///
    /// Returns `GitHubError::Conflict` if the sha is stale.
    #[instrument(skip(self, content), fields(bytes = content.len()))]
    pub async fn put_file(
        &self,
        path: &str,
        content: &str,
        sha: Option<&str>,
    ) -> Result<PutContentResponse, GitHubError> {
        let url = self.contents_url(path)?;
        let body = PutContentRequest {
            message: commit_message(path),
            content: BASE64.encode(content),
            sha,
            branch: &self.branch,
        };

        let response = self
            .send(|| self.request(self.client.put(url.clone())).json(&body))
            .await?;
        if !response.status().is_success() {
            return Err(api_error(response, path).await);
        }

        response
            .json()
            .await
            .map_err(|e| GitHubError::Response(e.to_string()))
    }

    /// Replace the file at `path` with `content`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns error if reading the sha or writing the file fails.
    #[instrument(skip(self, content))]
    pub async fn update_file(&self, path: &str, content: &str) -> Result<SyncOutcome, GitHubError> {
        let sha = self.file_sha(path).await?;
        let response = self.put_file(path, content, sha.as_deref()).await?;

        debug!(commit = %response.commit.sha, "File committed");
        Ok(SyncOutcome {
            path: path.to_string(),
            created: sha.is_none(),
            commit_sha: response.commit.sha,
        })
    }

    /// `{api}/repos/{owner}/{repo}/contents/{path}` with every segment
    /// percent-encoded.
    fn contents_url(&self, path: &str) -> Result<Url, GitHubError> {
        let path = path.trim();
        if path.split('/').any(|s| s.is_empty() || s == "..") {
            return Err(GitHubError::InvalidPath(path.to_string()));
        }

        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|()| GitHubError::Config(format!("API URL cannot be a base: {}", self.api_url)))?
            .pop_if_empty()
            .extend(["repos", self.owner.as_str(), self.repo.as_str(), "contents"])
            .extend(path.split('/'));
        Ok(url)
    }

    fn request(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .bearer_auth(self.token.expose_secret())
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
    }

    /// Send a request, retrying transport errors and 5xx responses.
    ///
    /// The last 5xx response is returned as-is for the caller to map.
    async fn send<F>(&self, build: F) -> Result<Response, GitHubError>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut attempt = 0;
        loop {
            let outcome = build().send().await;
            let retryable = match &outcome {
                Ok(response) => response.status().is_server_error(),
                Err(_) => true,
            };

            if !retryable || attempt >= self.max_retries {
                return outcome.map_err(|e| GitHubError::Request(e.to_string()));
            }

            attempt += 1;
            warn!(
                attempt,
                max_retries = self.max_retries,
                status = outcome.as_ref().ok().map(|r| r.status().as_u16()),
                error = outcome.as_ref().err().map(tracing::field::display),
                "GitHub request failed, retrying"
            );
            tokio::time::sleep(self.retry_delay).await;
        }
    }
}

/// Commit message for an update of `path`.
#[must_use]
pub fn commit_message(path: &str) -> String {
    format!("Update {path} via Admin UI")
}

/// Map a non-success response to an error.
async fn api_error(response: Response, path: &str) -> GitHubError {
    let status = response.status();
    let message = response
        .json::<ApiErrorBody>()
        .await
        .map(|body| body.message)
        .unwrap_or_else(|_| status.canonical_reason().unwrap_or("unknown").to_string());

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GitHubError::Unauthorized(message),
        StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => GitHubError::Conflict {
            path: path.to_string(),
            message,
        },
        _ => GitHubError::Api {
            status: status.as_u16(),
            message,
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config(api_url: &str) -> GitHubConfig {
        GitHubConfig {
            token: SecretString::from("ghp_k3Jd9QmX2vLp8RtY5wZa"),
            owner: "lelismura".to_string(),
            repo: "PeR---Disciplinas".to_string(),
            branch: "main".to_string(),
            api_url: api_url.to_string(),
            snapshot_path: "public/disciplinas.json".to_string(),
            timeout: Duration::from_secs(10),
            max_retries: 2,
            retry_delay: Duration::from_millis(500),
        }
    }

    fn client() -> GitHubClient {
        GitHubClient::new(&config("https://api.github.com/")).unwrap()
    }

    #[test]
    fn test_contents_url() {
        assert_eq!(
            client().contents_url("public/disciplinas.json").unwrap().as_str(),
            "https://api.github.com/repos/lelismura/PeR---Disciplinas/contents/public/disciplinas.json"
        );
    }

    #[test]
    fn test_contents_url_encodes_reserved_characters() {
        let url = client().contents_url("avisos/turma #1?.json").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.github.com/repos/lelismura/PeR---Disciplinas/contents/avisos/turma%20%231%3F.json"
        );
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn test_contents_url_keeps_api_prefix() {
        let client = GitHubClient::new(&config("https://github.escola.br/api/v3")).unwrap();
        assert_eq!(
            client.contents_url("a.json").unwrap().as_str(),
            "https://github.escola.br/api/v3/repos/lelismura/PeR---Disciplinas/contents/a.json"
        );
    }

    #[test]
    fn test_invalid_api_url() {
        assert!(matches!(
            GitHubClient::new(&config("not a url")),
            Err(GitHubError::Config(_))
        ));
    }

    #[test]
    fn test_contents_url_rejects_bad_paths() {
        let client = client();
        assert!(matches!(
            client.contents_url("  "),
            Err(GitHubError::InvalidPath(_))
        ));
        assert!(client.contents_url("/etc/passwd").is_err());
        assert!(client.contents_url("public/../secrets").is_err());
        assert!(client.contents_url("public//a.json").is_err());
    }

    #[test]
    fn test_commit_message() {
        assert_eq!(
            commit_message("public/POO.json"),
            "Update public/POO.json via Admin UI"
        );
    }

    #[test]
    fn test_debug_redacts_token() {
        let debug_output = format!("{:?}", client());
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("ghp_k3Jd9QmX2vLp8RtY5wZa"));
    }
}
