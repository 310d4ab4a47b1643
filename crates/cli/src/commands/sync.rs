//! Publish a local file through the GitHub contents API.

use std::path::Path;

use tracing::info;

use lechare_admin::config::GitHubConfig;
use lechare_admin::github::GitHubClient;

use super::CommandError;

/// Commit `file` to `repo_path` on the configured branch.
///
/// # Errors
///
/// Returns an error when `GITHUB_TOKEN` is unset, the file cannot be read,
/// or GitHub rejects the update.
pub async fn run(repo_path: &str, file: &Path) -> Result<(), CommandError> {
    let config = GitHubConfig::from_env()?.ok_or(CommandError::MissingEnvVar("GITHUB_TOKEN"))?;
    let client = GitHubClient::new(&config)?;

    let content = tokio::fs::read_to_string(file)
        .await
        .map_err(|e| CommandError::file(file, e))?;

    info!(
        path = repo_path,
        branch = client.branch(),
        "Committing {}",
        file.display()
    );
    let outcome = client.update_file(repo_path, &content).await?;

    if outcome.created {
        info!(commit = %outcome.commit_sha, "Created {}", outcome.path);
    } else {
        info!(commit = %outcome.commit_sha, "Updated {}", outcome.path);
    }
    Ok(())
}
