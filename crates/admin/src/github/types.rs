//! GitHub contents API payloads.

use serde::{Deserialize, Serialize};

/// The subset of a contents API file we read.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentFile {
    pub sha: String,
    #[serde(default)]
    pub path: String,
}

/// Body of `PUT /repos/{owner}/{repo}/contents/{path}`.
#[derive(Debug, Serialize)]
pub struct PutContentRequest<'a> {
    pub message: String,
    /// Base64 of the new file content.
    pub content: String,
    /// Omitted when creating a file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<&'a str>,
    pub branch: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitRef {
    pub sha: String,
}

/// Response of a successful create or update.
#[derive(Debug, Clone, Deserialize)]
pub struct PutContentResponse {
    pub content: Option<ContentFile>,
    pub commit: CommitRef,
}

/// Error body GitHub sends with 4xx/5xx responses.
#[derive(Debug, Deserialize)]
pub(super) struct ApiErrorBody {
    pub message: String,
}

/// What a sync did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncOutcome {
    pub path: String,
    /// `true` when the file did not exist before.
    pub created: bool,
    pub commit_sha: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_put_request_omits_missing_sha() {
        let body = PutContentRequest {
            message: "Update a.json via Admin UI".to_string(),
            content: "e30=".to_string(),
            sha: None,
            branch: "main",
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("sha").is_none());
        assert_eq!(json["branch"], "main");

        let body = PutContentRequest {
            sha: Some("abc123"),
            ..body
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["sha"], "abc123");
    }

    #[test]
    fn test_put_response_parses() {
        let response: PutContentResponse = serde_json::from_str(
            r#"{"content":{"name":"a.json","path":"public/a.json","sha":"f00"},"commit":{"sha":"c0ffee","message":"x"}}"#,
        )
        .unwrap();
        assert_eq!(response.commit.sha, "c0ffee");
        assert_eq!(response.content.unwrap().path, "public/a.json");
    }
}
