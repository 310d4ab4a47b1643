//! GitHub sync for published quiz data.
//!
//! This module provides:
//! - [`GitHubClient`] for reading a file's sha and committing new content
//! - Contents API payload types
//!
//! # Flow
//!
//! 1. `GET /repos/{owner}/{repo}/contents/{path}?ref={branch}` for the current sha
//!    (404 means the file is new)
//! 2. `PUT` the same path with base64 content, the sha and the branch
//! 3. A stale sha comes back as 409/422 and is reported, never forced

mod client;
mod error;
mod types;

pub use client::{GitHubClient, commit_message};
pub use error::GitHubError;
pub use types::{CommitRef, ContentFile, PutContentRequest, PutContentResponse, SyncOutcome};
