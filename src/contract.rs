//! # contract: collaborator interfaces for the export pipeline
//!
//! This module defines the two async traits the pipeline talks to — the
//! issue-tracker API and the document-rendering/storage API — together with
//! the plain data types consumed from them.
//!
//! ## Interface & Extensibility
//! - Implement [`IssueTracker`] to plug in a tracker backend (the crate ships
//!   a GitHub REST implementation in [`crate::tracker`]).
//! - Implement [`RenderApi`] to plug in a rendering/storage backend (see
//!   [`crate::render_client`] for the HTTP implementation).
//! - All methods are async and return typed errors from [`crate::error`];
//!   implementors map their transport failures into those variants.
//!
//! ## Mocking & Testing
//! - Both traits are annotated for `mockall` so consumers can generate
//!   deterministic mocks for unit/integration tests (behind the default
//!   `test-export-mocks` feature).
//!
//! ## Type Sources
//! - Payload types mirror the fields the report actually consumes; anything
//!   optional upstream stays `Option` here — the model builder degrades
//!   rather than unwraps.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

use crate::error::{RenderError, TrackerError};
use crate::report_model::ReportDocumentModel;

/// A tracker account as returned by the "current user" call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub login: String,
}

/// An issue label; only the display name feeds the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
}

/// Milestone attached to an issue, if any.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Milestone {
    pub title: String,
}

/// Aggregated reaction counters for an issue.
///
/// The wire names follow the tracker's convention (`+1`/`-1`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReactionSummary {
    #[serde(rename = "+1")]
    pub plus1: u32,
    #[serde(rename = "-1")]
    pub minus1: u32,
    pub laugh: u32,
    pub confused: u32,
    pub heart: u32,
    pub hooray: u32,
    pub total_count: u32,
}

/// Raw issue payload as fetched from the tracker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub id: i64,
    pub number: i64,
    pub title: String,
    pub body: Option<String>,
    pub state: String,
    pub user: Option<User>,
    pub assignee: Option<User>,
    #[serde(default)]
    pub assignees: Vec<User>,
    pub milestone: Option<Milestone>,
    #[serde(default)]
    pub labels: Vec<Label>,
    pub reactions: Option<ReactionSummary>,
    /// Number of comments on the issue; comments are only fetched when > 0.
    pub comments: u32,
    pub html_url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
}

/// A single issue comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueComment {
    pub user: Option<User>,
    pub body: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Repository metadata consumed by the report.
///
/// One instance is resolved per distinct repository id per export request;
/// nothing is cached across requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositorySummary {
    pub id: i64,
    pub full_name: String,
    pub description: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// One stored version of an artifact, newest first in listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileVersion {
    pub version_id: Option<String>,
    pub modified_date: Option<DateTime<Utc>>,
}

/// Read-only issue-tracker operations the pipeline consumes.
///
/// The trait is implemented by real clients and by test mocks; it is
/// `Send + Sync` and intended for async/await usage. No write calls are part
/// of this contract.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Fetch the authenticated account the export runs as.
    async fn current_user(&self) -> Result<User, TrackerError>;

    /// Fetch a single issue by repository id and issue number.
    async fn get_issue(&self, repository_id: i64, issue_number: i64)
        -> Result<Issue, TrackerError>;

    /// Fetch all comments of an issue.
    async fn get_comments(
        &self,
        repository_id: i64,
        issue_number: i64,
    ) -> Result<Vec<IssueComment>, TrackerError>;

    /// Fetch repository metadata by id.
    async fn get_repository(&self, repository_id: i64) -> Result<RepositorySummary, TrackerError>;
}

/// Document-rendering and artifact-storage operations.
///
/// `render_document` is the one genuinely stateful call in the pipeline; the
/// storage operations back the diagnostic upload and the download resolver.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait RenderApi: Send + Sync {
    /// Render the report model with the given template into a stored binary
    /// artifact at `destination_path`.
    async fn render_document(
        &self,
        model: &ReportDocumentModel,
        template: &str,
        destination_path: &str,
    ) -> Result<(), RenderError>;

    /// Store raw bytes at `path` (used for diagnostic bundles).
    async fn upload_file(&self, path: &str, content: Vec<u8>) -> Result<(), RenderError>;

    /// Retrieve the stored artifact at `path`.
    async fn download_file(&self, path: &str) -> Result<Vec<u8>, RenderError>;

    /// List the version history of the artifact at `path`, newest first.
    /// An artifact with no recorded versions yields an empty list.
    async fn get_file_versions(&self, path: &str) -> Result<Vec<FileVersion>, RenderError>;
}
