//! Error types for the export pipeline.
//!
//! Four failure families cross the crate boundary:
//! - [`TrackerError`] — an issue-tracker call failed (carries the upstream
//!   status so the boundary layer can map it to an HTTP response),
//! - [`RenderError`] — the rendering/storage API failed,
//! - [`DownloadError`] — a requested artifact or version is absent,
//! - [`ArchiveError`] — building the diagnostic bundle itself failed; this
//!   one is only ever logged, it never masks the pipeline error.
//!
//! [`ExportFailure`] wraps any pipeline-stage error together with the
//! diagnostic bundle captured before re-raising.

use thiserror::Error;

/// Result alias for pipeline operations.
pub type ExportResult<T> = std::result::Result<T, ExportFailure>;

/// Issue-tracker call failure, with the tracker's own status preserved.
#[derive(Debug, Clone, Error)]
pub enum TrackerError {
    #[error("issue tracker authorization failed")]
    Unauthorized,

    #[error("issue tracker resource not found: {0}")]
    NotFound(String),

    #[error("issue tracker rate limit exceeded")]
    RateLimited,

    #[error("issue tracker request failed with status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("issue tracker transport error: {0}")]
    Transport(String),
}

impl TrackerError {
    /// HTTP-equivalent status code for the boundary layer.
    pub fn status_code(&self) -> u16 {
        match self {
            TrackerError::Unauthorized => 401,
            TrackerError::NotFound(_) => 404,
            TrackerError::RateLimited => 429,
            TrackerError::Api { status, .. } => *status,
            TrackerError::Transport(_) => 500,
        }
    }
}

/// Rendering/storage API failure.
#[derive(Debug, Clone, Error)]
pub enum RenderError {
    #[error("render api request failed with status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("stored file not found: {0}")]
    NotFound(String),

    #[error("render api transport error: {0}")]
    Transport(String),
}

impl RenderError {
    pub fn status_code(&self) -> u16 {
        match self {
            RenderError::Api { status, .. } => *status,
            RenderError::NotFound(_) => 404,
            RenderError::Transport(_) => 500,
        }
    }
}

/// Download resolution failure.
///
/// `NotFound` is the storage API's own not-found signal, propagated rather
/// than swallowed; anything else surfaces as `Upstream`.
#[derive(Debug, Clone, Error)]
pub enum DownloadError {
    #[error("artifact not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Upstream(RenderError),
}

impl DownloadError {
    pub fn status_code(&self) -> u16 {
        match self {
            DownloadError::NotFound(_) => 404,
            DownloadError::Upstream(e) => e.status_code(),
        }
    }
}

impl From<RenderError> for DownloadError {
    fn from(e: RenderError) -> Self {
        match e {
            RenderError::NotFound(path) => DownloadError::NotFound(path),
            other => DownloadError::Upstream(other),
        }
    }
}

/// Diagnostic bundle construction failure.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("failed to serialize diagnostic entry {label}: {message}")]
    Serialize { label: String, message: String },

    #[error("failed to write diagnostic archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("failed to write diagnostic archive: {0}")]
    Io(#[from] std::io::Error),
}

/// Template file read failure.
#[derive(Debug, Clone, Error)]
#[error("failed to read template {path}: {message}")]
pub struct TemplateError {
    pub path: String,
    pub message: String,
}

/// Which pipeline stage a failure originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStage {
    Fetching,
    Resolving,
    Building,
    Rendering,
}

impl std::fmt::Display for ExportStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ExportStage::Fetching => "fetching",
            ExportStage::Resolving => "resolving",
            ExportStage::Building => "building",
            ExportStage::Rendering => "rendering",
        };
        f.write_str(name)
    }
}

/// Any error raised inside the pipeline's error-handling scope.
#[derive(Debug, Clone, Error)]
pub enum ExportError {
    #[error(transparent)]
    UpstreamFetch(#[from] TrackerError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

impl ExportError {
    pub fn status_code(&self) -> u16 {
        match self {
            ExportError::UpstreamFetch(e) => e.status_code(),
            ExportError::Template(_) => 500,
            ExportError::Render(e) => e.status_code(),
        }
    }
}

/// Terminal export failure surfaced to the boundary layer.
///
/// Carries the originating stage, the HTTP-equivalent status code, and — when
/// archiving succeeded — the zip diagnostic bundle plus the id under which it
/// was stored for later retrieval through the download resolver.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ExportFailure {
    pub message: String,
    pub stage: ExportStage,
    #[source]
    pub source: ExportError,
    /// Zip bundle of every intermediate value produced before the failure.
    pub diagnostics: Option<Vec<u8>>,
    /// Artifact id of the stored `.json` diagnostic companion, when the
    /// best-effort upload succeeded.
    pub diagnostic_id: Option<String>,
}

impl ExportFailure {
    pub fn status_code(&self) -> u16 {
        self.source.status_code()
    }
}
