//! Artifact download resolution.
//!
//! Given an artifact id, locates the stored file (`.pdf` success artifact or
//! `.json` diagnostic variant), derives a user-facing filename from the most
//! recent version's modification date, and returns the bytes for streaming.

use tracing::info;

use crate::contract::RenderApi;
use crate::error::DownloadError;

/// Resolved artifact content ready to stream back to the caller.
#[derive(Debug, Clone)]
pub struct DownloadPayload {
    pub content: Vec<u8>,
    pub content_type: &'static str,
    pub file_name: String,
}

/// Looks up the artifact for `id` and derives its suggested filename.
///
/// The filename is `Issues-{modified}.pdf` / `Error-{modified}.json` when
/// version metadata exists, falling back to the generic `Issues.pdf` /
/// `Error.json` when the version list is empty. A storage read failure
/// propagates as [`DownloadError::NotFound`] or [`DownloadError::Upstream`].
pub async fn resolve_download<R>(
    api: &R,
    storage_root: &str,
    id: &str,
    error_variant: bool,
) -> Result<DownloadPayload, DownloadError>
where
    R: RenderApi + ?Sized,
{
    let extension = if error_variant { "json" } else { "pdf" };
    let content_type = if error_variant {
        "application/json"
    } else {
        "application/pdf"
    };
    let path = format!("{storage_root}/{id}.{extension}");

    let versions = api.get_file_versions(&path).await?;
    let file_name = match versions.first().and_then(|v| v.modified_date.as_ref()) {
        Some(modified) => {
            let date = modified.format("%Y-%m-%d");
            if error_variant {
                format!("Error-{date}.json")
            } else {
                format!("Issues-{date}.pdf")
            }
        }
        None => {
            if error_variant {
                "Error.json".to_string()
            } else {
                "Issues.pdf".to_string()
            }
        }
    };

    let content = api.download_file(&path).await?;
    info!(
        path = %path,
        file_name = %file_name,
        size = content.len(),
        "[EXPORT] Resolved artifact download"
    );

    Ok(DownloadPayload {
        content,
        content_type,
        file_name,
    })
}
