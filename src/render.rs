//! Report rendering orchestration.
//!
//! Loads the template content from disk and drives the external
//! document-generation call for a finished report model, recording elapsed
//! wall-clock time. The render call is issued at most
//! once per export attempt; a failure here is terminal for the request and
//! routes to the diagnostic archiver in [`crate::export`].

use std::time::Instant;

use serde::Serialize;
use tracing::info;

use crate::contract::RenderApi;
use crate::error::{RenderError, TemplateError};
use crate::report_model::ReportDocumentModel;

/// Reads the template content submitted with each render call.
pub fn load_template(path: &str) -> Result<String, TemplateError> {
    std::fs::read_to_string(path).map_err(|e| TemplateError {
        path: path.to_string(),
        message: e.to_string(),
    })
}

/// Timing and destination of one successful render.
#[derive(Debug, Clone, Serialize)]
pub struct RenderStats {
    pub destination_path: String,
    pub elapsed_seconds: f64,
}

/// Submits the model plus template to the rendering API, producing the binary
/// artifact at `destination_path` in external storage.
pub async fn render_report<R>(
    api: &R,
    model: &ReportDocumentModel,
    template: &str,
    destination_path: &str,
) -> Result<RenderStats, RenderError>
where
    R: RenderApi + ?Sized,
{
    info!(
        destination = destination_path,
        issue_count = model.issues.len(),
        "[EXPORT] Submitting report model to rendering api"
    );
    let started = Instant::now();
    api.render_document(model, template, destination_path).await?;
    let elapsed = started.elapsed();
    info!(
        destination = destination_path,
        elapsed_seconds = elapsed.as_secs_f64(),
        "[EXPORT] Report rendered"
    );
    Ok(RenderStats {
        destination_path: destination_path.to_string(),
        elapsed_seconds: elapsed.as_secs_f64(),
    })
}
