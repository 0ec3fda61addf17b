//! High-level pipeline: orchestrates fetch → resolve → build → render for one
//! export request.
//!
//! A request moves through `Fetching → Resolving → Building → Rendering`;
//! every stage runs inside one error-handling scope, and any failure after
//! fetching begins is routed through the diagnostic archiver before the
//! wrapped [`ExportFailure`] surfaces to the boundary layer.
//!
//! # Responsibilities
//! - Fail-fast orchestration: the first failed stage terminates the request,
//!   no automatic retries anywhere.
//! - Generates the opaque artifact id and the deterministic storage path
//!   `{storage_root}/{id}.pdf`.
//! - On failure, snapshots every intermediate value produced so far, archives
//!   it, and best-effort stores the bundle under `{id}-error.json` so the
//!   download resolver can serve it later.
//!
//! # Callable From
//! - The CLI binary and integration tests; expects concrete
//!   [`IssueTracker`] and [`RenderApi`] implementations (or mocks).

use serde::Serialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::config::ExporterConfig;
use crate::contract::{IssueTracker, RenderApi};
use crate::diagnostics::{self, ContextSnapshot};
use crate::error::{ExportError, ExportFailure, ExportResult, ExportStage};
use crate::fetch::{assign_repositories, fetch_issues, resolve_repositories, IssueRef};
use crate::render::{load_template, render_report, RenderStats};
use crate::report_model::{build_report_model, ReportOptions};

/// One export request as consumed from the boundary layer.
#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub issues: Vec<IssueRef>,
    pub generate_qr_code: bool,
}

/// Outcome of a successful export.
#[derive(Debug, Clone)]
pub struct ExportReport {
    /// Opaque artifact id; the PDF lives at `{storage_root}/{id}.pdf`.
    pub id: String,
    pub storage_path: String,
    pub stats: RenderStats,
}

/// Request parameters captured as the first diagnostic entry.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct RequestParams {
    request_id: String,
    file_id: String,
    file_name: String,
}

/// Builds the user-facing download link for an artifact id.
pub fn download_link(base_url: &str, id: &str) -> String {
    format!("{}/export/download/{}", base_url.trim_end_matches('/'), id)
}

/// Runs the full export pipeline for one request.
///
/// Returns the artifact id, storage path and render statistics on success;
/// on failure returns an [`ExportFailure`] carrying the originating stage and
/// the diagnostic bundle built from whatever the pipeline produced.
pub async fn export<T, R>(
    config: &ExporterConfig,
    tracker: &T,
    render_api: &R,
    request: &ExportRequest,
) -> ExportResult<ExportReport>
where
    T: IssueTracker + ?Sized,
    R: RenderApi + ?Sized,
{
    let request_id = Uuid::new_v4().to_string();
    let id = Uuid::new_v4().to_string();
    let storage_path = format!("{}/{}.pdf", config.storage_root, id);
    let options = ReportOptions {
        generate_qr_code: request.generate_qr_code,
    };

    info!(
        request_id = %request_id,
        artifact_id = %id,
        issue_count = request.issues.len(),
        generate_qr_code = request.generate_qr_code,
        "[EXPORT] Starting export pipeline"
    );

    // Intermediate stages land in these slots so the failure path can archive
    // exactly what was produced, and nothing more.
    let mut user = None;
    let mut issues = None;
    let mut repositories = None;
    let mut model = None;

    let outcome: Result<RenderStats, (ExportStage, ExportError)> = async {
        user = Some(
            tracker
                .current_user()
                .await
                .map_err(|e| (ExportStage::Fetching, ExportError::from(e)))?,
        );

        // Results land directly in the snapshot slots; later stages borrow
        // them from there instead of cloning.
        let fetched = issues.insert(
            fetch_issues(tracker, &request.issues)
                .await
                .map_err(|e| (ExportStage::Fetching, ExportError::from(e)))?,
        );

        let repository_map = resolve_repositories(tracker, fetched)
            .await
            .map_err(|e| (ExportStage::Resolving, ExportError::from(e)))?;
        assign_repositories(fetched, &repository_map);
        repositories = Some(repository_map);

        let template = load_template(&config.template_path)
            .map_err(|e| (ExportStage::Building, ExportError::from(e)))?;
        let built = model.insert(build_report_model(fetched, &options));

        render_report(render_api, built, &template, &storage_path)
            .await
            .map_err(|e| (ExportStage::Rendering, ExportError::from(e)))
    }
    .await;

    match outcome {
        Ok(stats) => {
            info!(
                artifact_id = %id,
                elapsed_seconds = stats.elapsed_seconds,
                "[EXPORT] Export pipeline succeeded"
            );
            Ok(ExportReport {
                id,
                storage_path,
                stats,
            })
        }
        Err((stage, source)) => {
            error!(
                request_id = %request_id,
                artifact_id = %id,
                stage = %stage,
                error = %source,
                "[EXPORT][ERROR] Export pipeline failed"
            );

            let mut snapshot = ContextSnapshot::new();
            snapshot.push(
                "010_request_params.json",
                Some(&RequestParams {
                    request_id: request_id.clone(),
                    file_id: id.clone(),
                    file_name: storage_path.clone(),
                }),
            );
            snapshot.push("020_user.json", user.as_ref());
            snapshot.push("030_issues.json", issues.as_ref());
            snapshot.push("040_repo_dict.json", repositories.as_ref());
            snapshot.push("050_report_model.json", model.as_ref());

            // Archiving is best-effort: its own failure is logged and must
            // never mask the pipeline error being raised.
            let (diagnostics, diagnostic_id) =
                match diagnostics::archive(&snapshot, config.strict_diagnostics) {
                    Ok(bytes) => {
                        let diagnostic_id = format!("{id}-error");
                        let diagnostic_path =
                            format!("{}/{}.json", config.storage_root, diagnostic_id);
                        let stored = match render_api
                            .upload_file(&diagnostic_path, bytes.clone())
                            .await
                        {
                            Ok(()) => {
                                info!(
                                    path = %diagnostic_path,
                                    "[EXPORT] Stored diagnostic bundle"
                                );
                                true
                            }
                            Err(e) => {
                                error!(
                                    path = %diagnostic_path,
                                    error = %e,
                                    "[EXPORT][ERROR] Failed to store diagnostic bundle"
                                );
                                false
                            }
                        };
                        (Some(bytes), stored.then_some(diagnostic_id))
                    }
                    Err(e) => {
                        error!(
                            request_id = %request_id,
                            error = %e,
                            "[EXPORT][ERROR] Failed to build diagnostic bundle"
                        );
                        (None, None)
                    }
                };

            Err(ExportFailure {
                message: format!("error generating {storage_path}"),
                stage,
                source,
                diagnostics,
                diagnostic_id,
            })
        }
    }
}
