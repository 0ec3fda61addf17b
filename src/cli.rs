//! CLI interface: command parsing, argument validation and the async
//! entrypoint used by both `main` and integration tests.
//!
//! All business logic lives in the library modules; this module is strictly
//! CLI glue and orchestration.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::download::resolve_download;
use crate::export::{download_link, export};
use crate::load_config::{load_config, load_request};
use crate::render_client::HttpRenderApi;
use crate::tracker::GithubTracker;

/// CLI for issues-exporter: turn tracker issues into PDF reports.
#[derive(Parser)]
#[clap(
    name = "issues-exporter",
    version,
    about = "Export source-control issues into a generated PDF report"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the export pipeline for the issues selected in the request file
    Export {
        /// Path to the YAML exporter config file
        #[clap(long)]
        config: PathBuf,
        /// Path to the YAML export request (issue selection + options)
        #[clap(long)]
        request: PathBuf,
        /// Base URL used to print the download link
        #[clap(long, default_value = "http://localhost:8080")]
        base_url: String,
    },
    /// Download a stored artifact by id
    Download {
        /// Path to the YAML exporter config file
        #[clap(long)]
        config: PathBuf,
        /// Artifact id (append `-error` for the diagnostic variant)
        #[clap(long)]
        id: String,
        /// Fetch the `.json` diagnostic variant instead of the PDF
        #[clap(long)]
        error: bool,
        /// Output file; defaults to the suggested filename
        #[clap(long)]
        out: Option<PathBuf>,
    },
}

/// Extracted async CLI logic entrypoint for integration tests and main().
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Export {
            config,
            request,
            base_url,
        } => {
            let config = load_config(config)?;
            let request = load_request(request)?;
            tracing::info!(command = "export", "Starting export");

            let tracker = GithubTracker::new_from_env();
            let render_api =
                HttpRenderApi::new_from_env().map_err(|e| anyhow::anyhow!(e.to_string()))?;

            match export(&config, &tracker, &render_api, &request).await {
                Ok(report) => {
                    tracing::info!(
                        command = "export",
                        id = %report.id,
                        elapsed_seconds = report.stats.elapsed_seconds,
                        "Export complete"
                    );
                    println!("id: {}", report.id);
                    println!("downloadLink: {}", download_link(&base_url, &report.id));
                    Ok(())
                }
                Err(e) => {
                    tracing::error!(
                        command = "export",
                        stage = %e.stage,
                        status = e.status_code(),
                        diagnostic_id = ?e.diagnostic_id,
                        error = %e,
                        "Export failed"
                    );
                    if let Some(diagnostic_id) = &e.diagnostic_id {
                        eprintln!("diagnostics stored under id: {diagnostic_id}");
                    }
                    Err(anyhow::Error::new(e))
                }
            }
        }
        Commands::Download {
            config,
            id,
            error,
            out,
        } => {
            let config = load_config(config)?;
            tracing::info!(command = "download", id = %id, error_variant = error, "Starting download");

            let render_api =
                HttpRenderApi::new_from_env().map_err(|e| anyhow::anyhow!(e.to_string()))?;
            let payload = resolve_download(&render_api, &config.storage_root, &id, error).await?;

            let out_path = out.unwrap_or_else(|| PathBuf::from(&payload.file_name));
            let mut file = std::fs::File::create(&out_path)?;
            file.write_all(&payload.content)?;
            tracing::info!(
                command = "download",
                path = %out_path.display(),
                size = payload.content.len(),
                "Download complete"
            );
            println!("saved: {}", out_path.display());
            Ok(())
        }
    }
}
