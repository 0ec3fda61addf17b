//! `load_config` module: loads static YAML configuration and export-request
//! files into the strongly-typed structs the pipeline consumes.
//!
//! This is the only place untrusted YAML is parsed; all failures carry
//! context-rich `anyhow` diagnostics for the CLI boundary.

use anyhow::Result;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{error, info};

use crate::config::ExporterConfig;
use crate::export::ExportRequest;
use crate::fetch::IssueRef;

#[derive(Debug, Deserialize)]
struct RequestFile {
    #[serde(default)]
    issues: Vec<IssueRef>,
    #[serde(default = "default_generate_qr")]
    generate_qr_code: bool,
}

fn default_generate_qr() -> bool {
    true
}

/// Loads the exporter configuration from a YAML file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ExporterConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let content = fs::read_to_string(path_ref).map_err(|e| {
        error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
        anyhow::anyhow!("Failed to read config file {:?}: {}", path_ref, e)
    })?;

    let config: ExporterConfig = serde_yaml::from_str(&content).map_err(|e| {
        error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
        anyhow::anyhow!("Failed to parse config YAML: {e}")
    })?;

    config.trace_loaded();
    Ok(config)
}

/// Loads an export request (issue selection + options) from a YAML file.
pub fn load_request<P: AsRef<Path>>(path: P) -> Result<ExportRequest> {
    let path_ref = path.as_ref();
    info!(request_path = ?path_ref, "Loading export request from file");

    let content = fs::read_to_string(path_ref).map_err(|e| {
        error!(error = ?e, request_path = ?path_ref, "Failed to read request file");
        anyhow::anyhow!("Failed to read request file {:?}: {}", path_ref, e)
    })?;

    let raw: RequestFile = serde_yaml::from_str(&content).map_err(|e| {
        error!(error = ?e, request_path = ?path_ref, "Failed to parse request YAML");
        anyhow::anyhow!("Failed to parse request YAML: {e}")
    })?;

    if raw.issues.is_empty() {
        return Err(anyhow::anyhow!(
            "Request file {:?} selects no issues",
            path_ref
        ));
    }

    info!(
        issue_count = raw.issues.len(),
        generate_qr_code = raw.generate_qr_code,
        "Parsed export request"
    );
    Ok(ExportRequest {
        issues: raw.issues,
        generate_qr_code: raw.generate_qr_code,
    })
}
