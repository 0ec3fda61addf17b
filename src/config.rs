use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Exporter configuration shared by the pipeline and the download resolver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExporterConfig {
    /// Storage prefix under which artifacts are written
    /// (`{storage_root}/{id}.pdf`).
    #[serde(default = "default_storage_root")]
    pub storage_root: String,
    /// Path of the template file whose content is read for each render call.
    #[serde(default = "default_template_path")]
    pub template_path: String,
    /// When set, a diagnostic entry that fails to serialize fails the whole
    /// bundle instead of being skipped.
    #[serde(default)]
    pub strict_diagnostics: bool,
}

fn default_storage_root() -> String {
    "clients_github".to_string()
}

fn default_template_path() -> String {
    "template/Report-Issues.Mustache".to_string()
}

impl ExporterConfig {
    pub fn trace_loaded(&self) {
        info!(
            storage_root = %self.storage_root,
            strict_diagnostics = self.strict_diagnostics,
            "Loaded ExporterConfig"
        );
        debug!(?self, "ExporterConfig loaded (full debug)");
    }
}
