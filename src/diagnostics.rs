//! Diagnostic snapshots of a failed export.
//!
//! When any pipeline stage fails, whatever intermediate values exist at that
//! point (request parameters, user, issues, repository map, report model) are
//! captured into a [`ContextSnapshot`] and archived into a single zip bundle
//! that travels with the raised error. Absent stages are simply omitted,
//! never fabricated.
//!
//! Each entry is serialized independently when it is captured, so a value
//! that fails to serialize cannot take the rest of the bundle down with it.
//! Whether such a failure is skipped (logged) or fails the whole archive is a
//! configuration decision, see [`archive`]'s `strict` flag.

use std::io::{Cursor, Write};

use serde::Serialize;
use tracing::{debug, error};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::error::ArchiveError;

/// Ordered collection of labelled diagnostic values.
#[derive(Debug, Default)]
pub struct ContextSnapshot {
    entries: Vec<SnapshotEntry>,
}

#[derive(Debug)]
struct SnapshotEntry {
    label: String,
    payload: Result<Vec<u8>, serde_json::Error>,
}

impl ContextSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Captures a value under `label`, serializing it immediately.
    ///
    /// `None` values are skipped entirely — the stage never produced them.
    pub fn push<T: Serialize>(&mut self, label: &str, value: Option<&T>) {
        let Some(value) = value else {
            debug!(label, "[EXPORT] Skipping absent diagnostic entry");
            return;
        };
        self.entries.push(SnapshotEntry {
            label: label.to_string(),
            payload: serde_json::to_vec_pretty(value),
        });
    }

    /// Labels of all captured entries, in capture order.
    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.label.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Archives a snapshot into zip bytes. Pure over the snapshot contents.
///
/// With `strict` unset, an entry whose serialization failed is logged and
/// skipped; with `strict` set the whole archive fails instead.
pub fn archive(snapshot: &ContextSnapshot, strict: bool) -> Result<Vec<u8>, ArchiveError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    for entry in &snapshot.entries {
        match &entry.payload {
            Ok(bytes) => {
                writer.start_file(entry.label.as_str(), options)?;
                writer.write_all(bytes)?;
            }
            Err(e) if strict => {
                return Err(ArchiveError::Serialize {
                    label: entry.label.clone(),
                    message: e.to_string(),
                });
            }
            Err(e) => {
                error!(
                    label = %entry.label,
                    error = %e,
                    "[EXPORT] Skipping unserializable diagnostic entry"
                );
            }
        }
    }

    let cursor = writer.finish()?;
    Ok(cursor.into_inner())
}
