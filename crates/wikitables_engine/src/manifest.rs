use std::path::{Path, PathBuf};

use serde_json::json;

use crate::persist::{write_atomic, PersistError};

pub const MANIFEST_FILENAME: &str = "manifest.json";

/// One manifest row; the driver flattens its run report into these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub output_name: String,
    pub url: String,
    pub files: usize,
    pub bytes: u64,
    /// None for completed jobs, a failure description otherwise.
    pub failure: Option<String>,
}

/// Writes `manifest.json` into the output root: run timestamp, aggregate
/// counts, and one entry per job in plan order.
pub fn write_run_manifest(
    output_root: &Path,
    run_utc: &str,
    entries: &[ManifestEntry],
) -> Result<PathBuf, PersistError> {
    let completed = entries
        .iter()
        .filter(|entry| entry.failure.is_none())
        .count();
    let manifest = json!({
        "run_utc": run_utc,
        "job_count": entries.len(),
        "completed": completed,
        "failed": entries.len() - completed,
        "jobs": entries.iter().map(|entry| {
            json!({
                "name": entry.output_name,
                "url": entry.url,
                "status": if entry.failure.is_none() { "completed" } else { "failed" },
                "files": entry.files,
                "bytes": entry.bytes,
                "failure": entry.failure,
            })
        }).collect::<Vec<_>>(),
    });
    write_atomic(output_root, MANIFEST_FILENAME, &manifest.to_string())
}
