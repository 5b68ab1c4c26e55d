use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use driver_logging::driver_info;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConsolidateError {
    #[error("staged directory missing for job `{0}`")]
    MissingJobDir(String),
    #[error("destination already exists: {0}")]
    Collision(PathBuf),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Delete any previous consolidated output, then start fresh. A missing
/// directory is a no-op; anything else propagates.
pub fn reset_output_root(dir: &Path) -> io::Result<()> {
    match fs::remove_dir_all(dir) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(err),
    }
    fs::create_dir_all(dir)
}

/// Relocates completed per-job staging directories into the output root.
#[derive(Debug, Clone)]
pub struct Consolidator {
    staging_root: PathBuf,
    output_root: PathBuf,
}

impl Consolidator {
    pub fn new(staging_root: impl AsRef<Path>, output_root: impl AsRef<Path>) -> Self {
        Self {
            staging_root: staging_root.as_ref().to_path_buf(),
            output_root: output_root.as_ref().to_path_buf(),
        }
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// Moves `<staging_root>/<name>` to `<output_root>/<name>` for each name.
    /// Names must belong to completed jobs; a missing source or an occupied
    /// destination is fatal.
    pub fn consolidate(&self, names: &[String]) -> Result<ConsolidateSummary, ConsolidateError> {
        let mut moved = Vec::with_capacity(names.len());
        for name in names {
            let source = self.staging_root.join(name);
            if !source.is_dir() {
                return Err(ConsolidateError::MissingJobDir(name.clone()));
            }
            let target = self.output_root.join(name);
            if target.exists() {
                return Err(ConsolidateError::Collision(target));
            }
            relocate(&source, &target)?;
            driver_info!("Relocated {} -> {}", source.display(), target.display());
            moved.push(name.clone());
        }
        Ok(ConsolidateSummary { moved })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsolidateSummary {
    pub moved: Vec<String>,
}

/// Rename when possible; fall back to copy + remove when the rename fails
/// (staging and output roots can sit on different filesystems).
fn relocate(source: &Path, target: &Path) -> Result<(), ConsolidateError> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    match fs::rename(source, target) {
        Ok(()) => Ok(()),
        Err(_) => {
            copy_dir_recursive(source, target)?;
            fs::remove_dir_all(source)?;
            Ok(())
        }
    }
}

fn copy_dir_recursive(source: &Path, target: &Path) -> io::Result<()> {
    fs::create_dir_all(target)?;
    for entry in fs::read_dir(source)? {
        let entry = entry?;
        let to = target.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_recursive(&entry.path(), &to)?;
        } else {
            fs::copy(entry.path(), &to)?;
        }
    }
    Ok(())
}
