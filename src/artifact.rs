//! Artifact Writer - Persisting Compiled Documents

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
#[error("Failed to write {}: {source}", .path.display())]
pub struct ArtifactWriteError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Destination for compiled text.
pub trait ArtifactWriter {
    /// Create the parent directory if needed and overwrite `path`.
    fn write(&mut self, path: &Path, contents: &str) -> Result<(), ArtifactWriteError>;
}

/// Writes to the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsArtifactWriter;

impl ArtifactWriter for FsArtifactWriter {
    fn write(&mut self, path: &Path, contents: &str) -> Result<(), ArtifactWriteError> {
        let wrap = |source| ArtifactWriteError {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(wrap)?;
        }
        fs::write(path, contents).map_err(wrap)?;

        info!(path = %path.display(), bytes = contents.len(), "Configuration file created");
        Ok(())
    }
}
