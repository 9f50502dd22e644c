//! Output Plugin Presence Check
//!
//! The output section references a native extension. Without it the engine
//! cannot start, so generation is aborted before anything is compiled.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PluginMissingReason {
    NotFound,
    PermissionDenied,
    Other,
}

#[derive(Debug, Error)]
pub enum PluginMissingError {
    #[error("{} file not found. Configuration will not be created.", .path.display())]
    NotFound { path: PathBuf },

    #[error("Permission denied when accessing {}. Check your file permissions.", .path.display())]
    PermissionDenied { path: PathBuf },

    #[error("An unexpected error occurred while checking {}: {source}", .path.display())]
    Other {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PluginMissingError {
    pub fn reason(&self) -> PluginMissingReason {
        match self {
            PluginMissingError::NotFound { .. } => PluginMissingReason::NotFound,
            PluginMissingError::PermissionDenied { .. } => PluginMissingReason::PermissionDenied,
            PluginMissingError::Other { .. } => PluginMissingReason::Other,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            PluginMissingError::NotFound { path }
            | PluginMissingError::PermissionDenied { path }
            | PluginMissingError::Other { path, .. } => path,
        }
    }
}

/// Succeeds only if `path` can be opened for reading.
pub fn check_plugin(path: &Path) -> Result<(), PluginMissingError> {
    File::open(path).map_err(|e| {
        let path = path.to_path_buf();
        match e.kind() {
            ErrorKind::NotFound => PluginMissingError::NotFound { path },
            ErrorKind::PermissionDenied => PluginMissingError::PermissionDenied { path },
            _ => PluginMissingError::Other { path, source: e },
        }
    })?;

    info!(path = %path.display(), "Output plugin found");
    Ok(())
}
