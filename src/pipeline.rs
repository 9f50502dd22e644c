//! Compilation Pipeline - Single Entry Point
//!
//! CRITICAL: compile MUST validate first. No document exists for settings
//! that fail validation.
//!
//! Main document order is fixed:
//! service, input, enrichment, name/image filters, line filter,
//! field mutation, output. Absent sections are omitted, never reordered.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::artifact::{ArtifactWriteError, ArtifactWriter};
use crate::builders::{self, FieldWarning};
use crate::hashing::{compute_settings_hash, sha256_hex};
use crate::multiline;
use crate::plugin::{check_plugin, PluginMissingError};
use crate::section::{render_document, Section};
use crate::settings::Settings;
use crate::validation::{ConflictError, ValidationResult, Validator};
use crate::{
    DEFAULT_MAIN_CONFIG_PATH, DEFAULT_MULTILINE_CONFIG_PATH, DEFAULT_PLUGIN_PATH,
    GENERATOR_VERSION,
};

#[cfg(feature = "test-hooks")]
use std::sync::atomic::{AtomicU32, Ordering};

#[cfg(feature = "test-hooks")]
static VALIDATION_CALL_COUNT: AtomicU32 = AtomicU32::new(0);

#[cfg(feature = "test-hooks")]
pub fn get_validation_call_count() -> u32 {
    VALIDATION_CALL_COUNT.load(Ordering::SeqCst)
}

#[cfg(feature = "test-hooks")]
pub fn reset_validation_call_count() {
    VALIDATION_CALL_COUNT.store(0, Ordering::SeqCst);
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Validation failed: {0}")]
    Conflict(#[from] ConflictError),

    #[error(transparent)]
    PluginMissing(#[from] PluginMissingError),

    #[error(transparent)]
    ArtifactWrite(#[from] ArtifactWriteError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Output of one compilation pass. Nothing here has touched the filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledConfig {
    pub sections: Vec<Section>,
    pub main: String,
    pub multiline: Option<String>,
    pub warnings: Vec<FieldWarning>,
}

/// Where generated artifacts go, and which plugin must exist first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactTargets {
    pub main: PathBuf,
    pub multiline: PathBuf,
    pub plugin: Option<PathBuf>,
}

impl Default for ArtifactTargets {
    fn default() -> Self {
        Self {
            main: PathBuf::from(DEFAULT_MAIN_CONFIG_PATH),
            multiline: PathBuf::from(DEFAULT_MULTILINE_CONFIG_PATH),
            plugin: Some(PathBuf::from(DEFAULT_PLUGIN_PATH)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WrittenArtifact {
    pub path: String,
    pub bytes: usize,
    pub sha256: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateReport {
    pub generator_version: String,
    pub generated_at: DateTime<Utc>,
    pub settings_hash: String,
    pub artifacts: Vec<WrittenArtifact>,
    pub warnings: Vec<FieldWarning>,
}

/// The compilation pipeline - single entry point for document generation
pub struct ConfigPipeline {
    validator: Validator,
}

impl ConfigPipeline {
    pub fn new() -> Self {
        Self {
            validator: Validator::new(),
        }
    }

    /// Report all conflicts without failing.
    pub fn check_settings(&self, settings: &Settings) -> ValidationResult {
        self.validator.check(settings)
    }

    /// This is the ONLY validation gate used by compilation.
    pub fn validate_settings(&self, settings: &Settings) -> Result<(), ConflictError> {
        #[cfg(feature = "test-hooks")]
        VALIDATION_CALL_COUNT.fetch_add(1, Ordering::SeqCst);

        self.validator.validate(settings)
    }

    /// Compile the main document and, when a start pattern is set, the
    /// multiline parser document.
    pub fn compile(&self, settings: &Settings) -> Result<CompiledConfig, PipelineError> {
        // MANDATORY: Validation is always called. This is non-negotiable.
        self.validate_settings(settings)?;

        let mut sections = vec![
            builders::service(settings),
            builders::input(settings),
            builders::enrichment(),
        ];

        let name_filters: Vec<Section> = [
            builders::container_name_filter(settings),
            builders::image_name_filter(settings),
        ]
        .into_iter()
        .flatten()
        .collect();
        if !name_filters.is_empty() {
            sections.push(builders::nest_lift());
            sections.extend(name_filters);
        }

        sections.extend(builders::line_filter(settings));

        let mutation = builders::field_mutation(settings);
        sections.extend(mutation.sections);

        sections.push(builders::output(settings));

        let main = render_document(&sections);
        let multiline = multiline::parser_section(settings).map(|s| s.render());

        debug!(
            sections = sections.len(),
            multiline = multiline.is_some(),
            warnings = mutation.warnings.len(),
            "Compiled configuration"
        );

        Ok(CompiledConfig {
            sections,
            main,
            multiline,
            warnings: mutation.warnings,
        })
    }

    /// Check the plugin, compile, then write every produced document.
    ///
    /// Nothing is written if the plugin check or compilation fails.
    pub fn generate(
        &self,
        settings: &Settings,
        targets: &ArtifactTargets,
        writer: &mut impl ArtifactWriter,
    ) -> Result<GenerateReport, PipelineError> {
        if let Some(plugin) = &targets.plugin {
            check_plugin(plugin)?;
        }

        let compiled = self.compile(settings)?;
        let settings_hash = compute_settings_hash(settings)?;

        let mut artifacts = vec![write_artifact(writer, &targets.main, &compiled.main)?];
        if let Some(multiline) = &compiled.multiline {
            artifacts.push(write_artifact(writer, &targets.multiline, multiline)?);
        }

        info!(artifacts = artifacts.len(), "Configuration generated");

        Ok(GenerateReport {
            generator_version: GENERATOR_VERSION.to_string(),
            generated_at: Utc::now(),
            settings_hash,
            artifacts,
            warnings: compiled.warnings,
        })
    }
}

fn write_artifact(
    writer: &mut impl ArtifactWriter,
    path: &Path,
    contents: &str,
) -> Result<WrittenArtifact, ArtifactWriteError> {
    writer.write(path, contents)?;
    Ok(WrittenArtifact {
        path: path.display().to_string(),
        bytes: contents.len(),
        sha256: sha256_hex(contents.as_bytes()),
    })
}

impl Default for ConfigPipeline {
    fn default() -> Self {
        Self::new()
    }
}
