//! FluentConf Core - Log Shipper Configuration Compiler
//!
//! # Compilation Contract
//! 1. Settings are read once, then frozen
//! 2. Conflicting options fail before any text exists
//! 3. Sections are built independently, ordered afterwards
//! 4. Output is deterministic for a given settings snapshot
//! 5. Nothing is written unless its document compiled

pub mod settings;
pub mod validation;
pub mod section;
pub mod builders;
pub mod multiline;
pub mod hashing;
pub mod artifact;
pub mod plugin;
pub mod pipeline;
pub mod logging;

pub use settings::{Settings, SettingsSource, EnvSource, SettingsError};
pub use validation::{ConflictError, ValidationResult, ValidationRule, ValidationViolation, Validator};
pub use section::{Section, SectionKind};
pub use builders::{FieldMutation, FieldParseError, FieldWarning};
pub use multiline::MultilineRule;
pub use hashing::{sha256_hex, canonical_json, compute_settings_hash};
pub use artifact::{ArtifactWriter, ArtifactWriteError, FsArtifactWriter};
pub use plugin::{check_plugin, PluginMissingError, PluginMissingReason};
pub use pipeline::{
    ArtifactTargets, CompiledConfig, ConfigPipeline, GenerateReport, PipelineError, WrittenArtifact,
};

pub const GENERATOR_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_PLUGIN_PATH: &str = "/fluent-bit/plugins/out_logzio.so";
pub const DEFAULT_MAIN_CONFIG_PATH: &str = "/fluent-bit/etc/fluent-bit.conf";
pub const DEFAULT_MULTILINE_CONFIG_PATH: &str = "/fluent-bit/etc/parsers_multiline.conf";
