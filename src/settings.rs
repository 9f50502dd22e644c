//! Settings - Frozen Input Snapshot
//!
//! Every recognized name has a documented default. Layering order:
//! defaults, then an optional JSON settings file, then a [`SettingsSource`]
//! (the process environment in production).

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use thiserror::Error;

pub mod keys {
    pub const LOG_LEVEL: &str = "LOG_LEVEL";
    pub const READ_FROM_HEAD: &str = "READ_FROM_HEAD";
    pub const IGNORE_OLDER: &str = "IGNORE_OLDER";
    pub const MATCH_CONTAINER_NAME: &str = "MATCH_CONTAINER_NAME";
    pub const SKIP_CONTAINER_NAMES: &str = "SKIP_CONTAINER_NAMES";
    pub const MATCH_IMAGE_NAME: &str = "MATCH_IMAGE_NAME";
    pub const SKIP_IMAGE_NAMES: &str = "SKIP_IMAGE_NAMES";
    pub const INCLUDE_LINE: &str = "INCLUDE_LINE";
    pub const EXCLUDE_LINES: &str = "EXCLUDE_LINES";
    pub const ADDITIONAL_FIELDS: &str = "ADDITIONAL_FIELDS";
    pub const SET_FIELDS: &str = "SET_FIELDS";
    pub const LOGZIO_LOGS_TOKEN: &str = "LOGZIO_LOGS_TOKEN";
    pub const LOGZIO_URL: &str = "LOGZIO_URL";
    pub const LOGZIO_TYPE: &str = "LOGZIO_TYPE";
    pub const OUTPUT_ID: &str = "OUTPUT_ID";
    pub const HEADERS: &str = "HEADERS";
    pub const MULTILINE_START_STATE_RULE: &str = "MULTILINE_START_STATE_RULE";
    pub const MULTILINE_CUSTOM_RULES: &str = "MULTILINE_CUSTOM_RULES";
    pub const LOGS_PATH: &str = "LOGS_PATH";
}

pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_READ_FROM_HEAD: &str = "true";
pub const DEFAULT_LOGS_TOKEN: &str = "your_logzio_logs_token";
pub const DEFAULT_LOGZIO_URL: &str = "https://listener.logz.io:8071";
pub const DEFAULT_LOGZIO_TYPE: &str = "logzio-docker-logs";
pub const DEFAULT_OUTPUT_ID: &str = "output_id";
pub const DEFAULT_LOGS_PATH: &str = "/var/lib/docker/containers/*/*.log";

const FIELD_COUNT: usize = 19;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Settings file not found: {path}")]
    FileNotFound { path: String },

    #[error("Failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Supplies raw setting values by name. Absent names resolve to defaults.
pub trait SettingsSource {
    fn get(&self, key: &str) -> Option<String>;
}

/// Reads settings from the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSource;

impl SettingsSource for EnvSource {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl SettingsSource for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

impl SettingsSource for BTreeMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        BTreeMap::get(self, key).cloned()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Settings {
    pub log_level: String,
    pub read_from_head: String,
    pub ignore_older: String,
    pub match_container_name: String,
    pub skip_container_names: String,
    pub match_image_name: String,
    pub skip_image_names: String,
    pub include_line: String,
    pub exclude_lines: String,
    pub additional_fields: String,
    pub set_fields: String,
    pub logzio_logs_token: String,
    pub logzio_url: String,
    pub logzio_type: String,
    pub output_id: String,
    pub headers: String,
    pub multiline_start_state_rule: String,
    pub multiline_custom_rules: String,
    pub logs_path: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            read_from_head: DEFAULT_READ_FROM_HEAD.to_string(),
            ignore_older: String::new(),
            match_container_name: String::new(),
            skip_container_names: String::new(),
            match_image_name: String::new(),
            skip_image_names: String::new(),
            include_line: String::new(),
            exclude_lines: String::new(),
            additional_fields: String::new(),
            set_fields: String::new(),
            logzio_logs_token: DEFAULT_LOGS_TOKEN.to_string(),
            logzio_url: DEFAULT_LOGZIO_URL.to_string(),
            logzio_type: DEFAULT_LOGZIO_TYPE.to_string(),
            output_id: DEFAULT_OUTPUT_ID.to_string(),
            headers: String::new(),
            multiline_start_state_rule: String::new(),
            multiline_custom_rules: String::new(),
            logs_path: DEFAULT_LOGS_PATH.to_string(),
        }
    }
}

impl Settings {
    /// Build a snapshot from defaults overlaid with `source`.
    pub fn from_source(source: &impl SettingsSource) -> Self {
        let mut settings = Self::default();
        settings.apply_overrides(source);
        settings
    }

    /// Parse a JSON object keyed by setting name. Missing names keep their
    /// defaults; unrecognized names are ignored.
    pub fn from_json_str(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, SettingsError> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SettingsError::FileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                SettingsError::Io(e)
            }
        })?;
        Self::from_json_str(&content)
    }

    /// Defaults, then `file` if given, then `source`.
    pub fn load(file: Option<&Path>, source: &impl SettingsSource) -> Result<Self, SettingsError> {
        let mut settings = match file {
            Some(path) => Self::from_json_file(path)?,
            None => Self::default(),
        };
        settings.apply_overrides(source);
        Ok(settings)
    }

    /// All recognized settings as `(name, value)` pairs in catalogue order.
    pub fn entries(&self) -> [(&'static str, &str); FIELD_COUNT] {
        [
            (keys::LOG_LEVEL, self.log_level.as_str()),
            (keys::READ_FROM_HEAD, self.read_from_head.as_str()),
            (keys::IGNORE_OLDER, self.ignore_older.as_str()),
            (keys::MATCH_CONTAINER_NAME, self.match_container_name.as_str()),
            (keys::SKIP_CONTAINER_NAMES, self.skip_container_names.as_str()),
            (keys::MATCH_IMAGE_NAME, self.match_image_name.as_str()),
            (keys::SKIP_IMAGE_NAMES, self.skip_image_names.as_str()),
            (keys::INCLUDE_LINE, self.include_line.as_str()),
            (keys::EXCLUDE_LINES, self.exclude_lines.as_str()),
            (keys::ADDITIONAL_FIELDS, self.additional_fields.as_str()),
            (keys::SET_FIELDS, self.set_fields.as_str()),
            (keys::LOGZIO_LOGS_TOKEN, self.logzio_logs_token.as_str()),
            (keys::LOGZIO_URL, self.logzio_url.as_str()),
            (keys::LOGZIO_TYPE, self.logzio_type.as_str()),
            (keys::OUTPUT_ID, self.output_id.as_str()),
            (keys::HEADERS, self.headers.as_str()),
            (keys::MULTILINE_START_STATE_RULE, self.multiline_start_state_rule.as_str()),
            (keys::MULTILINE_CUSTOM_RULES, self.multiline_custom_rules.as_str()),
            (keys::LOGS_PATH, self.logs_path.as_str()),
        ]
    }

    /// Look up a setting value by its recognized name.
    pub fn value(&self, key: &str) -> Option<&str> {
        self.entries()
            .into_iter()
            .find(|(name, _)| *name == key)
            .map(|(_, value)| value)
    }

    /// Whether the multiline parser document will be produced.
    pub fn multiline_enabled(&self) -> bool {
        !self.multiline_start_state_rule.is_empty()
    }

    fn entries_mut(&mut self) -> [(&'static str, &mut String); FIELD_COUNT] {
        [
            (keys::LOG_LEVEL, &mut self.log_level),
            (keys::READ_FROM_HEAD, &mut self.read_from_head),
            (keys::IGNORE_OLDER, &mut self.ignore_older),
            (keys::MATCH_CONTAINER_NAME, &mut self.match_container_name),
            (keys::SKIP_CONTAINER_NAMES, &mut self.skip_container_names),
            (keys::MATCH_IMAGE_NAME, &mut self.match_image_name),
            (keys::SKIP_IMAGE_NAMES, &mut self.skip_image_names),
            (keys::INCLUDE_LINE, &mut self.include_line),
            (keys::EXCLUDE_LINES, &mut self.exclude_lines),
            (keys::ADDITIONAL_FIELDS, &mut self.additional_fields),
            (keys::SET_FIELDS, &mut self.set_fields),
            (keys::LOGZIO_LOGS_TOKEN, &mut self.logzio_logs_token),
            (keys::LOGZIO_URL, &mut self.logzio_url),
            (keys::LOGZIO_TYPE, &mut self.logzio_type),
            (keys::OUTPUT_ID, &mut self.output_id),
            (keys::HEADERS, &mut self.headers),
            (keys::MULTILINE_START_STATE_RULE, &mut self.multiline_start_state_rule),
            (keys::MULTILINE_CUSTOM_RULES, &mut self.multiline_custom_rules),
            (keys::LOGS_PATH, &mut self.logs_path),
        ]
    }

    // A present-but-empty value wins over the default.
    fn apply_overrides(&mut self, source: &impl SettingsSource) {
        for (key, target) in self.entries_mut() {
            if let Some(value) = source.get(key) {
                *target = value;
            }
        }
    }
}
