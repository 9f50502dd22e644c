//! Section Builders - One Pure Function Per Section Kind
//!
//! Each builder maps validated [`Settings`] to a [`Section`], or to `None`
//! when its trigger setting is empty. Builders never look at each other;
//! ordering is the pipeline's job.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::multiline::MULTILINE_PARSER_NAME;
use crate::section::{Section, SectionKind};
use crate::settings::{keys, Settings};

pub const INPUT_TAG: &str = "docker.*";
pub const INPUT_PARSER: &str = "docker";
pub const ENRICHMENT_SCRIPT: &str = "/fluent-bit/etc/docker-metadata.lua";
pub const ENRICHMENT_CALL: &str = "enrich_with_docker_metadata";
pub const NESTED_UNDER: &str = "_source";
pub const OUTPUT_PLUGIN: &str = "logzio";
pub const PRODUCT_HEADER: &str = "user-agent:logzio-docker-collector-logs";

pub const CONTAINER_NAME_FIELD: &str = "docker_container_name";
pub const CONTAINER_IMAGE_FIELD: &str = "docker_container_image";
pub const MESSAGE_FIELD: &str = "message";
pub const RAW_MESSAGE_FIELD: &str = "log";

const WIDE: usize = 12;
const GREP: usize = 7;
const OUTPUT_HEAD: usize = 5;

/// A `key:value` entry without its separator. Non-fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Expected format 'key:value', got '{entry}'")]
pub struct FieldParseError {
    pub entry: String,
}

/// Record of a skipped field entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldWarning {
    pub setting: String,
    pub entry: String,
    pub message: String,
}

/// The rename block plus the optional add and set blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMutation {
    pub sections: Vec<Section>,
    pub warnings: Vec<FieldWarning>,
}

pub fn service(settings: &Settings) -> Section {
    Section::new(SectionKind::Service)
        .aligned(WIDE)
        .entry("Parsers_File", "parsers.conf")
        .entry("Parsers_File", "parsers_multiline.conf")
        .entry("Flush", "1")
        .entry("Daemon", "Off")
        .entry("Log_Level", settings.log_level.as_str())
}

pub fn input(settings: &Settings) -> Section {
    let mut section = Section::new(SectionKind::Input)
        .aligned(WIDE)
        .entry("Name", "tail")
        .entry("Path", settings.logs_path.as_str())
        .entry("Parser", INPUT_PARSER)
        .entry("Tag", INPUT_TAG);

    if settings.multiline_enabled() {
        section.push("read_from_head", settings.read_from_head.as_str());
        section.push("multiline.parser", MULTILINE_PARSER_NAME);
    }
    if !settings.ignore_older.is_empty() {
        section.push("ignore_older", settings.ignore_older.as_str());
    }
    section
}

pub fn enrichment() -> Section {
    Section::new(SectionKind::Filter)
        .aligned(WIDE)
        .entry("Name", "lua")
        .entry("Match", INPUT_TAG)
        .entry("script", ENRICHMENT_SCRIPT)
        .entry("call", ENRICHMENT_CALL)
}

/// Lifts the enrichment record's nested metadata so name/image filters can
/// see it.
pub fn nest_lift() -> Section {
    Section::new(SectionKind::Filter)
        .aligned(WIDE)
        .entry("Name", "nest")
        .entry("Match", "*")
        .entry("Operation", "lift")
        .entry("Nested_under", NESTED_UNDER)
}

pub fn container_name_filter(settings: &Settings) -> Option<Section> {
    grep_filter(
        CONTAINER_NAME_FIELD,
        &settings.match_container_name,
        &settings.skip_container_names,
    )
}

pub fn image_name_filter(settings: &Settings) -> Option<Section> {
    grep_filter(
        CONTAINER_IMAGE_FIELD,
        &settings.match_image_name,
        &settings.skip_image_names,
    )
}

pub fn line_filter(settings: &Settings) -> Option<Section> {
    grep_filter(MESSAGE_FIELD, &settings.include_line, &settings.exclude_lines)
}

pub fn field_mutation(settings: &Settings) -> FieldMutation {
    let mut sections = vec![modify().entry("Rename", format!("{RAW_MESSAGE_FIELD} {MESSAGE_FIELD}"))];
    let mut warnings = vec![];

    let groups = [
        (keys::ADDITIONAL_FIELDS, settings.additional_fields.as_str(), "Add"),
        (keys::SET_FIELDS, settings.set_fields.as_str(), "Set"),
    ];

    for (setting, raw, directive) in groups {
        if raw.is_empty() {
            continue;
        }
        let mut section = modify();
        let mut emitted = 0;
        for entry in raw.split(',') {
            match parse_field(entry) {
                Ok((key, value)) => {
                    section.push(directive, format!("{key} {value}"));
                    emitted += 1;
                }
                Err(e) => {
                    warn!(setting, entry, "Skipping invalid field entry: {}", e);
                    warnings.push(FieldWarning {
                        setting: setting.to_string(),
                        entry: entry.to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }
        if emitted > 0 {
            sections.push(section);
        }
    }

    FieldMutation { sections, warnings }
}

pub fn output(settings: &Settings) -> Section {
    let section = Section::new(SectionKind::Output)
        .aligned(OUTPUT_HEAD)
        .entry("Name", OUTPUT_PLUGIN)
        .entry("Match", "*")
        .aligned(WIDE)
        .entry("logzio_token", settings.logzio_logs_token.as_str())
        .entry("logzio_url", settings.logzio_url.as_str())
        .entry("logzio_type", settings.logzio_type.as_str())
        .aligned(0)
        .entry("id", settings.output_id.as_str())
        .entry("headers", PRODUCT_HEADER);

    if settings.headers.is_empty() {
        section
    } else {
        section.entry_at(WIDE, "headers", settings.headers.as_str())
    }
}

/// Split once on the first colon; both halves trimmed.
pub fn parse_field(entry: &str) -> Result<(String, String), FieldParseError> {
    entry
        .split_once(':')
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .ok_or_else(|| FieldParseError {
            entry: entry.to_string(),
        })
}

/// Trimmed, non-empty entries of a delimited list.
pub fn split_list(raw: &str, separator: char) -> Vec<&str> {
    raw.split(separator)
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .collect()
}

fn grep() -> Section {
    Section::new(SectionKind::Filter)
        .aligned(GREP)
        .entry("Name", "grep")
        .entry("Match", "*")
        .aligned(0)
}

fn modify() -> Section {
    Section::new(SectionKind::Filter)
        .entry("Name", "modify")
        .entry("Match", "*")
}

fn grep_filter(field: &str, include: &str, exclude: &str) -> Option<Section> {
    if !include.is_empty() {
        return Some(grep().entry("Regex", format!("{field} {}", include.trim())));
    }
    if exclude.is_empty() {
        return None;
    }

    let patterns = split_list(exclude, ',');
    if patterns.is_empty() {
        debug!(field, "Exclusion list has no usable entries, filter omitted");
        return None;
    }
    let mut section = grep();
    for pattern in patterns {
        section.push("Exclude", format!("{field} {pattern}"));
    }
    Some(section)
}
