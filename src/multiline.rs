//! Multiline Parser - Rule Chain Sub-Grammar
//!
//! Rules are quoted triples: `rule "<state>" "<pattern>" ["<next>"]`.
//! The first rule always starts from `start_state`; continuation rules
//! loop on `cont`. A start pattern without continuation patterns yields a
//! single terminal rule, i.e. one entry per start match.

use serde::{Deserialize, Serialize};

use crate::builders::split_list;
use crate::section::{Section, SectionKind};
use crate::settings::Settings;

pub const MULTILINE_PARSER_NAME: &str = "multiline-regex";
pub const START_STATE: &str = "start_state";
pub const CONTINUATION_STATE: &str = "cont";
pub const FLUSH_TIMEOUT_MS: u32 = 1000;

const HEADER_COLUMN: usize = 13;

const RULE_HINTS: [&str; 11] = [
    "",
    "Regex rules for multiline parsing",
    "---------------------------------",
    "",
    "configuration hints:",
    "",
    " - first state always has the name: start_state",
    " - every field in the rule must be inside double quotes",
    "",
    "rules |   state name  | regex pattern                  | next state",
    "------|---------------|--------------------------------------------",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultilineRule {
    pub state: String,
    pub pattern: String,
    pub next_state: Option<String>,
}

impl MultilineRule {
    /// Start rule; the pattern is wrapped in `/…/`.
    pub fn start(pattern: &str, next_state: Option<&str>) -> Self {
        Self {
            state: START_STATE.to_string(),
            pattern: format!("/{pattern}/"),
            next_state: next_state.map(str::to_string),
        }
    }

    pub fn continuation(pattern: &str) -> Self {
        Self {
            state: CONTINUATION_STATE.to_string(),
            pattern: pattern.to_string(),
            next_state: Some(CONTINUATION_STATE.to_string()),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.next_state.is_none()
    }

    /// Body line without indentation.
    pub fn render(&self) -> String {
        let state = format!("\"{}\"", self.state);
        let pattern = format!("\"{}\"", self.pattern);
        match &self.next_state {
            None => format!("rule      {state:<15} {pattern}"),
            Some(next) => {
                let gap: usize = if self.state == START_STATE { 2 } else { 21 };
                format!("rule      {state:<15} {pattern}{:gap$}\"{next}\"", "")
            }
        }
    }
}

/// Rule chain for the configured patterns. Empty when no start pattern is set.
pub fn rules(settings: &Settings) -> Vec<MultilineRule> {
    let start = settings.multiline_start_state_rule.as_str();
    if start.is_empty() {
        return vec![];
    }

    let continuations = split_list(&settings.multiline_custom_rules, ';');
    if continuations.is_empty() {
        return vec![MultilineRule::start(start, None)];
    }

    std::iter::once(MultilineRule::start(start, Some(CONTINUATION_STATE)))
        .chain(continuations.into_iter().map(MultilineRule::continuation))
        .collect()
}

/// The `[MULTILINE_PARSER]` section, or `None` without a start pattern.
pub fn parser_section(settings: &Settings) -> Option<Section> {
    if !settings.multiline_enabled() {
        return None;
    }

    let mut section = Section::new(SectionKind::MultilineParser)
        .aligned(HEADER_COLUMN)
        .entry("name", MULTILINE_PARSER_NAME)
        .entry("type", "regex")
        .entry("flush_timeout", FLUSH_TIMEOUT_MS.to_string());
    for hint in RULE_HINTS {
        section = section.comment(hint);
    }
    for rule in rules(settings) {
        section.push_verbatim(rule.render());
    }
    Some(section)
}
