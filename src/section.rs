//! Section Model - Named Blocks of Key/Value Lines
//!
//! Rendered form of a section:
//!
//! ```text
//! <blank line>
//! [KIND]
//!     Key value
//! ```
//!
//! Keys are left-padded to a per-entry column so the output matches the
//! layout the downstream engine's documentation uses.

use serde::{Deserialize, Serialize};
use std::fmt;

const INDENT: &str = "    ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Service,
    Input,
    Filter,
    Output,
    MultilineParser,
}

impl SectionKind {
    pub fn header(&self) -> &'static str {
        match self {
            SectionKind::Service => "SERVICE",
            SectionKind::Input => "INPUT",
            SectionKind::Filter => "FILTER",
            SectionKind::Output => "OUTPUT",
            SectionKind::MultilineParser => "MULTILINE_PARSER",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Line {
    Entry {
        key: String,
        value: String,
        column: usize,
    },
    Comment(String),
    Verbatim(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    kind: SectionKind,
    column: usize,
    lines: Vec<Line>,
}

impl Section {
    pub fn new(kind: SectionKind) -> Self {
        Self {
            kind,
            column: 0,
            lines: vec![],
        }
    }

    /// Default key column for entries added after this call.
    pub fn aligned(mut self, column: usize) -> Self {
        self.column = column;
        self
    }

    pub fn entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(key, value);
        self
    }

    pub fn entry_at(mut self, column: usize, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.lines.push(Line::Entry {
            key: key.into(),
            value: value.into(),
            column,
        });
        self
    }

    pub fn comment(mut self, text: impl Into<String>) -> Self {
        self.lines.push(Line::Comment(text.into()));
        self
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.lines.push(Line::Entry {
            key: key.into(),
            value: value.into(),
            column: self.column,
        });
    }

    /// Append a pre-formatted body line (indentation is added).
    pub fn push_verbatim(&mut self, line: impl Into<String>) {
        self.lines.push(Line::Verbatim(line.into()));
    }

    pub fn kind(&self) -> SectionKind {
        self.kind
    }

    /// Key/value entries in order, comments and verbatim lines excluded.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.lines.iter().filter_map(|line| match line {
            Line::Entry { key, value, .. } => Some((key.as_str(), value.as_str())),
            _ => None,
        })
    }

    /// First value for `key`, if any.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\n[{}]\n", self.kind.header())?;
        for line in &self.lines {
            match line {
                Line::Entry { key, value, column } => {
                    writeln!(f, "{INDENT}{key:<width$} {value}", width = *column)?
                }
                Line::Comment(text) if text.is_empty() => writeln!(f, "{INDENT}#")?,
                Line::Comment(text) => writeln!(f, "{INDENT}# {text}")?,
                Line::Verbatim(text) => writeln!(f, "{INDENT}{text}")?,
            }
        }
        Ok(())
    }
}

/// Concatenate sections in the order given.
pub fn render_document<'a>(sections: impl IntoIterator<Item = &'a Section>) -> String {
    sections.into_iter().map(Section::render).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aligned_entries() {
        let section = Section::new(SectionKind::Service)
            .aligned(12)
            .entry("Flush", "1")
            .entry("Parsers_File", "parsers.conf");
        assert_eq!(
            section.render(),
            "\n[SERVICE]\n    Flush        1\n    Parsers_File parsers.conf\n"
        );
    }

    #[test]
    fn test_per_entry_column_and_comments() {
        let section = Section::new(SectionKind::Output)
            .entry_at(5, "Name", "logzio")
            .entry("id", "x")
            .comment("")
            .comment("hint");
        assert_eq!(
            section.render(),
            "\n[OUTPUT]\n    Name  logzio\n    id x\n    #\n    # hint\n"
        );
    }

    #[test]
    fn test_document_concatenation() {
        let a = Section::new(SectionKind::Filter).entry("Name", "lua");
        let b = Section::new(SectionKind::Output).entry("Name", "logzio");
        assert_eq!(
            render_document([&a, &b]),
            "\n[FILTER]\n    Name lua\n\n[OUTPUT]\n    Name logzio\n"
        );
        assert_eq!(b.get("Name"), Some("logzio"));
    }
}
