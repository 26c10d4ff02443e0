//! Line-range index over a generated schema document.
//!
//! The index is rebuilt from the Markdown text after it has been written, so
//! its line numbers always refer to the file as it exists on disk. Scanning is
//! a two-state machine (outside a block / inside a block) driven by the
//! `<details>` and `</details>` markers; malformed nesting is reported as an
//! [`IndexError`] instead of producing a partial index.

use crate::error::IndexError;
use regex::Regex;
use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};
use std::fmt::Write;
use std::sync::OnceLock;

const OPEN_MARKER: &str = "<details>";
const CLOSE_MARKER: &str = "</details>";

/// Pre-compiled patterns for the label-bearing lines.
struct LinePatterns {
    heading: Regex,
    summary: Regex,
}

impl LinePatterns {
    fn instance() -> &'static Self {
        static PATTERNS: OnceLock<LinePatterns> = OnceLock::new();
        PATTERNS.get_or_init(|| Self {
            heading: Regex::new(r"^##\s+(.+)").expect("Invalid heading pattern"),
            summary: Regex::new(r"^\s*<summary>(.+?)</summary>").expect("Invalid summary pattern"),
        })
    }

    /// Trimmed label of a `<summary>` at the start of `text`.
    fn summary_label(&self, text: &str) -> Option<String> {
        self.summary
            .captures(text)
            .map(|captures| captures[1].trim().to_string())
    }
}

/// Inclusive, 1-based line range of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSpan {
    /// Line of the `<details>` marker
    pub start: usize,
    /// Line of the `</details>` marker
    pub end: usize,
}

impl Serialize for LineSpan {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        [self.start, self.end].serialize(serializer)
    }
}

/// Blocks under one `## ` heading, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexSection {
    /// Heading text after `## `
    pub title: String,
    /// Summary label and span of each block, first occurrence order
    pub details: Vec<(String, LineSpan)>,
}

impl IndexSection {
    fn record(&mut self, detail: String, span: LineSpan) {
        match self.details.iter_mut().find(|(label, _)| *label == detail) {
            Some((_, existing)) => *existing = span,
            None => self.details.push((detail, span)),
        }
    }
}

impl Serialize for IndexSection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.details.len()))?;
        for (label, span) in &self.details {
            map.serialize_entry(label, span)?;
        }
        map.end()
    }
}

/// Section → detail → line span, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaIndex {
    sections: Vec<IndexSection>,
}

impl Serialize for SchemaIndex {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.sections.len()))?;
        for section in &self.sections {
            map.serialize_entry(&section.title, section)?;
        }
        map.end()
    }
}

/// Scanner state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Outside,
    InBlock { start_line: usize },
}

impl SchemaIndex {
    /// Scans a schema document and builds its index.
    ///
    /// # Errors
    /// Returns an [`IndexError`] when a block is opened inside another block,
    /// closed without being opened, closed without a `<summary>` label, or
    /// left open at the end of the input.
    pub fn scan(document: &str) -> Result<Self, IndexError> {
        let patterns = LinePatterns::instance();
        let mut index = Self::default();
        let mut state = ScanState::Outside;
        let mut current_section: Option<usize> = None;
        let mut current_detail: Option<String> = None;

        for (line_number, line) in (1usize..).zip(document.lines()) {
            match state {
                ScanState::Outside if line.contains(OPEN_MARKER) => {
                    let rest = line.split_once(OPEN_MARKER).map_or("", |(_, rest)| rest);
                    match rest.split_once(CLOSE_MARKER) {
                        // `<details>..</details>` opened and closed on one line
                        Some((inner, _)) => {
                            let detail = patterns.summary_label(inner).ok_or(
                                IndexError::MissingSummary {
                                    start_line: line_number,
                                    end_line: line_number,
                                },
                            )?;
                            let span = LineSpan {
                                start: line_number,
                                end: line_number,
                            };
                            index.commit(current_section, detail, span);
                        }
                        None => {
                            state = ScanState::InBlock {
                                start_line: line_number,
                            };
                            current_detail = patterns.summary_label(rest);
                        }
                    }
                    continue;
                }
                ScanState::InBlock { start_line } if line.contains(OPEN_MARKER) => {
                    return Err(IndexError::NestedBlock {
                        line: line_number,
                        open_line: start_line,
                    });
                }
                ScanState::Outside if line.contains(CLOSE_MARKER) => {
                    return Err(IndexError::UnmatchedClose { line: line_number });
                }
                ScanState::InBlock { start_line } if line.contains(CLOSE_MARKER) => {
                    state = ScanState::Outside;
                    let detail = current_detail
                        .take()
                        .or_else(|| {
                            line.split_once(CLOSE_MARKER)
                                .and_then(|(inner, _)| patterns.summary_label(inner))
                        })
                        .ok_or(IndexError::MissingSummary {
                            start_line,
                            end_line: line_number,
                        })?;
                    let span = LineSpan {
                        start: start_line,
                        end: line_number,
                    };
                    index.commit(current_section, detail, span);
                    continue;
                }
                ScanState::InBlock { .. } => {
                    if let Some(detail) = patterns.summary_label(line) {
                        current_detail = Some(detail);
                        continue;
                    }
                }
                ScanState::Outside => {}
            }

            if let Some(captures) = patterns.heading.captures(line) {
                current_section = Some(index.open_section(&captures[1]));
            }
        }

        if let ScanState::InBlock { start_line } = state {
            return Err(IndexError::UnterminatedBlock { start_line });
        }

        tracing::debug!(
            "Indexed {} sections with {} blocks",
            index.sections.len(),
            index.block_count()
        );
        Ok(index)
    }

    /// Records a closed block under `section`, or skips it before any heading.
    fn commit(&mut self, section: Option<usize>, detail: String, span: LineSpan) {
        match section {
            Some(section) => self.sections[section].record(detail, span),
            None => tracing::debug!(
                "Skipping block '{}' at lines {}-{}: no enclosing section",
                detail,
                span.start,
                span.end
            ),
        }
    }

    /// Returns the position of the section titled `title`, creating it if new.
    fn open_section(&mut self, title: &str) -> usize {
        match self.sections.iter().position(|s| s.title == title) {
            Some(position) => position,
            None => {
                self.sections.push(IndexSection {
                    title: title.to_string(),
                    details: Vec::new(),
                });
                self.sections.len() - 1
            }
        }
    }

    /// Looks up the line span of `detail` under `section`.
    pub fn get(&self, section: &str, detail: &str) -> Option<LineSpan> {
        self.sections
            .iter()
            .find(|s| s.title == section)?
            .details
            .iter()
            .find(|(label, _)| label == detail)
            .map(|(_, span)| *span)
    }

    /// Sections in document order.
    pub fn sections(&self) -> &[IndexSection] {
        &self.sections
    }

    /// Total number of indexed blocks.
    pub fn block_count(&self) -> usize {
        self.sections.iter().map(|s| s.details.len()).sum()
    }

    /// Renders the index as the YAML-style lookup file.
    ///
    /// `engine` and `database` fill the title and description; `document`
    /// is the file name the line numbers refer to.
    pub fn render_yaml(&self, engine: &str, database: &str, document: &str) -> String {
        let mut out = String::from("---\n");
        let _ = writeln!(out, "Title: {engine} Database Schema Index");
        let _ = writeln!(
            out,
            "Description: Index for `{database}` database. Each item references a location in \"{document}\" where the first number represents the start line number and the second number represents the end line number."
        );
        for section in &self.sections {
            let _ = writeln!(out, "{}:", section.title);
            for (detail, span) in &section.details {
                let _ = writeln!(out, "  {detail}: [{}, {}]", span.start, span.end);
            }
        }
        out.push_str("---");
        out
    }

    /// Renders the index as pretty-printed JSON.
    ///
    /// # Errors
    /// Returns a serialization error if encoding fails.
    pub fn render_json(&self) -> crate::Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| crate::error::ScribeError::Serialization {
            context: "Failed to serialize schema index".to_string(),
            source: e,
        })
    }
}
