//! Locates a table embedded in loosely-structured text.
//!
//! Both sources wrap their data in free-form prose: the hourly export has a
//! metadata header before the `YEAR,MO,DY,HR,...` row, the monthly report has
//! site information above and a yearly summary below its `Month ...` table.
//! [`TableExtractor`] scans line by line with an explicit state machine and
//! returns the non-blank lines of the first table it finds.

use std::sync::OnceLock;

use irradiance_core::error::{IrradianceError, Result};
use regex::Regex;
use tracing::debug;

// ── LineMarker ────────────────────────────────────────────────────────────────

/// A predicate over a single line of text.
#[derive(Debug, Clone)]
pub enum LineMarker {
    /// The line contains every one of the given substrings.
    ContainsAll(Vec<String>),
    /// The line, with surrounding whitespace removed, starts with the token.
    TrimmedStartsWith(String),
    /// The line matches the regular expression.
    Pattern(Regex),
}

impl LineMarker {
    pub fn matches(&self, line: &str) -> bool {
        match self {
            LineMarker::ContainsAll(tokens) => tokens.iter().all(|t| line.contains(t.as_str())),
            LineMarker::TrimmedStartsWith(token) => line.trim().starts_with(token.as_str()),
            LineMarker::Pattern(re) => re.is_match(line),
        }
    }
}

/// `^\s*Year\s`: the yearly summary row closing the monthly table.
fn year_row_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\s*Year\s").expect("regex is valid"))
}

// ── ExtractedTable ────────────────────────────────────────────────────────────

/// The lines of an extracted table, header first.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedTable {
    start_line: usize,
    lines: Vec<String>,
}

impl ExtractedTable {
    /// Zero-based line number of the header within the source text.
    pub fn start_line(&self) -> usize {
        self.start_line
    }

    pub fn header(&self) -> &str {
        self.lines.first().map_or("", String::as_str)
    }

    pub fn data_lines(&self) -> &[String] {
        self.lines.get(1..).unwrap_or_default()
    }

    /// The table re-joined with newlines, ready for a delimited reader.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

// ── TableExtractor ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Seeking,
    InTable,
    Done,
}

/// Marker-driven table scanner.
#[derive(Debug, Clone)]
pub struct TableExtractor {
    /// Human-readable description of the start marker, used in errors.
    description: String,
    start: LineMarker,
    end: Option<LineMarker>,
}

impl TableExtractor {
    pub fn new(description: impl Into<String>, start: LineMarker) -> Self {
        Self {
            description: description.into(),
            start,
            end: None,
        }
    }

    /// Stop the table just before the first line matching `end`.
    pub fn with_end(mut self, end: LineMarker) -> Self {
        self.end = Some(end);
        self
    }

    /// Hourly export: header contains `YEAR`, `MO`, `DY` and `HR`; the table
    /// runs to the end of the input.
    pub fn hourly() -> Self {
        let tokens = ["YEAR", "MO", "DY", "HR"].iter().map(|t| t.to_string()).collect();
        Self::new("YEAR,MO,DY,HR", LineMarker::ContainsAll(tokens))
    }

    /// Monthly report: header starts with `Month`; the table ends at the
    /// `Year ...` summary row.
    pub fn monthly() -> Self {
        Self::new(
            "Month H_Gh ...",
            LineMarker::TrimmedStartsWith("Month".to_string()),
        )
        .with_end(LineMarker::Pattern(year_row_pattern().clone()))
    }

    /// Extract the first table from `text`.
    ///
    /// Blank lines inside the table are skipped without ending it.
    ///
    /// # Errors
    /// - [`IrradianceError::HeaderNotFound`] when no line matches the start marker.
    /// - [`IrradianceError::EmptyTable`] when the header has no data lines.
    pub fn extract(&self, text: &str) -> Result<ExtractedTable> {
        let mut state = ScanState::Seeking;
        let mut start_line = 0;
        let mut lines: Vec<String> = Vec::new();

        for (idx, line) in text.lines().enumerate() {
            state = match state {
                ScanState::Seeking if self.start.matches(line) => {
                    start_line = idx;
                    lines.push(line.to_string());
                    ScanState::InTable
                }
                ScanState::Seeking => ScanState::Seeking,
                ScanState::InTable if self.is_end(line) => ScanState::Done,
                ScanState::InTable => {
                    if !line.trim().is_empty() {
                        lines.push(line.to_string());
                    }
                    ScanState::InTable
                }
                ScanState::Done => break,
            };
        }

        if state == ScanState::Seeking {
            return Err(IrradianceError::HeaderNotFound(self.description.clone()));
        }
        if lines.len() < 2 {
            return Err(IrradianceError::EmptyTable);
        }

        debug!(
            "Extracted table '{}' at line {} with {} data lines",
            self.description,
            start_line + 1,
            lines.len() - 1
        );

        Ok(ExtractedTable { start_line, lines })
    }

    fn is_end(&self, line: &str) -> bool {
        self.end.as_ref().is_some_and(|end| end.matches(line))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
