//! Diagnostic records and per-file results.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::policy::{CheckName, Severity};

/// Source location of a diagnostic. Line 0 means the diagnostic is scoped to
/// the whole file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// File the diagnostic applies to.
    pub file: PathBuf,
    /// Line number (1-indexed; 0 = file-scoped).
    pub line: u32,
    /// Column number (1-indexed; 0 = unknown).
    pub column: u32,
}

impl Location {
    /// Creates a location.
    #[must_use]
    pub fn new(file: impl Into<PathBuf>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }

    /// A file-scoped location with no line information.
    #[must_use]
    pub fn file_scope(file: impl Into<PathBuf>) -> Self {
        Self::new(file, 0, 0)
    }
}

/// One line of an indentation listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShownLine {
    /// 1-indexed line number.
    pub number: u32,
    /// The source line text.
    pub text: String,
    /// Indent verdict; `None` for context lines shown only for continuity.
    pub mark: Option<IndentMark>,
}

/// Indent verdict for a listed line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndentMark {
    /// The expected indentation in columns.
    pub correct_indent: u32,
    /// Whether the line's actual indentation matches.
    pub correct: bool,
}

/// Optional structured payload rendered under a diagnostic's message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Detail {
    /// No payload.
    #[default]
    None,
    /// Two-line source excerpt: the offending line, then a caret/tilde
    /// underline spanning the extent's columns.
    Excerpt {
        /// The source line text.
        line: String,
        /// First underlined column (1-indexed).
        start_column: u32,
        /// One past the last underlined column.
        end_column: u32,
    },
    /// Highlighted indentation listing.
    IndentListing(Vec<ShownLine>),
    /// Plain extra lines (non-highlighted indent reports).
    PlainLines(Vec<String>),
}

/// A single finding rendered to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The check that fired.
    pub check: CheckName,
    /// Configured severity the check fired at.
    pub severity: Severity,
    /// Primary location.
    pub location: Location,
    /// Human-readable message.
    pub message: String,
    /// Optional structured payload.
    #[serde(default, skip_serializing_if = "Detail::is_none")]
    pub detail: Detail,
}

impl Detail {
    /// True for [`Detail::None`].
    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl Diagnostic {
    /// Creates a diagnostic with no payload.
    #[must_use]
    pub fn new(
        check: CheckName,
        severity: Severity,
        location: Location,
        message: impl Into<String>,
    ) -> Self {
        Self {
            check,
            severity,
            location,
            message: message.into(),
            detail: Detail::None,
        }
    }

    /// Attaches a payload.
    #[must_use]
    pub fn with_detail(mut self, detail: Detail) -> Self {
        self.detail = detail;
        self
    }
}

/// Result of checking one file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    /// The file checked.
    pub path: PathBuf,
    /// Every diagnostic that fired, in evaluation order.
    pub diagnostics: Vec<Diagnostic>,
    /// False iff any fatal-severity diagnostic fired (or parsing failed).
    pub passed: bool,
}

impl FileReport {
    /// Creates an empty, passing report.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            diagnostics: Vec::new(),
            passed: true,
        }
    }

    /// True iff any diagnostic fired at the given severity.
    #[must_use]
    pub fn fired(&self, severity: Severity) -> bool {
        self.diagnostics.iter().any(|d| d.severity == severity)
    }

    /// True iff any fatal diagnostic fired.
    #[must_use]
    pub fn has_fatal(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity.is_fatal())
    }
}
