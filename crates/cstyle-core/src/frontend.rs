//! The narrow seam to the external C front end.
//!
//! The core consumes a finished, already-parsed translation unit; parsing C
//! is someone else's job. Any conforming front end (or a test fixture)
//! implements [`Frontend`] and supplies a [`SyntaxTree`] plus whatever
//! diagnostics parsing produced.

use std::path::{Path, PathBuf};

use crate::tree::SyntaxTree;

/// Severity of a parse-time diagnostic, as reported by the front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ParseSeverity {
    /// Informational note.
    Note,
    /// Non-fatal warning.
    Warning,
    /// Error: the file is treated as failed and checks are skipped.
    Error,
    /// Fatal error.
    Fatal,
}

impl ParseSeverity {
    /// True iff checks must be skipped and the file recorded as failed.
    #[must_use]
    pub fn is_fatal(self) -> bool {
        matches!(self, Self::Error | Self::Fatal)
    }
}

/// One parse-time diagnostic.
#[derive(Debug, Clone)]
pub struct ParseDiagnostic {
    /// Severity assigned by the front end.
    pub severity: ParseSeverity,
    /// Pre-formatted message, including any location prefix.
    pub message: String,
}

/// A successfully loaded translation unit.
#[derive(Debug)]
pub struct ParseOutcome {
    /// The syntax tree for the primary file (headers included as pruned
    /// subtrees).
    pub tree: SyntaxTree,
    /// Parse-time diagnostics, in emission order.
    pub diagnostics: Vec<ParseDiagnostic>,
}

/// Errors from the front end that prevent any analysis.
#[derive(Debug, thiserror::Error)]
pub enum FrontendError {
    /// The front end itself could not be located or started.
    #[error("C front end unavailable: {0}")]
    Unavailable(String),

    /// The translation unit could not be loaded at all.
    #[error("failed to parse {path}: {message}")]
    Parse {
        /// File that failed.
        path: PathBuf,
        /// Front-end error message.
        message: String,
    },
}

/// A C front end: parses one file into a [`ParseOutcome`].
///
/// The single parse call is the only potentially slow operation in a file's
/// analysis and is treated as blocking with no cancellation.
pub trait Frontend {
    /// Parses `path`. `source` is the file's raw text, already read by the
    /// caller (front ends that reread from disk may ignore it).
    ///
    /// # Errors
    ///
    /// Returns [`FrontendError`] when no tree could be produced at all;
    /// recoverable problems are reported as [`ParseDiagnostic`]s instead.
    fn parse(&self, path: &Path, source: &str) -> Result<ParseOutcome, FrontendError>;
}
