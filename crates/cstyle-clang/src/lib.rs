//! # cstyle-clang
//!
//! Clang front end for cstyle.
//!
//! Runs `clang -fsyntax-only -Xclang -ast-dump=json` on a file and converts
//! the JSON dump into the [`SyntaxTree`](cstyle_core::SyntaxTree) the checks
//! consume. Parse-time diagnostics are recovered from clang's stderr.
//!
//! ## Usage
//!
//! ```ignore
//! use cstyle_clang::ClangFrontend;
//!
//! let frontend = ClangFrontend::discover(vec![])?;
//! let outcome = frontend.parse(Path::new("prog.c"), &source)?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod ast_json;

use std::path::{Path, PathBuf};
use std::process::Command;

use cstyle_core::{Frontend, FrontendError, ParseDiagnostic, ParseOutcome, ParseSeverity};
use tracing::debug;

/// Errors locating the clang installation.
#[derive(Debug, thiserror::Error)]
pub enum ClangError {
    /// The `clang` binary could not be run at all.
    #[error("could not run 'clang': {0}")]
    NotFound(#[source] std::io::Error),

    /// `clang -print-resource-dir` failed.
    #[error("clang -print-resource-dir failed: {0}")]
    ResourceDir(String),
}

/// A [`Frontend`] backed by the system clang.
#[derive(Debug)]
pub struct ClangFrontend {
    clang: PathBuf,
    include_dirs: Vec<PathBuf>,
    resource_include: Option<PathBuf>,
}

impl ClangFrontend {
    /// Locates clang on `PATH` and its compiler-internal header directory.
    ///
    /// `include_dirs` are extra `-I` directories passed through to every
    /// parse.
    ///
    /// # Errors
    ///
    /// Returns [`ClangError`] when clang cannot be run or does not report a
    /// resource directory.
    pub fn discover(include_dirs: Vec<PathBuf>) -> Result<Self, ClangError> {
        let clang = PathBuf::from("clang");
        let output = Command::new(&clang)
            .arg("-print-resource-dir")
            .output()
            .map_err(ClangError::NotFound)?;
        if !output.status.success() {
            return Err(ClangError::ResourceDir(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        let resource_include = stdout
            .lines()
            .next()
            .map(|line| Path::new(line.trim()).join("include"));
        debug!(?resource_include, "located clang resource directory");
        Ok(Self {
            clang,
            include_dirs,
            resource_include,
        })
    }
}

impl Frontend for ClangFrontend {
    fn parse(&self, path: &Path, _source: &str) -> Result<ParseOutcome, FrontendError> {
        let mut cmd = Command::new(&self.clang);
        cmd.arg("-fsyntax-only")
            .arg("-Xclang")
            .arg("-ast-dump=json")
            // assert() expands to a ternary; keep it out of the tree
            .arg("-DNDEBUG");
        if let Some(include) = &self.resource_include {
            cmd.arg("-isystem").arg(include);
        }
        for dir in &self.include_dirs {
            cmd.arg("-I").arg(dir);
        }
        cmd.arg(path);
        debug!(?path, "invoking clang");

        let output = cmd
            .output()
            .map_err(|e| FrontendError::Unavailable(format!("failed to run clang: {e}")))?;
        let diagnostics = parse_diagnostics(&String::from_utf8_lossy(&output.stderr));
        let stdout = String::from_utf8_lossy(&output.stdout);

        let tree = if stdout.trim_start().starts_with('{') {
            ast_json::parse_translation_unit(&stdout, path).map_err(|e| FrontendError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?
        } else if diagnostics.iter().any(|d| d.severity.is_fatal()) {
            // clang refused to dump a tree; the fatal diagnostics carry the
            // story and the engine will skip the checks
            ast_json::empty_tree(path)
        } else {
            return Err(FrontendError::Parse {
                path: path.to_path_buf(),
                message: "clang produced no syntax tree".to_string(),
            });
        };
        Ok(ParseOutcome { tree, diagnostics })
    }
}

/// Extracts the diagnostic lines from clang's stderr. Source-context and
/// caret lines are dropped.
fn parse_diagnostics(stderr: &str) -> Vec<ParseDiagnostic> {
    stderr
        .lines()
        .filter_map(|line| {
            classify(line).map(|severity| ParseDiagnostic {
                severity,
                message: line.to_string(),
            })
        })
        .collect()
}

fn classify(line: &str) -> Option<ParseSeverity> {
    if line.contains(": fatal error:") {
        Some(ParseSeverity::Fatal)
    } else if line.contains(": error:") {
        Some(ParseSeverity::Error)
    } else if line.contains(": warning:") {
        Some(ParseSeverity::Warning)
    } else if line.contains(": note:") {
        Some(ParseSeverity::Note)
    } else {
        None
    }
}
