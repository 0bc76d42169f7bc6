//! Context handed to checks while one file is being analyzed.

use std::path::Path;

use crate::tree::SyntaxTree;
use crate::walker::Ancestry;

/// Everything a check may consult about the file under analysis: the path,
/// the raw source split into physical lines, the syntax tree, and the
/// derived ancestry annotations.
#[derive(Debug)]
pub struct FileContext<'a> {
    /// Path of the file being checked.
    pub path: &'a Path,
    /// Raw source text.
    pub source: &'a str,
    /// Physical lines of the source (index 0 is line 1).
    pub lines: Vec<&'a str>,
    /// The parsed syntax tree.
    pub tree: &'a SyntaxTree,
    /// Parent/depth annotations from the file-scoped walk.
    pub ancestry: &'a Ancestry,
}

impl<'a> FileContext<'a> {
    /// Creates a context, splitting the source into physical lines.
    #[must_use]
    pub fn new(
        path: &'a Path,
        source: &'a str,
        tree: &'a SyntaxTree,
        ancestry: &'a Ancestry,
    ) -> Self {
        Self {
            path,
            source,
            lines: source.lines().collect(),
            tree,
            ancestry,
        }
    }

    /// The 1-indexed physical line, if in range.
    #[must_use]
    pub fn line(&self, number: u32) -> Option<&'a str> {
        if number == 0 {
            return None;
        }
        self.lines.get(number as usize - 1).copied()
    }
}
