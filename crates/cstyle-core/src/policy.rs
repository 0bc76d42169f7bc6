//! Check vocabulary, severity levels, and the per-exercise severity policy.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;

/// Severity assigned to a check.
///
/// `Error` and `NotPermitted` are fatal: any diagnostic at those levels fails
/// the file. `Warning` and `NotRecommended` are advisory only. A check whose
/// severity is `Disabled` is never evaluated.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Check is not run at all.
    #[default]
    Disabled,
    /// Advisory warning.
    Warning,
    /// Advisory warning tagged "not recommended".
    NotRecommended,
    /// Fatal error.
    Error,
    /// Fatal error tagged "not permitted".
    NotPermitted,
}

impl Severity {
    /// True iff a diagnostic at this level fails the file.
    #[must_use]
    pub fn is_fatal(self) -> bool {
        matches!(self, Self::Error | Self::NotPermitted)
    }

    /// The prefix printed before the message: the tagged levels render under
    /// their plain counterparts, with the tag appended to the message.
    #[must_use]
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::Warning | Self::NotRecommended => "warning",
            Self::Error | Self::NotPermitted => "error",
        }
    }

    /// The "this is ..." tag for the tagged levels.
    #[must_use]
    pub fn tag(self) -> Option<&'static str> {
        match self {
            Self::NotRecommended => Some("not recommended"),
            Self::NotPermitted => Some("not permitted"),
            _ => None,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Disabled => "disabled",
            Self::Warning => "warning",
            Self::NotRecommended => "not_recommended",
            Self::Error => "error",
            Self::NotPermitted => "not_permitted",
        };
        write!(f, "{s}")
    }
}

/// The stable checker-name vocabulary.
///
/// These names are external interface (CLI flags and config keys) and must
/// not be renamed without a migration note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum CheckName {
    Array,
    Break,
    Comma,
    Continue,
    DoWhile,
    GlobalVariable,
    Goto,
    MultipleMalloc,
    NonCharArray,
    StaticLocalVariable,
    StringLibrary,
    Switch,
    Ternary,
    Union,
    UnistdLibrary,
    AssignGetcharChar,
    Indenting,
    IntegerAsciiCode,
}

impl CheckName {
    /// Every check, in vocabulary order.
    pub const ALL: [CheckName; 18] = [
        Self::Array,
        Self::Break,
        Self::Comma,
        Self::Continue,
        Self::DoWhile,
        Self::GlobalVariable,
        Self::Goto,
        Self::MultipleMalloc,
        Self::NonCharArray,
        Self::StaticLocalVariable,
        Self::StringLibrary,
        Self::Switch,
        Self::Ternary,
        Self::Union,
        Self::UnistdLibrary,
        Self::AssignGetcharChar,
        Self::Indenting,
        Self::IntegerAsciiCode,
    ];

    /// The stable snake_case name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Array => "array",
            Self::Break => "break",
            Self::Comma => "comma",
            Self::Continue => "continue",
            Self::DoWhile => "do_while",
            Self::GlobalVariable => "global_variable",
            Self::Goto => "goto",
            Self::MultipleMalloc => "multiple_malloc",
            Self::NonCharArray => "non_char_array",
            Self::StaticLocalVariable => "static_local_variable",
            Self::StringLibrary => "string_library",
            Self::Switch => "switch",
            Self::Ternary => "ternary",
            Self::Union => "union",
            Self::UnistdLibrary => "unistd_library",
            Self::AssignGetcharChar => "assign_getchar_char",
            Self::Indenting => "indenting",
            Self::IntegerAsciiCode => "integer_ascii_code",
        }
    }

    fn valid_names() -> String {
        Self::ALL
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl std::fmt::Display for CheckName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CheckName {
    type Err = PolicyError;

    /// Accepts `-` in place of `_` (CLI convention).
    fn from_str(s: &str) -> Result<Self, PolicyError> {
        let normalized = s.trim().replace('-', "_");
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| PolicyError::unknown_check(s))
    }
}

/// Errors raised while assembling a [`Policy`].
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    /// A check name outside the vocabulary.
    #[error("invalid checker: '{name}'\nvalid checks are: {valid}")]
    UnknownCheck {
        /// The offending name as given.
        name: String,
        /// Space-separated vocabulary listing.
        valid: String,
    },

    /// IO error reading a policy file.
    #[error("failed to read policy file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in a policy file.
    #[error("failed to parse policy: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },
}

impl PolicyError {
    fn unknown_check(name: &str) -> Self {
        Self::UnknownCheck {
            name: name.trim().to_string(),
            valid: CheckName::valid_names(),
        }
    }
}

/// Severity policy plus report texts for one exercise.
#[derive(Debug, Clone)]
pub struct Policy {
    severities: HashMap<CheckName, Severity>,
    /// Text appended to tagged messages indicating where the construct is
    /// not permitted or recommended (e.g. `"in COMP1511"`).
    pub where_text: Option<String>,
    /// Text printed once when a not-permitted/not-recommended construct was
    /// found (e.g. a pointer to the style guide).
    pub extra_text: Option<String>,
    /// Text appended when tabs and spaces are mixed.
    pub mixed_indenting_text: Option<String>,
    /// Whether incorrect indentation is shown as a highlighted listing.
    pub highlight_indenting: bool,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            severities: HashMap::new(),
            where_text: None,
            extra_text: None,
            mixed_indenting_text: None,
            highlight_indenting: true,
        }
    }
}

impl Policy {
    /// Creates a policy with every check disabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets one check's severity.
    pub fn set(&mut self, check: CheckName, severity: Severity) {
        self.severities.insert(check, severity);
    }

    /// Severity of a check; unset means [`Severity::Disabled`].
    #[must_use]
    pub fn severity(&self, check: CheckName) -> Severity {
        self.severities.get(&check).copied().unwrap_or_default()
    }

    /// True iff the check should be evaluated at all.
    #[must_use]
    pub fn enabled(&self, check: CheckName) -> bool {
        self.severity(check) != Severity::Disabled
    }

    /// Applies one severity to a comma-separated list of check names.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::UnknownCheck`] for names outside the
    /// vocabulary, listing the valid names.
    pub fn apply_list(&mut self, list: &str, severity: Severity) -> Result<(), PolicyError> {
        for raw in list.split(',') {
            if raw.trim().is_empty() {
                continue;
            }
            let check = raw.parse::<CheckName>()?;
            self.set(check, severity);
        }
        Ok(())
    }

    /// Loads a policy from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or names an
    /// unknown check or severity.
    pub fn from_file(path: &std::path::Path) -> Result<Self, PolicyError> {
        let content = std::fs::read_to_string(path).map_err(|e| PolicyError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses a policy from a TOML string.
    ///
    /// ```toml
    /// where_text = "in COMP1511"
    ///
    /// [checks]
    /// goto = "not_permitted"
    /// indenting = "warning"
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error for invalid TOML, unknown check names, or unknown
    /// severity values.
    pub fn parse(content: &str) -> Result<Self, PolicyError> {
        let file: PolicyFile = toml::from_str(content).map_err(|e| PolicyError::Parse {
            message: e.to_string(),
        })?;

        let mut policy = Policy {
            where_text: file.where_text,
            extra_text: file.extra_text,
            mixed_indenting_text: file.mixed_indenting_text,
            highlight_indenting: file.highlight_indenting.unwrap_or(true),
            ..Policy::default()
        };
        // String keys so an unknown name reports the vocabulary, not a bare
        // serde variant error.
        for (name, severity) in file.checks {
            let check = name.parse::<CheckName>()?;
            policy.set(check, severity);
        }
        Ok(policy)
    }
}

/// On-disk TOML form of a [`Policy`].
#[derive(Debug, Default, Deserialize)]
struct PolicyFile {
    #[serde(default)]
    where_text: Option<String>,
    #[serde(default)]
    extra_text: Option<String>,
    #[serde(default)]
    mixed_indenting_text: Option<String>,
    #[serde(default)]
    highlight_indenting: Option<bool>,
    #[serde(default)]
    checks: HashMap<String, Severity>,
}
