//! # cstyle-core
//!
//! Core framework for style-checking introductory C programs.
//!
//! This crate provides the foundational traits and types the checkers are
//! built on. It includes:
//!
//! - [`SyntaxTree`] and [`walk`], the language-neutral tree model and the
//!   file-scoped traversal
//! - [`NodeCheck`], [`FlowCheck`], and [`SourcePass`] traits for the three
//!   shapes of check
//! - [`Policy`] mapping check names to severities
//! - [`Engine`] for orchestrating one file's analysis
//! - [`Reporter`] for rendering diagnostics
//!
//! ## Example
//!
//! ```ignore
//! use cstyle_core::{Engine, Policy};
//!
//! let mut engine = Engine::new(frontend, policy)
//!     .with_node_check(Box::new(GotoCheck));
//! let report = engine.check_file(path)?;
//! if !report.passed { /* ... */ }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod check;
mod context;
mod engine;
mod frontend;
mod policy;
mod report;
mod types;

/// The syntax tree model shared by front ends and checks.
pub mod tree;
/// File-scoped traversal and ancestry annotations.
pub mod walker;

pub use check::{Finding, FlowCheck, FlowCheckBox, NodeCheck, NodeCheckBox, SourcePass, SourcePassBox};
pub use context::FileContext;
pub use engine::{Engine, EngineError};
pub use frontend::{Frontend, FrontendError, ParseDiagnostic, ParseOutcome, ParseSeverity};
pub use policy::{CheckName, Policy, PolicyError, Severity};
pub use report::{excerpt_detail, Reporter, Role, Style};
pub use tree::{
    CanonType, DeclRef, Extent, NodeId, NodeKind, SourcePos, StorageClass, SyntaxNode, SyntaxTree,
    Token, TreeBuilder, TypeInfo,
};
pub use types::{Detail, Diagnostic, FileReport, IndentMark, Location, ShownLine};
pub use walker::{walk, walk_from, Ancestry, NodeVisit, Walk};
