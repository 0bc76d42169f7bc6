//! Check traits: the seams between the engine and the check implementations.
//!
//! Three shapes of check exist, matching how they consume the file:
//!
//! - [`NodeCheck`]: inspects one node at a time during the single file-scoped
//!   walk (the structural checker set). May hold small per-file latched
//!   state (e.g. an allocation-call counter), reset via `begin_file`.
//! - [`FlowCheck`]: inspects nodes per function in traversal order, with
//!   state re-initialized at every function entry (the data-flow checker
//!   set).
//! - [`SourcePass`]: runs once over the whole file with access to raw source
//!   lines and the tree (the indentation analyzer), producing finished
//!   diagnostics.
//!
//! Every check is a total function over its inputs: it returns no finding
//! for any input shape it does not recognize, and never panics.

use crate::context::FileContext;
use crate::policy::{CheckName, Policy};
use crate::tree::NodeId;
use crate::types::Diagnostic;
use crate::walker::NodeVisit;

/// A raw finding: the originating node plus a message. The engine attaches
/// the configured severity, location, and excerpt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    /// Node the finding originates from.
    pub node: NodeId,
    /// Human-readable message.
    pub message: String,
}

impl Finding {
    /// Creates a finding.
    #[must_use]
    pub fn new(node: NodeId, message: impl Into<String>) -> Self {
        Self {
            node,
            message: message.into(),
        }
    }
}

/// A per-node structural check.
pub trait NodeCheck {
    /// The stable name this check is configured under.
    fn name(&self) -> CheckName;

    /// Short code for listings (e.g. "CS007").
    fn code(&self) -> &'static str;

    /// One-line description for `list-checks`.
    fn description(&self) -> &'static str;

    /// Resets per-file latched state. Called once before each file's walk.
    fn begin_file(&mut self) {}

    /// Inspects a single visited node. At most one finding per (node, check).
    fn inspect(&mut self, ctx: &FileContext<'_>, visit: &NodeVisit) -> Option<Finding>;
}

/// Boxed [`NodeCheck`].
pub type NodeCheckBox = Box<dyn NodeCheck>;

/// A per-function data-flow check.
pub trait FlowCheck {
    /// The stable name this check is configured under.
    fn name(&self) -> CheckName;

    /// Short code for listings.
    fn code(&self) -> &'static str;

    /// One-line description for `list-checks`.
    fn description(&self) -> &'static str;

    /// Re-initializes per-function state. Called at every function entry.
    fn enter_function(&mut self, _ctx: &FileContext<'_>, _function: NodeId) {}

    /// Inspects one node of the current function, in traversal order (which
    /// for straight-line code matches execution order).
    fn inspect(&mut self, ctx: &FileContext<'_>, visit: &NodeVisit) -> Option<Finding>;
}

/// Boxed [`FlowCheck`].
pub type FlowCheckBox = Box<dyn FlowCheck>;

/// A whole-file pass over raw source lines and the tree.
pub trait SourcePass {
    /// The stable name this pass is configured under.
    fn name(&self) -> CheckName;

    /// Short code for listings.
    fn code(&self) -> &'static str;

    /// One-line description for `list-checks`.
    fn description(&self) -> &'static str;

    /// Runs the pass, producing finished diagnostics.
    fn run(&mut self, ctx: &FileContext<'_>, policy: &Policy) -> Vec<Diagnostic>;
}

/// Boxed [`SourcePass`].
pub type SourcePassBox = Box<dyn SourcePass>;
