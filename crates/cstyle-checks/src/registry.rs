//! Static registry of every built-in check.
//!
//! The registry is the single place the name-to-implementation mapping
//! lives; the CLI resolves it once at startup and installs the boxed checks
//! into the engine.

use cstyle_core::{CheckName, FlowCheckBox, NodeCheckBox, SourcePassBox};

use crate::calls::{LibraryUse, MultipleMalloc};
use crate::char_flow::{AssignGetcharChar, IntegerAsciiCode};
use crate::constructs::{CommaOperator, KindCheck};
use crate::declarations::{ArrayDecl, GlobalVariable, NonCharArray, StaticLocalVariable};
use crate::indent::{BodyIndent, TabsSpaces};

/// Every structural check, in vocabulary order.
#[must_use]
pub fn node_checks() -> Vec<NodeCheckBox> {
    vec![
        Box::new(ArrayDecl),
        Box::new(KindCheck::break_stmt()),
        Box::new(CommaOperator),
        Box::new(KindCheck::continue_stmt()),
        Box::new(KindCheck::do_while()),
        Box::new(GlobalVariable),
        Box::new(KindCheck::goto_stmt()),
        Box::new(MultipleMalloc::default()),
        Box::new(NonCharArray),
        Box::new(StaticLocalVariable),
        Box::new(LibraryUse::string_library()),
        Box::new(KindCheck::switch_stmt()),
        Box::new(KindCheck::ternary()),
        Box::new(KindCheck::union_decl()),
        Box::new(LibraryUse::unistd_library()),
    ]
}

/// Every data-flow check.
#[must_use]
pub fn flow_checks() -> Vec<FlowCheckBox> {
    vec![
        Box::new(AssignGetcharChar),
        Box::new(IntegerAsciiCode::default()),
    ]
}

/// Every whole-file source pass, in execution order.
#[must_use]
pub fn source_passes() -> Vec<SourcePassBox> {
    vec![Box::new(TabsSpaces), Box::new(BodyIndent)]
}

/// One `(code, name, description)` row per check name, for listings. The
/// two indentation passes share a name and collapse to one row.
#[must_use]
pub fn catalog() -> Vec<(&'static str, CheckName, &'static str)> {
    let mut rows: Vec<(&'static str, CheckName, &'static str)> = Vec::new();
    for check in node_checks() {
        rows.push((check.code(), check.name(), check.description()));
    }
    for check in flow_checks() {
        rows.push((check.code(), check.name(), check.description()));
    }
    for pass in source_passes() {
        if rows.iter().all(|&(_, name, _)| name != pass.name()) {
            rows.push((pass.code(), pass.name(), pass.description()));
        }
    }
    rows.sort_by_key(|&(code, ..)| code);
    rows
}
