//! Per-function data-flow checks around character input.
//!
//! Both checks follow statements in traversal order, which for the
//! straight-line code written in introductory exercises matches execution
//! order. They classify expressions only after seeing through parentheses
//! and implicit conversions.

use std::collections::HashSet;

use cstyle_core::{
    CheckName, DeclRef, FileContext, Finding, FlowCheck, NodeId, NodeKind, NodeVisit, SyntaxTree,
    TypeInfo,
};

const CHAR_INPUT_FUNCTIONS: [&str; 3] = ["getchar", "getc", "fgetc"];

/// The declaration a variable reference resolves to, if the expression is a
/// plain variable reference.
fn declared_variable(tree: &SyntaxTree, id: NodeId) -> Option<&DeclRef> {
    let node = tree.node(tree.unwrap_transparent(id));
    if node.kind != NodeKind::DeclRefExpr {
        return None;
    }
    node.referenced.as_ref()
}

/// The called function's name, if the expression is a call to one of the
/// char-input functions. These return int but produce character values.
fn char_input_call(tree: &SyntaxTree, id: NodeId) -> Option<&str> {
    let node = tree.node(tree.unwrap_transparent(id));
    (node.kind == NodeKind::CallExpr && CHAR_INPUT_FUNCTIONS.contains(&node.name.as_str()))
        .then_some(node.name.as_str())
}

/// Detects the result of `getchar`/`getc`/`fgetc` being stored in a `char`
/// variable, which silently loses the EOF sentinel.
#[derive(Debug, Clone, Default)]
pub struct AssignGetcharChar;

impl FlowCheck for AssignGetcharChar {
    fn name(&self) -> CheckName {
        CheckName::AssignGetcharChar
    }

    fn code(&self) -> &'static str {
        "CS016"
    }

    fn description(&self) -> &'static str {
        "check for getchar/getc/fgetc assigned to a char variable, e.g. char c = getchar()"
    }

    fn inspect(&mut self, ctx: &FileContext<'_>, visit: &NodeVisit) -> Option<Finding> {
        let tree = ctx.tree;
        let node = tree.node(visit.id);
        let (variable, ty, function) = match node.kind {
            NodeKind::BinaryOperator => {
                if tree.operator(visit.id)? != "=" {
                    return None;
                }
                let (left, right) = tree.binary_operands(visit.id)?;
                let decl = declared_variable(tree, left)?;
                let function = char_input_call(tree, right)?;
                (decl.name.as_str(), decl.ty.as_ref()?, function)
            }
            NodeKind::VarDecl => {
                let initializer = *tree.children(visit.id).first()?;
                let function = char_input_call(tree, initializer)?;
                (node.name.as_str(), node.ty.as_ref()?, function)
            }
            _ => return None,
        };
        if !ty.is_char() {
            return None;
        }
        Some(Finding::new(
            visit.id,
            format!(
                "return value of {function} assigned to char variable '{variable}', \
                 change the type of '{variable}' to int"
            ),
        ))
    }
}

/// Detects integer literals compared against char-valued expressions, e.g.
/// `c == 10` where `c` holds the result of `getchar`, suggesting the
/// character literal instead.
#[derive(Debug, Clone, Default)]
pub struct IntegerAsciiCode {
    tainted: HashSet<u64>,
}

impl IntegerAsciiCode {
    fn is_char_like(&self, tree: &SyntaxTree, id: NodeId) -> bool {
        let node = tree.node(tree.unwrap_transparent(id));
        if node.ty.as_ref().is_some_and(TypeInfo::is_char) {
            return true;
        }
        if char_input_call(tree, id).is_some() {
            return true;
        }
        node.kind == NodeKind::DeclRefExpr
            && node
                .referenced
                .as_ref()
                .is_some_and(|r| self.tainted.contains(&r.decl_id))
    }
}

impl FlowCheck for IntegerAsciiCode {
    fn name(&self) -> CheckName {
        CheckName::IntegerAsciiCode
    }

    fn code(&self) -> &'static str {
        "CS018"
    }

    fn description(&self) -> &'static str {
        "check integer constants are not used for ASCII codes, e.g. 10 instead of '\\n'"
    }

    fn enter_function(&mut self, _ctx: &FileContext<'_>, _function: NodeId) {
        self.tainted.clear();
    }

    fn inspect(&mut self, ctx: &FileContext<'_>, visit: &NodeVisit) -> Option<Finding> {
        let tree = ctx.tree;
        match tree.kind(visit.id) {
            NodeKind::VarDecl => {
                if let Some(&initializer) = tree.children(visit.id).first() {
                    if self.is_char_like(tree, initializer) {
                        self.tainted.insert(tree.node(visit.id).decl_id);
                    }
                }
                None
            }
            NodeKind::BinaryOperator => {
                let operator = tree.operator(visit.id)?;
                if operator == "=" {
                    let (left, right) = tree.binary_operands(visit.id)?;
                    if let Some(decl_id) = declared_variable(tree, left).map(|d| d.decl_id) {
                        if self.is_char_like(tree, right) {
                            self.tainted.insert(decl_id);
                        } else {
                            // reused for an unrelated value: stop tracking
                            self.tainted.remove(&decl_id);
                        }
                    }
                    return None;
                }
                if !matches!(operator, "==" | "!=" | "<=" | ">=" | "<" | ">") {
                    return None;
                }
                let children = tree.children(visit.id);
                let literal = children
                    .iter()
                    .copied()
                    .find(|&c| tree.kind(c) == NodeKind::IntegerLiteral)?;
                if !children.iter().any(|&c| self.is_char_like(tree, c)) {
                    return None;
                }
                let value: i64 = tree.node(literal).tokens.first()?.text.parse().ok()?;
                let suggestion = character_literal(value)?;
                Some(Finding::new(
                    literal,
                    format!("ASCII code {value} used, replace with {suggestion}"),
                ))
            }
            _ => None,
        }
    }
}

/// The C character literal for an ASCII code in the flagged ranges; `None`
/// outside them. Codes near 0 and above 126 stay unflagged so sentinels like
/// EOF and NUL comparisons are left alone.
fn character_literal(value: i64) -> Option<String> {
    if !((6 < value && value < 13) || (31 < value && value < 126)) {
        return None;
    }
    let ch = char::from(u8::try_from(value).ok()?);
    let escaped = match ch {
        '\t' => "\\t".to_string(),
        '\n' => "\\n".to_string(),
        '\r' => "\\r".to_string(),
        '\'' => "\\'".to_string(),
        '\\' => "\\\\".to_string(),
        c if c.is_ascii_graphic() || c == ' ' => c.to_string(),
        c => format!("\\x{:02x}", c as u32),
    };
    Some(format!("'{escaped}'"))
}
