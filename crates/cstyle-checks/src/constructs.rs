//! Checks that fire on a statement or expression kind alone.
//!
//! Seven constructs are flagged purely by node kind (break, continue,
//! do-while, goto, switch, the ternary operator, and union declarations);
//! they share one implementation parameterized by kind and message. The
//! comma operator needs one extra step because the front end does not
//! distinguish it from other binary operators: the operator spelling is
//! recovered from the token located between the two operand extents.

use cstyle_core::{CheckName, FileContext, Finding, NodeCheck, NodeKind, NodeVisit};

/// A check that fires whenever a node of one particular kind is visited.
#[derive(Debug, Clone)]
pub struct KindCheck {
    name: CheckName,
    code: &'static str,
    description: &'static str,
    kind: NodeKind,
    construct: &'static str,
}

impl KindCheck {
    /// `break` statements.
    #[must_use]
    pub fn break_stmt() -> Self {
        Self {
            name: CheckName::Break,
            code: "CS002",
            description: "check if break is used",
            kind: NodeKind::BreakStmt,
            construct: "break statement",
        }
    }

    /// `continue` statements.
    #[must_use]
    pub fn continue_stmt() -> Self {
        Self {
            name: CheckName::Continue,
            code: "CS004",
            description: "check if continue is used",
            kind: NodeKind::ContinueStmt,
            construct: "continue statement",
        }
    }

    /// `do while` loops.
    #[must_use]
    pub fn do_while() -> Self {
        Self {
            name: CheckName::DoWhile,
            code: "CS005",
            description: "check if do while is used",
            kind: NodeKind::DoStmt,
            construct: "do while statement",
        }
    }

    /// `goto` statements.
    #[must_use]
    pub fn goto_stmt() -> Self {
        Self {
            name: CheckName::Goto,
            code: "CS007",
            description: "check if goto is used",
            kind: NodeKind::GotoStmt,
            construct: "goto statement",
        }
    }

    /// `switch` statements.
    #[must_use]
    pub fn switch_stmt() -> Self {
        Self {
            name: CheckName::Switch,
            code: "CS012",
            description: "check if switch is used",
            kind: NodeKind::SwitchStmt,
            construct: "switch statement",
        }
    }

    /// The `?:` operator.
    #[must_use]
    pub fn ternary() -> Self {
        Self {
            name: CheckName::Ternary,
            code: "CS013",
            description: "check for the ?: operator",
            kind: NodeKind::ConditionalOperator,
            construct: "ternary 'if' ?:",
        }
    }

    /// `union` declarations.
    #[must_use]
    pub fn union_decl() -> Self {
        Self {
            name: CheckName::Union,
            code: "CS014",
            description: "check if union is used",
            kind: NodeKind::UnionDecl,
            construct: "union",
        }
    }
}

impl NodeCheck for KindCheck {
    fn name(&self) -> CheckName {
        self.name
    }

    fn code(&self) -> &'static str {
        self.code
    }

    fn description(&self) -> &'static str {
        self.description
    }

    fn inspect(&mut self, ctx: &FileContext<'_>, visit: &NodeVisit) -> Option<Finding> {
        (ctx.tree.kind(visit.id) == self.kind)
            .then(|| Finding::new(visit.id, format!("{} used", self.construct)))
    }
}

/// Flags use of the comma operator.
#[derive(Debug, Clone, Default)]
pub struct CommaOperator;

impl NodeCheck for CommaOperator {
    fn name(&self) -> CheckName {
        CheckName::Comma
    }

    fn code(&self) -> &'static str {
        "CS003"
    }

    fn description(&self) -> &'static str {
        "check if the comma operator is used"
    }

    fn inspect(&mut self, ctx: &FileContext<'_>, visit: &NodeVisit) -> Option<Finding> {
        if ctx.tree.kind(visit.id) != NodeKind::BinaryOperator {
            return None;
        }
        (ctx.tree.operator(visit.id)? == ",")
            .then(|| Finding::new(visit.id, "comma operator used"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cstyle_core::{
        walk, Ancestry, Extent, SyntaxNode, SyntaxTree, Token, TreeBuilder,
    };
    use std::path::Path;

    fn findings(check: &mut dyn NodeCheck, tree: &SyntaxTree, source: &str) -> Vec<Finding> {
        let ancestry = Ancestry::compute(tree);
        let ctx = FileContext::new(Path::new("prog.c"), source, tree, &ancestry);
        check.begin_file();
        walk(tree)
            .filter_map(|visit| check.inspect(&ctx, &visit))
            .collect()
    }

    fn statement_tree(kind: NodeKind) -> SyntaxTree {
        let mut b = TreeBuilder::new();
        let stmt = b.leaf(
            SyntaxNode::new(kind)
                .with_file("prog.c")
                .with_extent(Extent::on_line(2, 5, 10)),
        );
        let root = b.add(
            SyntaxNode::new(NodeKind::TranslationUnit).with_file("prog.c"),
            vec![stmt],
        );
        b.build(root)
    }

    #[test]
    fn goto_fires_on_goto_statements_only() {
        let tree = statement_tree(NodeKind::GotoStmt);
        let found = findings(&mut KindCheck::goto_stmt(), &tree, "");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].message, "goto statement used");

        let tree = statement_tree(NodeKind::BreakStmt);
        assert!(findings(&mut KindCheck::goto_stmt(), &tree, "").is_empty());
    }

    #[test]
    fn ternary_fires_on_conditional_operator() {
        let tree = statement_tree(NodeKind::ConditionalOperator);
        let found = findings(&mut KindCheck::ternary(), &tree, "");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].message, "ternary 'if' ?: used");
    }

    fn binary_operator_tree(operator: &str) -> SyntaxTree {
        let mut b = TreeBuilder::new();
        let left = b.leaf(
            SyntaxNode::new(NodeKind::DeclRefExpr)
                .with_file("prog.c")
                .with_extent(Extent::on_line(1, 1, 2)),
        );
        let right = b.leaf(
            SyntaxNode::new(NodeKind::DeclRefExpr)
                .with_file("prog.c")
                .with_extent(Extent::on_line(1, 5, 6)),
        );
        let op_end = 3 + u32::try_from(operator.len()).unwrap();
        let op = b.add(
            SyntaxNode::new(NodeKind::BinaryOperator)
                .with_file("prog.c")
                .with_extent(Extent::on_line(1, 1, 6))
                .with_tokens(vec![
                    Token::new("a", Extent::on_line(1, 1, 2)),
                    Token::new(operator, Extent::on_line(1, 3, op_end)),
                    Token::new("b", Extent::on_line(1, 5, 6)),
                ]),
            vec![left, right],
        );
        let root = b.add(
            SyntaxNode::new(NodeKind::TranslationUnit).with_file("prog.c"),
            vec![op],
        );
        b.build(root)
    }

    #[test]
    fn comma_fires_only_on_comma_operator() {
        let tree = binary_operator_tree(",");
        let found = findings(&mut CommaOperator, &tree, "");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].message, "comma operator used");

        let tree = binary_operator_tree("+");
        assert!(findings(&mut CommaOperator, &tree, "").is_empty());
    }
}
