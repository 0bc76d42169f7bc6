//! Checks over variable declarations: arrays, globals, and static locals.

use cstyle_core::{
    CheckName, FileContext, Finding, NodeCheck, NodeKind, NodeVisit, StorageClass, TypeInfo,
};

/// Flags any array declaration, for exercises where arrays are not allowed.
#[derive(Debug, Clone, Default)]
pub struct ArrayDecl;

impl NodeCheck for ArrayDecl {
    fn name(&self) -> CheckName {
        CheckName::Array
    }

    fn code(&self) -> &'static str {
        "CS001"
    }

    fn description(&self) -> &'static str {
        "check if an array is used (for exercises where arrays are not permitted)"
    }

    fn inspect(&mut self, ctx: &FileContext<'_>, visit: &NodeVisit) -> Option<Finding> {
        let node = ctx.tree.node(visit.id);
        (node.kind == NodeKind::VarDecl && node.ty.as_ref().is_some_and(TypeInfo::is_array))
            .then(|| Finding::new(visit.id, "array used"))
    }
}

/// Flags array declarations whose element type is not a character type.
#[derive(Debug, Clone, Default)]
pub struct NonCharArray;

impl NodeCheck for NonCharArray {
    fn name(&self) -> CheckName {
        CheckName::NonCharArray
    }

    fn code(&self) -> &'static str {
        "CS009"
    }

    fn description(&self) -> &'static str {
        "check for arrays other than char arrays (for exercises where this is not permitted)"
    }

    fn inspect(&mut self, ctx: &FileContext<'_>, visit: &NodeVisit) -> Option<Finding> {
        let node = ctx.tree.node(visit.id);
        let typed = node
            .ty
            .as_ref()
            .is_some_and(|ty| ty.is_array() && !ty.mentions_char());
        (node.kind == NodeKind::VarDecl && typed)
            .then(|| Finding::new(visit.id, "non-char array used"))
    }
}

/// A declaration whose name mentions "debug" is deliberately exempt, so a
/// student can keep a debug-only global without failing the exercise. A
/// const qualifier at any level of the canonical type also exempts it.
fn exempt(node: &cstyle_core::SyntaxNode) -> bool {
    node.name.contains("debug")
        || node
            .ty
            .as_ref()
            .is_some_and(|ty| ty.canonical.is_const_anywhere())
}

/// Flags mutable variables declared at file scope.
#[derive(Debug, Clone, Default)]
pub struct GlobalVariable;

impl NodeCheck for GlobalVariable {
    fn name(&self) -> CheckName {
        CheckName::GlobalVariable
    }

    fn code(&self) -> &'static str {
        "CS006"
    }

    fn description(&self) -> &'static str {
        "check for global variables"
    }

    fn inspect(&mut self, ctx: &FileContext<'_>, visit: &NodeVisit) -> Option<Finding> {
        let node = ctx.tree.node(visit.id);
        if node.kind != NodeKind::VarDecl {
            return None;
        }
        let parent = visit.parent?;
        if ctx.tree.kind(parent) != NodeKind::TranslationUnit || exempt(node) {
            return None;
        }
        Some(Finding::new(
            visit.id,
            format!("variable '{}' is a global variable", node.name),
        ))
    }
}

/// Flags mutable static variables declared inside functions.
#[derive(Debug, Clone, Default)]
pub struct StaticLocalVariable;

impl NodeCheck for StaticLocalVariable {
    fn name(&self) -> CheckName {
        CheckName::StaticLocalVariable
    }

    fn code(&self) -> &'static str {
        "CS010"
    }

    fn description(&self) -> &'static str {
        "check for static local variables"
    }

    fn inspect(&mut self, ctx: &FileContext<'_>, visit: &NodeVisit) -> Option<Finding> {
        let node = ctx.tree.node(visit.id);
        if node.kind != NodeKind::VarDecl || node.storage != StorageClass::Static {
            return None;
        }
        let parent = visit.parent?;
        if ctx.tree.kind(parent) == NodeKind::TranslationUnit || exempt(node) {
            return None;
        }
        Some(Finding::new(
            visit.id,
            format!("variable '{}' is a static variable", node.name),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cstyle_core::{walk, Ancestry, CanonType, SyntaxNode, SyntaxTree, TreeBuilder};
    use std::path::Path;

    fn findings(check: &mut dyn NodeCheck, tree: &SyntaxTree) -> Vec<Finding> {
        let ancestry = Ancestry::compute(tree);
        let ctx = FileContext::new(Path::new("prog.c"), "", tree, &ancestry);
        check.begin_file();
        walk(tree)
            .filter_map(|visit| check.inspect(&ctx, &visit))
            .collect()
    }

    fn file_scope_var(name: &str, ty: TypeInfo) -> SyntaxTree {
        let mut b = TreeBuilder::new();
        let var = b.leaf(
            SyntaxNode::new(NodeKind::VarDecl)
                .with_name(name)
                .with_type(ty)
                .with_file("prog.c"),
        );
        let root = b.add(
            SyntaxNode::new(NodeKind::TranslationUnit).with_file("prog.c"),
            vec![var],
        );
        b.build(root)
    }

    #[test]
    fn array_fires_on_bracketed_type_spelling() {
        let tree = file_scope_var("buffer", TypeInfo::named("char [10]"));
        assert_eq!(findings(&mut ArrayDecl, &tree).len(), 1);

        let tree = file_scope_var("count", TypeInfo::named("int"));
        assert!(findings(&mut ArrayDecl, &tree).is_empty());
    }

    #[test]
    fn non_char_array_ignores_char_arrays() {
        let tree = file_scope_var("values", TypeInfo::named("int [10]"));
        let found = findings(&mut NonCharArray, &tree);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].message, "non-char array used");

        let tree = file_scope_var("word", TypeInfo::named("char [10]"));
        assert!(findings(&mut NonCharArray, &tree).is_empty());

        let tree = file_scope_var("word", TypeInfo::named("unsigned char [10]"));
        assert!(findings(&mut NonCharArray, &tree).is_empty());
    }

    #[test]
    fn global_variable_fires_on_mutable_globals() {
        // int *p;
        let ty = TypeInfo::new("int *", CanonType::leaf().pointer_to());
        let tree = file_scope_var("p", ty);
        let found = findings(&mut GlobalVariable, &tree);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].message, "variable 'p' is a global variable");

        // char *p;
        let ty = TypeInfo::new("char *", CanonType::leaf().pointer_to());
        let tree = file_scope_var("p", ty);
        assert_eq!(findings(&mut GlobalVariable, &tree).len(), 1);
    }

    #[test]
    fn global_variable_exempts_const_types() {
        // const int x = 5;
        let ty = TypeInfo::new("const int", CanonType::const_leaf());
        let tree = file_scope_var("x", ty);
        assert!(findings(&mut GlobalVariable, &tree).is_empty());

        // const char *p;
        let ty = TypeInfo::new("const char *", CanonType::const_leaf().pointer_to());
        let tree = file_scope_var("p", ty);
        assert!(findings(&mut GlobalVariable, &tree).is_empty());
    }

    #[test]
    fn global_variable_exempts_debug_names() {
        let tree = file_scope_var("debug_level", TypeInfo::named("int"));
        assert!(findings(&mut GlobalVariable, &tree).is_empty());
    }

    fn local_var(storage: StorageClass) -> SyntaxTree {
        let mut b = TreeBuilder::new();
        let var = b.leaf(
            SyntaxNode::new(NodeKind::VarDecl)
                .with_name("counter")
                .with_type(TypeInfo::named("int"))
                .with_storage(storage)
                .with_file("prog.c"),
        );
        let decl_stmt = b.add(SyntaxNode::new(NodeKind::DeclStmt).with_file("prog.c"), vec![var]);
        let body = b.add(
            SyntaxNode::new(NodeKind::CompoundStmt).with_file("prog.c"),
            vec![decl_stmt],
        );
        let func = b.add(
            SyntaxNode::new(NodeKind::FunctionDecl)
                .with_name("main")
                .with_file("prog.c"),
            vec![body],
        );
        let root = b.add(
            SyntaxNode::new(NodeKind::TranslationUnit).with_file("prog.c"),
            vec![func],
        );
        b.build(root)
    }

    #[test]
    fn static_local_requires_static_storage_inside_a_function() {
        let tree = local_var(StorageClass::Static);
        let found = findings(&mut StaticLocalVariable, &tree);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].message, "variable 'counter' is a static variable");

        let tree = local_var(StorageClass::None);
        assert!(findings(&mut StaticLocalVariable, &tree).is_empty());
    }

    #[test]
    fn static_local_ignores_file_scope_statics() {
        let mut b = TreeBuilder::new();
        let var = b.leaf(
            SyntaxNode::new(NodeKind::VarDecl)
                .with_name("counter")
                .with_type(TypeInfo::named("int"))
                .with_storage(StorageClass::Static)
                .with_file("prog.c"),
        );
        let root = b.add(
            SyntaxNode::new(NodeKind::TranslationUnit).with_file("prog.c"),
            vec![var],
        );
        let tree = b.build(root);
        assert!(findings(&mut StaticLocalVariable, &tree).is_empty());
    }
}
