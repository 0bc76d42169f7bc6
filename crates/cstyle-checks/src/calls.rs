//! Checks over call expressions and library identifier references.

use std::path::Path;

use cstyle_core::{CheckName, FileContext, Finding, NodeCheck, NodeKind, NodeVisit};

const ALLOCATION_FUNCTIONS: [&str; 3] = ["malloc", "calloc", "realloc"];

/// Flags the second and subsequent allocation calls in a file, for exercises
/// that permit exactly one allocation site.
#[derive(Debug, Clone, Default)]
pub struct MultipleMalloc {
    calls: u32,
}

impl NodeCheck for MultipleMalloc {
    fn name(&self) -> CheckName {
        CheckName::MultipleMalloc
    }

    fn code(&self) -> &'static str {
        "CS008"
    }

    fn description(&self) -> &'static str {
        "check if malloc is called in more than one location (for exercises where this is not permitted)"
    }

    fn begin_file(&mut self) {
        self.calls = 0;
    }

    fn inspect(&mut self, ctx: &FileContext<'_>, visit: &NodeVisit) -> Option<Finding> {
        let node = ctx.tree.node(visit.id);
        if node.kind != NodeKind::CallExpr
            || !ALLOCATION_FUNCTIONS.contains(&node.name.as_str())
        {
            return None;
        }
        self.calls += 1;
        (self.calls > 1).then(|| Finding::new(visit.id, "malloc called"))
    }
}

/// Flags identifier references that resolve to a declaration in one specific
/// system header.
#[derive(Debug, Clone)]
pub struct LibraryUse {
    name: CheckName,
    code: &'static str,
    description: &'static str,
    header: &'static str,
    message: &'static str,
}

impl LibraryUse {
    /// Functions from `string.h`.
    #[must_use]
    pub fn string_library() -> Self {
        Self {
            name: CheckName::StringLibrary,
            code: "CS011",
            description: "check for functions from string.h (for exercises where this is not permitted)",
            header: "/usr/include/string.h",
            message: "string.h used",
        }
    }

    /// Functions from `unistd.h`.
    #[must_use]
    pub fn unistd_library() -> Self {
        Self {
            name: CheckName::UnistdLibrary,
            code: "CS015",
            description: "check for functions from unistd.h",
            header: "/usr/include/unistd.h",
            message: "unistd.h used",
        }
    }
}

impl NodeCheck for LibraryUse {
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
        let node = ctx.tree.node(visit.id);
        if node.kind != NodeKind::DeclRefExpr {
            return None;
        }
        let referenced = node.referenced.as_ref()?;
        let file = referenced.file.as_deref()?;
        (file == Path::new(self.header)).then(|| Finding::new(visit.id, self.message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cstyle_core::{walk, Ancestry, DeclRef, SyntaxNode, SyntaxTree, TreeBuilder};

    fn findings(check: &mut dyn NodeCheck, tree: &SyntaxTree) -> Vec<Finding> {
        let ancestry = Ancestry::compute(tree);
        let ctx = FileContext::new(Path::new("prog.c"), "", tree, &ancestry);
        check.begin_file();
        walk(tree)
            .filter_map(|visit| check.inspect(&ctx, &visit))
            .collect()
    }

    fn calls_tree(names: &[&str]) -> SyntaxTree {
        let mut b = TreeBuilder::new();
        let calls: Vec<_> = names
            .iter()
            .map(|name| {
                b.leaf(
                    SyntaxNode::new(NodeKind::CallExpr)
                        .with_name(*name)
                        .with_file("prog.c"),
                )
            })
            .collect();
        let root = b.add(
            SyntaxNode::new(NodeKind::TranslationUnit).with_file("prog.c"),
            calls,
        );
        b.build(root)
    }

    #[test]
    fn single_allocation_never_fires() {
        let tree = calls_tree(&["malloc", "printf"]);
        assert!(findings(&mut MultipleMalloc::default(), &tree).is_empty());
    }

    #[test]
    fn second_and_later_allocations_fire() {
        let tree = calls_tree(&["malloc", "calloc", "realloc"]);
        let found = findings(&mut MultipleMalloc::default(), &tree);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].message, "malloc called");
    }

    #[test]
    fn begin_file_resets_the_call_counter() {
        let tree = calls_tree(&["malloc"]);
        let mut check = MultipleMalloc::default();
        assert!(findings(&mut check, &tree).is_empty());
        // second file with one allocation must not see the first file's call
        assert!(findings(&mut check, &tree).is_empty());
    }

    fn reference_tree(header: Option<&str>) -> SyntaxTree {
        let mut b = TreeBuilder::new();
        let reference = b.leaf(
            SyntaxNode::new(NodeKind::DeclRefExpr)
                .with_name("strlen")
                .with_referenced(DeclRef {
                    decl_id: 7,
                    name: "strlen".to_string(),
                    file: header.map(Into::into),
                    ty: None,
                })
                .with_file("prog.c"),
        );
        let root = b.add(
            SyntaxNode::new(NodeKind::TranslationUnit).with_file("prog.c"),
            vec![reference],
        );
        b.build(root)
    }

    #[test]
    fn string_library_matches_the_exact_header_path() {
        let tree = reference_tree(Some("/usr/include/string.h"));
        let found = findings(&mut LibraryUse::string_library(), &tree);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].message, "string.h used");

        let tree = reference_tree(Some("/home/student/string.h"));
        assert!(findings(&mut LibraryUse::string_library(), &tree).is_empty());

        let tree = reference_tree(None);
        assert!(findings(&mut LibraryUse::string_library(), &tree).is_empty());
    }

    #[test]
    fn unistd_library_matches_its_own_header() {
        let tree = reference_tree(Some("/usr/include/unistd.h"));
        assert_eq!(findings(&mut LibraryUse::unistd_library(), &tree).len(), 1);
        assert!(findings(&mut LibraryUse::string_library(), &tree).is_empty());
    }
}
