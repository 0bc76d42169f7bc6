//! Depth-first traversal of the nodes belonging to the file under analysis.
//!
//! The walk descends into a child only when the child's originating file
//! matches its parent's, so declarations pulled in by `#include` are pruned
//! together with their entire subtrees. Without this every check would also
//! fire on standard-library declarations.

use crate::tree::{NodeId, SyntaxTree};

/// One visited node together with its derived, non-owning ancestry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeVisit {
    /// The visited node.
    pub id: NodeId,
    /// Parent within the walk, `None` for the walk's starting node.
    pub parent: Option<NodeId>,
    /// Depth within the walk, 0 for the starting node.
    pub depth: usize,
}

/// Lazy pre-order walk. Restartable: each call to [`walk`] or [`walk_from`]
/// produces a fresh iterator over the same tree.
pub struct Walk<'t> {
    tree: &'t SyntaxTree,
    stack: Vec<NodeVisit>,
}

impl Iterator for Walk<'_> {
    type Item = NodeVisit;

    fn next(&mut self) -> Option<NodeVisit> {
        let visit = self.stack.pop()?;
        let node_file = &self.tree.node(visit.id).file;
        // Reverse push keeps document order; prune children from other files.
        for &child in self.tree.children(visit.id).iter().rev() {
            if self.tree.node(child).file == *node_file {
                self.stack.push(NodeVisit {
                    id: child,
                    parent: Some(visit.id),
                    depth: visit.depth + 1,
                });
            }
        }
        Some(visit)
    }
}

/// Walks the whole tree starting at the root.
#[must_use]
pub fn walk(tree: &SyntaxTree) -> Walk<'_> {
    walk_from(tree, tree.root())
}

/// Walks the subtree rooted at `start`, with `start` at depth 0.
#[must_use]
pub fn walk_from(tree: &SyntaxTree, start: NodeId) -> Walk<'_> {
    Walk {
        tree,
        stack: vec![NodeVisit {
            id: start,
            parent: None,
            depth: 0,
        }],
    }
}

/// Parent and depth annotations for every node reached by a full walk.
///
/// Checks that need ancestry ("is this declaration at file scope") query this
/// instead of mutating the tree; the back-references are plain ids, never
/// owning pointers.
#[derive(Debug)]
pub struct Ancestry {
    parent: Vec<Option<NodeId>>,
    depth: Vec<usize>,
}

impl Ancestry {
    /// Runs one full walk and records parent and depth per visited node.
    #[must_use]
    pub fn compute(tree: &SyntaxTree) -> Self {
        let mut parent = vec![None; tree.len()];
        let mut depth = vec![0; tree.len()];
        for visit in walk(tree) {
            parent[visit.id.index()] = visit.parent;
            depth[visit.id.index()] = visit.depth;
        }
        Self { parent, depth }
    }

    /// Parent of a node, `None` for the root or unvisited nodes.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parent.get(id.index()).copied().flatten()
    }

    /// Traversal depth of a node (0 for the root).
    #[must_use]
    pub fn depth(&self, id: NodeId) -> usize {
        self.depth.get(id.index()).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{NodeKind, SyntaxNode, TreeBuilder};

    fn two_level_tree() -> (SyntaxTree, NodeId, NodeId, NodeId) {
        let mut b = TreeBuilder::new();
        let inner = b.leaf(SyntaxNode::new(NodeKind::ReturnStmt).with_file("main.c"));
        let body = b.add(
            SyntaxNode::new(NodeKind::CompoundStmt).with_file("main.c"),
            vec![inner],
        );
        let root = b.add(
            SyntaxNode::new(NodeKind::TranslationUnit).with_file("main.c"),
            vec![body],
        );
        (b.build(root), root, body, inner)
    }

    #[test]
    fn walk_visits_in_document_order_with_depths() {
        let (tree, root, body, inner) = two_level_tree();
        let visits: Vec<NodeVisit> = walk(&tree).collect();
        assert_eq!(
            visits,
            vec![
                NodeVisit {
                    id: root,
                    parent: None,
                    depth: 0
                },
                NodeVisit {
                    id: body,
                    parent: Some(root),
                    depth: 1
                },
                NodeVisit {
                    id: inner,
                    parent: Some(body),
                    depth: 2
                },
            ]
        );
    }

    #[test]
    fn walk_prunes_included_header_subtrees() {
        let mut b = TreeBuilder::new();
        // A declaration nested under a header node: the whole subtree is cut.
        let header_inner = b.leaf(SyntaxNode::new(NodeKind::VarDecl).with_file("main.c"));
        let header_decl = b.add(
            SyntaxNode::new(NodeKind::FunctionDecl).with_file("/usr/include/stdio.h"),
            vec![header_inner],
        );
        let own_decl = b.leaf(SyntaxNode::new(NodeKind::VarDecl).with_file("main.c"));
        let root = b.add(
            SyntaxNode::new(NodeKind::TranslationUnit).with_file("main.c"),
            vec![header_decl, own_decl],
        );
        let tree = b.build(root);

        let visited: Vec<NodeId> = walk(&tree).map(|v| v.id).collect();
        assert_eq!(visited, vec![root, own_decl]);
    }

    #[test]
    fn ancestry_records_parents_for_scope_queries() {
        let (tree, root, body, inner) = two_level_tree();
        let ancestry = Ancestry::compute(&tree);
        assert_eq!(ancestry.parent(root), None);
        assert_eq!(ancestry.parent(body), Some(root));
        assert_eq!(ancestry.parent(inner), Some(body));
        assert_eq!(ancestry.depth(inner), 2);
    }

    #[test]
    fn walk_is_restartable() {
        let (tree, ..) = two_level_tree();
        let first: Vec<NodeId> = walk(&tree).map(|v| v.id).collect();
        let second: Vec<NodeId> = walk(&tree).map(|v| v.id).collect();
        assert_eq!(first, second);
    }
}
