//! Read-only syntax tree model supplied by an external C front end.
//!
//! The core never parses C itself. A [`Frontend`](crate::frontend::Frontend)
//! implementation (or a test) builds a [`SyntaxTree`] through [`TreeBuilder`],
//! and the checks consume it through [`SyntaxTree`] accessors. Nodes are
//! stored in an arena and addressed by [`NodeId`]; parent back-references are
//! derived during traversal and never owned by the tree itself.

use std::path::PathBuf;

/// Index of a node within its [`SyntaxTree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Returns the arena index of this id.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Kind tag of a syntax node.
///
/// Only the kinds the checks discriminate on are named; everything else the
/// front end produces maps to [`NodeKind::Other`] and is still traversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum NodeKind {
    TranslationUnit,
    FunctionDecl,
    VarDecl,
    ParmDecl,
    UnionDecl,
    CompoundStmt,
    IfStmt,
    WhileStmt,
    ForStmt,
    DoStmt,
    SwitchStmt,
    BreakStmt,
    ContinueStmt,
    GotoStmt,
    ReturnStmt,
    DeclStmt,
    BinaryOperator,
    CompoundAssignOperator,
    UnaryOperator,
    ConditionalOperator,
    CallExpr,
    DeclRefExpr,
    IntegerLiteral,
    CharacterLiteral,
    StringLiteral,
    ParenExpr,
    ImplicitCastExpr,
    InitListExpr,
    Other,
}

impl NodeKind {
    /// Transparent wrappers that checks see through before classifying an
    /// expression (parenthesization and implicit conversions).
    #[must_use]
    pub fn is_transparent(self) -> bool {
        matches!(self, Self::ParenExpr | Self::ImplicitCastExpr)
    }
}

/// Storage class of a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[allow(missing_docs)]
pub enum StorageClass {
    #[default]
    None,
    Static,
    Extern,
    Auto,
    Register,
}

/// A 1-indexed source position. Line or column 0 means "unknown".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct SourcePos {
    /// Line number, 1-indexed.
    pub line: u32,
    /// Column number, 1-indexed.
    pub column: u32,
}

impl SourcePos {
    /// Creates a position from line and column.
    #[must_use]
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// Source extent of a node or token.
///
/// The end column is exclusive: a three-character token starting at column 5
/// ends at column 8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Extent {
    /// First character of the extent.
    pub start: SourcePos,
    /// One past the last character of the extent.
    pub end: SourcePos,
}

impl Extent {
    /// Creates an extent from start and end positions.
    #[must_use]
    pub fn new(start: SourcePos, end: SourcePos) -> Self {
        Self { start, end }
    }

    /// Convenience constructor for a single-line extent.
    #[must_use]
    pub fn on_line(line: u32, start_column: u32, end_column: u32) -> Self {
        Self {
            start: SourcePos::new(line, start_column),
            end: SourcePos::new(line, end_column),
        }
    }
}

/// A single token within a node's extent, as supplied by the front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Token spelling.
    pub text: String,
    /// Token extent (end column exclusive).
    pub extent: Extent,
}

impl Token {
    /// Creates a token.
    #[must_use]
    pub fn new(text: impl Into<String>, extent: Extent) -> Self {
        Self {
            text: text.into(),
            extent,
        }
    }
}

/// Canonical shape of a declared type: a chain of pointer indirections over a
/// leaf, each level carrying its own const qualifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanonType {
    /// Pointer indirection.
    Pointer {
        /// Whether the pointer itself is const-qualified.
        is_const: bool,
        /// The pointed-to type.
        pointee: Box<CanonType>,
    },
    /// Any non-pointer type.
    Leaf {
        /// Whether the leaf type is const-qualified.
        is_const: bool,
    },
}

impl CanonType {
    /// A plain, unqualified non-pointer type.
    #[must_use]
    pub fn leaf() -> Self {
        Self::Leaf { is_const: false }
    }

    /// A const-qualified non-pointer type.
    #[must_use]
    pub fn const_leaf() -> Self {
        Self::Leaf { is_const: true }
    }

    /// Wraps this type in a (non-const) pointer.
    #[must_use]
    pub fn pointer_to(self) -> Self {
        Self::Pointer {
            is_const: false,
            pointee: Box::new(self),
        }
    }

    /// Returns true if a const qualifier appears at any level of the chain.
    #[must_use]
    pub fn is_const_anywhere(&self) -> bool {
        match self {
            Self::Leaf { is_const } => *is_const,
            Self::Pointer { is_const, pointee } => *is_const || pointee.is_const_anywhere(),
        }
    }
}

/// Declared-type descriptor: the textual spelling plus the canonical
/// const/pointer structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeInfo {
    /// Type spelling as written (e.g. `char [10]`, `const char *`).
    pub spelling: String,
    /// Canonical const/pointer chain.
    pub canonical: CanonType,
}

impl TypeInfo {
    /// Creates a type descriptor.
    #[must_use]
    pub fn new(spelling: impl Into<String>, canonical: CanonType) -> Self {
        Self {
            spelling: spelling.into(),
            canonical,
        }
    }

    /// Shorthand for a plain type known only by spelling.
    #[must_use]
    pub fn named(spelling: impl Into<String>) -> Self {
        Self::new(spelling, CanonType::leaf())
    }

    /// True iff the declared type is exactly the narrow `char` type.
    #[must_use]
    pub fn is_char(&self) -> bool {
        self.spelling == "char"
    }

    /// True iff the spelling carries an array-bracket marker.
    #[must_use]
    pub fn is_array(&self) -> bool {
        self.spelling.contains('[')
    }

    /// True iff the spelling mentions a character element type.
    #[must_use]
    pub fn mentions_char(&self) -> bool {
        self.spelling.contains("char")
    }
}

/// Non-owning description of the declaration an identifier reference
/// resolves to. The declaration itself may live in a pruned `#include`
/// subtree, so this carries everything the checks need by value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclRef {
    /// Front-end-stable identity of the declaration. Two locals sharing a
    /// name in different scopes have distinct ids.
    pub decl_id: u64,
    /// Declared name.
    pub name: String,
    /// File the declaration originates from, if known.
    pub file: Option<PathBuf>,
    /// Declared type, if known.
    pub ty: Option<TypeInfo>,
}

/// A single syntax node.
#[derive(Debug, Clone)]
pub struct SyntaxNode {
    /// Kind tag.
    pub kind: NodeKind,
    /// Display name (declared name, called function name, ...). Empty when
    /// the node has none.
    pub name: String,
    /// Declared-type descriptor, for declarations and typed expressions.
    pub ty: Option<TypeInfo>,
    /// Source extent.
    pub extent: Extent,
    /// Originating file; `None` when the front end reported no location.
    pub file: Option<PathBuf>,
    /// Storage class, for declarations.
    pub storage: StorageClass,
    /// Referenced declaration, for identifier-reference nodes.
    pub referenced: Option<DeclRef>,
    /// Ordered tokens covering the extent.
    pub tokens: Vec<Token>,
    /// Front-end-stable identity of this node when it is a declaration.
    pub decl_id: u64,
    children: Vec<NodeId>,
}

impl SyntaxNode {
    /// Creates a node of the given kind with empty attributes.
    #[must_use]
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            name: String::new(),
            ty: None,
            extent: Extent::default(),
            file: None,
            storage: StorageClass::None,
            referenced: None,
            tokens: Vec::new(),
            decl_id: 0,
            children: Vec::new(),
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the declared-type descriptor.
    #[must_use]
    pub fn with_type(mut self, ty: TypeInfo) -> Self {
        self.ty = Some(ty);
        self
    }

    /// Sets the source extent.
    #[must_use]
    pub fn with_extent(mut self, extent: Extent) -> Self {
        self.extent = extent;
        self
    }

    /// Sets the originating file.
    #[must_use]
    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Sets the storage class.
    #[must_use]
    pub fn with_storage(mut self, storage: StorageClass) -> Self {
        self.storage = storage;
        self
    }

    /// Sets the referenced declaration.
    #[must_use]
    pub fn with_referenced(mut self, referenced: DeclRef) -> Self {
        self.referenced = Some(referenced);
        self
    }

    /// Sets the token stream.
    #[must_use]
    pub fn with_tokens(mut self, tokens: Vec<Token>) -> Self {
        self.tokens = tokens;
        self
    }

    /// Sets the declaration identity.
    #[must_use]
    pub fn with_decl_id(mut self, decl_id: u64) -> Self {
        self.decl_id = decl_id;
        self
    }
}

/// Arena-backed syntax tree for one translation unit.
#[derive(Debug)]
pub struct SyntaxTree {
    nodes: Vec<SyntaxNode>,
    root: NodeId,
}

impl SyntaxTree {
    /// Root node (the translation unit).
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Node data for an id.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not produced by this tree's builder.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &SyntaxNode {
        &self.nodes[id.index()]
    }

    /// Kind of a node.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.node(id).kind
    }

    /// Children of a node in document order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Number of nodes in the arena.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True iff the arena holds no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Sees through transparent wrapper nodes (parens, implicit casts) to
    /// the underlying expression.
    #[must_use]
    pub fn unwrap_transparent(&self, mut id: NodeId) -> NodeId {
        while self.kind(id).is_transparent() {
            match self.children(id).first() {
                Some(&child) => id = child,
                None => break,
            }
        }
        id
    }

    /// The left and right operands of a binary operator node.
    #[must_use]
    pub fn binary_operands(&self, id: NodeId) -> Option<(NodeId, NodeId)> {
        let children = self.children(id);
        match children {
            [left, right, ..] => Some((*left, *right)),
            _ => None,
        }
    }

    /// Recovers a binary operator's textual spelling by scanning the node's
    /// tokens located strictly between the left and right operand extents.
    ///
    /// The front end does not expose the operator directly on the node, so
    /// this is the one place token geometry is consulted.
    #[must_use]
    pub fn operator(&self, id: NodeId) -> Option<&str> {
        let (left, right) = self.binary_operands(id)?;
        let left_end = self.node(left).extent.end;
        let right_start = self.node(right).extent.start;
        self.node(id)
            .tokens
            .iter()
            .find(|t| left_end <= t.extent.start && t.extent.end <= right_start)
            .map(|t| t.text.as_str())
    }

    /// Function definitions in this file: `FunctionDecl` children of the
    /// root whose origin file matches the root's and that have a body
    /// (prototypes are skipped).
    #[must_use]
    pub fn functions(&self) -> Vec<NodeId> {
        let root_file = &self.node(self.root).file;
        self.children(self.root)
            .iter()
            .copied()
            .filter(|&id| {
                let node = self.node(id);
                node.kind == NodeKind::FunctionDecl
                    && node.file.is_some()
                    && node.file == *root_file
                    && self.body(id).is_some()
            })
            .collect()
    }

    /// The compound-statement body of a function definition, if any.
    #[must_use]
    pub fn body(&self, function: NodeId) -> Option<NodeId> {
        self.children(function)
            .iter()
            .copied()
            .find(|&c| self.kind(c) == NodeKind::CompoundStmt)
    }
}

/// Bottom-up builder for [`SyntaxTree`]: add children before their parent,
/// then seal the tree with the root id.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    nodes: Vec<SyntaxNode>,
}

impl TreeBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node with the given (already added) children and returns its id.
    #[must_use]
    pub fn add(&mut self, mut node: SyntaxNode, children: Vec<NodeId>) -> NodeId {
        node.children = children;
        let id = NodeId(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
        self.nodes.push(node);
        id
    }

    /// Adds a leaf node.
    #[must_use]
    pub fn leaf(&mut self, node: SyntaxNode) -> NodeId {
        self.add(node, Vec::new())
    }

    /// Seals the tree.
    #[must_use]
    pub fn build(self, root: NodeId) -> SyntaxTree {
        SyntaxTree {
            nodes: self.nodes,
            root,
        }
    }
}
