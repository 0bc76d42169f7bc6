//! Conversion of clang's `-ast-dump=json` output into a [`SyntaxTree`].
//!
//! The dump elides `file` and `line` fields whenever they repeat the most
//! recently printed location, so conversion keeps a cursor updated in the
//! serializer's emission order: a node's `loc`, then its range begin and
//! end, then its children.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use cstyle_core::{
    CanonType, DeclRef, Extent, NodeId, NodeKind, SourcePos, StorageClass, SyntaxNode, SyntaxTree,
    Token, TreeBuilder, TypeInfo,
};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct JsonNode {
    id: String,
    kind: String,
    name: String,
    opcode: Option<String>,
    value: Option<serde_json::Value>,
    #[serde(rename = "tagUsed")]
    tag_used: Option<String>,
    #[serde(rename = "storageClass")]
    storage_class: Option<String>,
    loc: Option<JsonLoc>,
    range: Option<JsonRange>,
    #[serde(rename = "type")]
    ty: Option<JsonType>,
    #[serde(rename = "referencedDecl")]
    referenced_decl: Option<Box<JsonNode>>,
    inner: Vec<JsonNode>,
}

impl JsonNode {
    /// Literal value as printed, whether the dump stored it as a string or a
    /// number.
    fn value_text(&self) -> Option<String> {
        match &self.value {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
            None => None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct JsonLoc {
    file: Option<String>,
    line: Option<u32>,
    col: Option<u32>,
    #[serde(rename = "tokLen")]
    tok_len: Option<u32>,
    #[serde(rename = "expansionLoc")]
    expansion_loc: Option<Box<JsonLoc>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct JsonRange {
    begin: Option<JsonLoc>,
    end: Option<JsonLoc>,
}

#[derive(Debug, Deserialize)]
struct JsonType {
    #[serde(rename = "qualType")]
    qual_type: String,
    #[serde(default, rename = "desugaredQualType")]
    desugared: Option<String>,
}

/// Parses a full `-ast-dump=json` document into a tree rooted at `path`.
pub(crate) fn parse_translation_unit(
    json: &str,
    path: &Path,
) -> Result<SyntaxTree, serde_json::Error> {
    let root: JsonNode = serde_json::from_str(json)?;
    let mut converter = Converter::default();
    let children: Vec<NodeId> = root
        .inner
        .iter()
        .map(|child| converter.convert(child).id)
        .collect();
    let root_id = converter.builder.add(
        SyntaxNode::new(NodeKind::TranslationUnit).with_file(path),
        children,
    );
    Ok(converter.builder.build(root_id))
}

/// A translation unit with no content, for files clang refused to dump.
pub(crate) fn empty_tree(path: &Path) -> SyntaxTree {
    let mut builder = TreeBuilder::new();
    let root = builder.leaf(SyntaxNode::new(NodeKind::TranslationUnit).with_file(path));
    builder.build(root)
}

struct Converted {
    id: NodeId,
    extent: Extent,
}

/// Elision state: the most recently printed file and line.
#[derive(Debug, Default)]
struct LocCursor {
    file: Option<PathBuf>,
    line: u32,
}

#[derive(Default)]
struct Converter {
    builder: TreeBuilder,
    cursor: LocCursor,
    decl_files: HashMap<u64, PathBuf>,
}

impl Converter {
    fn convert(&mut self, json: &JsonNode) -> Converted {
        let kind = node_kind(&json.kind, json.tag_used.as_deref());

        // cursor updates must follow the dump's print order
        if let Some(loc) = &json.loc {
            let _ = self.advance(loc);
        }
        let file_at_loc = self.cursor.file.clone();
        let extent = self.extent(json.range.as_ref());
        let file = if json.loc.is_some() {
            file_at_loc
        } else {
            self.cursor.file.clone()
        };

        let decl_id = parse_id(&json.id);
        if json.kind.ends_with("Decl") {
            if let Some(file) = &file {
                self.decl_files.insert(decl_id, file.clone());
            }
        }

        let children: Vec<Converted> = json.inner.iter().map(|c| self.convert(c)).collect();

        let mut node = SyntaxNode::new(kind)
            .with_extent(extent)
            .with_decl_id(decl_id);
        if let Some(file) = file {
            node = node.with_file(file);
        }
        if let Some(ty) = &json.ty {
            node = node.with_type(type_info(ty));
        }
        if let Some(storage) = json.storage_class.as_deref() {
            node = node.with_storage(storage_class(storage));
        }
        if !json.name.is_empty() {
            node = node.with_name(&json.name);
        } else if kind == NodeKind::CallExpr {
            if let Some(callee) = callee_name(json) {
                node = node.with_name(callee);
            }
        }
        if let Some(referenced) = json.referenced_decl.as_deref() {
            let id = parse_id(&referenced.id);
            node = node.with_referenced(DeclRef {
                decl_id: id,
                name: referenced.name.clone(),
                file: self.decl_files.get(&id).cloned(),
                ty: referenced.ty.as_ref().map(type_info),
            });
        }
        node = node.with_tokens(synthesize_tokens(json, kind, extent, &children));

        let ids = children.into_iter().map(|c| c.id).collect();
        Converted {
            id: self.builder.add(node, ids),
            extent,
        }
    }

    /// Updates the cursor from one printed location and returns the position
    /// of the token it names.
    fn advance(&mut self, loc: &JsonLoc) -> SourcePos {
        let loc = loc.expansion_loc.as_deref().unwrap_or(loc);
        if let Some(file) = &loc.file {
            self.cursor.file = Some(PathBuf::from(file));
        }
        if let Some(line) = loc.line {
            self.cursor.line = line;
        }
        SourcePos::new(self.cursor.line, loc.col.unwrap_or(0))
    }

    /// Node extent from a printed range. The range's end location names the
    /// start of the last token; `tokLen` turns it into an exclusive end.
    fn extent(&mut self, range: Option<&JsonRange>) -> Extent {
        let Some(range) = range else {
            return Extent::default();
        };
        let start = range
            .begin
            .as_ref()
            .map(|b| self.advance(b))
            .unwrap_or_default();
        let end = match &range.end {
            Some(end_loc) => {
                let pos = self.advance(end_loc);
                let tok_len = end_loc
                    .expansion_loc
                    .as_deref()
                    .unwrap_or(end_loc)
                    .tok_len
                    .unwrap_or(0);
                SourcePos::new(pos.line, pos.column + tok_len)
            }
            None => SourcePos::default(),
        };
        Extent::new(start, end)
    }
}

/// The dump carries no token stream, so the two token lookups the checks
/// perform are synthesized: the operator spelling of a binary node, placed
/// between its operand extents, and the printed value of an integer literal.
fn synthesize_tokens(
    json: &JsonNode,
    kind: NodeKind,
    extent: Extent,
    children: &[Converted],
) -> Vec<Token> {
    match kind {
        NodeKind::BinaryOperator | NodeKind::CompoundAssignOperator => {
            if let (Some(opcode), [left, right, ..]) = (&json.opcode, children) {
                return vec![Token::new(
                    opcode.clone(),
                    Extent::new(left.extent.end, right.extent.start),
                )];
            }
            Vec::new()
        }
        NodeKind::IntegerLiteral => json
            .value_text()
            .map(|text| vec![Token::new(text, extent)])
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

/// Resolves a call's display name through the function-to-pointer decay cast
/// over its callee.
fn callee_name(call: &JsonNode) -> Option<&str> {
    let mut node = call.inner.first()?;
    loop {
        match node.kind.as_str() {
            "ImplicitCastExpr" | "ParenExpr" => node = node.inner.first()?,
            "DeclRefExpr" => {
                return node.referenced_decl.as_deref().map(|d| d.name.as_str());
            }
            _ => return None,
        }
    }
}

fn node_kind(kind: &str, tag_used: Option<&str>) -> NodeKind {
    match kind {
        "TranslationUnitDecl" => NodeKind::TranslationUnit,
        "FunctionDecl" => NodeKind::FunctionDecl,
        "VarDecl" => NodeKind::VarDecl,
        "ParmVarDecl" => NodeKind::ParmDecl,
        "RecordDecl" if tag_used == Some("union") => NodeKind::UnionDecl,
        "CompoundStmt" => NodeKind::CompoundStmt,
        "IfStmt" => NodeKind::IfStmt,
        "WhileStmt" => NodeKind::WhileStmt,
        "ForStmt" => NodeKind::ForStmt,
        "DoStmt" => NodeKind::DoStmt,
        "SwitchStmt" => NodeKind::SwitchStmt,
        "BreakStmt" => NodeKind::BreakStmt,
        "ContinueStmt" => NodeKind::ContinueStmt,
        "GotoStmt" => NodeKind::GotoStmt,
        "ReturnStmt" => NodeKind::ReturnStmt,
        "DeclStmt" => NodeKind::DeclStmt,
        "BinaryOperator" => NodeKind::BinaryOperator,
        "CompoundAssignOperator" => NodeKind::CompoundAssignOperator,
        "UnaryOperator" => NodeKind::UnaryOperator,
        "ConditionalOperator" | "BinaryConditionalOperator" => NodeKind::ConditionalOperator,
        "CallExpr" => NodeKind::CallExpr,
        "DeclRefExpr" => NodeKind::DeclRefExpr,
        "IntegerLiteral" => NodeKind::IntegerLiteral,
        "CharacterLiteral" => NodeKind::CharacterLiteral,
        "StringLiteral" => NodeKind::StringLiteral,
        "ParenExpr" => NodeKind::ParenExpr,
        "ImplicitCastExpr" => NodeKind::ImplicitCastExpr,
        "InitListExpr" => NodeKind::InitListExpr,
        _ => NodeKind::Other,
    }
}

fn storage_class(storage: &str) -> StorageClass {
    match storage {
        "static" => StorageClass::Static,
        "extern" => StorageClass::Extern,
        "auto" => StorageClass::Auto,
        "register" => StorageClass::Register,
        _ => StorageClass::None,
    }
}

/// Node ids are printed as hex pointers (`0x55d3...`).
fn parse_id(id: &str) -> u64 {
    u64::from_str_radix(id.trim_start_matches("0x"), 16).unwrap_or(0)
}

fn type_info(ty: &JsonType) -> TypeInfo {
    let canonical = parse_canonical(ty.desugared.as_deref().unwrap_or(&ty.qual_type));
    TypeInfo::new(&ty.qual_type, canonical)
}

/// Parses a type spelling into its const/pointer chain, walking pointer
/// levels from the right.
fn parse_canonical(spelling: &str) -> CanonType {
    let mut s = spelling.trim();
    // restrict and volatile do not participate in the chain
    loop {
        if let Some(rest) = s
            .strip_suffix("restrict")
            .or_else(|| s.strip_suffix("volatile"))
        {
            s = rest.trim_end();
        } else {
            break;
        }
    }
    if let Some(pointee) = s.strip_suffix('*') {
        return CanonType::Pointer {
            is_const: false,
            pointee: Box::new(parse_canonical(pointee)),
        };
    }
    if let Some(rest) = s.strip_suffix("const") {
        let rest = rest.trim_end();
        if let Some(pointee) = rest.strip_suffix('*') {
            return CanonType::Pointer {
                is_const: true,
                pointee: Box::new(parse_canonical(pointee)),
            };
        }
        return CanonType::Leaf { is_const: true };
    }
    if s.starts_with("const ") {
        CanonType::const_leaf()
    } else {
        CanonType::leaf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // A hand-reduced dump of a program comparing a char against 10, with a
    // header prototype ahead of main. File and line fields are elided the
    // way clang prints them.
    const DUMP: &str = r#"{
        "id": "0x1", "kind": "TranslationUnitDecl",
        "inner": [
            {
                "id": "0x10", "kind": "FunctionDecl",
                "loc": {"file": "/usr/include/string.h", "line": 3, "col": 15, "tokLen": 6},
                "range": {"begin": {"col": 1, "tokLen": 8}, "end": {"col": 33, "tokLen": 1}},
                "name": "strlen", "type": {"qualType": "unsigned long (const char *)"}
            },
            {
                "id": "0x20", "kind": "FunctionDecl",
                "loc": {"file": "prog.c", "line": 1, "col": 5, "tokLen": 4},
                "range": {"begin": {"col": 1, "tokLen": 3}, "end": {"line": 4, "col": 1, "tokLen": 1}},
                "name": "main", "type": {"qualType": "int (void)"},
                "inner": [
                    {
                        "id": "0x30", "kind": "CompoundStmt",
                        "range": {"begin": {"line": 1, "col": 16, "tokLen": 1}, "end": {"line": 4, "col": 1, "tokLen": 1}},
                        "inner": [
                            {
                                "id": "0x40", "kind": "BinaryOperator",
                                "range": {"begin": {"line": 2, "col": 5, "tokLen": 1}, "end": {"col": 10, "tokLen": 2}},
                                "type": {"qualType": "int"}, "opcode": "==",
                                "inner": [
                                    {
                                        "id": "0x41", "kind": "ImplicitCastExpr",
                                        "range": {"begin": {"col": 5, "tokLen": 1}, "end": {"col": 5, "tokLen": 1}},
                                        "type": {"qualType": "int"},
                                        "inner": [
                                            {
                                                "id": "0x42", "kind": "DeclRefExpr",
                                                "range": {"begin": {"col": 5, "tokLen": 1}, "end": {"col": 5, "tokLen": 1}},
                                                "type": {"qualType": "char"},
                                                "referencedDecl": {"id": "0x50", "kind": "VarDecl", "name": "c", "type": {"qualType": "char"}}
                                            }
                                        ]
                                    },
                                    {
                                        "id": "0x43", "kind": "IntegerLiteral",
                                        "range": {"begin": {"col": 10, "tokLen": 2}, "end": {"col": 10, "tokLen": 2}},
                                        "type": {"qualType": "int"}, "value": "10"
                                    }
                                ]
                            }
                        ]
                    }
                ]
            }
        ]
    }"#;

    fn fixture() -> SyntaxTree {
        parse_translation_unit(DUMP, Path::new("prog.c")).expect("fixture parses")
    }

    fn find(tree: &SyntaxTree, kind: NodeKind) -> NodeId {
        fn walk(tree: &SyntaxTree, id: NodeId, kind: NodeKind) -> Option<NodeId> {
            if tree.kind(id) == kind {
                return Some(id);
            }
            tree.children(id)
                .iter()
                .find_map(|&c| walk(tree, c, kind))
        }
        walk(tree, tree.root(), kind).expect("kind present")
    }

    #[test]
    fn root_carries_the_parsed_path_and_main_is_the_only_definition() {
        let tree = fixture();
        assert_eq!(tree.kind(tree.root()), NodeKind::TranslationUnit);
        assert_eq!(
            tree.node(tree.root()).file.as_deref(),
            Some(Path::new("prog.c"))
        );

        let functions = tree.functions();
        assert_eq!(functions.len(), 1);
        assert_eq!(tree.node(functions[0]).name, "main");
    }

    #[test]
    fn elided_files_and_lines_follow_the_cursor() {
        let tree = fixture();
        let main = tree.functions()[0];
        assert_eq!(tree.node(main).extent.start, SourcePos::new(1, 1));
        // exclusive end: closing brace at 4:1, one character wide
        assert_eq!(tree.node(main).extent.end, SourcePos::new(4, 2));

        let binop = find(&tree, NodeKind::BinaryOperator);
        assert_eq!(tree.node(binop).extent.start, SourcePos::new(2, 5));
        assert_eq!(tree.node(binop).extent.end, SourcePos::new(2, 12));
    }

    #[test]
    fn header_prototypes_keep_their_origin_file() {
        let tree = fixture();
        let strlen = tree.children(tree.root())[0];
        assert_eq!(tree.node(strlen).name, "strlen");
        assert_eq!(
            tree.node(strlen).file.as_deref(),
            Some(Path::new("/usr/include/string.h"))
        );
        assert_eq!(tree.node(strlen).extent.start.line, 3);
    }

    #[test]
    fn operator_spelling_is_recoverable_from_the_synthesized_token() {
        let tree = fixture();
        let binop = find(&tree, NodeKind::BinaryOperator);
        assert_eq!(tree.operator(binop), Some("=="));
    }

    #[test]
    fn integer_literal_carries_its_printed_value() {
        let tree = fixture();
        let literal = find(&tree, NodeKind::IntegerLiteral);
        assert_eq!(tree.node(literal).tokens[0].text, "10");
    }

    #[test]
    fn references_resolve_name_type_and_identity() {
        let tree = fixture();
        let reference = find(&tree, NodeKind::DeclRefExpr);
        let referenced = tree.node(reference).referenced.as_ref().expect("referenced");
        assert_eq!(referenced.name, "c");
        assert_eq!(referenced.decl_id, 0x50);
        assert!(referenced.ty.as_ref().is_some_and(TypeInfo::is_char));
    }

    #[test]
    fn calls_take_the_callee_name_through_the_decay_cast() {
        let dump = r#"{
            "id": "0x1", "kind": "TranslationUnitDecl",
            "inner": [
                {
                    "id": "0x2", "kind": "FunctionDecl",
                    "loc": {"file": "p.c", "line": 1, "col": 5, "tokLen": 4},
                    "range": {"begin": {"col": 1, "tokLen": 3}, "end": {"line": 3, "col": 1, "tokLen": 1}},
                    "name": "main", "type": {"qualType": "int (void)"},
                    "inner": [
                        {
                            "id": "0x3", "kind": "CompoundStmt",
                            "range": {"begin": {"line": 1, "col": 16, "tokLen": 1}, "end": {"line": 3, "col": 1, "tokLen": 1}},
                            "inner": [
                                {
                                    "id": "0x4", "kind": "CallExpr",
                                    "range": {"begin": {"line": 2, "col": 5, "tokLen": 7}, "end": {"col": 13, "tokLen": 1}},
                                    "type": {"qualType": "int"},
                                    "inner": [
                                        {
                                            "id": "0x5", "kind": "ImplicitCastExpr",
                                            "range": {"begin": {"col": 5, "tokLen": 7}, "end": {"col": 5, "tokLen": 7}},
                                            "type": {"qualType": "int (*)(void)"},
                                            "inner": [
                                                {
                                                    "id": "0x6", "kind": "DeclRefExpr",
                                                    "range": {"begin": {"col": 5, "tokLen": 7}, "end": {"col": 5, "tokLen": 7}},
                                                    "type": {"qualType": "int (void)"},
                                                    "referencedDecl": {"id": "0x7", "kind": "FunctionDecl", "name": "getchar", "type": {"qualType": "int (void)"}}
                                                }
                                            ]
                                        }
                                    ]
                                }
                            ]
                        }
                    ]
                }
            ]
        }"#;
        let tree = parse_translation_unit(dump, Path::new("p.c")).expect("parses");
        let call = find(&tree, NodeKind::CallExpr);
        assert_eq!(tree.node(call).name, "getchar");
    }

    #[test]
    fn header_decl_files_flow_into_later_references() {
        let dump = r#"{
            "id": "0x1", "kind": "TranslationUnitDecl",
            "inner": [
                {
                    "id": "0x10", "kind": "FunctionDecl",
                    "loc": {"file": "/usr/include/string.h", "line": 3, "col": 15, "tokLen": 6},
                    "range": {"begin": {"col": 1, "tokLen": 8}, "end": {"col": 33, "tokLen": 1}},
                    "name": "strlen", "type": {"qualType": "unsigned long (const char *)"}
                },
                {
                    "id": "0x20", "kind": "FunctionDecl",
                    "loc": {"file": "p.c", "line": 1, "col": 5, "tokLen": 4},
                    "range": {"begin": {"col": 1, "tokLen": 3}, "end": {"line": 3, "col": 1, "tokLen": 1}},
                    "name": "main", "type": {"qualType": "int (void)"},
                    "inner": [
                        {
                            "id": "0x30", "kind": "CompoundStmt",
                            "range": {"begin": {"line": 1, "col": 16, "tokLen": 1}, "end": {"line": 3, "col": 1, "tokLen": 1}},
                            "inner": [
                                {
                                    "id": "0x31", "kind": "DeclRefExpr",
                                    "range": {"begin": {"line": 2, "col": 5, "tokLen": 6}, "end": {"col": 5, "tokLen": 6}},
                                    "type": {"qualType": "unsigned long (const char *)"},
                                    "referencedDecl": {"id": "0x10", "kind": "FunctionDecl", "name": "strlen", "type": {"qualType": "unsigned long (const char *)"}}
                                }
                            ]
                        }
                    ]
                }
            ]
        }"#;
        let tree = parse_translation_unit(dump, Path::new("p.c")).expect("parses");
        let reference = find(&tree, NodeKind::DeclRefExpr);
        let referenced = tree.node(reference).referenced.as_ref().expect("referenced");
        assert_eq!(
            referenced.file.as_deref(),
            Some(Path::new("/usr/include/string.h"))
        );
    }

    #[test]
    fn unions_and_storage_classes_are_recognized() {
        let dump = r#"{
            "id": "0x1", "kind": "TranslationUnitDecl",
            "inner": [
                {
                    "id": "0x2", "kind": "RecordDecl", "tagUsed": "union",
                    "loc": {"file": "p.c", "line": 1, "col": 7, "tokLen": 1},
                    "range": {"begin": {"col": 1, "tokLen": 5}, "end": {"line": 3, "col": 1, "tokLen": 1}},
                    "name": "u"
                },
                {
                    "id": "0x3", "kind": "VarDecl", "storageClass": "static",
                    "loc": {"line": 4, "col": 12, "tokLen": 1},
                    "range": {"begin": {"col": 1, "tokLen": 6}, "end": {"col": 16, "tokLen": 1}},
                    "name": "n", "type": {"qualType": "int"}
                }
            ]
        }"#;
        let tree = parse_translation_unit(dump, Path::new("p.c")).expect("parses");
        let union = tree.children(tree.root())[0];
        assert_eq!(tree.kind(union), NodeKind::UnionDecl);
        let var = tree.children(tree.root())[1];
        assert_eq!(tree.node(var).storage, StorageClass::Static);
        assert_eq!(tree.node(var).file.as_deref(), Some(Path::new("p.c")));
    }

    #[test]
    fn canonical_chains_track_const_at_every_level() {
        assert!(parse_canonical("const char *").is_const_anywhere());
        assert!(parse_canonical("char *const").is_const_anywhere());
        assert!(parse_canonical("const int").is_const_anywhere());
        assert!(parse_canonical("int const").is_const_anywhere());
        assert!(!parse_canonical("char *").is_const_anywhere());
        assert!(!parse_canonical("int **").is_const_anywhere());
        assert!(parse_canonical("const char **").is_const_anywhere());
        assert!(!parse_canonical("char *restrict").is_const_anywhere());
        assert!(parse_canonical("const char [5]").is_const_anywhere());
    }

    #[test]
    fn desugared_spelling_drives_the_canonical_chain() {
        let ty = JsonType {
            qual_type: "string_t".to_string(),
            desugared: Some("const char *".to_string()),
        };
        let info = type_info(&ty);
        assert_eq!(info.spelling, "string_t");
        assert!(info.canonical.is_const_anywhere());
    }
}
