//! Indentation analysis.
//!
//! Two independent passes share the `indenting` check name. The first
//! classifies every physical line's leading whitespace and complains about
//! tab/space mixtures; the second infers each function's indent unit from
//! the observed block nesting and flags lines whose absolute indentation
//! disagrees with depth times unit.
//!
//! Both passes are scoped per function where possible, so a student who was
//! supplied tab-indented scaffolding can add space-indented code in another
//! function without a false positive.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::debug;

use cstyle_core::{
    CheckName, Detail, Diagnostic, FileContext, IndentMark, Location, NodeId, NodeKind, Policy,
    ShownLine, SourcePass,
};

const MAX_LINES_DESCRIBED: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineIndentCategory {
    Spaces,
    Tabs,
    Mixed,
}

/// Classifies a line's leading whitespace. Lines with no indentation, and
/// blank lines, are `None`.
fn categorize_line(line: &str) -> Option<LineIndentCategory> {
    let rest = line.trim_start_matches([' ', '\t']);
    if rest.is_empty() || rest.len() == line.len() {
        return None;
    }
    let prefix = &line[..line.len() - rest.len()];
    let has_space = prefix.contains(' ');
    let has_tab = prefix.contains('\t');
    Some(match (has_space, has_tab) {
        (true, true) => LineIndentCategory::Mixed,
        (false, true) => LineIndentCategory::Tabs,
        _ => LineIndentCategory::Spaces,
    })
}

/// "line 3 is", "lines 3,4 are", "lines 1,2,3,4,5, ... are".
fn describe_line_set(lines: &[u32]) -> String {
    let shown = lines
        .iter()
        .take(MAX_LINES_DESCRIBED)
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",");
    if lines.len() == 1 {
        format!("line {shown} is")
    } else if lines.len() > MAX_LINES_DESCRIBED {
        format!("lines {shown}, ... are")
    } else {
        format!("lines {shown} are")
    }
}

/// Reports indentation mixing tabs and spaces, within one line anywhere in
/// the file or across lines of one function.
#[derive(Debug, Clone, Default)]
pub struct TabsSpaces;

impl SourcePass for TabsSpaces {
    fn name(&self) -> CheckName {
        CheckName::Indenting
    }

    fn code(&self) -> &'static str {
        "CS017"
    }

    fn description(&self) -> &'static str {
        "check indenting is consistent within functions, and tabs and spaces are not mixed"
    }

    fn run(&mut self, ctx: &FileContext<'_>, policy: &Policy) -> Vec<Diagnostic> {
        let severity = policy.severity(CheckName::Indenting);
        let mut spaces = BTreeSet::new();
        let mut tabs = BTreeSet::new();
        let mut mixed = Vec::new();
        for (index, line) in ctx.lines.iter().enumerate() {
            let number = u32::try_from(index + 1).unwrap_or(u32::MAX);
            match categorize_line(line) {
                Some(LineIndentCategory::Spaces) => {
                    spaces.insert(number);
                }
                Some(LineIndentCategory::Tabs) => {
                    tabs.insert(number);
                }
                Some(LineIndentCategory::Mixed) => mixed.push(number),
                None => {}
            }
        }

        // a within-line mixture is reported for the whole file and ends the
        // pass; per-function analysis would be meaningless
        if !mixed.is_empty() {
            let message = format!(
                "{} indented with a mixture of tabs and spaces",
                describe_line_set(&mixed)
            );
            let mut diagnostic = Diagnostic::new(
                CheckName::Indenting,
                severity,
                Location::file_scope(ctx.path),
                message,
            );
            if let Some(text) = &policy.mixed_indenting_text {
                diagnostic = diagnostic.with_detail(Detail::PlainLines(vec![text.clone()]));
            }
            return vec![diagnostic];
        }

        for function in ctx.tree.functions() {
            let node = ctx.tree.node(function);
            let range = node.extent.start.line..=node.extent.end.line;
            let tabbed: Vec<u32> = tabs.iter().copied().filter(|n| range.contains(n)).collect();
            let spaced: Vec<u32> = spaces.iter().copied().filter(|n| range.contains(n)).collect();
            if tabbed.is_empty() || spaced.is_empty() {
                continue;
            }
            let message = format!(
                "function {} is indented with a mixture of tabs and spaces:",
                node.name
            );
            let mut extra = vec![
                format!("\t{} indented with tabs", describe_line_set(&tabbed)),
                format!("\t{} indented with spaces", describe_line_set(&spaced)),
            ];
            if let Some(text) = &policy.mixed_indenting_text {
                extra.push(text.clone());
            }
            return vec![Diagnostic::new(
                CheckName::Indenting,
                severity,
                Location::file_scope(ctx.path),
                message,
            )
            .with_detail(Detail::PlainLines(extra))];
        }

        Vec::new()
    }
}

/// One line's indentation verdict within a function.
#[derive(Debug, Clone, Copy)]
struct IndentRecord {
    /// Columns between the block-opening construct and this line's first
    /// character. The indent-unit vote counts these.
    relative: i64,
    /// Columns before this line's first character.
    absolute: i64,
    /// Block nesting depth.
    depth: u32,
    /// The block-opening construct, shown in full when the line is wrong.
    owner: NodeId,
    /// `depth` times the inferred unit; filled in after the vote.
    correct: i64,
}

impl IndentRecord {
    fn is_correct(self) -> bool {
        self.absolute == self.correct
    }
}

/// Checks that control and function bodies are indented by a consistent
/// unit, inferred per function by majority vote.
#[derive(Debug, Clone, Default)]
pub struct BodyIndent;

impl SourcePass for BodyIndent {
    fn name(&self) -> CheckName {
        CheckName::Indenting
    }

    fn code(&self) -> &'static str {
        "CS017"
    }

    fn description(&self) -> &'static str {
        "check indenting is consistent within functions, and tabs and spaces are not mixed"
    }

    fn run(&mut self, ctx: &FileContext<'_>, policy: &Policy) -> Vec<Diagnostic> {
        let severity = policy.severity(CheckName::Indenting);
        let mut file_records = BTreeMap::new();
        let mut plain = Vec::new();
        let mut show = BTreeSet::new();
        for function in ctx.tree.functions() {
            show.extend(check_function(ctx, function, policy, &mut file_records, &mut plain));
        }
        if show.is_empty() {
            return Vec::new();
        }

        let diagnostic = Diagnostic::new(
            CheckName::Indenting,
            severity,
            Location::file_scope(ctx.path),
            "some lines are not consistently indented.",
        );
        if !policy.highlight_indenting {
            return vec![diagnostic.with_detail(Detail::PlainLines(plain))];
        }

        let shown = expand_lines_shown(ctx.lines.len(), &show);
        let lines = shown
            .iter()
            .map(|&number| ShownLine {
                number,
                text: ctx.line(number).unwrap_or("").to_string(),
                mark: file_records.get(&number).map(|r: &IndentRecord| IndentMark {
                    correct_indent: u32::try_from(r.correct).unwrap_or(0),
                    correct: r.is_correct(),
                }),
            })
            .collect();
        vec![diagnostic.with_detail(Detail::IndentListing(lines))]
    }
}

/// Collects records for one function, infers its indent unit, and returns
/// the line ranges to display for its incorrectly indented lines.
fn check_function(
    ctx: &FileContext<'_>,
    function: NodeId,
    policy: &Policy,
    file_records: &mut BTreeMap<u32, IndentRecord>,
    plain: &mut Vec<String>,
) -> BTreeSet<u32> {
    let mut records = BTreeMap::new();
    collect_records(ctx, function, None, 0, &mut records);

    let mut counts: HashMap<i64, usize> = HashMap::new();
    for record in records.values().filter(|r| r.relative > 0) {
        *counts.entry(record.relative).or_insert(0) += 1;
    }
    debug!(?counts, "indent unit vote");
    // a single observed width is no evidence of inconsistency
    if counts.len() < 2 {
        return BTreeSet::new();
    }
    // most frequent width wins; ties go to the smaller one
    let unit = counts
        .iter()
        .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
        .map_or(0, |(&value, _)| value);

    let mut show = BTreeSet::new();
    for (&line, record) in &mut records {
        record.correct = i64::from(record.depth) * unit;
        if !record.is_correct() {
            if !policy.highlight_indenting {
                plain.push(format!(
                    "{}:{} indented {} should be {}",
                    ctx.path.display(),
                    line,
                    record.absolute,
                    record.correct
                ));
            }
            let owner = ctx.tree.node(record.owner).extent;
            show.extend(owner.start.line..=owner.end.line);
        }
    }
    for (line, record) in records {
        file_records.entry(line).or_insert(record);
    }
    show
}

/// Walks compound blocks whose parent is an if/while/for/function construct,
/// recording one indent per line (first record wins). Brace blocks that are
/// not a control or function body, such as braced initializers, get none.
fn collect_records(
    ctx: &FileContext<'_>,
    id: NodeId,
    parent: Option<NodeId>,
    depth: u32,
    records: &mut BTreeMap<u32, IndentRecord>,
) {
    let tree = ctx.tree;
    if tree.kind(id) == NodeKind::CompoundStmt {
        let Some(mut owner) = parent else { return };
        if !matches!(
            tree.kind(owner),
            NodeKind::IfStmt | NodeKind::WhileStmt | NodeKind::ForStmt | NodeKind::FunctionDecl
        ) {
            return;
        }
        // collapse if/else-if chains so sibling branches share a baseline
        while let Some(grand) = ctx.ancestry.parent(owner) {
            if tree.kind(grand) != NodeKind::IfStmt {
                break;
            }
            owner = grand;
        }
        let owner_column = i64::from(tree.node(owner).extent.start.column);
        for &child in tree.children(id) {
            let extent = tree.node(child).extent;
            records.entry(extent.start.line).or_insert(IndentRecord {
                relative: i64::from(extent.start.column) - owner_column,
                absolute: i64::from(extent.start.column) - 1,
                depth: depth + 1,
                owner,
                correct: 0,
            });
            collect_records(ctx, child, Some(id), depth + 1, records);
        }
        let end = tree.node(id).extent.end;
        records.entry(end.line).or_insert(IndentRecord {
            relative: i64::from(end.column) - owner_column - 1,
            absolute: i64::from(end.column) - 2,
            depth,
            owner,
            correct: 0,
        });
    } else {
        let node_file = &tree.node(id).file;
        for &child in tree.children(id) {
            if tree.node(child).file == *node_file {
                collect_records(ctx, child, Some(id), depth, records);
            }
        }
    }
}

/// Fills small gaps between displayed ranges, and shows the file tail when
/// it is close, so excerpts read as one piece.
fn expand_lines_shown(total_lines: usize, show: &BTreeSet<u32>) -> BTreeSet<u32> {
    let mut expanded = show.clone();
    let mut last = 0u32;
    for &line in show {
        if last + 1 < line && line < last + 5 {
            expanded.extend(last + 1..line);
        }
        last = line;
    }
    let total = u32::try_from(total_lines).unwrap_or(u32::MAX);
    if total < last + 5 {
        expanded.extend(last + 1..=total);
    }
    expanded
}
