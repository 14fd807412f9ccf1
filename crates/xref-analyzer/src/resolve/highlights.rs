//! Document highlights: occurrences of the symbol under the cursor, or related control flow.

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::ide::navigation::{IdePosition, IdeRange};
use crate::semantic::{FileRange, NodeId, NodeKind, ParsedAst, StmtKind, SymbolRoles, TextRange};

use super::references::find_refs;
use super::selection::for_each_selection;
use super::targets::{DeclRelationSet, target_decls};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HighlightKind {
    Text,
    Read,
    Write,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentHighlight {
    pub range: IdeRange,
    pub kind: HighlightKind,
}

bitflags::bitflags! {
    /// Control-flow statements a traversal is looking for.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct FlowTarget: u8 {
        const BREAK = 1 << 0;
        const CONTINUE = 1 << 1;
        const RETURN = 1 << 2;
        const CASE = 1 << 3;
        const THROW = 1 << 4;
        const GOTO = 1 << 5;
    }
}

/// Body of a function declaration or lambda.
fn function_body(
    ast: &ParsedAst,
    node: NodeId,
) -> Option<NodeId> {
    let n = ast.node(node);
    let is_function = match &n.kind {
        NodeKind::Decl(decl) => ast.decl(*decl).kind.is_function_like(),
        NodeKind::Lambda => true,
        _ => false,
    };
    if !is_function {
        return None;
    }
    n.children.iter().copied().find(|&child| ast.node(child).stmt() == Some(&StmtKind::Compound))
}

fn loop_body(
    ast: &ParsedAst,
    node: NodeId,
) -> Option<NodeId> {
    let n = ast.node(node);
    if !n.stmt().is_some_and(StmtKind::is_loop) {
        return None;
    }
    n.children.iter().rev().copied().find(|&child| ast.node(child).stmt().is_some())
}

/// Half-open range covering the case containing `offset`; `case A: case B:` count as one case.
fn case_bounds(
    ast: &ParsedAst,
    switch: NodeId,
    offset: u32,
) -> TextRange {
    let switch_range = ast.node(switch).range;
    let mut cases = Vec::new();
    let mut stack: Vec<NodeId> = ast.node(switch).children.clone();
    while let Some(id) = stack.pop() {
        let n = ast.node(id);
        match n.stmt() {
            Some(StmtKind::Switch) => continue,
            Some(kind) if kind.is_switch_case() => cases.push(id),
            _ => {},
        }
        stack.extend(n.children.iter().copied());
    }
    cases.sort_by_key(|&id| ast.node(id).range.start);

    let after = cases.partition_point(|&id| ast.node(id).range.start <= offset);
    let end = cases.get(after).map_or(switch_range.end, |&id| ast.node(id).range.start);
    if after == 0 {
        return TextRange::new(switch_range.start, end);
    }
    let mut before = after - 1;
    while before > 0 && ast.node(cases[before]).parent == Some(cases[before - 1]) {
        before -= 1;
    }
    TextRange::new(ast.node(cases[before]).range.start, end)
}

/// Walks a subtree collecting flow statements, masking what nested constructs capture.
struct FlowCollector<'a> {
    ast: &'a ParsedAst,
    bounds: TextRange,
    ignore: FlowTarget,
    found: Vec<u32>,
}

impl FlowCollector<'_> {
    fn found(
        &mut self,
        target: FlowTarget,
        node: NodeId,
    ) {
        let n = self.ast.node(node);
        if self.ignore.intersects(target) {
            return;
        }
        if self.bounds.start <= n.range.start && n.range.start < self.bounds.end {
            self.found.push(n.loc.start);
        }
    }

    fn traverse(
        &mut self,
        node: NodeId,
    ) {
        let ast = self.ast;
        let n = ast.node(node);
        let saved = self.ignore;
        match &n.kind {
            NodeKind::Stmt(kind) if kind.is_loop() => self.ignore |= FlowTarget::BREAK | FlowTarget::CONTINUE,
            NodeKind::Stmt(StmtKind::Switch) => self.ignore |= FlowTarget::CASE | FlowTarget::BREAK,
            NodeKind::Decl(decl) if ast.decl(*decl).kind.is_function_like() => self.ignore = FlowTarget::all(),
            NodeKind::Lambda => self.ignore = FlowTarget::all(),
            _ => {},
        }
        if self.ignore == FlowTarget::all() {
            self.ignore = saved;
            return;
        }

        match n.stmt() {
            Some(StmtKind::Return) => self.found(FlowTarget::RETURN, node),
            Some(StmtKind::Break) => self.found(FlowTarget::BREAK, node),
            Some(StmtKind::Continue) => self.found(FlowTarget::CONTINUE, node),
            Some(StmtKind::Throw) => self.found(FlowTarget::THROW, node),
            Some(kind) if kind.is_switch_case() => self.found(FlowTarget::CASE, node),
            Some(StmtKind::Goto {
                label,
            }) => {
                // Only jumps leaving the bounds are interesting.
                let label_range = ast.decl(*label).range;
                if !label_range.is_main()
                    || label_range.range.start < self.bounds.start
                    || self.bounds.end < label_range.range.end
                {
                    self.found(FlowTarget::GOTO, node);
                }
            },
            _ => {},
        }

        for &child in &n.children {
            self.traverse(child);
        }
        self.ignore = saved;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cursor {
    None,
    Break,
    Continue,
    Return,
    Case,
    Throw,
}

/// Offsets of control-flow keywords related to the statement at `node`.
///
/// `return` relates to every exit of its function, `break`/`continue` to their
/// loop, and `case`/`break` in a switch to the enclosing case.
pub fn related_control_flow(
    ast: &ParsedAst,
    node: NodeId,
) -> Vec<u32> {
    let mut result = Vec::new();
    let n = ast.node(node);
    let cursor = match n.stmt() {
        Some(StmtKind::Break) => Cursor::Break,
        Some(StmtKind::Continue) => Cursor::Continue,
        Some(StmtKind::Return) => Cursor::Return,
        Some(StmtKind::Throw) => Cursor::Throw,
        Some(kind) if kind.is_switch_case() => Cursor::Case,
        Some(StmtKind::Goto {
            label,
        }) => {
            result.push(n.loc.start);
            let label_loc = ast.decl(*label).name_loc;
            if label_loc.is_main() {
                result.push(label_loc.range.start);
            }
            Cursor::None
        },
        _ => Cursor::None,
    };

    let mut root = None;
    let mut bounds = None;
    let mut current = Some(node);
    while let Some(id) = current {
        if let Some(body) = function_body(ast, id) {
            if matches!(cursor, Cursor::Return | Cursor::Throw) {
                root = Some(body);
            }
            break;
        }
        if let Some(body) = loop_body(ast, id)
            && matches!(cursor, Cursor::None | Cursor::Break | Cursor::Continue)
        {
            root = Some(body);
            result.push(ast.node(id).range.start);
            break;
        }
        if ast.node(id).stmt() == Some(&StmtKind::Switch) && matches!(cursor, Cursor::Break | Cursor::Case) {
            result.push(ast.node(id).loc.start);
            root = ast.node(id).children.iter().rev().copied().find(|&child| ast.node(child).stmt().is_some());
            bounds = Some(case_bounds(ast, id, n.range.start));
            break;
        }
        if cursor == Cursor::None {
            break;
        }
        current = ast.node(id).parent;
    }

    if let Some(root) = root {
        let mut collector = FlowCollector {
            ast,
            bounds: bounds.unwrap_or(ast.node(root).range),
            ignore: FlowTarget::empty(),
            found: Vec::new(),
        };
        collector.traverse(root);
        result.extend(collector.found);
    }
    result
}

fn to_highlight(
    ast: &ParsedAst,
    range: TextRange,
    kind: HighlightKind,
) -> Option<DocumentHighlight> {
    let location = ast.location(&FileRange::main(range))?;
    Some(DocumentHighlight {
        range: location.range,
        kind,
    })
}

pub fn find_document_highlights(
    ast: &ParsedAst,
    position: IdePosition,
) -> Vec<DocumentHighlight> {
    let Some(offset) = ast.offset_at(position) else {
        error!("[highlight] position {position} is outside {}", ast.main_path().display());
        return Vec::new();
    };

    let mut result = Vec::new();
    for_each_selection(ast, offset, |selection| {
        let Some(selection) = selection else {
            return false;
        };
        let targets = target_decls(ast, selection.node, DeclRelationSet::TEMPLATE_PATTERN | DeclRelationSet::ALIAS);
        if !targets.is_empty() {
            for r in find_refs(ast, &targets, true) {
                let kind = if r.roles.contains(SymbolRoles::WRITE) {
                    HighlightKind::Write
                } else if r.roles.contains(SymbolRoles::READ) {
                    HighlightKind::Read
                } else {
                    HighlightKind::Text
                };
                result.extend(to_highlight(ast, r.range, kind));
            }
            return true;
        }
        let flow = related_control_flow(ast, selection.node);
        if flow.is_empty() {
            return false;
        }
        debug!("[highlight] {} control flow locations", flow.len());
        for loc in flow {
            if let Some(tok) = ast.tokens().containing(loc) {
                result.extend(to_highlight(ast, tok.range, HighlightKind::Text));
            }
        }
        true
    });
    result
}

#[cfg(test)]
#[path = "../../tests/src/resolve/highlights_tests.rs"]
mod tests;
