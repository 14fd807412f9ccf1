//! Maps a cursor offset to the tree node it selects.

use crate::semantic::{NodeId, NodeKind, ParsedAst, TextRange};
use crate::syntax::TokenKind;

/// The node a selection resolved to.
#[derive(Debug, Clone, Copy)]
pub struct Selection<'a> {
    pub node: NodeId,
    /// Kind of the node the cursor is on, before any redirection.
    pub kind: &'a NodeKind,
}

impl<'a> Selection<'a> {
    /// Attributes do not target anything, so the node they decorate stands in.
    /// `kind` keeps reporting the attribute.
    pub fn target_node(
        &self,
        ast: &ParsedAst,
    ) -> NodeId {
        let node = ast.node(self.node);
        match node.parent {
            Some(parent) if node.is_attr() => parent,
            _ => self.node,
        }
    }
}

fn should_ignore(kind: TokenKind) -> bool {
    matches!(kind, TokenKind::Comment | TokenKind::Semi | TokenKind::Comma)
}

/// Candidate ranges for a point selection at `offset`.
///
/// The token right of the cursor comes first, then the one on its left. When
/// no usable token touches the cursor, the empty range at `offset` is the only candidate.
pub fn point_bounds(
    ast: &ParsedAst,
    offset: u32,
) -> Vec<TextRange> {
    let mut bounds: Vec<TextRange> = ast
        .tokens()
        .touching(offset)
        .iter()
        .rev()
        .filter(|tok| !should_ignore(tok.kind))
        .map(|tok| tok.range)
        .collect();
    if bounds.is_empty() {
        bounds.push(TextRange::empty(offset));
    }
    bounds
}

fn covers(
    node: TextRange,
    selection: TextRange,
) -> bool {
    if selection.is_empty() {
        node.start <= selection.start && selection.start < node.end
    } else {
        node.contains_range(selection)
    }
}

/// Deepest node covering `range`, or `None` when only the translation unit does.
pub fn common_ancestor(
    ast: &ParsedAst,
    range: TextRange,
) -> Option<NodeId> {
    let mut current = NodeId::ROOT;
    loop {
        let next = ast
            .node(current)
            .children
            .iter()
            .copied()
            .filter(|&child| covers(ast.node(child).range, range))
            .min_by_key(|&child| ast.node(child).range.len());
        match next {
            Some(child) => current = child,
            None => break,
        }
    }
    (current != NodeId::ROOT).then_some(current)
}

/// Runs `visit` on each interpretation of a point selection until it returns `true`.
pub fn for_each_selection<'a>(
    ast: &'a ParsedAst,
    offset: u32,
    mut visit: impl FnMut(Option<Selection<'a>>) -> bool,
) -> bool {
    for range in point_bounds(ast, offset) {
        let selection = common_ancestor(ast, range).map(|node| Selection {
            node,
            kind: &ast.node(node).kind,
        });
        if visit(selection) {
            return true;
        }
    }
    false
}

#[cfg(test)]
#[path = "../../tests/src/resolve/selection_tests.rs"]
mod tests;
