//! Heuristics used when the cursor does not resolve through the tree.

use tracing::{debug, info, trace, warn};

use crate::index::{FuzzyFindRequest, SymbolIndex, SymbolKind, score_symbol};
use crate::semantic::{NodeKind, ParsedAst, SpelledToken};
use crate::syntax::{SpelledWord, visible_namespaces};
use crate::text_pos::{line_of_byte_offset, line_start_offset};
use crate::vfs::path_to_uri;

use super::located::{LocatedSymbol, index_to_location};

/// Results fetched from the index before filtering.
pub const TEXTUAL_QUERY_LIMIT: u32 = 10;
/// More scored candidates than this means the guess is too uncertain.
pub const TEXTUAL_CANDIDATE_GATE: usize = 5;
/// Most results the textual stage returns.
pub const TEXTUAL_RESULT_CAP: usize = 3;

/// An identifier token spelled like `word` close to it, for words the parser
/// never saw (comments, disabled regions, macro bodies).
///
/// Lines after the word cost their distance; lines before it cost twice that.
pub fn find_nearby_identifier(
    ast: &ParsedAst,
    word: &SpelledWord<'_>,
) -> Option<SpelledToken> {
    if word.expanded_token || word.in_string_literal() {
        return None;
    }
    let text = ast.main_text();
    let word_line = line_of_byte_offset(text, word.range.start as usize);
    let cost = |offset: u32| {
        let line = line_of_byte_offset(text, offset as usize);
        if line >= word_line {
            line - word_line
        } else {
            2 * (word_line - line)
        }
    };

    let max_distance = 1u32 << word.text.len().min(31);
    let line_min = (word_line + 1).saturating_sub(max_distance / 2);
    let line_max = word_line.saturating_add(1).saturating_add(max_distance);
    let offset_min = line_start_offset(text, line_min) as u32;
    let offset_max = line_start_offset(text, line_max) as u32;

    let mut best: Option<(u32, SpelledToken)> = None;
    // Returns true once no later token in this direction can do better.
    let mut consider = |tok: &SpelledToken| -> bool {
        if tok.range.start < offset_min || tok.range.start > offset_max {
            return true;
        }
        if !(tok.is_identifier() && tok.text(text) == word.text) {
            return false;
        }
        if tok.range.start == word.range.start {
            return false;
        }
        let tok_cost = cost(tok.range.start);
        if best.is_some_and(|(best_cost, _)| tok_cost >= best_cost) {
            return true;
        }
        // Tokens in dead code are never part of the tree; macro names may still be.
        if !(tok.expanded || tok.starts_expansion) {
            return false;
        }
        best = Some((tok_cost, *tok));
        false
    };

    let tokens = ast.tokens().tokens();
    let split = ast.tokens().partition_point(word.range.start);
    for tok in &tokens[split..] {
        if consider(tok) {
            break;
        }
    }
    for tok in tokens[..split].iter().rev() {
        if consider(tok) {
            break;
        }
    }

    if let Some((best_cost, tok)) = best {
        debug!(
            "[fallback] nearby identifier `{}` at {} (cost {best_cost}) for word at {}",
            word.text, tok.range, word.range
        );
    }
    best.map(|(_, tok)| tok)
}

/// Looks `word` up by name in the index, scoped to the namespaces visible at it.
///
/// Returns nothing when too many symbols match to pick confidently.
pub fn locate_symbol_textually(
    ast: &ParsedAst,
    word: &SpelledWord<'_>,
    index: Option<&dyn SymbolIndex>,
    node_kind: Option<&NodeKind>,
) -> Vec<LocatedSymbol> {
    let dependent = matches!(
        node_kind,
        Some(NodeKind::DependentName {
            ..
        })
    );
    // Real identifiers resolve through the tree, except dependent names.
    if (word.expanded_token && !dependent) || !word.likely_identifier {
        return Vec::new();
    }
    let Some(index) = index else {
        return Vec::new();
    };
    if word.in_string_literal() {
        return Vec::new();
    }

    let prefix = ast.main_text().get(..word.range.start as usize).unwrap_or("");
    let scopes = visible_namespaces(prefix)
        .into_iter()
        .map(|ns| if ns.is_empty() { ns } else { format!("{ns}::") })
        .collect();
    let proximity = path_to_uri(ast.main_path());
    let request = FuzzyFindRequest {
        query: word.text.to_owned(),
        scopes,
        any_scope: true,
        limit: Some(TEXTUAL_QUERY_LIMIT),
        proximity_paths: proximity.iter().cloned().collect(),
        ..FuzzyFindRequest::default()
    };

    let mut too_many = false;
    let mut scored: Vec<(f32, LocatedSymbol)> = Vec::new();
    let outcome = index.fuzzy_find(&request, &mut |symbol| {
        if symbol.name != word.text {
            return;
        }
        // Constructors share the class name; the class is the better guess.
        if symbol.kind == SymbolKind::Constructor {
            return;
        }
        let Some(declaration) = symbol.canonical_declaration.as_ref().and_then(index_to_location) else {
            debug!("[fallback] no usable declaration for {}", symbol.qualified_name());
            return;
        };
        let mut located = LocatedSymbol {
            name: format!("{}{}", symbol.name, symbol.template_specialization_args),
            preferred_declaration: declaration,
            definition: None,
            id: Some(symbol.id),
        };
        if let Some(definition) = &symbol.definition {
            let Some(definition) = index_to_location(definition) else {
                debug!("[fallback] no usable definition for {}", symbol.qualified_name());
                return;
            };
            located.preferred_declaration = definition.clone();
            located.definition = Some(definition);
        }
        if scored.len() >= TEXTUAL_CANDIDATE_GATE {
            too_many = true;
            return;
        }
        let score = score_symbol(symbol, proximity.as_deref());
        trace!("[fallback] candidate {} scored {score}", symbol.qualified_name());
        scored.push((score, located));
    });
    if let Err(err) = outcome {
        warn!("[fallback] textual lookup of `{}` failed: {err}", word.text);
        return Vec::new();
    }
    if too_many {
        info!("[fallback] ignored textual matches for `{}`: too many candidates", word.text);
        return Vec::new();
    }

    scored.sort_by(|lhs, rhs| rhs.0.total_cmp(&lhs.0));
    scored.into_iter().take(TEXTUAL_RESULT_CAP).map(|(_, located)| located).collect()
}

#[cfg(test)]
#[path = "../../tests/src/resolve/fallback_tests.rs"]
mod tests;
