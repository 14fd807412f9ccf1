//! Fusion of two records for the same symbol.
//!
//! Shards are merged with these rules, and so are AST and index locations
//! when a navigation result is enhanced.

use super::symbol::{Symbol, SymbolKind, SymbolLocation, SymbolOrigin};

/// Suffixes of files that generate code; their locations beat the generated ones.
const CODEGEN_SUFFIXES: &[&str] = &[".proto"];

/// Whether `l` is strictly preferred to `r`.
pub fn prefer(
    l: Option<&SymbolLocation>,
    r: Option<&SymbolLocation>,
) -> bool {
    let Some(l) = l.filter(|loc| loc.is_set()) else {
        return false;
    };
    let Some(r) = r.filter(|loc| loc.is_set()) else {
        return true;
    };
    let has_codegen_suffix =
        |loc: &SymbolLocation| CODEGEN_SUFFIXES.iter().any(|suffix| loc.file_uri.ends_with(suffix));
    has_codegen_suffix(l) && !has_codegen_suffix(r)
}

/// Merges two records of the same symbol.
///
/// Information from the side that saw a definition wins; on a tie `l` wins.
/// Locations from the other side are taken only when strictly preferred.
pub fn merge_symbol(
    l: &Symbol,
    r: &Symbol,
) -> Symbol {
    debug_assert_eq!(l.id, r.id);
    let prefer_r = r.definition.is_some() && l.definition.is_none();
    let merge_includes = l.definition.is_none() == r.definition.is_none();
    let (mut s, o) = if prefer_r {
        (r.clone(), l)
    } else {
        (l.clone(), r)
    };

    if prefer(o.canonical_declaration.as_ref(), s.canonical_declaration.as_ref()) {
        s.canonical_declaration = o.canonical_declaration.clone();
    }
    if prefer(o.definition.as_ref(), s.definition.as_ref()) {
        s.definition = o.definition.clone();
    }
    s.references += o.references;
    if s.signature.is_empty() {
        s.signature = o.signature.clone();
    }
    if s.documentation.is_empty() {
        // A forward class declaration's comment is rarely about the class.
        let is_class = matches!(s.kind, SymbolKind::Class | SymbolKind::Struct | SymbolKind::Union);
        if !is_class || s.definition.is_none() {
            s.documentation = o.documentation.clone();
        }
    }
    if s.return_type.is_empty() {
        s.return_type = o.return_type.clone();
    }
    if s.ty.is_empty() {
        s.ty = o.ty.clone();
    }

    for header in &o.include_headers {
        if let Some(existing) = s.include_headers.iter_mut().find(|existing| existing.header == header.header) {
            existing.references += header.references;
        } else if merge_includes {
            s.include_headers.push(header.clone());
        }
    }

    s.origin |= o.origin | SymbolOrigin::MERGE;
    s.flags |= o.flags;
    s
}

/// Picks between an AST-derived and an index-derived location of one entity.
///
/// Both are wrapped in otherwise empty records so only the locations take
/// part in the decision.
pub fn preferred_location(
    ast: &SymbolLocation,
    index: Option<&SymbolLocation>,
) -> SymbolLocation {
    let mut ast_symbol = Symbol::default();
    ast_symbol.canonical_declaration = Some(ast.clone());
    let mut index_symbol = Symbol::default();
    index_symbol.canonical_declaration = index.cloned();
    merge_symbol(&ast_symbol, &index_symbol).canonical_declaration.unwrap_or_else(|| ast.clone())
}

#[cfg(test)]
#[path = "../../tests/src/index/merge_tests.rs"]
mod tests;
