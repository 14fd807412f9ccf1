//! Go-to-definition: what the cursor refers to, with the fallback chain.

use std::collections::BTreeSet;

use tracing::{debug, error, info};

use crate::config::FallbackSettings;
use crate::ide::navigation::{IdeLocation, IdePosition, IdeRange};
use crate::index::{RelationKind, SymbolId, SymbolIndex};
use crate::semantic::{AttrKind, DeclId, DeclKind, NodeKind, ParsedAst, SpelledToken, TypeRef};
use crate::syntax::{SpelledWord, TokenKind};

use super::fallback::{find_nearby_identifier, locate_symbol_textually};
use super::located::{LocatedSymbol, enhance_from_index, find_implementors, located_from_decl};
use super::targets::{DeclRelationSet, decl_at_position_with_relations, type_target_decls};

/// The file included by an `#include` on the cursor's line.
pub fn locate_file_referent(
    ast: &ParsedAst,
    position: IdePosition,
) -> Option<LocatedSymbol> {
    let inclusion = ast.includes().iter().find(|inc| inc.resolved.is_some() && inc.line == position.line)?;
    let path = ast.sources().path(inclusion.resolved?)?;
    let location = IdeLocation::new(path, IdeRange::default());
    Some(LocatedSymbol {
        name: path.file_name().map(|name| name.to_string_lossy().into_owned()).unwrap_or_default(),
        preferred_declaration: location.clone(),
        definition: Some(location),
        id: None,
    })
}

/// The macro the identifier token names, located at its definition.
pub fn locate_macro_referent(
    ast: &ParsedAst,
    token: &SpelledToken,
) -> Option<LocatedSymbol> {
    let text = token.text(ast.main_text());
    let macro_id = ast.macros().locate(token.range, text)?;
    let def = ast.macros().def(macro_id)?;
    let location = ast.location(&def.name_loc)?;
    Some(LocatedSymbol {
        name: def.name.clone(),
        preferred_declaration: location.clone(),
        definition: Some(location),
        id: ast.macro_symbol_id(macro_id),
    })
}

/// Declarations of a type, as if the type had been written at the cursor.
pub fn locate_symbol_for_type(
    ast: &ParsedAst,
    ty: &TypeRef,
    index: Option<&dyn SymbolIndex>,
) -> Vec<LocatedSymbol> {
    let non_reference = match ty {
        TypeRef::Reference(inner) => inner.as_ref(),
        other => other,
    };
    let decls = type_target_decls(ast, non_reference, DeclRelationSet::TEMPLATE_PATTERN | DeclRelationSet::ALIAS);
    let mut results: Vec<LocatedSymbol> = decls.into_iter().filter_map(|decl| located_from_decl(ast, decl)).collect();
    if let Some(index) = index {
        enhance_from_index(&mut results, index);
    }
    results
}

fn objc_method_is_touched(
    ast: &ParsedAst,
    method: DeclId,
    touched: &SpelledToken,
) -> bool {
    let decl = ast.decl(method);
    std::iter::once(&decl.name_loc)
        .chain(decl.selector_locs.iter())
        .any(|loc| loc.is_main() && loc.range.start == touched.range.start)
}

/// Resolves the tree node at `offset`, applying the navigation special cases.
pub fn locate_ast_referent<'a>(
    ast: &'a ParsedAst,
    offset: u32,
    touched: Option<&SpelledToken>,
    index: Option<&dyn SymbolIndex>,
    node_kind: &mut Option<&'a NodeKind>,
) -> Vec<LocatedSymbol> {
    let relations = DeclRelationSet::TEMPLATE_PATTERN | DeclRelationSet::ALIAS;
    let (candidates, kind) = decl_at_position_with_relations(ast, offset, relations);
    *node_kind = kind;

    let mut results: Vec<LocatedSymbol> = Vec::new();
    let mut add_result = |decl: DeclId| {
        if let Some(located) = located_from_decl(ast, decl) {
            results.push(located);
        }
    };
    let mut virtual_methods: BTreeSet<SymbolId> = BTreeSet::new();
    let on_override_marker = matches!(kind, Some(NodeKind::Attr(AttrKind::Override | AttrKind::Final)));

    for &(decl, relations) in &candidates {
        let d = ast.decl(decl);
        if d.kind.is_cxx_method() {
            // `virtual void ^f() = 0;` also jumps to the overrides.
            if d.is_pure()
                && touched.is_some_and(|tok| d.name_loc.is_main() && d.name_loc.range.start == tok.range.start)
                && let Some(id) = ast.symbol_id(decl)
            {
                debug!("[locate] pure virtual {} at its name, collecting overrides", d.name);
                virtual_methods.insert(id);
            }
            // `void f() ^override;` jumps to the overridden methods.
            if on_override_marker {
                for &overridden in &d.overridden {
                    add_result(overridden);
                }
                continue;
            }
        }

        if d.kind == DeclKind::ObjCMethod
            && d.is_this_definition()
            && touched.is_some_and(|tok| objc_method_is_touched(ast, decl, tok))
        {
            for &overridden in &d.overridden {
                add_result(overridden);
            }
            add_result(decl);
            continue;
        }

        // `using ns::^Foo;` prefers what the alias names.
        let point = touched.map_or(offset, |tok| tok.range.start);
        if relations.contains(DeclRelationSet::ALIAS)
            && candidates.len() > 1
            && d.range.is_main()
            && d.range.range.start <= point
            && point < d.range.range.end
        {
            continue;
        }

        // The point of declaration of a specialization goes to the primary template.
        if d.kind == DeclKind::ClassTemplateSpecialization
            && touched.is_some_and(|tok| d.name_loc.is_main() && d.name_loc.range.start == tok.range.start)
            && let Some(template) = d.specialized_template
        {
            add_result(template);
            continue;
        }

        // A category named at its class also surfaces the class interface.
        if d.kind == DeclKind::ObjCCategory
            && let Some(interface) = d.class_interface
            && let Some(tok) = touched
            && ((d.name_loc.is_main() && d.name_loc.range.start == tok.range.start)
                || ast.decl(interface).name == tok.text(ast.main_text()))
        {
            add_result(interface);
        }

        add_result(decl);
    }

    if let Some(index) = index {
        enhance_from_index(&mut results, index);
        results.extend(find_implementors(virtual_methods, RelationKind::OverriddenBy, index));
    }
    results
}

/// Everything the symbol under `position` could mean, best guesses first.
pub fn locate_symbol_at(
    ast: &ParsedAst,
    position: IdePosition,
    index: Option<&dyn SymbolIndex>,
    fallback: &FallbackSettings,
) -> Vec<LocatedSymbol> {
    if let Some(file) = locate_file_referent(ast, position) {
        return vec![file];
    }
    let Some(offset) = ast.offset_at(position) else {
        error!("[locate] position {position} is outside {}", ast.main_path().display());
        return Vec::new();
    };

    for tok in ast.tokens().touching(offset) {
        if matches!(tok.kind, TokenKind::KwAuto | TokenKind::KwDecltype)
            && let Some(deduced) = ast.deduced_type_at(tok.range.start)
        {
            let results = locate_symbol_for_type(ast, deduced, index);
            if !results.is_empty() {
                return results;
            }
        }
    }

    let touched = ast.tokens().spelled_identifier_touching(offset).copied();
    if let Some(tok) = &touched
        && let Some(macro_result) = locate_macro_referent(ast, tok)
    {
        return vec![macro_result];
    }

    let mut node_kind = None;
    let results = locate_ast_referent(ast, offset, touched.as_ref(), index, &mut node_kind);
    if !results.is_empty() {
        return results;
    }

    let Some(word) = SpelledWord::touching(offset, ast.main_text(), ast.tokens()) else {
        return Vec::new();
    };
    if fallback.nearby_identifier
        && let Some(nearby) = find_nearby_identifier(ast, &word)
    {
        if let Some(macro_result) = locate_macro_referent(ast, &nearby) {
            info!("[locate] found macro `{}` near `{}`", macro_result.name, word.text);
            return vec![macro_result];
        }
        // The textual stage sees the node kind of this last attempt.
        let results = locate_ast_referent(ast, nearby.range.start, Some(&nearby), index, &mut node_kind);
        if !results.is_empty() {
            info!("[locate] found `{}` through a nearby identifier", word.text);
            return results;
        }
    }
    if fallback.textual_search {
        return locate_symbol_textually(ast, &word, index, node_kind);
    }
    Vec::new()
}

#[cfg(test)]
#[path = "../../tests/src/resolve/locate_tests.rs"]
mod tests;
