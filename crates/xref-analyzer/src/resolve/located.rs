//! Preferred declaration and definition of resolved symbols, merged with index data.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::ide::navigation::{IdeLocation, IdePosition, IdeRange};
use crate::index::{
    LookupRequest, RelationKind, RelationsRequest, SymbolId, SymbolIndex, SymbolLocation, SymbolPosition,
    preferred_location,
};
use crate::semantic::{DeclId, DeclKind, ParsedAst};
use crate::vfs::{path_to_uri, uri_to_path};

/// A resolved symbol: where it is declared and, when unique, where it is defined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocatedSymbol {
    pub name: String,
    pub preferred_declaration: IdeLocation,
    pub definition: Option<IdeLocation>,
    pub id: Option<SymbolId>,
}

/// Declaration navigation should prefer for `decl`.
///
/// Objective-C interfaces and protocols prefer their definition over forward declarations.
pub fn get_preferred_decl(
    ast: &ParsedAst,
    decl: DeclId,
) -> DeclId {
    let canonical = ast.canonical(decl);
    match ast.decl(canonical).kind {
        DeclKind::ObjCInterface | DeclKind::ObjCProtocol => ast.group_definition(canonical).unwrap_or(canonical),
        _ => canonical,
    }
}

/// The unique definition of `decl`, when one is meaningful.
pub fn get_definition(
    ast: &ParsedAst,
    decl: DeclId,
) -> Option<DeclId> {
    let d = ast.decl(decl);
    match d.kind {
        kind if kind.is_tag() || kind.is_function() || kind == DeclKind::Var => ast.group_definition(decl),
        DeclKind::ClassTemplate | DeclKind::FunctionTemplate => {
            d.templated.and_then(|pattern| ast.group_definition(pattern))
        },
        DeclKind::ObjCMethod => {
            if d.is_this_definition() {
                return Some(decl);
            }
            if let Some(definition) = ast.group_definition(decl) {
                return Some(definition);
            }
            let container = d.context?;
            let container_decl = ast.decl(container);
            if container_decl.is_invalid() {
                return None;
            }
            let implementation = match container_decl.kind {
                DeclKind::ObjCCategory if container_decl.is_anonymous() => container_decl
                    .class_interface
                    .and_then(|interface| ast.decl(interface).objc_impl),
                _ => container_decl.objc_impl,
            }?;
            ast.find_objc_method(implementation, decl)
        },
        DeclKind::ObjCInterface => d.objc_impl.or_else(|| ast.decl(get_preferred_decl(ast, decl)).objc_impl),
        DeclKind::ObjCCategory => {
            if d.is_anonymous() {
                // A class extension is implemented by the class implementation.
                d.class_interface.and_then(|interface| ast.decl(interface).objc_impl)
            } else {
                d.objc_impl
            }
        },
        DeclKind::Field
        | DeclKind::EnumConstant
        | DeclKind::Param
        | DeclKind::TemplateTypeParam
        | DeclKind::NonTypeTemplateParam
        | DeclKind::TemplateTemplateParam => Some(decl),
        _ => None,
    }
}

/// Index form of an editor location.
pub fn to_index_location(location: &IdeLocation) -> Option<SymbolLocation> {
    let uri = path_to_uri(&location.file_path)?;
    let range = location.range;
    Some(SymbolLocation::new(
        uri,
        SymbolPosition::new(range.start.line, range.start.character),
        SymbolPosition::new(range.end.line, range.end.character),
    ))
}

/// Editor form of an index location, or `None` when the URI is not a local file.
pub fn index_to_location(location: &SymbolLocation) -> Option<IdeLocation> {
    if !location.is_set() {
        return None;
    }
    let Some(path) = uri_to_path(&location.file_uri) else {
        debug!("[locate] dropping location with unresolvable uri {}", location.file_uri);
        return None;
    };
    let range = IdeRange::new(
        IdePosition::new(location.start.line, location.start.column),
        IdePosition::new(location.end.line, location.end.column),
    );
    Some(IdeLocation::new(path, range))
}

/// Builds the AST-only result for `decl`, or `None` when its location cannot be shown.
pub fn located_from_decl(
    ast: &ParsedAst,
    decl: DeclId,
) -> Option<LocatedSymbol> {
    let preferred = get_preferred_decl(ast, decl);
    let preferred_declaration = ast.location(&ast.decl(preferred).name_loc)?;
    let definition = get_definition(ast, preferred).and_then(|def| ast.location(&ast.decl(def).name_loc));
    Some(LocatedSymbol {
        name: ast.print_name(preferred),
        preferred_declaration,
        definition,
        id: ast.symbol_id(preferred),
    })
}

fn merge_ide_locations(
    ast_location: &IdeLocation,
    index_location: Option<&SymbolLocation>,
) -> Option<IdeLocation> {
    let ast_index_location = to_index_location(ast_location)?;
    index_to_location(&preferred_location(&ast_index_location, index_location))
}

/// Fills in declaration/definition locations from the index with one batch lookup.
pub fn enhance_from_index(
    results: &mut [LocatedSymbol],
    index: &dyn SymbolIndex,
) {
    let ids: BTreeSet<SymbolId> = results.iter().filter_map(|result| result.id).collect();
    if ids.is_empty() {
        return;
    }
    let request = LookupRequest {
        ids,
    };
    let outcome = index.lookup(&request, &mut |symbol| {
        for result in results.iter_mut().filter(|result| result.id == Some(symbol.id)) {
            if let Some(definition) = result.definition.clone() {
                // The index may know a declaration in a header the AST never saw.
                if let Some(declaration) = symbol.canonical_declaration.as_ref().and_then(index_to_location) {
                    result.preferred_declaration = declaration;
                }
                if let Some(merged) = merge_ide_locations(&definition, symbol.definition.as_ref()) {
                    result.definition = Some(merged);
                }
            } else {
                result.definition = symbol.definition.as_ref().and_then(index_to_location);
                if let Some(merged) =
                    merge_ide_locations(&result.preferred_declaration, symbol.canonical_declaration.as_ref())
                {
                    result.preferred_declaration = merged;
                }
            }
        }
    });
    if let Err(err) = outcome {
        warn!("[locate] index lookup failed: {err}");
    }
}

/// Symbols related to `ids` by `predicate`, as located symbols from the index.
pub fn find_implementors(
    ids: BTreeSet<SymbolId>,
    predicate: RelationKind,
    index: &dyn SymbolIndex,
) -> Vec<LocatedSymbol> {
    if ids.is_empty() {
        return Vec::new();
    }
    let request = RelationsRequest {
        subjects: ids,
        predicate,
        limit: None,
    };
    let mut results = Vec::new();
    let outcome = index.relations(&request, &mut |_, object| {
        let Some(declaration) = object.canonical_declaration.as_ref().and_then(index_to_location) else {
            debug!("[locate] skipping implementor {} without usable declaration", object.qualified_name());
            return;
        };
        let definition = object.definition.as_ref().and_then(index_to_location);
        results.push(LocatedSymbol {
            name: object.name.clone(),
            preferred_declaration: declaration,
            definition,
            id: Some(object.id),
        });
    });
    if let Err(err) = outcome {
        warn!("[locate] index relations query failed: {err}");
    }
    results
}

#[cfg(test)]
#[path = "../../tests/src/resolve/located_tests.rs"]
mod tests;
