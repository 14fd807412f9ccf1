//! Implementations, type-of, symbol details and include links.

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::error;

use crate::ide::navigation::{IdeLocation, IdePosition, IdeRange};
use crate::index::{RelationKind, SymbolId, SymbolIndex};
use crate::semantic::{DeclKind, FileRange, NodeId, NodeKind, ParsedAst, TypeRef};

use super::located::{LocatedSymbol, find_implementors, get_definition, get_preferred_decl};
use super::locate::locate_symbol_for_type;
use super::selection::for_each_selection;
use super::targets::{DeclRelationSet, decl_at_position};

/// Overrides of the virtual method, or subclasses of the class, at `position`.
///
/// Only the index knows about subclasses, so this needs one.
pub fn find_implementations(
    ast: &ParsedAst,
    position: IdePosition,
    index: Option<&dyn SymbolIndex>,
) -> Vec<LocatedSymbol> {
    let Some(index) = index else {
        return Vec::new();
    };
    let Some(offset) = ast.offset_at(position) else {
        error!("[locate] position {position} is outside {}", ast.main_path().display());
        return Vec::new();
    };

    let mut ids: BTreeSet<SymbolId> = BTreeSet::new();
    let mut query = RelationKind::OverriddenBy;
    for decl in decl_at_position(ast, offset, DeclRelationSet::TEMPLATE_PATTERN | DeclRelationSet::ALIAS) {
        let d = ast.decl(decl);
        let kind = match d.kind {
            kind if kind.is_cxx_method() => {
                if !d.is_virtual() {
                    continue;
                }
                RelationKind::OverriddenBy
            },
            kind if kind.is_record() => RelationKind::BaseOf,
            DeclKind::ObjCMethod => RelationKind::OverriddenBy,
            DeclKind::ObjCInterface => RelationKind::BaseOf,
            _ => continue,
        };
        if let Some(id) = ast.symbol_id(decl) {
            ids.insert(id);
            query = kind;
        }
    }
    find_implementors(ids, query, index)
}

/// The type the node stands for, before unwrapping.
fn type_for_node(
    ast: &ParsedAst,
    node: NodeId,
) -> Option<TypeRef> {
    let mut current = node;
    // A namespace qualifier stands for what it qualifies.
    while let NodeKind::NestedNameSpecifier {
        ..
    } = ast.node(current).kind
    {
        current = ast.node(current).parent?;
    }

    match &ast.node(current).kind {
        NodeKind::TypeLoc {
            ty,
        } => match ty {
            TypeRef::Deduced(Some(inner)) => Some(inner.as_ref().clone()),
            // An alias written as a type means its underlying type.
            TypeRef::Decl(decl) if ast.decl(*decl).kind.is_typedef_name() => ast.decl(*decl).underlying.clone(),
            other => Some(other.clone()),
        },
        NodeKind::CtorInitializer {
            member,
            base,
        } => match member {
            Some(member) => ast.decl(*member).ty.clone(),
            None => base.clone(),
        },
        NodeKind::BaseSpecifier {
            ty,
        } => Some(ty.clone()),
        NodeKind::Decl(decl) => {
            let mut decl = *decl;
            if ast.decl(decl).kind.is_template()
                && let Some(pattern) = ast.decl(decl).templated
            {
                decl = pattern;
            }
            let d = ast.decl(decl);
            if d.kind.is_typedef_name() {
                d.underlying.clone()
            } else if d.kind.is_type() {
                Some(TypeRef::Decl(decl))
            } else if d.kind.is_value() {
                d.ty.clone()
            } else {
                None
            }
        },
        NodeKind::DeclRef {
            target,
            ..
        } => ast.decl(*target).ty.clone(),
        NodeKind::ObjCMessage {
            method,
            ..
        } => ast.decl(*method).ty.clone(),
        NodeKind::Expr {
            ty,
        } => ty.clone(),
        _ => None,
    }
}

/// Types worth navigating to for `ty`: aliases as written, pointees, return types,
/// and for smart pointers the pointee followed by the wrapper.
pub fn unwrap_find_type(
    ast: &ParsedAst,
    ty: &TypeRef,
    out: &mut Vec<TypeRef>,
) {
    let Some(ty) = ty.strip_deduced() else {
        return;
    };
    match ty {
        TypeRef::Decl(decl) if ast.decl(*decl).kind.is_typedef_name() => out.push(ty.clone()),
        TypeRef::Pointer(inner) | TypeRef::Reference(inner) | TypeRef::Array(inner) => {
            unwrap_find_type(ast, inner, out)
        },
        TypeRef::Function {
            ret,
            ..
        } => unwrap_find_type(ast, ret, out),
        _ => {
            if let Some(pointee) = ast.pointee_type(ty) {
                unwrap_find_type(ast, &pointee, out);
            }
            out.push(ty.clone());
        },
    }
}

/// Declarations of the type of the expression or declaration at `position`.
pub fn find_type(
    ast: &ParsedAst,
    position: IdePosition,
    index: Option<&dyn SymbolIndex>,
) -> Vec<LocatedSymbol> {
    let Some(offset) = ast.offset_at(position) else {
        error!("[locate] position {position} is outside {}", ast.main_path().display());
        return Vec::new();
    };
    let mut result = Vec::new();
    for_each_selection(ast, offset, |selection| {
        result.clear();
        let Some(ty) = selection.and_then(|selection| type_for_node(ast, selection.node)) else {
            return false;
        };
        let mut types = Vec::new();
        unwrap_find_type(ast, &ty, &mut types);
        // `unique_ptr<unique_ptr<T>>` legitimately yields repeated entries.
        for ty in &types {
            result.extend(locate_symbol_for_type(ast, ty, index));
        }
        !result.is_empty()
    });
    result
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolDetails {
    pub name: String,
    /// Enclosing scope with a trailing `::`, or the enclosing declaration's name.
    pub container_name: String,
    pub usr: Option<String>,
    pub id: Option<SymbolId>,
    pub declaration_range: Option<IdeLocation>,
    pub definition_range: Option<IdeLocation>,
}

/// `"a::b::c"` -> `("a::b::", "c")`.
pub fn split_qualified_name(name: &str) -> (&str, &str) {
    match name.rfind("::") {
        Some(pos) => (&name[..pos + 2], &name[pos + 2..]),
        None => ("", name),
    }
}

/// Identity details of every symbol at `position`, plus the macro named there.
pub fn symbol_info(
    ast: &ParsedAst,
    position: IdePosition,
) -> Vec<SymbolDetails> {
    let Some(offset) = ast.offset_at(position) else {
        return Vec::new();
    };
    let relations = DeclRelationSet::TEMPLATE_PATTERN | DeclRelationSet::ALIAS | DeclRelationSet::UNDERLYING;
    let mut results = Vec::new();
    for decl in decl_at_position(ast, offset, relations) {
        let decl = get_preferred_decl(ast, decl);
        let qualified = ast.qualified_name(decl);
        let (container, name) = split_qualified_name(&qualified);
        let mut container_name = container.to_owned();
        if container_name.is_empty()
            && let Some(context) = ast.decl(decl).context
        {
            container_name = ast.qualified_name(context);
        }
        let usr = ast.usr(decl).map(str::to_owned);
        results.push(SymbolDetails {
            name: name.to_owned(),
            container_name,
            id: usr.as_deref().map(SymbolId::from_usr),
            usr,
            declaration_range: ast.location(&ast.decl(decl).name_loc),
            definition_range: get_definition(ast, decl).and_then(|def| ast.location(&ast.decl(def).name_loc)),
        });
    }

    let Some(tok) = ast.tokens().spelled_identifier_touching(offset) else {
        return results;
    };
    if let Some(macro_id) = ast.macros().locate(tok.range, tok.text(ast.main_text()))
        && let Some(def) = ast.macros().def(macro_id)
    {
        let usr = ast.macro_usr(macro_id);
        results.push(SymbolDetails {
            name: def.name.clone(),
            id: usr.as_deref().map(SymbolId::from_usr),
            usr,
            ..SymbolDetails::default()
        });
    }
    results
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentLink {
    pub range: IdeRange,
    pub target: PathBuf,
}

/// One link per resolved `#include`, covering the written file name.
pub fn document_links(ast: &ParsedAst) -> Vec<DocumentLink> {
    ast.includes()
        .iter()
        .filter_map(|inclusion| {
            let target = ast.sources().path(inclusion.resolved?)?.to_path_buf();
            let location = ast.location(&FileRange::main(inclusion.written_range))?;
            Some(DocumentLink {
                range: location.range,
                target,
            })
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/src/resolve/navigation_tests.rs"]
mod tests;
