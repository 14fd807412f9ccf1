//! Type hierarchy: supertypes from the tree, subtypes from the index.

use std::collections::BTreeSet;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::ide::navigation::{IdePosition, IdeRange};
use crate::index::{LookupRequest, RelationKind, RelationsRequest, Symbol, SymbolId, SymbolIndex, SymbolKind};
use crate::semantic::{DeclId, DeclKind, ParsedAst, TypeRef};
use crate::vfs::path_to_uri;

use super::located::index_to_location;
use super::selection::for_each_selection;
use super::targets::{DeclRelationSet, explicit_reference_targets, template_pattern};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeHierarchyDirection {
    Children,
    Parents,
    Both,
}

impl TypeHierarchyDirection {
    fn wants_children(self) -> bool {
        matches!(self, TypeHierarchyDirection::Children | TypeHierarchyDirection::Both)
    }
}

/// Payload that lets a client expand an item later without starting over.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveParams {
    pub symbol_id: Option<SymbolId>,
    /// `None` when the parents were never computed.
    pub parents: Option<Vec<ResolveParams>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeHierarchyItem {
    pub name: String,
    pub detail: Option<String>,
    pub kind: SymbolKind,
    pub deprecated: bool,
    pub uri: String,
    pub range: IdeRange,
    pub selection_range: IdeRange,
    pub parents: Option<Vec<TypeHierarchyItem>>,
    pub children: Option<Vec<TypeHierarchyItem>>,
    pub data: ResolveParams,
}

/// Fields shared by type and call hierarchy items.
pub(crate) struct ItemParts {
    pub name: String,
    pub detail: Option<String>,
    pub kind: SymbolKind,
    pub uri: String,
    pub range: IdeRange,
    pub selection_range: IdeRange,
}

/// Item fields for a declaration of the snapshot, or `None` when it has no usable file.
pub(crate) fn decl_item_parts(
    ast: &ParsedAst,
    decl: DeclId,
) -> Option<ItemParts> {
    let d = ast.decl(decl);
    let selection = ast.location(&d.name_loc)?;
    let uri = path_to_uri(&selection.file_path)?;
    let mut range = match ast.location(&d.range) {
        Some(full) if full.is_in(&selection.file_path) => full.range,
        _ => selection.range,
    };
    // Clients require the selection to sit inside the range.
    if !range.contains(&selection.range) {
        range = selection.range;
    }
    Some(ItemParts {
        name: ast.print_name(decl),
        detail: None,
        kind: ast.symbol_kind(decl),
        uri,
        range,
        selection_range: selection.range,
    })
}

/// Item fields for an index symbol, placed at its definition or else its declaration.
pub(crate) fn symbol_item_parts(symbol: &Symbol) -> Option<ItemParts> {
    let raw = symbol.definition.as_ref().filter(|loc| loc.is_set()).or(symbol.canonical_declaration.as_ref())?;
    let Some(location) = index_to_location(raw) else {
        warn!("[hierarchy] cannot place {} at {}", symbol.qualified_name(), raw.file_uri);
        return None;
    };
    Some(ItemParts {
        name: symbol.name.clone(),
        detail: Some(symbol.qualified_name()),
        kind: symbol.kind,
        uri: raw.file_uri.clone(),
        range: location.range,
        selection_range: location.range,
    })
}

impl TypeHierarchyItem {
    fn from_parts(
        parts: ItemParts,
        deprecated: bool,
        symbol_id: Option<SymbolId>,
    ) -> Self {
        Self {
            name: parts.name,
            detail: parts.detail,
            kind: parts.kind,
            deprecated,
            uri: parts.uri,
            range: parts.range,
            selection_range: parts.selection_range,
            parents: None,
            children: None,
            data: ResolveParams {
                symbol_id,
                parents: None,
            },
        }
    }

    fn from_decl(
        ast: &ParsedAst,
        decl: DeclId,
    ) -> Option<Self> {
        let parts = decl_item_parts(ast, decl)?;
        Some(Self::from_parts(parts, ast.decl(decl).is_deprecated(), ast.symbol_id(decl)))
    }

    fn from_symbol(symbol: &Symbol) -> Option<Self> {
        let parts = symbol_item_parts(symbol)?;
        Some(Self::from_parts(parts, symbol.is_deprecated(), Some(symbol.id)))
    }
}

/// Records the cursor names: a variable's type, a method's class, or a record itself.
pub fn find_record_type_at(
    ast: &ParsedAst,
    position: IdePosition,
) -> Vec<DeclId> {
    let Some(offset) = ast.offset_at(position) else {
        return Vec::new();
    };
    let mut records = Vec::new();
    for_each_selection(ast, offset, |selection| {
        records.clear();
        let Some(selection) = selection else {
            return false;
        };
        for decl in explicit_reference_targets(ast, selection.node, DeclRelationSet::UNDERLYING) {
            let d = ast.decl(decl);
            if d.kind.is_var() {
                if let Some(record) = d.ty.as_ref().and_then(|ty| ast.record_of_type(ty)) {
                    records.push(record);
                }
                continue;
            }
            if d.kind.is_cxx_method() {
                records.extend(d.context.filter(|&parent| ast.decl(parent).kind.is_record()));
                continue;
            }
            // Fields are ambiguous between their type and their class, so they name nothing.
            if d.kind.is_record() {
                records.push(decl);
            }
        }
        !records.is_empty()
    });
    records
}

/// Record a base type names; dependent bases resolve to their primary template.
fn base_record(
    ast: &ParsedAst,
    base: &TypeRef,
) -> Option<DeclId> {
    if let Some(record) = ast.record_of_type(base) {
        return Some(record);
    }
    match base.strip_deduced()? {
        TypeRef::Specialization {
            template,
            resolved: None,
        } => ast.decl(*template).templated.filter(|&pattern| ast.decl(pattern).kind.is_record()),
        _ => None,
    }
}

/// Direct bases of `record`, read from its definition.
pub fn type_parents(
    ast: &ParsedAst,
    record: DeclId,
) -> Vec<DeclId> {
    let mut record = record;
    let d = ast.decl(record);
    // Bases of an invalid specialization may be missing; the primary template has them.
    if d.kind == DeclKind::ClassTemplateSpecialization
        && d.is_invalid()
        && let Some(pattern) = d.specialized_template.and_then(|template| ast.decl(template).templated)
    {
        record = pattern;
    }
    let Some(definition) = ast.group_definition(record) else {
        return Vec::new();
    };
    ast.decl(definition).bases.iter().filter_map(|base| base_record(ast, base)).collect()
}

fn fill_super_types(
    ast: &ParsedAst,
    record: DeclId,
    item: &mut TypeHierarchyItem,
    on_path: &mut FxHashSet<DeclId>,
) {
    item.parents = Some(Vec::new());
    item.data.parents = Some(Vec::new());

    // Dependent bases map back to their pattern, so a pattern seen on the
    // current path means the chain loops.
    let pattern = ast.decl(record).described_template.map(|_| record);
    if let Some(pattern) = pattern
        && !on_path.insert(pattern)
    {
        debug!("[hierarchy] {} repeats on its parent chain", ast.decl(pattern).name);
        return;
    }

    for parent in type_parents(ast, record) {
        let Some(mut parent_item) = TypeHierarchyItem::from_decl(ast, parent) else {
            continue;
        };
        fill_super_types(ast, parent, &mut parent_item, on_path);
        if let Some(data_parents) = item.data.parents.as_mut() {
            data_parents.push(parent_item.data.clone());
        }
        if let Some(parents) = item.parents.as_mut() {
            parents.push(parent_item);
        }
    }

    if let Some(pattern) = pattern {
        on_path.remove(&pattern);
    }
}

fn fill_sub_types(
    id: SymbolId,
    sub_types: &mut Vec<TypeHierarchyItem>,
    index: &dyn SymbolIndex,
    levels: u32,
) {
    let request = RelationsRequest {
        subjects: BTreeSet::from([id]),
        predicate: RelationKind::BaseOf,
        limit: None,
    };
    let mut objects: Vec<Symbol> = Vec::new();
    let outcome = index.relations(&request, &mut |_, object| objects.push(object.clone()));
    if let Err(err) = outcome {
        warn!("[hierarchy] subtypes of {id} unavailable: {err}");
        return;
    }
    for object in objects {
        let Some(mut child) = TypeHierarchyItem::from_symbol(&object) else {
            continue;
        };
        if levels > 1 {
            let mut grandchildren = Vec::new();
            fill_sub_types(object.id, &mut grandchildren, index, levels - 1);
            child.children = Some(grandchildren);
        }
        sub_types.push(child);
    }
}

/// Type hierarchy of the records at `position`.
///
/// Parents are always resolved completely. Children come from the index and
/// are resolved `resolve_levels` deep.
pub fn type_hierarchy(
    ast: &ParsedAst,
    position: IdePosition,
    resolve_levels: u32,
    direction: TypeHierarchyDirection,
    index: Option<&dyn SymbolIndex>,
) -> Vec<TypeHierarchyItem> {
    let mut results = Vec::new();
    for mut record in find_record_type_at(ast, position) {
        let wants_children = direction.wants_children();
        // The index only relates patterns, so implicit specializations are
        // swapped for their pattern before the item is built.
        if wants_children
            && ast.decl(record).kind == DeclKind::ClassTemplateSpecialization
            && let Some(pattern) = template_pattern(ast, record)
        {
            record = pattern;
        }
        let Some(mut item) = TypeHierarchyItem::from_decl(ast, record) else {
            continue;
        };
        let mut on_path = FxHashSet::default();
        fill_super_types(ast, record, &mut item, &mut on_path);

        if wants_children && resolve_levels > 0 {
            let mut children = Vec::new();
            if let Some(index) = index
                && let Some(id) = ast.symbol_id(record)
            {
                fill_sub_types(id, &mut children, index, resolve_levels);
            }
            item.children = Some(children);
        }
        results.push(item);
    }
    results
}

/// Parents of an item from an earlier response, or `None` when they were never computed.
pub fn super_types(
    item: &TypeHierarchyItem,
    index: &dyn SymbolIndex,
) -> Option<Vec<TypeHierarchyItem>> {
    let parents = item.data.parents.as_ref()?;
    let mut results = Vec::new();
    if parents.is_empty() {
        return Some(results);
    }
    let by_id: FxHashMap<SymbolId, &ResolveParams> =
        parents.iter().filter_map(|parent| parent.symbol_id.map(|id| (id, parent))).collect();
    let request = LookupRequest {
        ids: by_id.keys().copied().collect(),
    };
    let outcome = index.lookup(&request, &mut |symbol| {
        if let Some(mut parent) = TypeHierarchyItem::from_symbol(symbol)
            && let Some(data) = by_id.get(&symbol.id)
        {
            parent.data = (*data).clone();
            results.push(parent);
        }
    });
    if let Err(err) = outcome {
        warn!("[hierarchy] parent lookup failed: {err}");
    }
    Some(results)
}

/// One level of children of an item from an earlier response.
pub fn sub_types(
    item: &TypeHierarchyItem,
    index: &dyn SymbolIndex,
) -> Vec<TypeHierarchyItem> {
    let mut results = Vec::new();
    let Some(id) = item.data.symbol_id else {
        return results;
    };
    fill_sub_types(id, &mut results, index, 1);
    for child in &mut results {
        child.data.parents = Some(vec![item.data.clone()]);
    }
    results
}

/// Expands the children of `item` in place. Parents are always eager, so only
/// child directions with at least one level do anything.
pub fn resolve_type_hierarchy(
    item: &mut TypeHierarchyItem,
    resolve_levels: u32,
    direction: TypeHierarchyDirection,
    index: Option<&dyn SymbolIndex>,
) {
    let Some(index) = index else {
        return;
    };
    if direction == TypeHierarchyDirection::Parents || resolve_levels == 0 {
        return;
    }
    let Some(id) = item.data.symbol_id else {
        return;
    };
    let mut children = Vec::new();
    fill_sub_types(id, &mut children, index, resolve_levels);
    item.children = Some(children);
}

#[cfg(test)]
#[path = "../../tests/src/resolve/type_hierarchy_tests.rs"]
mod tests;
