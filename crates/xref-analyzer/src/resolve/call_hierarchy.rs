//! Call hierarchy, answered from the index.

use std::collections::BTreeSet;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::ide::navigation::{IdePosition, IdeRange};
use crate::index::{
    ContainedRefsRequest, LookupRequest, RefKind, RefsRequest, Symbol, SymbolId, SymbolIndex, SymbolKind,
    SymbolLocation,
};
use crate::semantic::{DeclId, DeclKind, ParsedAst};

use super::located::index_to_location;
use super::targets::{DeclRelationSet, decl_at_position};
use super::type_hierarchy::{ItemParts, decl_item_parts, symbol_item_parts};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolTag {
    Deprecated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallHierarchyItem {
    pub name: String,
    pub detail: Option<String>,
    pub kind: SymbolKind,
    pub tags: Vec<SymbolTag>,
    pub uri: String,
    pub range: IdeRange,
    pub selection_range: IdeRange,
    /// Hex symbol id, empty when the symbol has none.
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallHierarchyIncomingCall {
    pub from: CallHierarchyItem,
    /// Call sites, in the caller's file.
    pub from_ranges: Vec<IdeRange>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallHierarchyOutgoingCall {
    pub to: CallHierarchyItem,
    /// Call sites, in the file of the item the calls were requested for.
    pub from_ranges: Vec<IdeRange>,
}

impl CallHierarchyItem {
    fn from_parts(
        parts: ItemParts,
        deprecated: bool,
        id: Option<SymbolId>,
    ) -> Self {
        Self {
            name: parts.name,
            detail: parts.detail,
            kind: parts.kind,
            tags: if deprecated {
                vec![SymbolTag::Deprecated]
            } else {
                Vec::new()
            },
            uri: parts.uri,
            range: parts.range,
            selection_range: parts.selection_range,
            data: id.map(|id| id.to_hex()).unwrap_or_default(),
        }
    }

    fn from_symbol(symbol: &Symbol) -> Option<Self> {
        let parts = symbol_item_parts(symbol)?;
        Some(Self::from_parts(parts, symbol.is_deprecated(), Some(symbol.id)))
    }

    fn symbol_id(&self) -> Option<SymbolId> {
        if self.data.is_empty() {
            return None;
        }
        match self.data.parse() {
            Ok(id) => Some(id),
            Err(err) => {
                error!("[hierarchy] bad item data {:?}: {err}", self.data);
                None
            },
        }
    }
}

fn is_callable_like(
    ast: &ParsedAst,
    decl: DeclId,
) -> bool {
    let kind = ast.decl(decl).kind;
    kind.is_function_like()
        || kind == DeclKind::FunctionTemplate
        || kind == DeclKind::Field
        || (kind == DeclKind::Var && !ast.is_function_local(decl))
}

/// Items for the functions, methods and non-local variables at `position`.
pub fn prepare_call_hierarchy(
    ast: &ParsedAst,
    position: IdePosition,
) -> Vec<CallHierarchyItem> {
    let Some(offset) = ast.offset_at(position) else {
        error!("[hierarchy] position {position} is outside {}", ast.main_path().display());
        return Vec::new();
    };
    decl_at_position(ast, offset, DeclRelationSet::empty())
        .into_iter()
        .filter(|&decl| is_callable_like(ast, decl))
        .filter_map(|decl| {
            let parts = decl_item_parts(ast, decl)?;
            Some(CallHierarchyItem::from_parts(parts, ast.decl(decl).is_deprecated(), ast.symbol_id(decl)))
        })
        .collect()
}

/// Location of an index occurrence as `(uri, range)`.
fn call_site(location: &SymbolLocation) -> Option<(String, IdeRange)> {
    let Some(converted) = index_to_location(location) else {
        warn!("[hierarchy] dropping call site in {}", location.file_uri);
        return None;
    };
    Some((location.file_uri.clone(), converted.range))
}

/// Callers of `item`, one entry per containing symbol, sorted by caller name.
pub fn incoming_calls(
    item: &CallHierarchyItem,
    index: Option<&dyn SymbolIndex>,
) -> Vec<CallHierarchyIncomingCall> {
    let mut results = Vec::new();
    let (Some(index), Some(id)) = (index, item.symbol_id()) else {
        return results;
    };

    // Non-call references such as taking a function's address can still be indirect calls.
    let request = RefsRequest {
        ids: BTreeSet::from([id]),
        filter: RefKind::REFERENCE,
        limit: None,
        want_container: true,
    };
    let mut calls_in: FxHashMap<SymbolId, Vec<(String, IdeRange)>> = FxHashMap::default();
    let outcome = index.refs(&request, &mut |r| {
        let Some(container) = r.container else {
            return;
        };
        if let Some(site) = call_site(&r.location) {
            calls_in.entry(container).or_default().push(site);
        }
    });
    if let Err(err) = outcome {
        warn!("[hierarchy] incoming calls of {id} unavailable: {err}");
        return results;
    }
    if calls_in.is_empty() {
        return results;
    }

    let lookup = LookupRequest {
        ids: calls_in.keys().copied().collect(),
    };
    let outcome = index.lookup(&lookup, &mut |caller| {
        let Some(sites) = calls_in.get(&caller.id) else {
            return;
        };
        let Some(from) = CallHierarchyItem::from_symbol(caller) else {
            return;
        };
        // Ranges can only be expressed in the caller's own file.
        let from_ranges = sites.iter().filter(|(uri, _)| *uri == from.uri).map(|(_, range)| *range).collect();
        results.push(CallHierarchyIncomingCall {
            from,
            from_ranges,
        });
    });
    if let Err(err) = outcome {
        warn!("[hierarchy] caller lookup failed: {err}");
    }
    results.sort_by(|a, b| a.from.name.cmp(&b.from.name));
    results
}

/// Calls made inside `item`, one entry per callee, sorted by callee name.
pub fn outgoing_calls(
    item: &CallHierarchyItem,
    index: Option<&dyn SymbolIndex>,
) -> Vec<CallHierarchyOutgoingCall> {
    let mut results = Vec::new();
    let (Some(index), Some(id)) = (index, item.symbol_id()) else {
        return results;
    };

    let request = ContainedRefsRequest {
        id,
        limit: None,
    };
    let mut calls_out: FxHashMap<SymbolId, Vec<(String, IdeRange)>> = FxHashMap::default();
    let outcome = index.contained_refs(&request, &mut |r| {
        if let Some(site) = call_site(&r.location) {
            calls_out.entry(r.symbol).or_default().push(site);
        }
    });
    if let Err(err) = outcome {
        warn!("[hierarchy] outgoing calls of {id} unavailable: {err}");
        return results;
    }
    if calls_out.is_empty() {
        return results;
    }

    let lookup = LookupRequest {
        ids: calls_out.keys().copied().collect(),
    };
    let outcome = index.lookup(&lookup, &mut |callee| {
        let Some(sites) = calls_out.get(&callee.id) else {
            return;
        };
        let Some(to) = CallHierarchyItem::from_symbol(callee) else {
            return;
        };
        // A declaration in a header has its calls in the source file; those cannot be shown.
        let from_ranges = sites.iter().filter(|(uri, _)| *uri == item.uri).map(|(_, range)| *range).collect();
        results.push(CallHierarchyOutgoingCall {
            to,
            from_ranges,
        });
    });
    if let Err(err) = outcome {
        warn!("[hierarchy] callee lookup failed: {err}");
    }
    results.sort_by(|a, b| a.to.name.cmp(&b.to.name));
    results
}

#[cfg(test)]
#[path = "../../tests/src/resolve/call_hierarchy_tests.rs"]
mod tests;
