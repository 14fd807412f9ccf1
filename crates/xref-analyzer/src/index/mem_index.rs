use std::cmp::Ordering;
use std::path::Path;

use dashmap::DashMap;
use tracing::debug;

use crate::vfs::path_to_uri;

use super::merge::merge_symbol;
use super::quality::score_symbol;
use super::refs::{
    ContainedRefsRequest, ContainedRefsResult, FuzzyFindRequest, LookupRequest, Ref, RefsRequest, Relation,
    RelationKind, RelationsRequest,
};
use super::shard::IndexShard;
use super::symbol::{Symbol, SymbolId};
use super::{Result, SymbolIndex};

/// In-memory index over concurrent tables.
///
/// Writers merge into existing entries, so shards can be added in any order.
/// Every query sorts its output, so answers do not depend on table iteration order.
pub struct MemIndex {
    symbols: DashMap<SymbolId, Symbol>,
    refs: DashMap<SymbolId, Vec<Ref>>,
    relations: DashMap<(SymbolId, RelationKind), Vec<SymbolId>>,
}

impl Default for MemIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl MemIndex {
    pub fn new() -> Self {
        Self {
            symbols: DashMap::new(),
            refs: DashMap::new(),
            relations: DashMap::new(),
        }
    }

    pub fn from_shard(shard: IndexShard) -> Self {
        let index = Self::new();
        index.add_shard(shard);
        index
    }

    pub fn insert_symbol(
        &self,
        symbol: Symbol,
    ) {
        self.symbols
            .entry(symbol.id)
            .and_modify(|existing| *existing = merge_symbol(existing, &symbol))
            .or_insert(symbol);
    }

    pub fn insert_ref(
        &self,
        id: SymbolId,
        reference: Ref,
    ) {
        let mut entry = self.refs.entry(id).or_default();
        if !entry.contains(&reference) {
            entry.push(reference);
        }
    }

    pub fn insert_relation(
        &self,
        relation: Relation,
    ) {
        let mut entry = self.relations.entry((relation.subject, relation.predicate)).or_default();
        if !entry.contains(&relation.object) {
            entry.push(relation.object);
        }
    }

    pub fn add_shard(
        &self,
        shard: IndexShard,
    ) {
        debug!(
            "[index] Adding shard: {} symbols, {} ref groups, {} relations",
            shard.symbols.len(),
            shard.refs.len(),
            shard.relations.len()
        );
        for symbol in shard.symbols {
            self.insert_symbol(symbol);
        }
        for group in shard.refs {
            for reference in group.refs {
                self.insert_ref(group.id, reference);
            }
        }
        for relation in shard.relations {
            self.insert_relation(relation);
        }
    }

    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    pub fn get(
        &self,
        id: SymbolId,
    ) -> Option<Symbol> {
        self.symbols.get(&id).map(|entry| entry.clone())
    }

    fn sorted_refs(
        &self,
        id: SymbolId,
    ) -> Vec<Ref> {
        let mut refs = self.refs.get(&id).map(|entry| entry.clone()).unwrap_or_default();
        refs.sort();
        refs
    }
}

fn name_matches(
    name: &str,
    query: &str,
) -> bool {
    query.is_empty() || name.to_lowercase().contains(&query.to_lowercase())
}

impl SymbolIndex for MemIndex {
    fn fuzzy_find(
        &self,
        request: &FuzzyFindRequest,
        callback: &mut dyn FnMut(&Symbol),
    ) -> Result<bool> {
        let proximity_uri = request.proximity_paths.first().and_then(|path| path_to_uri(Path::new(path)));
        let mut scored: Vec<(f32, Symbol)> = self
            .symbols
            .iter()
            .filter(|entry| name_matches(&entry.name, &request.query))
            .filter(|entry| request.any_scope || request.scopes.is_empty() || request.scopes.contains(&entry.scope))
            .map(|entry| (score_symbol(entry.value(), proximity_uri.as_deref()), entry.value().clone()))
            .collect();
        scored.sort_by(|(lscore, lsym), (rscore, rsym)| {
            rscore.partial_cmp(lscore).unwrap_or(Ordering::Equal).then_with(|| lsym.id.cmp(&rsym.id))
        });

        let limit = request.limit.map_or(usize::MAX, |limit| limit as usize);
        let more = scored.len() > limit;
        for (_, symbol) in scored.iter().take(limit) {
            callback(symbol);
        }
        Ok(more)
    }

    fn lookup(
        &self,
        request: &LookupRequest,
        callback: &mut dyn FnMut(&Symbol),
    ) -> Result<()> {
        for id in &request.ids {
            if let Some(symbol) = self.symbols.get(id) {
                callback(symbol.value());
            }
        }
        Ok(())
    }

    fn refs(
        &self,
        request: &RefsRequest,
        callback: &mut dyn FnMut(&Ref),
    ) -> Result<bool> {
        let mut remaining = request.limit.map_or(usize::MAX, |limit| limit as usize);
        let mut more = false;
        for id in &request.ids {
            for reference in self.sorted_refs(*id) {
                if !reference.kind.intersects(request.filter) {
                    continue;
                }
                if remaining == 0 {
                    more = true;
                    break;
                }
                remaining -= 1;
                if request.want_container {
                    callback(&reference);
                } else {
                    callback(&Ref {
                        container: None,
                        ..reference
                    });
                }
            }
        }
        Ok(more)
    }

    fn relations(
        &self,
        request: &RelationsRequest,
        callback: &mut dyn FnMut(SymbolId, &Symbol),
    ) -> Result<()> {
        let mut remaining = request.limit.map_or(usize::MAX, |limit| limit as usize);
        for subject in &request.subjects {
            let mut objects = self
                .relations
                .get(&(*subject, request.predicate))
                .map(|entry| entry.clone())
                .unwrap_or_default();
            objects.sort();
            for object in objects {
                if remaining == 0 {
                    return Ok(());
                }
                if let Some(symbol) = self.symbols.get(&object) {
                    remaining -= 1;
                    callback(*subject, symbol.value());
                }
            }
        }
        Ok(())
    }

    fn contained_refs(
        &self,
        request: &ContainedRefsRequest,
        callback: &mut dyn FnMut(&ContainedRefsResult),
    ) -> Result<bool> {
        let mut results: Vec<ContainedRefsResult> = Vec::new();
        for entry in self.refs.iter() {
            for reference in entry.value() {
                if reference.container == Some(request.id)
                    && reference.kind.intersects(ContainedRefsRequest::SUPPORTED_REF_KINDS)
                {
                    results.push(ContainedRefsResult {
                        location: reference.location.clone(),
                        kind: reference.kind,
                        symbol: *entry.key(),
                    });
                }
            }
        }
        results.sort_by(|l, r| l.location.cmp(&r.location).then_with(|| l.symbol.cmp(&r.symbol)));

        let limit = request.limit.map_or(usize::MAX, |limit| limit as usize);
        let more = results.len() > limit;
        for result in results.iter().take(limit) {
            callback(result);
        }
        Ok(more)
    }
}

#[cfg(test)]
#[path = "../../tests/src/index/mem_index_tests.rs"]
mod tests;
