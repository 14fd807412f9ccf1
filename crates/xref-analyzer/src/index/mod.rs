//! Persistent cross-file symbol index: data model, merge rules and the query
//! interface the resolvers consume.

mod mem_index;
mod merge;
mod quality;
mod refs;
mod shard;
mod symbol;

use thiserror::Error;

pub use mem_index::MemIndex;
pub use merge::{merge_symbol, prefer, preferred_location};
pub use quality::{
    SymbolCategory, SymbolQualitySignals, SymbolRelevanceSignals, evaluate_symbol_and_relevance, is_reserved_name,
    score_symbol,
};
pub use refs::{
    ContainedRefsRequest, ContainedRefsResult, FuzzyFindRequest, LookupRequest, Ref, RefKind, RefsRequest, Relation,
    RelationKind, RelationsRequest,
};
pub use shard::{IndexShard, ShardRefs, load_shard_dirs};
pub use symbol::{
    IncludeHeader, Symbol, SymbolFlags, SymbolId, SymbolKind, SymbolLocation, SymbolOrigin, SymbolPosition,
};

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid symbol id: {0}")]
    InvalidSymbolId(String),
    #[error("invalid URI: {0}")]
    InvalidUri(String),
    #[error("index unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, IndexError>;

/// Query interface of a symbol index.
///
/// Every call reports results through `callback` and may be issued from
/// several threads at once. Methods returning `bool` report whether more
/// results existed than the request's limit allowed.
pub trait SymbolIndex: Send + Sync {
    fn fuzzy_find(
        &self,
        request: &FuzzyFindRequest,
        callback: &mut dyn FnMut(&Symbol),
    ) -> Result<bool>;

    fn lookup(
        &self,
        request: &LookupRequest,
        callback: &mut dyn FnMut(&Symbol),
    ) -> Result<()>;

    fn refs(
        &self,
        request: &RefsRequest,
        callback: &mut dyn FnMut(&Ref),
    ) -> Result<bool>;

    /// Reports `(subject, object)` pairs for the requested predicate.
    fn relations(
        &self,
        request: &RelationsRequest,
        callback: &mut dyn FnMut(SymbolId, &Symbol),
    ) -> Result<()>;

    fn contained_refs(
        &self,
        request: &ContainedRefsRequest,
        callback: &mut dyn FnMut(&ContainedRefsResult),
    ) -> Result<bool>;
}
