use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::symbol::{SymbolId, SymbolLocation};

bitflags::bitflags! {
    /// How a reference mentions its symbol.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
    pub struct RefKind: u8 {
        const DECLARATION = 1 << 0;
        const DEFINITION = 1 << 1;
        const REFERENCE = 1 << 2;
        /// The symbol name is spelled at the location, not only implied by it.
        const SPELLED = 1 << 3;
        const CALL = 1 << 4;
        const ALL = Self::DECLARATION.bits()
            | Self::DEFINITION.bits()
            | Self::REFERENCE.bits()
            | Self::SPELLED.bits();
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Ref {
    pub location: SymbolLocation,
    pub kind: RefKind,
    /// Symbol that lexically contains the reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container: Option<SymbolId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RelationKind {
    /// Subject is a base class of the object.
    BaseOf,
    /// Subject is a method overridden by the object.
    OverriddenBy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Relation {
    pub subject: SymbolId,
    pub predicate: RelationKind,
    pub object: SymbolId,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FuzzyFindRequest {
    /// Name to match; empty matches everything.
    pub query: String,
    /// Scopes such as `"ns::"`; `""` is the global scope.
    pub scopes: Vec<String>,
    pub any_scope: bool,
    pub limit: Option<u32>,
    pub restrict_for_code_completion: bool,
    /// File paths used to boost symbols declared near them.
    pub proximity_paths: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupRequest {
    pub ids: BTreeSet<SymbolId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefsRequest {
    pub ids: BTreeSet<SymbolId>,
    pub filter: RefKind,
    pub limit: Option<u32>,
    pub want_container: bool,
}

impl Default for RefsRequest {
    fn default() -> Self {
        Self {
            ids: BTreeSet::new(),
            filter: RefKind::ALL,
            limit: None,
            want_container: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationsRequest {
    pub subjects: BTreeSet<SymbolId>,
    pub predicate: RelationKind,
    pub limit: Option<u32>,
}

/// References made from inside the body of `id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainedRefsRequest {
    pub id: SymbolId,
    pub limit: Option<u32>,
}

impl ContainedRefsRequest {
    /// Reference kinds reported by contained-refs queries.
    pub const SUPPORTED_REF_KINDS: RefKind = RefKind::CALL;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainedRefsResult {
    pub location: SymbolLocation,
    pub kind: RefKind,
    /// The referenced symbol.
    pub symbol: SymbolId,
}
