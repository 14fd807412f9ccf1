//! Cursor-driven navigation over one snapshot, enriched by an optional index.

mod call_hierarchy;
mod fallback;
mod highlights;
mod locate;
mod located;
mod navigation;
mod provider;
mod references;
pub mod selection;
pub mod targets;
mod type_hierarchy;

#[cfg(test)]
#[path = "../../tests/src/resolve/fixtures.rs"]
pub(crate) mod fixtures;

pub use call_hierarchy::{
    CallHierarchyIncomingCall, CallHierarchyItem, CallHierarchyOutgoingCall, SymbolTag, incoming_calls,
    outgoing_calls, prepare_call_hierarchy,
};
pub use fallback::{
    TEXTUAL_CANDIDATE_GATE, TEXTUAL_QUERY_LIMIT, TEXTUAL_RESULT_CAP, find_nearby_identifier, locate_symbol_textually,
};
pub use highlights::{DocumentHighlight, HighlightKind, find_document_highlights, related_control_flow};
pub use locate::{
    locate_ast_referent, locate_file_referent, locate_macro_referent, locate_symbol_at, locate_symbol_for_type,
};
pub use located::{
    LocatedSymbol, enhance_from_index, find_implementors, get_definition, get_preferred_decl, index_to_location,
    located_from_decl, to_index_location,
};
pub use navigation::{
    DocumentLink, SymbolDetails, document_links, find_implementations, find_type, split_qualified_name, symbol_info,
    unwrap_find_type,
};
pub use provider::XrefProvider;
pub use references::{
    MainFileRef, Reference, ReferenceAttributes, ReferencesResult, find_references, find_refs, non_local_decl_refs,
};
pub use targets::{DeclRelationSet, decl_at_position, explicit_reference_targets, target_decls};
pub use type_hierarchy::{
    ResolveParams, TypeHierarchyDirection, TypeHierarchyItem, find_record_type_at, resolve_type_hierarchy,
    sub_types, super_types, type_hierarchy, type_parents,
};
