//! Occurrences of declarations in the main file, and find-references across the index.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::ide::navigation::{IdeLocation, IdePosition};
use crate::index::{LookupRequest, RefKind, RefsRequest, RelationKind, RelationsRequest, SymbolId, SymbolIndex};
use crate::semantic::{
    DeclId, DeclKind, FileRange, NodeId, NodeKind, ParsedAst, StmtKind, SymbolRoles, TextRange, TypeRef,
};

use super::located::index_to_location;
use super::targets::{DeclRelationSet, decl_at_position, explicit_reference_targets};

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct ReferenceAttributes: u8 {
        const DECLARATION = 1 << 0;
        /// Definitions are always declarations as well.
        const DEFINITION = 1 << 1;
        /// Declaration or definition of an override of the queried method.
        const OVERRIDE = 1 << 2;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reference {
    pub location: IdeLocation,
    /// Qualified name of the enclosing declaration, when context was requested.
    pub container_name: Option<String>,
    pub attributes: ReferenceAttributes,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferencesResult {
    pub references: Vec<Reference>,
    pub has_more: bool,
}

/// One occurrence of a target in the main file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MainFileRef {
    /// Range of the spelled token.
    pub range: TextRange,
    pub roles: SymbolRoles,
    /// Closest enclosing declaration that can own references.
    pub container: Option<DeclId>,
}

/// Maps instantiations and templates onto the declaration occurrences are attributed to.
fn normalize(
    ast: &ParsedAst,
    decl: DeclId,
) -> DeclId {
    let d = ast.decl(decl);
    let mut current = d.instantiation_pattern.unwrap_or(decl);
    let current_decl = ast.decl(current);
    if matches!(current_decl.kind, DeclKind::ClassTemplate | DeclKind::FunctionTemplate)
        && let Some(pattern) = current_decl.templated
    {
        current = pattern;
    }
    ast.canonical(current)
}

/// Declaration a written type names, looking through pointers and references.
fn named_type_decl(ty: &TypeRef) -> Option<DeclId> {
    match ty {
        TypeRef::Decl(decl) => Some(*decl),
        TypeRef::Specialization {
            template,
            ..
        } => Some(*template),
        TypeRef::Pointer(inner) | TypeRef::Reference(inner) | TypeRef::Array(inner) => named_type_decl(inner),
        _ => None,
    }
}

/// A raw occurrence before token mapping: `(target, roles, location, selector tokens)`.
struct Occurrence {
    target: DeclId,
    roles: SymbolRoles,
    loc: TextRange,
    selector_locs: Vec<TextRange>,
}

fn occurrences_of_node(
    ast: &ParsedAst,
    node: NodeId,
) -> Vec<Occurrence> {
    let n = ast.node(node);
    let at = |target: DeclId, roles: SymbolRoles| Occurrence {
        target,
        roles,
        loc: n.loc,
        selector_locs: Vec::new(),
    };
    match &n.kind {
        NodeKind::Decl(decl) => {
            let d = ast.decl(*decl);
            if d.is_implicit() || n.loc.is_empty() {
                return Vec::new();
            }
            match d.kind {
                DeclKind::UsingDirective => {
                    d.target.map(|target| at(target, SymbolRoles::REFERENCE)).into_iter().collect()
                },
                _ => {
                    let mut roles = SymbolRoles::DECLARATION;
                    if d.is_this_definition() {
                        roles |= SymbolRoles::DEFINITION;
                    }
                    let selector_locs =
                        d.selector_locs.iter().filter(|loc| loc.is_main()).map(|loc| loc.range).collect();
                    let mut out = vec![Occurrence {
                        target: *decl,
                        roles,
                        loc: n.loc,
                        selector_locs,
                    }];
                    if d.kind == DeclKind::Using {
                        for &shadow in &d.shadows {
                            if let Some(target) = ast.decl(shadow).target {
                                out.push(at(target, SymbolRoles::REFERENCE));
                            }
                        }
                    }
                    out
                },
            }
        },
        NodeKind::DeclRef {
            target,
            roles,
            ..
        } => vec![at(*target, SymbolRoles::REFERENCE | *roles)],
        NodeKind::TypeLoc {
            ty,
        }
        | NodeKind::BaseSpecifier {
            ty,
        } => named_type_decl(ty).map(|decl| at(decl, SymbolRoles::REFERENCE)).into_iter().collect(),
        NodeKind::NestedNameSpecifier {
            target,
        } => vec![at(*target, SymbolRoles::REFERENCE)],
        NodeKind::CtorInitializer {
            member,
            base,
        } => {
            let mut out = Vec::new();
            if let Some(member) = member {
                out.push(at(*member, SymbolRoles::REFERENCE | SymbolRoles::WRITE));
            }
            if let Some(decl) = base.as_ref().and_then(named_type_decl) {
                out.push(at(decl, SymbolRoles::REFERENCE));
            }
            out
        },
        NodeKind::ObjCMessage {
            method,
            selector_locs,
        } => vec![Occurrence {
            target: *method,
            roles: SymbolRoles::REFERENCE | SymbolRoles::CALL,
            loc: n.loc,
            selector_locs: selector_locs.clone(),
        }],
        NodeKind::Stmt(StmtKind::Goto {
            label,
        }) => {
            // The label name is the token after `goto`.
            let tokens = ast.tokens().tokens();
            let next = tokens.get(ast.tokens().partition_point(n.loc.end));
            next.filter(|tok| tok.is_identifier())
                .map(|tok| Occurrence {
                    target: *label,
                    roles: SymbolRoles::REFERENCE,
                    loc: tok.range,
                    selector_locs: Vec::new(),
                })
                .into_iter()
                .collect()
        },
        _ => Vec::new(),
    }
}

/// Declarations that may own references: named, not local, not template parameters.
fn is_ref_container(
    ast: &ParsedAst,
    decl: DeclId,
) -> bool {
    let d = ast.decl(decl);
    !d.is_anonymous()
        && !ast.is_function_local(decl)
        && !d.kind.is_template_param()
        && !matches!(d.kind, DeclKind::Label | DeclKind::Using | DeclKind::UsingDirective)
}

fn ref_container(
    ast: &ParsedAst,
    node: NodeId,
) -> Option<DeclId> {
    let mut enclosing = match ast.node(node).kind {
        NodeKind::Decl(decl) => ast.decl(decl).context,
        _ => {
            let mut parent = ast.node(node).parent;
            loop {
                let Some(id) = parent else {
                    break None;
                };
                if let Some(decl) = ast.node(id).decl() {
                    break Some(decl);
                }
                parent = ast.node(id).parent;
            }
        },
    };
    while let Some(decl) = enclosing {
        if is_ref_container(ast, decl) {
            return Some(decl);
        }
        enclosing = ast.decl(decl).context;
    }
    None
}

/// Every main-file occurrence of `targets`, sorted by location and roles, without duplicates.
///
/// With `per_token`, multi-part selectors report one reference per selector token.
pub fn find_refs(
    ast: &ParsedAst,
    targets: &[DeclId],
    per_token: bool,
) -> Vec<MainFileRef> {
    let wanted: BTreeSet<DeclId> = targets.iter().map(|&decl| normalize(ast, decl)).collect();
    let mut refs = Vec::new();
    for node in ast.preorder(NodeId::ROOT) {
        for occurrence in occurrences_of_node(ast, node) {
            if !wanted.contains(&normalize(ast, occurrence.target)) {
                continue;
            }
            let mut locs = Vec::new();
            if per_token {
                locs = occurrence.selector_locs;
                // The first selector token must be the reported location, or the split is a wrong guess.
                if locs.first().is_some_and(|first| first.start != occurrence.loc.start) {
                    locs.clear();
                }
            }
            if locs.is_empty() {
                locs.push(occurrence.loc);
            }
            let container = ref_container(ast, node);
            for loc in locs {
                if let Some(tok) = ast.tokens().containing(loc.start) {
                    refs.push(MainFileRef {
                        range: tok.range,
                        roles: occurrence.roles,
                        container,
                    });
                }
            }
        }
    }
    refs.sort_by_key(|r| (r.range.start, r.roles));
    refs.dedup_by_key(|r| (r.range, r.roles));
    refs
}

fn container_name_for_main_ref(
    ast: &ParsedAst,
    container: Option<DeclId>,
) -> Option<String> {
    container.map(|decl| ast.qualified_name(decl))
}

/// Callback target of an index query: where results land and how containers get named.
struct ReferenceSink<'a> {
    results: &'a mut ReferencesResult,
    limit: usize,
    include_context: bool,
}

impl ReferenceSink<'_> {
    fn query_index(
        &mut self,
        index: &dyn SymbolIndex,
        ids: BTreeSet<SymbolId>,
        allow_attributes: bool,
        allow_main_file: bool,
        main_path: &std::path::Path,
    ) {
        if ids.is_empty() || self.results.has_more {
            return;
        }
        let mut request = RefsRequest {
            ids,
            want_container: self.include_context,
            ..RefsRequest::default()
        };
        if self.limit > 0 {
            // A filled quota still asks the index, to learn whether more exist.
            let remaining = self.limit.saturating_sub(self.results.references.len());
            request.limit = Some(remaining as u32);
        }

        let include_context = self.include_context;
        let references = &mut self.results.references;
        let mut by_container: BTreeMap<SymbolId, Vec<usize>> = BTreeMap::new();
        let outcome = index.refs(&request, &mut |r| {
            let Some(location) = index_to_location(&r.location) else {
                return;
            };
            // The AST is authoritative for the main file.
            if !allow_main_file && location.is_in(main_path) {
                return;
            }
            let mut attributes = ReferenceAttributes::empty();
            if allow_attributes {
                if r.kind.contains(RefKind::DECLARATION) {
                    attributes |= ReferenceAttributes::DECLARATION;
                }
                if r.kind.contains(RefKind::DEFINITION) {
                    attributes |= ReferenceAttributes::DECLARATION | ReferenceAttributes::DEFINITION;
                }
            }
            if include_context && let Some(container) = r.container {
                by_container.entry(container).or_default().push(references.len());
            }
            references.push(Reference {
                location,
                container_name: None,
                attributes,
            });
        });
        match outcome {
            Ok(more) => self.results.has_more |= more,
            Err(err) => {
                warn!("[refs] index refs query failed: {err}");
                return;
            },
        }

        if by_container.is_empty() {
            return;
        }
        let lookup = LookupRequest {
            ids: by_container.keys().copied().collect(),
        };
        let references = &mut self.results.references;
        let outcome = index.lookup(&lookup, &mut |container| {
            if let Some(indices) = by_container.get(&container.id) {
                let name = container.qualified_name();
                for &idx in indices {
                    references[idx].container_name = Some(name.clone());
                }
            }
        });
        if let Err(err) = outcome {
            warn!("[refs] container lookup failed: {err}");
        }
    }

    /// Declarations and definitions of the methods overriding `subjects`.
    fn add_overrides(
        &mut self,
        index: &dyn SymbolIndex,
        subjects: BTreeSet<SymbolId>,
    ) {
        let request = RelationsRequest {
            subjects,
            predicate: RelationKind::OverriddenBy,
            limit: None,
        };
        let limit = self.limit;
        let results = &mut *self.results;
        let mut by_container: BTreeMap<SymbolId, usize> = BTreeMap::new();
        let outcome = index.relations(&request, &mut |_, object| {
            if limit > 0 && results.references.len() >= limit {
                results.has_more = true;
                return;
            }
            let declaration = object.canonical_declaration.as_ref().and_then(index_to_location);
            let definition = object.definition.as_ref().and_then(index_to_location);
            if let Some(declaration) = declaration
                && Some(&declaration) != definition.as_ref()
            {
                by_container.entry(object.id).or_insert(results.references.len());
                results.references.push(Reference {
                    location: declaration,
                    container_name: None,
                    attributes: ReferenceAttributes::DECLARATION | ReferenceAttributes::OVERRIDE,
                });
            }
            if let Some(definition) = definition {
                by_container.entry(object.id).or_insert(results.references.len());
                results.references.push(Reference {
                    location: definition,
                    container_name: None,
                    attributes: ReferenceAttributes::DECLARATION
                        | ReferenceAttributes::DEFINITION
                        | ReferenceAttributes::OVERRIDE,
                });
            }
        });
        if let Err(err) = outcome {
            warn!("[refs] overrides query failed: {err}");
            return;
        }
        if !self.include_context || by_container.is_empty() {
            return;
        }
        let lookup = LookupRequest {
            ids: by_container.keys().copied().collect(),
        };
        let references = &mut self.results.references;
        let outcome = index.lookup(&lookup, &mut |symbol| {
            if let Some(&idx) = by_container.get(&symbol.id) {
                references[idx].container_name = Some(symbol.scope.clone());
            }
        });
        if let Err(err) = outcome {
            warn!("[refs] override container lookup failed: {err}");
        }
    }
}

/// All references to the symbol at `position`. A `limit` of 0 means unlimited.
pub fn find_references(
    ast: &ParsedAst,
    position: IdePosition,
    limit: usize,
    include_context: bool,
    index: Option<&dyn SymbolIndex>,
) -> ReferencesResult {
    let mut results = ReferencesResult::default();
    let Some(offset) = ast.offset_at(position) else {
        error!("[refs] position {position} is outside {}", ast.main_path().display());
        return results;
    };

    let mut ids_to_query: BTreeSet<SymbolId> = BTreeSet::new();
    let mut overridden_methods: BTreeSet<SymbolId> = BTreeSet::new();
    let mut override_subjects: BTreeSet<SymbolId> = BTreeSet::new();

    let touched = ast.tokens().spelled_identifier_touching(offset);
    let macro_id = touched.and_then(|tok| ast.macros().locate(tok.range, tok.text(ast.main_text())));
    if let Some(macro_id) = macro_id {
        if let Some(id) = ast.macro_symbol_id(macro_id) {
            for occurrence in ast.macros().occurrences_of(macro_id) {
                let Some(location) = ast.location(&FileRange::main(occurrence.range)) else {
                    continue;
                };
                let attributes = if occurrence.is_definition {
                    ReferenceAttributes::DECLARATION | ReferenceAttributes::DEFINITION
                } else {
                    ReferenceAttributes::empty()
                };
                results.references.push(Reference {
                    location,
                    container_name: None,
                    attributes,
                });
            }
            ids_to_query.insert(id);
        }
    } else {
        let decls = decl_at_position(ast, offset, DeclRelationSet::TEMPLATE_PATTERN | DeclRelationSet::ALIAS);
        let mut targets_in_main_file = Vec::new();
        for &decl in &decls {
            let Some(id) = ast.symbol_id(decl) else {
                continue;
            };
            targets_in_main_file.push(decl);
            // Function-local declarations cannot be referenced from other files.
            if ast.parent_function(decl).is_some() {
                continue;
            }
            ids_to_query.insert(id);
        }
        if index.is_some() {
            for &decl in &decls {
                let d = ast.decl(decl);
                let overridable = (d.kind.is_cxx_method() && d.is_virtual()) || d.kind == DeclKind::ObjCMethod;
                if !overridable {
                    continue;
                }
                if let Some(id) = ast.symbol_id(decl) {
                    override_subjects.insert(id);
                }
                overridden_methods.extend(
                    ast.overridden_transitively(decl).into_iter().filter_map(|method| ast.symbol_id(method)),
                );
            }
        }

        let mut main_refs = find_refs(ast, &targets_in_main_file, false);
        // Only locations matter here; keep the first roles seen per location.
        main_refs.dedup_by_key(|r| r.range);
        debug!("[refs] {} main-file references for {} targets", main_refs.len(), targets_in_main_file.len());
        for r in main_refs {
            let Some(location) = ast.location(&FileRange::main(r.range)) else {
                continue;
            };
            let mut attributes = ReferenceAttributes::empty();
            if r.roles.contains(SymbolRoles::DECLARATION) {
                attributes |= ReferenceAttributes::DECLARATION;
            }
            if r.roles.contains(SymbolRoles::DEFINITION) {
                attributes |= ReferenceAttributes::DECLARATION | ReferenceAttributes::DEFINITION;
            }
            let container_name =
                if include_context { container_name_for_main_ref(ast, r.container) } else { None };
            results.references.push(Reference {
                location,
                container_name,
                attributes,
            });
        }
    }

    if let Some(index) = index {
        let mut sink = ReferenceSink {
            results: &mut results,
            limit,
            include_context,
        };
        if !override_subjects.is_empty() {
            sink.add_overrides(index, override_subjects);
        }
        sink.query_index(index, ids_to_query, true, false, ast.main_path());
        // Index refs of overridden methods count as references to this one, even in the main file.
        sink.query_index(index, overridden_methods, false, true, ast.main_path());
    }

    if limit > 0 && results.references.len() > limit {
        results.has_more = true;
        results.references.truncate(limit);
    }
    results
}

/// Non-local declarations referenced inside `function`, excluding declaration sites.
pub fn non_local_decl_refs(
    ast: &ParsedAst,
    function: DeclId,
) -> BTreeSet<DeclId> {
    let mut refs = BTreeSet::new();
    let Some(node) = ast.node_of_decl(function) else {
        return refs;
    };
    let has_body = ast.node(node).children.iter().any(|&child| ast.node(child).stmt() == Some(&StmtKind::Compound));
    if !has_body {
        return refs;
    }
    for id in ast.preorder(node) {
        if ast.node(id).decl().is_some() {
            continue;
        }
        for decl in explicit_reference_targets(ast, id, DeclRelationSet::empty()) {
            if !ast.is_function_local(decl) && !ast.decl(decl).kind.is_template_param() {
                refs.insert(decl);
            }
        }
    }
    refs
}

#[cfg(test)]
#[path = "../../tests/src/resolve/references_tests.rs"]
mod tests;
