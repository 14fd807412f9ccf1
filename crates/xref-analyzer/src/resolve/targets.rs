//! Declarations a tree node refers to, and how they were reached.

use rustc_hash::FxHashSet;
use tracing::trace;

use crate::semantic::{DeclFlags, DeclId, DeclKind, NodeId, NodeKind, ParsedAst, StmtKind, TypeRef};

use super::selection::{Selection, for_each_selection};

bitflags::bitflags! {
    /// How a target relates to the node that named it.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DeclRelationSet: u8 {
        /// The target is an alias (typedef, using-declaration, namespace alias).
        const ALIAS = 1 << 0;
        /// The target is what an alias refers to.
        const UNDERLYING = 1 << 1;
        /// The target is an instantiation of a template.
        const TEMPLATE_INSTANTIATION = 1 << 2;
        /// The target is the pattern an instantiation was produced from.
        const TEMPLATE_PATTERN = 1 << 3;
    }
}

/// Pattern `decl` was instantiated from, if it is an instantiation.
pub fn template_pattern(
    ast: &ParsedAst,
    decl: DeclId,
) -> Option<DeclId> {
    let d = ast.decl(decl);
    if let Some(pattern) = d.instantiation_pattern {
        return Some(pattern);
    }
    match d.kind {
        // An incomplete implicit specialization has no pattern; use the primary template.
        DeclKind::ClassTemplateSpecialization if !d.flags.contains(DeclFlags::EXPLICIT_SPECIALIZATION) => {
            d.specialized_template.and_then(|template| ast.decl(template).templated)
        },
        DeclKind::Field | DeclKind::Typedef | DeclKind::TypeAlias => {
            let parent_pattern = template_pattern(ast, d.context?)?;
            ast.decl(parent_pattern).members.iter().copied().find(|&member| {
                let candidate = ast.decl(member);
                !candidate.is_implicit() && candidate.kind == d.kind && candidate.name == d.name
            })
        },
        _ => None,
    }
}

/// The using-declaration that introduced `shadow`.
pub fn introducer_of(
    ast: &ParsedAst,
    shadow: DeclId,
) -> Option<DeclId> {
    ast.decl_ids().find(|&using| {
        let decl = ast.decl(using);
        decl.kind == DeclKind::Using && decl.shadows.contains(&shadow)
    })
}

/// Collects the targets of one node, merging relations of repeated targets.
struct TargetFinder<'a> {
    ast: &'a ParsedAst,
    decls: Vec<(DeclId, DeclRelationSet)>,
    seen: FxHashSet<(DeclId, DeclRelationSet)>,
}

impl<'a> TargetFinder<'a> {
    fn new(ast: &'a ParsedAst) -> Self {
        Self {
            ast,
            decls: Vec::new(),
            seen: FxHashSet::default(),
        }
    }

    fn report(
        &mut self,
        decl: DeclId,
        flags: DeclRelationSet,
    ) {
        trace!("[targets] report {:?} {:?}", self.ast.decl(decl).name, flags);
        if let Some(entry) = self.decls.iter_mut().find(|(existing, _)| *existing == decl) {
            entry.1 |= flags;
        } else {
            self.decls.push((decl, flags));
        }
    }

    fn add_decl(
        &mut self,
        decl: DeclId,
        mut flags: DeclRelationSet,
    ) {
        // Heuristic resolution can loop; stop at a decl already seen with these flags.
        if !self.seen.insert((decl, flags)) {
            return;
        }
        let ast = self.ast;
        let d = ast.decl(decl);
        let mut current = Some(decl);

        match d.kind {
            DeclKind::UsingDirective => current = d.target,
            DeclKind::Typedef | DeclKind::TypeAlias => {
                if let Some(underlying) = &d.underlying {
                    self.add_type(underlying, flags | DeclRelationSet::UNDERLYING);
                }
                flags |= DeclRelationSet::ALIAS;
            },
            DeclKind::Using => {
                // Not renaming, so the targets are not `UNDERLYING`.
                for &shadow in &d.shadows {
                    if let Some(target) = ast.decl(shadow).target {
                        self.add_decl(target, flags);
                    }
                }
                flags |= DeclRelationSet::ALIAS;
            },
            DeclKind::NamespaceAlias => {
                if let Some(target) = d.target {
                    self.add_decl(target, flags | DeclRelationSet::UNDERLYING);
                }
                flags |= DeclRelationSet::ALIAS;
            },
            DeclKind::UsingShadow => {
                // The introducing using-declaration is reported but not traversed.
                if let Some(using) = introducer_of(ast, decl) {
                    self.report(using, flags | DeclRelationSet::ALIAS);
                }
                current = d.target;
            },
            DeclKind::ObjCImplementation => {
                if let Some(interface) = d.class_interface {
                    let definition = ast.group_definition(interface).unwrap_or(interface);
                    if !ast.decl(definition).is_implicit() {
                        current = Some(definition);
                    }
                }
            },
            DeclKind::ObjCCategoryImpl => current = d.category_decl,
            _ => {},
        }

        let Some(current) = current else {
            return;
        };
        if let Some(pattern) = template_pattern(ast, current) {
            self.add_decl(pattern, flags | DeclRelationSet::TEMPLATE_PATTERN);
            flags |= DeclRelationSet::TEMPLATE_INSTANTIATION;
        }
        self.report(current, flags);
    }

    fn add_type(
        &mut self,
        ty: &TypeRef,
        flags: DeclRelationSet,
    ) {
        let ast = self.ast;
        match ty {
            TypeRef::Decl(decl) => self.add_decl(*decl, flags),
            TypeRef::Deduced(Some(inner)) => self.add_type(inner, flags),
            TypeRef::Specialization {
                template,
                resolved,
            } => {
                if ast.decl(*template).kind == DeclKind::TemplateTemplateParam {
                    self.add_decl(*template, flags);
                } else if let Some(resolved) = resolved {
                    self.add_decl(*resolved, flags);
                } else {
                    let pattern = ast.decl(*template).templated.unwrap_or(*template);
                    self.add_decl(pattern, flags | DeclRelationSet::TEMPLATE_PATTERN);
                }
            },
            // Pointers, references, arrays and function types name nothing themselves.
            _ => {},
        }
    }

    fn add_node(
        &mut self,
        node: NodeId,
    ) {
        let flags = DeclRelationSet::empty();
        match &self.ast.node(node).kind {
            NodeKind::Decl(decl) => self.add_decl(*decl, flags),
            NodeKind::DeclRef {
                target,
                using,
                ..
            } => self.add_decl(using.unwrap_or(*target), flags),
            NodeKind::TypeLoc {
                ty,
            }
            | NodeKind::BaseSpecifier {
                ty,
            } => self.add_type(ty, flags),
            NodeKind::NestedNameSpecifier {
                target,
            } => self.add_decl(*target, flags),
            NodeKind::CtorInitializer {
                member: Some(member),
                ..
            } => self.add_decl(*member, flags),
            NodeKind::ObjCMessage {
                method,
                ..
            } => self.add_decl(*method, flags),
            NodeKind::DependentName {
                candidates,
            } => {
                for &candidate in candidates {
                    self.add_decl(candidate, flags);
                }
            },
            NodeKind::Stmt(StmtKind::Goto {
                label,
            }) => self.add_decl(*label, flags),
            _ => {},
        }
    }
}

/// Every declaration `node` refers to, with the relations it was reached through.
pub fn all_target_decls(
    ast: &ParsedAst,
    node: NodeId,
) -> Vec<(DeclId, DeclRelationSet)> {
    let mut finder = TargetFinder::new(ast);
    finder.add_node(node);
    finder.decls
}

/// Targets of `type` itself, as if it were written at the cursor.
pub fn type_target_decls(
    ast: &ParsedAst,
    ty: &TypeRef,
    mask: DeclRelationSet,
) -> Vec<DeclId> {
    let mut finder = TargetFinder::new(ast);
    finder.add_type(ty, DeclRelationSet::empty());
    finder.decls.into_iter().filter(|(_, rel)| (*rel & !mask).is_empty()).map(|(decl, _)| decl).collect()
}

/// Targets of `node` whose relations all lie within `mask`.
pub fn target_decls(
    ast: &ParsedAst,
    node: NodeId,
    mask: DeclRelationSet,
) -> Vec<DeclId> {
    all_target_decls(ast, node).into_iter().filter(|(_, rel)| (*rel & !mask).is_empty()).map(|(decl, _)| decl).collect()
}

/// Targets as written: instantiations when available, patterns otherwise.
///
/// `mask` must not contain template relations; they are handled here.
pub fn explicit_reference_targets(
    ast: &ParsedAst,
    node: NodeId,
    mask: DeclRelationSet,
) -> Vec<DeclId> {
    let mask = mask | DeclRelationSet::TEMPLATE_PATTERN | DeclRelationSet::TEMPLATE_INSTANTIATION;
    let mut patterns = Vec::new();
    let mut targets = Vec::new();
    let mut seen_instantiation = false;
    for (decl, rel) in all_target_decls(ast, node) {
        if !(rel & !mask).is_empty() {
            continue;
        }
        if rel.contains(DeclRelationSet::TEMPLATE_PATTERN) {
            patterns.push(decl);
            continue;
        }
        if rel.contains(DeclRelationSet::TEMPLATE_INSTANTIATION) {
            seen_instantiation = true;
        }
        targets.push(decl);
    }
    if !seen_instantiation {
        targets.extend(patterns);
    }
    targets
}

/// Targets at `offset`, from the first selection interpretation that has any.
///
/// Also returns the kind of the selected node, reported before attribute redirection.
pub fn decl_at_position_with_relations<'a>(
    ast: &'a ParsedAst,
    offset: u32,
    mask: DeclRelationSet,
) -> (Vec<(DeclId, DeclRelationSet)>, Option<&'a NodeKind>) {
    let mut result = Vec::new();
    let mut kind = None;
    for_each_selection(ast, offset, |selection: Option<Selection<'a>>| {
        if let Some(selection) = selection {
            kind = Some(selection.kind);
            let target = selection.target_node(ast);
            result.extend(all_target_decls(ast, target).into_iter().filter(|(_, rel)| (*rel & !mask).is_empty()));
        }
        !result.is_empty()
    });
    (result, kind)
}

pub fn decl_at_position(
    ast: &ParsedAst,
    offset: u32,
    mask: DeclRelationSet,
) -> Vec<DeclId> {
    decl_at_position_with_relations(ast, offset, mask).0.into_iter().map(|(decl, _)| decl).collect()
}

#[cfg(test)]
#[path = "../../tests/src/resolve/targets_tests.rs"]
mod tests;
