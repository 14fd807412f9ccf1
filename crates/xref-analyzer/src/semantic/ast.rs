use std::path::Path;

use rustc_hash::FxHashMap;

use crate::ide::navigation::{IdeLocation, IdePosition};
use crate::index::{SymbolId, SymbolKind};
use crate::text_pos::byte_offset_from_position;

use super::decl::{Decl, DeclFlags, DeclId, DeclKind, TagKind};
use super::macros::{MacroId, MacroTable};
use super::node::{Node, NodeId, NodeKind};
use super::source::{FileRange, SourceFileId, SourceMap, TextRange};
use super::tokens::TokenBuffer;
use super::types::TypeRef;

/// One `#include`/`#import` directive of the main file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inclusion {
    /// Zero-based line of the directive.
    pub line: u32,
    /// Spelling between the delimiters, e.g. `foo/bar.h`.
    pub written: String,
    /// Range of the written file name including its delimiters.
    pub written_range: TextRange,
    pub resolved: Option<SourceFileId>,
}

/// An immutable snapshot of the main file: declarations, tree, tokens and macros.
///
/// Everything is arena-owned and addressed by [`DeclId`]/[`NodeId`] handles.
#[derive(Debug, Clone)]
pub struct ParsedAst {
    pub(crate) sources: SourceMap,
    pub(crate) decls: Vec<Decl>,
    pub(crate) nodes: Vec<Node>,
    pub(crate) tokens: TokenBuffer,
    pub(crate) macros: MacroTable,
    pub(crate) includes: Vec<Inclusion>,
    pub(crate) skipped: Vec<TextRange>,
    pub(crate) decl_nodes: FxHashMap<DeclId, NodeId>,
}

impl ParsedAst {
    pub fn sources(&self) -> &SourceMap {
        &self.sources
    }

    pub fn main_path(&self) -> &Path {
        self.sources.main_path()
    }

    pub fn main_text(&self) -> &str {
        self.sources.main_text()
    }

    pub fn main_uri(&self) -> Option<String> {
        self.sources.uri(SourceFileId::MAIN)
    }

    pub fn tokens(&self) -> &TokenBuffer {
        &self.tokens
    }

    pub fn macros(&self) -> &MacroTable {
        &self.macros
    }

    pub fn includes(&self) -> &[Inclusion] {
        &self.includes
    }

    pub fn is_skipped(
        &self,
        offset: u32,
    ) -> bool {
        self.skipped.iter().any(|range| range.start <= offset && offset < range.end)
    }

    pub fn decl(
        &self,
        id: DeclId,
    ) -> &Decl {
        &self.decls[id.0 as usize]
    }

    pub fn decl_ids(&self) -> impl Iterator<Item = DeclId> + '_ {
        (0..self.decls.len()).map(|idx| DeclId(idx as u32))
    }

    pub fn node(
        &self,
        id: NodeId,
    ) -> &Node {
        &self.nodes[id.0 as usize]
    }

    pub fn root(&self) -> &Node {
        self.node(NodeId::ROOT)
    }

    pub fn node_of_decl(
        &self,
        id: DeclId,
    ) -> Option<NodeId> {
        self.decl_nodes.get(&id).copied()
    }

    /// Pre-order walk of the subtree rooted at `start`, children in source order.
    pub fn preorder(
        &self,
        start: NodeId,
    ) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.node(id).children.iter().rev().copied());
        }
        out
    }

    pub fn offset_at(
        &self,
        position: IdePosition,
    ) -> Option<u32> {
        byte_offset_from_position(self.main_text(), position).map(|offset| offset as u32)
    }

    pub fn location(
        &self,
        range: &FileRange,
    ) -> Option<IdeLocation> {
        self.sources.location(range)
    }

    pub fn main_slice(
        &self,
        range: TextRange,
    ) -> &str {
        self.main_text().get(range.as_usize()).unwrap_or("")
    }

    pub fn canonical(
        &self,
        id: DeclId,
    ) -> DeclId {
        self.decl(id).canonical.unwrap_or(id)
    }

    /// Definition of the redeclaration group `id` belongs to.
    pub fn group_definition(
        &self,
        id: DeclId,
    ) -> Option<DeclId> {
        self.decl(self.canonical(id)).definition
    }

    pub fn redecls(
        &self,
        id: DeclId,
    ) -> impl Iterator<Item = DeclId> + '_ {
        let canonical = self.canonical(id);
        self.decl_ids().filter(move |&other| self.canonical(other) == canonical)
    }

    pub fn parent_function(
        &self,
        id: DeclId,
    ) -> Option<DeclId> {
        let mut context = self.decl(id).context;
        while let Some(ctx) = context {
            if self.decl(ctx).kind.is_function_like() {
                return Some(ctx);
            }
            context = self.decl(ctx).context;
        }
        None
    }

    /// Parameters and declarations nested in a function body.
    pub fn is_function_local(
        &self,
        id: DeclId,
    ) -> bool {
        let decl = self.decl(id);
        match decl.kind {
            DeclKind::Param => true,
            DeclKind::UsingDirective => false,
            _ => self.parent_function(id).is_some(),
        }
    }

    pub fn print_name(
        &self,
        id: DeclId,
    ) -> String {
        let decl = self.decl(id);
        if !decl.is_anonymous() {
            return decl.name.clone();
        }
        match decl.kind {
            DeclKind::Namespace => "(anonymous namespace)".to_owned(),
            DeclKind::Record(TagKind::Struct) => "(anonymous struct)".to_owned(),
            DeclKind::Record(TagKind::Class) => "(anonymous class)".to_owned(),
            DeclKind::Record(TagKind::Union) => "(anonymous union)".to_owned(),
            DeclKind::Enum => "(anonymous enum)".to_owned(),
            _ => "(anonymous)".to_owned(),
        }
    }

    pub fn qualified_name(
        &self,
        id: DeclId,
    ) -> String {
        let mut parts = vec![self.print_name(id)];
        let mut context = self.decl(id).context;
        while let Some(ctx) = context {
            parts.push(self.print_name(ctx));
            context = self.decl(ctx).context;
        }
        parts.reverse();
        parts.join("::")
    }

    pub fn usr(
        &self,
        id: DeclId,
    ) -> Option<&str> {
        let decl = self.decl(self.canonical(id));
        if decl.kind == DeclKind::UsingDirective {
            return None;
        }
        decl.usr.as_deref().filter(|usr| !usr.is_empty())
    }

    pub fn symbol_id(
        &self,
        id: DeclId,
    ) -> Option<SymbolId> {
        self.usr(id).map(SymbolId::from_usr)
    }

    pub fn macro_usr(
        &self,
        id: MacroId,
    ) -> Option<String> {
        let def = self.macros.def(id)?;
        if def.name_loc.is_main() {
            let file_name = self.main_path().file_name()?.to_string_lossy().into_owned();
            return Some(format!("c:{}@{}@macro@{}", file_name, def.name_loc.range.start, def.name));
        }
        Some(format!("c:@macro@{}", def.name))
    }

    pub fn macro_symbol_id(
        &self,
        id: MacroId,
    ) -> Option<SymbolId> {
        self.macro_usr(id).map(|usr| SymbolId::from_usr(&usr))
    }

    pub fn symbol_kind(
        &self,
        id: DeclId,
    ) -> SymbolKind {
        let decl = self.decl(id);
        let in_record = decl.context.is_some_and(|ctx| self.decl(ctx).kind.is_record());
        match decl.kind {
            DeclKind::Namespace => SymbolKind::Namespace,
            DeclKind::NamespaceAlias => SymbolKind::NamespaceAlias,
            DeclKind::UsingDirective | DeclKind::Using | DeclKind::UsingShadow => SymbolKind::Using,
            DeclKind::Record(TagKind::Struct) => SymbolKind::Struct,
            DeclKind::Record(TagKind::Class) => SymbolKind::Class,
            DeclKind::Record(TagKind::Union) => SymbolKind::Union,
            DeclKind::ClassTemplate
            | DeclKind::ClassTemplateSpecialization
            | DeclKind::ClassTemplatePartialSpecialization => SymbolKind::Class,
            DeclKind::Enum => SymbolKind::Enum,
            DeclKind::EnumConstant => SymbolKind::EnumConstant,
            DeclKind::Function | DeclKind::FunctionTemplate => {
                if in_record {
                    SymbolKind::InstanceMethod
                } else {
                    SymbolKind::Function
                }
            },
            DeclKind::Method => SymbolKind::InstanceMethod,
            DeclKind::Constructor => SymbolKind::Constructor,
            DeclKind::Destructor => SymbolKind::Destructor,
            DeclKind::ConversionFunction => SymbolKind::ConversionFunction,
            DeclKind::Var => {
                if in_record {
                    SymbolKind::StaticProperty
                } else {
                    SymbolKind::Variable
                }
            },
            DeclKind::Field => SymbolKind::Field,
            DeclKind::Param => SymbolKind::Parameter,
            DeclKind::Typedef | DeclKind::TypeAlias => SymbolKind::TypeAlias,
            DeclKind::TemplateTypeParam | DeclKind::TemplateTemplateParam => SymbolKind::TemplateTypeParm,
            DeclKind::NonTypeTemplateParam => SymbolKind::NonTypeTemplateParm,
            DeclKind::Label => SymbolKind::Unknown,
            DeclKind::ObjCInterface | DeclKind::ObjCImplementation => SymbolKind::Class,
            DeclKind::ObjCProtocol => SymbolKind::Protocol,
            DeclKind::ObjCCategory | DeclKind::ObjCCategoryImpl => SymbolKind::Extension,
            DeclKind::ObjCMethod => {
                if decl.flags.contains(DeclFlags::INSTANCE_METHOD) {
                    SymbolKind::InstanceMethod
                } else {
                    SymbolKind::ClassMethod
                }
            },
            DeclKind::ObjCProperty => SymbolKind::InstanceProperty,
        }
    }

    /// Declaration a type names, looking through deduction sugar only.
    pub fn type_decl(
        &self,
        ty: &TypeRef,
    ) -> Option<DeclId> {
        match ty.strip_deduced()? {
            TypeRef::Decl(id) => Some(*id),
            TypeRef::Specialization {
                template,
                resolved,
            } => resolved.or_else(|| self.decl(*template).templated).or(Some(*template)),
            _ => None,
        }
    }

    /// Record a type resolves to once typedef sugar is removed.
    pub fn record_of_type(
        &self,
        ty: &TypeRef,
    ) -> Option<DeclId> {
        match ty.strip_deduced()? {
            TypeRef::Decl(id) => {
                let decl = self.decl(*id);
                if decl.kind.is_record() {
                    Some(*id)
                } else if decl.kind.is_typedef_name() {
                    decl.underlying.as_ref().and_then(|underlying| self.record_of_type(underlying))
                } else {
                    None
                }
            },
            TypeRef::Specialization {
                resolved: Some(id),
                ..
            } => Some(*id),
            _ => None,
        }
    }

    /// Pointee of a smart-pointer-like record, found through its `operator->`.
    pub fn pointee_type(
        &self,
        ty: &TypeRef,
    ) -> Option<TypeRef> {
        let record = self.record_of_type(ty)?;
        let mut candidates = vec![record];
        if let Some(pattern) = self.decl(record).instantiation_pattern {
            candidates.push(pattern);
        }
        if let Some(template) = self.decl(record).specialized_template
            && let Some(pattern) = self.decl(template).templated
        {
            candidates.push(pattern);
        }
        candidates.into_iter().find_map(|candidate| {
            self.decl(candidate).members.iter().find_map(|&member| {
                let decl = self.decl(member);
                if decl.kind != DeclKind::Method || decl.name != "operator->" {
                    return None;
                }
                match decl.ty.as_ref()? {
                    TypeRef::Function {
                        ret,
                        ..
                    } => match ret.as_ref() {
                        TypeRef::Pointer(pointee) => Some(pointee.as_ref().clone()),
                        _ => None,
                    },
                    _ => None,
                }
            })
        })
    }

    /// Deduced type of the `auto`/`decltype` written at `offset`.
    pub fn deduced_type_at(
        &self,
        offset: u32,
    ) -> Option<&TypeRef> {
        self.nodes.iter().find_map(|node| match &node.kind {
            NodeKind::TypeLoc {
                ty: TypeRef::Deduced(Some(inner)),
            } if node.loc.touches(offset) => Some(inner.as_ref()),
            _ => None,
        })
    }

    /// Method of `container` matching `method` by selector and instance-ness.
    pub fn find_objc_method(
        &self,
        container: DeclId,
        method: DeclId,
    ) -> Option<DeclId> {
        let wanted = self.decl(method);
        let instance = wanted.flags.contains(DeclFlags::INSTANCE_METHOD);
        self.decl(container).members.iter().copied().find(|&member| {
            let decl = self.decl(member);
            decl.kind == DeclKind::ObjCMethod
                && decl.name == wanted.name
                && decl.flags.contains(DeclFlags::INSTANCE_METHOD) == instance
        })
    }

    /// Overridden methods, transitively, in breadth-first order.
    pub fn overridden_transitively(
        &self,
        method: DeclId,
    ) -> Vec<DeclId> {
        let mut out: Vec<DeclId> = Vec::new();
        let mut queue = self.decl(method).overridden.clone();
        while let Some(next) = queue.pop() {
            if out.contains(&next) {
                continue;
            }
            out.push(next);
            queue.extend(self.decl(next).overridden.iter().copied());
        }
        out
    }
}
