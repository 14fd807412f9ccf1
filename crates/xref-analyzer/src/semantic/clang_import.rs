//! Snapshot construction from `clang -Xclang -ast-dump=json` output.
//!
//! Two passes over the typed dump: the first creates every declaration so
//! forward references resolve, the second builds main-file tree nodes.
//! The JSON dump carries no TypeLocs, macro records or override lists, so
//! type-name nodes are recovered from the spelled text and overrides are
//! inferred from base classes.

use std::path::{Path, PathBuf};

use clang_ast::{BareSourceLocation, Id, SourceLocation, SourceRange};
use rustc_hash::FxHashMap;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use super::ast::ParsedAst;
use super::builder::AstBuilder;
use super::decl::{Decl, DeclFlags, DeclId, DeclKind, TagKind};
use super::node::{AttrKind, NodeId, NodeKind, StmtKind, SymbolRoles};
use super::source::{FileRange, SourceFileId, TextRange};
use super::types::TypeRef;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("AST dump has no declarations from main file {0}")]
    MissingMainFile(String),
}

pub type Node = clang_ast::Node<Clang>;

#[derive(Deserialize)]
pub enum Clang {
    NamespaceDecl(DeclData),
    NamespaceAliasDecl(DeclData),
    UsingDirectiveDecl(DeclData),
    UsingDecl(DeclData),
    UsingShadowDecl(DeclData),
    CXXRecordDecl(DeclData),
    RecordDecl(DeclData),
    EnumDecl(DeclData),
    EnumConstantDecl(DeclData),
    ClassTemplateDecl(DeclData),
    ClassTemplateSpecializationDecl(DeclData),
    ClassTemplatePartialSpecializationDecl(DeclData),
    FunctionDecl(DeclData),
    FunctionTemplateDecl(DeclData),
    CXXMethodDecl(DeclData),
    CXXConstructorDecl(DeclData),
    CXXDestructorDecl(DeclData),
    CXXConversionDecl(DeclData),
    VarDecl(DeclData),
    FieldDecl(DeclData),
    ParmVarDecl(DeclData),
    TypedefDecl(DeclData),
    TypeAliasDecl(DeclData),
    TemplateTypeParmDecl(DeclData),
    NonTypeTemplateParmDecl(DeclData),
    TemplateTemplateParmDecl(DeclData),
    LabelStmt(LabelData),

    DeclRefExpr(RefExprData),
    MemberExpr(RefExprData),
    CallExpr(ExprData),
    CXXMemberCallExpr(ExprData),
    BinaryOperator(ExprData),
    CompoundAssignOperator(ExprData),
    UnaryOperator(ExprData),
    LambdaExpr(ExprData),
    CXXThrowExpr(ExprData),

    CompoundStmt(StmtData),
    ForStmt(StmtData),
    CXXForRangeStmt(StmtData),
    WhileStmt(StmtData),
    DoStmt(StmtData),
    IfStmt(StmtData),
    SwitchStmt(StmtData),
    CaseStmt(StmtData),
    DefaultStmt(StmtData),
    BreakStmt(StmtData),
    ContinueStmt(StmtData),
    ReturnStmt(StmtData),
    GotoStmt(StmtData),

    OverrideAttr(StmtData),
    FinalAttr(StmtData),

    // Locations of unrecognized kinds must still be deserialized: clang-ast
    // tracks the current file across the stream through `SourceLocation`.
    #[allow(dead_code)]
    Other {
        #[serde(default)]
        loc: Option<SourceLocation>,
        #[serde(default)]
        range: Option<SourceRange>,
    },
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct DeclData {
    pub name: Option<String>,
    pub loc: Option<SourceLocation>,
    pub range: Option<SourceRange>,
    pub is_implicit: Option<bool>,
    pub previous_decl: Option<Id>,
    pub tag_used: Option<String>,
    pub complete_definition: Option<bool>,
    #[serde(rename = "virtual")]
    pub is_virtual: Option<bool>,
    pub pure: Option<bool>,
    pub storage_class: Option<String>,
    #[serde(rename = "type")]
    pub ty: Option<QualType>,
    pub bases: Option<Vec<BaseData>>,
    pub target: Option<RefDecl>,
    pub nominated_namespace: Option<RefDecl>,
    pub aliased_namespace: Option<RefDecl>,
}

#[derive(Deserialize, Debug)]
pub struct BaseData {
    #[serde(rename = "type")]
    pub ty: Option<QualType>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct LabelData {
    pub name: Option<String>,
    pub range: Option<SourceRange>,
    pub decl_id: Option<Id>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RefExprData {
    pub loc: Option<SourceLocation>,
    pub range: Option<SourceRange>,
    pub referenced_decl: Option<RefDecl>,
    pub referenced_member_decl: Option<Id>,
    pub found_referenced_decl: Option<RefDecl>,
    pub is_implicit: Option<bool>,
}

#[derive(Deserialize, Debug)]
pub struct RefDecl {
    pub id: Id,
    pub name: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct ExprData {
    pub range: Option<SourceRange>,
    pub opcode: Option<String>,
    #[serde(rename = "type")]
    pub ty: Option<QualType>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct StmtData {
    pub range: Option<SourceRange>,
    pub target_label_decl_id: Option<Id>,
}

#[derive(Deserialize, Debug)]
pub struct QualType {
    #[serde(rename = "qualType")]
    pub qual_type: Option<String>,
}

/// Reads an AST dump and the main file from disk.
pub fn import_ast_file(
    dump_path: &Path,
    main_path: &Path,
) -> Result<ParsedAst, ImportError> {
    let json = std::fs::read_to_string(dump_path)?;
    let text = std::fs::read_to_string(main_path)?;
    import_ast_json(&json, main_path, &text)
}

pub fn import_ast_json(
    json: &str,
    main_path: &Path,
    main_text: &str,
) -> Result<ParsedAst, ImportError> {
    let root: Node = serde_json::from_str(json)?;
    let mut importer = Importer::new(main_path, main_text);
    importer.declare(&root, None);
    if !importer.saw_main_file {
        return Err(ImportError::MissingMainFile(main_path.display().to_string()));
    }
    importer.resolve(&root);
    importer.infer_overrides();
    importer.attach(&root, None, RoleHint::None);
    debug!("[index] imported {} clang decls from {}", importer.ids.len(), main_path.display());
    Ok(importer.builder.build())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RoleHint {
    None,
    Call,
    Write,
    ReadWrite,
}

struct Importer {
    builder: AstBuilder,
    main_path: PathBuf,
    files: FxHashMap<String, SourceFileId>,
    ids: FxHashMap<Id, DeclId>,
    type_names: FxHashMap<String, DeclId>,
    saw_main_file: bool,
}

impl Importer {
    fn new(
        main_path: &Path,
        main_text: &str,
    ) -> Self {
        Self {
            builder: AstBuilder::new(main_path, main_text),
            main_path: main_path.to_path_buf(),
            files: FxHashMap::default(),
            ids: FxHashMap::default(),
            type_names: FxHashMap::default(),
            saw_main_file: false,
        }
    }

    fn file_id(
        &mut self,
        file: &str,
    ) -> SourceFileId {
        if let Some(id) = self.files.get(file) {
            return *id;
        }
        let path = PathBuf::from(file);
        let id = if paths_equivalent(&path, &self.main_path) {
            self.saw_main_file = true;
            SourceFileId::MAIN
        } else {
            let text = std::fs::read_to_string(&path).ok();
            if text.is_none() {
                warn!("[index] cannot read {file}; its locations will be dropped");
            }
            self.builder.add_file(path, text.as_deref())
        };
        self.files.insert(file.to_owned(), id);
        id
    }

    fn token_range(
        &mut self,
        loc: &SourceLocation,
    ) -> Option<FileRange> {
        let bare = spelled(loc)?;
        let file = self.file_id(&bare.file);
        let start = bare.offset as u32;
        Some(FileRange::new(file, TextRange::new(start, start + bare.tok_len as u32)))
    }

    fn full_range(
        &mut self,
        range: &SourceRange,
    ) -> Option<FileRange> {
        let begin = self.token_range(&range.begin)?;
        let end = self.token_range(&range.end)?;
        if begin.file != end.file || end.range.end < begin.range.start {
            return Some(begin);
        }
        Some(FileRange::new(begin.file, TextRange::new(begin.range.start, end.range.end)))
    }

    fn main_range(
        &mut self,
        range: Option<&SourceRange>,
    ) -> Option<TextRange> {
        self.full_range(range?).filter(FileRange::is_main).map(|range| range.range)
    }

    fn declare(
        &mut self,
        node: &Node,
        context: Option<DeclId>,
    ) {
        let mut child_context = context;
        match &node.kind {
            Clang::LabelStmt(label) => {
                if let (Some(name), Some(range)) = (label.name.as_ref(), label.range.as_ref())
                    && let Some(name_loc) = self.token_range(&range.begin)
                {
                    let mut decl = Decl::new(DeclKind::Label, name.clone(), name_loc);
                    decl.context = context;
                    let id = self.builder.add_decl(decl);
                    self.ids.insert(label.decl_id.unwrap_or(node.id), id);
                }
            },
            kind => {
                if let Some((decl_kind, data)) = decl_kind_of(kind)
                    && let Some(id) = self.declare_one(node, decl_kind, data, context)
                {
                    child_context = Some(id);
                }
            },
        }

        let is_template = matches!(
            node.kind,
            Clang::ClassTemplateDecl(_) | Clang::FunctionTemplateDecl(_)
        );
        for child in &node.inner {
            let ctx = if is_template && is_template_pattern(&child.kind) { context } else { child_context };
            self.declare(child, ctx);
            if is_template
                && is_template_pattern(&child.kind)
                && let (Some(template), Some(pattern)) = (self.ids.get(&node.id), self.ids.get(&child.id))
            {
                let (template, pattern) = (*template, *pattern);
                match child.kind {
                    Clang::ClassTemplateSpecializationDecl(_) => {
                        self.builder.set_specialization(pattern, template);
                        self.builder.decl_mut(pattern).flags |= DeclFlags::IMPLICIT_INSTANTIATION;
                    },
                    _ => self.builder.set_template(template, pattern),
                }
            }
        }
    }

    fn declare_one(
        &mut self,
        node: &Node,
        kind: DeclKind,
        data: &DeclData,
        context: Option<DeclId>,
    ) -> Option<DeclId> {
        let name_loc = match data.loc.as_ref().and_then(|loc| self.token_range(loc)) {
            Some(range) => range,
            None => return None,
        };
        let range = data.range.as_ref().and_then(|range| self.full_range(range)).unwrap_or(name_loc);
        let name = data.name.clone().unwrap_or_default();

        let mut flags = DeclFlags::empty();
        if data.is_implicit.unwrap_or(false) {
            flags |= DeclFlags::IMPLICIT;
        }
        if data.is_virtual.unwrap_or(false) {
            flags |= DeclFlags::VIRTUAL;
        }
        if data.pure.unwrap_or(false) {
            flags |= DeclFlags::PURE;
        }
        if name.is_empty() {
            flags |= DeclFlags::ANONYMOUS;
        }
        let is_definition = match kind {
            DeclKind::Record(_) | DeclKind::Enum | DeclKind::ClassTemplateSpecialization => {
                data.complete_definition.unwrap_or(false)
            },
            k if k.is_function() => node.inner.iter().any(|child| matches!(child.kind, Clang::CompoundStmt(_))),
            DeclKind::Var => data.storage_class.as_deref() != Some("extern"),
            DeclKind::Field | DeclKind::EnumConstant | DeclKind::Param => false,
            _ => false,
        };
        if is_definition {
            flags |= DeclFlags::DEFINITION;
        }

        let mut decl = Decl::new(kind, name.clone(), name_loc).with_range(range).with_flags(flags);
        decl.context = context;
        decl.previous = data.previous_decl.and_then(|prev| self.ids.get(&prev).copied());
        decl.target = data
            .target
            .as_ref()
            .or(data.nominated_namespace.as_ref())
            .or(data.aliased_namespace.as_ref())
            .and_then(|target| self.ids.get(&target.id).copied());
        let id = self.builder.add_decl(decl);
        self.ids.insert(node.id, id);
        if kind.is_type() && !name.is_empty() {
            self.type_names.entry(name).or_insert(id);
        }
        Some(id)
    }

    fn resolve(
        &mut self,
        node: &Node,
    ) {
        if let Some((_, data)) = decl_kind_of(&node.kind) {
            self.resolve_types(node, data);
        }
        for child in &node.inner {
            self.resolve(child);
        }
    }

    /// Resolves types once every declaration is known.
    fn resolve_types(
        &mut self,
        node: &Node,
        data: &DeclData,
    ) {
        let Some(&id) = self.ids.get(&node.id) else {
            return;
        };
        let qual = data.ty.as_ref().and_then(|ty| ty.qual_type.as_deref());
        let kind = self.builder.decl(id).kind;
        if let Some(qual) = qual {
            let ty = self.parse_type(qual);
            if kind.is_typedef_name() {
                self.builder.decl_mut(id).underlying = ty;
            } else {
                self.builder.decl_mut(id).ty = ty;
            }
        }
        if let Some(bases) = &data.bases {
            let bases: Vec<TypeRef> = bases
                .iter()
                .filter_map(|base| base.ty.as_ref()?.qual_type.as_deref())
                .filter_map(|qual| self.parse_type(qual))
                .collect();
            self.builder.decl_mut(id).bases = bases;
        }
        // Shadows follow the using-declaration that introduced them.
        if kind == DeclKind::UsingShadow
            && let Some(previous) = id.0.checked_sub(1).map(DeclId)
            && self.builder.decl(previous).kind == DeclKind::Using
        {
            self.builder.add_shadow(previous, id);
        }
    }

    /// Parses a `qualType` spelling into the structural type model.
    fn parse_type(
        &self,
        qual: &str,
    ) -> Option<TypeRef> {
        let qual = qual.trim();
        if qual == "auto" || qual.starts_with("decltype(") {
            return Some(TypeRef::Deduced(None));
        }
        if let Some(paren) = qual.find('(')
            && qual.ends_with(')')
            && paren > 0
        {
            let ret = self.parse_type(&qual[..paren]).unwrap_or_else(|| TypeRef::builtin(qual[..paren].trim()));
            let params = qual[paren + 1..qual.len() - 1]
                .split(',')
                .map(str::trim)
                .filter(|param| !param.is_empty() && *param != "void")
                .map(|param| self.parse_type(param).unwrap_or_else(|| TypeRef::builtin(param)))
                .collect();
            return Some(TypeRef::function(ret, params));
        }
        if let Some(inner) = qual.strip_suffix('*') {
            return Some(TypeRef::pointer_to(self.parse_type(inner)?));
        }
        if let Some(inner) = qual.strip_suffix('&') {
            let inner = inner.strip_suffix('&').unwrap_or(inner);
            return Some(TypeRef::reference_to(self.parse_type(inner)?));
        }
        if let Some(inner) = qual.strip_suffix(']').and_then(|rest| rest.rfind('[').map(|idx| &rest[..idx])) {
            return Some(TypeRef::Array(Box::new(self.parse_type(inner)?)));
        }
        let mut name = qual;
        for prefix in ["const ", "volatile ", "struct ", "class ", "union ", "enum ", "typename "] {
            name = name.strip_prefix(prefix).unwrap_or(name);
        }
        let name = name.strip_suffix(" const").unwrap_or(name).trim();
        let (base, is_specialization) = match name.find('<') {
            Some(idx) => (&name[..idx], true),
            None => (name, false),
        };
        let last = base.rsplit("::").next().unwrap_or(base);
        match self.type_names.get(last) {
            Some(&decl) if is_specialization => Some(TypeRef::Specialization {
                template: decl,
                resolved: None,
            }),
            Some(&decl) => Some(TypeRef::Decl(decl)),
            None => Some(TypeRef::builtin(name)),
        }
    }

    /// Methods override same-named virtual methods of their bases.
    fn infer_overrides(&mut self) {
        let ids: Vec<DeclId> = self.ids.values().copied().collect();
        let mut pairs = Vec::new();
        for &method in &ids {
            let (name, context) = {
                let decl = self.builder.decl(method);
                if decl.kind != DeclKind::Method {
                    continue;
                }
                (decl.name.clone(), decl.context)
            };
            let Some(record) = context else {
                continue;
            };
            let bases = self.builder.decl(record).bases.clone();
            for base in bases {
                let base_record = match base {
                    TypeRef::Decl(id) => id,
                    TypeRef::Specialization {
                        template,
                        ..
                    } => template,
                    _ => continue,
                };
                for &candidate in &ids {
                    let decl = self.builder.decl(candidate);
                    if decl.kind == DeclKind::Method
                        && decl.name == name
                        && decl.context == Some(base_record)
                        && decl.flags.intersects(DeclFlags::VIRTUAL | DeclFlags::PURE)
                    {
                        pairs.push((method, candidate));
                    }
                }
            }
        }
        pairs.sort();
        pairs.dedup();
        for (method, base) in pairs {
            self.builder.set_override(method, base);
            self.builder.decl_mut(method).flags |= DeclFlags::VIRTUAL;
        }
    }

    fn attach(
        &mut self,
        node: &Node,
        parent: Option<NodeId>,
        hint: RoleHint,
    ) {
        let created = match &node.kind {
            Clang::LabelStmt(label) => {
                let range = self.main_range(label.range.as_ref());
                let id = label.decl_id.unwrap_or(node.id);
                match (range, self.ids.get(&id).copied()) {
                    (Some(range), Some(decl)) => {
                        let loc = self.keyword_at(range.start);
                        let stmt = self.builder.add_node(parent, NodeKind::Stmt(StmtKind::Label), range, loc);
                        Some(self.builder.add_node(Some(stmt), NodeKind::Decl(decl), loc, loc))
                    },
                    _ => None,
                }
            },
            Clang::DeclRefExpr(data) | Clang::MemberExpr(data) => self.attach_ref(node, data, parent, hint),
            Clang::CallExpr(data) | Clang::CXXMemberCallExpr(data) => {
                let range = self.main_range(data.range.as_ref());
                if let Some(range) = range {
                    let ty = data.ty.as_ref().and_then(|ty| ty.qual_type.as_deref()).and_then(|q| self.parse_type(q));
                    let expr = self.builder.add_node(parent, NodeKind::Expr {
                        ty,
                    }, range, range);
                    for (idx, child) in node.inner.iter().enumerate() {
                        let hint = if idx == 0 { RoleHint::Call } else { RoleHint::None };
                        self.attach(child, Some(expr), hint);
                    }
                }
                return;
            },
            Clang::BinaryOperator(data) | Clang::CompoundAssignOperator(data) | Clang::UnaryOperator(data) => {
                let first = match data.opcode.as_deref() {
                    Some("=") => RoleHint::Write,
                    Some("++" | "--" | "+=" | "-=" | "*=" | "/=" | "%=" | "&=" | "|=" | "^=" | "<<=" | ">>=") => {
                        RoleHint::ReadWrite
                    },
                    _ => RoleHint::None,
                };
                for (idx, child) in node.inner.iter().enumerate() {
                    self.attach(child, parent, if idx == 0 { first } else { RoleHint::None });
                }
                return;
            },
            Clang::LambdaExpr(data) => self.main_range(data.range.as_ref()).map(|range| {
                let introducer = TextRange::new(range.start, range.start + 1);
                self.builder.add_node(parent, NodeKind::Lambda, range, introducer)
            }),
            Clang::CXXThrowExpr(data) => self.attach_stmt(StmtKind::Throw, data.range.as_ref(), parent),
            Clang::CompoundStmt(data) => self.attach_stmt(StmtKind::Compound, data.range.as_ref(), parent),
            Clang::ForStmt(data) => self.attach_stmt(StmtKind::For, data.range.as_ref(), parent),
            Clang::CXXForRangeStmt(data) => {
                let loop_var = node.inner.iter().find_map(|child| match child.kind {
                    Clang::VarDecl(_) => self.ids.get(&child.id).copied(),
                    _ => None,
                });
                self.attach_stmt(StmtKind::ForRange {
                    loop_var,
                }, data.range.as_ref(), parent)
            },
            Clang::WhileStmt(data) => self.attach_stmt(StmtKind::While, data.range.as_ref(), parent),
            Clang::DoStmt(data) => self.attach_stmt(StmtKind::Do, data.range.as_ref(), parent),
            Clang::IfStmt(data) => self.attach_stmt(StmtKind::If, data.range.as_ref(), parent),
            Clang::SwitchStmt(data) => self.attach_stmt(StmtKind::Switch, data.range.as_ref(), parent),
            Clang::CaseStmt(data) => self.attach_stmt(StmtKind::Case, data.range.as_ref(), parent),
            Clang::DefaultStmt(data) => self.attach_stmt(StmtKind::Default, data.range.as_ref(), parent),
            Clang::BreakStmt(data) => self.attach_stmt(StmtKind::Break, data.range.as_ref(), parent),
            Clang::ContinueStmt(data) => self.attach_stmt(StmtKind::Continue, data.range.as_ref(), parent),
            Clang::ReturnStmt(data) => self.attach_stmt(StmtKind::Return, data.range.as_ref(), parent),
            Clang::GotoStmt(data) => match data.target_label_decl_id.and_then(|id| self.ids.get(&id).copied()) {
                Some(label) => self.attach_stmt(StmtKind::Goto {
                    label,
                }, data.range.as_ref(), parent),
                None => None,
            },
            Clang::OverrideAttr(data) | Clang::FinalAttr(data) => {
                let attr = match node.kind {
                    Clang::OverrideAttr(_) => AttrKind::Override,
                    _ => AttrKind::Final,
                };
                self.main_range(data.range.as_ref())
                    .map(|range| self.builder.add_node(parent, NodeKind::Attr(attr), range, range))
            },
            kind => match decl_kind_of(kind) {
                Some(_) => self.attach_decl(node, parent),
                None => None,
            },
        };

        let next_parent = created.or(parent);
        let pass_hint = if created.is_none() { hint } else { RoleHint::None };
        for child in &node.inner {
            self.attach(child, next_parent, pass_hint);
        }
    }

    fn attach_decl(
        &mut self,
        node: &Node,
        parent: Option<NodeId>,
    ) -> Option<NodeId> {
        let id = *self.ids.get(&node.id)?;
        let (range, name_loc, implicit, ty, bases) = {
            let decl = self.builder.decl(id);
            (decl.range, decl.name_loc, decl.is_implicit(), decl.ty.clone(), decl.bases.clone())
        };
        if implicit || !range.is_main() || !name_loc.is_main() {
            return None;
        }
        let created = self.builder.add_decl_node(parent, id);

        // Type names spelled before the declared name.
        if let Some(ty) = ty.as_ref() {
            let written = match ty {
                TypeRef::Function {
                    ret,
                    ..
                } => ret.as_ref(),
                other => other,
            };
            self.attach_type_name(created, written, TextRange::new(range.range.start, name_loc.range.start));
        }
        // Base specifiers between the name and the body.
        if !bases.is_empty() {
            let text = self.builder.main_text();
            let tail_start = name_loc.range.end as usize;
            let tail_end = text[tail_start..range.range.end as usize]
                .find('{')
                .map(|idx| tail_start + idx)
                .unwrap_or(range.range.end as usize);
            for base in bases {
                self.attach_base(created, &base, TextRange::new(tail_start as u32, tail_end as u32));
            }
        }
        Some(created)
    }

    fn attach_type_name(
        &mut self,
        parent: NodeId,
        ty: &TypeRef,
        window: TextRange,
    ) {
        let mut inner = ty;
        while let TypeRef::Pointer(next) | TypeRef::Reference(next) | TypeRef::Array(next) = inner {
            inner = next;
        }
        let name = match inner {
            TypeRef::Decl(id)
            | TypeRef::Specialization {
                template: id,
                ..
            } => self.builder.decl(*id).name.clone(),
            TypeRef::Deduced(_) => "auto".to_owned(),
            TypeRef::Builtin(_) | TypeRef::Function {
                ..
            } | TypeRef::Pointer(_) | TypeRef::Reference(_) | TypeRef::Array(_) => return,
        };
        if let Some(loc) = find_word(self.builder.main_text(), &name, window) {
            self.builder.add_node(Some(parent), NodeKind::TypeLoc {
                ty: ty.clone(),
            }, loc, loc);
        }
    }

    fn attach_base(
        &mut self,
        parent: NodeId,
        base: &TypeRef,
        window: TextRange,
    ) {
        let name = match base {
            TypeRef::Decl(id)
            | TypeRef::Specialization {
                template: id,
                ..
            } => self.builder.decl(*id).name.clone(),
            _ => return,
        };
        if let Some(loc) = find_word(self.builder.main_text(), &name, window) {
            self.builder.add_node(Some(parent), NodeKind::BaseSpecifier {
                ty: base.clone(),
            }, loc, loc);
        }
    }

    fn attach_ref(
        &mut self,
        node: &Node,
        data: &RefExprData,
        parent: Option<NodeId>,
        hint: RoleHint,
    ) -> Option<NodeId> {
        if data.is_implicit.unwrap_or(false) {
            return None;
        }
        let target = data
            .referenced_decl
            .as_ref()
            .map(|decl| decl.id)
            .or(data.referenced_member_decl)
            .and_then(|id| self.ids.get(&id).copied())?;
        let using = data
            .found_referenced_decl
            .as_ref()
            .and_then(|decl| self.ids.get(&decl.id).copied())
            .filter(|&found| found != target);
        let loc = match &node.kind {
            Clang::MemberExpr(_) => data.loc.as_ref(),
            _ => data.range.as_ref().map(|range| &range.begin).or(data.loc.as_ref()),
        };
        let loc = loc.and_then(|loc| self.token_range(loc)).filter(FileRange::is_main)?.range;
        let range = self.main_range(data.range.as_ref()).unwrap_or(loc);
        let roles = SymbolRoles::REFERENCE
            | match hint {
                RoleHint::Call => SymbolRoles::CALL | SymbolRoles::READ,
                RoleHint::Write => SymbolRoles::WRITE,
                RoleHint::ReadWrite => SymbolRoles::READ | SymbolRoles::WRITE,
                RoleHint::None => SymbolRoles::READ,
            };
        Some(self.builder.add_node(parent, NodeKind::DeclRef {
            target,
            using,
            roles,
        }, range, loc))
    }

    fn attach_stmt(
        &mut self,
        kind: StmtKind,
        range: Option<&SourceRange>,
        parent: Option<NodeId>,
    ) -> Option<NodeId> {
        let range = self.main_range(range)?;
        let loc = self.keyword_at(range.start);
        Some(self.builder.add_node(parent, NodeKind::Stmt(kind), range, loc))
    }

    fn keyword_at(
        &self,
        start: u32,
    ) -> TextRange {
        let text = self.builder.main_text();
        let len = text
            .get(start as usize..)
            .map(|rest| rest.find(|c: char| !(c.is_ascii_alphanumeric() || c == '_')).unwrap_or(rest.len()))
            .unwrap_or(0)
            .max(1);
        TextRange::new(start, (start as usize + len).min(text.len()) as u32)
    }
}

fn decl_kind_of(kind: &Clang) -> Option<(DeclKind, &DeclData)> {
    let pair = match kind {
        Clang::NamespaceDecl(d) => (DeclKind::Namespace, d),
        Clang::NamespaceAliasDecl(d) => (DeclKind::NamespaceAlias, d),
        Clang::UsingDirectiveDecl(d) => (DeclKind::UsingDirective, d),
        Clang::UsingDecl(d) => (DeclKind::Using, d),
        Clang::UsingShadowDecl(d) => (DeclKind::UsingShadow, d),
        Clang::CXXRecordDecl(d) | Clang::RecordDecl(d) => (DeclKind::Record(tag_kind(d)), d),
        Clang::EnumDecl(d) => (DeclKind::Enum, d),
        Clang::EnumConstantDecl(d) => (DeclKind::EnumConstant, d),
        Clang::ClassTemplateDecl(d) => (DeclKind::ClassTemplate, d),
        Clang::ClassTemplateSpecializationDecl(d) => (DeclKind::ClassTemplateSpecialization, d),
        Clang::ClassTemplatePartialSpecializationDecl(d) => (DeclKind::ClassTemplatePartialSpecialization, d),
        Clang::FunctionDecl(d) => (DeclKind::Function, d),
        Clang::FunctionTemplateDecl(d) => (DeclKind::FunctionTemplate, d),
        Clang::CXXMethodDecl(d) => (DeclKind::Method, d),
        Clang::CXXConstructorDecl(d) => (DeclKind::Constructor, d),
        Clang::CXXDestructorDecl(d) => (DeclKind::Destructor, d),
        Clang::CXXConversionDecl(d) => (DeclKind::ConversionFunction, d),
        Clang::VarDecl(d) => (DeclKind::Var, d),
        Clang::FieldDecl(d) => (DeclKind::Field, d),
        Clang::ParmVarDecl(d) => (DeclKind::Param, d),
        Clang::TypedefDecl(d) => (DeclKind::Typedef, d),
        Clang::TypeAliasDecl(d) => (DeclKind::TypeAlias, d),
        Clang::TemplateTypeParmDecl(d) => (DeclKind::TemplateTypeParam, d),
        Clang::NonTypeTemplateParmDecl(d) => (DeclKind::NonTypeTemplateParam, d),
        Clang::TemplateTemplateParmDecl(d) => (DeclKind::TemplateTemplateParam, d),
        _ => return None,
    };
    Some(pair)
}

fn tag_kind(data: &DeclData) -> TagKind {
    match data.tag_used.as_deref() {
        Some("class") => TagKind::Class,
        Some("union") => TagKind::Union,
        _ => TagKind::Struct,
    }
}

fn is_template_pattern(kind: &Clang) -> bool {
    matches!(
        kind,
        Clang::CXXRecordDecl(_)
            | Clang::FunctionDecl(_)
            | Clang::CXXMethodDecl(_)
            | Clang::ClassTemplateSpecializationDecl(_)
    )
}

/// Prefers the spelling location: declarations written inside macro bodies
/// should point at the text the user wrote.
fn spelled(loc: &SourceLocation) -> Option<&BareSourceLocation> {
    loc.spelling_loc.as_ref().or(loc.expansion_loc.as_ref()).filter(|bare| !bare.file.is_empty())
}

fn find_word(
    text: &str,
    word: &str,
    window: TextRange,
) -> Option<TextRange> {
    let slice = text.get(window.as_usize())?;
    let bytes = slice.as_bytes();
    slice.match_indices(word).map(|(idx, _)| idx).find_map(|idx| {
        let before_ok = idx == 0 || !is_ident_byte(bytes[idx - 1]);
        let after = idx + word.len();
        let after_ok = after >= bytes.len() || !is_ident_byte(bytes[after]);
        (before_ok && after_ok)
            .then(|| TextRange::new(window.start + idx as u32, window.start + after as u32))
    })
}

fn is_ident_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

fn paths_equivalent(
    a: &Path,
    b: &Path,
) -> bool {
    if a == b {
        return true;
    }
    matches!((a.canonicalize(), b.canonicalize()), (Ok(ca), Ok(cb)) if ca == cb)
}
