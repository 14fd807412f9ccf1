//! Programmatic construction of [`ParsedAst`] snapshots.
//!
//! The builder owns every arena while it is mutable. [`AstBuilder::build`]
//! computes the derived links (canonical redeclarations, definitions, members,
//! USRs), lexes the main file into a spelled-token buffer and freezes the result.

use std::path::PathBuf;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::syntax::lexer::{TokenKind, significant_tokens};

use super::ast::{Inclusion, ParsedAst};
use super::decl::{Decl, DeclId, DeclKind};
use super::macros::{MacroDef, MacroId, MacroTable};
use super::node::{Node, NodeId, NodeKind};
use super::source::{FileRange, SourceFileId, SourceMap, TextRange};
use super::tokens::{SpelledToken, TokenBuffer};

pub struct AstBuilder {
    sources: SourceMap,
    decls: Vec<Decl>,
    nodes: Vec<Node>,
    macros: MacroTable,
    include_targets: FxHashMap<String, SourceFileId>,
    skipped: Vec<TextRange>,
}

impl AstBuilder {
    pub fn new(
        main_path: impl Into<PathBuf>,
        main_text: &str,
    ) -> Self {
        let root = Node {
            kind: NodeKind::TranslationUnit,
            range: TextRange::new(0, main_text.len() as u32),
            loc: TextRange::empty(0),
            parent: None,
            children: Vec::new(),
        };
        Self {
            sources: SourceMap::new(main_path.into(), Arc::from(main_text)),
            decls: Vec::new(),
            nodes: vec![root],
            macros: MacroTable::default(),
            include_targets: FxHashMap::default(),
            skipped: Vec::new(),
        }
    }

    pub fn main_text(&self) -> &str {
        self.sources.main_text()
    }

    pub fn add_file(
        &mut self,
        path: impl Into<PathBuf>,
        text: Option<&str>,
    ) -> SourceFileId {
        self.sources.add(path.into(), text.map(Arc::from))
    }

    /// Range of the `nth` (zero-based) occurrence of `needle` in `file`.
    pub fn find_in(
        &self,
        file: SourceFileId,
        needle: &str,
        nth: usize,
    ) -> Option<FileRange> {
        let text = self.sources.text(file)?;
        let start = text.match_indices(needle).nth(nth)?.0 as u32;
        Some(FileRange::new(file, TextRange::new(start, start + needle.len() as u32)))
    }

    pub fn find_in_main(
        &self,
        needle: &str,
        nth: usize,
    ) -> Option<TextRange> {
        self.find_in(SourceFileId::MAIN, needle, nth).map(|range| range.range)
    }

    /// Main-file span from the `nth` occurrence of `from` to the end of the first `to` after it.
    pub fn span_in_main(
        &self,
        from: &str,
        nth: usize,
        to: &str,
    ) -> Option<TextRange> {
        let start = self.find_in_main(from, nth)?.start;
        let text = self.main_text();
        let rest = text.get(start as usize..)?;
        let end = start + (rest.find(to)? + to.len()) as u32;
        Some(TextRange::new(start, end))
    }

    pub fn add_decl(
        &mut self,
        decl: Decl,
    ) -> DeclId {
        self.decls.push(decl);
        DeclId((self.decls.len() - 1) as u32)
    }

    pub fn decl(
        &self,
        id: DeclId,
    ) -> &Decl {
        &self.decls[id.0 as usize]
    }

    pub fn decl_mut(
        &mut self,
        id: DeclId,
    ) -> &mut Decl {
        &mut self.decls[id.0 as usize]
    }

    /// Adds `decl` as a later redeclaration of `previous`.
    pub fn redeclare(
        &mut self,
        previous: DeclId,
        mut decl: Decl,
    ) -> DeclId {
        decl.previous = Some(previous);
        self.add_decl(decl)
    }

    pub fn set_override(
        &mut self,
        method: DeclId,
        base: DeclId,
    ) {
        self.decl_mut(method).overridden.push(base);
    }

    pub fn set_template(
        &mut self,
        template: DeclId,
        pattern: DeclId,
    ) {
        self.decl_mut(template).templated = Some(pattern);
        self.decl_mut(pattern).described_template = Some(template);
    }

    pub fn set_specialization(
        &mut self,
        specialization: DeclId,
        template: DeclId,
    ) {
        self.decl_mut(specialization).specialized_template = Some(template);
    }

    pub fn set_instantiated_from(
        &mut self,
        instantiation: DeclId,
        pattern: DeclId,
    ) {
        self.decl_mut(instantiation).instantiation_pattern = Some(pattern);
    }

    /// Links an Objective-C interface (or category) with its implementation.
    pub fn set_objc_impl(
        &mut self,
        container: DeclId,
        implementation: DeclId,
    ) {
        self.decl_mut(container).objc_impl = Some(implementation);
        match self.decls[implementation.0 as usize].kind {
            DeclKind::ObjCCategoryImpl => self.decl_mut(implementation).category_decl = Some(container),
            _ => self.decl_mut(implementation).class_interface = Some(container),
        }
    }

    pub fn set_class_interface(
        &mut self,
        decl: DeclId,
        interface: DeclId,
    ) {
        self.decl_mut(decl).class_interface = Some(interface);
    }

    pub fn add_shadow(
        &mut self,
        using: DeclId,
        shadow: DeclId,
    ) {
        self.decl_mut(using).shadows.push(shadow);
    }

    /// Adds a tree node. `parent: None` attaches it to the translation unit.
    pub fn add_node(
        &mut self,
        parent: Option<NodeId>,
        kind: NodeKind,
        range: TextRange,
        loc: TextRange,
    ) -> NodeId {
        let parent = parent.unwrap_or(NodeId::ROOT);
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind,
            range,
            loc,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0 as usize].children.push(id);
        id
    }

    /// Adds the declaring node of a main-file declaration.
    pub fn add_decl_node(
        &mut self,
        parent: Option<NodeId>,
        decl: DeclId,
    ) -> NodeId {
        let (range, loc) = {
            let decl = &self.decls[decl.0 as usize];
            (decl.range.range, decl.name_loc.range)
        };
        self.add_node(parent, NodeKind::Decl(decl), range, loc)
    }

    pub fn define_macro(
        &mut self,
        name: impl Into<String>,
        name_loc: FileRange,
    ) -> MacroId {
        self.macros.define(MacroDef {
            name: name.into(),
            name_loc,
        })
    }

    pub fn expand_macro(
        &mut self,
        macro_id: MacroId,
        range: TextRange,
    ) {
        self.macros.reference(macro_id, range);
    }

    pub fn resolve_include(
        &mut self,
        written: impl Into<String>,
        file: SourceFileId,
    ) {
        self.include_targets.insert(written.into(), file);
    }

    /// Marks a preprocessor-skipped region such as an `#if 0` block.
    pub fn skip_range(
        &mut self,
        range: TextRange,
    ) {
        self.skipped.push(range);
    }

    pub fn build(mut self) -> ParsedAst {
        self.link_redeclarations();
        self.link_members();
        self.assign_usrs();
        self.sort_children();
        self.macros.sort();

        let includes = self.scan_includes();
        let tokens = self.lex_main_file();
        let decl_nodes = self
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(idx, node)| node.decl().map(|decl| (decl, NodeId(idx as u32))))
            .collect::<FxHashMap<_, _>>();

        debug!(
            "[index] built snapshot for {}: {} decls, {} nodes, {} tokens, {} includes",
            self.sources.main_path().display(),
            self.decls.len(),
            self.nodes.len(),
            tokens.tokens().len(),
            includes.len(),
        );

        ParsedAst {
            sources: self.sources,
            decls: self.decls,
            nodes: self.nodes,
            tokens,
            macros: self.macros,
            includes,
            skipped: self.skipped,
            decl_nodes,
        }
    }

    fn link_redeclarations(&mut self) {
        for idx in 0..self.decls.len() {
            let mut root = DeclId(idx as u32);
            let mut steps = 0;
            while let Some(prev) = self.decls[root.0 as usize].previous {
                root = prev;
                steps += 1;
                if steps > self.decls.len() {
                    break;
                }
            }
            self.decls[idx].canonical = Some(root);
        }

        let mut definitions: FxHashMap<DeclId, DeclId> = FxHashMap::default();
        for (idx, decl) in self.decls.iter().enumerate() {
            if decl.is_this_definition()
                && let Some(canonical) = decl.canonical
            {
                definitions.entry(canonical).or_insert(DeclId(idx as u32));
            }
        }
        for decl in &mut self.decls {
            decl.definition = decl.canonical.and_then(|canonical| definitions.get(&canonical).copied());
        }
    }

    fn link_members(&mut self) {
        for idx in 0..self.decls.len() {
            if let Some(context) = self.decls[idx].context {
                self.decls[context.0 as usize].members.push(DeclId(idx as u32));
            }
        }
    }

    fn assign_usrs(&mut self) {
        for idx in 0..self.decls.len() {
            let canonical = self.decls[idx].canonical.unwrap_or(DeclId(idx as u32));
            if self.decls[idx].usr.is_some() {
                continue;
            }
            let usr = match self.decls[canonical.0 as usize].usr.clone() {
                Some(usr) => usr,
                None => self.default_usr(canonical),
            };
            self.decls[idx].usr = Some(usr);
        }
    }

    /// Deterministic clang-style USR built from the declaration context chain.
    fn default_usr(
        &self,
        id: DeclId,
    ) -> String {
        let decl = &self.decls[id.0 as usize];
        if decl.kind == DeclKind::UsingDirective {
            return String::new();
        }
        if let Some(template) = decl.described_template
            && template != id
        {
            return self.default_usr(self.decls[template.0 as usize].canonical.unwrap_or(template));
        }

        let mut chain = vec![id];
        let mut context = decl.context;
        while let Some(ctx) = context {
            if chain.contains(&ctx) {
                break;
            }
            chain.push(ctx);
            context = self.decls[ctx.0 as usize].context;
        }
        chain.reverse();

        let local = chain[..chain.len() - 1]
            .iter()
            .any(|ctx| self.decls[ctx.0 as usize].kind.is_function_like())
            || decl.kind == DeclKind::Param;
        let mut usr = if local {
            let file = self
                .sources
                .path(decl.name_loc.file)
                .and_then(|path| path.file_name())
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            format!("c:{}@{}", file, decl.name_loc.range.start)
        } else {
            "c:".to_owned()
        };

        for link in chain {
            let link_decl = &self.decls[link.0 as usize];
            let tag = usr_tag(link_decl.kind);
            usr.push('@');
            if !tag.is_empty() {
                usr.push_str(tag);
                usr.push('@');
            }
            usr.push_str(&link_decl.name);
            if link_decl.kind == DeclKind::ClassTemplateSpecialization {
                usr.push_str(&format!(">{}", link.0));
            }
            if link_decl.kind.is_function() || link_decl.kind == DeclKind::FunctionTemplate {
                usr.push('#');
                if let Some(super::types::TypeRef::Function {
                    params,
                    ..
                }) = &link_decl.ty
                {
                    usr.push_str(&params.len().to_string());
                }
            }
        }
        usr
    }

    fn sort_children(&mut self) {
        let ranges: Vec<TextRange> = self.nodes.iter().map(|node| node.range).collect();
        for node in &mut self.nodes {
            node.children.sort_by_key(|child| {
                let range = ranges[child.0 as usize];
                (range.start, std::cmp::Reverse(range.end))
            });
        }
    }

    fn scan_includes(&self) -> Vec<Inclusion> {
        let text = self.sources.main_text();
        let mut includes = Vec::new();
        let mut line_start = 0usize;
        for (line_no, line) in text.split('\n').enumerate() {
            if let Some(inclusion) = self.parse_include_line(line, line_start, line_no as u32) {
                includes.push(inclusion);
            }
            line_start += line.len() + 1;
        }
        includes
    }

    fn parse_include_line(
        &self,
        line: &str,
        line_start: usize,
        line_no: u32,
    ) -> Option<Inclusion> {
        let mut tokens = significant_tokens(line);
        let (hash, _) = tokens.next()?;
        if hash != TokenKind::Hash {
            return None;
        }
        let (directive, directive_span) = tokens.next()?;
        if directive != TokenKind::Identifier
            || !matches!(&line[directive_span], "include" | "import" | "include_next")
        {
            return None;
        }
        let (kind, span) = tokens.next()?;
        let range = match kind {
            TokenKind::StringLiteral => span,
            TokenKind::Less => {
                let close = line[span.start..].find('>')? + span.start;
                span.start..close + 1
            },
            _ => return None,
        };
        let written = line.get(range.start + 1..range.end - 1)?.to_owned();
        let resolved = self.include_targets.get(&written).copied().or_else(|| self.guess_include(&written));
        Some(Inclusion {
            line: line_no,
            written,
            written_range: TextRange::new((line_start + range.start) as u32, (line_start + range.end) as u32),
            resolved,
        })
    }

    fn guess_include(
        &self,
        written: &str,
    ) -> Option<SourceFileId> {
        (1..self.sources.len() as u32)
            .map(SourceFileId)
            .find(|&id| self.sources.path(id).is_some_and(|path| path.ends_with(written)))
    }

    fn lex_main_file(&self) -> TokenBuffer {
        let text = self.sources.main_text();
        let directives = directive_ranges(text);
        let tokens = significant_tokens(text)
            .map(|(kind, span)| {
                let range = TextRange::new(span.start as u32, span.end as u32);
                let in_directive = directives.iter().any(|dir| dir.start <= range.start && range.start < dir.end);
                let skipped = self.skipped.iter().any(|skip| skip.start <= range.start && range.start < skip.end);
                let starts_expansion = self.macros.is_expansion_start(range);
                SpelledToken {
                    kind,
                    range,
                    expanded: !(in_directive || skipped || starts_expansion),
                    starts_expansion,
                }
            })
            .collect();
        TokenBuffer::new(tokens)
    }
}

fn usr_tag(kind: DeclKind) -> &'static str {
    match kind {
        DeclKind::Namespace | DeclKind::NamespaceAlias => "N",
        DeclKind::Record(_) | DeclKind::ClassTemplatePartialSpecialization => "S",
        DeclKind::ClassTemplate => "ST",
        DeclKind::ClassTemplateSpecialization => "SP",
        DeclKind::Enum => "E",
        DeclKind::EnumConstant => "EC",
        DeclKind::FunctionTemplate => "FT",
        DeclKind::Function
        | DeclKind::Method
        | DeclKind::Constructor
        | DeclKind::Destructor
        | DeclKind::ConversionFunction => "F",
        DeclKind::Field => "FI",
        DeclKind::Typedef | DeclKind::TypeAlias => "T",
        DeclKind::TemplateTypeParam | DeclKind::NonTypeTemplateParam | DeclKind::TemplateTemplateParam => "TP",
        DeclKind::Using | DeclKind::UsingShadow => "UD",
        DeclKind::Label => "L",
        DeclKind::ObjCInterface | DeclKind::ObjCImplementation => "objc(cs)",
        DeclKind::ObjCProtocol => "objc(pl)",
        DeclKind::ObjCCategory | DeclKind::ObjCCategoryImpl => "objc(cy)",
        DeclKind::ObjCMethod => "objc(im)",
        DeclKind::ObjCProperty => "objc(py)",
        DeclKind::Var | DeclKind::Param | DeclKind::UsingDirective => "",
    }
}

/// Byte ranges of preprocessor directive lines, following backslash continuations.
fn directive_ranges(text: &str) -> Vec<TextRange> {
    let mut ranges = Vec::new();
    let mut offset = 0usize;
    let mut current: Option<usize> = None;
    for line in text.split('\n') {
        let line_end = offset + line.len();
        if current.is_none() && line.trim_start().starts_with('#') {
            current = Some(offset);
        }
        if let Some(start) = current
            && !line.trim_end().ends_with('\\')
        {
            ranges.push(TextRange::new(start as u32, line_end as u32));
            current = None;
        }
        offset = line_end + 1;
    }
    if let Some(start) = current {
        ranges.push(TextRange::new(start as u32, text.len() as u32));
    }
    ranges
}

#[cfg(test)]
#[path = "../../tests/src/semantic/builder_tests.rs"]
mod tests;
