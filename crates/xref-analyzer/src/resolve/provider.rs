//! Facade tying snapshots, the index and settings to the navigation queries.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, info};

use crate::config::AnalyzerSettings;
use crate::ide::navigation::IdePosition;
use crate::index::{SymbolIndex, load_shard_dirs};
use crate::semantic::{ImportError, ParsedAst, import_ast_file};
use crate::vfs::FileId;

use super::call_hierarchy::{
    CallHierarchyIncomingCall, CallHierarchyItem, CallHierarchyOutgoingCall, incoming_calls, outgoing_calls,
    prepare_call_hierarchy,
};
use super::highlights::{DocumentHighlight, find_document_highlights};
use super::locate::locate_symbol_at;
use super::located::LocatedSymbol;
use super::navigation::{DocumentLink, SymbolDetails, document_links, find_implementations, find_type, symbol_info};
use super::references::{ReferencesResult, find_references};
use super::type_hierarchy::{
    TypeHierarchyDirection, TypeHierarchyItem, resolve_type_hierarchy, sub_types, super_types, type_hierarchy,
};

/// Answers navigation queries against cached snapshots.
///
/// Snapshots are immutable and shared, so queries for different files or
/// the same file may run concurrently.
pub struct XrefProvider {
    snapshots: DashMap<FileId, Arc<ParsedAst>>,
    index: Option<Arc<dyn SymbolIndex>>,
    settings: AnalyzerSettings,
}

impl XrefProvider {
    pub fn new(
        settings: AnalyzerSettings,
        index: Option<Arc<dyn SymbolIndex>>,
    ) -> Self {
        Self {
            snapshots: DashMap::new(),
            index,
            settings,
        }
    }

    /// Builds a provider whose index is loaded from the configured shard directories.
    pub fn with_configured_index(settings: AnalyzerSettings) -> Self {
        let index: Option<Arc<dyn SymbolIndex>> = if settings.index.enable && !settings.index.shard_dirs.is_empty() {
            let dirs: Vec<PathBuf> = settings.index.shard_dirs.iter().map(PathBuf::from).collect();
            let loaded = load_shard_dirs(&dirs);
            info!("[index] loaded {} symbols from {} shard dirs", loaded.symbol_count(), dirs.len());
            Some(Arc::new(loaded))
        } else {
            None
        };
        Self::new(settings, index)
    }

    pub fn settings(&self) -> &AnalyzerSettings {
        &self.settings
    }

    fn index(&self) -> Option<&dyn SymbolIndex> {
        self.index.as_deref()
    }

    /// Caches `ast` as the current snapshot of its main file, replacing any older one.
    pub fn insert_snapshot(
        &self,
        ast: ParsedAst,
    ) -> Arc<ParsedAst> {
        let file_id = FileId::from_path(ast.main_path());
        let ast = Arc::new(ast);
        debug!("[index] caching snapshot for {}", file_id.path().display());
        self.snapshots.insert(file_id, Arc::clone(&ast));
        ast
    }

    pub fn snapshot(
        &self,
        path: &Path,
    ) -> Option<Arc<ParsedAst>> {
        self.snapshots.get(&FileId::from_path(path)).map(|entry| Arc::clone(entry.value()))
    }

    pub fn remove_snapshot(
        &self,
        path: &Path,
    ) {
        self.snapshots.remove(&FileId::from_path(path));
    }

    /// Imports a Clang JSON dump of `main_path` and caches the result.
    pub fn load_ast_dump(
        &self,
        dump_path: &Path,
        main_path: &Path,
    ) -> Result<Arc<ParsedAst>, ImportError> {
        let ast = import_ast_file(dump_path, main_path)?;
        Ok(self.insert_snapshot(ast))
    }

    pub fn locate(
        &self,
        ast: &ParsedAst,
        position: IdePosition,
    ) -> Vec<LocatedSymbol> {
        locate_symbol_at(ast, position, self.index(), &self.settings.fallback)
    }

    /// References with the configured limit and context setting.
    pub fn references(
        &self,
        ast: &ParsedAst,
        position: IdePosition,
    ) -> ReferencesResult {
        let settings = &self.settings.references;
        find_references(ast, position, settings.limit, settings.include_context, self.index())
    }

    pub fn references_with(
        &self,
        ast: &ParsedAst,
        position: IdePosition,
        limit: usize,
        include_context: bool,
    ) -> ReferencesResult {
        find_references(ast, position, limit, include_context, self.index())
    }

    pub fn implementations(
        &self,
        ast: &ParsedAst,
        position: IdePosition,
    ) -> Vec<LocatedSymbol> {
        find_implementations(ast, position, self.index())
    }

    pub fn type_definition(
        &self,
        ast: &ParsedAst,
        position: IdePosition,
    ) -> Vec<LocatedSymbol> {
        find_type(ast, position, self.index())
    }

    pub fn highlights(
        &self,
        ast: &ParsedAst,
        position: IdePosition,
    ) -> Vec<DocumentHighlight> {
        find_document_highlights(ast, position)
    }

    pub fn symbol_info(
        &self,
        ast: &ParsedAst,
        position: IdePosition,
    ) -> Vec<SymbolDetails> {
        symbol_info(ast, position)
    }

    pub fn document_links(
        &self,
        ast: &ParsedAst,
    ) -> Vec<DocumentLink> {
        document_links(ast)
    }

    /// Type hierarchy; `depth` falls back to the configured resolve depth.
    pub fn type_hierarchy(
        &self,
        ast: &ParsedAst,
        position: IdePosition,
        depth: Option<u32>,
        direction: TypeHierarchyDirection,
    ) -> Vec<TypeHierarchyItem> {
        let depth = depth.unwrap_or(self.settings.hierarchy.resolve_depth);
        type_hierarchy(ast, position, depth, direction, self.index())
    }

    pub fn resolve_type_hierarchy(
        &self,
        item: &mut TypeHierarchyItem,
        depth: u32,
        direction: TypeHierarchyDirection,
    ) {
        resolve_type_hierarchy(item, depth, direction, self.index());
    }

    pub fn super_types(
        &self,
        item: &TypeHierarchyItem,
    ) -> Option<Vec<TypeHierarchyItem>> {
        super_types(item, self.index()?)
    }

    pub fn sub_types(
        &self,
        item: &TypeHierarchyItem,
    ) -> Vec<TypeHierarchyItem> {
        self.index().map(|index| sub_types(item, index)).unwrap_or_default()
    }

    pub fn prepare_call_hierarchy(
        &self,
        ast: &ParsedAst,
        position: IdePosition,
    ) -> Vec<CallHierarchyItem> {
        prepare_call_hierarchy(ast, position)
    }

    pub fn incoming_calls(
        &self,
        item: &CallHierarchyItem,
    ) -> Vec<CallHierarchyIncomingCall> {
        incoming_calls(item, self.index())
    }

    pub fn outgoing_calls(
        &self,
        item: &CallHierarchyItem,
    ) -> Vec<CallHierarchyOutgoingCall> {
        outgoing_calls(item, self.index())
    }
}
