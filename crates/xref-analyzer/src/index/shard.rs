//! JSON index shards on disk.
//!
//! A shard is one JSON document:
//! `{"symbols": [...], "refs": [{"id": "...", "refs": [...]}], "relations": [...]}`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::mem_index::MemIndex;
use super::refs::{Ref, Relation};
use super::symbol::{Symbol, SymbolId};
use super::Result;

const SHARD_EXTENSION: &str = "json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexShard {
    pub symbols: Vec<Symbol>,
    pub refs: Vec<ShardRefs>,
    pub relations: Vec<Relation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShardRefs {
    pub id: SymbolId,
    pub refs: Vec<Ref>,
}

impl IndexShard {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn read(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

/// Loads every `*.json` shard under `dirs` into one index.
///
/// A shard that cannot be read or decoded is skipped with a warning.
pub fn load_shard_dirs(dirs: &[PathBuf]) -> MemIndex {
    let index = MemIndex::new();
    let mut paths: Vec<PathBuf> = Vec::new();
    for dir in dirs {
        if !dir.exists() {
            warn!("[index] Shard directory does not exist: {}", dir.display());
            continue;
        }
        for entry in WalkDir::new(dir).follow_links(true).into_iter().filter_map(|e| e.ok()) {
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if !path.extension().is_some_and(|ext| ext == SHARD_EXTENSION) {
                continue;
            }
            paths.push(path.to_path_buf());
        }
    }
    // Merge order decides ties between records, so keep it stable.
    paths.sort();
    paths.dedup();

    let mut loaded = 0usize;
    for path in &paths {
        match IndexShard::read(path) {
            Ok(shard) => {
                debug!("[index] Loaded shard {}", path.display());
                index.add_shard(shard);
                loaded += 1;
            },
            Err(err) => warn!("[index] Skipping shard {}: {}", path.display(), err),
        }
    }
    info!("[index] Loaded {} of {} shards ({} symbols)", loaded, paths.len(), index.symbol_count());
    index
}

#[cfg(test)]
#[path = "../../tests/src/index/shard_tests.rs"]
mod tests;
