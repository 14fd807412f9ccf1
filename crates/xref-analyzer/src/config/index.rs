use std::collections::{HashMap, HashSet};

use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct IndexSettings {
    pub enable: bool,
    /// Directories searched recursively for JSON index shards.
    pub shard_dirs: Vec<String>,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            enable: true,
            shard_dirs: Vec::new(),
        }
    }
}

impl IndexSettings {
    pub(crate) fn apply_patch(
        &mut self,
        patch: IndexSettingsPatch,
    ) {
        if let Some(v) = patch.enable {
            self.enable = v;
        }
        if let Some(v) = patch.shard_dirs {
            self.shard_dirs = v;
        }
    }

    pub(crate) fn normalize(&mut self) {
        let mut seen = HashSet::new();
        self.shard_dirs = self
            .shard_dirs
            .iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .filter(|p| seen.insert(p.clone()))
            .collect();
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct IndexSettingsPatch {
    pub(crate) enable: Option<bool>,
    pub(crate) shard_dirs: Option<Vec<String>>,
    #[serde(flatten)]
    pub(crate) _extra: HashMap<String, Value>,
}
