use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

pub const MIN_RESOLVE_DEPTH: u32 = 0;
pub const MAX_RESOLVE_DEPTH: u32 = 16;

#[derive(Debug, Clone, PartialEq)]
pub struct HierarchySettings {
    /// Levels of subtypes resolved eagerly by a type hierarchy request.
    pub resolve_depth: u32,
}

impl Default for HierarchySettings {
    fn default() -> Self {
        Self {
            resolve_depth: 1,
        }
    }
}

impl HierarchySettings {
    pub(crate) fn apply_patch(
        &mut self,
        patch: HierarchySettingsPatch,
    ) {
        if let Some(v) = patch.resolve_depth {
            self.resolve_depth = v;
        }
    }

    pub(crate) fn normalize(&mut self) {
        self.resolve_depth = self.resolve_depth.clamp(MIN_RESOLVE_DEPTH, MAX_RESOLVE_DEPTH);
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct HierarchySettingsPatch {
    pub(crate) resolve_depth: Option<u32>,
    #[serde(flatten)]
    pub(crate) _extra: HashMap<String, Value>,
}
