use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

pub const MIN_REFERENCES_LIMIT: usize = 0;
pub const MAX_REFERENCES_LIMIT: usize = 100_000;

#[derive(Debug, Clone, PartialEq)]
pub struct ReferencesSettings {
    /// Maximum references per request; `0` means unlimited.
    pub limit: usize,
    /// Attach the containing symbol's name to each reference.
    pub include_context: bool,
}

impl Default for ReferencesSettings {
    fn default() -> Self {
        Self {
            limit: 1000,
            include_context: false,
        }
    }
}

impl ReferencesSettings {
    pub(crate) fn apply_patch(
        &mut self,
        patch: ReferencesSettingsPatch,
    ) {
        if let Some(v) = patch.limit {
            self.limit = v;
        }
        if let Some(v) = patch.include_context {
            self.include_context = v;
        }
    }

    pub(crate) fn normalize(&mut self) {
        self.limit = self.limit.clamp(MIN_REFERENCES_LIMIT, MAX_REFERENCES_LIMIT);
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct ReferencesSettingsPatch {
    pub(crate) limit: Option<usize>,
    pub(crate) include_context: Option<bool>,
    #[serde(flatten)]
    pub(crate) _extra: HashMap<String, Value>,
}
