use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

/// Stages of the go-to-definition fallback chain that may run.
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackSettings {
    /// Retry with the same word spelled nearby in real code.
    pub nearby_identifier: bool,
    /// Search the index for the word under the cursor.
    pub textual_search: bool,
}

impl Default for FallbackSettings {
    fn default() -> Self {
        Self {
            nearby_identifier: true,
            textual_search: true,
        }
    }
}

impl FallbackSettings {
    pub(crate) fn apply_patch(
        &mut self,
        patch: FallbackSettingsPatch,
    ) {
        if let Some(v) = patch.nearby_identifier {
            self.nearby_identifier = v;
        }
        if let Some(v) = patch.textual_search {
            self.textual_search = v;
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct FallbackSettingsPatch {
    pub(crate) nearby_identifier: Option<bool>,
    pub(crate) textual_search: Option<bool>,
    #[serde(flatten)]
    pub(crate) _extra: HashMap<String, Value>,
}
