//! Declarative configuration system inspired by rust-analyzer.
//!
//! Settings are split into one file per category. [`AnalyzerSettings`]
//! aggregates all categories and merges JSON payloads or TOML files into
//! the defaults.

pub(crate) mod fallback;
pub(crate) mod hierarchy;
pub(crate) mod index;
pub(crate) mod logging;
pub(crate) mod references;

use std::collections::HashMap;
use std::path::Path;

use fallback::FallbackSettingsPatch;
pub use fallback::FallbackSettings;
use hierarchy::HierarchySettingsPatch;
pub use hierarchy::{HierarchySettings, MAX_RESOLVE_DEPTH, MIN_RESOLVE_DEPTH};
use index::IndexSettingsPatch;
pub use index::IndexSettings;
use logging::LoggingSettingsPatch;
pub use logging::{LogLevel, LoggingSettings};
use references::ReferencesSettingsPatch;
pub use references::{MAX_REFERENCES_LIMIT, MIN_REFERENCES_LIMIT, ReferencesSettings};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

pub const SETTINGS_SECTION_KEY: &str = "xref-analyzer";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnalyzerSettings {
    pub references: ReferencesSettings,
    pub hierarchy: HierarchySettings,
    pub fallback: FallbackSettings,
    pub index: IndexSettings,
    pub logging: LoggingSettings,
}

impl AnalyzerSettings {
    pub fn from_payload(payload: Option<&Value>) -> Self {
        let mut settings = Self::default();
        if let Some(payload) = payload {
            settings = settings.merged_with_payload(payload);
        }
        settings
    }

    /// Applies a payload on top of these settings. Unknown or mistyped keys are ignored.
    pub fn merged_with_payload(
        &self,
        payload: &Value,
    ) -> Self {
        let mut merged = self.clone();

        for candidate in payload_candidates(payload) {
            if let Ok(patch) = serde_json::from_value::<AnalyzerSettingsPatch>(candidate.clone()) {
                merged.apply_patch(patch);
            }
        }

        merged.normalize();
        merged
    }

    /// Loads settings from TOML text with the same keys as the JSON payload.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let payload: Value = toml::from_str(text)?;
        Ok(Self::default().merged_with_payload(&payload))
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    fn apply_patch(
        &mut self,
        patch: AnalyzerSettingsPatch,
    ) {
        if let Some(p) = patch.references {
            self.references.apply_patch(p);
        }
        if let Some(p) = patch.hierarchy {
            self.hierarchy.apply_patch(p);
        }
        if let Some(p) = patch.fallback {
            self.fallback.apply_patch(p);
        }
        if let Some(p) = patch.index {
            self.index.apply_patch(p);
        }
        if let Some(p) = patch.logging {
            self.logging.apply_patch(p);
        }
    }

    fn normalize(&mut self) {
        self.references.normalize();
        self.hierarchy.normalize();
        self.index.normalize();
        self.logging.normalize();
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct AnalyzerSettingsPatch {
    references: Option<ReferencesSettingsPatch>,
    hierarchy: Option<HierarchySettingsPatch>,
    fallback: Option<FallbackSettingsPatch>,
    index: Option<IndexSettingsPatch>,
    logging: Option<LoggingSettingsPatch>,
    #[serde(flatten)]
    _extra: HashMap<String, Value>,
}

fn payload_candidates(payload: &Value) -> Vec<Value> {
    let mut candidates = Vec::new();
    candidates.push(payload.clone());
    if let Some(scoped) = payload.get(SETTINGS_SECTION_KEY) {
        candidates.push(scoped.clone());
    }
    candidates
}

#[cfg(test)]
#[path = "../../tests/src/config/settings_tests.rs"]
mod tests;
