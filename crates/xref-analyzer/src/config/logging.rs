use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

/// Crate target every filter directive is scoped to.
const LOG_TARGET: &str = "xref_analyzer";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Level name understood by `tracing_subscriber::EnvFilter`.
    pub fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Where the CLI writes its `tracing` output. Query results always go to stdout.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LoggingSettings {
    pub level: LogLevel,
    /// Log file path; `None` uses a file in the temp directory.
    pub file: Option<String>,
    /// Mirror log lines to stderr.
    pub stderr: bool,
}

impl LoggingSettings {
    /// `EnvFilter` directive; `verbose` raises the level to at least debug.
    pub fn directive(
        &self,
        verbose: bool,
    ) -> String {
        let level = if verbose { self.level.max(LogLevel::Debug) } else { self.level };
        format!("{LOG_TARGET}={}", level.as_filter())
    }

    pub(crate) fn apply_patch(
        &mut self,
        patch: LoggingSettingsPatch,
    ) {
        self.level = patch.level.unwrap_or(self.level);
        self.stderr = patch.stderr.unwrap_or(self.stderr);
        if patch.file.is_some() {
            self.file = patch.file;
        }
    }

    pub(crate) fn normalize(&mut self) {
        if self.file.as_deref().is_some_and(|file| file.trim().is_empty()) {
            self.file = None;
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct LoggingSettingsPatch {
    pub(crate) level: Option<LogLevel>,
    pub(crate) file: Option<String>,
    pub(crate) stderr: Option<bool>,
    #[serde(flatten)]
    pub(crate) _extra: HashMap<String, Value>,
}
