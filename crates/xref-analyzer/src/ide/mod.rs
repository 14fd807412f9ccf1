//! Editor-facing positions and locations, and their `lsp-types` forms.

pub mod lsp;
pub mod navigation;

pub use navigation::{IdeLocation, IdePosition, IdeRange};
