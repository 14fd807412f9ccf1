//! Token-level heuristics that work without a semantic tree.

pub mod lexer;
pub mod namespaces;
pub mod word;

pub use lexer::{Lexer, TokenKind};
pub use namespaces::{NamespaceEvent, ancestor_namespaces, parse_namespace_events, visible_namespaces};
pub use word::{SpelledWord, is_likely_identifier};
