//! Immutable semantic snapshot of one main file.

mod ast;
mod builder;
pub mod clang_import;
mod decl;
mod macros;
mod node;
mod source;
mod tokens;
mod types;

pub use ast::{Inclusion, ParsedAst};
pub use builder::AstBuilder;
pub use clang_import::{ImportError, import_ast_file, import_ast_json};
pub use decl::{Decl, DeclFlags, DeclId, DeclKind, TagKind};
pub use macros::{MacroDef, MacroId, MacroOccurrence, MacroTable};
pub use node::{AttrKind, Node, NodeId, NodeKind, StmtKind, SymbolRoles};
pub use source::{FileRange, SourceFile, SourceFileId, SourceMap, TextRange};
pub use tokens::{SpelledToken, TokenBuffer};
pub use types::TypeRef;
