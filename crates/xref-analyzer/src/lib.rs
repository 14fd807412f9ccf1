pub mod config;
pub mod ide;
pub mod index;
pub mod resolve;
pub mod semantic;
pub mod syntax;
pub mod text_pos;
pub mod vfs;

pub use config::AnalyzerSettings;
pub use index::{MemIndex, SymbolIndex};
pub use resolve::XrefProvider;
pub use semantic::{AstBuilder, ParsedAst};
