//! Query-independent quality and query-dependent relevance of index symbols.

use super::symbol::{Symbol, SymbolFlags, SymbolKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SymbolCategory {
    #[default]
    Unknown,
    Variable,
    Macro,
    Type,
    Function,
    Constructor,
    Destructor,
    Namespace,
    Keyword,
    Operator,
}

impl SymbolCategory {
    pub fn of(symbol: &Symbol) -> Self {
        if symbol.name.starts_with("operator") {
            return SymbolCategory::Operator;
        }
        match symbol.kind {
            SymbolKind::Namespace | SymbolKind::NamespaceAlias => SymbolCategory::Namespace,
            SymbolKind::Macro => SymbolCategory::Macro,
            SymbolKind::Enum
            | SymbolKind::Struct
            | SymbolKind::Class
            | SymbolKind::Protocol
            | SymbolKind::Extension
            | SymbolKind::Union
            | SymbolKind::TypeAlias
            | SymbolKind::TemplateTypeParm
            | SymbolKind::TemplateTemplateParm
            | SymbolKind::Concept => SymbolCategory::Type,
            SymbolKind::Function
            | SymbolKind::ClassMethod
            | SymbolKind::InstanceMethod
            | SymbolKind::StaticMethod
            | SymbolKind::ConversionFunction => SymbolCategory::Function,
            SymbolKind::Constructor => SymbolCategory::Constructor,
            SymbolKind::Destructor => SymbolCategory::Destructor,
            SymbolKind::Variable
            | SymbolKind::Field
            | SymbolKind::EnumConstant
            | SymbolKind::InstanceProperty
            | SymbolKind::ClassProperty
            | SymbolKind::StaticProperty
            | SymbolKind::Parameter
            | SymbolKind::NonTypeTemplateParm => SymbolCategory::Variable,
            SymbolKind::Using | SymbolKind::Module | SymbolKind::Unknown => SymbolCategory::Unknown,
        }
    }
}

/// Signals that describe a symbol regardless of the query.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SymbolQualitySignals {
    pub references: u32,
    pub deprecated: bool,
    pub reserved_name: bool,
    pub implementation_detail: bool,
    pub category: SymbolCategory,
}

impl SymbolQualitySignals {
    pub fn merge(
        &mut self,
        symbol: &Symbol,
    ) {
        self.references = self.references.max(symbol.references);
        self.deprecated |= symbol.flags.contains(SymbolFlags::DEPRECATED);
        self.implementation_detail |= symbol.flags.contains(SymbolFlags::IMPLEMENTATION_DETAIL);
        self.reserved_name |= is_reserved_name(&symbol.name);
        self.category = SymbolCategory::of(symbol);
    }

    pub fn evaluate(&self) -> f32 {
        let mut score = 1.0_f32;
        // Flat for tail symbols, so zero references is not treated as a bad sign.
        if self.references >= 10 {
            let s = (self.references as f32).powf(-0.06);
            score *= 6.0 * (1.0 - s) / (1.0 + s) + 0.59;
        }
        if self.deprecated {
            score *= 0.1;
        }
        if self.reserved_name {
            score *= 0.1;
        }
        if self.implementation_detail {
            score *= 0.2;
        }
        score *= match self.category {
            SymbolCategory::Keyword => 4.0,
            SymbolCategory::Type | SymbolCategory::Function | SymbolCategory::Variable => 1.1,
            SymbolCategory::Namespace => 0.8,
            SymbolCategory::Macro
            | SymbolCategory::Destructor
            | SymbolCategory::Operator
            | SymbolCategory::Constructor => 0.5,
            SymbolCategory::Unknown => 1.0,
        };
        score
    }
}

/// `__x` and `_X` are reserved for the implementation.
pub fn is_reserved_name(name: &str) -> bool {
    let bytes = name.as_bytes();
    bytes.len() >= 2 && bytes[0] == b'_' && (bytes[1] == b'_' || bytes[1].is_ascii_uppercase())
}

/// Signals that depend on the query and the requesting file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SymbolRelevanceSignals {
    /// Fuzzy match score of the name, 1.0 for an exact match.
    pub name_match: f32,
    /// URI of the file the request was made from.
    pub proximity_uri: Option<String>,
    pub symbol_uri: Option<String>,
    /// The symbol is visible only in the file that declares it.
    pub file_scoped: bool,
}

impl SymbolRelevanceSignals {
    pub fn new(proximity_uri: Option<String>) -> Self {
        Self {
            name_match: 1.0,
            proximity_uri,
            symbol_uri: None,
            file_scoped: false,
        }
    }

    pub fn merge(
        &mut self,
        symbol: &Symbol,
    ) {
        self.symbol_uri = symbol.canonical_declaration.as_ref().map(|loc| loc.file_uri.clone());
        self.file_scoped = !symbol.flags.contains(SymbolFlags::VISIBLE_OUTSIDE_FILE);
    }

    pub fn evaluate(&self) -> f32 {
        let mut score = self.name_match;
        let same_file = match (&self.proximity_uri, &self.symbol_uri) {
            (Some(proximity), Some(symbol)) => proximity == symbol,
            _ => false,
        };
        let proximity = if same_file {
            1.0
        } else {
            0.0
        };
        // Proximity in [0, 1] becomes a multiplier in [1, 3].
        score *= 1.0 + 2.0 * proximity;
        if self.file_scoped && self.proximity_uri.is_some() && !same_file {
            score *= 0.5;
        }
        score
    }
}

pub fn evaluate_symbol_and_relevance(
    symbol_quality: f32,
    symbol_relevance: f32,
) -> f32 {
    symbol_quality * symbol_relevance
}

/// Combined score of `symbol` for a generic (non completion) query.
pub fn score_symbol(
    symbol: &Symbol,
    proximity_uri: Option<&str>,
) -> f32 {
    let mut quality = SymbolQualitySignals::default();
    quality.merge(symbol);
    let mut relevance = SymbolRelevanceSignals::new(proximity_uri.map(str::to_owned));
    relevance.merge(symbol);
    evaluate_symbol_and_relevance(quality.evaluate(), relevance.evaluate())
}

#[cfg(test)]
#[path = "../../tests/src/index/quality_tests.rs"]
mod tests;
