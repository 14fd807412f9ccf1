use lsp_types::{
    CallHierarchyIncomingCall, CallHierarchyItem, CallHierarchyOutgoingCall, DocumentHighlight,
    DocumentHighlightKind, DocumentLink, GotoDefinitionResponse, Location, Position, Range, SymbolKind, SymbolTag,
    TypeHierarchyItem, Uri,
};
use serde_json::Value;

use crate::ide::navigation::{IdeLocation, IdePosition, IdeRange};
use crate::index::SymbolKind as IndexSymbolKind;
use crate::resolve::{self, HighlightKind, LocatedSymbol, ReferencesResult, ResolveParams};
use crate::vfs::path_to_uri;

pub fn lsp_position_to_ide(position: Position) -> IdePosition {
    IdePosition::new(position.line, position.character)
}

pub fn ide_position_to_lsp(position: IdePosition) -> Position {
    Position::new(position.line, position.character)
}

pub fn lsp_range_to_ide(range: Range) -> IdeRange {
    IdeRange::new(lsp_position_to_ide(range.start), lsp_position_to_ide(range.end))
}

pub fn ide_range_to_lsp(range: IdeRange) -> Range {
    Range::new(ide_position_to_lsp(range.start), ide_position_to_lsp(range.end))
}

pub fn parse_uri(uri: &str) -> Option<Uri> {
    uri.parse().ok()
}

pub fn ide_location_to_lsp(location: &IdeLocation) -> Option<Location> {
    let uri = parse_uri(&path_to_uri(&location.file_path)?)?;
    Some(Location {
        uri,
        range: ide_range_to_lsp(location.range),
    })
}

/// Go-to-definition answer: each symbol's definition, or its declaration when none is known.
pub fn located_symbols_to_lsp(symbols: &[LocatedSymbol]) -> Option<GotoDefinitionResponse> {
    let mut locations: Vec<Location> = symbols
        .iter()
        .filter_map(|symbol| ide_location_to_lsp(symbol.definition.as_ref().unwrap_or(&symbol.preferred_declaration)))
        .collect();
    match locations.len() {
        0 => None,
        1 => locations.pop().map(GotoDefinitionResponse::Scalar),
        _ => Some(GotoDefinitionResponse::Array(locations)),
    }
}

pub fn references_to_lsp(result: &ReferencesResult) -> Vec<Location> {
    result.references.iter().filter_map(|reference| ide_location_to_lsp(&reference.location)).collect()
}

pub fn highlight_to_lsp(highlight: &resolve::DocumentHighlight) -> DocumentHighlight {
    let kind = match highlight.kind {
        HighlightKind::Text => DocumentHighlightKind::TEXT,
        HighlightKind::Read => DocumentHighlightKind::READ,
        HighlightKind::Write => DocumentHighlightKind::WRITE,
    };
    DocumentHighlight {
        range: ide_range_to_lsp(highlight.range),
        kind: Some(kind),
    }
}

pub fn document_link_to_lsp(link: &resolve::DocumentLink) -> DocumentLink {
    DocumentLink {
        range: ide_range_to_lsp(link.range),
        target: path_to_uri(&link.target).and_then(|uri| parse_uri(&uri)),
        tooltip: None,
        data: None,
    }
}

pub fn symbol_kind_to_lsp(kind: IndexSymbolKind) -> SymbolKind {
    match kind {
        IndexSymbolKind::Unknown => SymbolKind::VARIABLE,
        IndexSymbolKind::Module => SymbolKind::MODULE,
        IndexSymbolKind::Namespace | IndexSymbolKind::NamespaceAlias | IndexSymbolKind::Using => {
            SymbolKind::NAMESPACE
        },
        IndexSymbolKind::Macro => SymbolKind::STRING,
        IndexSymbolKind::Enum => SymbolKind::ENUM,
        IndexSymbolKind::Struct => SymbolKind::STRUCT,
        IndexSymbolKind::Class | IndexSymbolKind::Union | IndexSymbolKind::TypeAlias => SymbolKind::CLASS,
        IndexSymbolKind::Protocol | IndexSymbolKind::Extension | IndexSymbolKind::Concept => SymbolKind::INTERFACE,
        IndexSymbolKind::Function | IndexSymbolKind::ConversionFunction => SymbolKind::FUNCTION,
        IndexSymbolKind::Variable | IndexSymbolKind::Parameter => SymbolKind::VARIABLE,
        IndexSymbolKind::Field => SymbolKind::FIELD,
        IndexSymbolKind::EnumConstant => SymbolKind::ENUM_MEMBER,
        IndexSymbolKind::InstanceMethod
        | IndexSymbolKind::ClassMethod
        | IndexSymbolKind::StaticMethod
        | IndexSymbolKind::Destructor => SymbolKind::METHOD,
        IndexSymbolKind::InstanceProperty | IndexSymbolKind::ClassProperty | IndexSymbolKind::StaticProperty => {
            SymbolKind::PROPERTY
        },
        IndexSymbolKind::Constructor => SymbolKind::CONSTRUCTOR,
        IndexSymbolKind::TemplateTypeParm
        | IndexSymbolKind::TemplateTemplateParm
        | IndexSymbolKind::NonTypeTemplateParm => SymbolKind::TYPE_PARAMETER,
    }
}

fn tags(deprecated: bool) -> Option<Vec<SymbolTag>> {
    deprecated.then(|| vec![SymbolTag::DEPRECATED])
}

pub fn type_hierarchy_item_to_lsp(item: &resolve::TypeHierarchyItem) -> Option<TypeHierarchyItem> {
    Some(TypeHierarchyItem {
        name: item.name.clone(),
        kind: symbol_kind_to_lsp(item.kind),
        // `lsp-types` models a single tag on type hierarchy items.
        tags: item.deprecated.then_some(SymbolTag::DEPRECATED),
        detail: item.detail.clone(),
        uri: parse_uri(&item.uri)?,
        range: ide_range_to_lsp(item.range),
        selection_range: ide_range_to_lsp(item.selection_range),
        data: serde_json::to_value(&item.data).ok(),
    })
}

/// Rebuilds an item a client sent back. Kind and parents/children are not round-tripped.
pub fn lsp_type_hierarchy_item_to_ide(item: &TypeHierarchyItem) -> Option<resolve::TypeHierarchyItem> {
    let data: ResolveParams = serde_json::from_value(item.data.clone()?).ok()?;
    Some(resolve::TypeHierarchyItem {
        name: item.name.clone(),
        detail: item.detail.clone(),
        kind: IndexSymbolKind::Unknown,
        deprecated: item.tags == Some(SymbolTag::DEPRECATED),
        uri: item.uri.as_str().to_owned(),
        range: lsp_range_to_ide(item.range),
        selection_range: lsp_range_to_ide(item.selection_range),
        parents: None,
        children: None,
        data,
    })
}

pub fn call_hierarchy_item_to_lsp(item: &resolve::CallHierarchyItem) -> Option<CallHierarchyItem> {
    Some(CallHierarchyItem {
        name: item.name.clone(),
        kind: symbol_kind_to_lsp(item.kind),
        tags: tags(!item.tags.is_empty()),
        detail: item.detail.clone(),
        uri: parse_uri(&item.uri)?,
        range: ide_range_to_lsp(item.range),
        selection_range: ide_range_to_lsp(item.selection_range),
        data: (!item.data.is_empty()).then(|| Value::String(item.data.clone())),
    })
}

pub fn lsp_call_hierarchy_item_to_ide(item: &CallHierarchyItem) -> resolve::CallHierarchyItem {
    let deprecated = item.tags.as_ref().is_some_and(|tags| tags.contains(&SymbolTag::DEPRECATED));
    resolve::CallHierarchyItem {
        name: item.name.clone(),
        detail: item.detail.clone(),
        kind: IndexSymbolKind::Unknown,
        tags: if deprecated {
            vec![resolve::SymbolTag::Deprecated]
        } else {
            Vec::new()
        },
        uri: item.uri.as_str().to_owned(),
        range: lsp_range_to_ide(item.range),
        selection_range: lsp_range_to_ide(item.selection_range),
        data: item.data.as_ref().and_then(Value::as_str).unwrap_or_default().to_owned(),
    }
}

pub fn incoming_call_to_lsp(call: &resolve::CallHierarchyIncomingCall) -> Option<CallHierarchyIncomingCall> {
    Some(CallHierarchyIncomingCall {
        from: call_hierarchy_item_to_lsp(&call.from)?,
        from_ranges: call.from_ranges.iter().copied().map(ide_range_to_lsp).collect(),
    })
}

pub fn outgoing_call_to_lsp(call: &resolve::CallHierarchyOutgoingCall) -> Option<CallHierarchyOutgoingCall> {
    Some(CallHierarchyOutgoingCall {
        to: call_hierarchy_item_to_lsp(&call.to)?,
        from_ranges: call.from_ranges.iter().copied().map(ide_range_to_lsp).collect(),
    })
}

#[cfg(test)]
#[path = "../../tests/src/ide/lsp_tests.rs"]
mod tests;
