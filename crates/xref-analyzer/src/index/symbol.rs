use std::fmt;
use std::hash::Hasher;
use std::str::FromStr;

use rustc_hash::FxHasher;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::IndexError;

/// Fingerprint of a symbol's USR, shared by the live tree and the index.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct SymbolId([u8; 8]);

impl SymbolId {
    pub fn from_usr(usr: &str) -> Self {
        let mut hasher = FxHasher::default();
        hasher.write(usr.as_bytes());
        Self(hasher.finish().to_be_bytes())
    }

    pub const fn from_raw(raw: [u8; 8]) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> [u8; 8] {
        self.0
    }

    pub fn to_hex(&self) -> String {
        self.0.iter().map(|byte| format!("{byte:02X}")).collect()
    }
}

impl fmt::Display for SymbolId {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for SymbolId {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "SymbolId({})", self.to_hex())
    }
}

impl FromStr for SymbolId {
    type Err = IndexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 16 || !s.is_ascii() {
            return Err(IndexError::InvalidSymbolId(s.to_owned()));
        }
        let mut raw = [0u8; 8];
        for (idx, byte) in raw.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&s[idx * 2..idx * 2 + 2], 16)
                .map_err(|_| IndexError::InvalidSymbolId(s.to_owned()))?;
        }
        Ok(Self(raw))
    }
}

impl Serialize for SymbolId {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for SymbolId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SymbolKind {
    #[default]
    Unknown,
    Module,
    Namespace,
    NamespaceAlias,
    Macro,
    Enum,
    Struct,
    Class,
    Protocol,
    Extension,
    Union,
    TypeAlias,
    Function,
    Variable,
    Field,
    EnumConstant,
    InstanceMethod,
    ClassMethod,
    StaticMethod,
    InstanceProperty,
    ClassProperty,
    StaticProperty,
    Constructor,
    Destructor,
    ConversionFunction,
    Parameter,
    Using,
    TemplateTypeParm,
    TemplateTemplateParm,
    NonTypeTemplateParm,
    Concept,
}

impl SymbolKind {
    pub fn is_function_like(self) -> bool {
        matches!(
            self,
            SymbolKind::Function
                | SymbolKind::InstanceMethod
                | SymbolKind::ClassMethod
                | SymbolKind::StaticMethod
                | SymbolKind::Constructor
                | SymbolKind::Destructor
                | SymbolKind::ConversionFunction
        )
    }

    pub fn is_type(self) -> bool {
        matches!(
            self,
            SymbolKind::Enum
                | SymbolKind::Struct
                | SymbolKind::Class
                | SymbolKind::Protocol
                | SymbolKind::Extension
                | SymbolKind::Union
                | SymbolKind::TypeAlias
                | SymbolKind::TemplateTypeParm
                | SymbolKind::TemplateTemplateParm
                | SymbolKind::Concept
        )
    }
}

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct SymbolFlags: u8 {
        const INDEXED_FOR_CODE_COMPLETION = 1 << 0;
        const DEPRECATED = 1 << 1;
        /// Symbol is an implementation detail of a library.
        const IMPLEMENTATION_DETAIL = 1 << 2;
        const VISIBLE_OUTSIDE_FILE = 1 << 3;
        const HAS_DOC_COMMENT = 1 << 4;
    }
}

bitflags::bitflags! {
    /// Which index or view a symbol came from.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct SymbolOrigin: u16 {
        const AST = 1 << 0;
        const OPEN = 1 << 1;
        const STATIC = 1 << 2;
        const MERGE = 1 << 3;
        const IDENTIFIER = 1 << 4;
        const REMOTE = 1 << 5;
        const PREAMBLE = 1 << 6;
        const BACKGROUND = 1 << 8;
        const STD_LIB = 1 << 9;
    }
}

/// Zero-based line/column pair of an index location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct SymbolPosition {
    pub line: u32,
    pub column: u32,
}

impl SymbolPosition {
    pub const fn new(
        line: u32,
        column: u32,
    ) -> Self {
        Self {
            line,
            column,
        }
    }
}

/// A location as persisted in the index. An empty `file_uri` means "no location".
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolLocation {
    pub file_uri: String,
    pub start: SymbolPosition,
    pub end: SymbolPosition,
}

impl SymbolLocation {
    pub fn new(
        file_uri: impl Into<String>,
        start: SymbolPosition,
        end: SymbolPosition,
    ) -> Self {
        Self {
            file_uri: file_uri.into(),
            start,
            end,
        }
    }

    pub fn is_set(&self) -> bool {
        !self.file_uri.is_empty()
    }
}

impl fmt::Display for SymbolLocation {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(
            f,
            "{}[{}:{}-{}:{})",
            self.file_uri, self.start.line, self.start.column, self.end.line, self.end.column
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncludeHeader {
    pub header: String,
    pub references: u32,
}

/// The information about one symbol an index stores.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Symbol {
    pub id: SymbolId,
    pub kind: SymbolKind,
    pub name: String,
    /// Enclosing namespace or class, with a trailing `::`; empty for globals.
    pub scope: String,
    /// Written arguments of a template specialization, e.g. `<int>`; empty otherwise.
    pub template_specialization_args: String,
    pub definition: Option<SymbolLocation>,
    pub canonical_declaration: Option<SymbolLocation>,
    pub references: u32,
    pub origin: SymbolOrigin,
    pub signature: String,
    pub return_type: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub documentation: String,
    pub include_headers: Vec<IncludeHeader>,
    pub flags: SymbolFlags,
}

impl Symbol {
    pub fn new(
        id: SymbolId,
        kind: SymbolKind,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id,
            kind,
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn qualified_name(&self) -> String {
        format!("{}{}", self.scope, self.name)
    }

    pub fn is_deprecated(&self) -> bool {
        self.flags.contains(SymbolFlags::DEPRECATED)
    }
}
