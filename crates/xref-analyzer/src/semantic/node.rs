use super::decl::DeclId;
use super::source::TextRange;
use super::types::TypeRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);
}

bitflags::bitflags! {
    /// Roles an occurrence plays for the declaration it names.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
    pub struct SymbolRoles: u32 {
        const DECLARATION = 1 << 0;
        const DEFINITION = 1 << 1;
        const REFERENCE = 1 << 2;
        const READ = 1 << 3;
        const WRITE = 1 << 4;
        const CALL = 1 << 5;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttrKind {
    Override,
    Final,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StmtKind {
    Compound,
    For,
    ForRange {
        loop_var: Option<DeclId>,
    },
    While,
    Do,
    If,
    Switch,
    Case,
    Default,
    Break,
    Continue,
    Return,
    Throw,
    Goto {
        label: DeclId,
    },
    Label,
    Other,
}

impl StmtKind {
    pub fn is_loop(&self) -> bool {
        matches!(
            self,
            StmtKind::For
                | StmtKind::ForRange {
                    ..
                }
                | StmtKind::While
                | StmtKind::Do
        )
    }

    pub fn is_switch_case(&self) -> bool {
        matches!(self, StmtKind::Case | StmtKind::Default)
    }
}

/// Kind tag of one tree node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKind {
    TranslationUnit,
    Decl(DeclId),
    /// A name referring to `target`, possibly through a using-shadow.
    DeclRef {
        target: DeclId,
        using: Option<DeclId>,
        roles: SymbolRoles,
    },
    TypeLoc {
        ty: TypeRef,
    },
    NestedNameSpecifier {
        target: DeclId,
    },
    BaseSpecifier {
        ty: TypeRef,
    },
    CtorInitializer {
        member: Option<DeclId>,
        base: Option<TypeRef>,
    },
    Attr(AttrKind),
    ObjCMessage {
        method: DeclId,
        selector_locs: Vec<TextRange>,
    },
    /// A dependent name with heuristically resolved candidates.
    DependentName {
        candidates: Vec<DeclId>,
    },
    Expr {
        ty: Option<TypeRef>,
    },
    Stmt(StmtKind),
    Lambda,
}

/// A node of the main file's tree.
///
/// `range` covers the whole construct; `loc` is the token that names it
/// (the name of a declaration, or the keyword of a statement).
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub range: TextRange,
    pub loc: TextRange,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl Node {
    pub fn decl(&self) -> Option<DeclId> {
        match self.kind {
            NodeKind::Decl(id) => Some(id),
            _ => None,
        }
    }

    pub fn stmt(&self) -> Option<&StmtKind> {
        match &self.kind {
            NodeKind::Stmt(kind) => Some(kind),
            _ => None,
        }
    }

    pub fn is_attr(&self) -> bool {
        matches!(self.kind, NodeKind::Attr(_))
    }
}
