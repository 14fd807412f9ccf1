use super::decl::DeclId;

/// Structural type model for type navigation and hierarchy queries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Builtin(String),
    /// A tag, typedef or template parameter type naming a declaration.
    Decl(DeclId),
    /// `Template<args>`. `resolved` is the specialization when one exists;
    /// `None` means the specialization is dependent.
    Specialization {
        template: DeclId,
        resolved: Option<DeclId>,
    },
    Pointer(Box<TypeRef>),
    Reference(Box<TypeRef>),
    Array(Box<TypeRef>),
    Function {
        ret: Box<TypeRef>,
        params: Vec<TypeRef>,
    },
    /// `auto` or `decltype(...)`, with the deduced type when known.
    Deduced(Option<Box<TypeRef>>),
}

impl TypeRef {
    pub fn builtin(name: impl Into<String>) -> Self {
        TypeRef::Builtin(name.into())
    }

    pub fn pointer_to(ty: TypeRef) -> Self {
        TypeRef::Pointer(Box::new(ty))
    }

    pub fn reference_to(ty: TypeRef) -> Self {
        TypeRef::Reference(Box::new(ty))
    }

    pub fn function(
        ret: TypeRef,
        params: Vec<TypeRef>,
    ) -> Self {
        TypeRef::Function {
            ret: Box::new(ret),
            params,
        }
    }

    pub fn deduced(ty: TypeRef) -> Self {
        TypeRef::Deduced(Some(Box::new(ty)))
    }

    /// Strips deduction sugar.
    pub fn strip_deduced(&self) -> Option<&TypeRef> {
        match self {
            TypeRef::Deduced(Some(inner)) => inner.strip_deduced(),
            TypeRef::Deduced(None) => None,
            other => Some(other),
        }
    }

    pub fn is_dependent_specialization(&self) -> bool {
        matches!(
            self,
            TypeRef::Specialization {
                resolved: None,
                ..
            }
        )
    }
}
