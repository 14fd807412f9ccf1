use super::source::FileRange;
use super::types::TypeRef;

/// Index of a declaration inside a snapshot arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagKind {
    Struct,
    Class,
    Union,
}

/// Closed set of declaration kinds the resolvers dispatch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclKind {
    Namespace,
    NamespaceAlias,
    UsingDirective,
    Using,
    UsingShadow,
    Record(TagKind),
    Enum,
    EnumConstant,
    ClassTemplate,
    ClassTemplateSpecialization,
    ClassTemplatePartialSpecialization,
    Function,
    FunctionTemplate,
    Method,
    Constructor,
    Destructor,
    ConversionFunction,
    Var,
    Field,
    Param,
    Typedef,
    TypeAlias,
    TemplateTypeParam,
    NonTypeTemplateParam,
    TemplateTemplateParam,
    Label,
    ObjCInterface,
    ObjCProtocol,
    ObjCCategory,
    ObjCImplementation,
    ObjCCategoryImpl,
    ObjCMethod,
    ObjCProperty,
}

impl DeclKind {
    pub fn is_record(self) -> bool {
        matches!(
            self,
            DeclKind::Record(_) | DeclKind::ClassTemplateSpecialization | DeclKind::ClassTemplatePartialSpecialization
        )
    }

    pub fn is_tag(self) -> bool {
        self.is_record() || self == DeclKind::Enum
    }

    pub fn is_cxx_method(self) -> bool {
        matches!(
            self,
            DeclKind::Method | DeclKind::Constructor | DeclKind::Destructor | DeclKind::ConversionFunction
        )
    }

    pub fn is_function(self) -> bool {
        self == DeclKind::Function || self.is_cxx_method()
    }

    /// Kinds that open a function body scope.
    pub fn is_function_like(self) -> bool {
        self.is_function() || self == DeclKind::ObjCMethod
    }

    pub fn is_var(self) -> bool {
        matches!(self, DeclKind::Var | DeclKind::Param)
    }

    pub fn is_value(self) -> bool {
        self.is_function()
            || matches!(self, DeclKind::Var | DeclKind::Param | DeclKind::Field | DeclKind::EnumConstant)
            || self == DeclKind::NonTypeTemplateParam
    }

    pub fn is_typedef_name(self) -> bool {
        matches!(self, DeclKind::Typedef | DeclKind::TypeAlias)
    }

    pub fn is_type(self) -> bool {
        self.is_tag() || self.is_typedef_name() || self == DeclKind::TemplateTypeParam
    }

    pub fn is_template(self) -> bool {
        matches!(
            self,
            DeclKind::ClassTemplate | DeclKind::FunctionTemplate | DeclKind::TemplateTemplateParam
        )
    }

    pub fn is_template_param(self) -> bool {
        matches!(
            self,
            DeclKind::TemplateTypeParam | DeclKind::NonTypeTemplateParam | DeclKind::TemplateTemplateParam
        )
    }

    pub fn is_objc_container(self) -> bool {
        matches!(
            self,
            DeclKind::ObjCInterface
                | DeclKind::ObjCProtocol
                | DeclKind::ObjCCategory
                | DeclKind::ObjCImplementation
                | DeclKind::ObjCCategoryImpl
        )
    }

    /// Declarations that own other declarations and can enclose references.
    pub fn is_decl_context(self) -> bool {
        self.is_function_like()
            || self.is_record()
            || self.is_objc_container()
            || matches!(self, DeclKind::Namespace | DeclKind::Enum)
    }
}

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DeclFlags: u32 {
        /// This redeclaration is the definition of its entity.
        const DEFINITION = 1 << 0;
        const VIRTUAL = 1 << 1;
        const PURE = 1 << 2;
        const IMPLICIT = 1 << 3;
        const INVALID = 1 << 4;
        const DEPRECATED = 1 << 5;
        const INSTANCE_METHOD = 1 << 6;
        const IMPLICIT_INSTANTIATION = 1 << 7;
        const EXPLICIT_SPECIALIZATION = 1 << 8;
        const ANONYMOUS = 1 << 9;
    }
}

/// One declaration in the arena.
///
/// Link fields refer to other arena entries. `canonical`, `definition` and
/// `members` are computed when the snapshot is built.
#[derive(Debug, Clone)]
pub struct Decl {
    pub kind: DeclKind,
    pub name: String,
    pub usr: Option<String>,
    pub context: Option<DeclId>,
    pub name_loc: FileRange,
    pub range: FileRange,
    pub flags: DeclFlags,
    /// Previous redeclaration of the same entity.
    pub previous: Option<DeclId>,
    pub canonical: Option<DeclId>,
    pub definition: Option<DeclId>,
    pub members: Vec<DeclId>,
    pub overridden: Vec<DeclId>,
    /// Pattern declared by a class or function template.
    pub templated: Option<DeclId>,
    /// Template that declares this pattern.
    pub described_template: Option<DeclId>,
    /// Primary template of a class template specialization.
    pub specialized_template: Option<DeclId>,
    /// Declaration this one was instantiated from.
    pub instantiation_pattern: Option<DeclId>,
    /// Interface of an Objective-C implementation or category.
    pub class_interface: Option<DeclId>,
    /// Implementation of an Objective-C interface or category.
    pub objc_impl: Option<DeclId>,
    /// Category declaration of an Objective-C category implementation.
    pub category_decl: Option<DeclId>,
    /// Using-shadows introduced by a using-declaration.
    pub shadows: Vec<DeclId>,
    /// Target of a using-shadow, using-directive or namespace alias.
    pub target: Option<DeclId>,
    pub underlying: Option<TypeRef>,
    pub ty: Option<TypeRef>,
    pub bases: Vec<TypeRef>,
    pub selector_locs: Vec<FileRange>,
}

impl Decl {
    pub fn new(
        kind: DeclKind,
        name: impl Into<String>,
        name_loc: FileRange,
    ) -> Self {
        Self {
            kind,
            name: name.into(),
            usr: None,
            context: None,
            name_loc,
            range: name_loc,
            flags: DeclFlags::empty(),
            previous: None,
            canonical: None,
            definition: None,
            members: Vec::new(),
            overridden: Vec::new(),
            templated: None,
            described_template: None,
            specialized_template: None,
            instantiation_pattern: None,
            class_interface: None,
            objc_impl: None,
            category_decl: None,
            shadows: Vec::new(),
            target: None,
            underlying: None,
            ty: None,
            bases: Vec::new(),
            selector_locs: Vec::new(),
        }
    }

    pub fn with_range(
        mut self,
        range: FileRange,
    ) -> Self {
        self.range = range;
        self
    }

    pub fn with_context(
        mut self,
        context: DeclId,
    ) -> Self {
        self.context = Some(context);
        self
    }

    pub fn with_flags(
        mut self,
        flags: DeclFlags,
    ) -> Self {
        self.flags |= flags;
        self
    }

    pub fn with_usr(
        mut self,
        usr: impl Into<String>,
    ) -> Self {
        self.usr = Some(usr.into());
        self
    }

    pub fn with_type(
        mut self,
        ty: TypeRef,
    ) -> Self {
        self.ty = Some(ty);
        self
    }

    pub fn with_underlying(
        mut self,
        ty: TypeRef,
    ) -> Self {
        self.underlying = Some(ty);
        self
    }

    pub fn with_bases(
        mut self,
        bases: Vec<TypeRef>,
    ) -> Self {
        self.bases = bases;
        self
    }

    pub fn with_target(
        mut self,
        target: DeclId,
    ) -> Self {
        self.target = Some(target);
        self
    }

    pub fn defined(self) -> Self {
        self.with_flags(DeclFlags::DEFINITION)
    }

    pub fn is_this_definition(&self) -> bool {
        self.flags.contains(DeclFlags::DEFINITION)
    }

    pub fn is_virtual(&self) -> bool {
        self.flags.intersects(DeclFlags::VIRTUAL | DeclFlags::PURE) || !self.overridden.is_empty()
    }

    pub fn is_pure(&self) -> bool {
        self.flags.contains(DeclFlags::PURE)
    }

    pub fn is_implicit(&self) -> bool {
        self.flags.contains(DeclFlags::IMPLICIT)
    }

    pub fn is_invalid(&self) -> bool {
        self.flags.contains(DeclFlags::INVALID)
    }

    pub fn is_deprecated(&self) -> bool {
        self.flags.contains(DeclFlags::DEPRECATED)
    }

    pub fn is_anonymous(&self) -> bool {
        self.name.is_empty() || self.flags.contains(DeclFlags::ANONYMOUS)
    }
}
