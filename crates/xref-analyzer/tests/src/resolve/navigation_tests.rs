    use super::*;
    use crate::index::{MemIndex, SymbolKind};
    use crate::resolve::fixtures::{HEADER_URI, add_relation, at, builder, index_loc, index_symbol, pos, range, span};
    use crate::semantic::{Decl, DeclFlags, DeclId, SymbolRoles, TagKind};

    fn struct_kind() -> DeclKind {
        DeclKind::Record(TagKind::Struct)
    }

    fn names(results: &[LocatedSymbol]) -> Vec<&str> {
        results.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn implementations_of_a_class_are_its_subclasses() {
        let src = "struct Base { virtual void run(); void stop(); };\n";
        let mut b = builder(src);
        let base = b.add_decl(
            Decl::new(struct_kind(), "Base", at(&b, "Base", 0))
                .with_usr("c:@S@Base")
                .with_range(span(&b, "struct", 0, "}"))
                .defined(),
        );
        let run = b.add_decl(
            Decl::new(DeclKind::Method, "run", at(&b, "run", 0))
                .with_context(base)
                .with_usr("c:@S@Base@F@run#")
                .with_flags(DeclFlags::VIRTUAL),
        );
        let stop = b.add_decl(Decl::new(DeclKind::Method, "stop", at(&b, "stop", 0)).with_context(base));
        let base_node = b.add_decl_node(None, base);
        b.add_decl_node(Some(base_node), run);
        b.add_decl_node(Some(base_node), stop);
        let ast = b.build();

        let index = MemIndex::new();
        let derived = index_symbol("c:@S@Derived", SymbolKind::Struct, "Derived", "", index_loc(HEADER_URI, 2, 7, 14));
        index.insert_symbol(derived);
        index.insert_symbol(index_symbol(
            "c:@S@Derived@F@run#",
            SymbolKind::InstanceMethod,
            "run",
            "Derived::",
            index_loc(HEADER_URI, 3, 7, 10),
        ));
        add_relation(&index, "c:@S@Base", RelationKind::BaseOf, "c:@S@Derived");
        add_relation(&index, "c:@S@Base@F@run#", RelationKind::OverriddenBy, "c:@S@Derived@F@run#");

        let subclasses = find_implementations(&ast, pos(&ast, "Base", 0), Some(&index));
        assert_eq!(names(&subclasses), vec!["Derived"]);
        let overrides = find_implementations(&ast, pos(&ast, "run", 0), Some(&index));
        assert_eq!(overrides[0].id, Some(SymbolId::from_usr("c:@S@Derived@F@run#")));

        // Non-virtual methods have no implementations; nothing works without an index.
        assert!(find_implementations(&ast, pos(&ast, "stop", 0), Some(&index)).is_empty());
        assert!(find_implementations(&ast, pos(&ast, "Base", 0), None).is_empty());
    }

    #[test]
    fn type_of_a_pointer_to_an_alias_is_the_alias() {
        let src = "struct Foo {};\ntypedef Foo Alias;\nAlias* p;\n";
        let mut b = builder(src);
        let foo = b.add_decl(Decl::new(struct_kind(), "Foo", at(&b, "Foo", 0)).defined());
        let alias = b.add_decl(
            Decl::new(DeclKind::Typedef, "Alias", at(&b, "Alias", 0)).with_underlying(TypeRef::Decl(foo)),
        );
        let p = b.add_decl(
            Decl::new(DeclKind::Var, "p", at(&b, "p;", 0)).with_type(TypeRef::pointer_to(TypeRef::Decl(alias))),
        );
        b.add_decl_node(None, p);
        let ast = b.build();

        let results = find_type(&ast, pos(&ast, "p;", 0), None);
        assert_eq!(names(&results), vec!["Alias"]);
        assert_eq!(results[0].preferred_declaration.range.start, IdePosition::new(1, 12));
    }

    #[test]
    fn type_of_a_smart_pointer_lists_pointee_then_wrapper() {
        let src = "template <class T> struct Ptr { T* operator->(); };\nstruct Foo {};\nPtr<Foo> p;\n";
        let mut b = builder(src);
        let template = b.add_decl(Decl::new(DeclKind::ClassTemplate, "Ptr", at(&b, "Ptr", 0)));
        let pattern = b.add_decl(Decl::new(struct_kind(), "Ptr", at(&b, "Ptr", 0)).defined());
        b.set_template(template, pattern);
        let foo = b.add_decl(Decl::new(struct_kind(), "Foo", at(&b, "Foo", 0)).defined());
        let specialization = b.add_decl(
            Decl::new(DeclKind::ClassTemplateSpecialization, "Ptr", at(&b, "Ptr", 0))
                .with_flags(DeclFlags::IMPLICIT_INSTANTIATION)
                .defined(),
        );
        b.set_specialization(specialization, template);
        b.add_decl(
            Decl::new(DeclKind::Method, "operator->", at(&b, "operator->", 0))
                .with_context(specialization)
                .with_type(TypeRef::function(TypeRef::pointer_to(TypeRef::Decl(foo)), Vec::new())),
        );
        let ty = TypeRef::Specialization {
            template,
            resolved: Some(specialization),
        };
        let p = b.add_decl(Decl::new(DeclKind::Var, "p", at(&b, "p;", 0)).with_type(ty.clone()));
        b.add_decl_node(None, p);
        let ast = b.build();

        let mut unwrapped = Vec::new();
        unwrap_find_type(&ast, &ty, &mut unwrapped);
        assert_eq!(unwrapped, vec![TypeRef::Decl(foo), ty]);

        let results = find_type(&ast, pos(&ast, "p;", 0), None);
        assert_eq!(names(&results), vec!["Foo", "Ptr"]);
    }

    fn call_fixture() -> (ParsedAst, DeclId) {
        let src = "struct Foo {};\nFoo make();\nint main() { make(); }\n";
        let mut b = builder(src);
        let foo = b.add_decl(Decl::new(struct_kind(), "Foo", at(&b, "Foo", 0)).defined());
        let make = b.add_decl(
            Decl::new(DeclKind::Function, "make", at(&b, "make", 0))
                .with_type(TypeRef::function(TypeRef::Decl(foo), Vec::new())),
        );
        let call = range(&b, "make", 1);
        b.add_node(
            None,
            NodeKind::DeclRef {
                target: make,
                using: None,
                roles: SymbolRoles::CALL,
            },
            call,
            call,
        );
        (b.build(), foo)
    }

    #[test]
    fn type_of_a_call_is_its_return_type() {
        let (ast, _) = call_fixture();
        let results = find_type(&ast, pos(&ast, "make", 1), None);
        assert_eq!(names(&results), vec!["Foo"]);
        assert!(find_type(&ast, pos(&ast, "int", 0), None).is_empty());
    }

    #[test]
    fn typedef_written_as_a_type_unwraps_to_its_target() {
        let src = "struct Foo {};\nusing Alias = Foo;\nAlias a;\n";
        let mut b = builder(src);
        let foo = b.add_decl(Decl::new(struct_kind(), "Foo", at(&b, "Foo", 0)).defined());
        let alias = b.add_decl(
            Decl::new(DeclKind::TypeAlias, "Alias", at(&b, "Alias", 0)).with_underlying(TypeRef::Decl(foo)),
        );
        let written = range(&b, "Alias", 1);
        b.add_node(
            None,
            NodeKind::TypeLoc {
                ty: TypeRef::Decl(alias),
            },
            written,
            written,
        );
        let ast = b.build();

        assert_eq!(names(&find_type(&ast, pos(&ast, "Alias", 1), None)), vec!["Foo"]);
    }

    #[test]
    fn split_qualified_names() {
        assert_eq!(split_qualified_name("a::b::c"), ("a::b::", "c"));
        assert_eq!(split_qualified_name("plain"), ("", "plain"));
        assert_eq!(split_qualified_name("::top"), ("::", "top"));
    }

    #[test]
    fn symbol_info_reports_scope_and_usr() {
        let src = "namespace ns { struct Foo {}; }\nvoid f() { int local; }\n";
        let mut b = builder(src);
        let ns = b.add_decl(
            Decl::new(DeclKind::Namespace, "ns", at(&b, "ns", 0)).with_range(span(&b, "namespace", 0, "; }")),
        );
        let foo = b.add_decl(
            Decl::new(struct_kind(), "Foo", at(&b, "Foo", 0))
                .with_context(ns)
                .with_usr("c:@N@ns@S@Foo")
                .defined(),
        );
        let f = b.add_decl(
            Decl::new(DeclKind::Function, "f", at(&b, "f", 0))
                .with_range(span(&b, "void", 0, "}"))
                .defined(),
        );
        let local = b.add_decl(Decl::new(DeclKind::Var, "local", at(&b, "local", 0)).with_context(f));
        let ns_node = b.add_decl_node(None, ns);
        b.add_decl_node(Some(ns_node), foo);
        let f_node = b.add_decl_node(None, f);
        b.add_decl_node(Some(f_node), local);
        let ast = b.build();

        let details = symbol_info(&ast, pos(&ast, "Foo", 0));
        assert_eq!(details.len(), 1);
        assert_eq!(details[0].name, "Foo");
        assert_eq!(details[0].container_name, "ns::");
        assert_eq!(details[0].usr.as_deref(), Some("c:@N@ns@S@Foo"));
        assert_eq!(details[0].id, Some(SymbolId::from_usr("c:@N@ns@S@Foo")));
        assert_eq!(details[0].declaration_range, details[0].definition_range);

        let details = symbol_info(&ast, pos(&ast, "local", 0));
        assert_eq!(details[0].container_name, "f::");

        let details = symbol_info(&ast, pos(&ast, "f()", 0));
        assert_eq!(details[0].container_name, "");
    }

    #[test]
    fn symbol_info_reports_macros() {
        let mut b = builder("#define M 1\nint x = M;\n");
        let m = b.define_macro("M", at(&b, "M", 0));
        let use_range = range(&b, "M", 1);
        b.expand_macro(m, use_range);
        let ast = b.build();

        let details = symbol_info(&ast, pos(&ast, "M", 1));
        assert_eq!(details.len(), 1);
        assert_eq!(details[0].name, "M");
        assert_eq!(details[0].usr.as_deref(), Some("c:main.cpp@8@macro@M"));
        assert_eq!(details[0].container_name, "");
    }

    #[test]
    fn document_links_cover_resolved_includes() {
        let mut b = builder("#include \"lib.h\"\n#include <missing.h>\n");
        b.add_file("/xref/lib.h", Some("int y;\n"));
        let ast = b.build();

        let links = document_links(&ast);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].target, PathBuf::from("/xref/lib.h"));
        assert_eq!(links[0].range, IdeRange::new(IdePosition::new(0, 9), IdePosition::new(0, 16)));
    }
