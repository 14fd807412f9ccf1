    use super::*;
    use crate::index::{MemIndex, SymbolKind};
    use crate::resolve::fixtures::{
        HEADER_URI, OTHER_URI, add_relation, at, builder, index_loc, index_symbol, pos, pos_after, range, span,
    };
    use crate::resolve::located::index_to_location;
    use crate::semantic::{Decl, DeclFlags, SymbolRoles, TagKind};

    fn locate(
        ast: &ParsedAst,
        position: IdePosition,
        index: Option<&dyn SymbolIndex>,
    ) -> Vec<LocatedSymbol> {
        locate_symbol_at(ast, position, index, &FallbackSettings::default())
    }

    fn struct_kind() -> DeclKind {
        DeclKind::Record(TagKind::Struct)
    }

    #[test]
    fn include_line_jumps_to_the_included_file() {
        let mut b = builder("#include \"lib.h\"\nint x;\n");
        b.add_file("/xref/lib.h", Some("int y;\n"));
        let ast = b.build();

        let results = locate(&ast, IdePosition::new(0, 3), None);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "lib.h");
        assert_eq!(results[0].preferred_declaration.file_path, std::path::PathBuf::from("/xref/lib.h"));
        assert_eq!(results[0].preferred_declaration.range, IdeRange::default());
        assert_eq!(results[0].definition, Some(results[0].preferred_declaration.clone()));
        assert!(results[0].id.is_none());
    }

    #[test]
    fn macro_use_jumps_to_its_definition() {
        let mut b = builder("#define LIMIT 10\nint x = LIMIT;\n");
        let limit = b.define_macro("LIMIT", at(&b, "LIMIT", 0));
        let use_range = range(&b, "LIMIT", 1);
        b.expand_macro(limit, use_range);
        let ast = b.build();

        let results = locate(&ast, pos_after(&ast, "LIMIT", 1, 2), None);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "LIMIT");
        assert_eq!(results[0].preferred_declaration.range.start, IdePosition::new(0, 8));
        assert!(results[0].id.is_some());
    }

    #[test]
    fn auto_jumps_to_the_deduced_type() {
        let mut b = builder("struct Foo {};\nauto f = Foo();\n");
        let foo = b.add_decl(Decl::new(struct_kind(), "Foo", at(&b, "Foo", 0)).defined());
        let auto_range = range(&b, "auto", 0);
        b.add_node(
            None,
            NodeKind::TypeLoc {
                ty: TypeRef::deduced(TypeRef::Decl(foo)),
            },
            auto_range,
            auto_range,
        );
        let ast = b.build();

        let results = locate(&ast, pos_after(&ast, "auto", 0, 1), None);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Foo");
        assert_eq!(results[0].preferred_declaration.range.start, IdePosition::new(0, 7));
    }

    #[test]
    fn type_lookup_strips_references() {
        let mut b = builder("struct Foo {};\n");
        let foo = b.add_decl(Decl::new(struct_kind(), "Foo", at(&b, "Foo", 0)).defined());
        let ast = b.build();

        let results = locate_symbol_for_type(&ast, &TypeRef::reference_to(TypeRef::Decl(foo)), None);
        assert_eq!(results.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(), vec!["Foo"]);
        assert!(locate_symbol_for_type(&ast, &TypeRef::builtin("int"), None).is_empty());
    }

    #[test]
    fn pure_virtual_name_also_lists_index_overrides() {
        let mut b = builder("struct Base { virtual void run() = 0; };\n");
        let base = b.add_decl(
            Decl::new(struct_kind(), "Base", at(&b, "Base", 0))
                .with_range(span(&b, "struct Base", 0, "}"))
                .defined(),
        );
        let run = b.add_decl(
            Decl::new(DeclKind::Method, "run", at(&b, "run", 0))
                .with_context(base)
                .with_range(span(&b, "virtual", 0, "0"))
                .with_flags(DeclFlags::VIRTUAL | DeclFlags::PURE)
                .with_usr("c:@S@Base@F@run#"),
        );
        let base_node = b.add_decl_node(None, base);
        b.add_decl_node(Some(base_node), run);
        let ast = b.build();

        let index = MemIndex::new();
        let mut derived = index_symbol(
            "c:@S@Derived@F@run#",
            SymbolKind::InstanceMethod,
            "run",
            "Derived::",
            index_loc(HEADER_URI, 3, 7, 10),
        );
        derived.definition = Some(index_loc(OTHER_URI, 5, 14, 17));
        index.insert_symbol(derived);
        add_relation(&index, "c:@S@Base@F@run#", RelationKind::OverriddenBy, "c:@S@Derived@F@run#");

        let results = locate(&ast, pos_after(&ast, "run", 0, 1), Some(&index));
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, Some(SymbolId::from_usr("c:@S@Base@F@run#")));
        assert_eq!(results[0].preferred_declaration.range.start, IdePosition::new(0, 27));
        assert_eq!(results[1].id, Some(SymbolId::from_usr("c:@S@Derived@F@run#")));
        assert_eq!(results[1].definition, index_to_location(&index_loc(OTHER_URI, 5, 14, 17)));

        // Without an index only the method itself is found.
        assert_eq!(locate(&ast, pos_after(&ast, "run", 0, 1), None).len(), 1);
    }

    fn override_fixture() -> ParsedAst {
        let src = "struct Base { virtual void run(); };\nstruct Derived : Base { void run() override; };\n";
        let mut b = builder(src);
        let base = b.add_decl(
            Decl::new(struct_kind(), "Base", at(&b, "Base", 0))
                .with_range(span(&b, "struct Base", 0, "}"))
                .defined(),
        );
        let base_run = b.add_decl(
            Decl::new(DeclKind::Method, "run", at(&b, "run", 0))
                .with_context(base)
                .with_range(span(&b, "virtual", 0, ")"))
                .with_flags(DeclFlags::VIRTUAL),
        );
        let derived = b.add_decl(
            Decl::new(struct_kind(), "Derived", at(&b, "Derived", 0))
                .with_range(span(&b, "struct Derived", 0, "}"))
                .with_bases(vec![TypeRef::Decl(base)])
                .defined(),
        );
        let derived_run = b.add_decl(
            Decl::new(DeclKind::Method, "run", at(&b, "run", 1))
                .with_context(derived)
                .with_range(span(&b, "void run", 1, "override"))
                .with_flags(DeclFlags::VIRTUAL),
        );
        b.set_override(derived_run, base_run);

        let base_node = b.add_decl_node(None, base);
        b.add_decl_node(Some(base_node), base_run);
        let derived_node = b.add_decl_node(None, derived);
        let method_node = b.add_decl_node(Some(derived_node), derived_run);
        let override_range = range(&b, "override", 0);
        b.add_node(Some(method_node), NodeKind::Attr(AttrKind::Override), override_range, override_range);
        b.build()
    }

    #[test]
    fn override_marker_jumps_to_the_overridden_method() {
        let ast = override_fixture();
        let results = locate(&ast, pos_after(&ast, "override", 0, 3), None);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "run");
        assert_eq!(results[0].preferred_declaration.range.start.line, 0);
    }

    #[test]
    fn override_name_jumps_to_itself() {
        let ast = override_fixture();
        let results = locate(&ast, pos_after(&ast, "run", 1, 1), None);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].preferred_declaration.range.start.line, 1);
    }

    #[test]
    fn objc_method_definition_also_lists_the_methods_it_overrides() {
        let src = "@interface Obj\n- (void)run;\n@end\n@implementation Obj\n- (void)run {}\n@end\n";
        let mut b = builder(src);
        let interface = b.add_decl(Decl::new(DeclKind::ObjCInterface, "Obj", at(&b, "Obj", 0)).defined());
        let declared = b.add_decl(
            Decl::new(DeclKind::ObjCMethod, "run", at(&b, "run", 0))
                .with_context(interface)
                .with_flags(DeclFlags::INSTANCE_METHOD),
        );
        let implementation = b.add_decl(
            Decl::new(DeclKind::ObjCImplementation, "Obj", at(&b, "Obj", 1))
                .with_range(span(&b, "@implementation", 0, "@end"))
                .defined(),
        );
        b.set_objc_impl(interface, implementation);
        let defined = b.add_decl(
            Decl::new(DeclKind::ObjCMethod, "run", at(&b, "run", 1))
                .with_context(implementation)
                .with_range(span(&b, "- (void)run", 1, "}"))
                .with_flags(DeclFlags::INSTANCE_METHOD)
                .defined(),
        );
        b.set_override(defined, declared);
        let impl_node = b.add_decl_node(None, implementation);
        b.add_decl_node(Some(impl_node), defined);
        let ast = b.build();

        let results = locate(&ast, pos_after(&ast, "run", 1, 1), None);
        assert_eq!(results.len(), 2);
        // The interface declaration comes first and points at the definition.
        assert_eq!(results[0].preferred_declaration.range.start, IdePosition::new(1, 8));
        assert_eq!(results[0].definition.as_ref().map(|d| d.range.start), Some(IdePosition::new(4, 8)));
        assert_eq!(results[1].preferred_declaration.range.start, IdePosition::new(4, 8));
    }

    #[test]
    fn objc_category_at_its_class_name_also_lists_the_interface() {
        let src = "@interface Obj\n@end\n@interface Obj (Extra)\n@end\n";
        let mut b = builder(src);
        let interface = b.add_decl(
            Decl::new(DeclKind::ObjCInterface, "Obj", at(&b, "Obj", 0))
                .with_range(span(&b, "@interface", 0, "@end"))
                .defined(),
        );
        // Categories are located at the class name they extend.
        let category = b.add_decl(
            Decl::new(DeclKind::ObjCCategory, "Extra", at(&b, "Obj", 1))
                .with_range(span(&b, "@interface", 1, "@end")),
        );
        b.set_class_interface(category, interface);
        b.add_decl_node(None, interface);
        b.add_decl_node(None, category);
        let ast = b.build();

        let results = locate(&ast, pos_after(&ast, "Obj", 1, 1), None);
        assert_eq!(results.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(), vec!["Obj", "Extra"]);
        assert_eq!(results[0].preferred_declaration.range.start, IdePosition::new(0, 11));

        // The category name itself only names the category.
        let results = locate(&ast, pos_after(&ast, "Extra", 0, 1), None);
        assert_eq!(results.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(), vec!["Extra"]);
    }

    #[test]
    fn using_declaration_prefers_its_target() {
        let src = "namespace ns { struct Foo {}; }\nusing ns::Foo;\n";
        let mut b = builder(src);
        let ns = b.add_decl(
            Decl::new(DeclKind::Namespace, "ns", at(&b, "ns", 0)).with_range(span(&b, "namespace", 0, "}")),
        );
        let foo = b.add_decl(Decl::new(struct_kind(), "Foo", at(&b, "Foo", 0)).with_context(ns).defined());
        let using = b.add_decl(
            Decl::new(DeclKind::Using, "Foo", at(&b, "Foo", 1)).with_range(span(&b, "using", 0, ";")),
        );
        let shadow = b.add_decl(Decl::new(DeclKind::UsingShadow, "Foo", at(&b, "Foo", 1)).with_target(foo));
        b.add_shadow(using, shadow);
        let ns_node = b.add_decl_node(None, ns);
        b.add_decl_node(Some(ns_node), foo);
        b.add_decl_node(None, using);
        let ast = b.build();

        let results = locate(&ast, pos_after(&ast, "Foo", 1, 1), None);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Foo");
        assert_eq!(results[0].preferred_declaration.range.start, IdePosition::new(0, 22));
    }

    #[test]
    fn specialization_name_jumps_to_the_primary_template() {
        let src = "template <class T> struct W {};\ntemplate <> struct W<int> {};\n";
        let mut b = builder(src);
        let template = b.add_decl(Decl::new(DeclKind::ClassTemplate, "W", at(&b, "W", 0)));
        let pattern = b.add_decl(Decl::new(struct_kind(), "W", at(&b, "W", 0)).defined());
        b.set_template(template, pattern);
        let explicit = b.add_decl(
            Decl::new(DeclKind::ClassTemplateSpecialization, "W", at(&b, "W", 1))
                .with_range(span(&b, "template <>", 0, "}"))
                .with_flags(DeclFlags::EXPLICIT_SPECIALIZATION)
                .defined(),
        );
        b.set_specialization(explicit, template);
        b.add_decl_node(None, explicit);
        let ast = b.build();

        let results = locate(&ast, pos(&ast, "W<int>", 0), None);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].preferred_declaration.range.start, IdePosition::new(0, 26));
    }

    fn comment_fixture() -> ParsedAst {
        let mut b = builder("int kValue = 1;\n// see kValue\n");
        let value = b.add_decl(Decl::new(DeclKind::Var, "kValue", at(&b, "kValue", 0)).with_usr("c:@kValue"));
        b.add_decl_node(None, value);
        b.build()
    }

    #[test]
    fn word_in_a_comment_resolves_through_a_nearby_identifier() {
        let ast = comment_fixture();
        let results = locate(&ast, pos_after(&ast, "kValue", 1, 2), None);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].preferred_declaration.range.start, IdePosition::new(0, 4));
    }

    #[test]
    fn disabled_stages_are_skipped() {
        let ast = comment_fixture();
        let index = MemIndex::new();
        let other = index_symbol("c:@kOther", SymbolKind::Variable, "kValue", "", index_loc(OTHER_URI, 2, 4, 10));
        index.insert_symbol(other);
        let cursor = pos_after(&ast, "kValue", 1, 2);

        let textual_only = FallbackSettings {
            nearby_identifier: false,
            textual_search: true,
        };
        let results = locate_symbol_at(&ast, cursor, Some(&index), &textual_only);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, Some(SymbolId::from_usr("c:@kOther")));

        let nothing = FallbackSettings {
            nearby_identifier: false,
            textual_search: false,
        };
        assert!(locate_symbol_at(&ast, cursor, Some(&index), &nothing).is_empty());
    }

    #[test]
    fn position_past_the_end_finds_nothing() {
        let ast = comment_fixture();
        assert!(locate(&ast, IdePosition::new(40, 0), None).is_empty());
    }

    #[test]
    fn column_past_the_line_end_finds_nothing() {
        let mut b = builder("int x = 1;\nint y = x\n;");
        let x = b.add_decl(Decl::new(DeclKind::Var, "x", at(&b, "x", 0)).defined());
        b.add_decl_node(None, x);
        let use_range = range(&b, "x", 1);
        b.add_node(
            None,
            NodeKind::DeclRef {
                target: x,
                using: None,
                roles: SymbolRoles::READ,
            },
            use_range,
            use_range,
        );
        let ast = b.build();

        assert_eq!(locate(&ast, IdePosition::new(1, 8), None).len(), 1);
        assert!(locate(&ast, IdePosition::new(1, 500), None).is_empty());
    }

    #[test]
    fn unresolved_dependent_name_nearby_still_allows_the_index_search() {
        let mut b = builder("int a = t.doWork;\n// see doWork\n");
        let name = range(&b, "doWork", 0);
        b.add_node(
            None,
            NodeKind::DependentName {
                candidates: Vec::new(),
            },
            name,
            name,
        );
        let ast = b.build();
        let index = MemIndex::new();
        index.insert_symbol(index_symbol(
            "c:@S@Task@F@doWork#",
            SymbolKind::InstanceMethod,
            "doWork",
            "Task::",
            index_loc(HEADER_URI, 2, 7, 13),
        ));

        let results = locate(&ast, pos_after(&ast, "doWork", 1, 2), Some(&index));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, Some(SymbolId::from_usr("c:@S@Task@F@doWork#")));
    }
