    use super::*;
    use crate::index::{MemIndex, SymbolKind};
    use crate::resolve::fixtures::{
        BrokenIndex, HEADER_URI, MAIN_PATH, OTHER_URI, add_relation, at, builder, index_loc, index_symbol,
    };
    use crate::semantic::{Decl, DeclFlags, FileRange, TagKind, TextRange};

    #[test]
    fn preferred_decl_is_the_first_declaration() {
        let mut b = builder("void f();\nvoid f() {}\n");
        let first = b.add_decl(Decl::new(DeclKind::Function, "f", at(&b, "f", 0)));
        let second = b.redeclare(first, Decl::new(DeclKind::Function, "f", at(&b, "f", 1)).defined());
        let ast = b.build();

        assert_eq!(get_preferred_decl(&ast, second), first);
        assert_eq!(get_definition(&ast, first), Some(second));
    }

    #[test]
    fn objc_interface_prefers_its_definition() {
        let mut b = builder("@class Obj;\n@interface Obj\n@end\n");
        let forward = b.add_decl(Decl::new(DeclKind::ObjCInterface, "Obj", at(&b, "Obj", 0)));
        let definition = b.redeclare(forward, Decl::new(DeclKind::ObjCInterface, "Obj", at(&b, "Obj", 1)).defined());
        let ast = b.build();

        assert_eq!(get_preferred_decl(&ast, forward), definition);
    }

    #[test]
    fn definition_rules_by_kind() {
        let src = concat!(
            "namespace n { struct S { int field; }; }\n",
            "template <class T> void g();\n",
            "template <class T> void g() {}\n",
        );
        let mut b = builder(src);
        let ns = b.add_decl(Decl::new(DeclKind::Namespace, "n", at(&b, "n ", 0)));
        let s = b.add_decl(
            Decl::new(DeclKind::Record(TagKind::Struct), "S", at(&b, "S", 0))
                .with_context(ns)
                .defined(),
        );
        let field = b.add_decl(Decl::new(DeclKind::Field, "field", at(&b, "field", 0)).with_context(s));
        let template = b.add_decl(Decl::new(DeclKind::FunctionTemplate, "g", at(&b, "g", 0)));
        let pattern = b.add_decl(Decl::new(DeclKind::Function, "g", at(&b, "g", 0)));
        b.set_template(template, pattern);
        let template_def = b.redeclare(template, Decl::new(DeclKind::FunctionTemplate, "g", at(&b, "g", 1)));
        let pattern_def = b.redeclare(pattern, Decl::new(DeclKind::Function, "g", at(&b, "g", 1)).defined());
        b.set_template(template_def, pattern_def);
        let ast = b.build();

        assert_eq!(get_definition(&ast, ns), None);
        assert_eq!(get_definition(&ast, s), Some(s));
        assert_eq!(get_definition(&ast, field), Some(field));
        assert_eq!(get_definition(&ast, template), Some(pattern_def));
    }

    #[test]
    fn objc_method_definition_is_found_in_the_implementation() {
        let src = "@interface Obj\n- (void)run;\n@end\n@implementation Obj\n- (void)run {}\n@end\n";
        let mut b = builder(src);
        let interface = b.add_decl(Decl::new(DeclKind::ObjCInterface, "Obj", at(&b, "Obj", 0)).defined());
        let method = b.add_decl(
            Decl::new(DeclKind::ObjCMethod, "run", at(&b, "run", 0))
                .with_context(interface)
                .with_flags(DeclFlags::INSTANCE_METHOD),
        );
        let implementation = b.add_decl(Decl::new(DeclKind::ObjCImplementation, "Obj", at(&b, "Obj", 1)).defined());
        b.set_objc_impl(interface, implementation);
        let implemented = b.add_decl(
            Decl::new(DeclKind::ObjCMethod, "run", at(&b, "run", 1))
                .with_context(implementation)
                .with_flags(DeclFlags::INSTANCE_METHOD)
                .defined(),
        );
        let ast = b.build();

        assert_eq!(get_definition(&ast, method), Some(implemented));
        assert_eq!(get_definition(&ast, implemented), Some(implemented));
        assert_eq!(get_definition(&ast, interface), Some(implementation));
    }

    #[test]
    fn decl_in_a_file_without_text_is_not_located() {
        let mut b = builder("#include \"gen.h\"\n");
        let generated = b.add_file("/xref/gen.h", None);
        let decl = b.add_decl(Decl::new(
            DeclKind::Function,
            "hidden",
            FileRange::new(generated, TextRange::new(0, 6)),
        ));
        let ast = b.build();

        assert_eq!(located_from_decl(&ast, decl), None);
    }

    #[test]
    fn located_symbol_carries_name_and_id() {
        let mut b = builder("int counter = 0;\n");
        let counter = b.add_decl(
            Decl::new(DeclKind::Var, "counter", at(&b, "counter", 0))
                .with_usr("c:@counter")
                .defined(),
        );
        let ast = b.build();

        let located = located_from_decl(&ast, counter).expect("located");
        assert_eq!(located.name, "counter");
        assert_eq!(located.id, Some(SymbolId::from_usr("c:@counter")));
        assert_eq!(located.preferred_declaration.file_path, std::path::PathBuf::from(MAIN_PATH));
        assert_eq!(located.preferred_declaration.range.start, IdePosition::new(0, 4));
        assert_eq!(located.definition, Some(located.preferred_declaration.clone()));
    }

    #[test]
    fn index_locations_convert_both_ways() {
        let location = IdeLocation::new(
            "/xref/lib.h",
            IdeRange::new(IdePosition::new(3, 1), IdePosition::new(3, 4)),
        );
        let converted = to_index_location(&location).expect("file uri");
        assert_eq!(converted, index_loc(HEADER_URI, 3, 1, 4));
        assert_eq!(index_to_location(&converted), Some(location));

        assert_eq!(index_to_location(&SymbolLocation::default()), None);
        assert_eq!(index_to_location(&index_loc("test:///lib.h", 0, 0, 1)), None);
    }

    #[test]
    fn enhance_fills_the_definition_from_the_index() {
        let mut b = builder("void f();\n");
        let f = b.add_decl(Decl::new(DeclKind::Function, "f", at(&b, "f", 0)).with_usr("c:@F@f#"));
        let ast = b.build();

        let index = MemIndex::new();
        let mut symbol = index_symbol("c:@F@f#", SymbolKind::Function, "f", "", index_loc(HEADER_URI, 0, 5, 6));
        symbol.definition = Some(index_loc(OTHER_URI, 7, 5, 6));
        index.insert_symbol(symbol);

        let mut results = vec![located_from_decl(&ast, f).expect("located")];
        let ast_declaration = results[0].preferred_declaration.clone();
        enhance_from_index(&mut results, &index);

        assert_eq!(results[0].definition, index_to_location(&index_loc(OTHER_URI, 7, 5, 6)));
        // The AST declaration beats the index one.
        assert_eq!(results[0].preferred_declaration, ast_declaration);
    }

    #[test]
    fn enhance_prefers_the_index_declaration_when_the_ast_has_the_definition() {
        let mut b = builder("void f() {}\n");
        let f = b.add_decl(Decl::new(DeclKind::Function, "f", at(&b, "f", 0)).with_usr("c:@F@f#").defined());
        let ast = b.build();

        let index = MemIndex::new();
        index.insert_symbol(index_symbol("c:@F@f#", SymbolKind::Function, "f", "", index_loc(HEADER_URI, 2, 5, 6)));

        let mut results = vec![located_from_decl(&ast, f).expect("located")];
        let ast_definition = results[0].definition.clone();
        enhance_from_index(&mut results, &index);

        let header_declaration = index_to_location(&index_loc(HEADER_URI, 2, 5, 6));
        assert_eq!(Some(results[0].preferred_declaration.clone()), header_declaration);
        assert_eq!(results[0].definition, ast_definition);
    }

    #[test]
    fn enhance_survives_a_failing_index() {
        let mut b = builder("void f();\n");
        let f = b.add_decl(Decl::new(DeclKind::Function, "f", at(&b, "f", 0)));
        let ast = b.build();

        let mut results = vec![located_from_decl(&ast, f).expect("located")];
        let before = results.clone();
        enhance_from_index(&mut results, &BrokenIndex);
        assert_eq!(results, before);
    }

    #[test]
    fn implementors_come_from_relations() {
        let index = MemIndex::new();
        index.insert_symbol(index_symbol(
            "c:@S@Base@F@run#",
            SymbolKind::InstanceMethod,
            "run",
            "Base::",
            index_loc(HEADER_URI, 1, 0, 3),
        ));
        let mut derived = index_symbol(
            "c:@S@Derived@F@run#",
            SymbolKind::InstanceMethod,
            "run",
            "Derived::",
            index_loc(HEADER_URI, 4, 0, 3),
        );
        derived.definition = Some(index_loc(OTHER_URI, 9, 0, 3));
        index.insert_symbol(derived);
        add_relation(&index, "c:@S@Base@F@run#", RelationKind::OverriddenBy, "c:@S@Derived@F@run#");

        let ids = BTreeSet::from([SymbolId::from_usr("c:@S@Base@F@run#")]);
        let found = find_implementors(ids, RelationKind::OverriddenBy, &index);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, Some(SymbolId::from_usr("c:@S@Derived@F@run#")));
        assert_eq!(found[0].definition, index_to_location(&index_loc(OTHER_URI, 9, 0, 3)));

        assert!(find_implementors(BTreeSet::new(), RelationKind::OverriddenBy, &index).is_empty());
        let base_ids = BTreeSet::from([SymbolId::from_usr("c:@S@Base@F@run#")]);
        assert!(find_implementors(base_ids, RelationKind::BaseOf, &index).is_empty());
    }
