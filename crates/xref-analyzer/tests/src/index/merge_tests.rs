    use super::*;
    use crate::index::{IncludeHeader, SymbolFlags, SymbolId, SymbolPosition};

    fn loc(uri: &str) -> SymbolLocation {
        SymbolLocation::new(uri, SymbolPosition::new(1, 2), SymbolPosition::new(1, 5))
    }

    fn symbol(kind: SymbolKind) -> Symbol {
        Symbol::new(SymbolId::from_usr("c:@S@Foo"), kind, "Foo")
    }

    #[test]
    fn prefer_requires_a_set_location() {
        assert!(!prefer(None, Some(&loc("file:///a.h"))));
        assert!(prefer(Some(&loc("file:///a.h")), None));
        assert!(prefer(Some(&loc("file:///a.h")), Some(&SymbolLocation::default())));
    }

    #[test]
    fn prefer_generated_source_over_generated_output() {
        assert!(prefer(Some(&loc("file:///msg.proto")), Some(&loc("file:///msg.pb.h"))));
        assert!(!prefer(Some(&loc("file:///msg.pb.h")), Some(&loc("file:///msg.proto"))));
        assert!(!prefer(Some(&loc("file:///a.h")), Some(&loc("file:///b.h"))));
    }

    #[test]
    fn merge_keeps_side_with_definition() {
        let mut l = symbol(SymbolKind::Function);
        l.canonical_declaration = Some(loc("file:///decl_l.h"));
        let mut r = symbol(SymbolKind::Function);
        r.canonical_declaration = Some(loc("file:///decl_r.h"));
        r.definition = Some(loc("file:///def.cpp"));

        let merged = merge_symbol(&l, &r);
        assert_eq!(merged.definition, Some(loc("file:///def.cpp")));
        assert_eq!(merged.canonical_declaration, Some(loc("file:///decl_r.h")));
        assert!(merged.origin.contains(SymbolOrigin::MERGE));
    }

    #[test]
    fn merge_never_drops_a_definition() {
        let mut l = symbol(SymbolKind::Function);
        l.definition = Some(loc("file:///l.cpp"));
        let r = symbol(SymbolKind::Function);
        assert_eq!(merge_symbol(&l, &r).definition, Some(loc("file:///l.cpp")));
        assert_eq!(merge_symbol(&r, &l).definition, Some(loc("file:///l.cpp")));
    }

    #[test]
    fn merge_sums_references_and_fills_empty_text() {
        let mut l = symbol(SymbolKind::Function);
        l.references = 3;
        let mut r = symbol(SymbolKind::Function);
        r.references = 4;
        r.signature = "(int)".to_owned();
        r.return_type = "void".to_owned();
        r.flags = SymbolFlags::DEPRECATED;

        let merged = merge_symbol(&l, &r);
        assert_eq!(merged.references, 7);
        assert_eq!(merged.signature, "(int)");
        assert_eq!(merged.return_type, "void");
        assert!(merged.is_deprecated());
    }

    #[test]
    fn class_with_definition_ignores_forward_declaration_docs() {
        let mut l = symbol(SymbolKind::Class);
        l.definition = Some(loc("file:///foo.h"));
        let mut r = symbol(SymbolKind::Class);
        r.documentation = "unrelated comment".to_owned();
        assert_eq!(merge_symbol(&l, &r).documentation, "");

        let mut f = symbol(SymbolKind::Function);
        f.definition = Some(loc("file:///foo.cpp"));
        let mut g = symbol(SymbolKind::Function);
        g.documentation = "does things".to_owned();
        assert_eq!(merge_symbol(&f, &g).documentation, "does things");
    }

    #[test]
    fn include_headers_only_merge_between_like_sides() {
        let header = |name: &str, references| IncludeHeader {
            header: name.to_owned(),
            references,
        };
        let mut l = symbol(SymbolKind::Class);
        l.definition = Some(loc("file:///foo.h"));
        l.include_headers = vec![header("\"foo.h\"", 2)];
        let mut r = symbol(SymbolKind::Class);
        r.include_headers = vec![header("\"foo.h\"", 1), header("\"fwd.h\"", 5)];

        let merged = merge_symbol(&l, &r);
        assert_eq!(merged.include_headers, vec![header("\"foo.h\"", 3)]);

        let mut both = symbol(SymbolKind::Class);
        both.include_headers = vec![header("\"a.h\"", 1)];
        let merged = merge_symbol(&both, &r);
        assert_eq!(merged.include_headers.len(), 3);
    }

    #[test]
    fn preferred_location_defaults_to_ast() {
        let ast = loc("file:///main.cpp");
        assert_eq!(preferred_location(&ast, None), ast);
        assert_eq!(preferred_location(&ast, Some(&loc("file:///other.h"))), ast);
        assert_eq!(preferred_location(&ast, Some(&loc("file:///gen.proto"))), loc("file:///gen.proto"));
        assert_eq!(preferred_location(&SymbolLocation::default(), Some(&loc("file:///x.h"))), loc("file:///x.h"));
    }
