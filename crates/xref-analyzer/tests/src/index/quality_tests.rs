    use super::*;
    use crate::index::{SymbolId, SymbolLocation, SymbolPosition};

    fn symbol(
        name: &str,
        kind: SymbolKind,
    ) -> Symbol {
        let mut symbol = Symbol::new(SymbolId::from_usr(name), kind, name);
        symbol.flags = SymbolFlags::VISIBLE_OUTSIDE_FILE;
        symbol
    }

    #[test]
    fn reserved_names() {
        assert!(is_reserved_name("__x"));
        assert!(is_reserved_name("_Foo"));
        assert!(!is_reserved_name("_foo"));
        assert!(!is_reserved_name("_"));
        assert!(!is_reserved_name("foo"));
    }

    #[test]
    fn reference_boost_grows_slowly() {
        let base = symbol("f", SymbolKind::Function);
        let mut popular = base.clone();
        popular.references = 1000;
        let mut few = base.clone();
        few.references = 9;

        let score = |sym: &Symbol| {
            let mut quality = SymbolQualitySignals::default();
            quality.merge(sym);
            quality.evaluate()
        };
        assert_eq!(score(&base), score(&few));
        assert!(score(&popular) > score(&base));
        assert!(score(&popular) < 3.0 * score(&base));
    }

    #[test]
    fn penalties_stack() {
        let plain = symbol("Widget", SymbolKind::Class);
        let mut deprecated = plain.clone();
        deprecated.flags |= SymbolFlags::DEPRECATED;
        let reserved = symbol("_Widget", SymbolKind::Class);

        let plain_score = score_symbol(&plain, None);
        assert!((score_symbol(&deprecated, None) - plain_score * 0.1).abs() < 1e-6);
        assert!((score_symbol(&reserved, None) - plain_score * 0.1).abs() < 1e-6);
    }

    #[test]
    fn categories() {
        assert_eq!(SymbolCategory::of(&symbol("operator==", SymbolKind::Function)), SymbolCategory::Operator);
        assert_eq!(SymbolCategory::of(&symbol("Foo", SymbolKind::Constructor)), SymbolCategory::Constructor);
        assert_eq!(SymbolCategory::of(&symbol("ns", SymbolKind::Namespace)), SymbolCategory::Namespace);
        assert!(
            score_symbol(&symbol("ns", SymbolKind::Namespace), None)
                < score_symbol(&symbol("f", SymbolKind::Function), None)
        );
    }

    #[test]
    fn proximity_boosts_same_file() {
        let mut sym = symbol("f", SymbolKind::Function);
        sym.canonical_declaration =
            Some(SymbolLocation::new("file:///a.h", SymbolPosition::new(0, 0), SymbolPosition::new(0, 1)));
        let near = score_symbol(&sym, Some("file:///a.h"));
        let far = score_symbol(&sym, Some("file:///b.h"));
        assert!((near - 3.0 * far).abs() < 1e-5);

        sym.flags = SymbolFlags::empty();
        assert!(score_symbol(&sym, Some("file:///b.h")) < far);
    }
