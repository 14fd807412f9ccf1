    use super::*;
    use crate::index::{MemIndex, Symbol, SymbolId};
    use crate::resolve::fixtures::{BrokenIndex, HEADER_URI, OTHER_URI, builder, index_loc, index_symbol};

    fn word_at<'a>(
        ast: &'a ParsedAst,
        needle: &str,
        nth: usize,
    ) -> SpelledWord<'a> {
        let offset = ast.main_text().match_indices(needle).nth(nth).expect("needle").0 as u32;
        SpelledWord::touching(offset + 1, ast.main_text(), ast.tokens()).expect("word")
    }

    fn line_of(
        ast: &ParsedAst,
        token: &SpelledToken,
    ) -> u32 {
        line_of_byte_offset(ast.main_text(), token.range.start as usize)
    }

    #[test]
    fn nearby_identifier_found_for_a_word_in_a_comment() {
        let ast = builder("int kValue = 1;\n// uses kValue here\n").build();
        let word = word_at(&ast, "kValue", 1);
        assert!(!word.expanded_token);

        let nearby = find_nearby_identifier(&ast, &word).expect("nearby token");
        assert_eq!(nearby.text(ast.main_text()), "kValue");
        assert_eq!(line_of(&ast, &nearby), 0);
    }

    #[test]
    fn nearby_identifier_prefers_later_lines() {
        let ast = builder("int fooBar;\n// fooBar\nint y = fooBar;\n").build();
        let word = word_at(&ast, "fooBar", 1);

        let nearby = find_nearby_identifier(&ast, &word).expect("nearby token");
        assert_eq!(line_of(&ast, &nearby), 2);
    }

    #[test]
    fn nearby_identifier_skips_directive_tokens() {
        let ast = builder("#define kName 1\n// kName\n").build();
        let word = word_at(&ast, "kName", 1);
        assert_eq!(find_nearby_identifier(&ast, &word), None);
    }

    #[test]
    fn nearby_identifier_ignores_real_tokens_and_strings() {
        let ast = builder("int kValue = 1;\nconst char* s = \"kValue\";\nint z = kValue;\n").build();
        let token_word = word_at(&ast, "kValue", 2);
        assert!(token_word.expanded_token);
        assert_eq!(find_nearby_identifier(&ast, &token_word), None);

        let string_word = word_at(&ast, "kValue", 1);
        assert!(string_word.in_string_literal());
        assert_eq!(find_nearby_identifier(&ast, &string_word), None);
    }

    #[test]
    fn nearby_identifier_respects_the_distance_budget() {
        // Two-letter words only look a few lines away.
        let mut text = String::from("int aB;\n");
        text.push_str(&"\n".repeat(10));
        text.push_str("// aB\n");
        let ast = builder(&text).build();
        let word = word_at(&ast, "aB", 1);
        assert_eq!(find_nearby_identifier(&ast, &word), None);
    }

    fn symbol(
        usr: &str,
        name: &str,
        scope: &str,
    ) -> Symbol {
        index_symbol(usr, SymbolKind::Function, name, scope, index_loc(HEADER_URI, 1, 0, name.len() as u32))
    }

    #[test]
    fn textual_lookup_matches_exact_names() {
        let ast = builder("// call doWork later\n").build();
        let index = MemIndex::new();
        let mut work = symbol("c:@F@doWork#", "doWork", "");
        work.definition = Some(index_loc(OTHER_URI, 4, 5, 11));
        index.insert_symbol(work);
        index.insert_symbol(symbol("c:@F@doWorkLater#", "doWorkLater", ""));

        let word = word_at(&ast, "doWork", 0);
        let results = locate_symbol_textually(&ast, &word, Some(&index), None);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "doWork");
        // The definition doubles as the preferred declaration.
        assert_eq!(results[0].definition, index_to_location(&index_loc(OTHER_URI, 4, 5, 11)));
        assert_eq!(Some(results[0].preferred_declaration.clone()), results[0].definition);
    }

    #[test]
    fn textual_results_name_the_specialization() {
        let ast = builder("// see `Buffer` here\n").build();
        let index = MemIndex::new();
        let mut buffer = symbol("c:@S@Buffer>#I", "Buffer", "");
        buffer.template_specialization_args = "<int>".to_owned();
        index.insert_symbol(buffer);

        let word = word_at(&ast, "Buffer", 0);
        let results = locate_symbol_textually(&ast, &word, Some(&index), None);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Buffer<int>");
    }

    #[test]
    fn textual_lookup_skips_constructors() {
        let ast = builder("// see MyType\n").build();
        let index = MemIndex::new();
        index.insert_symbol(index_symbol(
            "c:@S@MyType@F@MyType#",
            SymbolKind::Constructor,
            "MyType",
            "MyType::",
            index_loc(HEADER_URI, 2, 2, 8),
        ));
        let class = index_symbol("c:@S@MyType", SymbolKind::Class, "MyType", "", index_loc(HEADER_URI, 1, 6, 12));
        index.insert_symbol(class);

        let word = word_at(&ast, "MyType", 0);
        let results = locate_symbol_textually(&ast, &word, Some(&index), None);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, Some(SymbolId::from_usr("c:@S@MyType")));
    }

    #[test]
    fn textual_lookup_gives_up_on_too_many_candidates() {
        let ast = builder("// see get_value\n").build();
        let index = MemIndex::new();
        for ns in ["a", "b", "c", "d", "e", "f"] {
            index.insert_symbol(symbol(&format!("c:@N@{ns}@F@get_value#"), "get_value", &format!("{ns}::")));
        }
        let word = word_at(&ast, "get_value", 0);
        assert!(locate_symbol_textually(&ast, &word, Some(&index), None).is_empty());
    }

    #[test]
    fn textual_lookup_caps_its_results() {
        let ast = builder("// see get_value\n").build();
        let index = MemIndex::new();
        for ns in ["a", "b", "c", "d"] {
            index.insert_symbol(symbol(&format!("c:@N@{ns}@F@get_value#"), "get_value", &format!("{ns}::")));
        }
        let word = word_at(&ast, "get_value", 0);
        assert_eq!(locate_symbol_textually(&ast, &word, Some(&index), None).len(), TEXTUAL_RESULT_CAP);
    }

    #[test]
    fn textual_lookup_needs_an_unresolved_identifier() {
        let ast = builder("int do_work = 0;\n// plain words\n").build();
        let index = MemIndex::new();
        index.insert_symbol(symbol("c:@F@do_work#", "do_work", ""));

        // A real token resolves through the tree instead.
        let token_word = word_at(&ast, "do_work", 0);
        assert!(locate_symbol_textually(&ast, &token_word, Some(&index), None).is_empty());
        // Unless it is a dependent name the tree could not resolve.
        let dependent = NodeKind::DependentName {
            candidates: Vec::new(),
        };
        assert_eq!(locate_symbol_textually(&ast, &token_word, Some(&index), Some(&dependent)).len(), 1);

        let prose = word_at(&ast, "plain", 0);
        assert!(!prose.likely_identifier);
        assert!(locate_symbol_textually(&ast, &prose, Some(&index), None).is_empty());
        let comment_word = SpelledWord::touching(
            ast.main_text().find("words").expect("needle") as u32,
            ast.main_text(),
            ast.tokens(),
        )
        .expect("word");
        assert!(locate_symbol_textually(&ast, &comment_word, None, None).is_empty());
    }

    #[test]
    fn textual_lookup_survives_a_failing_index() {
        let ast = builder("// call doWork later\n").build();
        let word = word_at(&ast, "doWork", 0);
        assert!(locate_symbol_textually(&ast, &word, Some(&BrokenIndex), None).is_empty());
    }
