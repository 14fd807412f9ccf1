    use super::*;

    fn lex(input: &str) -> Vec<(TokenKind, &str)> {
        Lexer::new(input).map(|(kind, span)| (kind, &input[span])).collect()
    }

    #[test]
    fn test_keywords_and_identifiers() {
        let tokens = lex("auto x = decltype(y)");
        assert_eq!(
            tokens,
            vec![
                (TokenKind::KwAuto, "auto"),
                (TokenKind::Whitespace, " "),
                (TokenKind::Identifier, "x"),
                (TokenKind::Whitespace, " "),
                (TokenKind::Operator, "="),
                (TokenKind::Whitespace, " "),
                (TokenKind::KwDecltype, "decltype"),
                (TokenKind::LParen, "("),
                (TokenKind::Identifier, "y"),
                (TokenKind::RParen, ")"),
            ]
        );
    }

    #[test]
    fn test_namespace_tokens() {
        let tokens: Vec<_> = significant_tokens("using namespace a::b;").map(|(kind, _)| kind).collect();
        assert_eq!(
            tokens,
            vec![
                TokenKind::KwUsing,
                TokenKind::KwNamespace,
                TokenKind::Identifier,
                TokenKind::ColonColon,
                TokenKind::Identifier,
                TokenKind::Semi,
            ]
        );
    }

    #[test]
    fn test_comments_and_strings() {
        let tokens = lex("// note\n\"a b\" /* c */");
        assert_eq!(
            tokens,
            vec![
                (TokenKind::Comment, "// note"),
                (TokenKind::Whitespace, "\n"),
                (TokenKind::StringLiteral, "\"a b\""),
                (TokenKind::Whitespace, " "),
                (TokenKind::Comment, "/* c */"),
            ]
        );
    }

    #[test]
    fn test_keyword_spelling() {
        assert!(is_keyword_spelling("return"));
        assert!(is_keyword_spelling("auto"));
        assert!(!is_keyword_spelling("returned"));
        assert!(!is_keyword_spelling("foo_bar"));
    }

    #[test]
    fn test_raw_strings_and_numbers() {
        let tokens = lex(r#"R"(a)b)" 0x1F 1'000"#);
        assert_eq!(
            tokens,
            vec![
                (TokenKind::StringLiteral, r#"R"(a)b)""#),
                (TokenKind::Whitespace, " "),
                (TokenKind::Number, "0x1F"),
                (TokenKind::Whitespace, " "),
                (TokenKind::Number, "1'000"),
            ]
        );
    }

    #[test]
    fn test_preprocessor_punctuation() {
        let kinds: Vec<_> = significant_tokens("#define CAT(a, b) a ## b").map(|(kind, _)| kind).collect();
        assert_eq!(kinds[0], TokenKind::Hash);
        assert_eq!(kinds[1], TokenKind::Identifier);
        assert!(kinds.contains(&TokenKind::HashHash));
    }

    #[test]
    fn test_unknown_bytes_do_not_stop_lexing() {
        let tokens = lex("a ` b");
        assert_eq!(tokens.first(), Some(&(TokenKind::Identifier, "a")));
        assert_eq!(tokens.last(), Some(&(TokenKind::Identifier, "b")));
        assert!(tokens.iter().any(|(kind, _)| *kind == TokenKind::Unknown));
    }
