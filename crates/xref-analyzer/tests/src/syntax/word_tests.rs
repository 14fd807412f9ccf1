    use super::*;
    use crate::syntax::lexer::{TokenKind, significant_tokens};

    fn buffer(source: &str) -> TokenBuffer {
        let tokens = significant_tokens(source)
            .map(|(kind, span)| SpelledToken {
                kind,
                range: TextRange::new(span.start as u32, span.end as u32),
                expanded: true,
                starts_expansion: false,
            })
            .collect();
        TokenBuffer::new(tokens)
    }

    fn word_at<'a>(
        source: &'a str,
        tokens: &TokenBuffer,
        needle: &str,
    ) -> Option<SpelledWord<'a>> {
        let offset = source.find(needle).expect("needle in source") as u32;
        SpelledWord::touching(offset + 1, source, tokens)
    }

    #[test]
    fn identifier_token_is_its_own_word() {
        let source = "int my_value;";
        let tokens = buffer(source);
        let word = word_at(source, &tokens, "my_value").expect("word");
        assert_eq!(word.text, "my_value");
        assert_eq!(word.range, TextRange::new(4, 12));
        assert!(word.likely_identifier);
        assert!(word.expanded_token);
        assert_eq!(word.spelled_token, word.part_of_spelled_token);
        assert!(word.spelled_token.is_some());
    }

    #[test]
    fn keyword_token_is_a_word_but_not_an_identifier() {
        let source = "return value;";
        let tokens = buffer(source);
        let word = word_at(source, &tokens, "return").expect("word");
        assert_eq!(word.text, "return");
        assert!(!word.likely_identifier);
        assert!(word.spelled_token.is_some());
    }

    #[test]
    fn comment_words_come_from_raw_text() {
        let source = "x; // see fooBar and here\n";
        let tokens = buffer(source);

        let word = word_at(source, &tokens, "fooBar").expect("word");
        assert_eq!(word.text, "fooBar");
        assert!(word.likely_identifier);
        assert_eq!(word.spelled_token, None);
        assert!(!word.expanded_token);
        // The last token before the comment only counts if it touches the word.
        assert_eq!(word.part_of_spelled_token, None);

        let plain = word_at(source, &tokens, "here").expect("word");
        assert!(!plain.likely_identifier);
    }

    #[test]
    fn words_inside_strings_know_their_literal() {
        let source = "f(\"my_name\");";
        let tokens = buffer(source);
        let word = word_at(source, &tokens, "my_name").expect("word");
        assert_eq!(word.text, "my_name");
        assert_eq!(word.spelled_token, None);
        assert!(word.in_string_literal());
        assert_eq!(word.part_of_spelled_token.map(|tok| tok.kind), Some(TokenKind::StringLiteral));
    }

    #[test]
    fn no_word_between_operators() {
        let source = "a  +  b";
        let tokens = buffer(source);
        assert_eq!(SpelledWord::touching(2, source, &tokens), None);
    }

    #[test]
    fn likely_identifier_heuristics() {
        assert!(is_likely_identifier("foo", "see `", "` here"));
        assert!(is_likely_identifier("foo", "ns::", ""));
        assert!(is_likely_identifier("ns", "", "::foo"));
        assert!(is_likely_identifier("count", "/// \\param ", " how many"));
        assert!(is_likely_identifier("x", "/// @p ", ""));
        assert!(is_likely_identifier("snake_case", "", ""));
        assert!(is_likely_identifier("camelCase", "", ""));

        assert!(!is_likely_identifier("word", "just a ", " here"));
        assert!(!is_likely_identifier("Word", "", ""));
        assert!(!is_likely_identifier("value", "/// \\brief ", ""));
    }

    #[test]
    fn initialisms_are_prose_unless_they_contain_underscores() {
        assert!(!is_likely_identifier("HTTP", "uses ", " here"));
        assert!(!is_likely_identifier("ABI", "", ""));
        assert!(is_likely_identifier("HTTP_OK", "", ""));
        assert!(is_likely_identifier("parseHTTP", "", ""));
    }

    #[test]
    fn dollar_signs_split_raw_words() {
        let source = "// cost$fooBar here";
        let tokens = buffer(source);
        let word = word_at(source, &tokens, "fooBar").expect("word");
        assert_eq!(word.text, "fooBar");
        assert!(word.likely_identifier);
    }
