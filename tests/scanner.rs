#[cfg(test)]
mod scanner_tests {
    use ecma_interpreter as ecma;

    use ecma::error::JsError;
    use ecma::scanner::*;
    use ecma::token::*;

    fn significant(source: &str) -> Vec<Token> {
        Scanner::new(source)
            .filter_map(Result::ok)
            .filter(|t| t.kind != TokenKind::ENDLINE)
            .collect()
    }

    fn assert_token_sequence(source: &str, expected: &[(TokenKind, &str)]) {
        let tokens = significant(source);

        assert_eq!(tokens.len(), expected.len(), "tokens: {:?}", tokens);

        for (actual, (expected_kind, expected_value)) in tokens.iter().zip(expected.iter()) {
            assert_eq!(actual.kind, *expected_kind);
            assert_eq!(actual.value, *expected_value);
        }
    }

    #[test]
    fn test_scanner_01_punctuators() {
        assert_token_sequence(
            "({*.,+*})",
            &[
                (TokenKind::PUNCTUATOR, "("),
                (TokenKind::PUNCTUATOR, "{"),
                (TokenKind::PUNCTUATOR, "*"),
                (TokenKind::PUNCTUATOR, "."),
                (TokenKind::PUNCTUATOR, ","),
                (TokenKind::PUNCTUATOR, "+"),
                (TokenKind::PUNCTUATOR, "*"),
                (TokenKind::PUNCTUATOR, "}"),
                (TokenKind::PUNCTUATOR, ")"),
                (TokenKind::END, ""),
            ],
        );
    }

    #[test]
    fn test_longest_punctuator_wins() {
        assert_token_sequence(
            "a >>>= b !== c",
            &[
                (TokenKind::IDENTIFIER, "a"),
                (TokenKind::PUNCTUATOR, ">>>="),
                (TokenKind::IDENTIFIER, "b"),
                (TokenKind::PUNCTUATOR, "!=="),
                (TokenKind::IDENTIFIER, "c"),
                (TokenKind::END, ""),
            ],
        );
    }

    #[test]
    fn test_numbers_keep_their_lexeme() {
        assert_token_sequence(
            "12 3.5 .5 1e3 2E-2 0x1F",
            &[
                (TokenKind::NUMBER, "12"),
                (TokenKind::NUMBER, "3.5"),
                (TokenKind::NUMBER, ".5"),
                (TokenKind::NUMBER, "1e3"),
                (TokenKind::NUMBER, "2E-2"),
                (TokenKind::NUMBER, "0x1F"),
                (TokenKind::END, ""),
            ],
        );
    }

    #[test]
    fn test_string_escapes_are_decoded() {
        let tokens = significant(r#"'a\'b' "c\nd" "\x41B" 'e\qf'"#);

        assert_eq!(tokens[0].value, "a'b");
        assert_eq!(tokens[1].value, "c\nd");
        assert_eq!(tokens[2].value, "AB");
        assert_eq!(tokens[3].value, "eqf");
        assert!(tokens[..4].iter().all(|t| t.kind == TokenKind::STRING));
    }

    #[test]
    fn test_line_continuation_in_string() {
        let tokens = significant("'ab\\\ncd'");
        assert_eq!(tokens[0].value, "abcd");
    }

    #[test]
    fn test_unterminated_string_is_an_error() {
        let results: Vec<_> = Scanner::new("'abc").collect();

        assert!(matches!(results.last(), Some(Err(JsError::Lex { .. }))));
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_token_sequence(
            "a // line comment\n/* block */ b",
            &[
                (TokenKind::IDENTIFIER, "a"),
                (TokenKind::IDENTIFIER, "b"),
                (TokenKind::END, ""),
            ],
        );
    }

    #[test]
    fn test_nested_or_unclosed_block_comment_is_an_error() {
        for source in ["/* a /* b */", "/* never closed"] {
            let results: Vec<_> = Scanner::new(source).collect();
            assert!(
                results.iter().any(|r| r.is_err()),
                "expected a lex error for {:?}",
                source
            );
        }
    }

    #[test]
    fn test_regexp_after_operator_context() {
        assert_token_sequence(
            "x = /a[/]b/gi",
            &[
                (TokenKind::IDENTIFIER, "x"),
                (TokenKind::PUNCTUATOR, "="),
                (TokenKind::REGEXP, "/a[/]b/gi"),
                (TokenKind::END, ""),
            ],
        );
    }

    #[test]
    fn test_slash_after_operand_is_division() {
        assert_token_sequence(
            "a / b / c",
            &[
                (TokenKind::IDENTIFIER, "a"),
                (TokenKind::PUNCTUATOR, "/"),
                (TokenKind::IDENTIFIER, "b"),
                (TokenKind::PUNCTUATOR, "/"),
                (TokenKind::IDENTIFIER, "c"),
                (TokenKind::END, ""),
            ],
        );
    }

    #[test]
    fn test_regexp_after_keyword() {
        let tokens = significant("return /x/");
        assert_eq!(tokens[1].kind, TokenKind::REGEXP);
    }

    #[test]
    fn test_endline_tokens_and_positions() {
        let tokens: Vec<_> = Scanner::new("a\n  b").filter_map(Result::ok).collect();

        assert_eq!(tokens[0].kind, TokenKind::IDENTIFIER);
        assert_eq!(tokens[1].kind, TokenKind::ENDLINE);
        assert_eq!(tokens[2].value, "b");
        assert_eq!(tokens[2].line, 2);
        assert_eq!(tokens[2].column, 3);
        assert_eq!(tokens[2].offset, 4);
    }

    #[test]
    fn test_exactly_one_end_token() {
        let mut scanner = Scanner::new("a");
        let all: Vec<_> = scanner.by_ref().collect();

        assert_eq!(all.len(), 2);
        assert!(matches!(&all[1], Ok(t) if t.kind == TokenKind::END));
        assert!(scanner.next().is_none());
    }

    #[test]
    fn test_unexpected_character() {
        let results: Vec<_> = Scanner::new("a # b").collect();

        let error = results
            .iter()
            .find_map(|r| r.as_ref().err())
            .expect("a lex error");

        assert!(error.to_string().contains("Unexpected '#'"), "got: {}", error);
    }
}
