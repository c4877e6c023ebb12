#[cfg(test)]
mod parser_tests {
    use ecma_interpreter as ecma;

    use ecma::ast::*;
    use ecma::error::JsError;
    use ecma::parse;

    fn single(source: &str) -> Node {
        let program = parse(source, None).expect("parse");
        assert_eq!(program.body.len(), 1, "statements: {:?}", program.body);
        program.body.into_iter().next().map(|s| s.node).unwrap_or(Node::Null)
    }

    fn syntax_error(source: &str) -> String {
        match parse(source, None) {
            Err(JsError::Syntax { message, .. }) => message,
            other => panic!("expected a syntax error for {:?}, got {:?}", source, other),
        }
    }

    fn num(n: f64) -> Box<Node> {
        Box::new(Node::Number(n))
    }

    fn ident(name: &str) -> Box<Node> {
        Box::new(Node::Identifier(name.to_string()))
    }

    #[test]
    fn test_multiplication_binds_tighter_than_addition() {
        assert_eq!(
            single("1 + 2 * 3;"),
            Node::Binary {
                op: BinaryOp::Add,
                left: num(1.0),
                right: Box::new(Node::Binary {
                    op: BinaryOp::Mul,
                    left: num(2.0),
                    right: num(3.0),
                }),
            }
        );
    }

    #[test]
    fn test_binary_operators_are_left_associative() {
        assert_eq!(
            single("a - b - c"),
            Node::Binary {
                op: BinaryOp::Sub,
                left: Box::new(Node::Binary {
                    op: BinaryOp::Sub,
                    left: ident("a"),
                    right: ident("b"),
                }),
                right: ident("c"),
            }
        );
    }

    #[test]
    fn test_assignment_is_right_associative() {
        assert_eq!(
            single("a = b = 1"),
            Node::Assign {
                op: None,
                target: ident("a"),
                value: Box::new(Node::Assign {
                    op: None,
                    target: ident("b"),
                    value: num(1.0),
                }),
            }
        );
    }

    #[test]
    fn test_compound_assignment_records_operator() {
        assert!(matches!(
            single("x >>>= 2"),
            Node::Assign {
                op: Some(BinaryOp::UShr),
                ..
            }
        ));
    }

    #[test]
    fn test_postfix_binds_tighter_than_prefix() {
        assert_eq!(
            single("-x++"),
            Node::Unary {
                op: UnaryOp::Minus,
                operand: Box::new(Node::Update {
                    op: UpdateOp::Increment,
                    prefix: false,
                    operand: ident("x"),
                }),
            }
        );
    }

    #[test]
    fn test_line_break_before_postfix_ends_expression() {
        let program = parse("a\n++b", None).expect("parse");

        assert_eq!(program.body.len(), 2);
        assert_eq!(program.body[0].node, Node::Identifier("a".into()));
        assert_eq!(
            program.body[1].node,
            Node::Update {
                op: UpdateOp::Increment,
                prefix: true,
                operand: ident("b"),
            }
        );
    }

    #[test]
    fn test_conditional_and_logical_precedence() {
        assert_eq!(
            single("a || b && c ? d : e"),
            Node::Conditional {
                test: Box::new(Node::Logical {
                    op: LogicalOp::Or,
                    left: ident("a"),
                    right: Box::new(Node::Logical {
                        op: LogicalOp::And,
                        left: ident("b"),
                        right: ident("c"),
                    }),
                }),
                consequent: ident("d"),
                alternate: ident("e"),
            }
        );
    }

    #[test]
    fn test_member_call_and_index_chain() {
        assert_eq!(
            single("a.b[c](d)"),
            Node::Call {
                callee: Box::new(Node::Index {
                    object: Box::new(Node::Member {
                        object: ident("a"),
                        name: "b".into(),
                    }),
                    index: ident("c"),
                }),
                args: vec![Node::Identifier("d".into())],
            }
        );
    }

    #[test]
    fn test_new_with_and_without_arguments() {
        assert_eq!(
            single("new C"),
            Node::New {
                callee: ident("C"),
                args: None,
            }
        );

        assert_eq!(
            single("new C(1)"),
            Node::New {
                callee: ident("C"),
                args: Some(vec![Node::Number(1.0)]),
            }
        );

        assert_eq!(
            single("new C(1)(2)"),
            Node::Call {
                callee: Box::new(Node::New {
                    callee: ident("C"),
                    args: Some(vec![Node::Number(1.0)]),
                }),
                args: vec![Node::Number(2.0)],
            }
        );
    }

    #[test]
    fn test_new_takes_member_expression() {
        assert!(matches!(
            single("new a.b.C()"),
            Node::New {
                args: Some(_),
                ref callee,
            } if matches!(**callee, Node::Member { .. })
        ));
    }

    #[test]
    fn test_literals() {
        assert_eq!(single("0x1F"), Node::Number(31.0));
        assert_eq!(single("'hi'"), Node::String("hi".into()));
        assert_eq!(
            single("x = /ab+c/g"),
            Node::Assign {
                op: None,
                target: ident("x"),
                value: Box::new(Node::Regexp("/ab+c/g".into())),
            }
        );
        assert_eq!(
            single("[1, 'a']"),
            Node::Array(vec![Node::Number(1.0), Node::String("a".into())])
        );
    }

    #[test]
    fn test_object_literal_keys() {
        let node = single("x = {a: 1, 'b c': 2, 3: 4, if: 5}");

        let Node::Assign { value, .. } = node else {
            panic!("expected an assignment");
        };

        let Node::Object(properties) = *value else {
            panic!("expected an object literal");
        };

        let keys: Vec<ObjectKey> = properties.into_iter().map(|(k, _)| k).collect();

        assert_eq!(
            keys,
            vec![
                ObjectKey::Identifier("a".into()),
                ObjectKey::String("b c".into()),
                ObjectKey::Number(3.0),
                ObjectKey::Identifier("if".into()),
            ]
        );
    }

    #[test]
    fn test_reserved_words_allowed_as_property_names() {
        assert_eq!(
            single("a.if"),
            Node::Member {
                object: ident("a"),
                name: "if".into(),
            }
        );
    }

    #[test]
    fn test_reserved_word_cannot_be_a_variable() {
        let message = syntax_error("var class = 1;");
        assert!(message.contains("Expected an identifier"), "{}", message);
    }

    #[test]
    fn test_dangling_else_binds_to_nearest_if() {
        let node = single("if (a) if (b) x; else y;");

        let Node::If {
            consequent,
            alternate,
            ..
        } = node
        else {
            panic!("expected an if statement");
        };

        assert!(alternate.is_none());
        assert!(matches!(
            &consequent[0].node,
            Node::If {
                alternate: Some(_),
                ..
            }
        ));
    }

    #[test]
    fn test_automatic_semicolon_at_line_break() {
        let program = parse("var a = 1\nvar b = 2\na + b", None).expect("parse");
        assert_eq!(program.body.len(), 3);
    }

    #[test]
    fn test_automatic_semicolon_before_closing_brace() {
        assert!(parse("function f() { return 1 }", None).is_ok());
    }

    #[test]
    fn test_missing_semicolon_on_same_line() {
        let message = syntax_error("a = 1 b = 2");
        assert_eq!(message, "Missing ; before statement 'b'.");
    }

    #[test]
    fn test_return_operand_must_start_on_same_line() {
        let program = parse("function f() { return\n1 }", None).expect("parse");

        let Node::Function(f) = &program.body[0].node else {
            panic!("expected a function");
        };

        assert_eq!(f.body.len(), 2);
        assert_eq!(f.body[0].node, Node::Return(None));
    }

    #[test]
    fn test_return_in_global_scope() {
        assert_eq!(syntax_error("return 1;"), "return declared in the global scope.");
    }

    #[test]
    fn test_break_and_continue_placement() {
        assert_eq!(syntax_error("break;"), "break outside of a loop or a switch");
        assert_eq!(syntax_error("switch (x) { case 1: continue; }"), "continue outside of a loop");
        assert!(parse("while (x) { break; }", None).is_ok());
        assert!(parse("switch (x) { case 1: break; }", None).is_ok());
    }

    #[test]
    fn test_continue_to_unknown_label() {
        let message = syntax_error("top: for (;;) { continue bottom; }");
        assert_eq!(message, "Unrecognized label 'bottom'.");
    }

    #[test]
    fn test_continue_must_name_a_loop() {
        let message = syntax_error("a: { for (var i = 0; i < 2; i++) { continue a; } }");
        assert_eq!(message, "Label 'a' does not name a loop.");

        let message = syntax_error("a: if (x) { while (1) { continue a; } }");
        assert_eq!(message, "Label 'a' does not name a loop.");

        assert!(parse("a: { for (;;) { break a; } }", None).is_ok());
        assert!(parse("a: b: for (;;) { continue a; }", None).is_ok());
        assert!(parse("a: do { continue a; } while (0)", None).is_ok());
    }

    #[test]
    fn test_loop_labels_are_scoped() {
        let message = syntax_error("a: while (1) { } for (;;) { continue a; }");
        assert_eq!(message, "Unrecognized label 'a'.");
    }

    #[test]
    fn test_labels_are_recorded_and_scoped() {
        let program = parse("outer: inner: while (1) { break outer; }", None).expect("parse");
        assert_eq!(program.body[0].labels, vec!["outer".to_string(), "inner".to_string()]);

        assert_eq!(syntax_error("a: { } break a;"), "Unrecognized label 'a'.");
    }

    #[test]
    fn test_duplicate_label() {
        assert_eq!(syntax_error("a: a: x;"), "Duplicate label 'a'.");
    }

    #[test]
    fn test_labels_do_not_leak_into_functions() {
        let message = syntax_error("a: while (1) { (function () { while (1) { break a; } }); }");
        assert_eq!(message, "Unrecognized label 'a'.");
    }

    #[test]
    fn test_second_default_clause() {
        let message = syntax_error("switch (x) { default: a; default: b; }");
        assert_eq!(message, "More than one default clause in switch.");
    }

    #[test]
    fn test_switch_clauses() {
        let node = single("switch (x) { case 1: a; b; default: c; case 2: }");

        let Node::Switch { clauses, .. } = node else {
            panic!("expected a switch");
        };

        assert_eq!(clauses.len(), 3);
        assert_eq!(clauses[0].body.len(), 2);
        assert!(clauses[1].test.is_none());
        assert!(clauses[2].body.is_empty());
    }

    #[test]
    fn test_function_statement_is_not_invocable() {
        let message = syntax_error("function f() {}()");
        assert!(message.starts_with("Function statements are not invocable"), "{}", message);
        assert!(parse("(function f() {})()", None).is_ok());
    }

    #[test]
    fn test_for_with_extra_semicolon() {
        assert_eq!(syntax_error("for (;;;) {}"), "Expected ')' and instead saw ';'.");
    }

    #[test]
    fn test_for_in_forms() {
        assert!(matches!(
            single("for (var k in o) {}"),
            Node::ForIn {
                target: ForInTarget::Var(_),
                ..
            }
        ));
        assert!(matches!(
            single("for (k in o) {}"),
            Node::ForIn {
                target: ForInTarget::Name(_),
                ..
            }
        ));
        assert!(matches!(single("for (var i = 0; i < 3; i++) x;"), Node::For { .. }));
    }

    #[test]
    fn test_try_requires_catch_or_finally() {
        assert_eq!(syntax_error("try {} x;"), "Expected 'catch' and instead saw 'x'.");
        assert!(parse("try {} finally {}", None).is_ok());
        assert!(parse("try {} catch (e) {} finally {}", None).is_ok());
    }

    #[test]
    fn test_statement_keyword_in_expression_position() {
        let message = syntax_error("a = if;");
        assert!(message.contains("Expected an identifier"), "{}", message);
    }

    #[test]
    fn test_unexpected_early_end() {
        assert_eq!(syntax_error("a +"), "Unexpected early end of program.");
    }

    #[test]
    fn test_bad_assignment_target() {
        assert_eq!(syntax_error("1 = 2;"), "Bad assignment.");
    }

    #[test]
    fn test_syntax_error_reports_position_and_source_line() {
        match parse("a = 1;\n  b +;", Some("test.js")) {
            Err(JsError::Syntax {
                line,
                column,
                source_line,
                file_name,
                ..
            }) => {
                assert_eq!(line, 2);
                assert_eq!(column, 6);
                assert_eq!(source_line, "  b +;");
                assert_eq!(file_name, "test.js");
            }
            other => panic!("expected a syntax error, got {:?}", other),
        }
    }

    #[test]
    fn test_deep_nesting_is_a_syntax_error() {
        let source = format!("{}1{}", "(".repeat(20_000), ")".repeat(20_000));
        assert_eq!(syntax_error(&source), "Expression nested too deeply.");

        let source = format!("{}x{}", "[".repeat(5_000), "]".repeat(5_000));
        assert_eq!(syntax_error(&source), "Expression nested too deeply.");

        let source = format!("{}{}", "{".repeat(5_000), "}".repeat(5_000));
        assert_eq!(syntax_error(&source), "Expression nested too deeply.");
    }

    #[test]
    fn test_moderate_nesting_parses() {
        let source = format!("{}1{}", "(".repeat(50), ")".repeat(50));
        assert_eq!(single(&source), Node::Number(1.0));
    }

    #[test]
    fn test_every_binding_operator_has_a_left_rule() {
        for symbol in ecma::grammar::GRAMMAR.symbols() {
            if symbol.lbp > 0 {
                assert!(symbol.led.is_some(), "'{}' binds without a left rule", symbol.id);
            }
        }
    }

    #[test]
    fn test_invalid_utf8_source_is_reported() {
        let bytes = [b'a', 0xff];
        let error = match std::str::from_utf8(&bytes) {
            Ok(text) => panic!("decoded {:?}", text),
            Err(e) => JsError::from(e),
        };

        assert!(matches!(error, JsError::Utf8(_)));
        assert!(error.to_string().contains("invalid utf-8"), "{}", error);
    }

    #[test]
    fn test_lex_error_aborts_parse() {
        assert!(matches!(parse("a = 'open", None), Err(JsError::Lex { .. })));
    }

    #[test]
    fn test_hoisting_tables() {
        let program = parse(
            "var a; if (x) { var b = 1; } function f() { var inner; } function f() {} for (var k in o) {}",
            None,
        )
        .expect("parse");

        assert_eq!(program.vars, vec!["a", "b", "k"]);
        assert_eq!(program.functions.len(), 1);
        assert!(program.functions[0].vars.is_empty());
    }

    #[test]
    fn test_function_node_shape() {
        let program = parse("function add(a, b) { var c = a + b; function g() {} return c; }", None)
            .expect("parse");

        let f = &program.functions[0];

        assert_eq!(f.name.as_deref(), Some("add"));
        assert_eq!(f.params, vec!["a", "b"]);
        assert_eq!(f.vars, vec!["c"]);
        assert_eq!(f.functions.len(), 1);
        assert!(f.is_declaration);
        assert_eq!(f.body.len(), 3);
    }

    #[test]
    fn test_named_function_expression() {
        let node = single("x = function fact(n) { return n; }");

        let Node::Assign { value, .. } = node else {
            panic!("expected an assignment");
        };

        let Node::Function(f) = *value else {
            panic!("expected a function expression");
        };

        assert_eq!(f.name.as_deref(), Some("fact"));
        assert!(!f.is_declaration);
    }

    #[test]
    fn test_empty_statements_are_dropped() {
        let program = parse(";;a;;", None).expect("parse");
        assert_eq!(program.body.len(), 1);
    }

    #[test]
    fn test_program_serializes_to_json() {
        let program = parse("var x = 1 + 2;", Some("demo.js")).expect("parse");
        let json = serde_json::to_string(&program).expect("json");

        assert!(json.contains("\"Add\""), "{}", json);
        assert!(json.contains("demo.js"), "{}", json);
    }
}
