#[cfg(test)]
mod round_trip_tests {
    use ecma_interpreter as ecma;

    use ecma::printer::print;
    use ecma::{parse, Value};

    fn minify(source: &str) -> String {
        match parse(source, None) {
            Ok(program) => print(&program),
            Err(e) => panic!("{:?} failed to parse: {}", source, e),
        }
    }

    /// Printing is a fixed point after one pass and never changes meaning.
    fn assert_round_trip(source: &str) {
        let once = minify(source);
        let twice = minify(&once);

        assert_eq!(once, twice, "printer output is not stable for {:?}", source);

        let original = ecma::run(source).expect("original runs");
        let printed = ecma::run(&once).expect("printed runs");

        match (&original, &printed) {
            (Value::Number(a), Value::Number(b)) if a.is_nan() && b.is_nan() => {}
            (Value::Object(_), Value::Object(_)) => {}
            _ => assert_eq!(original, printed, "printed source: {}", once),
        }
    }

    #[test]
    fn test_expression_printing() {
        assert_eq!(minify("a + b * c"), "(a+(b*c));");
        assert_eq!(minify("(a + b) * c"), "((a+b)*c);");
        assert_eq!(minify("x = y = 1"), "(x=(y=1));");
        assert_eq!(minify("a += 2"), "(a+=2);");
        assert_eq!(minify("typeof x"), "(typeof x);");
        assert_eq!(minify("- -x"), "(-(-x));");
        assert_eq!(minify("x++"), "(x++);");
        assert_eq!(minify("a instanceof B"), "(a instanceof B);");
        assert_eq!(minify("'k' in o"), "(\"k\" in o);");
        assert_eq!(minify("a ? b : c"), "(a?b:c);");
        assert_eq!(minify("a && b || c"), "((a&&b)||c);");
    }

    #[test]
    fn test_literal_printing() {
        assert_eq!(minify("'it\\'s'"), "\"it's\";");
        assert_eq!(minify("\"say \\\"hi\\\"\""), "'say \"hi\"';");
        assert_eq!(minify("'a\\nb'"), "\"a\\nb\";");
        assert_eq!(minify("0x10"), "16;");
        assert_eq!(minify("1e999"), "(1/0);");
        assert_eq!(minify("({a: 1, 'b c': 2})"), "({a:1,\"b c\":2});");
        assert_eq!(minify("[1, 2]"), "[1,2];");
        assert_eq!(minify("1..toString()"), "(1).toString();");
        assert_eq!(minify("x = /a+/g"), "(x=(/a+/g));");
    }

    #[test]
    fn test_statement_printing() {
        assert_eq!(minify("if (a) b(); else c()"), "if(a){b();}else{c();}");
        assert_eq!(minify("var a = 1, b"), "var a=1,b;");
        assert_eq!(minify("for (var i = 0; i < 3; i++) ;"), "for(var i=0;(i<3);(i++)){}");
        assert_eq!(minify("for (;;) break"), "for(;;){break;}");
        assert_eq!(minify("for (k in o) {}"), "for(k in o){}");
        assert_eq!(minify("do x++; while (x < 3)"), "do{(x++);}while((x<3));");
        assert_eq!(minify("outer: while (1) continue outer"), "outer:while(1){continue outer;}");
        assert_eq!(minify("function f(a, b) { return a }"), "function f(a,b){return a;}");
        assert_eq!(minify("throw new Error('x')"), "throw(new Error(\"x\"));");
        assert_eq!(
            minify("try { a() } catch (e) { b() } finally { c() }"),
            "try{a();}catch(e){b();}finally{c();}"
        );
        assert_eq!(
            minify("switch (x) { case 1: a(); default: b() }"),
            "switch(x){case 1:a();default:b();}"
        );
    }

    #[test]
    fn test_new_with_call_callee_keeps_parentheses() {
        assert_eq!(minify("new (f())"), "(new (f()));");
        assert_eq!(minify("new f()"), "(new f());");
        assert_eq!(minify("new f"), "(new f);");
    }

    #[test]
    fn test_function_expression_in_statement_position() {
        assert_eq!(minify("(function () { return 1 })()"), "(function(){return 1;})();");
    }

    #[test]
    fn test_programs_survive_printing() {
        for source in [
            "var s = 0; for (var i = 0; i < 10; i++) { if (i % 3 == 0) continue; s += i; } s",
            "function fib(n) { return n < 2 ? n : fib(n - 1) + fib(n - 2); } fib(12)",
            "var o = {a: 1, b: [1, 2, {c: 'x'}]}; o.b[2].c + o.a",
            "var r = ''; switch (2) { case 1: r += 'a'; case 2: r += 'b'; default: r += 'c'; } r",
            "var log = ''; try { throw new Error('e'); } catch (err) { log = err.message; } finally { log += '!'; } log",
            "var x = 5; x <<= 2; x >>>= 1; -x",
            "var a = [3, 1, 2]; a.reverse().join('') + typeof a",
            "var t = 0; outer: for (var i = 0; i < 3; i++) { for (var j = 0; j < 3; j++) { if (j > i) continue outer; t++; } } t",
            "var n = 0; do { n++; } while (n < 4); void 0, n",
            "var f = function g(k) { return k ? k * g(k - 1) : 1; }; f(5)",
            "'\\u00e9\\t' + \"'\" + '\"'",
            "0 / 0",
            "var c = new (function () { this.v = 3; })(); c.v",
        ] {
            assert_round_trip(source);
        }
    }
}
