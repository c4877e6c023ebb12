#[cfg(test)]
mod builtin_tests {
    use ecma_interpreter as ecma;

    use ecma::builtins::{parse_float, parse_int};
    use ecma::Value;

    fn eval(source: &str) -> Value {
        match ecma::run(source) {
            Ok(value) => value,
            Err(e) => panic!("{:?} failed: {}", source, e),
        }
    }

    fn is_nan(value: Value) -> bool {
        matches!(value, Value::Number(n) if n.is_nan())
    }

    fn assert_strings(cases: &[(&str, &str)]) {
        for (source, expected) in cases {
            assert_eq!(eval(source), Value::from(*expected), "{}", source);
        }
    }

    // ── globals ──────────────────────────────────────────────────────────

    #[test]
    fn test_is_finite() {
        assert_eq!(eval("isFinite(0)"), Value::Boolean(true));
        assert_eq!(eval("isFinite(NaN)"), Value::Boolean(false));
        assert_eq!(eval("isFinite(Infinity)"), Value::Boolean(false));
        assert_eq!(eval("isFinite(-Infinity)"), Value::Boolean(false));
        assert_eq!(eval("isFinite('12')"), Value::Boolean(true));
    }

    #[test]
    fn test_is_nan() {
        assert_eq!(eval("isNaN(0)"), Value::Boolean(false));
        assert_eq!(eval("isNaN(NaN)"), Value::Boolean(true));
        assert_eq!(eval("isNaN(Infinity)"), Value::Boolean(false));
        assert_eq!(eval("isNaN('abc')"), Value::Boolean(true));
    }

    #[test]
    fn test_parse_int() {
        assert_eq!(parse_int("  42px", 0), 42.0);
        assert_eq!(parse_int("-17", 0), -17.0);
        assert_eq!(parse_int("0x1f", 0), 31.0);
        assert_eq!(parse_int("0x1f", 16), 31.0);
        assert_eq!(parse_int("ff", 16), 255.0);
        assert_eq!(parse_int("101", 2), 5.0);
        assert_eq!(parse_int("z", 36), 35.0);
        assert_eq!(parse_int("08", 0), 8.0);
        assert!(parse_int("", 0).is_nan());
        assert!(parse_int("abc", 10).is_nan());
        assert!(parse_int("1", 1).is_nan());
        assert!(parse_int("1", 37).is_nan());

        assert_eq!(eval("parseInt('12.9')"), Value::Number(12.0));
        assert_eq!(eval("parseInt('10', 8)"), Value::Number(8.0));
    }

    #[test]
    fn test_parse_float() {
        assert_eq!(parse_float("3.14abc"), 3.14);
        assert_eq!(parse_float("  -0.5"), -0.5);
        assert_eq!(parse_float(".5"), 0.5);
        assert_eq!(parse_float("1e3x"), 1000.0);
        assert_eq!(parse_float("1e"), 1.0);
        assert_eq!(parse_float("-Infinity"), f64::NEG_INFINITY);
        assert!(parse_float("abc").is_nan());
        assert!(parse_float(".").is_nan());

        assert_eq!(eval("parseFloat('2.5kg')"), Value::Number(2.5));
    }

    #[test]
    fn test_global_constants() {
        assert!(is_nan(eval("NaN")));
        assert_eq!(eval("Infinity"), Value::Number(f64::INFINITY));
        assert_eq!(eval("undefined"), Value::Undefined);
        assert_eq!(eval("NaN = 1; isNaN(NaN)"), Value::Boolean(true));
    }

    // ── String ───────────────────────────────────────────────────────────

    #[test]
    fn test_string_conversion() {
        assert_strings(&[
            ("String(true)", "true"),
            ("String(false)", "false"),
            ("String('test')", "test"),
            ("String(NaN)", "NaN"),
            ("String(Infinity)", "Infinity"),
            ("String(-Infinity)", "-Infinity"),
            ("String(null)", "null"),
            ("String(undefined)", "undefined"),
            ("String(+0)", "0"),
            ("String(-0)", "0"),
            ("String(1)", "1"),
            ("String(-2.3)", "-2.3"),
            ("String()", ""),
        ]);
    }

    #[test]
    fn test_char_code_at() {
        assert!(is_nan(eval("'test'.charCodeAt(5)")));
        assert!(is_nan(eval("'test'.charCodeAt(-1)")));
        assert_eq!(eval("'test'.charCodeAt(0)"), Value::Number(116.0));
        assert_eq!(eval("'test'.charCodeAt(2)"), Value::Number(115.0));
        assert_eq!(eval("'test'.charCodeAt()"), Value::Number(116.0));
    }

    #[test]
    fn test_char_at() {
        assert_strings(&[
            ("'test'.charAt(1)", "e"),
            ("'test'.charAt(4)", ""),
            ("'test'.charAt(-1)", ""),
            ("'test'.charAt()", "t"),
        ]);
    }

    #[test]
    fn test_substr() {
        assert_strings(&[
            ("'test'.substr(1, 2)", "es"),
            ("'test'.substr(0, 6)", "test"),
            ("'test'.substr(-3, 1)", "e"),
            ("'test'.substr(2, 4)", "st"),
            ("'test'.substr(3)", "t"),
            ("'test'.substr()", "test"),
            ("'test'.substr(1, -1)", ""),
        ]);
    }

    #[test]
    fn test_substring_and_slice() {
        assert_strings(&[
            ("'abcdef'.substring(1, 3)", "bc"),
            ("'abcdef'.substring(3, 1)", "bc"),
            ("'abcdef'.substring(-2)", "abcdef"),
            ("'abcdef'.slice(-2)", "ef"),
            ("'abcdef'.slice(1, -1)", "bcde"),
            ("'abcdef'.slice(4, 2)", ""),
        ]);
    }

    #[test]
    fn test_index_of() {
        assert_eq!(eval("'hello'.indexOf('l')"), Value::Number(2.0));
        assert_eq!(eval("'hello'.indexOf('l', 3)"), Value::Number(3.0));
        assert_eq!(eval("'hello'.indexOf('z')"), Value::Number(-1.0));
        assert_eq!(eval("'hello'.indexOf('')"), Value::Number(0.0));
        assert_eq!(eval("'hello'.lastIndexOf('l')"), Value::Number(3.0));
        assert_eq!(eval("'hello'.lastIndexOf('l', 2)"), Value::Number(2.0));
        assert_eq!(eval("'hello'.lastIndexOf('h', -5)"), Value::Number(0.0));
    }

    #[test]
    fn test_case_split_and_concat() {
        assert_strings(&[
            ("'MiXeD'.toUpperCase()", "MIXED"),
            ("'MiXeD'.toLowerCase()", "mixed"),
            ("'a,b,c'.split(',').join('|')", "a|b|c"),
            ("'abc'.split('').join('-')", "a-b-c"),
            ("'a,b,c'.split(',', 2).join('|')", "a|b"),
            ("'a'.concat('b', 1)", "ab1"),
            ("String.fromCharCode(104, 105)", "hi"),
        ]);
        assert_eq!(eval("'abc'.split().length"), Value::Number(1.0));
    }

    #[test]
    fn test_utf16_lengths() {
        assert_eq!(eval("'\u{1F600}'.length"), Value::Number(2.0));
        assert_eq!(eval("'\u{1F600}'.charCodeAt(0)"), Value::Number(55357.0));
    }

    #[test]
    fn test_string_wrapper() {
        assert_eq!(eval("var s = new String('ab'); s.length"), Value::Number(2.0));
        assert_eq!(eval("new String('ab') + 'c'"), Value::from("abc"));
        assert_eq!(eval("new String('ab') == 'ab'"), Value::Boolean(true));
        assert_eq!(
            eval("var n; try { String.prototype.toString.call({}); } catch (e) { n = e.name; } n"),
            Value::from("TypeError")
        );
    }

    // ── Number & Boolean ─────────────────────────────────────────────────

    #[test]
    fn test_number_conversion() {
        assert_eq!(eval("Number('42')"), Value::Number(42.0));
        assert_eq!(eval("Number()"), Value::Number(0.0));
        assert_eq!(eval("Number(true)"), Value::Number(1.0));
        assert!(is_nan(eval("Number(undefined)")));
        assert_eq!(eval("new Number(3) + 1"), Value::Number(4.0));
    }

    #[test]
    fn test_number_constants() {
        assert_eq!(eval("Number.MAX_VALUE"), Value::Number(f64::MAX));
        assert_eq!(eval("Number.MIN_VALUE"), Value::Number(5e-324));
        assert_eq!(eval("Number.POSITIVE_INFINITY"), Value::Number(f64::INFINITY));
        assert_eq!(eval("Number.NEGATIVE_INFINITY"), Value::Number(f64::NEG_INFINITY));
        assert!(is_nan(eval("Number.NaN")));
    }

    #[test]
    fn test_number_to_string_radix() {
        assert_strings(&[
            ("(255).toString(16)", "ff"),
            ("(255).toString(2)", "11111111"),
            ("(-255).toString(36)", "-73"),
            ("(0.5).toString(2)", "0.1"),
            ("(12.5).toString()", "12.5"),
            ("(0).toString(16)", "0"),
        ]);
        assert_eq!(
            eval("var n; try { (1).toString(1); } catch (e) { n = e.name; } n"),
            Value::from("RangeError")
        );
    }

    #[test]
    fn test_to_fixed() {
        assert_strings(&[
            ("(3.14159).toFixed(2)", "3.14"),
            ("(1).toFixed(3)", "1.000"),
            ("(-1.5).toFixed(1)", "-1.5"),
            ("(1e21).toFixed(2)", "1e+21"),
        ]);
        assert_eq!(
            eval("var n; try { (1).toFixed(21); } catch (e) { n = e.name; } n"),
            Value::from("RangeError")
        );
    }

    #[test]
    fn test_boolean() {
        assert_eq!(eval("Boolean('')"), Value::Boolean(false));
        assert_eq!(eval("Boolean('x')"), Value::Boolean(true));
        assert_eq!(eval("new Boolean(false) ? 1 : 2"), Value::Number(1.0));
        assert_eq!(eval("new Boolean(false).valueOf()"), Value::Boolean(false));
        assert_eq!(eval("true.toString()"), Value::from("true"));
    }

    // ── Array ────────────────────────────────────────────────────────────

    #[test]
    fn test_array_constructor() {
        assert_eq!(eval("new Array(3).length"), Value::Number(3.0));
        assert_eq!(eval("new Array(1, 2).length"), Value::Number(2.0));
        assert_eq!(eval("Array('3').length"), Value::Number(1.0));
        assert_eq!(eval("String(new Array(3))"), Value::from(",,"));
    }

    #[test]
    fn test_array_join_and_to_string() {
        assert_strings(&[
            ("[1, 2, 3].join()", "1,2,3"),
            ("[1, 2, 3].join(' - ')", "1 - 2 - 3"),
            ("[1, null, undefined, 2].toString()", "1,,,2"),
            ("[[1, 2], [3]].toString()", "1,2,3"),
            ("String([])", ""),
        ]);
    }

    #[test]
    fn test_array_push_pop_shift_unshift() {
        assert_eq!(eval("var a = [1]; a.push(2, 3)"), Value::Number(3.0));
        assert_eq!(eval("var a = [1]; a.push(2, 3); a.join()"), Value::from("1,2,3"));
        assert_eq!(eval("var a = [1, 2]; a.pop()"), Value::Number(2.0));
        assert_eq!(eval("var a = [1, 2]; a.pop(); a.length"), Value::Number(1.0));
        assert_eq!(eval("[].pop()"), Value::Undefined);
        assert_eq!(eval("var a = [1, 2, 3]; a.shift()"), Value::Number(1.0));
        assert_eq!(eval("var a = [1, 2, 3]; a.shift(); a.join()"), Value::from("2,3"));
        assert_eq!(eval("var a = [3]; a.unshift(1, 2)"), Value::Number(3.0));
        assert_eq!(eval("var a = [3]; a.unshift(1, 2); a.join()"), Value::from("1,2,3"));
    }

    #[test]
    fn test_array_concat_slice_reverse_index_of() {
        assert_strings(&[
            ("[1].concat([2, 3], 4).join()", "1,2,3,4"),
            ("[1, 2, 3, 4].slice(1, 3).join()", "2,3"),
            ("[1, 2, 3, 4].slice(-2).join()", "3,4"),
            ("[1, 2, 3].reverse().join()", "3,2,1"),
        ]);
        assert_eq!(eval("[1, 2, 3, 2].indexOf(2)"), Value::Number(1.0));
        assert_eq!(eval("[1, 2, 3, 2].indexOf(2, 2)"), Value::Number(3.0));
        assert_eq!(eval("['1'].indexOf(1)"), Value::Number(-1.0));
    }

    #[test]
    fn test_array_methods_are_generic() {
        assert_eq!(
            eval("var o = {length: 0}; Array.prototype.push.call(o, 'x'); o.length + o[0]"),
            Value::from("1x")
        );
    }

    // ── Error ────────────────────────────────────────────────────────────

    #[test]
    fn test_error_objects() {
        assert_strings(&[
            ("new Error('boom').toString()", "Error: boom"),
            ("new TypeError('bad').toString()", "TypeError: bad"),
            ("Error().toString()", "Error"),
            ("new RangeError('r').name", "RangeError"),
            ("new SyntaxError('s').message", "s"),
            ("new Error().message", ""),
        ]);
        assert_eq!(
            eval("var e = new Error('x'); var s = ''; for (var k in e) s += k; s"),
            Value::from("")
        );
    }

    #[test]
    fn test_error_constructors_chain_to_error() {
        for name in ["EvalError", "RangeError", "ReferenceError", "SyntaxError", "TypeError", "URIError"] {
            assert_eq!(
                eval(&format!("{}.prototype instanceof Error", name)),
                Value::Boolean(true),
                "{}",
                name
            );
        }
    }

    // ── Math ─────────────────────────────────────────────────────────────

    #[test]
    fn test_math_functions() {
        assert_eq!(eval("Math.abs(-3)"), Value::Number(3.0));
        assert_eq!(eval("Math.floor(-1.5)"), Value::Number(-2.0));
        assert_eq!(eval("Math.ceil(1.2)"), Value::Number(2.0));
        assert_eq!(eval("Math.round(2.5)"), Value::Number(3.0));
        assert_eq!(eval("Math.round(-2.5)"), Value::Number(-2.0));
        assert_eq!(eval("Math.sqrt(16)"), Value::Number(4.0));
        assert_eq!(eval("Math.pow(2, 10)"), Value::Number(1024.0));
        assert_eq!(eval("Math.max(1, 3, 2)"), Value::Number(3.0));
        assert_eq!(eval("Math.min(1, 3, 2)"), Value::Number(1.0));
        assert_eq!(eval("Math.max()"), Value::Number(f64::NEG_INFINITY));
        assert_eq!(eval("Math.min()"), Value::Number(f64::INFINITY));
        assert!(is_nan(eval("Math.max(1, NaN)")));
        assert!(is_nan(eval("Math.pow(1, Infinity)")));
        assert_eq!(eval("Math.pow(NaN, 0)"), Value::Number(1.0));
        assert_eq!(eval("Math.PI"), Value::Number(std::f64::consts::PI));
    }

    #[test]
    fn test_math_random_range() {
        let value = eval("var ok = true; for (var i = 0; i < 100; i++) { var r = Math.random(); if (r < 0 || r >= 1) ok = false; } ok");
        assert_eq!(value, Value::Boolean(true));
    }

    // ── Date ─────────────────────────────────────────────────────────────

    #[test]
    fn test_date() {
        assert_eq!(eval("new Date(0).getTime()"), Value::Number(0.0));
        assert_eq!(eval("new Date(1.9).valueOf()"), Value::Number(1.0));
        assert_eq!(
            eval("new Date(0).toString()"),
            Value::from("Thu Jan 01 1970 00:00:00 GMT+0000")
        );
        assert_eq!(eval("new Date(NaN).toString()"), Value::from("Invalid Date"));
        assert_eq!(eval("typeof Date()"), Value::from("string"));
        assert_eq!(eval("Date.now() > 0"), Value::Boolean(true));
        assert_eq!(eval("new Date(5) - new Date(2)"), Value::Number(3.0));
    }

    // ── RegExp ───────────────────────────────────────────────────────────

    #[test]
    fn test_regexp_objects() {
        assert_eq!(eval("/ab+c/gi.source"), Value::from("ab+c"));
        assert_eq!(eval("/ab+c/gi.global"), Value::Boolean(true));
        assert_eq!(eval("/ab+c/gi.ignoreCase"), Value::Boolean(true));
        assert_eq!(eval("/ab+c/gi.multiline"), Value::Boolean(false));
        assert_eq!(eval("new RegExp('x', 'm').multiline"), Value::Boolean(true));
        assert_eq!(eval("/x/ instanceof RegExp"), Value::Boolean(true));
    }
}
