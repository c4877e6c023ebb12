//! Type conversion and comparison.
//!
//! The free functions are pure and total: they only ever look at
//! primitives.  Conversions that may have to run script code (an object's
//! `valueOf`/`toString` through `[[DefaultValue]]`) or allocate wrapper
//! objects are methods on [`Interpreter`] further down.

use crate::interpreter::{IResult, Interpreter};
use crate::object::{self, JsObject, ObjectKind};
use crate::realm::ErrorKind;
use crate::value::{ObjectRef, Value};

use log::debug;

const TWO_32: f64 = 4_294_967_296.0;

/// Preferred type for [`Interpreter::to_primitive`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hint {
    Number,
    String,
}

/// The `typeof` operator.
pub fn type_of(value: &Value) -> &'static str {
    match value {
        Value::Undefined => "undefined",
        Value::Null => "object",
        Value::Boolean(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Object(o) if o.borrow().is_callable() => "function",
        Value::Object(_) => "object",
    }
}

pub fn to_boolean(value: &Value) -> bool {
    match value {
        Value::Undefined | Value::Null => false,
        Value::Boolean(b) => *b,
        Value::Number(n) => !(n.is_nan() || *n == 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Object(_) => true,
    }
}

/// ToNumber applied to a string: surrounding whitespace is ignored, the empty
/// string is 0, anything malformed is NaN.
pub fn string_to_number(text: &str) -> f64 {
    let text = text.trim();

    if text.is_empty() {
        return 0.0;
    }

    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        if hex.is_empty() || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return f64::NAN;
        }

        return hex
            .bytes()
            .fold(0.0, |acc, b| acc * 16.0 + f64::from((b as char).to_digit(16).unwrap_or(0)));
    }

    let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);

    if unsigned == "Infinity" {
        return if text.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    // Rust's float grammar also accepts "inf" and "nan"; the language does not.
    let well_formed = unsigned
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'));

    if !well_formed || unsigned.starts_with(['e', 'E']) {
        return f64::NAN;
    }

    text.parse::<f64>().unwrap_or(f64::NAN)
}

/// ToNumber for values already known to be primitive.  Objects give NaN.
pub fn primitive_to_number(value: &Value) -> f64 {
    match value {
        Value::Undefined => f64::NAN,
        Value::Null => 0.0,
        Value::Boolean(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::Number(n) => *n,
        Value::String(s) => string_to_number(s),
        Value::Object(_) => f64::NAN,
    }
}

pub fn to_integer(n: f64) -> f64 {
    if n.is_nan() {
        0.0
    } else {
        n.trunc()
    }
}

fn modulo_32(n: f64) -> f64 {
    if !n.is_finite() || n == 0.0 {
        return 0.0;
    }

    let wrapped = n.trunc() % TWO_32;

    if wrapped < 0.0 {
        wrapped + TWO_32
    } else {
        wrapped
    }
}

pub fn to_uint32(n: f64) -> u32 {
    modulo_32(n) as u32
}

pub fn to_int32(n: f64) -> i32 {
    modulo_32(n) as u32 as i32
}

pub fn to_uint16(n: f64) -> u16 {
    to_uint32(n) as u16
}

/// ToString on a number.
///
/// Integral values print without a fraction, and `-0` prints as `"0"`.
/// Magnitudes of at least `1e21` or below `1e-6` use exponent notation
/// (`1e+21`, `1.5e-7`).
pub fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }

    if n == 0.0 {
        return "0".to_string();
    }

    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        let mut buffer = itoa::Buffer::new();
        return buffer.format(n as i64).to_string();
    }

    // Shortest round-trip digits, then lay them out.
    let formatted = format!("{:e}", n.abs());
    let (mantissa, exponent) = formatted.split_once('e').unwrap_or((&formatted, "0"));
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let k = digits.len() as i32;
    let point = exponent.parse::<i32>().unwrap_or(0) + 1;

    let mut out = String::new();

    if n < 0.0 {
        out.push('-');
    }

    if k <= point && point <= 21 {
        out.push_str(&digits);
        out.extend(std::iter::repeat('0').take((point - k) as usize));
    } else if 0 < point && point <= 21 {
        out.push_str(&digits[..point as usize]);
        out.push('.');
        out.push_str(&digits[point as usize..]);
    } else if -6 < point && point <= 0 {
        out.push_str("0.");
        out.extend(std::iter::repeat('0').take((-point) as usize));
        out.push_str(&digits);
    } else {
        let e = point - 1;
        out.push_str(&digits[..1]);

        if k > 1 {
            out.push('.');
            out.push_str(&digits[1..]);
        }

        out.push('e');
        out.push(if e < 0 { '-' } else { '+' });
        out.push_str(&e.abs().to_string());
    }

    out
}

/// ToString for values already known to be primitive.
pub fn primitive_to_string(value: &Value) -> String {
    match value {
        Value::Undefined => "undefined".to_string(),
        Value::Null => "null".to_string(),
        Value::Boolean(b) => b.to_string(),
        Value::Number(n) => number_to_string(*n),
        Value::String(s) => s.to_string(),
        Value::Object(o) => format!("[object {}]", o.borrow().class()),
    }
}

/// The `===` operator.
pub fn strict_equal(x: &Value, y: &Value) -> bool {
    x == y
}

/// LessThan on two primitives: `None` when either side is NaN.
pub fn compare_primitives(x: &Value, y: &Value) -> Option<bool> {
    if let (Value::String(a), Value::String(b)) = (x, y) {
        return Some(a.as_ref() < b.as_ref());
    }

    let (a, b) = (primitive_to_number(x), primitive_to_number(y));

    if a.is_nan() || b.is_nan() {
        None
    } else {
        Some(a < b)
    }
}

// ─────────────────────── conversions that may run code ──────────────────────

impl Interpreter {
    /// ToPrimitive: identity for primitives, `[[DefaultValue]]` for objects.
    pub fn to_primitive(&mut self, value: &Value, hint: Option<Hint>) -> IResult<Value> {
        match value {
            Value::Object(o) => self.default_value(o, hint),
            _ => Ok(value.clone()),
        }
    }

    /// `[[DefaultValue]]`: try `valueOf` then `toString` (reversed for a
    /// string hint, and for Date objects when no hint is given).
    pub fn default_value(&mut self, object: &ObjectRef, hint: Option<Hint>) -> IResult<Value> {
        let hint = hint.unwrap_or_else(|| match object.borrow().kind {
            ObjectKind::Date(_) => Hint::String,
            _ => Hint::Number,
        });

        let order = match hint {
            Hint::String => ["toString", "valueOf"],
            Hint::Number => ["valueOf", "toString"],
        };

        for name in order {
            let method = object::get(object, name);

            if method.is_callable() {
                let result = self.call(&method, Value::Object(object.clone()), &[])?;

                if !result.is_object() {
                    return Ok(result);
                }
            }
        }

        debug!("No primitive value for {:?}", object.borrow());

        Err(self.throw_error(ErrorKind::TypeError, "Cannot convert object to primitive value"))
    }

    pub fn to_number(&mut self, value: &Value) -> IResult<f64> {
        let primitive = self.to_primitive(value, Some(Hint::Number))?;
        Ok(primitive_to_number(&primitive))
    }

    pub fn to_string(&mut self, value: &Value) -> IResult<String> {
        let primitive = self.to_primitive(value, Some(Hint::String))?;
        Ok(primitive_to_string(&primitive))
    }

    pub fn to_int32(&mut self, value: &Value) -> IResult<i32> {
        Ok(to_int32(self.to_number(value)?))
    }

    pub fn to_uint32(&mut self, value: &Value) -> IResult<u32> {
        Ok(to_uint32(self.to_number(value)?))
    }

    /// ToObject: wraps primitives; `null`/`undefined` raise a TypeError.
    pub fn to_object(&mut self, value: &Value) -> IResult<ObjectRef> {
        if value.is_nullish() {
            let message = format!("Cannot convert {} to object", value);
            return Err(self.throw_error(ErrorKind::TypeError, message));
        }

        let realm = &self.realm;

        let object = match value {
            Value::Object(o) => return Ok(o.clone()),
            Value::Undefined | Value::Null => JsObject::new(ObjectKind::Ordinary, None),
            Value::Boolean(b) => JsObject::new(
                ObjectKind::Boolean(*b),
                Some(realm.boolean_prototype.clone()),
            ),
            Value::Number(n) => JsObject::new(
                ObjectKind::Number(*n),
                Some(realm.number_prototype.clone()),
            ),
            Value::String(s) => JsObject::new(
                ObjectKind::String(s.clone()),
                Some(realm.string_prototype.clone()),
            ),
        };

        Ok(object.into_ref())
    }

    /// The `==` operator: one coercion step at a time until both sides
    /// share a type.
    pub fn abstract_equal(&mut self, x: &Value, y: &Value) -> IResult<bool> {
        let equal = match (x, y) {
            (Value::Undefined | Value::Null, Value::Undefined | Value::Null) => true,
            (Value::Number(_), Value::Number(_))
            | (Value::String(_), Value::String(_))
            | (Value::Boolean(_), Value::Boolean(_))
            | (Value::Object(_), Value::Object(_)) => strict_equal(x, y),
            (Value::Number(a), Value::String(s)) => *a == string_to_number(s),
            (Value::String(s), Value::Number(b)) => string_to_number(s) == *b,
            (Value::Boolean(_), _) => {
                let n = Value::Number(primitive_to_number(x));
                return self.abstract_equal(&n, y);
            }
            (_, Value::Boolean(_)) => {
                let n = Value::Number(primitive_to_number(y));
                return self.abstract_equal(x, &n);
            }
            (Value::Number(_) | Value::String(_), Value::Object(_)) => {
                let primitive = self.to_primitive(y, None)?;
                return self.abstract_equal(x, &primitive);
            }
            (Value::Object(_), Value::Number(_) | Value::String(_)) => {
                let primitive = self.to_primitive(x, None)?;
                return self.abstract_equal(&primitive, y);
            }
            _ => false,
        };

        Ok(equal)
    }

    /// LessThan: `None` stands for the "undefined" result (a NaN operand).
    pub fn less_than(&mut self, x: &Value, y: &Value) -> IResult<Option<bool>> {
        let px = self.to_primitive(x, Some(Hint::Number))?;
        let py = self.to_primitive(y, Some(Hint::Number))?;

        Ok(compare_primitives(&px, &py))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_to_string_boundaries() {
        assert_eq!(number_to_string(f64::NAN), "NaN");
        assert_eq!(number_to_string(f64::INFINITY), "Infinity");
        assert_eq!(number_to_string(f64::NEG_INFINITY), "-Infinity");
        assert_eq!(number_to_string(-0.0), "0");
        assert_eq!(number_to_string(1.0), "1");
        assert_eq!(number_to_string(-2.3), "-2.3");
        assert_eq!(number_to_string(0.5), "0.5");
        assert_eq!(number_to_string(123.456), "123.456");
        assert_eq!(number_to_string(1e21), "1e+21");
        assert_eq!(number_to_string(1.5e-7), "1.5e-7");
        assert_eq!(number_to_string(0.000001), "0.000001");
    }

    #[test]
    fn string_to_number_grammar() {
        assert_eq!(string_to_number(""), 0.0);
        assert_eq!(string_to_number("  42  "), 42.0);
        assert_eq!(string_to_number("0x1F"), 31.0);
        assert_eq!(string_to_number("-Infinity"), f64::NEG_INFINITY);
        assert_eq!(string_to_number("1e3"), 1000.0);
        assert!(string_to_number("inf").is_nan());
        assert!(string_to_number("nan").is_nan());
        assert!(string_to_number("12px").is_nan());
    }

    #[test]
    fn int32_wraparound() {
        assert_eq!(to_int32(4_294_967_296.0), 0);
        assert_eq!(to_int32(2_147_483_648.0), -2_147_483_648);
        assert_eq!(to_int32(-1.0), -1);
        assert_eq!(to_uint32(-1.0), 4_294_967_295);
        assert_eq!(to_int32(f64::NAN), 0);
        assert_eq!(to_int32(3.7), 3);
        assert_eq!(to_uint16(65_537.0), 1);
    }

    #[test]
    fn truthiness() {
        assert!(!to_boolean(&Value::Number(f64::NAN)));
        assert!(!to_boolean(&Value::string("")));
        assert!(to_boolean(&Value::string("0")));
        assert!(!to_boolean(&Value::Null));
    }

    #[test]
    fn primitive_comparison() {
        assert_eq!(compare_primitives(&Value::string("a"), &Value::string("ab")), Some(true));
        assert_eq!(compare_primitives(&Value::Number(1.0), &Value::string("2")), Some(true));
        assert_eq!(compare_primitives(&Value::Number(f64::NAN), &Value::Number(1.0)), None);
    }
}
