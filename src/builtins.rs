//! Native constructors, prototype methods and global functions.
//!
//! Every native is a plain [`NativeFn`](crate::object::NativeFn).  `this` is
//! already an object when a native runs through [`Interpreter::call`];
//! constructors invoked through `new` receive `undefined` instead.

use crate::coerce::{self, to_integer, to_uint16, to_uint32};
use crate::interpreter::{IResult, Interpreter};
use crate::object::{self, Attributes, Function, JsObject, ObjectKind};
use crate::printer;
use crate::realm::{ErrorKind, Realm};
use crate::value::{ObjectRef, Value};

use chrono::{DateTime, Utc};
use log::{debug, info};

/// Populate the realm's global object.
pub(crate) fn install(realm: &Realm) {
    info!("Installing native objects");

    install_object(realm);
    install_function(realm);
    install_array(realm);
    install_string(realm);
    install_number(realm);
    install_boolean(realm);
    install_errors(realm);
    install_math(realm);
    install_date(realm);
    install_regexp(realm);
    install_globals(realm);
}

/// `Function.prototype` itself: accepts anything, returns `undefined`.
pub(crate) fn function_prototype(_: &mut Interpreter, _: &Value, _: &[Value]) -> IResult<Value> {
    Ok(Value::Undefined)
}

fn arg(args: &[Value], index: usize) -> Value {
    args.get(index).cloned().unwrap_or(Value::Undefined)
}

fn this_object(interp: &mut Interpreter, this: &Value) -> IResult<ObjectRef> {
    interp.to_object(this)
}

fn length_of(interp: &mut Interpreter, object: &ObjectRef) -> IResult<u32> {
    let length = object::get(object, "length");
    interp.to_uint32(&length)
}

/// Resolve a possibly negative relative position against `len`.
fn relative(position: f64, len: f64) -> f64 {
    if position < 0.0 {
        (len + position).max(0.0)
    } else {
        position.min(len)
    }
}

fn integer_arg(interp: &mut Interpreter, args: &[Value], index: usize) -> IResult<f64> {
    let value = arg(args, index);
    Ok(to_integer(interp.to_number(&value)?))
}

// ───────────────────────────────── Object ─────────────────────────────────

fn install_object(realm: &Realm) {
    let proto = &realm.object_prototype;

    realm.constructor("Object", 1, object_construct, object_construct, proto);
    realm.method(proto, "toString", 0, object_to_string);
    realm.method(proto, "valueOf", 0, object_value_of);
    realm.method(proto, "hasOwnProperty", 1, object_has_own_property);
    realm.method(proto, "isPrototypeOf", 1, object_is_prototype_of);
    realm.method(proto, "propertyIsEnumerable", 1, object_property_is_enumerable);
}

fn object_construct(interp: &mut Interpreter, _: &Value, args: &[Value]) -> IResult<Value> {
    let value = arg(args, 0);

    if value.is_nullish() {
        return Ok(Value::Object(interp.new_object()));
    }

    Ok(Value::Object(interp.to_object(&value)?))
}

fn object_to_string(interp: &mut Interpreter, this: &Value, _: &[Value]) -> IResult<Value> {
    let object = this_object(interp, this)?;
    let class = object.borrow().class();
    Ok(Value::from(format!("[object {}]", class)))
}

fn object_value_of(interp: &mut Interpreter, this: &Value, _: &[Value]) -> IResult<Value> {
    Ok(Value::Object(this_object(interp, this)?))
}

fn object_has_own_property(interp: &mut Interpreter, this: &Value, args: &[Value]) -> IResult<Value> {
    let object = this_object(interp, this)?;
    let key = interp.to_string(&arg(args, 0))?;
    let own = object.borrow().has_own(&key);
    Ok(Value::Boolean(own))
}

fn object_is_prototype_of(interp: &mut Interpreter, this: &Value, args: &[Value]) -> IResult<Value> {
    let object = this_object(interp, this)?;

    match arg(args, 0) {
        Value::Object(candidate) => Ok(Value::Boolean(object::inherits_from(&candidate, &object))),
        _ => Ok(Value::Boolean(false)),
    }
}

fn object_property_is_enumerable(interp: &mut Interpreter, this: &Value, args: &[Value]) -> IResult<Value> {
    let object = this_object(interp, this)?;
    let key = interp.to_string(&arg(args, 0))?;

    let enumerable = object
        .borrow()
        .get_own(&key)
        .is_some_and(|p| !p.attributes.dont_enum);

    Ok(Value::Boolean(enumerable))
}

// ──────────────────────────────── Function ────────────────────────────────

fn install_function(realm: &Realm) {
    let proto = &realm.function_prototype;

    realm.constructor("Function", 1, function_construct, function_construct, proto);
    realm.method(proto, "toString", 0, function_to_string);
    realm.method(proto, "call", 1, function_call);
    realm.method(proto, "apply", 2, function_apply);
}

/// `Function(p1, …, pn, body)`.
fn function_construct(interp: &mut Interpreter, _: &Value, args: &[Value]) -> IResult<Value> {
    let (body, params) = match args.split_last() {
        Some((body, params)) => (interp.to_string(body)?, params),
        None => (String::new(), args),
    };

    let mut names = Vec::with_capacity(params.len());

    for param in params {
        names.push(interp.to_string(param)?);
    }

    interp.compile_function(&names.join(","), &body)
}

fn function_to_string(interp: &mut Interpreter, this: &Value, _: &[Value]) -> IResult<Value> {
    let function = this.as_object().and_then(|o| o.borrow().function().cloned());

    match function {
        Some(Function::Script { node, .. }) => Ok(Value::from(printer::function_source(&node))),
        Some(Function::Native { name, .. }) => Ok(Value::from(format!(
            "function {}() {{ [native code] }}",
            name
        ))),
        None => Err(interp.throw_error(
            ErrorKind::TypeError,
            "Function.prototype.toString called on a non-function",
        )),
    }
}

fn function_call(interp: &mut Interpreter, this: &Value, args: &[Value]) -> IResult<Value> {
    let rest = args.get(1..).unwrap_or(&[]);
    interp.call(this, arg(args, 0), rest)
}

fn function_apply(interp: &mut Interpreter, this: &Value, args: &[Value]) -> IResult<Value> {
    let list = match arg(args, 1) {
        Value::Undefined | Value::Null => Vec::new(),
        Value::Object(o) if matches!(o.borrow().kind, ObjectKind::Array | ObjectKind::Arguments) => {
            let length = length_of(interp, &o)?;
            (0..length).map(|i| object::get(&o, &i.to_string())).collect()
        }
        _ => {
            return Err(interp.throw_error(
                ErrorKind::TypeError,
                "second argument to Function.prototype.apply must be an array",
            ));
        }
    };

    interp.call(this, arg(args, 0), &list)
}

// ───────────────────────────────── Array ──────────────────────────────────

fn install_array(realm: &Realm) {
    let proto = &realm.array_prototype;

    realm.constructor("Array", 1, array_construct, array_construct, proto);
    realm.method(proto, "toString", 0, array_to_string);
    realm.method(proto, "join", 1, array_join);
    realm.method(proto, "push", 1, array_push);
    realm.method(proto, "pop", 0, array_pop);
    realm.method(proto, "concat", 1, array_concat);
    realm.method(proto, "slice", 2, array_slice);
    realm.method(proto, "reverse", 0, array_reverse);
    realm.method(proto, "shift", 0, array_shift);
    realm.method(proto, "unshift", 1, array_unshift);
    realm.method(proto, "indexOf", 1, array_index_of);
}

fn array_construct(interp: &mut Interpreter, _: &Value, args: &[Value]) -> IResult<Value> {
    match args {
        [Value::Number(n)] => {
            if f64::from(to_uint32(*n)) != *n {
                return Err(interp.throw_error(ErrorKind::RangeError, "Invalid array length"));
            }

            let array = interp.new_array(Vec::new());
            interp.put(&array, "length", Value::Number(*n))?;
            Ok(Value::Object(array))
        }
        _ => Ok(Value::Object(interp.new_array(args.to_vec()))),
    }
}

fn array_to_string(interp: &mut Interpreter, this: &Value, _: &[Value]) -> IResult<Value> {
    array_join(interp, this, &[])
}

fn array_join(interp: &mut Interpreter, this: &Value, args: &[Value]) -> IResult<Value> {
    let object = this_object(interp, this)?;
    let length = length_of(interp, &object)?;

    let separator = match arg(args, 0) {
        Value::Undefined => ",".to_string(),
        other => interp.to_string(&other)?,
    };

    let mut joined = String::new();

    for i in 0..length {
        if i > 0 {
            joined.push_str(&separator);
        }

        let element = object::get(&object, &i.to_string());

        if !element.is_nullish() {
            joined.push_str(&interp.to_string(&element)?);
        }
    }

    Ok(Value::from(joined))
}

fn array_push(interp: &mut Interpreter, this: &Value, args: &[Value]) -> IResult<Value> {
    let object = this_object(interp, this)?;
    let mut length = f64::from(length_of(interp, &object)?);

    for value in args {
        interp.put(&object, &coerce::number_to_string(length), value.clone())?;
        length += 1.0;
    }

    interp.put(&object, "length", Value::Number(length))?;
    Ok(Value::Number(length))
}

fn array_pop(interp: &mut Interpreter, this: &Value, _: &[Value]) -> IResult<Value> {
    let object = this_object(interp, this)?;
    let length = length_of(interp, &object)?;

    if length == 0 {
        interp.put(&object, "length", Value::Number(0.0))?;
        return Ok(Value::Undefined);
    }

    let key = (length - 1).to_string();
    let value = object::get(&object, &key);
    object::delete(&object, &key);
    interp.put(&object, "length", Value::Number(f64::from(length - 1)))?;

    Ok(value)
}

fn array_concat(interp: &mut Interpreter, this: &Value, args: &[Value]) -> IResult<Value> {
    let first = Value::Object(this_object(interp, this)?);
    let mut elements = Vec::new();

    for item in std::iter::once(&first).chain(args) {
        match item {
            Value::Object(o) if matches!(o.borrow().kind, ObjectKind::Array) => {
                let length = o.borrow().array_length();
                elements.extend((0..length).map(|i| object::get(o, &i.to_string())));
            }
            other => elements.push(other.clone()),
        }
    }

    Ok(Value::Object(interp.new_array(elements)))
}

fn array_slice(interp: &mut Interpreter, this: &Value, args: &[Value]) -> IResult<Value> {
    let object = this_object(interp, this)?;
    let length = f64::from(length_of(interp, &object)?);

    let start = relative(integer_arg(interp, args, 0)?, length);
    let end = match arg(args, 1) {
        Value::Undefined => length,
        _ => relative(integer_arg(interp, args, 1)?, length),
    };

    let mut elements = Vec::new();
    let mut k = start;

    while k < end {
        elements.push(object::get(&object, &coerce::number_to_string(k)));
        k += 1.0;
    }

    Ok(Value::Object(interp.new_array(elements)))
}

fn array_reverse(interp: &mut Interpreter, this: &Value, _: &[Value]) -> IResult<Value> {
    let object = this_object(interp, this)?;
    let length = length_of(interp, &object)?;

    let mut lower = 0;

    while lower < length / 2 {
        let upper = length - lower - 1;
        let (lower_key, upper_key) = (lower.to_string(), upper.to_string());

        let lower_value = object::has_property(&object, &lower_key).then(|| object::get(&object, &lower_key));
        let upper_value = object::has_property(&object, &upper_key).then(|| object::get(&object, &upper_key));

        match upper_value {
            Some(value) => interp.put(&object, &lower_key, value)?,
            None => {
                object::delete(&object, &lower_key);
            }
        }

        match lower_value {
            Some(value) => interp.put(&object, &upper_key, value)?,
            None => {
                object::delete(&object, &upper_key);
            }
        }

        lower += 1;
    }

    Ok(Value::Object(object))
}

fn array_shift(interp: &mut Interpreter, this: &Value, _: &[Value]) -> IResult<Value> {
    let object = this_object(interp, this)?;
    let length = length_of(interp, &object)?;

    if length == 0 {
        interp.put(&object, "length", Value::Number(0.0))?;
        return Ok(Value::Undefined);
    }

    let first = object::get(&object, "0");

    for k in 1..length {
        let (from, to) = (k.to_string(), (k - 1).to_string());

        if object::has_property(&object, &from) {
            let value = object::get(&object, &from);
            interp.put(&object, &to, value)?;
        } else {
            object::delete(&object, &to);
        }
    }

    object::delete(&object, &(length - 1).to_string());
    interp.put(&object, "length", Value::Number(f64::from(length - 1)))?;

    Ok(first)
}

fn array_unshift(interp: &mut Interpreter, this: &Value, args: &[Value]) -> IResult<Value> {
    let object = this_object(interp, this)?;
    let length = f64::from(length_of(interp, &object)?);
    let count = args.len() as f64;

    let mut k = length;

    while k > 0.0 {
        let from = coerce::number_to_string(k - 1.0);
        let to = coerce::number_to_string(k + count - 1.0);

        if object::has_property(&object, &from) {
            let value = object::get(&object, &from);
            interp.put(&object, &to, value)?;
        } else {
            object::delete(&object, &to);
        }

        k -= 1.0;
    }

    for (i, value) in args.iter().enumerate() {
        interp.put(&object, &i.to_string(), value.clone())?;
    }

    interp.put(&object, "length", Value::Number(length + count))?;
    Ok(Value::Number(length + count))
}

fn array_index_of(interp: &mut Interpreter, this: &Value, args: &[Value]) -> IResult<Value> {
    let object = this_object(interp, this)?;
    let length = f64::from(length_of(interp, &object)?);
    let search = arg(args, 0);

    let mut k = relative(integer_arg(interp, args, 1)?, length);

    while k < length {
        let key = coerce::number_to_string(k);

        if object::has_property(&object, &key) && coerce::strict_equal(&object::get(&object, &key), &search) {
            return Ok(Value::Number(k));
        }

        k += 1.0;
    }

    Ok(Value::Number(-1.0))
}

// ───────────────────────────────── String ─────────────────────────────────

fn install_string(realm: &Realm) {
    let proto = &realm.string_prototype;

    let constructor = realm.constructor("String", 1, string_call, string_construct, proto);
    realm.method(&constructor, "fromCharCode", 1, string_from_char_code);

    realm.method(proto, "toString", 0, string_value_of);
    realm.method(proto, "valueOf", 0, string_value_of);
    realm.method(proto, "charAt", 1, string_char_at);
    realm.method(proto, "charCodeAt", 1, string_char_code_at);
    realm.method(proto, "indexOf", 1, string_index_of);
    realm.method(proto, "lastIndexOf", 1, string_last_index_of);
    realm.method(proto, "substr", 2, string_substr);
    realm.method(proto, "substring", 2, string_substring);
    realm.method(proto, "slice", 2, string_slice);
    realm.method(proto, "toUpperCase", 0, string_to_upper_case);
    realm.method(proto, "toLowerCase", 0, string_to_lower_case);
    realm.method(proto, "split", 2, string_split);
    realm.method(proto, "concat", 1, string_concat);
}

/// Strings are indexed by UTF-16 code unit.
fn units(s: &str) -> Vec<u16> {
    s.encode_utf16().collect()
}

fn from_units(units: &[u16]) -> Value {
    Value::from(String::from_utf16_lossy(units))
}

fn find_units(haystack: &[u16], needle: &[u16], from: usize) -> Option<usize> {
    if haystack.len() < needle.len() {
        return None;
    }

    (from..=haystack.len() - needle.len()).find(|&i| haystack[i..].starts_with(needle))
}

fn rfind_units(haystack: &[u16], needle: &[u16], from: usize) -> Option<usize> {
    if haystack.len() < needle.len() {
        return None;
    }

    let last = from.min(haystack.len() - needle.len());
    (0..=last).rev().find(|&i| haystack[i..].starts_with(needle))
}

/// ToString of `this`, for the generic String.prototype methods.
fn this_string(interp: &mut Interpreter, this: &Value) -> IResult<String> {
    if let Value::Object(o) = this {
        if let ObjectKind::String(s) = &o.borrow().kind {
            return Ok(s.to_string());
        }
    }

    interp.to_string(this)
}

fn string_call(interp: &mut Interpreter, _: &Value, args: &[Value]) -> IResult<Value> {
    match args.first() {
        None => Ok(Value::string("")),
        Some(value) => Ok(Value::from(interp.to_string(value)?)),
    }
}

fn string_construct(interp: &mut Interpreter, _: &Value, args: &[Value]) -> IResult<Value> {
    let value = match args.first() {
        None => String::new(),
        Some(value) => interp.to_string(value)?,
    };

    let wrapper = JsObject::new(
        ObjectKind::String(value.into()),
        Some(interp.realm.string_prototype.clone()),
    );

    Ok(Value::Object(wrapper.into_ref()))
}

fn string_from_char_code(interp: &mut Interpreter, _: &Value, args: &[Value]) -> IResult<Value> {
    let mut codes = Vec::with_capacity(args.len());

    for value in args {
        codes.push(to_uint16(interp.to_number(value)?));
    }

    Ok(from_units(&codes))
}

fn string_value_of(interp: &mut Interpreter, this: &Value, _: &[Value]) -> IResult<Value> {
    if let Value::Object(o) = this {
        if let ObjectKind::String(s) = &o.borrow().kind {
            return Ok(Value::String(s.clone()));
        }
    }

    Err(interp.throw_error(
        ErrorKind::TypeError,
        "String.prototype.valueOf requires a String",
    ))
}

fn string_char_at(interp: &mut Interpreter, this: &Value, args: &[Value]) -> IResult<Value> {
    let s = units(&this_string(interp, this)?);
    let position = integer_arg(interp, args, 0)?;

    if position < 0.0 || position >= s.len() as f64 {
        return Ok(Value::string(""));
    }

    let i = position as usize;
    Ok(from_units(&s[i..i + 1]))
}

fn string_char_code_at(interp: &mut Interpreter, this: &Value, args: &[Value]) -> IResult<Value> {
    let s = units(&this_string(interp, this)?);
    let position = integer_arg(interp, args, 0)?;

    if position < 0.0 || position >= s.len() as f64 {
        return Ok(Value::Number(f64::NAN));
    }

    Ok(Value::Number(f64::from(s[position as usize])))
}

fn string_index_of(interp: &mut Interpreter, this: &Value, args: &[Value]) -> IResult<Value> {
    let s = units(&this_string(interp, this)?);
    let search = units(&interp.to_string(&arg(args, 0))?);
    let from = integer_arg(interp, args, 1)?.clamp(0.0, s.len() as f64) as usize;

    Ok(Value::Number(
        find_units(&s, &search, from).map_or(-1.0, |i| i as f64),
    ))
}

fn string_last_index_of(interp: &mut Interpreter, this: &Value, args: &[Value]) -> IResult<Value> {
    let s = units(&this_string(interp, this)?);
    let search = units(&interp.to_string(&arg(args, 0))?);

    let position = interp.to_number(&arg(args, 1))?;
    let from = if position.is_nan() {
        s.len()
    } else {
        to_integer(position).clamp(0.0, s.len() as f64) as usize
    };

    Ok(Value::Number(
        rfind_units(&s, &search, from).map_or(-1.0, |i| i as f64),
    ))
}

/// `substr(start, length)`; a negative start counts from the end.
fn string_substr(interp: &mut Interpreter, this: &Value, args: &[Value]) -> IResult<Value> {
    let s = units(&this_string(interp, this)?);
    let len = s.len() as f64;

    let start = relative(integer_arg(interp, args, 0)?, len);
    let count = match arg(args, 1) {
        Value::Undefined => len - start,
        _ => integer_arg(interp, args, 1)?.max(0.0).min(len - start),
    };

    if count <= 0.0 {
        return Ok(Value::string(""));
    }

    let start = start as usize;
    Ok(from_units(&s[start..start + count as usize]))
}

fn string_substring(interp: &mut Interpreter, this: &Value, args: &[Value]) -> IResult<Value> {
    let s = units(&this_string(interp, this)?);
    let len = s.len() as f64;

    let start = integer_arg(interp, args, 0)?.clamp(0.0, len);
    let end = match arg(args, 1) {
        Value::Undefined => len,
        _ => integer_arg(interp, args, 1)?.clamp(0.0, len),
    };

    let (from, to) = if start <= end { (start, end) } else { (end, start) };
    Ok(from_units(&s[from as usize..to as usize]))
}

fn string_slice(interp: &mut Interpreter, this: &Value, args: &[Value]) -> IResult<Value> {
    let s = units(&this_string(interp, this)?);
    let len = s.len() as f64;

    let start = relative(integer_arg(interp, args, 0)?, len);
    let end = match arg(args, 1) {
        Value::Undefined => len,
        _ => relative(integer_arg(interp, args, 1)?, len),
    };

    if start >= end {
        return Ok(Value::string(""));
    }

    Ok(from_units(&s[start as usize..end as usize]))
}

fn string_to_upper_case(interp: &mut Interpreter, this: &Value, _: &[Value]) -> IResult<Value> {
    Ok(Value::from(this_string(interp, this)?.to_uppercase()))
}

fn string_to_lower_case(interp: &mut Interpreter, this: &Value, _: &[Value]) -> IResult<Value> {
    Ok(Value::from(this_string(interp, this)?.to_lowercase()))
}

/// `split(separator, limit)` with a string separator.
fn string_split(interp: &mut Interpreter, this: &Value, args: &[Value]) -> IResult<Value> {
    let s = this_string(interp, this)?;

    let limit = match arg(args, 1) {
        Value::Undefined => u32::MAX,
        other => interp.to_uint32(&other)?,
    } as usize;

    let pieces: Vec<Value> = match arg(args, 0) {
        Value::Undefined => vec![Value::from(s)],
        separator => {
            let separator = interp.to_string(&separator)?;

            if separator.is_empty() {
                s.encode_utf16().map(|u| from_units(&[u])).collect()
            } else {
                s.split(separator.as_str()).map(Value::string).collect()
            }
        }
    };

    Ok(Value::Object(
        interp.new_array(pieces.into_iter().take(limit).collect()),
    ))
}

fn string_concat(interp: &mut Interpreter, this: &Value, args: &[Value]) -> IResult<Value> {
    let mut s = this_string(interp, this)?;

    for value in args {
        s.push_str(&interp.to_string(value)?);
    }

    Ok(Value::from(s))
}

// ───────────────────────────────── Number ─────────────────────────────────

fn install_number(realm: &Realm) {
    let proto = &realm.number_prototype;

    let constructor = realm.constructor("Number", 1, number_call, number_construct, proto);

    realm.constant(&constructor, "MAX_VALUE", Value::Number(f64::MAX));
    realm.constant(&constructor, "MIN_VALUE", Value::Number(5e-324));
    realm.constant(&constructor, "NaN", Value::Number(f64::NAN));
    realm.constant(&constructor, "POSITIVE_INFINITY", Value::Number(f64::INFINITY));
    realm.constant(&constructor, "NEGATIVE_INFINITY", Value::Number(f64::NEG_INFINITY));

    realm.method(proto, "toString", 1, number_to_string);
    realm.method(proto, "valueOf", 0, number_value_of);
    realm.method(proto, "toFixed", 1, number_to_fixed);
}

fn number_call(interp: &mut Interpreter, _: &Value, args: &[Value]) -> IResult<Value> {
    match args.first() {
        None => Ok(Value::Number(0.0)),
        Some(value) => Ok(Value::Number(interp.to_number(value)?)),
    }
}

fn number_construct(interp: &mut Interpreter, this: &Value, args: &[Value]) -> IResult<Value> {
    let Value::Number(n) = number_call(interp, this, args)? else {
        return Ok(Value::Undefined);
    };

    let wrapper = JsObject::new(
        ObjectKind::Number(n),
        Some(interp.realm.number_prototype.clone()),
    );

    Ok(Value::Object(wrapper.into_ref()))
}

fn this_number(interp: &mut Interpreter, this: &Value, method: &str) -> IResult<f64> {
    if let Value::Object(o) = this {
        if let ObjectKind::Number(n) = o.borrow().kind {
            return Ok(n);
        }
    }

    Err(interp.throw_error(
        ErrorKind::TypeError,
        format!("Number.prototype.{} requires a Number", method),
    ))
}

fn number_value_of(interp: &mut Interpreter, this: &Value, _: &[Value]) -> IResult<Value> {
    Ok(Value::Number(this_number(interp, this, "valueOf")?))
}

fn number_to_string(interp: &mut Interpreter, this: &Value, args: &[Value]) -> IResult<Value> {
    let n = this_number(interp, this, "toString")?;

    let radix = match arg(args, 0) {
        Value::Undefined => 10.0,
        _ => integer_arg(interp, args, 0)?,
    };

    if !(2.0..=36.0).contains(&radix) {
        return Err(interp.throw_error(
            ErrorKind::RangeError,
            "toString() radix must be between 2 and 36",
        ));
    }

    if radix == 10.0 || !n.is_finite() {
        return Ok(Value::from(coerce::number_to_string(n)));
    }

    Ok(Value::from(to_radix_string(n, radix as u32)))
}

/// Digits of `n` in `radix`, with at most 52 fractional digits.
fn to_radix_string(n: f64, radix: u32) -> String {
    let base = f64::from(radix);
    let negative = n < 0.0;
    let n = n.abs();

    let mut integer = n.trunc();
    let mut fraction = n - integer;

    let mut digits = Vec::new();

    loop {
        let digit = (integer % base) as u32;
        digits.push(char::from_digit(digit, radix).unwrap_or('0'));
        integer = (integer / base).trunc();

        if integer < 1.0 {
            break;
        }
    }

    if negative {
        digits.push('-');
    }

    let mut out: String = digits.into_iter().rev().collect();

    if fraction > 0.0 {
        out.push('.');

        for _ in 0..52 {
            fraction *= base;
            let digit = fraction.trunc();
            out.push(char::from_digit(digit as u32, radix).unwrap_or('0'));
            fraction -= digit;

            if fraction <= 0.0 {
                break;
            }
        }
    }

    out
}

fn number_to_fixed(interp: &mut Interpreter, this: &Value, args: &[Value]) -> IResult<Value> {
    let n = this_number(interp, this, "toFixed")?;
    let digits = integer_arg(interp, args, 0)?;

    if !(0.0..=20.0).contains(&digits) {
        return Err(interp.throw_error(
            ErrorKind::RangeError,
            "toFixed() digits argument must be between 0 and 20",
        ));
    }

    if !n.is_finite() || n.abs() >= 1e21 {
        return Ok(Value::from(coerce::number_to_string(n)));
    }

    Ok(Value::from(format!("{:.*}", digits as usize, n)))
}

// ──────────────────────────────── Boolean ─────────────────────────────────

fn install_boolean(realm: &Realm) {
    let proto = &realm.boolean_prototype;

    realm.constructor("Boolean", 1, boolean_call, boolean_construct, proto);
    realm.method(proto, "toString", 0, boolean_to_string);
    realm.method(proto, "valueOf", 0, boolean_value_of);
}

fn boolean_call(_: &mut Interpreter, _: &Value, args: &[Value]) -> IResult<Value> {
    Ok(Value::Boolean(coerce::to_boolean(&arg(args, 0))))
}

fn boolean_construct(interp: &mut Interpreter, _: &Value, args: &[Value]) -> IResult<Value> {
    let wrapper = JsObject::new(
        ObjectKind::Boolean(coerce::to_boolean(&arg(args, 0))),
        Some(interp.realm.boolean_prototype.clone()),
    );

    Ok(Value::Object(wrapper.into_ref()))
}

fn this_boolean(interp: &mut Interpreter, this: &Value) -> IResult<bool> {
    if let Value::Object(o) = this {
        if let ObjectKind::Boolean(b) = o.borrow().kind {
            return Ok(b);
        }
    }

    Err(interp.throw_error(
        ErrorKind::TypeError,
        "Boolean.prototype method called on incompatible receiver",
    ))
}

fn boolean_to_string(interp: &mut Interpreter, this: &Value, _: &[Value]) -> IResult<Value> {
    Ok(Value::string(if this_boolean(interp, this)? { "true" } else { "false" }))
}

fn boolean_value_of(interp: &mut Interpreter, this: &Value, _: &[Value]) -> IResult<Value> {
    Ok(Value::Boolean(this_boolean(interp, this)?))
}

// ───────────────────────────────── Errors ─────────────────────────────────

/// One constructor per [`ErrorKind::ALL`] slot; `new` and plain calls agree.
const ERROR_CONSTRUCTORS: [crate::object::NativeFn; 7] = [
    error_construct::<0>,
    error_construct::<1>,
    error_construct::<2>,
    error_construct::<3>,
    error_construct::<4>,
    error_construct::<5>,
    error_construct::<6>,
];

fn install_errors(realm: &Realm) {
    for (kind, construct) in ErrorKind::ALL.into_iter().zip(ERROR_CONSTRUCTORS) {
        let proto = realm.error_prototype(kind);

        realm.constructor(kind.name(), 1, construct, construct, &proto);
        proto
            .borrow_mut()
            .define("name", Value::string(kind.name()), Attributes::DONT_ENUM);
    }

    let base = realm.error_prototype(ErrorKind::Error);
    base.borrow_mut()
        .define("message", Value::string(""), Attributes::DONT_ENUM);
    realm.method(&base, "toString", 0, error_to_string);
}

fn error_construct<const K: usize>(interp: &mut Interpreter, _: &Value, args: &[Value]) -> IResult<Value> {
    let message = match arg(args, 0) {
        Value::Undefined => String::new(),
        other => interp.to_string(&other)?,
    };

    Ok(Value::Object(interp.realm.new_error(ErrorKind::ALL[K], &message)))
}

/// `name: message`, or just `name` when the message is empty.
fn error_to_string(interp: &mut Interpreter, this: &Value, _: &[Value]) -> IResult<Value> {
    let object = this_object(interp, this)?;

    let name = interp.to_string(&object::get(&object, "name"))?;
    let message = interp.to_string(&object::get(&object, "message"))?;

    if message.is_empty() {
        Ok(Value::from(name))
    } else {
        Ok(Value::from(format!("{}: {}", name, message)))
    }
}

// ────────────────────────────────── Math ──────────────────────────────────

fn install_math(realm: &Realm) {
    let math = JsObject::new(ObjectKind::Math, Some(realm.object_prototype.clone())).into_ref();

    realm.constant(&math, "PI", Value::Number(std::f64::consts::PI));
    realm.constant(&math, "E", Value::Number(std::f64::consts::E));

    realm.method(&math, "abs", 1, |i, _, a| unary_math(i, a, f64::abs));
    realm.method(&math, "floor", 1, |i, _, a| unary_math(i, a, f64::floor));
    realm.method(&math, "ceil", 1, |i, _, a| unary_math(i, a, f64::ceil));
    realm.method(&math, "round", 1, |i, _, a| unary_math(i, a, |x| (x + 0.5).floor()));
    realm.method(&math, "sqrt", 1, |i, _, a| unary_math(i, a, f64::sqrt));
    realm.method(&math, "sin", 1, |i, _, a| unary_math(i, a, f64::sin));
    realm.method(&math, "cos", 1, |i, _, a| unary_math(i, a, f64::cos));
    realm.method(&math, "tan", 1, |i, _, a| unary_math(i, a, f64::tan));
    realm.method(&math, "atan", 1, |i, _, a| unary_math(i, a, f64::atan));
    realm.method(&math, "exp", 1, |i, _, a| unary_math(i, a, f64::exp));
    realm.method(&math, "log", 1, |i, _, a| unary_math(i, a, f64::ln));
    realm.method(&math, "pow", 2, math_pow);
    realm.method(&math, "min", 2, |i, _, a| fold_math(i, a, f64::INFINITY, f64::min));
    realm.method(&math, "max", 2, |i, _, a| fold_math(i, a, f64::NEG_INFINITY, f64::max));
    realm.method(&math, "random", 0, math_random);

    realm
        .global
        .borrow_mut()
        .define("Math", Value::Object(math), Attributes::DONT_ENUM);
}

fn unary_math(interp: &mut Interpreter, args: &[Value], f: fn(f64) -> f64) -> IResult<Value> {
    let x = interp.to_number(&arg(args, 0))?;
    Ok(Value::Number(f(x)))
}

/// `min`/`max`: any NaN argument makes the result NaN.
fn fold_math(interp: &mut Interpreter, args: &[Value], init: f64, f: fn(f64, f64) -> f64) -> IResult<Value> {
    let mut result = init;

    for value in args {
        let x = interp.to_number(value)?;

        if x.is_nan() {
            return Ok(Value::Number(f64::NAN));
        }

        result = f(result, x);
    }

    Ok(Value::Number(result))
}

fn math_pow(interp: &mut Interpreter, _: &Value, args: &[Value]) -> IResult<Value> {
    let base = interp.to_number(&arg(args, 0))?;
    let exponent = interp.to_number(&arg(args, 1))?;

    // 1 ** NaN and (±1) ** ±Infinity are NaN here, unlike powf.
    if exponent.is_nan() || (base.abs() == 1.0 && exponent.is_infinite()) {
        return Ok(Value::Number(f64::NAN));
    }

    Ok(Value::Number(base.powf(exponent)))
}

fn math_random(_: &mut Interpreter, _: &Value, _: &[Value]) -> IResult<Value> {
    Ok(Value::Number(rand::random::<f64>()))
}

// ────────────────────────────────── Date ──────────────────────────────────

fn install_date(realm: &Realm) {
    let proto = &realm.date_prototype;

    let constructor = realm.constructor("Date", 1, date_call, date_construct, proto);
    realm.method(&constructor, "now", 0, date_now);

    realm.method(proto, "getTime", 0, date_get_time);
    realm.method(proto, "valueOf", 0, date_get_time);
    realm.method(proto, "toString", 0, date_to_string);
}

fn now_millis() -> f64 {
    Utc::now().timestamp_millis() as f64
}

fn format_time(millis: f64) -> String {
    if !millis.is_finite() {
        return "Invalid Date".to_string();
    }

    match DateTime::<Utc>::from_timestamp_millis(millis as i64) {
        Some(time) => time.format("%a %b %d %Y %H:%M:%S GMT+0000").to_string(),
        None => "Invalid Date".to_string(),
    }
}

fn date_call(_: &mut Interpreter, _: &Value, _: &[Value]) -> IResult<Value> {
    Ok(Value::from(format_time(now_millis())))
}

fn date_construct(interp: &mut Interpreter, _: &Value, args: &[Value]) -> IResult<Value> {
    let millis = match args.first() {
        None => now_millis(),
        Some(value) => {
            let millis = interp.to_number(value)?;

            if millis.is_finite() {
                millis.trunc()
            } else {
                f64::NAN
            }
        }
    };

    debug!("New Date at {}", millis);

    let date = JsObject::new(
        ObjectKind::Date(millis),
        Some(interp.realm.date_prototype.clone()),
    );

    Ok(Value::Object(date.into_ref()))
}

fn date_now(_: &mut Interpreter, _: &Value, _: &[Value]) -> IResult<Value> {
    Ok(Value::Number(now_millis()))
}

fn this_time(interp: &mut Interpreter, this: &Value) -> IResult<f64> {
    if let Value::Object(o) = this {
        if let ObjectKind::Date(millis) = o.borrow().kind {
            return Ok(millis);
        }
    }

    Err(interp.throw_error(ErrorKind::TypeError, "this is not a Date object."))
}

fn date_get_time(interp: &mut Interpreter, this: &Value, _: &[Value]) -> IResult<Value> {
    Ok(Value::Number(this_time(interp, this)?))
}

fn date_to_string(interp: &mut Interpreter, this: &Value, _: &[Value]) -> IResult<Value> {
    Ok(Value::from(format_time(this_time(interp, this)?)))
}

// ───────────────────────────────── RegExp ─────────────────────────────────

fn install_regexp(realm: &Realm) {
    realm.constructor("RegExp", 2, regexp_construct, regexp_construct, &realm.regexp_prototype);
}

fn regexp_construct(interp: &mut Interpreter, _: &Value, args: &[Value]) -> IResult<Value> {
    let source = match arg(args, 0) {
        Value::Undefined => String::new(),
        other => interp.to_string(&other)?,
    };

    let flags = match arg(args, 1) {
        Value::Undefined => String::new(),
        other => interp.to_string(&other)?,
    };

    Ok(Value::Object(interp.new_regexp(&format!("/{}/{}", source, flags))))
}

// ───────────────────────────────── Globals ────────────────────────────────

fn install_globals(realm: &Realm) {
    let global = &realm.global;

    for (name, value) in [
        ("NaN", Value::Number(f64::NAN)),
        ("Infinity", Value::Number(f64::INFINITY)),
        ("undefined", Value::Undefined),
    ] {
        global.borrow_mut().define(name, value, Attributes::HIDDEN);
    }

    realm.method(global, "isNaN", 1, global_is_nan);
    realm.method(global, "isFinite", 1, global_is_finite);
    realm.method(global, "parseInt", 2, global_parse_int);
    realm.method(global, "parseFloat", 1, global_parse_float);
}

fn global_is_nan(interp: &mut Interpreter, _: &Value, args: &[Value]) -> IResult<Value> {
    Ok(Value::Boolean(interp.to_number(&arg(args, 0))?.is_nan()))
}

fn global_is_finite(interp: &mut Interpreter, _: &Value, args: &[Value]) -> IResult<Value> {
    Ok(Value::Boolean(interp.to_number(&arg(args, 0))?.is_finite()))
}

fn is_js_whitespace(c: char) -> bool {
    c.is_whitespace() || c == '\u{feff}'
}

fn global_parse_int(interp: &mut Interpreter, _: &Value, args: &[Value]) -> IResult<Value> {
    let input = interp.to_string(&arg(args, 0))?;
    let radix = interp.to_int32(&arg(args, 1))?;

    Ok(Value::Number(parse_int(&input, radix)))
}

/// The `parseInt` algorithm on an already-converted string and radix.
pub fn parse_int(input: &str, radix: i32) -> f64 {
    let mut s = input.trim_start_matches(is_js_whitespace);

    let sign = match s.as_bytes().first() {
        Some(b'-') => {
            s = &s[1..];
            -1.0
        }
        Some(b'+') => {
            s = &s[1..];
            1.0
        }
        _ => 1.0,
    };

    let mut radix = radix as u32;
    let mut strip_prefix = true;

    if radix != 0 {
        if !(2..=36).contains(&radix) {
            return f64::NAN;
        }

        strip_prefix = radix == 16;
    } else {
        radix = 10;
    }

    if strip_prefix {
        if let Some(rest) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            s = rest;
            radix = 16;
        }
    }

    let digits: Vec<u32> = s.chars().map_while(|c| c.to_digit(radix)).collect();

    if digits.is_empty() {
        return f64::NAN;
    }

    let value = digits
        .into_iter()
        .fold(0.0, |acc, d| acc * f64::from(radix) + f64::from(d));

    sign * value
}

fn global_parse_float(interp: &mut Interpreter, _: &Value, args: &[Value]) -> IResult<Value> {
    let input = interp.to_string(&arg(args, 0))?;
    Ok(Value::Number(parse_float(&input)))
}

/// Longest prefix of `input` (after leading whitespace) that is a decimal
/// literal, or NaN.
pub fn parse_float(input: &str) -> f64 {
    let s = input.trim_start_matches(is_js_whitespace);
    let bytes = s.as_bytes();

    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }

    if s[end..].starts_with("Infinity") {
        return if s.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    let digits = |from: usize| from + bytes[from..].iter().take_while(|b| b.is_ascii_digit()).count();

    let integer_end = digits(end);
    let mut seen_digit = integer_end > end;
    end = integer_end;

    if bytes.get(end) == Some(&b'.') {
        let fraction_end = digits(end + 1);
        seen_digit |= fraction_end > end + 1;
        end = fraction_end;
    }

    if !seen_digit {
        return f64::NAN;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exponent = end + 1;

        if matches!(bytes.get(exponent), Some(b'+' | b'-')) {
            exponent += 1;
        }

        let exponent_end = digits(exponent);

        if exponent_end > exponent {
            end = exponent_end;
        }
    }

    s[..end].parse::<f64>().unwrap_or(f64::NAN)
}
