//! Object model: property tables, attributes and the prototype chain.
//!
//! Every heap object is a [`JsObject`] behind an [`ObjectRef`]
//! (`Rc<RefCell<_>>`).  Prototypes and closure scopes are shared handles, so
//! the graph may contain cycles (`F.prototype.constructor === F`); those are
//! reclaimed only when the whole realm is dropped.
//!
//! The internal methods live here as free functions over `&ObjectRef`
//! because they walk the prototype chain and must release each borrow before
//! moving to the next link:
//!
//! | Operation        | Function          |
//! |------------------|-------------------|
//! | `[[Get]]`        | [`get`]           |
//! | `[[Put]]`        | [`put`]           |
//! | `[[CanPut]]`     | [`can_put`]       |
//! | `[[HasProperty]]`| [`has_property`]  |
//! | `[[Delete]]`     | [`delete`]        |
//! | for-in order     | [`enumerate`]     |
//!
//! `[[DefaultValue]]` needs to call script functions and therefore lives on
//! the interpreter.

use crate::ast::FunctionNode;
use crate::coerce;
use crate::environment::Scope;
use crate::interpreter::{IResult, Interpreter};
use crate::value::{ObjectRef, Value};

use log::debug;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::Rc;
use thiserror::Error;

/// Failures of the internal methods themselves.  The interpreter turns them
/// into script-level exceptions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ObjectError {
    #[error("Invalid array length")]
    InvalidArrayLength,
}

/// Property attribute flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Attributes {
    pub read_only: bool,
    pub dont_enum: bool,
    pub dont_delete: bool,
}

impl Attributes {
    pub const NONE: Attributes = Attributes {
        read_only: false,
        dont_enum: false,
        dont_delete: false,
    };

    /// Built-in methods and other non-enumerable slots.
    pub const DONT_ENUM: Attributes = Attributes {
        read_only: false,
        dont_enum: true,
        dont_delete: false,
    };

    /// Declared variables and parameters.
    pub const DONT_DELETE: Attributes = Attributes {
        read_only: false,
        dont_enum: false,
        dont_delete: true,
    };

    pub const HIDDEN: Attributes = Attributes {
        read_only: false,
        dont_enum: true,
        dont_delete: true,
    };

    /// Constants: `NaN`, `Math.PI`, function `length`.
    pub const LOCKED: Attributes = Attributes {
        read_only: true,
        dont_enum: true,
        dont_delete: true,
    };
}

#[derive(Debug, Clone)]
pub struct Property {
    pub value: Value,
    pub attributes: Attributes,

    /// Insertion sequence number; drives enumeration order.
    order: u64,
}

/// Native function pointer: `(interpreter, this, arguments)`.
pub type NativeFn = fn(&mut Interpreter, &Value, &[Value]) -> IResult<Value>;

/// Payload of a function object.
#[derive(Clone)]
pub enum Function {
    /// Closure over the scope chain active when the literal was evaluated.
    Script {
        node: Rc<FunctionNode>,
        scope: Scope,
    },

    /// Host function.  `construct` is `None` for functions that cannot be
    /// used with `new`.
    Native {
        name: &'static str,
        call: NativeFn,
        construct: Option<NativeFn>,
    },
}

impl Function {
    pub fn name(&self) -> &str {
        match self {
            Function::Script { node, .. } => node.name.as_deref().unwrap_or(""),
            Function::Native { name, .. } => name,
        }
    }
}

/// Class tag plus kind-specific payload.
#[derive(Clone)]
pub enum ObjectKind {
    Ordinary,
    Array,
    Function(Function),
    String(Rc<str>),
    Number(f64),
    Boolean(bool),
    Error,
    Arguments,

    /// Per-call variable object; never visible as `this`.
    Activation,
    Global,

    /// Milliseconds since the epoch.
    Date(f64),
    RegExp,
    Math,
}

pub struct JsObject {
    pub kind: ObjectKind,
    prototype: Option<ObjectRef>,
    properties: HashMap<String, Property>,
    next_order: u64,
}

impl fmt::Debug for JsObject {
    // Prototype links and closures can be cyclic: print a summary only.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsObject")
            .field("class", &self.class())
            .field("properties", &self.properties.len())
            .finish()
    }
}

impl JsObject {
    pub fn new(kind: ObjectKind, prototype: Option<ObjectRef>) -> Self {
        let length = match &kind {
            ObjectKind::Array => Some((0.0, Attributes::HIDDEN)),
            ObjectKind::String(s) => Some((s.encode_utf16().count() as f64, Attributes::LOCKED)),
            _ => None,
        };

        let mut object = Self {
            kind,
            prototype,
            properties: HashMap::new(),
            next_order: 0,
        };

        if let Some((length, attributes)) = length {
            object.define("length", Value::Number(length), attributes);
        }

        object
    }

    pub fn into_ref(self) -> ObjectRef {
        Rc::new(RefCell::new(self))
    }

    /// The `[[Class]]` tag reported by `Object.prototype.toString`.
    pub fn class(&self) -> &'static str {
        match self.kind {
            ObjectKind::Ordinary | ObjectKind::Activation => "Object",
            ObjectKind::Array => "Array",
            ObjectKind::Function(_) => "Function",
            ObjectKind::String(_) => "String",
            ObjectKind::Number(_) => "Number",
            ObjectKind::Boolean(_) => "Boolean",
            ObjectKind::Error => "Error",
            ObjectKind::Arguments => "Arguments",
            ObjectKind::Global => "global",
            ObjectKind::Date(_) => "Date",
            ObjectKind::RegExp => "RegExp",
            ObjectKind::Math => "Math",
        }
    }

    pub fn prototype(&self) -> Option<ObjectRef> {
        self.prototype.clone()
    }

    pub fn set_prototype(&mut self, prototype: Option<ObjectRef>) {
        self.prototype = prototype;
    }

    #[inline]
    pub fn is_callable(&self) -> bool {
        matches!(self.kind, ObjectKind::Function(_))
    }

    pub fn function(&self) -> Option<&Function> {
        match &self.kind {
            ObjectKind::Function(f) => Some(f),
            _ => None,
        }
    }

    #[inline]
    pub fn is_activation(&self) -> bool {
        matches!(self.kind, ObjectKind::Activation)
    }

    pub fn get_own(&self, key: &str) -> Option<&Property> {
        self.properties.get(key)
    }

    pub fn has_own(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    /// Create or replace an own property with explicit attributes, bypassing
    /// `read_only`.  An existing slot keeps its enumeration position.
    pub fn define(&mut self, key: &str, value: Value, attributes: Attributes) {
        if let Some(property) = self.properties.get_mut(key) {
            property.value = value;
            property.attributes = attributes;
            return;
        }

        let order = self.next_order;
        self.next_order += 1;

        self.properties.insert(
            key.to_string(),
            Property {
                value,
                attributes,
                order,
            },
        );
    }

    /// Own property names in insertion order, with their `dont_enum` flag.
    pub fn own_keys(&self) -> Vec<(String, bool)> {
        let mut keys: Vec<(&String, &Property)> = self.properties.iter().collect();
        keys.sort_by_key(|(_, p)| p.order);

        keys.into_iter()
            .map(|(k, p)| (k.clone(), p.attributes.dont_enum))
            .collect()
    }

    /// Current `length` of an array object.
    pub fn array_length(&self) -> u32 {
        match self.get_own("length").map(|p| &p.value) {
            Some(Value::Number(n)) => coerce::to_uint32(*n),
            _ => 0,
        }
    }

    fn write_own(&mut self, key: &str, value: Value) {
        match self.properties.get_mut(key) {
            Some(property) => property.value = value,
            None => self.define(key, value, Attributes::NONE),
        }
    }

    fn set_array_length(&mut self, value: Value) -> Result<(), ObjectError> {
        let requested = coerce::primitive_to_number(&value);
        let length = coerce::to_uint32(requested);

        if f64::from(length) != requested {
            return Err(ObjectError::InvalidArrayLength);
        }

        let old = self.array_length();

        if length < old {
            let doomed: Vec<String> = self
                .properties
                .keys()
                .filter(|k| array_index(k).is_some_and(|i| i >= length))
                .cloned()
                .collect();

            debug!("Truncating array from {} to {}", old, length);

            for key in doomed {
                self.properties.remove(&key);
            }
        }

        self.write_own("length", Value::Number(f64::from(length)));
        Ok(())
    }
}

/// Canonical array index: the string form of a uint32 below `2^32 - 1`.
pub fn array_index(key: &str) -> Option<u32> {
    if key.is_empty() || (key.len() > 1 && key.starts_with('0')) {
        return None;
    }

    match key.parse::<u32>() {
        Ok(i) if i != u32::MAX && key.bytes().all(|b| b.is_ascii_digit()) => Some(i),
        _ => None,
    }
}

// ───────────────────────────── internal methods ─────────────────────────────

/// `[[Get]]`: own property, else the prototype chain, else `undefined`.
pub fn get(object: &ObjectRef, key: &str) -> Value {
    let mut current = Some(object.clone());

    while let Some(o) = current {
        let borrowed = o.borrow();

        if let Some(property) = borrowed.get_own(key) {
            return property.value.clone();
        }

        current = borrowed.prototype();
    }

    Value::Undefined
}

/// `[[CanPut]]`: false when the nearest property of that name is read-only.
pub fn can_put(object: &ObjectRef, key: &str) -> bool {
    let mut current = Some(object.clone());

    while let Some(o) = current {
        let borrowed = o.borrow();

        if let Some(property) = borrowed.get_own(key) {
            return !property.attributes.read_only;
        }

        current = borrowed.prototype();
    }

    true
}

/// `[[Put]]`.  Returns `Ok(false)` when the write was silently refused.
///
/// An existing own property keeps its attributes; only the value changes.
/// Arrays maintain `length` in both directions.
pub fn put(object: &ObjectRef, key: &str, value: Value) -> Result<bool, ObjectError> {
    if !can_put(object, key) {
        debug!("Put of read-only '{}' ignored", key);
        return Ok(false);
    }

    let mut o = object.borrow_mut();

    if matches!(o.kind, ObjectKind::Array) {
        if key == "length" {
            o.set_array_length(value)?;
            return Ok(true);
        }

        if let Some(index) = array_index(key) {
            o.write_own(key, value);

            if index >= o.array_length() {
                o.write_own("length", Value::Number(f64::from(index) + 1.0));
            }

            return Ok(true);
        }
    }

    o.write_own(key, value);
    Ok(true)
}

/// `[[HasProperty]]`: own or inherited.
pub fn has_property(object: &ObjectRef, key: &str) -> bool {
    let mut current = Some(object.clone());

    while let Some(o) = current {
        let borrowed = o.borrow();

        if borrowed.has_own(key) {
            return true;
        }

        current = borrowed.prototype();
    }

    false
}

/// `[[Delete]]`: `false` only for an own `dont_delete` property.
pub fn delete(object: &ObjectRef, key: &str) -> bool {
    let mut o = object.borrow_mut();

    let dont_delete = match o.get_own(key) {
        None => return true,
        Some(property) => property.attributes.dont_delete,
    };

    if dont_delete {
        return false;
    }

    o.properties.remove(key);
    true
}

/// for-in order: each object's own enumerable names in insertion order,
/// walking outwards; a name seen nearer the receiver (enumerable or not)
/// hides the same name further up.
pub fn enumerate(object: &ObjectRef) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut keys = Vec::new();
    let mut current = Some(object.clone());

    while let Some(o) = current {
        let borrowed = o.borrow();

        for (key, dont_enum) in borrowed.own_keys() {
            if seen.insert(key.clone()) && !dont_enum {
                keys.push(key);
            }
        }

        current = borrowed.prototype();
    }

    keys
}

/// Is `candidate` somewhere on `object`'s prototype chain (excluding itself)?
pub fn inherits_from(object: &ObjectRef, candidate: &ObjectRef) -> bool {
    let mut current = object.borrow().prototype();

    while let Some(o) = current {
        if Rc::ptr_eq(&o, candidate) {
            return true;
        }

        current = o.borrow().prototype();
    }

    false
}
