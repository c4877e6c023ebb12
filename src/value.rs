use crate::object::JsObject;

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Shared handle to a heap object.  Identity is pointer identity.
pub type ObjectRef = Rc<RefCell<JsObject>>;

/// A language value.
#[derive(Debug, Clone)]
pub enum Value {
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    String(Rc<str>),
    Object(ObjectRef),
}

impl Value {
    pub fn string(s: impl AsRef<str>) -> Self {
        Value::String(Rc::from(s.as_ref()))
    }

    #[inline]
    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    #[inline]
    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Callable objects (script or native functions).
    pub fn is_callable(&self) -> bool {
        match self {
            Value::Object(o) => o.borrow().is_callable(),
            _ => false,
        }
    }
}

/// Structural for primitives, identity for objects.  `NaN != NaN`.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(Rc::from(s))
    }
}

impl From<ObjectRef> for Value {
    fn from(o: ObjectRef) -> Self {
        Value::Object(o)
    }
}

/// Debug-oriented rendering.  Script-visible string conversion goes through
/// [`Interpreter::to_string`](crate::interpreter::Interpreter::to_string),
/// which can call back into `toString`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", crate::coerce::number_to_string(*n)),
            Value::String(s) => write!(f, "{}", s),
            Value::Object(o) => write!(f, "[object {}]", o.borrow().class()),
        }
    }
}

/// A resolved lvalue: `(base, name)`.  A missing base means the identifier
/// did not resolve anywhere on the scope chain.
#[derive(Debug, Clone)]
pub struct Reference {
    pub base: Option<ObjectRef>,
    pub name: Rc<str>,
}

impl Reference {
    pub fn new(base: Option<ObjectRef>, name: impl Into<Rc<str>>) -> Self {
        Self {
            base,
            name: name.into(),
        }
    }

    pub fn is_unresolvable(&self) -> bool {
        self.base.is_none()
    }
}
