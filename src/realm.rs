//! Global Environment bootstrap.
//!
//! A [`Realm`] owns the global object and the intrinsic prototypes every
//! allocation site needs (`Object.prototype`, `Array.prototype`, …).  The
//! constructors and their methods are installed by [`builtins::install`].
//!
//! One realm serves one interpreter.  Independent scripts that must not see
//! each other's globals each get their own.

use crate::builtins;
use crate::object::{Attributes, Function, JsObject, NativeFn, ObjectKind};
use crate::value::{ObjectRef, Value};

use log::{debug, info};

/// The native Error constructors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Error,
    EvalError,
    RangeError,
    ReferenceError,
    SyntaxError,
    TypeError,
    URIError,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 7] = [
        ErrorKind::Error,
        ErrorKind::EvalError,
        ErrorKind::RangeError,
        ErrorKind::ReferenceError,
        ErrorKind::SyntaxError,
        ErrorKind::TypeError,
        ErrorKind::URIError,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::Error => "Error",
            ErrorKind::EvalError => "EvalError",
            ErrorKind::RangeError => "RangeError",
            ErrorKind::ReferenceError => "ReferenceError",
            ErrorKind::SyntaxError => "SyntaxError",
            ErrorKind::TypeError => "TypeError",
            ErrorKind::URIError => "URIError",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

pub struct Realm {
    pub global: ObjectRef,
    pub object_prototype: ObjectRef,
    pub function_prototype: ObjectRef,
    pub array_prototype: ObjectRef,
    pub string_prototype: ObjectRef,
    pub number_prototype: ObjectRef,
    pub boolean_prototype: ObjectRef,
    pub date_prototype: ObjectRef,
    pub regexp_prototype: ObjectRef,
    error_prototypes: Vec<ObjectRef>,
}

impl Default for Realm {
    fn default() -> Self {
        Self::new()
    }
}

impl Realm {
    /// Build the complete global object graph.
    pub fn new() -> Self {
        info!("Building realm");

        let object_prototype = JsObject::new(ObjectKind::Ordinary, None).into_ref();
        let proto = |kind: ObjectKind| JsObject::new(kind, Some(object_prototype.clone())).into_ref();

        // Function.prototype is itself callable and returns undefined.
        let function_prototype = proto(ObjectKind::Function(Function::Native {
            name: "",
            call: builtins::function_prototype,
            construct: None,
        }));

        let global = proto(ObjectKind::Global);
        let array_prototype = proto(ObjectKind::Array);
        let string_prototype = proto(ObjectKind::String("".into()));
        let number_prototype = proto(ObjectKind::Number(0.0));
        let boolean_prototype = proto(ObjectKind::Boolean(false));
        let date_prototype = proto(ObjectKind::Date(f64::NAN));
        let regexp_prototype = proto(ObjectKind::Ordinary);

        let error_base = proto(ObjectKind::Error);
        let error_prototypes = ErrorKind::ALL
            .iter()
            .map(|kind| match kind {
                ErrorKind::Error => error_base.clone(),
                _ => JsObject::new(ObjectKind::Error, Some(error_base.clone())).into_ref(),
            })
            .collect();

        let realm = Realm {
            global,
            object_prototype,
            function_prototype,
            array_prototype,
            string_prototype,
            number_prototype,
            boolean_prototype,
            date_prototype,
            regexp_prototype,
            error_prototypes,
        };

        builtins::install(&realm);

        info!("Realm ready");

        realm
    }

    pub fn error_prototype(&self, kind: ErrorKind) -> ObjectRef {
        self.error_prototypes[kind.index()].clone()
    }

    // ───────────────────────── allocation helpers ─────────────────────────

    pub fn new_object(&self) -> ObjectRef {
        JsObject::new(ObjectKind::Ordinary, Some(self.object_prototype.clone())).into_ref()
    }

    /// Dense array holding `values` at indices `0..n`.
    pub fn new_array(&self, values: Vec<Value>) -> ObjectRef {
        let mut array = JsObject::new(ObjectKind::Array, Some(self.array_prototype.clone()));
        let length = values.len();

        for (i, value) in values.into_iter().enumerate() {
            array.define(&i.to_string(), value, Attributes::NONE);
        }

        array.define("length", Value::Number(length as f64), Attributes::HIDDEN);
        array.into_ref()
    }

    /// Error object of the given kind with an own `message`.
    pub fn new_error(&self, kind: ErrorKind, message: &str) -> ObjectRef {
        let mut error = JsObject::new(ObjectKind::Error, Some(self.error_prototype(kind)));

        if !message.is_empty() {
            error.define("message", Value::string(message), Attributes::DONT_ENUM);
        }

        error.into_ref()
    }

    /// Host function object.
    pub fn native(
        &self,
        name: &'static str,
        length: u32,
        call: NativeFn,
        construct: Option<NativeFn>,
    ) -> ObjectRef {
        let mut function = JsObject::new(
            ObjectKind::Function(Function::Native {
                name,
                call,
                construct,
            }),
            Some(self.function_prototype.clone()),
        );

        function.define("length", Value::Number(f64::from(length)), Attributes::LOCKED);
        function.into_ref()
    }

    /// Install a non-enumerable native method on `target`.
    pub fn method(&self, target: &ObjectRef, name: &'static str, length: u32, call: NativeFn) {
        let function = self.native(name, length, call, None);

        target
            .borrow_mut()
            .define(name, Value::Object(function), Attributes::DONT_ENUM);
    }

    /// Install a global constructor wired to `prototype` in both directions.
    pub fn constructor(
        &self,
        name: &'static str,
        length: u32,
        call: NativeFn,
        construct: NativeFn,
        prototype: &ObjectRef,
    ) -> ObjectRef {
        debug!("Installing constructor {}", name);

        let function = self.native(name, length, call, Some(construct));

        function
            .borrow_mut()
            .define("prototype", Value::Object(prototype.clone()), Attributes::LOCKED);

        prototype
            .borrow_mut()
            .define("constructor", Value::Object(function.clone()), Attributes::DONT_ENUM);

        self.global
            .borrow_mut()
            .define(name, Value::Object(function.clone()), Attributes::DONT_ENUM);

        function
    }

    /// Install a read-only, non-enumerable, undeletable value.
    pub fn constant(&self, target: &ObjectRef, name: &str, value: Value) {
        target.borrow_mut().define(name, value, Attributes::LOCKED);
    }
}
