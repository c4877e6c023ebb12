//! Tree-walking execution engine.
//!
//! Expressions evaluate to [`Value`]s through [`IResult`]: a script `throw`
//! inside an expression surfaces as `Err(InterpretError::Thrown)`.  Statements
//! produce a [`Completion`]; [`Interpreter::execute`] folds a thrown value
//! into `Completion::Throw`, so `try`, `finally`, loops and labels all see one
//! uniform record.  At a call boundary the record is unfolded again.
//!
//! `InterpretError::Internal` is never caught by script code.

use std::mem;
use std::rc::Rc;

use log::{debug, info};
use thiserror::Error;

use crate::ast::{
    BinaryOp, CatchClause, ForInTarget, FunctionNode, LogicalOp, Node, ObjectKey, Program,
    Statement, SwitchClause, UnaryOp, UpdateOp,
};
use crate::coerce::{self, Hint};
use crate::environment::{Environment, ExecutionContext, Scope};
use crate::error::{JsError, Result};
use crate::object::{self, Attributes, Function, JsObject, ObjectKind};
use crate::parser;
use crate::realm::{ErrorKind, Realm};
use crate::value::{ObjectRef, Reference, Value};

/// Nested script calls beyond this depth raise a RangeError.  The walker
/// recurses on the native stack, so this must fit a default 2 MiB thread.
const MAX_CALL_DEPTH: usize = 64;

#[derive(Error, Debug)]
pub enum InterpretError {
    /// A script exception in flight.
    #[error("Thrown: {0}")]
    Thrown(Value),

    /// The tree and the engine disagree.  Aborts the run.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenient alias for interpreter results.
pub type IResult<T> = std::result::Result<T, InterpretError>;

/// Outcome of executing a statement.
#[derive(Debug, Clone)]
pub enum Completion {
    /// Carries the statement's value, if it produced one.
    Normal(Option<Value>),
    Break(Option<String>),
    Continue(Option<String>),
    Return(Value),
    Throw(Value),
}

pub struct Interpreter {
    pub(crate) realm: Realm,
    context: ExecutionContext,
    depth: usize,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// Creates an interpreter with a fresh global environment.
    pub fn new() -> Self {
        Self::with_realm(Realm::new())
    }

    pub fn with_realm(realm: Realm) -> Self {
        info!("Initializing Interpreter");

        let global = realm.global.clone();
        let context = ExecutionContext::new(Environment::global(global.clone()), global);

        Self {
            realm,
            context,
            depth: 0,
        }
    }

    pub fn realm(&self) -> &Realm {
        &self.realm
    }

    pub fn global(&self) -> ObjectRef {
        self.realm.global.clone()
    }

    // ─────────────────────────── entry points ───────────────────────────

    /// Parse and run `source` against this interpreter's globals.
    pub fn run(&mut self, source: &str) -> Result<Value> {
        let program = parser::parse(source, None)?;
        self.run_program(&program)
    }

    /// Run a parsed program.  Returns the value of the last top-level
    /// statement that produced one.
    pub fn run_program(&mut self, program: &Program) -> Result<Value> {
        info!("Running program with {} statements", program.body.len());

        let global = self.global();
        let scope = Environment::global(global.clone());
        let saved = mem::replace(&mut self.context, ExecutionContext::new(scope.clone(), global.clone()));

        self.hoist(&global, &program.functions, &program.vars, &scope);
        let completion = self.execute_block(&program.body);

        self.context = saved;
        self.depth = 0;

        let value = match completion {
            Ok(Completion::Normal(value)) => value.unwrap_or(Value::Undefined),
            Ok(Completion::Throw(value)) | Err(InterpretError::Thrown(value)) => {
                return Err(self.uncaught(value));
            }
            Ok(other) => {
                return Err(JsError::internal(format!(
                    "{:?} escaped the program body",
                    other
                )));
            }
            Err(InterpretError::Internal(message)) => return Err(JsError::internal(message)),
        };

        info!("Program finished with {}", value);

        Ok(value)
    }

    fn uncaught(&mut self, value: Value) -> JsError {
        let name = match &value {
            Value::Object(o) if matches!(o.borrow().kind, ObjectKind::Error) => {
                coerce::primitive_to_string(&object::get(o, "name"))
            }
            _ => String::new(),
        };

        let rendered = self
            .to_string(&value)
            .unwrap_or_else(|_| coerce::primitive_to_string(&value));

        info!("Uncaught exception: {}", rendered);

        JsError::Uncaught { rendered, name }
    }

    // ───────────────────────── allocation helpers ────────────────────────

    pub fn new_object(&self) -> ObjectRef {
        self.realm.new_object()
    }

    pub fn new_array(&self, values: Vec<Value>) -> ObjectRef {
        self.realm.new_array(values)
    }

    /// Build a script exception of the given kind.
    pub fn throw_error(&self, kind: ErrorKind, message: impl Into<String>) -> InterpretError {
        let message: String = message.into();

        debug!("Throwing {}: {}", kind.name(), message);

        InterpretError::Thrown(Value::Object(self.realm.new_error(kind, &message)))
    }

    /// Closure over `scope` with `length` and a fresh `prototype` object.
    pub fn make_function(&self, node: Rc<FunctionNode>, scope: Scope) -> ObjectRef {
        let length = node.params.len() as f64;

        let mut function = JsObject::new(
            ObjectKind::Function(Function::Script { node, scope }),
            Some(self.realm.function_prototype.clone()),
        );
        function.define("length", Value::Number(length), Attributes::LOCKED);
        let function = function.into_ref();

        let prototype = self.new_object();
        prototype.borrow_mut().define(
            "constructor",
            Value::Object(function.clone()),
            Attributes::DONT_ENUM,
        );
        function.borrow_mut().define(
            "prototype",
            Value::Object(prototype),
            Attributes::DONT_DELETE,
        );

        function
    }

    /// Compile `function (parameters) { body }` in the global scope.
    pub(crate) fn compile_function(&mut self, parameters: &str, body: &str) -> IResult<Value> {
        let source = format!("(function anonymous({}) {{\n{}\n}})", parameters, body);

        let program = match parser::parse(&source, Some("Function")) {
            Ok(program) => program,
            Err(e) => return Err(self.throw_error(ErrorKind::SyntaxError, e.to_string())),
        };

        match program.body.as_slice() {
            [Statement {
                node: Node::Function(node),
                ..
            }] => {
                let scope = Environment::global(self.global());
                Ok(Value::Object(self.make_function(node.clone(), scope)))
            }
            _ => Err(self.throw_error(ErrorKind::SyntaxError, "Malformed function body")),
        }
    }

    pub(crate) fn new_regexp(&self, literal: &str) -> ObjectRef {
        let inner = literal.strip_prefix('/').unwrap_or(literal);
        let (source, flags) = inner.rsplit_once('/').unwrap_or((inner, ""));

        let mut regexp = JsObject::new(ObjectKind::RegExp, Some(self.realm.regexp_prototype.clone()));
        regexp.define("source", Value::string(source), Attributes::LOCKED);
        regexp.define("global", Value::Boolean(flags.contains('g')), Attributes::LOCKED);
        regexp.define("ignoreCase", Value::Boolean(flags.contains('i')), Attributes::LOCKED);
        regexp.define("multiline", Value::Boolean(flags.contains('m')), Attributes::LOCKED);
        regexp.define("lastIndex", Value::Number(0.0), Attributes::HIDDEN);
        regexp.into_ref()
    }

    /// Bind nested function declarations, then `var` names not already bound.
    fn hoist(&mut self, target: &ObjectRef, functions: &[Rc<FunctionNode>], vars: &[String], scope: &Scope) {
        for node in functions {
            let Some(name) = node.name.as_deref() else {
                continue;
            };

            debug!("Hoisting function '{}'", name);

            let function = self.make_function(node.clone(), scope.clone());
            target
                .borrow_mut()
                .define(name, Value::Object(function), Attributes::DONT_DELETE);
        }

        for name in vars {
            if !target.borrow().has_own(name) {
                target
                    .borrow_mut()
                    .define(name, Value::Undefined, Attributes::DONT_DELETE);
            }
        }
    }

    // ────────────────────────── property access ──────────────────────────

    pub fn get(&self, target: &ObjectRef, key: &str) -> Value {
        object::get(target, key)
    }

    /// `[[Put]]` with array-length failures raised as RangeError.
    pub fn put(&mut self, target: &ObjectRef, key: &str, value: Value) -> IResult<()> {
        let value = if key == "length" && value.is_object() && matches!(target.borrow().kind, ObjectKind::Array) {
            self.to_primitive(&value, Some(Hint::Number))?
        } else {
            value
        };

        object::put(target, key, value).map_err(|e| self.throw_error(ErrorKind::RangeError, e.to_string()))?;
        Ok(())
    }

    fn get_value(&mut self, reference: &Reference) -> IResult<Value> {
        match &reference.base {
            Some(base) => Ok(object::get(base, &reference.name)),
            None => Err(self.throw_error(
                ErrorKind::ReferenceError,
                format!("{} is not defined", reference.name),
            )),
        }
    }

    /// Unresolvable references create a property on the global object.
    fn put_value(&mut self, reference: &Reference, value: Value) -> IResult<()> {
        let base = reference.base.clone().unwrap_or_else(|| self.global());
        self.put(&base, &reference.name, value)
    }

    fn identifier_reference(&self, name: &str) -> Reference {
        Reference::new(self.context.scope.resolve(name), name)
    }

    fn member_base(&mut self, base: &Value, key: &str) -> IResult<ObjectRef> {
        if base.is_nullish() {
            return Err(self.throw_error(
                ErrorKind::TypeError,
                format!("Cannot access property '{}' of {}", key, base),
            ));
        }

        self.to_object(base)
    }

    fn reference(&mut self, node: &Node) -> IResult<Reference> {
        match node {
            Node::Identifier(name) => Ok(self.identifier_reference(name)),

            Node::Member { object, name } => {
                let base = self.evaluate(object)?;
                let base = self.member_base(&base, name)?;
                Ok(Reference::new(Some(base), name.as_str()))
            }

            Node::Index { object, index } => {
                let base = self.evaluate(object)?;
                let key = self.evaluate(index)?;
                let key = self.to_string(&key)?;
                let base = self.member_base(&base, &key)?;
                Ok(Reference::new(Some(base), key))
            }

            other => {
                self.evaluate(other)?;
                Err(self.throw_error(ErrorKind::ReferenceError, "Invalid assignment target"))
            }
        }
    }

    // ───────────────────────── calls & construction ───────────────────────

    /// `[[Call]]`.  A missing `this` becomes the global object and primitives
    /// are wrapped.
    pub fn call(&mut self, callee: &Value, this: Value, args: &[Value]) -> IResult<Value> {
        let Value::Object(function_object) = callee else {
            return Err(self.throw_error(ErrorKind::TypeError, format!("{} is not a function", callee)));
        };

        let function = function_object.borrow().function().cloned();

        let Some(function) = function else {
            return Err(self.throw_error(ErrorKind::TypeError, "object is not a function"));
        };

        let this = match this {
            Value::Undefined | Value::Null => self.global(),
            Value::Object(o) => o,
            primitive => self.to_object(&primitive)?,
        };

        match function {
            Function::Native { name, call, .. } => {
                debug!("Calling native function '{}'", name);
                call(self, &Value::Object(this), args)
            }
            Function::Script { node, scope } => self.call_script(function_object, &node, &scope, this, args),
        }
    }

    /// `[[Construct]]`.
    pub fn construct(&mut self, callee: &Value, args: &[Value]) -> IResult<Value> {
        let function = callee.as_object().and_then(|o| o.borrow().function().cloned());

        match (callee, function) {
            (_, Some(Function::Native { construct: Some(construct), name, .. })) => {
                debug!("Constructing native '{}'", name);
                construct(self, &Value::Undefined, args)
            }

            (Value::Object(function_object), Some(Function::Script { node, scope })) => {
                let prototype = match object::get(function_object, "prototype") {
                    Value::Object(p) => p,
                    _ => self.realm.object_prototype.clone(),
                };

                let instance = JsObject::new(ObjectKind::Ordinary, Some(prototype)).into_ref();
                let result = self.call_script(function_object, &node, &scope, instance.clone(), args)?;

                Ok(if result.is_object() {
                    result
                } else {
                    Value::Object(instance)
                })
            }

            _ => Err(self.throw_error(ErrorKind::TypeError, format!("{} is not a constructor", callee))),
        }
    }

    /// Run a script function body in a fresh activation.
    ///
    /// The `arguments` object is a snapshot of `args`: its indexed slots do
    /// not alias the named parameters, so writing one leaves the other as is.
    fn call_script(
        &mut self,
        callee: &ObjectRef,
        node: &Rc<FunctionNode>,
        scope: &Scope,
        this: ObjectRef,
        args: &[Value],
    ) -> IResult<Value> {
        if self.depth >= MAX_CALL_DEPTH {
            return Err(self.throw_error(ErrorKind::RangeError, "Maximum call stack size exceeded"));
        }

        debug!(
            "Calling user-defined function '{}' with {} arguments",
            node.name.as_deref().unwrap_or("anonymous"),
            args.len()
        );

        let mut arguments = JsObject::new(ObjectKind::Arguments, Some(self.realm.object_prototype.clone()));

        for (i, arg) in args.iter().enumerate() {
            arguments.define(&i.to_string(), arg.clone(), Attributes::DONT_ENUM);
        }

        arguments.define("length", Value::Number(args.len() as f64), Attributes::DONT_ENUM);
        arguments.define("callee", Value::Object(callee.clone()), Attributes::DONT_ENUM);

        let mut activation = JsObject::new(ObjectKind::Activation, None);
        activation.define("arguments", Value::Object(arguments.into_ref()), Attributes::DONT_DELETE);

        for (i, param) in node.params.iter().enumerate() {
            let value = args.get(i).cloned().unwrap_or(Value::Undefined);
            activation.define(param, value, Attributes::DONT_DELETE);
        }

        let activation = activation.into_ref();
        let local = Environment::with_enclosing(activation.clone(), scope.clone());
        self.hoist(&activation, &node.functions, &node.vars, &local);

        let saved = mem::replace(&mut self.context, ExecutionContext::new(local, this));
        self.depth += 1;

        let completion = self.execute_block(&node.body);

        self.depth -= 1;
        self.context = saved;

        match completion? {
            Completion::Return(value) => Ok(value),
            Completion::Throw(value) => Err(InterpretError::Thrown(value)),
            Completion::Normal(_) => Ok(Value::Undefined),
            other => Err(InterpretError::Internal(format!(
                "{:?} escaped a function body",
                other
            ))),
        }
    }

    fn function_expression(&mut self, node: &Rc<FunctionNode>) -> ObjectRef {
        match node.name.as_deref() {
            // The name is visible inside the body only.
            Some(name) if !node.is_declaration => {
                let holder = JsObject::new(ObjectKind::Activation, None).into_ref();
                let scope = Environment::with_enclosing(holder.clone(), self.context.scope.clone());
                let function = self.make_function(node.clone(), scope);

                holder.borrow_mut().define(
                    name,
                    Value::Object(function.clone()),
                    Attributes {
                        read_only: true,
                        dont_enum: false,
                        dont_delete: true,
                    },
                );

                function
            }
            _ => self.make_function(node.clone(), self.context.scope.clone()),
        }
    }

    // ──────────────────────────── expressions ────────────────────────────

    /// Evaluates an expression node.
    pub fn evaluate(&mut self, node: &Node) -> IResult<Value> {
        match node {
            Node::Number(n) => Ok(Value::Number(*n)),
            Node::String(s) => Ok(Value::string(s)),
            Node::Regexp(literal) => Ok(Value::Object(self.new_regexp(literal))),
            Node::This => Ok(Value::Object(self.context.this.clone())),
            Node::Null => Ok(Value::Null),
            Node::True => Ok(Value::Boolean(true)),
            Node::False => Ok(Value::Boolean(false)),

            Node::Identifier(_) | Node::Member { .. } | Node::Index { .. } => {
                let reference = self.reference(node)?;
                self.get_value(&reference)
            }

            Node::Array(elements) => {
                let mut values = Vec::with_capacity(elements.len());

                for element in elements {
                    values.push(self.evaluate(element)?);
                }

                Ok(Value::Object(self.new_array(values)))
            }

            Node::Object(properties) => {
                let object = self.new_object();

                for (key, value) in properties {
                    let key = match key {
                        ObjectKey::Identifier(s) | ObjectKey::String(s) => s.clone(),
                        ObjectKey::Number(n) => coerce::number_to_string(*n),
                    };

                    let value = self.evaluate(value)?;
                    self.put(&object, &key, value)?;
                }

                Ok(Value::Object(object))
            }

            Node::Function(function) => Ok(Value::Object(self.function_expression(function))),

            Node::Unary { op, operand } => self.evaluate_unary(*op, operand),

            Node::Update { op, prefix, operand } => {
                let reference = self.reference(operand)?;
                let old = self.get_value(&reference)?;
                let old = self.to_number(&old)?;

                let new = match op {
                    UpdateOp::Increment => old + 1.0,
                    UpdateOp::Decrement => old - 1.0,
                };

                self.put_value(&reference, Value::Number(new))?;
                Ok(Value::Number(if *prefix { new } else { old }))
            }

            Node::Binary { op, left, right } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                self.apply_binary(*op, &left, &right)
            }

            Node::Logical { op, left, right } => {
                let left = self.evaluate(left)?;

                match (op, coerce::to_boolean(&left)) {
                    (LogicalOp::And, false) | (LogicalOp::Or, true) => Ok(left),
                    _ => self.evaluate(right),
                }
            }

            Node::Assign { op, target, value } => {
                let reference = self.reference(target)?;

                let value = match op {
                    Some(op) => {
                        let current = self.get_value(&reference)?;
                        let rhs = self.evaluate(value)?;
                        self.apply_binary(*op, &current, &rhs)?
                    }
                    None => self.evaluate(value)?,
                };

                self.put_value(&reference, value.clone())?;
                Ok(value)
            }

            Node::Conditional {
                test,
                consequent,
                alternate,
            } => {
                let test = self.evaluate(test)?;

                if coerce::to_boolean(&test) {
                    self.evaluate(consequent)
                } else {
                    self.evaluate(alternate)
                }
            }

            Node::Sequence { left, right } => {
                self.evaluate(left)?;
                self.evaluate(right)
            }

            Node::Call { callee, args } => self.evaluate_call(callee, args),

            Node::New { callee, args } => {
                let constructor = self.evaluate(callee)?;

                let args = match args {
                    Some(args) => self.evaluate_arguments(args)?,
                    None => Vec::new(),
                };

                if !constructor.is_callable() {
                    return Err(self.throw_error(
                        ErrorKind::TypeError,
                        format!("{} is not a constructor", describe(callee)),
                    ));
                }

                self.construct(&constructor, &args)
            }

            other => Err(InterpretError::Internal(format!(
                "statement node in expression position on {:?}",
                mem::discriminant(other)
            ))),
        }
    }

    fn evaluate_arguments(&mut self, args: &[Node]) -> IResult<Vec<Value>> {
        let mut values = Vec::with_capacity(args.len());

        for arg in args {
            values.push(self.evaluate(arg)?);
        }

        Ok(values)
    }

    fn evaluate_call(&mut self, callee: &Node, args: &[Node]) -> IResult<Value> {
        let (function, this) = if callee.is_reference() {
            let reference = self.reference(callee)?;
            let function = self.get_value(&reference)?;

            // Activation records never become `this`.
            let this = match &reference.base {
                Some(base) if !base.borrow().is_activation() => Value::Object(base.clone()),
                _ => Value::Undefined,
            };

            (function, this)
        } else {
            (self.evaluate(callee)?, Value::Undefined)
        };

        let args = self.evaluate_arguments(args)?;

        if !function.is_callable() {
            return Err(self.throw_error(
                ErrorKind::TypeError,
                format!("{} is not a function", describe(callee)),
            ));
        }

        self.call(&function, this, &args)
    }

    fn evaluate_unary(&mut self, op: UnaryOp, operand: &Node) -> IResult<Value> {
        let result = match op {
            UnaryOp::Delete => {
                if !operand.is_reference() {
                    self.evaluate(operand)?;
                    return Ok(Value::Boolean(true));
                }

                let reference = self.reference(operand)?;

                match &reference.base {
                    None => Value::Boolean(true),
                    Some(base) => Value::Boolean(object::delete(base, &reference.name)),
                }
            }

            UnaryOp::TypeOf => {
                if let Node::Identifier(name) = operand {
                    if self.context.scope.resolve(name).is_none() {
                        return Ok(Value::string("undefined"));
                    }
                }

                let value = self.evaluate(operand)?;
                Value::string(coerce::type_of(&value))
            }

            UnaryOp::Void => {
                self.evaluate(operand)?;
                Value::Undefined
            }

            UnaryOp::Not => {
                let value = self.evaluate(operand)?;
                Value::Boolean(!coerce::to_boolean(&value))
            }

            UnaryOp::Minus => {
                let value = self.evaluate(operand)?;
                Value::Number(-self.to_number(&value)?)
            }

            UnaryOp::Plus => {
                let value = self.evaluate(operand)?;
                Value::Number(self.to_number(&value)?)
            }

            UnaryOp::BitNot => {
                let value = self.evaluate(operand)?;
                Value::Number(f64::from(!self.to_int32(&value)?))
            }
        };

        Ok(result)
    }

    /// Applies a binary operator to two evaluated operands.
    pub fn apply_binary(&mut self, op: BinaryOp, left: &Value, right: &Value) -> IResult<Value> {
        let value = match op {
            BinaryOp::Add => {
                let left = self.to_primitive(left, None)?;
                let right = self.to_primitive(right, None)?;

                if matches!(left, Value::String(_)) || matches!(right, Value::String(_)) {
                    let mut s = coerce::primitive_to_string(&left);
                    s.push_str(&coerce::primitive_to_string(&right));
                    Value::from(s)
                } else {
                    Value::Number(coerce::primitive_to_number(&left) + coerce::primitive_to_number(&right))
                }
            }

            BinaryOp::Sub => Value::Number(self.to_number(left)? - self.to_number(right)?),
            BinaryOp::Mul => Value::Number(self.to_number(left)? * self.to_number(right)?),
            BinaryOp::Div => Value::Number(self.to_number(left)? / self.to_number(right)?),
            BinaryOp::Mod => Value::Number(self.to_number(left)? % self.to_number(right)?),

            BinaryOp::Shl => {
                let l = self.to_int32(left)?;
                let r = self.to_uint32(right)?;
                Value::Number(f64::from(l.wrapping_shl(r & 31)))
            }

            BinaryOp::Shr => {
                let l = self.to_int32(left)?;
                let r = self.to_uint32(right)?;
                Value::Number(f64::from(l >> (r & 31)))
            }

            BinaryOp::UShr => {
                let l = self.to_uint32(left)?;
                let r = self.to_uint32(right)?;
                Value::Number(f64::from(l >> (r & 31)))
            }

            BinaryOp::BitAnd => Value::Number(f64::from(self.to_int32(left)? & self.to_int32(right)?)),
            BinaryOp::BitOr => Value::Number(f64::from(self.to_int32(left)? | self.to_int32(right)?)),
            BinaryOp::BitXor => Value::Number(f64::from(self.to_int32(left)? ^ self.to_int32(right)?)),

            BinaryOp::Eq => Value::Boolean(self.abstract_equal(left, right)?),
            BinaryOp::NotEq => Value::Boolean(!self.abstract_equal(left, right)?),
            BinaryOp::StrictEq => Value::Boolean(coerce::strict_equal(left, right)),
            BinaryOp::StrictNotEq => Value::Boolean(!coerce::strict_equal(left, right)),

            BinaryOp::Lt => Value::Boolean(self.less_than(left, right)? == Some(true)),
            BinaryOp::Gt => Value::Boolean(self.less_than(right, left)? == Some(true)),
            BinaryOp::LtEq => Value::Boolean(self.less_than(right, left)? == Some(false)),
            BinaryOp::GtEq => Value::Boolean(self.less_than(left, right)? == Some(false)),

            BinaryOp::In => {
                let Value::Object(target) = right else {
                    return Err(self.throw_error(
                        ErrorKind::TypeError,
                        "Right-hand side of 'in' is not an object",
                    ));
                };

                let key = self.to_string(left)?;
                Value::Boolean(object::has_property(target, &key))
            }

            BinaryOp::InstanceOf => self.instance_of(left, right)?,
        };

        Ok(value)
    }

    fn instance_of(&mut self, value: &Value, constructor: &Value) -> IResult<Value> {
        if !constructor.is_callable() {
            return Err(self.throw_error(
                ErrorKind::TypeError,
                "Right-hand side of 'instanceof' is not callable",
            ));
        }

        let (Value::Object(instance), Some(constructor)) = (value, constructor.as_object()) else {
            return Ok(Value::Boolean(false));
        };

        let Value::Object(prototype) = object::get(constructor, "prototype") else {
            return Err(self.throw_error(
                ErrorKind::TypeError,
                "Function has non-object prototype in instanceof check",
            ));
        };

        Ok(Value::Boolean(object::inherits_from(instance, &prototype)))
    }

    // ───────────────────────────── statements ────────────────────────────

    /// Executes one statement.  Exceptions become `Completion::Throw`, and a
    /// `break` aimed at one of the statement's own labels ends here.
    pub fn execute(&mut self, statement: &Statement) -> IResult<Completion> {
        debug!("Executing statement on line {}", statement.line);

        let completion = match self.execute_node(&statement.node, &statement.labels) {
            Err(InterpretError::Thrown(value)) => Completion::Throw(value),
            other => other?,
        };

        Ok(match completion {
            Completion::Break(Some(label)) if statement.has_label(&label) => Completion::Normal(None),
            other => other,
        })
    }

    /// Runs statements in order and stops at the first abrupt completion.
    pub fn execute_block(&mut self, statements: &[Statement]) -> IResult<Completion> {
        let mut value = None;

        for statement in statements {
            match self.execute(statement)? {
                Completion::Normal(v) => {
                    if v.is_some() {
                        value = v;
                    }
                }
                abrupt => return Ok(abrupt),
            }
        }

        Ok(Completion::Normal(value))
    }

    fn execute_node(&mut self, node: &Node, labels: &[String]) -> IResult<Completion> {
        match node {
            Node::Var(declarations) => {
                for declaration in declarations {
                    if let Some(init) = &declaration.init {
                        let reference = self.identifier_reference(&declaration.name);
                        let value = self.evaluate(init)?;
                        self.put_value(&reference, value)?;
                    }
                }

                Ok(Completion::Normal(None))
            }

            Node::Block(body) => self.execute_block(body),

            // Bound when the enclosing body was entered.
            Node::Function(function) if function.is_declaration => Ok(Completion::Normal(None)),

            Node::If {
                test,
                consequent,
                alternate,
            } => {
                let test = self.evaluate(test)?;

                if coerce::to_boolean(&test) {
                    self.execute_block(consequent)
                } else if let Some(alternate) = alternate {
                    self.execute_block(alternate)
                } else {
                    Ok(Completion::Normal(None))
                }
            }

            Node::While { test, body } => {
                let mut value = None;

                loop {
                    let test = self.evaluate(test)?;

                    if !coerce::to_boolean(&test) {
                        break;
                    }

                    let completion = self.execute_block(body)?;

                    if let Some(exit) = loop_exit(completion, labels, &mut value) {
                        return Ok(exit);
                    }
                }

                Ok(Completion::Normal(value))
            }

            Node::DoWhile { body, test } => {
                let mut value = None;

                loop {
                    let completion = self.execute_block(body)?;

                    if let Some(exit) = loop_exit(completion, labels, &mut value) {
                        return Ok(exit);
                    }

                    let test = self.evaluate(test)?;

                    if !coerce::to_boolean(&test) {
                        break;
                    }
                }

                Ok(Completion::Normal(value))
            }

            Node::For {
                init,
                test,
                update,
                body,
            } => {
                match init.as_deref() {
                    Some(declarations @ Node::Var(_)) => {
                        self.execute_node(declarations, &[])?;
                    }
                    Some(expression) => {
                        self.evaluate(expression)?;
                    }
                    None => {}
                }

                let mut value = None;

                loop {
                    if let Some(test) = test {
                        let test = self.evaluate(test)?;

                        if !coerce::to_boolean(&test) {
                            break;
                        }
                    }

                    let completion = self.execute_block(body)?;

                    if let Some(exit) = loop_exit(completion, labels, &mut value) {
                        return Ok(exit);
                    }

                    if let Some(update) = update {
                        self.evaluate(update)?;
                    }
                }

                Ok(Completion::Normal(value))
            }

            Node::ForIn {
                target,
                object: subject,
                body,
            } => {
                let subject = self.evaluate(subject)?;
                let subject = self.to_object(&subject)?;

                let name = match target {
                    ForInTarget::Var(name) | ForInTarget::Name(name) => name,
                };

                let mut value = None;

                for key in object::enumerate(&subject) {
                    // Deleted by an earlier iteration.
                    if !object::has_property(&subject, &key) {
                        continue;
                    }

                    let reference = self.identifier_reference(name);
                    self.put_value(&reference, Value::from(key))?;

                    let completion = self.execute_block(body)?;

                    if let Some(exit) = loop_exit(completion, labels, &mut value) {
                        return Ok(exit);
                    }
                }

                Ok(Completion::Normal(value))
            }

            Node::Switch {
                discriminant,
                clauses,
            } => self.execute_switch(discriminant, clauses),

            Node::Try {
                block,
                handler,
                finalizer,
            } => {
                let completion = self.execute_block(block)?;

                let completion = match (completion, handler) {
                    (Completion::Throw(exception), Some(handler)) => self.execute_catch(handler, exception)?,
                    (completion, _) => completion,
                };

                if let Some(finalizer) = finalizer {
                    let outcome = self.execute_block(finalizer)?;

                    if !matches!(outcome, Completion::Normal(_)) {
                        return Ok(outcome);
                    }
                }

                Ok(completion)
            }

            Node::With { object, body } => {
                let target = self.evaluate(object)?;
                let target = self.to_object(&target)?;

                let scope = Environment::with_enclosing(target, self.context.scope.clone());
                let saved = mem::replace(&mut self.context.scope, scope);
                let completion = self.execute_block(body);
                self.context.scope = saved;

                completion
            }

            Node::Break(label) => Ok(Completion::Break(label.clone())),
            Node::Continue(label) => Ok(Completion::Continue(label.clone())),

            Node::Return(argument) => {
                let value = match argument {
                    Some(argument) => self.evaluate(argument)?,
                    None => Value::Undefined,
                };

                Ok(Completion::Return(value))
            }

            Node::Throw(argument) => Ok(Completion::Throw(self.evaluate(argument)?)),

            Node::Debugger => Ok(Completion::Normal(None)),

            expression => Ok(Completion::Normal(Some(self.evaluate(expression)?))),
        }
    }

    /// Matching `case` by `===` first, then `default` wherever it sits;
    /// execution falls through the following clauses until `break`.
    fn execute_switch(&mut self, discriminant: &Node, clauses: &[SwitchClause]) -> IResult<Completion> {
        let discriminant = self.evaluate(discriminant)?;
        let mut start = None;

        for (i, clause) in clauses.iter().enumerate() {
            if let Some(test) = &clause.test {
                let candidate = self.evaluate(test)?;

                if coerce::strict_equal(&discriminant, &candidate) {
                    start = Some(i);
                    break;
                }
            }
        }

        let Some(start) = start.or_else(|| clauses.iter().position(|c| c.test.is_none())) else {
            return Ok(Completion::Normal(None));
        };

        let mut value = None;

        for clause in &clauses[start..] {
            match self.execute_block(&clause.body)? {
                Completion::Normal(v) => {
                    if v.is_some() {
                        value = v;
                    }
                }
                Completion::Break(None) => return Ok(Completion::Normal(value)),
                abrupt => return Ok(abrupt),
            }
        }

        Ok(Completion::Normal(value))
    }

    fn execute_catch(&mut self, handler: &CatchClause, exception: Value) -> IResult<Completion> {
        let mut binding = JsObject::new(ObjectKind::Activation, None);
        binding.define(&handler.param, exception, Attributes::DONT_DELETE);

        let scope = Environment::with_enclosing(binding.into_ref(), self.context.scope.clone());
        let saved = mem::replace(&mut self.context.scope, scope);
        let completion = self.execute_block(&handler.body);
        self.context.scope = saved;

        completion
    }
}

/// Loop bookkeeping: `None` to keep iterating, `Some` to leave the loop with
/// that completion.
fn loop_exit(completion: Completion, labels: &[String], value: &mut Option<Value>) -> Option<Completion> {
    match completion {
        Completion::Normal(v) => {
            if v.is_some() {
                *value = v;
            }
            None
        }
        Completion::Continue(None) => None,
        Completion::Continue(Some(label)) if labels.contains(&label) => None,
        Completion::Break(None) => Some(Completion::Normal(value.take())),
        Completion::Break(Some(label)) if labels.contains(&label) => Some(Completion::Normal(value.take())),
        abrupt => Some(abrupt),
    }
}

/// Short description of a callee for error messages.
fn describe(node: &Node) -> String {
    match node {
        Node::Identifier(name) => name.clone(),
        Node::Member { object, name } => format!("{}.{}", describe(object), name),
        Node::Index { object, .. } => format!("{}[...]", describe(object)),
        Node::This => "this".to_string(),
        _ => "expression".to_string(),
    }
}

/// Parse and run `source` in a fresh interpreter.
pub fn run(source: &str) -> Result<Value> {
    Interpreter::new().run(source)
}
