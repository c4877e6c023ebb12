use crate::object;
use crate::value::ObjectRef;

use std::fmt;
use std::rc::Rc;

/// Shared handle to a scope chain link.  Closures keep their defining chain
/// alive by holding one of these.
pub type Scope = Rc<Environment>;

/// One link of the scope chain: a property-bearing object (the global
/// object, an activation, a `with` target, a catch binding) plus the
/// enclosing link.
pub struct Environment {
    object: ObjectRef,
    enclosing: Option<Scope>,
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Environment(depth {})", self.depth())
    }
}

impl Environment {
    /// The outermost link.
    pub fn global(object: ObjectRef) -> Scope {
        Rc::new(Environment {
            object,
            enclosing: None,
        })
    }

    pub fn with_enclosing(object: ObjectRef, enclosing: Scope) -> Scope {
        Rc::new(Environment {
            object,
            enclosing: Some(enclosing),
        })
    }

    pub fn object(&self) -> &ObjectRef {
        &self.object
    }

    pub fn enclosing(&self) -> Option<&Scope> {
        self.enclosing.as_ref()
    }

    /// Innermost object on the chain that has `name`, own or inherited.
    /// `None` means the name is unresolvable.
    pub fn resolve(&self, name: &str) -> Option<ObjectRef> {
        let mut current = Some(self);

        while let Some(env) = current {
            if object::has_property(&env.object, name) {
                return Some(env.object.clone());
            }

            current = env.enclosing.as_deref();
        }

        None
    }

    pub fn depth(&self) -> usize {
        let mut depth = 1;
        let mut current = self.enclosing.as_deref();

        while let Some(env) = current {
            depth += 1;
            current = env.enclosing.as_deref();
        }

        depth
    }
}

/// What a running function body sees: its scope chain and `this`.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    pub scope: Scope,
    pub this: ObjectRef,
}

impl ExecutionContext {
    pub fn new(scope: Scope, this: ObjectRef) -> Self {
        Self { scope, this }
    }
}
