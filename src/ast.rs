//! **Abstract‑Syntax‑Tree** produced by the [`Parser`](crate::parser::Parser).
//!
//! One closed enum, [`Node`], covers expressions and statements alike: the
//! grammar allows most statement keywords only in statement position, but a
//! statement list is just a list of [`Statement`] wrappers around nodes, so a
//! single sum type keeps the interpreter's dispatch exhaustive.
//!
//! Nodes are immutable once the parser returns them.  Function bodies are held
//! behind `Rc` so closures created at runtime can share them cheaply.

use serde::Serialize;
use std::rc::Rc;

/// Binary operators that evaluate both operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Shl,
    Shr,
    UShr,
    BitAnd,
    BitOr,
    BitXor,
    Eq,
    NotEq,
    StrictEq,
    StrictNotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    In,
    InstanceOf,
}

impl BinaryOp {
    /// Map an infix symbol id onto its operator.
    pub fn from_symbol(id: &str) -> Option<Self> {
        let op = match id {
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Sub,
            "*" => BinaryOp::Mul,
            "/" => BinaryOp::Div,
            "%" => BinaryOp::Mod,
            "<<" => BinaryOp::Shl,
            ">>" => BinaryOp::Shr,
            ">>>" => BinaryOp::UShr,
            "&" => BinaryOp::BitAnd,
            "|" => BinaryOp::BitOr,
            "^" => BinaryOp::BitXor,
            "==" => BinaryOp::Eq,
            "!=" => BinaryOp::NotEq,
            "===" => BinaryOp::StrictEq,
            "!==" => BinaryOp::StrictNotEq,
            "<" => BinaryOp::Lt,
            ">" => BinaryOp::Gt,
            "<=" => BinaryOp::LtEq,
            ">=" => BinaryOp::GtEq,
            "in" => BinaryOp::In,
            "instanceof" => BinaryOp::InstanceOf,
            _ => return None,
        };

        Some(op)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::UShr => ">>>",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::StrictEq => "===",
            BinaryOp::StrictNotEq => "!==",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::LtEq => "<=",
            BinaryOp::GtEq => ">=",
            BinaryOp::In => "in",
            BinaryOp::InstanceOf => "instanceof",
        }
    }
}

/// Short-circuiting operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LogicalOp {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnaryOp {
    Plus,
    Minus,
    Not,
    BitNot,
    TypeOf,
    Void,
    Delete,
}

impl UnaryOp {
    pub fn from_symbol(id: &str) -> Option<Self> {
        let op = match id {
            "+" => UnaryOp::Plus,
            "-" => UnaryOp::Minus,
            "!" => UnaryOp::Not,
            "~" => UnaryOp::BitNot,
            "typeof" => UnaryOp::TypeOf,
            "void" => UnaryOp::Void,
            "delete" => UnaryOp::Delete,
            _ => return None,
        };

        Some(op)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "~",
            UnaryOp::TypeOf => "typeof",
            UnaryOp::Void => "void",
            UnaryOp::Delete => "delete",
        }
    }
}

/// `++` / `--`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UpdateOp {
    Increment,
    Decrement,
}

/// Property name in an object literal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ObjectKey {
    Identifier(String),
    String(String),
    Number(f64),
}

/// Left-hand side of `for (… in …)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ForInTarget {
    /// `for (var k in o)`
    Var(String),

    /// `for (k in o)`
    Name(String),
}

/// One `name = init` item of a `var` statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VarDecl {
    pub name: String,
    pub init: Option<Node>,
}

/// A `case` (with test) or `default` (without) clause.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwitchClause {
    pub test: Option<Node>,
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatchClause {
    pub param: String,
    pub body: Vec<Statement>,
}

/// A function literal or declaration together with its hoisting tables.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionNode {
    pub name: Option<String>,
    pub params: Vec<String>,

    /// Every `var` name declared anywhere in the body (not in nested functions).
    pub vars: Vec<String>,

    /// Function declarations nested directly in this body, in source order.
    /// A later declaration of the same name replaces an earlier one.
    pub functions: Vec<Rc<FunctionNode>>,

    pub body: Vec<Statement>,
    pub is_declaration: bool,
    pub line: usize,
}

/// A statement: one node plus the labels attached to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statement {
    pub labels: Vec<String>,
    pub node: Node,
    pub line: usize,
}

impl Statement {
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }
}

/// Root of a parsed source text.  Shaped like a function body: the
/// top-level `var`s and function declarations are hoisted onto the global
/// object before the statements run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Program {
    pub body: Vec<Statement>,
    pub vars: Vec<String>,
    pub functions: Vec<Rc<FunctionNode>>,
    pub file_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Node {
    // ── primary expressions ────────────────────────────────────────────
    Number(f64),
    String(String),

    /// `/body/flags` exactly as written.
    Regexp(String),
    Identifier(String),
    This,
    Null,
    True,
    False,
    Array(Vec<Node>),
    Object(Vec<(ObjectKey, Node)>),
    Function(Rc<FunctionNode>),

    // ── operators ──────────────────────────────────────────────────────
    Unary {
        op: UnaryOp,
        operand: Box<Node>,
    },
    Update {
        op: UpdateOp,
        prefix: bool,
        operand: Box<Node>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Node>,
        right: Box<Node>,
    },
    Logical {
        op: LogicalOp,
        left: Box<Node>,
        right: Box<Node>,
    },

    /// `target = value`, or a compound `target op= value` when `op` is set.
    Assign {
        op: Option<BinaryOp>,
        target: Box<Node>,
        value: Box<Node>,
    },
    Conditional {
        test: Box<Node>,
        consequent: Box<Node>,
        alternate: Box<Node>,
    },

    /// The comma operator.
    Sequence {
        left: Box<Node>,
        right: Box<Node>,
    },
    Member {
        object: Box<Node>,
        name: String,
    },
    Index {
        object: Box<Node>,
        index: Box<Node>,
    },
    Call {
        callee: Box<Node>,
        args: Vec<Node>,
    },

    /// `new C` has no argument list; `new C(…)` has one.
    New {
        callee: Box<Node>,
        args: Option<Vec<Node>>,
    },

    // ── statements ─────────────────────────────────────────────────────
    Var(Vec<VarDecl>),
    Block(Vec<Statement>),
    If {
        test: Box<Node>,
        consequent: Vec<Statement>,
        alternate: Option<Vec<Statement>>,
    },
    While {
        test: Box<Node>,
        body: Vec<Statement>,
    },
    DoWhile {
        body: Vec<Statement>,
        test: Box<Node>,
    },
    For {
        init: Option<Box<Node>>,
        test: Option<Box<Node>>,
        update: Option<Box<Node>>,
        body: Vec<Statement>,
    },
    ForIn {
        target: ForInTarget,
        object: Box<Node>,
        body: Vec<Statement>,
    },
    Switch {
        discriminant: Box<Node>,
        clauses: Vec<SwitchClause>,
    },
    Try {
        block: Vec<Statement>,
        handler: Option<CatchClause>,
        finalizer: Option<Vec<Statement>>,
    },
    With {
        object: Box<Node>,
        body: Vec<Statement>,
    },
    Break(Option<String>),
    Continue(Option<String>),
    Return(Option<Box<Node>>),
    Throw(Box<Node>),
    Debugger,
}

impl Node {
    /// Identifier, `.` or `[`: the only valid assignment targets.
    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            Node::Identifier(_) | Node::Member { .. } | Node::Index { .. }
        )
    }

    /// Statements whose source ends with a `}` and need no `;`.
    pub fn ends_with_block(&self) -> bool {
        match self {
            Node::Block(_)
            | Node::If { .. }
            | Node::While { .. }
            | Node::For { .. }
            | Node::ForIn { .. }
            | Node::Switch { .. }
            | Node::Try { .. }
            | Node::With { .. } => true,
            Node::Function(f) => f.is_declaration,
            _ => false,
        }
    }

    /// Is this a loop that `continue` may target?
    pub fn is_iteration(&self) -> bool {
        matches!(
            self,
            Node::While { .. } | Node::DoWhile { .. } | Node::For { .. } | Node::ForIn { .. }
        )
    }
}
