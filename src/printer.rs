//! Minifying source printer.
//!
//! Output re-parses to the same tree: every operator expression is wrapped
//! in parentheses, every compound body gets braces and every simple
//! statement ends in `;`.  Whitespace appears only where two word tokens
//! would otherwise run together.

use crate::ast::{
    CatchClause, ForInTarget, FunctionNode, LogicalOp, Node, ObjectKey, Program, Statement,
    SwitchClause, UpdateOp,
};
use crate::coerce::number_to_string;

/// Print a whole program.
pub fn print(program: &Program) -> String {
    let mut printer = Printer::default();
    printer.statements(&program.body);
    printer.out
}

/// Source text of a single function, as `Function.prototype.toString` shows it.
pub fn function_source(node: &FunctionNode) -> String {
    let mut printer = Printer::default();
    printer.function(node);
    printer.out
}

/// Accumulates output for one print call.
#[derive(Default)]
pub struct Printer {
    out: String,
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Quote with whichever delimiter needs fewer escapes.
fn quote(s: &str) -> String {
    let quote = if s.matches('"').count() > s.matches('\'').count() {
        '\''
    } else {
        '"'
    };

    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);

    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() || c == '\u{2028}' || c == '\u{2029}' => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }

    out.push(quote);
    out
}

fn number(n: f64) -> String {
    if n.is_infinite() {
        // Overflowing literals such as 1e999.
        "(1/0)".to_string()
    } else {
        number_to_string(n)
    }
}

impl Printer {
    fn push(&mut self, s: &str) {
        self.out.push_str(s);
    }

    /// A keyword followed by its operand, separated only when needed.
    fn keyword(&mut self, keyword: &str, operand: &Node) {
        self.push(keyword);
        let rendered = Self::render(operand);

        if rendered.starts_with(is_word_char) {
            self.out.push(' ');
        }

        self.push(&rendered);
    }

    fn render(node: &Node) -> String {
        let mut printer = Printer::default();
        printer.expression(node);
        printer.out
    }

    fn list(&mut self, nodes: &[Node]) {
        for (i, node) in nodes.iter().enumerate() {
            if i > 0 {
                self.push(",");
            }

            self.expression(node);
        }
    }

    // ── expressions ────────────────────────────────────────────────────

    fn expression(&mut self, node: &Node) {
        match node {
            Node::Number(n) => self.push(&number(*n)),
            Node::String(s) => self.push(&quote(s)),
            Node::Regexp(literal) => {
                self.push("(");
                self.push(literal);
                self.push(")");
            }
            Node::Identifier(name) => self.push(name),
            Node::This => self.push("this"),
            Node::Null => self.push("null"),
            Node::True => self.push("true"),
            Node::False => self.push("false"),

            Node::Array(elements) => {
                self.push("[");
                self.list(elements);
                self.push("]");
            }

            // Parenthesised so a statement never starts with `{`.
            Node::Object(properties) => {
                self.push("({");

                for (i, (key, value)) in properties.iter().enumerate() {
                    if i > 0 {
                        self.push(",");
                    }

                    match key {
                        ObjectKey::Identifier(name) => self.push(name),
                        ObjectKey::String(s) => self.push(&quote(s)),
                        ObjectKey::Number(n) => self.push(&number(*n)),
                    }

                    self.push(":");
                    self.expression(value);
                }

                self.push("})");
            }

            Node::Function(function) => {
                self.push("(");
                self.function(function);
                self.push(")");
            }

            Node::Unary { op, operand } => {
                self.push("(");
                self.keyword(op.symbol(), operand);
                self.push(")");
            }

            Node::Update { op, prefix, operand } => {
                let symbol = match op {
                    UpdateOp::Increment => "++",
                    UpdateOp::Decrement => "--",
                };

                self.push("(");

                if *prefix {
                    self.push(symbol);
                    self.expression(operand);
                } else {
                    self.expression(operand);
                    self.push(symbol);
                }

                self.push(")");
            }

            Node::Binary { op, left, right } => {
                let symbol = op.symbol();

                self.push("(");
                self.expression(left);

                if symbol.starts_with(is_word_char) {
                    self.push(" ");
                    self.keyword(symbol, right);
                } else {
                    self.push(symbol);
                    self.expression(right);
                }

                self.push(")");
            }

            Node::Logical { op, left, right } => {
                self.push("(");
                self.expression(left);
                self.push(match op {
                    LogicalOp::And => "&&",
                    LogicalOp::Or => "||",
                });
                self.expression(right);
                self.push(")");
            }

            Node::Assign { op, target, value } => {
                self.push("(");
                self.expression(target);

                if let Some(op) = op {
                    self.push(op.symbol());
                }

                self.push("=");
                self.expression(value);
                self.push(")");
            }

            Node::Conditional {
                test,
                consequent,
                alternate,
            } => {
                self.push("(");
                self.expression(test);
                self.push("?");
                self.expression(consequent);
                self.push(":");
                self.expression(alternate);
                self.push(")");
            }

            Node::Sequence { left, right } => {
                self.push("(");
                self.expression(left);
                self.push(",");
                self.expression(right);
                self.push(")");
            }

            Node::Member { object, name } => {
                self.member_object(object);
                self.push(".");
                self.push(name);
            }

            Node::Index { object, index } => {
                self.member_object(object);
                self.push("[");
                self.expression(index);
                self.push("]");
            }

            Node::Call { callee, args } => {
                self.member_object(callee);
                self.push("(");
                self.list(args);
                self.push(")");
            }

            Node::New { callee, args } => {
                self.push("(new ");

                // `new f()` would bind the call's argument list to `new`.
                if matches!(**callee, Node::Call { .. } | Node::New { .. }) {
                    self.push("(");
                    self.expression(callee);
                    self.push(")");
                } else {
                    self.expression(callee);
                }

                if let Some(args) = args {
                    self.push("(");
                    self.list(args);
                    self.push(")");
                }

                self.push(")");
            }

            statement => self.statement_node(statement),
        }
    }

    /// `1.toString` would lex as a malformed number.
    fn member_object(&mut self, node: &Node) {
        if let Node::Number(_) = node {
            self.push("(");
            self.expression(node);
            self.push(")");
        } else {
            self.expression(node);
        }
    }

    fn function(&mut self, node: &FunctionNode) {
        self.push("function");

        if let Some(name) = &node.name {
            self.push(" ");
            self.push(name);
        }

        self.push("(");
        self.push(&node.params.join(","));
        self.push(")");
        self.braced(&node.body);
    }

    // ── statements ─────────────────────────────────────────────────────

    fn statements(&mut self, statements: &[Statement]) {
        for statement in statements {
            self.statement(statement);
        }
    }

    fn braced(&mut self, statements: &[Statement]) {
        self.push("{");
        self.statements(statements);
        self.push("}");
    }

    fn statement(&mut self, statement: &Statement) {
        for label in &statement.labels {
            self.push(label);
            self.push(":");
        }

        self.statement_node(&statement.node);
    }

    fn var_declarations(&mut self, node: &Node) {
        let Node::Var(declarations) = node else {
            return;
        };

        self.push("var ");

        for (i, declaration) in declarations.iter().enumerate() {
            if i > 0 {
                self.push(",");
            }

            self.push(&declaration.name);

            if let Some(init) = &declaration.init {
                self.push("=");
                self.expression(init);
            }
        }
    }

    fn statement_node(&mut self, node: &Node) {
        match node {
            Node::Var(_) => {
                self.var_declarations(node);
                self.push(";");
            }

            Node::Block(body) => self.braced(body),

            Node::Function(function) if function.is_declaration => self.function(function),

            Node::If {
                test,
                consequent,
                alternate,
            } => {
                self.push("if(");
                self.expression(test);
                self.push(")");
                self.braced(consequent);

                if let Some(alternate) = alternate {
                    self.push("else");
                    self.braced(alternate);
                }
            }

            Node::While { test, body } => {
                self.push("while(");
                self.expression(test);
                self.push(")");
                self.braced(body);
            }

            Node::DoWhile { body, test } => {
                self.push("do");
                self.braced(body);
                self.push("while(");
                self.expression(test);
                self.push(");");
            }

            Node::For {
                init,
                test,
                update,
                body,
            } => {
                self.push("for(");

                match init.as_deref() {
                    Some(declarations @ Node::Var(_)) => self.var_declarations(declarations),
                    Some(expression) => self.expression(expression),
                    None => {}
                }

                self.push(";");

                if let Some(test) = test {
                    self.expression(test);
                }

                self.push(";");

                if let Some(update) = update {
                    self.expression(update);
                }

                self.push(")");
                self.braced(body);
            }

            Node::ForIn {
                target,
                object,
                body,
            } => {
                self.push("for(");

                match target {
                    ForInTarget::Var(name) => {
                        self.push("var ");
                        self.push(name);
                    }
                    ForInTarget::Name(name) => self.push(name),
                }

                self.push(" ");
                self.keyword("in", object);
                self.push(")");
                self.braced(body);
            }

            Node::Switch {
                discriminant,
                clauses,
            } => {
                self.push("switch(");
                self.expression(discriminant);
                self.push("){");

                for SwitchClause { test, body } in clauses {
                    match test {
                        Some(test) => {
                            self.keyword("case", test);
                            self.push(":");
                        }
                        None => self.push("default:"),
                    }

                    self.statements(body);
                }

                self.push("}");
            }

            Node::Try {
                block,
                handler,
                finalizer,
            } => {
                self.push("try");
                self.braced(block);

                if let Some(CatchClause { param, body }) = handler {
                    self.push("catch(");
                    self.push(param);
                    self.push(")");
                    self.braced(body);
                }

                if let Some(finalizer) = finalizer {
                    self.push("finally");
                    self.braced(finalizer);
                }
            }

            Node::With { object, body } => {
                self.push("with(");
                self.expression(object);
                self.push(")");
                self.braced(body);
            }

            Node::Break(label) | Node::Continue(label) => {
                self.push(if matches!(node, Node::Break(_)) {
                    "break"
                } else {
                    "continue"
                });

                if let Some(label) = label {
                    self.push(" ");
                    self.push(label);
                }

                self.push(";");
            }

            Node::Return(argument) => {
                match argument {
                    Some(argument) => self.keyword("return", argument),
                    None => self.push("return"),
                }

                self.push(";");
            }

            Node::Throw(argument) => {
                self.keyword("throw", argument);
                self.push(";");
            }

            Node::Debugger => self.push("debugger;"),

            expression => {
                self.expression(expression);
                self.push(";");
            }
        }
    }
}
