/*!
Top-down operator precedence (Pratt) parser
==========================================

The parser is a thin driver over the [`Grammar`] table: every token is mapped
to a [`Symbol`] and the symbol's rules do the actual work.

```text
parse(rbp):
    advance
    left = token.nud()                 # or token.fud() at statement start
    while rbp < next.lbp:
        advance
        left = token.led(left)
    return left
```

Statements add three things the expression loop does not know about:
labels (`name:` prefixes), the statement terminator (`;`, optional before a
reach token or a line break), and the *context stack* ([`ParserState`]).  A
context is pushed per function body and records the `var` names and nested
function declarations the runtime must hoist, the labels currently in scope,
and how deeply loops and switches nest so `break`/`continue` can be validated.

### Time & space

| Phase                 | Cost |
|-----------------------|-----:|
| `parse` over n tokens | Θ(n) |
| lookahead buffer      | O(1) (at most two tokens) |
| AST                   | O(n) |

### Logging Policy

| Location                   | Level  |
|----------------------------|--------|
| `Parser::new`, `program`   | `info` |
| statement dispatch         | `debug`|
| error construction         | `info` (in `JsError::syntax`) |

No error recovery: the first violation aborts the parse.  Input nesting deeper
than `MAX_NESTING_DEPTH` is rejected as a syntax error.
*/

use crate::ast::{
    BinaryOp, CatchClause, ForInTarget, FunctionNode, LogicalOp, Node, ObjectKey, Program,
    Statement, SwitchClause, UnaryOp, UpdateOp, VarDecl,
};
use crate::error::{JsError, Result};
use crate::grammar::{Grammar, Symbol, GRAMMAR};
use crate::scanner::Scanner;
use crate::token::{Token, TokenKind};

use log::{debug, info};
use std::collections::VecDeque;
use std::rc::Rc;

/// Maximum nesting of `parse` calls before the input is rejected.
const MAX_NESTING_DEPTH: usize = 128;

/// Parse a complete source text.
pub fn parse(source: &str, file_name: Option<&str>) -> Result<Program> {
    Parser::new(source, file_name).program()
}

/// A token paired with the grammar symbol it maps to.
#[derive(Debug, Clone)]
struct Lexeme {
    token: Token,
    symbol: &'static Symbol,
}

impl Lexeme {
    #[inline(always)]
    fn id(&self) -> &'static str {
        self.symbol.id
    }
}

/// Per-function parse context.
#[derive(Debug, Default)]
struct FunctionContext {
    is_global: bool,
    vars: Vec<String>,
    functions: Vec<Rc<FunctionNode>>,
    labels: Vec<String>,
    loop_labels: Vec<String>,
    iteration_depth: usize,
    switch_depth: usize,
}

impl FunctionContext {
    fn add_var(&mut self, name: &str) {
        if !self.vars.iter().any(|v| v == name) {
            self.vars.push(name.to_string());
        }
    }

    fn add_function(&mut self, function: Rc<FunctionNode>) {
        self.functions.retain(|f| f.name != function.name);
        self.functions.push(function);
    }
}

/// The stack of open function contexts; the bottom one is the program.
#[derive(Debug)]
pub struct ParserState {
    contexts: Vec<FunctionContext>,
}

impl ParserState {
    fn new() -> Self {
        Self {
            contexts: vec![FunctionContext {
                is_global: true,
                ..FunctionContext::default()
            }],
        }
    }

    fn push(&mut self) {
        self.contexts.push(FunctionContext::default());
    }

    fn pop(&mut self) -> FunctionContext {
        self.contexts.pop().unwrap_or_default()
    }

    fn current(&mut self) -> &mut FunctionContext {
        if self.contexts.is_empty() {
            self.contexts.push(FunctionContext::default());
        }

        let last = self.contexts.len() - 1;
        &mut self.contexts[last]
    }

    /// Current function depth, 1 for the program itself.
    pub fn depth(&self) -> usize {
        self.contexts.len()
    }
}

/// Pratt parser over a token stream.
pub struct Parser<'src> {
    grammar: &'static Grammar,
    scanner: Scanner<'src>,
    source: &'src str,
    file_name: String,
    token: Lexeme,
    next: Lexeme,
    lookahead: VecDeque<Lexeme>,
    state: ParserState,
    nesting: usize,
}

impl<'src> Parser<'src> {
    /// Construct a new parser.  No token is read until [`Parser::program`].
    pub fn new(source: &'src str, file_name: Option<&str>) -> Self {
        info!("Parser created over {} bytes", source.len());

        let grammar: &'static Grammar = &GRAMMAR;
        let token = Token::new(TokenKind::PUNCTUATOR, "(begin)", 1, 1, 0);
        let begin = Lexeme {
            symbol: grammar.symbol_for(&token),
            token,
        };

        Self {
            grammar,
            scanner: Scanner::new(source),
            source,
            file_name: file_name.unwrap_or_default().to_string(),
            token: begin.clone(),
            next: begin,
            lookahead: VecDeque::new(),
            state: ParserState::new(),
            nesting: 0,
        }
    }

    // ───────────────────────── public API ─────────────────────────

    /// Parse an entire program.
    pub fn program(mut self) -> Result<Program> {
        info!("Beginning parse phase");

        self.advance()?;
        let body = self.statements()?;

        if self.next.id() != "(end)" {
            return Err(self.error_at_next(format!(
                "Unexpected '{}'.",
                self.next.token.describe()
            )));
        }

        let global = self.state.pop();

        info!("Parsed {} top-level statements", body.len());

        Ok(Program {
            body,
            vars: global.vars,
            functions: global.functions,
            file_name: self.file_name,
        })
    }

    /// The precedence-climbing loop.
    pub fn expression(&mut self, rbp: u32) -> Result<Node> {
        self.parse(rbp, false)
    }

    /// Parse one statement; `None` for an empty statement.
    pub fn statement(&mut self) -> Result<Option<Statement>> {
        if self.next.id() == ";" {
            self.advance()?;
            return Ok(None);
        }

        let line = self.next.token.line;
        let mut labels: Vec<String> = Vec::new();

        while self.next.token.is_name()
            && !self.next.symbol.reserved
            && self.peek(0)?.id() == ":"
        {
            let name = self.next.token.value.clone();

            if self.state.current().labels.contains(&name) {
                return Err(self.error_at_next(format!("Duplicate label '{}'.", name)));
            }

            debug!("Label '{}' on line {}", name, line);

            self.state.current().labels.push(name.clone());
            labels.push(name);
            self.advance()?;
            self.expect(":")?;
        }

        let iteration = matches!(self.next.id(), "for" | "while" | "do");

        if iteration {
            self.state.current().loop_labels.extend(labels.iter().cloned());
        }

        let node = self.parse(0, true);

        let context = self.state.current();
        context.labels.retain(|l| !labels.contains(l));
        context.loop_labels.retain(|l| !labels.contains(l));

        let node = node?;

        if !node.ends_with_block() {
            self.terminate()?;
        }

        Ok(Some(Statement { labels, node, line }))
    }

    /// Statements up to the next reach token.
    pub fn statements(&mut self) -> Result<Vec<Statement>> {
        let mut statements = Vec::new();

        while !self.next.symbol.reach {
            if let Some(statement) = self.statement()? {
                statements.push(statement);
            }
        }

        Ok(statements)
    }

    /// `{ statements }` or a single bare statement.
    pub fn block(&mut self) -> Result<Vec<Statement>> {
        if self.next.id() == "{" {
            self.braced_block()
        } else {
            Ok(self.statement()?.into_iter().collect())
        }
    }

    // ─────────────────────── driver internals ─────────────────────

    fn parse(&mut self, rbp: u32, initial: bool) -> Result<Node> {
        if self.nesting >= MAX_NESTING_DEPTH {
            return Err(self.error_at_next("Expression nested too deeply."));
        }

        self.nesting += 1;
        let node = self.parse_nested(rbp, initial);
        self.nesting -= 1;

        node
    }

    fn parse_nested(&mut self, rbp: u32, initial: bool) -> Result<Node> {
        if self.next.id() == "(end)" {
            return Err(self.error_at_next("Unexpected early end of program."));
        }

        self.advance()?;
        let current = self.token.clone();

        if initial {
            if let Some(fud) = current.symbol.fud {
                debug!("Statement '{}' on line {}", current.id(), current.token.line);

                return fud(self, current.token);
            }
        }

        let Some((nud, bp)) = current.symbol.nud else {
            return Err(self.error_at(
                &current.token,
                format!(
                    "Expected an identifier and instead saw '{}'.",
                    current.token.describe()
                ),
            ));
        };

        let mut left = nud(self, current.token, bp)?;

        while rbp < self.next.symbol.lbp {
            if self.next.symbol.restricted && self.next.token.line != self.token.token.line {
                break;
            }

            self.advance()?;
            let current = self.token.clone();

            let Some((led, bp)) = current.symbol.led else {
                return Err(self.error_at(
                    &current.token,
                    format!(
                        "Expected an operator and instead saw '{}'.",
                        current.token.describe()
                    ),
                ));
            };

            left = led(self, current.token, left, bp)?;
        }

        Ok(left)
    }

    /// Consume `;`, or accept its absence before a reach token or line break.
    fn terminate(&mut self) -> Result<()> {
        if self.next.id() == ";" {
            self.advance()?;
        } else if !self.next.symbol.reach && self.next.token.line == self.token.token.line {
            return Err(self.error_at_next(format!(
                "Missing ; before statement '{}'.",
                self.next.token.describe()
            )));
        }

        Ok(())
    }

    fn braced_block(&mut self) -> Result<Vec<Statement>> {
        self.expect("{")?;
        let statements = self.statements()?;
        self.expect("}")?;
        Ok(statements)
    }

    /// Body of a loop: counts towards the iteration depth.
    fn loop_body(&mut self) -> Result<Vec<Statement>> {
        self.state.current().iteration_depth += 1;
        let body = self.block();
        self.state.current().iteration_depth -= 1;
        body
    }

    // ───────────────────────── token helpers ───────────────────────

    fn pull(&mut self) -> Result<Lexeme> {
        loop {
            let token = match self.scanner.next() {
                Some(token) => token?,
                None => Token::new(
                    TokenKind::END,
                    "",
                    self.token.token.line,
                    self.token.token.column,
                    self.source.len(),
                ),
            };

            if token.kind == TokenKind::ENDLINE {
                continue;
            }

            let grammar: &'static Grammar = self.grammar;
            let symbol = grammar.symbol_for(&token);

            return Ok(Lexeme { token, symbol });
        }
    }

    fn advance(&mut self) -> Result<()> {
        let next = match self.lookahead.pop_front() {
            Some(lexeme) => lexeme,
            None => self.pull()?,
        };

        self.token = std::mem::replace(&mut self.next, next);
        Ok(())
    }

    /// The token `p + 1` positions after `next`.
    fn peek(&mut self, p: usize) -> Result<&Lexeme> {
        while self.lookahead.len() <= p {
            let lexeme = self.pull()?;
            self.lookahead.push_back(lexeme);
        }

        Ok(&self.lookahead[p])
    }

    fn expect(&mut self, id: &str) -> Result<()> {
        if self.next.id() != id {
            return Err(self.error_at_next(format!(
                "Expected '{}' and instead saw '{}'.",
                id,
                self.next.token.describe()
            )));
        }

        self.advance()
    }

    /// Any name, reserved words included (property names).
    fn identifier_name(&mut self) -> Result<String> {
        if !self.next.token.is_name() {
            return Err(self.error_at_next(format!(
                "Expected an identifier and instead saw '{}'.",
                self.next.token.describe()
            )));
        }

        self.advance()?;
        Ok(self.token.token.value.clone())
    }

    /// A name that can be bound: variables, parameters, functions.
    fn binding_identifier(&mut self) -> Result<String> {
        if self.next.token.is_name() && !self.next.symbol.reserved {
            self.advance()?;
            return Ok(self.token.token.value.clone());
        }

        Err(self.error_at_next(format!(
            "Expected an identifier and instead saw '{}'.",
            self.next.token.describe()
        )))
    }

    fn same_line(&self) -> bool {
        self.next.token.line == self.token.token.line
    }

    // ───────────────────────── diagnostics ─────────────────────────

    fn error_at(&self, token: &Token, message: impl Into<String>) -> JsError {
        // At end of input, point at the last real token instead.
        let token = if token.kind == TokenKind::END {
            &self.token.token
        } else {
            token
        };

        let source_line = self
            .source
            .lines()
            .nth(token.line.saturating_sub(1))
            .unwrap_or_default();

        JsError::syntax(token.line, token.column, message, source_line, &self.file_name)
    }

    fn error_at_next(&self, message: impl Into<String>) -> JsError {
        self.error_at(&self.next.token, message)
    }

    // ───────────────────────── functions ───────────────────────────

    fn function(&mut self, is_declaration: bool, line: usize) -> Result<Rc<FunctionNode>> {
        let name = if is_declaration {
            Some(self.binding_identifier()?)
        } else if self.next.token.is_name() {
            Some(self.binding_identifier()?)
        } else {
            None
        };

        let mut params = Vec::new();
        self.expect("(")?;

        while self.next.id() != ")" {
            params.push(self.binding_identifier()?);

            if self.next.id() == "," {
                self.advance()?;
            } else if self.next.id() != ")" {
                return Err(self.error_at_next(format!(
                    "Expected ')' and instead saw '{}'.",
                    self.next.token.describe()
                )));
            }
        }

        self.expect(")")?;

        self.state.push();
        let body = self.braced_block();
        let context = self.state.pop();
        let body = body?;

        debug!(
            "Function {:?}: {} params, {} vars, {} nested declarations",
            name,
            params.len(),
            context.vars.len(),
            context.functions.len()
        );

        let function = Rc::new(FunctionNode {
            name,
            params,
            vars: context.vars,
            functions: context.functions,
            body,
            is_declaration,
            line,
        });

        if is_declaration {
            self.state.current().add_function(function.clone());
        }

        Ok(function)
    }

    fn var_declarations(&mut self) -> Result<Vec<VarDecl>> {
        let mut decls = Vec::new();

        loop {
            let name = self.binding_identifier()?;
            self.state.current().add_var(&name);

            let init = if self.next.id() == "=" {
                self.advance()?;
                Some(self.expression(19)?)
            } else {
                None
            };

            decls.push(VarDecl { name, init });

            if self.next.id() != "," {
                return Ok(decls);
            }

            self.advance()?;
        }
    }

    fn arguments(&mut self) -> Result<Vec<Node>> {
        let mut args = Vec::new();

        while self.next.id() != ")" {
            args.push(self.expression(10)?);

            if self.next.id() == "," {
                self.advance()?;
            } else if self.next.id() != ")" {
                return Err(self.error_at_next(format!(
                    "Expected ')' and instead saw '{}'.",
                    self.next.token.describe()
                )));
            }
        }

        self.expect(")")?;
        Ok(args)
    }
}

fn parse_number(lexeme: &str) -> Option<f64> {
    if let Some(hex) = lexeme.strip_prefix("0x").or_else(|| lexeme.strip_prefix("0X")) {
        return u64::from_str_radix(hex, 16).ok().map(|n| n as f64);
    }

    lexeme.parse::<f64>().ok()
}

// ─────────────────────────── null denotations ──────────────────────────

pub(crate) fn nud_literal(p: &mut Parser<'_>, token: Token, _bp: u32) -> Result<Node> {
    let node = match token.kind {
        TokenKind::NUMBER => match parse_number(&token.value) {
            Some(n) => Node::Number(n),
            None => {
                return Err(p.error_at(&token, format!("Bad number '{}'.", token.value)))
            }
        },
        TokenKind::STRING => Node::String(token.value),
        TokenKind::REGEXP => Node::Regexp(token.value),
        _ => match token.value.as_str() {
            "this" => Node::This,
            "null" => Node::Null,
            "true" => Node::True,
            "false" => Node::False,
            _ => Node::Identifier(token.value),
        },
    };

    Ok(node)
}

pub(crate) fn nud_prefix(p: &mut Parser<'_>, token: Token, bp: u32) -> Result<Node> {
    let operand = p.expression(bp)?;

    let Some(op) = UnaryOp::from_symbol(&token.value) else {
        return Err(p.error_at(&token, format!("Unexpected '{}'.", token.value)));
    };

    Ok(Node::Unary {
        op,
        operand: Box::new(operand),
    })
}

pub(crate) fn nud_prefix_update(p: &mut Parser<'_>, token: Token, bp: u32) -> Result<Node> {
    let operand = p.expression(bp)?;

    Ok(Node::Update {
        op: update_op(&token),
        prefix: true,
        operand: Box::new(operand),
    })
}

pub(crate) fn nud_new(p: &mut Parser<'_>, _token: Token, bp: u32) -> Result<Node> {
    let callee = p.expression(bp)?;

    Ok(Node::New {
        callee: Box::new(callee),
        args: None,
    })
}

pub(crate) fn nud_group(p: &mut Parser<'_>, _token: Token, _bp: u32) -> Result<Node> {
    let inner = p.expression(0)?;
    p.expect(")")?;
    Ok(inner)
}

pub(crate) fn nud_array(p: &mut Parser<'_>, _token: Token, _bp: u32) -> Result<Node> {
    let mut elements = Vec::new();

    while p.next.id() != "]" {
        elements.push(p.expression(10)?);

        if p.next.id() == "," {
            p.advance()?;
        } else if p.next.id() != "]" {
            return Err(p.error_at_next(format!(
                "Expected ']' and instead saw '{}'.",
                p.next.token.describe()
            )));
        }
    }

    p.expect("]")?;
    Ok(Node::Array(elements))
}

pub(crate) fn nud_object(p: &mut Parser<'_>, _token: Token, _bp: u32) -> Result<Node> {
    let mut properties = Vec::new();

    while p.next.id() != "}" {
        let key = if p.next.token.is_name() {
            ObjectKey::Identifier(p.identifier_name()?)
        } else if p.next.id() == "(string)" {
            p.advance()?;
            ObjectKey::String(p.token.token.value.clone())
        } else if p.next.id() == "(number)" {
            p.advance()?;
            match parse_number(&p.token.token.value) {
                Some(n) => ObjectKey::Number(n),
                None => {
                    let token = p.token.token.clone();
                    return Err(p.error_at(&token, format!("Bad number '{}'.", token.value)));
                }
            }
        } else {
            return Err(p.error_at_next(format!(
                "Expected '}}' and instead saw '{}'.",
                p.next.token.describe()
            )));
        };

        p.expect(":")?;
        properties.push((key, p.expression(10)?));

        if p.next.id() == "," {
            p.advance()?;
        } else if p.next.id() != "}" {
            return Err(p.error_at_next(format!(
                "Expected '}}' and instead saw '{}'.",
                p.next.token.describe()
            )));
        }
    }

    p.expect("}")?;
    Ok(Node::Object(properties))
}

pub(crate) fn nud_function(p: &mut Parser<'_>, token: Token, _bp: u32) -> Result<Node> {
    Ok(Node::Function(p.function(false, token.line)?))
}

// ─────────────────────────── left denotations ──────────────────────────

pub(crate) fn led_infix(p: &mut Parser<'_>, token: Token, left: Node, bp: u32) -> Result<Node> {
    let right = p.expression(bp)?;
    let (left, right) = (Box::new(left), Box::new(right));

    let node = match token.value.as_str() {
        "," => Node::Sequence { left, right },
        "&&" => Node::Logical {
            op: LogicalOp::And,
            left,
            right,
        },
        "||" => Node::Logical {
            op: LogicalOp::Or,
            left,
            right,
        },
        other => match BinaryOp::from_symbol(other) {
            Some(op) => Node::Binary { op, left, right },
            None => return Err(p.error_at(&token, format!("Unexpected '{}'.", other))),
        },
    };

    Ok(node)
}

pub(crate) fn led_assignment(p: &mut Parser<'_>, token: Token, left: Node, bp: u32) -> Result<Node> {
    if !left.is_reference() {
        return Err(p.error_at(&token, "Bad assignment."));
    }

    let value = p.expression(bp)?;

    let op = match token.value.strip_suffix('=') {
        Some("") | None => None,
        Some(symbol) => BinaryOp::from_symbol(symbol),
    };

    Ok(Node::Assign {
        op,
        target: Box::new(left),
        value: Box::new(value),
    })
}

pub(crate) fn led_conditional(p: &mut Parser<'_>, _token: Token, left: Node, bp: u32) -> Result<Node> {
    let consequent = p.expression(bp)?;
    p.expect(":")?;
    let alternate = p.expression(bp)?;

    Ok(Node::Conditional {
        test: Box::new(left),
        consequent: Box::new(consequent),
        alternate: Box::new(alternate),
    })
}

pub(crate) fn led_suffix(_p: &mut Parser<'_>, token: Token, left: Node, _bp: u32) -> Result<Node> {
    Ok(Node::Update {
        op: update_op(&token),
        prefix: false,
        operand: Box::new(left),
    })
}

pub(crate) fn led_member(p: &mut Parser<'_>, _token: Token, left: Node, _bp: u32) -> Result<Node> {
    let name = p.identifier_name()?;

    Ok(Node::Member {
        object: Box::new(left),
        name,
    })
}

pub(crate) fn led_index(p: &mut Parser<'_>, _token: Token, left: Node, _bp: u32) -> Result<Node> {
    let index = p.expression(0)?;
    p.expect("]")?;

    Ok(Node::Index {
        object: Box::new(left),
        index: Box::new(index),
    })
}

pub(crate) fn led_call(p: &mut Parser<'_>, _token: Token, left: Node, _bp: u32) -> Result<Node> {
    let args = p.arguments()?;

    let node = match left {
        Node::New { callee, args: None } => Node::New {
            callee,
            args: Some(args),
        },
        callee => Node::Call {
            callee: Box::new(callee),
            args,
        },
    };

    Ok(node)
}

fn update_op(token: &Token) -> UpdateOp {
    if token.value == "--" {
        UpdateOp::Decrement
    } else {
        UpdateOp::Increment
    }
}

// ─────────────────────────── first denotations ─────────────────────────

pub(crate) fn fud_block(p: &mut Parser<'_>, _token: Token) -> Result<Node> {
    let statements = p.statements()?;
    p.expect("}")?;
    Ok(Node::Block(statements))
}

pub(crate) fn fud_function(p: &mut Parser<'_>, token: Token) -> Result<Node> {
    let function = p.function(true, token.line)?;

    if p.next.id() == "(" && p.same_line() {
        return Err(p.error_at_next(
            "Function statements are not invocable. Wrap the function expression in parens.",
        ));
    }

    Ok(Node::Function(function))
}

pub(crate) fn fud_var(p: &mut Parser<'_>, _token: Token) -> Result<Node> {
    Ok(Node::Var(p.var_declarations()?))
}

pub(crate) fn fud_if(p: &mut Parser<'_>, _token: Token) -> Result<Node> {
    p.expect("(")?;
    let test = p.expression(0)?;
    p.expect(")")?;

    let consequent = p.block()?;

    // The nearest open `if` takes the `else`.
    let alternate = if p.next.id() == "else" {
        p.advance()?;
        Some(p.block()?)
    } else {
        None
    };

    Ok(Node::If {
        test: Box::new(test),
        consequent,
        alternate,
    })
}

pub(crate) fn fud_try(p: &mut Parser<'_>, _token: Token) -> Result<Node> {
    let block = p.braced_block()?;

    let handler = if p.next.id() == "catch" {
        p.advance()?;
        p.expect("(")?;
        let param = p.binding_identifier()?;
        p.expect(")")?;

        Some(CatchClause {
            param,
            body: p.braced_block()?,
        })
    } else {
        None
    };

    let finalizer = if p.next.id() == "finally" {
        p.advance()?;
        Some(p.braced_block()?)
    } else {
        None
    };

    if handler.is_none() && finalizer.is_none() {
        return Err(p.error_at_next(format!(
            "Expected 'catch' and instead saw '{}'.",
            p.next.token.describe()
        )));
    }

    Ok(Node::Try {
        block,
        handler,
        finalizer,
    })
}

pub(crate) fn fud_while(p: &mut Parser<'_>, _token: Token) -> Result<Node> {
    p.expect("(")?;
    let test = p.expression(0)?;
    p.expect(")")?;
    let body = p.loop_body()?;

    Ok(Node::While {
        test: Box::new(test),
        body,
    })
}

pub(crate) fn fud_with(p: &mut Parser<'_>, _token: Token) -> Result<Node> {
    p.expect("(")?;
    let object = p.expression(0)?;
    p.expect(")")?;
    let body = p.block()?;

    Ok(Node::With {
        object: Box::new(object),
        body,
    })
}

pub(crate) fn fud_do(p: &mut Parser<'_>, _token: Token) -> Result<Node> {
    let body = p.loop_body()?;
    p.expect("while")?;
    p.expect("(")?;
    let test = p.expression(0)?;
    p.expect(")")?;

    Ok(Node::DoWhile {
        body,
        test: Box::new(test),
    })
}

pub(crate) fn fud_switch(p: &mut Parser<'_>, _token: Token) -> Result<Node> {
    p.expect("(")?;
    let discriminant = p.expression(0)?;
    p.expect(")")?;
    p.expect("{")?;

    p.state.current().switch_depth += 1;

    let mut clauses: Vec<SwitchClause> = Vec::new();
    let mut seen_default = false;

    loop {
        match p.next.id() {
            "case" => {
                p.advance()?;
                let test = p.expression(0)?;
                p.expect(":")?;
                clauses.push(SwitchClause {
                    test: Some(test),
                    body: Vec::new(),
                });
            }

            "default" => {
                if seen_default {
                    return Err(p.error_at_next("More than one default clause in switch."));
                }

                seen_default = true;
                p.advance()?;
                p.expect(":")?;
                clauses.push(SwitchClause {
                    test: None,
                    body: Vec::new(),
                });
            }

            "}" => {
                p.advance()?;
                break;
            }

            "(end)" => return Err(p.error_at_next("Missing '}'.")),

            _ if clauses.is_empty() || p.next.symbol.reach => {
                return Err(p.error_at_next(format!(
                    "Expected 'case' and instead saw '{}'.",
                    p.next.token.describe()
                )));
            }

            _ => {
                let statements = p.statements()?;

                if let Some(clause) = clauses.last_mut() {
                    clause.body.extend(statements);
                }
            }
        }
    }

    p.state.current().switch_depth -= 1;

    Ok(Node::Switch {
        discriminant: Box::new(discriminant),
        clauses,
    })
}

pub(crate) fn fud_for(p: &mut Parser<'_>, _token: Token) -> Result<Node> {
    p.expect("(")?;

    let is_var = p.next.id() == "var";
    let in_position = if is_var { 1 } else { 0 };

    if p.peek(in_position)?.id() == "in" {
        let target = if is_var {
            p.advance()?;
            let name = p.binding_identifier()?;
            p.state.current().add_var(&name);
            ForInTarget::Var(name)
        } else {
            ForInTarget::Name(p.binding_identifier()?)
        };

        p.expect("in")?;
        let object = p.expression(0)?;
        p.expect(")")?;
        let body = p.loop_body()?;

        return Ok(Node::ForIn {
            target,
            object: Box::new(object),
            body,
        });
    }

    let init = if p.next.id() == ";" {
        None
    } else if is_var {
        p.advance()?;
        Some(Box::new(Node::Var(p.var_declarations()?)))
    } else {
        Some(Box::new(p.expression(0)?))
    };

    p.expect(";")?;

    let test = if p.next.id() != ";" {
        Some(Box::new(p.expression(0)?))
    } else {
        None
    };

    p.expect(";")?;

    if p.next.id() == ";" {
        return Err(p.error_at_next("Expected ')' and instead saw ';'."));
    }

    let update = if p.next.id() != ")" {
        Some(Box::new(p.expression(0)?))
    } else {
        None
    };

    p.expect(")")?;
    let body = p.loop_body()?;

    Ok(Node::For {
        init,
        test,
        update,
        body,
    })
}

/// Optional label after `break`/`continue`, validated against the labels in scope.
/// A `continue` label must name an enclosing iteration statement.
fn jump_label(p: &mut Parser<'_>, iteration: bool) -> Result<Option<String>> {
    if p.next.token.is_name() && !p.next.symbol.reserved && p.same_line() {
        let label = p.next.token.value.clone();
        let context = p.state.current();
        let known = context.labels.contains(&label);
        let names_loop = context.loop_labels.contains(&label);

        if !known {
            return Err(p.error_at_next(format!("Unrecognized label '{}'.", label)));
        }

        if iteration && !names_loop {
            return Err(p.error_at_next(format!("Label '{}' does not name a loop.", label)));
        }

        p.advance()?;
        return Ok(Some(label));
    }

    Ok(None)
}

pub(crate) fn fud_break(p: &mut Parser<'_>, token: Token) -> Result<Node> {
    let label = jump_label(p, false)?;
    let context = p.state.current();

    if label.is_none() && context.iteration_depth == 0 && context.switch_depth == 0 {
        return Err(p.error_at(&token, "break outside of a loop or a switch"));
    }

    Ok(Node::Break(label))
}

pub(crate) fn fud_continue(p: &mut Parser<'_>, token: Token) -> Result<Node> {
    if p.state.current().iteration_depth == 0 {
        return Err(p.error_at(&token, "continue outside of a loop"));
    }

    Ok(Node::Continue(jump_label(p, true)?))
}

pub(crate) fn fud_return(p: &mut Parser<'_>, token: Token) -> Result<Node> {
    if p.state.current().is_global {
        return Err(p.error_at(&token, "return declared in the global scope."));
    }

    if p.next.id() == ";" || p.next.symbol.reach || !p.same_line() {
        return Ok(Node::Return(None));
    }

    Ok(Node::Return(Some(Box::new(p.expression(0)?))))
}

pub(crate) fn fud_throw(p: &mut Parser<'_>, _token: Token) -> Result<Node> {
    Ok(Node::Throw(Box::new(p.expression(0)?)))
}

pub(crate) fn fud_debugger(_p: &mut Parser<'_>, _token: Token) -> Result<Node> {
    Ok(Node::Debugger)
}
