//! Grammar table for the Pratt parser.
//!
//! Every operator, keyword and punctuator is a [`Symbol`] keyed by its id
//! (`"+"`, `"if"`, `"(identifier)"`, …).  A symbol carries its left binding
//! power and up to three parse rules:
//!
//! * **nud**: null denotation, used when the token starts an expression;
//! * **led**: left denotation, used when the token follows a left operand;
//! * **fud**: first denotation, used only when the token starts a statement.
//!
//! Rules are plain function pointers with no captured state.  The binding
//! power a rule should parse its operand with is stored next to the pointer,
//! so `infix("+", 130)` and `infix("*", 140)` share one function.
//!
//! The standard JavaScript table is built once into [`GRAMMAR`] and never
//! mutated afterwards, so any number of parses may read it concurrently.

use crate::ast::Node;
use crate::error::Result;
use crate::parser::{self, Parser};
use crate::token::{Token, TokenKind};

use log::info;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Null denotation: `(parser, token, right binding power)`.
pub type NudFn = fn(&mut Parser<'_>, Token, u32) -> Result<Node>;

/// Left denotation: `(parser, token, left operand, right binding power)`.
pub type LedFn = fn(&mut Parser<'_>, Token, Node, u32) -> Result<Node>;

/// First denotation: `(parser, token)`.
pub type FudFn = fn(&mut Parser<'_>, Token) -> Result<Node>;

/// One grammar symbol.  Shared, read-only after registration.
#[derive(Debug, Clone)]
pub struct Symbol {
    pub id: &'static str,

    /// Left binding power (precedence when used as an infix/postfix operator).
    pub lbp: u32,

    /// Cannot be used as a variable, function or label name.
    pub reserved: bool,

    /// Written like a name (keywords and `(identifier)` itself).
    pub identifier: bool,

    /// Terminates a statement list: `}`, `case`, end of input, …
    pub reach: bool,

    /// A line break before this token ends the expression (`a \n ++b`).
    pub restricted: bool,

    pub nud: Option<(NudFn, u32)>,
    pub led: Option<(LedFn, u32)>,
    pub fud: Option<FudFn>,
}

impl Symbol {
    fn new(id: &'static str, lbp: u32) -> Self {
        Self {
            id,
            lbp,
            reserved: false,
            identifier: false,
            reach: false,
            restricted: false,
            nud: None,
            led: None,
            fud: None,
        }
    }
}

/// Registry of symbols.
#[derive(Debug, Default)]
pub struct Grammar {
    symbols: HashMap<&'static str, Symbol>,
}

/// The JavaScript grammar, built on first use.
pub static GRAMMAR: Lazy<Grammar> = Lazy::new(Grammar::standard);

impl Grammar {
    pub fn new() -> Self {
        Self::default()
    }

    // ───────────────────────── registration ──────────────────────────

    /// Create the symbol or merge into an existing one, keeping the larger
    /// binding power.
    pub fn define(&mut self, id: &'static str, lbp: u32) -> &mut Symbol {
        let symbol = self.symbols.entry(id).or_insert_with(|| Symbol::new(id, lbp));
        symbol.lbp = symbol.lbp.max(lbp);
        symbol
    }

    pub fn attach_nud(&mut self, id: &'static str, rule: NudFn, bp: u32) -> &mut Symbol {
        let symbol = self.define(id, 0);
        symbol.nud = Some((rule, bp));
        symbol
    }

    pub fn attach_led(&mut self, id: &'static str, lbp: u32, rule: LedFn, bp: u32) -> &mut Symbol {
        let symbol = self.define(id, lbp);
        symbol.led = Some((rule, bp));
        symbol
    }

    pub fn attach_fud(&mut self, id: &'static str, rule: FudFn) -> &mut Symbol {
        let symbol = self.define(id, 0);
        symbol.fud = Some(rule);
        symbol
    }

    /// Mark a word as reserved.
    pub fn reserve(&mut self, id: &'static str) -> &mut Symbol {
        let symbol = self.define(id, 0);
        symbol.reserved = true;
        symbol.identifier = true;
        symbol
    }

    pub fn mark_reach(&mut self, id: &'static str) -> &mut Symbol {
        let symbol = self.define(id, 0);
        symbol.reach = true;
        symbol
    }

    fn infix(&mut self, id: &'static str, bp: u32) {
        self.attach_led(id, bp, parser::led_infix, bp);
    }

    fn prefix(&mut self, id: &'static str, bp: u32) {
        self.attach_nud(id, parser::nud_prefix, bp);
    }

    fn assignment(&mut self, id: &'static str) {
        self.attach_led(id, 20, parser::led_assignment, 19);
    }

    fn statement(&mut self, id: &'static str, rule: FudFn) {
        self.reserve(id);
        self.attach_fud(id, rule);
    }

    // ─────────────────────────── lookup ──────────────────────────────

    pub fn get(&self, id: &str) -> Option<&Symbol> {
        self.symbols.get(id)
    }

    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.values()
    }

    /// Map a scanned token onto its grammar symbol.
    ///
    /// Punctuators and names that appear in the table use their own symbol;
    /// any other name is an `(identifier)`.
    pub fn symbol_for(&self, token: &Token) -> &Symbol {
        let id = match token.kind {
            TokenKind::PUNCTUATOR => token.value.as_str(),
            TokenKind::IDENTIFIER => {
                if self.symbols.contains_key(token.value.as_str()) {
                    token.value.as_str()
                } else {
                    "(identifier)"
                }
            }
            TokenKind::NUMBER => "(number)",
            TokenKind::STRING => "(string)",
            TokenKind::REGEXP => "(regexp)",
            TokenKind::ENDLINE => "(endline)",
            TokenKind::END => "(end)",
        };

        self.symbols.get(id).unwrap_or(&*UNKNOWN)
    }

    // ───────────────────────── the JS table ──────────────────────────

    /// Build the JavaScript grammar.
    pub fn standard() -> Self {
        let mut g = Grammar::new();

        g.attach_nud("(number)", parser::nud_literal, 0);
        g.attach_nud("(string)", parser::nud_literal, 0);
        g.attach_nud("(regexp)", parser::nud_literal, 0);
        g.attach_nud("(identifier)", parser::nud_literal, 0).identifier = true;

        for id in ["(begin)", "(endline)"] {
            g.define(id, 0);
        }

        for id in ["(end)", "}", ":"] {
            g.mark_reach(id);
        }

        for id in [")", "]", ";"] {
            g.define(id, 0);
        }

        g.infix(",", 10);

        for id in ["else", "catch", "finally"] {
            g.reserve(id);
        }

        g.reserve("case").reach = true;
        g.reserve("default").reach = true;

        for id in ["this", "null", "true", "false"] {
            g.reserve(id);
            g.attach_nud(id, parser::nud_literal, 0);
        }

        for id in [
            "=", "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "<<=", ">>=", ">>>=",
        ] {
            g.assignment(id);
        }

        g.attach_led("?", 30, parser::led_conditional, 10);

        g.infix("||", 40);
        g.infix("&&", 50);
        g.infix("|", 70);
        g.infix("^", 80);
        g.infix("&", 90);

        for id in ["==", "===", "!=", "!==", "<", ">", "<=", ">="] {
            g.infix(id, 100);
        }

        for id in ["<<", ">>", ">>>"] {
            g.infix(id, 120);
        }

        for id in ["in", "instanceof"] {
            g.reserve(id);
            g.infix(id, 120);
        }

        g.infix("+", 130);
        g.prefix("+", 150);
        g.infix("-", 130);
        g.prefix("-", 150);

        for id in ["*", "/", "%"] {
            g.infix(id, 140);
        }

        for id in ["++", "--"] {
            g.attach_led(id, 151, parser::led_suffix, 0).restricted = true;
            g.attach_nud(id, parser::nud_prefix_update, 150);
        }

        for id in ["~", "!"] {
            g.prefix(id, 150);
        }

        for id in ["typeof", "void", "delete"] {
            g.reserve(id);
            g.prefix(id, 150);
        }

        g.reserve("new");
        g.attach_nud("new", parser::nud_new, 155);

        g.attach_led(".", 160, parser::led_member, 0);
        g.attach_led("(", 155, parser::led_call, 0);
        g.attach_nud("(", parser::nud_group, 0);
        g.attach_led("[", 160, parser::led_index, 0);
        g.attach_nud("[", parser::nud_array, 0);

        g.attach_fud("{", parser::fud_block);
        g.attach_nud("{", parser::nud_object, 0);

        g.statement("function", parser::fud_function);
        g.attach_nud("function", parser::nud_function, 0);

        g.statement("var", parser::fud_var);
        g.statement("if", parser::fud_if);
        g.statement("try", parser::fud_try);
        g.statement("while", parser::fud_while);
        g.statement("with", parser::fud_with);
        g.statement("switch", parser::fud_switch);
        g.statement("do", parser::fud_do);
        g.statement("for", parser::fud_for);
        g.statement("break", parser::fud_break);
        g.statement("continue", parser::fud_continue);
        g.statement("return", parser::fud_return);
        g.statement("throw", parser::fud_throw);
        g.statement("debugger", parser::fud_debugger);

        for id in [
            "abstract", "boolean", "byte", "char", "class", "const", "double", "enum",
            "export", "extends", "final", "float", "goto", "implements", "import", "int",
            "interface", "long", "native", "package", "private", "protected", "public",
            "short", "static", "super", "synchronized", "throws", "transient", "volatile",
        ] {
            g.reserve(id);
        }

        info!("Grammar table built with {} symbols", g.symbols.len());

        g
    }
}

/// Fallback for tokens the table does not know; it has no rules, so using it
/// anywhere produces a syntax error.
static UNKNOWN: Lazy<Symbol> = Lazy::new(|| Symbol::new("(unknown)", 0));
