//! Module `scanner` implements a one‑pass, streaming lexer for the JavaScript subset
//! understood by the parser.
//!
//! It transforms a `&str` into a sequence of [`Token`]s, skipping whitespace and
//! comments, emitting one `ENDLINE` pseudo-token per line break and exactly one `END`
//! token at the end.  Designed as a `FusedIterator`, it can be chained safely with other
//! iterator adapters.
//!
//! # Public API
//!
//! - `Scanner::new(src: &'a str) -> Scanner<'a>`
//!   Create a new lexer over the input buffer.
//!
//! - `impl Iterator for Scanner<'a>`
//!   Yields `Result<Token, JsError>` on each `.next()`.
//!
//! # Token Recognition
//!
//! - Punctuators: longest match against the perfect‑hash `PUNCTUATORS` set.
//! - String literals: `"` … `"` or `'` … `'` with the usual escapes, including
//!   `\xHH`, `\uHHHH` and line continuations.
//! - Numeric literals: integers, fractions, exponents and `0x` hexadecimal.
//! - Identifiers: `[A-Za-z_$][A-Za-z0-9_$]*`; keywords are *not* distinguished here.
//! - Regular expressions: a `/` that appears where an operand is expected
//!   (tracked in `prereg`) starts a regexp literal instead of a division.
//! - Comments: `//` skipped with `memchr`, `/* … */` may span lines but not nest.

use crate::error::{JsError, Result};
use crate::token::{Token, TokenKind};
use log::{debug, info};
use memchr::memchr;
use phf::phf_set;
use std::iter::FusedIterator;

// ─────────────────────────────────────────────────────────────────────────────
// Static punctuator set (compile‑time perfect hash)
// ─────────────────────────────────────────────────────────────────────────────

static PUNCTUATORS: phf::Set<&'static str> = phf_set! {
    "{", "}", "(", ")", "[", "]", ".", ",", ":", ";", "?", "~",
    "=", "==", "===", "!", "!=", "!==",
    "+", "++", "+=", "-", "--", "-=", "*", "*=", "/", "/=", "%", "%=",
    "&", "&&", "&=", "|", "||", "|=", "^", "^=",
    "<", "<=", "<<", "<<=", ">", ">=", ">>", ">>=", ">>>", ">>>=",
};

/// Keywords after which a `/` begins a regular expression.
static REGEXP_PRECEDERS: phf::Set<&'static str> = phf_set! {
    "return", "typeof", "in", "instanceof", "new", "delete", "void", "case", "throw",
};

/// A single pass **scanner / lexer** over JavaScript source text.
pub struct Scanner<'a> {
    text: &'a str,
    src: &'a [u8],
    start: usize,      // index of the *first* byte of the current lexeme
    curr: usize,       // index *one past* the last byte examined
    line: usize,       // 1‑based line counter (\n increments)
    line_start: usize, // byte offset where the current line begins
    start_line: usize, // line / column of the current lexeme
    start_column: usize,
    prereg: bool, // would a `/` start a regexp here?
    finished: bool,
}

impl<'a> Scanner<'a> {
    /// Create a new lexer over `text`.
    #[inline]
    pub fn new(text: &'a str) -> Self {
        info!("Scanner created over {} bytes", text.len());

        Self {
            text,
            src: text.as_bytes(),
            start: 0,
            curr: 0,
            line: 1,
            line_start: 0,
            start_line: 1,
            start_column: 1,
            prereg: true,
            finished: false,
        }
    }

    // ───────────────────────────── primitive helpers ────────────────────────

    #[inline(always)]
    fn is_at_end(&self) -> bool {
        self.curr >= self.src.len()
    }

    #[inline(always)]
    fn advance(&mut self) -> u8 {
        let b = self.src[self.curr];
        self.curr += 1;
        b
    }

    /// Peek at the current byte without consuming it.  Returns `0` past EOF.
    #[inline(always)]
    fn peek(&self) -> u8 {
        self.src.get(self.curr).copied().unwrap_or(0)
    }

    #[inline(always)]
    fn peek_next(&self) -> u8 {
        self.src.get(self.curr + 1).copied().unwrap_or(0)
    }

    #[inline(always)]
    fn newline(&mut self) {
        self.line += 1;
        self.line_start = self.curr;
    }

    #[inline(always)]
    fn column(&self) -> usize {
        self.curr - self.line_start + 1
    }

    fn error(&self, message: impl Into<String>) -> JsError {
        JsError::lex(self.line, self.column(), message)
    }

    fn token(&self, kind: TokenKind, value: impl Into<String>) -> Token {
        Token::new(kind, value, self.start_line, self.start_column, self.start)
    }

    // ───────────────────────────── core lexing ─────────────────────────────

    /// Scan a *single* token starting at `self.curr`.  Whitespace and comments
    /// yield `Ok(None)`.
    fn scan_token(&mut self) -> Result<Option<Token>> {
        let b = self.advance();

        match b {
            b' ' | b'\r' | b'\t' | 0x0b | 0x0c => Ok(None),

            b'\n' => {
                self.newline();

                Ok(Some(self.token(TokenKind::ENDLINE, "")))
            }

            b'/' if self.peek() == b'/' => {
                // Fast‑forward to the next newline; the newline itself still
                // produces its ENDLINE token.
                match memchr(b'\n', &self.src[self.curr..]) {
                    Some(pos) => self.curr += pos,
                    None => self.curr = self.src.len(),
                }

                Ok(None)
            }

            b'/' if self.peek() == b'*' => self.block_comment(),

            b'/' if self.prereg => self.regexp(),

            b'"' | b'\'' => self.string(b).map(Some),

            b'0'..=b'9' => Ok(Some(self.number())),

            b'.' if self.peek().is_ascii_digit() => Ok(Some(self.number())),

            b'a'..=b'z' | b'A'..=b'Z' | b'_' | b'$' => Ok(Some(self.identifier())),

            _ => self.punctuator(),
        }
    }

    fn block_comment(&mut self) -> Result<Option<Token>> {
        self.advance(); // '*'
        let first_line = self.line;

        loop {
            if self.is_at_end() {
                return Err(self.error("Unclosed comment."));
            }

            match self.advance() {
                b'\n' => self.newline(),
                b'*' if self.peek() == b'/' => {
                    self.advance();
                    break;
                }
                b'/' if self.peek() == b'*' => {
                    return Err(self.error("Nested comment."));
                }
                _ => {}
            }
        }

        if self.line != first_line {
            Ok(Some(self.token(TokenKind::ENDLINE, "")))
        } else {
            Ok(None)
        }
    }

    fn punctuator(&mut self) -> Result<Option<Token>> {
        for len in (1..=4).rev() {
            let end = self.start + len;

            if end > self.src.len() || !self.text.is_char_boundary(end) {
                continue;
            }

            let candidate = &self.text[self.start..end];

            if PUNCTUATORS.contains(candidate) {
                self.curr = end;

                return Ok(Some(self.token(TokenKind::PUNCTUATOR, candidate)));
            }
        }

        let ch = self.text[self.start..].chars().next().unwrap_or('\0');

        Err(JsError::lex(
            self.start_line,
            self.start_column,
            format!("Unexpected '{}'.", ch),
        ))
    }

    /// Parse a quoted string literal, decoding escapes.
    fn string(&mut self, quote: u8) -> Result<Token> {
        let mut out = String::new();

        loop {
            if self.is_at_end() {
                return Err(self.error("Unclosed string."));
            }

            let rest = &self.text[self.curr..];
            let ch = rest.chars().next().unwrap_or('\0');
            self.curr += ch.len_utf8();

            match ch {
                c if c as u32 == quote as u32 => break,

                '\n' => return Err(self.error("Unclosed string.")),

                '\\' => {
                    if self.is_at_end() {
                        return Err(self.error("Unclosed string."));
                    }

                    let esc = self.text[self.curr..].chars().next().unwrap_or('\0');
                    self.curr += esc.len_utf8();

                    match esc {
                        '\n' => self.newline(),
                        'b' => out.push('\u{8}'),
                        'f' => out.push('\u{c}'),
                        'n' => out.push('\n'),
                        'r' => out.push('\r'),
                        't' => out.push('\t'),
                        'v' => out.push('\u{b}'),
                        'x' => out.push(self.hex_escape(2)?),
                        'u' => out.push(self.hex_escape(4)?),
                        other => out.push(other),
                    }
                }

                other => out.push(other),
            }
        }

        Ok(self.token(TokenKind::STRING, out))
    }

    fn hex_escape(&mut self, digits: usize) -> Result<char> {
        let end = self.curr + digits;

        let code = self
            .text
            .get(self.curr..end)
            .and_then(|hex| u32::from_str_radix(hex, 16).ok())
            .ok_or_else(|| self.error("Bad escapement."))?;

        self.curr = end;

        Ok(char::from_u32(code).unwrap_or('\u{fffd}'))
    }

    /// Parse a numeric literal (`123`, `3.14`, `.5`, `1e9`, `0x1F`).
    fn number(&mut self) -> Token {
        let first = self.src[self.start];

        if first == b'0' && matches!(self.peek(), b'x' | b'X') && self.peek_next().is_ascii_hexdigit() {
            self.advance();

            while self.peek().is_ascii_hexdigit() {
                self.advance();
            }
        } else {
            while self.peek().is_ascii_digit() {
                self.advance();
            }

            if first != b'.' && self.peek() == b'.' {
                self.advance();
            }

            while self.peek().is_ascii_digit() {
                self.advance();
            }

            if matches!(self.peek(), b'e' | b'E') {
                let save = self.curr;
                self.advance();

                if matches!(self.peek(), b'+' | b'-') {
                    self.advance();
                }

                if self.peek().is_ascii_digit() {
                    while self.peek().is_ascii_digit() {
                        self.advance();
                    }
                } else {
                    self.curr = save;
                }
            }
        }

        self.token(TokenKind::NUMBER, &self.text[self.start..self.curr])
    }

    fn identifier(&mut self) -> Token {
        while {
            let c: u8 = self.peek();
            c.is_ascii_alphanumeric() || c == b'_' || c == b'$'
        } {
            self.advance();
        }

        self.token(TokenKind::IDENTIFIER, &self.text[self.start..self.curr])
    }

    /// Parse `/body/flags`.  `self.start` points at the opening slash.
    fn regexp(&mut self) -> Result<Option<Token>> {
        let mut in_class = false;

        loop {
            if self.is_at_end() || self.peek() == b'\n' {
                return Err(self.error("Unterminated regular expression."));
            }

            match self.advance() {
                b'\\' => {
                    if self.is_at_end() || self.peek() == b'\n' {
                        return Err(self.error("Unterminated regular expression."));
                    }
                    self.advance();
                }
                b'[' => in_class = true,
                b']' => in_class = false,
                b'/' if !in_class => break,
                _ => {}
            }
        }

        while matches!(self.peek(), b'g' | b'i' | b'm' | b'y') {
            self.advance();
        }

        Ok(Some(self.token(
            TokenKind::REGEXP,
            &self.text[self.start..self.curr],
        )))
    }

    /// Can a regexp literal follow `token`?
    fn update_prereg(&mut self, token: &Token) {
        self.prereg = match token.kind {
            TokenKind::PUNCTUATOR => token
                .value
                .chars()
                .last()
                .map_or(true, |c| "(,=:[!&|?{};".contains(c)),
            TokenKind::IDENTIFIER => REGEXP_PRECEDERS.contains(token.value.as_str()),
            _ => false,
        };
    }
}

// ───────────────────────── Iterator implementation ─────────────────────────

impl<'a> Iterator for Scanner<'a> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        // Loop until we either emit a token, hit EOF, or see an error.
        loop {
            if self.is_at_end() {
                self.finished = true;
                self.start = self.curr;
                self.start_line = self.line;
                self.start_column = self.column();

                return Some(Ok(self.token(TokenKind::END, "")));
            }

            self.start = self.curr;
            self.start_line = self.line;
            self.start_column = self.column();

            match self.scan_token() {
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e));
                }

                Ok(Some(token)) => {
                    if token.kind != TokenKind::ENDLINE {
                        self.update_prereg(&token);
                    }

                    debug!("Scanned token {}", token);

                    return Some(Ok(token));
                }

                // whitespace / comment → continue loop.
                Ok(None) => {}
            }
        }
    }
}

impl<'a> FusedIterator for Scanner<'a> {}
