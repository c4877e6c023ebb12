use log::debug;
use serde::Serialize;
use std::fmt;

/// The different kinds of tokens produced by the scanner.
///
/// The scanner does not know the grammar: keywords come out as
/// `IDENTIFIER` and every operator or bracket as `PUNCTUATOR`.  The parser
/// maps each token onto a grammar symbol.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TokenKind {
    /// A name, including keywords and reserved words
    IDENTIFIER,

    /// An operator or bracket; `value` holds its text
    PUNCTUATOR,

    /// A numeric literal; `value` holds the lexeme
    NUMBER,

    /// A string literal; `value` holds the decoded contents
    STRING,

    /// A regular-expression literal; `value` holds `/body/flags`
    REGEXP,

    /// Line boundary pseudo-token
    ENDLINE,

    /// End-of-input marker
    END,
}

/// A scanned token, including its kind, literal value and position.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Token {
    /// The category of this token.
    pub kind: TokenKind,

    /// Literal value: punctuator text, name, number lexeme or decoded string.
    pub value: String,

    /// 1‑based line number in the source.
    pub line: usize,

    /// 1‑based column of the first character.
    pub column: usize,

    /// Byte offset of the first character.
    pub offset: usize,
}

impl Token {
    /// Create a new Token with the given kind, value, and position.
    pub fn new(kind: TokenKind, value: impl Into<String>, line: usize, column: usize, offset: usize) -> Self {
        let value: String = value.into();

        debug!(
            "Creating new token: kind={:?}, value={}, line={}",
            kind, value, line
        );

        Self {
            kind,
            value,
            line,
            column,
            offset,
        }
    }

    /// True for `IDENTIFIER` tokens, keywords included.
    #[inline]
    pub fn is_name(&self) -> bool {
        self.kind == TokenKind::IDENTIFIER
    }

    /// Human-readable form used by diagnostics: the text the user wrote.
    pub fn describe(&self) -> &str {
        match self.kind {
            TokenKind::END => "(end)",
            TokenKind::ENDLINE => "(endline)",
            _ => &self.value,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let variant: &'static str = match self.kind {
            TokenKind::IDENTIFIER => "IDENTIFIER",
            TokenKind::PUNCTUATOR => "PUNCTUATOR",
            TokenKind::NUMBER => "NUMBER",
            TokenKind::STRING => "STRING",
            TokenKind::REGEXP => "REGEXP",
            TokenKind::ENDLINE => "ENDLINE",
            TokenKind::END => "END",
        };

        match self.kind {
            TokenKind::STRING => write!(f, "{} {:?} {}:{}", variant, self.value, self.line, self.column),
            TokenKind::ENDLINE | TokenKind::END => write!(f, "{} {}", variant, self.line),
            _ => write!(f, "{} {} {}:{}", variant, self.value, self.line, self.column),
        }
    }
}
