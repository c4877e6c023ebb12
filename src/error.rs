//! Centralised error hierarchy for the **ECMAScript interpreter**.
//!
//! All subsystems (scanner, parser, runtime, CLI) convert their failure modes
//! into one of the variants defined here.  This enables a uniform `Result<T>`
//! alias throughout the crate and ergonomic inter‑operation with `anyhow`,
//! while still preserving rich diagnostic detail.
//!
//! Script-level exceptions never appear here while they can still be caught:
//! inside the engine they travel as `throw` completions, and only an exception
//! that escapes the outermost `run` becomes [`JsError::Uncaught`].
//!
//! The module **does not** print diagnostics itself

use std::io;
use thiserror::Error;

use log::info;

/// Canonical error type used throughout the interpreter.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum JsError {
    /// Lexical (scanner) error with source position.
    #[error("[line {line}:{column}] SyntaxError: {message}")]
    Lex {
        /// Human‑readable description.
        message: String,

        /// 1‑based line where the error occurred.
        line: usize,

        /// 1‑based column where the error occurred.
        column: usize,
    },

    /// Grammar violation.  Parsing stops at the first one.
    #[error("{file_name}[line {line}:{column}] SyntaxError: {message}\n    {source_line}")]
    Syntax {
        message: String,
        line: usize,
        column: usize,

        /// Text of the offending source line, for the caret-less report.
        source_line: String,

        /// Name the embedder gave the source, or empty.
        file_name: String,
    },

    /// A script `throw` that no `try` caught.  `rendered` is the ToString of
    /// the thrown value, computed while the realm was still available.
    #[error("Uncaught {rendered}")]
    Uncaught {
        rendered: String,

        /// `name` of the thrown Error object, empty for non-Error values.
        name: String,
    },

    /// Parser/runtime mismatch.  Never produced by well-formed input.
    #[error("Internal error: {0}")]
    Internal(String),

    /// Wrapper around `std::io::Error` (transparent).  Enables `?` on I/O ops.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// UTF‑8 decoding failure when ingesting external text.
    #[error(transparent)]
    Utf8(#[from] std::str::Utf8Error),
}

impl JsError {
    /// Helper constructor for the **scanner**.
    pub fn lex<S: Into<String>>(line: usize, column: usize, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Lex error: line={}, msg={}", line, message);

        JsError::Lex {
            message,
            line,
            column,
        }
    }

    /// Helper constructor for the **parser**.
    pub fn syntax<S: Into<String>>(
        line: usize,
        column: usize,
        msg: S,
        source_line: &str,
        file_name: &str,
    ) -> Self {
        let message: String = msg.into();

        info!("Creating Syntax error: line={}, msg={}", line, message);

        JsError::Syntax {
            message,
            line,
            column,
            source_line: source_line.trim_end().to_string(),
            file_name: file_name.to_string(),
        }
    }

    /// Helper constructor for host-level invariant violations.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Internal error: {}", message);

        JsError::Internal(message)
    }

    /// True for the errors that abort before any execution happens.
    pub fn is_syntax(&self) -> bool {
        matches!(self, JsError::Lex { .. } | JsError::Syntax { .. })
    }
}

/// Crate‑wide `Result` alias.
pub type Result<T> = std::result::Result<T, JsError>;
