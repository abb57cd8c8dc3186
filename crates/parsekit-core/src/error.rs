// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Error types and the replaceable error sink.
//!
//! Three kinds of failure flow through the crate:
//!
//! 1. **Programmer errors** — case violations in token names, a zero-token
//!    expectation, a too-short optional sequence. These panic; they are
//!    bugs in the grammar, not input data.
//! 2. **Fatal errors** — an unterminated string or comment, or end-of-file
//!    where the grammar demanded a symbol. These are returned as
//!    [`FatalError`] and abort the parse of one file; the host decides
//!    between terminating and moving on to the next file.
//! 3. **Syntax errors** — an expectation or sequence that did not match.
//!    These are returned as [`SyntaxError`] values so the caller can
//!    recover, attempt alternatives, or push symbols back.
//!
//! Surfaced errors are funnelled through an [`ErrorSink`]; the default
//! [`AbortingSink`] prints each error and terminates the process with
//! [`EXIT_TOO_MANY_ERRORS`] once too many have accumulated.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, LazyLock};

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

use crate::symbol::Symbol;

/// Exit code used when error accumulation passes the sink's limit.
pub const EXIT_TOO_MANY_ERRORS: i32 = 22;

/// How many errors the default sink tolerates before terminating.
pub const DEFAULT_ERROR_LIMIT: usize = 16;

/// An unrecoverable failure that aborts the current parse.
///
/// The `Display` rendering is the diagnostic line format callers key on:
/// `file:line:col: error: <message>`, widening to
/// `file:line:col-line:col: error: <message>` when the offending span
/// covers more than one character.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum FatalError {
    /// The lexer hit input it cannot carry on from.
    #[error("{location}: error: {message}")]
    Lex {
        /// Pre-formatted `file:line:col` (or span) prefix.
        location: String,
        /// What went wrong, e.g. `unterminated multiline comment`.
        message: String,
        /// Byte span of the offending token candidate.
        #[label("here")]
        span: SourceSpan,
    },

    /// The grammar demanded a symbol but the source was exhausted.
    #[error("{location}: unexpected end-of-file")]
    UnexpectedEof {
        /// Pre-formatted `file:line:col` prefix.
        location: String,
        /// Where the input ended.
        #[label("input ends here")]
        span: SourceSpan,
    },
}

/// A recoverable mismatch, returned as a value.
///
/// The message carries the full formatted diagnostic line(s); `Display`
/// emits it verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("{message}")]
pub struct SyntaxError {
    /// The complete formatted diagnostic.
    pub message: String,
    /// Byte span of the offending symbol.
    #[label("here")]
    pub span: SourceSpan,
}

impl SyntaxError {
    /// Creates a syntax error from a pre-formatted message and span.
    #[must_use]
    pub fn new(message: impl Into<String>, span: impl Into<SourceSpan>) -> Self {
        Self {
            message: message.into(),
            span: span.into(),
        }
    }
}

/// Either kind of failure an expectation can produce.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum ParseError {
    /// The parse cannot continue.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Fatal(#[from] FatalError),

    /// The current symbol did not match; the caller may recover.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(#[from] SyntaxError),
}

/// Failure modes of an optional sequence match.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequenceError {
    /// The lexer failed while reading ahead.
    #[error(transparent)]
    Fatal(#[from] FatalError),

    /// The sequence matched partway and then diverged.
    ///
    /// `seen` holds the symbols traversed before the mismatch, in order,
    /// suitable for handing straight back to `Parser::push` to rewind.
    #[error("{error}")]
    Mismatch {
        /// Symbols consumed before the mismatch.
        seen: Vec<Symbol>,
        /// The mismatch itself.
        error: SyntaxError,
    },
}

/// Receives every surfaced (recoverable) error.
///
/// The sink is deliberately an injected policy rather than a hidden
/// singleton, so hosts can count, collect, or re-route errors and tests
/// can verify the exact sequence delivered.
pub trait ErrorSink: Send + Sync {
    /// Accepts one surfaced error.
    fn raise(&self, error: &SyntaxError);
}

/// The default sink: print each error to stderr and terminate the process
/// with [`EXIT_TOO_MANY_ERRORS`] once the count passes the limit.
#[derive(Debug)]
pub struct AbortingSink {
    limit: usize,
    errors: AtomicUsize,
}

impl AbortingSink {
    /// Creates a sink tolerating `limit` errors before terminating.
    #[must_use]
    pub const fn new(limit: usize) -> Self {
        Self {
            limit,
            errors: AtomicUsize::new(0),
        }
    }

    /// Number of errors raised so far.
    #[must_use]
    pub fn errors(&self) -> usize {
        self.errors.load(Ordering::Relaxed)
    }

    /// Records one more error, returning the new total.
    fn record(&self) -> usize {
        self.errors.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Returns `true` once the error count has passed the limit.
    #[must_use]
    pub fn exhausted(&self) -> bool {
        self.errors() > self.limit
    }
}

impl Default for AbortingSink {
    fn default() -> Self {
        Self::new(DEFAULT_ERROR_LIMIT)
    }
}

impl ErrorSink for AbortingSink {
    fn raise(&self, error: &SyntaxError) {
        eprintln!("{error}");
        if self.record() > self.limit {
            eprintln!("too many errors, terminating");
            std::process::exit(EXIT_TOO_MANY_ERRORS);
        }
    }
}

impl fmt::Debug for dyn ErrorSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ErrorSink")
    }
}

/// The process-wide default sink handed to parsers that don't inject one.
pub(crate) fn default_sink() -> Arc<dyn ErrorSink> {
    static SINK: LazyLock<Arc<AbortingSink>> = LazyLock::new(Arc::default);
    SINK.clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_lex_display() {
        let error = FatalError::Lex {
            location: "mytest.txt:2:1-2:6".into(),
            message: "goes boom".into(),
            span: (1, 5).into(),
        };
        assert_eq!(error.to_string(), "mytest.txt:2:1-2:6: error: goes boom");
    }

    #[test]
    fn fatal_eof_display() {
        let error = FatalError::UnexpectedEof {
            location: "input.src:4:1".into(),
            span: (12, 0).into(),
        };
        assert_eq!(error.to_string(), "input.src:4:1: unexpected end-of-file");
    }

    #[test]
    fn syntax_error_displays_message_verbatim() {
        let error = SyntaxError::new("a.src:1:1: syntax error: expected period, got: \"x\"", (0, 1));
        assert_eq!(
            error.to_string(),
            "a.src:1:1: syntax error: expected period, got: \"x\""
        );
    }

    #[test]
    fn parse_error_is_transparent() {
        let fatal = FatalError::UnexpectedEof {
            location: "f:1:1".into(),
            span: (0, 0).into(),
        };
        let error = ParseError::from(fatal.clone());
        assert_eq!(error.to_string(), fatal.to_string());
    }

    #[test]
    fn aborting_sink_counts_below_limit() {
        let sink = AbortingSink::new(100);
        let error = SyntaxError::new("x", (0, 0));
        for _ in 0..5 {
            sink.raise(&error);
        }
        assert_eq!(sink.errors(), 5);
        assert!(!sink.exhausted());
    }
}
