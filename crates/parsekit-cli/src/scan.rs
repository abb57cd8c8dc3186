// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Per-file scanning.
//!
//! One lexer/parser pair per file: drive the stream to EOF, count the
//! significant symbols, and surface anything the dispatch table could
//! not classify. Fatal errors abort the file and leave the rest of the
//! pool running.

use std::fs;
use std::sync::Arc;

use camino::Utf8Path;
use parsekit_core::error::{DEFAULT_ERROR_LIMIT, ErrorSink, EXIT_TOO_MANY_ERRORS, SyntaxError};
use parsekit_core::lexer::Lexer;
use parsekit_core::parser::Parser;
use parsekit_core::token;
use tracing::{debug, warn};

use crate::stats;

/// Error sink wired into the stats tables: print, count under `errors`,
/// and terminate once too many have accumulated.
#[derive(Debug)]
pub struct StatsSink {
    limit: u64,
}

impl StatsSink {
    /// Creates a sink tolerating `limit` errors before terminating.
    #[must_use]
    pub const fn new(limit: u64) -> Self {
        Self { limit }
    }
}

impl Default for StatsSink {
    fn default() -> Self {
        Self::new(DEFAULT_ERROR_LIMIT as u64)
    }
}

impl ErrorSink for StatsSink {
    fn raise(&self, error: &SyntaxError) {
        eprintln!("{error}");
        if stats::bump("errors", 1) > self.limit {
            eprintln!("too many errors, terminating");
            std::process::exit(EXIT_TOO_MANY_ERRORS);
        }
    }
}

/// Shared configuration for every scanned file.
pub struct ScanOptions {
    /// Where surfaced errors go.
    pub sink: Arc<dyn ErrorSink>,
    /// Forwarded to each parser's tracing flag.
    pub tracing: bool,
    /// Forwarded to each parser's verbose tracing flag.
    pub verbose_tracing: bool,
}

/// Scans one file: lex and drive the parser to EOF, counting symbols
/// and raising on unclassifiable input.
pub fn scan_file(path: &Utf8Path, options: &ScanOptions) {
    debug!("scanning {path}");

    let code = match fs::read(path) {
        Ok(code) => code,
        Err(error) => {
            warn!("cannot read {path}: {error}");
            stats::bump("files.unreadable", 1);
            return;
        }
    };

    let parser = match Parser::new(Lexer::new(path.as_str(), &code), Vec::new()) {
        Ok(parser) => parser,
        Err(fatal) => {
            eprintln!("{fatal}");
            stats::bump("errors.fatal", 1);
            return;
        }
    };
    let mut parser = parser.with_sink(Arc::clone(&options.sink));
    parser.tracing = options.tracing;
    parser.verbose_tracing = options.verbose_tracing;

    stats::bump("files.parsed", 1);
    let mut symbols = 0u64;
    while !parser.eof() {
        symbols += 1;
        let current = parser.current();
        if current.is(*token::INVALID) {
            let error = parser.error_at(current, "unrecognized input");
            parser.raise(&error);
        }
        if let Err(fatal) = parser.next() {
            eprintln!("{fatal}");
            stats::bump("errors.fatal", 1);
            return;
        }
    }
    stats::bump("symbols", symbols);
}
