// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Byte-level lexical analysis.
//!
//! The [`Lexer`] streams over a borrowed byte buffer, classifying one
//! token candidate at a time. It keeps a `[start, end)` span delimiting
//! the current candidate and dispatches on the first byte through the
//! [dispatch table](crate::token_map) to pick a sub-recognizer: words,
//! numbers, comments, quoted strings, or greedy whitespace runs.
//!
//! Grammars hook in two ways:
//!
//! - **Keywords**: registered words are reclassified from `IDENTIFIER`
//!   to the registered terminal.
//! - **Intercepts**: callables that run after the dispatch-table lookup
//!   but before the default sub-recognizers, against a scratch
//!   [`Snapshot`] of the lexer's state. A rejecting intercept leaves no
//!   trace; the first accepting intercept's snapshot is committed.
//!
//! Input is treated as bytes; tokenization is ASCII-centric.

use std::collections::HashMap;
use std::fmt;
use std::str;

use crate::error::FatalError;
use crate::token::{self, Token};
use crate::token_map;

/// A mutable snapshot of the lexer's observable state, handed to
/// intercepts.
///
/// Intercepts read the buffer and move `start`/`end`/`token` freely; the
/// lexer only commits the snapshot when the intercept accepts. The same
/// byte-level primitives the lexer itself uses are available here.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    code: &'a [u8],
    /// Byte offset of the first byte of the current candidate.
    pub start: usize,
    /// Byte offset one past the last consumed byte.
    pub end: usize,
    /// The candidate's classification so far.
    pub token: Token,
}

impl<'a> Snapshot<'a> {
    /// The literal bytes of the current candidate.
    #[must_use]
    pub fn value(&self) -> &'a [u8] {
        &self.code[self.start..self.end]
    }

    /// Looks at the next byte without consuming it.
    #[must_use]
    pub fn peek(&self) -> Option<u8> {
        self.code.get(self.end).copied()
    }

    /// Consumes and returns the next byte, or `None` at end of input.
    pub fn read(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.end += 1;
        Some(byte)
    }

    /// Moves the read pointer ahead one without checking for end of
    /// input; callers guarantee availability.
    pub fn skip(&mut self) {
        self.end += 1;
    }

    /// Consumes the next byte only if it matches.
    pub fn forward_on(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.end += 1;
            return true;
        }
        false
    }
}

/// A grammar-supplied hook that inspects and optionally rewrites the
/// lexer's current state before the default recognizer runs. Returns
/// `true` to accept its modifications.
pub type Intercept = Box<dyn FnMut(&mut Snapshot<'_>) -> bool>;

/// A streaming classifier over a borrowed byte buffer.
///
/// The lexer does not own its source beyond reading it; span indices
/// remain valid for as long as the buffer is alive. A lexer is a
/// single-threaded object: exactly one reader advances through a buffer.
pub struct Lexer<'src> {
    name: String,
    code: &'src [u8],
    start: usize,
    end: usize,
    token: Token,
    keywords: Option<HashMap<String, Token>>,
    intercepts: Option<HashMap<Token, Vec<Intercept>>>,
}

impl fmt::Debug for Lexer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lexer")
            .field("name", &self.name)
            .field("start", &self.start)
            .field("end", &self.end)
            .field("token", &self.token)
            .finish()
    }
}

impl<'src> Lexer<'src> {
    /// Creates a lexer over `code`, reporting locations against `name`.
    #[must_use]
    pub fn new(name: impl Into<String>, code: &'src [u8]) -> Self {
        Self {
            name: name.into(),
            code,
            start: 0,
            end: 0,
            token: *token::INVALID,
            keywords: None,
            intercepts: None,
        }
    }

    /// The name of the source this lexer is reading.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The full source buffer.
    #[must_use]
    pub fn source(&self) -> &'src [u8] {
        self.code
    }

    /// The literal bytes of the current token candidate.
    #[must_use]
    pub fn value(&self) -> &'src [u8] {
        &self.code[self.start..self.end]
    }

    /// The current candidate as text. Invalid UTF-8 is replaced, which
    /// only arises for binary content inside strings or comments.
    #[must_use]
    pub fn text(&self) -> std::borrow::Cow<'src, str> {
        String::from_utf8_lossy(self.value())
    }

    /// The `[start, end)` byte offsets of the current candidate.
    #[must_use]
    pub fn position(&self) -> (usize, usize) {
        (self.start, self.end)
    }

    /// Byte offset of the first byte of the current candidate.
    #[must_use]
    pub fn start(&self) -> usize {
        self.start
    }

    /// Byte offset one past the last consumed byte.
    #[must_use]
    pub fn end(&self) -> usize {
        self.end
    }

    /// The current candidate's classification.
    #[must_use]
    pub fn token(&self) -> Token {
        self.token
    }

    /// 1-indexed line number of a byte offset.
    #[must_use]
    pub fn line_no(&self, pos: usize) -> usize {
        self.code[..pos].iter().filter(|&&b| b == b'\n').count() + 1
    }

    /// 1-indexed column of a byte offset within its line.
    ///
    /// `\r` counts as any other byte, so CRLF files still report the
    /// correct column after the LF.
    #[must_use]
    pub fn char_no(&self, pos: usize) -> usize {
        let line_start = self.code[..pos]
            .iter()
            .rposition(|&b| b == b'\n')
            .map_or(0, |i| i + 1);
        pos - line_start + 1
    }

    /// Registers a keyword so that a matching word is classified as
    /// `token` instead of `IDENTIFIER`. Registering the same text twice
    /// overwrites.
    ///
    /// # Panics
    ///
    /// Panics if `token` is a token class; only terminals may serve as
    /// keywords.
    pub fn add_keyword(&mut self, keyword: impl Into<String>, token: Token) {
        assert!(
            token.is_terminal(),
            "keywords must be represented by terminals: \"{token}\" is a token class"
        );
        self.keywords
            .get_or_insert_with(HashMap::new)
            .insert(keyword.into(), token);
    }

    /// Registers an intercept for `token`. Intercepts registered for the
    /// same token run in registration order.
    pub fn add_intercept(
        &mut self,
        token: Token,
        intercept: impl FnMut(&mut Snapshot<'_>) -> bool + 'static,
    ) {
        self.intercepts
            .get_or_insert_with(HashMap::new)
            .entry(token)
            .or_default()
            .push(Box::new(intercept));
    }

    /// Consumes and returns the next byte, or `None` at end of input
    /// (leaving `end` unchanged).
    pub fn read(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.end += 1;
        Some(byte)
    }

    /// Looks at the next byte without consuming it.
    #[must_use]
    pub fn peek(&self) -> Option<u8> {
        self.code.get(self.end).copied()
    }

    /// Moves the read pointer ahead one without checking for end of
    /// input; callers guarantee availability.
    pub fn skip(&mut self) {
        self.end += 1;
    }

    /// Consumes the next byte only if it matches.
    pub fn forward_on(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.end += 1;
            return true;
        }
        false
    }

    /// Builds the fatal error for the current span.
    ///
    /// Single-byte candidates report `name:line:col`; wider spans report
    /// `name:line:col-line:col`.
    pub(crate) fn fatal(&self, message: impl Into<String>) -> FatalError {
        let mut location = format!(
            "{}:{}:{}",
            self.name,
            self.line_no(self.start),
            self.char_no(self.start)
        );
        if self.end > self.start + 1 {
            location.push_str(&format!(
                "-{}:{}",
                self.line_no(self.end),
                self.char_no(self.end)
            ));
        }
        FatalError::Lex {
            location,
            message: message.into(),
            span: (self.start, self.end.saturating_sub(self.start)).into(),
        }
    }

    /// Tries the intercepts registered for the current token against a
    /// scratch snapshot. Only the first accepting intercept's state is
    /// committed; rejection leaves the lexer untouched.
    fn run_intercepts(&mut self) -> bool {
        let code = self.code;
        let (start, end, token) = (self.start, self.end, self.token);
        let mut accepted = None;
        if let Some(handlers) = self
            .intercepts
            .as_mut()
            .and_then(|table| table.get_mut(&token))
        {
            let mut scratch = Snapshot {
                code,
                start,
                end,
                token,
            };
            for intercept in handlers.iter_mut() {
                if intercept(&mut scratch) {
                    accepted = Some((scratch.start, scratch.end, scratch.token));
                    break;
                }
            }
        }
        match accepted {
            Some((start, end, token)) => {
                self.start = start;
                self.end = end;
                self.token = token;
                true
            }
            None => false,
        }
    }

    /// Consumes a word starting with a letter or underscore, classifying
    /// through the keyword table or as `IDENTIFIER`.
    fn symbolize_word(&mut self) {
        while self.end < self.code.len() && token_map::is_identifier_continuation(self.code[self.end])
        {
            self.skip();
        }
        if self.end > self.start {
            self.token = *token::IDENTIFIER;
            if let Some(keywords) = &self.keywords {
                if let Ok(text) = str::from_utf8(self.value()) {
                    if let Some(&keyword) = keywords.get(text) {
                        self.token = keyword;
                    }
                }
            }
        }
    }

    /// Classifies numeric-looking input as `INTEGER` or `FLOAT`:
    /// `<digits> [. [<digits>]]`. A lone trailing period still makes a
    /// float.
    fn symbolize_number(&mut self) {
        while self.end < self.code.len() && token_map::token_for(self.code[self.end]) == *token::DIGIT
        {
            self.skip();
        }
        if self.end < self.code.len() && token_map::token_for(self.code[self.end]) == *token::PERIOD
        {
            self.token = *token::FLOAT;
            self.skip();
            while self.end < self.code.len()
                && token_map::token_for(self.code[self.end]) == *token::DIGIT
            {
                self.skip();
            }
        } else {
            self.token = *token::INTEGER;
        }
    }

    /// Detects single- or multi-line comments after a leading slash. Any
    /// other following byte leaves the slash as-is.
    fn symbolize_comment(&mut self) -> Result<(), FatalError> {
        match self.peek() {
            Some(b'/') => {
                self.skip();
                self.token = *token::COMMENT;
                self.symbolize_single_line_comment();
            }
            Some(b'*') => {
                self.skip();
                self.token = *token::COMMENT;
                self.symbolize_multi_line_comment()?;
            }
            _ => {}
        }
        Ok(())
    }

    /// Consumes through the end of the line (or input).
    fn symbolize_single_line_comment(&mut self) {
        loop {
            match self.read() {
                None | Some(b'\n') => return,
                Some(_) => {}
            }
        }
    }

    /// Consumes through the closing `*/`. Reaching end of input first is
    /// fatal.
    fn symbolize_multi_line_comment(&mut self) -> Result<(), FatalError> {
        loop {
            match self.read() {
                None => return Err(self.fatal("unterminated multiline comment")),
                Some(b'*') => {
                    if self.peek() == Some(b'/') {
                        self.skip();
                        return Ok(());
                    }
                }
                Some(_) => {}
            }
        }
    }

    /// Scans a quoted string for the close quote matching the opening
    /// one at `code[start]`. A backslash skips one following byte
    /// (escape sequences are not validated). End of line or end of input
    /// before the close quote is fatal.
    fn symbolize_string(&mut self) -> Result<(), FatalError> {
        let quote = self.code[self.start];
        loop {
            match self.read() {
                None | Some(b'\n' | b'\r') => break,
                Some(byte) if byte == quote => return Ok(()),
                Some(b'\\') => match self.peek() {
                    Some(next) if next != b'\n' && next != b'\r' => self.skip(),
                    _ => break,
                },
                Some(_) => {}
            }
        }
        Err(self.fatal("unterminated string/missing close-quote?"))
    }

    /// Classifies the next token in the stream.
    ///
    /// Returns `Ok(false)` at end of input, with the token set to `EOF`
    /// and a zero-width span at the end of the buffer. Every later call
    /// does the same, so reading past EOF is idempotent.
    ///
    /// # Errors
    ///
    /// Returns a [`FatalError`] for unterminated strings and multi-line
    /// comments; the current parse cannot continue past either.
    pub fn advance(&mut self) -> Result<bool, FatalError> {
        self.start = self.end;
        if self.end >= self.code.len() {
            self.token = *token::EOF;
            return Ok(false);
        }

        // Capture the first byte, move the read pointer past it, and
        // classify from the dispatch table.
        let first = self.code[self.start];
        self.skip();
        self.token = token_map::token_for(first);

        if self.run_intercepts() {
            return Ok(true);
        }

        let token = self.token;
        if token == *token::WHITESPACE || token == *token::NEWLINE {
            // Greedy same-token run: spaces stay WHITESPACE, CR/LF stay
            // NEWLINE, a mixed "\n \n" is three runs.
            while self.end < self.code.len() && token_map::token_for(self.code[self.end]) == token {
                self.skip();
            }
        } else if token == *token::ALPHA || token == *token::UNDERSCORE {
            self.symbolize_word();
        } else if token == *token::SLASH {
            self.symbolize_comment()?;
        } else if token == *token::STRING {
            self.symbolize_string()?;
        } else if token == *token::DIGIT {
            self.symbolize_number();
        } else if token == *token::PLUS || token == *token::MINUS {
            if self.end < self.code.len() && token_map::is_numeric(self.code[self.end]) {
                self.symbolize_number();
            }
        } else if token == *token::PERIOD {
            if self.end < self.code.len() && token_map::token_for(self.code[self.end]) == *token::DIGIT
            {
                // Step back so the number recognizer re-reads the period
                // as the fractional indicator.
                self.end -= 1;
                self.symbolize_number();
            }
        }

        Ok(true)
    }
}
