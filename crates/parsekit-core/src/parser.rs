// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! The parser driver.
//!
//! A [`Parser`] owns a lexer and exposes a stream of significant
//! [`Symbol`]s: whitespace, newlines, and comments are filtered out
//! before the grammar ever sees them. The driver keeps the current
//! symbol plus an arbitrarily long lookahead buffer, applies
//! token-sequence [`Rule`]s after every advance, and offers the
//! grammar-facing API: [`Parser::expecting`], [`Parser::optional_sequence`],
//! [`Parser::push`], and the diagnostic constructors.
//!
//! Within one parser, symbols are consumed strictly in source order;
//! lookahead defers symbols but never reorders them. Rule application is
//! deterministic: rules are tried in registration order and at most one
//! fires per promotion.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use crate::error::{
    self, ErrorSink, FatalError, ParseError, SequenceError, SyntaxError,
};
use crate::lexer::Lexer;
use crate::symbol::Symbol;
use crate::token::{self, Token, is_significant};

/// A token-sequence rewrite rule.
///
/// When the current symbol and the following lookahead match `sequence`
/// positionally, the whole run collapses into one synthetic symbol: its
/// token becomes `applies`, its span stretches from the first matched
/// symbol's start to the last one's end, and its value is re-read from
/// the source (so interior whitespace and comments are preserved,
/// whatever they were).
#[derive(Debug, Clone)]
pub struct Rule {
    sequence: Vec<Token>,
    applies: Token,
}

impl Rule {
    /// Creates a rule collapsing `sequence` into `applies`.
    ///
    /// # Panics
    ///
    /// Panics on an empty sequence; a rule must match at least one
    /// symbol.
    #[must_use]
    pub fn new(sequence: Vec<Token>, applies: Token) -> Self {
        assert!(!sequence.is_empty(), "a rule's sequence must not be empty");
        Self { sequence, applies }
    }

    /// The tokens this rule matches, in order.
    #[must_use]
    pub fn sequence(&self) -> &[Token] {
        &self.sequence
    }

    /// The synthetic token a match collapses into.
    #[must_use]
    pub fn applies(&self) -> Token {
        self.applies
    }
}

/// A lexing-based parser driver with unbounded lookahead.
pub struct Parser<'src> {
    lexer: Lexer<'src>,
    current: Symbol,
    ahead: VecDeque<Symbol>,
    rules: Vec<Rule>,
    sink: Arc<dyn ErrorSink>,

    /// Emit a one-line trace event per advance.
    pub tracing: bool,
    /// Prepend the source location to trace events.
    pub verbose_tracing: bool,
}

impl fmt::Debug for Parser<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parser")
            .field("lexer", &self.lexer)
            .field("current", &self.current)
            .field("ahead", &self.ahead)
            .field("rules", &self.rules.len())
            .finish()
    }
}

impl<'src> Parser<'src> {
    /// Constructs a parser and pre-reads the first two symbols, so that
    /// `current` is the first significant symbol (or EOF) and at least
    /// one lookahead entry exists.
    ///
    /// # Errors
    ///
    /// Propagates any [`FatalError`] raised while pre-reading.
    pub fn new(lexer: Lexer<'src>, rules: Vec<Rule>) -> Result<Self, FatalError> {
        let mut parser = Self {
            lexer,
            current: Symbol::new(*token::INVALID, "", 0, 0),
            ahead: VecDeque::with_capacity(64),
            rules,
            sink: error::default_sink(),
            tracing: false,
            verbose_tracing: false,
        };
        parser.read_ahead()?;
        parser.next()?;
        Ok(parser)
    }

    /// Replaces the error sink this parser raises through.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn ErrorSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Forwards a surfaced error to the sink.
    pub fn raise(&self, error: &SyntaxError) {
        self.sink.raise(error);
    }

    /// The lexer this parser drives.
    #[must_use]
    pub fn lexer(&self) -> &Lexer<'src> {
        &self.lexer
    }

    /// The name of the source being parsed.
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.lexer.name()
    }

    /// The current symbol. At EOF this carries the EOF token.
    #[must_use]
    pub fn current(&self) -> &Symbol {
        &self.current
    }

    /// The next symbol after `current`. At EOF this is a further EOF
    /// symbol. Peeking does not consume.
    #[must_use]
    pub fn peek(&self) -> &Symbol {
        self.ahead
            .front()
            .expect("lookahead buffer always holds at least one symbol")
    }

    /// Returns `true` once the current symbol is EOF.
    #[must_use]
    pub fn eof(&self) -> bool {
        self.current.token == *token::EOF
    }

    /// Describes a symbol's position as `name:line:col`.
    #[must_use]
    pub fn locate(&self, symbol: &Symbol) -> String {
        format!(
            "{}:{}:{}",
            self.lexer.name(),
            self.lexer.line_no(symbol.start),
            self.lexer.char_no(symbol.start)
        )
    }

    /// Injects symbols ahead of the current position, so that `current`
    /// becomes `symbols[0]` and the former current heads the prepended
    /// lookahead. An empty list is a no-op.
    ///
    /// Rules are not reapplied; the caller is explicitly replaying a
    /// previously emitted sequence.
    pub fn push(&mut self, symbols: Vec<Symbol>) {
        let mut symbols = symbols.into_iter();
        let Some(first) = symbols.next() else { return };
        let former = std::mem::replace(&mut self.current, first);
        self.ahead.push_front(former);
        for symbol in symbols.rev() {
            self.ahead.push_front(symbol);
        }
    }

    /// Advances the lexer to the next significant token and appends the
    /// resulting symbol to the lookahead buffer.
    fn read_ahead(&mut self) -> Result<(), FatalError> {
        loop {
            self.lexer.advance()?;
            if is_significant(self.lexer.token()) {
                break;
            }
        }
        let (start, end) = self.lexer.position();
        self.ahead.push_back(Symbol::new(
            self.lexer.token(),
            self.lexer.text().as_ref(),
            start,
            end,
        ));
        Ok(())
    }

    /// Attempts one rule against the current symbol and lookahead,
    /// topping the buffer up as the sequence demands.
    fn apply_rule(&mut self, index: usize) -> Result<bool, FatalError> {
        let rule = self.rules[index].clone();
        if self.current.token != rule.sequence[0] {
            return Ok(false);
        }
        for (ahead_no, &step) in rule.sequence[1..].iter().enumerate() {
            if ahead_no >= self.ahead.len() {
                self.read_ahead()?;
            }
            if self.ahead[ahead_no].token != step {
                return Ok(false);
            }
        }

        // Collapse: the first step is `current`, the rest came from the
        // lookahead buffer.
        let consumed_ahead = rule.sequence.len() - 1;
        self.current.token = rule.applies;
        if consumed_ahead > 0 {
            self.current.end = self.ahead[consumed_ahead - 1].end;
        }
        let span = &self.lexer.source()[self.current.start..self.current.end];
        self.current.value = String::from_utf8_lossy(span).into_owned().into();
        self.read_ahead()?;
        self.ahead.drain(..consumed_ahead);

        Ok(true)
    }

    /// Walks the rule list in registration order; the first match wins
    /// and at most one rule fires per promotion.
    fn apply_rules(&mut self) -> Result<(), FatalError> {
        for index in 0..self.rules.len() {
            if self.apply_rule(index)? {
                return Ok(());
            }
        }
        Ok(())
    }

    /// Promotes the head of the lookahead buffer to `current`, refills,
    /// and applies rules.
    fn promote(&mut self) -> Result<Token, FatalError> {
        self.current = self
            .ahead
            .pop_front()
            .expect("lookahead buffer always holds at least one symbol");
        self.read_ahead()?;
        self.apply_rules()?;
        Ok(self.current.token)
    }

    /// Advances to the next significant symbol and returns its token.
    /// Applied to a parser already at EOF, yields EOF forever.
    ///
    /// # Errors
    ///
    /// Propagates any [`FatalError`] from the lexer.
    pub fn next(&mut self) -> Result<Token, FatalError> {
        loop {
            let token = self.promote()?;
            if is_significant(token) {
                if self.tracing {
                    self.trace("next");
                }
                return Ok(token);
            }
        }
    }

    /// Returns the current symbol if it matches one of `tokens`.
    ///
    /// On a mismatch the syntax error lists the expectations in a
    /// natural-language form (`T`, `either A or B`, or the Oxford-comma
    /// list for three or more).
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Fatal`] at end-of-file and
    /// [`ParseError::Syntax`] for an ordinary mismatch.
    ///
    /// # Panics
    ///
    /// Panics when called with no tokens; that is a bug in the grammar.
    pub fn expecting(&self, tokens: &[Token]) -> Result<Symbol, ParseError> {
        assert!(!tokens.is_empty(), "must specify at least one token");
        if tokens.iter().any(|&want| self.current.token == want) {
            return Ok(self.current.clone());
        }

        if self.eof() {
            return Err(FatalError::UnexpectedEof {
                location: self.locate(&self.current),
                span: (self.current.start, 0).into(),
            }
            .into());
        }

        let mut expected = tokens[0].name().to_owned();
        if tokens.len() > 1 {
            expected.insert_str(0, "either ");
            if tokens.len() > 2 {
                for step in &tokens[1..tokens.len() - 1] {
                    expected.push_str(", ");
                    expected.push_str(step.name());
                }
                // Oxford/serial comma.
                expected.push(',');
            }
            expected.push_str(" or ");
            expected.push_str(tokens[tokens.len() - 1].name());
        }

        Err(self.syntax_error(&self.current, expected).into())
    }

    /// Attempts to match a run of two or more tokens, tolerating the
    /// non-significant tokens the filter already removed.
    ///
    /// Returns `Ok(None)` without advancing when the current symbol does
    /// not match `tokens[0]`, and `Ok(Some(matched))` after a full match,
    /// having advanced one symbol past the sequence.
    ///
    /// # Errors
    ///
    /// A partial match returns [`SequenceError::Mismatch`] carrying the
    /// traversed symbols, suitable for [`Parser::push`] to rewind.
    ///
    /// # Panics
    ///
    /// Panics when called with fewer than two tokens; that is a bug in
    /// the grammar.
    pub fn optional_sequence(
        &mut self,
        tokens: &[Token],
    ) -> Result<Option<Vec<Symbol>>, SequenceError> {
        assert!(tokens.len() >= 2, "invalid sequence length");
        if self.current.token != tokens[0] {
            return Ok(None);
        }
        let mut seen = Vec::with_capacity(tokens.len() * 2);
        let mut matched = Vec::with_capacity(tokens.len());
        matched.push(self.current.clone());
        for (index, &want) in tokens[1..].iter().enumerate() {
            seen.push(self.current.clone());
            let actual = self.next()?;
            if actual != want {
                let error = self.syntax_error(
                    &self.current,
                    format!("{} after {}", want.name(), tokens[index].name()),
                );
                return Err(SequenceError::Mismatch { seen, error });
            }
            matched.push(self.current.clone());
        }
        self.next()?;
        Ok(Some(matched))
    }

    /// Formats an error against a symbol's location:
    /// `name:line:col: <message>: <identity>`.
    #[must_use]
    pub fn error_at(&self, symbol: &Symbol, message: impl fmt::Display) -> SyntaxError {
        SyntaxError::new(
            format!("{}: {}: {}", self.locate(symbol), message, symbol.identity()),
            (symbol.start, symbol.end.saturating_sub(symbol.start)),
        )
    }

    /// Formats a syntax error against a symbol:
    /// `name:line:col: syntax error: expected <expected>, got: <identity>`.
    #[must_use]
    pub fn syntax_error(&self, symbol: &Symbol, expected: impl fmt::Display) -> SyntaxError {
        self.error_at(symbol, format!("syntax error: expected {expected}, got"))
    }

    /// Formats a two-line duplicate-definition error, the second line
    /// pointing at the previous occurrence (possibly in another
    /// parser's source).
    #[must_use]
    pub fn duplicate_error(
        &self,
        duplicate: &Symbol,
        original: &Symbol,
        original_parser: &Parser<'_>,
        message: impl fmt::Display,
    ) -> SyntaxError {
        let first = self.error_at(duplicate, message);
        SyntaxError::new(
            format!(
                "{}\n{}: \\-> previous occurrence of {:?} is here",
                first.message,
                original_parser.locate(original),
                duplicate.value.as_str()
            ),
            first.span,
        )
    }

    fn trace_event(&self, what: &str, message: &str) {
        if !self.tracing {
            return;
        }
        let what = if self.verbose_tracing {
            format!("{} {what}", self.locate(&self.current))
        } else {
            what.to_owned()
        };
        tracing::trace!("{what}  ( {} )  {message}", self.current.identity());
    }

    /// Emits a one-line trace of the driver's position. No behavioral
    /// effect.
    pub fn trace(&self, what: &str) {
        self.trace_event(
            &format!("{what}@{}", self.lexer.start()),
            &format!("->  [ {} ]", self.peek().identity()),
        );
    }

    /// Emits a free-form trace note. No behavioral effect.
    pub fn note(&self, what: &str, message: impl fmt::Display) {
        self.trace_event(what, &format!("note: {message}"));
    }
}
