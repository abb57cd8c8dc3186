// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! The token catalog.
//!
//! A [`Token`] identifies a significant pattern in a source stream, from a
//! specific keyword to an integer literal to whitespace to end-of-file.
//! Two disjoint populations share the type:
//!
//! - **Token classes** describe a category of input (`INTEGER`,
//!   `IDENTIFIER`, `WHITESPACE`, …) and begin with an uppercase letter.
//! - **Terminals** match a single literal (`open-brace`, `plus-sign`, …)
//!   and begin with a lowercase letter.
//!
//! Tokens are interned at creation: equality compares identities, not name
//! text, so a grammar may freely shadow a standard name with its own token
//! without colliding.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::LazyLock;

/// An interned token identity.
///
/// Tokens are created once (typically at initialization) and live for the
/// rest of the process. Comparison is O(1) and is tied to the creation
/// site: two tokens are equal only if they came from the same
/// [`Token::class`] or [`Token::terminal`] call.
#[derive(Clone, Copy)]
pub struct Token {
    name: &'static str,
}

impl Token {
    /// Creates a token class. Class names begin with an uppercase letter.
    ///
    /// # Panics
    ///
    /// Panics if `name` does not begin with an ASCII uppercase letter;
    /// that is a bug in the grammar, not input data.
    #[must_use]
    pub fn class(name: impl Into<String>) -> Self {
        let name = name.into();
        assert!(
            name.as_bytes().first().is_some_and(u8::is_ascii_uppercase),
            "{name}: token classes must begin with a capital letter"
        );
        Self {
            name: Box::leak(name.into_boxed_str()),
        }
    }

    /// Creates a terminal. Terminal names begin with a lowercase letter.
    ///
    /// # Panics
    ///
    /// Panics if `name` does not begin with an ASCII lowercase letter.
    #[must_use]
    pub fn terminal(name: impl Into<String>) -> Self {
        let name = name.into();
        assert!(
            name.as_bytes().first().is_some_and(u8::is_ascii_lowercase),
            "{name}: terminals must begin with a lowercase letter"
        );
        Self {
            name: Box::leak(name.into_boxed_str()),
        }
    }

    /// Returns the human-friendly name this token was created with.
    #[must_use]
    pub const fn name(self) -> &'static str {
        self.name
    }

    /// Returns `true` for terminals (single literal matches).
    ///
    /// The distinction is carried by the case of the first letter of the
    /// name, which both constructors enforce.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        self.name.as_bytes()[0].is_ascii_lowercase()
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        // Identity comparison: same interned name, not same text.
        std::ptr::eq(self.name, other.name)
    }
}

impl Eq for Token {}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (self.name.as_ptr() as usize).hash(state);
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token({})", self.name)
    }
}

// === Token classes ===

/// Bytes no recognizer claims.
pub static INVALID: LazyLock<Token> = LazyLock::new(|| Token::class("INVALID"));
/// The absence of further input.
pub static EOF: LazyLock<Token> = LazyLock::new(|| Token::class("EOF"));
/// A run of spaces and/or tabs.
pub static WHITESPACE: LazyLock<Token> = LazyLock::new(|| Token::class("WHITESPACE"));
/// A run of carriage returns and/or line feeds.
pub static NEWLINE: LazyLock<Token> = LazyLock::new(|| Token::class("NEWLINE"));
/// A single- or multi-line comment.
pub static COMMENT: LazyLock<Token> = LazyLock::new(|| Token::class("COMMENT"));

/// Intermediate classification for letters.
pub static ALPHA: LazyLock<Token> = LazyLock::new(|| Token::class("ALPHA"));
/// Intermediate classification for decimal digits.
pub static DIGIT: LazyLock<Token> = LazyLock::new(|| Token::class("DIGIT"));
/// Punctuation with no terminal of its own.
pub static SYMBOL: LazyLock<Token> = LazyLock::new(|| Token::class("SYMBOL"));

/// A quoted string literal, quotes included.
pub static STRING: LazyLock<Token> = LazyLock::new(|| Token::class("STRING"));
/// An integer literal.
pub static INTEGER: LazyLock<Token> = LazyLock::new(|| Token::class("INTEGER"));
/// A floating-point literal.
pub static FLOAT: LazyLock<Token> = LazyLock::new(|| Token::class("FLOAT"));

/// A word that matched no keyword.
pub static IDENTIFIER: LazyLock<Token> = LazyLock::new(|| Token::class("IDENTIFIER"));

// === Terminals ===

pub static OPEN_BRACE: LazyLock<Token> = LazyLock::new(|| Token::terminal("open-brace"));
pub static CLOSE_BRACE: LazyLock<Token> = LazyLock::new(|| Token::terminal("close-brace"));
pub static OPEN_BRACKET: LazyLock<Token> = LazyLock::new(|| Token::terminal("open-bracket"));
pub static CLOSE_BRACKET: LazyLock<Token> = LazyLock::new(|| Token::terminal("close-bracket"));
pub static OPEN_PAREN: LazyLock<Token> = LazyLock::new(|| Token::terminal("open-parens"));
pub static CLOSE_PAREN: LazyLock<Token> = LazyLock::new(|| Token::terminal("close-parens"));
pub static ASTERISK: LazyLock<Token> = LazyLock::new(|| Token::terminal("asterisk"));
pub static SLASH: LazyLock<Token> = LazyLock::new(|| Token::terminal("slash"));
pub static PERIOD: LazyLock<Token> = LazyLock::new(|| Token::terminal("period"));
pub static COMMA: LazyLock<Token> = LazyLock::new(|| Token::terminal("comma"));
pub static DOLLAR: LazyLock<Token> = LazyLock::new(|| Token::terminal("dollar-sign"));
pub static PLUS: LazyLock<Token> = LazyLock::new(|| Token::terminal("plus-sign"));
pub static MINUS: LazyLock<Token> = LazyLock::new(|| Token::terminal("minus-sign"));
pub static COLON: LazyLock<Token> = LazyLock::new(|| Token::terminal("colon"));
pub static SEMICOLON: LazyLock<Token> = LazyLock::new(|| Token::terminal("semicolon"));
pub static UNDERSCORE: LazyLock<Token> = LazyLock::new(|| Token::terminal("underscore"));
pub static EQUALS: LazyLock<Token> = LazyLock::new(|| Token::terminal("equals-sign"));

/// Returns `true` for tokens the parser should surface to the grammar.
///
/// Whitespace, newlines, and comments are noise; everything else —
/// including `EOF` and `INVALID` — is significant.
#[must_use]
pub fn is_significant(token: Token) -> bool {
    token != *WHITESPACE && token != *NEWLINE && token != *COMMENT
}
