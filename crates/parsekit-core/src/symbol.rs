// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Symbols: tokens matched at a specific place in a specific source.
//!
//! A [`Symbol`] carries the token the lexer assigned, the literal text it
//! covers, and the half-open byte span `[start, end)` it occupies. Values
//! are independent copies ([`EcoString`]), so a symbol may outlive the
//! buffer it was lexed from.

use std::fmt;

use ecow::EcoString;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::token::{self, Token};

/// A specific instance of a token within a source stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    /// How the lexer classified this symbol.
    pub token: Token,
    /// The literal text the symbol covers.
    pub value: EcoString,
    /// Byte offset of the first byte of the symbol.
    pub start: usize,
    /// Byte offset one past the last byte of the symbol.
    pub end: usize,
}

impl Symbol {
    /// Creates a new symbol.
    #[must_use]
    pub fn new(token: Token, value: impl Into<EcoString>, start: usize, end: usize) -> Self {
        Self {
            token,
            value: value.into(),
            start,
            end,
        }
    }

    /// Tests whether this symbol represents a particular token.
    #[must_use]
    pub fn is(&self, token: Token) -> bool {
        self.token == token
    }

    /// Renders a human-friendly description for diagnostics.
    ///
    /// Empty-valued symbols and noise classes show only the token name;
    /// intermediate and numeric classes show `NAME "value"`; identifiers
    /// and strings show just the quoted value; terminals and user-defined
    /// classes show `name ("value")`.
    #[must_use]
    pub fn identity(&self) -> String {
        if self.value.is_empty() {
            return self.token.name().to_owned();
        }
        if !self.token.is_terminal() {
            let t = self.token;
            if t == *token::INVALID
                || t == *token::EOF
                || t == *token::WHITESPACE
                || t == *token::NEWLINE
                || t == *token::COMMENT
            {
                return self.token.name().to_owned();
            }
            if t == *token::ALPHA
                || t == *token::DIGIT
                || t == *token::SYMBOL
                || t == *token::INTEGER
                || t == *token::FLOAT
            {
                return format!("{} {:?}", self.token.name(), self.value.as_str());
            }
            if t == *token::IDENTIFIER || t == *token::STRING {
                return format!("{:?}", self.value.as_str());
            }
        }
        format!("{} ({:?})", self.token.name(), self.value.as_str())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// Boundary encoding: an object with a single `"terminal"` or `"token"`
/// key whose value is an array of the token's name, followed by the
/// literal value when it differs from the name.
impl Serialize for Symbol {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let name = self.token.name();
        let mut data = vec![name];
        if self.value != name {
            data.push(self.value.as_str());
        }
        let key = if self.token.is_terminal() {
            "terminal"
        } else {
            "token"
        };
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(key, &data)?;
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_compares_identities() {
        let symbol = Symbol::new(*token::EOF, "", 0, 0);
        assert!(symbol.is(*token::EOF));
        assert!(!symbol.is(*token::NEWLINE));
        // A freshly created token with the same name is a different identity.
        assert!(!symbol.is(Token::class("EOF")));
    }

    #[test]
    fn display_is_value() {
        let mut symbol = Symbol::new(*token::IDENTIFIER, "", 0, 0);
        assert_eq!(symbol.to_string(), "");
        symbol.value = "a value".into();
        assert_eq!(symbol.to_string(), "a value");
    }

    #[test]
    fn identity_rendering() {
        let bang = Token::terminal("bang");
        let cases: &[(Token, &str, &str)] = &[
            (*token::INVALID, "asdf", r"INVALID"),
            (*token::EOF, "", r"EOF"),
            (*token::EOF, "sdfg", r"EOF"),
            (*token::WHITESPACE, "dfgh", r"WHITESPACE"),
            (*token::NEWLINE, "\r\n\n\r", r"NEWLINE"),
            (*token::COMMENT, "/*xyz*/", r"COMMENT"),
            (*token::ALPHA, "g", r#"ALPHA "g""#),
            (*token::DIGIT, "3", r#"DIGIT "3""#),
            (*token::SYMBOL, "!", r#"SYMBOL "!""#),
            (*token::STRING, "my value", r#""my value""#),
            (*token::INTEGER, "42", r#"INTEGER "42""#),
            (*token::FLOAT, "4.2", r#"FLOAT "4.2""#),
            (*token::IDENTIFIER, "hello world", r#""hello world""#),
            // Terminal with and without a value.
            (bang, "", r"bang"),
            (bang, "xyz", r#"bang ("xyz")"#),
        ];
        for (token, value, want) in cases {
            let symbol = Symbol::new(*token, *value, 0, 0);
            assert_eq!(symbol.identity(), *want, "{token} {value:?}");
        }
    }

    #[test]
    fn identity_of_user_defined_class() {
        let custom = Token::class("Directive");
        let symbol = Symbol::new(custom, "@inline", 0, 7);
        assert_eq!(symbol.identity(), r#"Directive ("@inline")"#);
    }

    #[test]
    fn json_terminal_with_value() {
        let symbol = Symbol::new(*token::OPEN_BRACE, "{", 0, 1);
        assert_eq!(
            serde_json::to_string(&symbol).unwrap(),
            r#"{"terminal":["open-brace","{"]}"#
        );
    }

    #[test]
    fn json_token_class_with_value() {
        let symbol = Symbol::new(*token::INTEGER, "42", 3, 5);
        assert_eq!(
            serde_json::to_string(&symbol).unwrap(),
            r#"{"token":["INTEGER","42"]}"#
        );
    }

    #[test]
    fn json_value_matching_name_is_omitted() {
        let marker = Token::terminal("marker");
        let symbol = Symbol::new(marker, "marker", 0, 6);
        assert_eq!(
            serde_json::to_string(&symbol).unwrap(),
            r#"{"terminal":["marker"]}"#
        );
    }

    #[test]
    fn json_empty_value_still_differs_from_name() {
        let symbol = Symbol::new(*token::EOF, "", 10, 10);
        assert_eq!(
            serde_json::to_string(&symbol).unwrap(),
            r#"{"token":["EOF",""]}"#
        );
    }
}
