// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! The declaration base type.
//!
//! Grammars built on the driver typically produce declarations; [`Decl`]
//! is the common base identifying where each one came from. It
//! serializes to the boundary JSON shape downstream tooling consumes.

use serde::Serialize;

use crate::parser::Parser;
use crate::symbol::Symbol;

/// The base for any kind of declaration, identifying its origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decl {
    /// The file the declaration was parsed from.
    #[serde(rename = "src")]
    pub source_file: String,
    /// The symbol that introduced the declaration.
    #[serde(rename = "decltype")]
    pub decl_type: Symbol,
    /// The declaration's name, once known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<Symbol>,
}

impl Decl {
    /// Creates a declaration rooted at `decl_type`, sourced from the
    /// parser's file.
    #[must_use]
    pub fn new(parser: &Parser<'_>, decl_type: Symbol) -> Self {
        Self {
            source_file: parser.file_name().to_owned(),
            decl_type,
            name: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::token;

    #[test]
    fn new_captures_the_source_file() {
        let parser = Parser::new(Lexer::new("decl.test", b"hot potato"), Vec::new()).unwrap();
        let symbol = Symbol::new(*token::STRING, "'fake'", 10, 20);
        let decl = Decl::new(&parser, symbol.clone());
        assert_eq!(
            decl,
            Decl {
                source_file: "decl.test".into(),
                decl_type: symbol,
                name: None,
            }
        );
    }

    #[test]
    fn json_shape() {
        let parser = Parser::new(Lexer::new("decl.test", b"record x"), Vec::new()).unwrap();
        let mut decl = Decl::new(&parser, parser.current().clone());
        assert_eq!(
            serde_json::to_string(&decl).unwrap(),
            r#"{"src":"decl.test","decltype":{"token":["IDENTIFIER","record"]}}"#
        );

        decl.name = Some(parser.peek().clone());
        assert_eq!(
            serde_json::to_string(&decl).unwrap(),
            r#"{"src":"decl.test","decltype":{"token":["IDENTIFIER","record"]},"name":{"token":["IDENTIFIER","x"]}}"#
        );
    }
}
