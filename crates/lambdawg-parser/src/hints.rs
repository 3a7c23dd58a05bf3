// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Friendly hints for common parse errors.

use lambdawg_ast::token::TokenKind;

/// Suggest a fix for an expected/found pair, when one is known.
pub(crate) fn for_expected(expected: &str, found: &TokenKind) -> Option<&'static str> {
    match (expected, found) {
        ("expression", TokenKind::RBrace) => {
            Some("a block must end with an expression or contain statements")
        }
        ("expression", TokenKind::Eof) => Some("the expression is incomplete"),
        ("'='", TokenKind::Colon) => {
            Some("the type annotation comes before '=': let name: Type = value")
        }
        ("'='", _) => Some("a let binding needs '=' followed by a value"),
        ("'then'", _) => Some("conditionals are written: if cond then a else b"),
        ("'else'", _) => Some("every 'if' needs an 'else' branch"),
        ("'in'", _) => Some("a provide expression is written: provide name = value in { body }"),
        ("a name", TokenKind::TypeIdent(_)) => {
            Some("value names start with a lowercase letter")
        }
        ("a type name", TokenKind::Ident(_)) => {
            Some("type names start with an uppercase letter")
        }
        ("'=>'", _) => Some("match arms are written: pattern => expression"),
        _ => None,
    }
}
