// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Error code registry.
//!
//! Maps stable codes (L001, P002, T001, …) to titles and categories for
//! display and for the JSON report's `category` field.

use std::collections::HashMap;

/// Registry of all known diagnostic codes.
pub struct CodeRegistry {
    codes: HashMap<&'static str, CodeInfo>,
}

/// Information about a single code.
pub struct CodeInfo {
    pub code: &'static str,
    pub title: &'static str,
    pub category: Category,
}

/// Pipeline stage the code belongs to.
#[derive(Debug, Clone, Copy)]
pub enum Category {
    Lex,
    Parse,
    Type,
    Module,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Lex => write!(f, "Lex"),
            Category::Parse => write!(f, "Parse"),
            Category::Type => write!(f, "Type"),
            Category::Module => write!(f, "Module"),
        }
    }
}

macro_rules! register_codes {
    ($($code:literal => ($title:literal, $cat:expr)),* $(,)?) => {{
        let mut map = HashMap::new();
        $(
            map.insert($code, CodeInfo {
                code: $code,
                title: $title,
                category: $cat,
            });
        )*
        map
    }};
}

impl Default for CodeRegistry {
    fn default() -> Self {
        use Category::*;

        Self {
            codes: register_codes! {
                // Lexer
                "L001" => ("unexpected character", Lex),
                "L002" => ("unterminated string literal", Lex),
                "L003" => ("unterminated block comment", Lex),
                "L004" => ("invalid number literal", Lex),
                "L005" => ("invalid escape sequence", Lex),

                // Parser
                "P001" => ("unexpected token", Parse),
                "P002" => ("expected expression", Parse),
                "P003" => ("expected identifier", Parse),
                "P004" => ("expected type", Parse),
                "P005" => ("unclosed parenthesis", Parse),
                "P006" => ("unclosed brace", Parse),
                "P007" => ("unclosed bracket", Parse),
                "P008" => ("invalid pattern", Parse),
                "P009" => ("invalid assignment", Parse),

                // Types
                "T001" => ("type mismatch", Type),
                "T002" => ("undefined variable", Type),
                "T003" => ("undefined type", Type),
                "T004" => ("not a function", Type),
                "T005" => ("wrong arity", Type),
                "T006" => ("infinite type", Type),
                "T007" => ("duplicate field", Type),
                "T008" => ("missing field", Type),
                // Reserved for later passes.
                "T009" => ("non-exhaustive match", Type),
                "T010" => ("effect outside do block", Type),
                "T011" => ("unresolved ambient dependency", Type),

                // Reserved for a module resolution pass.
                "M001" => ("unknown module", Module),
                "M002" => ("duplicate import", Module),
                "M003" => ("import target not exported", Module),
            },
        }
    }
}

impl CodeRegistry {
    pub fn get(&self, code: &str) -> Option<&CodeInfo> {
        self.codes.get(code)
    }
}
