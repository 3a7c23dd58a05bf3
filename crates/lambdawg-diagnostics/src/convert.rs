// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Conversions from stage error types to `Diagnostic`.

use crate::{Diagnostic, ToDiagnostic};

impl ToDiagnostic for lambdawg_lexer::LexError {
    fn to_diagnostic(&self) -> Diagnostic {
        let mut diag = Diagnostic::error(&self.message)
            .with_code(self.code)
            .with_span(self.span);
        if let Some(ref hint) = self.hint {
            diag = diag.with_hint(hint.as_str());
        }
        diag
    }
}

impl ToDiagnostic for lambdawg_parser::ParseError {
    fn to_diagnostic(&self) -> Diagnostic {
        let mut diag = Diagnostic::error(&self.message)
            .with_code(self.code)
            .with_span(self.span);
        if let Some(ref hint) = self.hint {
            diag = diag.with_hint(hint.as_str());
        }
        diag
    }
}

impl ToDiagnostic for lambdawg_types::TypeError {
    fn to_diagnostic(&self) -> Diagnostic {
        let mut diag = Diagnostic::error(self.to_string())
            .with_code(self.code())
            .with_span(self.span());
        if let Some(hint) = self.hint() {
            diag = diag.with_hint(hint);
        }
        diag
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lex_error_keeps_code_and_span() {
        let result = lambdawg_lexer::Lexer::new("\"oops").tokenize();
        let diag = result.errors[0].to_diagnostic();
        assert_eq!(diag.code.as_deref(), Some("L002"));
        assert!(diag.span.is_some());
        assert!(diag.is_error());
    }

    #[test]
    fn parse_error_keeps_hint() {
        let lex = lambdawg_lexer::Lexer::new("let x = ").tokenize();
        let result = lambdawg_parser::Parser::new(lex.tokens).parse();
        let diag = result.errors[0].to_diagnostic();
        assert_eq!(diag.code.as_deref(), Some("P002"));
        assert!(!diag.hints.is_empty());
    }

    #[test]
    fn type_error_message_carries_types() {
        let lex = lambdawg_lexer::Lexer::new("let x: String = 42").tokenize();
        let parsed = lambdawg_parser::Parser::new(lex.tokens).parse();
        let result = lambdawg_types::TypeChecker::new().check(&parsed.program);
        let diag = result.errors[0].to_diagnostic();
        assert_eq!(diag.code.as_deref(), Some("T001"));
        assert!(diag.message.contains("String"));
        assert!(diag.message.contains("Int"));
    }
}
