// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Lambdawg compiler diagnostics.
//!
//! Provides a unified diagnostic type for every pipeline stage. Each
//! stage's error type is converted via the `ToDiagnostic` trait; the
//! driver attaches source text and filename before returning results.

pub mod codes;
pub mod convert;
pub mod formatter;
pub mod json;

use lambdawg_ast::Span;
use serde::Serialize;

/// A compiler diagnostic.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Stable 4-character code (e.g. "T001").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
    /// Full source text, attached by the driver.
    #[serde(skip)]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }

    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: None,
            message: message.into(),
            span: None,
            source: None,
            filename: None,
            hints: Vec::new(),
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(hint.into());
        self
    }

    /// Attach the compiled source and its filename; the formatter needs
    /// both to render context lines.
    pub fn with_source(mut self, source: &str, filename: Option<&str>) -> Self {
        self.source = Some(source.to_string());
        self.filename = filename.map(String::from);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Convert a stage error into a diagnostic.
pub trait ToDiagnostic {
    fn to_diagnostic(&self) -> Diagnostic;
}

#[cfg(test)]
mod tests {
    use super::*;
    use lambdawg_ast::{Pos, Span};

    #[test]
    fn builder_accumulates() {
        let d = Diagnostic::error("boom")
            .with_code("T001")
            .with_span(Span::new(Pos::new(1, 1, 0), Pos::new(1, 2, 1)))
            .with_hint("try not to boom");
        assert!(d.is_error());
        assert_eq!(d.code.as_deref(), Some("T001"));
        assert_eq!(d.hints.len(), 1);
    }

    #[test]
    fn warnings_are_not_errors() {
        assert!(!Diagnostic::warning("meh").is_error());
    }
}
