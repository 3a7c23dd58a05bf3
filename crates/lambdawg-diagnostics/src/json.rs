// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! JSON diagnostic output for machine consumption.

use serde::Serialize;

use crate::codes::CodeRegistry;
use crate::{Diagnostic, Severity};

/// A complete JSON diagnostic report for a compilation run.
#[derive(Debug, Serialize)]
pub struct DiagnosticReport {
    /// Schema version for forward compatibility.
    pub version: u32,
    pub file: String,
    pub success: bool,
    pub diagnostics: Vec<JsonDiagnostic>,
    pub error_count: usize,
    pub warning_count: usize,
}

/// A single diagnostic in JSON form, enriched with source context.
#[derive(Debug, Serialize)]
pub struct JsonDiagnostic {
    pub severity: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<String>,
}

/// A source location with 1-based line/column.
#[derive(Debug, Serialize)]
pub struct SourceLocation {
    pub line: u32,
    pub column: u32,
    pub byte_offset: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_line: Option<String>,
}

/// Convert diagnostics to a structured JSON report.
pub fn to_json_report(diagnostics: &[Diagnostic], file: &str) -> DiagnosticReport {
    let registry = CodeRegistry::default();
    let mut error_count = 0;
    let mut warning_count = 0;

    let json_diags: Vec<JsonDiagnostic> = diagnostics
        .iter()
        .map(|d| {
            match d.severity {
                Severity::Error => error_count += 1,
                Severity::Warning => warning_count += 1,
                Severity::Info => {}
            }
            to_json_diagnostic(d, &registry)
        })
        .collect();

    DiagnosticReport {
        version: 1,
        file: file.to_string(),
        success: error_count == 0,
        diagnostics: json_diags,
        error_count,
        warning_count,
    }
}

fn to_json_diagnostic(diag: &Diagnostic, registry: &CodeRegistry) -> JsonDiagnostic {
    let severity = match diag.severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
        Severity::Info => "info",
    };

    let category = diag
        .code
        .as_ref()
        .and_then(|c| registry.get(c))
        .map(|info| info.category.to_string());

    let location = diag.span.map(|span| SourceLocation {
        line: span.start.line,
        column: span.start.column,
        byte_offset: span.start.offset,
        source_line: diag
            .source
            .as_ref()
            .and_then(|src| src.lines().nth(span.start.line as usize - 1))
            .map(String::from),
    });

    JsonDiagnostic {
        severity: severity.to_string(),
        code: diag.code.clone(),
        category,
        message: diag.message.clone(),
        location,
        hints: diag.hints.clone(),
    }
}

/// Serialize a diagnostic report to pretty JSON.
pub fn to_json_string(report: &DiagnosticReport) -> String {
    serde_json::to_string_pretty(report).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lambdawg_ast::{Pos, Span};

    #[test]
    fn report_counts_and_locates() {
        let diags = vec![
            Diagnostic::error("bad")
                .with_code("T001")
                .with_span(Span::new(Pos::new(2, 5, 10), Pos::new(2, 8, 13)))
                .with_source("line one\nline two here", Some("x.ld")),
            Diagnostic::warning("meh"),
        ];
        let report = to_json_report(&diags, "x.ld");
        assert!(!report.success);
        assert_eq!(report.error_count, 1);
        assert_eq!(report.warning_count, 1);

        let loc = report.diagnostics[0].location.as_ref().unwrap();
        assert_eq!(loc.line, 2);
        assert_eq!(loc.column, 5);
        assert_eq!(loc.source_line.as_deref(), Some("line two here"));
        assert_eq!(report.diagnostics[0].category.as_deref(), Some("Type"));

        let json = to_json_string(&report);
        assert!(json.contains("\"code\": \"T001\""));
    }
}
