// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Terminal formatter for diagnostics.
//!
//! Produces multi-line, color-coded output:
//!
//! ```text
//! error[T002]: undefined variable 'y'
//!   --> main.ld:1:9
//!    |
//!  1 | let x = y + 1
//!    |         ^
//!    = hint: 'y' is not in scope; check spelling or add a let binding
//! ```

use colored::Colorize;

use crate::{Diagnostic, Severity};

/// Format one diagnostic for terminal display. Context lines are only
/// rendered when the driver attached the source.
pub fn format(diagnostic: &Diagnostic) -> String {
    let mut out = String::new();

    // Line 1: severity[code]: message
    let severity_str = match diagnostic.severity {
        Severity::Error => "error".red().bold(),
        Severity::Warning => "warning".yellow().bold(),
        Severity::Info => "info".blue().bold(),
    };
    match &diagnostic.code {
        Some(code) => out.push_str(&format!(
            "{}[{}]: {}\n",
            severity_str,
            code.red().bold(),
            diagnostic.message.bold()
        )),
        None => out.push_str(&format!("{}: {}\n", severity_str, diagnostic.message.bold())),
    }

    if let (Some(span), Some(source)) = (&diagnostic.span, &diagnostic.source) {
        let file = diagnostic.filename.as_deref().unwrap_or("<source>");
        let line = span.start.line as usize;
        let col = span.start.column as usize;
        out.push_str(&format!("  {} {}:{}:{}\n", "-->".blue(), file, line, col));

        if let Some(text) = source.lines().nth(line.saturating_sub(1)) {
            let gutter_width = line.to_string().len().max(2);
            out.push_str(&format!("{} {}\n", " ".repeat(gutter_width + 1), "|".blue()));
            out.push_str(&format!(
                "{:>width$} {} {}\n",
                line.to_string().blue().bold(),
                "|".blue(),
                text,
                width = gutter_width + 1,
            ));

            // The caret run covers the span on its first line.
            let underline_len = if span.end.line == span.start.line {
                (span.end.column.saturating_sub(span.start.column) as usize).max(1)
            } else {
                text.len().saturating_sub(col - 1).max(1)
            };
            out.push_str(&format!(
                "{} {} {}{}\n",
                " ".repeat(gutter_width + 1),
                "|".blue(),
                " ".repeat(col.saturating_sub(1)),
                "^".repeat(underline_len).red().bold(),
            ));
        }
    }

    for hint in &diagnostic.hints {
        out.push_str(&format!("   {} {}: {}\n", "=".cyan(), "hint".cyan().bold(), hint));
    }

    out
}

/// Format a batch of diagnostics separated by blank lines.
pub fn format_all(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(format)
        .collect::<Vec<_>>()
        .join("\n")
}
