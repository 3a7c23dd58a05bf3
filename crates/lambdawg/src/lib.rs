// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The Lambdawg compiler driver.
//!
//! Sequences the pipeline (lex → parse → infer → emit), aggregates
//! diagnostics across stages, and short-circuits at the earliest stage
//! that reported an error. This is the public API; the stage crates are
//! re-exported for callers that want individual artifacts.

pub use lambdawg_ast as ast;
pub use lambdawg_diagnostics::{formatter, json, Diagnostic, Severity};
pub use lambdawg_emit::EmitOptions;

use lambdawg_ast::stmt::Program;
use lambdawg_ast::token::Token;
use lambdawg_diagnostics::ToDiagnostic;

/// Options for a compile or check run.
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    /// Attached to diagnostics for display; not a filesystem path.
    pub filename: Option<String>,
    /// Skip type inference and go straight to emission.
    pub skip_type_check: bool,
    pub emit: EmitOptions,
}

/// The result of a compile or check run.
#[derive(Debug)]
pub struct CompileResult {
    pub success: bool,
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
    /// Emitted JavaScript; absent for `check` and failed runs.
    pub code: Option<String>,
    /// The parsed program, when parsing got far enough to produce one.
    pub ast: Option<Program>,
}

/// Compile source text to JavaScript.
pub fn compile(source: &str, options: &CompileOptions) -> CompileResult {
    run(source, options, true)
}

/// Run every validation stage without emitting.
pub fn check(source: &str, options: &CompileOptions) -> CompileResult {
    run(source, options, false)
}

fn run(source: &str, options: &CompileOptions, emit_code: bool) -> CompileResult {
    let filename = options.filename.as_deref();
    let mut errors: Vec<Diagnostic> = Vec::new();
    let warnings: Vec<Diagnostic> = Vec::new();

    let attach = |diag: Diagnostic| diag.with_source(source, filename);

    let lexed = lambdawg_lexer::Lexer::new(source).tokenize();
    errors.extend(lexed.errors.iter().map(|e| attach(e.to_diagnostic())));
    if !errors.is_empty() {
        return CompileResult { success: false, errors, warnings, code: None, ast: None };
    }

    let parsed = lambdawg_parser::Parser::new(lexed.tokens).parse();
    errors.extend(parsed.errors.iter().map(|e| attach(e.to_diagnostic())));
    if !errors.is_empty() {
        return CompileResult {
            success: false,
            errors,
            warnings,
            code: None,
            ast: Some(parsed.program),
        };
    }

    if !options.skip_type_check {
        let checked = lambdawg_types::TypeChecker::new().check(&parsed.program);
        errors.extend(checked.errors.iter().map(|e| attach(e.to_diagnostic())));
        if !errors.is_empty() {
            return CompileResult {
                success: false,
                errors,
                warnings,
                code: None,
                ast: Some(parsed.program),
            };
        }
    }

    let code = if emit_code {
        Some(lambdawg_emit::Emitter::new(options.emit.clone()).emit(&parsed.program))
    } else {
        None
    };

    CompileResult { success: true, errors, warnings, code, ast: Some(parsed.program) }
}

// =============================================================================
// Individual stages
// =============================================================================

/// Tokenize source text.
pub fn tokenize(source: &str) -> lambdawg_lexer::LexResult {
    lambdawg_lexer::Lexer::new(source).tokenize()
}

/// Parse a token stream.
pub fn parse(tokens: Vec<Token>) -> lambdawg_parser::ParseResult {
    lambdawg_parser::Parser::new(tokens).parse()
}

/// Infer and check types over a parsed program.
pub fn type_check(program: &Program) -> lambdawg_types::TypeCheckResult {
    lambdawg_types::TypeChecker::new().check(program)
}

/// Lower a parsed program to JavaScript.
pub fn emit(program: &Program, options: &EmitOptions) -> String {
    lambdawg_emit::Emitter::new(options.clone()).emit(program)
}
