// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The JavaScript emitter implementation.

use lambdawg_ast::expr::{
    BinOp, DoStmt, DoStmtKind, Expr, ExprKind, FieldInit, MatchArm, Pattern, PatternKind, UnaryOp,
};
use lambdawg_ast::stmt::{Module, Program, Stmt, StmtKind, TypeDefBody};

use crate::prelude::PRELUDE;
use crate::reserved::js_name;

/// Options controlling emission.
#[derive(Debug, Clone)]
pub struct EmitOptions {
    /// Prepend the runtime prelude. Disable when embedding into a host
    /// that provides the prelude itself.
    pub include_prelude: bool,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self { include_prelude: true }
    }
}

/// The emitter. One instance per program; fresh-name counters restart
/// at zero so output is deterministic.
pub struct Emitter {
    options: EmitOptions,
    indent: usize,
    temp: u32,
}

impl Emitter {
    pub fn new(options: EmitOptions) -> Self {
        Self { options, indent: 0, temp: 0 }
    }

    /// Lower a program to JavaScript source text.
    pub fn emit(mut self, program: &Program) -> String {
        let mut out = String::new();
        if self.options.include_prelude {
            out.push_str(PRELUDE);
            out.push('\n');
        }
        for module in &program.modules {
            out.push_str(&self.emit_module(module));
        }
        for stmt in &program.statements {
            out.push_str(&self.emit_stmt(stmt));
        }
        out
    }

    fn pad(&self) -> String {
        "  ".repeat(self.indent)
    }

    fn fresh(&mut self, base: &str) -> String {
        let n = self.temp;
        self.temp += 1;
        format!("{}{}", base, n)
    }

    // =========================================================================
    // Statements
    // =========================================================================

    /// A module is a self-executing scope yielding a record of its
    /// non-private binders.
    fn emit_module(&mut self, module: &Module) -> String {
        let mut s = String::new();
        s.push_str(&format!(
            "{}const {} = (() => {{\n",
            self.pad(),
            js_name(&module.name)
        ));
        self.indent += 1;
        for stmt in &module.statements {
            s.push_str(&self.emit_stmt(stmt));
        }

        let mut exports = Vec::new();
        for stmt in &module.statements {
            if let StmtKind::Let(l) = &stmt.kind {
                if !l.private {
                    let renamed = js_name(&l.name);
                    if renamed == l.name {
                        exports.push(l.name.clone());
                    } else {
                        exports.push(format!("{}: {}", l.name, renamed));
                    }
                }
            }
        }
        s.push_str(&format!("{}return {{ {} }};\n", self.pad(), exports.join(", ")));
        self.indent -= 1;
        s.push_str(&format!("{}}})();\n", self.pad()));
        s
    }

    fn emit_stmt(&mut self, stmt: &Stmt) -> String {
        match &stmt.kind {
            StmtKind::Let(l) => {
                let value = self.emit_expr(&l.value);
                let value = if l.ambients.is_empty() {
                    value
                } else {
                    // Ambient dependencies become leading parameters,
                    // supplied by a provide site.
                    let params: Vec<String> =
                        l.ambients.iter().map(|a| js_name(&a.name)).collect();
                    format!("({}) => {}", params.join(", "), wrap_arrow_body(value, &l.value))
                };
                format!("{}const {} = {};\n", self.pad(), js_name(&l.name), value)
            }

            StmtKind::TypeDef(td) => {
                let mut s = String::new();
                if let TypeDefBody::Sum(variants) = &td.body {
                    for v in variants {
                        if v.fields.is_some() {
                            s.push_str(&format!(
                                "{}const {} = (value) => ({{ __tag: {}, value, ...value }});\n",
                                self.pad(),
                                v.name,
                                js_string(&v.name)
                            ));
                        } else {
                            s.push_str(&format!(
                                "{}const {} = {{ __tag: {} }};\n",
                                self.pad(),
                                v.name,
                                js_string(&v.name)
                            ));
                        }
                    }
                }
                // Aliases are erased.
                s
            }

            // No module loader in the core; imports are resolution-only.
            StmtKind::Import(_) => String::new(),

            StmtKind::Expr(e) => {
                let v = self.emit_expr(e);
                format!("{}{};\n", self.pad(), v)
            }
        }
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn emit_expr(&mut self, expr: &Expr) -> String {
        match &expr.kind {
            ExprKind::Int(n) => n.to_string(),
            ExprKind::Float(f) => format!("{:?}", f),
            ExprKind::Str(s) => js_string(s),
            ExprKind::Char(c) => js_string(&c.to_string()),
            ExprKind::Bool(b) => b.to_string(),
            ExprKind::Ident(name) => js_name(name),

            ExprKind::List(elements) => {
                let parts: Vec<String> = elements
                    .iter()
                    .map(|el| match &el.kind {
                        ExprKind::Spread(inner) => format!("...{}", self.emit_expr(inner)),
                        _ => self.emit_expr(el),
                    })
                    .collect();
                format!("[{}]", parts.join(", "))
            }

            ExprKind::Record { fields, spread } => self.emit_record(fields, spread.as_deref()),

            ExprKind::Function { params, body } => {
                let params: Vec<String> =
                    params.iter().map(|p| self.param_pattern_js(p)).collect();
                let body_str = self.emit_expr(body);
                format!("({}) => {}", params.join(", "), wrap_arrow_body(body_str, body))
            }

            ExprKind::Call { callee, args } => self.emit_call(callee, args),

            ExprKind::Member { object, field } => {
                format!("{}.{}", self.emit_expr(object), field)
            }

            ExprKind::Index { object, index } => {
                format!("{}[{}]", self.emit_expr(object), self.emit_expr(index))
            }

            ExprKind::Unary { op, operand } => {
                let sym = match op {
                    UnaryOp::Neg => "-",
                    UnaryOp::Not => "!",
                };
                format!("({}{})", sym, self.emit_expr(operand))
            }

            ExprKind::Binary { op, left, right } => {
                // Left operand first, then right, preserving evaluation
                // order inside explicit parentheses.
                let l = self.emit_expr(left);
                let r = self.emit_expr(right);
                format!("({} {} {})", l, js_binop(*op), r)
            }

            ExprKind::Pipeline { left, right, .. } => {
                // `seq` and `@parallel` hints are recorded in the AST but
                // do not alter emission.
                let l = self.emit_expr(left);
                let r = self.emit_expr(right);
                format!("pipe({}, {})", l, wrap_callee(r, right))
            }

            ExprKind::Propagate(inner) => {
                format!("unwrap({})", self.emit_expr(inner))
            }

            ExprKind::If { cond, then_branch, else_branch } => {
                let c = self.emit_expr(cond);
                let t = self.emit_expr(then_branch);
                let e = self.emit_expr(else_branch);
                format!("({} ? {} : {})", c, t, e)
            }

            ExprKind::Match { subject, arms } => self.emit_match(subject, arms),

            ExprKind::Do { body, .. } => self.emit_do(body),

            ExprKind::Provide { provisions, body } => {
                let mut s = String::new();
                s.push_str("(() => {\n");
                self.indent += 1;
                for (name, value) in provisions {
                    let v = self.emit_expr(value);
                    s.push_str(&format!("{}const {} = {};\n", self.pad(), js_name(name), v));
                }
                let body_str = self.emit_expr(body);
                s.push_str(&format!("{}return {};\n", self.pad(), body_str));
                self.indent -= 1;
                s.push_str(&format!("{}}})()", self.pad()));
                s
            }

            ExprKind::Block(stmts) => {
                let mut s = String::new();
                s.push_str("(() => {\n");
                self.indent += 1;
                for (i, stmt) in stmts.iter().enumerate() {
                    let is_last = i + 1 == stmts.len();
                    if is_last {
                        if let StmtKind::Expr(e) = &stmt.kind {
                            let v = self.emit_expr(e);
                            s.push_str(&format!("{}return {};\n", self.pad(), v));
                            continue;
                        }
                    }
                    s.push_str(&self.emit_stmt(stmt));
                }
                self.indent -= 1;
                s.push_str(&format!("{}}})()", self.pad()));
                s
            }

            // A placeholder outside a call has no value of its own.
            ExprKind::Placeholder => "undefined".to_string(),

            ExprKind::Spread(inner) => format!("...{}", self.emit_expr(inner)),
        }
    }

    fn emit_record(&mut self, fields: &[FieldInit], spread: Option<&Expr>) -> String {
        let mut parts = Vec::new();
        // Spread first so explicit field writes win.
        if let Some(sp) = spread {
            parts.push(format!("...{}", self.emit_expr(sp)));
        }
        for f in fields {
            parts.push(format!("{}: {}", f.name, self.emit_expr(&f.value)));
        }
        if parts.is_empty() {
            "{}".to_string()
        } else {
            format!("{{ {} }}", parts.join(", "))
        }
    }

    /// Calls with placeholders become fresh closures; the placeholders'
    /// parameters are substituted at their original argument indices.
    fn emit_call(&mut self, callee: &Expr, args: &[Expr]) -> String {
        let callee_str = self.emit_expr(callee);
        let callee_str = wrap_callee(callee_str, callee);

        let has_placeholder = args.iter().any(|a| matches!(a.kind, ExprKind::Placeholder));
        if !has_placeholder {
            let args: Vec<String> = args.iter().map(|a| self.emit_expr(a)).collect();
            return format!("{}({})", callee_str, args.join(", "));
        }

        let mut closure_params = Vec::new();
        let mut call_args = Vec::new();
        for arg in args {
            if matches!(arg.kind, ExprKind::Placeholder) {
                let p = self.fresh("_p");
                closure_params.push(p.clone());
                call_args.push(p);
            } else {
                call_args.push(self.emit_expr(arg));
            }
        }
        format!(
            "(({}) => {}({}))",
            closure_params.join(", "),
            callee_str,
            call_args.join(", ")
        )
    }

    /// A match becomes an immediately-invoked block: bind the subject,
    /// test arms in source order, and fail at the end.
    fn emit_match(&mut self, subject: &Expr, arms: &[MatchArm]) -> String {
        let subject_str = self.emit_expr(subject);
        let subj = self.fresh("__subject");

        let mut s = String::new();
        s.push_str("(() => {\n");
        self.indent += 1;
        s.push_str(&format!("{}const {} = {};\n", self.pad(), subj, subject_str));

        for arm in arms {
            let test = self.pattern_test(&arm.pattern, &subj);
            let bindings = self.pattern_bindings(&arm.pattern, &subj);

            // An unconditional arm returns directly; anything after it is
            // reachable only on paper.
            if test.is_none() && arm.guard.is_none() {
                for (name, access) in &bindings {
                    s.push_str(&format!("{}const {} = {};\n", self.pad(), name, access));
                }
                let body = self.emit_expr(&arm.body);
                s.push_str(&format!("{}return {};\n", self.pad(), body));
                continue;
            }

            let cond = test.unwrap_or_else(|| "true".to_string());
            s.push_str(&format!("{}if ({}) {{\n", self.pad(), cond));
            self.indent += 1;
            for (name, access) in &bindings {
                s.push_str(&format!("{}const {} = {};\n", self.pad(), name, access));
            }
            match &arm.guard {
                Some(guard) => {
                    let g = self.emit_expr(guard);
                    s.push_str(&format!("{}if ({}) {{\n", self.pad(), g));
                    self.indent += 1;
                    let body = self.emit_expr(&arm.body);
                    s.push_str(&format!("{}return {};\n", self.pad(), body));
                    self.indent -= 1;
                    s.push_str(&format!("{}}}\n", self.pad()));
                }
                None => {
                    let body = self.emit_expr(&arm.body);
                    s.push_str(&format!("{}return {};\n", self.pad(), body));
                }
            }
            self.indent -= 1;
            s.push_str(&format!("{}}}\n", self.pad()));
        }

        s.push_str(&format!(
            "{}__fail(\"non-exhaustive pattern match\");\n",
            self.pad()
        ));
        self.indent -= 1;
        s.push_str(&format!("{}}})()", self.pad()));
        s
    }

    /// A do-block is an asynchronous self-invoking function; `do!`
    /// statements are awaited and the last statement yields the value.
    fn emit_do(&mut self, body: &[DoStmt]) -> String {
        let mut s = String::new();
        s.push_str("(async () => {\n");
        self.indent += 1;

        for (i, stmt) in body.iter().enumerate() {
            let is_last = i + 1 == body.len();
            match &stmt.kind {
                DoStmtKind::Let { pattern, effectful, value } => {
                    let v = self.emit_expr(value);
                    let v = if *effectful { format!("await {}", v) } else { v };
                    s.push_str(&self.emit_pattern_binding(pattern, &v));
                }
                DoStmtKind::Effect(e) => {
                    let v = self.emit_expr(e);
                    if is_last {
                        s.push_str(&format!("{}return await {};\n", self.pad(), v));
                    } else {
                        s.push_str(&format!("{}await {};\n", self.pad(), v));
                    }
                }
                DoStmtKind::Expr(e) => {
                    let v = self.emit_expr(e);
                    if is_last {
                        s.push_str(&format!("{}return {};\n", self.pad(), v));
                    } else {
                        s.push_str(&format!("{}{};\n", self.pad(), v));
                    }
                }
            }
        }

        self.indent -= 1;
        s.push_str(&format!("{}}})()", self.pad()));
        s
    }

    // =========================================================================
    // Patterns
    // =========================================================================

    /// Bind a pattern to a value inside a statement context.
    fn emit_pattern_binding(&mut self, pattern: &Pattern, value: &str) -> String {
        match &pattern.kind {
            PatternKind::Ident(name) => {
                format!("{}const {} = {};\n", self.pad(), js_name(name), value)
            }
            PatternKind::Wildcard => format!("{}{};\n", self.pad(), value),
            _ => {
                let tmp = self.fresh("__bind");
                let mut s = format!("{}const {} = {};\n", self.pad(), tmp, value);
                for (name, access) in self.pattern_bindings(pattern, &tmp) {
                    s.push_str(&format!("{}const {} = {};\n", self.pad(), name, access));
                }
                s
            }
        }
    }

    /// The structural test for a pattern, or None when it always matches.
    fn pattern_test(&mut self, pattern: &Pattern, path: &str) -> Option<String> {
        match &pattern.kind {
            PatternKind::Wildcard | PatternKind::Ident(_) | PatternKind::Rest(_) => None,

            PatternKind::Literal(lit) => {
                let value = self.emit_expr(lit);
                Some(format!("{} === {}", path, value))
            }

            PatternKind::List { elements, rest } => {
                let mut parts = vec![format!("Array.isArray({})", path)];
                if rest.is_some() {
                    parts.push(format!("{}.length >= {}", path, elements.len()));
                } else {
                    parts.push(format!("{}.length === {}", path, elements.len()));
                }
                for (i, el) in elements.iter().enumerate() {
                    if let Some(t) = self.pattern_test(el, &format!("{}[{}]", path, i)) {
                        parts.push(t);
                    }
                }
                Some(parts.join(" && "))
            }

            PatternKind::Record { fields, .. } => {
                let mut parts = Vec::new();
                for (name, sub) in fields {
                    if let Some(p) = sub {
                        if let Some(t) = self.pattern_test(p, &format!("{}.{}", path, name)) {
                            parts.push(t);
                        }
                    }
                }
                if parts.is_empty() {
                    None
                } else {
                    Some(parts.join(" && "))
                }
            }

            PatternKind::Constructor { name, record, inner } => {
                let mut parts = vec![format!("{}.__tag === {}", path, js_string(name))];
                if let Some(fields) = record {
                    for (fname, sub) in fields {
                        if let Some(p) = sub {
                            if let Some(t) =
                                self.pattern_test(p, &format!("{}.{}", path, fname))
                            {
                                parts.push(t);
                            }
                        }
                    }
                }
                if let Some(p) = inner {
                    if let Some(t) = self.pattern_test(p, &format!("{}.value", path)) {
                        parts.push(t);
                    }
                }
                Some(parts.join(" && "))
            }
        }
    }

    /// Names introduced by a pattern, with the access path for each.
    fn pattern_bindings(&mut self, pattern: &Pattern, path: &str) -> Vec<(String, String)> {
        let mut out = Vec::new();
        self.collect_bindings(pattern, path, &mut out);
        out
    }

    fn collect_bindings(&mut self, pattern: &Pattern, path: &str, out: &mut Vec<(String, String)>) {
        match &pattern.kind {
            PatternKind::Wildcard | PatternKind::Literal(_) => {}

            PatternKind::Ident(name) => out.push((js_name(name), path.to_string())),

            PatternKind::List { elements, rest } => {
                for (i, el) in elements.iter().enumerate() {
                    self.collect_bindings(el, &format!("{}[{}]", path, i), out);
                }
                if let Some(Some(name)) = rest {
                    out.push((js_name(name), format!("{}.slice({})", path, elements.len())));
                }
            }

            PatternKind::Record { fields, .. } => {
                for (name, sub) in fields {
                    let access = format!("{}.{}", path, name);
                    match sub {
                        Some(p) => self.collect_bindings(p, &access, out),
                        None => out.push((js_name(name), access)),
                    }
                }
            }

            PatternKind::Constructor { record, inner, .. } => {
                if let Some(fields) = record {
                    for (name, sub) in fields {
                        let access = format!("{}.{}", path, name);
                        match sub {
                            Some(p) => self.collect_bindings(p, &access, out),
                            None => out.push((js_name(name), access)),
                        }
                    }
                }
                if let Some(p) = inner {
                    self.collect_bindings(p, &format!("{}.value", path), out);
                }
            }

            PatternKind::Rest(name) => {
                if let Some(name) = name {
                    out.push((js_name(name), path.to_string()));
                }
            }
        }
    }

    /// A function parameter as JavaScript binding syntax.
    fn param_pattern_js(&mut self, pattern: &Pattern) -> String {
        match &pattern.kind {
            PatternKind::Ident(name) => js_name(name),
            PatternKind::Wildcard => self.fresh("_w"),
            PatternKind::Literal(_) => self.fresh("_lit"),
            PatternKind::Record { fields, .. } => {
                let parts: Vec<String> = fields
                    .iter()
                    .map(|(name, sub)| match sub {
                        Some(p) => format!("{}: {}", name, self.param_pattern_js(p)),
                        None => {
                            let bound = js_name(name);
                            if bound == *name {
                                name.clone()
                            } else {
                                format!("{}: {}", name, bound)
                            }
                        }
                    })
                    .collect();
                format!("{{ {} }}", parts.join(", "))
            }
            PatternKind::List { elements, rest } => {
                let mut parts: Vec<String> =
                    elements.iter().map(|p| self.param_pattern_js(p)).collect();
                if let Some(Some(name)) = rest {
                    parts.push(format!("...{}", js_name(name)));
                }
                format!("[{}]", parts.join(", "))
            }
            // Tag-checked patterns cannot be expressed as parameter
            // destructuring; the value arrives under a fresh name.
            PatternKind::Constructor { .. } | PatternKind::Rest(_) => self.fresh("_arg"),
        }
    }
}

/// Record literals need parentheses as arrow bodies.
fn wrap_arrow_body(body: String, expr: &Expr) -> String {
    if matches!(expr.kind, ExprKind::Record { .. }) {
        format!("({})", body)
    } else {
        body
    }
}

/// Function literals need parentheses in callee position.
fn wrap_callee(callee: String, expr: &Expr) -> String {
    if matches!(expr.kind, ExprKind::Function { .. }) {
        format!("({})", callee)
    } else {
        callee
    }
}

fn js_binop(op: BinOp) -> &'static str {
    match op {
        BinOp::Eq => "===",
        BinOp::Ne => "!==",
        other => other.symbol(),
    }
}

/// Escape a string for a double-quoted JavaScript literal.
fn js_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\0"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emit_source(source: &str) -> String {
        let lex = lambdawg_lexer::Lexer::new(source).tokenize();
        assert!(lex.is_ok(), "lex errors: {:?}", lex.errors);
        let parsed = lambdawg_parser::Parser::new(lex.tokens).parse();
        assert!(parsed.is_ok(), "parse errors: {:?}", parsed.errors);
        Emitter::new(EmitOptions { include_prelude: false }).emit(&parsed.program)
    }

    #[test]
    fn simple_binding() {
        assert_eq!(emit_source("let x = 42"), "const x = 42;\n");
    }

    #[test]
    fn function_binding() {
        assert_eq!(
            emit_source("let add = (a, b) => a + b"),
            "const add = (a, b) => (a + b);\n"
        );
    }

    #[test]
    fn if_becomes_ternary() {
        assert!(emit_source("let x = if true then 1 else 2").contains("true ? 1 : 2"));
    }

    #[test]
    fn pipeline_uses_prelude_pipe() {
        let code = emit_source("let d = nums |> map((x) => x * 2, _)");
        assert!(code.contains("pipe(nums, "));
        // The placeholder becomes a fresh closure parameter at its index.
        assert!(code.contains("((_p0) => map((x) => (x * 2), _p0))"));
    }

    #[test]
    fn placeholder_positions_are_preserved() {
        let code = emit_source("let f = g(1, _, 2, _)");
        assert!(code.contains("((_p0, _p1) => g(1, _p0, 2, _p1))"));
    }

    #[test]
    fn match_lowering_in_source_order() {
        let code = emit_source(
            r#"let f = (n) => match n { 0 => "zero" 1 => "one" _ => "other" }"#,
        );
        let subject = code.find("const __subject0 = n;").expect("subject binding");
        let zero = code.find("=== 0").expect("first test");
        let one = code.find("=== 1").expect("second test");
        let other = code.rfind("return \"other\";").expect("fallthrough arm");
        assert!(subject < zero && zero < one && one < other);
        assert!(code.contains("__fail(\"non-exhaustive pattern match\")"));
    }

    #[test]
    fn match_guard_nests_inside_structural_test() {
        let code = emit_source("let f = (n) => match n { k if k > 0 => k _ => 0 }");
        assert!(code.contains("const k = __subject0;"));
        assert!(code.contains("if ((k > 0))"));
    }

    #[test]
    fn constructor_pattern_tests_tag() {
        let code = emit_source("let f = (r) => match r { Ok(v) => v Error(e) => e }");
        assert!(code.contains("__subject0.__tag === \"Ok\""));
        assert!(code.contains("const v = __subject0.value;"));
        assert!(code.contains("__subject0.__tag === \"Error\""));
    }

    #[test]
    fn list_pattern_tests_length_and_slices_rest() {
        let code = emit_source("let f = (xs) => match xs { [a, ...rest] => rest _ => xs }");
        assert!(code.contains("Array.isArray(__subject0)"));
        assert!(code.contains("__subject0.length >= 1"));
        assert!(code.contains("const rest = __subject0.slice(1);"));
    }

    #[test]
    fn do_block_is_async_iife() {
        let code = emit_source("let main = do { let user = do! fetchUser() do! log(user) user }");
        assert!(code.contains("(async () => {"));
        assert!(code.contains("const user = await fetchUser();"));
        assert!(code.contains("await log(user);"));
        assert!(code.contains("return user;"));
    }

    #[test]
    fn propagate_lowers_to_unwrap() {
        let code = emit_source("let v = fetch(url)?");
        assert!(code.contains("const v = unwrap(fetch(url));"));
    }

    #[test]
    fn provide_binds_locally() {
        let code = emit_source("let x = provide log = show in { log(1) }");
        assert!(code.contains("const log = show;"));
        assert!(code.contains("return (() => {"));
    }

    #[test]
    fn record_spread_comes_first() {
        let code = emit_source("let p = { ...base, x: 1 }");
        assert!(code.contains("{ ...base, x: 1 }"));
    }

    #[test]
    fn ambients_become_parameters() {
        let code = emit_source("let fetch with http, cache = (url) => http.get(url)");
        assert!(code.contains("const fetch = (http, cache) => (url) => http.get(url);"));
    }

    #[test]
    fn reserved_words_renamed_at_definition_and_use() {
        let code = emit_source("let class = 1 let x = class + 1");
        assert!(code.contains("const _class = 1;"));
        assert!(code.contains("(_class + 1)"));
    }

    #[test]
    fn module_exposes_public_record() {
        let code = emit_source(
            "module math { let add = (a, b) => a + b let mul = (a, b) => a * b private let secret = 0 }",
        );
        assert!(code.contains("const math = (() => {"));
        assert!(code.contains("return { add, mul };"));
        assert!(!code.contains("secret,"));
    }

    #[test]
    fn sum_type_constructors_are_emitted() {
        let code = emit_source("type Shape = Circle { radius: Float } | Dot");
        assert!(code.contains("const Circle = (value) => ({ __tag: \"Circle\", value, ...value });"));
        assert!(code.contains("const Dot = { __tag: \"Dot\" };"));
    }

    #[test]
    fn constructor_literal_lowers_to_call() {
        let code = emit_source("type Shape = Circle { radius: Float } | Dot\nlet c = Circle { radius: 2.0 }");
        assert!(code.contains("const c = Circle({ radius: 2.0 });"));
    }

    #[test]
    fn equality_uses_strict_operators() {
        let code = emit_source("let t = a == b let u = a != b");
        assert!(code.contains("(a === b)"));
        assert!(code.contains("(a !== b)"));
    }

    #[test]
    fn strings_are_escaped() {
        let code = emit_source(r#"let s = "line\nquote\"end""#);
        assert!(code.contains(r#""line\nquote\"end""#));
    }

    #[test]
    fn top_level_order_is_preserved() {
        let code = emit_source("let a = 1 let b = 2 let c = 3");
        let a = code.find("const a").unwrap();
        let b = code.find("const b").unwrap();
        let c = code.find("const c").unwrap();
        assert!(a < b && b < c);
    }

    #[test]
    fn prelude_is_included_by_default() {
        let lex = lambdawg_lexer::Lexer::new("let x = 1").tokenize();
        let parsed = lambdawg_parser::Parser::new(lex.tokens).parse();
        let code = Emitter::new(EmitOptions::default()).emit(&parsed.program);
        assert!(code.contains("const __lambdawg = {"));
        assert!(code.contains("const { Ok, Error, Some, None,"));
        assert!(code.ends_with("const x = 1;\n"));
    }

    #[test]
    fn block_returns_trailing_expression() {
        let code = emit_source("let x = { let t = 1 t * 2 }");
        assert!(code.contains("const t = 1;"));
        assert!(code.contains("return (t * 2);"));
    }
}
