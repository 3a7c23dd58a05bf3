// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The type checker: statement traversal, let-generalization, and
//! registration of user type definitions.

use std::collections::{BTreeMap, HashMap, HashSet};

use lambdawg_ast::stmt::{LetStmt, Module, Program, Stmt, StmtKind, TypeDef, TypeDefBody};
use lambdawg_ast::ty::{TypeExpr, TypeExprKind};
use lambdawg_ast::{NodeId, Span};

use crate::types::{Scheme, Type, TypeVarId};

mod builtins;
mod check_expr;
mod check_pattern;
mod env;
pub mod errors;
mod inference;
mod unify;

use env::TypeEnv;
use errors::TypeError;
use inference::InferenceContext;

/// Alias expansion bound; deeper nesting is reported as undefined.
const MAX_ALIAS_DEPTH: usize = 32;

/// Result of a type-check run: a node → type annotation map plus any
/// errors found.
#[derive(Debug)]
pub struct TypeCheckResult {
    pub types: HashMap<NodeId, Type>,
    pub errors: Vec<TypeError>,
}

impl TypeCheckResult {
    /// Returns true if checking completed without errors.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// The type checker. One instance per compilation; the type-variable
/// counter starts from zero for each run.
pub struct TypeChecker {
    ctx: InferenceContext,
    env: TypeEnv,
    /// Known type constructors: name -> arity.
    type_arities: HashMap<String, usize>,
    /// Type aliases: name -> (params, surface type).
    aliases: HashMap<String, (Vec<String>, TypeExpr)>,
    /// Types assigned to nodes.
    node_types: HashMap<NodeId, Type>,
    /// Collected errors.
    errors: Vec<TypeError>,
}

impl TypeChecker {
    pub fn new() -> Self {
        let mut checker = Self {
            ctx: InferenceContext::new(),
            env: TypeEnv::new(),
            type_arities: HashMap::new(),
            aliases: HashMap::new(),
            node_types: HashMap::new(),
            errors: Vec::new(),
        };
        checker.install_builtins();
        checker
    }

    /// Infer and check the whole program. Inference continues past
    /// errors; every failure is recorded and the offending site is
    /// annotated with a fresh variable.
    pub fn check(mut self, program: &Program) -> TypeCheckResult {
        for module in &program.modules {
            self.check_module(module);
        }
        for stmt in &program.statements {
            self.check_stmt(stmt);
        }

        let types = self
            .node_types
            .iter()
            .map(|(id, ty)| (*id, self.ctx.apply(ty)))
            .collect();
        TypeCheckResult { types, errors: self.errors }
    }

    fn check_module(&mut self, module: &Module) {
        self.env.push_scope();
        for stmt in &module.statements {
            self.check_stmt(stmt);
        }

        // The module value is a closed record of its public binders.
        let mut fields = BTreeMap::new();
        for stmt in &module.statements {
            if let StmtKind::Let(l) = &stmt.kind {
                if !l.private {
                    if let Some(scheme) = self.env.lookup(&l.name) {
                        fields.insert(l.name.clone(), self.ctx.apply(&scheme.ty));
                    }
                }
            }
        }
        self.env.pop_scope();

        let record = Type::Record { fields, open: false };
        self.node_types.insert(module.id, record.clone());
        self.env.insert(module.name.clone(), Scheme::monomorphic(record));
    }

    pub(super) fn check_stmt(&mut self, stmt: &Stmt) -> Type {
        let ty = match &stmt.kind {
            StmtKind::Let(l) => {
                self.check_let(l);
                Type::unit()
            }
            StmtKind::TypeDef(td) => {
                self.register_typedef(td);
                Type::unit()
            }
            StmtKind::Import(import) => {
                // Foreign bindings get unconstrained types; a module
                // resolution pass would refine them.
                self.env
                    .insert(import.module.clone(), Scheme::monomorphic(self.ctx.fresh_var()));
                if let Some(lambdawg_ast::stmt::ImportItems::Named(items)) = &import.items {
                    for item in items {
                        let bound = item.alias.as_ref().unwrap_or(&item.name);
                        let v = self.ctx.fresh_var();
                        self.env.insert(bound.clone(), Scheme::monomorphic(v));
                    }
                }
                Type::unit()
            }
            StmtKind::Expr(e) => self.infer_expr(e),
        };
        self.node_types.insert(stmt.id, ty.clone());
        ty
    }

    /// `let name = value`: the binder is introduced monomorphically
    /// before the value is inferred (so recursive references check) and
    /// generalized on exit.
    fn check_let(&mut self, l: &LetStmt) {
        let binder = self.ctx.fresh_var();

        self.env.push_scope();
        self.env.insert(l.name.clone(), Scheme::monomorphic(binder.clone()));
        for amb in &l.ambients {
            let ty = match &amb.ty {
                Some(te) => {
                    let mut vars = HashMap::new();
                    self.convert_type_expr(te, &mut vars, 0)
                }
                None => self.ctx.fresh_var(),
            };
            self.env.insert(amb.name.clone(), Scheme::monomorphic(ty));
        }
        let value_ty = self.infer_expr(&l.value);
        self.env.pop_scope();

        self.unify_report(&binder, &value_ty, l.value.span);

        if let Some(te) = &l.ty {
            let mut vars = HashMap::new();
            let annotated = self.convert_type_expr(te, &mut vars, 0);
            self.unify_report(&annotated, &binder, te.span);
        }

        let scheme = self.generalize(&binder);
        self.env.insert(l.name.clone(), scheme);
    }

    fn register_typedef(&mut self, td: &TypeDef) {
        match &td.body {
            TypeDefBody::Sum(variants) => {
                self.type_arities.insert(td.name.clone(), td.params.len());
                for variant in variants {
                    let var_ids: Vec<TypeVarId> =
                        td.params.iter().map(|_| self.ctx.fresh_id()).collect();
                    let mut param_map: HashMap<String, Type> = td
                        .params
                        .iter()
                        .zip(&var_ids)
                        .map(|(p, id)| (p.clone(), Type::Var(*id)))
                        .collect();

                    let result = if td.params.is_empty() {
                        Type::Con(td.name.clone())
                    } else {
                        Type::App {
                            name: td.name.clone(),
                            args: var_ids.iter().map(|id| Type::Var(*id)).collect(),
                        }
                    };

                    let ty = match &variant.fields {
                        Some(fields) => {
                            let mut payload = BTreeMap::new();
                            for (fname, fte) in fields {
                                let t = self.convert_type_expr(fte, &mut param_map, 0);
                                payload.insert(fname.clone(), t);
                            }
                            Type::func(
                                vec![Type::Record { fields: payload, open: false }],
                                result,
                            )
                        }
                        None => result,
                    };

                    self.env.insert(variant.name.clone(), Scheme { vars: var_ids, ty });
                }
            }
            TypeDefBody::Alias(te) => {
                self.aliases.insert(td.name.clone(), (td.params.clone(), te.clone()));
            }
        }
    }

    /// Convert a surface type expression to a type. Lowercase names are
    /// type variables, scoped to the annotation via `vars`.
    fn convert_type_expr(
        &mut self,
        te: &TypeExpr,
        vars: &mut HashMap<String, Type>,
        depth: usize,
    ) -> Type {
        if depth > MAX_ALIAS_DEPTH {
            self.errors.push(TypeError::UndefinedType {
                name: "<recursive alias>".to_string(),
                span: te.span,
            });
            return self.ctx.fresh_var();
        }

        match &te.kind {
            TypeExprKind::Named(name) => {
                if name.starts_with(|c: char| c.is_ascii_lowercase() || c == '_') {
                    return vars
                        .entry(name.clone())
                        .or_insert_with(|| self.ctx.fresh_var())
                        .clone();
                }
                self.convert_named(name, &[], te.span, depth)
            }
            TypeExprKind::Fn { params, ret } => {
                let params = params
                    .iter()
                    .map(|p| self.convert_type_expr(p, vars, depth))
                    .collect();
                let ret = self.convert_type_expr(ret, vars, depth);
                Type::Fn { params, ret: Box::new(ret) }
            }
            TypeExprKind::Record(fields) => {
                let mut map = BTreeMap::new();
                for (name, fte) in fields {
                    if map.contains_key(name) {
                        self.errors.push(TypeError::DuplicateField {
                            field: name.clone(),
                            span: fte.span,
                        });
                    }
                    let t = self.convert_type_expr(fte, vars, depth);
                    map.insert(name.clone(), t);
                }
                Type::Record { fields: map, open: false }
            }
            TypeExprKind::List(inner) => {
                Type::list(self.convert_type_expr(inner, vars, depth))
            }
            TypeExprKind::Generic { name, args } => {
                let args: Vec<Type> = args
                    .iter()
                    .map(|a| self.convert_type_expr(a, vars, depth))
                    .collect();
                self.convert_named(name, &args, te.span, depth)
            }
        }
    }

    /// Resolve an uppercase type name applied to `args`.
    fn convert_named(&mut self, name: &str, args: &[Type], span: Span, depth: usize) -> Type {
        const CONSTANTS: &[&str] = &["Int", "Float", "String", "Char", "Bool", "Unit"];

        if name == "List" && args.len() == 1 {
            return Type::list(args[0].clone());
        }

        if CONSTANTS.contains(&name) {
            if !args.is_empty() {
                self.errors.push(TypeError::WrongArity { expected: 0, found: args.len(), span });
                return self.ctx.fresh_var();
            }
            return Type::con(name);
        }

        if let Some((params, body)) = self.aliases.get(name).cloned() {
            if params.len() != args.len() {
                self.errors.push(TypeError::WrongArity {
                    expected: params.len(),
                    found: args.len(),
                    span,
                });
                return self.ctx.fresh_var();
            }
            let mut alias_vars: HashMap<String, Type> =
                params.into_iter().zip(args.iter().cloned()).collect();
            return self.convert_type_expr(&body, &mut alias_vars, depth + 1);
        }

        if let Some(&arity) = self.type_arities.get(name) {
            if arity != args.len() {
                self.errors.push(TypeError::WrongArity { expected: arity, found: args.len(), span });
                return self.ctx.fresh_var();
            }
            if arity == 0 {
                return Type::con(name);
            }
            return Type::App { name: name.to_string(), args: args.to_vec() };
        }

        self.errors.push(TypeError::UndefinedType { name: name.to_string(), span });
        self.ctx.fresh_var()
    }

    /// Quantify the variables free in `ty` but not free in the
    /// environment.
    fn generalize(&mut self, ty: &Type) -> Scheme {
        let applied = self.ctx.apply(ty);
        let mut free = HashSet::new();
        applied.free_vars(&mut free);
        let env_free = self.env.free_type_vars(&self.ctx);
        let mut vars: Vec<TypeVarId> = free.difference(&env_free).copied().collect();
        vars.sort();
        Scheme { vars, ty: applied }
    }

    /// Replace each quantified variable with a fresh one.
    fn instantiate(&mut self, scheme: &Scheme) -> Type {
        if scheme.vars.is_empty() {
            return scheme.ty.clone();
        }
        let mapping: HashMap<TypeVarId, Type> = scheme
            .vars
            .iter()
            .map(|v| (*v, self.ctx.fresh_var()))
            .collect();
        scheme.ty.substitute(&mapping)
    }
}

impl Default for TypeChecker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_source(source: &str) -> (Program, TypeCheckResult) {
        let lex = lambdawg_lexer::Lexer::new(source).tokenize();
        assert!(lex.is_ok(), "lex errors: {:?}", lex.errors);
        let parsed = lambdawg_parser::Parser::new(lex.tokens).parse();
        assert!(parsed.is_ok(), "parse errors: {:?}", parsed.errors);
        let result = TypeChecker::new().check(&parsed.program);
        (parsed.program, result)
    }

    fn check_ok(source: &str) -> (Program, TypeCheckResult) {
        let (program, result) = check_source(source);
        assert!(result.is_ok(), "type errors: {:?}", result.errors);
        (program, result)
    }

    /// The inferred type of the value of the n-th top-level let.
    fn let_value_type(program: &Program, result: &TypeCheckResult, n: usize) -> Type {
        match &program.statements[n].kind {
            StmtKind::Let(l) => result.types[&l.value.id].clone(),
            other => panic!("expected let, got {:?}", other),
        }
    }

    #[test]
    fn literals_have_constant_types() {
        let (program, result) = check_ok("let a = 1 let b = 1.5 let c = \"s\" let d = 'x' let e = true");
        assert_eq!(let_value_type(&program, &result, 0), Type::int());
        assert_eq!(let_value_type(&program, &result, 1), Type::float());
        assert_eq!(let_value_type(&program, &result, 2), Type::string());
        assert_eq!(let_value_type(&program, &result, 3), Type::char());
        assert_eq!(let_value_type(&program, &result, 4), Type::bool());
    }

    #[test]
    fn function_types_infer() {
        let (program, result) = check_ok("let add = (a, b) => a + b let s = add(1, 2)");
        assert_eq!(let_value_type(&program, &result, 1), Type::int());
        match let_value_type(&program, &result, 0) {
            Type::Fn { params, .. } => assert_eq!(params.len(), 2),
            other => panic!("expected function type, got {}", other),
        }
    }

    #[test]
    fn let_polymorphism() {
        // id is generalized, then used at two different types.
        let (program, result) =
            check_ok("let id = (x) => x let a = id(42) let b = id(\"hello\")");
        assert_eq!(let_value_type(&program, &result, 1), Type::int());
        assert_eq!(let_value_type(&program, &result, 2), Type::string());
    }

    #[test]
    fn generalization_round_trip() {
        // Looking up a generalized binding and instantiating it unifies
        // with the original inferred type.
        let (_, result) = check_ok("let id = (x) => x let same = id(id)(7)");
        assert!(result.is_ok());
    }

    #[test]
    fn recursive_function_checks() {
        let (program, result) = check_ok(
            "let fact = (n) => if n == 0 then 1 else n * fact(n - 1) let x = fact(5)",
        );
        assert_eq!(let_value_type(&program, &result, 1), Type::int());
    }

    #[test]
    fn empty_list_is_polymorphic() {
        let (program, result) = check_ok("let xs = [] let ys = [1, 2, 3]");
        assert!(matches!(let_value_type(&program, &result, 0), Type::List(_)));
        assert_eq!(let_value_type(&program, &result, 1), Type::list(Type::int()));
    }

    #[test]
    fn list_elements_must_agree() {
        let (_, result) = check_source("let xs = [1, \"two\"]");
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].code(), "T001");
    }

    #[test]
    fn undefined_variable_with_span() {
        let (_, result) = check_source("let x = y + 1");
        assert_eq!(result.errors.len(), 1);
        let err = &result.errors[0];
        assert_eq!(err.code(), "T002");
        // `y` sits at offset 8.
        assert_eq!(err.span().start.offset, 8);
        assert_eq!(err.span().end.offset, 9);
    }

    #[test]
    fn placeholder_makes_call_partial() {
        let (program, result) =
            check_ok("let nums = [1, 2, 3] let d = nums |> map((x) => x * 2, _)");
        assert_eq!(let_value_type(&program, &result, 1), Type::list(Type::int()));
    }

    #[test]
    fn placeholder_call_without_pipeline() {
        let (program, result) = check_ok("let double = map((x) => x * 2, _)");
        match let_value_type(&program, &result, 0) {
            Type::Fn { params, ret } => {
                assert_eq!(params.len(), 1);
                assert_eq!(params[0], Type::list(Type::int()));
                assert_eq!(*ret, Type::list(Type::int()));
            }
            other => panic!("expected function, got {}", other),
        }
    }

    #[test]
    fn pipeline_supplies_last_argument() {
        let (program, result) = check_ok("let total = [1, 2, 3] |> sum");
        assert_eq!(let_value_type(&program, &result, 0), Type::int());
    }

    #[test]
    fn pipeline_into_unknown_function() {
        let (_, result) = check_ok("let go = (f) => 1 |> f");
        assert!(result.is_ok());
    }

    #[test]
    fn member_access_constrains_open_record() {
        let (program, result) = check_ok("let norm = (p) => p.x + p.y let n = norm({ x: 1, y: 2, z: 3 })");
        assert_eq!(let_value_type(&program, &result, 1), Type::int());
    }

    #[test]
    fn missing_field_on_closed_record() {
        let (_, result) = check_source("let p = { x: 1 } let y = p.y");
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].code(), "T008");
    }

    #[test]
    fn duplicate_record_field() {
        let (_, result) = check_source("let p = { x: 1, x: 2 }");
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].code(), "T007");
    }

    #[test]
    fn record_spread_merges_then_overrides() {
        let (program, result) =
            check_ok("let base = { x: 1, y: 2 } let p = { ...base, y: 10 } let v = p.x");
        assert_eq!(let_value_type(&program, &result, 2), Type::int());
    }

    #[test]
    fn index_forces_list_and_int() {
        let (program, result) = check_ok("let xs = [true, false] let b = xs[0]");
        assert_eq!(let_value_type(&program, &result, 1), Type::bool());

        let (_, bad) = check_source("let xs = [1] let b = xs[\"zero\"]");
        assert_eq!(bad.errors.len(), 1);
        assert_eq!(bad.errors[0].code(), "T001");
    }

    #[test]
    fn if_branches_unify() {
        let (_, result) = check_source("let x = if true then 1 else \"two\"");
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].code(), "T001");
    }

    #[test]
    fn if_condition_must_be_bool() {
        let (_, result) = check_source("let x = if 1 then 2 else 3");
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].code(), "T001");
    }

    #[test]
    fn match_arms_share_result_type() {
        let (program, result) = check_ok(
            r#"let f = (n) => match n { 0 => "zero" 1 => "one" _ => "other" } let s = f(7)"#,
        );
        assert_eq!(let_value_type(&program, &result, 1), Type::string());
    }

    #[test]
    fn match_arm_mismatch_is_reported() {
        let (_, result) = check_source(r#"let f = (n) => match n { 0 => "zero" _ => 1 }"#);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].code(), "T001");
    }

    #[test]
    fn match_guard_must_be_bool() {
        let (_, result) = check_source("let f = (n) => match n { k if k + 1 => 0 _ => 1 }");
        assert!(result.errors.iter().any(|e| e.code() == "T001"));
    }

    #[test]
    fn constructor_patterns_bind_payload() {
        let (program, result) = check_ok(
            "let first = (xs) => match head(xs) { Some(v) => v None => 0 } let n = first([1, 2])",
        );
        assert_eq!(let_value_type(&program, &result, 1), Type::int());
    }

    #[test]
    fn user_sum_type_round_trip() {
        let (program, result) = check_ok(
            "type Shape = Circle { radius: Float } | Square { side: Float }\n\
             let area = (s) => match s { Circle { radius } => radius Square { side } => side }\n\
             let a = area(Circle { radius: 2.0 })",
        );
        assert_eq!(let_value_type(&program, &result, 1), Type::float());
    }

    #[test]
    fn wrong_arity_call() {
        let (_, result) = check_source("let add = (a, b) => a + b let x = add(1)");
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].code(), "T005");
    }

    #[test]
    fn calling_a_non_function() {
        let (_, result) = check_source("let x = 1 let y = x(2)");
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].code(), "T004");
    }

    #[test]
    fn occurs_check_fires() {
        let (_, result) = check_source("let f = (x) => x(x)");
        assert!(result.errors.iter().any(|e| e.code() == "T006"));
    }

    #[test]
    fn annotation_mismatch() {
        let (_, result) = check_source("let x: String = 42");
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].code(), "T001");
    }

    #[test]
    fn annotation_with_unknown_type() {
        let (_, result) = check_source("let x: Wibble = 42");
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].code(), "T003");
    }

    #[test]
    fn annotation_accepts_polymorphic_signature() {
        let (_, result) = check_ok("let first: (List a) -> Option a = (xs) => head(xs)");
        assert!(result.is_ok());
    }

    #[test]
    fn alias_expands_in_annotations() {
        let (_, result) = check_ok("type Ids = [Int]\nlet xs: Ids = [1, 2, 3]");
        assert!(result.is_ok());
    }

    #[test]
    fn do_block_types_as_last_statement() {
        let (program, result) = check_ok("let main = do { let x = 1 do! show(x) x + 1 }");
        assert_eq!(let_value_type(&program, &result, 0), Type::int());
    }

    #[test]
    fn provide_scopes_provisions() {
        let (program, result) =
            check_ok("let run = (log) => provide log = show in { log(42) }");
        assert!(result.is_ok());
        let _ = program;
    }

    #[test]
    fn block_type_is_trailing_expression() {
        let (program, result) = check_ok("let x = { let a = 1 a * 2 }");
        assert_eq!(let_value_type(&program, &result, 0), Type::int());
    }

    #[test]
    fn propagate_passes_type_through() {
        let (program, result) = check_ok("let v = Ok(42)?");
        // Current contract: `?` returns the operand's type unchanged.
        assert_eq!(
            let_value_type(&program, &result, 0),
            Type::result(Type::int(), let_result_err(&program, &result))
        );
    }

    fn let_result_err(program: &Program, result: &TypeCheckResult) -> Type {
        // Fish the error-side variable out of the inferred Result type so
        // the assertion above stays exact.
        match let_value_type(program, result, 0) {
            Type::App { args, .. } => args[1].clone(),
            other => panic!("expected Result, got {}", other),
        }
    }

    #[test]
    fn modules_export_public_record() {
        let (program, result) = check_ok(
            "module math { let add = (a, b) => a + b private let hidden = 1 }\n\
             let s = math.add(1, 2)",
        );
        assert_eq!(let_value_type(&program, &result, 0), Type::int());
        // The module's record type exposes only the public binder.
        match &result.types[&program.modules[0].id] {
            Type::Record { fields, .. } => {
                assert!(fields.contains_key("add"));
                assert!(!fields.contains_key("hidden"));
            }
            other => panic!("expected record, got {}", other),
        }
    }

    #[test]
    fn inference_recovers_and_continues() {
        // Two independent errors in one program are both reported.
        let (_, result) = check_source("let a = missing1 let b = missing2");
        assert_eq!(result.errors.len(), 2);
        assert!(result.errors.iter().all(|e| e.code() == "T002"));
    }

    #[test]
    fn errors_preserve_source_order() {
        let (_, result) = check_source("let a = first let b = second");
        let spans: Vec<_> = result.errors.iter().map(|e| e.span().start.offset).collect();
        let mut sorted = spans.clone();
        sorted.sort();
        assert_eq!(spans, sorted);
    }
}
