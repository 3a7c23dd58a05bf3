// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Per-expression type inference.

use std::collections::{BTreeMap, HashSet};

use lambdawg_ast::expr::{BinOp, DoStmtKind, Expr, ExprKind, FieldInit, UnaryOp};
use lambdawg_ast::stmt::StmtKind;
use lambdawg_ast::Span;

use crate::types::{Scheme, Type};

use super::errors::TypeError;
use super::TypeChecker;

impl TypeChecker {
    /// Infer an expression's type, annotate the node, and return it.
    /// Never fails: errors are recorded and a fresh variable stands in
    /// for the failed site.
    pub(super) fn infer_expr(&mut self, expr: &Expr) -> Type {
        let ty = match &expr.kind {
            ExprKind::Int(_) => Type::int(),
            ExprKind::Float(_) => Type::float(),
            ExprKind::Str(_) => Type::string(),
            ExprKind::Char(_) => Type::char(),
            ExprKind::Bool(_) => Type::bool(),

            ExprKind::Ident(name) => match self.env.lookup(name).cloned() {
                Some(scheme) => self.instantiate(&scheme),
                None => {
                    self.errors.push(TypeError::UndefinedVariable {
                        name: name.clone(),
                        span: expr.span,
                    });
                    self.ctx.fresh_var()
                }
            },

            ExprKind::List(elements) => {
                let elem = self.ctx.fresh_var();
                for el in elements {
                    if let ExprKind::Spread(inner) = &el.kind {
                        let t = self.infer_expr(inner);
                        self.unify_report(&t, &Type::list(elem.clone()), inner.span);
                        self.node_types.insert(el.id, Type::list(elem.clone()));
                    } else {
                        let t = self.infer_expr(el);
                        self.unify_report(&elem, &t, el.span);
                    }
                }
                Type::list(elem)
            }

            ExprKind::Record { fields, spread } => self.infer_record(fields, spread.as_deref()),

            ExprKind::Function { params, body } => {
                self.env.push_scope();
                let mut param_tys = Vec::new();
                for p in params {
                    let v = self.ctx.fresh_var();
                    self.bind_pattern(p, &v);
                    param_tys.push(v);
                }
                let body_ty = self.infer_expr(body);
                self.env.pop_scope();
                Type::Fn { params: param_tys, ret: Box::new(body_ty) }
            }

            ExprKind::Call { callee, args } => self.infer_call(callee, args, expr.span),

            ExprKind::Member { object, field } => {
                let obj_ty = self.infer_expr(object);
                self.check_member(&obj_ty, field, expr.span)
            }

            ExprKind::Index { object, index } => {
                let obj_ty = self.infer_expr(object);
                let elem = self.ctx.fresh_var();
                self.unify_report(&obj_ty, &Type::list(elem.clone()), object.span);
                let idx_ty = self.infer_expr(index);
                self.unify_report(&idx_ty, &Type::int(), index.span);
                elem
            }

            ExprKind::Unary { op, operand } => {
                let t = self.infer_expr(operand);
                match op {
                    UnaryOp::Neg => t,
                    UnaryOp::Not => {
                        self.unify_report(&t, &Type::bool(), operand.span);
                        Type::bool()
                    }
                }
            }

            ExprKind::Binary { op, left, right } => self.infer_binary(*op, left, right, expr.span),

            ExprKind::Pipeline { left, right, .. } => self.infer_pipeline(left, right),

            // Current contract: `?` passes its operand's type through.
            // A future effects pass will constrain it to Result.
            ExprKind::Propagate(inner) => self.infer_expr(inner),

            ExprKind::If { cond, then_branch, else_branch } => {
                let c = self.infer_expr(cond);
                self.unify_report(&c, &Type::bool(), cond.span);
                let t = self.infer_expr(then_branch);
                let e = self.infer_expr(else_branch);
                self.unify_report(&t, &e, else_branch.span);
                t
            }

            ExprKind::Match { subject, arms } => {
                let subject_ty = self.infer_expr(subject);
                let mut result: Option<Type> = None;
                for arm in arms {
                    self.env.push_scope();
                    self.bind_pattern(&arm.pattern, &subject_ty);
                    if let Some(guard) = &arm.guard {
                        let g = self.infer_expr(guard);
                        self.unify_report(&g, &Type::bool(), guard.span);
                    }
                    let body_ty = self.infer_expr(&arm.body);
                    self.env.pop_scope();
                    match &result {
                        Some(r) => {
                            self.unify_report(r, &body_ty, arm.body.span);
                        }
                        None => result = Some(body_ty),
                    }
                }
                result.unwrap_or_else(|| self.ctx.fresh_var())
            }

            ExprKind::Do { body, .. } => {
                self.env.push_scope();
                let mut last = Type::unit();
                for stmt in body {
                    let t = match &stmt.kind {
                        DoStmtKind::Let { pattern, value, .. } => {
                            let value_ty = self.infer_expr(value);
                            self.bind_pattern(pattern, &value_ty);
                            Type::unit()
                        }
                        DoStmtKind::Effect(e) | DoStmtKind::Expr(e) => self.infer_expr(e),
                    };
                    self.node_types.insert(stmt.id, t.clone());
                    last = t;
                }
                self.env.pop_scope();
                last
            }

            ExprKind::Provide { provisions, body } => {
                self.env.push_scope();
                for (name, value) in provisions {
                    let t = self.infer_expr(value);
                    self.env.insert(name.clone(), Scheme::monomorphic(t));
                }
                let t = self.infer_expr(body);
                self.env.pop_scope();
                t
            }

            ExprKind::Block(stmts) => {
                self.env.push_scope();
                let mut last = Type::unit();
                for stmt in stmts {
                    last = self.check_stmt(stmt);
                }
                self.env.pop_scope();
                match stmts.last() {
                    Some(s) if matches!(s.kind, StmtKind::Expr(_)) => last,
                    _ => Type::unit(),
                }
            }

            ExprKind::Placeholder => self.ctx.fresh_var(),

            ExprKind::Spread(inner) => self.infer_expr(inner),
        };

        self.node_types.insert(expr.id, ty.clone());
        ty
    }

    fn infer_record(&mut self, fields: &[FieldInit], spread: Option<&Expr>) -> Type {
        let mut map = BTreeMap::new();
        let mut open = false;

        // Spread fields merge first; explicit fields override them.
        if let Some(sp) = spread {
            let t = self.infer_expr(sp);
            match self.ctx.apply(&t) {
                Type::Record { fields: base, open: base_open } => {
                    map.extend(base);
                    open = base_open;
                }
                // Spreading an unknown value: the result has at least the
                // explicit fields.
                _ => open = true,
            }
        }

        let mut seen = HashSet::new();
        for f in fields {
            if !seen.insert(f.name.as_str()) {
                self.errors.push(TypeError::DuplicateField {
                    field: f.name.clone(),
                    span: f.value.span,
                });
            }
            let t = self.infer_expr(&f.value);
            map.insert(f.name.clone(), t);
        }

        Type::Record { fields: map, open }
    }

    fn infer_call(&mut self, callee: &Expr, args: &[Expr], span: Span) -> Type {
        let callee_ty = self.infer_expr(callee);

        // A known non-function shape is reported directly; unification
        // would only produce a less precise mismatch.
        match self.ctx.apply(&callee_ty) {
            Type::Con(_) | Type::Record { .. } | Type::List(_) | Type::App { .. } => {
                for arg in args {
                    if !matches!(arg.kind, ExprKind::Placeholder) {
                        self.infer_expr(arg);
                    }
                }
                self.errors.push(TypeError::NotAFunction {
                    ty: self.ctx.apply(&callee_ty),
                    span: callee.span,
                });
                return self.ctx.fresh_var();
            }
            _ => {}
        }

        let has_placeholder = args.iter().any(|a| matches!(a.kind, ExprKind::Placeholder));

        if has_placeholder {
            // Partial application: the call denotes a function of the
            // placeholder positions.
            let mut placeholder_params = Vec::new();
            let mut expected_params = Vec::new();
            for arg in args {
                if matches!(arg.kind, ExprKind::Placeholder) {
                    let v = self.ctx.fresh_var();
                    self.node_types.insert(arg.id, v.clone());
                    placeholder_params.push(v.clone());
                    expected_params.push(v);
                } else {
                    expected_params.push(self.infer_expr(arg));
                }
            }
            let ret = self.ctx.fresh_var();
            let expected = Type::Fn { params: expected_params, ret: Box::new(ret.clone()) };
            self.unify_report(&callee_ty, &expected, span);
            Type::Fn { params: placeholder_params, ret: Box::new(ret) }
        } else {
            let arg_tys: Vec<Type> = args.iter().map(|a| self.infer_expr(a)).collect();
            let ret = self.ctx.fresh_var();
            let expected = Type::Fn { params: arg_tys, ret: Box::new(ret.clone()) };
            self.unify_report(&callee_ty, &expected, span);
            ret
        }
    }

    fn infer_binary(&mut self, op: BinOp, left: &Expr, right: &Expr, span: Span) -> Type {
        let l = self.infer_expr(left);
        let r = self.infer_expr(right);
        match op {
            BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod => {
                self.unify_report(&l, &r, span);
                l
            }
            BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge => {
                self.unify_report(&l, &r, span);
                Type::bool()
            }
            BinOp::And | BinOp::Or => {
                self.unify_report(&l, &Type::bool(), left.span);
                self.unify_report(&r, &Type::bool(), right.span);
                Type::bool()
            }
        }
    }

    /// `x |> f`: the left type is unified with f's last parameter and the
    /// result is f's return. An unknown right side is constrained to a
    /// one-parameter function.
    fn infer_pipeline(&mut self, left: &Expr, right: &Expr) -> Type {
        let left_ty = self.infer_expr(left);
        let right_ty = self.infer_expr(right);

        match self.ctx.apply(&right_ty) {
            Type::Fn { params, ret } => {
                match params.last() {
                    Some(last) => {
                        self.unify_report(&left_ty, last, left.span);
                    }
                    None => {
                        self.errors.push(TypeError::WrongArity {
                            expected: 1,
                            found: 0,
                            span: right.span,
                        });
                    }
                }
                *ret
            }
            Type::Var(_) => {
                let ret = self.ctx.fresh_var();
                let expected = Type::func(vec![left_ty], ret.clone());
                self.unify_report(&right_ty, &expected, right.span);
                ret
            }
            other => {
                self.errors.push(TypeError::NotAFunction { ty: other, span: right.span });
                self.ctx.fresh_var()
            }
        }
    }

    /// Member access. Closed records must contain the field; variables
    /// and open records are constrained to "has at least this field".
    fn check_member(&mut self, object_ty: &Type, field: &str, span: Span) -> Type {
        let applied = self.ctx.apply(object_ty);
        match applied {
            Type::Var(_) => {
                let rho = self.ctx.fresh_var();
                let mut fields = BTreeMap::new();
                fields.insert(field.to_string(), rho.clone());
                let constraint = Type::Record { fields, open: true };
                self.unify_report(object_ty, &constraint, span);
                rho
            }
            Type::Record { ref fields, open } => {
                if let Some(ty) = fields.get(field) {
                    ty.clone()
                } else if open {
                    // Extend the row behind the variable chain, if any.
                    let rho = self.ctx.fresh_var();
                    if let Some(end) = self.ctx.chain_end(object_ty) {
                        let mut extended = fields.clone();
                        extended.insert(field.to_string(), rho.clone());
                        self.ctx
                            .rebind_chain_end(end, Type::Record { fields: extended, open: true });
                    }
                    rho
                } else {
                    self.errors.push(TypeError::MissingField {
                        ty: applied.clone(),
                        field: field.to_string(),
                        span,
                    });
                    self.ctx.fresh_var()
                }
            }
            other => {
                let mut fields = BTreeMap::new();
                let rho = self.ctx.fresh_var();
                fields.insert(field.to_string(), rho);
                self.errors.push(TypeError::Mismatch {
                    expected: Type::Record { fields, open: true },
                    found: other,
                    span,
                });
                self.ctx.fresh_var()
            }
        }
    }
}
