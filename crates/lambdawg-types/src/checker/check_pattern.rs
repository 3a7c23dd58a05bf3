// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Pattern binding against an expected type.

use std::collections::BTreeMap;

use lambdawg_ast::expr::{Pattern, PatternKind};

use crate::types::{Scheme, Type};

use super::errors::TypeError;
use super::TypeChecker;

impl TypeChecker {
    /// Bind a pattern's names in the current scope, unifying structure
    /// against the expected type. Bindings are monomorphic.
    pub(super) fn bind_pattern(&mut self, pattern: &Pattern, expected: &Type) {
        match &pattern.kind {
            PatternKind::Wildcard => {}

            PatternKind::Ident(name) => {
                self.env.insert(name.clone(), Scheme::monomorphic(expected.clone()));
            }

            PatternKind::Literal(lit) => {
                let t = self.infer_expr(lit);
                self.unify_report(expected, &t, pattern.span);
            }

            PatternKind::List { elements, rest } => {
                let elem = self.ctx.fresh_var();
                self.unify_report(expected, &Type::list(elem.clone()), pattern.span);
                for el in elements {
                    self.bind_pattern(el, &elem);
                }
                if let Some(Some(name)) = rest {
                    self.env
                        .insert(name.clone(), Scheme::monomorphic(Type::list(elem)));
                }
            }

            PatternKind::Record { fields, .. } => {
                let mut row = BTreeMap::new();
                for (name, sub) in fields {
                    let v = self.ctx.fresh_var();
                    row.insert(name.clone(), v.clone());
                    match sub {
                        Some(p) => self.bind_pattern(p, &v),
                        None => self.env.insert(name.clone(), Scheme::monomorphic(v)),
                    }
                }
                // The subject must have at least the named fields.
                self.unify_report(expected, &Type::Record { fields: row, open: true }, pattern.span);
            }

            PatternKind::Constructor { name, record, inner } => {
                let Some(scheme) = self.env.lookup(name).cloned() else {
                    self.errors.push(TypeError::UndefinedVariable {
                        name: name.clone(),
                        span: pattern.span,
                    });
                    return;
                };
                let ctor_ty = self.instantiate(&scheme);
                match ctor_ty {
                    Type::Fn { params, ret } => {
                        self.unify_report(expected, &ret, pattern.span);
                        if let Some(payload) = params.first() {
                            if let Some(p) = inner {
                                self.bind_pattern(p, payload);
                            }
                            if let Some(fields) = record {
                                let record_pattern = Pattern {
                                    kind: PatternKind::Record {
                                        fields: fields.clone(),
                                        rest: true,
                                    },
                                    span: pattern.span,
                                };
                                self.bind_pattern(&record_pattern, payload);
                            }
                        }
                    }
                    // Nullary constructor: the pattern matches the
                    // constructed type directly.
                    other => {
                        self.unify_report(expected, &other, pattern.span);
                    }
                }
            }

            PatternKind::Rest(name) => {
                if let Some(name) = name {
                    self.env.insert(name.clone(), Scheme::monomorphic(expected.clone()));
                }
            }
        }
    }
}
