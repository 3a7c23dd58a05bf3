// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Type unification.

use lambdawg_ast::Span;

use crate::types::Type;

use super::errors::TypeError;
use super::TypeChecker;

impl TypeChecker {
    /// Unify two types, updating the substitution map. The span is
    /// attached to any resulting error.
    pub(super) fn unify(&mut self, t1: &Type, t2: &Type, span: Span) -> Result<(), TypeError> {
        let t1 = self.ctx.apply(t1);
        let t2 = self.ctx.apply(t2);

        match (&t1, &t2) {
            (a, b) if a == b => Ok(()),

            (Type::Var(id), other) | (other, Type::Var(id)) => {
                if self.ctx.occurs_in(*id, other) {
                    return Err(TypeError::InfiniteType { ty: other.clone(), span });
                }
                self.ctx.substitutions.insert(*id, other.clone());
                Ok(())
            }

            (Type::Fn { params: p1, ret: r1 }, Type::Fn { params: p2, ret: r2 }) => {
                if p1.len() != p2.len() {
                    return Err(TypeError::WrongArity {
                        expected: p1.len(),
                        found: p2.len(),
                        span,
                    });
                }
                for (a, b) in p1.iter().zip(p2.iter()) {
                    self.unify(a, b, span)?;
                }
                self.unify(r1, r2, span)
            }

            (
                Type::Record { fields: f1, open: o1 },
                Type::Record { fields: f2, open: o2 },
            ) => {
                // Unify the intersection; a field missing on a closed side
                // is an error, an open side tolerates it.
                for (name, ty1) in f1 {
                    match f2.get(name) {
                        Some(ty2) => self.unify(ty1, ty2, span)?,
                        None if *o2 => {}
                        None => {
                            return Err(TypeError::MissingField {
                                ty: t2.clone(),
                                field: name.clone(),
                                span,
                            })
                        }
                    }
                }
                for name in f2.keys() {
                    if !f1.contains_key(name) && !*o1 {
                        return Err(TypeError::MissingField {
                            ty: t1.clone(),
                            field: name.clone(),
                            span,
                        });
                    }
                }
                Ok(())
            }

            (Type::List(e1), Type::List(e2)) => self.unify(e1, e2, span),

            (Type::App { name: n1, args: a1 }, Type::App { name: n2, args: a2 }) => {
                if n1 != n2 || a1.len() != a2.len() {
                    return Err(TypeError::Mismatch { expected: t1.clone(), found: t2.clone(), span });
                }
                for (a, b) in a1.iter().zip(a2.iter()) {
                    self.unify(a, b, span)?;
                }
                Ok(())
            }

            _ => Err(TypeError::Mismatch { expected: t1.clone(), found: t2.clone(), span }),
        }
    }

    /// Unify and record any failure as a diagnostic. Returns whether the
    /// unification succeeded; inference continues either way.
    pub(super) fn unify_report(&mut self, t1: &Type, t2: &Type, span: Span) -> bool {
        match self.unify(t1, t2, span) {
            Ok(()) => true,
            Err(e) => {
                self.errors.push(e);
                false
            }
        }
    }
}
