// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Type inference context: fresh variables and the substitution map.

use std::collections::HashMap;

use crate::types::{Type, TypeVarId};

/// State for type inference and unification.
///
/// Variable bindings are an explicit substitution map; `apply` resolves
/// chains of variables, playing the role of `prune` in the mutable-cell
/// formulation. Bindings are never reverted.
#[derive(Debug, Default)]
pub struct InferenceContext {
    /// Counter for fresh type variables.
    next_var: u32,
    /// Substitutions: TypeVarId -> Type.
    pub(super) substitutions: HashMap<TypeVarId, Type>,
}

impl InferenceContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh type variable id.
    pub fn fresh_id(&mut self) -> TypeVarId {
        let id = TypeVarId(self.next_var);
        self.next_var += 1;
        id
    }

    /// Create a fresh type variable.
    pub fn fresh_var(&mut self) -> Type {
        Type::Var(self.fresh_id())
    }

    /// Apply all known substitutions to a type, resolving variable chains.
    pub fn apply(&self, ty: &Type) -> Type {
        match ty {
            Type::Var(id) => {
                if let Some(resolved) = self.substitutions.get(id) {
                    self.apply(resolved)
                } else {
                    ty.clone()
                }
            }
            Type::Con(_) => ty.clone(),
            Type::Fn { params, ret } => Type::Fn {
                params: params.iter().map(|t| self.apply(t)).collect(),
                ret: Box::new(self.apply(ret)),
            },
            Type::Record { fields, open } => Type::Record {
                fields: fields
                    .iter()
                    .map(|(k, v)| (k.clone(), self.apply(v)))
                    .collect(),
                open: *open,
            },
            Type::List(elem) => Type::List(Box::new(self.apply(elem))),
            Type::App { name, args } => Type::App {
                name: name.clone(),
                args: args.iter().map(|a| self.apply(a)).collect(),
            },
        }
    }

    /// Check if a type variable occurs in a type (prevents infinite types).
    pub(super) fn occurs_in(&self, var: TypeVarId, ty: &Type) -> bool {
        match ty {
            Type::Var(id) => {
                if *id == var {
                    return true;
                }
                if let Some(subst) = self.substitutions.get(id) {
                    return self.occurs_in(var, subst);
                }
                false
            }
            Type::Con(_) => false,
            Type::Fn { params, ret } => {
                params.iter().any(|p| self.occurs_in(var, p)) || self.occurs_in(var, ret)
            }
            Type::Record { fields, .. } => fields.values().any(|t| self.occurs_in(var, t)),
            Type::List(elem) => self.occurs_in(var, elem),
            Type::App { args, .. } => args.iter().any(|a| self.occurs_in(var, a)),
        }
    }

    /// Bind a variable, following its chain to the last unbound link.
    /// Used to extend row-open records discovered behind variables.
    pub(super) fn rebind_chain_end(&mut self, start: TypeVarId, ty: Type) {
        let mut id = start;
        while let Some(Type::Var(next)) = self.substitutions.get(&id) {
            id = *next;
        }
        self.substitutions.insert(id, ty);
    }

    /// Resolve a variable chain to its last id, if the type is a variable.
    pub(super) fn chain_end(&self, ty: &Type) -> Option<TypeVarId> {
        let Type::Var(id) = ty else { return None };
        let mut id = *id;
        while let Some(Type::Var(next)) = self.substitutions.get(&id) {
            id = *next;
        }
        Some(id)
    }

    /// Number of recorded substitutions. Used by tests to observe that
    /// unifying equal types is a no-op.
    pub fn binding_count(&self) -> usize {
        self.substitutions.len()
    }
}
