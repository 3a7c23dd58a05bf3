// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The typing environment: a stack of scopes mapping names to schemes.

use std::collections::{HashMap, HashSet};

use crate::types::{Scheme, TypeVarId};

use super::inference::InferenceContext;

/// Lexically scoped name → scheme bindings. Lookup walks outward from
/// the innermost scope.
#[derive(Debug)]
pub struct TypeEnv {
    scopes: Vec<HashMap<String, Scheme>>,
}

impl TypeEnv {
    pub fn new() -> Self {
        Self { scopes: vec![HashMap::new()] }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    pub fn pop_scope(&mut self) {
        debug_assert!(self.scopes.len() > 1, "cannot pop the global scope");
        self.scopes.pop();
    }

    pub fn lookup(&self, name: &str) -> Option<&Scheme> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    /// Bind a name in the innermost scope, shadowing outer bindings.
    pub fn insert(&mut self, name: impl Into<String>, scheme: Scheme) {
        self.scopes.last_mut().unwrap().insert(name.into(), scheme);
    }

    /// Every type variable free in some scheme of the environment, after
    /// applying the current substitutions. Generalization must not
    /// quantify these.
    pub fn free_type_vars(&self, ctx: &InferenceContext) -> HashSet<TypeVarId> {
        let mut free = HashSet::new();
        for scope in &self.scopes {
            for scheme in scope.values() {
                let mut vars = HashSet::new();
                ctx.apply(&scheme.ty).free_vars(&mut vars);
                for v in &scheme.vars {
                    vars.remove(v);
                }
                free.extend(vars);
            }
        }
        free
    }
}

impl Default for TypeEnv {
    fn default() -> Self {
        Self::new()
    }
}
