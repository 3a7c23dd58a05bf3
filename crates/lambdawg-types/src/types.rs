// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Type definitions for the type system.

use std::collections::BTreeMap;
use std::fmt;

/// Unique identifier for type variables during inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeVarId(pub u32);

impl fmt::Display for TypeVarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// A type in Lambdawg.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    /// Type variable (for inference)
    Var(TypeVarId),
    /// Named constant: `Int`, `Float`, `String`, `Char`, `Bool`, `Unit`,
    /// or a user-defined nullary type.
    Con(String),
    /// Function type
    Fn {
        params: Vec<Type>,
        ret: Box<Type>,
    },
    /// Record type. `open` records tolerate extra fields during
    /// unification ("has at least these fields").
    Record {
        fields: BTreeMap<String, Type>,
        open: bool,
    },
    /// Homogeneous list
    List(Box<Type>),
    /// Applied type constructor: `Option a`, `Result a e`.
    App {
        name: String,
        args: Vec<Type>,
    },
}

impl Type {
    pub fn con(name: &str) -> Type {
        Type::Con(name.to_string())
    }

    pub fn int() -> Type {
        Type::con("Int")
    }

    pub fn float() -> Type {
        Type::con("Float")
    }

    pub fn string() -> Type {
        Type::con("String")
    }

    pub fn char() -> Type {
        Type::con("Char")
    }

    pub fn bool() -> Type {
        Type::con("Bool")
    }

    pub fn unit() -> Type {
        Type::con("Unit")
    }

    pub fn list(elem: Type) -> Type {
        Type::List(Box::new(elem))
    }

    pub fn func(params: Vec<Type>, ret: Type) -> Type {
        Type::Fn { params, ret: Box::new(ret) }
    }

    pub fn option(inner: Type) -> Type {
        Type::App { name: "Option".to_string(), args: vec![inner] }
    }

    pub fn result(ok: Type, err: Type) -> Type {
        Type::App { name: "Result".to_string(), args: vec![ok, err] }
    }

    /// Collect the free type variables of this type into `out`.
    /// Assumes the type has already had substitutions applied.
    pub fn free_vars(&self, out: &mut std::collections::HashSet<TypeVarId>) {
        match self {
            Type::Var(id) => {
                out.insert(*id);
            }
            Type::Con(_) => {}
            Type::Fn { params, ret } => {
                for p in params {
                    p.free_vars(out);
                }
                ret.free_vars(out);
            }
            Type::Record { fields, .. } => {
                for ty in fields.values() {
                    ty.free_vars(out);
                }
            }
            Type::List(elem) => elem.free_vars(out),
            Type::App { args, .. } => {
                for a in args {
                    a.free_vars(out);
                }
            }
        }
    }

    /// Replace variables according to `mapping`, leaving others untouched.
    /// Purely structural; used by scheme instantiation.
    pub fn substitute(&self, mapping: &std::collections::HashMap<TypeVarId, Type>) -> Type {
        match self {
            Type::Var(id) => mapping.get(id).cloned().unwrap_or_else(|| self.clone()),
            Type::Con(_) => self.clone(),
            Type::Fn { params, ret } => Type::Fn {
                params: params.iter().map(|p| p.substitute(mapping)).collect(),
                ret: Box::new(ret.substitute(mapping)),
            },
            Type::Record { fields, open } => Type::Record {
                fields: fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.substitute(mapping)))
                    .collect(),
                open: *open,
            },
            Type::List(elem) => Type::List(Box::new(elem.substitute(mapping))),
            Type::App { name, args } => Type::App {
                name: name.clone(),
                args: args.iter().map(|a| a.substitute(mapping)).collect(),
            },
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Var(id) => write!(f, "{}", id),
            Type::Con(name) => write!(f, "{}", name),
            Type::Fn { params, ret } => {
                write!(f, "(")?;
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", p)?;
                }
                write!(f, ") -> {}", ret)
            }
            Type::Record { fields, open } => {
                write!(f, "{{ ")?;
                for (i, (name, ty)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", name, ty)?;
                }
                if *open {
                    if !fields.is_empty() {
                        write!(f, ", ")?;
                    }
                    write!(f, "..")?;
                }
                write!(f, " }}")
            }
            Type::List(elem) => write!(f, "List {}", fmt_atom(elem)),
            Type::App { name, args } => {
                write!(f, "{}", name)?;
                for a in args {
                    write!(f, " {}", fmt_atom(a))?;
                }
                Ok(())
            }
        }
    }
}

/// Parenthesize compound types in application-argument position.
fn fmt_atom(ty: &Type) -> String {
    match ty {
        Type::Var(_) | Type::Con(_) | Type::Record { .. } => format!("{}", ty),
        _ => format!("({})", ty),
    }
}

/// A type scheme: a type with a set of quantified variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Scheme {
    pub vars: Vec<TypeVarId>,
    pub ty: Type,
}

impl Scheme {
    /// A scheme quantifying nothing.
    pub fn monomorphic(ty: Type) -> Self {
        Scheme { vars: Vec::new(), ty }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_function_type() {
        let ty = Type::func(vec![Type::int(), Type::bool()], Type::string());
        assert_eq!(ty.to_string(), "(Int, Bool) -> String");
    }

    #[test]
    fn display_applied_types() {
        assert_eq!(Type::option(Type::int()).to_string(), "Option Int");
        assert_eq!(
            Type::result(Type::int(), Type::string()).to_string(),
            "Result Int String"
        );
        assert_eq!(
            Type::list(Type::option(Type::int())).to_string(),
            "List (Option Int)"
        );
    }

    #[test]
    fn display_open_record() {
        let mut fields = BTreeMap::new();
        fields.insert("x".to_string(), Type::int());
        let ty = Type::Record { fields, open: true };
        assert_eq!(ty.to_string(), "{ x: Int, .. }");
    }

    #[test]
    fn substitute_replaces_mapped_vars_only() {
        let a = TypeVarId(0);
        let b = TypeVarId(1);
        let ty = Type::func(vec![Type::Var(a)], Type::Var(b));
        let mut mapping = std::collections::HashMap::new();
        mapping.insert(a, Type::int());
        let out = ty.substitute(&mapping);
        assert_eq!(out, Type::func(vec![Type::int()], Type::Var(b)));
    }

    #[test]
    fn free_vars_reaches_nested_positions() {
        let a = TypeVarId(3);
        let ty = Type::list(Type::func(vec![Type::Var(a)], Type::int()));
        let mut free = std::collections::HashSet::new();
        ty.free_vars(&mut free);
        assert!(free.contains(&a));
        assert_eq!(free.len(), 1);
    }
}
