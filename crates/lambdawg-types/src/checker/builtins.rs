// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Built-in combinators and prelude constructors.
//!
//! These mirror the runtime prelude the emitter ships: list combinators,
//! `show`/`identity`/`tap`, and the `Option`/`Result` constructors.

use crate::types::{Scheme, Type};

use super::env::TypeEnv;
use super::inference::InferenceContext;
use super::TypeChecker;

impl TypeChecker {
    pub(super) fn install_builtins(&mut self) {
        // Built-in type constructors usable in annotations.
        self.type_arities.insert("Option".to_string(), 1);
        self.type_arities.insert("Result".to_string(), 2);

        install_schemes(&mut self.env, &mut self.ctx);
    }
}

fn install_schemes(env: &mut TypeEnv, ctx: &mut InferenceContext) {
    // map : ((a) -> b, List a) -> List b
    let (a, b) = (ctx.fresh_id(), ctx.fresh_id());
    env.insert(
        "map",
        Scheme {
            vars: vec![a, b],
            ty: Type::func(
                vec![
                    Type::func(vec![Type::Var(a)], Type::Var(b)),
                    Type::list(Type::Var(a)),
                ],
                Type::list(Type::Var(b)),
            ),
        },
    );

    // filter : ((a) -> Bool, List a) -> List a
    let a = ctx.fresh_id();
    env.insert(
        "filter",
        Scheme {
            vars: vec![a],
            ty: Type::func(
                vec![
                    Type::func(vec![Type::Var(a)], Type::bool()),
                    Type::list(Type::Var(a)),
                ],
                Type::list(Type::Var(a)),
            ),
        },
    );

    // fold : ((b, a) -> b, b, List a) -> b
    let (a, b) = (ctx.fresh_id(), ctx.fresh_id());
    env.insert(
        "fold",
        Scheme {
            vars: vec![a, b],
            ty: Type::func(
                vec![
                    Type::func(vec![Type::Var(b), Type::Var(a)], Type::Var(b)),
                    Type::Var(b),
                    Type::list(Type::Var(a)),
                ],
                Type::Var(b),
            ),
        },
    );

    // sum : (List Int) -> Int
    env.insert(
        "sum",
        Scheme::monomorphic(Type::func(vec![Type::list(Type::int())], Type::int())),
    );

    // length : (List a) -> Int
    let a = ctx.fresh_id();
    env.insert(
        "length",
        Scheme {
            vars: vec![a],
            ty: Type::func(vec![Type::list(Type::Var(a))], Type::int()),
        },
    );

    // show : (a) -> String
    let a = ctx.fresh_id();
    env.insert(
        "show",
        Scheme {
            vars: vec![a],
            ty: Type::func(vec![Type::Var(a)], Type::string()),
        },
    );

    // identity : (a) -> a
    let a = ctx.fresh_id();
    env.insert(
        "identity",
        Scheme {
            vars: vec![a],
            ty: Type::func(vec![Type::Var(a)], Type::Var(a)),
        },
    );

    // head : (List a) -> Option a
    let a = ctx.fresh_id();
    env.insert(
        "head",
        Scheme {
            vars: vec![a],
            ty: Type::func(vec![Type::list(Type::Var(a))], Type::option(Type::Var(a))),
        },
    );

    // tail : (List a) -> Option (List a)
    let a = ctx.fresh_id();
    env.insert(
        "tail",
        Scheme {
            vars: vec![a],
            ty: Type::func(
                vec![Type::list(Type::Var(a))],
                Type::option(Type::list(Type::Var(a))),
            ),
        },
    );

    // tap : ((a) -> Unit, a) -> a
    let a = ctx.fresh_id();
    env.insert(
        "tap",
        Scheme {
            vars: vec![a],
            ty: Type::func(
                vec![Type::func(vec![Type::Var(a)], Type::unit()), Type::Var(a)],
                Type::Var(a),
            ),
        },
    );

    // Some : (a) -> Option a
    let a = ctx.fresh_id();
    env.insert(
        "Some",
        Scheme {
            vars: vec![a],
            ty: Type::func(vec![Type::Var(a)], Type::option(Type::Var(a))),
        },
    );

    // None : Option a
    let a = ctx.fresh_id();
    env.insert(
        "None",
        Scheme {
            vars: vec![a],
            ty: Type::option(Type::Var(a)),
        },
    );

    // Ok : (a) -> Result a e
    let (a, e) = (ctx.fresh_id(), ctx.fresh_id());
    env.insert(
        "Ok",
        Scheme {
            vars: vec![a, e],
            ty: Type::func(vec![Type::Var(a)], Type::result(Type::Var(a), Type::Var(e))),
        },
    );

    // Error : (e) -> Result a e
    let (a, e) = (ctx.fresh_id(), ctx.fresh_id());
    env.insert(
        "Error",
        Scheme {
            vars: vec![a, e],
            ty: Type::func(vec![Type::Var(e)], Type::result(Type::Var(a), Type::Var(e))),
        },
    );
}
