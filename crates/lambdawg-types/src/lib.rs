// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Type inference for the Lambdawg language.
//!
//! Hindley-Milner with let-generalization, an occurs check, and row-open
//! record types. Inference never aborts: every failure is recorded as a
//! diagnostic and the offending site is annotated with a fresh variable.

pub mod types;
mod checker;

pub use checker::{TypeCheckResult, TypeChecker};
pub use checker::errors::TypeError;
