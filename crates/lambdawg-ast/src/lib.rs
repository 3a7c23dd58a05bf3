// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Abstract Syntax Tree types for the Lambdawg language.
//!
//! This crate defines the vocabulary shared between the lexer, parser,
//! type inferer, and emitter: source spans, tokens, and AST nodes.

pub mod span;
pub mod token;
pub mod expr;
pub mod stmt;
pub mod ty;

pub use span::{LineMap, Pos, Span};

/// Unique identifier for AST nodes.
///
/// The parser assigns ids in creation order; the type inferer keys its
/// node → type annotation map on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(pub u32);

impl NodeId {
    pub const DUMMY: NodeId = NodeId(u32::MAX);
}
