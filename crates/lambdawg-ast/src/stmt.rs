// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Statement, module, and program AST nodes.

use crate::expr::Expr;
use crate::ty::TypeExpr;
use crate::{NodeId, Span};

/// A complete parsed program: modules first, then loose statements,
/// both in source order.
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub modules: Vec<Module>,
    pub statements: Vec<Stmt>,
}

/// A `module name { … }` declaration.
#[derive(Debug, Clone)]
pub struct Module {
    pub id: NodeId,
    pub name: String,
    pub statements: Vec<Stmt>,
    pub span: Span,
}

/// A statement in the AST.
#[derive(Debug, Clone)]
pub struct Stmt {
    pub id: NodeId,
    pub kind: StmtKind,
    pub span: Span,
}

/// The kind of statement.
#[derive(Debug, Clone)]
pub enum StmtKind {
    Let(LetStmt),
    TypeDef(TypeDef),
    Import(ImportStmt),
    /// Expression statement
    Expr(Expr),
}

/// A `let` binding: `[private] let name [with a, b] [: Type] = expr`.
#[derive(Debug, Clone)]
pub struct LetStmt {
    pub name: String,
    pub private: bool,
    /// Ambient dependencies from the `with` clause.
    pub ambients: Vec<Ambient>,
    pub ty: Option<TypeExpr>,
    pub value: Expr,
}

/// One entry of a `with` ambient list: `name[: Type]`.
#[derive(Debug, Clone)]
pub struct Ambient {
    pub name: String,
    pub ty: Option<TypeExpr>,
    pub span: Span,
}

/// A `type` definition.
#[derive(Debug, Clone)]
pub struct TypeDef {
    pub name: String,
    /// Lowercase type parameters.
    pub params: Vec<String>,
    pub body: TypeDefBody,
}

#[derive(Debug, Clone)]
pub enum TypeDefBody {
    /// One or more `|`-separated variants.
    Sum(Vec<Variant>),
    /// A type alias.
    Alias(TypeExpr),
}

/// A sum-type variant, optionally carrying a record payload.
#[derive(Debug, Clone)]
pub struct Variant {
    pub name: String,
    pub fields: Option<Vec<(String, TypeExpr)>>,
    pub span: Span,
}

/// An `import` statement: `import [js] name [{ * | a, b as c }]`.
#[derive(Debug, Clone)]
pub struct ImportStmt {
    pub js: bool,
    pub module: String,
    pub items: Option<ImportItems>,
}

#[derive(Debug, Clone)]
pub enum ImportItems {
    /// `{ * }`
    All,
    Named(Vec<ImportItem>),
}

#[derive(Debug, Clone)]
pub struct ImportItem {
    pub name: String,
    pub alias: Option<String>,
}
