// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Expression and pattern AST nodes.

use crate::{NodeId, Span};

/// An expression in the AST.
#[derive(Debug, Clone)]
pub struct Expr {
    pub id: NodeId,
    pub kind: ExprKind,
    pub span: Span,
}

/// The kind of expression.
#[derive(Debug, Clone)]
pub enum ExprKind {
    /// Integer literal
    Int(i64),
    /// Float literal
    Float(f64),
    /// String literal
    Str(String),
    /// Character literal
    Char(char),
    /// Boolean literal
    Bool(bool),
    /// Identifier (also covers bare constructor references like `None`)
    Ident(String),
    /// List literal ([1, 2, 3])
    List(Vec<Expr>),
    /// Record literal ({ x: 1, ...rest })
    Record {
        fields: Vec<FieldInit>,
        spread: Option<Box<Expr>>,
    },
    /// Function literal ((a, b) => a + b)
    Function {
        params: Vec<Pattern>,
        body: Box<Expr>,
    },
    /// Function call. Constructor literals `Name { … }` parse as a call
    /// whose single argument is the record.
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    /// Member access (a.b)
    Member {
        object: Box<Expr>,
        field: String,
    },
    /// Index access (xs[i])
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
    },
    /// Unary operation
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    /// Binary operation
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Pipeline (x |> f). `seq` and `hints` are recorded verbatim from
    /// the surface syntax and do not alter emission.
    Pipeline {
        left: Box<Expr>,
        right: Box<Expr>,
        seq: bool,
        hints: Vec<(String, Expr)>,
    },
    /// Error propagation (e?)
    Propagate(Box<Expr>),
    /// If expression (if c then a else b)
    If {
        cond: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },
    /// Match expression
    Match {
        subject: Box<Expr>,
        arms: Vec<MatchArm>,
    },
    /// Do block. `propagate` is true for the `do?` form.
    Do {
        propagate: bool,
        body: Vec<DoStmt>,
    },
    /// Provide expression (provide a = x, b = y in { body })
    Provide {
        provisions: Vec<(String, Expr)>,
        body: Box<Expr>,
    },
    /// Block ({ statements; trailing-expr })
    Block(Vec<crate::stmt::Stmt>),
    /// Placeholder `_` in argument position
    Placeholder,
    /// Spread (...expr) inside lists and records
    Spread(Box<Expr>),
}

/// A field initializer in a record literal.
#[derive(Debug, Clone)]
pub struct FieldInit {
    pub name: String,
    pub value: Expr,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    And,
    Or,
}

impl BinOp {
    /// The operator's surface spelling, also valid in the JavaScript target.
    pub fn symbol(&self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Gt => ">",
            BinOp::Le => "<=",
            BinOp::Ge => ">=",
            BinOp::And => "&&",
            BinOp::Or => "||",
        }
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Negation (-)
    Neg,
    /// Logical not (!)
    Not,
}

/// A match arm: `pattern [if guard] => body`.
#[derive(Debug, Clone)]
pub struct MatchArm {
    pub pattern: Pattern,
    pub guard: Option<Box<Expr>>,
    pub body: Box<Expr>,
}

/// A statement inside a do block.
#[derive(Debug, Clone)]
pub struct DoStmt {
    pub id: NodeId,
    pub kind: DoStmtKind,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum DoStmtKind {
    /// `let pattern = [do!] expr`
    Let {
        pattern: Pattern,
        /// True when the bound expression is prefixed with `do!`.
        effectful: bool,
        value: Expr,
    },
    /// `do! expr`
    Effect(Expr),
    /// A bare expression evaluated for its value or effect.
    Expr(Expr),
}

/// A pattern for matching and destructuring.
#[derive(Debug, Clone)]
pub struct Pattern {
    pub kind: PatternKind,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum PatternKind {
    /// Wildcard `_`
    Wildcard,
    /// Binding `name`
    Ident(String),
    /// Literal (int, float, string, char, bool)
    Literal(Box<Expr>),
    /// List pattern `[a, b, ...rest]`
    List {
        elements: Vec<Pattern>,
        /// `Some(None)` for an anonymous `...`, `Some(Some(name))` for
        /// `...name`, `None` when absent.
        rest: Option<Option<String>>,
    },
    /// Record pattern `{ x, y: pat }`. A `None` sub-pattern is the
    /// shorthand binding the field name itself.
    Record {
        fields: Vec<(String, Option<Pattern>)>,
        rest: bool,
    },
    /// Constructor pattern `Name`, `Name { fields }`, or `Name(pat)`.
    Constructor {
        name: String,
        record: Option<Vec<(String, Option<Pattern>)>>,
        inner: Option<Box<Pattern>>,
    },
    /// Standalone rest `...name`
    Rest(Option<String>),
}

impl Pattern {
    /// Names bound by this pattern, in source order.
    pub fn bound_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_bound_names(&mut names);
        names
    }

    fn collect_bound_names<'a>(&'a self, out: &mut Vec<&'a str>) {
        match &self.kind {
            PatternKind::Ident(name) => out.push(name),
            PatternKind::List { elements, rest } => {
                for p in elements {
                    p.collect_bound_names(out);
                }
                if let Some(Some(name)) = rest {
                    out.push(name);
                }
            }
            PatternKind::Record { fields, .. } => {
                for (name, sub) in fields {
                    match sub {
                        Some(p) => p.collect_bound_names(out),
                        None => out.push(name),
                    }
                }
            }
            PatternKind::Constructor { record, inner, .. } => {
                if let Some(fields) = record {
                    for (name, sub) in fields {
                        match sub {
                            Some(p) => p.collect_bound_names(out),
                            None => out.push(name),
                        }
                    }
                }
                if let Some(p) = inner {
                    p.collect_bound_names(out);
                }
            }
            PatternKind::Rest(Some(name)) => out.push(name),
            _ => {}
        }
    }
}
