// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The parser implementation using Pratt parsing for expressions.

use lambdawg_ast::expr::{
    BinOp, DoStmt, DoStmtKind, Expr, ExprKind, FieldInit, MatchArm, Pattern, PatternKind, UnaryOp,
};
use lambdawg_ast::stmt::{
    Ambient, ImportItem, ImportItems, ImportStmt, LetStmt, Module, Program, Stmt, StmtKind,
    TypeDef, TypeDefBody, Variant,
};
use lambdawg_ast::token::{Token, TokenKind};
use lambdawg_ast::ty::{TypeExpr, TypeExprKind};
use lambdawg_ast::{NodeId, Span};

/// Maximum number of errors to collect before stopping.
const MAX_ERRORS: usize = 20;

/// The parser for Lambdawg source code.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    /// Controls whether `{` and `Name {` can start an expression.
    /// False while parsing a match subject, whose trailing `{` opens the arms.
    allow_brace_expr: bool,
    /// Collected errors during parsing.
    errors: Vec<ParseError>,
    /// Counter for generating unique NodeIds.
    next_node_id: u32,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            allow_brace_expr: true,
            errors: Vec::new(),
            next_node_id: 0,
        }
    }

    fn next_id(&mut self) -> NodeId {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;
        id
    }

    /// Record error, return if parsing should continue.
    fn record_error(&mut self, error: ParseError) -> bool {
        self.errors.push(error);
        self.errors.len() < MAX_ERRORS
    }

    /// Skip to a closing brace or the start of a declaration after an error.
    fn synchronize(&mut self) {
        while !self.at_end() {
            if self.current_kind().starts_declaration() {
                return;
            }
            if self.check(&TokenKind::RBrace) {
                self.advance();
                return;
            }
            self.advance();
        }
    }

    // =========================================================================
    // Token Navigation
    // =========================================================================

    fn current(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or_else(|| self.tokens.last().unwrap())
    }

    fn current_kind(&self) -> &TokenKind {
        &self.current().kind
    }

    fn peek(&self, n: usize) -> &TokenKind {
        self.tokens.get(self.pos + n).map(|t| &t.kind).unwrap_or(&TokenKind::Eof)
    }

    fn at_end(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Eof)
    }

    fn advance(&mut self) -> &Token {
        if !self.at_end() {
            self.pos += 1;
        }
        self.tokens.get(self.pos - 1).unwrap()
    }

    fn prev_span(&self) -> Span {
        self.tokens[self.pos.saturating_sub(1)].span
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.current_kind()) == std::mem::discriminant(kind)
    }

    fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<&Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(ParseError::expected(
                kind.display_name(),
                self.current_kind(),
                self.current().span,
            ))
        }
    }

    /// Expect a closing delimiter; at end of input report the unclosed
    /// opener instead of a generic mismatch.
    fn expect_closing(&mut self, kind: &TokenKind, open_span: Span) -> Result<(), ParseError> {
        if self.match_token(kind) {
            return Ok(());
        }
        if self.at_end() {
            Err(ParseError::unclosed(kind, open_span))
        } else {
            Err(ParseError::expected(
                kind.display_name(),
                self.current_kind(),
                self.current().span,
            ))
        }
    }

    fn expect_ident(&mut self) -> Result<String, ParseError> {
        match self.current_kind().clone() {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(name)
            }
            _ => Err(ParseError::expected_name(self.current_kind(), self.current().span)),
        }
    }

    fn expect_type_ident(&mut self) -> Result<String, ParseError> {
        match self.current_kind().clone() {
            TokenKind::TypeIdent(name) => {
                self.advance();
                Ok(name)
            }
            _ => Err(ParseError::expected_type_name(self.current_kind(), self.current().span)),
        }
    }

    /// Import lists may name values or constructors.
    fn expect_any_ident(&mut self) -> Result<String, ParseError> {
        match self.current_kind().clone() {
            TokenKind::Ident(name) | TokenKind::TypeIdent(name) => {
                self.advance();
                Ok(name)
            }
            _ => Err(ParseError::expected_name(self.current_kind(), self.current().span)),
        }
    }

    fn expr(&mut self, kind: ExprKind, span: Span) -> Expr {
        Expr { id: self.next_id(), kind, span }
    }

    // =========================================================================
    // Top Level
    // =========================================================================

    pub fn parse(&mut self) -> ParseResult {
        let mut program = Program::default();

        while !self.at_end() {
            if self.errors.len() >= MAX_ERRORS {
                break;
            }
            if self.check(&TokenKind::Module) {
                match self.parse_module() {
                    Ok(module) => program.modules.push(module),
                    Err(e) => {
                        if !self.record_error(e) {
                            break;
                        }
                        self.synchronize();
                    }
                }
            } else {
                match self.parse_stmt() {
                    Ok(stmt) => program.statements.push(stmt),
                    Err(e) => {
                        if !self.record_error(e) {
                            break;
                        }
                        self.synchronize();
                    }
                }
            }
        }

        ParseResult {
            program,
            errors: std::mem::take(&mut self.errors),
        }
    }

    fn parse_module(&mut self) -> Result<Module, ParseError> {
        let start = self.current().span;
        self.expect(&TokenKind::Module)?;
        let name = self.expect_ident()?;
        let open = self.current().span;
        self.expect(&TokenKind::LBrace)?;

        let mut statements = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            if self.errors.len() >= MAX_ERRORS {
                break;
            }
            match self.parse_stmt() {
                Ok(stmt) => statements.push(stmt),
                Err(e) => {
                    if !self.record_error(e) {
                        break;
                    }
                    self.synchronize();
                }
            }
        }

        self.expect_closing(&TokenKind::RBrace, open)?;
        let span = start.merge(self.prev_span());
        Ok(Module { id: self.next_id(), name, statements, span })
    }

    fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        match self.current_kind() {
            TokenKind::Let | TokenKind::Private => self.parse_let(),
            TokenKind::Type => self.parse_typedef(),
            TokenKind::Import => self.parse_import(),
            _ => {
                let start = self.current().span;
                let expr = self.parse_expr()?;
                if self.check(&TokenKind::Eq) {
                    return Err(ParseError::invalid_assignment(self.current().span));
                }
                let span = start.merge(expr.span);
                Ok(Stmt { id: self.next_id(), kind: StmtKind::Expr(expr), span })
            }
        }
    }

    fn parse_let(&mut self) -> Result<Stmt, ParseError> {
        let start = self.current().span;
        let private = self.match_token(&TokenKind::Private);
        self.expect(&TokenKind::Let)?;
        let name = self.expect_ident()?;

        let mut ambients = Vec::new();
        if self.match_token(&TokenKind::With) {
            loop {
                let amb_start = self.current().span;
                let amb_name = self.expect_ident()?;
                let ty = if self.match_token(&TokenKind::Colon) {
                    Some(self.parse_type_expr()?)
                } else {
                    None
                };
                let span = amb_start.merge(self.prev_span());
                ambients.push(Ambient { name: amb_name, ty, span });
                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
            }
        }

        let ty = if self.match_token(&TokenKind::Colon) {
            Some(self.parse_type_expr()?)
        } else {
            None
        };

        self.expect(&TokenKind::Eq)?;
        let value = self.parse_expr()?;
        let span = start.merge(value.span);
        Ok(Stmt {
            id: self.next_id(),
            kind: StmtKind::Let(LetStmt { name, private, ambients, ty, value }),
            span,
        })
    }

    fn parse_typedef(&mut self) -> Result<Stmt, ParseError> {
        let start = self.current().span;
        self.expect(&TokenKind::Type)?;
        let name = self.expect_type_ident()?;

        let mut params = Vec::new();
        while let TokenKind::Ident(p) = self.current_kind() {
            params.push(p.clone());
            self.advance();
        }

        self.expect(&TokenKind::Eq)?;

        let is_sum = self.check(&TokenKind::Bar)
            || (matches!(self.current_kind(), TokenKind::TypeIdent(_))
                && matches!(self.peek(1), TokenKind::Bar | TokenKind::LBrace));

        let body = if is_sum {
            self.match_token(&TokenKind::Bar);
            let mut variants = Vec::new();
            loop {
                let v_start = self.current().span;
                let v_name = self.expect_type_ident()?;
                let fields = if self.check(&TokenKind::LBrace) {
                    Some(self.parse_record_type_fields()?)
                } else {
                    None
                };
                let span = v_start.merge(self.prev_span());
                variants.push(Variant { name: v_name, fields, span });
                if !self.match_token(&TokenKind::Bar) {
                    break;
                }
            }
            TypeDefBody::Sum(variants)
        } else {
            TypeDefBody::Alias(self.parse_type_expr()?)
        };

        let span = start.merge(self.prev_span());
        Ok(Stmt {
            id: self.next_id(),
            kind: StmtKind::TypeDef(TypeDef { name, params, body }),
            span,
        })
    }

    fn parse_import(&mut self) -> Result<Stmt, ParseError> {
        let start = self.current().span;
        self.expect(&TokenKind::Import)?;
        let js = self.match_token(&TokenKind::Js);
        let module = self.expect_ident()?;

        let items = if self.check(&TokenKind::LBrace) {
            let open = self.current().span;
            self.advance();
            if self.match_token(&TokenKind::Star) {
                self.expect_closing(&TokenKind::RBrace, open)?;
                Some(ImportItems::All)
            } else {
                let mut list = Vec::new();
                while !self.check(&TokenKind::RBrace) && !self.at_end() {
                    let name = self.expect_any_ident()?;
                    let alias = if self.match_token(&TokenKind::As) {
                        Some(self.expect_any_ident()?)
                    } else {
                        None
                    };
                    list.push(ImportItem { name, alias });
                    if !self.match_token(&TokenKind::Comma) {
                        break;
                    }
                }
                self.expect_closing(&TokenKind::RBrace, open)?;
                Some(ImportItems::Named(list))
            }
        } else {
            None
        };

        let span = start.merge(self.prev_span());
        Ok(Stmt {
            id: self.next_id(),
            kind: StmtKind::Import(ImportStmt { js, module, items }),
            span,
        })
    }

    // =========================================================================
    // Type Expressions
    // =========================================================================

    fn parse_type_expr(&mut self) -> Result<TypeExpr, ParseError> {
        let start = self.current().span;
        match self.current_kind().clone() {
            TokenKind::TypeIdent(name) => {
                self.advance();
                let mut args = Vec::new();
                while self.type_atom_starts() {
                    args.push(self.parse_type_atom()?);
                }
                let span = start.merge(self.prev_span());
                let kind = if args.is_empty() {
                    TypeExprKind::Named(name)
                } else {
                    TypeExprKind::Generic { name, args }
                };
                Ok(TypeExpr { kind, span })
            }
            TokenKind::Ident(name) => {
                self.advance();
                Ok(TypeExpr { kind: TypeExprKind::Named(name), span: start })
            }
            TokenKind::LBracket => {
                self.advance();
                let inner = self.parse_type_expr()?;
                self.expect_closing(&TokenKind::RBracket, start)?;
                let span = start.merge(self.prev_span());
                Ok(TypeExpr { kind: TypeExprKind::List(Box::new(inner)), span })
            }
            TokenKind::LBrace => {
                let fields = self.parse_record_type_fields()?;
                let span = start.merge(self.prev_span());
                Ok(TypeExpr { kind: TypeExprKind::Record(fields), span })
            }
            TokenKind::LParen => {
                self.advance();
                let mut params = Vec::new();
                if !self.check(&TokenKind::RParen) {
                    loop {
                        params.push(self.parse_type_expr()?);
                        if !self.match_token(&TokenKind::Comma) {
                            break;
                        }
                    }
                }
                self.expect_closing(&TokenKind::RParen, start)?;
                if self.match_token(&TokenKind::Arrow) {
                    let ret = self.parse_type_expr()?;
                    let span = start.merge(ret.span);
                    Ok(TypeExpr {
                        kind: TypeExprKind::Fn { params, ret: Box::new(ret) },
                        span,
                    })
                } else if params.len() == 1 {
                    Ok(params.into_iter().next().unwrap())
                } else {
                    Err(ParseError::expected_type(self.current_kind(), self.current().span))
                }
            }
            _ => Err(ParseError::expected_type(self.current_kind(), self.current().span)),
        }
    }

    fn type_atom_starts(&self) -> bool {
        matches!(
            self.current_kind(),
            TokenKind::TypeIdent(_)
                | TokenKind::Ident(_)
                | TokenKind::LBracket
                | TokenKind::LParen
                | TokenKind::LBrace
        )
    }

    /// A type application argument: a name or a bracketed form, without
    /// further juxtaposition.
    fn parse_type_atom(&mut self) -> Result<TypeExpr, ParseError> {
        let start = self.current().span;
        match self.current_kind().clone() {
            TokenKind::TypeIdent(name) | TokenKind::Ident(name) => {
                self.advance();
                Ok(TypeExpr { kind: TypeExprKind::Named(name), span: start })
            }
            _ => self.parse_type_expr(),
        }
    }

    fn parse_record_type_fields(&mut self) -> Result<Vec<(String, TypeExpr)>, ParseError> {
        let open = self.current().span;
        self.expect(&TokenKind::LBrace)?;
        let mut fields = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            let name = self.expect_ident()?;
            self.expect(&TokenKind::Colon)?;
            let ty = self.parse_type_expr()?;
            fields.push((name, ty));
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        self.expect_closing(&TokenKind::RBrace, open)?;
        Ok(fields)
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    pub fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_expr_bp(0)
    }

    /// Binding powers, lowest to highest:
    /// `||` < `&&` < equality < comparison < additive < multiplicative
    /// < unary < `|>` < postfix `?` < call/member/index.
    fn infix_bp(&self) -> Option<(u8, u8)> {
        match self.current_kind() {
            TokenKind::PipePipe => Some((1, 2)),
            TokenKind::AmpAmp => Some((3, 4)),
            TokenKind::EqEq | TokenKind::BangEq => Some((5, 6)),
            TokenKind::Lt | TokenKind::Gt | TokenKind::LtEq | TokenKind::GtEq => Some((7, 8)),
            TokenKind::Plus | TokenKind::Minus => Some((9, 10)),
            TokenKind::Star | TokenKind::Slash | TokenKind::Percent => Some((11, 12)),
            TokenKind::PipeGt => Some((15, 16)),
            _ => None,
        }
    }

    const PREFIX_BP: u8 = 13;

    fn postfix_bp(&self) -> Option<u8> {
        match self.current_kind() {
            TokenKind::Question => Some(17),
            TokenKind::LParen | TokenKind::Dot | TokenKind::LBracket => Some(19),
            _ => None,
        }
    }

    fn parse_expr_bp(&mut self, min_bp: u8) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_prefix()?;

        loop {
            if let Some(bp) = self.postfix_bp() {
                if bp < min_bp {
                    break;
                }
                lhs = self.parse_postfix(lhs)?;
                continue;
            }

            if let Some((l_bp, r_bp)) = self.infix_bp() {
                if l_bp < min_bp {
                    break;
                }

                if self.check(&TokenKind::PipeGt) {
                    self.advance();
                    let seq = self.match_token(&TokenKind::Seq);
                    let hints = if self.check(&TokenKind::At) {
                        self.parse_parallel_hints()?
                    } else {
                        Vec::new()
                    };
                    let right = self.parse_expr_bp(r_bp)?;
                    let span = lhs.span.merge(right.span);
                    lhs = self.expr(
                        ExprKind::Pipeline {
                            left: Box::new(lhs),
                            right: Box::new(right),
                            seq,
                            hints,
                        },
                        span,
                    );
                    continue;
                }

                let op = self.parse_binop()?;
                let rhs = self.parse_expr_bp(r_bp)?;
                let span = lhs.span.merge(rhs.span);
                lhs = self.expr(
                    ExprKind::Binary { op, left: Box::new(lhs), right: Box::new(rhs) },
                    span,
                );
                continue;
            }

            break;
        }

        Ok(lhs)
    }

    fn parse_binop(&mut self) -> Result<BinOp, ParseError> {
        let op = match self.current_kind() {
            TokenKind::Plus => BinOp::Add,
            TokenKind::Minus => BinOp::Sub,
            TokenKind::Star => BinOp::Mul,
            TokenKind::Slash => BinOp::Div,
            TokenKind::Percent => BinOp::Mod,
            TokenKind::EqEq => BinOp::Eq,
            TokenKind::BangEq => BinOp::Ne,
            TokenKind::Lt => BinOp::Lt,
            TokenKind::Gt => BinOp::Gt,
            TokenKind::LtEq => BinOp::Le,
            TokenKind::GtEq => BinOp::Ge,
            TokenKind::AmpAmp => BinOp::And,
            TokenKind::PipePipe => BinOp::Or,
            _ => {
                return Err(ParseError::expected(
                    "an operator like '+' or '-'",
                    self.current_kind(),
                    self.current().span,
                ))
            }
        };
        self.advance();
        Ok(op)
    }

    /// `@parallel(key: expr, …)` after `|>`.
    fn parse_parallel_hints(&mut self) -> Result<Vec<(String, Expr)>, ParseError> {
        self.expect(&TokenKind::At)?;
        let name = self.expect_ident()?;
        if name != "parallel" {
            return Err(ParseError::expected(
                "'parallel'",
                self.current_kind(),
                self.prev_span(),
            ));
        }
        let open = self.current().span;
        self.expect(&TokenKind::LParen)?;
        let mut hints = Vec::new();
        while !self.check(&TokenKind::RParen) && !self.at_end() {
            let key = self.expect_ident()?;
            self.expect(&TokenKind::Colon)?;
            let value = self.parse_expr()?;
            hints.push((key, value));
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        self.expect_closing(&TokenKind::RParen, open)?;
        Ok(hints)
    }

    fn parse_prefix(&mut self) -> Result<Expr, ParseError> {
        let start = self.current().span;

        match self.current_kind().clone() {
            TokenKind::Int(n) => {
                self.advance();
                Ok(self.expr(ExprKind::Int(n), start))
            }
            TokenKind::Float(n) => {
                self.advance();
                Ok(self.expr(ExprKind::Float(n), start))
            }
            TokenKind::Str(s) => {
                self.advance();
                Ok(self.expr(ExprKind::Str(s), start))
            }
            TokenKind::Char(c) => {
                self.advance();
                Ok(self.expr(ExprKind::Char(c), start))
            }
            TokenKind::Bool(b) => {
                self.advance();
                Ok(self.expr(ExprKind::Bool(b), start))
            }

            TokenKind::Ident(name) => {
                self.advance();
                Ok(self.expr(ExprKind::Ident(name), start))
            }

            TokenKind::TypeIdent(name) => {
                self.advance();
                if self.allow_brace_expr && self.check(&TokenKind::LBrace) {
                    // Constructor literal: `Name { … }` is a call whose
                    // single argument is the record.
                    let record = self.parse_record_literal()?;
                    let span = start.merge(record.span);
                    let callee = self.expr(ExprKind::Ident(name), start);
                    Ok(self.expr(
                        ExprKind::Call { callee: Box::new(callee), args: vec![record] },
                        span,
                    ))
                } else {
                    Ok(self.expr(ExprKind::Ident(name), start))
                }
            }

            TokenKind::Minus => {
                self.advance();
                let operand = self.parse_expr_bp(Self::PREFIX_BP)?;
                let span = start.merge(operand.span);
                Ok(self.expr(ExprKind::Unary { op: UnaryOp::Neg, operand: Box::new(operand) }, span))
            }
            TokenKind::Bang => {
                self.advance();
                let operand = self.parse_expr_bp(Self::PREFIX_BP)?;
                let span = start.merge(operand.span);
                Ok(self.expr(ExprKind::Unary { op: UnaryOp::Not, operand: Box::new(operand) }, span))
            }

            TokenKind::Underscore => {
                self.advance();
                Ok(self.expr(ExprKind::Placeholder, start))
            }

            TokenKind::Ellipsis => {
                self.advance();
                let operand = self.parse_expr_bp(Self::PREFIX_BP)?;
                let span = start.merge(operand.span);
                Ok(self.expr(ExprKind::Spread(Box::new(operand)), span))
            }

            TokenKind::LParen => self.parse_paren_or_function(),

            TokenKind::LBracket => self.parse_list_literal(),

            TokenKind::LBrace => {
                if !self.allow_brace_expr {
                    return Err(ParseError::expected_expression(
                        self.current_kind(),
                        self.current().span,
                    ));
                }
                if self.brace_starts_record() {
                    self.parse_record_literal()
                } else {
                    let open = self.current().span;
                    self.advance();
                    let mut statements = Vec::new();
                    while !self.check(&TokenKind::RBrace) && !self.at_end() {
                        statements.push(self.parse_stmt()?);
                    }
                    self.expect_closing(&TokenKind::RBrace, open)?;
                    let span = start.merge(self.prev_span());
                    Ok(self.expr(ExprKind::Block(statements), span))
                }
            }

            TokenKind::If => {
                self.advance();
                let cond = self.parse_expr()?;
                self.expect(&TokenKind::Then)?;
                let then_branch = self.parse_expr()?;
                self.expect(&TokenKind::Else)?;
                let else_branch = self.parse_expr()?;
                let span = start.merge(else_branch.span);
                Ok(self.expr(
                    ExprKind::If {
                        cond: Box::new(cond),
                        then_branch: Box::new(then_branch),
                        else_branch: Box::new(else_branch),
                    },
                    span,
                ))
            }

            TokenKind::Match => self.parse_match_expr(),

            TokenKind::Do => self.parse_do_block(),

            TokenKind::Provide => self.parse_provide_expr(),

            _ => Err(ParseError::expected_expression(
                self.current_kind(),
                self.current().span,
            )),
        }
    }

    fn parse_postfix(&mut self, lhs: Expr) -> Result<Expr, ParseError> {
        let start = lhs.span;

        match self.current_kind() {
            TokenKind::LParen => {
                let open = self.current().span;
                self.advance();
                let mut args = Vec::new();
                while !self.check(&TokenKind::RParen) && !self.at_end() {
                    args.push(self.parse_expr()?);
                    if !self.match_token(&TokenKind::Comma) {
                        break;
                    }
                }
                self.expect_closing(&TokenKind::RParen, open)?;
                let span = start.merge(self.prev_span());
                Ok(self.expr(ExprKind::Call { callee: Box::new(lhs), args }, span))
            }

            TokenKind::Dot => {
                self.advance();
                let field = self.expect_ident()?;
                let span = start.merge(self.prev_span());
                Ok(self.expr(ExprKind::Member { object: Box::new(lhs), field }, span))
            }

            TokenKind::LBracket => {
                let open = self.current().span;
                self.advance();
                let index = self.parse_expr()?;
                self.expect_closing(&TokenKind::RBracket, open)?;
                let span = start.merge(self.prev_span());
                Ok(self.expr(
                    ExprKind::Index { object: Box::new(lhs), index: Box::new(index) },
                    span,
                ))
            }

            TokenKind::Question => {
                self.advance();
                let span = start.merge(self.prev_span());
                Ok(self.expr(ExprKind::Propagate(Box::new(lhs)), span))
            }

            _ => unreachable!("parse_postfix called without a postfix token"),
        }
    }

    /// `{ … }` is a record when immediately empty, when the first token is
    /// `...`, or when the first two tokens are `ident :`.
    fn brace_starts_record(&self) -> bool {
        matches!(self.peek(1), TokenKind::RBrace | TokenKind::Ellipsis)
            || (matches!(self.peek(1), TokenKind::Ident(_))
                && matches!(self.peek(2), TokenKind::Colon))
    }

    fn parse_record_literal(&mut self) -> Result<Expr, ParseError> {
        let open = self.current().span;
        self.expect(&TokenKind::LBrace)?;

        let mut fields = Vec::new();
        let mut spread = None;

        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            if self.check(&TokenKind::Ellipsis) {
                let ell_span = self.current().span;
                self.advance();
                let value = self.parse_expr()?;
                if spread.is_some() {
                    return Err(ParseError::expected(
                        "a field name",
                        &TokenKind::Ellipsis,
                        ell_span,
                    ));
                }
                spread = Some(Box::new(value));
            } else {
                let name = self.expect_ident()?;
                let value = if self.match_token(&TokenKind::Colon) {
                    self.parse_expr()?
                } else {
                    let span = self.prev_span();
                    self.expr(ExprKind::Ident(name.clone()), span)
                };
                fields.push(FieldInit { name, value });
            }
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        self.expect_closing(&TokenKind::RBrace, open)?;
        let span = open.merge(self.prev_span());
        Ok(self.expr(ExprKind::Record { fields, spread }, span))
    }

    fn parse_list_literal(&mut self) -> Result<Expr, ParseError> {
        let open = self.current().span;
        self.expect(&TokenKind::LBracket)?;

        let mut elements = Vec::new();
        while !self.check(&TokenKind::RBracket) && !self.at_end() {
            elements.push(self.parse_expr()?);
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        self.expect_closing(&TokenKind::RBracket, open)?;
        let span = open.merge(self.prev_span());
        Ok(self.expr(ExprKind::List(elements), span))
    }

    /// `(` begins either a function literal or a parenthesized expression.
    /// Probe for a parameter list followed by `)` `=>`; on failure rewind
    /// and parse an expression. An expression followed by `=>` becomes a
    /// single-parameter function via the expression → pattern conversion.
    fn parse_paren_or_function(&mut self) -> Result<Expr, ParseError> {
        let start = self.current().span;
        self.advance(); // (

        if let Some(params) = self.try_parse_params() {
            let body = self.parse_expr()?;
            let span = start.merge(body.span);
            return Ok(self.expr(ExprKind::Function { params, body: Box::new(body) }, span));
        }

        if self.check(&TokenKind::RParen) {
            return Err(ParseError::expected_expression(
                self.current_kind(),
                self.current().span,
            ));
        }

        let inner = self.parse_expr()?;
        self.expect_closing(&TokenKind::RParen, start)?;

        if self.match_token(&TokenKind::FatArrow) {
            let pattern = self.expr_to_pattern(&inner)?;
            let body = self.parse_expr()?;
            let span = start.merge(body.span);
            return Ok(self.expr(
                ExprKind::Function { params: vec![pattern], body: Box::new(body) },
                span,
            ));
        }

        Ok(inner)
    }

    /// Attempt `pattern, … ) =>` from just after `(`. Returns None and
    /// restores the cursor if the tokens do not form a parameter list.
    fn try_parse_params(&mut self) -> Option<Vec<Pattern>> {
        let saved_pos = self.pos;
        let saved_ids = self.next_node_id;

        let mut params = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                match self.parse_pattern() {
                    Ok(p) => params.push(p),
                    Err(_) => {
                        self.pos = saved_pos;
                        self.next_node_id = saved_ids;
                        return None;
                    }
                }
                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
            }
        }

        if self.match_token(&TokenKind::RParen) && self.match_token(&TokenKind::FatArrow) {
            Some(params)
        } else {
            self.pos = saved_pos;
            self.next_node_id = saved_ids;
            None
        }
    }

    /// The structural map used when a parenthesized expression turns out
    /// to be a function parameter: identifier → binding, literal →
    /// literal pattern, placeholder → wildcard.
    fn expr_to_pattern(&mut self, expr: &Expr) -> Result<Pattern, ParseError> {
        let kind = match &expr.kind {
            ExprKind::Ident(name) => PatternKind::Ident(name.clone()),
            ExprKind::Placeholder => PatternKind::Wildcard,
            ExprKind::Int(_)
            | ExprKind::Float(_)
            | ExprKind::Str(_)
            | ExprKind::Char(_)
            | ExprKind::Bool(_) => PatternKind::Literal(Box::new(expr.clone())),
            _ => return Err(ParseError::invalid_pattern(expr.span)),
        };
        Ok(Pattern { kind, span: expr.span })
    }

    fn parse_match_expr(&mut self) -> Result<Expr, ParseError> {
        let start = self.current().span;
        self.expect(&TokenKind::Match)?;

        let old = self.allow_brace_expr;
        self.allow_brace_expr = false;
        let subject = self.parse_expr();
        self.allow_brace_expr = old;
        let subject = subject?;

        let open = self.current().span;
        self.expect(&TokenKind::LBrace)?;

        let mut arms = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            let pattern = self.parse_pattern()?;
            let guard = if self.match_token(&TokenKind::If) {
                Some(Box::new(self.parse_expr()?))
            } else {
                None
            };
            self.expect(&TokenKind::FatArrow)?;
            let body = self.parse_expr()?;
            arms.push(MatchArm { pattern, guard, body: Box::new(body) });
            self.match_token(&TokenKind::Comma);
        }

        self.expect_closing(&TokenKind::RBrace, open)?;
        let span = start.merge(self.prev_span());
        Ok(self.expr(ExprKind::Match { subject: Box::new(subject), arms }, span))
    }

    fn parse_do_block(&mut self) -> Result<Expr, ParseError> {
        let start = self.current().span;
        self.expect(&TokenKind::Do)?;
        let propagate = self.match_token(&TokenKind::Question);

        let open = self.current().span;
        self.expect(&TokenKind::LBrace)?;

        let mut body = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            body.push(self.parse_do_stmt()?);
        }

        self.expect_closing(&TokenKind::RBrace, open)?;
        let span = start.merge(self.prev_span());
        Ok(self.expr(ExprKind::Do { propagate, body }, span))
    }

    fn parse_do_stmt(&mut self) -> Result<DoStmt, ParseError> {
        let start = self.current().span;

        if self.check(&TokenKind::Let) {
            self.advance();
            let pattern = self.parse_pattern()?;
            self.expect(&TokenKind::Eq)?;
            let effectful = if self.check(&TokenKind::Do) && matches!(self.peek(1), TokenKind::Bang)
            {
                self.advance();
                self.advance();
                true
            } else {
                false
            };
            let value = self.parse_expr()?;
            let span = start.merge(value.span);
            return Ok(DoStmt {
                id: self.next_id(),
                kind: DoStmtKind::Let { pattern, effectful, value },
                span,
            });
        }

        // `do !` introduces an effect statement; `do {`/`do ?` is a nested
        // do expression handled by the expression grammar.
        if self.check(&TokenKind::Do) && matches!(self.peek(1), TokenKind::Bang) {
            self.advance();
            self.advance();
            let value = self.parse_expr()?;
            let span = start.merge(value.span);
            return Ok(DoStmt { id: self.next_id(), kind: DoStmtKind::Effect(value), span });
        }

        let value = self.parse_expr()?;
        let span = start.merge(value.span);
        Ok(DoStmt { id: self.next_id(), kind: DoStmtKind::Expr(value), span })
    }

    fn parse_provide_expr(&mut self) -> Result<Expr, ParseError> {
        let start = self.current().span;
        self.expect(&TokenKind::Provide)?;

        let mut provisions = Vec::new();
        loop {
            let name = self.expect_ident()?;
            self.expect(&TokenKind::Eq)?;
            let value = self.parse_expr()?;
            provisions.push((name, value));
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        self.expect(&TokenKind::In)?;
        let body = self.parse_expr()?;
        let span = start.merge(body.span);
        Ok(self.expr(ExprKind::Provide { provisions, body: Box::new(body) }, span))
    }

    // =========================================================================
    // Patterns
    // =========================================================================

    fn parse_pattern(&mut self) -> Result<Pattern, ParseError> {
        let start = self.current().span;

        match self.current_kind().clone() {
            TokenKind::Underscore => {
                self.advance();
                Ok(Pattern { kind: PatternKind::Wildcard, span: start })
            }

            TokenKind::Ident(name) => {
                self.advance();
                Ok(Pattern { kind: PatternKind::Ident(name), span: start })
            }

            TokenKind::TypeIdent(name) => {
                self.advance();
                if self.check(&TokenKind::LBrace) {
                    let (fields, _) = self.parse_record_pattern_fields()?;
                    let span = start.merge(self.prev_span());
                    Ok(Pattern {
                        kind: PatternKind::Constructor { name, record: Some(fields), inner: None },
                        span,
                    })
                } else if self.check(&TokenKind::LParen) {
                    let open = self.current().span;
                    self.advance();
                    let inner = self.parse_pattern()?;
                    self.expect_closing(&TokenKind::RParen, open)?;
                    let span = start.merge(self.prev_span());
                    Ok(Pattern {
                        kind: PatternKind::Constructor {
                            name,
                            record: None,
                            inner: Some(Box::new(inner)),
                        },
                        span,
                    })
                } else {
                    Ok(Pattern {
                        kind: PatternKind::Constructor { name, record: None, inner: None },
                        span: start,
                    })
                }
            }

            TokenKind::Int(_)
            | TokenKind::Float(_)
            | TokenKind::Str(_)
            | TokenKind::Char(_)
            | TokenKind::Bool(_) => {
                let literal = self.parse_prefix()?;
                let span = literal.span;
                Ok(Pattern { kind: PatternKind::Literal(Box::new(literal)), span })
            }

            TokenKind::LBracket => {
                let open = self.current().span;
                self.advance();
                let mut elements = Vec::new();
                let mut rest = None;
                while !self.check(&TokenKind::RBracket) && !self.at_end() {
                    if self.check(&TokenKind::Ellipsis) {
                        self.advance();
                        let name = match self.current_kind().clone() {
                            TokenKind::Ident(n) => {
                                self.advance();
                                Some(n)
                            }
                            _ => None,
                        };
                        rest = Some(name);
                        break; // rest must be last
                    }
                    elements.push(self.parse_pattern()?);
                    if !self.match_token(&TokenKind::Comma) {
                        break;
                    }
                }
                self.expect_closing(&TokenKind::RBracket, open)?;
                let span = start.merge(self.prev_span());
                Ok(Pattern { kind: PatternKind::List { elements, rest }, span })
            }

            TokenKind::LBrace => {
                let (fields, rest) = self.parse_record_pattern_fields()?;
                let span = start.merge(self.prev_span());
                Ok(Pattern { kind: PatternKind::Record { fields, rest }, span })
            }

            TokenKind::Ellipsis => {
                self.advance();
                let name = match self.current_kind().clone() {
                    TokenKind::Ident(n) => {
                        self.advance();
                        Some(n)
                    }
                    _ => None,
                };
                let span = start.merge(self.prev_span());
                Ok(Pattern { kind: PatternKind::Rest(name), span })
            }

            _ => Err(ParseError::invalid_pattern(self.current().span)),
        }
    }

    fn parse_record_pattern_fields(
        &mut self,
    ) -> Result<(Vec<(String, Option<Pattern>)>, bool), ParseError> {
        let open = self.current().span;
        self.expect(&TokenKind::LBrace)?;

        let mut fields = Vec::new();
        let mut rest = false;
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            if self.match_token(&TokenKind::Ellipsis) {
                rest = true;
                break; // rest must be last
            }
            let name = self.expect_ident()?;
            let sub = if self.match_token(&TokenKind::Colon) {
                Some(self.parse_pattern()?)
            } else {
                None
            };
            fields.push((name, sub));
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        self.expect_closing(&TokenKind::RBrace, open)?;
        Ok((fields, rest))
    }
}

/// Result of parsing: a program plus any errors found.
#[derive(Debug)]
pub struct ParseResult {
    pub program: Program,
    pub errors: Vec<ParseError>,
}

impl ParseResult {
    /// Returns true if parsing completed without errors.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// A parser error with stable code, location, and friendly message.
#[derive(Debug, Clone)]
pub struct ParseError {
    pub code: &'static str,
    pub span: Span,
    pub message: String,
    pub hint: Option<String>,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseError {}

impl ParseError {
    fn expected(expected: &str, found: &TokenKind, span: Span) -> Self {
        let message = format!("expected {}, found {}", expected, found.display_name());
        let hint = crate::hints::for_expected(expected, found).map(String::from);
        Self { code: "P001", span, message, hint }
    }

    fn expected_expression(found: &TokenKind, span: Span) -> Self {
        let message = format!("expected an expression, found {}", found.display_name());
        let hint = crate::hints::for_expected("expression", found).map(String::from);
        Self { code: "P002", span, message, hint }
    }

    fn expected_name(found: &TokenKind, span: Span) -> Self {
        let message = format!("expected a name, found {}", found.display_name());
        let hint = crate::hints::for_expected("a name", found).map(String::from);
        Self { code: "P003", span, message, hint }
    }

    fn expected_type_name(found: &TokenKind, span: Span) -> Self {
        let message = format!("expected a type name, found {}", found.display_name());
        let hint = crate::hints::for_expected("a type name", found).map(String::from);
        Self { code: "P003", span, message, hint }
    }

    fn expected_type(found: &TokenKind, span: Span) -> Self {
        let message = format!("expected a type, found {}", found.display_name());
        Self { code: "P004", span, message, hint: None }
    }

    fn unclosed(closing: &TokenKind, open_span: Span) -> Self {
        let (code, opener) = match closing {
            TokenKind::RParen => ("P005", "'('"),
            TokenKind::RBrace => ("P006", "'{'"),
            TokenKind::RBracket => ("P007", "'['"),
            _ => ("P001", "delimiter"),
        };
        Self {
            code,
            span: open_span,
            message: format!("unclosed {}", opener),
            hint: Some(format!("add a matching {}", closing.display_name())),
        }
    }

    fn invalid_pattern(span: Span) -> Self {
        Self {
            code: "P008",
            span,
            message: "invalid pattern".to_string(),
            hint: Some(
                "patterns are names, literals, '_', lists, records, or constructors".to_string(),
            ),
        }
    }

    fn invalid_assignment(span: Span) -> Self {
        Self {
            code: "P009",
            span,
            message: "invalid assignment target".to_string(),
            hint: Some("bindings are introduced with 'let name = value'".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_source(source: &str) -> ParseResult {
        let lex = lambdawg_lexer::Lexer::new(source).tokenize();
        assert!(lex.is_ok(), "lex errors: {:?}", lex.errors);
        Parser::new(lex.tokens).parse()
    }

    fn parse_ok(source: &str) -> Program {
        let result = parse_source(source);
        assert!(result.is_ok(), "parse errors: {:?}", result.errors);
        result.program
    }

    fn only_let_value(program: &Program) -> &Expr {
        match &program.statements[0].kind {
            StmtKind::Let(l) => &l.value,
            other => panic!("expected let, got {:?}", other),
        }
    }

    #[test]
    fn simple_let() {
        let program = parse_ok("let x = 42");
        assert_eq!(program.statements.len(), 1);
        match &program.statements[0].kind {
            StmtKind::Let(l) => {
                assert_eq!(l.name, "x");
                assert!(!l.private);
                assert!(matches!(l.value.kind, ExprKind::Int(42)));
            }
            other => panic!("expected let, got {:?}", other),
        }
    }

    #[test]
    fn private_let_with_annotation() {
        let program = parse_ok("private let count: Int = 0");
        match &program.statements[0].kind {
            StmtKind::Let(l) => {
                assert!(l.private);
                assert!(matches!(
                    l.ty.as_ref().unwrap().kind,
                    TypeExprKind::Named(ref n) if n == "Int"
                ));
            }
            other => panic!("expected let, got {:?}", other),
        }
    }

    #[test]
    fn let_with_ambients() {
        let program = parse_ok("let fetch with http: Http, cache = (url) => http.get(url)");
        match &program.statements[0].kind {
            StmtKind::Let(l) => {
                assert_eq!(l.ambients.len(), 2);
                assert_eq!(l.ambients[0].name, "http");
                assert!(l.ambients[0].ty.is_some());
                assert_eq!(l.ambients[1].name, "cache");
                assert!(l.ambients[1].ty.is_none());
            }
            other => panic!("expected let, got {:?}", other),
        }
    }

    #[test]
    fn function_literal() {
        let program = parse_ok("let add = (a, b) => a + b");
        match &only_let_value(&program).kind {
            ExprKind::Function { params, body } => {
                assert_eq!(params.len(), 2);
                assert!(matches!(body.kind, ExprKind::Binary { op: BinOp::Add, .. }));
            }
            other => panic!("expected function, got {:?}", other),
        }
    }

    #[test]
    fn empty_params_function() {
        let program = parse_ok("let f = () => 1");
        match &only_let_value(&program).kind {
            ExprKind::Function { params, .. } => assert!(params.is_empty()),
            other => panic!("expected function, got {:?}", other),
        }
    }

    #[test]
    fn parenthesized_expr_is_not_function() {
        let program = parse_ok("let x = (1 + 2) * 3");
        match &only_let_value(&program).kind {
            ExprKind::Binary { op: BinOp::Mul, left, .. } => {
                assert!(matches!(left.kind, ExprKind::Binary { op: BinOp::Add, .. }));
            }
            other => panic!("expected multiplication, got {:?}", other),
        }
    }

    #[test]
    fn precedence_mul_over_add() {
        let program = parse_ok("let x = 1 + 2 * 3");
        match &only_let_value(&program).kind {
            ExprKind::Binary { op: BinOp::Add, right, .. } => {
                assert!(matches!(right.kind, ExprKind::Binary { op: BinOp::Mul, .. }));
            }
            other => panic!("expected addition, got {:?}", other),
        }
    }

    #[test]
    fn comparison_chains_left() {
        let program = parse_ok("let x = a && b || c");
        assert!(matches!(
            only_let_value(&program).kind,
            ExprKind::Binary { op: BinOp::Or, .. }
        ));
    }

    #[test]
    fn pipeline_associates_left() {
        let program = parse_ok("let x = a |> f |> g");
        match &only_let_value(&program).kind {
            ExprKind::Pipeline { left, .. } => {
                assert!(matches!(left.kind, ExprKind::Pipeline { .. }));
            }
            other => panic!("expected pipeline, got {:?}", other),
        }
    }

    #[test]
    fn pipeline_binds_tighter_than_arithmetic() {
        // level 8 pipeline > level 5 additive: a + (b |> f)
        let program = parse_ok("let x = a + b |> f");
        match &only_let_value(&program).kind {
            ExprKind::Binary { op: BinOp::Add, right, .. } => {
                assert!(matches!(right.kind, ExprKind::Pipeline { .. }));
            }
            other => panic!("expected addition of pipeline, got {:?}", other),
        }
    }

    #[test]
    fn pipeline_seq_flag() {
        let program = parse_ok("let x = xs |> seq save");
        match &only_let_value(&program).kind {
            ExprKind::Pipeline { seq, .. } => assert!(*seq),
            other => panic!("expected pipeline, got {:?}", other),
        }
    }

    #[test]
    fn pipeline_parallel_hints() {
        let program = parse_ok("let x = xs |> @parallel(workers: 4) crunch");
        match &only_let_value(&program).kind {
            ExprKind::Pipeline { hints, .. } => {
                assert_eq!(hints.len(), 1);
                assert_eq!(hints[0].0, "workers");
            }
            other => panic!("expected pipeline, got {:?}", other),
        }
    }

    #[test]
    fn placeholder_in_call() {
        let program = parse_ok("let d = map((x) => x * 2, _)");
        match &only_let_value(&program).kind {
            ExprKind::Call { args, .. } => {
                assert!(matches!(args[1].kind, ExprKind::Placeholder));
            }
            other => panic!("expected call, got {:?}", other),
        }
    }

    #[test]
    fn record_vs_block() {
        let program = parse_ok("let r = { x: 1, y: 2 }");
        assert!(matches!(only_let_value(&program).kind, ExprKind::Record { .. }));

        let program = parse_ok("let b = { let t = 1 t + 1 }");
        assert!(matches!(only_let_value(&program).kind, ExprKind::Block(_)));

        let program = parse_ok("let e = {}");
        assert!(matches!(only_let_value(&program).kind, ExprKind::Record { .. }));
    }

    #[test]
    fn record_with_spread() {
        let program = parse_ok("let r = { ...base, x: 1 }");
        match &only_let_value(&program).kind {
            ExprKind::Record { fields, spread } => {
                assert!(spread.is_some());
                assert_eq!(fields.len(), 1);
            }
            other => panic!("expected record, got {:?}", other),
        }
    }

    #[test]
    fn constructor_literal_is_call() {
        let program = parse_ok("let c = Circle { radius: 2.0 }");
        match &only_let_value(&program).kind {
            ExprKind::Call { callee, args } => {
                assert!(matches!(callee.kind, ExprKind::Ident(ref n) if n == "Circle"));
                assert!(matches!(args[0].kind, ExprKind::Record { .. }));
            }
            other => panic!("expected constructor call, got {:?}", other),
        }
    }

    #[test]
    fn if_then_else() {
        let program = parse_ok("let x = if true then 1 else 2");
        assert!(matches!(only_let_value(&program).kind, ExprKind::If { .. }));
    }

    #[test]
    fn match_with_guard_and_wildcard() {
        let program = parse_ok(r#"let f = (n) => match n { 0 => "zero" k if k < 0 => "neg" _ => "other" }"#);
        match &only_let_value(&program).kind {
            ExprKind::Function { body, .. } => match &body.kind {
                ExprKind::Match { arms, .. } => {
                    assert_eq!(arms.len(), 3);
                    assert!(arms[1].guard.is_some());
                    assert!(matches!(arms[2].pattern.kind, PatternKind::Wildcard));
                }
                other => panic!("expected match, got {:?}", other),
            },
            other => panic!("expected function, got {:?}", other),
        }
    }

    #[test]
    fn match_on_constructor_subject() {
        // The `{` after the subject opens the arms, not a constructor literal.
        let program = parse_ok("let f = (r) => match r { Ok(v) => v Error(e) => e }");
        match &only_let_value(&program).kind {
            ExprKind::Function { body, .. } => match &body.kind {
                ExprKind::Match { arms, .. } => {
                    assert!(matches!(
                        arms[0].pattern.kind,
                        PatternKind::Constructor { ref name, ref inner, .. }
                            if name == "Ok" && inner.is_some()
                    ));
                }
                other => panic!("expected match, got {:?}", other),
            },
            other => panic!("expected function, got {:?}", other),
        }
    }

    #[test]
    fn list_pattern_with_rest() {
        let program = parse_ok("let f = (xs) => match xs { [first, ...rest] => first _ => 0 }");
        match &only_let_value(&program).kind {
            ExprKind::Function { body, .. } => match &body.kind {
                ExprKind::Match { arms, .. } => match &arms[0].pattern.kind {
                    PatternKind::List { elements, rest } => {
                        assert_eq!(elements.len(), 1);
                        assert_eq!(rest.as_ref().unwrap().as_deref(), Some("rest"));
                    }
                    other => panic!("expected list pattern, got {:?}", other),
                },
                other => panic!("expected match, got {:?}", other),
            },
            other => panic!("expected function, got {:?}", other),
        }
    }

    #[test]
    fn do_block_statements() {
        let program = parse_ok(
            "let main = do { let user = do! fetchUser() do! log(user) user }",
        );
        match &only_let_value(&program).kind {
            ExprKind::Do { propagate, body } => {
                assert!(!propagate);
                assert_eq!(body.len(), 3);
                assert!(matches!(
                    body[0].kind,
                    DoStmtKind::Let { effectful: true, .. }
                ));
                assert!(matches!(body[1].kind, DoStmtKind::Effect(_)));
                assert!(matches!(body[2].kind, DoStmtKind::Expr(_)));
            }
            other => panic!("expected do block, got {:?}", other),
        }
    }

    #[test]
    fn do_propagating_variant() {
        let program = parse_ok("let main = do? { do! step() }");
        match &only_let_value(&program).kind {
            ExprKind::Do { propagate, .. } => assert!(*propagate),
            other => panic!("expected do block, got {:?}", other),
        }
    }

    #[test]
    fn provide_expression() {
        let program = parse_ok("let x = provide log = consoleLog, db = testDb in { run() }");
        match &only_let_value(&program).kind {
            ExprKind::Provide { provisions, body } => {
                assert_eq!(provisions.len(), 2);
                assert!(matches!(body.kind, ExprKind::Block(_)));
            }
            other => panic!("expected provide, got {:?}", other),
        }
    }

    #[test]
    fn propagate_postfix() {
        let program = parse_ok("let v = readFile(path)?");
        assert!(matches!(only_let_value(&program).kind, ExprKind::Propagate(_)));
    }

    #[test]
    fn member_and_index_chain() {
        let program = parse_ok("let v = user.names[0]");
        match &only_let_value(&program).kind {
            ExprKind::Index { object, .. } => {
                assert!(matches!(object.kind, ExprKind::Member { .. }));
            }
            other => panic!("expected index, got {:?}", other),
        }
    }

    #[test]
    fn module_declaration() {
        let program = parse_ok("module math { let add = (a, b) => a + b let mul = (a, b) => a * b }");
        assert_eq!(program.modules.len(), 1);
        assert_eq!(program.modules[0].name, "math");
        assert_eq!(program.modules[0].statements.len(), 2);
    }

    #[test]
    fn sum_type_definition() {
        let program = parse_ok("type Shape = Circle { radius: Float } | Square { side: Float }");
        match &program.statements[0].kind {
            StmtKind::TypeDef(td) => {
                assert_eq!(td.name, "Shape");
                match &td.body {
                    TypeDefBody::Sum(variants) => {
                        assert_eq!(variants.len(), 2);
                        assert!(variants[0].fields.is_some());
                    }
                    other => panic!("expected sum, got {:?}", other),
                }
            }
            other => panic!("expected typedef, got {:?}", other),
        }
    }

    #[test]
    fn sum_type_with_leading_bar_and_params() {
        let program = parse_ok("type Opt a = | Present { value: a } | Absent");
        match &program.statements[0].kind {
            StmtKind::TypeDef(td) => {
                assert_eq!(td.params, vec!["a".to_string()]);
                assert!(matches!(&td.body, TypeDefBody::Sum(v) if v.len() == 2));
            }
            other => panic!("expected typedef, got {:?}", other),
        }
    }

    #[test]
    fn type_alias() {
        let program = parse_ok("type Ids = [Int]");
        match &program.statements[0].kind {
            StmtKind::TypeDef(td) => {
                assert!(matches!(
                    &td.body,
                    TypeDefBody::Alias(t) if matches!(t.kind, TypeExprKind::List(_))
                ));
            }
            other => panic!("expected typedef, got {:?}", other),
        }
    }

    #[test]
    fn imports() {
        let program = parse_ok("import js fs { readFile as read, writeFile }\nimport math { * }");
        match &program.statements[0].kind {
            StmtKind::Import(im) => {
                assert!(im.js);
                assert_eq!(im.module, "fs");
                match im.items.as_ref().unwrap() {
                    ImportItems::Named(items) => {
                        assert_eq!(items[0].alias.as_deref(), Some("read"));
                        assert!(items[1].alias.is_none());
                    }
                    other => panic!("expected named imports, got {:?}", other),
                }
            }
            other => panic!("expected import, got {:?}", other),
        }
        match &program.statements[1].kind {
            StmtKind::Import(im) => {
                assert!(!im.js);
                assert!(matches!(im.items, Some(ImportItems::All)));
            }
            other => panic!("expected import, got {:?}", other),
        }
    }

    #[test]
    fn function_type_annotation() {
        let program = parse_ok("let apply: ((Int) -> Int, Int) -> Int = (f, x) => f(x)");
        match &program.statements[0].kind {
            StmtKind::Let(l) => {
                assert!(matches!(
                    l.ty.as_ref().unwrap().kind,
                    TypeExprKind::Fn { ref params, .. } if params.len() == 2
                ));
            }
            other => panic!("expected let, got {:?}", other),
        }
    }

    #[test]
    fn generic_type_annotation() {
        let program = parse_ok("let first: (List a) -> Option a = (xs) => head(xs)");
        match &program.statements[0].kind {
            StmtKind::Let(l) => match &l.ty.as_ref().unwrap().kind {
                TypeExprKind::Fn { params, ret } => {
                    assert!(matches!(params[0].kind, TypeExprKind::Generic { .. }));
                    assert!(matches!(ret.kind, TypeExprKind::Generic { .. }));
                }
                other => panic!("expected function type, got {:?}", other),
            },
            other => panic!("expected let, got {:?}", other),
        }
    }

    #[test]
    fn unexpected_token_recovers() {
        let result = parse_source("let = 1 let y = 2");
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].code, "P003");
        // Recovery resumes at the next declaration.
        assert_eq!(result.program.statements.len(), 1);
        match &result.program.statements[0].kind {
            StmtKind::Let(l) => assert_eq!(l.name, "y"),
            other => panic!("expected recovered let, got {:?}", other),
        }
    }

    #[test]
    fn missing_expression_diagnostic() {
        let result = parse_source("let x = ");
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].code, "P002");
    }

    #[test]
    fn unclosed_paren_diagnostic() {
        let result = parse_source("let x = f(1, 2");
        assert!(result.errors.iter().any(|e| e.code == "P005"));
    }

    #[test]
    fn unclosed_bracket_diagnostic() {
        let result = parse_source("let x = [1, 2");
        assert!(result.errors.iter().any(|e| e.code == "P007"));
    }

    #[test]
    fn assignment_is_rejected() {
        let result = parse_source("x = 1");
        assert!(result.errors.iter().any(|e| e.code == "P009"));
    }

    #[test]
    fn error_spans_point_at_offender() {
        let result = parse_source("let x = then");
        assert_eq!(result.errors[0].code, "P002");
        assert_eq!(result.errors[0].span.start.offset, 8);
    }

    #[test]
    fn statements_preserve_source_order() {
        let program = parse_ok("let a = 1 let b = 2 let c = 3");
        let names: Vec<_> = program
            .statements
            .iter()
            .map(|s| match &s.kind {
                StmtKind::Let(l) => l.name.clone(),
                other => panic!("unexpected {:?}", other),
            })
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }
}
