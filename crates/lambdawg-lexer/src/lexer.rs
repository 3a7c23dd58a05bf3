// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The lexer implementation using logos.

use logos::Logos;
use lambdawg_ast::token::{Token, TokenKind};
use lambdawg_ast::{LineMap, Span};

/// Raw token type for logos - we decode values in a second pass.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"--[^\n]*")]
enum RawToken {
    // === Keywords ===
    #[token("let")]
    Let,
    #[token("type")]
    Type,
    #[token("module")]
    Module,
    #[token("import")]
    Import,
    #[token("private")]
    Private,
    #[token("if")]
    If,
    #[token("then")]
    Then,
    #[token("else")]
    Else,
    #[token("match")]
    Match,
    #[token("with")]
    With,
    #[token("do")]
    Do,
    #[token("in")]
    In,
    #[token("provide")]
    Provide,
    #[token("providing")]
    Providing,
    #[token("seq")]
    Seq,
    #[token("js")]
    Js,
    #[token("as")]
    As,
    #[token("true")]
    True,
    #[token("false")]
    False,

    // === Operators (longest match wins) ===
    #[token("==")]
    EqEq,
    #[token("!=")]
    BangEq,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,
    #[token("|>")]
    PipeGt,
    #[token("->")]
    Arrow,
    #[token("=>")]
    FatArrow,
    #[token("...")]
    Ellipsis,

    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("=")]
    Eq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("!")]
    Bang,
    #[token("?")]
    Question,
    #[token(":")]
    Colon,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("@")]
    At,
    #[token("|")]
    Bar,

    // === Delimiters ===
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,

    // Block comments nest; the payload records whether `-}` closed them.
    #[token("{-", lex_block_comment)]
    BlockComment(bool),

    // === Literals ===
    // Radix integers deliberately over-match so bad digits become a
    // diagnostic instead of splitting into two tokens.
    #[regex(r"0[xX][0-9a-zA-Z_]*")]
    HexInt,
    #[regex(r"0[bB][0-9a-zA-Z_]*")]
    BinInt,
    #[regex(r"0[oO][0-9a-zA-Z_]*")]
    OctInt,

    // Float literals (must come before decimal int to match properly)
    #[regex(r"[0-9][0-9_]*\.[0-9][0-9_]*([eE][+-]?[0-9][0-9_]*)?")]
    Float,

    #[regex(r"[0-9][0-9_]*")]
    DecInt,

    // Character literal: exactly one (possibly escaped) code point
    #[regex(r"'([^'\\]|\\.)'")]
    Char,

    // Strings may span newlines; the payload records termination.
    #[token("\"", lex_string)]
    Str(bool),

    // === Identifier (must come after keywords) ===
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,
}

/// Consume a string body after the opening quote. Returns whether the
/// closing quote was found before end of input.
fn lex_string(lexer: &mut logos::Lexer<RawToken>) -> bool {
    let bytes = lexer.remainder().as_bytes();
    let mut pos = 0;

    while pos < bytes.len() {
        match bytes[pos] {
            b'\\' if pos + 1 < bytes.len() => pos += 2,
            b'"' => {
                lexer.bump(pos + 1);
                return true;
            }
            _ => pos += 1,
        }
    }

    lexer.bump(pos);
    false
}

/// Consume a block comment, handling nesting. Returns whether the depth
/// returned to zero before end of input.
fn lex_block_comment(lexer: &mut logos::Lexer<RawToken>) -> bool {
    let mut depth = 1;
    let remainder = lexer.remainder();
    let mut chars = remainder.chars().peekable();
    let mut consumed = 0;

    while depth > 0 {
        match chars.next() {
            Some('{') if chars.peek() == Some(&'-') => {
                chars.next();
                consumed += 2;
                depth += 1;
            }
            Some('-') if chars.peek() == Some(&'}') => {
                chars.next();
                consumed += 2;
                depth -= 1;
            }
            Some(c) => {
                consumed += c.len_utf8();
            }
            None => break,
        }
    }

    lexer.bump(consumed);
    depth == 0
}

/// Maximum number of errors to collect before stopping.
const MAX_ERRORS: usize = 20;

/// The lexer for Lambdawg source code.
pub struct Lexer<'a> {
    source: &'a str,
    line_map: LineMap,
    errors: Vec<LexError>,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source code.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            line_map: LineMap::new(source),
            errors: Vec::new(),
        }
    }

    /// Tokenize the entire source, collecting multiple errors.
    pub fn tokenize(&mut self) -> LexResult {
        let mut tokens = Vec::new();
        let mut logos_lexer = RawToken::lexer(self.source);

        while let Some(result) = logos_lexer.next() {
            if self.errors.len() >= MAX_ERRORS {
                break;
            }

            let range = logos_lexer.span();
            let slice = logos_lexer.slice();
            let span = self.line_map.span_at(range.start, range.end);

            let kind = match result {
                Ok(raw) => match self.convert_token(raw, slice, span) {
                    Some(kind) => kind,
                    None => continue,
                },
                Err(()) => {
                    let ch = self.source[range.start..].chars().next().unwrap_or('?');
                    self.errors.push(LexError::unexpected_char(ch, span));
                    continue;
                }
            };

            tokens.push(Token {
                kind,
                text: slice.to_string(),
                span,
            });
        }

        let eof = self.line_map.span_at(self.source.len(), self.source.len());
        tokens.push(Token {
            kind: TokenKind::Eof,
            text: String::new(),
            span: eof,
        });

        LexResult {
            tokens,
            errors: std::mem::take(&mut self.errors),
        }
    }

    /// Convert a raw logos token to a TokenKind, decoding literal values.
    /// Returns None for tokens that should not reach the parser (comments,
    /// unrecoverable literals); diagnostics are pushed as a side effect.
    fn convert_token(&mut self, raw: RawToken, slice: &str, span: Span) -> Option<TokenKind> {
        Some(match raw {
            RawToken::Let => TokenKind::Let,
            RawToken::Type => TokenKind::Type,
            RawToken::Module => TokenKind::Module,
            RawToken::Import => TokenKind::Import,
            RawToken::Private => TokenKind::Private,
            RawToken::If => TokenKind::If,
            RawToken::Then => TokenKind::Then,
            RawToken::Else => TokenKind::Else,
            RawToken::Match => TokenKind::Match,
            RawToken::With => TokenKind::With,
            RawToken::Do => TokenKind::Do,
            RawToken::In => TokenKind::In,
            RawToken::Provide => TokenKind::Provide,
            RawToken::Providing => TokenKind::Providing,
            RawToken::Seq => TokenKind::Seq,
            RawToken::Js => TokenKind::Js,
            RawToken::As => TokenKind::As,
            RawToken::True => TokenKind::Bool(true),
            RawToken::False => TokenKind::Bool(false),

            RawToken::EqEq => TokenKind::EqEq,
            RawToken::BangEq => TokenKind::BangEq,
            RawToken::LtEq => TokenKind::LtEq,
            RawToken::GtEq => TokenKind::GtEq,
            RawToken::AmpAmp => TokenKind::AmpAmp,
            RawToken::PipePipe => TokenKind::PipePipe,
            RawToken::PipeGt => TokenKind::PipeGt,
            RawToken::Arrow => TokenKind::Arrow,
            RawToken::FatArrow => TokenKind::FatArrow,
            RawToken::Ellipsis => TokenKind::Ellipsis,

            RawToken::Plus => TokenKind::Plus,
            RawToken::Minus => TokenKind::Minus,
            RawToken::Star => TokenKind::Star,
            RawToken::Slash => TokenKind::Slash,
            RawToken::Percent => TokenKind::Percent,
            RawToken::Eq => TokenKind::Eq,
            RawToken::Lt => TokenKind::Lt,
            RawToken::Gt => TokenKind::Gt,
            RawToken::Bang => TokenKind::Bang,
            RawToken::Question => TokenKind::Question,
            RawToken::Colon => TokenKind::Colon,
            RawToken::Comma => TokenKind::Comma,
            RawToken::Dot => TokenKind::Dot,
            RawToken::At => TokenKind::At,
            RawToken::Bar => TokenKind::Bar,

            RawToken::LParen => TokenKind::LParen,
            RawToken::RParen => TokenKind::RParen,
            RawToken::LBrace => TokenKind::LBrace,
            RawToken::RBrace => TokenKind::RBrace,
            RawToken::LBracket => TokenKind::LBracket,
            RawToken::RBracket => TokenKind::RBracket,

            RawToken::BlockComment(terminated) => {
                if !terminated {
                    self.errors.push(LexError::unterminated_comment(span));
                }
                return None;
            }

            RawToken::DecInt => {
                let cleaned: String = slice.chars().filter(|c| *c != '_').collect();
                match cleaned.parse::<i64>() {
                    Ok(value) => TokenKind::Int(value),
                    Err(_) => {
                        self.errors.push(LexError::invalid_number(span));
                        return None;
                    }
                }
            }
            RawToken::HexInt => self.decode_radix(slice, 16, span)?,
            RawToken::BinInt => self.decode_radix(slice, 2, span)?,
            RawToken::OctInt => self.decode_radix(slice, 8, span)?,
            RawToken::Float => {
                let cleaned: String = slice.chars().filter(|c| *c != '_').collect();
                match cleaned.parse::<f64>() {
                    Ok(value) => TokenKind::Float(value),
                    Err(_) => {
                        self.errors.push(LexError::invalid_number(span));
                        return None;
                    }
                }
            }

            RawToken::Char => {
                let inner = &slice[1..slice.len() - 1];
                TokenKind::Char(self.decode_char(inner, span))
            }

            RawToken::Str(terminated) => {
                if !terminated {
                    self.errors.push(LexError::unterminated_string(span));
                }
                let inner_end = if terminated { slice.len() - 1 } else { slice.len() };
                let inner = &slice[1..inner_end];
                TokenKind::Str(self.decode_string(inner, span))
            }

            RawToken::Ident => match slice {
                "_" => TokenKind::Underscore,
                _ if slice.starts_with(|c: char| c.is_ascii_uppercase()) => {
                    TokenKind::TypeIdent(slice.to_string())
                }
                _ => TokenKind::Ident(slice.to_string()),
            },
        })
    }

    fn decode_radix(&mut self, slice: &str, radix: u32, span: Span) -> Option<TokenKind> {
        let cleaned: String = slice[2..].chars().filter(|c| *c != '_').collect();
        match i64::from_str_radix(&cleaned, radix) {
            Ok(value) => Some(TokenKind::Int(value)),
            Err(_) => {
                self.errors.push(LexError::invalid_number(span));
                None
            }
        }
    }

    /// Decode a string body, processing escapes. An unknown escape emits a
    /// diagnostic and keeps the escaped character literally so lexing
    /// continues with a usable token.
    fn decode_string(&mut self, inner: &str, span: Span) -> String {
        let mut result = String::with_capacity(inner.len());
        let mut chars = inner.chars();

        while let Some(c) = chars.next() {
            if c != '\\' {
                result.push(c);
                continue;
            }
            match chars.next() {
                Some('n') => result.push('\n'),
                Some('t') => result.push('\t'),
                Some('r') => result.push('\r'),
                Some('\\') => result.push('\\'),
                Some('"') => result.push('"'),
                Some('\'') => result.push('\''),
                Some('0') => result.push('\0'),
                Some(other) => {
                    self.errors.push(LexError::invalid_escape(other, span));
                    result.push(other);
                }
                None => {
                    self.errors.push(LexError::invalid_escape('\\', span));
                }
            }
        }

        result
    }

    fn decode_char(&mut self, inner: &str, span: Span) -> char {
        let mut chars = inner.chars();
        match chars.next() {
            Some('\\') => match chars.next() {
                Some('n') => '\n',
                Some('t') => '\t',
                Some('r') => '\r',
                Some('\\') => '\\',
                Some('"') => '"',
                Some('\'') => '\'',
                Some('0') => '\0',
                Some(other) => {
                    self.errors.push(LexError::invalid_escape(other, span));
                    other
                }
                None => {
                    self.errors.push(LexError::invalid_escape('\\', span));
                    '\\'
                }
            },
            Some(c) => c,
            None => '\0',
        }
    }
}

/// Result of lexing: tokens plus any errors found.
#[derive(Debug)]
pub struct LexResult {
    pub tokens: Vec<Token>,
    pub errors: Vec<LexError>,
}

impl LexResult {
    /// Returns true if lexing completed without errors.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// A lexer error with stable code, location, and friendly message.
#[derive(Debug, Clone)]
pub struct LexError {
    pub code: &'static str,
    pub span: Span,
    pub message: String,
    pub hint: Option<String>,
}

impl std::fmt::Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for LexError {}

impl LexError {
    fn unexpected_char(ch: char, span: Span) -> Self {
        Self {
            code: "L001",
            span,
            message: format!("unexpected character '{}'", ch),
            hint: Some("remove this character or check for typos".to_string()),
        }
    }

    fn unterminated_string(span: Span) -> Self {
        Self {
            code: "L002",
            span,
            message: "unterminated string literal".to_string(),
            hint: Some("add a closing '\"'".to_string()),
        }
    }

    fn unterminated_comment(span: Span) -> Self {
        Self {
            code: "L003",
            span,
            message: "unterminated block comment".to_string(),
            hint: Some("close the comment with '-}'".to_string()),
        }
    }

    fn invalid_number(span: Span) -> Self {
        Self {
            code: "L004",
            span,
            message: "invalid number literal".to_string(),
            hint: Some("check the digits and radix prefix (0x, 0b, 0o)".to_string()),
        }
    }

    fn invalid_escape(ch: char, span: Span) -> Self {
        Self {
            code: "L005",
            span,
            message: format!("invalid escape sequence '\\{}'", ch),
            hint: Some("valid escapes: \\n \\t \\r \\\\ \\\" \\' \\0".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let result = Lexer::new(source).tokenize();
        assert!(result.is_ok(), "unexpected lex errors: {:?}", result.errors);
        result.tokens.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn keywords_and_idents() {
        let toks = kinds("let add = foo");
        assert_eq!(
            toks,
            vec![
                TokenKind::Let,
                TokenKind::Ident("add".into()),
                TokenKind::Eq,
                TokenKind::Ident("foo".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn type_idents_by_leading_case() {
        let toks = kinds("Result result _priv");
        assert_eq!(
            toks,
            vec![
                TokenKind::TypeIdent("Result".into()),
                TokenKind::Ident("result".into()),
                TokenKind::Ident("_priv".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn bare_underscore_is_placeholder() {
        let toks = kinds("f(_, x)");
        assert!(toks.contains(&TokenKind::Underscore));
    }

    #[test]
    fn radix_literals_decode() {
        assert_eq!(kinds("0xFF")[0], TokenKind::Int(255));
        assert_eq!(kinds("0b1010")[0], TokenKind::Int(10));
        assert_eq!(kinds("0o755")[0], TokenKind::Int(493));
    }

    #[test]
    fn underscores_in_numbers() {
        assert_eq!(kinds("1_000_000")[0], TokenKind::Int(1_000_000));
        assert_eq!(kinds("1_0.5_0")[0], TokenKind::Float(10.50));
    }

    #[test]
    fn float_with_exponent() {
        assert_eq!(kinds("2.5e3")[0], TokenKind::Float(2500.0));
        assert_eq!(kinds("1.0e-2")[0], TokenKind::Float(0.01));
    }

    #[test]
    fn invalid_radix_digits() {
        let result = Lexer::new("0xZZ").tokenize();
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].code, "L004");
    }

    #[test]
    fn string_escapes() {
        assert_eq!(
            kinds(r#""a\nb\t\"c\"""#)[0],
            TokenKind::Str("a\nb\t\"c\"".into())
        );
    }

    #[test]
    fn invalid_escape_keeps_lexing() {
        let result = Lexer::new(r#""a\qb" 42"#).tokenize();
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].code, "L005");
        // Token is still produced, with the bad escape kept literally.
        assert_eq!(result.tokens[0].kind, TokenKind::Str("aqb".into()));
        assert_eq!(result.tokens[1].kind, TokenKind::Int(42));
    }

    #[test]
    fn unterminated_string() {
        let result = Lexer::new("\"oops").tokenize();
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].code, "L002");
        assert_eq!(result.tokens[0].kind, TokenKind::Str("oops".into()));
    }

    #[test]
    fn char_literals() {
        assert_eq!(kinds("'a'")[0], TokenKind::Char('a'));
        assert_eq!(kinds(r"'\n'")[0], TokenKind::Char('\n'));
    }

    #[test]
    fn line_comments_are_skipped() {
        let toks = kinds("1 -- the rest is gone\n2");
        assert_eq!(toks, vec![TokenKind::Int(1), TokenKind::Int(2), TokenKind::Eof]);
    }

    #[test]
    fn block_comments_nest() {
        let toks = kinds("1 {- outer {- inner -} still out -} 2");
        assert_eq!(toks, vec![TokenKind::Int(1), TokenKind::Int(2), TokenKind::Eof]);
    }

    #[test]
    fn unterminated_block_comment() {
        let result = Lexer::new("1 {- {- -} never closed").tokenize();
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].code, "L003");
        assert_eq!(result.tokens[0].kind, TokenKind::Int(1));
    }

    #[test]
    fn maximal_munch_operators() {
        let toks = kinds("|| |> | ... . == =>");
        assert_eq!(
            toks,
            vec![
                TokenKind::PipePipe,
                TokenKind::PipeGt,
                TokenKind::Bar,
                TokenKind::Ellipsis,
                TokenKind::Dot,
                TokenKind::EqEq,
                TokenKind::FatArrow,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn unexpected_character() {
        let result = Lexer::new("let # = 1").tokenize();
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].code, "L001");
        // Lexing continues past the bad character.
        assert!(result.tokens.iter().any(|t| t.kind == TokenKind::Int(1)));
    }

    #[test]
    fn spans_cover_tokens() {
        let src = "let x = 42";
        let result = Lexer::new(src).tokenize();
        let tok = &result.tokens[3];
        assert_eq!(tok.kind, TokenKind::Int(42));
        assert_eq!(tok.span.start.offset, 8);
        assert_eq!(tok.span.end.offset, 10);
        assert_eq!(tok.span.start.line, 1);
        assert_eq!(tok.span.start.column, 9);
    }

    #[test]
    fn eof_sentinel_terminates() {
        let result = Lexer::new("").tokenize();
        assert_eq!(result.tokens.len(), 1);
        assert_eq!(result.tokens[0].kind, TokenKind::Eof);
    }

    #[test]
    fn spans_cover_every_nontrivial_byte() {
        let src = "let nums = [1, 2] -- tail\n{- note -} nums";
        let result = Lexer::new(src).tokenize();
        assert!(result.is_ok());
        let mut covered = vec![false; src.len()];
        for tok in &result.tokens {
            for i in tok.span.start.offset..tok.span.end.offset {
                covered[i as usize] = true;
            }
        }
        for (i, byte) in src.bytes().enumerate() {
            let trivial = byte.is_ascii_whitespace()
                || (i >= 18 && i <= 24) // line comment
                || (i >= 26 && i <= 35); // block comment
            assert!(
                covered[i] || trivial,
                "byte {} ({:?}) not covered",
                i,
                byte as char
            );
        }
    }
}
