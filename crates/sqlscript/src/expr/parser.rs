//! Pratt parser for template expressions.
//!
//! Binding powers, loosest first:
//!
//! | level | operators |
//! |---|---|
//! | 1 | `or`, `\|\|` |
//! | 2 | `and`, `&&` |
//! | 3 | `==`, `!=`, `eq`, `neq` |
//! | 4 | `<`, `<=`, `>`, `>=`, `lt`, `lte`, `gt`, `gte` |
//! | 5 | `+`, `-` |
//! | 6 | `*`, `/`, `%` |
//! | 7 | prefix `!`, `not`, `-` |
//! | 8 | `.name`, `.call()`, `[index]` |

use super::lexer::{Token, TokenKind, tokenize};
use crate::error::{ScriptError, ScriptResult};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UnaryOp {
    Not,
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinaryOp {
    Or,
    And,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl BinaryOp {
    /// (left, right) binding power; all binary operators are left-associative.
    fn binding_power(self) -> (u8, u8) {
        let level = match self {
            BinaryOp::Or => 1,
            BinaryOp::And => 2,
            BinaryOp::Eq | BinaryOp::Ne => 3,
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => 4,
            BinaryOp::Add | BinaryOp::Sub => 5,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => 6,
        };
        (level * 2, level * 2 + 1)
    }
}

const PREFIX_BP: u8 = 15;

/// Parsed expression.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expr {
    Literal(Value),
    /// Root name looked up in the bindings.
    Var(String),
    Member(Box<Expr>, String),
    Index(Box<Expr>, Box<Expr>),
    Call(Box<Expr>, String, Vec<Expr>),
    /// `{a, b, c}` list literal.
    List(Vec<Expr>),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
}

pub(crate) fn parse(source: &str) -> ScriptResult<Expr> {
    let tokens = tokenize(source)?;
    let mut parser = Parser {
        source,
        tokens,
        pos: 0,
    };
    let expr = parser.expr(0)?;
    if let Some(tok) = parser.peek() {
        return Err(parser.error_at(tok.start, "unexpected trailing input"));
    }
    Ok(expr)
}

struct Parser<'s> {
    source: &'s str,
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn error_at(&self, pos: usize, msg: &str) -> ScriptError {
        ScriptError::evaluation(self.source, format!("{msg} at {pos}"))
    }

    fn eof(&self) -> ScriptError {
        self.error_at(self.source.len(), "unexpected end of expression")
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> ScriptResult<()> {
        match self.next() {
            Some(tok) if tok.kind == kind => Ok(()),
            Some(tok) => Err(self.error_at(tok.start, &format!("expected {what}"))),
            None => Err(self.eof()),
        }
    }

    fn peek_binary(&self) -> Option<BinaryOp> {
        let op = match &self.peek()?.kind {
            TokenKind::OrOr => BinaryOp::Or,
            TokenKind::AndAnd => BinaryOp::And,
            TokenKind::EqEq => BinaryOp::Eq,
            TokenKind::NotEq => BinaryOp::Ne,
            TokenKind::Lt => BinaryOp::Lt,
            TokenKind::LtEq => BinaryOp::Le,
            TokenKind::Gt => BinaryOp::Gt,
            TokenKind::GtEq => BinaryOp::Ge,
            TokenKind::Plus => BinaryOp::Add,
            TokenKind::Minus => BinaryOp::Sub,
            TokenKind::Star => BinaryOp::Mul,
            TokenKind::Slash => BinaryOp::Div,
            TokenKind::Percent => BinaryOp::Rem,
            TokenKind::Ident(word) => match word.as_str() {
                "or" => BinaryOp::Or,
                "and" => BinaryOp::And,
                "eq" => BinaryOp::Eq,
                "neq" => BinaryOp::Ne,
                "lt" => BinaryOp::Lt,
                "lte" => BinaryOp::Le,
                "gt" => BinaryOp::Gt,
                "gte" => BinaryOp::Ge,
                _ => return None,
            },
            _ => return None,
        };
        Some(op)
    }

    fn expr(&mut self, min_bp: u8) -> ScriptResult<Expr> {
        let mut lhs = self.prefix()?;

        loop {
            lhs = match self.peek().map(|t| &t.kind) {
                Some(TokenKind::Dot) => {
                    self.next();
                    let name = match self.next() {
                        Some(Token {
                            kind: TokenKind::Ident(name),
                            ..
                        }) => name,
                        Some(tok) => {
                            return Err(self.error_at(tok.start, "expected property name"));
                        }
                        None => return Err(self.eof()),
                    };
                    if matches!(self.peek().map(|t| &t.kind), Some(TokenKind::LParen)) {
                        self.next();
                        let args = self.list(TokenKind::RParen, "')'")?;
                        Expr::Call(Box::new(lhs), name, args)
                    } else {
                        Expr::Member(Box::new(lhs), name)
                    }
                }
                Some(TokenKind::LBracket) => {
                    self.next();
                    let index = self.expr(0)?;
                    self.expect(TokenKind::RBracket, "']'")?;
                    Expr::Index(Box::new(lhs), Box::new(index))
                }
                _ => {
                    let Some(op) = self.peek_binary() else {
                        break;
                    };
                    let (l_bp, r_bp) = op.binding_power();
                    if l_bp < min_bp {
                        break;
                    }
                    self.next();
                    let rhs = self.expr(r_bp)?;
                    Expr::Binary(op, Box::new(lhs), Box::new(rhs))
                }
            };
        }

        Ok(lhs)
    }

    fn prefix(&mut self) -> ScriptResult<Expr> {
        let Some(tok) = self.next() else {
            return Err(self.eof());
        };
        let expr = match tok.kind {
            TokenKind::Int(v) => Expr::Literal(Value::from(v)),
            TokenKind::Float(v) => Expr::Literal(Value::from(v)),
            TokenKind::Str(s) => Expr::Literal(Value::String(s)),
            TokenKind::Bang => Expr::Unary(UnaryOp::Not, Box::new(self.expr(PREFIX_BP)?)),
            TokenKind::Minus => Expr::Unary(UnaryOp::Neg, Box::new(self.expr(PREFIX_BP)?)),
            TokenKind::LParen => {
                let inner = self.expr(0)?;
                self.expect(TokenKind::RParen, "')'")?;
                inner
            }
            TokenKind::LBrace => Expr::List(self.list(TokenKind::RBrace, "'}'")?),
            TokenKind::Ident(name) => match name.as_str() {
                "null" => Expr::Literal(Value::Null),
                "true" => Expr::Literal(Value::Bool(true)),
                "false" => Expr::Literal(Value::Bool(false)),
                "not" => Expr::Unary(UnaryOp::Not, Box::new(self.expr(PREFIX_BP)?)),
                _ => Expr::Var(name),
            },
            _ => return Err(self.error_at(tok.start, "unexpected token")),
        };
        Ok(expr)
    }

    /// Comma-separated expressions up to `close` (already past the opener).
    fn list(&mut self, close: TokenKind, what: &str) -> ScriptResult<Vec<Expr>> {
        let mut items = Vec::new();
        if self.peek().map(|t| &t.kind) == Some(&close) {
            self.next();
            return Ok(items);
        }
        loop {
            items.push(self.expr(0)?);
            match self.next() {
                Some(tok) if tok.kind == TokenKind::Comma => continue,
                Some(tok) if tok.kind == close => break,
                Some(tok) => {
                    return Err(self.error_at(tok.start, &format!("expected ',' or {what}")));
                }
                None => return Err(self.eof()),
            }
        }
        Ok(items)
    }
}
