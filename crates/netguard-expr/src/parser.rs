use crate::ExprError;
use crate::ast::{BinaryOp, Expr, LogicalOp, UnaryOp};
use crate::lexer::{Tok, Token, lex};
use crate::pattern::compile_regex;
use std::sync::Arc;

/// Recursive-descent parser; nesting (parentheses, unary chains, ternaries, call arguments)
/// is bounded by `max_depth`.
pub(crate) fn parse(src: &str, max_depth: usize) -> Result<Expr, ExprError> {
    let mut parser = Parser {
        tokens: lex(src)?,
        pos: 0,
        depth: 0,
        max_depth,
    };
    let expr = parser.ternary()?;
    match parser.peek() {
        Tok::Eof => Ok(expr),
        other => Err(parser.error(format!("unexpected {other:?} after expression"))),
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
    max_depth: usize,
}

impl Parser {
    fn peek(&self) -> &Tok {
        self.tokens
            .get(self.pos)
            .map_or(&Tok::Eof, |t| &t.tok)
    }

    fn advance(&mut self) -> Tok {
        let tok = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn eat(&mut self, tok: &Tok) -> bool {
        if self.peek() == tok {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, tok: &Tok, what: &str) -> Result<(), ExprError> {
        if self.eat(tok) {
            Ok(())
        } else {
            Err(self.error(format!("expected {what}, found {:?}", self.peek())))
        }
    }

    fn error(&self, message: String) -> ExprError {
        let pos = self.tokens.get(self.pos).map_or(0, |t| t.pos);
        ExprError::Syntax { pos, message }
    }

    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T, ExprError>) -> Result<T, ExprError> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(ExprError::TooDeep(self.max_depth));
        }
        let out = f(self);
        self.depth -= 1;
        out
    }

    fn ternary(&mut self) -> Result<Expr, ExprError> {
        self.nested(|p| {
            let cond = p.logical_or()?;
            if !p.eat(&Tok::Question) {
                return Ok(cond);
            }
            let then = p.ternary()?;
            p.expect(&Tok::Colon, "`:`")?;
            let otherwise = p.ternary()?;
            Ok(Expr::Ternary(Box::new(cond), Box::new(then), Box::new(otherwise)))
        })
    }

    fn logical_or(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.logical_and()?;
        while self.eat(&Tok::OrOr) {
            let rhs = self.logical_and()?;
            lhs = Expr::Logical(LogicalOp::Or, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn logical_and(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.equality()?;
        while self.eat(&Tok::AndAnd) {
            let rhs = self.equality()?;
            lhs = Expr::Logical(LogicalOp::And, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn equality(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.relational()?;
        loop {
            let op = match self.peek() {
                Tok::EqEq => BinaryOp::Eq,
                Tok::NotEq => BinaryOp::NotEq,
                Tok::Match => BinaryOp::Match,
                Tok::NotMatch => BinaryOp::NotMatch,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.relational()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn relational(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.additive()?;
        loop {
            let op = match self.peek() {
                Tok::Lt => BinaryOp::Lt,
                Tok::Le => BinaryOp::Le,
                Tok::Gt => BinaryOp::Gt,
                Tok::Ge => BinaryOp::Ge,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.additive()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn additive(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.multiplicative()?;
        loop {
            let op = match self.peek() {
                Tok::Plus => BinaryOp::Add,
                Tok::Minus => BinaryOp::Sub,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.multiplicative()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn multiplicative(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek() {
                Tok::Star => BinaryOp::Mul,
                Tok::Slash => BinaryOp::Div,
                Tok::Percent => BinaryOp::Rem,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.unary()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn unary(&mut self) -> Result<Expr, ExprError> {
        let op = match self.peek() {
            Tok::Bang => UnaryOp::Not,
            Tok::Minus => UnaryOp::Neg,
            _ => return self.postfix(),
        };
        self.pos += 1;
        self.nested(|p| Ok(Expr::Unary(op, Box::new(p.unary()?))))
    }

    fn postfix(&mut self) -> Result<Expr, ExprError> {
        let mut expr = self.primary()?;
        loop {
            match self.peek() {
                Tok::Dot => {
                    self.pos += 1;
                    match self.advance() {
                        Tok::Ident(name) => expr = Expr::Member(Box::new(expr), name),
                        other => {
                            return Err(self.error(format!(
                                "expected property name after `.`, found {other:?}"
                            )));
                        }
                    }
                }
                Tok::LBracket => {
                    self.pos += 1;
                    let index = self.ternary()?;
                    self.expect(&Tok::RBracket, "`]`")?;
                    expr = Expr::Index(Box::new(expr), Box::new(index));
                }
                Tok::LParen => {
                    self.pos += 1;
                    let args = self.nested(|p| p.list_items(&Tok::RParen))?;
                    expr = Expr::Call(Box::new(expr), args);
                }
                _ => return Ok(expr),
            }
        }
    }

    /// Comma-separated expressions up to and including `close`.
    fn list_items(&mut self, close: &Tok) -> Result<Vec<Expr>, ExprError> {
        let mut items = Vec::new();
        if self.eat(close) {
            return Ok(items);
        }
        loop {
            items.push(self.ternary()?);
            if self.eat(close) {
                return Ok(items);
            }
            self.expect(&Tok::Comma, "`,`")?;
        }
    }

    fn primary(&mut self) -> Result<Expr, ExprError> {
        match self.advance() {
            Tok::Num(n) => Ok(Expr::Num(n)),
            Tok::Str(s) => Ok(Expr::Str(s)),
            Tok::True => Ok(Expr::Bool(true)),
            Tok::False => Ok(Expr::Bool(false)),
            Tok::Null => Ok(Expr::Null),
            Tok::Ident(name) => Ok(Expr::Ident(name)),
            Tok::Regex { pattern, flags } => {
                Ok(Expr::Regex(Arc::new(compile_regex(&pattern, &flags)?)))
            }
            Tok::LParen => {
                let inner = self.ternary()?;
                self.expect(&Tok::RParen, "`)`")?;
                Ok(inner)
            }
            Tok::LBracket => self.nested(|p| Ok(Expr::List(p.list_items(&Tok::RBracket)?))),
            Tok::Eof => Err(self.error("unexpected end of expression".to_string())),
            other => {
                self.pos -= 1;
                Err(self.error(format!("unexpected {other:?}")))
            }
        }
    }
}
