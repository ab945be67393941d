//! Recursive-descent parser producing the expression AST
//!
//! Grammar, lowest precedence first:
//!
//! ```text
//! or         := and ( "or" and )*
//! and        := not ( "and" not )*
//! not        := "not" not | comparison
//! comparison := postfix ( compop postfix )?
//! postfix    := primary ( "." IDENT | "(" args? ")" )*
//! primary    := IDENT | STRING | INT | True | False | None | "(" or ")"
//! ```

use crate::application::expression::error::{ExpressionError, ExpressionResult};
use crate::application::expression::lexer::{Spanned, Token};

/// Nesting limit for parenthesised and prefix expressions.
const MAX_DEPTH: usize = 64;

static EOF: Token = Token::Eof;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    Bool(bool),
    Int(i64),
    Str(String),
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    In,
    NotIn,
}

impl CompareOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
            CompareOp::In => "in",
            CompareOp::NotIn => "not in",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Literal(Literal),
    Name(String),
    Attribute {
        target: Box<Expr>,
        name: String,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Compare {
        op: CompareOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

impl Expr {
    /// Free identifiers referenced by the expression, in source order.
    pub fn names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_names(&mut names);
        names
    }

    fn collect_names<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Expr::Literal(_) => {}
            Expr::Name(name) => names.push(name),
            Expr::Attribute { target, .. } => target.collect_names(names),
            Expr::Call { callee, args } => {
                callee.collect_names(names);
                args.iter().for_each(|a| a.collect_names(names));
            }
            Expr::Not(inner) => inner.collect_names(names),
            Expr::And(l, r) | Expr::Or(l, r) => {
                l.collect_names(names);
                r.collect_names(names);
            }
            Expr::Compare { left, right, .. } => {
                left.collect_names(names);
                right.collect_names(names);
            }
        }
    }
}

pub struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Spanned>,
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, tokens: Vec<Spanned>) -> Self {
        Self {
            source,
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    /// Parses the whole token stream as one expression.
    pub fn parse(mut self) -> ExpressionResult<Expr> {
        if self.peek() == &Token::Eof {
            return Err(self.error("empty expression"));
        }
        let expr = self.parse_or()?;
        if self.peek() != &Token::Eof {
            let message = format!("unexpected {}", self.peek());
            return Err(self.error(message));
        }
        Ok(expr)
    }

    fn peek(&self) -> &Token {
        self.tokens
            .get(self.pos)
            .map(|s| &s.token)
            .unwrap_or(&EOF)
    }

    fn peek_at(&self, offset: usize) -> &Token {
        self.tokens
            .get(self.pos + offset)
            .map(|s| &s.token)
            .unwrap_or(&EOF)
    }

    fn position(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map(|s| s.position)
            .unwrap_or(self.source.len())
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == token {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: Token) -> ExpressionResult<()> {
        if self.eat(&token) {
            Ok(())
        } else {
            let message = format!("expected {token}, found {}", self.peek());
            Err(self.error(message))
        }
    }

    fn error(&self, message: impl Into<String>) -> ExpressionError {
        ExpressionError::Syntax {
            expression: self.source.to_string(),
            position: self.position(),
            message: message.into(),
        }
    }

    fn enter(&mut self) -> ExpressionResult<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(self.error("expression nested too deeply"));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    /// Leaves `levels` nesting levels entered by a left-folded chain.
    fn leave_chain(&mut self, levels: usize) {
        self.depth -= levels;
    }

    // Every chained operand adds one level to the left-nested tree.
    fn parse_or(&mut self) -> ExpressionResult<Expr> {
        let mut left = self.parse_and()?;
        let mut levels = 0;
        while self.eat(&Token::Or) {
            self.enter()?;
            levels += 1;
            let right = self.parse_and()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        self.leave_chain(levels);
        Ok(left)
    }

    fn parse_and(&mut self) -> ExpressionResult<Expr> {
        let mut left = self.parse_not()?;
        let mut levels = 0;
        while self.eat(&Token::And) {
            self.enter()?;
            levels += 1;
            let right = self.parse_not()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        self.leave_chain(levels);
        Ok(left)
    }

    fn parse_not(&mut self) -> ExpressionResult<Expr> {
        if self.eat(&Token::Not) {
            self.enter()?;
            let inner = self.parse_not()?;
            self.leave();
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> ExpressionResult<Expr> {
        let left = self.parse_postfix()?;
        let op = match self.peek() {
            Token::Eq => CompareOp::Eq,
            Token::Ne => CompareOp::Ne,
            Token::Lt => CompareOp::Lt,
            Token::Le => CompareOp::Le,
            Token::Gt => CompareOp::Gt,
            Token::Ge => CompareOp::Ge,
            Token::In => CompareOp::In,
            Token::Not if self.peek_at(1) == &Token::In => CompareOp::NotIn,
            _ => return Ok(left),
        };
        if op == CompareOp::NotIn {
            self.advance();
        }
        self.advance();
        let right = self.parse_postfix()?;

        if matches!(
            self.peek(),
            Token::Eq | Token::Ne | Token::Lt | Token::Le | Token::Gt | Token::Ge | Token::In
        ) {
            return Err(self.error("chained comparisons are not supported"));
        }

        Ok(Expr::Compare {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    fn parse_postfix(&mut self) -> ExpressionResult<Expr> {
        let mut expr = self.parse_primary()?;
        let mut levels = 0;
        loop {
            if matches!(self.peek(), Token::Dot | Token::LParen) {
                self.enter()?;
                levels += 1;
            }
            if self.eat(&Token::Dot) {
                let Token::Ident(name) = self.peek().clone() else {
                    let message = format!("expected attribute name, found {}", self.peek());
                    return Err(self.error(message));
                };
                self.advance();
                expr = Expr::Attribute {
                    target: Box::new(expr),
                    name,
                };
            } else if self.eat(&Token::LParen) {
                let args = self.parse_args()?;
                expr = Expr::Call {
                    callee: Box::new(expr),
                    args,
                };
            } else {
                self.leave_chain(levels);
                return Ok(expr);
            }
        }
    }

    fn parse_args(&mut self) -> ExpressionResult<Vec<Expr>> {
        let mut args = Vec::new();
        if self.eat(&Token::RParen) {
            return Ok(args);
        }
        self.enter()?;
        loop {
            args.push(self.parse_or()?);
            if self.eat(&Token::Comma) {
                if self.peek() == &Token::RParen {
                    break;
                }
                continue;
            }
            break;
        }
        self.expect(Token::RParen)?;
        self.leave();
        Ok(args)
    }

    fn parse_primary(&mut self) -> ExpressionResult<Expr> {
        let expr = match self.peek().clone() {
            Token::Ident(name) => Expr::Name(name),
            Token::Str(value) => Expr::Literal(Literal::Str(value)),
            Token::Int(value) => Expr::Literal(Literal::Int(value)),
            Token::True => Expr::Literal(Literal::Bool(true)),
            Token::False => Expr::Literal(Literal::Bool(false)),
            Token::None => Expr::Literal(Literal::None),
            Token::LParen => {
                self.advance();
                self.enter()?;
                let inner = self.parse_or()?;
                self.expect(Token::RParen)?;
                self.leave();
                return Ok(inner);
            }
            Token::Eof => return Err(self.error("unexpected end of expression")),
            other => return Err(self.error(format!("unexpected {other}"))),
        };
        self.advance();
        Ok(expr)
    }
}
