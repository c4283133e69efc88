//! Lexer and recursive descent parser for nano-Promela.
//!
//! Three entry points are exposed:
//! - [`parse_stmt`] for whole programs,
//! - [`parse_expr`] for guard texts,
//! - [`parse_action`] / [`parse_handshake`] for edge action texts.

use crate::ast::{Action, BinaryOp, Expr, GuardedOption, Stmt, UnaryOp};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Eq, PartialEq)]
enum TokenKind {
    /// Magnitude of an integer literal; the sign is a separate token.
    Int(u64),
    Ident(String),
    // Keywords
    If,
    Fi,
    Do,
    Od,
    Skip,
    Atomic,
    True,
    False,
    // Punctuation
    DoubleColon,
    Arrow,
    Assign,
    Semicolon,
    LBrace,
    RBrace,
    LParen,
    RParen,
    Question,
    Bang,
    Pipe,
    // Operators
    OrOr,
    AndAnd,
    EqEq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Eof,
}

#[derive(Debug, Clone)]
struct Token {
    kind: TokenKind,
    /// Byte offset of the first character.
    position: usize,
}

fn parse_error(message: impl Into<String>, position: usize) -> Error {
    Error::Parse {
        message: message.into(),
        position,
    }
}

struct Lexer<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self { source, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn peek_next(&self) -> Option<char> {
        let mut chars = self.source[self.pos..].chars();
        chars.next();
        chars.next()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                // Line comment
                Some('/') if self.peek_next() == Some('/') => {
                    while let Some(c) = self.advance() {
                        if c == '\n' {
                            break;
                        }
                    }
                }
                _ => break,
            }
        }
    }

    fn tokenize(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        Ok(tokens)
    }

    fn next_token(&mut self) -> Result<Token> {
        self.skip_trivia();
        let position = self.pos;
        let Some(c) = self.advance() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                position,
            });
        };

        let kind = if c.is_ascii_digit() {
            while matches!(self.peek(), Some(d) if d.is_ascii_digit()) {
                self.advance();
            }
            let text = &self.source[position..self.pos];
            let value = text
                .parse::<u64>()
                .map_err(|_| parse_error(format!("integer literal {} out of range", text), position))?;
            TokenKind::Int(value)
        } else if c.is_alphabetic() || c == '_' {
            while matches!(self.peek(), Some(d) if d.is_alphanumeric() || d == '_') {
                self.advance();
            }
            match &self.source[position..self.pos] {
                "if" => TokenKind::If,
                "fi" => TokenKind::Fi,
                "do" => TokenKind::Do,
                "od" => TokenKind::Od,
                "skip" => TokenKind::Skip,
                "atomic" => TokenKind::Atomic,
                "true" => TokenKind::True,
                "false" => TokenKind::False,
                ident => TokenKind::Ident(ident.to_string()),
            }
        } else {
            let next = self.peek();
            let (kind, two) = match (c, next) {
                (':', Some(':')) => (TokenKind::DoubleColon, true),
                (':', Some('=')) => (TokenKind::Assign, true),
                ('-', Some('>')) => (TokenKind::Arrow, true),
                ('|', Some('|')) => (TokenKind::OrOr, true),
                ('&', Some('&')) => (TokenKind::AndAnd, true),
                ('=', Some('=')) => (TokenKind::EqEq, true),
                ('!', Some('=')) => (TokenKind::NotEq, true),
                ('<', Some('=')) => (TokenKind::Le, true),
                ('>', Some('=')) => (TokenKind::Ge, true),
                (';', _) => (TokenKind::Semicolon, false),
                ('{', _) => (TokenKind::LBrace, false),
                ('}', _) => (TokenKind::RBrace, false),
                ('(', _) => (TokenKind::LParen, false),
                (')', _) => (TokenKind::RParen, false),
                ('?', _) => (TokenKind::Question, false),
                ('!', _) => (TokenKind::Bang, false),
                ('|', _) => (TokenKind::Pipe, false),
                ('<', _) => (TokenKind::Lt, false),
                ('>', _) => (TokenKind::Gt, false),
                ('+', _) => (TokenKind::Plus, false),
                ('-', _) => (TokenKind::Minus, false),
                ('*', _) => (TokenKind::Star, false),
                ('/', _) => (TokenKind::Slash, false),
                ('%', _) => (TokenKind::Percent, false),
                _ => return Err(parse_error(format!("unexpected character {:?}", c), position)),
            };
            if two {
                self.advance();
            }
            kind
        };
        Ok(Token { kind, position })
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(source: &str) -> Result<Self> {
        let tokens = Lexer::new(source).tokenize()?;
        Ok(Self { tokens, pos: 0 })
    }

    fn peek(&self) -> &TokenKind {
        &self.tokens[self.pos.min(self.tokens.len() - 1)].kind
    }

    fn peek_ahead(&self, n: usize) -> &TokenKind {
        &self.tokens[(self.pos + n).min(self.tokens.len() - 1)].kind
    }

    fn position(&self) -> usize {
        self.tokens[self.pos.min(self.tokens.len() - 1)].position
    }

    fn advance(&mut self) -> TokenKind {
        let kind = self.peek().clone();
        if kind != TokenKind::Eof {
            self.pos += 1;
        }
        kind
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek() == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<()> {
        if self.eat(&kind) {
            Ok(())
        } else {
            Err(self.unexpected(what))
        }
    }

    fn unexpected(&self, expected: &str) -> Error {
        parse_error(format!("expected {}, found {:?}", expected, self.peek()), self.position())
    }

    fn expect_eof(&self) -> Result<()> {
        if *self.peek() == TokenKind::Eof {
            Ok(())
        } else {
            Err(self.unexpected("end of input"))
        }
    }

    fn parse_ident(&mut self) -> Result<String> {
        match self.peek().clone() {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(name)
            }
            _ => Err(self.unexpected("identifier")),
        }
    }

    // stmt := simple (';' simple)* ';'?
    fn parse_stmt(&mut self) -> Result<Stmt> {
        let mut stmt = self.parse_simple_stmt()?;
        while self.eat(&TokenKind::Semicolon) {
            if self.at_stmt_end() {
                break;
            }
            let next = self.parse_simple_stmt()?;
            stmt = Stmt::seq(stmt, next);
        }
        Ok(stmt)
    }

    fn at_stmt_end(&self) -> bool {
        matches!(
            self.peek(),
            TokenKind::Eof | TokenKind::Fi | TokenKind::Od | TokenKind::DoubleColon | TokenKind::RBrace
        )
    }

    fn parse_simple_stmt(&mut self) -> Result<Stmt> {
        match self.peek() {
            TokenKind::If => {
                self.advance();
                let options = self.parse_options()?;
                self.expect(TokenKind::Fi, "'fi'")?;
                Ok(Stmt::If(options))
            }
            TokenKind::Do => {
                self.advance();
                let options = self.parse_options()?;
                self.expect(TokenKind::Od, "'od'")?;
                Ok(Stmt::Do(options))
            }
            _ => Ok(Stmt::Basic(self.parse_action()?)),
        }
    }

    // option := '::' expr '->' stmt
    fn parse_options(&mut self) -> Result<Vec<GuardedOption>> {
        let mut options = Vec::new();
        while self.eat(&TokenKind::DoubleColon) {
            let guard = self.parse_expr()?;
            self.expect(TokenKind::Arrow, "'->'")?;
            let body = self.parse_stmt()?;
            options.push(GuardedOption::new(guard, body));
        }
        if options.is_empty() {
            return Err(self.unexpected("'::'"));
        }
        Ok(options)
    }

    fn parse_action(&mut self) -> Result<Action> {
        match self.peek().clone() {
            TokenKind::Skip => {
                self.advance();
                Ok(Action::Skip)
            }
            TokenKind::Atomic => {
                self.advance();
                self.expect(TokenKind::LBrace, "'{'")?;
                let mut assignments = vec![self.parse_assignment()?];
                while self.eat(&TokenKind::Semicolon) {
                    if *self.peek() == TokenKind::RBrace {
                        break;
                    }
                    assignments.push(self.parse_assignment()?);
                }
                self.expect(TokenKind::RBrace, "'}'")?;
                Ok(Action::Atomic(assignments))
            }
            TokenKind::Ident(name) => match self.peek_ahead(1) {
                TokenKind::Assign => {
                    let (var, expr) = self.parse_assignment()?;
                    Ok(Action::Assign(var, expr))
                }
                TokenKind::Question => {
                    self.advance();
                    self.advance();
                    let target = self.parse_ident()?;
                    Ok(Action::receive(name, target))
                }
                TokenKind::Bang => {
                    self.advance();
                    self.advance();
                    let value = self.parse_expr()?;
                    Ok(Action::send(name, value))
                }
                _ => {
                    self.advance();
                    Err(self.unexpected("':=', '?' or '!'"))
                }
            },
            _ => Err(self.unexpected("statement")),
        }
    }

    fn parse_assignment(&mut self) -> Result<(String, Expr)> {
        let var = self.parse_ident()?;
        self.expect(TokenKind::Assign, "':='")?;
        let expr = self.parse_expr()?;
        Ok((var, expr))
    }

    fn parse_expr(&mut self) -> Result<Expr> {
        self.parse_binary(1)
    }

    fn binary_op(kind: &TokenKind) -> Option<BinaryOp> {
        let op = match kind {
            TokenKind::OrOr => BinaryOp::Or,
            TokenKind::AndAnd => BinaryOp::And,
            TokenKind::EqEq => BinaryOp::Eq,
            TokenKind::NotEq => BinaryOp::Ne,
            TokenKind::Lt => BinaryOp::Lt,
            TokenKind::Le => BinaryOp::Le,
            TokenKind::Gt => BinaryOp::Gt,
            TokenKind::Ge => BinaryOp::Ge,
            TokenKind::Plus => BinaryOp::Add,
            TokenKind::Minus => BinaryOp::Sub,
            TokenKind::Star => BinaryOp::Mul,
            TokenKind::Slash => BinaryOp::Div,
            TokenKind::Percent => BinaryOp::Mod,
            _ => return None,
        };
        Some(op)
    }

    /// Precedence climbing over left-associative binary operators.
    fn parse_binary(&mut self, min_precedence: u8) -> Result<Expr> {
        let mut lhs = self.parse_unary()?;
        while let Some(op) = Self::binary_op(self.peek()) {
            let p = op.precedence();
            if p < min_precedence {
                break;
            }
            self.advance();
            let rhs = self.parse_binary(p + 1)?;
            lhs = Expr::binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        match self.peek() {
            TokenKind::Bang => {
                self.advance();
                Ok(Expr::Unary(UnaryOp::Not, Box::new(self.parse_unary()?)))
            }
            TokenKind::Minus => {
                self.advance();
                // A negated literal is a single constant, so `i64::MIN` is expressible.
                if let TokenKind::Int(n) = *self.peek() {
                    let position = self.position();
                    self.advance();
                    return 0i64
                        .checked_sub_unsigned(n)
                        .map(Expr::Int)
                        .ok_or_else(|| parse_error(format!("integer literal -{} out of range", n), position));
                }
                Ok(Expr::Unary(UnaryOp::Neg, Box::new(self.parse_unary()?)))
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        match self.peek().clone() {
            TokenKind::Int(n) => {
                let position = self.position();
                self.advance();
                i64::try_from(n)
                    .map(Expr::Int)
                    .map_err(|_| parse_error(format!("integer literal {} out of range", n), position))
            }
            TokenKind::True => {
                self.advance();
                Ok(Expr::Bool(true))
            }
            TokenKind::False => {
                self.advance();
                Ok(Expr::Bool(false))
            }
            TokenKind::Ident(name) => {
                self.advance();
                Ok(Expr::Var(name))
            }
            TokenKind::LParen => {
                self.advance();
                let e = self.parse_expr()?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(e)
            }
            _ => Err(self.unexpected("expression")),
        }
    }
}

/// Parse a nano-Promela program.
pub fn parse_stmt(source: &str) -> Result<Stmt> {
    let mut parser = Parser::new(source)?;
    let stmt = parser.parse_stmt()?;
    parser.expect_eof()?;
    Ok(stmt)
}

/// Parse a guard or value expression.
pub fn parse_expr(source: &str) -> Result<Expr> {
    let mut parser = Parser::new(source)?;
    let expr = parser.parse_expr()?;
    parser.expect_eof()?;
    Ok(expr)
}

/// Parse the text of a single basic statement.
pub fn parse_action(source: &str) -> Result<Action> {
    let mut parser = Parser::new(source)?;
    let action = parser.parse_action()?;
    parser.expect_eof()?;
    Ok(action)
}

/// Parse a combined handshake label `a|b`.
pub fn parse_handshake(source: &str) -> Result<(Action, Action)> {
    let mut parser = Parser::new(source)?;
    let first = parser.parse_action()?;
    parser.expect(TokenKind::Pipe, "'|'")?;
    let second = parser.parse_action()?;
    parser.expect_eof()?;
    Ok((first, second))
}
