//! Abstract syntax tree for nano-Promela.
//!
//! The language supports:
//! - Integer variables and expressions (`+ - * / %`, comparisons, `&& || !`)
//! - Assignments `x := e`, `skip`, and `atomic{...}` blocks of assignments
//! - Channel operations `c?x` (receive) and `c!e` (send); channels whose
//!   name starts with `_` are rendezvous channels
//! - Sequences `S1; S2`
//! - Guarded choice `if :: g1 -> S1 :: g2 -> S2 fi`
//! - Guarded loops `do :: g1 -> S1 :: g2 -> S2 od`
//!
//! Every node renders to a canonical text via [`Display`][fmt::Display]. The
//! compiler uses these texts as program-graph locations, so two statements
//! are the same location exactly when their texts are equal.

use std::fmt;

/// Variable name
pub type Var = String;

/// Separator between the two halves of a sequence.
pub const SEQ_SEPARATOR: &str = "; ";

/// Text of the sequence `first; rest`.
pub fn seq_text(first: &str, rest: &str) -> String {
    format!("{}{}{}", first, SEQ_SEPARATOR, rest)
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BinaryOp {
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
    Mod,
}

impl BinaryOp {
    /// Binding strength; higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Or => 1,
            BinaryOp::And => 2,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => 3,
            BinaryOp::Add | BinaryOp::Sub => 4,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => 5,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Or => "||",
            BinaryOp::And => "&&",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
        }
    }
}

/// Integer/boolean expression. Booleans are integers: `0` is false.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum Expr {
    Int(i64),
    Bool(bool),
    Var(Var),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
}

const UNARY_PRECEDENCE: u8 = 6;

impl Expr {
    pub fn var(name: impl Into<String>) -> Self {
        Expr::Var(name.into())
    }

    pub fn not(self) -> Self {
        Expr::Unary(UnaryOp::Not, Box::new(self))
    }

    pub fn neg(self) -> Self {
        Expr::Unary(UnaryOp::Neg, Box::new(self))
    }

    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary(op, Box::new(lhs), Box::new(rhs))
    }

    pub fn and(self, other: Expr) -> Self {
        Expr::binary(BinaryOp::And, self, other)
    }

    pub fn or(self, other: Expr) -> Self {
        Expr::binary(BinaryOp::Or, self, other)
    }

    pub fn eq(self, other: Expr) -> Self {
        Expr::binary(BinaryOp::Eq, self, other)
    }

    fn precedence(&self) -> u8 {
        match self {
            Expr::Binary(op, _, _) => op.precedence(),
            Expr::Unary(_, _) => UNARY_PRECEDENCE,
            _ => u8::MAX,
        }
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>, parens: bool) -> fmt::Result {
        if parens {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Int(n) => write!(f, "{}", n),
            Expr::Bool(b) => write!(f, "{}", b),
            Expr::Var(v) => write!(f, "{}", v),
            Expr::Unary(op, e) => {
                match op {
                    UnaryOp::Neg => write!(f, "-")?,
                    UnaryOp::Not => write!(f, "!")?,
                }
                e.fmt_operand(f, e.precedence() < UNARY_PRECEDENCE)
            }
            Expr::Binary(op, lhs, rhs) => {
                let p = op.precedence();
                // Comparisons do not chain, everything else is left-associative.
                let non_assoc = p == BinaryOp::Eq.precedence();
                lhs.fmt_operand(f, lhs.precedence() < p || (non_assoc && lhs.precedence() == p))?;
                write!(f, " {} ", op.symbol())?;
                rhs.fmt_operand(f, rhs.precedence() <= p)
            }
        }
    }
}

/// A basic (atomic, single-step) statement.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum Action {
    Skip,
    Assign(Var, Expr),
    /// `atomic{x := e1; y := e2}`, executed as one step
    Atomic(Vec<(Var, Expr)>),
    /// `c?x`
    Receive { channel: String, target: Var },
    /// `c!e`
    Send { channel: String, value: Expr },
}

impl Action {
    pub fn assign(var: impl Into<String>, expr: Expr) -> Self {
        Action::Assign(var.into(), expr)
    }

    pub fn receive(channel: impl Into<String>, target: impl Into<String>) -> Self {
        Action::Receive {
            channel: channel.into(),
            target: target.into(),
        }
    }

    pub fn send(channel: impl Into<String>, value: Expr) -> Self {
        Action::Send {
            channel: channel.into(),
            value,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Skip => write!(f, "skip"),
            Action::Assign(v, e) => write!(f, "{} := {}", v, e),
            Action::Atomic(assignments) => {
                write!(f, "atomic{{")?;
                for (i, (v, e)) in assignments.iter().enumerate() {
                    if i > 0 {
                        write!(f, "{}", SEQ_SEPARATOR)?;
                    }
                    write!(f, "{} := {}", v, e)?;
                }
                write!(f, "}}")
            }
            Action::Receive { channel, target } => write!(f, "{}?{}", channel, target),
            Action::Send { channel, value } => write!(f, "{}!{}", channel, value),
        }
    }
}

/// One `:: guard -> body` alternative of an `if` or `do`.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct GuardedOption {
    pub guard: Expr,
    pub body: Stmt,
}

impl GuardedOption {
    pub fn new(guard: Expr, body: Stmt) -> Self {
        GuardedOption { guard, body }
    }
}

/// Statement in nano-Promela
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum Stmt {
    Basic(Action),
    Seq(Box<Stmt>, Box<Stmt>),
    If(Vec<GuardedOption>),
    Do(Vec<GuardedOption>),
}

// Constructors
impl Stmt {
    pub fn skip() -> Self {
        Stmt::Basic(Action::Skip)
    }

    pub fn assign(var: impl Into<String>, expr: Expr) -> Self {
        Stmt::Basic(Action::assign(var, expr))
    }

    pub fn seq(first: Stmt, second: Stmt) -> Self {
        Stmt::Seq(Box::new(first), Box::new(second))
    }

    pub fn if_(options: Vec<GuardedOption>) -> Self {
        Stmt::If(options)
    }

    pub fn do_(options: Vec<GuardedOption>) -> Self {
        Stmt::Do(options)
    }

    /// Canonical source text of the statement.
    pub fn text(&self) -> String {
        self.to_string()
    }
}

fn fmt_options(f: &mut fmt::Formatter<'_>, options: &[GuardedOption]) -> fmt::Result {
    for option in options {
        write!(f, " :: {} -> {}", option.guard, option.body)?;
    }
    Ok(())
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::Basic(action) => write!(f, "{}", action),
            Stmt::Seq(first, second) => write!(f, "{}{}{}", first, SEQ_SEPARATOR, second),
            Stmt::If(options) => {
                write!(f, "if")?;
                fmt_options(f, options)?;
                write!(f, " fi")
            }
            Stmt::Do(options) => {
                write!(f, "do")?;
                fmt_options(f, options)?;
                write!(f, " od")
            }
        }
    }
}
