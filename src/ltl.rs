//! Linear temporal logic syntax.
//!
//! Formulas are built from atoms, `true`, negation, conjunction, next and
//! until. Disjunction, eventually and always are derived:
//!
//! - `a || b` is `~(~a /\ ~b)`
//! - `<>a` is `true U a`
//! - `[]a` is `~<>~a`
//!
//! Translation of formulas into automata is not provided; the
//! corresponding entry points report [`Error::Unsupported`].

use std::fmt;

use log::debug;

use crate::automaton::{Automaton, MultiColorAutomaton};
use crate::error::{Error, Result};
use crate::types::{Element, Proposition};

/// LTL formula syntax tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LtlFormula<P> {
    Atom(P),
    True,
    Not(Box<LtlFormula<P>>),
    And(Box<LtlFormula<P>>, Box<LtlFormula<P>>),
    /// `()φ`: φ holds in the next state.
    Next(Box<LtlFormula<P>>),
    /// `φ U ψ`: ψ eventually holds, and φ holds until then.
    Until(Box<LtlFormula<P>>, Box<LtlFormula<P>>),
}

// Constructors
impl<P> LtlFormula<P> {
    pub fn atom(p: P) -> Self {
        LtlFormula::Atom(p)
    }

    pub fn not(self) -> Self {
        LtlFormula::Not(Box::new(self))
    }

    pub fn and(self, other: Self) -> Self {
        LtlFormula::And(Box::new(self), Box::new(other))
    }

    pub fn next(self) -> Self {
        LtlFormula::Next(Box::new(self))
    }

    pub fn until(self, other: Self) -> Self {
        LtlFormula::Until(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: Self) -> Self {
        self.not().and(other.not()).not()
    }

    pub fn eventually(self) -> Self {
        LtlFormula::True.until(self)
    }

    pub fn always(self) -> Self {
        self.not().eventually().not()
    }
}

impl<P> LtlFormula<P> {
    fn is_binary(&self) -> bool {
        matches!(self, LtlFormula::And(..) | LtlFormula::Until(..))
    }

    /// Nesting depth of the syntax tree.
    pub fn depth(&self) -> usize {
        match self {
            LtlFormula::Atom(_) | LtlFormula::True => 1,
            LtlFormula::Not(a) | LtlFormula::Next(a) => 1 + a.depth(),
            LtlFormula::And(a, b) | LtlFormula::Until(a, b) => 1 + a.depth().max(b.depth()),
        }
    }

    /// All atoms occurring in the formula, left to right.
    pub fn atoms(&self) -> Vec<&P> {
        let mut result = Vec::new();
        let mut stack = vec![self];
        while let Some(f) = stack.pop() {
            match f {
                LtlFormula::Atom(p) => result.push(p),
                LtlFormula::True => {}
                LtlFormula::Not(a) | LtlFormula::Next(a) => stack.push(a),
                LtlFormula::And(a, b) | LtlFormula::Until(a, b) => {
                    stack.push(b);
                    stack.push(a);
                }
            }
        }
        result
    }
}

impl<P: fmt::Display> LtlFormula<P> {
    /// Write an operand of a binary operator, parenthesized if it is itself
    /// binary. Chains of conjunctions are printed flat.
    fn fmt_operand(&self, parent_is_and: bool, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flat = parent_is_and && matches!(self, LtlFormula::And(..));
        if self.is_binary() && !flat {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }

    fn fmt_unary_operand(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_binary() {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }
}

impl<P: fmt::Display> fmt::Display for LtlFormula<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LtlFormula::Atom(p) => write!(f, "{}", p),
            LtlFormula::True => write!(f, "true"),
            LtlFormula::Not(a) => {
                write!(f, "~")?;
                a.fmt_unary_operand(f)
            }
            LtlFormula::Next(a) => {
                write!(f, "()")?;
                a.fmt_unary_operand(f)
            }
            LtlFormula::And(a, b) => {
                a.fmt_operand(true, f)?;
                write!(f, " /\\ ")?;
                b.fmt_operand(true, f)
            }
            LtlFormula::Until(a, b) => {
                a.fmt_operand(false, f)?;
                write!(f, " U ")?;
                b.fmt_operand(false, f)
            }
        }
    }
}

/// Translate an LTL formula into an equivalent nondeterministic Büchi
/// automaton over the powerset of its atoms.
pub fn ltl_to_nba<P: Proposition>(formula: &LtlFormula<P>) -> Result<Automaton<usize, P>> {
    debug!("ltl_to_nba requested for a formula of depth {}", formula.depth());
    Err(Error::Unsupported("translation of LTL formulas into automata"))
}

/// Degeneralize a multi-color automaton into a plain Büchi automaton.
pub fn gnba_to_nba<Q: Element, P: Proposition>(
    gnba: &MultiColorAutomaton<Q, P>,
) -> Result<Automaton<(Q, usize), P>> {
    debug!("gnba_to_nba requested for an automaton with {} states", gnba.states().len());
    Err(Error::Unsupported("degeneralization of multi-color automata"))
}
