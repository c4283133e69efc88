//! Boolean gate expressions over named ports.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Values of named boolean ports.
pub type PortValues = BTreeMap<String, bool>;

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum Gate {
    Const(bool),
    /// An input port or a register, looked up by name.
    Port(String),
    Not(Box<Gate>),
    And(Box<Gate>, Box<Gate>),
    Or(Box<Gate>, Box<Gate>),
    Xor(Box<Gate>, Box<Gate>),
    Ite(Box<Gate>, Box<Gate>, Box<Gate>),
}

// Constructors
impl Gate {
    pub fn port(name: impl Into<String>) -> Gate {
        Gate::Port(name.into())
    }

    pub fn not(value: Gate) -> Gate {
        match value {
            Gate::Const(b) => Gate::Const(!b),
            Gate::Not(inner) => *inner,
            _ => Gate::Not(Box::new(value)),
        }
    }

    pub fn and(lhs: Gate, rhs: Gate) -> Gate {
        Gate::And(Box::new(lhs), Box::new(rhs))
    }

    pub fn or(lhs: Gate, rhs: Gate) -> Gate {
        Gate::Or(Box::new(lhs), Box::new(rhs))
    }

    pub fn xor(lhs: Gate, rhs: Gate) -> Gate {
        Gate::Xor(Box::new(lhs), Box::new(rhs))
    }

    pub fn ite(cond: Gate, then: Gate, else_: Gate) -> Gate {
        Gate::Ite(Box::new(cond), Box::new(then), Box::new(else_))
    }
}

impl Gate {
    /// Value of the gate. Ports are looked up among the inputs first, then
    /// the registers; unknown ports are low.
    pub fn eval(&self, inputs: &PortValues, registers: &PortValues) -> bool {
        match self {
            Gate::Const(b) => *b,
            Gate::Port(name) => inputs.get(name).or_else(|| registers.get(name)).copied().unwrap_or(false),
            Gate::Not(a) => !a.eval(inputs, registers),
            Gate::And(a, b) => a.eval(inputs, registers) && b.eval(inputs, registers),
            Gate::Or(a, b) => a.eval(inputs, registers) || b.eval(inputs, registers),
            Gate::Xor(a, b) => a.eval(inputs, registers) ^ b.eval(inputs, registers),
            Gate::Ite(c, t, e) => {
                if c.eval(inputs, registers) {
                    t.eval(inputs, registers)
                } else {
                    e.eval(inputs, registers)
                }
            }
        }
    }

    /// Names of all ports the gate reads.
    pub fn ports(&self) -> BTreeSet<&str> {
        let mut result = BTreeSet::new();
        let mut stack = vec![self];
        while let Some(g) = stack.pop() {
            match g {
                Gate::Const(_) => {}
                Gate::Port(name) => {
                    result.insert(name.as_str());
                }
                Gate::Not(a) => stack.push(a),
                Gate::And(a, b) | Gate::Or(a, b) | Gate::Xor(a, b) => {
                    stack.push(a);
                    stack.push(b);
                }
                Gate::Ite(a, b, c) => {
                    stack.push(a);
                    stack.push(b);
                    stack.push(c);
                }
            }
        }
        result
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gate::Const(b) => write!(f, "{}", if *b { "1" } else { "0" }),
            Gate::Port(name) => write!(f, "{}", name),
            Gate::Not(a) => write!(f, "~{}", a),
            Gate::And(a, b) => write!(f, "({} & {})", a, b),
            Gate::Or(a, b) => write!(f, "({} | {})", a, b),
            Gate::Xor(a, b) => write!(f, "({} ^ {})", a, b),
            Gate::Ite(c, t, e) => write!(f, "ite({}, {}, {})", c, t, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    fn values(items: &[(&str, bool)]) -> PortValues {
        items.iter().map(|&(k, v)| (k.to_string(), v)).collect()
    }

    #[test]
    fn test_eval() {
        let g = Gate::xor(Gate::port("x"), Gate::port("r"));
        assert!(g.eval(&values(&[("x", true)]), &values(&[("r", false)])));
        assert!(!g.eval(&values(&[("x", true)]), &values(&[("r", true)])));
        assert!(!g.eval(&PortValues::new(), &PortValues::new()));
    }

    #[test]
    fn test_not_simplifies() {
        let g = Gate::not(Gate::not(Gate::port("x")));
        assert_eq!(g, Gate::port("x"));
        assert_eq!(Gate::not(Gate::Const(true)), Gate::Const(false));
    }

    #[test]
    fn test_ports_and_display() {
        let g = Gate::ite(Gate::port("c"), Gate::and(Gate::port("a"), Gate::port("b")), Gate::Const(false));
        assert_eq!(g.ports(), BTreeSet::from(["a", "b", "c"]));
        assert_eq!(g.to_string(), "ite(c, (a & b), 0)");
    }
}
