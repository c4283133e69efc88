//! Evaluation of guard and action texts against a [`Memory`].
//!
//! Program graphs keep their guards and actions as plain text, so the
//! semantics of a model is only fixed once a set of [`Evaluator`]s is chosen.
//! An [`Evaluators`] collection asks each plug-in in turn and uses the first
//! one that recognizes the text.

use std::collections::VecDeque;

use log::trace;

use crate::ast::{Action, BinaryOp, Expr, UnaryOp};
use crate::error::{Error, Result};
use crate::memory::{Memory, Value};
use crate::parser::{parse_action, parse_expr, parse_handshake};

/// Values that can be evaluated in a memory.
pub trait Eval {
    fn eval(&self, memory: &Memory) -> Result<i64>;
}

fn truth(b: bool) -> i64 {
    i64::from(b)
}

fn read_int(memory: &Memory, name: &str) -> Result<i64> {
    match memory.get(name) {
        None => Ok(0),
        Some(Value::Int(n)) => Ok(*n),
        Some(Value::Queue(_)) => Err(Error::evaluation(format!("channel {} used as an integer", name))),
    }
}

impl Eval for Expr {
    fn eval(&self, memory: &Memory) -> Result<i64> {
        match self {
            Expr::Int(n) => Ok(*n),
            Expr::Bool(b) => Ok(truth(*b)),
            Expr::Var(name) => read_int(memory, name),
            Expr::Unary(UnaryOp::Not, e) => Ok(truth(e.eval(memory)? == 0)),
            Expr::Unary(UnaryOp::Neg, e) => e
                .eval(memory)?
                .checked_neg()
                .ok_or_else(|| Error::evaluation(format!("overflow in {}", self))),
            Expr::Binary(op, lhs, rhs) => {
                let a = lhs.eval(memory)?;
                match op {
                    BinaryOp::And if a == 0 => return Ok(0),
                    BinaryOp::Or if a != 0 => return Ok(1),
                    _ => {}
                }
                let b = rhs.eval(memory)?;
                let overflow = || Error::evaluation(format!("overflow in {}", self));
                match op {
                    BinaryOp::And | BinaryOp::Or => Ok(truth(b != 0)),
                    BinaryOp::Eq => Ok(truth(a == b)),
                    BinaryOp::Ne => Ok(truth(a != b)),
                    BinaryOp::Lt => Ok(truth(a < b)),
                    BinaryOp::Le => Ok(truth(a <= b)),
                    BinaryOp::Gt => Ok(truth(a > b)),
                    BinaryOp::Ge => Ok(truth(a >= b)),
                    BinaryOp::Add => a.checked_add(b).ok_or_else(overflow),
                    BinaryOp::Sub => a.checked_sub(b).ok_or_else(overflow),
                    BinaryOp::Mul => a.checked_mul(b).ok_or_else(overflow),
                    BinaryOp::Div | BinaryOp::Mod if b == 0 => {
                        Err(Error::evaluation(format!("division by zero in {}", self)))
                    }
                    BinaryOp::Div => a.checked_div(b).ok_or_else(overflow),
                    BinaryOp::Mod => a.checked_rem(b).ok_or_else(overflow),
                }
            }
        }
    }
}

/// A plug-in interpreting guard and action texts.
///
/// Both methods return `None` when the text is not in the language the
/// evaluator understands, letting the next evaluator try.
pub trait Evaluator {
    fn evaluate(&self, memory: &Memory, condition: &str) -> Option<Result<bool>>;
    fn effect(&self, memory: &Memory, action: &str) -> Option<Result<Memory>>;
}

/// Guards, `skip`, assignments and `atomic{...}` blocks.
#[derive(Debug, Copy, Clone, Default)]
pub struct NanoPromelaEvaluator;

impl NanoPromelaEvaluator {
    fn apply(memory: &Memory, action: &Action) -> Option<Result<Memory>> {
        match action {
            Action::Skip => Some(Ok(memory.clone())),
            Action::Assign(var, expr) => Some(expr.eval(memory).map(|v| memory.clone().with(var.clone(), v))),
            Action::Atomic(assignments) => {
                let mut result = memory.clone();
                for (var, expr) in assignments {
                    match expr.eval(&result) {
                        Ok(v) => result.set(var.clone(), v),
                        Err(e) => return Some(Err(e)),
                    }
                }
                Some(Ok(result))
            }
            Action::Receive { .. } | Action::Send { .. } => None,
        }
    }
}

impl Evaluator for NanoPromelaEvaluator {
    fn evaluate(&self, memory: &Memory, condition: &str) -> Option<Result<bool>> {
        if condition.trim().is_empty() {
            return Some(Ok(true));
        }
        let expr = parse_expr(condition).ok()?;
        Some(expr.eval(memory).map(|v| v != 0))
    }

    fn effect(&self, memory: &Memory, action: &str) -> Option<Result<Memory>> {
        if action.trim().is_empty() {
            return Some(Ok(memory.clone()));
        }
        let action = parse_action(action).ok()?;
        Self::apply(memory, &action)
    }
}

/// Asynchronous channel operations `c?x`, `c!e` and rendezvous handshakes
/// `_c?x|_c!e`.
#[derive(Debug, Copy, Clone, Default)]
pub struct ChannelEvaluator;

fn read_queue(memory: &Memory, channel: &str) -> Result<VecDeque<i64>> {
    match memory.get(channel) {
        None => Ok(VecDeque::new()),
        Some(Value::Queue(q)) => Ok(q.clone()),
        Some(Value::Int(_)) => Err(Error::evaluation(format!("variable {} used as a channel", channel))),
    }
}

impl ChannelEvaluator {
    fn send(memory: &Memory, channel: &str, value: &Expr) -> Result<Memory> {
        let mut queue = read_queue(memory, channel)?;
        queue.push_back(value.eval(memory)?);
        Ok(memory.clone().with(channel, Value::Queue(queue)))
    }

    fn receive(memory: &Memory, channel: &str, target: &str) -> Result<Memory> {
        let mut queue = read_queue(memory, channel)?;
        let value = queue
            .pop_front()
            .ok_or_else(|| Error::evaluation(format!("receive from empty channel {}", channel)))?;
        Ok(memory.clone().with(channel, Value::Queue(queue)).with(target, value))
    }

    fn handshake(memory: &Memory, first: &Action, second: &Action) -> Result<Memory> {
        let (receive, send) = match (first, second) {
            (r @ Action::Receive { .. }, s @ Action::Send { .. }) => (r, s),
            (s @ Action::Send { .. }, r @ Action::Receive { .. }) => (r, s),
            _ => return Err(Error::evaluation(format!("{}|{} is not a send/receive pair", first, second))),
        };
        match (receive, send) {
            (Action::Receive { channel: c1, target }, Action::Send { channel: c2, value }) if c1 == c2 => {
                let v = value.eval(memory)?;
                trace!("handshake on {}: {} := {}", c1, target, v);
                Ok(memory.clone().with(target.clone(), v))
            }
            _ => Err(Error::evaluation(format!(
                "{}|{} do not use the same channel",
                first, second
            ))),
        }
    }
}

impl Evaluator for ChannelEvaluator {
    fn evaluate(&self, _memory: &Memory, _condition: &str) -> Option<Result<bool>> {
        None
    }

    fn effect(&self, memory: &Memory, action: &str) -> Option<Result<Memory>> {
        if let Ok(parsed) = parse_action(action) {
            return match parsed {
                Action::Receive { channel, .. } | Action::Send { channel, .. } if channel.starts_with('_') => {
                    Some(Err(Error::evaluation(format!(
                        "rendezvous action {} cannot execute on its own",
                        action
                    ))))
                }
                Action::Receive { channel, target } => Some(Self::receive(memory, &channel, &target)),
                Action::Send { channel, value } => Some(Self::send(memory, &channel, &value)),
                _ => None,
            };
        }
        let (first, second) = parse_handshake(action).ok()?;
        Some(Self::handshake(memory, &first, &second))
    }
}

/// An ordered collection of evaluators; the first that recognizes a text wins.
pub struct Evaluators {
    evaluators: Vec<Box<dyn Evaluator>>,
}

impl Evaluators {
    /// A collection without any evaluator. Every text is unrecognized.
    pub fn empty() -> Self {
        Evaluators { evaluators: Vec::new() }
    }

    /// Assignments, guards and channel operations.
    pub fn nano_promela() -> Self {
        Self::empty().with(NanoPromelaEvaluator).with(ChannelEvaluator)
    }

    pub fn push(&mut self, evaluator: impl Evaluator + 'static) {
        self.evaluators.push(Box::new(evaluator));
    }

    pub fn with(mut self, evaluator: impl Evaluator + 'static) -> Self {
        self.push(evaluator);
        self
    }

    pub fn len(&self) -> usize {
        self.evaluators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.evaluators.is_empty()
    }

    /// Truth value of a guard in the given memory.
    pub fn evaluate(&self, memory: &Memory, condition: &str) -> Result<bool> {
        self.evaluators
            .iter()
            .find_map(|e| e.evaluate(memory, condition))
            .unwrap_or_else(|| {
                Err(Error::UnrecognizedSyntax {
                    text: condition.to_string(),
                })
            })
    }

    /// Memory after executing an action.
    pub fn effect(&self, memory: &Memory, action: &str) -> Result<Memory> {
        self.evaluators
            .iter()
            .find_map(|e| e.effect(memory, action))
            .unwrap_or_else(|| {
                Err(Error::UnrecognizedSyntax {
                    text: action.to_string(),
                })
            })
    }

    /// Execute a sequence of actions starting from the empty memory.
    pub fn initial_memory(&self, actions: &[String]) -> Result<Memory> {
        actions
            .iter()
            .try_fold(Memory::new(), |memory, action| self.effect(&memory, action))
    }
}

impl Default for Evaluators {
    fn default() -> Self {
        Self::nano_promela()
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_expr_eval() {
        let m = Memory::new().with("x", 3);
        assert_eq!(parse_expr("x * 2 + 1").unwrap().eval(&m).unwrap(), 7);
        assert_eq!(parse_expr("x % 2 == 1 && y == 0").unwrap().eval(&m).unwrap(), 1);
        assert_eq!(parse_expr("-x").unwrap().eval(&m).unwrap(), -3);
        assert!(parse_expr("x / 0").unwrap().eval(&m).is_err());
    }

    #[test]
    fn test_guards() {
        let ev = Evaluators::nano_promela();
        let m = Memory::new().with("x", 1);
        assert!(ev.evaluate(&m, "").unwrap());
        assert!(ev.evaluate(&m, "true").unwrap());
        assert!(ev.evaluate(&m, "(x == 1) && (true)").unwrap());
        assert!(!ev.evaluate(&m, "!((x == 1) || (false))").unwrap());
    }

    #[test]
    fn test_assignments() {
        let ev = Evaluators::nano_promela();
        let m = ev.effect(&Memory::new(), "x := 5").unwrap();
        assert_eq!(m, Memory::new().with("x", 5));
        let m = ev.effect(&m, "atomic{y := x + 1; x := y * 2}").unwrap();
        assert_eq!(m, Memory::new().with("x", 12).with("y", 6));
        assert_eq!(ev.effect(&m, "skip").unwrap(), m);
        assert_eq!(ev.effect(&m, "").unwrap(), m);
    }

    #[test]
    fn test_async_channels() {
        let ev = Evaluators::nano_promela();
        let m = ev.effect(&Memory::new(), "c!1").unwrap();
        let m = ev.effect(&m, "c!2").unwrap();
        assert_eq!(m.get("c"), Some(&Value::Queue(VecDeque::from([1, 2]))));
        let m = ev.effect(&m, "c?x").unwrap();
        assert_eq!(m.get("x"), Some(&Value::Int(1)));
        assert_eq!(m.get("c"), Some(&Value::Queue(VecDeque::from([2]))));
        let m = ev.effect(&m, "c?x").unwrap();
        assert!(ev.effect(&m, "c?x").is_err());
    }

    #[test]
    fn test_handshake() {
        let ev = Evaluators::nano_promela();
        let m = Memory::new().with("y", 4);
        let m1 = ev.effect(&m, "_c?x|_c!y + 1").unwrap();
        assert_eq!(m1.get("x"), Some(&Value::Int(5)));
        let m2 = ev.effect(&m, "_c!y + 1|_c?x").unwrap();
        assert_eq!(m1, m2);
        assert!(ev.effect(&m, "_c?x|_d!1").is_err());
        assert!(ev.effect(&m, "_c?x").is_err());
    }

    #[test]
    fn test_unrecognized() {
        let ev = Evaluators::nano_promela();
        assert!(matches!(
            ev.effect(&Memory::new(), "launch missiles"),
            Err(Error::UnrecognizedSyntax { .. })
        ));
        assert!(matches!(
            Evaluators::empty().evaluate(&Memory::new(), "true"),
            Err(Error::UnrecognizedSyntax { .. })
        ));
    }

    struct Always;

    impl Evaluator for Always {
        fn evaluate(&self, _memory: &Memory, _condition: &str) -> Option<Result<bool>> {
            Some(Ok(false))
        }

        fn effect(&self, memory: &Memory, _action: &str) -> Option<Result<Memory>> {
            Some(Ok(memory.clone().with("touched", 1)))
        }
    }

    #[test]
    fn test_first_evaluator_wins() {
        let ev = Evaluators::empty().with(Always).with(NanoPromelaEvaluator);
        assert!(!ev.evaluate(&Memory::new(), "true").unwrap());
        let m = ev.effect(&Memory::new(), "x := 1").unwrap();
        assert_eq!(m, Memory::new().with("touched", 1));
    }

    #[test]
    fn test_initial_memory() {
        let ev = Evaluators::nano_promela();
        let m = ev.initial_memory(&["x := 1".to_string(), "y := x + 1".to_string()]).unwrap();
        assert_eq!(m, Memory::new().with("x", 1).with("y", 2));
        assert_eq!(ev.initial_memory(&[]).unwrap(), Memory::new());
    }
}
