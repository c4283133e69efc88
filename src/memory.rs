//! Variable valuations.

use std::collections::{BTreeMap, VecDeque};
use std::fmt;

/// Value of a single variable.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum Value {
    Int(i64),
    /// Contents of an asynchronous channel, front first.
    Queue(VecDeque<i64>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Queue(q) => {
                write!(f, "[")?;
                for (i, x) in q.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", x)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

/// A finite map from variable names to values.
///
/// Memories are compared and hashed structurally, so two memories binding
/// the same names to the same values are the same part of a state.
#[derive(Debug, Clone, Default, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Memory {
    bindings: BTreeMap<String, Value>,
}

impl Memory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.bindings.insert(name.into(), value.into());
    }

    /// Builder-style [`set`][Memory::set].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.bindings.iter()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// One `name = value` proposition per binding.
    pub fn propositions(&self) -> impl Iterator<Item = String> + '_ {
        self.bindings.iter().map(|(name, value)| format!("{} = {}", name, value))
    }
}

impl fmt::Display for Memory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, value)) in self.bindings.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} = {}", name, value)?;
        }
        write!(f, "}}")
    }
}

impl FromIterator<(String, Value)> for Memory {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Memory {
            bindings: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_structural_equality() {
        let a = Memory::new().with("x", 1).with("y", 2);
        let b = Memory::new().with("y", 2).with("x", 1);
        assert_eq!(a, b);
        assert_ne!(a, b.clone().with("x", 3));
    }

    #[test]
    fn test_display_and_propositions() {
        let mut m = Memory::new().with("x", 1);
        m.set("c", Value::Queue(VecDeque::from([4, 5])));
        assert_eq!(m.to_string(), "{c = [4, 5], x = 1}");
        assert_eq!(m.propositions().collect::<Vec<_>>(), vec!["c = [4, 5]", "x = 1"]);
    }
}
