//! Channel systems: program graphs running side by side over one shared
//! memory and communicating through channels.
//!
//! Channel operations are recognized from the rendered action text alone:
//! `c?x` reads channel `c`, `c!e` writes to it, and a leading `_` marks a
//! rendezvous channel whose reads and writes only happen as a pair.

use crate::memory::{Memory, Value};
use crate::program_graph::ProgramGraph;
use crate::types::Element;

/// Separator of the two halves of a combined rendezvous action.
pub const HANDSHAKE_SEPARATOR: &str = "|";

/// An ordered collection of program graphs sharing one memory.
#[derive(Debug, Clone)]
pub struct ChannelSystem<L, A> {
    program_graphs: Vec<ProgramGraph<L, A>>,
}

impl<L, A> ChannelSystem<L, A> {
    pub fn new() -> Self {
        ChannelSystem {
            program_graphs: Vec::new(),
        }
    }

    pub fn add_program_graph(&mut self, pg: ProgramGraph<L, A>) {
        self.program_graphs.push(pg);
    }

    pub fn program_graphs(&self) -> &[ProgramGraph<L, A>] {
        &self.program_graphs
    }

    pub fn len(&self) -> usize {
        self.program_graphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.program_graphs.is_empty()
    }
}

impl<L, A> Default for ChannelSystem<L, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: Element, A: Element> PartialEq for ChannelSystem<L, A> {
    fn eq(&self, other: &Self) -> bool {
        self.program_graphs == other.program_graphs
    }
}

impl<L: Element, A: Element> Eq for ChannelSystem<L, A> {}

impl<L, A> FromIterator<ProgramGraph<L, A>> for ChannelSystem<L, A> {
    fn from_iter<T: IntoIterator<Item = ProgramGraph<L, A>>>(iter: T) -> Self {
        ChannelSystem {
            program_graphs: iter.into_iter().collect(),
        }
    }
}

/// Whether the action belongs to a rendezvous channel.
pub fn is_rendezvous(action: &str) -> bool {
    action.starts_with('_')
}

/// Channel read by the action, if it is a read.
pub fn channel_read(action: &str) -> Option<&str> {
    action.split_once('?').map(|(channel, _)| channel.trim())
}

/// Channel written by the action, if it is a write.
pub fn channel_write(action: &str) -> Option<&str> {
    action.split_once('!').map(|(channel, _)| channel.trim())
}

/// Whether `receive` reads the same rendezvous channel that `send` writes.
pub fn is_handshake_pair(receive: &str, send: &str) -> bool {
    if !is_rendezvous(receive) || !is_rendezvous(send) {
        return false;
    }
    match (channel_read(receive), channel_write(send)) {
        (Some(c), Some(d)) => c == d && channel_read(send).is_none(),
        _ => false,
    }
}

/// Label of a rendezvous between the actions of two components, the
/// lower-indexed component's action first.
pub fn handshake_label(i: usize, a: &str, j: usize, b: &str) -> String {
    if i < j {
        format!("{}{}{}", a, HANDSHAKE_SEPARATOR, b)
    } else {
        format!("{}{}{}", b, HANDSHAKE_SEPARATOR, a)
    }
}

/// Whether a single component may execute the action on its own in the
/// given memory. Rendezvous halves never can; an asynchronous read needs a
/// non-empty queue.
pub fn is_feasible(memory: &Memory, action: &str) -> bool {
    if is_rendezvous(action) && (channel_read(action).is_some() || channel_write(action).is_some()) {
        return false;
    }
    match channel_read(action) {
        Some(channel) => matches!(memory.get(channel), Some(Value::Queue(q)) if !q.is_empty()),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use test_log::test;

    use super::*;

    #[test]
    fn test_recognition() {
        assert!(is_rendezvous("_c?x"));
        assert!(!is_rendezvous("c?x"));
        assert_eq!(channel_read("_c?x"), Some("_c"));
        assert_eq!(channel_write("_c!x + 1"), Some("_c"));
        assert_eq!(channel_read("x := 1"), None);
        assert!(is_handshake_pair("_c?x", "_c!5"));
        assert!(!is_handshake_pair("_c?x", "_d!5"));
        assert!(!is_handshake_pair("c?x", "c!5"));
        assert!(!is_handshake_pair("_c!5", "_c?x"));
    }

    #[test]
    fn test_handshake_label_order() {
        assert_eq!(handshake_label(0, "_c?x", 1, "_c!5"), "_c?x|_c!5");
        assert_eq!(handshake_label(2, "_c?x", 1, "_c!5"), "_c!5|_c?x");
    }

    #[test]
    fn test_feasibility() {
        let empty = Memory::new();
        assert!(is_feasible(&empty, "x := 1"));
        assert!(is_feasible(&empty, "c!1"));
        assert!(!is_feasible(&empty, "c?x"));
        assert!(!is_feasible(&empty, "_c?x"));
        assert!(!is_feasible(&empty, "_c!1"));
        let m = Memory::new().with("c", Value::Queue(VecDeque::from([1])));
        assert!(is_feasible(&m, "c?x"));
    }

    #[test]
    fn test_collect() {
        let cs: ChannelSystem<String, String> = vec![ProgramGraph::new(), ProgramGraph::new()].into_iter().collect();
        assert_eq!(cs.len(), 2);
    }
}
