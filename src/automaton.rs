//! Nondeterministic automata over label sets.
//!
//! The input symbols of a specification automaton are the label sets of the
//! transition system being checked: from `q`, reading the label `L(s)` of
//! the current state leads to any state in `δ(q, L(s))`.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::types::{Element, Label, Proposition};

/// Transition relation keyed by source state and input label.
type Delta<Q, P> = HashMap<Q, HashMap<Label<P>, HashSet<Q>>>;

/// A nondeterministic Büchi automaton.
#[derive(Debug, Clone)]
pub struct Automaton<Q, P> {
    states: HashSet<Q>,
    initial: HashSet<Q>,
    accepting: HashSet<Q>,
    transitions: Delta<Q, P>,
}

impl<Q, P> Automaton<Q, P> {
    pub fn new() -> Self {
        Automaton {
            states: HashSet::new(),
            initial: HashSet::new(),
            accepting: HashSet::new(),
            transitions: HashMap::new(),
        }
    }

    pub fn states(&self) -> &HashSet<Q> {
        &self.states
    }

    pub fn initial_states(&self) -> &HashSet<Q> {
        &self.initial
    }

    pub fn accepting_states(&self) -> &HashSet<Q> {
        &self.accepting
    }
}

impl<Q, P> Default for Automaton<Q, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Q: Element, P: Proposition> Automaton<Q, P> {
    pub fn add_state(&mut self, q: Q) {
        self.states.insert(q);
    }

    /// Add `source --label--> destination`, registering both states.
    pub fn add_transition(&mut self, source: Q, label: Label<P>, destination: Q) {
        self.states.insert(source.clone());
        self.states.insert(destination.clone());
        self.transitions
            .entry(source)
            .or_default()
            .entry(label)
            .or_default()
            .insert(destination);
    }

    /// Mark a state as initial, registering it.
    pub fn set_initial(&mut self, q: Q) {
        self.states.insert(q.clone());
        self.initial.insert(q);
    }

    /// Mark a state as accepting, registering it.
    pub fn set_accepting(&mut self, q: Q) {
        self.states.insert(q.clone());
        self.accepting.insert(q);
    }

    pub fn is_accepting(&self, q: &Q) -> bool {
        self.accepting.contains(q)
    }

    /// States reached from `q` by reading `label`.
    pub fn next_states<'a>(&'a self, q: &Q, label: &Label<P>) -> impl Iterator<Item = &'a Q> + 'a {
        self.transitions
            .get(q)
            .and_then(|by_label| by_label.get(label))
            .into_iter()
            .flatten()
    }

    /// All `(source, label, destination)` triples.
    pub fn transitions(&self) -> impl Iterator<Item = (&Q, &Label<P>, &Q)> {
        self.transitions
            .iter()
            .flat_map(|(q, by_label)| by_label.iter().flat_map(move |(l, ds)| ds.iter().map(move |d| (q, l, d))))
    }
}

/// A generalized Büchi automaton: one accepting set per color.
#[derive(Debug, Clone)]
pub struct MultiColorAutomaton<Q, P> {
    states: HashSet<Q>,
    initial: HashSet<Q>,
    accepting: BTreeMap<usize, HashSet<Q>>,
    transitions: Delta<Q, P>,
}

impl<Q, P> MultiColorAutomaton<Q, P> {
    pub fn new() -> Self {
        MultiColorAutomaton {
            states: HashSet::new(),
            initial: HashSet::new(),
            accepting: BTreeMap::new(),
            transitions: HashMap::new(),
        }
    }

    pub fn states(&self) -> &HashSet<Q> {
        &self.states
    }

    pub fn initial_states(&self) -> &HashSet<Q> {
        &self.initial
    }

    /// Colors in increasing order.
    pub fn colors(&self) -> impl Iterator<Item = usize> + '_ {
        self.accepting.keys().copied()
    }
}

impl<Q, P> Default for MultiColorAutomaton<Q, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Q: Element, P: Proposition> MultiColorAutomaton<Q, P> {
    pub fn add_state(&mut self, q: Q) {
        self.states.insert(q);
    }

    pub fn add_transition(&mut self, source: Q, label: Label<P>, destination: Q) {
        self.states.insert(source.clone());
        self.states.insert(destination.clone());
        self.transitions
            .entry(source)
            .or_default()
            .entry(label)
            .or_default()
            .insert(destination);
    }

    pub fn set_initial(&mut self, q: Q) {
        self.states.insert(q.clone());
        self.initial.insert(q);
    }

    pub fn set_accepting(&mut self, q: Q, color: usize) {
        self.states.insert(q.clone());
        self.accepting.entry(color).or_default().insert(q);
    }

    /// Accepting states of a color; empty for an unknown color.
    pub fn accepting_states(&self, color: usize) -> HashSet<Q> {
        self.accepting.get(&color).cloned().unwrap_or_default()
    }

    pub fn next_states<'a>(&'a self, q: &Q, label: &Label<P>) -> impl Iterator<Item = &'a Q> + 'a {
        self.transitions
            .get(q)
            .and_then(|by_label| by_label.get(label))
            .into_iter()
            .flatten()
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_next_states() {
        let mut aut: Automaton<u32, &str> = Automaton::new();
        aut.set_initial(0);
        aut.set_accepting(1);
        aut.add_transition(0, Label::from(["p"]), 1);
        aut.add_transition(0, Label::new(), 0);
        aut.add_transition(1, Label::from(["p"]), 1);

        assert_eq!(aut.states(), &HashSet::from([0, 1]));
        let next: Vec<_> = aut.next_states(&0, &Label::from(["p"])).collect();
        assert_eq!(next, vec![&1]);
        assert_eq!(aut.next_states(&1, &Label::new()).count(), 0);
        assert_eq!(aut.next_states(&7, &Label::new()).count(), 0);
        assert_eq!(aut.transitions().count(), 3);
        assert!(aut.is_accepting(&1));
    }

    #[test]
    fn test_multi_color() {
        let mut aut: MultiColorAutomaton<&str, &str> = MultiColorAutomaton::new();
        aut.set_initial("a");
        aut.set_accepting("a", 0);
        aut.set_accepting("b", 1);
        aut.add_transition("a", Label::from(["p"]), "b");
        assert_eq!(aut.colors().collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(aut.accepting_states(1), HashSet::from(["b"]));
        assert!(aut.accepting_states(5).is_empty());
        assert_eq!(aut.next_states(&"a", &Label::from(["p"])).count(), 1);
    }
}
