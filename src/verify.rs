//! Automata-based verification of ω-regular properties.
//!
//! The specification automaton accepts the *bad* behaviours. A transition
//! system violates the property iff the product of the system with the
//! automaton has a reachable cycle through an accepting state. On violation
//! a lasso-shaped counterexample is reconstructed: a shortest prefix from an
//! initial state to the accepting state, and a shortest cycle from that
//! state back to itself.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

use log::{debug, info};

use crate::automaton::Automaton;
use crate::error::Result;
use crate::semantics::{explore, ExploreConfig};
use crate::transition::TransitionSystem;
use crate::types::{Element, Proposition};

/// A lasso witness of a violation, projected to states of the checked
/// system.
///
/// `prefix` leads from an initial state to the accepting state, which is its
/// last element. `cycle` starts at that same state and returns to it; the
/// closing repetition is omitted.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Counterexample<S> {
    pub prefix: Vec<S>,
    pub cycle: Vec<S>,
}

impl<S: fmt::Debug> fmt::Display for Counterexample<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Lasso counterexample (prefix: {} states, cycle: {} states):",
            self.prefix.len(),
            self.cycle.len()
        )?;
        writeln!(f, "  Prefix:")?;
        for (i, state) in self.prefix.iter().enumerate() {
            writeln!(f, "    Step {}: {:?}", i, state)?;
        }
        writeln!(f, "  Cycle (repeats forever):")?;
        for (i, state) in self.cycle.iter().enumerate() {
            writeln!(f, "    Step {}: {:?}", i, state)?;
        }
        Ok(())
    }
}

/// Outcome of [`verify_omega_regular_property`].
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum VerificationResult<S> {
    Succeeded,
    Failed(Counterexample<S>),
}

impl<S> VerificationResult<S> {
    pub fn is_succeeded(&self) -> bool {
        matches!(self, VerificationResult::Succeeded)
    }

    pub fn counterexample(&self) -> Option<&Counterexample<S>> {
        match self {
            VerificationResult::Succeeded => None,
            VerificationResult::Failed(c) => Some(c),
        }
    }
}

impl<S: fmt::Debug> fmt::Display for VerificationResult<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerificationResult::Succeeded => writeln!(f, "Property holds"),
            VerificationResult::Failed(c) => {
                writeln!(f, "Property violated")?;
                write!(f, "{}", c)
            }
        }
    }
}

/// Product of a transition system with a specification automaton.
///
/// A product state `(s, q)` means the automaton is in `q` after reading the
/// labels of the path up to and including `s`. Product states are labeled by
/// their automaton component.
pub fn product<S, A, P, Q>(
    ts: &TransitionSystem<S, A, P>,
    aut: &Automaton<Q, P>,
) -> Result<TransitionSystem<(S, Q), A, Q>>
where
    S: Element,
    A: Element,
    P: Proposition,
    Q: Proposition,
{
    let mut initial: Vec<(S, Q)> = Vec::new();
    for s in ts.initial_states() {
        let label = ts.label(s)?;
        for q0 in aut.initial_states() {
            for q in aut.next_states(q0, label) {
                initial.push((s.clone(), q.clone()));
            }
        }
    }

    let mut result = explore(initial, &ExploreConfig::default(), |(s, q): &(S, Q)| {
        let mut moves = Vec::new();
        for (a, t) in ts.outgoing(s) {
            let label = ts.label(t)?;
            for r in aut.next_states(q, label) {
                moves.push((a.clone(), (t.clone(), r.clone())));
            }
        }
        Ok(moves)
    })?;

    result.add_actions(ts.actions().iter().cloned());
    result.add_atomic_propositions(aut.states().iter().cloned());
    let states: Vec<(S, Q)> = result.states().iter().cloned().collect();
    for s in &states {
        result.add_label(s, s.1.clone())?;
    }

    debug!(
        "product of {} states x {} automaton states: {} states, {} transitions",
        ts.states().len(),
        aut.states().len(),
        result.states().len(),
        result.transitions().len()
    );
    Ok(result)
}

/// Check a transition system against an automaton accepting the violating
/// behaviours.
pub fn verify_omega_regular_property<S, A, P, Q>(
    ts: &TransitionSystem<S, A, P>,
    aut: &Automaton<Q, P>,
) -> Result<VerificationResult<S>>
where
    S: Element,
    A: Element,
    P: Proposition,
    Q: Proposition,
{
    let prod = product(ts, aut)?;
    let successors = |x: &(S, Q)| -> Vec<(S, Q)> { prod.outgoing(x).map(|(_, t)| t.clone()).collect() };

    // Candidates in breadth-first order, so the shortest prefixes come first.
    let order = bfs_order(prod.initial_states().iter().cloned(), &successors);
    for candidate in order.iter().filter(|(_, q)| aut.is_accepting(q)) {
        let Some(back) = shortest_path(successors(candidate), candidate, &successors) else {
            continue;
        };
        let Some(prefix) = shortest_path(prod.initial_states().iter().cloned(), candidate, &successors) else {
            continue;
        };

        let mut cycle = vec![candidate.clone()];
        cycle.extend(back.into_iter().take_while(|x| x != candidate));
        let counterexample = Counterexample {
            prefix: prefix.into_iter().map(|(s, _)| s).collect(),
            cycle: cycle.into_iter().map(|(s, _)| s).collect(),
        };
        info!(
            "property violated: prefix of {} states, cycle of {} states",
            counterexample.prefix.len(),
            counterexample.cycle.len()
        );
        return Ok(VerificationResult::Failed(counterexample));
    }

    info!("property holds on {} product states", prod.states().len());
    Ok(VerificationResult::Succeeded)
}

/// All states reachable from the seeds, in breadth-first discovery order.
fn bfs_order<T, F>(seeds: impl IntoIterator<Item = T>, successors: &F) -> Vec<T>
where
    T: Element,
    F: Fn(&T) -> Vec<T>,
{
    let mut visited: HashSet<T> = HashSet::new();
    let mut order = Vec::new();
    let mut queue = VecDeque::new();
    for s in seeds {
        if visited.insert(s.clone()) {
            queue.push_back(s);
        }
    }
    while let Some(s) = queue.pop_front() {
        for t in successors(&s) {
            if visited.insert(t.clone()) {
                queue.push_back(t);
            }
        }
        order.push(s);
    }
    order
}

/// A shortest path from one of the sources to the target, both ends
/// included.
fn shortest_path<T, F>(sources: impl IntoIterator<Item = T>, target: &T, successors: &F) -> Option<Vec<T>>
where
    T: Element,
    F: Fn(&T) -> Vec<T>,
{
    let mut parent: HashMap<T, Option<T>> = HashMap::new();
    let mut queue = VecDeque::new();
    for s in sources {
        if !parent.contains_key(&s) {
            parent.insert(s.clone(), None);
            queue.push_back(s);
        }
    }
    while let Some(s) = queue.pop_front() {
        if &s == target {
            let mut path = vec![s];
            while let Some(Some(p)) = path.last().and_then(|x| parent.get(x)) {
                path.push(p.clone());
            }
            path.reverse();
            return Some(path);
        }
        for t in successors(&s) {
            if !parent.contains_key(&t) {
                parent.insert(t.clone(), Some(s.clone()));
                queue.push_back(t);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::transition::Transition;
    use crate::types::Label;

    /// Automaton accepting every word that eventually contains `p` forever.
    fn eventually_p() -> Automaton<u32, &'static str> {
        let mut aut = Automaton::new();
        aut.set_initial(0);
        aut.set_accepting(1);
        aut.add_transition(0, Label::new(), 0);
        aut.add_transition(0, Label::from(["p"]), 1);
        aut.add_transition(1, Label::from(["p"]), 1);
        aut
    }

    fn single_state(labeled: bool) -> TransitionSystem<&'static str, &'static str, &'static str> {
        let mut ts = TransitionSystem::new();
        ts.add_state("s");
        ts.add_initial_state("s").unwrap();
        ts.add_action("a");
        ts.add_atomic_proposition("p");
        ts.add_transition(Transition::new("s", "a", "s")).unwrap();
        if labeled {
            ts.add_label(&"s", "p").unwrap();
        }
        ts
    }

    #[test]
    fn test_single_state_violation() {
        let mut aut = Automaton::new();
        aut.set_initial(0);
        aut.set_accepting(1);
        aut.add_transition(0, Label::from(["p"]), 1);
        aut.add_transition(1, Label::from(["p"]), 1);

        let result = verify_omega_regular_property(&single_state(true), &aut).unwrap();
        assert_eq!(
            result,
            VerificationResult::Failed(Counterexample {
                prefix: vec!["s"],
                cycle: vec!["s"],
            })
        );

        let result = verify_omega_regular_property(&single_state(false), &aut).unwrap();
        assert!(result.is_succeeded());
        assert!(result.counterexample().is_none());
    }

    #[test]
    fn test_product_labels() {
        let ts = single_state(true);
        let prod = product(&ts, &eventually_p()).unwrap();
        assert_eq!(prod.states(), &HashSet::from([("s", 1)]));
        assert_eq!(prod.initial_states(), &HashSet::from([("s", 1)]));
        assert_eq!(prod.label(&("s", 1)).unwrap(), &Label::from([1]));
        assert_eq!(prod.transitions().len(), 1);
    }

    /// `0 -> 1 -> 2 -> 3 -> 1`, with `p` holding in 2 and 3 only.
    fn lasso_system(p_in_one: bool) -> TransitionSystem<u32, &'static str, &'static str> {
        let mut ts = TransitionSystem::new();
        ts.add_states([0, 1, 2, 3]);
        ts.add_initial_state(0).unwrap();
        ts.add_action("t");
        ts.add_atomic_proposition("p");
        for (from, to) in [(0, 1), (1, 2), (2, 3), (3, 1)] {
            ts.add_transition(Transition::new(from, "t", to)).unwrap();
        }
        ts.add_label(&2, "p").unwrap();
        ts.add_label(&3, "p").unwrap();
        if p_in_one {
            ts.add_label(&1, "p").unwrap();
        }
        ts
    }

    #[test]
    fn test_lasso_counterexample() {
        // p forever from state 1 on
        let result = verify_omega_regular_property(&lasso_system(true), &eventually_p()).unwrap();
        let c = result.counterexample().unwrap();
        assert_eq!(c.cycle.len(), 3);
        assert_eq!(c.prefix.first(), Some(&0));
        assert_eq!(c.prefix.last(), c.cycle.first());

        // The cycle is a real cycle of the system.
        let ts = lasso_system(true);
        for (i, s) in c.cycle.iter().enumerate() {
            let next = &c.cycle[(i + 1) % c.cycle.len()];
            assert!(ts.post(s).unwrap().contains(next));
        }
        for w in c.prefix.windows(2) {
            assert!(ts.post(&w[0]).unwrap().contains(&w[1]));
        }
    }

    #[test]
    fn test_lasso_holds_when_p_is_interrupted() {
        // State 1 breaks p on every round, so p never holds forever.
        let result = verify_omega_regular_property(&lasso_system(false), &eventually_p()).unwrap();
        assert!(result.is_succeeded());
    }

    #[test]
    fn test_display() {
        let c = Counterexample {
            prefix: vec![0, 1],
            cycle: vec![1],
        };
        let text = VerificationResult::Failed(c).to_string();
        assert!(text.starts_with("Property violated\nLasso counterexample (prefix: 2 states, cycle: 1 states):"));
        assert!(text.contains("    Step 1: 1\n"));
    }
}
