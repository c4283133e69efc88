//! Labeled transition systems.
//!
//! A [`TransitionSystem`] is the explicit-state counterpart of a Kripke
//! structure with actions: a set of states, some of them initial, a set of
//! actions, a transition relation `S × A × S`, and a labeling function
//! mapping every state to the set of atomic propositions that hold in it.
//!
//! The store enforces referential integrity:
//! - initial states must be states,
//! - transition endpoints and actions must be registered,
//! - labels may only use registered states and propositions,
//! - nothing can be removed while something else still references it.
//!
//! Every failing mutation leaves the system unchanged.
//!
//! # Example
//!
//! ```
//! use fvm_rs::transition::{Transition, TransitionSystem};
//!
//! let mut ts: TransitionSystem<&str, &str, &str> = TransitionSystem::new();
//! ts.add_states(["off", "on"]);
//! ts.add_action("toggle");
//! ts.add_initial_state("off").unwrap();
//! ts.add_transition(Transition::new("off", "toggle", "on")).unwrap();
//! ts.add_transition(Transition::new("on", "toggle", "off")).unwrap();
//!
//! assert_eq!(ts.reach().len(), 2);
//! assert!(ts.is_action_deterministic());
//! ```

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

use log::trace;

use crate::error::{Error, ModelPart, Result};
use crate::types::{Element, Label, Proposition};

/// A single step `from --action--> to`.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Transition<S, A> {
    pub from: S,
    pub action: A,
    pub to: S,
}

impl<S, A> Transition<S, A> {
    pub fn new(from: S, action: A, to: S) -> Self {
        Transition { from, action, to }
    }
}

impl<S: fmt::Debug, A: fmt::Debug> fmt::Display for Transition<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} --{:?}--> {:?}", self.from, self.action, self.to)
    }
}

/// A non-empty alternating sequence `s0 a0 s1 a1 ... sn` of states and actions.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct AlternatingSequence<S, A> {
    head: S,
    steps: Vec<(A, S)>,
}

impl<S, A> AlternatingSequence<S, A> {
    /// A sequence consisting of a single state.
    pub fn new(head: S) -> Self {
        AlternatingSequence { head, steps: Vec::new() }
    }

    /// Append one `action, state` step.
    pub fn then(mut self, action: A, state: S) -> Self {
        self.steps.push((action, state));
        self
    }

    pub fn head(&self) -> &S {
        &self.head
    }

    pub fn last(&self) -> &S {
        self.steps.last().map_or(&self.head, |(_, s)| s)
    }

    pub fn steps(&self) -> &[(A, S)] {
        &self.steps
    }

    /// All states of the sequence, in order.
    pub fn states(&self) -> impl Iterator<Item = &S> {
        std::iter::once(&self.head).chain(self.steps.iter().map(|(_, s)| s))
    }

    /// All actions of the sequence, in order.
    pub fn actions(&self) -> impl Iterator<Item = &A> {
        self.steps.iter().map(|(a, _)| a)
    }

    /// Number of steps (actions) in the sequence.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// An explicit labeled transition system.
#[derive(Debug, Clone)]
pub struct TransitionSystem<S, A, P> {
    name: Option<String>,
    states: HashSet<S>,
    initial_states: HashSet<S>,
    actions: HashSet<A>,
    atomic_propositions: HashSet<P>,
    transitions: HashSet<Transition<S, A>>,
    /// Total over `states`: every state has an entry, possibly empty.
    labeling: HashMap<S, Label<P>>,
    /// Outgoing `(action, to)` pairs per state.
    successors: HashMap<S, HashSet<(A, S)>>,
    /// Incoming `(action, from)` pairs per state.
    predecessors: HashMap<S, HashSet<(A, S)>>,
}

impl<S, A, P> TransitionSystem<S, A, P> {
    pub fn new() -> Self {
        TransitionSystem {
            name: None,
            states: HashSet::new(),
            initial_states: HashSet::new(),
            actions: HashSet::new(),
            atomic_propositions: HashSet::new(),
            transitions: HashSet::new(),
            labeling: HashMap::new(),
            successors: HashMap::new(),
            predecessors: HashMap::new(),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    pub fn states(&self) -> &HashSet<S> {
        &self.states
    }

    pub fn initial_states(&self) -> &HashSet<S> {
        &self.initial_states
    }

    pub fn actions(&self) -> &HashSet<A> {
        &self.actions
    }

    pub fn atomic_propositions(&self) -> &HashSet<P> {
        &self.atomic_propositions
    }

    pub fn transitions(&self) -> &HashSet<Transition<S, A>> {
        &self.transitions
    }

    pub fn labeling_function(&self) -> &HashMap<S, Label<P>> {
        &self.labeling
    }
}

impl<S, A, P> Default for TransitionSystem<S, A, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Element, A: Element, P: Proposition> PartialEq for TransitionSystem<S, A, P> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.states == other.states
            && self.initial_states == other.initial_states
            && self.actions == other.actions
            && self.atomic_propositions == other.atomic_propositions
            && self.transitions == other.transitions
            && self.labeling == other.labeling
    }
}

impl<S: Element, A: Element, P: Proposition> Eq for TransitionSystem<S, A, P> {}

// Mutations
impl<S: Element, A: Element, P: Proposition> TransitionSystem<S, A, P> {
    /// Register a state. Registering an existing state is a no-op.
    pub fn add_state(&mut self, state: S) {
        self.labeling.entry(state.clone()).or_default();
        self.states.insert(state);
    }

    pub fn add_states(&mut self, states: impl IntoIterator<Item = S>) {
        for s in states {
            self.add_state(s);
        }
    }

    /// Remove a registered state that is neither initial, labeled, nor a
    /// transition endpoint.
    pub fn remove_state(&mut self, state: &S) -> Result<()> {
        self.check_state(state)?;
        let attached = |part| Error::DeletionOfAttachedState {
            item: format!("{:?}", state),
            part,
        };
        if self.initial_states.contains(state) {
            return Err(attached(ModelPart::InitialStates));
        }
        if self.labeling.get(state).is_some_and(|l| !l.is_empty()) {
            return Err(attached(ModelPart::LabelingFunction));
        }
        let has_out = self.successors.get(state).is_some_and(|s| !s.is_empty());
        let has_in = self.predecessors.get(state).is_some_and(|s| !s.is_empty());
        if has_out || has_in {
            return Err(attached(ModelPart::Transitions));
        }
        self.states.remove(state);
        self.labeling.remove(state);
        self.successors.remove(state);
        self.predecessors.remove(state);
        Ok(())
    }

    /// Mark a registered state as initial.
    pub fn add_initial_state(&mut self, state: S) -> Result<()> {
        if !self.states.contains(&state) {
            return Err(Error::InvalidInitialState(format!("{:?}", state)));
        }
        self.initial_states.insert(state);
        Ok(())
    }

    pub fn remove_initial_state(&mut self, state: &S) {
        self.initial_states.remove(state);
    }

    pub fn add_action(&mut self, action: A) {
        self.actions.insert(action);
    }

    pub fn add_actions(&mut self, actions: impl IntoIterator<Item = A>) {
        self.actions.extend(actions);
    }

    /// Remove an action that no transition uses.
    pub fn remove_action(&mut self, action: &A) -> Result<()> {
        if self.transitions.iter().any(|t| &t.action == action) {
            return Err(Error::DeletionOfAttachedAction {
                item: format!("{:?}", action),
                part: ModelPart::Transitions,
            });
        }
        self.actions.remove(action);
        Ok(())
    }

    pub fn add_atomic_proposition(&mut self, p: P) {
        self.atomic_propositions.insert(p);
    }

    pub fn add_atomic_propositions(&mut self, ps: impl IntoIterator<Item = P>) {
        self.atomic_propositions.extend(ps);
    }

    /// Remove an atomic proposition that labels no state.
    pub fn remove_atomic_proposition(&mut self, p: &P) -> Result<()> {
        if self.labeling.values().any(|l| l.contains(p)) {
            return Err(Error::DeletionOfAttachedAtomicProposition {
                item: format!("{:?}", p),
                part: ModelPart::LabelingFunction,
            });
        }
        self.atomic_propositions.remove(p);
        Ok(())
    }

    /// Add a transition between registered states under a registered action.
    pub fn add_transition(&mut self, t: Transition<S, A>) -> Result<()> {
        if !self.states.contains(&t.from) || !self.states.contains(&t.to) || !self.actions.contains(&t.action) {
            return Err(Error::InvalidTransition(t.to_string()));
        }
        self.successors
            .entry(t.from.clone())
            .or_default()
            .insert((t.action.clone(), t.to.clone()));
        self.predecessors
            .entry(t.to.clone())
            .or_default()
            .insert((t.action.clone(), t.from.clone()));
        self.transitions.insert(t);
        Ok(())
    }

    pub fn remove_transition(&mut self, t: &Transition<S, A>) {
        if self.transitions.remove(t) {
            if let Some(out) = self.successors.get_mut(&t.from) {
                out.remove(&(t.action.clone(), t.to.clone()));
            }
            if let Some(inc) = self.predecessors.get_mut(&t.to) {
                inc.remove(&(t.action.clone(), t.from.clone()));
            }
        }
    }

    /// Attach a registered proposition to a registered state's label.
    pub fn add_label(&mut self, state: &S, p: P) -> Result<()> {
        if !self.atomic_propositions.contains(&p) {
            return Err(Error::InvalidLabel {
                state: format!("{:?}", state),
                ap: format!("{:?}", p),
            });
        }
        match self.labeling.get_mut(state) {
            Some(label) => {
                label.insert(p);
                Ok(())
            }
            None => Err(Error::InvalidLabel {
                state: format!("{:?}", state),
                ap: format!("{:?}", p),
            }),
        }
    }

    pub fn remove_label(&mut self, state: &S, p: &P) {
        if let Some(label) = self.labeling.get_mut(state) {
            label.remove(p);
        }
    }
}

// Queries
impl<S: Element, A: Element, P: Proposition> TransitionSystem<S, A, P> {
    /// The label of a state.
    pub fn label(&self, state: &S) -> Result<&Label<P>> {
        self.labeling.get(state).ok_or_else(|| Error::state_not_found(state))
    }

    fn check_state(&self, state: &S) -> Result<()> {
        if self.states.contains(state) {
            Ok(())
        } else {
            Err(Error::state_not_found(state))
        }
    }

    fn check_action(&self, action: &A) -> Result<()> {
        if self.actions.contains(action) {
            Ok(())
        } else {
            Err(Error::action_not_found(action))
        }
    }

    /// Direct successors of a state.
    pub fn post(&self, state: &S) -> Result<HashSet<S>> {
        self.check_state(state)?;
        Ok(self
            .successors
            .get(state)
            .map(|out| out.iter().map(|(_, to)| to.clone()).collect())
            .unwrap_or_default())
    }

    /// Outgoing `(action, to)` pairs of a state; empty for unknown states.
    pub fn outgoing<'a>(&'a self, state: &S) -> impl Iterator<Item = (&'a A, &'a S)> + 'a {
        self.successors
            .get(state)
            .into_iter()
            .flat_map(|out| out.iter().map(|(a, to)| (a, to)))
    }

    /// Direct successors of a state under the given action.
    pub fn post_by(&self, state: &S, action: &A) -> Result<HashSet<S>> {
        self.check_state(state)?;
        self.check_action(action)?;
        Ok(self
            .successors
            .get(state)
            .map(|out| out.iter().filter(|(a, _)| a == action).map(|(_, to)| to.clone()).collect())
            .unwrap_or_default())
    }

    /// Direct successors of a set of states.
    pub fn post_all<'a>(&self, states: impl IntoIterator<Item = &'a S>) -> Result<HashSet<S>>
    where
        S: 'a,
    {
        let mut result = HashSet::new();
        for s in states {
            result.extend(self.post(s)?);
        }
        Ok(result)
    }

    /// Direct successors of a set of states under the given action.
    pub fn post_all_by<'a>(&self, states: impl IntoIterator<Item = &'a S>, action: &A) -> Result<HashSet<S>>
    where
        S: 'a,
    {
        self.check_action(action)?;
        let mut result = HashSet::new();
        for s in states {
            result.extend(self.post_by(s, action)?);
        }
        Ok(result)
    }

    /// Direct predecessors of a state.
    pub fn pre(&self, state: &S) -> Result<HashSet<S>> {
        self.check_state(state)?;
        Ok(self
            .predecessors
            .get(state)
            .map(|inc| inc.iter().map(|(_, from)| from.clone()).collect())
            .unwrap_or_default())
    }

    /// Direct predecessors of a state under the given action.
    pub fn pre_by(&self, state: &S, action: &A) -> Result<HashSet<S>> {
        self.check_state(state)?;
        self.check_action(action)?;
        Ok(self
            .predecessors
            .get(state)
            .map(|inc| inc.iter().filter(|(a, _)| a == action).map(|(_, from)| from.clone()).collect())
            .unwrap_or_default())
    }

    /// Direct predecessors of a set of states.
    pub fn pre_all<'a>(&self, states: impl IntoIterator<Item = &'a S>) -> Result<HashSet<S>>
    where
        S: 'a,
    {
        let mut result = HashSet::new();
        for s in states {
            result.extend(self.pre(s)?);
        }
        Ok(result)
    }

    /// Direct predecessors of a set of states under the given action.
    pub fn pre_all_by<'a>(&self, states: impl IntoIterator<Item = &'a S>, action: &A) -> Result<HashSet<S>>
    where
        S: 'a,
    {
        self.check_action(action)?;
        let mut result = HashSet::new();
        for s in states {
            result.extend(self.pre_by(s, action)?);
        }
        Ok(result)
    }

    /// States reachable from the initial states (initial states included).
    pub fn reach(&self) -> HashSet<S> {
        self.reach_from(self.initial_states.iter().cloned())
    }

    /// States reachable from the given seeds (seeds included).
    pub fn reach_from(&self, seeds: impl IntoIterator<Item = S>) -> HashSet<S> {
        let mut visited: HashSet<S> = HashSet::new();
        let mut worklist: VecDeque<S> = VecDeque::new();
        for s in seeds {
            if visited.insert(s.clone()) {
                worklist.push_back(s);
            }
        }
        while let Some(s) = worklist.pop_front() {
            if let Some(out) = self.successors.get(&s) {
                for (_, to) in out {
                    if visited.insert(to.clone()) {
                        worklist.push_back(to.clone());
                    }
                }
            }
        }
        trace!("reach: {} of {} states", visited.len(), self.states.len());
        visited
    }

    /// A state is terminal when it has no successors.
    pub fn is_state_terminal(&self, state: &S) -> Result<bool> {
        self.check_state(state)?;
        Ok(self.successors.get(state).map_or(true, |out| out.is_empty()))
    }

    /// At most one initial state, and at most one successor per state and action.
    pub fn is_action_deterministic(&self) -> bool {
        if self.initial_states.len() > 1 {
            return false;
        }
        self.successors.values().all(|out| {
            let mut seen: HashSet<&A> = HashSet::new();
            out.iter().all(|(a, _)| seen.insert(a))
        })
    }

    /// At most one initial state, and no two successors of a state share a label.
    pub fn is_ap_deterministic(&self) -> bool {
        if self.initial_states.len() > 1 {
            return false;
        }
        self.successors.values().all(|out| {
            let targets: HashSet<&S> = out.iter().map(|(_, to)| to).collect();
            let mut seen: HashSet<&Label<P>> = HashSet::new();
            targets.into_iter().all(|to| seen.insert(&self.labeling[to]))
        })
    }

    /// Every step of the sequence is a transition of the system.
    pub fn is_execution_fragment(&self, e: &AlternatingSequence<S, A>) -> Result<bool> {
        self.check_state(e.head())?;
        let mut current = e.head();
        for (action, next) in e.steps() {
            self.check_action(action)?;
            self.check_state(next)?;
            let step_exists = self
                .successors
                .get(current)
                .is_some_and(|out| out.contains(&(action.clone(), next.clone())));
            if !step_exists {
                return Ok(false);
            }
            current = next;
        }
        Ok(true)
    }

    /// An execution fragment starting in an initial state.
    pub fn is_initial_execution_fragment(&self, e: &AlternatingSequence<S, A>) -> Result<bool> {
        Ok(self.is_execution_fragment(e)? && self.initial_states.contains(e.head()))
    }

    /// An execution fragment ending in a terminal state.
    pub fn is_maximal_execution_fragment(&self, e: &AlternatingSequence<S, A>) -> Result<bool> {
        Ok(self.is_execution_fragment(e)? && self.is_state_terminal(e.last())?)
    }

    /// An initial and maximal execution fragment.
    pub fn is_execution(&self, e: &AlternatingSequence<S, A>) -> Result<bool> {
        Ok(self.is_initial_execution_fragment(e)? && self.is_state_terminal(e.last())?)
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
    enum St {
        S0,
        S1,
        S2,
        S3,
        S4,
    }

    #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
    enum Act {
        A1,
        A2,
    }

    #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
    enum Ap {
        P,
        Q,
        U,
    }

    use Act::*;
    use Ap::*;
    use St::*;

    /// S1 --A1--> S2 --A2--> S3, S1 --A1--> S4; S1 initial.
    fn sample() -> TransitionSystem<St, Act, Ap> {
        let mut ts = TransitionSystem::new();
        ts.add_states([S1, S2, S3, S4]);
        ts.add_actions([A1, A2]);
        ts.add_atomic_propositions([P, Q, U]);
        ts.add_initial_state(S1).unwrap();
        ts.add_transition(Transition::new(S1, A1, S2)).unwrap();
        ts.add_transition(Transition::new(S2, A2, S3)).unwrap();
        ts.add_transition(Transition::new(S1, A1, S4)).unwrap();
        ts
    }

    #[test]
    fn test_initial_must_be_state() {
        let mut ts: TransitionSystem<St, Act, Ap> = TransitionSystem::new();
        assert!(matches!(ts.add_initial_state(S0), Err(Error::InvalidInitialState(_))));
        ts.add_state(S0);
        ts.add_initial_state(S0).unwrap();
        assert!(ts.initial_states().contains(&S0));
    }

    #[test]
    fn test_transition_requires_registration() {
        let mut ts = sample();
        let bad = Transition::new(S0, A1, S1);
        assert!(matches!(ts.add_transition(bad), Err(Error::InvalidTransition(_))));
        let mut ts2: TransitionSystem<St, Act, Ap> = TransitionSystem::new();
        ts2.add_states([S0, S1]);
        assert!(ts2.add_transition(Transition::new(S0, A1, S1)).is_err());
        assert!(ts2.transitions().is_empty());
        ts.add_state(S0);
        ts.add_transition(Transition::new(S0, A1, S1)).unwrap();
    }

    #[test]
    fn test_label_requires_registration() {
        let mut ts: TransitionSystem<St, Act, Ap> = TransitionSystem::new();
        ts.add_state(S0);
        assert!(ts.add_label(&S0, P).is_err());
        ts.add_atomic_proposition(P);
        ts.add_label(&S0, P).unwrap();
        assert!(ts.add_label(&S1, P).is_err());
        assert_eq!(ts.label(&S0).unwrap(), &Label::from([P]));
    }

    #[test]
    fn test_label_defaults_to_empty() {
        let ts = sample();
        for s in ts.states() {
            assert!(ts.label(s).unwrap().is_empty());
        }
        assert!(ts.label(&S0).is_err());
    }

    #[test]
    fn test_remove_referenced_state_fails() {
        let mut ts = sample();
        let before = ts.clone();

        // Initial
        let err = ts.remove_state(&S1).unwrap_err();
        assert!(matches!(
            err,
            Error::DeletionOfAttachedState {
                part: ModelPart::InitialStates,
                ..
            }
        ));
        // Transition endpoint
        let err = ts.remove_state(&S3).unwrap_err();
        assert!(matches!(
            err,
            Error::DeletionOfAttachedState {
                part: ModelPart::Transitions,
                ..
            }
        ));
        assert_eq!(ts, before);

        // Labeled
        ts.add_state(S0);
        ts.add_label(&S0, Q).unwrap();
        let err = ts.remove_state(&S0).unwrap_err();
        assert!(matches!(
            err,
            Error::DeletionOfAttachedState {
                part: ModelPart::LabelingFunction,
                ..
            }
        ));
        ts.remove_label(&S0, &Q);
        ts.remove_state(&S0).unwrap();
        assert!(!ts.states().contains(&S0));
    }

    #[test]
    fn test_remove_state_after_detaching() {
        let mut ts = sample();
        ts.remove_transition(&Transition::new(S2, A2, S3));
        ts.remove_state(&S3).unwrap();
        assert!(!ts.states().contains(&S3));
        assert!(ts.post(&S2).unwrap().is_empty());
    }

    #[test]
    fn test_remove_unknown_state_fails() {
        let mut ts = sample();
        let before = ts.clone();
        assert!(matches!(ts.remove_state(&S0), Err(Error::StateNotFound(_))));
        assert_eq!(ts, before);
    }

    #[test]
    fn test_remove_referenced_action_fails() {
        let mut ts = sample();
        let before = ts.clone();
        assert!(matches!(ts.remove_action(&A2), Err(Error::DeletionOfAttachedAction { .. })));
        assert_eq!(ts, before);
        ts.remove_transition(&Transition::new(S2, A2, S3));
        ts.remove_action(&A2).unwrap();
        assert!(!ts.actions().contains(&A2));
    }

    #[test]
    fn test_remove_referenced_ap_fails() {
        let mut ts = sample();
        ts.add_label(&S2, U).unwrap();
        let before = ts.clone();
        assert!(matches!(
            ts.remove_atomic_proposition(&U),
            Err(Error::DeletionOfAttachedAtomicProposition { .. })
        ));
        assert_eq!(ts, before);
        ts.remove_atomic_proposition(&P).unwrap();
        assert!(!ts.atomic_propositions().contains(&P));
    }

    #[test]
    fn test_post_pre() {
        let ts = sample();
        assert_eq!(ts.post(&S1).unwrap(), HashSet::from([S2, S4]));
        assert_eq!(ts.post_by(&S1, &A2).unwrap(), HashSet::new());
        assert_eq!(ts.post_by(&S2, &A2).unwrap(), HashSet::from([S3]));
        assert_eq!(ts.post_all([S1, S2].iter()).unwrap(), HashSet::from([S2, S3, S4]));
        assert_eq!(ts.post_all_by([S1, S2].iter(), &A1).unwrap(), HashSet::from([S2, S4]));
        assert_eq!(ts.pre(&S3).unwrap(), HashSet::from([S2]));
        assert_eq!(ts.pre_by(&S2, &A1).unwrap(), HashSet::from([S1]));
        assert_eq!(ts.pre_all([S2, S3, S4].iter()).unwrap(), HashSet::from([S1, S2]));
        assert_eq!(ts.pre_all_by([S2, S3].iter(), &A2).unwrap(), HashSet::from([S2]));
    }

    #[test]
    fn test_post_of_terminal_set_is_empty() {
        let ts = sample();
        assert!(ts.post_all([S3, S4].iter()).unwrap().is_empty());
    }

    #[test]
    fn test_post_unknown_fails() {
        let ts = sample();
        assert!(matches!(ts.post(&S0), Err(Error::StateNotFound(_))));
        assert!(matches!(ts.pre(&S0), Err(Error::StateNotFound(_))));
        let mut ts2: TransitionSystem<St, Act, Ap> = TransitionSystem::new();
        ts2.add_state(S0);
        assert!(matches!(ts2.post_by(&S0, &A1), Err(Error::ActionNotFound(_))));
        assert!(matches!(ts2.is_state_terminal(&S1), Err(Error::StateNotFound(_))));
    }

    #[test]
    fn test_reach_is_fixpoint() {
        let mut ts = sample();
        ts.add_state(S0);
        ts.add_transition(Transition::new(S0, A1, S1)).unwrap();

        let reach = ts.reach();
        assert_eq!(reach, HashSet::from([S1, S2, S3, S4]));

        // Closing the reachable set again yields nothing new.
        let again = ts.reach_from(reach.iter().copied());
        assert_eq!(again, reach);

        // Every reachable non-initial state has a reachable predecessor.
        for s in &reach {
            if !ts.initial_states().contains(s) {
                let pre = ts.pre(s).unwrap();
                assert!(pre.iter().any(|p| reach.contains(p)));
            }
        }
    }

    #[test]
    fn test_terminal() {
        let ts = sample();
        assert!(!ts.is_state_terminal(&S1).unwrap());
        assert!(ts.is_state_terminal(&S3).unwrap());
        assert!(ts.is_state_terminal(&S4).unwrap());
    }

    #[test]
    fn test_action_determinism() {
        let mut ts = sample();
        // S1 --A1--> {S2, S4}
        assert!(!ts.is_action_deterministic());
        ts.remove_transition(&Transition::new(S1, A1, S4));
        assert!(ts.is_action_deterministic());
        ts.add_initial_state(S4).unwrap();
        assert!(!ts.is_action_deterministic());

        // The characterization: |init| <= 1 and |post(s, a)| <= 1 for all (s, a).
        let expected = ts.initial_states().len() <= 1
            && ts
                .states()
                .iter()
                .all(|s| ts.actions().iter().all(|a| ts.post_by(s, a).unwrap().len() <= 1));
        assert_eq!(ts.is_action_deterministic(), expected);
    }

    #[test]
    fn test_ap_determinism_true() {
        let mut ts: TransitionSystem<St, Act, Ap> = TransitionSystem::new();
        ts.add_states([S1, S2, S3, S4]);
        ts.add_atomic_propositions([Q, P, U]);
        ts.add_initial_state(S1).unwrap();
        ts.add_label(&S1, Q).unwrap();
        assert!(ts.is_ap_deterministic());

        ts.add_action(A1);
        ts.add_transition(Transition::new(S1, A1, S2)).unwrap();
        ts.add_transition(Transition::new(S1, A1, S3)).unwrap();
        ts.add_transition(Transition::new(S1, A1, S4)).unwrap();
        ts.add_label(&S2, Q).unwrap();
        ts.add_label(&S3, P).unwrap();
        ts.add_label(&S4, Q).unwrap();
        ts.add_label(&S4, P).unwrap();
        assert!(ts.is_ap_deterministic());

        ts.remove_label(&S4, &Q);
        ts.remove_label(&S4, &P);
        ts.add_label(&S4, U).unwrap();
        assert!(ts.is_ap_deterministic());
    }

    #[test]
    fn test_ap_determinism_false() {
        let mut ts: TransitionSystem<St, Act, Ap> = TransitionSystem::new();
        ts.add_states([S1, S2, S3, S4]);
        ts.add_atomic_propositions([Q, P, U]);
        ts.add_initial_state(S1).unwrap();
        ts.add_action(A1);
        ts.add_transition(Transition::new(S1, A1, S2)).unwrap();
        ts.add_transition(Transition::new(S1, A1, S3)).unwrap();
        ts.add_transition(Transition::new(S1, A1, S4)).unwrap();
        ts.add_label(&S2, Q).unwrap();
        ts.add_label(&S3, P).unwrap();
        ts.add_label(&S4, P).unwrap();
        assert!(!ts.is_ap_deterministic());

        ts.add_label(&S3, U).unwrap();
        ts.add_label(&S4, U).unwrap();
        assert!(!ts.is_ap_deterministic());

        // Two initial states
        ts.remove_label(&S4, &U);
        ts.remove_label(&S4, &P);
        ts.add_label(&S4, Q).unwrap();
        ts.add_label(&S4, U).unwrap();
        assert!(ts.is_ap_deterministic());
        ts.add_state(S0);
        ts.add_initial_state(S0).unwrap();
        assert!(!ts.is_ap_deterministic());
    }

    #[test]
    fn test_execution_fragments() {
        let ts = sample();

        let e = AlternatingSequence::new(S1).then(A1, S2).then(A2, S3);
        assert!(ts.is_execution_fragment(&e).unwrap());
        assert!(ts.is_initial_execution_fragment(&e).unwrap());
        assert!(ts.is_maximal_execution_fragment(&e).unwrap());
        assert!(ts.is_execution(&e).unwrap());

        let partial = AlternatingSequence::new(S1).then(A1, S2);
        assert!(ts.is_initial_execution_fragment(&partial).unwrap());
        assert!(!ts.is_maximal_execution_fragment(&partial).unwrap());
        assert!(!ts.is_execution(&partial).unwrap());

        let tail = AlternatingSequence::new(S2).then(A2, S3);
        assert!(ts.is_maximal_execution_fragment(&tail).unwrap());
        assert!(!ts.is_initial_execution_fragment(&tail).unwrap());
        assert!(!ts.is_execution(&tail).unwrap());

        let wrong = AlternatingSequence::new(S1).then(A2, S2);
        assert!(!ts.is_execution_fragment(&wrong).unwrap());

        let single = AlternatingSequence::new(S4);
        assert!(ts.is_execution_fragment(&single).unwrap());
        assert!(ts.is_maximal_execution_fragment(&single).unwrap());
    }

    #[test]
    fn test_execution_fragment_unknown_items() {
        let ts = sample();
        let e = AlternatingSequence::new(S0);
        assert!(matches!(ts.is_execution_fragment(&e), Err(Error::StateNotFound(_))));
        let mut ts2: TransitionSystem<St, Act, Ap> = TransitionSystem::new();
        ts2.add_states([S1, S2]);
        let e = AlternatingSequence::new(S1).then(A1, S2);
        assert!(matches!(ts2.is_execution_fragment(&e), Err(Error::ActionNotFound(_))));
    }

    #[test]
    fn test_alternating_sequence_accessors() {
        let e = AlternatingSequence::new(S1).then(A1, S2).then(A2, S3);
        assert_eq!(e.head(), &S1);
        assert_eq!(e.last(), &S3);
        assert_eq!(e.len(), 2);
        assert_eq!(e.states().copied().collect::<Vec<_>>(), vec![S1, S2, S3]);
        assert_eq!(e.actions().copied().collect::<Vec<_>>(), vec![A1, A2]);
        assert!(AlternatingSequence::<St, Act>::new(S0).is_empty());
    }

    #[test]
    fn test_equality_ignores_insertion_order() {
        let mut a: TransitionSystem<St, Act, Ap> = TransitionSystem::new();
        a.add_states([S1, S2]);
        a.add_initial_state(S1).unwrap();
        a.add_action(A1);
        a.add_transition(Transition::new(S1, A1, S2)).unwrap();
        a.add_atomic_propositions([Q, P]);
        a.add_label(&S1, Q).unwrap();

        let mut b: TransitionSystem<St, Act, Ap> = TransitionSystem::new();
        b.add_states([S2, S1]);
        b.add_initial_state(S1).unwrap();
        b.add_action(A1);
        b.add_atomic_propositions([P, Q]);
        b.add_transition(Transition::new(S1, A1, S2)).unwrap();
        b.add_label(&S1, Q).unwrap();

        assert_eq!(a, b);
    }
}
