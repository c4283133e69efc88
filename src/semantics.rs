//! Unfolding of program graphs, channel systems and circuits into explicit
//! transition systems.
//!
//! Every construction follows the same scheme: seed the initial states, then
//! expand a worklist until no new state shows up. Only reachable states are
//! ever materialized, and each state is expanded exactly once.
//!
//! States are labeled by derived propositions: the text of every active
//! location and one `name = value` proposition per memory binding (for
//! circuits, the names of the high ports).

use std::collections::{HashSet, VecDeque};
use std::fmt::Display;

use log::{debug, trace};

use crate::channel::{channel_read, handshake_label, is_feasible, is_handshake_pair, is_rendezvous, ChannelSystem};
use crate::circuit::{all_assignments, all_low, high_ports, Circuit};
use crate::error::{Error, Result};
use crate::eval::Evaluators;
use crate::gate::PortValues;
use crate::memory::Memory;
use crate::program_graph::ProgramGraph;
use crate::transition::{Transition, TransitionSystem};
use crate::types::{Element, LocationText, Proposition};
use crate::utils::{combine, product};

/// Configuration of state-space exploration.
///
/// # Examples
///
/// ```
/// use fvm_rs::semantics::ExploreConfig;
///
/// let config = ExploreConfig::default().with_max_states(10_000);
/// assert_eq!(config.max_states, Some(10_000));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ExploreConfig {
    /// Abort with [`Error::StateLimitExceeded`] once more states than this
    /// are discovered (default: unbounded)
    pub max_states: Option<usize>,
}

impl ExploreConfig {
    pub fn with_max_states(mut self, limit: usize) -> Self {
        self.max_states = Some(limit);
        self
    }

    fn check(&self, discovered: usize) -> Result<()> {
        match self.max_states {
            Some(limit) if discovered > limit => Err(Error::StateLimitExceeded { limit }),
            _ => Ok(()),
        }
    }
}

/// Forward fixpoint from the given initial states.
///
/// `successors` lists the outgoing `(action, state)` moves of a state; every
/// action it yields is registered. No labels are attached.
pub(crate) fn explore<S, A, P, F>(
    initial: impl IntoIterator<Item = S>,
    config: &ExploreConfig,
    mut successors: F,
) -> Result<TransitionSystem<S, A, P>>
where
    S: Element,
    A: Element,
    P: Proposition,
    F: FnMut(&S) -> Result<Vec<(A, S)>>,
{
    let mut ts = TransitionSystem::new();
    let mut worklist: VecDeque<S> = VecDeque::new();
    for s in initial {
        if !ts.states().contains(&s) {
            ts.add_state(s.clone());
            config.check(ts.states().len())?;
            worklist.push_back(s.clone());
        }
        ts.add_initial_state(s)?;
    }

    while let Some(s) = worklist.pop_front() {
        let moves = successors(&s)?;
        trace!("expanding {:?}: {} moves, {} pending", s, moves.len(), worklist.len());
        for (a, t) in moves {
            if !ts.states().contains(&t) {
                ts.add_state(t.clone());
                config.check(ts.states().len())?;
                worklist.push_back(t.clone());
            }
            ts.add_action(a.clone());
            ts.add_transition(Transition::new(s.clone(), a, t))?;
        }
    }
    Ok(ts)
}

/// Attach the propositions computed by `props` to every state.
fn label_states<S, A, F>(ts: &mut TransitionSystem<S, A, String>, mut props: F) -> Result<()>
where
    S: Element,
    A: Element,
    F: FnMut(&S) -> Vec<String>,
{
    let states: Vec<S> = ts.states().iter().cloned().collect();
    for s in &states {
        for p in props(s) {
            ts.add_atomic_proposition(p.clone());
            ts.add_label(s, p)?;
        }
    }
    Ok(())
}

/// One memory per initialization sequence, or the empty memory if there are
/// none.
fn initial_memories<'a>(
    initializations: impl IntoIterator<Item = &'a Vec<String>>,
    evaluators: &Evaluators,
) -> Result<HashSet<Memory>> {
    let mut result = HashSet::new();
    for init in initializations {
        result.insert(evaluators.initial_memory(init)?);
    }
    if result.is_empty() {
        result.insert(Memory::new());
    }
    Ok(result)
}

/// Transition system of a program graph.
pub fn transition_system_from_program_graph<L, A>(
    pg: &ProgramGraph<L, A>,
    evaluators: &Evaluators,
) -> Result<TransitionSystem<(L, Memory), A, String>>
where
    L: Element + LocationText,
    A: Element + Display,
{
    transition_system_from_program_graph_with_config(pg, evaluators, &ExploreConfig::default())
}

pub fn transition_system_from_program_graph_with_config<L, A>(
    pg: &ProgramGraph<L, A>,
    evaluators: &Evaluators,
    config: &ExploreConfig,
) -> Result<TransitionSystem<(L, Memory), A, String>>
where
    L: Element + LocationText,
    A: Element + Display,
{
    let memories = initial_memories(pg.initializations(), evaluators)?;
    let initial = product(pg.initial_locations(), &memories);

    let mut ts = explore(initial, config, |(location, memory): &(L, Memory)| {
        let mut moves = Vec::new();
        for t in pg.transitions_from(location) {
            let action = t.action.to_string();
            if !is_feasible(memory, &action) || !evaluators.evaluate(memory, &t.condition)? {
                continue;
            }
            let next = evaluators.effect(memory, &action)?;
            moves.push((t.action.clone(), (t.to.clone(), next)));
        }
        Ok(moves)
    })?;

    label_states(&mut ts, |(location, memory)| {
        std::iter::once(location.location_text())
            .chain(memory.propositions())
            .collect()
    })?;
    if let Some(name) = pg.name() {
        ts.set_name(name);
    }

    debug!(
        "program graph unfolded into {} states, {} transitions",
        ts.states().len(),
        ts.transitions().len()
    );
    Ok(ts)
}

/// Transition system of a channel system.
///
/// Besides the moves of each component on its own, a rendezvous receive
/// `_c?x` of one component fires together with a rendezvous send `_c!e` of
/// another component; the combined action is labeled `a|b`, the action of
/// the lower-indexed component first.
pub fn transition_system_from_channel_system<L, A>(
    cs: &ChannelSystem<L, A>,
    evaluators: &Evaluators,
) -> Result<TransitionSystem<(Vec<L>, Memory), A, String>>
where
    L: Element + LocationText,
    A: Element + Display + From<String>,
{
    transition_system_from_channel_system_with_config(cs, evaluators, &ExploreConfig::default())
}

pub fn transition_system_from_channel_system_with_config<L, A>(
    cs: &ChannelSystem<L, A>,
    evaluators: &Evaluators,
    config: &ExploreConfig,
) -> Result<TransitionSystem<(Vec<L>, Memory), A, String>>
where
    L: Element + LocationText,
    A: Element + Display + From<String>,
{
    let pgs = cs.program_graphs();

    let initial_locations: Vec<HashSet<L>> = pgs.iter().map(|pg| pg.initial_locations().clone()).collect();
    let initializations: Vec<HashSet<Vec<String>>> = pgs
        .iter()
        .filter(|pg| !pg.initializations().is_empty())
        .map(|pg| pg.initializations().clone())
        .collect();
    let concatenated: Vec<Vec<String>> = combine(&initializations)
        .into_iter()
        .map(|parts| parts.concat())
        .collect();
    let memories = initial_memories(&concatenated, evaluators)?;
    let initial: Vec<(Vec<L>, Memory)> = combine(&initial_locations)
        .into_iter()
        .flat_map(|locations| memories.iter().map(move |m| (locations.clone(), m.clone())))
        .collect();

    let mut ts = explore(initial, config, |(locations, memory): &(Vec<L>, Memory)| {
        let mut moves = Vec::new();
        for (i, pg) in pgs.iter().enumerate() {
            for t in pg.transitions_from(&locations[i]) {
                let action = t.action.to_string();
                if is_rendezvous(&action) {
                    // Handshakes are enumerated from the receiving side.
                    if channel_read(&action).is_none() || !evaluators.evaluate(memory, &t.condition)? {
                        continue;
                    }
                    for (j, partner) in pgs.iter().enumerate() {
                        if j == i {
                            continue;
                        }
                        for u in partner.transitions_from(&locations[j]) {
                            let other = u.action.to_string();
                            if !is_handshake_pair(&action, &other) || !evaluators.evaluate(memory, &u.condition)? {
                                continue;
                            }
                            let label = handshake_label(i, &action, j, &other);
                            let next = evaluators.effect(memory, &label)?;
                            let mut next_locations = locations.clone();
                            next_locations[i] = t.to.clone();
                            next_locations[j] = u.to.clone();
                            moves.push((A::from(label), (next_locations, next)));
                        }
                    }
                } else {
                    if !is_feasible(memory, &action) || !evaluators.evaluate(memory, &t.condition)? {
                        continue;
                    }
                    let next = evaluators.effect(memory, &action)?;
                    let mut next_locations = locations.clone();
                    next_locations[i] = t.to.clone();
                    moves.push((t.action.clone(), (next_locations, next)));
                }
            }
        }
        Ok(moves)
    })?;

    label_states(&mut ts, |(locations, memory)| {
        locations
            .iter()
            .map(|l| l.location_text())
            .chain(memory.propositions())
            .collect()
    })?;

    debug!(
        "channel system of {} components unfolded into {} states, {} transitions",
        pgs.len(),
        ts.states().len(),
        ts.transitions().len()
    );
    Ok(ts)
}

/// Transition system of a synchronous circuit.
///
/// States are `(inputs, registers)` pairs and actions are input assignments:
/// taking action `i'` in `(i, r)` leads to `(i', update_registers(i, r))`.
/// Registers start low, inputs start in every possible assignment.
pub fn transition_system_from_circuit<C: Circuit>(
    circuit: &C,
) -> Result<TransitionSystem<(PortValues, PortValues), PortValues, String>> {
    let input_names = circuit.input_port_names();
    let register_names = circuit.register_names();
    let output_names = circuit.output_port_names();

    let inputs = all_assignments(&input_names);
    let registers = all_low(&register_names);
    let initial = inputs.iter().map(|i| (i.clone(), registers.clone()));

    let mut ts = explore(initial, &ExploreConfig::default(), |(i, r): &(PortValues, PortValues)| {
        let next = circuit.update_registers(i, r);
        Ok(inputs.iter().map(|a| (a.clone(), (a.clone(), next.clone()))).collect())
    })?;
    ts.add_actions(inputs.iter().cloned());
    ts.add_atomic_propositions(
        input_names
            .iter()
            .chain(&register_names)
            .chain(&output_names)
            .cloned(),
    );

    label_states(&mut ts, |(i, r)| {
        let outputs = circuit.compute_outputs(i, r);
        high_ports(i)
            .chain(high_ports(r))
            .chain(high_ports(&outputs))
            .cloned()
            .collect()
    })?;

    debug!(
        "circuit unfolded into {} states, {} transitions",
        ts.states().len(),
        ts.transitions().len()
    );
    Ok(ts)
}
