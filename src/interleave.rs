//! Parallel composition of transition systems and program graphs.

use std::collections::HashSet;

use log::{debug, warn};

use crate::error::Result;
use crate::program_graph::{PgTransition, ProgramGraph};
use crate::semantics::{explore, ExploreConfig};
use crate::transition::TransitionSystem;
use crate::types::{Element, Proposition};
use crate::utils::{difference, product, union};

/// Free interleaving of two transition systems.
pub fn interleave_ts<S1, S2, A, P>(
    ts1: &TransitionSystem<S1, A, P>,
    ts2: &TransitionSystem<S2, A, P>,
) -> Result<TransitionSystem<(S1, S2), A, P>>
where
    S1: Element,
    S2: Element,
    A: Element,
    P: Proposition,
{
    interleave_ts_with_handshake(ts1, ts2, &HashSet::new())
}

/// Interleaving of two transition systems that synchronize on the
/// `handshake` actions.
///
/// A composite state moves by a non-handshake action of either component
/// alone, or by a handshake action that both components take together.
/// Only composite states reachable from the product of the initial states
/// are built.
pub fn interleave_ts_with_handshake<S1, S2, A, P>(
    ts1: &TransitionSystem<S1, A, P>,
    ts2: &TransitionSystem<S2, A, P>,
    handshake: &HashSet<A>,
) -> Result<TransitionSystem<(S1, S2), A, P>>
where
    S1: Element,
    S2: Element,
    A: Element,
    P: Proposition,
{
    let initial = product(ts1.initial_states(), ts2.initial_states());

    let mut ts = explore(initial, &ExploreConfig::default(), |(s1, s2): &(S1, S2)| {
        let mut moves: Vec<(A, (S1, S2))> = Vec::new();
        for (a, t1) in ts1.outgoing(s1) {
            if handshake.contains(a) {
                for (b, t2) in ts2.outgoing(s2) {
                    if a == b {
                        moves.push((a.clone(), (t1.clone(), t2.clone())));
                    }
                }
            } else {
                moves.push((a.clone(), (t1.clone(), s2.clone())));
            }
        }
        for (a, t2) in ts2.outgoing(s2) {
            if !handshake.contains(a) {
                moves.push((a.clone(), (s1.clone(), t2.clone())));
            }
        }
        Ok(moves)
    })?;
    let actions = union(ts1.actions(), ts2.actions());
    let foreign = difference(handshake, &actions);
    if !foreign.is_empty() {
        warn!("handshake actions {:?} belong to neither component and never fire", foreign);
    }
    ts.add_actions(actions);
    ts.add_atomic_propositions(union(ts1.atomic_propositions(), ts2.atomic_propositions()));

    let states: Vec<(S1, S2)> = ts.states().iter().cloned().collect();
    for s in &states {
        let (s1, s2) = s;
        for p in ts1.label(s1)?.iter().chain(ts2.label(s2)?) {
            ts.add_label(s, p.clone())?;
        }
    }

    debug!(
        "interleaved {} x {} states into {} states, {} transitions",
        ts1.states().len(),
        ts2.states().len(),
        ts.states().len(),
        ts.transitions().len()
    );
    Ok(ts)
}

/// Interleaving of two program graphs.
///
/// Every edge of one graph is taken with the other graph's location held
/// fixed. Initializations are concatenated pairwise, the first graph's
/// assignments first.
pub fn interleave_pg<L1, L2, A>(
    pg1: &ProgramGraph<L1, A>,
    pg2: &ProgramGraph<L2, A>,
) -> Result<ProgramGraph<(L1, L2), A>>
where
    L1: Element,
    L2: Element,
    A: Element,
{
    let mut pg = ProgramGraph::new();
    pg.add_locations(product(pg1.locations(), pg2.locations()));
    for l in product(pg1.initial_locations(), pg2.initial_locations()) {
        pg.add_initial_location(l)?;
    }
    for (i1, i2) in product(pg1.initializations(), pg2.initializations()) {
        pg.add_initialization([i1, i2].concat());
    }
    // A graph without initializations contributes the empty sequence.
    if pg1.initializations().is_empty() {
        for i2 in pg2.initializations() {
            pg.add_initialization(i2.clone());
        }
    }
    if pg2.initializations().is_empty() {
        for i1 in pg1.initializations() {
            pg.add_initialization(i1.clone());
        }
    }

    for t in pg1.transitions() {
        for l2 in pg2.locations() {
            pg.add_transition(PgTransition::new(
                (t.from.clone(), l2.clone()),
                t.condition.clone(),
                t.action.clone(),
                (t.to.clone(), l2.clone()),
            ))?;
        }
    }
    for t in pg2.transitions() {
        for l1 in pg1.locations() {
            pg.add_transition(PgTransition::new(
                (l1.clone(), t.from.clone()),
                t.condition.clone(),
                t.action.clone(),
                (l1.clone(), t.to.clone()),
            ))?;
        }
    }

    debug!(
        "interleaved program graphs: {} locations, {} edges",
        pg.locations().len(),
        pg.transitions().len()
    );
    Ok(pg)
}
