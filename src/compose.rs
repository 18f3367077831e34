//! Interleaving of transition systems and program graphs.
//!
//! All operators build a fresh structure and hand back only its reachable part:
//! transition systems are explored breadth-first from the composite initial
//! states, program graphs are built in full and then pruned over the location
//! graph.

use std::collections::VecDeque;

use indexmap::IndexSet;
use log::debug;

use crate::error::Result;
use crate::program_graph::{PgTransition, ProgramGraph};
use crate::transition_system::{Transition, TransitionSystem};
use crate::types::Element;

/// Free interleaving `ts1 ||| ts2`.
///
/// Every transition of either component fires on its own while the other
/// component stays put. Identical to [`interleave_handshake`] with an empty
/// synchronization set.
pub fn interleave<S1, S2, A, P>(
    ts1: &TransitionSystem<S1, A, P>,
    ts2: &TransitionSystem<S2, A, P>,
) -> Result<TransitionSystem<(S1, S2), A, P>>
where
    S1: Element,
    S2: Element,
    A: Element,
    P: Element,
{
    interleave_handshake(ts1, ts2, &IndexSet::new())
}

/// Handshake interleaving `ts1 ||H ts2`.
///
/// Actions in `handshake` fire only jointly: both components must have a
/// transition with that action from their current coordinate. All other actions
/// interleave. The label of `(s1, s2)` is `L1(s1) ∪ L2(s2)`, and `(s1, s2)` is
/// initial iff both coordinates are.
pub fn interleave_handshake<S1, S2, A, P>(
    ts1: &TransitionSystem<S1, A, P>,
    ts2: &TransitionSystem<S2, A, P>,
    handshake: &IndexSet<A>,
) -> Result<TransitionSystem<(S1, S2), A, P>>
where
    S1: Element,
    S2: Element,
    A: Element,
    P: Element,
{
    debug!(
        "interleave_handshake(|S1| = {}, |S2| = {}, |H| = {})",
        ts1.num_states(),
        ts2.num_states(),
        handshake.len()
    );

    let out1 = ts1.outgoing_index();
    let out2 = ts2.outgoing_index();

    let mut ts = TransitionSystem::new();
    if handshake.is_empty() {
        ts.set_name(format!("{} ||| {}", ts1.name(), ts2.name()));
    } else {
        ts.set_name(format!("{} || {}", ts1.name(), ts2.name()));
    }
    ts.add_actions(ts1.actions().iter().cloned());
    ts.add_actions(ts2.actions().iter().cloned());
    ts.add_atomic_propositions(ts1.atomic_propositions().iter().cloned());
    ts.add_atomic_propositions(ts2.atomic_propositions().iter().cloned());

    let mut queue = VecDeque::new();
    for s1 in ts1.initial_states() {
        for s2 in ts2.initial_states() {
            let s = (s1.clone(), s2.clone());
            if add_composite_state(&mut ts, ts1, ts2, &s)? {
                ts.set_initial(&s, true)?;
                queue.push_back(s);
            }
        }
    }

    let (none1, none2) = (Vec::new(), Vec::new());
    while let Some(from) = queue.pop_front() {
        let (s1, s2) = &from;
        let moves1 = out1.get(s1).unwrap_or(&none1);
        let moves2 = out2.get(s2).unwrap_or(&none2);

        let mut steps: Vec<(A, (S1, S2))> = Vec::new();
        for t1 in moves1.iter().filter(|t| !handshake.contains(&t.action)) {
            steps.push((t1.action.clone(), (t1.to.clone(), s2.clone())));
        }
        for t2 in moves2.iter().filter(|t| !handshake.contains(&t.action)) {
            steps.push((t2.action.clone(), (s1.clone(), t2.to.clone())));
        }
        for t1 in moves1.iter().filter(|t| handshake.contains(&t.action)) {
            for t2 in moves2.iter().filter(|t| t.action == t1.action) {
                steps.push((t1.action.clone(), (t1.to.clone(), t2.to.clone())));
            }
        }

        for (action, to) in steps {
            if add_composite_state(&mut ts, ts1, ts2, &to)? {
                queue.push_back(to.clone());
            }
            ts.add_transition(Transition::new(from.clone(), action, to))?;
        }
    }

    debug!(
        "interleave_handshake: {} states, {} transitions",
        ts.num_states(),
        ts.num_transitions()
    );
    Ok(ts)
}

/// Adds `(s1, s2)` labeled with the union of both component labels.
fn add_composite_state<S1, S2, A, P>(
    ts: &mut TransitionSystem<(S1, S2), A, P>,
    ts1: &TransitionSystem<S1, A, P>,
    ts2: &TransitionSystem<S2, A, P>,
    s: &(S1, S2),
) -> Result<bool>
where
    S1: Element,
    S2: Element,
    A: Element,
    P: Element,
{
    if !ts.add_state(s.clone()) {
        return Ok(false);
    }
    for p in ts1.label(&s.0)?.iter().chain(ts2.label(&s.1)?) {
        ts.add_to_label(s, p.clone())?;
    }
    Ok(true)
}

/// Interleaving `pg1 ||| pg2` of two program graphs.
///
/// Locations are pairs; each edge of one component fires with the other
/// coordinate fixed. Initializations are the pairwise concatenations of both
/// lists, or one side's list when the other declares none. Locations
/// unreachable from the initial pairs are pruned.
pub fn interleave_program_graphs<L1, L2>(pg1: &ProgramGraph<L1>, pg2: &ProgramGraph<L2>) -> ProgramGraph<(L1, L2)>
where
    L1: Element,
    L2: Element,
{
    let mut pg = ProgramGraph::new();
    pg.set_name(format!("{} ||| {}", pg1.name(), pg2.name()));

    for l1 in pg1.locations() {
        for l2 in pg2.locations() {
            let loc = (l1.clone(), l2.clone());
            if pg1.initial_locations().contains(l1) && pg2.initial_locations().contains(l2) {
                pg.add_initial_location(loc);
            } else {
                pg.add_location(loc);
            }
        }
    }

    for t in pg1.transitions() {
        for l2 in pg2.locations() {
            pg.add_transition(PgTransition::new(
                (t.from.clone(), l2.clone()),
                t.condition.clone(),
                t.action.clone(),
                (t.to.clone(), l2.clone()),
            ));
        }
    }
    for t in pg2.transitions() {
        for l1 in pg1.locations() {
            pg.add_transition(PgTransition::new(
                (l1.clone(), t.from.clone()),
                t.condition.clone(),
                t.action.clone(),
                (l1.clone(), t.to.clone()),
            ));
        }
    }

    for init in combine_initializations(pg1.initializations(), pg2.initializations()) {
        pg.add_initialization(init);
    }

    pg.prune_unreachable();
    debug!(
        "interleave_program_graphs: {} locations, {} transitions",
        pg.locations().len(),
        pg.transitions().len()
    );
    pg
}

/// Pairwise concatenation of two initialization lists.
///
/// An empty list on either side passes the other side through unchanged.
pub(crate) fn combine_initializations(
    lhs: &IndexSet<Vec<String>>,
    rhs: &IndexSet<Vec<String>>,
) -> IndexSet<Vec<String>> {
    if lhs.is_empty() {
        return rhs.clone();
    }
    if rhs.is_empty() {
        return lhs.clone();
    }
    let mut result = IndexSet::new();
    for a in lhs {
        for b in rhs {
            result.insert(a.iter().chain(b).cloned().collect());
        }
    }
    result
}
