//! Transition systems unfolded from program graphs and channel systems.
//!
//! A state is a pair `(location, valuation)`. States are discovered
//! breadth-first from the initial ones, so the result contains reachable states
//! only. Each state is labeled with the names of its location components and
//! with one `variable = value` proposition per variable.

use std::collections::VecDeque;

use indexmap::IndexMap;
use log::{debug, trace};

use crate::channel::ChannelSystem;
use crate::error::Result;
use crate::eval::{channel_action_defs, default_condition_defs, effect, evaluate, ActionDef, ConditionDef};
use crate::program_graph::{PgTransition, ProgramGraph};
use crate::transition_system::{Transition, TransitionSystem};
use crate::types::{valuation_proposition, Element, Valuation};

/// A program-graph location that can name its components.
///
/// Composite locations (pairs, vectors) contribute one proposition per
/// component, so that e.g. `crit1` holds in every state where the first
/// process is at `crit1`.
pub trait Location: Element {
    fn components(&self) -> Vec<String>;
}

impl Location for String {
    fn components(&self) -> Vec<String> {
        vec![self.clone()]
    }
}

impl Location for &str {
    fn components(&self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl<A: Location, B: Location> Location for (A, B) {
    fn components(&self) -> Vec<String> {
        let mut result = self.0.components();
        result.extend(self.1.components());
        result
    }
}

impl<T: Location> Location for Vec<T> {
    fn components(&self) -> Vec<String> {
        self.iter().flat_map(|l| l.components()).collect()
    }
}

pub type PgState<L> = (L, Valuation);

/// Initial valuations of `pg`: each initialization applied to the empty valuation.
///
/// A graph without initializations has the single empty valuation.
fn initial_valuations<L>(pg: &ProgramGraph<L>, action_defs: &[Box<dyn ActionDef>]) -> Result<Vec<Valuation>> {
    if pg.initializations().is_empty() {
        return Ok(vec![Valuation::new()]);
    }
    let mut result = Vec::new();
    'init: for init in pg.initializations() {
        let mut v = Valuation::new();
        for action in init {
            match effect(action_defs, &v, action)? {
                Some(next) => v = next,
                None => {
                    debug!("initialization {:?} not applicable, skipped", init);
                    continue 'init;
                }
            }
        }
        if !result.contains(&v) {
            result.push(v);
        }
    }
    Ok(result)
}

fn add_pg_state<L: Location>(ts: &mut TransitionSystem<PgState<L>, String, String>, s: &PgState<L>) -> Result<bool> {
    if !ts.add_state(s.clone()) {
        return Ok(false);
    }
    let (loc, valuation) = s;
    let props = loc
        .components()
        .into_iter()
        .chain(valuation.iter().map(|(var, value)| valuation_proposition(var, value)));
    for p in props {
        ts.add_atomic_proposition(p.clone());
        ts.add_to_label(s, p)?;
    }
    Ok(true)
}

/// Unfolds `pg` into a transition system over `(location, valuation)` states.
///
/// An edge fires from `(l, v)` when its guard holds in `v` and its action is
/// applicable in `v`. Guard and action errors propagate.
pub fn transition_system_from_program_graph<L: Location>(
    pg: &ProgramGraph<L>,
    action_defs: &[Box<dyn ActionDef>],
    condition_defs: &[Box<dyn ConditionDef>],
) -> Result<TransitionSystem<PgState<L>, String, String>> {
    debug!(
        "transition_system_from_program_graph(|L| = {}, |T| = {})",
        pg.locations().len(),
        pg.transitions().len()
    );

    let mut outgoing: IndexMap<&L, Vec<&PgTransition<L>>> = IndexMap::new();
    for t in pg.transitions() {
        outgoing.entry(&t.from).or_default().push(t);
    }

    let mut ts = TransitionSystem::new();
    ts.set_name(pg.name());

    let mut queue = VecDeque::new();
    for v in initial_valuations(pg, action_defs)? {
        for l in pg.initial_locations() {
            let s = (l.clone(), v.clone());
            if add_pg_state(&mut ts, &s)? {
                queue.push_back(s.clone());
            }
            ts.set_initial(&s, true)?;
        }
    }

    while let Some(from) = queue.pop_front() {
        let Some(edges) = outgoing.get(&from.0) else {
            continue;
        };
        for t in edges {
            if !evaluate(condition_defs, &from.1, &t.condition)? {
                continue;
            }
            let Some(valuation) = effect(action_defs, &from.1, &t.action)? else {
                trace!("{:?} not applicable in {:?}", t.action, from.1);
                continue;
            };
            let to = (t.to.clone(), valuation);
            if add_pg_state(&mut ts, &to)? {
                queue.push_back(to.clone());
            }
            ts.add_action(t.action.clone());
            ts.add_transition(Transition::new(from.clone(), t.action.clone(), to))?;
        }
    }

    debug!(
        "transition_system_from_program_graph: {} states, {} transitions",
        ts.num_states(),
        ts.num_transitions()
    );
    Ok(ts)
}

/// Composes the channel system and unfolds it, interpreting joint
/// `send|receive` actions before ordinary ones.
pub fn transition_system_from_channel_system<L: Location>(
    cs: &ChannelSystem<L>,
) -> Result<TransitionSystem<PgState<Vec<L>>, String, String>> {
    let pg = cs.compose();
    transition_system_from_program_graph(&pg, &channel_action_defs(), &default_condition_defs())
}
