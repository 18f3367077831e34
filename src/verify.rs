//! Checking ω-regular properties by accepting-cycle search.
//!
//! The automaton passed to [`verify_omega_regular_property`] describes the
//! *bad* behaviours. The model satisfies the property iff the product has no
//! reachable cycle through an accepting state. Each accepting product state is
//! tried in turn with its own depth-first search, so the check is quadratic in
//! the size of the product.

use std::fmt;

use indexmap::{IndexMap, IndexSet};
use log::{debug, trace};

use crate::automaton::Automaton;
use crate::error::Result;
use crate::ltl::Ltl;
use crate::product::product;
use crate::tableau::ltl_to_nba;
use crate::transition_system::{Transition, TransitionSystem};
use crate::types::Element;

/// A lasso `prefix · cycle^ω` of the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Counterexample<S> {
    prefix: Vec<S>,
    cycle: Vec<S>,
}

impl<S> Counterexample<S> {
    /// States from an initial state up to, but excluding, the first state of the cycle.
    pub fn prefix(&self) -> &[S] {
        &self.prefix
    }

    /// States of the repeated part. The successor of the last one is the first one.
    pub fn cycle(&self) -> &[S] {
        &self.cycle
    }

    /// The first `n` states of the infinite run.
    pub fn unroll(&self, n: usize) -> impl Iterator<Item = &S> {
        self.prefix
            .iter()
            .chain(self.cycle.iter().cycle())
            .take(n)
    }
}

impl<S: fmt::Debug> fmt::Display for Counterexample<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "prefix:")?;
        for s in &self.prefix {
            writeln!(f, "  {:?}", s)?;
        }
        writeln!(f, "cycle:")?;
        for s in &self.cycle {
            writeln!(f, "  {:?}", s)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationResult<S> {
    Succeeded,
    Failed(Counterexample<S>),
}

impl<S> VerificationResult<S> {
    pub fn is_success(&self) -> bool {
        matches!(self, VerificationResult::Succeeded)
    }

    pub fn counterexample(&self) -> Option<&Counterexample<S>> {
        match self {
            VerificationResult::Succeeded => None,
            VerificationResult::Failed(cex) => Some(cex),
        }
    }
}

/// Depth-first search for a cycle through `start`.
///
/// Returns the states of the cycle beginning at `start` and ending at the state
/// whose successor is `start`.
fn find_cycle<'a, S: Element, A>(
    outgoing: &IndexMap<&'a S, Vec<&'a Transition<S, A>>>,
    start: &'a S,
) -> Option<Vec<S>> {
    let mut parent: IndexMap<&S, &S> = IndexMap::new();
    let mut visited: IndexSet<&S> = IndexSet::new();
    let mut stack = vec![start];
    visited.insert(start);

    while let Some(s) = stack.pop() {
        let Some(moves) = outgoing.get(s) else {
            continue;
        };
        for t in moves {
            if &t.to == start {
                let mut cycle = vec![s.clone()];
                let mut current = s;
                while let Some(&prev) = parent.get(current) {
                    cycle.push(prev.clone());
                    current = prev;
                }
                cycle.reverse();
                return Some(cycle);
            }
            if visited.insert(&t.to) {
                parent.insert(&t.to, s);
                stack.push(&t.to);
            }
        }
    }
    None
}

/// Checks `ts` against a Büchi automaton accepting the violating runs.
pub fn verify_omega_regular_property<S, A, P, Q>(
    ts: &TransitionSystem<S, A, P>,
    aut: &Automaton<Q, P>,
) -> Result<VerificationResult<S>>
where
    S: Element,
    A: Element,
    P: Element + Ord,
    Q: Element,
{
    if aut.initial_states().is_empty() {
        debug!("automaton without initial states accepts nothing");
        return Ok(VerificationResult::Succeeded);
    }
    let prod = product(ts, aut)?;
    let outgoing = prod.outgoing_index();

    let accepting: Vec<&(S, Q)> = prod.states().iter().filter(|s| aut.is_accepting(&s.1)).collect();
    debug!(
        "verify_omega_regular_property: {} product states, {} accepting",
        prod.num_states(),
        accepting.len()
    );

    for s in accepting {
        trace!("searching cycle through {:?}", s);
        let Some(cycle) = find_cycle(&outgoing, s) else {
            continue;
        };
        let Some(path) = prod.path_to(s) else {
            continue;
        };
        let prefix_len = path.states().len() - 1;
        let cex = Counterexample {
            prefix: path.states()[..prefix_len].iter().map(|(m, _)| m.clone()).collect(),
            cycle: cycle.into_iter().map(|(m, _)| m).collect(),
        };
        debug!(
            "accepting cycle found: prefix {} states, cycle {} states",
            cex.prefix.len(),
            cex.cycle.len()
        );
        return Ok(VerificationResult::Failed(cex));
    }

    debug!("no accepting cycle");
    Ok(VerificationResult::Succeeded)
}

/// Checks whether every run of `ts` satisfies `phi`.
pub fn verify_ltl<S, A, P>(ts: &TransitionSystem<S, A, P>, phi: &Ltl<P>) -> Result<VerificationResult<S>>
where
    S: Element,
    A: Element,
    P: Element + Ord,
{
    debug!("verify_ltl(phi = {:?})", phi);
    let nba = ltl_to_nba(&Ltl::not(phi.clone()));
    verify_omega_regular_property(ts, &nba)
}
