//! Synchronous product of a transition system and a Büchi automaton.
//!
//! The automaton reads the label of the state the model moves *into*:
//!
//! ```text
//!   s --a--> s'  in TS,   q --L(s')--> q'  in A
//! ------------------------------------------------
//!           (s, q) --a--> (s', q')
//! ```
//!
//! `(s0, q)` is initial when `s0` is initial and `q` is reachable from an
//! initial automaton state by reading `L(s0)`. The product state `(s, q)` is
//! labeled `{q}`, so acceptance can be read off the labels.
//!
//! An automaton proposition the model never declares is simply absent from
//! every label the automaton reads.

use std::collections::VecDeque;

use log::debug;

use crate::automaton::Automaton;
use crate::error::{FvmError, Result};
use crate::transition_system::{Transition, TransitionSystem};
use crate::types::Element;

fn add_product_state<S, A, Q>(ts: &mut TransitionSystem<(S, Q), A, Q>, s: &(S, Q)) -> Result<bool>
where
    S: Element,
    A: Element,
    Q: Element,
{
    if !ts.add_state(s.clone()) {
        return Ok(false);
    }
    ts.add_to_label(s, s.1.clone())?;
    Ok(true)
}

/// Reachable part of `ts ⊗ aut`.
///
/// Fails with `UnsupportedComposition` when the automaton has no initial state.
pub fn product<S, A, P, Q>(ts: &TransitionSystem<S, A, P>, aut: &Automaton<Q, P>) -> Result<TransitionSystem<(S, Q), A, Q>>
where
    S: Element,
    A: Element,
    P: Element + Ord,
    Q: Element,
{
    if aut.initial_states().is_empty() {
        return Err(FvmError::UnsupportedComposition(
            "automaton has no initial state".to_string(),
        ));
    }

    debug!(
        "product(|S| = {}, |Q| = {})",
        ts.num_states(),
        aut.num_states()
    );

    let mut result = TransitionSystem::new();
    result.set_name(format!("{} x automaton", ts.name()));
    result.add_actions(ts.actions().iter().cloned());
    result.add_atomic_propositions(aut.states().iter().cloned());

    let outgoing = ts.outgoing_index();
    let mut queue = VecDeque::new();

    for s0 in ts.initial_states() {
        let label = aut.project(ts.label(s0)?);
        for q0 in aut.initial_states() {
            for q in aut.next_states(q0, &label) {
                let s = (s0.clone(), q.clone());
                if add_product_state(&mut result, &s)? {
                    queue.push_back(s.clone());
                }
                result.set_initial(&s, true)?;
            }
        }
    }

    while let Some(from) = queue.pop_front() {
        let Some(moves) = outgoing.get(&from.0) else {
            continue;
        };
        for t in moves {
            let label = aut.project(ts.label(&t.to)?);
            for q in aut.next_states(&from.1, &label) {
                let to = (t.to.clone(), q.clone());
                if add_product_state(&mut result, &to)? {
                    queue.push_back(to.clone());
                }
                result.add_transition(Transition::new(from.clone(), t.action.clone(), to))?;
            }
        }
    }

    result.prune_unreachable();
    result.remove_unused_atomic_propositions();
    debug!(
        "product: {} states, {} transitions",
        result.num_states(),
        result.num_transitions()
    );
    Ok(result)
}
