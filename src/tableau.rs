//! Translation of LTL formulas into Büchi automata.
//!
//! The states of the generalized automaton are the elementary sets of the
//! formula's closure. A transition `B --L--> B'` exists iff `L` is the set of
//! atomic propositions in `B` and
//!
//! ```text
//! X a in B      <=>  a in B'
//! a U b in B    <=>  b in B  or  (a in B  and  a U b in B')
//! ```
//!
//! Initial states are the sets containing the formula itself. Every until
//! `a U b` contributes one acceptance color `{ B | a U b not in B  or  b in B }`,
//! which rules out runs that postpone `b` forever.
//!
//! The formula is normalized first (see [`Ltl::normalize`]).

use log::debug;

use crate::automaton::{Automaton, MultiColorAutomaton};
use crate::closure::{Closure, ElementarySet};
use crate::ltl::Ltl;
use crate::types::{Element, Label};

/// State of an automaton produced by [`ltl_to_nba`]: an elementary set and a
/// degeneralization copy.
pub type LtlState = (ElementarySet, usize);

/// Generalized Büchi automaton accepting exactly the words satisfying `phi`.
pub fn ltl_to_gnba<P: Element + Ord>(phi: &Ltl<P>) -> MultiColorAutomaton<ElementarySet, P> {
    let phi = &phi.normalize();
    let closure = Closure::new(phi);
    let subformulas = closure.subformulas();

    let mut gnba = MultiColorAutomaton::new();
    gnba.add_propositions(phi.atomic_propositions());

    let label_of = |b: &ElementarySet| -> Label<P> {
        subformulas
            .iter()
            .enumerate()
            .filter_map(|(i, f)| match f {
                Ltl::Ap(p) if b.contains(i) => Some(p.clone()),
                _ => None,
            })
            .collect()
    };

    let step_ok = |b: &ElementarySet, b2: &ElementarySet| {
        subformulas.iter().enumerate().all(|(i, f)| match f {
            Ltl::Next(g) => b.contains(i) == closure.holds(g, b2),
            Ltl::Until(l, r) => {
                b.contains(i) == (closure.holds(r, b) || (closure.holds(l, b) && b2.contains(i)))
            }
            _ => true,
        })
    };

    for b in closure.elements() {
        gnba.add_state(b.clone());
        if closure.holds(phi, b) {
            gnba.set_initial(b.clone());
        }
    }

    for b in closure.elements() {
        let label = label_of(b);
        for b2 in closure.elements() {
            if step_ok(b, b2) {
                gnba.add_transition(b.clone(), label.clone(), b2.clone());
            }
        }
    }

    let mut color = 0;
    for (i, f) in subformulas.iter().enumerate() {
        if let Ltl::Until(_, r) = f {
            gnba.add_color(color);
            for b in closure.elements() {
                if !b.contains(i) || closure.holds(r, b) {
                    gnba.set_accepting(b.clone(), color);
                }
            }
            color += 1;
        }
    }
    if color == 0 {
        for b in closure.elements() {
            gnba.set_accepting(b.clone(), 0);
        }
    }

    debug!(
        "ltl_to_gnba: {} states, {} initial, {} colors",
        gnba.states().len(),
        gnba.initial_states().len(),
        gnba.colors().count()
    );
    gnba
}

/// Büchi automaton accepting exactly the words satisfying `phi`.
pub fn ltl_to_nba<P: Element + Ord>(phi: &Ltl<P>) -> Automaton<LtlState, P> {
    ltl_to_gnba(phi).degeneralize()
}
