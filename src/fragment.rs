//! Execution fragments and determinism checks.

use indexmap::{IndexMap, IndexSet};

use crate::error::{FvmError, Result};
use crate::transition_system::{Transition, TransitionSystem};
use crate::types::Element;

/// An alternating sequence `s0 a1 s1 a2 s2 ... an sn`.
///
/// Always starts and ends with a state, so there is exactly one more state than
/// there are actions.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct AlternatingSequence<S, A> {
    states: Vec<S>,
    actions: Vec<A>,
}

impl<S, A> AlternatingSequence<S, A> {
    /// A sequence consisting of a single state.
    pub fn new(head: S) -> Self {
        Self {
            states: vec![head],
            actions: Vec::new(),
        }
    }

    /// Returns `None` unless `states.len() == actions.len() + 1`.
    pub fn from_parts(states: Vec<S>, actions: Vec<A>) -> Option<Self> {
        if states.len() == actions.len() + 1 {
            Some(Self { states, actions })
        } else {
            None
        }
    }

    /// Extends the sequence by one step.
    pub fn then(mut self, action: A, state: S) -> Self {
        self.actions.push(action);
        self.states.push(state);
        self
    }

    pub fn head(&self) -> &S {
        &self.states[0]
    }
    pub fn last(&self) -> &S {
        &self.states[self.states.len() - 1]
    }
    pub fn states(&self) -> &[S] {
        &self.states
    }
    pub fn actions(&self) -> &[A] {
        &self.actions
    }

    /// Number of steps (actions) in the sequence.
    pub fn len(&self) -> usize {
        self.actions.len()
    }
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Iterates over the steps as `(from, action, to)`.
    pub fn steps(&self) -> impl Iterator<Item = (&S, &A, &S)> {
        self.actions
            .iter()
            .enumerate()
            .map(|(i, a)| (&self.states[i], a, &self.states[i + 1]))
    }
}

impl<S, A, P> TransitionSystem<S, A, P>
where
    S: Element,
    A: Element,
    P: Element,
{
    /// At most one initial state and no two transitions sharing `(from, action)`.
    pub fn is_action_deterministic(&self) -> bool {
        if self.initial_states().len() > 1 {
            return false;
        }
        let mut seen = IndexSet::new();
        self.transitions().iter().all(|t| seen.insert((&t.from, &t.action)))
    }

    /// At most one initial state and, for every state, distinct successors
    /// carry labels that are neither equal nor overlapping.
    pub fn is_ap_deterministic(&self) -> bool {
        if self.initial_states().len() > 1 {
            return false;
        }
        let mut successors: IndexMap<&S, IndexSet<&S>> = IndexMap::new();
        for t in self.transitions() {
            successors.entry(&t.from).or_default().insert(&t.to);
        }
        successors.values().all(|succ| {
            let labels: Vec<&IndexSet<P>> = succ.iter().map(|s| &self.labeling()[*s]).collect();
            labels.iter().enumerate().all(|(i, l1)| {
                labels[i + 1..]
                    .iter()
                    .all(|l2| l1 != l2 && l1.is_disjoint(l2))
            })
        })
    }

    /// Whether every step of `e` is a transition of this system.
    ///
    /// The sequence is walked one step at a time. An absent state or action
    /// fails, a missing transition yields `Ok(false)`; whichever comes first
    /// decides.
    pub fn is_execution_fragment(&self, e: &AlternatingSequence<S, A>) -> Result<bool> {
        if !self.contains_state(e.head()) {
            return Err(FvmError::state_not_found(e.head()));
        }
        for (from, a, to) in e.steps() {
            if !self.contains_action(a) {
                return Err(FvmError::action_not_found(a));
            }
            if !self.contains_state(to) {
                return Err(FvmError::state_not_found(to));
            }
            if !self
                .transitions()
                .contains(&Transition::new(from.clone(), a.clone(), to.clone()))
            {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// An execution fragment starting in an initial state.
    pub fn is_initial_execution_fragment(&self, e: &AlternatingSequence<S, A>) -> Result<bool> {
        Ok(self.is_execution_fragment(e)? && self.is_initial(e.head()))
    }

    /// An execution fragment ending in a terminal state.
    pub fn is_maximal_execution_fragment(&self, e: &AlternatingSequence<S, A>) -> Result<bool> {
        Ok(self.is_execution_fragment(e)? && self.is_state_terminal(e.last())?)
    }

    /// An initial, maximal execution fragment.
    pub fn is_execution(&self, e: &AlternatingSequence<S, A>) -> Result<bool> {
        Ok(self.is_initial_execution_fragment(e)? && self.is_state_terminal(e.last())?)
    }
}
