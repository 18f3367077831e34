//! Labeled transition system container.
//!
//! A [`TransitionSystem`] owns its states, actions, transitions, atomic
//! propositions and labeling function. Every mutating operation validates its
//! arguments against the container first and leaves it unchanged on failure:
//!
//! - a transition may only connect known states via a known action,
//! - a label may only use declared atomic propositions,
//! - a state (action, proposition) may only be removed once nothing refers to it.
//!
//! Queries over the transition relation (`post`, `pre`, `reach`, ...) live in
//! [`traversal`][crate::traversal]; execution fragments and determinism checks
//! live in [`fragment`][crate::fragment].
//!
//! # Examples
//!
//! ```
//! use fvm_rs::transition_system::{Transition, TransitionSystem};
//!
//! let mut ts = TransitionSystem::new();
//! ts.add_states(["off", "on"]);
//! ts.add_action("toggle");
//! ts.add_atomic_proposition("lit");
//! ts.set_initial(&"off", true).unwrap();
//! ts.add_transition(Transition::new("off", "toggle", "on")).unwrap();
//! ts.add_transition(Transition::new("on", "toggle", "off")).unwrap();
//! ts.add_to_label(&"on", "lit").unwrap();
//!
//! assert_eq!(ts.num_states(), 2);
//! assert!(ts.label(&"on").unwrap().contains("lit"));
//! ```

use indexmap::{IndexMap, IndexSet};
use log::debug;

use crate::error::{FvmError, Result, TsPart};
use crate::types::Element;

/// A single step `from --action--> to`.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Transition<S, A> {
    pub from: S,
    pub action: A,
    pub to: S,
}

impl<S, A> Transition<S, A> {
    pub fn new(from: S, action: A, to: S) -> Self {
        Self { from, action, to }
    }
}

#[derive(Debug, Clone)]
pub struct TransitionSystem<S, A, P> {
    name: String,
    states: IndexSet<S>,
    initial: IndexSet<S>,
    actions: IndexSet<A>,
    transitions: IndexSet<Transition<S, A>>,
    atomic_propositions: IndexSet<P>,
    /// Every state has an entry, possibly empty.
    labels: IndexMap<S, IndexSet<P>>,
}

impl<S, A, P> Default for TransitionSystem<S, A, P> {
    fn default() -> Self {
        Self {
            name: String::new(),
            states: IndexSet::new(),
            initial: IndexSet::new(),
            actions: IndexSet::new(),
            transitions: IndexSet::new(),
            atomic_propositions: IndexSet::new(),
            labels: IndexMap::new(),
        }
    }
}

impl<S, A, P> TransitionSystem<S, A, P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn states(&self) -> &IndexSet<S> {
        &self.states
    }
    pub fn initial_states(&self) -> &IndexSet<S> {
        &self.initial
    }
    pub fn actions(&self) -> &IndexSet<A> {
        &self.actions
    }
    pub fn transitions(&self) -> &IndexSet<Transition<S, A>> {
        &self.transitions
    }
    pub fn atomic_propositions(&self) -> &IndexSet<P> {
        &self.atomic_propositions
    }
    pub fn labeling(&self) -> &IndexMap<S, IndexSet<P>> {
        &self.labels
    }

    pub fn num_states(&self) -> usize {
        self.states.len()
    }
    pub fn num_transitions(&self) -> usize {
        self.transitions.len()
    }
}

impl<S, A, P> TransitionSystem<S, A, P>
where
    S: Element,
    A: Element,
    P: Element,
{
    pub fn contains_state(&self, s: &S) -> bool {
        self.states.contains(s)
    }
    pub fn contains_action(&self, a: &A) -> bool {
        self.actions.contains(a)
    }
    pub fn is_initial(&self, s: &S) -> bool {
        self.initial.contains(s)
    }

    /// Adds a state with an empty label. Returns `false` if it was already present.
    pub fn add_state(&mut self, s: S) -> bool {
        if self.states.insert(s.clone()) {
            self.labels.entry(s).or_default();
            true
        } else {
            false
        }
    }

    pub fn add_states(&mut self, states: impl IntoIterator<Item = S>) {
        for s in states {
            self.add_state(s);
        }
    }

    pub fn set_initial(&mut self, s: &S, is_initial: bool) -> Result<()> {
        if !self.states.contains(s) {
            return Err(FvmError::state_not_found(s));
        }
        if is_initial {
            self.initial.insert(s.clone());
        } else {
            self.initial.shift_remove(s);
        }
        Ok(())
    }

    pub fn add_action(&mut self, a: A) -> bool {
        self.actions.insert(a)
    }

    pub fn add_actions(&mut self, actions: impl IntoIterator<Item = A>) {
        self.actions.extend(actions);
    }

    pub fn add_atomic_proposition(&mut self, p: P) -> bool {
        self.atomic_propositions.insert(p)
    }

    pub fn add_atomic_propositions(&mut self, props: impl IntoIterator<Item = P>) {
        self.atomic_propositions.extend(props);
    }

    /// Adds a transition between known states via a known action.
    ///
    /// Returns `false` if the transition was already present.
    pub fn add_transition(&mut self, t: Transition<S, A>) -> Result<bool> {
        if !self.states.contains(&t.from) || !self.states.contains(&t.to) || !self.actions.contains(&t.action) {
            return Err(FvmError::InvalidTransition(format!("{:?}", t)));
        }
        Ok(self.transitions.insert(t))
    }

    pub fn remove_transition(&mut self, t: &Transition<S, A>) -> bool {
        self.transitions.shift_remove(t)
    }

    /// Attaches the (declared) atomic proposition `p` to the label of `s`.
    pub fn add_to_label(&mut self, s: &S, p: P) -> Result<()> {
        if !self.atomic_propositions.contains(&p) {
            return Err(FvmError::AtomicPropositionNotFound(format!("{:?}", p)));
        }
        match self.labels.get_mut(s) {
            Some(label) => {
                label.insert(p);
                Ok(())
            }
            None => Err(FvmError::state_not_found(s)),
        }
    }

    pub fn label(&self, s: &S) -> Result<&IndexSet<P>> {
        self.labels.get(s).ok_or_else(|| FvmError::state_not_found(s))
    }

    pub fn remove_label(&mut self, s: &S, p: &P) -> bool {
        match self.labels.get_mut(s) {
            Some(label) => label.shift_remove(p),
            None => false,
        }
    }

    /// Removes a detached state.
    ///
    /// Fails if the state is initial, carries a non-empty label, or is incident
    /// to a transition. Returns `false` if the state was not present.
    pub fn remove_state(&mut self, s: &S) -> Result<bool> {
        if !self.states.contains(s) {
            return Ok(false);
        }
        let attached = self.initial.contains(s)
            || self.labels.get(s).is_some_and(|label| !label.is_empty())
            || self.transitions.iter().any(|t| &t.from == s || &t.to == s);
        if attached {
            return Err(FvmError::deletion_of_attached(TsPart::States, s));
        }
        self.labels.shift_remove(s);
        self.states.shift_remove(s);
        Ok(true)
    }

    /// Removes an action no transition uses. Returns `false` if it was not present.
    pub fn remove_action(&mut self, a: &A) -> Result<bool> {
        if self.transitions.iter().any(|t| &t.action == a) {
            return Err(FvmError::deletion_of_attached(TsPart::Actions, a));
        }
        Ok(self.actions.shift_remove(a))
    }

    /// Removes a proposition no label uses. Returns `false` if it was not present.
    pub fn remove_atomic_proposition(&mut self, p: &P) -> Result<bool> {
        if self.labels.values().any(|label| label.contains(p)) {
            return Err(FvmError::deletion_of_attached(TsPart::AtomicPropositions, p));
        }
        Ok(self.atomic_propositions.shift_remove(p))
    }

    /// Removes every state in `doomed` together with its incident transitions,
    /// label and initial mark.
    pub(crate) fn purge_states(&mut self, doomed: &IndexSet<S>) {
        if doomed.is_empty() {
            return;
        }
        debug!("purge_states(n = {})", doomed.len());
        self.transitions
            .retain(|t| !doomed.contains(&t.from) && !doomed.contains(&t.to));
        self.initial.retain(|s| !doomed.contains(s));
        self.labels.retain(|s, _| !doomed.contains(s));
        self.states.retain(|s| !doomed.contains(s));
    }

    /// Outgoing transitions grouped by source state.
    pub(crate) fn outgoing_index(&self) -> IndexMap<&S, Vec<&Transition<S, A>>> {
        let mut index: IndexMap<&S, Vec<&Transition<S, A>>> = IndexMap::new();
        for t in &self.transitions {
            index.entry(&t.from).or_default().push(t);
        }
        index
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    fn toggle() -> TransitionSystem<&'static str, &'static str, &'static str> {
        let mut ts = TransitionSystem::new();
        ts.add_states(["off", "on"]);
        ts.add_action("toggle");
        ts.add_atomic_proposition("lit");
        ts.set_initial(&"off", true).unwrap();
        ts.add_transition(Transition::new("off", "toggle", "on")).unwrap();
        ts.add_transition(Transition::new("on", "toggle", "off")).unwrap();
        ts.add_to_label(&"on", "lit").unwrap();
        ts
    }

    #[test]
    fn test_every_state_has_label_entry() {
        let mut ts: TransitionSystem<u32, (), ()> = TransitionSystem::new();
        ts.add_state(1);
        assert!(ts.label(&1).unwrap().is_empty());
        assert!(!ts.add_state(1));
    }

    #[test]
    fn test_set_initial_unknown_state() {
        let mut ts = toggle();
        assert_eq!(
            ts.set_initial(&"dim", true),
            Err(FvmError::StateNotFound("\"dim\"".to_string()))
        );
        ts.set_initial(&"off", false).unwrap();
        assert!(ts.initial_states().is_empty());
    }

    #[test]
    fn test_invalid_transition_rejected() {
        let mut ts = toggle();
        let before = ts.num_transitions();
        let res = ts.add_transition(Transition::new("off", "push", "on"));
        assert!(matches!(res, Err(FvmError::InvalidTransition(_))));
        let res = ts.add_transition(Transition::new("off", "toggle", "dim"));
        assert!(matches!(res, Err(FvmError::InvalidTransition(_))));
        assert_eq!(ts.num_transitions(), before);
    }

    #[test]
    fn test_label_requires_declared_proposition() {
        let mut ts = toggle();
        let res = ts.add_to_label(&"off", "dark");
        assert!(matches!(res, Err(FvmError::AtomicPropositionNotFound(_))));
        let res = ts.add_to_label(&"dim", "lit");
        assert!(matches!(res, Err(FvmError::StateNotFound(_))));
    }

    #[test]
    fn test_remove_attached_state() {
        let mut ts = toggle();

        // Initial.
        assert!(matches!(
            ts.remove_state(&"off"),
            Err(FvmError::DeletionOfAttached { part: TsPart::States, .. })
        ));

        // Labeled and incident to transitions.
        assert!(ts.remove_state(&"on").is_err());
        assert!(ts.remove_label(&"on", &"lit"));
        assert!(ts.remove_state(&"on").is_err());

        ts.remove_transition(&Transition::new("off", "toggle", "on"));
        ts.remove_transition(&Transition::new("on", "toggle", "off"));
        assert_eq!(ts.remove_state(&"on"), Ok(true));
        assert!(!ts.contains_state(&"on"));
        assert_eq!(ts.remove_state(&"on"), Ok(false));
    }

    #[test]
    fn test_remove_attached_action_and_proposition() {
        let mut ts = toggle();
        assert!(matches!(
            ts.remove_action(&"toggle"),
            Err(FvmError::DeletionOfAttached { part: TsPart::Actions, .. })
        ));
        assert!(matches!(
            ts.remove_atomic_proposition(&"lit"),
            Err(FvmError::DeletionOfAttached { part: TsPart::AtomicPropositions, .. })
        ));

        ts.remove_label(&"on", &"lit");
        assert_eq!(ts.remove_atomic_proposition(&"lit"), Ok(true));
        assert!(ts.atomic_propositions().is_empty());
    }

    #[test]
    fn test_purge_states() {
        let mut ts = toggle();
        let doomed = IndexSet::from(["on"]);
        ts.purge_states(&doomed);
        assert_eq!(ts.num_states(), 1);
        assert_eq!(ts.num_transitions(), 0);
        assert!(ts.label(&"on").is_err());
        assert!(ts.is_initial(&"off"));
    }
}
