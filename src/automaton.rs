//! Büchi automata over sets of atomic propositions.
//!
//! Transitions are keyed by the exact label (set of propositions) read. An
//! automaton also records its proposition *universe*: every proposition it can
//! observe. A model state's label is projected onto this universe before it is
//! matched against a transition.

use std::collections::BTreeMap;

use indexmap::{IndexMap, IndexSet};
use log::debug;

use crate::types::{Element, Label};

type Delta<Q, P> = IndexMap<Q, IndexMap<Label<P>, IndexSet<Q>>>;

/// Nondeterministic Büchi automaton with a single accepting set.
#[derive(Debug, Clone)]
pub struct Automaton<Q, P> {
    states: IndexSet<Q>,
    transitions: Delta<Q, P>,
    initial: IndexSet<Q>,
    accepting: IndexSet<Q>,
    propositions: Label<P>,
}

impl<Q, P> Default for Automaton<Q, P> {
    fn default() -> Self {
        Self {
            states: IndexSet::new(),
            transitions: IndexMap::new(),
            initial: IndexSet::new(),
            accepting: IndexSet::new(),
            propositions: Label::new(),
        }
    }
}

impl<Q, P> Automaton<Q, P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn states(&self) -> &IndexSet<Q> {
        &self.states
    }
    pub fn initial_states(&self) -> &IndexSet<Q> {
        &self.initial
    }
    pub fn accepting_states(&self) -> &IndexSet<Q> {
        &self.accepting
    }
    pub fn transitions(&self) -> &Delta<Q, P> {
        &self.transitions
    }
    /// The proposition universe.
    pub fn propositions(&self) -> &Label<P> {
        &self.propositions
    }

    pub fn num_states(&self) -> usize {
        self.states.len()
    }
    pub fn num_transitions(&self) -> usize {
        self.transitions
            .values()
            .flat_map(|by_label| by_label.values())
            .map(|targets| targets.len())
            .sum()
    }
}

impl<Q: Element, P: Element + Ord> Automaton<Q, P> {
    pub fn add_state(&mut self, q: Q) -> bool {
        self.states.insert(q)
    }

    pub fn add_proposition(&mut self, p: P) -> bool {
        self.propositions.insert(p)
    }

    pub fn add_propositions(&mut self, props: impl IntoIterator<Item = P>) {
        self.propositions.extend(props);
    }

    /// Adds `from --label--> to`, registering both states and every
    /// proposition of `label`.
    pub fn add_transition(&mut self, from: Q, label: Label<P>, to: Q) {
        self.states.insert(from.clone());
        self.states.insert(to.clone());
        self.propositions.extend(label.iter().cloned());
        self.transitions
            .entry(from)
            .or_default()
            .entry(label)
            .or_default()
            .insert(to);
    }

    pub fn set_initial(&mut self, q: Q) {
        self.states.insert(q.clone());
        self.initial.insert(q);
    }

    pub fn set_accepting(&mut self, q: Q) {
        self.states.insert(q.clone());
        self.accepting.insert(q);
    }

    pub fn is_initial(&self, q: &Q) -> bool {
        self.initial.contains(q)
    }

    pub fn is_accepting(&self, q: &Q) -> bool {
        self.accepting.contains(q)
    }

    /// Successors of `q` reading exactly `label`.
    pub fn next_states(&self, q: &Q, label: &Label<P>) -> impl Iterator<Item = &Q> {
        self.transitions
            .get(q)
            .and_then(|by_label| by_label.get(label))
            .into_iter()
            .flatten()
    }

    /// Restricts `label` to the proposition universe.
    pub fn project<'a>(&self, label: impl IntoIterator<Item = &'a P>) -> Label<P>
    where
        P: 'a,
    {
        label
            .into_iter()
            .filter(|p| self.propositions.contains(*p))
            .cloned()
            .collect()
    }
}

/// Generalized Büchi automaton: one accepting set per color.
#[derive(Debug, Clone)]
pub struct MultiColorAutomaton<Q, P> {
    states: IndexSet<Q>,
    transitions: Delta<Q, P>,
    initial: IndexSet<Q>,
    accepting: BTreeMap<usize, IndexSet<Q>>,
    propositions: Label<P>,
}

impl<Q, P> Default for MultiColorAutomaton<Q, P> {
    fn default() -> Self {
        Self {
            states: IndexSet::new(),
            transitions: IndexMap::new(),
            initial: IndexSet::new(),
            accepting: BTreeMap::new(),
            propositions: Label::new(),
        }
    }
}

impl<Q, P> MultiColorAutomaton<Q, P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn states(&self) -> &IndexSet<Q> {
        &self.states
    }
    pub fn initial_states(&self) -> &IndexSet<Q> {
        &self.initial
    }
    pub fn transitions(&self) -> &Delta<Q, P> {
        &self.transitions
    }
    pub fn propositions(&self) -> &Label<P> {
        &self.propositions
    }

    /// Colors in increasing order.
    pub fn colors(&self) -> impl Iterator<Item = usize> + '_ {
        self.accepting.keys().copied()
    }

    pub fn accepting_states(&self, color: usize) -> Option<&IndexSet<Q>> {
        self.accepting.get(&color)
    }
}

impl<Q: Element, P: Element + Ord> MultiColorAutomaton<Q, P> {
    pub fn add_state(&mut self, q: Q) -> bool {
        self.states.insert(q)
    }

    pub fn add_propositions(&mut self, props: impl IntoIterator<Item = P>) {
        self.propositions.extend(props);
    }

    pub fn add_transition(&mut self, from: Q, label: Label<P>, to: Q) {
        self.states.insert(from.clone());
        self.states.insert(to.clone());
        self.propositions.extend(label.iter().cloned());
        self.transitions
            .entry(from)
            .or_default()
            .entry(label)
            .or_default()
            .insert(to);
    }

    pub fn set_initial(&mut self, q: Q) {
        self.states.insert(q.clone());
        self.initial.insert(q);
    }

    /// Marks `q` accepting for `color`, creating the color if needed.
    pub fn set_accepting(&mut self, q: Q, color: usize) {
        self.states.insert(q.clone());
        self.accepting.entry(color).or_default().insert(q);
    }

    /// Declares `color` without marking any state.
    pub fn add_color(&mut self, color: usize) {
        self.accepting.entry(color).or_default();
    }

    /// Equivalent NBA over states `(q, copy)`.
    ///
    /// With `k = max(#colors, 1)` copies, a run moves from copy `i` to copy
    /// `(i + 1) mod k` when leaving a state accepting for the `i`-th color and
    /// stays in copy `i` otherwise. Initial and accepting states live in copy 0.
    /// A GNBA without any color accepts every run, so each copy-0 state is
    /// accepting.
    pub fn degeneralize(&self) -> Automaton<(Q, usize), P> {
        let colors: Vec<&IndexSet<Q>> = self.accepting.values().collect();
        let k = colors.len().max(1);
        let is_accepting = |q: &Q, i: usize| colors.get(i).map_or(true, |f| f.contains(q));

        let mut aut = Automaton::new();
        aut.add_propositions(self.propositions.iter().cloned());

        for q in &self.states {
            for i in 0..k {
                aut.add_state((q.clone(), i));
            }
        }
        for (from, by_label) in &self.transitions {
            for (label, targets) in by_label {
                for to in targets {
                    for i in 0..k {
                        let j = if is_accepting(from, i) { (i + 1) % k } else { i };
                        aut.add_transition((from.clone(), i), label.clone(), (to.clone(), j));
                    }
                }
            }
        }
        for q in &self.initial {
            aut.set_initial((q.clone(), 0));
        }
        for q in &self.states {
            if is_accepting(q, 0) {
                aut.set_accepting((q.clone(), 0));
            }
        }

        debug!(
            "degeneralize(k = {}): {} states, {} transitions",
            k,
            aut.num_states(),
            aut.num_transitions()
        );
        aut
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    fn label(props: &[&'static str]) -> Label<&'static str> {
        props.iter().copied().collect()
    }

    #[test]
    fn test_next_states() {
        let mut aut = Automaton::new();
        aut.add_transition(0, label(&["a"]), 1);
        aut.add_transition(0, label(&["a"]), 2);
        aut.add_transition(0, label(&[]), 0);
        aut.set_initial(0);
        aut.set_accepting(2);

        let next: Vec<_> = aut.next_states(&0, &label(&["a"])).copied().collect();
        assert_eq!(next, vec![1, 2]);
        assert_eq!(aut.next_states(&0, &label(&["b"])).count(), 0);
        assert_eq!(aut.next_states(&7, &label(&[])).count(), 0);
        assert_eq!(aut.num_states(), 3);
        assert_eq!(aut.num_transitions(), 3);
        assert!(aut.is_accepting(&2));
    }

    #[test]
    fn test_universe_projection() {
        let mut aut = Automaton::<u8, &str>::new();
        aut.add_transition(0, label(&["a"]), 0);
        aut.add_proposition("b");
        assert_eq!(aut.propositions(), &label(&["a", "b"]));
        assert_eq!(aut.project(["a", "c", "b"].iter()), label(&["a", "b"]));
    }

    #[test]
    fn test_degeneralize_two_colors() {
        // Colors 3 and 7 are renumbered to copies 0 and 1.
        let mut gnba = MultiColorAutomaton::new();
        gnba.add_transition("p", label(&["x"]), "q");
        gnba.add_transition("q", label(&[]), "p");
        gnba.set_initial("p");
        gnba.set_accepting("p", 3);
        gnba.set_accepting("q", 7);

        let nba = gnba.degeneralize();
        assert_eq!(nba.num_states(), 4);
        assert_eq!(nba.initial_states(), &IndexSet::from([("p", 0)]));
        assert_eq!(nba.accepting_states(), &IndexSet::from([("p", 0)]));
        let succ: Vec<_> = nba.next_states(&("p", 0), &label(&["x"])).cloned().collect();
        assert_eq!(succ, vec![("q", 1)]);
        let succ: Vec<_> = nba.next_states(&("q", 0), &label(&[])).cloned().collect();
        assert_eq!(succ, vec![("p", 0)]);
        let succ: Vec<_> = nba.next_states(&("q", 1), &label(&[])).cloned().collect();
        assert_eq!(succ, vec![("p", 0)]);
    }

    #[test]
    fn test_degeneralize_without_colors() {
        let mut gnba = MultiColorAutomaton::new();
        gnba.add_transition(0, label(&[]), 0);
        gnba.set_initial(0);
        let nba = gnba.degeneralize();
        assert_eq!(nba.num_states(), 1);
        assert!(nba.is_accepting(&(0, 0)));
    }

    #[test]
    fn test_degeneralize_empty_color_never_accepts() {
        let mut gnba = MultiColorAutomaton::new();
        gnba.add_transition(0, label(&[]), 0);
        gnba.set_initial(0);
        gnba.add_color(0);
        let nba = gnba.degeneralize();
        assert!(nba.accepting_states().is_empty());
    }
}
