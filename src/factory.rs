//! Hand-built Büchi automata for common ω-regular patterns.
//!
//! Each automaton reads labels over the atomic propositions of a given
//! transition system and is described by predicates over those labels, so a
//! property such as "eventually both processes are critical" is written as
//! `factory.eventually(|l| l.contains("crit1") && l.contains("crit2"))`.

use crate::automaton::Automaton;
use crate::error::{FvmError, Result};
use crate::transition_system::TransitionSystem;
use crate::types::{Element, Label};
use crate::utils::{power_set, MAX_POWER_SET_ELEMENTS};

/// Labels are enumerated explicitly, so the proposition count is bounded.
pub const MAX_PROPOSITIONS: usize = MAX_POWER_SET_ELEMENTS;

#[derive(Debug, Clone)]
pub struct AutomataFactory<P> {
    universe: Label<P>,
    all: Vec<Label<P>>,
}

impl<P: Element + Ord> AutomataFactory<P> {
    /// Factory over the atomic propositions of `ts`.
    pub fn new<S, A>(ts: &TransitionSystem<S, A, P>) -> Result<Self> {
        Self::with_propositions(ts.atomic_propositions().iter().cloned())
    }

    pub fn with_propositions(props: impl IntoIterator<Item = P>) -> Result<Self> {
        let universe: Label<P> = props.into_iter().collect();
        if universe.len() > MAX_PROPOSITIONS {
            return Err(FvmError::UnsupportedComposition(format!(
                "{} atomic propositions exceed the limit of {} for label enumeration",
                universe.len(),
                MAX_PROPOSITIONS
            )));
        }
        let all = power_set(universe.iter().cloned())?;
        Ok(Self { universe, all })
    }

    fn automaton(&self) -> Automaton<&'static str, P> {
        let mut aut = Automaton::new();
        aut.add_propositions(self.universe.iter().cloned());
        aut
    }

    fn labels<'a>(&'a self, pred: impl Fn(&Label<P>) -> bool + 'a) -> impl Iterator<Item = &'a Label<P>> + 'a {
        self.all.iter().filter(move |&l| pred(l))
    }

    /// `◇φ`
    pub fn eventually(&self, phi: impl Fn(&Label<P>) -> bool) -> Automaton<&'static str, P> {
        let mut aut = self.automaton();
        for l in &self.all {
            if phi(l) {
                aut.add_transition("q0", l.clone(), "q1");
            } else {
                aut.add_transition("q0", l.clone(), "q0");
            }
            aut.add_transition("q1", l.clone(), "q1");
        }
        aut.set_initial("q0");
        aut.set_accepting("q1");
        aut
    }

    /// `□◇φ`: `q1` is entered on every label satisfying `φ`.
    pub fn always_eventually(&self, phi: impl Fn(&Label<P>) -> bool) -> Automaton<&'static str, P> {
        let mut aut = self.automaton();
        for l in &self.all {
            let to = if phi(l) { "q1" } else { "q0" };
            aut.add_transition("q0", l.clone(), to);
            aut.add_transition("q1", l.clone(), to);
        }
        aut.set_initial("q0");
        aut.set_accepting("q1");
        aut
    }

    /// `◇□φ`: guess the point after which `φ` holds forever.
    pub fn eventually_always(&self, phi: impl Fn(&Label<P>) -> bool) -> Automaton<&'static str, P> {
        let mut aut = self.automaton();
        for l in &self.all {
            aut.add_transition("q0", l.clone(), "q0");
        }
        for l in self.labels(&phi) {
            aut.add_transition("q0", l.clone(), "q1");
            aut.add_transition("q1", l.clone(), "q1");
        }
        aut.set_initial("q0");
        aut.set_accepting("q1");
        aut
    }

    /// `◇(φ1 ∧ X□φ2)`
    pub fn eventually_then_always(
        &self,
        phi1: impl Fn(&Label<P>) -> bool,
        phi2: impl Fn(&Label<P>) -> bool,
    ) -> Automaton<&'static str, P> {
        let mut aut = self.automaton();
        for l in &self.all {
            aut.add_transition("q0", l.clone(), "q0");
        }
        for l in self.labels(&phi1) {
            aut.add_transition("q0", l.clone(), "q1");
        }
        for l in self.labels(&phi2) {
            aut.add_transition("q1", l.clone(), "q1");
        }
        aut.set_initial("q0");
        aut.set_accepting("q1");
        aut
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    fn factory() -> AutomataFactory<&'static str> {
        AutomataFactory::with_propositions(["p", "q"]).unwrap()
    }

    #[test]
    fn test_eventually() {
        let aut = factory().eventually(|l| l.contains("p"));
        assert_eq!(aut.num_states(), 2);
        // q0 reads 4 labels, q1 loops on 4.
        assert_eq!(aut.num_transitions(), 8);
        assert_eq!(aut.propositions().len(), 2);
        let p = Label::from(["p"]);
        assert_eq!(aut.next_states(&"q0", &p).collect::<Vec<_>>(), vec![&"q1"]);
        assert_eq!(aut.next_states(&"q0", &Label::new()).collect::<Vec<_>>(), vec![&"q0"]);
    }

    #[test]
    fn test_always_eventually() {
        let aut = factory().always_eventually(|l| l.contains("q"));
        let q = Label::from(["q"]);
        assert_eq!(aut.next_states(&"q0", &q).collect::<Vec<_>>(), vec![&"q1"]);
        assert_eq!(aut.next_states(&"q1", &Label::new()).collect::<Vec<_>>(), vec![&"q0"]);
        assert!(aut.is_accepting(&"q1"));
    }

    #[test]
    fn test_eventually_then_always() {
        let aut = factory().eventually_then_always(|l| l.contains("p"), |l| !l.contains("q"));
        // q0: 4 self-loops + 2 labels with p; q1: 2 labels without q.
        assert_eq!(aut.num_transitions(), 8);
    }

    #[test]
    fn test_too_many_propositions() {
        let props: Vec<String> = (0..=MAX_PROPOSITIONS).map(|i| format!("p{}", i)).collect();
        assert!(matches!(
            AutomataFactory::with_propositions(props),
            Err(FvmError::UnsupportedComposition(_))
        ));
    }
}
