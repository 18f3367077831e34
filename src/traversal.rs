//! One-step and fixed-point queries over a transition system.
//!
//! `post`/`pre` scan the transition relation and fail with
//! [`StateNotFound`][crate::error::FvmError::StateNotFound] when asked about a
//! state the system does not contain. [`reach`][TransitionSystem::reach]
//! computes the least set containing the initial states and closed under `post`.

use std::collections::VecDeque;

use indexmap::{IndexMap, IndexSet};
use log::debug;

use crate::error::{FvmError, Result};
use crate::fragment::AlternatingSequence;
use crate::transition_system::TransitionSystem;
use crate::types::Element;

impl<S, A, P> TransitionSystem<S, A, P>
where
    S: Element,
    A: Element,
    P: Element,
{
    fn ensure_state(&self, s: &S) -> Result<()> {
        if self.contains_state(s) {
            Ok(())
        } else {
            Err(FvmError::state_not_found(s))
        }
    }

    /// Direct successors of `s`.
    pub fn post(&self, s: &S) -> Result<IndexSet<S>> {
        self.ensure_state(s)?;
        Ok(self
            .transitions()
            .iter()
            .filter(|t| &t.from == s)
            .map(|t| t.to.clone())
            .collect())
    }

    /// Direct successors of `s` via action `a`.
    pub fn post_by(&self, s: &S, a: &A) -> Result<IndexSet<S>> {
        self.ensure_state(s)?;
        Ok(self
            .transitions()
            .iter()
            .filter(|t| &t.from == s && &t.action == a)
            .map(|t| t.to.clone())
            .collect())
    }

    /// Direct successors of every state in `states`.
    pub fn post_all<'a>(&self, states: impl IntoIterator<Item = &'a S>) -> Result<IndexSet<S>>
    where
        S: 'a,
    {
        let mut result = IndexSet::new();
        for s in states {
            result.extend(self.post(s)?);
        }
        Ok(result)
    }

    /// Direct successors of every state in `states` via action `a`.
    pub fn post_all_by<'a>(&self, states: impl IntoIterator<Item = &'a S>, a: &A) -> Result<IndexSet<S>>
    where
        S: 'a,
    {
        let mut result = IndexSet::new();
        for s in states {
            result.extend(self.post_by(s, a)?);
        }
        Ok(result)
    }

    /// Direct predecessors of `s`.
    pub fn pre(&self, s: &S) -> Result<IndexSet<S>> {
        self.ensure_state(s)?;
        Ok(self
            .transitions()
            .iter()
            .filter(|t| &t.to == s)
            .map(|t| t.from.clone())
            .collect())
    }

    /// Direct predecessors of `s` via action `a`.
    pub fn pre_by(&self, s: &S, a: &A) -> Result<IndexSet<S>> {
        self.ensure_state(s)?;
        Ok(self
            .transitions()
            .iter()
            .filter(|t| &t.to == s && &t.action == a)
            .map(|t| t.from.clone())
            .collect())
    }

    /// Direct predecessors of every state in `states`.
    pub fn pre_all<'a>(&self, states: impl IntoIterator<Item = &'a S>) -> Result<IndexSet<S>>
    where
        S: 'a,
    {
        let mut result = IndexSet::new();
        for s in states {
            result.extend(self.pre(s)?);
        }
        Ok(result)
    }

    /// Direct predecessors of every state in `states` via action `a`.
    pub fn pre_all_by<'a>(&self, states: impl IntoIterator<Item = &'a S>, a: &A) -> Result<IndexSet<S>>
    where
        S: 'a,
    {
        let mut result = IndexSet::new();
        for s in states {
            result.extend(self.pre_by(s, a)?);
        }
        Ok(result)
    }

    /// Whether `s` has no outgoing transition.
    pub fn is_state_terminal(&self, s: &S) -> Result<bool> {
        self.ensure_state(s)?;
        Ok(!self.transitions().iter().any(|t| &t.from == s))
    }

    /// Reachable states: the least fixed point of the initial states under `post`.
    pub fn reach(&self) -> IndexSet<S> {
        self.reach_tree().into_keys().collect()
    }

    /// Breadth-first reachability tree.
    ///
    /// Maps every reachable state to the `(predecessor, action)` it was first
    /// discovered from, or `None` for initial states.
    pub fn reach_tree(&self) -> IndexMap<S, Option<(S, A)>> {
        let index = self.outgoing_index();
        let mut parents: IndexMap<S, Option<(S, A)>> = IndexMap::new();
        let mut queue = VecDeque::new();

        for s in self.initial_states() {
            if parents.insert(s.clone(), None).is_none() {
                queue.push_back(s);
            }
        }

        while let Some(s) = queue.pop_front() {
            let Some(outgoing) = index.get(s) else {
                continue;
            };
            for t in outgoing {
                if !parents.contains_key(&t.to) {
                    parents.insert(t.to.clone(), Some((s.clone(), t.action.clone())));
                    queue.push_back(&t.to);
                }
            }
        }

        parents
    }

    /// Shortest initial execution fragment ending in `target`, if `target` is reachable.
    pub fn path_to(&self, target: &S) -> Option<AlternatingSequence<S, A>> {
        let parents = self.reach_tree();
        if !parents.contains_key(target) {
            return None;
        }

        let mut states = vec![target.clone()];
        let mut actions = Vec::new();
        let mut current = target;
        while let Some(Some((prev, action))) = parents.get(current) {
            states.push(prev.clone());
            actions.push(action.clone());
            current = prev;
        }
        states.reverse();
        actions.reverse();
        AlternatingSequence::from_parts(states, actions)
    }

    /// Removes unreachable states together with their transitions and labels.
    ///
    /// Returns the number of removed states.
    pub fn prune_unreachable(&mut self) -> usize {
        let reachable = self.reach();
        let doomed: IndexSet<S> = self
            .states()
            .iter()
            .filter(|s| !reachable.contains(*s))
            .cloned()
            .collect();
        debug!(
            "prune_unreachable: {} reachable, {} removed",
            reachable.len(),
            doomed.len()
        );
        self.purge_states(&doomed);
        doomed.len()
    }

    /// Removes atomic propositions that no label mentions.
    ///
    /// Returns the number of removed propositions.
    pub fn remove_unused_atomic_propositions(&mut self) -> usize {
        let used: IndexSet<P> = self.labeling().values().flatten().cloned().collect();
        let unused: Vec<P> = self
            .atomic_propositions()
            .iter()
            .filter(|p| !used.contains(*p))
            .cloned()
            .collect();
        for p in &unused {
            // Unused by construction, so removal cannot fail.
            let _ = self.remove_atomic_proposition(p);
        }
        unused.len()
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::transition_system::Transition;

    /// 1 -a-> 2 -b-> 3 -c-> 1, plus an unreachable 4 -a-> 1.
    fn triangle() -> TransitionSystem<u32, char, &'static str> {
        let mut ts = TransitionSystem::new();
        ts.add_states([1, 2, 3, 4]);
        ts.add_actions(['a', 'b', 'c']);
        ts.set_initial(&1, true).unwrap();
        ts.add_transition(Transition::new(1, 'a', 2)).unwrap();
        ts.add_transition(Transition::new(2, 'b', 3)).unwrap();
        ts.add_transition(Transition::new(3, 'c', 1)).unwrap();
        ts.add_transition(Transition::new(4, 'a', 1)).unwrap();
        ts
    }

    #[test]
    fn test_post_pre() {
        let ts = triangle();
        assert_eq!(ts.post(&1).unwrap(), IndexSet::from([2]));
        assert_eq!(ts.pre(&1).unwrap(), IndexSet::from([3, 4]));
        assert_eq!(ts.post_by(&1, &'b').unwrap(), IndexSet::new());
        assert_eq!(ts.pre_by(&1, &'a').unwrap(), IndexSet::from([4]));
        assert_eq!(ts.post_all([&1, &2]).unwrap(), IndexSet::from([2, 3]));
        assert_eq!(ts.pre_all_by([&1, &2], &'a').unwrap(), IndexSet::from([4, 1]));
        assert_eq!(ts.post_all_by([&3, &4], &'c').unwrap(), IndexSet::from([1]));
        assert_eq!(ts.pre_all([&2, &3]).unwrap(), IndexSet::from([1, 2]));
    }

    #[test]
    fn test_post_of_pre_contains_state() {
        let ts = triangle();
        for s in [1, 2, 3] {
            let pre = ts.pre(&s).unwrap();
            assert!(!pre.is_empty());
            assert!(ts.post_all(pre.iter()).unwrap().contains(&s));
        }
    }

    #[test]
    fn test_unknown_state() {
        let ts = triangle();
        assert_eq!(ts.post(&9), Err(FvmError::StateNotFound("9".to_string())));
        assert!(ts.pre(&9).is_err());
        assert!(ts.post_all([&1, &9]).is_err());
        assert!(ts.is_state_terminal(&9).is_err());
    }

    #[test]
    fn test_terminal() {
        let mut ts = triangle();
        assert!(!ts.is_state_terminal(&1).unwrap());
        ts.add_state(5);
        assert!(ts.is_state_terminal(&5).unwrap());
    }

    #[test]
    fn test_reach() {
        let ts = triangle();
        assert_eq!(ts.reach(), IndexSet::from([1, 2, 3]));
    }

    #[test]
    fn test_path_to_replays() {
        let ts = triangle();
        let path = ts.path_to(&3).unwrap();
        assert_eq!(path.states(), &[1, 2, 3]);
        assert_eq!(path.actions(), &['a', 'b']);
        assert!(ts.is_initial_execution_fragment(&path).unwrap());
        assert!(ts.path_to(&4).is_none());
    }

    #[test]
    fn test_prune_unreachable() {
        let mut ts = triangle();
        ts.add_atomic_proposition("p");
        ts.add_to_label(&4, "p").unwrap();
        assert_eq!(ts.prune_unreachable(), 1);
        assert!(!ts.contains_state(&4));
        assert_eq!(ts.num_transitions(), 3);
        assert_eq!(ts.prune_unreachable(), 0);
        assert_eq!(ts.remove_unused_atomic_propositions(), 1);
    }
}
