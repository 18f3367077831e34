//! Program graphs: locations connected by guarded, action-labeled edges.
//!
//! Guards and actions are plain text, interpreted later by
//! [`ConditionDef`][crate::eval::ConditionDef] and
//! [`ActionDef`][crate::eval::ActionDef] when a transition system is built
//! from the graph. An *initialization* is a list of actions applied, in order,
//! to the empty valuation to produce one initial valuation.

use std::collections::VecDeque;

use indexmap::IndexSet;
use log::debug;

use crate::error::{FvmError, Result};
use crate::types::Element;

/// A guarded edge `from --[condition] action--> to`.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PgTransition<L> {
    pub from: L,
    pub condition: String,
    pub action: String,
    pub to: L,
}

impl<L> PgTransition<L> {
    pub fn new(from: L, condition: impl Into<String>, action: impl Into<String>, to: L) -> Self {
        Self {
            from,
            condition: condition.into(),
            action: action.into(),
            to,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProgramGraph<L> {
    name: String,
    locations: IndexSet<L>,
    initial: IndexSet<L>,
    transitions: IndexSet<PgTransition<L>>,
    initializations: IndexSet<Vec<String>>,
}

impl<L> Default for ProgramGraph<L> {
    fn default() -> Self {
        Self {
            name: String::new(),
            locations: IndexSet::new(),
            initial: IndexSet::new(),
            transitions: IndexSet::new(),
            initializations: IndexSet::new(),
        }
    }
}

impl<L> ProgramGraph<L> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn locations(&self) -> &IndexSet<L> {
        &self.locations
    }
    pub fn initial_locations(&self) -> &IndexSet<L> {
        &self.initial
    }
    pub fn transitions(&self) -> &IndexSet<PgTransition<L>> {
        &self.transitions
    }
    pub fn initializations(&self) -> &IndexSet<Vec<String>> {
        &self.initializations
    }
}

impl<L: Element> ProgramGraph<L> {
    pub fn add_location(&mut self, location: L) -> bool {
        self.locations.insert(location)
    }

    /// Adds a location and marks it initial.
    pub fn add_initial_location(&mut self, location: L) {
        self.locations.insert(location.clone());
        self.initial.insert(location);
    }

    pub fn set_initial(&mut self, location: &L, is_initial: bool) -> Result<()> {
        if !self.locations.contains(location) {
            return Err(FvmError::LocationNotFound(format!("{:?}", location)));
        }
        if is_initial {
            self.initial.insert(location.clone());
        } else {
            self.initial.shift_remove(location);
        }
        Ok(())
    }

    /// Adds a transition between known locations.
    ///
    /// A transition with an unknown endpoint is ignored; returns whether the
    /// transition was added.
    pub fn add_transition(&mut self, t: PgTransition<L>) -> bool {
        if self.locations.contains(&t.from) && self.locations.contains(&t.to) {
            self.transitions.insert(t)
        } else {
            false
        }
    }

    pub fn remove_transition(&mut self, t: &PgTransition<L>) -> bool {
        self.transitions.shift_remove(t)
    }

    /// Removes a location together with every transition incident to it.
    pub fn remove_location(&mut self, location: &L) -> bool {
        self.transitions
            .retain(|t| &t.from != location && &t.to != location);
        self.initial.shift_remove(location);
        self.locations.shift_remove(location)
    }

    pub fn add_initialization(&mut self, init: Vec<String>) -> bool {
        self.initializations.insert(init)
    }

    /// Locations reachable from the initial ones, ignoring guards.
    pub fn reachable_locations(&self) -> IndexSet<L> {
        let mut reached: IndexSet<L> = self.initial.clone();
        let mut queue: VecDeque<L> = self.initial.iter().cloned().collect();
        while let Some(loc) = queue.pop_front() {
            for t in self.transitions.iter().filter(|t| t.from == loc) {
                if reached.insert(t.to.clone()) {
                    queue.push_back(t.to.clone());
                }
            }
        }
        reached
    }

    /// Removes locations unreachable from the initial ones, with their transitions.
    ///
    /// Returns the number of removed locations.
    pub fn prune_unreachable(&mut self) -> usize {
        let reached = self.reachable_locations();
        let before = self.locations.len();
        self.transitions
            .retain(|t| reached.contains(&t.from) && reached.contains(&t.to));
        self.locations.retain(|l| reached.contains(l));
        let removed = before - self.locations.len();
        debug!("prune_unreachable: {} locations kept, {} removed", reached.len(), removed);
        removed
    }
}
