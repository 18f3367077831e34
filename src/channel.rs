//! Channel systems: program graphs communicating through one-sided actions.
//!
//! A *one-sided* action names a channel and a direction:
//!
//! ```text
//! c!e    send the value of expression e on channel c
//! c?x    receive a value from channel c into variable x
//! c?     receive and discard (also c?_)
//! ```
//!
//! One-sided actions never fire alone. When two different components offer a
//! send and a receive on the same channel, the composition gets a joint edge
//! labeled `send|receive` guarded by the conjunction of both guards.

use indexmap::IndexSet;
use log::{debug, trace};

use crate::compose::combine_initializations;
use crate::program_graph::{PgTransition, ProgramGraph};
use crate::types::Element;
use crate::utils::conjoin;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Direction {
    Send,
    Receive,
}

/// A parsed one-sided action, borrowing from the action text.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct OneSided<'a> {
    pub channel: &'a str,
    pub direction: Direction,
    /// Sent expression or receiving variable; may be empty for a receive.
    pub payload: &'a str,
}

impl<'a> OneSided<'a> {
    /// Parses `c!e`, `c?x`, `c?` or `c?_`.
    ///
    /// Returns `None` for anything else, including joint labels (`a|b`) and
    /// comparisons such as `c != 0`.
    pub fn parse(action: &'a str) -> Option<Self> {
        if action.contains('|') {
            return None;
        }
        let pos = action.find(['?', '!'])?;
        let channel = action[..pos].trim();
        if channel.is_empty() || !channel.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return None;
        }
        let rest = &action[pos + 1..];
        let direction = match &action[pos..=pos] {
            "?" => Direction::Receive,
            _ if rest.starts_with('=') => return None,
            _ => Direction::Send,
        };
        let payload = rest.trim();
        if direction == Direction::Send && payload.is_empty() {
            return None;
        }
        Some(Self {
            channel,
            direction,
            payload,
        })
    }
}

pub fn is_one_sided(action: &str) -> bool {
    OneSided::parse(action).is_some()
}

/// Joint label of two complementary one-sided actions, send part first.
pub fn handshake_label(lhs: &str, rhs: &str) -> Option<String> {
    let a = OneSided::parse(lhs)?;
    let b = OneSided::parse(rhs)?;
    if a.channel != b.channel {
        return None;
    }
    match (a.direction, b.direction) {
        (Direction::Send, Direction::Receive) => Some(format!("{}|{}", lhs, rhs)),
        (Direction::Receive, Direction::Send) => Some(format!("{}|{}", rhs, lhs)),
        _ => None,
    }
}

/// An ordered collection of program graphs sharing channels and variables.
#[derive(Debug, Clone)]
pub struct ChannelSystem<L> {
    program_graphs: Vec<ProgramGraph<L>>,
}

impl<L> Default for ChannelSystem<L> {
    fn default() -> Self {
        Self {
            program_graphs: Vec::new(),
        }
    }
}

impl<L> ChannelSystem<L> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_program_graph(&mut self, pg: ProgramGraph<L>) {
        self.program_graphs.push(pg);
    }

    pub fn program_graphs(&self) -> &[ProgramGraph<L>] {
        &self.program_graphs
    }
}

impl<L> FromIterator<ProgramGraph<L>> for ChannelSystem<L> {
    fn from_iter<I: IntoIterator<Item = ProgramGraph<L>>>(iter: I) -> Self {
        Self {
            program_graphs: iter.into_iter().collect(),
        }
    }
}

impl<L: Element> ChannelSystem<L> {
    /// Composes all components into one program graph over location vectors.
    ///
    /// Components are folded in left to right. One-sided edges without a
    /// partner are kept while folding, so that a component can synchronize
    /// with any later one, and are dropped from the final graph.
    pub fn compose(&self) -> ProgramGraph<Vec<L>> {
        let mut iter = self.program_graphs.iter();
        let Some(first) = iter.next() else {
            return ProgramGraph::new();
        };

        let mut pg = lift(first);
        for pgi in iter {
            pg = add_component(&pg, pgi);
        }

        let unpaired: Vec<PgTransition<Vec<L>>> = pg
            .transitions()
            .iter()
            .filter(|t| is_one_sided(&t.action))
            .cloned()
            .collect();
        for t in &unpaired {
            pg.remove_transition(t);
        }
        pg.prune_unreachable();

        debug!(
            "compose(n = {}): {} locations, {} transitions, {} unpaired one-sided edges dropped",
            self.program_graphs.len(),
            pg.locations().len(),
            pg.transitions().len(),
            unpaired.len()
        );
        pg
    }
}

/// Wraps every location of `pg` into a one-element vector.
fn lift<L: Element>(pg: &ProgramGraph<L>) -> ProgramGraph<Vec<L>> {
    let mut result = ProgramGraph::new();
    result.set_name(pg.name());
    for l in pg.locations() {
        if pg.initial_locations().contains(l) {
            result.add_initial_location(vec![l.clone()]);
        } else {
            result.add_location(vec![l.clone()]);
        }
    }
    for t in pg.transitions() {
        result.add_transition(PgTransition::new(
            vec![t.from.clone()],
            t.condition.clone(),
            t.action.clone(),
            vec![t.to.clone()],
        ));
    }
    for init in pg.initializations() {
        result.add_initialization(init.clone());
    }
    result
}

fn extend<L: Clone>(prefix: &[L], last: &L) -> Vec<L> {
    let mut v = prefix.to_vec();
    v.push(last.clone());
    v
}

/// Composes the accumulated graph with one more component.
fn add_component<L: Element>(acc: &ProgramGraph<Vec<L>>, pgi: &ProgramGraph<L>) -> ProgramGraph<Vec<L>> {
    let mut pg = ProgramGraph::new();
    pg.set_name(format!("{} || {}", acc.name(), pgi.name()));

    for locs in acc.locations() {
        for l in pgi.locations() {
            let loc = extend(locs, l);
            if acc.initial_locations().contains(locs) && pgi.initial_locations().contains(l) {
                pg.add_initial_location(loc);
            } else {
                pg.add_location(loc);
            }
        }
    }

    for t in acc.transitions() {
        for l in pgi.locations() {
            pg.add_transition(PgTransition::new(
                extend(&t.from, l),
                t.condition.clone(),
                t.action.clone(),
                extend(&t.to, l),
            ));
        }
    }
    for t in pgi.transitions() {
        for locs in acc.locations() {
            pg.add_transition(PgTransition::new(
                extend(locs, &t.from),
                t.condition.clone(),
                t.action.clone(),
                extend(locs, &t.to),
            ));
        }
    }

    for t in acc.transitions() {
        for ti in pgi.transitions() {
            if let Some(action) = handshake_label(&t.action, &ti.action) {
                trace!("joint edge {} from {:?} and {:?}", action, t.from, ti.from);
                pg.add_transition(PgTransition::new(
                    extend(&t.from, &ti.from),
                    conjoin(&t.condition, &ti.condition),
                    action,
                    extend(&t.to, &ti.to),
                ));
            }
        }
    }

    let inits: IndexSet<Vec<String>> = combine_initializations(acc.initializations(), pgi.initializations());
    for init in inits {
        pg.add_initialization(init);
    }

    pg.prune_unreachable();
    pg
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    fn self_loop(loc: &'static str, action: &str) -> ProgramGraph<&'static str> {
        let mut pg = ProgramGraph::new();
        pg.set_name(loc);
        pg.add_initial_location(loc);
        pg.add_transition(PgTransition::new(loc, "", action, loc));
        pg
    }

    #[test]
    fn test_parse_one_sided() {
        let send = OneSided::parse("c!x + 1").unwrap();
        assert_eq!(send.channel, "c");
        assert_eq!(send.direction, Direction::Send);
        assert_eq!(send.payload, "x + 1");

        let recv = OneSided::parse("_in1?y").unwrap();
        assert_eq!(recv.channel, "_in1");
        assert_eq!(recv.direction, Direction::Receive);
        assert_eq!(recv.payload, "y");

        assert_eq!(OneSided::parse("c?").unwrap().payload, "");
        assert!(OneSided::parse("c!").is_none());
        assert!(OneSided::parse("x != 1").is_none());
        assert!(OneSided::parse("c!1|c?x").is_none());
        assert!(OneSided::parse("x := 1").is_none());
        assert!(OneSided::parse("?x").is_none());
    }

    #[test]
    fn test_handshake_label() {
        assert_eq!(handshake_label("c?x", "c!5"), Some("c!5|c?x".to_string()));
        assert_eq!(handshake_label("c!5", "c?x"), Some("c!5|c?x".to_string()));
        assert_eq!(handshake_label("c!5", "d?x"), None);
        assert_eq!(handshake_label("c?y", "c?x"), None);
        assert_eq!(handshake_label("x := 1", "c?x"), None);
    }

    #[test]
    fn test_send_receive_pair() {
        let cs: ChannelSystem<_> = [self_loop("a", "c?x"), self_loop("b", "c!1")].into_iter().collect();
        let pg = cs.compose();
        assert_eq!(pg.locations(), &IndexSet::from([vec!["a", "b"]]));
        assert_eq!(pg.transitions().len(), 1);
        let t = &pg.transitions()[0];
        assert_eq!(t.action, "c!1|c?x");
    }

    #[test]
    fn test_guards_are_conjoined() {
        let mut sender = self_loop("a", "c!1");
        sender.add_location("a2");
        sender.add_transition(PgTransition::new("a", "x > 0", "c!2", "a2"));
        let mut receiver = ProgramGraph::new();
        receiver.add_initial_location("b");
        receiver.add_transition(PgTransition::new("b", "y < 3", "c?y", "b"));

        let pg = ChannelSystem::from_iter([sender, receiver]).compose();
        let guarded: Vec<_> = pg.transitions().iter().filter(|t| t.action == "c!2|c?y").collect();
        assert_eq!(guarded.len(), 1);
        assert_eq!(guarded[0].condition, "(x > 0) && (y < 3)");
    }

    #[test]
    fn test_partner_in_later_component() {
        // The receiver is the third component; the sender must survive the
        // composition with the unrelated second one.
        let cs = ChannelSystem::from_iter([self_loop("a", "c!1"), self_loop("m", "x := 1"), self_loop("b", "c?y")]);
        let pg = cs.compose();
        let actions: IndexSet<&str> = pg.transitions().iter().map(|t| t.action.as_str()).collect();
        assert_eq!(actions, IndexSet::from(["x := 1", "c!1|c?y"]));
    }

    #[test]
    fn test_unpaired_dropped() {
        let cs = ChannelSystem::from_iter([self_loop("a", "c!1"), self_loop("b", "d?y")]);
        let pg = cs.compose();
        assert_eq!(pg.locations().len(), 1);
        assert!(pg.transitions().is_empty());
    }

    #[test]
    fn test_empty_system() {
        let cs: ChannelSystem<&str> = ChannelSystem::new();
        assert!(cs.compose().locations().is_empty());
    }
}
