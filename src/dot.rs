//! Transition systems and automata to DOT (Graphviz).
//!
//! The output is meant for humans and can be rendered with `dot`, `neato` or
//! an online viewer:
//!
//! - states are numbered by insertion order and labeled with their `Debug`
//!   rendering (plus the atomic propositions that hold, if enabled)
//! - initial states are marked by an arrow from an invisible point node
//! - accepting automaton states are drawn with a double border
//! - edges carry the action (transition systems) or the label read (automata)
//!
//! # Examples
//!
//! ```
//! use fvm_rs::transition_system::{Transition, TransitionSystem};
//!
//! let mut ts: TransitionSystem<&str, &str, &str> = TransitionSystem::new();
//! ts.add_states(["off", "on"]);
//! ts.add_action("toggle");
//! ts.set_initial(&"off", true).unwrap();
//! ts.add_transition(Transition::new("off", "toggle", "on")).unwrap();
//!
//! let dot = ts.to_dot().unwrap();
//! // Write to file and render with: dot -Tpng output.dot -o output.png
//! assert!(dot.starts_with("digraph"));
//! ```

use std::fmt::{Debug, Write as _};

use crate::automaton::Automaton;
use crate::transition_system::TransitionSystem;
use crate::types::Element;

/// Configuration options for DOT output generation.
///
/// ```
/// use fvm_rs::dot::DotConfig;
///
/// let config = DotConfig::default().with_labels(false).with_rankdir("TB");
/// assert_eq!(config.rankdir, "TB");
/// ```
#[derive(Debug, Clone)]
pub struct DotConfig {
    /// Shape for ordinary states (default: "circle")
    pub node_shape: &'static str,
    /// Shape for accepting automaton states (default: "doublecircle")
    pub accepting_shape: &'static str,
    /// Graph layout direction (default: "LR")
    pub rankdir: &'static str,
    /// Whether to print the label of each transition-system state (default: true)
    pub show_labels: bool,
    /// Whether to print actions on edges (default: true)
    pub show_actions: bool,
}

impl Default for DotConfig {
    fn default() -> Self {
        Self {
            node_shape: "circle",
            accepting_shape: "doublecircle",
            rankdir: "LR",
            show_labels: true,
            show_actions: true,
        }
    }
}

impl DotConfig {
    pub fn with_node_shape(mut self, shape: &'static str) -> Self {
        self.node_shape = shape;
        self
    }
    pub fn with_accepting_shape(mut self, shape: &'static str) -> Self {
        self.accepting_shape = shape;
        self
    }
    pub fn with_rankdir(mut self, rankdir: &'static str) -> Self {
        self.rankdir = rankdir;
        self
    }
    pub fn with_labels(mut self, show: bool) -> Self {
        self.show_labels = show;
        self
    }
    pub fn with_actions(mut self, show: bool) -> Self {
        self.show_actions = show;
        self
    }
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

fn quoted(item: &impl Debug) -> String {
    escape(&format!("{:?}", item))
}

fn braces<'a, T: Debug + 'a>(items: impl IntoIterator<Item = &'a T>) -> String {
    let items: Vec<String> = items.into_iter().map(|p| format!("{:?}", p)).collect();
    format!("{{{}}}", items.join(", "))
}

fn write_header(dot: &mut String, name: &str, config: &DotConfig) -> std::fmt::Result {
    writeln!(dot, "digraph \"{}\" {{", escape(name))?;
    writeln!(dot, "rankdir={};", config.rankdir)?;
    writeln!(dot, "node [shape={}];", config.node_shape)?;
    Ok(())
}

fn write_initial_marks(dot: &mut String, initial: impl IntoIterator<Item = usize>) -> std::fmt::Result {
    for i in initial {
        writeln!(dot, "init{} [shape=point, style=invis];", i)?;
        writeln!(dot, "init{} -> {};", i, i)?;
    }
    Ok(())
}

impl<S, A, P> TransitionSystem<S, A, P>
where
    S: Element,
    A: Element,
    P: Element,
{
    /// Converts the transition system to DOT format.
    pub fn to_dot(&self) -> Result<String, std::fmt::Error> {
        self.to_dot_with_config(&DotConfig::default())
    }

    /// Converts the transition system to DOT format with custom configuration.
    pub fn to_dot_with_config(&self, config: &DotConfig) -> Result<String, std::fmt::Error> {
        let mut dot = String::new();
        write_header(&mut dot, self.name(), config)?;

        for (i, s) in self.states().iter().enumerate() {
            let mut label = quoted(s);
            if config.show_labels {
                if let Ok(props) = self.label(s) {
                    label.push_str("\\n");
                    label.push_str(&escape(&braces(props)));
                }
            }
            writeln!(dot, "{} [label=\"{}\"];", i, label)?;
        }
        write_initial_marks(
            &mut dot,
            self.initial_states()
                .iter()
                .filter_map(|s| self.states().get_index_of(s)),
        )?;

        for t in self.transitions() {
            let (Some(from), Some(to)) = (self.states().get_index_of(&t.from), self.states().get_index_of(&t.to)) else {
                continue;
            };
            if config.show_actions {
                writeln!(dot, "{} -> {} [label=\"{}\"];", from, to, quoted(&t.action))?;
            } else {
                writeln!(dot, "{} -> {};", from, to)?;
            }
        }

        writeln!(dot, "}}")?;
        Ok(dot)
    }
}

impl<Q, P> Automaton<Q, P>
where
    Q: Element,
    P: Element + Ord,
{
    /// Converts the automaton to DOT format.
    pub fn to_dot(&self) -> Result<String, std::fmt::Error> {
        self.to_dot_with_config(&DotConfig::default())
    }

    /// Converts the automaton to DOT format with custom configuration.
    ///
    /// Parallel edges reading different labels are merged into one edge.
    pub fn to_dot_with_config(&self, config: &DotConfig) -> Result<String, std::fmt::Error> {
        let mut dot = String::new();
        write_header(&mut dot, "automaton", config)?;

        for (i, q) in self.states().iter().enumerate() {
            if self.is_accepting(q) {
                writeln!(dot, "{} [label=\"{}\", shape={}];", i, quoted(q), config.accepting_shape)?;
            } else {
                writeln!(dot, "{} [label=\"{}\"];", i, quoted(q))?;
            }
        }
        write_initial_marks(
            &mut dot,
            self.initial_states()
                .iter()
                .filter_map(|q| self.states().get_index_of(q)),
        )?;

        for (from, by_label) in self.transitions() {
            let Some(i) = self.states().get_index_of(from) else {
                continue;
            };
            let mut edges: Vec<(usize, Vec<String>)> = Vec::new();
            for (label, targets) in by_label {
                for to in targets {
                    let Some(j) = self.states().get_index_of(to) else {
                        continue;
                    };
                    let text = escape(&braces(label));
                    match edges.iter_mut().find(|(k, _)| *k == j) {
                        Some((_, texts)) => texts.push(text),
                        None => edges.push((j, vec![text])),
                    }
                }
            }
            for (j, texts) in edges {
                if config.show_actions {
                    writeln!(dot, "{} -> {} [label=\"{}\"];", i, j, texts.join("\\n"))?;
                } else {
                    writeln!(dot, "{} -> {};", i, j)?;
                }
            }
        }

        writeln!(dot, "}}")?;
        Ok(dot)
    }
}
