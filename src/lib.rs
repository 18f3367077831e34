//! # fvm-rs: explicit-state model checking in Rust
//!
//! **`fvm-rs`** builds finite models of concurrent systems, translates linear
//! temporal logic into Büchi automata, and checks the former against the latter
//! by searching the reachable state space for an accepting cycle.
//!
//! ## Key Features
//!
//! - **Transition systems** with `pre`/`post`, reachability, pruning and
//!   execution-fragment checks. See [`TransitionSystem`][crate::transition_system::TransitionSystem].
//! - **Composition**: free and handshake interleaving of transition systems,
//!   interleaving of program graphs, and channel systems with `c!e`/`c?x`
//!   handshakes.
//! - **Program graphs from statements**: sequencing, `if`-`fi` and `do`-`od`
//!   with guarded options, expanded to a finite graph.
//! - **LTL to NBA**: closure, elementary sets, generalized Büchi automaton and
//!   degeneralization.
//! - **Model checking** with prefix + cycle counterexamples.
//!
//! ## Basic Usage
//!
//! ```rust
//! use fvm_rs::ltl::Ltl;
//! use fvm_rs::transition_system::{Transition, TransitionSystem};
//! use fvm_rs::verify::verify_ltl;
//!
//! // A light that is switched on and off forever.
//! let mut ts: TransitionSystem<&str, &str, &str> = TransitionSystem::new();
//! ts.add_states(["off", "on"]);
//! ts.add_action("toggle");
//! ts.add_atomic_proposition("lit");
//! ts.set_initial(&"off", true).unwrap();
//! ts.add_transition(Transition::new("off", "toggle", "on")).unwrap();
//! ts.add_transition(Transition::new("on", "toggle", "off")).unwrap();
//! ts.add_to_label(&"on", "lit").unwrap();
//!
//! // The light is lit infinitely often...
//! let phi = Ltl::always(Ltl::eventually(Ltl::ap("lit")));
//! assert!(verify_ltl(&ts, &phi).unwrap().is_success());
//!
//! // ...but not always.
//! let psi = Ltl::always(Ltl::ap("lit"));
//! let result = verify_ltl(&ts, &psi).unwrap();
//! assert!(result.counterexample().is_some());
//! ```
//!
//! ## Core Components
//!
//! - **[`transition_system`]**, **[`traversal`]**, **[`fragment`]**: the data model and its queries.
//! - **[`compose`]**, **[`channel`]**: parallel composition.
//! - **[`statement`]**, **[`expand`]**, **[`expr`]**, **[`eval`]**, **[`build`]**: from program text to transition systems.
//! - **[`ltl`]**, **[`closure`]**, **[`tableau`]**, **[`automaton`]**, **[`factory`]**: properties as automata.
//! - **[`product`]**, **[`verify`]**: the model checker.
//! - **[`dot`]**: Graphviz export.

pub mod automaton;
pub mod build;
pub mod channel;
pub mod circuit;
pub mod closure;
pub mod compose;
pub mod dot;
pub mod error;
pub mod eval;
pub mod expand;
pub mod expr;
pub mod factory;
pub mod fragment;
pub mod ltl;
pub mod product;
pub mod program_graph;
pub mod statement;
pub mod tableau;
pub mod transition_system;
pub mod traversal;
pub mod types;
pub mod utils;
pub mod verify;
