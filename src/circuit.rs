//! Transition systems of sequential boolean circuits.
//!
//! The circuit itself is an external evaluator behind the [`Circuit`] trait.
//! A state is a pair `(inputs, registers)`; an action is the next input
//! vector. Reading input `x'` in state `(x, r)` moves to
//! `(x', update_registers(x, r))`.

use std::collections::{BTreeMap, VecDeque};

use log::debug;

use crate::error::Result;
use crate::transition_system::{Transition, TransitionSystem};
use crate::utils::power_set;

/// Named boolean signals.
pub type Signals = BTreeMap<String, bool>;

pub type CircuitState = (Signals, Signals);

pub trait Circuit {
    fn register_names(&self) -> Vec<String>;
    fn input_names(&self) -> Vec<String>;
    fn output_names(&self) -> Vec<String>;

    fn update_registers(&self, inputs: &Signals, registers: &Signals) -> Signals;
    fn compute_outputs(&self, inputs: &Signals, registers: &Signals) -> Signals;
}

/// Every assignment of the given signal names.
fn all_assignments(names: &[String]) -> Result<Vec<Signals>> {
    Ok(power_set(names.iter().cloned())?
        .into_iter()
        .map(|on| names.iter().map(|n| (n.clone(), on.contains(n))).collect())
        .collect())
}

fn add_circuit_state<C: Circuit + ?Sized>(
    ts: &mut TransitionSystem<CircuitState, Signals, String>,
    circuit: &C,
    s: &CircuitState,
) -> Result<bool> {
    if !ts.add_state(s.clone()) {
        return Ok(false);
    }
    let (inputs, registers) = s;
    let outputs = circuit.compute_outputs(inputs, registers);
    for signals in [inputs, registers, &outputs] {
        for (name, _) in signals.iter().filter(|(_, on)| **on) {
            ts.add_to_label(s, name.clone())?;
        }
    }
    Ok(true)
}

/// Reachable part of the circuit's transition system.
///
/// Initial states are all input vectors with every register off. Every
/// register, input and output name is an atomic proposition; a state is
/// labeled with the signals that are on.
pub fn transition_system_from_circuit<C: Circuit + ?Sized>(
    circuit: &C,
) -> Result<TransitionSystem<CircuitState, Signals, String>> {
    let inputs = all_assignments(&circuit.input_names())?;
    let registers_off: Signals = circuit.register_names().into_iter().map(|r| (r, false)).collect();

    let mut ts = TransitionSystem::new();
    ts.add_actions(inputs.iter().cloned());
    ts.add_atomic_propositions(circuit.register_names());
    ts.add_atomic_propositions(circuit.input_names());
    ts.add_atomic_propositions(circuit.output_names());

    let mut queue = VecDeque::new();
    for x in &inputs {
        let s = (x.clone(), registers_off.clone());
        if add_circuit_state(&mut ts, circuit, &s)? {
            queue.push_back(s.clone());
        }
        ts.set_initial(&s, true)?;
    }

    while let Some(from) = queue.pop_front() {
        let next_registers = circuit.update_registers(&from.0, &from.1);
        for x in &inputs {
            let to = (x.clone(), next_registers.clone());
            if add_circuit_state(&mut ts, circuit, &to)? {
                queue.push_back(to.clone());
            }
            ts.add_transition(Transition::new(from.clone(), x.clone(), to))?;
        }
    }

    debug!(
        "transition_system_from_circuit: {} states, {} transitions",
        ts.num_states(),
        ts.num_transitions()
    );
    Ok(ts)
}
