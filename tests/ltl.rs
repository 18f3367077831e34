//! Acceptance of ultimately periodic words by automata built from LTL formulas.
//!
//! A word `u v^ω` is turned into a lasso-shaped transition system; the
//! automaton accepts the word iff the product has an accepting cycle.

use fvm_rs::ltl::Ltl;
use fvm_rs::tableau::ltl_to_nba;
use fvm_rs::transition_system::{Transition, TransitionSystem};
use fvm_rs::verify::verify_omega_regular_property;
use test_log::test;

fn lasso(prefix: &[&[&'static str]], cycle: &[&[&'static str]]) -> TransitionSystem<usize, (), &'static str> {
    assert!(!cycle.is_empty());
    let letters: Vec<&[&'static str]> = prefix.iter().chain(cycle).copied().collect();
    let n = letters.len();

    let mut ts = TransitionSystem::new();
    ts.add_action(());
    ts.add_atomic_propositions(["a", "b"]);
    ts.add_states(0..n);
    ts.set_initial(&0, true).unwrap();
    for (i, letter) in letters.iter().enumerate() {
        for &p in letter.iter() {
            ts.add_to_label(&i, p).unwrap();
        }
        let next = if i + 1 == n { prefix.len() } else { i + 1 };
        ts.add_transition(Transition::new(i, (), next)).unwrap();
    }
    ts
}

fn accepts(phi: &Ltl<&'static str>, prefix: &[&[&'static str]], cycle: &[&[&'static str]]) -> bool {
    let nba = ltl_to_nba(phi);
    let ts = lasso(prefix, cycle);
    !verify_omega_regular_property(&ts, &nba).unwrap().is_success()
}

const A: &[&str] = &["a"];
const B: &[&str] = &["b"];
const AB: &[&str] = &["a", "b"];
const NONE: &[&str] = &[];

fn a_until_b() -> Ltl<&'static str> {
    Ltl::until(Ltl::ap("a"), Ltl::ap("b"))
}

#[test]
fn test_until_accepts_b_after_a() {
    assert!(accepts(&a_until_b(), &[A, A, B], &[NONE]));
    assert!(accepts(&a_until_b(), &[AB], &[NONE]));
    assert!(accepts(&a_until_b(), &[], &[B]));
}

#[test]
fn test_until_rejects_postponed_b() {
    assert!(!accepts(&a_until_b(), &[], &[A]));
    assert!(!accepts(&a_until_b(), &[], &[NONE]));
    assert!(!accepts(&a_until_b(), &[NONE], &[B]));
    assert!(!accepts(&a_until_b(), &[A, NONE], &[B]));
}

#[test]
fn test_next() {
    let phi = Ltl::next(Ltl::ap("a"));
    assert!(accepts(&phi, &[NONE, A], &[NONE]));
    assert!(!accepts(&phi, &[A, NONE], &[A]));
}

#[test]
fn test_always_eventually() {
    let phi = Ltl::always(Ltl::eventually(Ltl::ap("a")));
    assert!(accepts(&phi, &[], &[A, NONE]));
    assert!(!accepts(&phi, &[A, A], &[NONE]));
}

#[test]
fn test_eventually_always() {
    let phi = Ltl::eventually(Ltl::always(Ltl::ap("a")));
    assert!(accepts(&phi, &[NONE, B], &[A]));
    assert!(!accepts(&phi, &[], &[A, NONE]));
}

#[test]
fn test_conjunction_of_eventualities() {
    let phi = Ltl::and(Ltl::eventually(Ltl::ap("a")), Ltl::eventually(Ltl::ap("b")));
    assert!(accepts(&phi, &[A, NONE, B], &[NONE]));
    assert!(!accepts(&phi, &[A], &[A]));
}

fn assert_complement(prefix: &[&[&'static str]], cycle: &[&[&'static str]]) {
    let phi = a_until_b();
    let not_phi = Ltl::not(phi.clone());
    assert_ne!(accepts(&phi, prefix, cycle), accepts(&not_phi, prefix, cycle));
}

#[test]
fn test_negation_is_complement() {
    assert_complement(&[A, A, B], &[NONE]);
    assert_complement(&[], &[A]);
    assert_complement(&[NONE], &[B]);
    assert_complement(&[AB], &[A, NONE]);
}

#[test]
fn test_true_and_false() {
    assert!(accepts(&Ltl::tt(), &[], &[NONE]));
    assert!(!accepts(&Ltl::ff(), &[], &[NONE]));
}
