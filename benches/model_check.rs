//! Model-checking benchmarks on an n-process mutual-exclusion protocol.
//!
//! Run with:
//! ```bash
//! cargo bench --bench model_check
//! ```

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use fvm_rs::build::{transition_system_from_program_graph, PgState};
use fvm_rs::channel::ChannelSystem;
use fvm_rs::eval::{default_action_defs, default_condition_defs};
use fvm_rs::factory::AutomataFactory;
use fvm_rs::ltl::Ltl;
use fvm_rs::product::product;
use fvm_rs::program_graph::{PgTransition, ProgramGraph};
use fvm_rs::tableau::ltl_to_nba;
use fvm_rs::transition_system::TransitionSystem;
use fvm_rs::verify::verify_ltl;

type Model = TransitionSystem<PgState<Vec<String>>, String, String>;

/// Semaphore-protected processes `noncrit_i -> wait_i -> crit_i -> noncrit_i`.
fn mutex(n: usize) -> Model {
    let mut cs = ChannelSystem::new();
    for i in 1..=n {
        let (noncrit, wait, crit) = (format!("noncrit{}", i), format!("wait{}", i), format!("crit{}", i));
        let mut pg = ProgramGraph::new();
        pg.add_initial_location(noncrit.clone());
        pg.add_location(wait.clone());
        pg.add_location(crit.clone());
        pg.add_transition(PgTransition::new(noncrit.clone(), "", "", wait.clone()));
        pg.add_transition(PgTransition::new(wait, "y > 0", "y := y - 1", crit.clone()));
        pg.add_transition(PgTransition::new(crit, "", "y := y + 1", noncrit));
        if i == 1 {
            pg.add_initialization(vec!["y := 1".to_string()]);
        }
        cs.add_program_graph(pg);
    }
    transition_system_from_program_graph(&cs.compose(), &default_action_defs(), &default_condition_defs()).unwrap()
}

/// `□ ¬(crit1 ∧ crit2)`
fn mutex_formula() -> Ltl<String> {
    Ltl::always(Ltl::not(Ltl::and(
        Ltl::ap("crit1".to_string()),
        Ltl::ap("crit2".to_string()),
    )))
}

// ============================================================================
// Construction
// ============================================================================

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("model_check/build");
    for n in [2, 3, 4, 5] {
        group.bench_with_input(BenchmarkId::new("mutex", n), &n, |b, &n| b.iter(|| mutex(n)));
    }
    group.finish();
}

fn bench_product(c: &mut Criterion) {
    let mut group = c.benchmark_group("model_check/product");
    let nba = ltl_to_nba(&Ltl::not(mutex_formula()));
    for n in [2, 3, 4, 5] {
        let ts = mutex(n);
        group.bench_with_input(BenchmarkId::new("mutex", n), &ts, |b, ts| b.iter(|| product(ts, &nba).unwrap()));
    }
    group.finish();
}

// ============================================================================
// Cycle search
// ============================================================================

fn bench_verify_ltl(c: &mut Criterion) {
    let mut group = c.benchmark_group("model_check/verify_ltl");
    group.sample_size(10);
    let phi = mutex_formula();
    for n in [2, 3, 4] {
        let ts = mutex(n);
        group.bench_with_input(BenchmarkId::new("mutex", n), &ts, |b, ts| {
            b.iter(|| {
                let result = verify_ltl(ts, &phi).unwrap();
                assert!(result.is_success());
            })
        });
    }
    group.finish();
}

fn bench_factory(c: &mut Criterion) {
    let mut group = c.benchmark_group("model_check/factory");
    group.sample_size(10);
    for n in [2, 3] {
        let ts = mutex(n);
        group.bench_with_input(BenchmarkId::new("eventually", n), &ts, |b, ts| {
            b.iter(|| {
                let factory = AutomataFactory::new(ts).unwrap();
                factory.eventually(|l| l.contains("crit1") && l.contains("crit2"))
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_build, bench_product, bench_verify_ltl, bench_factory);

criterion_main!(benches);
