use std::path::PathBuf;

use clap::Parser;
use log::info;

use fvm_rs::build::transition_system_from_program_graph;
use fvm_rs::channel::ChannelSystem;
use fvm_rs::eval::{default_action_defs, default_condition_defs};
use fvm_rs::factory::AutomataFactory;
use fvm_rs::ltl::Ltl;
use fvm_rs::program_graph::{PgTransition, ProgramGraph};
use fvm_rs::verify::{verify_ltl, verify_omega_regular_property, VerificationResult};

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// Number of processes.
    #[arg(value_name = "INT", default_value = "2")]
    n: usize,

    /// Drop the semaphore guard, so that mutual exclusion is violated.
    #[clap(long)]
    broken: bool,

    /// Check the LTL formula instead of the hand-built automaton.
    #[clap(long)]
    ltl: bool,

    /// Write the transition system in DOT format to this file.
    #[clap(long, value_name = "FILE")]
    dot: Option<PathBuf>,

    /// Log level.
    #[clap(long, value_name = "LEVEL", default_value = "info")]
    log_level: simplelog::LevelFilter,
}

fn process(i: usize, broken: bool) -> ProgramGraph<String> {
    let noncrit = format!("noncrit{}", i);
    let wait = format!("wait{}", i);
    let crit = format!("crit{}", i);

    let mut pg = ProgramGraph::new();
    pg.set_name(format!("P{}", i));
    pg.add_initial_location(noncrit.clone());
    pg.add_location(wait.clone());
    pg.add_location(crit.clone());
    pg.add_transition(PgTransition::new(noncrit.clone(), "", "", wait.clone()));
    let guard = if broken { "" } else { "y > 0" };
    pg.add_transition(PgTransition::new(wait, guard, "y := y - 1", crit.clone()));
    pg.add_transition(PgTransition::new(crit, "", "y := y + 1", noncrit));
    pg
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Cli::parse();

    simplelog::TermLogger::init(
        args.log_level,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    println!("args = {:?}", args);
    let time_total = std::time::Instant::now();

    let mut cs = ChannelSystem::new();
    for i in 1..=args.n {
        let mut pg = process(i, args.broken);
        if i == 1 {
            pg.add_initialization(vec!["y := 1".to_string()]);
        }
        cs.add_program_graph(pg);
    }
    let pg = cs.compose();
    info!("program graph: {} locations, {} transitions", pg.locations().len(), pg.transitions().len());

    let ts = transition_system_from_program_graph(&pg, &default_action_defs(), &default_condition_defs())?;
    println!(
        "transition system: {} states, {} transitions, {} atomic propositions",
        ts.num_states(),
        ts.num_transitions(),
        ts.atomic_propositions().len()
    );

    if let Some(path) = &args.dot {
        std::fs::write(path, ts.to_dot()?)?;
        println!("DOT written to {}", path.display());
    }

    let crit: Vec<String> = (1..=args.n).map(|i| format!("crit{}", i)).collect();
    let pairs: Vec<(usize, usize)> = (0..args.n)
        .flat_map(|i| (i + 1..args.n).map(move |j| (i, j)))
        .collect();

    let result = if args.ltl {
        // □ ⋀_{i<j} ¬(crit_i ∧ crit_j)
        let mutex = pairs
            .iter()
            .map(|&(i, j)| Ltl::not(Ltl::and(Ltl::ap(crit[i].clone()), Ltl::ap(crit[j].clone()))))
            .fold(Ltl::tt(), Ltl::and);
        let phi = Ltl::always(mutex);
        println!("phi = {}", phi);
        verify_ltl(&ts, &phi)?
    } else {
        let factory = AutomataFactory::new(&ts)?;
        let bad = factory.eventually(|l| pairs.iter().any(|&(i, j)| l.contains(&crit[i]) && l.contains(&crit[j])));
        println!("automaton: {} states, {} transitions", bad.num_states(), bad.num_transitions());
        verify_omega_regular_property(&ts, &bad)?
    };

    match &result {
        VerificationResult::Succeeded => println!("mutual exclusion holds"),
        VerificationResult::Failed(cex) => {
            println!("mutual exclusion violated");
            print!("{}", cex);
        }
    }

    let time_total = time_total.elapsed();
    println!("Total time: {:.3} s", time_total.as_secs_f64());

    Ok(())
}
