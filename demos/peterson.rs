//! Peterson's mutual exclusion algorithm, checked for mutual exclusion and
//! starvation freedom.
//!
//! Run with:
//! ```bash
//! cargo run --example peterson -- --property all
//! ```

use std::collections::BTreeSet;

use clap::{Parser, ValueEnum};
use log::info;

use fvm_rs::automaton::Automaton;
use fvm_rs::compile::program_graph_from_str;
use fvm_rs::eval::Evaluators;
use fvm_rs::interleave::interleave_pg;
use fvm_rs::semantics::{transition_system_from_program_graph_with_config, ExploreConfig};
use fvm_rs::transition::TransitionSystem;
use fvm_rs::types::{Element, Label};
use fvm_rs::utils::powerset;
use fvm_rs::verify::verify_omega_regular_property;

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum Property {
    Mutex,
    Starvation,
    All,
}

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// Property to verify.
    #[arg(long, value_enum, default_value = "all")]
    property: Property,

    /// Abort if the state space grows beyond this many states.
    #[clap(long, value_name = "INT")]
    max_states: Option<usize>,

    /// Print the counterexample on violation.
    #[clap(long)]
    trace: bool,

    /// Enable debug logging.
    #[clap(short, long)]
    verbose: bool,
}

/// Peterson's protocol for process `me` competing with process `other`.
fn peterson(me: u32, other: u32) -> String {
    format!(
        "crit{me} := 0;
do :: true -> skip;
    atomic{{b{me} := 1; x := {other}}};
    wait{me} := 1;
    if
        :: b{other} == 0 || x == {me} -> skip
    fi;
    wait{me} := 0;
    crit{me} := 1;
    crit{me} := 0;
    b{me} := 0
od
"
    )
}

fn is_observed(ap: &str) -> bool {
    ["crit1", "crit2", "wait1", "wait2"]
        .iter()
        .any(|name| ap == format!("{} = 0", name) || ap == format!("{} = 1", name))
}

/// Drop every atomic proposition except the `crit`/`wait` flags.
fn keep_observed<S: Element, A: Element>(ts: &mut TransitionSystem<S, A, String>) -> color_eyre::Result<()> {
    let hidden: Vec<String> = ts.atomic_propositions().iter().filter(|ap| !is_observed(ap)).cloned().collect();
    let states: Vec<S> = ts.states().iter().cloned().collect();
    for ap in &hidden {
        for s in &states {
            ts.remove_label(s, ap);
        }
        ts.remove_atomic_proposition(ap)?;
    }
    Ok(())
}

/// Accepts the runs in which both processes are ever critical together.
fn mutex_automaton(all: &[Label<String>]) -> Automaton<&'static str, String> {
    let both = |l: &Label<String>| l.contains("crit1 = 1") && l.contains("crit2 = 1");
    let mut aut = Automaton::new();
    for l in all {
        let target = if both(l) { "no_mutex" } else { "mutex" };
        aut.add_transition("mutex", l.clone(), target);
        aut.add_transition("no_mutex", l.clone(), "no_mutex");
    }
    aut.set_initial("mutex");
    aut.set_accepting("no_mutex");
    aut
}

/// Accepts the runs in which some waiting process never becomes critical.
fn starvation_automaton(all: &[Label<String>]) -> Automaton<&'static str, String> {
    let mut aut = Automaton::new();
    for l in all {
        aut.add_transition("satiated", l.clone(), "satiated");
        if l.contains("wait1 = 1") {
            aut.add_transition("satiated", l.clone(), "starve1");
        }
        if l.contains("wait2 = 1") {
            aut.add_transition("satiated", l.clone(), "starve2");
        }
        if !l.contains("crit1 = 1") {
            aut.add_transition("starve1", l.clone(), "starve1");
        }
        if !l.contains("crit2 = 1") {
            aut.add_transition("starve2", l.clone(), "starve2");
        }
    }
    aut.set_initial("satiated");
    aut.set_accepting("starve1");
    aut.set_accepting("starve2");
    aut
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Cli::parse();

    simplelog::TermLogger::init(
        if args.verbose {
            simplelog::LevelFilter::Debug
        } else {
            simplelog::LevelFilter::Info
        },
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let time_total = std::time::Instant::now();
    println!("args = {:?}", args);

    info!("Building program graphs from code");
    let p1 = program_graph_from_str(&peterson(1, 2))?;
    let p2 = program_graph_from_str(&peterson(2, 1))?;
    println!("p1: {} locations, {} edges", p1.locations().len(), p1.transitions().len());

    info!("Interleaving program graphs");
    let pg = interleave_pg(&p1, &p2)?;

    info!("Building transition system");
    let mut config = ExploreConfig::default();
    if let Some(limit) = args.max_states {
        config = config.with_max_states(limit);
    }
    let mut ts = transition_system_from_program_graph_with_config(&pg, &Evaluators::nano_promela(), &config)?;
    println!("ts: {} states, {} transitions", ts.states().len(), ts.transitions().len());

    keep_observed(&mut ts)?;
    let aps: BTreeSet<String> = ts.atomic_propositions().iter().cloned().collect();
    println!("observed propositions: {:?}", aps);
    let all = powerset(aps);

    let mut checks = Vec::new();
    if matches!(args.property, Property::Mutex | Property::All) {
        checks.push(("mutex", mutex_automaton(&all)));
    }
    if matches!(args.property, Property::Starvation | Property::All) {
        checks.push(("starvation", starvation_automaton(&all)));
    }

    for (name, aut) in checks {
        let result = verify_omega_regular_property(&ts, &aut)?;
        println!("Verifying {}: {}", name, if result.is_succeeded() { "PASSED" } else { "FAILED" });
        if args.trace {
            if let Some(c) = result.counterexample() {
                print!("{}", c);
            }
        }
    }

    let time_total = time_total.elapsed();
    println!("Done in {:.3} s", time_total.as_secs_f64());

    Ok(())
}
