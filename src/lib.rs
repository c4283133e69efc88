//! # fvm-rs: explicit-state model checking in Rust
//!
//! **`fvm-rs`** compiles small concurrent programs into process models, composes them,
//! unfolds the composition into its reachable labeled transition system, and checks that
//! system against an ω-regular specification automaton.
//!
//! ## Pipeline
//!
//! ```text
//! nano-Promela source --parser/compile--> ProgramGraph
//!     --interleave--> ProgramGraph | ChannelSystem
//!     --semantics--> TransitionSystem
//!     --verify--> Succeeded | Failed(prefix + cycle)
//! ```
//!
//! Every arrow is a pure construction over read-only inputs producing a fresh result.
//! Only states reachable from the initial states are ever materialized.
//!
//! ## Basic Usage
//!
//! ```rust
//! use fvm_rs::automaton::Automaton;
//! use fvm_rs::compile::program_graph_from_str;
//! use fvm_rs::eval::Evaluators;
//! use fvm_rs::semantics::transition_system_from_program_graph;
//! use fvm_rs::verify::verify_omega_regular_property;
//!
//! // 1. Compile a program into a program graph
//! let pg = program_graph_from_str("do :: x < 3 -> x := x + 1 od").unwrap();
//!
//! // 2. Unfold it into a transition system: x = 0, 1, 2, 3 in the loop, then exit
//! let ts = transition_system_from_program_graph(&pg, &Evaluators::nano_promela()).unwrap();
//! assert_eq!(ts.states().len(), 5);
//!
//! // 3. A property automaton accepting the runs that ever see x = 2
//! let mut aut = Automaton::new();
//! aut.set_initial(0);
//! aut.set_accepting(1);
//! for label in fvm_rs::utils::powerset(ts.atomic_propositions().iter().cloned()) {
//!     let target = if label.contains("x = 2") { 1 } else { 0 };
//!     aut.add_transition(0, label.clone(), target);
//!     aut.add_transition(1, label, 1);
//! }
//!
//! // 4. The program terminates, so no infinite run exists and the property holds
//! let result = verify_omega_regular_property(&ts, &aut).unwrap();
//! assert!(result.is_succeeded());
//! ```
//!
//! ## Core Components
//!
//! - **[`transition`]** and **[`program_graph`]**: the model stores.
//! - **[`parser`]** and **[`compile`]**: nano-Promela source to program graphs.
//! - **[`eval`]**: pluggable guard and action evaluators over [`memory::Memory`].
//! - **[`interleave`]** and **[`channel`]**: parallel composition.
//! - **[`semantics`]**: unfolding of program graphs, channel systems and [`circuit`]s.
//! - **[`automaton`]**, **[`ltl`]** and **[`verify`]**: ω-regular verification.
//! - **[`dot`]**: visualization with Graphviz.

pub mod ast;
pub mod automaton;
pub mod channel;
pub mod circuit;
pub mod compile;
pub mod dot;
pub mod error;
pub mod eval;
pub mod gate;
pub mod interleave;
pub mod ltl;
pub mod memory;
pub mod parser;
pub mod program_graph;
pub mod semantics;
pub mod transition;
pub mod types;
pub mod utils;
pub mod verify;
