//! Compilation of nano-Promela statements into program graphs.
//!
//! A location is the text of the statement that remains to be executed, and
//! the empty text is the terminal location. Since location identity is text
//! equality, a loop always returns to the very same location and the
//! resulting graph stays finite.

use std::collections::HashSet;
use std::io::Read;

use log::debug;

use crate::ast::{seq_text, GuardedOption, Stmt};
use crate::error::Result;
use crate::parser::parse_stmt;
use crate::program_graph::{PgTransition, ProgramGraph};

/// The unconditional guard.
pub const TRUE: &str = "true";

/// The terminal location.
pub const TERMINAL: &str = "";

/// An edge under construction. `from == None` marks an edge leaving the
/// entry of a nested statement, which the enclosing construct unifies with
/// its own location. `condition == None` marks an edge no option guard has
/// been put on yet; at the top level it becomes [`TRUE`].
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
struct Edge {
    from: Option<String>,
    condition: Option<String>,
    action: String,
    to: String,
}

fn parenthesize(g: &str) -> String {
    format!("({})", g)
}

/// Put the option guard `g` on an entry edge: `(g)` on an unconditioned
/// edge, `(g) && (h)` on an edge already guarded by `h`.
fn conjunction(g: &str, h: Option<String>) -> String {
    match h {
        None => parenthesize(g),
        Some(h) => format!("{} && {}", parenthesize(g), parenthesize(&h)),
    }
}

fn disjunction(g: &str, h: &str) -> String {
    format!("{} || {}", g, h)
}

fn negation(g: &str) -> String {
    format!("!{}", parenthesize(g))
}

/// Continue `location` with `rest`; reaching the terminal location means
/// reaching `rest` itself.
fn continue_with(location: &str, rest: &str) -> String {
    if location == TERMINAL {
        rest.to_string()
    } else {
        seq_text(location, rest)
    }
}

fn edges(stmt: &Stmt, nested: bool) -> Vec<Edge> {
    match stmt {
        Stmt::Basic(action) => {
            let text = action.to_string();
            vec![Edge {
                from: if nested { None } else { Some(text.clone()) },
                condition: None,
                action: text,
                to: TERMINAL.to_string(),
            }]
        }
        Stmt::Seq(first, second) => {
            let rest = second.text();
            let mut result: Vec<Edge> = edges(first, nested)
                .into_iter()
                .map(|e| Edge {
                    from: e.from.map(|from| seq_text(&from, &rest)),
                    to: continue_with(&e.to, &rest),
                    ..e
                })
                .collect();
            result.extend(edges(second, false));
            result
        }
        Stmt::If(options) => {
            let location = stmt.text();
            let mut result = Vec::new();
            for GuardedOption { guard, body } in options {
                let guard = guard.to_string();
                for e in edges(body, true) {
                    let entry = e.from.is_none();
                    let from = match e.from {
                        None if !nested => Some(location.clone()),
                        from => from,
                    };
                    let condition = if entry {
                        Some(conjunction(&guard, e.condition))
                    } else {
                        e.condition
                    };
                    result.push(Edge { from, condition, ..e });
                }
            }
            result
        }
        Stmt::Do(options) => {
            let location = stmt.text();
            let mut result = Vec::new();
            let mut exit: Option<String> = None;
            for GuardedOption { guard, body } in options {
                let guard = guard.to_string();
                for e in edges(body, true) {
                    let entry = e.from.is_none();
                    let from = match e.from {
                        Some(from) => Some(seq_text(&from, &location)),
                        None if nested => None,
                        None => Some(location.clone()),
                    };
                    let condition = if entry {
                        Some(conjunction(&guard, e.condition))
                    } else {
                        e.condition
                    };
                    let to = continue_with(&e.to, &location);
                    let edge = Edge {
                        from,
                        condition,
                        action: e.action,
                        to,
                    };
                    // Entry edges of a nested loop are also taken on every later iteration.
                    if entry && nested {
                        result.push(Edge {
                            from: Some(location.clone()),
                            ..edge.clone()
                        });
                    }
                    result.push(edge);
                }
                exit = Some(match exit {
                    None => parenthesize(&guard),
                    Some(acc) => disjunction(&acc, &parenthesize(&guard)),
                });
            }
            let exit = negation(&exit.unwrap_or_else(|| "false".to_string()));
            if nested {
                result.push(Edge {
                    from: None,
                    condition: Some(exit.clone()),
                    action: String::new(),
                    to: TERMINAL.to_string(),
                });
            }
            result.push(Edge {
                from: Some(location),
                condition: Some(exit),
                action: String::new(),
                to: TERMINAL.to_string(),
            });
            result
        }
    }
}

/// Compile a statement into a program graph whose single initial location is
/// the statement's own text.
pub fn program_graph_from_stmt(stmt: &Stmt) -> Result<ProgramGraph<String, String>> {
    let edges: HashSet<Edge> = edges(stmt, false).into_iter().collect();
    let initial = stmt.text();

    let mut pg = ProgramGraph::new();
    pg.add_location(initial.clone());
    for e in &edges {
        if let Some(from) = &e.from {
            pg.add_location(from.clone());
        }
        pg.add_location(e.to.clone());
    }
    pg.add_initial_location(initial)?;
    for e in edges {
        // Every edge has a location at the top level.
        if let Some(from) = e.from {
            let condition = e.condition.unwrap_or_else(|| TRUE.to_string());
            pg.add_transition(PgTransition::new(from, condition, e.action, e.to))?;
        }
    }
    debug!(
        "compiled program graph: {} locations, {} edges",
        pg.locations().len(),
        pg.transitions().len()
    );
    Ok(pg)
}

/// Parse and compile a nano-Promela program.
pub fn program_graph_from_str(source: &str) -> Result<ProgramGraph<String, String>> {
    let stmt = parse_stmt(source)?;
    program_graph_from_stmt(&stmt)
}

/// Read, parse and compile a nano-Promela program.
pub fn program_graph_from_reader(mut reader: impl Read) -> Result<ProgramGraph<String, String>> {
    let mut source = String::new();
    reader.read_to_string(&mut source)?;
    program_graph_from_str(&source)
}
