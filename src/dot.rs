//! Transition systems and program graphs to DOT (Graphviz).
//!
//! # DOT Format
//!
//! The generated DOT output follows these conventions:
//! - **States** (locations) are numbered `s0, s1, ...` in the order of their
//!   `Debug` rendering, so the output is deterministic
//! - **Initial states** get their own shape and an incoming edge from an
//!   invisible point node
//! - **Edges** are directed and labeled with the action's `Display` text
//!   (for program graphs, `condition / action`)
//!
//! # Examples
//!
//! ```
//! use fvm_rs::transition::{Transition, TransitionSystem};
//!
//! let mut ts: TransitionSystem<u32, &str, &str> = TransitionSystem::new();
//! ts.add_states([0, 1]);
//! ts.add_initial_state(0).unwrap();
//! ts.add_action("go");
//! ts.add_transition(Transition::new(0, "go", 1)).unwrap();
//!
//! let dot = ts.to_dot().unwrap();
//! assert!(dot.starts_with("digraph {"));
//! // Write to file and render with: dot -Tpng output.dot -o output.png
//! ```

use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::fmt::Write as _;

use crate::program_graph::ProgramGraph;
use crate::transition::TransitionSystem;
use crate::types::{Element, Proposition};

/// Configuration options for DOT output generation.
///
/// # Examples
///
/// ```
/// use fvm_rs::dot::DotConfig;
///
/// let config = DotConfig {
///     show_labels: false,
///     ..DotConfig::default()
/// };
/// assert_eq!(config.state_shape, "ellipse");
/// ```
#[derive(Debug, Clone)]
pub struct DotConfig {
    /// Shape for states (default: "ellipse")
    pub state_shape: &'static str,
    /// Shape for initial states (default: "doublecircle")
    pub initial_shape: &'static str,
    /// Whether to print state labels next to state names (default: true)
    pub show_labels: bool,
    /// Whether to print actions on edges (default: true)
    pub show_actions: bool,
}

impl Default for DotConfig {
    fn default() -> Self {
        Self {
            state_shape: "ellipse",
            initial_shape: "doublecircle",
            show_labels: true,
            show_actions: true,
        }
    }
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Node ids for the given items, ordered by their `Debug` rendering.
fn node_ids<'a, T: Debug + 'a>(items: impl IntoIterator<Item = &'a T>) -> Vec<(&'a T, String)> {
    let mut sorted: Vec<(&T, String)> = items.into_iter().map(|x| (x, format!("{:?}", x))).collect();
    sorted.sort_by(|a, b| a.1.cmp(&b.1));
    sorted
}

impl<S: Element, A: Element + Display, P: Proposition> TransitionSystem<S, A, P> {
    /// Converts the transition system to DOT format with default settings.
    pub fn to_dot(&self) -> Result<String, std::fmt::Error> {
        self.to_dot_with_config(&DotConfig::default())
    }

    /// Converts the transition system to DOT format.
    pub fn to_dot_with_config(&self, config: &DotConfig) -> Result<String, std::fmt::Error> {
        let mut dot = String::new();
        writeln!(dot, "digraph {{")?;
        if let Some(name) = self.name() {
            writeln!(dot, "label=\"{}\";", escape(name))?;
        }
        writeln!(dot, "node [shape={}];", config.state_shape)?;

        let nodes = node_ids(self.states());
        let mut ids: HashMap<&S, usize> = HashMap::new();
        for (i, (state, text)) in nodes.iter().enumerate() {
            ids.insert(*state, i);
            let mut label = escape(text);
            if config.show_labels {
                if let Ok(l) = self.label(*state) {
                    let props: Vec<String> = l.iter().map(|p| format!("{:?}", p)).collect();
                    write!(label, "\\n{{{}}}", escape(&props.join(", ")))?;
                }
            }
            if self.initial_states().contains(*state) {
                writeln!(dot, "s{} [shape={}, label=\"{}\"];", i, config.initial_shape, label)?;
                writeln!(dot, "init{} [shape=point, style=invis];", i)?;
                writeln!(dot, "init{} -> s{};", i, i)?;
            } else {
                writeln!(dot, "s{} [label=\"{}\"];", i, label)?;
            }
        }

        let mut edges: Vec<(usize, usize, String)> = self
            .transitions()
            .iter()
            .filter_map(|t| Some((*ids.get(&t.from)?, *ids.get(&t.to)?, t.action.to_string())))
            .collect();
        edges.sort();
        for (from, to, action) in edges {
            if config.show_actions {
                writeln!(dot, "s{} -> s{} [label=\"{}\"];", from, to, escape(&action))?;
            } else {
                writeln!(dot, "s{} -> s{};", from, to)?;
            }
        }

        writeln!(dot, "}}")?;
        Ok(dot)
    }
}

impl<L: Element, A: Element + Display> ProgramGraph<L, A> {
    /// Converts the program graph to DOT format with default settings.
    pub fn to_dot(&self) -> Result<String, std::fmt::Error> {
        self.to_dot_with_config(&DotConfig::default())
    }

    /// Converts the program graph to DOT format. Edges are labeled
    /// `condition / action`; initializations are listed in the graph label.
    pub fn to_dot_with_config(&self, config: &DotConfig) -> Result<String, std::fmt::Error> {
        let mut dot = String::new();
        writeln!(dot, "digraph {{")?;
        let mut inits: Vec<String> = self.initializations().iter().map(|i| i.join("; ")).collect();
        inits.sort();
        match (self.name(), inits.is_empty()) {
            (Some(name), true) => writeln!(dot, "label=\"{}\";", escape(name))?,
            (name, false) if config.show_labels => {
                let prefix = name.map(|n| format!("{}: ", n)).unwrap_or_default();
                writeln!(dot, "label=\"{}init {}\";", escape(&prefix), escape(&inits.join(" | ")))?;
            }
            _ => {}
        }
        writeln!(dot, "node [shape={}];", config.state_shape)?;

        let nodes = node_ids(self.locations());
        let mut ids: HashMap<&L, usize> = HashMap::new();
        for (i, (location, text)) in nodes.iter().enumerate() {
            ids.insert(*location, i);
            if self.initial_locations().contains(*location) {
                writeln!(dot, "s{} [shape={}, label=\"{}\"];", i, config.initial_shape, escape(text))?;
                writeln!(dot, "init{} [shape=point, style=invis];", i)?;
                writeln!(dot, "init{} -> s{};", i, i)?;
            } else {
                writeln!(dot, "s{} [label=\"{}\"];", i, escape(text))?;
            }
        }

        let mut edges: Vec<(usize, usize, String)> = self
            .transitions()
            .iter()
            .filter_map(|t| {
                let label = format!("{} / {}", t.condition, t.action);
                Some((*ids.get(&t.from)?, *ids.get(&t.to)?, label))
            })
            .collect();
        edges.sort();
        for (from, to, label) in edges {
            if config.show_actions {
                writeln!(dot, "s{} -> s{} [label=\"{}\"];", from, to, escape(&label))?;
            } else {
                writeln!(dot, "s{} -> s{};", from, to)?;
            }
        }

        writeln!(dot, "}}")?;
        Ok(dot)
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::program_graph::PgTransition;
    use crate::transition::Transition;

    fn toggle() -> TransitionSystem<u32, &'static str, &'static str> {
        let mut ts = TransitionSystem::new();
        ts.add_states([0, 1]);
        ts.add_initial_state(0).unwrap();
        ts.add_action("flip");
        ts.add_atomic_proposition("on");
        ts.add_transition(Transition::new(0, "flip", 1)).unwrap();
        ts.add_transition(Transition::new(1, "flip", 0)).unwrap();
        ts.add_label(&1, "on").unwrap();
        ts
    }

    #[test]
    fn test_ts_to_dot() {
        let dot = toggle().to_dot().unwrap();
        assert!(dot.starts_with("digraph {\n"));
        assert!(dot.ends_with("}\n"));
        assert!(dot.contains("s0 [shape=doublecircle, label=\"0\\n{}\"];"));
        assert!(dot.contains("s1 [label=\"1\\n{\\\"on\\\"}\"];"));
        assert!(dot.contains("init0 -> s0;"));
        assert!(dot.contains("s0 -> s1 [label=\"flip\"];"));
        assert!(dot.contains("s1 -> s0 [label=\"flip\"];"));
    }

    #[test]
    fn test_ts_to_dot_deterministic() {
        assert_eq!(toggle().to_dot().unwrap(), toggle().to_dot().unwrap());
    }

    #[test]
    fn test_ts_to_dot_with_config() {
        let config = DotConfig {
            state_shape: "box",
            show_labels: false,
            show_actions: false,
            ..DotConfig::default()
        };
        let dot = toggle().to_dot_with_config(&config).unwrap();
        assert!(dot.contains("node [shape=box];"));
        assert!(dot.contains("s1 [label=\"1\"];"));
        assert!(dot.contains("s0 -> s1;"));
        assert!(!dot.contains("flip"));
    }

    #[test]
    fn test_string_actions_are_not_quoted() {
        let mut ts: TransitionSystem<u32, String, String> = TransitionSystem::new();
        ts.add_states([0, 1]);
        ts.add_initial_state(0).unwrap();
        ts.add_action("c!\"hi\"".to_string());
        ts.add_transition(Transition::new(0, "c!\"hi\"".to_string(), 1)).unwrap();
        let dot = ts.to_dot().unwrap();
        assert!(dot.contains("s0 -> s1 [label=\"c!\\\"hi\\\"\"];"), "{}", dot);
    }

    #[test]
    fn test_pg_to_dot() {
        let mut pg: ProgramGraph<&str, &str> = ProgramGraph::new();
        pg.add_locations(["a", "b"]);
        pg.add_initial_location("a").unwrap();
        pg.add_initialization(vec!["x := 0".to_string()]);
        pg.add_transition(PgTransition::new("a", "x < 3", "x := x + 1", "b")).unwrap();

        let dot = pg.to_dot().unwrap();
        assert!(dot.contains("label=\"init x := 0\";"));
        assert!(dot.contains("s0 [shape=doublecircle, label=\"\\\"a\\\"\"];"));
        assert!(dot.contains("s0 -> s1 [label=\"x < 3 / x := x + 1\"];"));
    }
}
