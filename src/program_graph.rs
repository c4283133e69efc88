//! Program graphs.
//!
//! A [`ProgramGraph`] describes a sequential process before its data is
//! unfolded: control locations connected by edges `from --[cond] act--> to`,
//! where `cond` is a guard over the variables and `act` updates them.
//! Initializations are assignment sequences executed once, before the first
//! step; each of them gives rise to one initial memory.

use std::collections::HashSet;
use std::fmt;

use crate::error::{Error, ModelPart, Result};
use crate::types::Element;

/// A guarded edge of a program graph.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct PgTransition<L, A> {
    pub from: L,
    pub condition: String,
    pub action: A,
    pub to: L,
}

impl<L, A> PgTransition<L, A> {
    pub fn new(from: L, condition: impl Into<String>, action: A, to: L) -> Self {
        PgTransition {
            from,
            condition: condition.into(),
            action,
            to,
        }
    }
}

impl<L: fmt::Debug, A: fmt::Debug> fmt::Display for PgTransition<L, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?} --[{}] {:?}--> {:?}",
            self.from, self.condition, self.action, self.to
        )
    }
}

#[derive(Debug, Clone)]
pub struct ProgramGraph<L, A> {
    name: Option<String>,
    locations: HashSet<L>,
    initial_locations: HashSet<L>,
    initializations: HashSet<Vec<String>>,
    transitions: HashSet<PgTransition<L, A>>,
}

impl<L, A> ProgramGraph<L, A> {
    pub fn new() -> Self {
        ProgramGraph {
            name: None,
            locations: HashSet::new(),
            initial_locations: HashSet::new(),
            initializations: HashSet::new(),
            transitions: HashSet::new(),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    pub fn locations(&self) -> &HashSet<L> {
        &self.locations
    }

    pub fn initial_locations(&self) -> &HashSet<L> {
        &self.initial_locations
    }

    pub fn initializations(&self) -> &HashSet<Vec<String>> {
        &self.initializations
    }

    pub fn transitions(&self) -> &HashSet<PgTransition<L, A>> {
        &self.transitions
    }
}

impl<L, A> Default for ProgramGraph<L, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: Element, A: Element> PartialEq for ProgramGraph<L, A> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.locations == other.locations
            && self.initial_locations == other.initial_locations
            && self.initializations == other.initializations
            && self.transitions == other.transitions
    }
}

impl<L: Element, A: Element> Eq for ProgramGraph<L, A> {}

impl<L: Element, A: Element> ProgramGraph<L, A> {
    pub fn add_location(&mut self, location: L) {
        self.locations.insert(location);
    }

    pub fn add_locations(&mut self, locations: impl IntoIterator<Item = L>) {
        self.locations.extend(locations);
    }

    /// Remove a location that is neither initial nor an edge endpoint.
    pub fn remove_location(&mut self, location: &L) -> Result<()> {
        let attached = |part| Error::DeletionOfAttachedLocation {
            item: format!("{:?}", location),
            part,
        };
        if self.initial_locations.contains(location) {
            return Err(attached(ModelPart::InitialLocations));
        }
        if self.transitions.iter().any(|t| &t.from == location || &t.to == location) {
            return Err(attached(ModelPart::Transitions));
        }
        self.locations.remove(location);
        Ok(())
    }

    /// Mark a registered location as initial.
    pub fn add_initial_location(&mut self, location: L) -> Result<()> {
        if !self.locations.contains(&location) {
            return Err(Error::location_not_found(&location));
        }
        self.initial_locations.insert(location);
        Ok(())
    }

    pub fn remove_initial_location(&mut self, location: &L) {
        self.initial_locations.remove(location);
    }

    pub fn add_initialization(&mut self, init: Vec<String>) {
        self.initializations.insert(init);
    }

    pub fn remove_initialization(&mut self, init: &[String]) {
        self.initializations.remove(init);
    }

    /// Add an edge between registered locations.
    pub fn add_transition(&mut self, t: PgTransition<L, A>) -> Result<()> {
        if !self.locations.contains(&t.from) {
            return Err(Error::location_not_found(&t.from));
        }
        if !self.locations.contains(&t.to) {
            return Err(Error::location_not_found(&t.to));
        }
        self.transitions.insert(t);
        Ok(())
    }

    pub fn remove_transition(&mut self, t: &PgTransition<L, A>) {
        self.transitions.remove(t);
    }

    /// Outgoing edges of a location.
    pub fn transitions_from<'a>(&'a self, location: &'a L) -> impl Iterator<Item = &'a PgTransition<L, A>> + 'a {
        self.transitions.iter().filter(move |t| &t.from == location)
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    fn sample() -> ProgramGraph<&'static str, &'static str> {
        let mut pg = ProgramGraph::new();
        pg.add_locations(["l0", "l1"]);
        pg.add_initial_location("l0").unwrap();
        pg.add_initialization(vec!["x := 0".to_string()]);
        pg.add_transition(PgTransition::new("l0", "x < 2", "x := x + 1", "l0")).unwrap();
        pg.add_transition(PgTransition::new("l0", "x == 2", "skip", "l1")).unwrap();
        pg
    }

    #[test]
    fn test_build() {
        let pg = sample();
        assert_eq!(pg.locations().len(), 2);
        assert_eq!(pg.initial_locations(), &HashSet::from(["l0"]));
        assert_eq!(pg.initializations().len(), 1);
        assert_eq!(pg.transitions_from(&"l0").count(), 2);
        assert_eq!(pg.transitions_from(&"l1").count(), 0);
    }

    #[test]
    fn test_initial_must_be_location() {
        let mut pg: ProgramGraph<&str, &str> = ProgramGraph::new();
        assert!(matches!(pg.add_initial_location("l0"), Err(Error::LocationNotFound(_))));
    }

    #[test]
    fn test_edge_endpoints_must_be_locations() {
        let mut pg = sample();
        let t = PgTransition::new("l1", "true", "skip", "l2");
        assert!(pg.add_transition(t).is_err());
        assert_eq!(pg.transitions().len(), 2);
    }

    #[test]
    fn test_remove_referenced_location_fails() {
        let mut pg = sample();
        let before = pg.clone();
        assert!(matches!(
            pg.remove_location(&"l0"),
            Err(Error::DeletionOfAttachedLocation {
                part: ModelPart::InitialLocations,
                ..
            })
        ));
        assert!(matches!(
            pg.remove_location(&"l1"),
            Err(Error::DeletionOfAttachedLocation {
                part: ModelPart::Transitions,
                ..
            })
        ));
        assert_eq!(pg, before);

        pg.remove_transition(&PgTransition::new("l0", "x == 2", "skip", "l1"));
        pg.remove_location(&"l1").unwrap();
        assert!(!pg.locations().contains(&"l1"));
    }
}
