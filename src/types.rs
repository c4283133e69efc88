//! Trait aliases for the opaque values stored in models.
//!
//! States, actions, locations and atomic propositions are compared purely by
//! structural equality, so everything a model stores must be hashable.
//! Atomic propositions additionally need a total order: a state label is a
//! [`BTreeSet`], which gives label sets a canonical representation that can
//! itself be hashed and used as an automaton input symbol.
use std::collections::BTreeSet;
use std::fmt::Debug;
use std::hash::Hash;

/// A value usable as a state, action or location.
pub trait Element: Clone + Eq + Hash + Debug {}

impl<T> Element for T where T: Clone + Eq + Hash + Debug {}

/// A value usable as an atomic proposition.
pub trait Proposition: Element + Ord {}

impl<T> Proposition for T where T: Element + Ord {}

/// The set of atomic propositions holding in a state.
pub type Label<P> = BTreeSet<P>;

/// Text of a location when it becomes an atomic proposition.
///
/// Composite locations of interleaved program graphs render as `<l1, l2>`.
pub trait LocationText {
    fn location_text(&self) -> String;
}

impl LocationText for String {
    fn location_text(&self) -> String {
        self.clone()
    }
}

impl LocationText for &str {
    fn location_text(&self) -> String {
        self.to_string()
    }
}

impl<A: LocationText, B: LocationText> LocationText for (A, B) {
    fn location_text(&self) -> String {
        format!("<{}, {}>", self.0.location_text(), self.1.location_text())
    }
}

macro_rules! impl_location_text {
    ($($t:ty),*) => {
        $(
            impl LocationText for $t {
                fn location_text(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

impl_location_text!(char, i32, i64, u32, u64, usize);

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_element<T: Element>() {}
    fn assert_proposition<T: Proposition>() {}

    #[test]
    fn test_common_types_qualify() {
        assert_element::<String>();
        assert_element::<(u32, String)>();
        assert_element::<Vec<String>>();
        assert_proposition::<&'static str>();
        assert_proposition::<String>();
    }

    #[test]
    fn test_label_is_canonical() {
        let a: Label<&str> = ["q", "p"].into_iter().collect();
        let b: Label<&str> = ["p", "q"].into_iter().collect();
        assert_eq!(a, b);
        assert_eq!(a.iter().copied().collect::<Vec<_>>(), vec!["p", "q"]);
    }

    #[test]
    fn test_location_text() {
        assert_eq!("l0".location_text(), "l0");
        assert_eq!((String::from("a"), (1u32, 'b')).location_text(), "<a, <1, b>>");
    }
}
