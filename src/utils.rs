//! Set algebra over finite collections.

use std::collections::{BTreeSet, HashSet};
use std::hash::Hash;

/// Cartesian product of two sets.
///
/// ```text
/// A × B = { (a, b) | a ∈ A, b ∈ B }
/// ```
pub fn product<A, B>(a: &HashSet<A>, b: &HashSet<B>) -> HashSet<(A, B)>
where
    A: Clone + Eq + Hash,
    B: Clone + Eq + Hash,
{
    let mut result = HashSet::with_capacity(a.len() * b.len());
    for x in a {
        for y in b {
            result.insert((x.clone(), y.clone()));
        }
    }
    result
}

/// Union of two sets.
pub fn union<T>(a: &HashSet<T>, b: &HashSet<T>) -> HashSet<T>
where
    T: Clone + Eq + Hash,
{
    a.iter().chain(b.iter()).cloned().collect()
}

/// Set difference `A \ B`.
pub fn difference<T>(a: &HashSet<T>, b: &HashSet<T>) -> HashSet<T>
where
    T: Clone + Eq + Hash,
{
    a.iter().filter(|x| !b.contains(x)).cloned().collect()
}

/// N-ary Cartesian product, keeping the order of the factors in each tuple.
///
/// The product of zero factors is the singleton containing the empty tuple.
pub fn combine<T>(sets: &[HashSet<T>]) -> HashSet<Vec<T>>
where
    T: Clone + Eq + Hash,
{
    let mut result: HashSet<Vec<T>> = HashSet::from([Vec::new()]);
    for set in sets {
        let mut next = HashSet::with_capacity(result.len() * set.len());
        for prefix in &result {
            for x in set {
                let mut tuple = Vec::with_capacity(prefix.len() + 1);
                tuple.extend(prefix.iter().cloned());
                tuple.push(x.clone());
                next.insert(tuple);
            }
        }
        result = next;
    }
    result
}

/// All subsets of the given items.
pub fn powerset<T>(items: impl IntoIterator<Item = T>) -> Vec<BTreeSet<T>>
where
    T: Clone + Ord,
{
    let items: Vec<T> = items.into_iter().collect::<BTreeSet<_>>().into_iter().collect();
    let mut result = vec![BTreeSet::new()];
    for item in items {
        let with_item: Vec<BTreeSet<T>> = result
            .iter()
            .map(|subset| {
                let mut s = subset.clone();
                s.insert(item.clone());
                s
            })
            .collect();
        result.extend(with_item);
    }
    result
}
