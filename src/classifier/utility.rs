use crate::table::StopSet;

/// Intersection of all sets. Returns the empty set for no input.
pub fn intersect_all(sets: impl IntoIterator<Item = StopSet>) -> StopSet {
    let mut sets = sets.into_iter();
    let Some(first) = sets.next() else {
        return StopSet::new();
    };
    sets.fold(first, |acc, next| acc.intersection(&next).cloned().collect())
}
