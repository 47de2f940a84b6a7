//! Subset enumeration.
//!
//! Elements are treated by position, never compared by value, so a sequence
//! containing equal-valued elements still yields `2^n` subsets.

/// Returns every subset of `items`, including the empty and the full subset.
///
/// Built by recursive doubling: the subsets of `[first, rest..]` are the
/// subsets of `rest` followed by those same subsets with `first` prepended.
/// The caller's slice is never modified.
///
/// ```
/// use glymour_core::engine::power_set::power_set;
///
/// let subsets = power_set(&[1, 2, 3]);
/// assert_eq!(subsets.len(), 8);
/// assert!(subsets.contains(&vec![]));
/// assert!(subsets.contains(&vec![1, 2, 3]));
/// ```
pub fn power_set<T: Clone>(items: &[T]) -> Vec<Vec<T>> {
    let Some((first, rest)) = items.split_first() else {
        return vec![Vec::new()];
    };

    let rec = power_set(rest);
    let mut out = Vec::with_capacity(rec.len() * 2);
    for subset in &rec {
        out.push(subset.clone());
    }
    for subset in rec {
        let mut with_first = Vec::with_capacity(subset.len() + 1);
        with_first.push(first.clone());
        with_first.extend(subset);
        out.push(with_first);
    }
    out
}

/// Returns the subsets of `items` with exactly `k` elements.
///
/// Produces the same subsets as filtering [`power_set`] by length, without
/// materializing the subsets of other sizes.
pub fn subsets_of_size<T: Clone>(items: &[T], k: usize) -> Vec<Vec<T>> {
    if k == 0 {
        return vec![Vec::new()];
    }
    if k > items.len() {
        return Vec::new();
    }

    let (first, rest) = (&items[0], &items[1..]);
    let mut out = subsets_of_size(rest, k);
    for subset in subsets_of_size(rest, k - 1) {
        let mut with_first = Vec::with_capacity(k);
        with_first.push(first.clone());
        with_first.extend(subset);
        out.push(with_first);
    }
    out
}
