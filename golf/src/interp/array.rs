//! Sequence algorithms over arrays of values
//!
//! Set algebra probes an `AvlSet` built from borrowed elements, so each
//! membership test is logarithmic. Survivors keep their original order and
//! elements contributed by the second operand follow in its order.

use crate::set::AvlSet;

use super::value::Value;

/// Keep the elements whose flag is set
fn retain_flagged(items: &mut Vec<Value>, flags: Vec<bool>) {
    let mut flags = flags.into_iter();
    items.retain(|_| flags.next().unwrap_or(false));
}

/// Distinct elements of `a` that also occur in `b`
pub fn and(mut a: Vec<Value>, b: &[Value]) -> Vec<Value> {
    let flags: Vec<bool> = {
        let mut pending: AvlSet<&Value> = b.iter().collect();
        // Removing on first hit drops later duplicates
        a.iter().map(|x| pending.remove(&x)).collect()
    };
    retain_flagged(&mut a, flags);
    a
}

/// Distinct elements of `a`, then those of `b` not seen yet
pub fn or(mut a: Vec<Value>, mut b: Vec<Value>) -> Vec<Value> {
    let (flags_a, flags_b) = {
        let mut seen = AvlSet::new();
        let flags_a: Vec<bool> = a.iter().map(|x| seen.insert(x)).collect();
        let flags_b: Vec<bool> = b.iter().map(|x| seen.insert(x)).collect();
        (flags_a, flags_b)
    };
    retain_flagged(&mut a, flags_a);
    retain_flagged(&mut b, flags_b);
    a.append(&mut b);
    a
}

/// Distinct elements present in exactly one operand
pub fn xor(mut a: Vec<Value>, mut b: Vec<Value>) -> Vec<Value> {
    let (flags_a, flags_b) = {
        let in_a: AvlSet<&Value> = a.iter().collect();
        let in_b: AvlSet<&Value> = b.iter().collect();
        let mut seen = AvlSet::new();
        let flags_a: Vec<bool> = a
            .iter()
            .map(|x| !in_b.contains(&x) && seen.insert(x))
            .collect();
        let flags_b: Vec<bool> = b
            .iter()
            .map(|x| !in_a.contains(&x) && seen.insert(x))
            .collect();
        (flags_a, flags_b)
    };
    retain_flagged(&mut a, flags_a);
    retain_flagged(&mut b, flags_b);
    a.append(&mut b);
    a
}

/// Elements of `a` not in `b`; duplicates in `a` survive
pub fn subtract(mut a: Vec<Value>, b: &[Value]) -> Vec<Value> {
    let flags: Vec<bool> = {
        let remove: AvlSet<&Value> = b.iter().collect();
        a.iter().map(|x| !remove.contains(&x)).collect()
    };
    retain_flagged(&mut a, flags);
    a
}

/// Stable merge sort of the indices `lo..hi` by `keys`
fn sort_range(keys: &[Value], lo: usize, hi: usize) -> Vec<usize> {
    if hi - lo <= 1 {
        return (lo..hi).collect();
    }
    let mid = lo + (hi - lo) / 2;
    let left = sort_range(keys, lo, mid);
    let right = sort_range(keys, mid, hi);

    let mut merged = Vec::with_capacity(hi - lo);
    let (mut i, mut j) = (0, 0);
    while i < left.len() && j < right.len() {
        // Ties take from the left half
        if keys[right[j]] < keys[left[i]] {
            merged.push(right[j]);
            j += 1;
        } else {
            merged.push(left[i]);
            i += 1;
        }
    }
    merged.extend_from_slice(&left[i..]);
    merged.extend_from_slice(&right[j..]);
    merged
}

/// Indices that visit `keys` in non-decreasing, stable order
pub fn sort_permutation(keys: &[Value]) -> Vec<usize> {
    sort_range(keys, 0, keys.len())
}

/// Reorder `items` by the permutation, moving each element once
pub fn permute<T>(items: Vec<T>, permutation: &[usize]) -> Vec<T> {
    let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
    permutation
        .iter()
        .filter_map(|&i| slots.get_mut(i).and_then(Option::take))
        .collect()
}

pub fn sort(items: Vec<Value>) -> Vec<Value> {
    let permutation = sort_permutation(&items);
    permute(items, &permutation)
}

/// Sort a carrier sequence by the order of a parallel key sequence
pub fn sort_by_mapping<T>(items: Vec<T>, keys: &[Value]) -> Vec<T> {
    let permutation = sort_permutation(keys);
    permute(items, &permutation)
}

/// Split around element-wise matches of `separator`
///
/// A match advances past the whole separator; adjacent matches yield empty
/// groups. An empty separator puts each element in its own group.
pub fn split(items: Vec<Value>, separator: &[Value]) -> Vec<Vec<Value>> {
    if separator.is_empty() {
        return items.into_iter().map(|x| vec![x]).collect();
    }
    let mut starts = Vec::new();
    let mut i = 0;
    while i + separator.len() <= items.len() {
        if items[i..i + separator.len()] == *separator {
            starts.push(i);
            i += separator.len();
        } else {
            i += 1;
        }
    }

    let mut groups = vec![Vec::new()];
    let mut starts = starts.into_iter().peekable();
    let mut skip = 0;
    for (i, item) in items.into_iter().enumerate() {
        if skip > 0 {
            skip -= 1;
        } else if starts.next_if_eq(&i).is_some() {
            groups.push(Vec::new());
            skip = separator.len() - 1;
        } else if let Some(group) = groups.last_mut() {
            group.push(item);
        }
    }
    groups
}

/// Index of the first element equal to `needle`
pub fn find(items: &[Value], needle: &Value) -> Option<usize> {
    items.iter().position(|x| x == needle)
}
