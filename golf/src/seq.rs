//! Shape operations shared by byte strings and arrays
//!
//! These work on any owned `Vec<T>`. Elements that fall on skipped
//! positions are dropped as the input is consumed.

use thiserror::Error;

/// Invalid arguments to a sequence operation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeqError {
    #[error("step size cannot be zero")]
    ZeroStep,

    #[error("group size cannot be zero")]
    ZeroGroup,

    #[error("cannot repeat a sequence a negative number of times")]
    NegativeCount,

    #[error("resulting sequence would be too large")]
    TooLarge,
}

/// Keep every `step`-th element starting at index 0; a negative step walks
/// from the end
pub fn step_over<T>(mut items: Vec<T>, step: i64) -> Result<Vec<T>, SeqError> {
    if step == 0 {
        return Err(SeqError::ZeroStep);
    }
    if step < 0 {
        items.reverse();
    }
    let step = usize::try_from(step.unsigned_abs()).unwrap_or(usize::MAX);
    Ok(items.into_iter().step_by(step).collect())
}

/// Chop into consecutive groups of `size`; a negative size groups from
/// the end (the sequence is reversed first)
pub fn split_into_groups<T>(mut items: Vec<T>, size: i64) -> Result<Vec<Vec<T>>, SeqError> {
    if size == 0 {
        return Err(SeqError::ZeroGroup);
    }
    if size < 0 {
        items.reverse();
    }
    let size = usize::try_from(size.unsigned_abs()).unwrap_or(usize::MAX);
    let mut groups = Vec::with_capacity(items.len().div_ceil(size));
    let mut iter = items.into_iter().peekable();
    while iter.peek().is_some() {
        groups.push(iter.by_ref().take(size).collect());
    }
    Ok(groups)
}

/// Concatenate `count` copies; the original elements are moved into the
/// last copy rather than cloned
pub fn repeat<T: Clone>(items: Vec<T>, count: i64) -> Result<Vec<T>, SeqError> {
    if count < 0 {
        return Err(SeqError::NegativeCount);
    }
    let count = usize::try_from(count).map_err(|_| SeqError::TooLarge)?;
    if count == 0 || items.is_empty() {
        return Ok(Vec::new());
    }
    let total = items.len().checked_mul(count).ok_or(SeqError::TooLarge)?;
    let mut result = Vec::new();
    result
        .try_reserve_exact(total)
        .map_err(|_| SeqError::TooLarge)?;
    for _ in 1..count {
        result.extend(items.iter().cloned());
    }
    result.extend(items);
    Ok(result)
}

/// Resolve a possibly negative boundary against `len`, clamping to `0..=len`
pub fn boundary(len: usize, index: i64) -> usize {
    if index < 0 {
        len.saturating_sub(usize::try_from(index.unsigned_abs()).unwrap_or(usize::MAX))
    } else {
        usize::try_from(index).unwrap_or(usize::MAX).min(len)
    }
}

/// Resolve a possibly negative element index; `None` when out of range
pub fn position(len: usize, index: i64) -> Option<usize> {
    let magnitude = usize::try_from(index.unsigned_abs()).ok()?;
    if index < 0 {
        len.checked_sub(magnitude)
    } else if magnitude < len {
        Some(magnitude)
    } else {
        None
    }
}

/// Drop the first `n` elements; non-positive `n` is a no-op
pub fn remove_from_front<T>(items: &mut Vec<T>, n: i64) {
    if n <= 0 {
        return;
    }
    let n = boundary(items.len(), n);
    items.drain(..n);
}

/// Keep elements before `boundary(len, index)`
pub fn take<T>(mut items: Vec<T>, index: i64) -> Vec<T> {
    let end = boundary(items.len(), index);
    items.truncate(end);
    items
}

/// Drop elements before `boundary(len, index)`
pub fn drop<T>(mut items: Vec<T>, index: i64) -> Vec<T> {
    let start = boundary(items.len(), index);
    items.drain(..start);
    items
}
