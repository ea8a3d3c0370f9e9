//! Byte string algorithms
//!
//! Strings and blocks are plain `Vec<u8>` buffers. Growth, append and
//! reversal come from `Vec` itself; this module holds the operations that
//! need a specific algorithm: KMP substring search, set algebra over the
//! 256-byte alphabet and counting sort.

use std::cmp::Ordering;

/// Presence table over the byte alphabet
struct ByteSet([bool; 256]);

impl ByteSet {
    fn empty() -> Self {
        ByteSet([false; 256])
    }

    fn of(bytes: &[u8]) -> Self {
        let mut set = ByteSet::empty();
        for &b in bytes {
            set.0[b as usize] = true;
        }
        set
    }

    fn contains(&self, b: u8) -> bool {
        self.0[b as usize]
    }

    /// Mark `b` present, returning whether it was absent before
    fn insert(&mut self, b: u8) -> bool {
        !std::mem::replace(&mut self.0[b as usize], true)
    }
}

/// Lexicographic byte order; a proper prefix sorts first
pub fn compare(a: &[u8], b: &[u8]) -> Ordering {
    a.cmp(b)
}

pub fn find_byte(haystack: &[u8], byte: u8) -> Option<usize> {
    haystack.iter().position(|&b| b == byte)
}

/// KMP failure function: `table[i]` is the length of the longest proper
/// prefix of `needle[..=i]` that is also its suffix
fn partial_match_table(needle: &[u8]) -> Vec<usize> {
    let mut table = vec![0; needle.len()];
    let mut k = 0;
    for i in 1..needle.len() {
        while k > 0 && needle[i] != needle[k] {
            k = table[k - 1];
        }
        if needle[i] == needle[k] {
            k += 1;
        }
        table[i] = k;
    }
    table
}

/// Start positions of non-overlapping occurrences of a non-empty `needle`
fn match_positions(haystack: &[u8], needle: &[u8]) -> Vec<usize> {
    let table = partial_match_table(needle);
    let mut positions = Vec::new();
    let mut k = 0;
    for (i, &b) in haystack.iter().enumerate() {
        while k > 0 && b != needle[k] {
            k = table[k - 1];
        }
        if b == needle[k] {
            k += 1;
        }
        if k == needle.len() {
            positions.push(i + 1 - needle.len());
            k = 0;
        }
    }
    positions
}

/// First occurrence of `needle` in O(n + m); an empty needle matches at 0
pub fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    let table = partial_match_table(needle);
    let mut k = 0;
    for (i, &b) in haystack.iter().enumerate() {
        while k > 0 && b != needle[k] {
            k = table[k - 1];
        }
        if b == needle[k] {
            k += 1;
            if k == needle.len() {
                return Some(i + 1 - needle.len());
            }
        }
    }
    None
}

/// Split around each occurrence of `separator`
///
/// Adjacent separators yield empty pieces. An empty separator splits into
/// single bytes.
pub fn split(buf: &[u8], separator: &[u8]) -> Vec<Vec<u8>> {
    if separator.is_empty() {
        return buf.iter().map(|&b| vec![b]).collect();
    }
    let mut pieces = Vec::new();
    let mut start = 0;
    for pos in match_positions(buf, separator) {
        pieces.push(buf[start..pos].to_vec());
        start = pos + separator.len();
    }
    pieces.push(buf[start..].to_vec());
    pieces
}

/// Distinct bytes of `buf` that also occur in `other`, in `buf` order
pub fn and(buf: &mut Vec<u8>, other: &[u8]) {
    let keep = ByteSet::of(other);
    let mut seen = ByteSet::empty();
    buf.retain(|&b| keep.contains(b) && seen.insert(b));
}

/// Distinct bytes of `buf`, then unseen bytes of `other`
pub fn or(buf: &mut Vec<u8>, other: &[u8]) {
    let mut seen = ByteSet::empty();
    buf.retain(|&b| seen.insert(b));
    for &b in other {
        if seen.insert(b) {
            buf.push(b);
        }
    }
}

/// Distinct bytes present in exactly one operand; `buf`'s survivors first
pub fn xor(buf: &mut Vec<u8>, other: &[u8]) {
    let in_other = ByteSet::of(other);
    let in_buf = ByteSet::of(buf);
    let mut seen = ByteSet::empty();
    buf.retain(|&b| !in_other.contains(b) && seen.insert(b));
    for &b in other {
        if !in_buf.contains(b) && seen.insert(b) {
            buf.push(b);
        }
    }
}

/// Remove every byte that occurs in `other`; duplicates in `buf` survive
pub fn subtract(buf: &mut Vec<u8>, other: &[u8]) {
    let drop = ByteSet::of(other);
    buf.retain(|&b| !drop.contains(b));
}

/// Counting sort over the byte alphabet
pub fn counting_sort(buf: &mut [u8]) {
    let mut counts = [0usize; 256];
    for &b in buf.iter() {
        counts[b as usize] += 1;
    }
    let mut pos = 0;
    for (byte, &count) in counts.iter().enumerate() {
        buf[pos..pos + count].fill(byte as u8);
        pos += count;
    }
}
