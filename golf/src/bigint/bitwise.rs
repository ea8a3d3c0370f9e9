//! Two's-complement bitwise operations
//!
//! Both operands are widened to a common digit count with one spare digit,
//! so the top bit is a reliable sign bit, combined digit-wise, then
//! converted back to sign-magnitude.

use std::ops::{BitAnd, BitOr, BitXor, Not};

use super::Bigint;

/// Two's-complement digits of `num`, sign-extended to `len` digits
fn to_twos_complement(num: &Bigint, len: usize) -> Vec<u64> {
    let mut digits = num.digits.clone();
    digits.resize(len, 0);
    if num.negative {
        negate_in_place(&mut digits);
    }
    digits
}

/// Invert and add one, discarding the final carry
fn negate_in_place(digits: &mut [u64]) {
    let mut carry = true;
    for d in digits.iter_mut() {
        let (value, overflow) = (!*d).overflowing_add(carry as u64);
        *d = value;
        carry = carry && overflow;
    }
}

fn from_twos_complement(mut digits: Vec<u64>) -> Bigint {
    let negative = digits.last().is_some_and(|top| top >> 63 == 1);
    if negative {
        negate_in_place(&mut digits);
    }
    Bigint::from_parts(digits, negative)
}

fn combine(a: &Bigint, b: &Bigint, op: impl Fn(u64, u64) -> u64) -> Bigint {
    let len = a.digits.len().max(b.digits.len()) + 1;
    let x = to_twos_complement(a, len);
    let y = to_twos_complement(b, len);
    let digits = x.iter().zip(&y).map(|(&p, &q)| op(p, q)).collect();
    from_twos_complement(digits)
}

impl BitAnd for &Bigint {
    type Output = Bigint;

    fn bitand(self, other: &Bigint) -> Bigint {
        combine(self, other, |p, q| p & q)
    }
}

impl BitOr for &Bigint {
    type Output = Bigint;

    fn bitor(self, other: &Bigint) -> Bigint {
        combine(self, other, |p, q| p | q)
    }
}

impl BitXor for &Bigint {
    type Output = Bigint;

    fn bitxor(self, other: &Bigint) -> Bigint {
        combine(self, other, |p, q| p ^ q)
    }
}

/// Bitwise complement, `-n - 1`
impl Not for &Bigint {
    type Output = Bigint;

    fn not(self) -> Bigint {
        let mut result = -self;
        result.decrement();
        result
    }
}
