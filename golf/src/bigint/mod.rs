//! Arbitrary-precision signed integers
//!
//! A `Bigint` is a sign flag plus a little-endian sequence of base 2^64
//! digits. The representation is always normalized:
//! - there is at least one digit (zero is `[0]`)
//! - there are no leading zero digits
//! - zero is never negative
//!
//! Because the normalized form is unique, structural equality is numeric
//! equality and `Eq`/`Hash` can be derived.
//!
//! Division rounds the quotient toward negative infinity and gives the
//! remainder the divisor's sign, so `a == (a / b) * b + a % b` holds for
//! every nonzero `b`.

mod bitwise;
mod radix;

use std::cmp::Ordering;
use std::ops::{Add, Mul, Neg, Sub};

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Errors raised by big integer operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BigintError {
    #[error("division by zero")]
    DivisionByZero,

    #[error("cannot raise to a negative power")]
    NegativeExponent,

    #[error("value {0} is out of range for this operation")]
    OutOfRange(String),

    #[error("base must be at least 2, got {0}")]
    InvalidBase(String),

    #[error("invalid integer literal: {0:?}")]
    Parse(String),
}

/// Sign-magnitude arbitrary-precision integer
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Bigint {
    digits: Vec<u64>,
    negative: bool,
}

impl Bigint {
    pub fn zero() -> Self {
        Bigint {
            digits: vec![0],
            negative: false,
        }
    }

    pub fn one() -> Self {
        Bigint {
            digits: vec![1],
            negative: false,
        }
    }

    /// Build from a little-endian magnitude and a sign, normalizing
    pub(crate) fn from_parts(digits: Vec<u64>, negative: bool) -> Self {
        let mut num = Bigint { digits, negative };
        num.normalize();
        num
    }

    /// Strip leading zero digits and correct negative zero
    fn normalize(&mut self) {
        trim(&mut self.digits);
        if self.is_zero() {
            self.negative = false;
        }
    }

    pub fn is_zero(&self) -> bool {
        self.digits.len() == 1 && self.digits[0] == 0
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    /// Little-endian base 2^64 digits of the magnitude
    pub fn digits(&self) -> &[u64] {
        &self.digits
    }

    pub fn abs(&self) -> Bigint {
        Bigint {
            digits: self.digits.clone(),
            negative: false,
        }
    }

    /// Number of significant bits in the magnitude (0 for zero)
    pub fn bit_length(&self) -> u64 {
        let top = self.digits[self.digits.len() - 1];
        (self.digits.len() as u64 - 1) * 64 + (64 - top.leading_zeros() as u64)
    }

    /// Add one in place, crossing zero correctly
    pub fn increment(&mut self) {
        if self.negative {
            magnitude_decrement(&mut self.digits);
        } else {
            magnitude_increment(&mut self.digits);
        }
        self.normalize();
    }

    /// Subtract one in place; decrementing zero yields -1
    pub fn decrement(&mut self) {
        if self.is_zero() {
            self.digits[0] = 1;
            self.negative = true;
        } else if self.negative {
            magnitude_increment(&mut self.digits);
        } else {
            magnitude_decrement(&mut self.digits);
            self.normalize();
        }
    }

    /// Floor division with remainder
    ///
    /// The magnitudes are divided by binary long division; the signs are
    /// fixed up afterwards so the remainder follows the divisor.
    pub fn divmod(&self, divisor: &Bigint) -> Result<(Bigint, Bigint), BigintError> {
        if divisor.is_zero() {
            return Err(BigintError::DivisionByZero);
        }
        let (q, r) = divmod_magnitude(&self.digits, &divisor.digits);
        let mut quotient = Bigint::from_parts(q, self.negative != divisor.negative);
        let mut remainder = Bigint::from_parts(r, divisor.negative);

        if self.negative != divisor.negative && !remainder.is_zero() {
            quotient.decrement();
            remainder = Bigint::from_parts(
                sub_magnitude(&divisor.digits, &remainder.digits),
                divisor.negative,
            );
        }
        Ok((quotient, remainder))
    }

    pub fn div_floor(&self, divisor: &Bigint) -> Result<Bigint, BigintError> {
        self.divmod(divisor).map(|(q, _)| q)
    }

    pub fn mod_floor(&self, divisor: &Bigint) -> Result<Bigint, BigintError> {
        self.divmod(divisor).map(|(_, r)| r)
    }

    /// Square-and-multiply over the exponent bits, most significant first
    pub fn pow(&self, exponent: &Bigint) -> Result<Bigint, BigintError> {
        if exponent.negative {
            return Err(BigintError::NegativeExponent);
        }
        let mut result = Bigint::one();
        let top_bits = exponent.bit_length();
        for bit in (0..top_bits).rev() {
            result = &result * &result;
            let digit = exponent.digits[(bit / 64) as usize];
            if (digit >> (bit % 64)) & 1 == 1 {
                result = &result * self;
            }
        }
        Ok(result)
    }

    pub fn to_i64(&self) -> Option<i64> {
        if self.digits.len() != 1 {
            return None;
        }
        let magnitude = self.digits[0] as i128;
        i64::try_from(if self.negative { -magnitude } else { magnitude }).ok()
    }

    pub fn to_usize(&self) -> Option<usize> {
        if self.negative || self.digits.len() != 1 {
            return None;
        }
        usize::try_from(self.digits[0]).ok()
    }

    /// Like `to_i64`, reporting the value on failure
    pub fn try_i64(&self) -> Result<i64, BigintError> {
        self.to_i64()
            .ok_or_else(|| BigintError::OutOfRange(self.to_string()))
    }
}

impl Default for Bigint {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<i64> for Bigint {
    fn from(value: i64) -> Self {
        Bigint::from_parts(vec![value.unsigned_abs()], value < 0)
    }
}

impl From<i32> for Bigint {
    fn from(value: i32) -> Self {
        Bigint::from(i64::from(value))
    }
}

impl From<u64> for Bigint {
    fn from(value: u64) -> Self {
        Bigint::from_parts(vec![value], false)
    }
}

impl From<usize> for Bigint {
    fn from(value: usize) -> Self {
        Bigint::from(value as u64)
    }
}

impl From<bool> for Bigint {
    fn from(value: bool) -> Self {
        Bigint::from(value as u64)
    }
}

impl Ord for Bigint {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.negative, other.negative) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => cmp_magnitude(&self.digits, &other.digits),
            (true, true) => cmp_magnitude(&other.digits, &self.digits),
        }
    }
}

impl PartialOrd for Bigint {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Neg for Bigint {
    type Output = Bigint;

    fn neg(mut self) -> Bigint {
        if !self.is_zero() {
            self.negative = !self.negative;
        }
        self
    }
}

impl Neg for &Bigint {
    type Output = Bigint;

    fn neg(self) -> Bigint {
        -self.clone()
    }
}

impl Add for &Bigint {
    type Output = Bigint;

    fn add(self, other: &Bigint) -> Bigint {
        if self.negative == other.negative {
            return Bigint::from_parts(add_magnitude(&self.digits, &other.digits), self.negative);
        }
        match cmp_magnitude(&self.digits, &other.digits) {
            Ordering::Greater => {
                Bigint::from_parts(sub_magnitude(&self.digits, &other.digits), self.negative)
            }
            Ordering::Less => {
                Bigint::from_parts(sub_magnitude(&other.digits, &self.digits), other.negative)
            }
            Ordering::Equal => Bigint::zero(),
        }
    }
}

impl Sub for &Bigint {
    type Output = Bigint;

    fn sub(self, other: &Bigint) -> Bigint {
        if self.negative != other.negative {
            return Bigint::from_parts(add_magnitude(&self.digits, &other.digits), self.negative);
        }
        match cmp_magnitude(&self.digits, &other.digits) {
            Ordering::Greater => {
                Bigint::from_parts(sub_magnitude(&self.digits, &other.digits), self.negative)
            }
            Ordering::Less => {
                Bigint::from_parts(sub_magnitude(&other.digits, &self.digits), !self.negative)
            }
            Ordering::Equal => Bigint::zero(),
        }
    }
}

impl Mul for &Bigint {
    type Output = Bigint;

    fn mul(self, other: &Bigint) -> Bigint {
        Bigint::from_parts(
            mul_magnitude(&self.digits, &other.digits),
            self.negative != other.negative,
        )
    }
}

impl Serialize for Bigint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

// ============================================================================
// Magnitude helpers (little-endian digit slices)
// ============================================================================

/// Drop leading zero digits, keeping at least one digit
fn trim(digits: &mut Vec<u64>) {
    while digits.len() > 1 && digits[digits.len() - 1] == 0 {
        digits.pop();
    }
    if digits.is_empty() {
        digits.push(0);
    }
}

/// Compare by digit count first, then digit-wise from the top
fn cmp_magnitude(a: &[u64], b: &[u64]) -> Ordering {
    a.len()
        .cmp(&b.len())
        .then_with(|| a.iter().rev().cmp(b.iter().rev()))
}

fn add_magnitude(a: &[u64], b: &[u64]) -> Vec<u64> {
    let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    let mut result = Vec::with_capacity(long.len() + 1);
    let mut carry = false;
    for (i, &x) in long.iter().enumerate() {
        let y = short.get(i).copied().unwrap_or(0);
        let (sum, c1) = x.overflowing_add(y);
        let (sum, c2) = sum.overflowing_add(carry as u64);
        result.push(sum);
        carry = c1 || c2;
    }
    if carry {
        result.push(1);
    }
    result
}

/// `a - b` for `a >= b`
fn sub_magnitude(a: &[u64], b: &[u64]) -> Vec<u64> {
    let mut result = Vec::with_capacity(a.len());
    let mut borrow = false;
    for (i, &x) in a.iter().enumerate() {
        let y = b.get(i).copied().unwrap_or(0);
        let (diff, b1) = x.overflowing_sub(y);
        let (diff, b2) = diff.overflowing_sub(borrow as u64);
        result.push(diff);
        borrow = b1 || b2;
    }
    debug_assert!(!borrow, "sub_magnitude requires a >= b");
    trim(&mut result);
    result
}

/// Schoolbook multiply; each 64x64 product is widened to 128 bits
fn mul_magnitude(a: &[u64], b: &[u64]) -> Vec<u64> {
    let mut result = vec![0u64; a.len() + b.len()];
    for (i, &x) in a.iter().enumerate() {
        if x == 0 {
            continue;
        }
        let mut carry: u128 = 0;
        for (j, &y) in b.iter().enumerate() {
            let t = x as u128 * y as u128 + result[i + j] as u128 + carry;
            result[i + j] = t as u64;
            carry = t >> 64;
        }
        result[i + b.len()] = carry as u64;
    }
    trim(&mut result);
    result
}

fn magnitude_increment(digits: &mut Vec<u64>) {
    for d in digits.iter_mut() {
        let (value, carry) = d.overflowing_add(1);
        *d = value;
        if !carry {
            return;
        }
    }
    digits.push(1);
}

/// Requires a nonzero magnitude
fn magnitude_decrement(digits: &mut [u64]) {
    for d in digits.iter_mut() {
        let (value, borrow) = d.overflowing_sub(1);
        *d = value;
        if !borrow {
            return;
        }
    }
}

/// Shift left by one bit in place
fn shl1(digits: &mut Vec<u64>) {
    let mut carry = 0u64;
    for d in digits.iter_mut() {
        let next = *d >> 63;
        *d = (*d << 1) | carry;
        carry = next;
    }
    if carry != 0 {
        digits.push(carry);
    }
}

/// Divide a magnitude by a single digit
pub(crate) fn divmod_small(a: &[u64], divisor: u64) -> (Vec<u64>, u64) {
    let mut quotient = vec![0u64; a.len()];
    let mut rem: u128 = 0;
    for i in (0..a.len()).rev() {
        let cur = (rem << 64) | a[i] as u128;
        quotient[i] = (cur / divisor as u128) as u64;
        rem = cur % divisor as u128;
    }
    trim(&mut quotient);
    (quotient, rem as u64)
}

/// Binary long division of magnitudes; `b` must be nonzero
fn divmod_magnitude(a: &[u64], b: &[u64]) -> (Vec<u64>, Vec<u64>) {
    if b.len() == 1 {
        let (q, r) = divmod_small(a, b[0]);
        return (q, vec![r]);
    }
    if cmp_magnitude(a, b) == Ordering::Less {
        return (vec![0], a.to_vec());
    }

    let mut quotient = vec![0u64; a.len()];
    let mut remainder: Vec<u64> = vec![0];
    for i in (0..a.len()).rev() {
        for bit in (0..64).rev() {
            shl1(&mut remainder);
            remainder[0] |= (a[i] >> bit) & 1;
            if cmp_magnitude(&remainder, b) != Ordering::Less {
                remainder = sub_magnitude(&remainder, b);
                quotient[i] |= 1 << bit;
            }
        }
    }
    trim(&mut quotient);
    (quotient, remainder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn big(s: &str) -> Bigint {
        s.parse().unwrap()
    }

    #[test]
    fn test_zero_is_normalized() {
        let z = Bigint::zero();
        assert!(z.is_zero());
        assert!(!z.is_negative());
        assert_eq!(z.digits(), &[0]);
    }

    #[test]
    fn test_subtract_self_is_positive_zero() {
        let a = big("-123456789012345678901234567890");
        let d = &a - &a;
        assert!(d.is_zero());
        assert!(!d.is_negative());
    }

    #[test]
    fn test_add_carries_into_new_digit() {
        let a = Bigint::from(u64::MAX);
        let sum = &a + &Bigint::one();
        assert_eq!(sum.digits(), &[0, 1]);
    }

    #[test]
    fn test_from_plain_literals() {
        assert_eq!(Bigint::from(-3), Bigint::from(-3i64));
        assert_eq!(Bigint::from(i32::MIN).to_string(), "-2147483648");
        assert_eq!(Bigint::from(7).digits(), &[7]);
    }

    #[test]
    fn test_add_mixed_signs() {
        assert_eq!(&Bigint::from(5) + &Bigint::from(-8), Bigint::from(-3));
        assert_eq!(&Bigint::from(-5) + &Bigint::from(8), Bigint::from(3));
        assert_eq!(&Bigint::from(-5) + &Bigint::from(5), Bigint::zero());
    }

    #[test]
    fn test_sub_borrows_across_digits() {
        let a = big("18446744073709551616"); // 2^64
        let d = &a - &Bigint::one();
        assert_eq!(d, Bigint::from(u64::MAX));
        assert_eq!(d.digits().len(), 1);
    }

    #[test]
    fn test_multiply_signs() {
        assert_eq!(&Bigint::from(-4) * &Bigint::from(6), Bigint::from(-24));
        assert_eq!(&Bigint::from(-4) * &Bigint::from(-6), Bigint::from(24));
        assert!(!(&Bigint::from(-4) * &Bigint::zero()).is_negative());
    }

    #[test]
    fn test_multiply_large() {
        let a = big("123456789012345678901234567890");
        let b = big("987654321098765432109876543210");
        assert_eq!(
            (&a * &b).to_string(),
            "121932631137021795226185032733622923332237463801111263526900"
        );
    }

    #[test]
    fn test_divmod_floor_semantics() {
        let cases = [(7, 2, 3, 1), (-7, 2, -4, 1), (7, -2, -4, -1), (-7, -2, 3, -1), (-1, 2, -1, 1)];
        for (a, b, q, r) in cases {
            let (quot, rem) = Bigint::from(a).divmod(&Bigint::from(b)).unwrap();
            assert_eq!(quot, Bigint::from(q), "{a} / {b}");
            assert_eq!(rem, Bigint::from(r), "{a} % {b}");
        }
    }

    #[test]
    fn test_divmod_multi_digit_divisor() {
        let a = big("340282366920938463463374607431768211457"); // 2^128 + 1
        let b = big("18446744073709551617"); // 2^64 + 1
        let (q, r) = a.divmod(&b).unwrap();
        assert_eq!(q, big("18446744073709551615"));
        assert_eq!(r, Bigint::from(2));
    }

    #[test]
    fn test_divide_by_zero() {
        assert_eq!(
            Bigint::from(3).divmod(&Bigint::zero()),
            Err(BigintError::DivisionByZero)
        );
    }

    #[test]
    fn test_increment_decrement_cross_zero() {
        let mut n = Bigint::from(-1);
        n.increment();
        assert_eq!(n, Bigint::zero());
        assert!(!n.is_negative());
        n.increment();
        assert_eq!(n, Bigint::one());
        n.decrement();
        n.decrement();
        assert_eq!(n, Bigint::from(-1));
    }

    #[test]
    fn test_decrement_zero() {
        let mut n = Bigint::zero();
        n.decrement();
        assert_eq!(n, Bigint::from(-1));
    }

    #[test]
    fn test_increment_grows_digits() {
        let mut n = Bigint::from(u64::MAX);
        n.increment();
        assert_eq!(n.digits(), &[0, 1]);
        n.decrement();
        assert_eq!(n, Bigint::from(u64::MAX));
    }

    #[test]
    fn test_pow() {
        assert_eq!(Bigint::from(3).pow(&Bigint::from(2)).unwrap(), Bigint::from(9));
        assert_eq!(
            Bigint::from(2).pow(&Bigint::from(100)).unwrap().to_string(),
            "1267650600228229401496703205376"
        );
        assert_eq!(Bigint::from(-2).pow(&Bigint::from(3)).unwrap(), Bigint::from(-8));
        assert_eq!(Bigint::from(7).pow(&Bigint::zero()).unwrap(), Bigint::one());
    }

    #[test]
    fn test_pow_negative_exponent() {
        assert_eq!(
            Bigint::from(2).pow(&Bigint::from(-1)),
            Err(BigintError::NegativeExponent)
        );
    }

    #[test]
    fn test_ordering() {
        let mut values = vec![
            big("100000000000000000000000"),
            Bigint::from(-3),
            Bigint::zero(),
            big("-100000000000000000000000"),
            Bigint::from(7),
        ];
        values.sort();
        let rendered: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        assert_eq!(
            rendered,
            ["-100000000000000000000000", "-3", "0", "7", "100000000000000000000000"]
        );
    }

    #[test]
    fn test_to_i64_bounds() {
        assert_eq!(Bigint::from(i64::MIN).to_i64(), Some(i64::MIN));
        assert_eq!(Bigint::from(i64::MAX).to_i64(), Some(i64::MAX));
        assert_eq!(Bigint::from(u64::MAX).to_i64(), None);
        assert_eq!(Bigint::from(-1).to_usize(), None);
    }

    #[test]
    fn test_bit_length() {
        assert_eq!(Bigint::zero().bit_length(), 0);
        assert_eq!(Bigint::from(1).bit_length(), 1);
        assert_eq!(Bigint::from(255).bit_length(), 8);
        assert_eq!(big("18446744073709551616").bit_length(), 65);
    }

    fn arb_bigint() -> impl Strategy<Value = Bigint> {
        (prop::collection::vec(any::<u64>(), 1..4), any::<bool>())
            .prop_map(|(digits, negative)| Bigint::from_parts(digits, negative))
    }

    proptest! {
        #[test]
        fn prop_add_associative(a in arb_bigint(), b in arb_bigint(), c in arb_bigint()) {
            prop_assert_eq!(&(&a + &b) + &c, &a + &(&b + &c));
        }

        #[test]
        fn prop_mul_distributes(a in arb_bigint(), b in arb_bigint(), c in arb_bigint()) {
            prop_assert_eq!(&a * &(&b + &c), &(&a * &b) + &(&a * &c));
        }

        #[test]
        fn prop_divmod_identity(a in arb_bigint(), b in arb_bigint()) {
            prop_assume!(!b.is_zero());
            let (q, r) = a.divmod(&b).unwrap();
            prop_assert_eq!(&(&q * &b) + &r, a);
            prop_assert!(r.is_zero() || r.is_negative() == b.is_negative());
            prop_assert!(r.abs() < b.abs());
        }

        #[test]
        fn prop_sub_self_zero(a in arb_bigint()) {
            let d = &a - &a;
            prop_assert!(d.is_zero());
            prop_assert!(!d.is_negative());
        }

        #[test]
        fn prop_sub_inverts_add(a in arb_bigint(), b in arb_bigint()) {
            prop_assert_eq!(&(&a + &b) - &b, a);
        }
    }
}
