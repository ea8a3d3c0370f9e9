//! Text and radix conversion

use std::fmt;
use std::str::FromStr;

use super::{Bigint, BigintError, divmod_small};

/// Largest power of ten that fits in a digit; each division step peels off
/// this many decimal places at once
const DECIMAL_CHUNK: u64 = 10_000_000_000_000_000_000;
const DECIMAL_CHUNK_WIDTH: usize = 19;

impl fmt::Display for Bigint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut chunks = Vec::new();
        let mut magnitude = self.digits.clone();
        loop {
            let (quotient, rem) = divmod_small(&magnitude, DECIMAL_CHUNK);
            chunks.push(rem);
            if quotient.len() == 1 && quotient[0] == 0 {
                break;
            }
            magnitude = quotient;
        }

        let mut text = String::with_capacity(chunks.len() * DECIMAL_CHUNK_WIDTH + 1);
        if self.negative {
            text.push('-');
        }
        let mut iter = chunks.iter().rev();
        if let Some(first) = iter.next() {
            text.push_str(&first.to_string());
        }
        for chunk in iter {
            text.push_str(&format!("{chunk:0width$}", width = DECIMAL_CHUNK_WIDTH));
        }
        f.pad(&text)
    }
}

impl FromStr for Bigint {
    type Err = BigintError;

    /// Parse an optionally `-`-prefixed run of decimal digits
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (negative, body) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        if body.is_empty() || !body.bytes().all(|b| b.is_ascii_digit()) {
            return Err(BigintError::Parse(s.to_string()));
        }

        let mut digits = vec![0u64];
        for chunk in body.as_bytes().chunks(DECIMAL_CHUNK_WIDTH) {
            let mut scale = 1u64;
            let mut value = 0u64;
            for &b in chunk {
                scale *= 10;
                value = value * 10 + (b - b'0') as u64;
            }
            mul_add_small(&mut digits, scale, value);
        }
        Ok(Bigint::from_parts(digits, negative))
    }
}

/// `digits = digits * mul + add` in place
fn mul_add_small(digits: &mut Vec<u64>, mul: u64, add: u64) {
    let mut carry = add as u128;
    for d in digits.iter_mut() {
        let t = *d as u128 * mul as u128 + carry;
        *d = t as u64;
        carry = t >> 64;
    }
    if carry != 0 {
        digits.push(carry as u64);
    }
}

impl Bigint {
    /// Digits of the magnitude in `base`, most significant first
    ///
    /// Zero has no digits.
    pub fn to_digits(&self, base: &Bigint) -> Result<Vec<Bigint>, BigintError> {
        if *base < Bigint::from(2) {
            return Err(BigintError::InvalidBase(base.to_string()));
        }
        let mut digits = Vec::new();
        let mut rest = self.abs();
        while !rest.is_zero() {
            let (quotient, rem) = rest.divmod(base)?;
            digits.push(rem);
            rest = quotient;
        }
        digits.reverse();
        Ok(digits)
    }

    /// Evaluate most-significant-first digits in `base`
    pub fn from_digits<'a, I>(digits: I, base: &Bigint) -> Bigint
    where
        I: IntoIterator<Item = &'a Bigint>,
    {
        digits
            .into_iter()
            .fold(Bigint::zero(), |acc, digit| &(&acc * base) + digit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_display_small() {
        assert_eq!(Bigint::zero().to_string(), "0");
        assert_eq!(Bigint::from(-42).to_string(), "-42");
        assert_eq!(Bigint::from(u64::MAX).to_string(), "18446744073709551615");
    }

    #[test]
    fn test_display_pads_inner_chunks() {
        let n: Bigint = "100000000000000000000000000000000000001".parse().unwrap();
        assert_eq!(n.to_string(), "100000000000000000000000000000000000001");
    }

    #[test]
    fn test_parse_errors() {
        assert!("".parse::<Bigint>().is_err());
        assert!("-".parse::<Bigint>().is_err());
        assert!("12a".parse::<Bigint>().is_err());
        assert!("+5".parse::<Bigint>().is_err());
    }

    #[test]
    fn test_parse_negative_zero() {
        let z: Bigint = "-0000".parse().unwrap();
        assert!(z.is_zero());
        assert!(!z.is_negative());
    }

    #[test]
    fn test_to_digits() {
        let digits = Bigint::from(6).to_digits(&Bigint::from(2)).unwrap();
        assert_eq!(digits, vec![Bigint::one(), Bigint::one(), Bigint::zero()]);
        assert!(Bigint::zero().to_digits(&Bigint::from(10)).unwrap().is_empty());
        assert!(Bigint::from(5).to_digits(&Bigint::one()).is_err());
    }

    #[test]
    fn test_from_digits() {
        let digits = [Bigint::from(1), Bigint::from(2), Bigint::from(3)];
        assert_eq!(Bigint::from_digits(&digits, &Bigint::from(10)), Bigint::from(123));
        assert_eq!(Bigint::from_digits(&[], &Bigint::from(10)), Bigint::zero());
    }

    #[test]
    fn test_digits_round_trip_large_base() {
        let n: Bigint = "98765432109876543210987654321098765432".parse().unwrap();
        let base: Bigint = "1000000000000000000000".parse().unwrap();
        let digits = n.to_digits(&base).unwrap();
        assert_eq!(Bigint::from_digits(&digits, &base), n);
    }

    proptest! {
        #[test]
        fn prop_string_round_trip(digits in prop::collection::vec(any::<u64>(), 1..5), negative in any::<bool>()) {
            let n = Bigint::from_parts(digits, negative);
            let parsed: Bigint = n.to_string().parse().unwrap();
            prop_assert_eq!(parsed, n);
        }

        #[test]
        fn prop_decimal_text_matches_i64(v in any::<i64>()) {
            prop_assert_eq!(Bigint::from(v).to_string(), v.to_string());
            prop_assert_eq!(v.to_string().parse::<Bigint>().unwrap(), Bigint::from(v));
        }
    }
}
