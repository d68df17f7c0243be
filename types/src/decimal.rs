//! Arbitrary-precision decimal numbers used for balances, fees and stake values.
use std::{
    cmp::Ordering,
    fmt::{self, Display, Formatter},
    iter::Sum,
    ops::{Add, Neg, Sub},
    str::FromStr,
};

use num::{BigInt, Integer, Signed, Zero};
use serde::{de::Error as SerdeError, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::bytesrepr::{self, FromBytes, ToBytes};

/// Error returned when parsing a [`Decimal`] from a string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecimalError {
    /// The input was empty or had no digits.
    #[error("empty decimal string")]
    Empty,
    /// The input contained something other than an optional `-`, digits and one `.`.
    #[error("invalid decimal string: {0:?}")]
    Invalid(String),
    /// The fractional part is longer than can be represented.
    #[error("decimal has too many fractional digits")]
    TooManyDigits,
}

/// A signed decimal number of unbounded precision.
///
/// Values are kept normalized (no trailing fractional zeros, zero has scale 0), so the derived
/// equality is numeric equality and the string form is canonical.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Decimal {
    mantissa: BigInt,
    scale: u32,
}

impl Decimal {
    /// Returns a zero value.
    pub fn zero() -> Self {
        Decimal::default()
    }

    fn new(mantissa: BigInt, scale: u32) -> Self {
        let mut decimal = Decimal { mantissa, scale };
        decimal.normalize();
        decimal
    }

    fn normalize(&mut self) {
        if self.mantissa.is_zero() {
            self.scale = 0;
            return;
        }
        let ten = BigInt::from(10u8);
        while self.scale > 0 {
            let (quotient, remainder) = self.mantissa.div_rem(&ten);
            if !remainder.is_zero() {
                break;
            }
            self.mantissa = quotient;
            self.scale -= 1;
        }
    }

    fn rescaled_mantissa(&self, scale: u32) -> BigInt {
        debug_assert!(scale >= self.scale);
        let factor: BigInt = num::pow(BigInt::from(10u8), (scale - self.scale) as usize);
        &self.mantissa * factor
    }

    /// Returns `true` if the value is zero.
    pub fn is_zero(&self) -> bool {
        self.mantissa.is_zero()
    }

    /// Returns `true` if the value is strictly below zero.
    pub fn is_negative(&self) -> bool {
        self.mantissa.is_negative()
    }

    /// Converts to the nearest `f64`.
    ///
    /// Only the vote tally works in floating point; balances never go through this conversion.
    pub fn to_f64(&self) -> f64 {
        // Rust's float parser rounds correctly, which keeps the conversion deterministic.
        self.to_string().parse().unwrap_or(f64::NAN)
    }
}

impl Display for Decimal {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        let sign = if self.mantissa.is_negative() { "-" } else { "" };
        let digits = self.mantissa.magnitude().to_string();
        let scale = self.scale as usize;
        if scale == 0 {
            return write!(formatter, "{}{}", sign, digits);
        }
        let padded = if digits.len() <= scale {
            format!("{}{}", "0".repeat(scale + 1 - digits.len()), digits)
        } else {
            digits
        };
        let (integer, fraction) = padded.split_at(padded.len() - scale);
        write!(formatter, "{}{}.{}", sign, integer, fraction)
    }
}

impl FromStr for Decimal {
    type Err = DecimalError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        if input.is_empty() {
            return Err(DecimalError::Empty);
        }
        let (negative, unsigned) = match input.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, input),
        };
        let (integer, fraction) = match unsigned.split_once('.') {
            Some((integer, fraction)) => (integer, fraction),
            None => (unsigned, ""),
        };
        let all_digits = |part: &str| part.bytes().all(|byte| byte.is_ascii_digit());
        if integer.is_empty()
            || !all_digits(integer)
            || !all_digits(fraction)
            || (unsigned.contains('.') && fraction.is_empty())
        {
            return Err(DecimalError::Invalid(input.to_string()));
        }
        let scale = u32::try_from(fraction.len()).map_err(|_| DecimalError::TooManyDigits)?;
        let digits = format!("{}{}", integer, fraction);
        let mut mantissa = BigInt::parse_bytes(digits.as_bytes(), 10)
            .ok_or_else(|| DecimalError::Invalid(input.to_string()))?;
        if negative {
            mantissa = -mantissa;
        }
        Ok(Decimal::new(mantissa, scale))
    }
}

impl From<u64> for Decimal {
    fn from(value: u64) -> Self {
        Decimal::new(BigInt::from(value), 0)
    }
}

impl From<i64> for Decimal {
    fn from(value: i64) -> Self {
        Decimal::new(BigInt::from(value), 0)
    }
}

impl Ord for Decimal {
    fn cmp(&self, other: &Self) -> Ordering {
        let scale = self.scale.max(other.scale);
        self.rescaled_mantissa(scale)
            .cmp(&other.rescaled_mantissa(scale))
    }
}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Add for &Decimal {
    type Output = Decimal;

    fn add(self, rhs: &Decimal) -> Decimal {
        let scale = self.scale.max(rhs.scale);
        Decimal::new(
            self.rescaled_mantissa(scale) + rhs.rescaled_mantissa(scale),
            scale,
        )
    }
}

impl Add for Decimal {
    type Output = Decimal;

    fn add(self, rhs: Decimal) -> Decimal {
        &self + &rhs
    }
}

impl Sub for &Decimal {
    type Output = Decimal;

    fn sub(self, rhs: &Decimal) -> Decimal {
        let scale = self.scale.max(rhs.scale);
        Decimal::new(
            self.rescaled_mantissa(scale) - rhs.rescaled_mantissa(scale),
            scale,
        )
    }
}

impl Sub for Decimal {
    type Output = Decimal;

    fn sub(self, rhs: Decimal) -> Decimal {
        &self - &rhs
    }
}

impl Neg for Decimal {
    type Output = Decimal;

    fn neg(self) -> Decimal {
        Decimal::new(-self.mantissa, self.scale)
    }
}

impl<'a> Sum<&'a Decimal> for Decimal {
    fn sum<I: Iterator<Item = &'a Decimal>>(iter: I) -> Self {
        iter.fold(Decimal::zero(), |total, value| &total + value)
    }
}

impl Sum for Decimal {
    fn sum<I: Iterator<Item = Decimal>>(iter: I) -> Self {
        iter.fold(Decimal::zero(), |total, value| &total + &value)
    }
}

impl Serialize for Decimal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Decimal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let string = String::deserialize(deserializer)?;
        Decimal::from_str(&string).map_err(SerdeError::custom)
    }
}

impl ToBytes for Decimal {
    fn serialized_length(&self) -> usize {
        self.to_string().serialized_length()
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), bytesrepr::Error> {
        self.to_string().write_bytes(writer)
    }
}

impl FromBytes for Decimal {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), bytesrepr::Error> {
        let (string, remainder) = String::from_bytes(bytes)?;
        let decimal = Decimal::from_str(&string).map_err(|_| bytesrepr::Error::Formatting)?;
        // "1.50" and "1.5" are the same number but would hash differently.
        if decimal.to_string() != string {
            return Err(bytesrepr::Error::Formatting);
        }
        Ok((decimal, remainder))
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn dec(input: &str) -> Decimal {
        input.parse().unwrap()
    }

    #[test]
    fn should_parse_and_display_canonically() {
        assert_eq!(dec("4.50").to_string(), "4.5");
        assert_eq!(dec("0010").to_string(), "10");
        assert_eq!(dec("-0.000").to_string(), "0");
        assert_eq!(dec("0.05").to_string(), "0.05");
        assert_eq!(dec("-12.340").to_string(), "-12.34");
        assert_eq!(dec("100").to_string(), "100");
    }

    #[test]
    fn should_reject_malformed_strings() {
        assert_eq!(Decimal::from_str(""), Err(DecimalError::Empty));
        for input in ["-", ".5", "5.", "1.2.3", "1e5", "+1", "--1", "1,5", " 1"] {
            assert!(Decimal::from_str(input).is_err(), "{} should not parse", input);
        }
    }

    #[test]
    fn should_add_and_subtract_exactly() {
        assert_eq!(dec("1.5") + dec("4"), dec("5.5"));
        assert_eq!(dec("100") - dec("5.5"), dec("94.5"));
        assert_eq!(dec("0.1") + dec("0.2"), dec("0.3"));
        assert_eq!(dec("1") - dec("2.25"), dec("-1.25"));
        assert!((dec("1") - dec("2.25")).is_negative());
    }

    #[test]
    fn should_order_across_scales() {
        assert!(dec("1.5") > dec("1.49"));
        assert!(dec("-2") < dec("-1.999"));
        assert_eq!(dec("2.0").cmp(&dec("2")), Ordering::Equal);
    }

    #[test]
    fn should_sum() {
        let values = vec![dec("10"), dec("20"), dec("0.5")];
        assert_eq!(values.iter().sum::<Decimal>(), dec("30.5"));
    }

    #[test]
    fn should_convert_to_f64() {
        assert_eq!(dec("30").to_f64(), 30.0);
        assert_eq!(dec("-0.25").to_f64(), -0.25);
    }

    #[test]
    fn should_reject_non_canonical_encoding() {
        let bytes = "1.50".to_string().to_bytes().unwrap();
        assert_eq!(
            bytesrepr::deserialize::<Decimal>(&bytes),
            Err(bytesrepr::Error::Formatting)
        );
        let bytes = "1.5".to_string().to_bytes().unwrap();
        assert_eq!(bytesrepr::deserialize::<Decimal>(&bytes), Ok(dec("1.5")));
    }

    #[test]
    fn should_serde_as_string() {
        let json = serde_json::to_string(&dec("4.5")).unwrap();
        assert_eq!(json, "\"4.5\"");
        let decoded: Decimal = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, dec("4.5"));
    }

    fn arb_decimal() -> impl Strategy<Value = Decimal> {
        (any::<i64>(), 0u32..12).prop_map(|(mantissa, scale)| {
            Decimal::new(BigInt::from(mantissa), scale)
        })
    }

    proptest! {
        #[test]
        fn add_then_sub_is_identity(a in arb_decimal(), b in arb_decimal()) {
            prop_assert_eq!(&(&a + &b) - &b, a);
        }

        #[test]
        fn display_parse_roundtrip(a in arb_decimal()) {
            prop_assert_eq!(a.to_string().parse::<Decimal>().unwrap(), a.clone());
            bytesrepr::test_serialization_roundtrip(&a);
        }
    }
}
