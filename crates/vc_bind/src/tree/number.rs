use alloc::string::{String, ToString};
use core::fmt;
use core::str::FromStr;

use bigdecimal::BigDecimal;
use num_bigint::{BigInt, Sign};
use num_traits::{ToPrimitive, Zero};

/// Integral digits past which every fixed-width integer saturates.
/// `u128::MAX` has 39.
const INTEGER_DIGITS: i64 = 40;

/// Decimal exponents past which `f64` saturates or underflows.
const F64_EXPONENTS: core::ops::RangeInclusive<i64> = -400..=310;

// -----------------------------------------------------------------------------
// Number

/// An arbitrary precision number stored in the primitive tree.
///
/// Integers and decimals are kept apart so that `1` and `1.0` survive a
/// round trip through a format unchanged.
///
/// # Examples
///
/// ```
/// use vc_bind::tree::Number;
///
/// let n = Number::parse("300").unwrap();
/// assert!(n.is_integer());
/// assert_eq!(n.clamped().to_i8(), 127);
///
/// let d = Number::parse("-2.75").unwrap();
/// assert!(!d.is_integer());
/// assert_eq!(d.clamped().to_i32(), -2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Number {
    Integer(BigInt),
    Decimal(BigDecimal),
}

/// Error returned by [`Number::parse`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("could not parse `{0}` as a number")]
pub struct ParseNumberError(pub String);

impl Number {
    /// Parses decimal text.
    ///
    /// Text containing a fractional separator or an exponent becomes a
    /// [`Number::Decimal`], anything else must be an integer.
    pub fn parse(text: &str) -> Result<Self, ParseNumberError> {
        let trimmed = text.trim();
        let decimal = trimmed.contains(['.', 'e', 'E']);
        let parsed = if decimal {
            BigDecimal::from_str(trimmed).ok().map(Number::Decimal)
        } else {
            let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
            BigInt::from_str(digits).ok().map(Number::Integer)
        };
        parsed.ok_or_else(|| ParseNumberError(text.to_string()))
    }

    /// Converts a float, returning `None` for NaN and infinities.
    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        // `Display` prints the shortest text that reads back to the same float.
        BigDecimal::from_str(&value.to_string())
            .ok()
            .map(Number::Decimal)
    }

    /// Converts a float, returning `None` for NaN and infinities.
    ///
    /// The decimal is the shortest text of the `f32` itself, so `0.1f32`
    /// becomes `0.1` rather than its widened `f64` expansion.
    pub fn from_f32(value: f32) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        BigDecimal::from_str(&value.to_string())
            .ok()
            .map(Number::Decimal)
    }

    #[inline]
    pub fn is_integer(&self) -> bool {
        matches!(self, Self::Integer(_))
    }

    /// Returns `true` if the number is below zero.
    pub fn is_negative(&self) -> bool {
        match self {
            Self::Integer(int) => int.sign() == Sign::Minus,
            Self::Decimal(dec) => dec.sign() == Sign::Minus,
        }
    }

    /// The integral part, truncated toward zero.
    ///
    /// A decimal with a large positive exponent expands into all of its
    /// digits here. Narrowing through [`clamped`](Self::clamped) does not.
    pub fn to_bigint(&self) -> BigInt {
        match self {
            Self::Integer(int) => int.clone(),
            Self::Decimal(dec) => {
                let (mantissa, scale) = dec.as_bigint_and_exponent();
                if scale <= 0 {
                    dec.with_scale(0).into_bigint_and_exponent().0
                } else if scale.unsigned_abs() >= dec.digits() {
                    BigInt::zero()
                } else {
                    // `scale` is below the mantissa's digit count here.
                    mantissa / BigInt::from(10u8).pow(scale as u32)
                }
            }
        }
    }

    fn is_zero(&self) -> bool {
        match self {
            Self::Integer(int) => int.is_zero(),
            Self::Decimal(dec) => dec.is_zero(),
        }
    }

    /// The integral part when it fits some fixed-width integer,
    /// `None` when it saturates all of them.
    fn bounded_bigint(&self) -> Option<BigInt> {
        match self {
            Self::Integer(int) => Some(int.clone()),
            Self::Decimal(_) if self.is_zero() => Some(BigInt::zero()),
            Self::Decimal(dec) if magnitude(dec) > INTEGER_DIGITS => None,
            Self::Decimal(_) => Some(self.to_bigint()),
        }
    }

    pub fn to_bigdecimal(&self) -> BigDecimal {
        match self {
            Self::Integer(int) => BigDecimal::from(int.clone()),
            Self::Decimal(dec) => dec.clone(),
        }
    }

    /// A view narrowing this number into fixed-width types.
    #[inline]
    pub fn clamped(&self) -> ClampedNumber<'_> {
        ClampedNumber(self)
    }
}

/// Decimal digits before the point, `digits - scale`. Zero or negative
/// below `1`.
fn magnitude(dec: &BigDecimal) -> i64 {
    let (_, scale) = dec.as_bigint_and_exponent();
    i64::try_from(dec.digits())
        .unwrap_or(i64::MAX)
        .saturating_sub(scale)
}

impl Default for Number {
    #[inline]
    fn default() -> Self {
        Self::Integer(BigInt::zero())
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(int) => fmt::Display::fmt(int, f),
            Self::Decimal(dec) => fmt::Display::fmt(dec, f),
        }
    }
}

impl FromStr for Number {
    type Err = ParseNumberError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

macro_rules! impl_from_integer {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Number {
                #[inline]
                fn from(value: $ty) -> Self {
                    Self::Integer(BigInt::from(value))
                }
            }
        )*
    };
}

impl_from_integer!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl From<BigInt> for Number {
    #[inline]
    fn from(value: BigInt) -> Self {
        Self::Integer(value)
    }
}

impl From<BigDecimal> for Number {
    #[inline]
    fn from(value: BigDecimal) -> Self {
        Self::Decimal(value)
    }
}

// -----------------------------------------------------------------------------
// ClampedNumber

/// A lazily evaluated narrowing view over a [`Number`].
///
/// Every conversion saturates at the bounds of the target type instead of
/// wrapping or failing. Decimals are truncated toward zero before narrowing
/// into integer types.
///
/// # Examples
///
/// ```
/// use vc_bind::tree::Number;
///
/// assert_eq!(Number::from(300).clamped().to_i8(), 127);
/// assert_eq!(Number::from(-300).clamped().to_i8(), -128);
/// assert_eq!(Number::from(-1).clamped().to_u32(), 0);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ClampedNumber<'a>(&'a Number);

macro_rules! clamp_integer {
    ($($name:ident => $ty:ty, $to:ident;)*) => {
        $(
            #[doc = concat!("Narrows into `", stringify!($ty), "`, saturating on overflow.")]
            pub fn $name(self) -> $ty {
                let saturated = if self.0.is_negative() { <$ty>::MIN } else { <$ty>::MAX };
                self.0
                    .bounded_bigint()
                    .and_then(|int| int.$to())
                    .unwrap_or(saturated)
            }
        )*
    };
}

impl ClampedNumber<'_> {
    clamp_integer! {
        to_i8 => i8, to_i8;
        to_i16 => i16, to_i16;
        to_i32 => i32, to_i32;
        to_i64 => i64, to_i64;
        to_i128 => i128, to_i128;
        to_isize => isize, to_isize;
        to_u8 => u8, to_u8;
        to_u16 => u16, to_u16;
        to_u32 => u32, to_u32;
        to_u64 => u64, to_u64;
        to_u128 => u128, to_u128;
        to_usize => usize, to_usize;
    }

    /// Narrows into `f64`, saturating at `f64::MAX`/`f64::MIN`.
    pub fn to_f64(self) -> f64 {
        let value = match self.0 {
            Number::Integer(int) => int.to_f64(),
            Number::Decimal(_) if self.0.is_zero() => Some(0.0),
            Number::Decimal(dec) => match magnitude(dec) {
                exp if exp > *F64_EXPONENTS.end() => None,
                exp if exp < *F64_EXPONENTS.start() => Some(0.0),
                _ => dec.to_f64(),
            },
        };
        match value {
            Some(v) if v.is_finite() => v,
            _ if self.0.is_negative() => f64::MIN,
            _ => f64::MAX,
        }
    }

    /// Narrows into `f32`, saturating at `f32::MAX`/`f32::MIN`.
    pub fn to_f32(self) -> f32 {
        self.to_f64().clamp(f32::MIN as f64, f32::MAX as f64) as f32
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::Number;
    use core::time::Duration;
    use num_bigint::BigInt;
    use std::time::Instant;

    #[test]
    fn parse_picks_representation() {
        assert!(Number::parse("42").unwrap().is_integer());
        assert!(Number::parse("+42").unwrap() == Number::from(42));
        assert!(!Number::parse("4.2").unwrap().is_integer());
        assert!(!Number::parse("1e3").unwrap().is_integer());
        assert!(Number::parse("forty").is_err());
        assert!(Number::parse("").is_err());
    }

    #[test]
    fn clamp_saturates() {
        assert!(Number::from(300).clamped().to_i8() == 127);
        assert!(Number::from(-300).clamped().to_i8() == -128);
        assert!(Number::from(70000).clamped().to_u16() == u16::MAX);
        assert!(Number::from(-5).clamped().to_usize() == 0);

        let huge = Number::from(BigInt::from(u128::MAX) * 4);
        assert!(huge.clamped().to_i128() == i128::MAX);
        assert!(huge.clamped().to_u64() == u64::MAX);
    }

    #[test]
    fn clamp_truncates_decimals() {
        let n = Number::parse("9.99").unwrap();
        assert!(n.clamped().to_i32() == 9);
        let n = Number::parse("-9.99").unwrap();
        assert!(n.clamped().to_i32() == -9);
        let n = Number::parse("1e400").unwrap();
        assert!(n.clamped().to_f64() == f64::MAX);
        assert!(n.clamped().to_f32() == f32::MAX);
    }

    #[test]
    fn clamp_huge_exponents_without_expanding() {
        let start = Instant::now();

        let big = Number::parse("1e2000000000").unwrap();
        assert!(big.clamped().to_i32() == i32::MAX);
        assert!(big.clamped().to_u128() == u128::MAX);
        assert!(big.clamped().to_f64() == f64::MAX);

        let negative = Number::parse("-4.5e50000000").unwrap();
        assert!(negative.clamped().to_i64() == i64::MIN);
        assert!(negative.clamped().to_u8() == 0);
        assert!(negative.clamped().to_f32() == f32::MIN);

        let tiny = Number::parse("1e-2000000000").unwrap();
        assert!(tiny.clamped().to_i32() == 0);
        assert!(tiny.clamped().to_f64() == 0.0);
        assert!(tiny.to_bigint() == BigInt::from(0));

        let zero = Number::parse("0e2000000000").unwrap();
        assert!(zero.clamped().to_i16() == 0);

        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn clamp_near_the_bounds() {
        let n = Number::parse("2.147483647e9").unwrap();
        assert!(n.clamped().to_i32() == i32::MAX);
        let n = Number::parse("2.147483648e9").unwrap();
        assert!(n.clamped().to_i32() == i32::MAX);
        assert!(n.clamped().to_i64() == 2_147_483_648);
        let n = Number::parse("123.456e1").unwrap();
        assert!(n.to_bigint() == BigInt::from(1234));
    }

    #[test]
    fn f32_keeps_its_own_digits() {
        assert!(Number::from_f32(0.1).unwrap().to_string() == "0.1");
        assert!(Number::from_f32(f32::NAN).is_none());
    }

    #[test]
    fn float_round_trip() {
        let n = Number::from_f64(0.1).unwrap();
        assert!(n == Number::parse("0.1").unwrap());
        assert!((n.clamped().to_f64() - 0.1).abs() < 1e-12);
        assert!(Number::from_f64(f64::NAN).is_none());
        assert!(Number::from_f64(f64::INFINITY).is_none());
    }

    #[test]
    fn display() {
        assert!(Number::from(-7).to_string() == "-7");
        assert!(Number::parse("2.5").unwrap().to_string() == "2.5");
    }
}
