//! Serializers of the scalar types known to the default registry.

use alloc::string::{String, ToString};
use core::fmt;
use core::marker::PhantomData;
use core::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use core::str::FromStr;
use core::time::Duration;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use bigdecimal::BigDecimal;
use num_bigint::BigInt;

use crate::error::{Error, ErrorContainer, ErrorEntry};
use crate::info::Typed;
use crate::serializer::{Bind, NewSerializer, Serializer, SerializerContext, SerializerRegistry};
use crate::tree::{DataVisitor, Number, Value};

// -----------------------------------------------------------------------------
// Numbers

/// A numeric type bound through [`NumberSerializer`].
pub trait BindNumber: Bind + Send + Sync {
    fn to_number(&self) -> Option<Number>;

    /// Narrows a number, saturating at the bounds of `Self`.
    fn from_number(number: &Number) -> Self;

    /// Parses number text.
    fn parse_number(text: &str) -> Option<Self> {
        Number::parse(text).ok().map(|number| Self::from_number(&number))
    }
}

macro_rules! impl_bind_integer {
    ($($ty:ty => $to:ident),* $(,)?) => {
        $(
            impl Bind for $ty {
                #[inline]
                fn zero() -> Option<Self> {
                    Some(0)
                }
            }

            impl BindNumber for $ty {
                #[inline]
                fn to_number(&self) -> Option<Number> {
                    Some(Number::from(*self))
                }

                #[inline]
                fn from_number(number: &Number) -> Self {
                    number.clamped().$to()
                }
            }
        )*
    };
}

impl_bind_integer! {
    i8 => to_i8, i16 => to_i16, i32 => to_i32, i64 => to_i64, i128 => to_i128, isize => to_isize,
    u8 => to_u8, u16 => to_u16, u32 => to_u32, u64 => to_u64, u128 => to_u128, usize => to_usize,
}

macro_rules! impl_bind_float {
    ($($ty:ty => $to:ident, $from:ident),* $(,)?) => {
        $(
            impl Bind for $ty {
                #[inline]
                fn zero() -> Option<Self> {
                    Some(0.0)
                }

                /// `NaN`, `inf` and `-inf` as text.
                fn to_primitive(&self) -> Option<Value> {
                    (!self.is_finite()).then(|| Value::String(self.to_string()))
                }
            }

            impl BindNumber for $ty {
                #[inline]
                fn to_number(&self) -> Option<Number> {
                    Number::$from(*self)
                }

                #[inline]
                fn from_number(number: &Number) -> Self {
                    number.clamped().$to()
                }

                /// Also accepts `NaN` and `inf`.
                fn parse_number(text: &str) -> Option<Self> {
                    text.trim().parse().ok()
                }
            }
        )*
    };
}

impl_bind_float!(f32 => to_f32, from_f32, f64 => to_f64, from_f64);

impl Bind for BigInt {
    #[inline]
    fn zero() -> Option<Self> {
        Some(BigInt::default())
    }
}

impl BindNumber for BigInt {
    #[inline]
    fn to_number(&self) -> Option<Number> {
        Some(Number::Integer(self.clone()))
    }

    #[inline]
    fn from_number(number: &Number) -> Self {
        number.to_bigint()
    }
}

impl Bind for BigDecimal {
    #[inline]
    fn zero() -> Option<Self> {
        Some(BigDecimal::default())
    }
}

impl BindNumber for BigDecimal {
    #[inline]
    fn to_number(&self) -> Option<Number> {
        Some(Number::Decimal(self.clone()))
    }

    #[inline]
    fn from_number(number: &Number) -> Self {
        number.to_bigdecimal()
    }
}

impl Bind for Number {
    #[inline]
    fn zero() -> Option<Self> {
        Some(Number::default())
    }
}

impl BindNumber for Number {
    #[inline]
    fn to_number(&self) -> Option<Number> {
        Some(self.clone())
    }

    #[inline]
    fn from_number(number: &Number) -> Self {
        number.clone()
    }
}

/// Binds a [`BindNumber`] to number primitives.
///
/// Reading accepts number text too. Text that is not a number is reported
/// as `CUSTOM`. Floats that have no number form are written as the text
/// `NaN`, `inf` or `-inf`, which reads back to the same float.
pub struct NumberSerializer<N>(PhantomData<fn() -> N>);

impl<N> NumberSerializer<N> {
    #[inline]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<N: BindNumber> Serializer<N> for NumberSerializer<N> {
    fn serialize(&self, value: &N, visitor: &mut DataVisitor, _: &mut ErrorContainer) -> Result<(), Error> {
        match value.to_number() {
            Some(number) => visitor.write_number(number)?,
            None => visitor.write_value(value.to_primitive().unwrap_or_default())?,
        };
        Ok(())
    }

    fn deserialize(
        &self,
        visitor: &mut DataVisitor,
        errors: &mut ErrorContainer,
    ) -> Result<Option<N>, Error> {
        Ok(match visitor.read_value()? {
            Some(Value::Number(number)) => Some(N::from_number(number)),
            Some(Value::String(text)) => {
                let parsed = N::parse_number(text);
                if parsed.is_none() {
                    errors.report(ErrorEntry::not_a_number(text));
                }
                parsed
            }
            _ => None,
        })
    }
}

impl<N: BindNumber> NewSerializer<N> for NumberSerializer<N> {
    #[inline]
    fn new_serializer(_: &SerializerContext) -> Result<Self, Error> {
        Ok(Self::new())
    }
}

// -----------------------------------------------------------------------------
// Text and booleans

/// Binds `bool`. Also reads `"true"`/`"false"` text, ignoring case.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoolSerializer;

impl Bind for bool {
    #[inline]
    fn zero() -> Option<Self> {
        Some(false)
    }
}

impl Serializer<bool> for BoolSerializer {
    fn serialize(&self, value: &bool, visitor: &mut DataVisitor, _: &mut ErrorContainer) -> Result<(), Error> {
        visitor.write_bool(*value)?;
        Ok(())
    }

    fn deserialize(&self, visitor: &mut DataVisitor, _: &mut ErrorContainer) -> Result<Option<bool>, Error> {
        Ok(match visitor.read_value()? {
            Some(Value::Bool(bool)) => Some(*bool),
            Some(Value::String(text)) if text.eq_ignore_ascii_case("true") => Some(true),
            Some(Value::String(text)) if text.eq_ignore_ascii_case("false") => Some(false),
            _ => None,
        })
    }
}

/// Binds `String`. Numbers and booleans are read as their text.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringSerializer;

impl Bind for String {}

impl Serializer<String> for StringSerializer {
    fn serialize(&self, value: &String, visitor: &mut DataVisitor, _: &mut ErrorContainer) -> Result<(), Error> {
        visitor.write_string(value.as_str())?;
        Ok(())
    }

    fn deserialize(&self, visitor: &mut DataVisitor, _: &mut ErrorContainer) -> Result<Option<String>, Error> {
        Ok(match visitor.read_value()? {
            Some(Value::String(text)) => Some(text.clone()),
            Some(Value::Number(number)) => Some(number.to_string()),
            Some(Value::Bool(bool)) => Some(bool.to_string()),
            _ => None,
        })
    }
}

impl NewSerializer<String> for StringSerializer {
    #[inline]
    fn new_serializer(_: &SerializerContext) -> Result<Self, Error> {
        Ok(Self)
    }
}

/// Binds `char` to a one-character string.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharSerializer;

impl Bind for char {}

impl Serializer<char> for CharSerializer {
    fn serialize(&self, value: &char, visitor: &mut DataVisitor, _: &mut ErrorContainer) -> Result<(), Error> {
        visitor.write_string(value.to_string())?;
        Ok(())
    }

    fn deserialize(&self, visitor: &mut DataVisitor, _: &mut ErrorContainer) -> Result<Option<char>, Error> {
        let Some(text) = visitor.read_string()? else {
            return Ok(None);
        };
        let mut chars = text.chars();
        Ok(match (chars.next(), chars.next()) {
            (Some(ch), None) => Some(ch),
            _ => None,
        })
    }
}

/// Binds `PathBuf` to its text.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathSerializer;

impl Bind for PathBuf {}

impl Serializer<PathBuf> for PathSerializer {
    fn serialize(&self, value: &PathBuf, visitor: &mut DataVisitor, _: &mut ErrorContainer) -> Result<(), Error> {
        visitor.write_string(value.to_string_lossy())?;
        Ok(())
    }

    fn deserialize(&self, visitor: &mut DataVisitor, _: &mut ErrorContainer) -> Result<Option<PathBuf>, Error> {
        Ok(visitor.read_string()?.map(PathBuf::from))
    }
}

/// Binds `SystemTime` to milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSerializer;

impl Bind for SystemTime {}

impl Serializer<SystemTime> for SystemTimeSerializer {
    fn serialize(
        &self,
        value: &SystemTime,
        visitor: &mut DataVisitor,
        _: &mut ErrorContainer,
    ) -> Result<(), Error> {
        let millis = match value.duration_since(UNIX_EPOCH) {
            Ok(after) => after.as_millis() as i128,
            Err(before) => -(before.duration().as_millis() as i128),
        };
        visitor.write_number(millis)?;
        Ok(())
    }

    fn deserialize(
        &self,
        visitor: &mut DataVisitor,
        _: &mut ErrorContainer,
    ) -> Result<Option<SystemTime>, Error> {
        let Some(number) = visitor.read_number()? else {
            return Ok(None);
        };
        let millis = number.clamped().to_i64();
        let offset = Duration::from_millis(millis.unsigned_abs());
        Ok(if millis >= 0 {
            UNIX_EPOCH.checked_add(offset)
        } else {
            UNIX_EPOCH.checked_sub(offset)
        })
    }
}

// -----------------------------------------------------------------------------
// FromStrSerializer

/// Binds any [`FromStr`] + [`Display`](fmt::Display) type to its text.
///
/// Text that fails to parse is reported as `CUSTOM`.
///
/// # Examples
///
/// ```
/// use std::net::Ipv4Addr;
/// use vc_bind::error::{ErrorContainer, ErrorType};
/// use vc_bind::serializer::{FromStrSerializer, deserialize_from_value};
/// use vc_bind::tree::Value;
///
/// let serializer = FromStrSerializer::<Ipv4Addr>::new();
/// let mut errors = ErrorContainer::new();
///
/// let ip = deserialize_from_value::<Ipv4Addr>(Some(&serializer), &Value::from("10.0.0.1"), &mut errors);
/// assert_eq!(ip.unwrap(), Some(Ipv4Addr::new(10, 0, 0, 1)));
///
/// let bad = deserialize_from_value::<Ipv4Addr>(Some(&serializer), &Value::from("10.0"), &mut errors);
/// assert_eq!(bad.unwrap(), None);
/// assert_eq!(errors.entries()[0].ty, ErrorType::Custom);
/// ```
pub struct FromStrSerializer<T>(PhantomData<fn() -> T>);

impl<T> FromStrSerializer<T> {
    #[inline]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for FromStrSerializer<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Typed + FromStr + fmt::Display> Serializer<T> for FromStrSerializer<T> {
    fn serialize(&self, value: &T, visitor: &mut DataVisitor, _: &mut ErrorContainer) -> Result<(), Error> {
        visitor.write_string(value.to_string())?;
        Ok(())
    }

    fn deserialize(&self, visitor: &mut DataVisitor, errors: &mut ErrorContainer) -> Result<Option<T>, Error> {
        let Some(text) = visitor.read_string()? else {
            return Ok(None);
        };
        let parsed = text.trim().parse().ok();
        if parsed.is_none() {
            errors.report(ErrorEntry::custom(format!(
                "Could not parse '{text}' as {}",
                T::type_info().name()
            )));
        }
        Ok(parsed)
    }
}

impl<T: Typed + FromStr + fmt::Display> NewSerializer<T> for FromStrSerializer<T> {
    #[inline]
    fn new_serializer(_: &SerializerContext) -> Result<Self, Error> {
        Ok(Self::new())
    }
}

impl Bind for IpAddr {}
impl Bind for Ipv4Addr {}
impl Bind for Ipv6Addr {}
impl Bind for SocketAddr {}

#[cfg(feature = "uuid")]
impl Bind for uuid::Uuid {}

// -----------------------------------------------------------------------------
// Registration

pub(crate) fn register_defaults(registry: &mut SerializerRegistry) -> Result<(), Error> {
    macro_rules! numbers {
        ($($ty:ty),*) => {
            $( registry.add_serializer::<$ty>(NumberSerializer::<$ty>::new())?; )*
        };
    }

    numbers!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
    numbers!(f32, f64, BigInt, BigDecimal, Number);

    registry.add_serializer::<bool>(BoolSerializer)?;
    registry.add_serializer::<char>(CharSerializer)?;
    registry.add_serializer::<String>(StringSerializer)?;
    registry.add_serializer::<PathBuf>(PathSerializer)?;
    registry.add_serializer::<SystemTime>(SystemTimeSerializer)?;

    registry.add_serializer::<IpAddr>(FromStrSerializer::<IpAddr>::new())?;
    registry.add_serializer::<Ipv4Addr>(FromStrSerializer::<Ipv4Addr>::new())?;
    registry.add_serializer::<Ipv6Addr>(FromStrSerializer::<Ipv6Addr>::new())?;
    registry.add_serializer::<SocketAddr>(FromStrSerializer::<SocketAddr>::new())?;

    #[cfg(feature = "uuid")]
    registry.add_serializer::<uuid::Uuid>(FromStrSerializer::<uuid::Uuid>::new())?;

    Ok(())
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{BoolSerializer, CharSerializer, NumberSerializer, StringSerializer};
    use super::SystemTimeSerializer;
    use crate::error::{ErrorContainer, ErrorType};
    use crate::serializer::{Serializer, deserialize_from_value, serialize_to_value};
    use crate::tree::{Number, Value};
    use alloc::string::String;
    use core::time::Duration;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn read<T: crate::serializer::Bind>(
        serializer: &dyn Serializer<T>,
        value: Value,
        errors: &mut ErrorContainer,
    ) -> Option<T> {
        deserialize_from_value(Some(serializer), &value, errors).unwrap()
    }

    #[test]
    fn numbers_saturate_and_parse_text() {
        let mut errors = ErrorContainer::new();
        let i8s = NumberSerializer::<i8>::new();
        assert!(read::<i8>(&i8s, Value::from(300), &mut errors) == Some(127));
        assert!(read::<i8>(&i8s, Value::from("-300"), &mut errors) == Some(-128));
        assert!(errors.is_clean());

        assert!(read::<i8>(&i8s, Value::from("abc"), &mut errors).is_none());
        assert!(errors.len() == 1);
        assert!(errors.entries()[0].ty == ErrorType::Custom);
        assert!(errors.entries()[0].message == "Could not parse 'abc' as a number");

        assert!(read::<i8>(&i8s, Value::Bool(true), &mut errors).is_none());
        assert!(errors.entries()[1].ty == ErrorType::MismatchedTypes);
    }

    #[test]
    fn floats() {
        let mut errors = ErrorContainer::new();
        let f64s = NumberSerializer::<f64>::new();
        let value = serialize_to_value::<f64>(Some(&f64s), &1.5, &mut errors).unwrap();
        assert!(value == Some(Value::Number(Number::parse("1.5").unwrap())));
        assert!(read::<f64>(&f64s, Value::from(2), &mut errors) == Some(2.0));

        assert!(read::<f64>(&f64s, Value::from("inf"), &mut errors) == Some(f64::INFINITY));
    }

    #[test]
    fn f32_writes_its_shortest_text() {
        let mut errors = ErrorContainer::new();
        let f32s = NumberSerializer::<f32>::new();
        let value = serialize_to_value::<f32>(Some(&f32s), &0.1, &mut errors).unwrap().unwrap();
        assert!(value.to_string() == "0.1");
        assert!(read::<f32>(&f32s, value, &mut errors) == Some(0.1));
        assert!(errors.is_clean());
    }

    #[test]
    fn non_finite_floats_survive_as_text() {
        let mut errors = ErrorContainer::new();
        let f64s = NumberSerializer::<f64>::new();
        let inf = serialize_to_value::<f64>(Some(&f64s), &f64::NEG_INFINITY, &mut errors).unwrap();
        assert!(inf == Some(Value::from("-inf")));
        assert!(read::<f64>(&f64s, inf.unwrap(), &mut errors) == Some(f64::NEG_INFINITY));

        let f32s = NumberSerializer::<f32>::new();
        let nan = serialize_to_value::<f32>(Some(&f32s), &f32::NAN, &mut errors).unwrap().unwrap();
        assert!(nan == Value::from("NaN"));
        assert!(read::<f32>(&f32s, nan, &mut errors).is_some_and(f32::is_nan));
        assert!(errors.is_clean());
    }

    #[test]
    fn lenient_text() {
        let mut errors = ErrorContainer::new();
        assert!(read::<bool>(&BoolSerializer, Value::from("TRUE"), &mut errors) == Some(true));
        assert!(read::<String>(&StringSerializer, Value::from(12), &mut errors) == Some(String::from("12")));
        assert!(read::<char>(&CharSerializer, Value::from("x"), &mut errors) == Some('x'));
        assert!(errors.is_clean());
        assert!(read::<char>(&CharSerializer, Value::from("xy"), &mut errors).is_none());
        assert!(errors.entries()[0].message == "Could not deserialize (string) 'xy' as char");
    }

    #[test]
    fn system_time_uses_epoch_millis() {
        let mut errors = ErrorContainer::new();
        let time = UNIX_EPOCH + Duration::from_millis(1_500);
        let value = serialize_to_value::<SystemTime>(Some(&SystemTimeSerializer), &time, &mut errors).unwrap();
        assert!(value == Some(Value::from(1_500)));

        let before: Option<SystemTime> = read::<SystemTime>(&SystemTimeSerializer, Value::from(-20), &mut errors);
        assert!(before == UNIX_EPOCH.checked_sub(Duration::from_millis(20)));
    }
}
