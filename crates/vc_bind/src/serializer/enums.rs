use alloc::string::String;
use core::marker::PhantomData;

use crate::error::{Error, ErrorContainer, ErrorEntry};
use crate::serializer::{Bind, NewSerializer, Serializer, SerializerContext};
use crate::tree::DataVisitor;

/// A unit-only enum bound by the names of its variants.
///
/// Usually derived with [`ConfigEnum`](crate::derive::ConfigEnum). Variant
/// names are the SCREAMING_SNAKE_CASE form of the identifiers unless
/// renamed with `#[config(rename = "...")]`.
///
/// # Examples
///
/// ```
/// use vc_bind::derive::ConfigEnum;
/// use vc_bind::serializer::ConfigEnum;
///
/// #[derive(Debug, Clone, Copy, PartialEq, ConfigEnum)]
/// enum Level {
///     Low,
///     InProgress,
///     #[config(rename = "MAXIMUM")]
///     High,
/// }
///
/// assert_eq!(Level::InProgress.variant_name(), "IN_PROGRESS");
/// assert_eq!(Level::from_variant_name("MAXIMUM"), Some(Level::High));
/// assert_eq!(Level::from_variant_name("maximum"), None);
/// ```
pub trait ConfigEnum: Bind {
    /// The exact name of this variant.
    fn variant_name(&self) -> &'static str;

    /// The variant with the exact name `name`.
    fn from_variant_name(name: &str) -> Option<Self>;
}

/// Binds a [`ConfigEnum`] to a string.
///
/// Writes the variant name in lower case; reads it ignoring case. An
/// unknown name is reported as `CUSTOM`.
pub struct EnumSerializer<E>(PhantomData<fn() -> E>);

impl<E> EnumSerializer<E> {
    #[inline]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<E> Default for EnumSerializer<E> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<E: ConfigEnum> EnumSerializer<E> {
    /// Finds the variant named `text`, ignoring case.
    pub fn parse(text: &str) -> Option<E> {
        let info = E::type_info().as_enum()?;
        let name = info
            .variants()
            .iter()
            .find(|name| name.eq_ignore_ascii_case(text.trim()))?;
        E::from_variant_name(name)
    }
}

impl<E: ConfigEnum> Serializer<E> for EnumSerializer<E> {
    fn serialize(&self, value: &E, visitor: &mut DataVisitor, _: &mut ErrorContainer) -> Result<(), Error> {
        let name: String = value.variant_name().to_ascii_lowercase();
        visitor.write_string(name)?;
        Ok(())
    }

    fn deserialize(&self, visitor: &mut DataVisitor, errors: &mut ErrorContainer) -> Result<Option<E>, Error> {
        let Some(text) = visitor.read_string()? else {
            return Ok(None);
        };
        let value = Self::parse(text);
        if value.is_none() {
            errors.report(ErrorEntry::no_enum_constant(E::type_info().name(), text));
        }
        Ok(value)
    }
}

impl<E: ConfigEnum> NewSerializer<E> for EnumSerializer<E> {
    #[inline]
    fn new_serializer(_: &SerializerContext) -> Result<Self, Error> {
        Ok(Self::new())
    }
}

// -----------------------------------------------------------------------------
// Tests
