//! Type serializers and their registry.
//!
//! A [`Serializer<T>`] converts between `T` and the primitive tree, reading
//! and writing at the current position of a [`DataVisitor`]. Serializers are
//! looked up in a [`SerializerRegistry`] by type, and types that need no
//! registration (containers, enums, structured types) synthesize their own
//! through [`Bind::synthesize`].
//!
//! A missing serializer is not an error by itself: the value is then passed
//! through unchanged when the primitive already is of the requested type,
//! see [`Bind::from_primitive`].

// -----------------------------------------------------------------------------
// Modules

mod containers;
mod context;
mod defaults;
mod enums;
mod registry;

// -----------------------------------------------------------------------------
// Exports

pub use containers::{ArraySerializer, CollectionSerializer, MapSerializer, OptionSerializer};
pub use context::SerializerContext;
pub use defaults::{BindNumber, FromStrSerializer, NumberSerializer};
pub use defaults::{BoolSerializer, CharSerializer, PathSerializer};
pub use defaults::{StringSerializer, SystemTimeSerializer};
pub use enums::{ConfigEnum, EnumSerializer};
pub use registry::{SerializerFactory, SerializerRegistry};

#[cfg(feature = "auto_register")]
pub use registry::SerializerRegistration;

// -----------------------------------------------------------------------------
// Serializer

use alloc::sync::Arc;

use crate::error::{Error, ErrorContainer, ErrorEntry};
use crate::info::Typed;
use crate::tree::{DataVisitor, Value};

/// Converts between `T` and the primitive tree.
///
/// Both directions operate at the current position of the visitor: at the
/// root for a standalone value, or at the selected key inside a section.
///
/// `deserialize` returns `Ok(None)` when no value could be produced. A
/// serializer that knows why should record an entry into `errors`; if it
/// records nothing, the caller reports a `MISMATCHED_TYPES` entry.
///
/// # Examples
///
/// ```
/// use vc_bind::error::{Error, ErrorContainer};
/// use vc_bind::serializer::{Serializer, deserialize_from_value, serialize_to_value};
/// use vc_bind::tree::{DataVisitor, Value};
///
/// /// Stores a `bool` as `"yes"`/`"no"`.
/// struct YesNo;
///
/// impl Serializer<bool> for YesNo {
///     fn serialize(&self, value: &bool, visitor: &mut DataVisitor, _: &mut ErrorContainer) -> Result<(), Error> {
///         visitor.write_string(if *value { "yes" } else { "no" })?;
///         Ok(())
///     }
///
///     fn deserialize(&self, visitor: &mut DataVisitor, _: &mut ErrorContainer) -> Result<Option<bool>, Error> {
///         Ok(match visitor.read_string()? {
///             Some("yes") => Some(true),
///             Some("no") => Some(false),
///             _ => None,
///         })
///     }
/// }
///
/// let mut errors = ErrorContainer::new();
/// let value = serialize_to_value::<bool>(Some(&YesNo), &true, &mut errors).unwrap();
/// assert_eq!(value, Some(Value::from("yes")));
///
/// let back = deserialize_from_value::<bool>(Some(&YesNo), &Value::from("maybe"), &mut errors).unwrap();
/// assert_eq!(back, None);
/// assert_eq!(errors.entries()[0].message, "Could not deserialize (string) 'maybe' as bool");
/// ```
pub trait Serializer<T>: Send + Sync + 'static {
    fn serialize(
        &self,
        value: &T,
        visitor: &mut DataVisitor,
        errors: &mut ErrorContainer,
    ) -> Result<(), Error>;

    fn deserialize(
        &self,
        visitor: &mut DataVisitor,
        errors: &mut ErrorContainer,
    ) -> Result<Option<T>, Error>;
}

/// A serializer that can be created from a [`SerializerContext`].
///
/// Required by the per-member overrides `#[config(with = ..)]`,
/// `#[config(write_with = ..)]` and `#[config(read_with = ..)]`.
pub trait NewSerializer<T>: Serializer<T> + Sized {
    fn new_serializer(ctx: &SerializerContext) -> Result<Self, Error>;
}

// -----------------------------------------------------------------------------
// Bind

/// A type that can be bound to the primitive tree.
///
/// Every method has a default, so foreign scalar types only need an empty
/// impl plus a registered serializer.
pub trait Bind: Typed + Sized {
    /// Builds a serializer when the registry has none for this type.
    ///
    /// Only consulted by the registry chain that ends in the default
    /// registry. Containers, enums and structured types use it.
    fn synthesize(ctx: &SerializerContext) -> Result<Option<Arc<dyn Serializer<Self>>>, Error> {
        let _ = ctx;
        Ok(None)
    }

    /// The zero-ish value used when a record is missing this component
    /// and has no default instance to take it from.
    fn zero() -> Option<Self> {
        None
    }

    /// Converts a primitive that already is of this type.
    ///
    /// Used when no serializer is available.
    fn from_primitive(value: &Value) -> Option<Self> {
        let _ = value;
        None
    }

    /// Converts this value into a primitive without a serializer.
    fn to_primitive(&self) -> Option<Value> {
        None
    }
}

impl Bind for Value {
    #[inline]
    fn from_primitive(value: &Value) -> Option<Self> {
        Some(value.clone())
    }

    #[inline]
    fn to_primitive(&self) -> Option<Value> {
        Some(self.clone())
    }
}

impl Bind for crate::tree::Map {
    #[inline]
    fn from_primitive(value: &Value) -> Option<Self> {
        value.as_map().cloned()
    }

    #[inline]
    fn to_primitive(&self) -> Option<Value> {
        Some(Value::Map(self.clone()))
    }
}

impl Bind for alloc::boxed::Box<dyn core::any::Any + Send + Sync> {}

// -----------------------------------------------------------------------------
// Helpers

/// Serializes `value` into a standalone primitive.
///
/// Without a serializer the value is passed through with
/// [`Bind::to_primitive`]. Returns `None` when that fails too.
pub fn serialize_to_value<T: Bind>(
    serializer: Option<&dyn Serializer<T>>,
    value: &T,
    errors: &mut ErrorContainer,
) -> Result<Option<Value>, Error> {
    match serializer {
        Some(serializer) => {
            let mut visitor = DataVisitor::writer();
            serializer.serialize(value, &mut visitor, errors)?;
            Ok(Some(visitor.into_value()))
        }
        None => Ok(value.to_primitive()),
    }
}

/// Deserializes a standalone primitive.
///
/// A null primitive produces no value and no error. Any other primitive
/// that produces no value without an explanation is reported as
/// `MISMATCHED_TYPES`.
pub fn deserialize_from_value<T: Bind>(
    serializer: Option<&dyn Serializer<T>>,
    value: &Value,
    errors: &mut ErrorContainer,
) -> Result<Option<T>, Error> {
    if value.is_null() {
        return Ok(None);
    }
    let mut child = ErrorContainer::new();
    let result = match serializer {
        Some(serializer) => {
            let mut visitor = DataVisitor::reader(value.clone());
            serializer.deserialize(&mut visitor, &mut child)?
        }
        None => T::from_primitive(value),
    };
    if result.is_none() && child.is_clean() {
        child.report(ErrorEntry::mismatched(value, T::type_info().name()));
    }
    errors.merge(child);
    Ok(result)
}

// -----------------------------------------------------------------------------
// Tests
