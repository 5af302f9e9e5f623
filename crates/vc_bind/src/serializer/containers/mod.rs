//! Serializers of parameterized container types.
//!
//! Each container resolves the serializers of its type arguments once, when
//! it is created, and applies them to every element. Elements without a
//! serializer are passed through.

mod array;
mod collection;
mod map;
mod option;

pub use array::ArraySerializer;
pub use collection::CollectionSerializer;
pub use map::MapSerializer;
pub use option::OptionSerializer;

use alloc::vec::Vec;

use crate::error::{Error, ErrorContainer, ErrorEntry};
use crate::info::{TypeInfo, TypeKind};
use crate::serializer::{Bind, Serializer, deserialize_from_value, serialize_to_value};
use crate::tree::{DataVisitor, Value};

/// Rejects type arguments whose concrete type is unknown.
fn check_type_argument(info: &'static TypeInfo) -> Result<(), Error> {
    match info.kind() {
        TypeKind::Erased => Err(Error::UnsupportedTypeArgument(info.path())),
        _ => Ok(()),
    }
}

/// Converts every element, skipping the ones that cannot be serialized.
fn write_elements<'a, T: Bind + 'a>(
    element: Option<&dyn Serializer<T>>,
    items: impl Iterator<Item = &'a T>,
    errors: &mut ErrorContainer,
) -> Result<Vec<Value>, Error> {
    let mut array = Vec::new();
    for item in items {
        match serialize_to_value(element, item, errors)? {
            Some(value) => array.push(value),
            None => errors.report(ErrorEntry::cannot_serialize(T::type_info().name())),
        }
    }
    Ok(array)
}

/// Reads the array at the visitor's position.
///
/// Returns `None` if there is no array. Elements that yield no value are
/// dropped, the reason is recorded into `errors`.
fn read_elements<T: Bind>(
    element: Option<&dyn Serializer<T>>,
    visitor: &DataVisitor,
    errors: &mut ErrorContainer,
) -> Result<Option<Vec<T>>, Error> {
    let Some(array) = visitor.read_array()? else {
        return Ok(None);
    };
    let mut items = Vec::with_capacity(array.len());
    for value in array {
        if let Some(item) = deserialize_from_value(element, value, errors)? {
            items.push(item);
        }
    }
    Ok(Some(items))
}
