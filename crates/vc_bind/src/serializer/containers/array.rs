use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::marker::PhantomData;

use super::{check_type_argument, read_elements, write_elements};
use crate::error::{Error, ErrorContainer, ErrorEntry};
use crate::info::Typed;
use crate::serializer::{Bind, NewSerializer, Serializer, SerializerContext};
use crate::tree::{DataVisitor, Value};

/// Storage of an array type: a boxed slice or a fixed-size array.
pub trait ArrayStorage<T>: AsRef<[T]> + Sized {
    /// Returns `None` if `elements` has the wrong length.
    fn from_elements(elements: Vec<T>) -> Option<Self>;
}

impl<T> ArrayStorage<T> for Box<[T]> {
    #[inline]
    fn from_elements(elements: Vec<T>) -> Option<Self> {
        Some(elements.into_boxed_slice())
    }
}

impl<T, const N: usize> ArrayStorage<T> for [T; N] {
    #[inline]
    fn from_elements(elements: Vec<T>) -> Option<Self> {
        elements.try_into().ok()
    }
}

/// Binds `Box<[T]>` and `[T; N]` to an array primitive.
///
/// A fixed-size array whose input yields a different number of elements
/// is reported as `MISMATCHED_TYPES`.
pub struct ArraySerializer<A, T> {
    element: Option<Arc<dyn Serializer<T>>>,
    _marker: PhantomData<fn() -> A>,
}

impl<A, T: Bind> ArraySerializer<A, T> {
    pub fn new(ctx: &SerializerContext) -> Result<Self, Error> {
        check_type_argument(T::type_info())?;
        Ok(Self {
            element: ctx.serializer::<T>()?,
            _marker: PhantomData,
        })
    }
}

impl<A, T> Serializer<A> for ArraySerializer<A, T>
where
    A: ArrayStorage<T> + Typed,
    T: Bind,
{
    fn serialize(
        &self,
        value: &A,
        visitor: &mut DataVisitor,
        errors: &mut ErrorContainer,
    ) -> Result<(), Error> {
        let array = write_elements(self.element.as_deref(), value.as_ref().iter(), errors)?;
        visitor.write_array(array)?;
        Ok(())
    }

    fn deserialize(
        &self,
        visitor: &mut DataVisitor,
        errors: &mut ErrorContainer,
    ) -> Result<Option<A>, Error> {
        let Some(items) = read_elements(self.element.as_deref(), visitor, errors)? else {
            return Ok(None);
        };
        let array = A::from_elements(items);
        if array.is_none() {
            let found = Value::Array(visitor.read_array()?.unwrap_or_default().to_vec());
            errors.report(ErrorEntry::mismatched(&found, A::type_info().name()));
        }
        Ok(array)
    }
}

impl<A, T> NewSerializer<A> for ArraySerializer<A, T>
where
    A: ArrayStorage<T> + Typed,
    T: Bind,
{
    #[inline]
    fn new_serializer(ctx: &SerializerContext) -> Result<Self, Error> {
        Self::new(ctx)
    }
}

impl<T: Bind> Bind for Box<[T]> {
    fn synthesize(ctx: &SerializerContext) -> Result<Option<Arc<dyn Serializer<Self>>>, Error> {
        let serializer: Arc<dyn Serializer<Self>> = Arc::new(ArraySerializer::<Self, T>::new(ctx)?);
        Ok(Some(serializer))
    }
}

impl<T: Bind, const N: usize> Bind for [T; N] {
    fn synthesize(ctx: &SerializerContext) -> Result<Option<Arc<dyn Serializer<Self>>>, Error> {
        let serializer: Arc<dyn Serializer<Self>> = Arc::new(ArraySerializer::<Self, T>::new(ctx)?);
        Ok(Some(serializer))
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use crate::error::{ErrorContainer, ErrorType};
    use crate::serializer::{SerializerContext, deserialize_from_value, serialize_to_value};
    use crate::tree::Value;
    use alloc::boxed::Box;
    use alloc::vec;

    #[test]
    fn boxed_slices_take_any_length() {
        let ctx = SerializerContext::default();
        let mut errors = ErrorContainer::new();
        let serializer = ctx.serializer::<Box<[u8]>>().unwrap();

        let value = Value::Array(vec![Value::from(1), Value::from(2)]);
        let back = deserialize_from_value(serializer.as_deref(), &value, &mut errors).unwrap();
        assert!(back.as_deref() == Some(&[1u8, 2][..]));
    }

    #[test]
    fn fixed_arrays_check_their_length() {
        let ctx = SerializerContext::default();
        let mut errors = ErrorContainer::new();
        let serializer = ctx.serializer::<[i32; 3]>().unwrap();

        let value = serialize_to_value(serializer.as_deref(), &[4, 5, 6], &mut errors).unwrap().unwrap();
        let back = deserialize_from_value(serializer.as_deref(), &value, &mut errors).unwrap();
        assert!(back == Some([4, 5, 6]));

        let short = Value::Array(vec![Value::from(1)]);
        let back = deserialize_from_value(serializer.as_deref(), &short, &mut errors).unwrap();
        assert!(back.is_none());
        assert!(errors.len() == 1);
        assert!(errors.entries()[0].ty == ErrorType::MismatchedTypes);
        assert!(errors.entries()[0].message == "Could not deserialize (array) '[1]' as [i32; 3]");
    }
}
