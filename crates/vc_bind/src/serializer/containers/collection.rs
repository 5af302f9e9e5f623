use alloc::collections::{BTreeSet, LinkedList, VecDeque};
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::hash::{BuildHasher, Hash};
use core::marker::PhantomData;
use std::collections::HashSet;

use super::{check_type_argument, read_elements, write_elements};
use crate::error::{Error, ErrorContainer};
use crate::serializer::{Bind, NewSerializer, Serializer, SerializerContext};
use crate::tree::DataVisitor;

/// Binds a sequence or a set of `T` to an array primitive.
///
/// Serves `Vec`, `VecDeque`, `LinkedList`, `HashSet` and `BTreeSet`.
/// Reading into a set drops duplicates.
pub struct CollectionSerializer<C, T> {
    element: Option<Arc<dyn Serializer<T>>>,
    _marker: PhantomData<fn() -> C>,
}

impl<C, T: Bind> CollectionSerializer<C, T> {
    /// Resolves the element serializer.
    ///
    /// Fails if `T` cannot be used as a type argument.
    pub fn new(ctx: &SerializerContext) -> Result<Self, Error> {
        check_type_argument(T::type_info())?;
        Ok(Self {
            element: ctx.serializer::<T>()?,
            _marker: PhantomData,
        })
    }
}

impl<C, T> Serializer<C> for CollectionSerializer<C, T>
where
    C: FromIterator<T> + 'static,
    for<'a> &'a C: IntoIterator<Item = &'a T>,
    T: Bind,
{
    fn serialize(
        &self,
        value: &C,
        visitor: &mut DataVisitor,
        errors: &mut ErrorContainer,
    ) -> Result<(), Error> {
        let array = write_elements(self.element.as_deref(), value.into_iter(), errors)?;
        visitor.write_array(array)?;
        Ok(())
    }

    fn deserialize(
        &self,
        visitor: &mut DataVisitor,
        errors: &mut ErrorContainer,
    ) -> Result<Option<C>, Error> {
        let items = read_elements(self.element.as_deref(), visitor, errors)?;
        Ok(items.map(|items| items.into_iter().collect()))
    }
}

impl<C, T> NewSerializer<C> for CollectionSerializer<C, T>
where
    C: FromIterator<T> + 'static,
    for<'a> &'a C: IntoIterator<Item = &'a T>,
    T: Bind,
{
    #[inline]
    fn new_serializer(ctx: &SerializerContext) -> Result<Self, Error> {
        Self::new(ctx)
    }
}

fn synthesize<C, T>(ctx: &SerializerContext) -> Result<Option<Arc<dyn Serializer<C>>>, Error>
where
    C: FromIterator<T> + 'static,
    for<'a> &'a C: IntoIterator<Item = &'a T>,
    T: Bind,
{
    let serializer: Arc<dyn Serializer<C>> = Arc::new(CollectionSerializer::<C, T>::new(ctx)?);
    Ok(Some(serializer))
}

impl<T: Bind> Bind for Vec<T> {
    #[inline]
    fn synthesize(ctx: &SerializerContext) -> Result<Option<Arc<dyn Serializer<Self>>>, Error> {
        synthesize::<Self, T>(ctx)
    }
}

impl<T: Bind> Bind for VecDeque<T> {
    #[inline]
    fn synthesize(ctx: &SerializerContext) -> Result<Option<Arc<dyn Serializer<Self>>>, Error> {
        synthesize::<Self, T>(ctx)
    }
}

impl<T: Bind> Bind for LinkedList<T> {
    #[inline]
    fn synthesize(ctx: &SerializerContext) -> Result<Option<Arc<dyn Serializer<Self>>>, Error> {
        synthesize::<Self, T>(ctx)
    }
}

impl<T: Bind + Ord> Bind for BTreeSet<T> {
    #[inline]
    fn synthesize(ctx: &SerializerContext) -> Result<Option<Arc<dyn Serializer<Self>>>, Error> {
        synthesize::<Self, T>(ctx)
    }
}

impl<T, S> Bind for HashSet<T, S>
where
    T: Bind + Eq + Hash,
    S: BuildHasher + Default + 'static,
{
    #[inline]
    fn synthesize(ctx: &SerializerContext) -> Result<Option<Arc<dyn Serializer<Self>>>, Error> {
        synthesize::<Self, T>(ctx)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::CollectionSerializer;
    use crate::error::{Error, ErrorContainer, ErrorType};
    use crate::serializer::{SerializerContext, deserialize_from_value, serialize_to_value};
    use crate::tree::Value;
    use alloc::boxed::Box;
    use alloc::collections::BTreeSet;
    use alloc::vec;
    use alloc::vec::Vec;
    use core::any::Any;

    #[test]
    fn list_keeps_order_and_set_collects() {
        let ctx = SerializerContext::default();
        let mut errors = ErrorContainer::new();

        let list = ctx.serializer::<Vec<i32>>().unwrap();
        let value = serialize_to_value(list.as_deref(), &vec![1, 2, 3], &mut errors).unwrap();
        assert!(value == Some(Value::Array(vec![Value::from(1), Value::from(2), Value::from(3)])));

        let set = ctx.serializer::<BTreeSet<i32>>().unwrap();
        let back = deserialize_from_value(set.as_deref(), &value.unwrap(), &mut errors).unwrap();
        assert!(back == Some(BTreeSet::from([1, 2, 3])));
        assert!(errors.is_clean());
    }

    #[test]
    fn bad_elements_are_dropped_and_reported() {
        let ctx = SerializerContext::default();
        let mut errors = ErrorContainer::new();

        let list = ctx.serializer::<Vec<bool>>().unwrap();
        let array = Value::Array(vec![Value::Bool(true), Value::from(7), Value::Null, Value::Bool(false)]);
        let back = deserialize_from_value(list.as_deref(), &array, &mut errors).unwrap();
        assert!(back == Some(vec![true, false]));
        assert!(errors.len() == 1);
        assert!(errors.entries()[0].ty == ErrorType::MismatchedTypes);
        assert!(errors.entries()[0].message == "Could not deserialize (number) '7' as bool");
    }

    #[test]
    fn non_array_is_a_mismatch() {
        let ctx = SerializerContext::default();
        let mut errors = ErrorContainer::new();
        let list = ctx.serializer::<Vec<i32>>().unwrap();
        let back = deserialize_from_value(list.as_deref(), &Value::from("1,2"), &mut errors).unwrap();
        assert!(back.is_none());
        assert!(errors.entries()[0].message == "Could not deserialize (string) '1,2' as Vec<i32>");
    }

    #[test]
    fn erased_type_arguments_are_rejected() {
        let ctx = SerializerContext::default();
        let result = CollectionSerializer::<Vec<Box<dyn Any + Send + Sync>>, Box<dyn Any + Send + Sync>>::new(&ctx);
        assert!(matches!(result, Err(Error::UnsupportedTypeArgument(_))));
    }
}
