use alloc::sync::Arc;

use crate::error::{Error, ErrorContainer, ErrorEntry};
use crate::serializer::{Bind, NewSerializer, Serializer, SerializerContext};
use crate::tree::DataVisitor;

/// Binds `Option<T>`: `None` is written as null.
pub struct OptionSerializer<T> {
    inner: Option<Arc<dyn Serializer<T>>>,
}

impl<T: Bind> OptionSerializer<T> {
    pub fn new(ctx: &SerializerContext) -> Result<Self, Error> {
        Ok(Self {
            inner: ctx.serializer::<T>()?,
        })
    }
}

impl<T: Bind> Serializer<Option<T>> for OptionSerializer<T> {
    fn serialize(
        &self,
        value: &Option<T>,
        visitor: &mut DataVisitor,
        errors: &mut ErrorContainer,
    ) -> Result<(), Error> {
        let Some(value) = value else {
            visitor.write_null()?;
            return Ok(());
        };
        match &self.inner {
            Some(inner) => inner.serialize(value, visitor, errors)?,
            None => match value.to_primitive() {
                Some(primitive) => {
                    visitor.write_value(primitive)?;
                }
                None => {
                    errors.report(ErrorEntry::cannot_serialize(T::type_info().name()));
                    visitor.write_null()?;
                }
            },
        }
        Ok(())
    }

    fn deserialize(
        &self,
        visitor: &mut DataVisitor,
        errors: &mut ErrorContainer,
    ) -> Result<Option<Option<T>>, Error> {
        let value = match &self.inner {
            Some(inner) => inner.deserialize(visitor, errors)?,
            None => visitor.read_value()?.and_then(T::from_primitive),
        };
        Ok(value.map(Some))
    }
}

impl<T: Bind> NewSerializer<Option<T>> for OptionSerializer<T> {
    #[inline]
    fn new_serializer(ctx: &SerializerContext) -> Result<Self, Error> {
        Self::new(ctx)
    }
}

impl<T: Bind> Bind for Option<T> {
    fn synthesize(ctx: &SerializerContext) -> Result<Option<Arc<dyn Serializer<Self>>>, Error> {
        let serializer: Arc<dyn Serializer<Self>> = Arc::new(OptionSerializer::<T>::new(ctx)?);
        Ok(Some(serializer))
    }

    #[inline]
    fn zero() -> Option<Self> {
        Some(None)
    }
}

// -----------------------------------------------------------------------------
// Tests
