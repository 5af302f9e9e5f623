use alloc::collections::BTreeMap;
use alloc::sync::Arc;
use core::hash::{BuildHasher, Hash};
use core::marker::PhantomData;
use std::collections::HashMap;

use super::check_type_argument;
use crate::error::{Error, ErrorContainer, ErrorEntry};
use crate::hash::HashSet;
use crate::info::TypeKind;
use crate::serializer::{Bind, NewSerializer, Serializer, SerializerContext};
use crate::serializer::{deserialize_from_value, serialize_to_value};
use crate::tree::{DataVisitor, Map, Value};

/// Binds a map of `K` to `V` to a map primitive.
///
/// Keys must be strings or [`ConfigEnum`](crate::serializer::ConfigEnum)s.
/// String keys are kept as they are; enum keys are written in lower case
/// and read ignoring case. Enum keys that only differ in case are reported
/// as duplicates, and the first one wins.
pub struct MapSerializer<M, K, V> {
    key: Option<Arc<dyn Serializer<K>>>,
    value: Option<Arc<dyn Serializer<V>>>,
    _marker: PhantomData<fn() -> M>,
}

impl<M, K: Bind, V: Bind> MapSerializer<M, K, V> {
    /// Resolves the key and value serializers.
    ///
    /// Fails if `K` is neither a string nor an enum, or if `V` cannot be
    /// used as a type argument.
    pub fn new(ctx: &SerializerContext) -> Result<Self, Error> {
        let key = K::type_info();
        if !matches!(key.kind(), TypeKind::String | TypeKind::Enum(_)) {
            return Err(Error::UnsupportedMapKey(key.path()));
        }
        check_type_argument(V::type_info())?;
        Ok(Self {
            key: ctx.serializer::<K>()?,
            value: ctx.serializer::<V>()?,
            _marker: PhantomData,
        })
    }
}

impl<M, K, V> Serializer<M> for MapSerializer<M, K, V>
where
    M: FromIterator<(K, V)> + 'static,
    for<'a> &'a M: IntoIterator<Item = (&'a K, &'a V)>,
    K: Bind,
    V: Bind,
{
    fn serialize(
        &self,
        value: &M,
        visitor: &mut DataVisitor,
        errors: &mut ErrorContainer,
    ) -> Result<(), Error> {
        let mut map = Map::new();
        for (key, value) in value {
            let Some(Value::String(key)) = serialize_to_value(self.key.as_deref(), key, errors)? else {
                errors.report(ErrorEntry::cannot_serialize(K::type_info().name()));
                continue;
            };
            match serialize_to_value(self.value.as_deref(), value, errors)? {
                Some(value) => {
                    map.insert(key, value);
                }
                None => errors.report(ErrorEntry::cannot_serialize(V::type_info().name())),
            }
        }
        visitor.write_map(map)?;
        Ok(())
    }

    fn deserialize(
        &self,
        visitor: &mut DataVisitor,
        errors: &mut ErrorContainer,
    ) -> Result<Option<M>, Error> {
        let Some(map) = visitor.read_map()? else {
            return Ok(None);
        };
        let folds_case = matches!(K::type_info().kind(), TypeKind::Enum(_));
        let mut seen = HashSet::default();
        let mut entries = alloc::vec::Vec::with_capacity(map.len());
        for (key, value) in map.iter() {
            if folds_case && !seen.insert(key.to_lowercase()) {
                errors.report(ErrorEntry::duplicate_key(key));
                continue;
            }
            let key = deserialize_from_value(self.key.as_deref(), &Value::from(key), errors)?;
            let value = deserialize_from_value(self.value.as_deref(), value, errors)?;
            if let (Some(key), Some(value)) = (key, value) {
                entries.push((key, value));
            }
        }
        Ok(Some(entries.into_iter().collect()))
    }
}

impl<M, K, V> NewSerializer<M> for MapSerializer<M, K, V>
where
    M: FromIterator<(K, V)> + 'static,
    for<'a> &'a M: IntoIterator<Item = (&'a K, &'a V)>,
    K: Bind,
    V: Bind,
{
    #[inline]
    fn new_serializer(ctx: &SerializerContext) -> Result<Self, Error> {
        Self::new(ctx)
    }
}

impl<K, V, S> Bind for HashMap<K, V, S>
where
    K: Bind + Eq + Hash,
    V: Bind,
    S: BuildHasher + Default + 'static,
{
    fn synthesize(ctx: &SerializerContext) -> Result<Option<Arc<dyn Serializer<Self>>>, Error> {
        let serializer: Arc<dyn Serializer<Self>> = Arc::new(MapSerializer::<Self, K, V>::new(ctx)?);
        Ok(Some(serializer))
    }
}

impl<K: Bind + Ord, V: Bind> Bind for BTreeMap<K, V> {
    fn synthesize(ctx: &SerializerContext) -> Result<Option<Arc<dyn Serializer<Self>>>, Error> {
        let serializer: Arc<dyn Serializer<Self>> = Arc::new(MapSerializer::<Self, K, V>::new(ctx)?);
        Ok(Some(serializer))
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use crate::derive::ConfigEnum;
    use crate::error::{Error, ErrorContainer, ErrorType};
    use crate::serializer::{SerializerContext, deserialize_from_value, serialize_to_value};
    use crate::tree::{Map, Value};
    use alloc::collections::BTreeMap;
    use alloc::string::String;
    use alloc::vec::Vec;
    use std::collections::HashMap;

    #[test]
    fn string_keys_round_trip() {
        let ctx = SerializerContext::default();
        let mut errors = ErrorContainer::new();
        let serializer = ctx.serializer::<BTreeMap<String, Vec<u16>>>().unwrap();

        let mut value = BTreeMap::new();
        value.insert(String::from("Ports"), alloc::vec![80, 443]);
        let primitive = serialize_to_value(serializer.as_deref(), &value, &mut errors).unwrap().unwrap();
        assert!(primitive.as_map().unwrap().contains_key("Ports"));

        let back = deserialize_from_value(serializer.as_deref(), &primitive, &mut errors).unwrap();
        assert!(back == Some(value));
        assert!(errors.is_clean());
    }

    #[test]
    fn bad_values_are_dropped() {
        let ctx = SerializerContext::default();
        let mut errors = ErrorContainer::new();
        let serializer = ctx.serializer::<HashMap<String, i32>>().unwrap();

        let map: Map = [("a", Value::from(1)), ("b", Value::Bool(true))].into_iter().collect();
        let back = deserialize_from_value(serializer.as_deref(), &Value::Map(map), &mut errors).unwrap();
        let back = back.unwrap();
        assert!(back.len() == 1 && back["a"] == 1);
        assert!(errors.len() == 1);
    }

    #[derive(ConfigEnum, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
    enum Status {
        OnHold,
        Done,
    }

    #[test]
    fn enum_keys_that_fold_together_are_reported() {
        let ctx = SerializerContext::default();
        let mut errors = ErrorContainer::new();
        let serializer = ctx.serializer::<BTreeMap<Status, u8>>().unwrap();

        let map: Map = [("ON_HOLD", Value::from(1)), ("on_hold", Value::from(2)), ("done", Value::from(3))]
            .into_iter()
            .collect();
        let back = deserialize_from_value(serializer.as_deref(), &Value::Map(map), &mut errors).unwrap();
        let back = back.unwrap();
        assert!(back.len() == 2);
        assert!(back[&Status::OnHold] == 1);
        assert!(back[&Status::Done] == 3);

        assert!(errors.len() == 1);
        assert!(errors.entries()[0].ty == ErrorType::UnexpectedKey);
        assert!(errors.entries()[0].message == "Duplicate key 'on_hold' was found");
    }

    #[test]
    fn unsupported_key_types_are_rejected() {
        let ctx = SerializerContext::default();
        let err = ctx.serializer::<HashMap<i32, String>>().err().unwrap();
        assert!(matches!(err, Error::UnsupportedMapKey(_)));
    }
}
