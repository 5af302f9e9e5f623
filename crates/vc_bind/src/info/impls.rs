use alloc::boxed::Box;
use alloc::collections::{BTreeMap, BTreeSet, LinkedList, VecDeque};
use alloc::string::String;
use alloc::vec::Vec;
use core::any::Any;
use core::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::time::SystemTime;

use bigdecimal::BigDecimal;
use num_bigint::BigInt;

use crate::info::{CollectionKind, GenericTypeInfoCell, NonGenericTypeInfoCell};
use crate::info::{TypeInfo, TypeKind, Typed};
use crate::tree::{Map, Number, Value};

macro_rules! impl_typed {
    ($kind:expr => $($ty:ty),* $(,)?) => {
        $(
            impl Typed for $ty {
                fn type_info() -> &'static TypeInfo {
                    static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
                    CELL.get_or_init(|| TypeInfo::new::<Self>($kind))
                }
            }
        )*
    };
}

impl_typed!(TypeKind::Opaque =>
    bool, char,
    i8, i16, i32, i64, i128, isize,
    u8, u16, u32, u64, u128, usize,
    f32, f64,
    BigInt, BigDecimal, Number,
    PathBuf, SystemTime,
    IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr,
);

#[cfg(feature = "uuid")]
impl_typed!(TypeKind::Opaque => uuid::Uuid);

impl_typed!(TypeKind::String => String);

impl_typed!(TypeKind::Dynamic => Value, Map);

impl_typed!(TypeKind::Erased => Box<dyn Any + Send + Sync>);

impl<T: Typed> Typed for Option<T> {
    fn type_info() -> &'static TypeInfo {
        static CELL: GenericTypeInfoCell = GenericTypeInfoCell::new();
        CELL.get_or_insert::<Self>(|| TypeInfo::new::<Self>(TypeKind::Option(T::type_info)))
    }
}

macro_rules! impl_typed_collection {
    ($kind:ident => $($ty:ident<T $(, $extra:ident)*>),* $(,)?) => {
        $(
            impl<T: Typed $(, $extra: 'static)*> Typed for $ty<T $(, $extra)*> {
                fn type_info() -> &'static TypeInfo {
                    static CELL: GenericTypeInfoCell = GenericTypeInfoCell::new();
                    CELL.get_or_insert::<Self>(|| {
                        TypeInfo::new::<Self>(TypeKind::Collection {
                            element: T::type_info,
                            kind: CollectionKind::$kind,
                        })
                    })
                }
            }
        )*
    };
}

impl_typed_collection!(List => Vec<T>, VecDeque<T>, LinkedList<T>);
impl_typed_collection!(Set => HashSet<T, S>, BTreeSet<T>);

impl<T: Typed> Typed for Box<[T]> {
    fn type_info() -> &'static TypeInfo {
        static CELL: GenericTypeInfoCell = GenericTypeInfoCell::new();
        CELL.get_or_insert::<Self>(|| {
            TypeInfo::new::<Self>(TypeKind::Array {
                element: T::type_info,
                len: None,
            })
        })
    }
}

impl<T: Typed, const N: usize> Typed for [T; N] {
    fn type_info() -> &'static TypeInfo {
        static CELL: GenericTypeInfoCell = GenericTypeInfoCell::new();
        CELL.get_or_insert::<Self>(|| {
            TypeInfo::new::<Self>(TypeKind::Array {
                element: T::type_info,
                len: Some(N),
            })
        })
    }
}

impl<K: Typed, V: Typed, S: 'static> Typed for HashMap<K, V, S> {
    fn type_info() -> &'static TypeInfo {
        static CELL: GenericTypeInfoCell = GenericTypeInfoCell::new();
        CELL.get_or_insert::<Self>(|| {
            TypeInfo::new::<Self>(TypeKind::Map {
                key: K::type_info,
                value: V::type_info,
            })
        })
    }
}

impl<K: Typed, V: Typed> Typed for BTreeMap<K, V> {
    fn type_info() -> &'static TypeInfo {
        static CELL: GenericTypeInfoCell = GenericTypeInfoCell::new();
        CELL.get_or_insert::<Self>(|| {
            TypeInfo::new::<Self>(TypeKind::Map {
                key: K::type_info,
                value: V::type_info,
            })
        })
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use crate::info::{CollectionKind, TypeKind, Typed};
    use alloc::collections::BTreeSet;
    use alloc::string::String;
    use alloc::vec::Vec;
    use std::collections::HashMap;

    #[test]
    fn generic_cells_are_per_type() {
        let a = <Vec<u8>>::type_info();
        let b = <Vec<u16>>::type_info();
        assert!(a.is::<Vec<u8>>());
        assert!(b.is::<Vec<u16>>());
        assert!(core::ptr::eq(a, <Vec<u8>>::type_info()));
    }

    #[test]
    fn kinds() {
        assert!(matches!(String::type_info().kind(), TypeKind::String));
        assert!(matches!(
            <BTreeSet<i32>>::type_info().kind(),
            TypeKind::Collection { kind: CollectionKind::Set, .. }
        ));
        assert!(matches!(<[u8; 3]>::type_info().kind(), TypeKind::Array { len: Some(3), .. }));

        let TypeKind::Map { key, value } = <HashMap<String, Vec<i64>>>::type_info().kind() else {
            panic!("expected a map");
        };
        assert!(key().is::<String>());
        assert!(value().name() == "Vec<i64>");
    }
}
