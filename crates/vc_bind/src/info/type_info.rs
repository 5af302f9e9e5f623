use alloc::boxed::Box;
use alloc::string::String;
use core::any::{Any, TypeId};
use core::fmt;

// -----------------------------------------------------------------------------
// TypeKind

/// The shape of a type, as far as binding is concerned.
///
/// Nested descriptors are referenced through accessor functions so that
/// descriptors of recursive types can be built lazily.
#[derive(Clone)]
pub enum TypeKind {
    /// A scalar value, bound by a registered serializer.
    Opaque,
    /// A string type. Valid as a map key.
    String,
    /// A primitive tree value, passed through unchanged.
    Dynamic,
    /// `Option<T>`.
    Option(fn() -> &'static TypeInfo),
    /// A unit-only enum, bound by its variant names. Valid as a map key.
    Enum(EnumInfo),
    /// A boxed slice, or a fixed-size array when `len` is set.
    Array {
        element: fn() -> &'static TypeInfo,
        len: Option<usize>,
    },
    /// A sequence or a set.
    Collection {
        element: fn() -> &'static TypeInfo,
        kind: CollectionKind,
    },
    Map {
        key: fn() -> &'static TypeInfo,
        value: fn() -> &'static TypeInfo,
    },
    /// A structured type with a schema.
    Struct(StructInfo),
    /// A type-erased value whose concrete type is unknown, such as
    /// `Box<dyn Any + Send + Sync>`.
    ///
    /// Containers reject it as a type argument.
    Erased,
}

impl TypeKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Opaque => "Opaque",
            Self::String => "String",
            Self::Dynamic => "Dynamic",
            Self::Option(_) => "Option",
            Self::Enum(_) => "Enum",
            Self::Array { .. } => "Array",
            Self::Collection { .. } => "Collection",
            Self::Map { .. } => "Map",
            Self::Struct(_) => "Struct",
            Self::Erased => "Erased",
        }
    }
}

impl fmt::Debug for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Option(inner) => write!(f, "Option({})", inner().path()),
            Self::Enum(info) => f.debug_tuple("Enum").field(info).finish(),
            Self::Array { element, len } => f
                .debug_struct("Array")
                .field("element", &element().path())
                .field("len", len)
                .finish(),
            Self::Collection { element, kind } => f
                .debug_struct("Collection")
                .field("element", &element().path())
                .field("kind", kind)
                .finish(),
            Self::Map { key, value } => f
                .debug_struct("Map")
                .field("key", &key().path())
                .field("value", &value().path())
                .finish(),
            Self::Struct(info) => f.debug_tuple("Struct").field(info).finish(),
            _ => f.write_str(self.as_str()),
        }
    }
}

/// The element semantics of a [`TypeKind::Collection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    /// Ordered, duplicates kept.
    List,
    /// Unique elements.
    Set,
}

/// Descriptor of a unit-only enum.
#[derive(Debug, Clone, Copy)]
pub struct EnumInfo {
    variants: &'static [&'static str],
}

impl EnumInfo {
    /// `variants` are the constant names, in declaration order.
    #[inline]
    pub const fn new(variants: &'static [&'static str]) -> Self {
        Self { variants }
    }

    #[inline]
    pub const fn variants(&self) -> &'static [&'static str] {
        self.variants
    }
}

/// Descriptor of a structured type.
#[derive(Clone, Copy)]
pub struct StructInfo {
    record: bool,
    fields: &'static [&'static str],
    default: Option<fn() -> Box<dyn Any>>,
}

impl StructInfo {
    /// `fields` are the member names, in declaration order.
    #[inline]
    pub const fn new(fields: &'static [&'static str]) -> Self {
        Self {
            record: false,
            fields,
            default: None,
        }
    }

    /// Marks the type as record-like: it is built from all of its
    /// components at once instead of being assigned member by member.
    #[inline]
    pub const fn with_record(mut self, record: bool) -> Self {
        self.record = record;
        self
    }

    /// Sets the constructor of the type's default instance.
    #[inline]
    pub const fn with_default(mut self, default: fn() -> Box<dyn Any>) -> Self {
        self.default = Some(default);
        self
    }

    #[inline]
    pub const fn is_record(&self) -> bool {
        self.record
    }

    #[inline]
    pub const fn fields(&self) -> &'static [&'static str] {
        self.fields
    }

    /// Creates a default instance, if the type has one.
    #[inline]
    pub fn default_instance(&self) -> Option<Box<dyn Any>> {
        self.default.map(|default| default())
    }
}

impl fmt::Debug for StructInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructInfo")
            .field("record", &self.record)
            .field("fields", &self.fields)
            .field("default", &self.default.is_some())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// TypeInfo

/// Compile-time information about a bindable type.
///
/// Obtained through [`Typed::type_info`](crate::info::Typed::type_info).
///
/// - **id**: the [`TypeId`].
/// - **path**: the full [`type_name`](core::any::type_name).
/// - **name**: the path with every module prefix removed, used in messages.
/// - **kind**: the [`TypeKind`].
pub struct TypeInfo {
    id: TypeId,
    path: &'static str,
    name: Box<str>,
    kind: TypeKind,
}

impl TypeInfo {
    /// Creates the descriptor of `T`.
    pub fn new<T: Any + ?Sized>(kind: TypeKind) -> Self {
        let path = core::any::type_name::<T>();
        Self {
            id: TypeId::of::<T>(),
            path,
            name: short_type_name(path),
            kind,
        }
    }

    #[inline]
    pub fn id(&self) -> TypeId {
        self.id
    }

    #[inline]
    pub fn path(&self) -> &'static str {
        self.path
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    /// Returns `true` if this describes `T`.
    #[inline]
    pub fn is<T: Any + ?Sized>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }

    #[inline]
    pub fn as_struct(&self) -> Option<&StructInfo> {
        match &self.kind {
            TypeKind::Struct(info) => Some(info),
            _ => None,
        }
    }

    #[inline]
    pub fn as_enum(&self) -> Option<&EnumInfo> {
        match &self.kind {
            TypeKind::Enum(info) => Some(info),
            _ => None,
        }
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeInfo")
            .field("path", &self.path)
            .field("kind", &self.kind)
            .finish()
    }
}

impl fmt::Display for TypeInfo {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.name)
    }
}

/// Strips module paths from every path segment of a type name.
///
/// `alloc::vec::Vec<alloc::string::String>` becomes `Vec<String>`.
fn short_type_name(path: &str) -> Box<str> {
    let mut name = String::with_capacity(path.len());
    let mut segment_start = 0;
    for (index, ch) in path.char_indices() {
        if ch.is_alphanumeric() || ch == '_' || ch == ':' {
            continue;
        }
        push_last_segment(&mut name, &path[segment_start..index]);
        name.push(ch);
        segment_start = index + ch.len_utf8();
    }
    push_last_segment(&mut name, &path[segment_start..]);
    name.into_boxed_str()
}

fn push_last_segment(name: &mut String, segment: &str) {
    name.push_str(segment.rsplit("::").next().unwrap_or(segment));
}

// -----------------------------------------------------------------------------
// Tests
