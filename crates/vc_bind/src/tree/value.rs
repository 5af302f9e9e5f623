use alloc::borrow::ToOwned;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::tree::Number;

// -----------------------------------------------------------------------------
// Value

/// A format-neutral primitive value.
///
/// `Null` is the representation of an absent value: the cursor reports a
/// `Null` slot as not present, and optional members treat it as missing.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Number(Number),
    String(String),
    Bool(bool),
    Array(Vec<Value>),
    Map(Map),
}

impl Value {
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The name of the value's shape, as used in error messages.
    pub fn shape(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Bool(_) => "boolean",
            Self::Array(_) => "array",
            Self::Map(_) => "map",
        }
    }

    #[inline]
    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Self::Number(number) => Some(number),
            _ => None,
        }
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(string) => Some(string),
            _ => None,
        }
    }

    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(bool) => Some(*bool),
            _ => None,
        }
    }

    #[inline]
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(array) => Some(array),
            _ => None,
        }
    }

    #[inline]
    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    #[inline]
    pub fn as_map_mut(&mut self) -> Option<&mut Map> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }
}

/// Renders strings without quotes, the way error messages quote them.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Number(number) => fmt::Display::fmt(number, f),
            Self::String(string) => f.write_str(string),
            Self::Bool(bool) => fmt::Display::fmt(bool, f),
            Self::Array(array) => {
                f.write_str("[")?;
                for (index, value) in array.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    fmt::Display::fmt(value, f)?;
                }
                f.write_str("]")
            }
            Self::Map(map) => {
                f.write_str("{")?;
                for (index, (key, value)) in map.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}={value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

macro_rules! impl_value_from {
    ($($ty:ty => $variant:ident($conv:expr)),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                #[inline]
                fn from(value: $ty) -> Self {
                    Self::$variant($conv(value))
                }
            }
        )*
    };
}

impl_value_from! {
    Number => Number(core::convert::identity),
    String => String(core::convert::identity),
    &str => String(ToOwned::to_owned),
    bool => Bool(core::convert::identity),
    Vec<Value> => Array(core::convert::identity),
    Map => Map(core::convert::identity),
    i32 => Number(Number::from),
    i64 => Number(Number::from),
    u32 => Number(Number::from),
    u64 => Number(Number::from),
}

// -----------------------------------------------------------------------------
// Comments

/// Out-of-band comment metadata attached to a map entry.
///
/// A `None` line is a blank separator line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Comments {
    pub lines: Vec<Option<String>>,
    pub inline: Option<String>,
}

impl Comments {
    #[inline]
    pub const fn new() -> Self {
        Self {
            lines: Vec::new(),
            inline: None,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.inline.is_none()
    }
}

// -----------------------------------------------------------------------------
// Map

/// One entry of a [`Map`].
#[derive(Debug, Clone, PartialEq)]
pub struct MapEntry {
    pub key: String,
    pub value: Value,
    pub comments: Comments,
}

/// A string-keyed map preserving insertion order.
///
/// Keys are unique; inserting an existing key replaces the value in place
/// and keeps both its position and its comments.
///
/// # Examples
///
/// ```
/// use vc_bind::tree::{Map, Value};
///
/// let mut map = Map::new();
/// map.insert("b", 1);
/// map.insert("a", 2);
/// map.insert("b", 3);
///
/// let keys: Vec<&str> = map.keys().collect();
/// assert_eq!(keys, ["b", "a"]);
/// assert_eq!(map.get("b"), Some(&Value::from(3)));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Map {
    entries: Vec<MapEntry>,
}

impl Map {
    #[inline]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.key == key)
    }

    #[inline]
    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.position(key).map(|index| &self.entries[index].value)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.position(key)
            .map(|index| &mut self.entries[index].value)
    }

    pub fn entry(&self, key: &str) -> Option<&MapEntry> {
        self.position(key).map(|index| &self.entries[index])
    }

    /// Inserts or replaces a value, returning the previous one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        match self.position(&key) {
            Some(index) => Some(core::mem::replace(&mut self.entries[index].value, value)),
            None => {
                self.entries.push(MapEntry {
                    key,
                    value,
                    comments: Comments::new(),
                });
                None
            }
        }
    }

    /// Removes an entry, shifting the following entries to keep the order.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.position(key)
            .map(|index| self.entries.remove(index).value)
    }

    pub fn comments(&self, key: &str) -> Option<&Comments> {
        self.entry(key).map(|entry| &entry.comments)
    }

    /// Sets the comments of an existing key. Returns `false` if the key is absent.
    pub fn set_comments(&mut self, key: &str, comments: Comments) -> bool {
        match self.position(key) {
            Some(index) => {
                self.entries[index].comments = comments;
                true
            }
            None => false,
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries
            .iter()
            .map(|entry| (entry.key.as_str(), &entry.value))
    }

    #[inline]
    pub fn entries(&self) -> &[MapEntry] {
        &self.entries
    }

    #[inline]
    pub fn into_entries(self) -> Vec<MapEntry> {
        self.entries
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Map {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Map::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl IntoIterator for Map {
    type Item = MapEntry;
    type IntoIter = alloc::vec::IntoIter<MapEntry>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

// -----------------------------------------------------------------------------
// Tests
