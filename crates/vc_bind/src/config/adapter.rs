use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::error::Error;
use crate::tree::{Comments, Map, Number, Value};

// -----------------------------------------------------------------------------
// ConfigAdapter

/// A format-native document seen as a flat map of primitives.
///
/// Getters return `None` for absent keys and for values of another shape.
/// Setters may refuse shapes the format cannot store with
/// [`Error::UnsupportedShape`].
pub trait ConfigAdapter {
    /// The document of the backing format.
    type Document;

    fn document(&self) -> &Self::Document;

    fn into_document(self) -> Self::Document;

    /// Replaces the backing document.
    fn load(&mut self, document: Self::Document);

    /// The top-level keys, in document order.
    fn keys(&self) -> Vec<String>;

    fn contains_key(&self, key: &str) -> bool {
        self.keys().iter().any(|k| k == key)
    }

    /// The value of `key` as a primitive tree.
    fn get(&self, key: &str) -> Option<Value>;

    fn get_number(&self, key: &str) -> Option<Number> {
        match self.get(key)? {
            Value::Number(number) => Some(number),
            _ => None,
        }
    }

    fn get_string(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            Value::String(string) => Some(string),
            _ => None,
        }
    }

    fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key)?.as_bool()
    }

    fn get_array(&self, key: &str) -> Option<Vec<Value>> {
        match self.get(key)? {
            Value::Array(array) => Some(array),
            _ => None,
        }
    }

    fn get_map(&self, key: &str) -> Option<Map> {
        match self.get(key)? {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: Value) -> Result<(), Error>;

    #[inline]
    fn set_null(&mut self, key: &str) -> Result<(), Error> {
        self.set(key, Value::Null)
    }

    #[inline]
    fn set_number(&mut self, key: &str, number: Number) -> Result<(), Error> {
        self.set(key, Value::Number(number))
    }

    #[inline]
    fn set_string(&mut self, key: &str, string: String) -> Result<(), Error> {
        self.set(key, Value::String(string))
    }

    #[inline]
    fn set_bool(&mut self, key: &str, bool: bool) -> Result<(), Error> {
        self.set(key, Value::Bool(bool))
    }

    #[inline]
    fn set_array(&mut self, key: &str, array: Vec<Value>) -> Result<(), Error> {
        self.set(key, Value::Array(array))
    }

    #[inline]
    fn set_map(&mut self, key: &str, map: Map) -> Result<(), Error> {
        self.set(key, Value::Map(map))
    }

    /// Comment lines above `key`; a `None` line is blank.
    ///
    /// Ignored by formats without comments.
    fn set_comments(&mut self, key: &str, lines: &[Option<String>]) {
        let _ = (key, lines);
    }

    /// Comment after the value of `key`.
    ///
    /// Ignored by formats without inline comments.
    fn set_inline_comment(&mut self, key: &str, comment: Option<&str>) {
        let _ = (key, comment);
    }

    /// A snapshot of the whole document as a map.
    fn to_map(&self) -> Map {
        let mut map = Map::new();
        for key in self.keys() {
            if let Some(value) = self.get(&key) {
                map.insert(key, value);
            }
        }
        map
    }
}

// -----------------------------------------------------------------------------
// ConfigFormat

/// A text format with its adapter.
pub trait ConfigFormat: Send + Sync {
    type Adapter: ConfigAdapter;

    /// Name used in error messages.
    fn name(&self) -> &'static str;

    /// An empty document.
    fn new_adapter(&self) -> Self::Adapter;

    fn parse(&self, text: &str) -> Result<Self::Adapter, Error>;

    fn render(&self, adapter: &Self::Adapter) -> Result<String, Error>;
}

// -----------------------------------------------------------------------------
// MemoryConfigAdapter

/// An adapter over an in-memory [`Map`], keeping every shape and comment.
///
/// # Examples
///
/// ```
/// use vc_bind::config::{ConfigAdapter, MemoryConfigAdapter};
/// use vc_bind::tree::Value;
///
/// let mut adapter = MemoryConfigAdapter::new();
/// adapter.set("port", Value::from(8080)).unwrap();
/// adapter.set_comments("port", &[Some("Listening port".into())]);
///
/// assert_eq!(adapter.keys(), ["port"]);
/// assert!(adapter.get_string("port").is_none());
/// assert_eq!(adapter.get_number("port").unwrap().to_string(), "8080");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryConfigAdapter {
    map: Map,
}

impl MemoryConfigAdapter {
    #[inline]
    pub const fn new() -> Self {
        Self { map: Map::new() }
    }
}

impl From<Map> for MemoryConfigAdapter {
    #[inline]
    fn from(map: Map) -> Self {
        Self { map }
    }
}

impl ConfigAdapter for MemoryConfigAdapter {
    type Document = Map;

    #[inline]
    fn document(&self) -> &Map {
        &self.map
    }

    #[inline]
    fn into_document(self) -> Map {
        self.map
    }

    #[inline]
    fn load(&mut self, document: Map) {
        self.map = document;
    }

    fn keys(&self) -> Vec<String> {
        self.map.keys().map(ToString::to_string).collect()
    }

    #[inline]
    fn contains_key(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    #[inline]
    fn get(&self, key: &str) -> Option<Value> {
        self.map.get(key).cloned()
    }

    #[inline]
    fn set(&mut self, key: &str, value: Value) -> Result<(), Error> {
        self.map.insert(key, value);
        Ok(())
    }

    fn set_comments(&mut self, key: &str, lines: &[Option<String>]) {
        let inline = self.map.comments(key).and_then(|c| c.inline.clone());
        self.map.set_comments(
            key,
            Comments {
                lines: lines.to_vec(),
                inline,
            },
        );
    }

    fn set_inline_comment(&mut self, key: &str, comment: Option<&str>) {
        let lines = self
            .map
            .comments(key)
            .map(|c| c.lines.clone())
            .unwrap_or_default();
        self.map.set_comments(
            key,
            Comments {
                lines,
                inline: comment.map(ToString::to_string),
            },
        );
    }

    /// Keeps the comments, unlike the default.
    #[inline]
    fn to_map(&self) -> Map {
        self.map.clone()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{ConfigAdapter, MemoryConfigAdapter};
    use crate::tree::{Map, Value};
    use alloc::string::String;
    use alloc::vec;

    #[test]
    fn typed_getters_check_shape() {
        let mut adapter = MemoryConfigAdapter::new();
        adapter.set_string("name", String::from("vc")).unwrap();
        adapter.set_bool("enabled", true).unwrap();
        adapter.set_array("ports", vec![Value::from(1)]).unwrap();
        adapter.set_map("nested", Map::new()).unwrap();
        adapter.set_null("none").unwrap();

        assert!(adapter.get_string("name").as_deref() == Some("vc"));
        assert!(adapter.get_bool("name").is_none());
        assert!(adapter.get_bool("enabled") == Some(true));
        assert!(adapter.get_array("ports").unwrap().len() == 1);
        assert!(adapter.get_map("nested").unwrap().is_empty());
        assert!(adapter.get_number("none").is_none());
        assert!(adapter.contains_key("none"));
        assert!(!adapter.contains_key("missing"));
    }

    #[test]
    fn comments_survive_in_the_map_view() {
        let mut adapter = MemoryConfigAdapter::new();
        adapter.set("port", Value::from(1)).unwrap();
        adapter.set_inline_comment("port", Some("tcp"));
        adapter.set_comments("port", &[Some("Port".into()), None]);

        let map = adapter.to_map();
        let comments = map.comments("port").unwrap();
        assert!(comments.lines == [Some(String::from("Port")), None]);
        assert!(comments.inline.as_deref() == Some("tcp"));
        assert!(adapter.into_document() == map);
    }
}
