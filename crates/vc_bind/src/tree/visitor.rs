use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::tree::{Comments, Map, Number, Value};

// -----------------------------------------------------------------------------
// Access

/// The operations a [`DataVisitor`] permits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Access {
    Read,
    Write,
    Full,
}

impl Access {
    #[inline]
    pub const fn can_read(self) -> bool {
        matches!(self, Self::Read | Self::Full)
    }

    #[inline]
    pub const fn can_write(self) -> bool {
        matches!(self, Self::Write | Self::Full)
    }
}

// -----------------------------------------------------------------------------
// VisitError

/// A misuse of a [`DataVisitor`].
///
/// These are programming errors, unlike a value of the wrong shape which
/// is reported as absence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum VisitError {
    #[error("reading is not permitted by this visitor")]
    ReadDenied,
    #[error("writing is not permitted by this visitor")]
    WriteDenied,
    #[error("cannot move out of the root key")]
    AtRoot,
    #[error("no key is selected in the current section")]
    NoKey,
}

// -----------------------------------------------------------------------------
// DataVisitor

struct Section {
    /// Key of this section inside its parent, `None` when it is the root.
    key: Option<String>,
    map: Map,
    /// Detached sections were entered read-only over an absent slot and
    /// are dropped on exit instead of written back.
    detached: bool,
}

/// A cursor over a primitive tree.
///
/// The cursor holds a stack whose bottom element is the root slot. At the
/// root, reads and writes address the root value itself, writing replaces
/// it. [`enter_section`] pushes a map; inside a section, [`visit`] selects
/// the key that subsequent reads and writes address.
///
/// # Examples
///
/// ```
/// use vc_bind::tree::{DataVisitor, Value};
///
/// let mut visitor = DataVisitor::writer();
/// visitor.enter_section().unwrap();
/// visitor.visit_section("server").unwrap();
/// visitor.visit("port").unwrap();
/// visitor.write_number(8080).unwrap();
/// visitor.visit_root().unwrap();
///
/// let value = visitor.into_value();
/// let server = value.as_map().unwrap().get("server").unwrap();
/// assert_eq!(server.as_map().unwrap().get("port"), Some(&Value::from(8080)));
/// ```
///
/// [`enter_section`]: DataVisitor::enter_section
/// [`visit`]: DataVisitor::visit
pub struct DataVisitor {
    root: Value,
    sections: Vec<Section>,
    key: Option<String>,
    access: Access,
}

impl DataVisitor {
    /// Creates a visitor over `root` with the given access.
    #[inline]
    pub fn new(root: Value, access: Access) -> Self {
        Self {
            root,
            sections: Vec::new(),
            key: None,
            access,
        }
    }

    /// A read-only visitor over `root`.
    #[inline]
    pub fn reader(root: Value) -> Self {
        Self::new(root, Access::Read)
    }

    /// A write-only visitor over an empty root.
    #[inline]
    pub fn writer() -> Self {
        Self::new(Value::Null, Access::Write)
    }

    #[inline]
    pub fn access(&self) -> Access {
        self.access
    }

    /// Returns `true` while no section has been entered.
    #[inline]
    pub fn is_root(&self) -> bool {
        self.sections.is_empty()
    }

    /// The key selected in the current section.
    #[inline]
    pub fn current_key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Number of entered sections.
    #[inline]
    pub fn depth(&self) -> usize {
        self.sections.len()
    }

    // -------------------------------------------------------------------------
    // Navigation

    /// Selects `key` in the current section.
    pub fn visit(&mut self, key: impl Into<String>) -> Result<&mut Self, VisitError> {
        if self.is_root() {
            return Err(VisitError::AtRoot);
        }
        self.key = Some(key.into());
        Ok(self)
    }

    /// Selects `key` and enters it as a section.
    pub fn visit_section(&mut self, key: impl Into<String>) -> Result<&mut Self, VisitError> {
        self.visit(key)?;
        self.enter_section()
    }

    /// Descends into the map at the current position.
    ///
    /// An absent or non-map position is replaced by an empty map when the
    /// visitor can write. A read-only visitor descends into a detached empty
    /// section instead, in which every key reads as absent.
    pub fn enter_section(&mut self) -> Result<&mut Self, VisitError> {
        if !self.is_root() && self.key.is_none() {
            return Err(VisitError::NoKey);
        }
        let writable = self.access.can_write();
        let key = self.key.take();
        let slot = match self.sections.last_mut() {
            None => Some(&mut self.root),
            Some(section) => key.as_deref().and_then(|key| section.map.get_mut(key)),
        };

        let (map, detached) = match slot {
            Some(Value::Map(map)) => (core::mem::take(map), false),
            _ if !writable => (Map::new(), true),
            Some(_) => (Map::new(), false),
            None => {
                // Reserve the entry now so the section keeps its position.
                if let (Some(section), Some(key)) = (self.sections.last_mut(), key.as_deref()) {
                    section.map.insert(key, Value::Null);
                }
                (Map::new(), false)
            }
        };

        self.sections.push(Section {
            key,
            map,
            detached,
        });
        Ok(self)
    }

    /// Ascends one level, writing the section back into its parent.
    pub fn exit_section(&mut self) -> Result<&mut Self, VisitError> {
        let section = self.sections.pop().ok_or(VisitError::AtRoot)?;
        self.attach(section);
        self.key = None;
        Ok(self)
    }

    /// Returns to the root, writing every entered section back.
    pub fn visit_root(&mut self) -> Result<&mut Self, VisitError> {
        while let Some(section) = self.sections.pop() {
            self.attach(section);
        }
        self.key = None;
        Ok(self)
    }

    fn attach(&mut self, section: Section) {
        if section.detached {
            return;
        }
        let slot = match (self.sections.last_mut(), &section.key) {
            (None, _) => Some(&mut self.root),
            (Some(parent), Some(key)) => parent.map.get_mut(key),
            (Some(_), None) => None,
        };
        if let Some(slot) = slot {
            *slot = Value::Map(section.map);
        }
    }

    /// Consumes the visitor and returns the root value.
    pub fn into_value(mut self) -> Value {
        while let Some(section) = self.sections.pop() {
            self.attach(section);
        }
        self.root
    }

    // -------------------------------------------------------------------------
    // Reading

    fn current(&self) -> Option<&Value> {
        match self.sections.last() {
            None => Some(&self.root),
            Some(section) => section.map.get(self.key.as_deref()?),
        }
    }

    /// Returns `true` if a non-null value exists at the current position.
    pub fn is_present(&self) -> bool {
        self.current().is_some_and(|value| !value.is_null())
    }

    /// The keys of the current section, in order.
    pub fn section_keys(&self) -> Vec<String> {
        match self.sections.last() {
            Some(section) => section.map.keys().map(String::from).collect(),
            None => Vec::new(),
        }
    }

    /// Reads the value at the current position, `None` if absent or null.
    pub fn read_value(&self) -> Result<Option<&Value>, VisitError> {
        if !self.access.can_read() {
            return Err(VisitError::ReadDenied);
        }
        Ok(self.current().filter(|value| !value.is_null()))
    }

    #[inline]
    pub fn read_number(&self) -> Result<Option<&Number>, VisitError> {
        Ok(self.read_value()?.and_then(Value::as_number))
    }

    #[inline]
    pub fn read_string(&self) -> Result<Option<&str>, VisitError> {
        Ok(self.read_value()?.and_then(Value::as_str))
    }

    #[inline]
    pub fn read_bool(&self) -> Result<Option<bool>, VisitError> {
        Ok(self.read_value()?.and_then(Value::as_bool))
    }

    #[inline]
    pub fn read_array(&self) -> Result<Option<&[Value]>, VisitError> {
        Ok(self.read_value()?.and_then(Value::as_array))
    }

    #[inline]
    pub fn read_map(&self) -> Result<Option<&Map>, VisitError> {
        Ok(self.read_value()?.and_then(Value::as_map))
    }

    // -------------------------------------------------------------------------
    // Writing

    /// Writes `value` at the current position.
    ///
    /// At the root this replaces the whole root value.
    pub fn write_value(&mut self, value: impl Into<Value>) -> Result<&mut Self, VisitError> {
        if !self.access.can_write() {
            return Err(VisitError::WriteDenied);
        }
        let value = value.into();
        match self.sections.last_mut() {
            None => self.root = value,
            Some(section) => {
                let key = self.key.clone().ok_or(VisitError::NoKey)?;
                section.map.insert(key, value);
            }
        }
        Ok(self)
    }

    #[inline]
    pub fn write_null(&mut self) -> Result<&mut Self, VisitError> {
        self.write_value(Value::Null)
    }

    #[inline]
    pub fn write_number(&mut self, number: impl Into<Number>) -> Result<&mut Self, VisitError> {
        self.write_value(Value::Number(number.into()))
    }

    #[inline]
    pub fn write_string(&mut self, string: impl Into<String>) -> Result<&mut Self, VisitError> {
        self.write_value(Value::String(string.into()))
    }

    #[inline]
    pub fn write_bool(&mut self, bool: bool) -> Result<&mut Self, VisitError> {
        self.write_value(Value::Bool(bool))
    }

    #[inline]
    pub fn write_array(&mut self, array: Vec<Value>) -> Result<&mut Self, VisitError> {
        self.write_value(Value::Array(array))
    }

    #[inline]
    pub fn write_map(&mut self, map: Map) -> Result<&mut Self, VisitError> {
        self.write_value(Value::Map(map))
    }

    /// Attaches comments to the selected key of the current section.
    ///
    /// Does nothing if the key has not been written.
    pub fn set_comments(&mut self, comments: Comments) -> Result<&mut Self, VisitError> {
        if !self.access.can_write() {
            return Err(VisitError::WriteDenied);
        }
        let section = self.sections.last_mut().ok_or(VisitError::AtRoot)?;
        let key = self.key.as_deref().ok_or(VisitError::NoKey)?;
        section.map.set_comments(key, comments);
        Ok(self)
    }
}

impl Default for DataVisitor {
    #[inline]
    fn default() -> Self {
        Self::new(Value::Null, Access::Full)
    }
}

impl fmt::Debug for DataVisitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataVisitor")
            .field("access", &self.access)
            .field("depth", &self.sections.len())
            .field("key", &self.key)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{Access, DataVisitor, VisitError};
    use crate::tree::{Comments, Map, Value};
    use alloc::vec;

    fn sample() -> Value {
        let mut inner = Map::new();
        inner.insert("port", 25565);
        let mut root = Map::new();
        root.insert("name", "lobby");
        root.insert("server", inner);
        root.insert("tags", Value::Array(vec![Value::from("a")]));
        Value::Map(root)
    }

    #[test]
    fn root_navigation_is_forbidden() {
        let mut visitor = DataVisitor::default();
        assert!(matches!(visitor.visit("a"), Err(VisitError::AtRoot)));
        assert!(matches!(visitor.exit_section(), Err(VisitError::AtRoot)));
    }

    #[test]
    fn write_at_root_replaces_root() {
        let mut visitor = DataVisitor::writer();
        visitor.write_string("first").unwrap();
        visitor.write_number(2).unwrap();
        assert!(visitor.into_value() == Value::from(2));
    }

    #[test]
    fn reads_are_shape_checked() {
        let mut visitor = DataVisitor::reader(sample());
        visitor.enter_section().unwrap();
        visitor.visit("name").unwrap();
        assert!(visitor.read_string().unwrap() == Some("lobby"));
        assert!(visitor.read_number().unwrap().is_none());
        assert!(visitor.read_array().unwrap().is_none());

        visitor.visit("missing").unwrap();
        assert!(!visitor.is_present());
        assert!(visitor.read_value().unwrap().is_none());

        visitor.visit_section("server").unwrap();
        visitor.visit("port").unwrap();
        assert!(visitor.read_number().unwrap().is_some());
    }

    #[test]
    fn access_is_enforced() {
        let mut reader = DataVisitor::reader(sample());
        assert!(matches!(reader.write_null(), Err(VisitError::WriteDenied)));

        let writer = DataVisitor::writer();
        assert!(matches!(writer.read_value(), Err(VisitError::ReadDenied)));
    }

    #[test]
    fn enter_section_materializes_for_writers() {
        let mut visitor = DataVisitor::writer();
        visitor.enter_section().unwrap();
        visitor.visit_section("a").unwrap();
        visitor.visit_section("b").unwrap();
        visitor.visit("c").unwrap();
        visitor.write_bool(true).unwrap();
        visitor.set_comments(Comments {
            lines: vec![Some("note".into())],
            inline: None,
        })
        .unwrap();

        let value = visitor.into_value();
        let b = value.as_map().unwrap().get("a").unwrap().as_map().unwrap().get("b").unwrap();
        let b = b.as_map().unwrap();
        assert!(b.get("c") == Some(&Value::Bool(true)));
        assert!(b.comments("c").unwrap().lines.len() == 1);
    }

    #[test]
    fn read_only_sections_are_detached() {
        let mut visitor = DataVisitor::reader(sample());
        visitor.enter_section().unwrap();
        visitor.visit_section("absent").unwrap();
        visitor.visit("x").unwrap();
        assert!(!visitor.is_present());
        visitor.exit_section().unwrap();

        assert!(visitor.into_value() == sample());
    }

    #[test]
    fn exit_keeps_entry_order() {
        let mut visitor = DataVisitor::new(sample(), Access::Full);
        visitor.enter_section().unwrap();
        visitor.visit_section("server").unwrap();
        visitor.visit("port").unwrap();
        visitor.write_number(1).unwrap();
        visitor.exit_section().unwrap();
        visitor.exit_section().unwrap();
        assert!(visitor.is_root());

        let value = visitor.into_value();
        let keys: alloc::vec::Vec<&str> = value.as_map().unwrap().keys().collect();
        assert!(keys == ["name", "server", "tags"]);
    }
}
