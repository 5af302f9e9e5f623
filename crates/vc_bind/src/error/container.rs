use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::error::{Error, ErrorHandler};
use crate::tree::Value;

// -----------------------------------------------------------------------------
// ErrorType

/// Classification of an advisory [`ErrorEntry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    /// A required key is absent.
    KeyNotFound,
    /// An input key was not consumed by any member.
    UnexpectedKey,
    /// No serializer could be resolved and the primitive could not be passed through.
    SerializerNotFound,
    /// A primitive did not have the shape a serializer expected.
    MismatchedTypes,
    /// Serializer specific, such as malformed number or address text.
    Custom,
}

impl ErrorType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::KeyNotFound => "KEY_NOT_FOUND",
            Self::UnexpectedKey => "UNEXPECTED_KEY",
            Self::SerializerNotFound => "SERIALIZER_NOT_FOUND",
            Self::MismatchedTypes => "MISMATCHED_TYPES",
            Self::Custom => "CUSTOM",
        }
    }
}

impl fmt::Display for ErrorType {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

// -----------------------------------------------------------------------------
// ErrorEntry

/// One advisory error: a classification plus a readable message.
///
/// # Examples
///
/// ```
/// use vc_bind::error::{ErrorEntry, ErrorType};
///
/// let entry = ErrorEntry::key_not_found("port");
/// assert_eq!(entry.ty, ErrorType::KeyNotFound);
/// assert_eq!(entry.to_string(), "KEY_NOT_FOUND: Required key 'port' is missing");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorEntry {
    pub ty: ErrorType,
    pub message: String,
}

impl ErrorEntry {
    #[inline]
    pub fn new(ty: ErrorType, message: impl Into<String>) -> Self {
        Self {
            ty,
            message: message.into(),
        }
    }

    pub fn key_not_found(key: &str) -> Self {
        Self::new(ErrorType::KeyNotFound, format!("Required key '{key}' is missing"))
    }

    pub fn unexpected_key(key: &str) -> Self {
        Self::new(ErrorType::UnexpectedKey, format!("Unexpected key '{key}' was found"))
    }

    /// A key naming the same entry as an earlier one once case is ignored.
    pub fn duplicate_key(key: &str) -> Self {
        Self::new(ErrorType::UnexpectedKey, format!("Duplicate key '{key}' was found"))
    }

    /// No serializer for `ty` on the write path.
    pub fn cannot_serialize(ty: &str) -> Self {
        Self::new(
            ErrorType::SerializerNotFound,
            format!("Couldn't serialize type '{ty}'. Did you register a serializer for it?"),
        )
    }

    /// No serializer for `ty` on the read path.
    pub fn cannot_deserialize(ty: &str) -> Self {
        Self::new(
            ErrorType::SerializerNotFound,
            format!("Couldn't deserialize type '{ty}'. Did you register a serializer for it?"),
        )
    }

    /// A nested structured value could not be built.
    pub fn cannot_construct(ty: &str) -> Self {
        Self::new(
            ErrorType::SerializerNotFound,
            format!("Could not construct an instance of '{ty}'"),
        )
    }

    pub fn mismatched(value: &Value, ty: &str) -> Self {
        Self::new(
            ErrorType::MismatchedTypes,
            format!("Could not deserialize ({}) '{value}' as {ty}", value.shape()),
        )
    }

    pub fn not_a_number(text: &str) -> Self {
        Self::new(ErrorType::Custom, format!("Could not parse '{text}' as a number"))
    }

    pub fn no_enum_constant(ty: &str, text: &str) -> Self {
        Self::new(ErrorType::Custom, format!("No enum constant {ty}.{text}"))
    }

    #[inline]
    pub fn custom(message: impl Into<String>) -> Self {
        Self::new(ErrorType::Custom, message)
    }
}

impl fmt::Display for ErrorEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.ty, self.message)
    }
}

// -----------------------------------------------------------------------------
// ErrorContainer

/// Accumulates advisory errors of one conversion.
///
/// Containers compose by merging: a nested conversion records into its own
/// container, which the caller then [`merge`]s into the enclosing one.
///
/// Pending entries are drained through [`handle`]. The container remembers
/// how many entries were ever recorded, so [`is_clean`] stays `false` after
/// a drain.
///
/// # Examples
///
/// ```
/// use vc_bind::error::{ErrorContainer, ErrorEntry, SuppressingHandler};
///
/// let mut child = ErrorContainer::new();
/// child.report(ErrorEntry::unexpected_key("extra"));
///
/// let mut parent = ErrorContainer::new();
/// parent.merge(child);
/// assert_eq!(parent.len(), 1);
///
/// parent.handle(&SuppressingHandler).unwrap();
/// assert!(parent.is_empty());
/// assert!(!parent.is_clean());
/// ```
///
/// [`merge`]: ErrorContainer::merge
/// [`handle`]: ErrorContainer::handle
/// [`is_clean`]: ErrorContainer::is_clean
#[derive(Debug, Clone, Default)]
pub struct ErrorContainer {
    entries: Vec<ErrorEntry>,
    recorded: usize,
}

impl ErrorContainer {
    #[inline]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            recorded: 0,
        }
    }

    /// Records an entry.
    #[inline]
    pub fn report(&mut self, entry: ErrorEntry) {
        self.recorded += 1;
        self.entries.push(entry);
    }

    /// Records an entry built from its parts.
    #[inline]
    pub fn record(&mut self, ty: ErrorType, message: impl Into<String>) {
        self.report(ErrorEntry::new(ty, message));
    }

    /// Moves every pending entry of `child` to the end of this container.
    pub fn merge(&mut self, mut child: ErrorContainer) {
        self.recorded += child.recorded;
        self.entries.append(&mut child.entries);
    }

    /// Number of pending entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no entries are pending.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if nothing was ever recorded, drained entries included.
    #[inline]
    pub fn is_clean(&self) -> bool {
        self.recorded == 0
    }

    #[inline]
    pub fn entries(&self) -> &[ErrorEntry] {
        &self.entries
    }

    #[inline]
    pub fn into_entries(self) -> Vec<ErrorEntry> {
        self.entries
    }

    /// Passes pending entries to `handler` in order, removing them.
    ///
    /// Stops at the first entry the handler escalates. The entries after it
    /// are discarded along with it.
    pub fn handle(&mut self, handler: &dyn ErrorHandler) -> Result<(), Error> {
        for entry in self.entries.drain(..) {
            handler.handle(&entry)?;
        }
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{ErrorContainer, ErrorEntry, ErrorType};
    use crate::error::{Error, FailingHandler, RecordingHandler};
    use crate::tree::Value;
    use alloc::string::ToString;

    #[test]
    fn messages() {
        assert!(
            ErrorEntry::unexpected_key("x").to_string()
                == "UNEXPECTED_KEY: Unexpected key 'x' was found"
        );
        assert!(
            ErrorEntry::cannot_deserialize("Foo").message
                == "Couldn't deserialize type 'Foo'. Did you register a serializer for it?"
        );
        assert!(
            ErrorEntry::mismatched(&Value::from("abc"), "i32").message
                == "Could not deserialize (string) 'abc' as i32"
        );
        assert!(ErrorEntry::no_enum_constant("Mode", "bogus").message == "No enum constant Mode.bogus");
        assert!(ErrorEntry::not_a_number("1x").ty == ErrorType::Custom);
    }

    #[test]
    fn merge_appends_in_order() {
        let mut parent = ErrorContainer::new();
        parent.report(ErrorEntry::key_not_found("a"));

        let mut child = ErrorContainer::new();
        child.report(ErrorEntry::key_not_found("b"));
        child.report(ErrorEntry::key_not_found("c"));
        parent.merge(child);

        let keys: alloc::vec::Vec<_> = parent.entries().iter().map(|e| e.message.as_str()).collect();
        assert!(keys[0].contains("'a'") && keys[1].contains("'b'") && keys[2].contains("'c'"));
    }

    #[test]
    fn drained_containers_are_not_clean() {
        let mut child = ErrorContainer::new();
        assert!(child.is_clean());
        child.report(ErrorEntry::custom("boom"));

        let recording = RecordingHandler::new();
        child.handle(&recording).unwrap();
        assert!(child.is_empty());
        assert!(!child.is_clean());

        let mut parent = ErrorContainer::new();
        parent.merge(child);
        assert!(parent.is_empty());
        assert!(!parent.is_clean());
        assert!(recording.len() == 1);
    }

    #[test]
    fn failing_handler_stops_draining() {
        let mut errors = ErrorContainer::new();
        errors.report(ErrorEntry::key_not_found("a"));
        errors.report(ErrorEntry::key_not_found("b"));

        let result = errors.handle(&FailingHandler);
        assert!(matches!(result, Err(Error::Aborted(entry)) if entry.message.contains("'a'")));
        assert!(errors.is_empty());
    }
}
