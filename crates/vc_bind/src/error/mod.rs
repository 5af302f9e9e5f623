//! Hard failures and the advisory error stream.
//!
//! Two channels exist side by side:
//!
//! - [`Error`] aborts the current operation. It is returned through
//!   `Result` and covers misconfiguration, cursor misuse, I/O and
//!   handler-requested aborts.
//! - [`ErrorEntry`] values are advisory. They are recorded into an
//!   [`ErrorContainer`] while converting and drained through an
//!   [`ErrorHandler`], which decides whether to log, drop or escalate them.

// -----------------------------------------------------------------------------
// Modules

mod container;
mod handler;

// -----------------------------------------------------------------------------
// Exports

pub use container::{ErrorContainer, ErrorEntry, ErrorType};
pub use handler::{ErrorHandler, FailingHandler, LoggingHandler};
pub use handler::{RecordingHandler, SuppressingHandler};

// -----------------------------------------------------------------------------
// Error

use alloc::boxed::Box;
use alloc::string::String;

use crate::tree::VisitError;

/// A hard failure of a binding operation.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The error handler escalated an advisory entry.
    #[error("conversion aborted: {0}")]
    Aborted(ErrorEntry),
    #[error(transparent)]
    Visit(#[from] VisitError),
    #[error("a serializer for `{0}` is already registered")]
    DuplicateSerializer(&'static str),
    #[error("map keys of type `{0}` are not supported, use `String` or a `ConfigEnum`")]
    UnsupportedMapKey(&'static str),
    #[error("`{0}` cannot be used as a container type argument")]
    UnsupportedTypeArgument(&'static str),
    #[error("`{ty}` has no component named `{name}`")]
    UnknownComponent { ty: &'static str, name: String },
    #[error("component `{name}` of `{ty}` expects a value of type `{expected}`")]
    ComponentType {
        ty: &'static str,
        name: String,
        expected: &'static str,
    },
    #[error("the {format} format cannot store {shape} values (key `{key}`)")]
    UnsupportedShape {
        format: &'static str,
        shape: &'static str,
        key: String,
    },
    /// Two members of a type format to the same key.
    #[error("members `{first}` and `{second}` of `{ty}` both use the key `{key}`")]
    DuplicateKey {
        ty: &'static str,
        key: String,
        first: &'static str,
        second: &'static str,
    },
    #[error("could not load configuration `{0}`")]
    Load(&'static str),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("malformed {format} document: {source}")]
    Malformed {
        format: &'static str,
        #[source]
        source: Box<dyn core::error::Error + Send + Sync>,
    },
}

impl Error {
    /// Wraps a parser error of `format`.
    pub fn malformed(
        format: &'static str,
        source: impl Into<Box<dyn core::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Malformed {
            format,
            source: source.into(),
        }
    }
}
