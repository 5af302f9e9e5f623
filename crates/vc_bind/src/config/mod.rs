//! Structured types and the configuration front end.
//!
//! [`ConfigurationSerializer`] is the serializer every `#[derive(Config)]`
//! type synthesizes. [`ConfigSerializer`] drives it for a whole document:
//! it converts between a structured type and a [`ConfigAdapter`] of some
//! [`ConfigFormat`], and reads and writes files.

// -----------------------------------------------------------------------------
// Modules

mod adapter;
mod configuration;
mod properties;
mod serializer;

// -----------------------------------------------------------------------------
// Exports

pub use adapter::{ConfigAdapter, ConfigFormat, MemoryConfigAdapter};
pub use configuration::ConfigurationSerializer;
pub use properties::ConfigProperties;
pub use serializer::{ConfigSerializer, ConfigSerializerBuilder};
