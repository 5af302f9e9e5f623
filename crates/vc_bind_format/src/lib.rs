#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

#[cfg(feature = "json")]
mod json;
#[cfg(feature = "properties")]
mod properties;
#[cfg(feature = "yaml")]
mod yaml;

// -----------------------------------------------------------------------------
// Exports

#[cfg(feature = "json")]
#[cfg_attr(docsrs, doc(cfg(feature = "json")))]
pub use json::{Json, JsonAdapter};

#[cfg(feature = "properties")]
#[cfg_attr(docsrs, doc(cfg(feature = "properties")))]
pub use properties::{Properties, PropertiesAdapter, PropertiesDocument, PropertyEntry};

#[cfg(feature = "yaml")]
#[cfg_attr(docsrs, doc(cfg(feature = "yaml")))]
pub use yaml::{Yaml, YamlAdapter};
