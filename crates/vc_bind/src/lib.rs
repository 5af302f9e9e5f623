#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

// -----------------------------------------------------------------------------
// Extern Self

// The derive macros emit `::vc_bind` paths, including when they are used
// inside this crate's own tests.
extern crate self as vc_bind;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

pub mod builder;
pub mod config;
pub mod error;
pub mod hash;
pub mod info;
pub mod schema;
pub mod serializer;
pub mod tree;

/// `#[derive(Config)]` and `#[derive(ConfigEnum)]`.
pub mod derive {
    pub use vc_bind_derive::{Config, ConfigEnum};
}

// -----------------------------------------------------------------------------
// Top-Level exports

pub use config::ConfigSerializer;
pub use error::Error;
pub use schema::Configuration;
pub use serializer::{Bind, Serializer};

#[doc(hidden)]
pub mod __macro_exports {
    pub use std::sync::OnceLock;

    #[cfg(feature = "auto_register")]
    pub use inventory;
}
