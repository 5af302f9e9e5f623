//! Static descriptions of structured types.
//!
//! A [`Schema`] lists the [`Member`]s of a type in declaration order, with
//! the members of an embedded parent first. Each member carries a
//! [`MemberInfo`] and, once resolved against a set of properties, becomes
//! a [`ConfigNode`] with a formatted key and a [`NodeCodec`].

// -----------------------------------------------------------------------------
// Modules

mod filter;
mod key_format;
mod member;
mod node;
mod schema;

// -----------------------------------------------------------------------------
// Exports

pub use filter::{DefaultNodeFilter, NodeFilter};
pub use key_format::{KeyCase, KeyFormatter, ParseKeyCaseError};
pub use member::{Field, Inherited, Member, MemberInfo, NodeCodec};
pub use node::{ConfigNode, format_key};
pub use schema::{Configuration, Schema, SchemaKind};
