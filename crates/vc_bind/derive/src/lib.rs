//! Derive macros for `vc_bind`.
//!
//! - [`Config`]
//! - [`ConfigEnum`]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(clippy::std_instead_of_core, reason = "proc-macro lib")]
#![allow(clippy::std_instead_of_alloc, reason = "proc-macro lib")]

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

static CONFIG_ATTRIBUTE_NAME: &str = "config";

// -----------------------------------------------------------------------------
// Modules

mod attributes;
mod config;
mod config_enum;
mod manifest;

// -----------------------------------------------------------------------------
// Macros

/// # Configuration Derivation
///
/// `#[derive(Config)]` implements `Typed`, `Bind` and `Configuration` for
/// a struct with named fields. Every field becomes a member, bound through
/// the serializer registered for its type.
///
/// ## Type attributes
///
/// - `#[config(record)]`: the struct is built from all of its components at
///   once instead of being created and assigned member by member. Missing
///   components fall back to the `Default` instance when there is one, then
///   to the zero value of the member type.
/// - `#[config(default)]`: the struct implements `Default`, which is used to
///   create instances and to fill in absent keys.
/// - `#[config(key_format = "kebab")]`: formats the keys of the type's own
///   members. One of `identity`, `snake`, `upper_snake`, `kebab`,
///   `upper_kebab`, `camel`, `pascal`, `proper` or `upper`.
///
/// A struct without `record` must either have `default` or be given an
/// instance by a class initiator.
///
/// ## Field attributes
///
/// - `skip`: not a member, left to `Default` on records.
/// - `ignore`: a member excluded by the default node filter.
/// - `extends`: flattens the members of a `Config` field into this type.
///   Members declared here shadow inherited ones with the same name.
/// - `key = "..."`: the base of the key instead of the field name.
/// - `key_format = "..."`: overrides the type's key format for this member.
/// - `optional`: an absent key is not an error.
/// - `hidden`: skipped on write when it serializes to nothing, and optional.
/// - `comment = "..."`: a comment line above the key, repeatable. An empty
///   string writes a blank line.
/// - `inline_comment = "..."`: a comment after the value.
/// - `with = Type`, `write_with = Type`, `read_with = Type`: binds the
///   member with the given `NewSerializer` instead of the registered one.
///
/// ```rust, ignore
/// #[derive(Config, Default)]
/// #[config(default, key_format = "kebab")]
/// struct Server {
///     #[config(comment = "Shown in the server list.")]
///     display_name: String,
///     #[config(optional, inline_comment = "seconds")]
///     idle_timeout: u32,
///     #[config(skip)]
///     connections: usize,
/// }
/// ```
///
/// Generic structs are not supported.
#[proc_macro_derive(Config, attributes(config))]
pub fn derive_config(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    config::derive_config(ast)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// # Enum Derivation
///
/// `#[derive(ConfigEnum)]` implements `ConfigEnum`, `Typed` and `Bind` for
/// an enum of unit variants.
///
/// Variant names are the SCREAMING_SNAKE_CASE form of the identifiers,
/// unless renamed with `#[config(rename = "...")]`. Values are written in
/// lower case and read ignoring case, so two names that only differ in
/// case are rejected.
///
/// ```rust, ignore
/// #[derive(ConfigEnum, Clone, Copy)]
/// enum Difficulty {
///     Peaceful,
///     #[config(rename = "NORMAL")]
///     Medium,
///     Hard,
/// }
/// ```
#[proc_macro_derive(ConfigEnum, attributes(config))]
pub fn derive_config_enum(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    config_enum::derive_config_enum(ast)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
