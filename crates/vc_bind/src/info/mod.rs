//! Static type descriptors.
//!
//! Every bindable type describes itself through [`Typed::type_info`]. The
//! descriptor carries the type's identity, its readable names and a
//! [`TypeKind`], which container serializers use to validate their type
//! arguments and map serializers use to validate key types.
//!
//! Descriptors of foreign types are implemented in this module; the
//! `Config` and `ConfigEnum` derive macros implement them for user types.

// -----------------------------------------------------------------------------
// Modules

mod cell;
mod impls;
mod type_info;

// -----------------------------------------------------------------------------
// Exports

pub use cell::{GenericTypeInfoCell, NonGenericTypeInfoCell};
pub use type_info::{CollectionKind, EnumInfo, StructInfo, TypeInfo, TypeKind};

// -----------------------------------------------------------------------------
// Typed

/// A static accessor to compile-time type information.
///
/// Implemented by the derive macros, and for the standard types the
/// default registry knows about.
///
/// # Examples
///
/// ```
/// use vc_bind::info::{TypeKind, Typed};
///
/// let info = <Vec<Option<u8>>>::type_info();
/// assert_eq!(info.name(), "Vec<Option<u8>>");
/// assert!(matches!(info.kind(), TypeKind::Collection { .. }));
/// ```
///
/// # Manually Impl
///
/// Non-generic types store their descriptor in a [`NonGenericTypeInfoCell`],
/// generic ones in a [`GenericTypeInfoCell`]:
///
/// ```
/// use vc_bind::info::{GenericTypeInfoCell, TypeInfo, TypeKind, Typed};
///
/// struct Wrapper<T>(T);
///
/// impl<T: 'static> Typed for Wrapper<T> {
///     fn type_info() -> &'static TypeInfo {
///         static CELL: GenericTypeInfoCell = GenericTypeInfoCell::new();
///         CELL.get_or_insert::<Self>(|| TypeInfo::new::<Self>(TypeKind::Opaque))
///     }
/// }
///
/// assert!(Wrapper::<u8>::type_info().is::<Wrapper<u8>>());
/// assert!(!Wrapper::<u16>::type_info().is::<Wrapper<u8>>());
/// ```
pub trait Typed: 'static {
    fn type_info() -> &'static TypeInfo;
}
