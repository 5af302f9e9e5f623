//! The primitive tree exchanged with format backends, and the cursor used
//! to walk it.
//!
//! - [`Value`]: null, number, string, boolean, array or [`Map`].
//! - [`Number`]: arbitrary precision integer or decimal, with the
//!   saturating [`ClampedNumber`] view.
//! - [`DataVisitor`]: a stack-based cursor with [`Access`] gating.

// -----------------------------------------------------------------------------
// Modules

mod number;
mod value;
mod visitor;

// -----------------------------------------------------------------------------
// Exports

pub use number::{ClampedNumber, Number, ParseNumberError};
pub use value::{Comments, Map, MapEntry, Value};
pub use visitor::{Access, DataVisitor, VisitError};
