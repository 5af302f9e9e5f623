//! Construction of structured instances from converted members.
//!
//! Deserialization stores every converted member as a named component in
//! an [`InstanceBuilder`]. Record-like types are then built from all of
//! their components at once by a [`RecordBuilder`]; other types are
//! instantiated through a [`ClassInitiator`] and assigned member by member
//! by an [`ObjectBuilder`].

// -----------------------------------------------------------------------------
// Modules

mod components;
mod initiator;
mod instance;

// -----------------------------------------------------------------------------
// Exports

pub use components::Components;
pub use initiator::{ClassInitiator, DefaultInitiator, FactoryInitiator};
pub use instance::{InstanceBuilder, ObjectBuilder, RecordBuilder, new_builder};
