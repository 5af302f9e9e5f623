use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use crate::builder::Components;
use crate::schema::{Inherited, KeyCase, Member};
use crate::serializer::Bind;

/// How instances of a structured type come to be.
pub enum SchemaKind<S> {
    /// Built from all of its components at once.
    Record {
        construct: fn(&mut Components) -> Option<S>,
        decompose: fn(S) -> Components,
    },
    /// Instantiated first, then assigned member by member.
    Object,
}

impl<S> SchemaKind<S> {
    #[inline]
    pub fn is_record(&self) -> bool {
        matches!(self, Self::Record { .. })
    }
}

/// The ordered members of a structured type.
///
/// Usually generated by `#[derive(Config)]`. Built by hand, it reads:
///
/// ```
/// use vc_bind::schema::{Field, MemberInfo, Schema};
///
/// #[derive(Default)]
/// struct Base { name: String }
/// #[derive(Default)]
/// struct Derived { base: Base, name: String, port: u16 }
///
/// let base: &'static Schema<Base> = Box::leak(Box::new(Schema::object()
///     .member(Field::new(MemberInfo::new::<String>("name"), |b: &Base| &b.name, |b, v| b.name = v))));
///
/// let derived = Schema::<Derived>::object()
///     .extend(base, |d| &d.base, |d| &mut d.base)
///     .member(Field::new(MemberInfo::new::<u16>("port"), |d: &Derived| &d.port, |d, v| d.port = v))
///     .member(Field::new(MemberInfo::new::<String>("name"), |d: &Derived| &d.name, |d, v| d.name = v));
///
/// let names: Vec<&str> = derived.members().iter().map(|m| m.info().name()).collect();
/// assert_eq!(names, ["name", "port"]);
/// ```
pub struct Schema<S: 'static> {
    members: Vec<Box<dyn Member<S>>>,
    kind: SchemaKind<S>,
    key_format: Option<KeyCase>,
}

impl<S: 'static> Schema<S> {
    #[inline]
    pub fn object() -> Self {
        Self {
            members: Vec::new(),
            kind: SchemaKind::Object,
            key_format: None,
        }
    }

    #[inline]
    pub fn record(construct: fn(&mut Components) -> Option<S>, decompose: fn(S) -> Components) -> Self {
        Self {
            members: Vec::new(),
            kind: SchemaKind::Record {
                construct,
                decompose,
            },
            key_format: None,
        }
    }

    /// Sets the key case of every member without one of its own.
    #[inline]
    pub fn with_key_format(mut self, case: Option<KeyCase>) -> Self {
        self.key_format = case;
        self
    }

    /// Appends a member.
    ///
    /// A member with the same name as an existing one replaces it in place.
    pub fn member(mut self, member: impl Member<S>) -> Self {
        let name = member.info().name();
        match self.members.iter().position(|m| m.info().name() == name) {
            Some(index) => self.members[index] = Box::new(member),
            None => self.members.push(Box::new(member)),
        }
        self
    }

    /// Appends the members of the embedded parent `P`.
    ///
    /// Call before adding the type's own members, so that the parent's
    /// members come first and same-named members shadow them.
    pub fn extend<P: 'static>(
        mut self,
        parent: &'static Schema<P>,
        get: fn(&S) -> &P,
        get_mut: fn(&mut S) -> &mut P,
    ) -> Self {
        for member in &parent.members {
            self = self.member(Inherited::new(&**member, get, get_mut));
        }
        self
    }

    #[inline]
    pub fn members(&self) -> &[Box<dyn Member<S>>] {
        &self.members
    }

    pub fn member_named(&self, name: &str) -> Option<&dyn Member<S>> {
        self.members
            .iter()
            .find(|m| m.info().name() == name)
            .map(|m| &**m)
    }

    #[inline]
    pub fn kind(&self) -> &SchemaKind<S> {
        &self.kind
    }

    #[inline]
    pub fn key_format(&self) -> Option<KeyCase> {
        self.key_format
    }
}

impl<S: 'static> fmt::Debug for Schema<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("members", &self.members.iter().map(|m| m.info().name()).collect::<Vec<_>>())
            .field("record", &self.kind.is_record())
            .field("key_format", &self.key_format)
            .finish()
    }
}

/// A structured type converted member by member.
///
/// Implemented by `#[derive(Config)]`.
pub trait Configuration: Bind {
    fn schema() -> &'static Schema<Self>;
}

// -----------------------------------------------------------------------------
// Tests
