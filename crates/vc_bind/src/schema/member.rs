use alloc::boxed::Box;
use alloc::sync::Arc;
use core::any::Any;
use core::fmt;

use crate::error::{Error, ErrorContainer};
use crate::info::{TypeInfo, TypeKind, Typed};
use crate::schema::KeyCase;
use crate::serializer::{Bind, NewSerializer, Serializer, SerializerContext};
use crate::serializer::{deserialize_from_value, serialize_to_value};
use crate::tree::Value;

// -----------------------------------------------------------------------------
// MemberInfo

/// Static metadata of one member of a structured type.
///
/// # Examples
///
/// ```
/// use vc_bind::schema::{KeyCase, MemberInfo};
///
/// let info = MemberInfo::new::<Option<u16>>("port")
///     .with_key_format(KeyCase::UpperSnake)
///     .with_comments(&["The listening port.", ""]);
///
/// assert_eq!(info.name(), "port");
/// assert!(info.is_optional());
/// assert_eq!(info.ty().name(), "Option<u16>");
/// ```
#[derive(Clone, Copy)]
pub struct MemberInfo {
    name: &'static str,
    ty: fn() -> &'static TypeInfo,
    key: Option<&'static str>,
    key_format: Option<KeyCase>,
    optional: bool,
    hidden: bool,
    ignored: bool,
    comments: &'static [&'static str],
    inline_comment: Option<&'static str>,
}

impl MemberInfo {
    /// A member named `name` holding an `F`.
    pub fn new<F: Typed>(name: &'static str) -> Self {
        Self {
            name,
            ty: F::type_info,
            key: None,
            key_format: None,
            optional: false,
            hidden: false,
            ignored: false,
            comments: &[],
            inline_comment: None,
        }
    }

    /// Replaces the name as the base of the formatted key.
    #[inline]
    pub const fn with_key(mut self, key: &'static str) -> Self {
        self.key = Some(key);
        self
    }

    /// Formats this member's key with `case`, whatever the type or the
    /// properties specify.
    #[inline]
    pub const fn with_key_format(mut self, case: KeyCase) -> Self {
        self.key_format = Some(case);
        self
    }

    #[inline]
    pub const fn with_optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    /// A hidden member is optional, and skipped when writing a null value.
    #[inline]
    pub const fn with_hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    /// An ignored member is excluded by the default node filter.
    #[inline]
    pub const fn with_ignored(mut self, ignored: bool) -> Self {
        self.ignored = ignored;
        self
    }

    /// Comment lines; an empty line is a blank separator.
    #[inline]
    pub const fn with_comments(mut self, comments: &'static [&'static str]) -> Self {
        self.comments = comments;
        self
    }

    #[inline]
    pub const fn with_inline_comment(mut self, comment: &'static str) -> Self {
        self.inline_comment = Some(comment);
        self
    }

    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// The declared type.
    #[inline]
    pub fn ty(&self) -> &'static TypeInfo {
        (self.ty)()
    }

    /// The key before formatting: the explicit key, or the name.
    #[inline]
    pub const fn key(&self) -> &'static str {
        match self.key {
            Some(key) => key,
            None => self.name,
        }
    }

    #[inline]
    pub const fn key_format(&self) -> Option<KeyCase> {
        self.key_format
    }

    /// Returns `true` if an absent key is not an error.
    ///
    /// Members declared optional or hidden are, as are `Option` members.
    pub fn is_optional(&self) -> bool {
        self.optional || self.hidden || matches!(self.ty().kind(), TypeKind::Option(_))
    }

    #[inline]
    pub const fn is_hidden(&self) -> bool {
        self.hidden
    }

    #[inline]
    pub const fn is_ignored(&self) -> bool {
        self.ignored
    }

    #[inline]
    pub const fn comments(&self) -> &'static [&'static str] {
        self.comments
    }

    #[inline]
    pub const fn inline_comment(&self) -> Option<&'static str> {
        self.inline_comment
    }
}

impl fmt::Debug for MemberInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberInfo")
            .field("name", &self.name)
            .field("type", &self.ty().path())
            .field("key", &self.key)
            .field("optional", &self.optional)
            .field("hidden", &self.hidden)
            .field("ignored", &self.ignored)
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// Member

/// Reads and writes one member of `S` through resolved serializers.
pub trait NodeCodec<S>: Send + Sync {
    /// The member's value of `instance` as a primitive.
    ///
    /// `None` if it can be neither serialized nor passed through.
    fn write(&self, instance: &S, errors: &mut ErrorContainer) -> Result<Option<Value>, Error>;

    /// Returns `false` if there is no serializer and `value` cannot be
    /// passed through.
    fn can_read(&self, value: &Value) -> bool;

    /// Converts `value` into the member's type, boxed.
    fn read(&self, value: &Value, errors: &mut ErrorContainer) -> Result<Option<Box<dyn Any>>, Error>;
}

/// A member of the structured type `S`, with its type erased.
pub trait Member<S>: Send + Sync + 'static {
    fn info(&self) -> &MemberInfo;

    /// Resolves the serializers of this member.
    ///
    /// `ctx` is expected to carry this member as its node.
    fn resolve(&self, ctx: &SerializerContext) -> Result<Box<dyn NodeCodec<S>>, Error>;

    /// Stores `value` into `instance`, handing it back if it has the
    /// wrong type.
    fn assign(&self, instance: &mut S, value: Box<dyn Any>) -> Result<(), Box<dyn Any>>;

    /// The zero-ish value of the member's type.
    fn zero(&self) -> Option<Box<dyn Any>>;
}

type OverrideFn<F> = fn(&SerializerContext) -> Result<Arc<dyn Serializer<F>>, Error>;

fn new_override<F, W: NewSerializer<F>>(ctx: &SerializerContext) -> Result<Arc<dyn Serializer<F>>, Error> {
    Ok(Arc::new(W::new_serializer(ctx)?))
}

/// A plain field of `S` holding an `F`.
///
/// # Examples
///
/// ```
/// use vc_bind::schema::{Field, Member, MemberInfo};
///
/// struct Server { port: u16 }
///
/// let field = Field::new(MemberInfo::new::<u16>("port"), |s: &Server| &s.port, |s, v| s.port = v);
///
/// let mut server = Server { port: 0 };
/// field.assign(&mut server, Box::new(8080u16)).unwrap();
/// assert_eq!(server.port, 8080);
/// assert!(field.assign(&mut server, Box::new("8080")).is_err());
/// ```
pub struct Field<S, F> {
    info: MemberInfo,
    get: fn(&S) -> &F,
    set: fn(&mut S, F),
    write_with: Option<OverrideFn<F>>,
    read_with: Option<OverrideFn<F>>,
}

impl<S, F: Bind> Field<S, F> {
    #[inline]
    pub fn new(info: MemberInfo, get: fn(&S) -> &F, set: fn(&mut S, F)) -> Self {
        Self {
            info,
            get,
            set,
            write_with: None,
            read_with: None,
        }
    }

    /// Serializes this member with `W` in both directions.
    #[inline]
    pub fn with<W: NewSerializer<F>>(self) -> Self {
        self.write_with::<W>().read_with::<W>()
    }

    /// Writes this member with `W` instead of the registered serializer.
    #[inline]
    pub fn write_with<W: NewSerializer<F>>(mut self) -> Self {
        self.write_with = Some(new_override::<F, W>);
        self
    }

    /// Reads this member with `W` instead of the registered serializer.
    #[inline]
    pub fn read_with<W: NewSerializer<F>>(mut self) -> Self {
        self.read_with = Some(new_override::<F, W>);
        self
    }
}

impl<S: 'static, F: Bind> Member<S> for Field<S, F> {
    #[inline]
    fn info(&self) -> &MemberInfo {
        &self.info
    }

    fn resolve(&self, ctx: &SerializerContext) -> Result<Box<dyn NodeCodec<S>>, Error> {
        let write = match self.write_with {
            Some(new) => Some(new(ctx)?),
            None => ctx.serializer::<F>()?,
        };
        let read = match self.read_with {
            Some(new) => Some(new(ctx)?),
            None if self.write_with.is_none() => write.clone(),
            None => ctx.serializer::<F>()?,
        };
        Ok(Box::new(FieldCodec {
            get: self.get,
            write,
            read,
        }))
    }

    fn assign(&self, instance: &mut S, value: Box<dyn Any>) -> Result<(), Box<dyn Any>> {
        (self.set)(instance, *value.downcast::<F>()?);
        Ok(())
    }

    #[inline]
    fn zero(&self) -> Option<Box<dyn Any>> {
        F::zero().map(|zero| Box::new(zero) as Box<dyn Any>)
    }
}

struct FieldCodec<S, F> {
    get: fn(&S) -> &F,
    write: Option<Arc<dyn Serializer<F>>>,
    read: Option<Arc<dyn Serializer<F>>>,
}

impl<S, F: Bind> NodeCodec<S> for FieldCodec<S, F> {
    #[inline]
    fn write(&self, instance: &S, errors: &mut ErrorContainer) -> Result<Option<Value>, Error> {
        serialize_to_value(self.write.as_deref(), (self.get)(instance), errors)
    }

    #[inline]
    fn can_read(&self, value: &Value) -> bool {
        self.read.is_some() || F::from_primitive(value).is_some()
    }

    fn read(&self, value: &Value, errors: &mut ErrorContainer) -> Result<Option<Box<dyn Any>>, Error> {
        let value = deserialize_from_value(self.read.as_deref(), value, errors)?;
        Ok(value.map(|value| Box::new(value) as Box<dyn Any>))
    }
}

// -----------------------------------------------------------------------------
// Inherited

/// A member of the embedded parent `P` of `S`, exposed as a member of `S`.
pub struct Inherited<S, P: 'static> {
    member: &'static dyn Member<P>,
    parent: fn(&S) -> &P,
    parent_mut: fn(&mut S) -> &mut P,
}

impl<S, P: 'static> Inherited<S, P> {
    #[inline]
    pub fn new(
        member: &'static dyn Member<P>,
        parent: fn(&S) -> &P,
        parent_mut: fn(&mut S) -> &mut P,
    ) -> Self {
        Self {
            member,
            parent,
            parent_mut,
        }
    }
}

impl<S: 'static, P: 'static> Member<S> for Inherited<S, P> {
    #[inline]
    fn info(&self) -> &MemberInfo {
        self.member.info()
    }

    fn resolve(&self, ctx: &SerializerContext) -> Result<Box<dyn NodeCodec<S>>, Error> {
        Ok(Box::new(InheritedCodec {
            inner: self.member.resolve(ctx)?,
            parent: self.parent,
        }))
    }

    #[inline]
    fn assign(&self, instance: &mut S, value: Box<dyn Any>) -> Result<(), Box<dyn Any>> {
        self.member.assign((self.parent_mut)(instance), value)
    }

    #[inline]
    fn zero(&self) -> Option<Box<dyn Any>> {
        self.member.zero()
    }
}

struct InheritedCodec<S, P> {
    inner: Box<dyn NodeCodec<P>>,
    parent: fn(&S) -> &P,
}

impl<S, P> NodeCodec<S> for InheritedCodec<S, P> {
    #[inline]
    fn write(&self, instance: &S, errors: &mut ErrorContainer) -> Result<Option<Value>, Error> {
        self.inner.write((self.parent)(instance), errors)
    }

    #[inline]
    fn can_read(&self, value: &Value) -> bool {
        self.inner.can_read(value)
    }

    #[inline]
    fn read(&self, value: &Value, errors: &mut ErrorContainer) -> Result<Option<Box<dyn Any>>, Error> {
        self.inner.read(value, errors)
    }
}
