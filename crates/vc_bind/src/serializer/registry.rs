use alloc::boxed::Box;
use alloc::sync::Arc;
use core::any::Any;
use core::fmt;
use std::sync::LazyLock;

use crate::error::{Error, ErrorContainer};
use crate::hash::TypeIdMap;
use crate::info::Typed;
use crate::serializer::{Bind, Serializer, SerializerContext};
use crate::serializer::{deserialize_from_value, serialize_to_value};
use crate::tree::DataVisitor;

// -----------------------------------------------------------------------------
// SerializerFactory

/// Creates a serializer of `T` for a given context.
pub type SerializerFactory<T> =
    Arc<dyn Fn(&SerializerContext) -> Result<Arc<dyn Serializer<T>>, Error> + Send + Sync>;

struct Registration {
    type_path: &'static str,
    /// A `SerializerFactory<T>` for the registered `T`.
    factory: Box<dyn Any + Send + Sync>,
}

// -----------------------------------------------------------------------------
// SerializerRegistry

/// A type-indexed table of serializer factories.
///
/// Lookups that find nothing are delegated to the parent registry. The
/// shared default registry sits at the end of the chain of every registry
/// created with [`new`]; it holds the built-in serializers and is the only
/// registry that synthesizes serializers through [`Bind::synthesize`].
///
/// Registering a second serializer for a type fails and keeps the first.
///
/// # Examples
///
/// ```
/// use vc_bind::error::Error;
/// use vc_bind::serializer::{SerializerRegistry, StringSerializer};
///
/// // The default registry already knows `String`, but lookups only
/// // reach it when this registry has no registration of its own.
/// let mut registry = SerializerRegistry::new();
/// registry.add_serializer::<String>(StringSerializer).unwrap();
///
/// let again = registry.add_serializer::<String>(StringSerializer);
/// assert!(matches!(again, Err(Error::DuplicateSerializer(_))));
/// ```
///
/// [`new`]: SerializerRegistry::new
pub struct SerializerRegistry {
    registrations: TypeIdMap<Registration>,
    parent: Option<Arc<SerializerRegistry>>,
    synthesizes: bool,
}

static DEFAULT_REGISTRY: LazyLock<Arc<SerializerRegistry>> = LazyLock::new(|| {
    let mut registry = SerializerRegistry::empty();
    if let Err(err) = crate::serializer::defaults::register_defaults(&mut registry) {
        log::error!("failed to register the built-in serializers: {err}");
    }
    #[cfg(feature = "auto_register")]
    for registration in inventory::iter::<SerializerRegistration> {
        match (registration.register)(&mut registry) {
            Ok(()) => log::debug!("auto registered a serializer for `{}`", (registration.type_path)()),
            Err(err) => log::warn!("auto registration skipped: {err}"),
        }
    }
    registry.synthesizes = true;
    Arc::new(registry)
});

impl SerializerRegistry {
    /// An empty registry layered on the shared default registry.
    #[inline]
    pub fn new() -> Self {
        Self::with_parent(Self::default_registry())
    }

    /// A standalone registry that neither delegates nor synthesizes.
    #[inline]
    pub fn empty() -> Self {
        Self {
            registrations: TypeIdMap::new(),
            parent: None,
            synthesizes: false,
        }
    }

    /// An empty registry delegating to `parent`.
    #[inline]
    pub fn with_parent(parent: Arc<SerializerRegistry>) -> Self {
        Self {
            parent: Some(parent),
            ..Self::empty()
        }
    }

    /// The shared, immutable default registry.
    #[inline]
    pub fn default_registry() -> Arc<SerializerRegistry> {
        DEFAULT_REGISTRY.clone()
    }

    #[inline]
    pub fn parent(&self) -> Option<&Arc<SerializerRegistry>> {
        self.parent.as_ref()
    }

    /// Number of registrations in this registry, parents excluded.
    #[inline]
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    /// Returns `true` if this registry, parents excluded, has a serializer for `T`.
    #[inline]
    pub fn contains<T: 'static>(&self) -> bool {
        self.registrations.contains_type::<T>()
    }

    /// Registers a factory for `T`.
    pub fn add_factory<T: Typed>(
        &mut self,
        factory: impl Fn(&SerializerContext) -> Result<Arc<dyn Serializer<T>>, Error> + Send + Sync + 'static,
    ) -> Result<(), Error> {
        let type_path = T::type_info().path();
        let factory: SerializerFactory<T> = Arc::new(factory);
        let inserted = self.registrations.try_insert_type::<T>(|| Registration {
            type_path,
            factory: Box::new(factory),
        });
        if !inserted {
            return Err(Error::DuplicateSerializer(type_path));
        }
        log::debug!("registered a serializer for `{type_path}`");
        Ok(())
    }

    /// Registers a serializer instance shared by every lookup of `T`.
    pub fn add_serializer<T: Typed>(&mut self, serializer: impl Serializer<T>) -> Result<(), Error> {
        let serializer: Arc<dyn Serializer<T>> = Arc::new(serializer);
        self.add_factory::<T>(move |_| Ok(serializer.clone()))
    }

    /// Registers `A` to be serialized through the serializer resolved for `T`.
    ///
    /// Values are converted with `From` in both directions.
    pub fn add_alias<A, T>(&mut self) -> Result<(), Error>
    where
        A: Bind + Clone + From<T>,
        T: Bind + From<A>,
    {
        self.add_factory::<A>(|ctx| {
            Ok(Arc::new(AliasSerializer::<A, T> {
                inner: ctx.serializer::<T>()?,
                _marker: core::marker::PhantomData,
            }))
        })
    }

    /// Resolves the serializer of `T`.
    ///
    /// Walks the registry chain. The default registry falls back to
    /// [`Bind::synthesize`]. Returns `Ok(None)` if nothing resolves.
    pub fn get<T: Bind>(
        &self,
        ctx: &SerializerContext,
    ) -> Result<Option<Arc<dyn Serializer<T>>>, Error> {
        let mut current = Some(self);
        while let Some(registry) = current {
            let factory = registry
                .registrations
                .get_type::<T>()
                .and_then(|registration| registration.factory.downcast_ref::<SerializerFactory<T>>());
            if let Some(factory) = factory {
                return factory(ctx).map(Some);
            }
            if registry.synthesizes {
                return T::synthesize(ctx);
            }
            current = registry.parent.as_deref();
        }
        Ok(None)
    }
}

impl Default for SerializerRegistry {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SerializerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types: alloc::vec::Vec<&str> =
            self.registrations.values().map(|r| r.type_path).collect();
        types.sort_unstable();
        f.debug_struct("SerializerRegistry")
            .field("types", &types)
            .field("parent", &self.parent.is_some())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// AliasSerializer

struct AliasSerializer<A, T> {
    inner: Option<Arc<dyn Serializer<T>>>,
    _marker: core::marker::PhantomData<fn() -> A>,
}

impl<A, T> Serializer<A> for AliasSerializer<A, T>
where
    A: Bind + Clone + From<T>,
    T: Bind + From<A>,
{
    fn serialize(
        &self,
        value: &A,
        visitor: &mut DataVisitor,
        errors: &mut ErrorContainer,
    ) -> Result<(), Error> {
        let value = T::from(value.clone());
        match serialize_to_value::<T>(self.inner.as_deref(), &value, errors)? {
            Some(primitive) => visitor.write_value(primitive)?,
            None => visitor.write_null()?,
        };
        Ok(())
    }

    fn deserialize(
        &self,
        visitor: &mut DataVisitor,
        errors: &mut ErrorContainer,
    ) -> Result<Option<A>, Error> {
        let Some(primitive) = visitor.read_value()? else {
            return Ok(None);
        };
        let value = deserialize_from_value::<T>(self.inner.as_deref(), primitive, errors)?;
        Ok(value.map(A::from))
    }
}

// -----------------------------------------------------------------------------
// Auto registration

/// A registration applied to the default registry while it initializes.
///
/// Submitted with [`submit_serializer!`](crate::submit_serializer).
#[cfg(feature = "auto_register")]
pub struct SerializerRegistration {
    register: fn(&mut SerializerRegistry) -> Result<(), Error>,
    type_path: fn() -> &'static str,
}

#[cfg(feature = "auto_register")]
impl SerializerRegistration {
    #[doc(hidden)]
    pub const fn new(
        register: fn(&mut SerializerRegistry) -> Result<(), Error>,
        type_path: fn() -> &'static str,
    ) -> Self {
        Self {
            register,
            type_path,
        }
    }
}

#[cfg(feature = "auto_register")]
inventory::collect!(SerializerRegistration);

/// Adds a serializer to the shared default registry.
///
/// The registration runs once, when the default registry is first used.
///
/// ```ignore
/// use vc_bind::serializer::FromStrSerializer;
///
/// vc_bind::submit_serializer!(url::Url => FromStrSerializer::<url::Url>::new());
/// ```
#[cfg(feature = "auto_register")]
#[macro_export]
macro_rules! submit_serializer {
    ($ty:ty => $serializer:expr) => {
        $crate::__macro_exports::inventory::submit! {
            $crate::serializer::SerializerRegistration::new(
                |registry| registry.add_serializer::<$ty>($serializer),
                || <$ty as $crate::info::Typed>::type_info().path(),
            )
        }
    };
}

// -----------------------------------------------------------------------------
// Tests
