use alloc::sync::Arc;
use core::fmt;

use crate::config::ConfigProperties;
use crate::error::{Error, ErrorContainer, ErrorEntry};
use crate::schema::MemberInfo;
use crate::serializer::{Bind, Serializer, SerializerRegistry};

/// The environment a serializer is created in.
///
/// Carries the [`ConfigProperties`] of the conversion and, while resolving
/// a member of a structured type, that member's [`MemberInfo`].
#[derive(Clone)]
pub struct SerializerContext {
    properties: Arc<ConfigProperties>,
    node: Option<&'static MemberInfo>,
}

impl SerializerContext {
    #[inline]
    pub fn new(properties: Arc<ConfigProperties>) -> Self {
        Self {
            properties,
            node: None,
        }
    }

    #[inline]
    pub fn properties(&self) -> &Arc<ConfigProperties> {
        &self.properties
    }

    #[inline]
    pub fn registry(&self) -> &SerializerRegistry {
        self.properties.registry()
    }

    /// The member being resolved, if any.
    #[inline]
    pub fn node(&self) -> Option<&'static MemberInfo> {
        self.node
    }

    /// A context for resolving the serializers of `node`.
    #[inline]
    pub fn with_node(&self, node: &'static MemberInfo) -> Self {
        Self {
            properties: self.properties.clone(),
            node: Some(node),
        }
    }

    /// Resolves the serializer of `T` through the registry chain.
    #[inline]
    pub fn serializer<T: Bind>(&self) -> Result<Option<Arc<dyn Serializer<T>>>, Error> {
        self.registry().get::<T>(self)
    }

    /// Passes `entry` to the configured error handler.
    #[inline]
    pub fn handle(&self, entry: &ErrorEntry) -> Result<(), Error> {
        self.properties.error_handler().handle(entry)
    }

    /// Drains `errors` through the configured error handler.
    #[inline]
    pub fn drain(&self, errors: &mut ErrorContainer) -> Result<(), Error> {
        errors.handle(self.properties.error_handler())
    }
}

impl Default for SerializerContext {
    fn default() -> Self {
        Self::new(Arc::new(ConfigProperties::default()))
    }
}

impl fmt::Debug for SerializerContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerializerContext")
            .field("node", &self.node.map(MemberInfo::name))
            .finish_non_exhaustive()
    }
}
