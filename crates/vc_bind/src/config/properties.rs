use alloc::sync::Arc;
use core::fmt;

use crate::builder::{ClassInitiator, DefaultInitiator};
use crate::error::{ErrorHandler, LoggingHandler};
use crate::schema::{DefaultNodeFilter, KeyCase, KeyFormatter, NodeFilter};
use crate::serializer::SerializerRegistry;

/// The settings shared by every conversion of one serializer.
///
/// | Setting | Default |
/// |---|---|
/// | registry | a new registry layered on the default registry |
/// | initiator | [`DefaultInitiator`] |
/// | key formatter | [`KeyCase::Identity`] |
/// | node filter | [`DefaultNodeFilter`] |
/// | error handler | [`LoggingHandler`] |
#[derive(Clone)]
pub struct ConfigProperties {
    registry: Arc<SerializerRegistry>,
    initiator: Arc<dyn ClassInitiator>,
    key_formatter: Arc<dyn KeyFormatter>,
    node_filter: Arc<dyn NodeFilter>,
    error_handler: Arc<dyn ErrorHandler>,
}

impl ConfigProperties {
    /// Default settings around `registry`.
    pub fn new(registry: Arc<SerializerRegistry>) -> Self {
        Self {
            registry,
            initiator: Arc::new(DefaultInitiator),
            key_formatter: Arc::new(KeyCase::Identity),
            node_filter: Arc::new(DefaultNodeFilter),
            error_handler: Arc::new(LoggingHandler),
        }
    }

    #[inline]
    pub fn with_registry(mut self, registry: Arc<SerializerRegistry>) -> Self {
        self.registry = registry;
        self
    }

    #[inline]
    pub fn with_initiator(mut self, initiator: Arc<dyn ClassInitiator>) -> Self {
        self.initiator = initiator;
        self
    }

    #[inline]
    pub fn with_key_formatter(mut self, key_formatter: Arc<dyn KeyFormatter>) -> Self {
        self.key_formatter = key_formatter;
        self
    }

    #[inline]
    pub fn with_node_filter(mut self, node_filter: Arc<dyn NodeFilter>) -> Self {
        self.node_filter = node_filter;
        self
    }

    #[inline]
    pub fn with_error_handler(mut self, error_handler: Arc<dyn ErrorHandler>) -> Self {
        self.error_handler = error_handler;
        self
    }

    #[inline]
    pub fn registry(&self) -> &SerializerRegistry {
        &self.registry
    }

    #[inline]
    pub fn initiator(&self) -> &Arc<dyn ClassInitiator> {
        &self.initiator
    }

    #[inline]
    pub fn key_formatter(&self) -> &dyn KeyFormatter {
        &*self.key_formatter
    }

    #[inline]
    pub fn node_filter(&self) -> &dyn NodeFilter {
        &*self.node_filter
    }

    #[inline]
    pub fn error_handler(&self) -> &dyn ErrorHandler {
        &*self.error_handler
    }
}

impl Default for ConfigProperties {
    #[inline]
    fn default() -> Self {
        Self::new(Arc::new(SerializerRegistry::new()))
    }
}

impl fmt::Debug for ConfigProperties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigProperties")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
