use alloc::string::{String, ToString};
use alloc::sync::Arc;
use std::path::Path;

use crate::builder::ClassInitiator;
use crate::config::{ConfigAdapter, ConfigFormat, ConfigProperties};
use crate::error::{Error, ErrorContainer, ErrorEntry, ErrorHandler, ErrorType};
use crate::info::Typed;
use crate::schema::{Configuration, KeyFormatter, NodeFilter};
use crate::serializer::{Bind, Serializer, SerializerContext, SerializerRegistry};
use crate::serializer::{deserialize_from_value, serialize_to_value};
use crate::tree::Value;

/// Reads and writes structured types in the text format `F`.
///
/// # Examples
///
/// ```
/// use vc_bind::config::{ConfigAdapter, ConfigSerializer};
/// # use vc_bind::config::{ConfigFormat, MemoryConfigAdapter};
/// # use vc_bind::error::Error;
/// # struct Memory;
/// # impl ConfigFormat for Memory {
/// #     type Adapter = MemoryConfigAdapter;
/// #     fn name(&self) -> &'static str { "memory" }
/// #     fn new_adapter(&self) -> MemoryConfigAdapter { MemoryConfigAdapter::new() }
/// #     fn parse(&self, _: &str) -> Result<MemoryConfigAdapter, Error> { Ok(MemoryConfigAdapter::new()) }
/// #     fn render(&self, adapter: &MemoryConfigAdapter) -> Result<String, Error> {
/// #         Ok(adapter.keys().join(","))
/// #     }
/// # }
/// use vc_bind::derive::Config;
///
/// #[derive(Config, Default, Debug, PartialEq)]
/// #[config(default)]
/// struct Settings {
///     motd: String,
///     slots: u8,
/// }
///
/// let serializer = ConfigSerializer::new(Memory);
/// let settings = Settings { motd: "hello".into(), slots: 12 };
///
/// let adapter = serializer.serialize(&settings).unwrap();
/// assert_eq!(adapter.keys(), ["motd", "slots"]);
///
/// let back: Settings = serializer.deserialize(&adapter).unwrap().unwrap();
/// assert_eq!(back, settings);
/// ```
pub struct ConfigSerializer<F> {
    format: F,
    properties: Arc<ConfigProperties>,
}

impl<F: ConfigFormat> ConfigSerializer<F> {
    /// A serializer with the default properties.
    #[inline]
    pub fn new(format: F) -> Self {
        Self {
            format,
            properties: Arc::new(ConfigProperties::default()),
        }
    }

    #[inline]
    pub fn with_properties(format: F, properties: ConfigProperties) -> Self {
        Self {
            format,
            properties: Arc::new(properties),
        }
    }

    #[inline]
    pub fn builder(format: F) -> ConfigSerializerBuilder<F> {
        ConfigSerializerBuilder::new(format)
    }

    #[inline]
    pub fn format(&self) -> &F {
        &self.format
    }

    #[inline]
    pub fn properties(&self) -> &ConfigProperties {
        &self.properties
    }

    #[inline]
    fn context(&self) -> SerializerContext {
        SerializerContext::new(self.properties.clone())
    }

    /// Writes `value` into a new document.
    ///
    /// Keys the format refuses are reported as `SERIALIZER_NOT_FOUND` and
    /// left out.
    pub fn serialize<S: Configuration>(&self, value: &S) -> Result<F::Adapter, Error> {
        let ctx = self.context();
        let serializer = ctx.serializer::<S>()?;

        let mut errors = ErrorContainer::new();
        let tree = serialize_to_value(serializer.as_deref(), value, &mut errors)?;
        if tree.is_none() {
            errors.report(ErrorEntry::cannot_serialize(S::type_info().name()));
        }
        ctx.drain(&mut errors)?;

        let mut adapter = self.format.new_adapter();
        let Some(Value::Map(map)) = tree else {
            return Ok(adapter);
        };
        for entry in map {
            match adapter.set(&entry.key, entry.value) {
                Ok(()) => {}
                Err(err @ Error::UnsupportedShape { .. }) => {
                    ctx.handle(&ErrorEntry::new(ErrorType::SerializerNotFound, err.to_string()))?;
                    continue;
                }
                Err(err) => return Err(err),
            }
            if !entry.comments.lines.is_empty() {
                adapter.set_comments(&entry.key, &entry.comments.lines);
            }
            if let Some(inline) = entry.comments.inline.as_deref() {
                adapter.set_inline_comment(&entry.key, Some(inline));
            }
        }
        Ok(adapter)
    }

    /// Reads an `S` from `adapter`.
    ///
    /// `None` if the instance could not be constructed; the reasons went
    /// through the error handler.
    pub fn deserialize<S: Configuration>(&self, adapter: &F::Adapter) -> Result<Option<S>, Error> {
        let ctx = self.context();
        let serializer = ctx.serializer::<S>()?;

        let mut errors = ErrorContainer::new();
        let root = Value::Map(adapter.to_map());
        let value = deserialize_from_value(serializer.as_deref(), &root, &mut errors)?;
        ctx.drain(&mut errors)?;
        Ok(value)
    }

    /// Renders `value` in the format.
    pub fn to_string<S: Configuration>(&self, value: &S) -> Result<String, Error> {
        let adapter = self.serialize(value)?;
        self.format.render(&adapter)
    }

    /// Parses an `S` from text in the format.
    pub fn from_str<S: Configuration>(&self, text: &str) -> Result<S, Error> {
        let adapter = self.format.parse(text)?;
        self.deserialize(&adapter)?
            .ok_or(Error::Load(S::type_info().path()))
    }

    /// Writes `value` to `path`, creating missing parent directories.
    pub fn save<S: Configuration>(&self, path: impl AsRef<Path>, value: &S) -> Result<(), Error> {
        let path = path.as_ref();
        let text = self.to_string(value)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, text)?;
        log::debug!("saved `{}` to {}", S::type_info(), path.display());
        Ok(())
    }

    /// Reads an `S` from the file at `path`.
    pub fn load<S: Configuration>(&self, path: impl AsRef<Path>) -> Result<S, Error> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        log::debug!("loading `{}` from {}", S::type_info(), path.display());
        self.from_str(&text)
    }
}

// -----------------------------------------------------------------------------
// ConfigSerializerBuilder

/// Builder of a [`ConfigSerializer`].
///
/// Format options are set on the format value itself.
pub struct ConfigSerializerBuilder<F> {
    format: F,
    registry: SerializerRegistry,
    properties: ConfigProperties,
}

impl<F: ConfigFormat> ConfigSerializerBuilder<F> {
    pub fn new(format: F) -> Self {
        Self {
            format,
            registry: SerializerRegistry::new(),
            properties: ConfigProperties::default(),
        }
    }

    /// Replaces the registry, dropping serializers added so far.
    #[inline]
    pub fn registry(mut self, registry: SerializerRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// See [`SerializerRegistry::add_serializer`].
    #[inline]
    pub fn add_serializer<T: Typed>(mut self, serializer: impl Serializer<T>) -> Result<Self, Error> {
        self.registry.add_serializer::<T>(serializer)?;
        Ok(self)
    }

    /// See [`SerializerRegistry::add_factory`].
    #[inline]
    pub fn add_factory<T: Typed>(
        mut self,
        factory: impl Fn(&SerializerContext) -> Result<Arc<dyn Serializer<T>>, Error> + Send + Sync + 'static,
    ) -> Result<Self, Error> {
        self.registry.add_factory::<T>(factory)?;
        Ok(self)
    }

    /// See [`SerializerRegistry::add_alias`].
    #[inline]
    pub fn add_alias<A, T>(mut self) -> Result<Self, Error>
    where
        A: Bind + Clone + From<T>,
        T: Bind + From<A>,
    {
        self.registry.add_alias::<A, T>()?;
        Ok(self)
    }

    #[inline]
    pub fn initiator(mut self, initiator: impl ClassInitiator + 'static) -> Self {
        self.properties = self.properties.with_initiator(Arc::new(initiator));
        self
    }

    #[inline]
    pub fn key_formatter(mut self, key_formatter: impl KeyFormatter + 'static) -> Self {
        self.properties = self.properties.with_key_formatter(Arc::new(key_formatter));
        self
    }

    #[inline]
    pub fn node_filter(mut self, node_filter: impl NodeFilter + 'static) -> Self {
        self.properties = self.properties.with_node_filter(Arc::new(node_filter));
        self
    }

    #[inline]
    pub fn error_handler(mut self, error_handler: impl ErrorHandler + 'static) -> Self {
        self.properties = self.properties.with_error_handler(Arc::new(error_handler));
        self
    }

    /// Like [`error_handler`](Self::error_handler), keeping a handle to it.
    #[inline]
    pub fn shared_error_handler(mut self, error_handler: Arc<dyn ErrorHandler>) -> Self {
        self.properties = self.properties.with_error_handler(error_handler);
        self
    }

    pub fn build(self) -> ConfigSerializer<F> {
        let properties = self.properties.with_registry(Arc::new(self.registry));
        ConfigSerializer::with_properties(self.format, properties)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::ConfigSerializer;
    use crate::config::{ConfigAdapter, ConfigFormat, MemoryConfigAdapter};
    use crate::derive::Config;
    use crate::error::{Error, ErrorType, FailingHandler, RecordingHandler};
    use crate::schema::KeyCase;
    use crate::tree::{Map, Value};
    use alloc::string::{String, ToString};
    use alloc::sync::Arc;
    use alloc::vec;
    use alloc::vec::Vec;

    /// `key=value` lines of scalars; refuses arrays and maps.
    struct Lines;

    struct LinesAdapter(MemoryConfigAdapter);

    impl ConfigAdapter for LinesAdapter {
        type Document = Map;

        fn document(&self) -> &Map {
            self.0.document()
        }

        fn into_document(self) -> Map {
            self.0.into_document()
        }

        fn load(&mut self, document: Map) {
            self.0.load(document);
        }

        fn keys(&self) -> Vec<String> {
            self.0.keys()
        }

        fn get(&self, key: &str) -> Option<Value> {
            self.0.get(key)
        }

        fn set(&mut self, key: &str, value: Value) -> Result<(), Error> {
            if matches!(value, Value::Array(_) | Value::Map(_)) {
                return Err(Error::UnsupportedShape {
                    format: "lines",
                    shape: value.shape(),
                    key: key.to_string(),
                });
            }
            self.0.set(key, value)
        }
    }

    impl ConfigFormat for Lines {
        type Adapter = LinesAdapter;

        fn name(&self) -> &'static str {
            "lines"
        }

        fn new_adapter(&self) -> LinesAdapter {
            LinesAdapter(MemoryConfigAdapter::new())
        }

        fn parse(&self, text: &str) -> Result<LinesAdapter, Error> {
            let mut adapter = self.new_adapter();
            for line in text.lines().filter(|line| !line.is_empty()) {
                let (key, value) = line.split_once('=').ok_or_else(|| {
                    Error::malformed("lines", format!("missing `=` in `{line}`"))
                })?;
                adapter.set(key, Value::from(value))?;
            }
            Ok(adapter)
        }

        fn render(&self, adapter: &LinesAdapter) -> Result<String, Error> {
            let mut text = String::new();
            for (key, value) in adapter.document().iter() {
                text.push_str(&format!("{key}={value}\n"));
            }
            Ok(text)
        }
    }

    #[derive(Config, Debug, PartialEq, Default)]
    #[config(default)]
    struct Settings {
        motd: String,
        max_players: u32,
        whitelist: Vec<String>,
    }

    fn settings() -> Settings {
        Settings {
            motd: "hello".into(),
            max_players: 20,
            whitelist: vec!["alex".into()],
        }
    }

    #[test]
    fn refused_shapes_are_reported() {
        let handler = Arc::new(RecordingHandler::new());
        let serializer = ConfigSerializer::builder(Lines)
            .shared_error_handler(handler.clone())
            .build();

        let text = serializer.to_string(&settings()).unwrap();
        assert!(text == "motd=hello\nmax_players=20\n");
        let entries = handler.take();
        assert!(entries.len() == 1);
        assert!(entries[0].ty == ErrorType::SerializerNotFound);

        // Numbers come back as text and are parsed by the number serializer.
        let back: Settings = serializer.from_str(&text).unwrap();
        assert!(back.max_players == 20);
        assert!(back.whitelist.is_empty());
        assert!(handler.count(ErrorType::KeyNotFound) == 1);
    }

    #[test]
    fn builder_properties() {
        let serializer = ConfigSerializer::builder(Lines)
            .key_formatter(KeyCase::Kebab)
            .error_handler(FailingHandler)
            .build();

        let text = serializer.to_string(&Settings::default());
        assert!(matches!(text, Err(Error::Aborted(_))));

        let back: Result<Settings, _> = serializer.from_str("motd=hi\nmax-players=3\nwhitelist=\n");
        assert!(matches!(back, Err(Error::Aborted(entry)) if entry.ty == ErrorType::MismatchedTypes));
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let builder = ConfigSerializer::builder(Lines)
            .add_serializer::<u32>(crate::serializer::NumberSerializer::<u32>::new())
            .unwrap();
        let err = builder
            .add_serializer::<u32>(crate::serializer::NumberSerializer::<u32>::new())
            .err()
            .unwrap();
        assert!(matches!(err, Error::DuplicateSerializer(_)));
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/dir/settings.txt");
        let serializer = ConfigSerializer::builder(Lines)
            .error_handler(|_: &crate::error::ErrorEntry| -> Result<(), Error> { Ok(()) })
            .build();

        serializer.save(&path, &settings()).unwrap();
        let back: Settings = serializer.load(&path).unwrap();
        assert!(back.motd == "hello");

        let missing = serializer.load::<Settings>(dir.path().join("missing.txt"));
        assert!(matches!(missing, Err(Error::Io(_))));
    }

    #[derive(Config, Debug)]
    #[config(record)]
    struct Required {
        name: String,
    }

    #[test]
    fn load_failure_is_terminal() {
        let serializer = ConfigSerializer::builder(Lines)
            .error_handler(crate::error::SuppressingHandler)
            .build();
        let result = serializer.from_str::<Required>("other=1\n");
        assert!(matches!(result, Err(Error::Load(_))));
    }
}
