use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::builder::new_builder;
use crate::error::{Error, ErrorContainer, ErrorEntry};
use crate::hash::HashMap;
use crate::info::Typed;
use crate::schema::{ConfigNode, Configuration, Member, format_key};
use crate::serializer::{NewSerializer, Serializer, SerializerContext};
use crate::tree::{DataVisitor, Value};

/// Converts a structured type member by member.
///
/// Writing produces a map keyed by the formatted member keys, with the
/// member comments attached. Reading consumes such a map, reports missing
/// and unexpected keys through the error handler, and hands the converted
/// members to an instance builder.
///
/// # Examples
///
/// ```
/// use vc_bind::config::ConfigurationSerializer;
/// use vc_bind::derive::Config;
/// use vc_bind::error::ErrorContainer;
/// use vc_bind::serializer::{SerializerContext, deserialize_from_value, serialize_to_value};
/// use vc_bind::tree::Value;
///
/// #[derive(Config, Debug, PartialEq)]
/// #[config(record, key_format = "kebab")]
/// struct Limits {
///     max_players: u32,
///     #[config(comment = "Seconds.")]
///     idle_timeout: Option<u64>,
/// }
///
/// let ctx = SerializerContext::default();
/// let serializer = ConfigurationSerializer::<Limits>::new(&ctx).unwrap();
/// let mut errors = ErrorContainer::new();
///
/// let limits = Limits { max_players: 20, idle_timeout: Some(300) };
/// let value = serialize_to_value::<Limits>(Some(&serializer), &limits, &mut errors).unwrap().unwrap();
/// let map = value.as_map().unwrap();
/// assert_eq!(map.get("max-players"), Some(&Value::from(20)));
/// assert_eq!(map.comments("idle-timeout").unwrap().lines, [Some("Seconds.".to_string())]);
///
/// let back = deserialize_from_value::<Limits>(Some(&serializer), &value, &mut errors).unwrap();
/// assert_eq!(back, Some(limits));
/// assert!(errors.is_empty());
/// ```
pub struct ConfigurationSerializer<S: 'static> {
    ctx: SerializerContext,
    nodes: Vec<ConfigNode<S>>,
}

impl<S: Configuration> ConfigurationSerializer<S> {
    /// Resolves the serializers of every member the node filter admits.
    ///
    /// Fails with [`Error::DuplicateKey`] if two admitted members format to
    /// the same key.
    pub fn new(ctx: &SerializerContext) -> Result<Self, Error> {
        let schema = S::schema();
        let properties = ctx.properties();
        let mut nodes = Vec::with_capacity(schema.members().len());
        let mut owners: HashMap<String, &'static str> = HashMap::default();
        for member in schema.members() {
            let member: &'static dyn Member<S> = &**member;
            let info = member.info();
            if !properties.node_filter().include(info) {
                continue;
            }
            let key = format_key(info, schema.key_format(), properties.key_formatter());
            if let Some(first) = owners.insert(key.clone(), info.name()) {
                return Err(Error::DuplicateKey {
                    ty: S::type_info().path(),
                    key,
                    first,
                    second: info.name(),
                });
            }
            let codec = member.resolve(&ctx.with_node(info))?;
            nodes.push(ConfigNode::new(member, key, codec));
        }
        Ok(Self {
            ctx: ctx.clone(),
            nodes,
        })
    }

    #[inline]
    pub fn nodes(&self) -> &[ConfigNode<S>] {
        &self.nodes
    }
}

impl<S: Configuration> NewSerializer<S> for ConfigurationSerializer<S> {
    #[inline]
    fn new_serializer(ctx: &SerializerContext) -> Result<Self, Error> {
        Self::new(ctx)
    }
}

impl<S: Configuration> Serializer<S> for ConfigurationSerializer<S> {
    fn serialize(
        &self,
        value: &S,
        visitor: &mut DataVisitor,
        _errors: &mut ErrorContainer,
    ) -> Result<(), Error> {
        visitor.enter_section()?;
        for node in &self.nodes {
            let info = node.info();
            let mut errors = ErrorContainer::new();
            match node.codec().write(value, &mut errors)? {
                None => errors.report(ErrorEntry::cannot_serialize(info.ty().name())),
                Some(Value::Null) if info.is_hidden() => {}
                Some(primitive) => {
                    visitor.visit(node.key())?.write_value(primitive)?;
                    let comments = node.comments();
                    if !comments.is_empty() {
                        visitor.set_comments(comments)?;
                    }
                }
            }
            self.ctx.drain(&mut errors)?;
        }
        visitor.exit_section()?;
        Ok(())
    }

    fn deserialize(
        &self,
        visitor: &mut DataVisitor,
        errors: &mut ErrorContainer,
    ) -> Result<Option<S>, Error> {
        let Some(map) = visitor.read_map()? else {
            return Ok(None);
        };
        let mut unhandled: Vec<String> = map.keys().map(String::from).collect();
        let mut builder = new_builder::<S>(self.ctx.properties().initiator().clone());

        visitor.enter_section()?;
        for node in &self.nodes {
            let info = node.info();
            unhandled.retain(|key| key != node.key());

            let Some(value) = visitor.visit(node.key())?.read_value()?.cloned() else {
                if !info.is_optional() {
                    self.ctx.handle(&ErrorEntry::key_not_found(node.key()))?;
                }
                continue;
            };
            if !node.codec().can_read(&value) {
                self.ctx.handle(&ErrorEntry::cannot_deserialize(info.ty().name()))?;
                continue;
            }

            let mut member_errors = ErrorContainer::new();
            let component = node.codec().read(&value, &mut member_errors)?;
            self.ctx.drain(&mut member_errors)?;
            if let Some(component) = component {
                builder.set_component(info.name(), component)?;
            }
        }
        visitor.exit_section()?;

        for key in &unhandled {
            self.ctx.handle(&ErrorEntry::unexpected_key(key))?;
        }

        let instance = builder.build();
        if instance.is_none() {
            errors.report(ErrorEntry::cannot_construct(S::type_info().name()));
        }
        Ok(instance)
    }
}

impl<S: Configuration> fmt::Debug for ConfigurationSerializer<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigurationSerializer")
            .field("type", &S::type_info().path())
            .field("nodes", &self.nodes)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::ConfigurationSerializer;
    use crate::config::ConfigProperties;
    use crate::derive::{Config, ConfigEnum};
    use crate::error::{Error, ErrorContainer, ErrorType, RecordingHandler};
    use crate::schema::{KeyCase, MemberInfo};
    use crate::serializer::{Serializer, SerializerContext, SerializerRegistry};
    use crate::serializer::{deserialize_from_value, serialize_to_value};
    use crate::tree::{Map, Value};
    use alloc::collections::{BTreeMap, BTreeSet};
    use alloc::string::{String, ToString};
    use alloc::sync::Arc;
    use alloc::vec;
    use alloc::vec::Vec;

    #[derive(ConfigEnum, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
    enum Mode {
        Survival,
        Creative,
    }

    #[derive(Config, Debug, Clone, PartialEq)]
    #[config(record)]
    struct Address {
        host: String,
        port: u16,
    }

    #[derive(Config, Debug, PartialEq, Default)]
    #[config(default)]
    struct Server {
        #[config(comment = "Display name", comment = "")]
        name: String,
        #[config(inline_comment = "seconds")]
        timeout: u32,
        ports: Vec<u16>,
        tags: BTreeSet<String>,
        mode: Option<Mode>,
        limits: BTreeMap<Mode, u8>,
        address: Option<Address>,
        #[config(hidden)]
        secret: Option<String>,
        #[config(ignore)]
        cache: u8,
        #[config(skip)]
        runtime: u64,
    }

    #[derive(Config, Debug, PartialEq, Default)]
    #[config(default, key_format = "kebab")]
    struct Player {
        display_name: String,
        #[config(key_format = "upper_snake")]
        max_health: u8,
        #[config(key = "lvl")]
        level: u32,
        #[config(optional)]
        guild_name: String,
    }

    #[derive(Config, Debug, PartialEq, Default)]
    #[config(default)]
    struct Lobby {
        #[config(extends)]
        server: Server,
        #[config(comment = "Shadows the parent")]
        name: String,
        capacity: u16,
    }

    #[derive(Config, Debug, PartialEq, Default)]
    #[config(default, key_format = "camel")]
    struct Clash {
        server_port: u16,
        #[config(key = "serverPort")]
        legacy_port: u16,
    }

    #[derive(Config, Debug, PartialEq)]
    #[config(record)]
    struct Strict {
        id: String,
    }

    #[derive(Config, Debug, PartialEq, Default)]
    #[config(default)]
    struct Holder {
        strict: Option<Strict>,
        other: u8,
    }

    fn context() -> (SerializerContext, Arc<RecordingHandler>) {
        let handler = Arc::new(RecordingHandler::new());
        let properties = ConfigProperties::default().with_error_handler(handler.clone());
        (SerializerContext::new(Arc::new(properties)), handler)
    }

    fn write<S: crate::schema::Configuration>(ctx: &SerializerContext, value: &S) -> Map {
        let serializer = ConfigurationSerializer::<S>::new(ctx).unwrap();
        let mut errors = ErrorContainer::new();
        let value = serialize_to_value::<S>(Some(&serializer), value, &mut errors).unwrap();
        assert!(errors.is_empty());
        match value {
            Some(Value::Map(map)) => map,
            other => panic!("expected a map, got {other:?}"),
        }
    }

    fn read<S: crate::schema::Configuration>(
        ctx: &SerializerContext,
        map: Map,
        errors: &mut ErrorContainer,
    ) -> Option<S> {
        let serializer = ConfigurationSerializer::<S>::new(ctx).unwrap();
        deserialize_from_value::<S>(Some(&serializer), &Value::Map(map), errors).unwrap()
    }

    fn server() -> Server {
        Server {
            name: "lobby".into(),
            timeout: 30,
            ports: vec![1, 2, 3],
            tags: ["a".to_string(), "b".to_string()].into_iter().collect(),
            mode: Some(Mode::Creative),
            limits: [(Mode::Survival, 20)].into_iter().collect(),
            address: Some(Address {
                host: "localhost".into(),
                port: 25565,
            }),
            secret: None,
            cache: 0,
            runtime: 0,
        }
    }

    #[test]
    fn round_trip() {
        let (ctx, handler) = context();
        let map = write(&ctx, &server());

        let mut errors = ErrorContainer::new();
        let back: Server = read(&ctx, map, &mut errors).unwrap();
        assert!(back == server());
        assert!(errors.is_empty());
        assert!(handler.len() == 0);
    }

    #[test]
    fn written_shape() {
        let (ctx, _) = context();
        let map = write(&ctx, &server());

        let keys: Vec<_> = map.keys().collect();
        assert!(keys == ["name", "timeout", "ports", "tags", "mode", "limits", "address"]);
        assert!(map.get("ports") == Some(&Value::Array(vec![1.into(), 2.into(), 3.into()])));
        assert!(map.get("mode") == Some(&Value::from("creative")));
        let limits = map.get("limits").unwrap().as_map().unwrap();
        assert!(limits.get("survival") == Some(&Value::from(20)));
        let address = map.get("address").unwrap().as_map().unwrap();
        assert!(address.get("port") == Some(&Value::from(25565)));

        let name = map.comments("name").unwrap();
        assert!(name.lines == [Some("Display name".to_string()), None]);
        assert!(map.comments("timeout").unwrap().inline.as_deref() == Some("seconds"));
    }

    #[test]
    fn hidden_value_is_written_when_present() {
        let (ctx, _) = context();
        let mut server = server();
        server.secret = Some("hunter2".into());
        let map = write(&ctx, &server);
        assert!(map.get("secret") == Some(&Value::from("hunter2")));
    }

    #[test]
    fn optional_and_required_absence() {
        let (ctx, handler) = context();
        let mut map = write(&ctx, &server());
        map.remove("mode");
        map.remove("address");

        let mut errors = ErrorContainer::new();
        let back: Server = read(&ctx, map.clone(), &mut errors).unwrap();
        assert!(back.mode.is_none() && back.address.is_none());
        assert!(handler.len() == 0);

        map.remove("timeout");
        let back: Server = read(&ctx, map, &mut errors).unwrap();
        assert!(back.timeout == 0);
        let entries = handler.take();
        assert!(entries.len() == 1);
        assert!(entries[0].ty == ErrorType::KeyNotFound);
        assert!(entries[0].message == "Required key 'timeout' is missing");
    }

    #[test]
    fn unexpected_key_is_advisory() {
        let (ctx, handler) = context();
        let mut map = write(&ctx, &server());
        map.insert("motd", "hi");
        map.insert("cache", 9);

        let mut errors = ErrorContainer::new();
        let back: Server = read(&ctx, map, &mut errors).unwrap();
        assert!(back == server());
        assert!(handler.count(ErrorType::UnexpectedKey) == 2);
        assert!(handler.len() == 2);
    }

    #[test]
    fn list_into_set() {
        let (ctx, _) = context();
        let mut map = write(&ctx, &server());
        map.insert("tags", Value::Array(vec!["z".into(), "y".into(), "z".into()]));

        let mut errors = ErrorContainer::new();
        let back: Server = read(&ctx, map, &mut errors).unwrap();
        assert!(back.tags.into_iter().collect::<Vec<_>>() == ["y", "z"]);
    }

    #[test]
    fn bad_member_is_reported_and_left_unset() {
        let (ctx, handler) = context();
        let mut map = write(&ctx, &server());
        map.insert("mode", "bogus");
        map.insert("timeout", "soon");

        let mut errors = ErrorContainer::new();
        let back: Server = read(&ctx, map, &mut errors).unwrap();
        assert!(back.mode.is_none());
        assert!(back.timeout == 0);
        assert!(handler.count(ErrorType::Custom) == 2);
        assert!(
            handler
                .entries()
                .iter()
                .any(|e| e.message == "No enum constant Mode.bogus")
        );
    }

    #[test]
    fn key_formats() {
        let (ctx, recorded) = context();
        let player = Player {
            display_name: "Steve".into(),
            max_health: 20,
            level: 3,
            guild_name: String::new(),
        };
        let map = write(&ctx, &player);
        let keys: Vec<_> = map.keys().collect();
        assert!(keys == ["display-name", "MAX_HEALTH", "lvl", "guild-name"]);

        let handler = Arc::new(RecordingHandler::new());
        let properties = ConfigProperties::default()
            .with_key_formatter(Arc::new(KeyCase::Pascal))
            .with_error_handler(handler.clone());
        let pascal = SerializerContext::new(Arc::new(properties));
        let map = write(&pascal, &server());
        assert!(map.keys().next() == Some("Name"));

        let mut map = write(&ctx, &player);
        map.remove("guild-name");
        let mut errors = ErrorContainer::new();
        let back: Player = read(&ctx, map, &mut errors).unwrap();
        assert!(back == player);
        assert!(recorded.len() == 0);
    }

    #[test]
    fn parent_members_are_flattened() {
        let (ctx, handler) = context();
        let lobby = Lobby {
            server: server(),
            name: "main".into(),
            capacity: 64,
        };
        let map = write(&ctx, &lobby);
        let keys: Vec<_> = map.keys().collect();
        assert!(keys[0] == "name" && keys[keys.len() - 1] == "capacity");
        assert!(map.get("name") == Some(&Value::from("main")));
        assert!(map.comments("name").unwrap().lines == [Some("Shadows the parent".to_string())]);

        let mut errors = ErrorContainer::new();
        let back: Lobby = read(&ctx, map, &mut errors).unwrap();
        assert!(back.name == "main");
        assert!(back.server.name.is_empty());
        assert!(back.server.ports == [1, 2, 3]);
        assert!(back.capacity == 64);
        assert!(handler.len() == 0);
    }

    #[test]
    fn node_filter() {
        let properties = ConfigProperties::default()
            .with_node_filter(Arc::new(|info: &MemberInfo| info.name() != "timeout"));
        let ctx = SerializerContext::new(Arc::new(properties));
        let map = write(&ctx, &server());
        assert!(!map.contains_key("timeout"));
        assert!(!map.contains_key("cache"));

        let everything = ConfigProperties::default().with_node_filter(Arc::new(|_: &MemberInfo| true));
        let map = write(&SerializerContext::new(Arc::new(everything)), &server());
        assert!(map.contains_key("cache"));
        assert!(!map.contains_key("runtime"));
    }

    #[test]
    fn nested_build_failure_is_reported_at_parent() {
        let (ctx, handler) = context();
        let mut map = Map::new();
        map.insert("strict", Map::new());
        map.insert("other", 4);

        let mut errors = ErrorContainer::new();
        let back: Holder = read(&ctx, map, &mut errors).unwrap();
        assert!(back == Holder { strict: None, other: 4 });

        let entries = handler.take();
        assert!(entries.len() == 2);
        assert!(entries[0].ty == ErrorType::KeyNotFound);
        assert!(entries[1].ty == ErrorType::SerializerNotFound);
        assert!(entries[1].message == "Could not construct an instance of 'Strict'");
    }

    #[test]
    fn members_sharing_a_key_are_rejected() {
        let (ctx, _) = context();
        let err = ConfigurationSerializer::<Clash>::new(&ctx).err().unwrap();
        match err {
            Error::DuplicateKey { key, first, second, .. } => {
                assert!(key == "serverPort");
                assert!(first == "server_port");
                assert!(second == "legacy_port");
            }
            other => panic!("unexpected error: {other}"),
        }

        let filtered = ConfigProperties::default()
            .with_node_filter(Arc::new(|info: &MemberInfo| info.name() != "legacy_port"));
        assert!(ConfigurationSerializer::<Clash>::new(&SerializerContext::new(Arc::new(filtered))).is_ok());
    }

    #[test]
    fn not_a_map() {
        let (ctx, _) = context();
        let serializer = ConfigurationSerializer::<Server>::new(&ctx).unwrap();
        let mut errors = ErrorContainer::new();
        let back = deserialize_from_value::<Server>(Some(&serializer), &Value::from(3), &mut errors).unwrap();
        assert!(back.is_none());
        assert!(errors.entries()[0].ty == ErrorType::MismatchedTypes);
    }

    #[test]
    fn registered_serializer_wins_over_synthesis() {
        let mut registry = SerializerRegistry::new();
        registry
            .add_factory::<Address>(|ctx| {
                let serializer: Arc<dyn Serializer<Address>> = Arc::new(ConfigurationSerializer::<Address>::new(ctx)?);
                Ok(serializer)
            })
            .unwrap();
        let ctx = SerializerContext::new(Arc::new(ConfigProperties::new(Arc::new(registry))));
        assert!(ctx.registry().contains::<Address>());
        let map = write(&ctx, &server());
        assert!(map.get("address").unwrap().as_map().is_some());
    }
}
