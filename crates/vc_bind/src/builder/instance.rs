use alloc::boxed::Box;
use alloc::string::ToString;
use alloc::sync::Arc;
use core::any::Any;

use crate::builder::{ClassInitiator, Components};
use crate::error::Error;
use crate::info::Typed;
use crate::schema::{Configuration, Member, Schema, SchemaKind};

/// Accumulates the components of one instance of `S`.
pub trait InstanceBuilder<S> {
    /// Stores the value of the member `name`.
    ///
    /// Fails if `S` has no such member or `value` is not of its type.
    fn set_component(&mut self, name: &str, value: Box<dyn Any>) -> Result<(), Error>;

    /// The stored value of the member `name`.
    ///
    /// Fails if `S` has no such member.
    fn component(&self, name: &str) -> Result<Option<&dyn Any>, Error>;

    /// Produces the instance, or `None` if it cannot be constructed.
    fn build(self: Box<Self>) -> Option<S>;
}

/// Creates the builder matching the kind of `S`.
pub fn new_builder<S: Configuration>(initiator: Arc<dyn ClassInitiator>) -> Box<dyn InstanceBuilder<S>> {
    let schema = S::schema();
    match schema.kind() {
        SchemaKind::Record {
            construct,
            decompose,
        } => Box::new(RecordBuilder {
            schema,
            construct: *construct,
            decompose: *decompose,
            components: Components::new(),
        }),
        SchemaKind::Object => Box::new(ObjectBuilder {
            schema,
            initiator,
            components: Components::new(),
        }),
    }
}

fn validate<'a, S: Configuration>(
    schema: &'a Schema<S>,
    name: &str,
) -> Result<&'a dyn Member<S>, Error> {
    schema
        .member_named(name)
        .ok_or_else(|| Error::UnknownComponent {
            ty: S::type_info().path(),
            name: name.to_string(),
        })
}

fn store<S: Configuration>(
    schema: &'static Schema<S>,
    components: &mut Components,
    name: &str,
    value: Box<dyn Any>,
) -> Result<(), Error> {
    let member = validate(schema, name)?;
    let info = member.info();
    if (*value).type_id() != info.ty().id() {
        return Err(Error::ComponentType {
            ty: S::type_info().path(),
            name: name.to_string(),
            expected: info.ty().path(),
        });
    }
    components.insert(info.name(), value);
    Ok(())
}

// -----------------------------------------------------------------------------
// RecordBuilder

/// Builds a record-like type from all of its components at once.
///
/// A component that was never set is taken from the type's default
/// instance, or else from the zero value of its type. Without either it
/// stays missing, and construction fails unless the constructor copes.
pub struct RecordBuilder<S: 'static> {
    schema: &'static Schema<S>,
    construct: fn(&mut Components) -> Option<S>,
    decompose: fn(S) -> Components,
    components: Components,
}

impl<S: Configuration> RecordBuilder<S> {
    fn default_components(&self) -> Option<Components> {
        let instance = S::type_info().as_struct()?.default_instance()?;
        let instance = instance.downcast::<S>().ok()?;
        Some((self.decompose)(*instance))
    }
}

impl<S: Configuration> InstanceBuilder<S> for RecordBuilder<S> {
    #[inline]
    fn set_component(&mut self, name: &str, value: Box<dyn Any>) -> Result<(), Error> {
        store(self.schema, &mut self.components, name, value)
    }

    fn component(&self, name: &str) -> Result<Option<&dyn Any>, Error> {
        validate(self.schema, name)?;
        Ok(self.components.get_any(name))
    }

    fn build(mut self: Box<Self>) -> Option<S> {
        let schema = self.schema;
        let mut defaults: Option<Option<Components>> = None;
        for member in schema.members() {
            let name = member.info().name();
            if self.components.contains(name) {
                continue;
            }
            let fallback = defaults
                .get_or_insert_with(|| self.default_components())
                .as_mut()
                .and_then(|defaults| defaults.take_any(name))
                .or_else(|| member.zero());
            match fallback {
                Some(value) => self.components.insert(name, value),
                None => log::debug!("component `{name}` of `{}` has no fallback", S::type_info()),
            }
        }
        (self.construct)(&mut self.components)
    }
}

// -----------------------------------------------------------------------------
// ObjectBuilder

/// Builds a mutable type by assigning components onto a blank instance.
///
/// The blank instance comes from the [`ClassInitiator`]; inherited members
/// are assigned onto the embedded parent.
pub struct ObjectBuilder<S: 'static> {
    schema: &'static Schema<S>,
    initiator: Arc<dyn ClassInitiator>,
    components: Components,
}

impl<S: Configuration> InstanceBuilder<S> for ObjectBuilder<S> {
    #[inline]
    fn set_component(&mut self, name: &str, value: Box<dyn Any>) -> Result<(), Error> {
        store(self.schema, &mut self.components, name, value)
    }

    fn component(&self, name: &str) -> Result<Option<&dyn Any>, Error> {
        validate(self.schema, name)?;
        Ok(self.components.get_any(name))
    }

    fn build(self: Box<Self>) -> Option<S> {
        let Self {
            schema,
            initiator,
            components,
        } = *self;
        let Ok(instance) = initiator.instantiate(S::type_info())?.downcast::<S>() else {
            log::debug!("initiator produced an instance of the wrong type for `{}`", S::type_info());
            return None;
        };
        let mut instance = *instance;
        for (name, value) in components {
            let Some(member) = schema.member_named(name) else {
                continue;
            };
            if member.assign(&mut instance, value).is_err() {
                log::debug!("could not assign component `{name}` of `{}`", S::type_info());
            }
        }
        Some(instance)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::new_builder;
    use crate::builder::{DefaultInitiator, FactoryInitiator};
    use crate::derive::Config;
    use crate::error::Error;
    use alloc::boxed::Box;
    use alloc::string::String;
    use alloc::sync::Arc;

    #[derive(Config, Debug, PartialEq)]
    #[config(record)]
    struct Point {
        x: i32,
        y: i32,
        label: String,
    }

    #[derive(Config, Debug, PartialEq)]
    #[config(record, default)]
    struct Window {
        width: u32,
        title: String,
    }

    impl Default for Window {
        fn default() -> Self {
            Self {
                width: 640,
                title: "main".into(),
            }
        }
    }

    #[derive(Config, Debug, PartialEq, Default)]
    #[config(default)]
    struct Server {
        host: String,
        port: u16,
    }

    #[derive(Config)]
    struct Bare {
        flag: bool,
    }

    #[test]
    fn record_uses_zero_values() {
        let mut builder = new_builder::<Point>(Arc::new(DefaultInitiator));
        builder.set_component("x", Box::new(3i32)).unwrap();
        assert!(builder.component("x").unwrap().unwrap().downcast_ref::<i32>() == Some(&3));
        assert!(builder.component("y").unwrap().is_none());
        // `String` has no zero value
        assert!(builder.build().is_none());

        let mut builder = new_builder::<Point>(Arc::new(DefaultInitiator));
        builder.set_component("x", Box::new(3i32)).unwrap();
        builder.set_component("label", Box::new(String::from("a"))).unwrap();
        let point = builder.build().unwrap();
        assert!(point == Point { x: 3, y: 0, label: "a".into() });
    }

    #[test]
    fn record_falls_back_to_default_instance() {
        let mut builder = new_builder::<Window>(Arc::new(DefaultInitiator));
        builder.set_component("width", Box::new(800u32)).unwrap();
        let window = builder.build().unwrap();
        assert!(window == Window { width: 800, title: "main".into() });
    }

    #[test]
    fn rejects_unknown_and_mistyped_components() {
        let mut builder = new_builder::<Point>(Arc::new(DefaultInitiator));
        assert!(matches!(
            builder.set_component("z", Box::new(1i32)),
            Err(Error::UnknownComponent { .. })
        ));
        assert!(matches!(
            builder.set_component("x", Box::new(1i64)),
            Err(Error::ComponentType { expected: "i32", .. })
        ));
        assert!(matches!(builder.component("z"), Err(Error::UnknownComponent { .. })));
    }

    #[test]
    fn object_assigns_onto_initiated_instance() {
        let mut builder = new_builder::<Server>(Arc::new(DefaultInitiator));
        builder.set_component("port", Box::new(25565u16)).unwrap();
        assert!(builder.build().unwrap() == Server { host: String::new(), port: 25565 });

        let initiator = FactoryInitiator::new().with(|| Server {
            host: "localhost".into(),
            port: 1,
        });
        let mut builder = new_builder::<Server>(Arc::new(initiator));
        builder.set_component("port", Box::new(80u16)).unwrap();
        assert!(builder.build().unwrap() == Server { host: "localhost".into(), port: 80 });
    }

    #[test]
    fn object_without_initiator_fails() {
        let builder = new_builder::<Bare>(Arc::new(DefaultInitiator));
        assert!(builder.build().is_none());
    }
}
