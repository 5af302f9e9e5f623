use alloc::boxed::Box;
use core::any::{Any, TypeId};

use crate::hash::TypeIdMap;
use crate::info::{TypeInfo, Typed};

/// Produces blank instances of structured types.
pub trait ClassInitiator: Send + Sync {
    /// A new instance of the type `ty` describes, boxed.
    ///
    /// `None` if the type cannot be instantiated without data.
    fn instantiate(&self, ty: &'static TypeInfo) -> Option<Box<dyn Any>>;
}

/// Instantiates types through their recorded `Default` impl.
///
/// Types derive it with `#[config(default)]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultInitiator;

impl ClassInitiator for DefaultInitiator {
    #[inline]
    fn instantiate(&self, ty: &'static TypeInfo) -> Option<Box<dyn Any>> {
        ty.as_struct()?.default_instance()
    }
}

type Factory = Box<dyn Fn() -> Box<dyn Any> + Send + Sync>;

/// Instantiates types through caller-supplied constructors.
///
/// Types without one fall back to [`DefaultInitiator`].
///
/// # Examples
///
/// ```
/// use vc_bind::builder::{ClassInitiator, FactoryInitiator};
/// use vc_bind::info::Typed;
///
/// let initiator = FactoryInitiator::new().with(|| 42u32);
///
/// let value = initiator.instantiate(u32::type_info()).unwrap();
/// assert_eq!(value.downcast_ref::<u32>(), Some(&42));
/// assert!(initiator.instantiate(u8::type_info()).is_none());
/// ```
#[derive(Default)]
pub struct FactoryInitiator {
    factories: TypeIdMap<Factory>,
}

impl FactoryInitiator {
    #[inline]
    pub const fn new() -> Self {
        Self {
            factories: TypeIdMap::new(),
        }
    }

    /// Uses `factory` for `T`, replacing a previous factory.
    pub fn with<T: Typed>(mut self, factory: impl Fn() -> T + Send + Sync + 'static) -> Self {
        self.factories.insert(
            TypeId::of::<T>(),
            Box::new(move || Box::new(factory()) as Box<dyn Any>),
        );
        self
    }
}

impl ClassInitiator for FactoryInitiator {
    fn instantiate(&self, ty: &'static TypeInfo) -> Option<Box<dyn Any>> {
        match self.factories.get(&ty.id()) {
            Some(factory) => Some(factory()),
            None => DefaultInitiator.instantiate(ty),
        }
    }
}
