use alloc::boxed::Box;
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;

/// Named, type-erased values collected while building one instance.
///
/// Keeps insertion order; inserting an existing name replaces its value.
///
/// # Examples
///
/// ```
/// use vc_bind::builder::Components;
///
/// let mut components = Components::new();
/// components.insert("port", Box::new(8080u16));
///
/// assert_eq!(components.get::<u16>("port"), Some(&8080));
/// assert_eq!(components.take::<String>("port"), None);
/// assert_eq!(components.take::<u16>("port"), Some(8080));
/// assert!(components.is_empty());
/// ```
#[derive(Default)]
pub struct Components {
    entries: Vec<(&'static str, Box<dyn Any>)>,
}

impl Components {
    #[inline]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|(n, _)| *n == name)
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Inserts or replaces the value of `name`.
    pub fn insert(&mut self, name: &'static str, value: Box<dyn Any>) {
        match self.position(name) {
            Some(index) => self.entries[index].1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get_any(&self, name: &str) -> Option<&dyn Any> {
        self.position(name).map(|index| &*self.entries[index].1)
    }

    #[inline]
    pub fn get<F: Any>(&self, name: &str) -> Option<&F> {
        self.get_any(name)?.downcast_ref()
    }

    /// Removes the value of `name`, whatever its type.
    pub fn take_any(&mut self, name: &str) -> Option<Box<dyn Any>> {
        self.position(name)
            .map(|index| self.entries.remove(index).1)
    }

    /// Removes the value of `name` if it is an `F`.
    ///
    /// A value of another type stays in place.
    pub fn take<F: Any>(&mut self, name: &str) -> Option<F> {
        let index = self.position(name)?;
        if !self.entries[index].1.is::<F>() {
            return None;
        }
        let (_, value) = self.entries.remove(index);
        value.downcast::<F>().ok().map(|value| *value)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(name, _)| *name)
    }
}

impl IntoIterator for Components {
    type Item = (&'static str, Box<dyn Any>);
    type IntoIter = alloc::vec::IntoIter<(&'static str, Box<dyn Any>)>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl fmt::Debug for Components {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

// -----------------------------------------------------------------------------
// Tests
