//! Factory types for creating instances
//!
//! A token's target is either a constructible type (see [`Construct`]) or a
//! [`Factory`] closure. Both are type-erased into a [`Target`] so the engine
//! can build them uniformly and index them by a stable [`TargetKey`].

use crate::{Construct, Injectable, Instance, Instances, Result};
use std::any::TypeId;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

#[cfg(feature = "logging")]
use tracing::trace;

/// Type-erased build function
pub(crate) type BuildFn = Arc<dyn Fn(&Instances<'_>) -> Result<Instance> + Send + Sync>;

/// Opaque identity of a [`Factory`].
///
/// Assigned once when the factory is created; clones share it. Two factories
/// built from identical closures still get distinct ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FactoryId(u64);

impl FactoryId {
    fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    #[inline]
    pub fn id(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for FactoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "factory-{}", self.0)
    }
}

// =============================================================================
// Factory
// =============================================================================

/// A factory function producing instances of `T` from an [`Instances`] view.
///
/// A factory can be registered as a token and also used as a resolution
/// reference: resolving a registered factory returns the same instance as
/// resolving its token name, an unregistered one builds a fresh instance.
///
/// # Examples
///
/// ```rust
/// use token_injector::{Container, Factory, Tokens};
///
/// struct Counter { count: u32 }
///
/// let counter = Factory::new(|_| Ok(Counter { count: 0 }));
/// let container = Container::create(Tokens::new().add("counter", counter.clone())).unwrap();
///
/// let by_name = container.get::<Counter>("counter").unwrap();
/// let by_ref = container.get_factory(&counter).unwrap();
/// assert!(std::sync::Arc::ptr_eq(&by_name, &by_ref));
/// ```
pub struct Factory<T> {
    id: FactoryId,
    build: Arc<dyn Fn(&Instances<'_>) -> Result<T> + Send + Sync>,
}

impl<T: Injectable> Factory<T> {
    /// Create a new factory with a fresh identity
    pub fn new<F>(build: F) -> Self
    where
        F: Fn(&Instances<'_>) -> Result<T> + Send + Sync + 'static,
    {
        Self {
            id: FactoryId::next(),
            build: Arc::new(build),
        }
    }

    /// The identity used to find this factory's registration
    #[inline]
    pub fn id(&self) -> FactoryId {
        self.id
    }

    /// Run the factory without involving any cache
    #[inline]
    pub fn build(&self, instances: &Instances<'_>) -> Result<T> {
        (self.build)(instances)
    }

    pub(crate) fn target(&self) -> Target {
        let build = Arc::clone(&self.build);
        Target {
            key: TargetKey::Factory(self.id),
            type_name: std::any::type_name::<T>(),
            build: Arc::new(move |instances| Ok(Arc::new(build(instances)?) as Instance)),
        }
    }
}

impl<T> Clone for Factory<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            build: Arc::clone(&self.build),
        }
    }
}

impl<T> std::fmt::Debug for Factory<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Factory")
            .field("id", &self.id)
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}

// =============================================================================
// Target - type-erased build strategy
// =============================================================================

/// Stable identity of a token target, used by the reverse index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKey {
    /// A constructible type
    Type(TypeId),
    /// A factory function
    Factory(FactoryId),
}

/// Type-erased build strategy of a token or resolution reference
#[derive(Clone)]
pub struct Target {
    key: TargetKey,
    type_name: &'static str,
    build: BuildFn,
}

impl Target {
    /// Target for a constructible type
    pub fn of_type<T: Construct>() -> Self {
        Self {
            key: TargetKey::Type(TypeId::of::<T>()),
            type_name: std::any::type_name::<T>(),
            build: Arc::new(|instances| Ok(Arc::new(T::construct(instances)?) as Instance)),
        }
    }

    /// Target building an already type-erased instance, with a fresh identity
    pub(crate) fn erased(type_name: &'static str, build: BuildFn) -> Self {
        Self {
            key: TargetKey::Factory(FactoryId::next()),
            type_name,
            build,
        }
    }

    #[inline]
    pub fn key(&self) -> TargetKey {
        self.key
    }

    /// Name of the built type, for diagnostics
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    #[inline]
    pub(crate) fn build(&self, instances: &Instances<'_>) -> Result<Instance> {
        #[cfg(feature = "logging")]
        trace!(
            target: "token_injector",
            target_type = self.type_name,
            container_id = instances.container_id(),
            "Invoking build target"
        );

        (self.build)(instances)
    }
}

impl<T: Injectable> From<&Factory<T>> for Target {
    fn from(factory: &Factory<T>) -> Self {
        factory.target()
    }
}

impl std::fmt::Debug for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Target")
            .field("key", &self.key)
            .field("type", &self.type_name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Container, Tokens};

    struct TestService {
        id: u32,
    }

    impl Construct for TestService {
        fn construct(_: &Instances<'_>) -> Result<Self> {
            Ok(TestService { id: 7 })
        }
    }

    #[test]
    fn test_factory_ids_unique() {
        let a = Factory::new(|_| Ok(TestService { id: 1 }));
        let b = Factory::new(|_| Ok(TestService { id: 1 }));

        assert_ne!(a.id(), b.id());
        assert_eq!(a.id(), a.clone().id());
    }

    #[test]
    fn test_factory_build_is_uncached() {
        let container = Container::create(Tokens::new()).unwrap();
        let factory = Factory::new(|_| Ok(TestService { id: 3 }));

        let instances = container.instances();
        assert_eq!(factory.build(&instances).unwrap().id, 3);
        assert_eq!(Target::from(&factory).key(), TargetKey::Factory(factory.id()));
    }

    #[test]
    fn test_type_target_builds_construct() {
        let container = Container::create(Tokens::new()).unwrap();
        let target = Target::of_type::<TestService>();

        assert_eq!(target.key(), TargetKey::Type(TypeId::of::<TestService>()));

        let built = target.build(&container.instances()).unwrap();
        assert_eq!(built.downcast::<TestService>().unwrap().id, 7);
    }

    #[test]
    fn test_erased_targets_get_fresh_identity() {
        let build: BuildFn = Arc::new(|_| Ok(Arc::new(1u8) as Instance));
        let a = Target::erased("u8", Arc::clone(&build));
        let b = Target::erased("u8", build);
        assert_ne!(a.key(), b.key());
    }
}
