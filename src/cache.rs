//! Instance caches
//!
//! Two stores, both lock-free `DashMap`s:
//!
//! - [`InstanceCache`] - per container, `name -> instance`, for scoped tokens
//!   built by that container.
//! - [`SingletonStore`] - one per container tree, owned by the root,
//!   `name@definingContainerId -> instance`.
//!
//! Presence is always tested with an explicit lookup, never by inspecting the
//! cached value, so a cached `()` short-circuits like anything else.

use crate::{ContainerId, Instance};
use ahash::RandomState;
use dashmap::DashMap;
use std::sync::Arc;

/// Shard count for the per-container caches. Containers typically hold few
/// tokens, the DashMap default of `num_cpus * 4` is overkill.
const CACHE_SHARDS: usize = 8;

fn new_map<K: Eq + std::hash::Hash>() -> DashMap<K, Instance, RandomState> {
    DashMap::with_capacity_and_hasher_and_shard_amount(0, RandomState::new(), CACHE_SHARDS)
}

/// Scoped instances built by one container.
pub(crate) struct InstanceCache {
    instances: DashMap<String, Instance, RandomState>,
}

impl InstanceCache {
    #[inline]
    pub(crate) fn new() -> Self {
        Self { instances: new_map() }
    }

    #[inline]
    pub(crate) fn get(&self, name: &str) -> Option<Instance> {
        self.instances.get(name).map(|entry| Arc::clone(entry.value()))
    }

    #[inline]
    pub(crate) fn contains(&self, name: &str) -> bool {
        self.instances.contains_key(name)
    }

    /// Store `instance` unless another build got there first; returns the
    /// instance that ends up cached.
    #[inline]
    pub(crate) fn insert_if_absent(&self, name: &str, instance: Instance) -> Instance {
        Arc::clone(self.instances.entry(name.to_owned()).or_insert(instance).value())
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.instances.len()
    }
}

/// Composite singleton key: token name plus the id of the container that
/// defines the token. Displays as `name@id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct SingletonKey {
    name: String,
    defined_in: ContainerId,
}

impl SingletonKey {
    #[inline]
    pub(crate) fn new(name: &str, defined_in: ContainerId) -> Self {
        Self {
            name: name.to_owned(),
            defined_in,
        }
    }
}

impl std::fmt::Display for SingletonKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.name, self.defined_in.id())
    }
}

/// Singleton instances for a whole container tree.
pub(crate) struct SingletonStore {
    instances: DashMap<SingletonKey, Instance, RandomState>,
}

impl SingletonStore {
    #[inline]
    pub(crate) fn new() -> Self {
        Self { instances: new_map() }
    }

    #[inline]
    pub(crate) fn get(&self, key: &SingletonKey) -> Option<Instance> {
        self.instances.get(key).map(|entry| Arc::clone(entry.value()))
    }

    /// Store `instance` unless another build got there first; returns the
    /// instance that ends up cached.
    #[inline]
    pub(crate) fn insert_if_absent(&self, key: SingletonKey, instance: Instance) -> Instance {
        Arc::clone(self.instances.entry(key).or_insert(instance).value())
    }

    /// Drop every singleton defined by `container`
    pub(crate) fn remove_defined_in(&self, container: ContainerId) {
        self.instances.retain(|key, _| key.defined_in != container);
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.instances.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_value_is_present() {
        let cache = InstanceCache::new();
        assert!(!cache.contains("unit"));

        cache.insert_if_absent("unit", Arc::new(()));
        assert!(cache.contains("unit"));
        assert!(cache.get("unit").is_some());
    }

    #[test]
    fn test_insert_if_absent_keeps_first() {
        let cache = InstanceCache::new();
        let first = cache.insert_if_absent("n", Arc::new(1u32));
        let second = cache.insert_if_absent("n", Arc::new(2u32));

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(*second.downcast::<u32>().unwrap(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_singleton_keys_disambiguate_defining_container() {
        let store = SingletonStore::new();
        let a = SingletonKey::new("db", ContainerId::new(1));
        let b = SingletonKey::new("db", ContainerId::new(2));

        assert_eq!(a.to_string(), "db@1");

        store.insert_if_absent(a.clone(), Arc::new("one"));
        assert!(store.get(&a).is_some());
        assert!(store.get(&b).is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_remove_defined_in_keeps_other_containers() {
        let store = SingletonStore::new();
        let kept = SingletonKey::new("db", ContainerId::new(0));
        store.insert_if_absent(kept.clone(), Arc::new(0u8));
        store.insert_if_absent(SingletonKey::new("db", ContainerId::new(3)), Arc::new(3u8));
        store.insert_if_absent(SingletonKey::new("cache", ContainerId::new(3)), Arc::new(3u8));

        store.remove_defined_in(ContainerId::new(3));

        assert_eq!(store.len(), 1);
        assert!(store.get(&kept).is_some());
    }
}
