//! The instance view handed to constructors and factories

use crate::{Construct, Container, Factory, Injectable, Instance, Resolvable, Result};
use std::sync::Arc;

/// Read-only, name-indexed view over everything a container can resolve.
///
/// Every read resolves through the container the view belongs to, which is
/// the container performing the current build. Overrides registered on that
/// container are therefore honored even when the token being built was
/// defined by an ancestor.
#[derive(Clone, Copy)]
pub struct Instances<'a> {
    container: &'a Container,
}

impl<'a> Instances<'a> {
    #[inline]
    pub(crate) fn new(container: &'a Container) -> Self {
        Self { container }
    }

    /// Resolve `name` and downcast it to `T`
    #[inline]
    pub fn get<T: Injectable>(&self, name: &str) -> Result<Arc<T>> {
        self.container.get::<T>(name)
    }

    /// Resolve `name` without downcasting
    #[inline]
    pub fn get_any(&self, name: &str) -> Result<Instance> {
        self.container.resolve_any(name)
    }

    /// Resolve `name` if any container in the chain registers it.
    ///
    /// Only a missing registration of `name` itself yields `None`; failures
    /// while building it are returned as errors.
    pub fn get_optional<T: Injectable>(&self, name: &str) -> Result<Option<Arc<T>>> {
        if !self.container.contains(name) {
            return Ok(None);
        }
        self.get::<T>(name).map(Some)
    }

    /// Resolve a constructible type (see [`Container::get_type`])
    #[inline]
    pub fn resolve_type<T: Construct>(&self) -> Result<Arc<T>> {
        self.container.get_type::<T>()
    }

    /// Resolve a factory reference (see [`Container::get_factory`])
    #[inline]
    pub fn resolve_factory<T: Injectable>(&self, factory: &Factory<T>) -> Result<Arc<T>> {
        self.container.get_factory(factory)
    }

    /// Resolve any reference
    #[inline]
    pub fn resolve_any(&self, reference: impl Into<Resolvable>) -> Result<Instance> {
        self.container.resolve_any(reference)
    }

    /// Whether `name` is registered on the container or an ancestor
    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.container.contains(name)
    }

    /// All resolvable names: local first, then each ancestor's, without
    /// duplicates.
    #[inline]
    pub fn keys(&self) -> Vec<String> {
        self.container.keys()
    }

    /// The container this view resolves through
    #[inline]
    pub fn container(&self) -> &'a Container {
        self.container
    }

    #[inline]
    pub fn container_id(&self) -> u64 {
        self.container.id().id()
    }
}

impl std::fmt::Debug for Instances<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instances")
            .field("container_id", &self.container_id())
            .field("keys", &self.keys())
            .finish()
    }
}
