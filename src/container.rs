//! Hierarchical dependency injection container
//!
//! The `Container` owns a token registry and a scoped instance cache, links
//! to its parent, and shares a [`RootState`] (id counter and singleton store)
//! with every other container of its tree. All resolution logic lives here.

use crate::cache::{InstanceCache, SingletonKey, SingletonStore};
use crate::chain::ResolutionChain;
use crate::factory::Target;
use crate::storage::{RegisteredToken, TokenRegistry};
use crate::{
    Construct, DiError, Factory, Injectable, Instance, Instances, Lifetime, Resolvable, Result,
    Tokens,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

#[cfg(feature = "logging")]
use tracing::{debug, trace};

/// Identity of a container, unique within its tree.
///
/// The root is `0`; every further container gets the next id in creation
/// order, regardless of where in the tree it sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerId(u64);

impl ContainerId {
    #[inline]
    pub(crate) const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[inline]
    pub fn id(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ContainerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "container-{}", self.0)
    }
}

/// Container configuration.
///
/// A child created without explicit options inherits its parent's.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContainerOptions {
    lazy: Option<bool>,
}

impl ContainerOptions {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Default laziness for tokens registered on the container.
    ///
    /// A token's own `lazy` flag wins over this. It never affects tokens
    /// inherited from an ancestor.
    pub fn lazy(mut self, lazy: bool) -> Self {
        self.lazy = Some(lazy);
        self
    }

    #[inline]
    pub fn lazy_flag(&self) -> Option<bool> {
        self.lazy
    }

    #[inline]
    pub fn is_lazy(&self) -> bool {
        self.lazy.unwrap_or(false)
    }
}

/// State owned by the root of a container tree and shared with all its
/// descendants.
struct RootState {
    /// Next container id to hand out
    next_id: AtomicU64,
    /// Singletons of the whole tree, keyed by `name@definingContainerId`
    singletons: SingletonStore,
}

impl RootState {
    fn new() -> Self {
        Self {
            next_id: AtomicU64::new(0),
            singletons: SingletonStore::new(),
        }
    }

    #[inline]
    fn issue_id(&self) -> ContainerId {
        ContainerId::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }
}

struct ContainerInner {
    id: ContainerId,
    depth: u32,
    options: ContainerOptions,
    registry: Arc<TokenRegistry>,
    parent: Option<Container>,
    root: Arc<RootState>,
    /// Scoped instances built by this container
    scoped: InstanceCache,
    chain: ResolutionChain,
}

/// Dependency injection container.
///
/// Tokens are fixed when the container is created; afterwards only its
/// caches change. Cloning is cheap and yields a handle to the same container.
///
/// # Examples
///
/// ```rust
/// use token_injector::{factory, singleton_factory, Container, Tokens};
/// use std::sync::Arc;
///
/// struct Config { name: String }
/// struct Session { app: String }
///
/// let root = Container::create(
///     Tokens::new()
///         .add("config", singleton_factory(|_| Ok(Config { name: "app".into() })))
///         .add("session", factory(|i| {
///             Ok(Session { app: i.get::<Config>("config")?.name.clone() })
///         })),
/// )
/// .unwrap();
///
/// let child = root.create_child(Tokens::new()).unwrap();
///
/// // singletons are shared with descendants
/// assert!(Arc::ptr_eq(
///     &root.get::<Config>("config").unwrap(),
///     &child.get::<Config>("config").unwrap(),
/// ));
///
/// // scoped instances are per container
/// assert!(!Arc::ptr_eq(
///     &root.get::<Session>("session").unwrap(),
///     &child.get::<Session>("session").unwrap(),
/// ));
/// ```
#[derive(Clone)]
pub struct Container {
    inner: Arc<ContainerInner>,
}

impl Container {
    // =========================================================================
    // Construction
    // =========================================================================

    /// Create a root container and eagerly build its non-lazy tokens.
    pub fn create(tokens: Tokens) -> Result<Self> {
        Self::create_with_options(tokens, ContainerOptions::default())
    }

    /// Create a root container with options.
    pub fn create_with_options(tokens: Tokens, options: ContainerOptions) -> Result<Self> {
        Self::assemble(tokens, None, Arc::new(RootState::new()), options)
    }

    /// Create a child of `parent`, inheriting the parent's options.
    #[inline]
    pub fn create_with_parent(parent: &Container, tokens: Tokens) -> Result<Self> {
        parent.create_child(tokens)
    }

    /// Create a child container.
    ///
    /// The child resolves everything its ancestors can resolve, and its own
    /// tokens shadow same-named ancestor tokens for resolutions through it.
    #[inline]
    pub fn create_child(&self, tokens: Tokens) -> Result<Self> {
        self.create_child_with_options(tokens, self.inner.options)
    }

    /// Create a child container with its own options.
    pub fn create_child_with_options(&self, tokens: Tokens, options: ContainerOptions) -> Result<Self> {
        Self::assemble(tokens, Some(self), Arc::clone(&self.inner.root), options)
    }

    fn assemble(
        tokens: Tokens,
        parent: Option<&Container>,
        root: Arc<RootState>,
        options: ContainerOptions,
    ) -> Result<Self> {
        let id = root.issue_id();
        let depth = parent.map_or(0, |p| p.inner.depth + 1);
        let registry = TokenRegistry::new(
            id,
            tokens,
            options.is_lazy(),
            parent.map(|p| Arc::clone(&p.inner.registry)),
        );

        #[cfg(feature = "logging")]
        debug!(
            target: "token_injector",
            container_id = id.id(),
            parent_id = parent.map(|p| p.inner.id.id()),
            depth = depth,
            token_count = registry.len(),
            lazy = options.is_lazy(),
            "Creating DI container"
        );

        let container = Self {
            inner: Arc::new(ContainerInner {
                id,
                depth,
                options,
                registry: Arc::new(registry),
                parent: parent.cloned(),
                root,
                scoped: InstanceCache::new(),
                chain: ResolutionChain::new(),
            }),
        };

        if let Err(err) = container.instantiate_eager() {
            // the container is never handed out, so its singletons are unreachable
            container.inner.root.singletons.remove_defined_in(id);
            return Err(err);
        }
        Ok(container)
    }

    /// Build every local non-transient, non-lazy token once, in registration
    /// order. Inherited tokens are left to their defining container.
    fn instantiate_eager(&self) -> Result<()> {
        for name in self.inner.registry.eager_names() {
            #[cfg(feature = "logging")]
            trace!(
                target: "token_injector",
                token = name,
                container_id = self.inner.id.id(),
                "Eagerly instantiating token"
            );

            self.resolve_name(name)?;
        }
        Ok(())
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    /// Resolve a name, constructible type or factory to a type-erased instance.
    ///
    /// - A name resolves through the caches, the local registry and then the
    ///   ancestors' registries.
    /// - A type or factory registered (non-transient) anywhere in the chain
    ///   resolves exactly like its token name.
    /// - An unregistered type or factory is built directly and not cached.
    pub fn resolve_any(&self, reference: impl Into<Resolvable>) -> Result<Instance> {
        match reference.into() {
            Resolvable::Name(name) => self.resolve_name(&name),
            Resolvable::Type(target) | Resolvable::Factory(target) => self.resolve_target(&target),
        }
    }

    /// Resolve any reference and downcast it to `T`.
    pub fn resolve<T: Injectable>(&self, reference: impl Into<Resolvable>) -> Result<Arc<T>> {
        let reference = reference.into();
        let label = match &reference {
            Resolvable::Name(name) => name.clone(),
            other => other.to_string(),
        };
        self.resolve_any(reference)?
            .downcast::<T>()
            .map_err(|_| DiError::type_mismatch::<T>(label))
    }

    /// Resolve a token by name.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use token_injector::{value, Container, Tokens};
    ///
    /// let container = Container::create(Tokens::new().add("port", value(8080u16))).unwrap();
    /// assert_eq!(*container.get::<u16>("port").unwrap(), 8080);
    /// ```
    #[inline]
    pub fn get<T: Injectable>(&self, name: &str) -> Result<Arc<T>> {
        self.resolve_name(name)?
            .downcast::<T>()
            .map_err(|_| DiError::type_mismatch::<T>(name))
    }

    /// Resolve a constructible type, through its token if it has one.
    #[inline]
    pub fn get_type<T: Construct>(&self) -> Result<Arc<T>> {
        self.resolve_target(&Target::of_type::<T>())?
            .downcast::<T>()
            .map_err(|_| DiError::type_mismatch::<T>(std::any::type_name::<T>()))
    }

    /// Resolve a factory, through its token if it has one.
    #[inline]
    pub fn get_factory<T: Injectable>(&self, factory: &Factory<T>) -> Result<Arc<T>> {
        self.resolve_target(&Target::from(factory))?
            .downcast::<T>()
            .map_err(|_| DiError::type_mismatch::<T>(std::any::type_name::<T>()))
    }

    /// Try to resolve, returning None on any error.
    #[inline]
    pub fn try_get<T: Injectable>(&self, name: &str) -> Option<Arc<T>> {
        self.get::<T>(name).ok()
    }

    /// The instance view handed to constructors and factories built by this
    /// container.
    #[inline]
    pub fn instances(&self) -> Instances<'_> {
        Instances::new(self)
    }

    fn resolve_target(&self, target: &Target) -> Result<Instance> {
        if let Some(name) = self.inner.registry.name_for_target(&target.key()) {
            return self.resolve_name(name);
        }

        #[cfg(feature = "logging")]
        trace!(
            target: "token_injector",
            target_type = target.type_name(),
            container_id = self.inner.id.id(),
            "Building unregistered target (not cached)"
        );

        target.build(&self.instances())
    }

    fn resolve_name(&self, name: &str) -> Result<Instance> {
        if let Some(instance) = self.inner.scoped.get(name) {
            #[cfg(feature = "logging")]
            trace!(
                target: "token_injector",
                token = name,
                container_id = self.inner.id.id(),
                location = "scoped_cache",
                "Token resolved from cache"
            );
            return Ok(instance);
        }

        let _guard = self.inner.chain.enter(name).inspect_err(|_err| {
            #[cfg(feature = "logging")]
            debug!(
                target: "token_injector",
                token = name,
                container_id = self.inner.id.id(),
                error = %_err,
                "Circular dependency detected"
            );
        })?;

        let Some((defined_in, entry)) = self.inner.registry.locate(name) else {
            #[cfg(feature = "logging")]
            debug!(
                target: "token_injector",
                token = name,
                container_id = self.inner.id.id(),
                "Token not found in container or parent chain"
            );
            return Err(DiError::unregistered(name));
        };

        #[cfg(feature = "logging")]
        if defined_in != self.inner.id {
            trace!(
                target: "token_injector",
                token = name,
                container_id = self.inner.id.id(),
                defined_in = defined_in.id(),
                "Token defined by ancestor, building with this container's view"
            );
        }

        match entry.token.lifetime() {
            Lifetime::Singleton => {
                let key = SingletonKey::new(name, defined_in);
                if let Some(instance) = self.inner.root.singletons.get(&key) {
                    #[cfg(feature = "logging")]
                    trace!(
                        target: "token_injector",
                        token = name,
                        key = %key,
                        location = "singleton_store",
                        "Token resolved from cache"
                    );
                    return Ok(instance);
                }
                let instance = self.build(name, entry)?;
                Ok(self.inner.root.singletons.insert_if_absent(key, instance))
            }
            Lifetime::Scoped => {
                let instance = self.build(name, entry)?;
                Ok(self.inner.scoped.insert_if_absent(name, instance))
            }
            Lifetime::Transient => self.build(name, entry),
        }
    }

    /// Run the hooks around the token's target, using this container's view.
    fn build(&self, name: &str, entry: &RegisteredToken) -> Result<Instance> {
        let token = &entry.token;

        #[cfg(feature = "logging")]
        debug!(
            target: "token_injector",
            token = name,
            lifetime = token.lifetime().as_str(),
            container_id = self.inner.id.id(),
            "Building token instance"
        );

        token.run_before_init();
        let instance = token.target().build(&self.instances())?;
        token.run_after_init(name, &instance)?;
        Ok(instance)
    }

    // =========================================================================
    // Query Methods
    // =========================================================================

    #[inline]
    pub fn id(&self) -> ContainerId {
        self.inner.id
    }

    /// Get the scope depth (0 = root).
    #[inline]
    pub fn depth(&self) -> u32 {
        self.inner.depth
    }

    #[inline]
    pub fn options(&self) -> ContainerOptions {
        self.inner.options
    }

    #[inline]
    pub fn parent(&self) -> Option<&Container> {
        self.inner.parent.as_ref()
    }

    /// The top-most ancestor, or this container if it has no parent.
    pub fn root(&self) -> &Container {
        let mut current = self;
        while let Some(parent) = current.parent() {
            current = parent;
        }
        current
    }

    /// Check if a name is registered here or on any ancestor.
    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.inner.registry.contains_in_chain(name)
    }

    /// Every resolvable name, local names first, each once.
    #[inline]
    pub fn keys(&self) -> Vec<String> {
        self.inner.registry.names_in_chain()
    }

    /// Names registered on this container (not including parents), in
    /// registration order.
    pub fn local_names(&self) -> Vec<String> {
        self.inner.registry.names().map(str::to_owned).collect()
    }

    /// Whether this container has a cached scoped instance for `name`.
    #[inline]
    pub fn has_cached(&self, name: &str) -> bool {
        self.inner.scoped.contains(name)
    }

    /// Get the number of tokens in this container (not including parents).
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.registry.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.registry.is_empty()
    }

    /// The names currently being resolved by this container on this thread.
    pub fn resolution_chain(&self) -> Vec<String> {
        self.inner.chain.current()
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("id", &self.inner.id)
            .field("token_count", &self.len())
            .field("depth", &self.inner.depth)
            .field("has_parent", &self.inner.parent.is_some())
            .field("cached_scoped", &self.inner.scoped.len())
            .field("tree_singletons", &self.inner.root.singletons.len())
            .finish()
    }
}
