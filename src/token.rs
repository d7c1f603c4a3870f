//! Tokens: declarative registrations
//!
//! A [`Token`] binds a build strategy ([`Target`]) to a [`Lifetime`] plus
//! optional lifecycle hooks. The free functions in this module are the
//! usual way to create them:
//!
//! | builder                | lifetime  | target            |
//! |------------------------|-----------|-------------------|
//! | [`singleton`]          | singleton | [`Construct`] type |
//! | [`scoped`]             | scoped    | [`Construct`] type |
//! | [`transient`]          | transient | [`Construct`] type |
//! | [`singleton_factory`]  | singleton | closure           |
//! | [`scoped_factory`] / [`factory`] | scoped | closure     |
//! | [`transient_factory`]  | transient | closure           |
//! | [`alias`]              | transient | another token     |
//! | [`value`]              | singleton | pre-built value   |

use crate::factory::Target;
use crate::{Construct, DiError, Factory, Injectable, Instance, Instances, Lifetime, Result};
use std::sync::Arc;

type BeforeInitFn = Arc<dyn Fn() + Send + Sync>;
type AfterInitFn = Arc<dyn Fn(&str, &Instance) -> Result<()> + Send + Sync>;

/// Options attached to a token
#[derive(Clone, Default)]
pub struct TokenOptions {
    lazy: Option<bool>,
    before_init: Option<BeforeInitFn>,
    after_init: Option<AfterInitFn>,
}

impl std::fmt::Debug for TokenOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenOptions")
            .field("lazy", &self.lazy)
            .field("before_init", &self.before_init.is_some())
            .field("after_init", &self.after_init.is_some())
            .finish()
    }
}

/// A registration: how to build one named dependency and how long it lives.
#[derive(Clone, Debug)]
pub struct Token {
    lifetime: Lifetime,
    target: Target,
    options: TokenOptions,
}

impl Token {
    /// Create a token from a lifetime and a target
    pub fn new(lifetime: Lifetime, target: Target) -> Self {
        Self {
            lifetime,
            target,
            options: TokenOptions::default(),
        }
    }

    /// Create a token for a registered factory, keeping the factory's identity
    pub fn from_factory<T: Injectable>(lifetime: Lifetime, factory: &Factory<T>) -> Self {
        Self::new(lifetime, Target::from(factory))
    }

    #[inline]
    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    #[inline]
    pub fn target(&self) -> &Target {
        &self.target
    }

    /// The token's own lazy flag, if it set one
    #[inline]
    pub fn lazy_flag(&self) -> Option<bool> {
        self.options.lazy
    }

    /// Set whether the token is built eagerly when its container is created.
    ///
    /// Overrides the container's default. Ignored for transient tokens, which
    /// are never built eagerly.
    pub fn lazy(mut self, lazy: bool) -> Self {
        self.options.lazy = Some(lazy);
        self
    }

    /// Run `hook` right before every build of this token
    pub fn before_init<F>(mut self, hook: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.options.before_init = Some(Arc::new(hook));
        self
    }

    /// Run `hook` with every freshly built instance of this token.
    ///
    /// The resolve fails with [`DiError::TypeMismatch`] if the built instance
    /// is not a `T`.
    pub fn after_init<T, F>(mut self, hook: F) -> Self
    where
        T: Injectable,
        F: Fn(&Arc<T>) + Send + Sync + 'static,
    {
        self.options.after_init = Some(Arc::new(move |name: &str, instance: &Instance| {
            let typed = Arc::clone(instance)
                .downcast::<T>()
                .map_err(|_| DiError::type_mismatch::<T>(name))?;
            hook(&typed);
            Ok(())
        }));
        self
    }

    #[inline]
    pub(crate) fn run_before_init(&self) {
        if let Some(hook) = &self.options.before_init {
            hook();
        }
    }

    #[inline]
    pub(crate) fn run_after_init(&self, name: &str, instance: &Instance) -> Result<()> {
        match &self.options.after_init {
            Some(hook) => hook(name, instance),
            None => Ok(()),
        }
    }
}

impl<T: Injectable> From<Factory<T>> for Token {
    /// A bare factory registers as a scoped token
    fn from(factory: Factory<T>) -> Self {
        Token::from_factory(Lifetime::Scoped, &factory)
    }
}

impl<T: Injectable> From<&Factory<T>> for Token {
    fn from(factory: &Factory<T>) -> Self {
        Token::from_factory(Lifetime::Scoped, factory)
    }
}

// =============================================================================
// Token builders
// =============================================================================

/// A constructible type shared by the defining container and all its descendants.
///
/// The instance is built with the view of whichever container resolves it
/// first. If a descendant with overrides resolves a lazy singleton before
/// its defining container does, the shared instance sees those overrides.
#[inline]
pub fn singleton<T: Construct>() -> Token {
    Token::new(Lifetime::Singleton, Target::of_type::<T>())
}

/// A constructible type built once per resolving container.
#[inline]
pub fn scoped<T: Construct>() -> Token {
    Token::new(Lifetime::Scoped, Target::of_type::<T>())
}

/// A constructible type built anew on every resolve.
#[inline]
pub fn transient<T: Construct>() -> Token {
    Token::new(Lifetime::Transient, Target::of_type::<T>())
}

/// A factory shared by the defining container and all its descendants.
///
/// Like [`singleton`], the first resolving container's view builds the shared
/// instance, including any overrides that container registers.
pub fn singleton_factory<T, F>(build: F) -> Token
where
    T: Injectable,
    F: Fn(&Instances<'_>) -> Result<T> + Send + Sync + 'static,
{
    Token::from_factory(Lifetime::Singleton, &Factory::new(build))
}

/// A factory built once per resolving container.
pub fn scoped_factory<T, F>(build: F) -> Token
where
    T: Injectable,
    F: Fn(&Instances<'_>) -> Result<T> + Send + Sync + 'static,
{
    Token::from_factory(Lifetime::Scoped, &Factory::new(build))
}

/// Alias for [`scoped_factory`].
#[inline]
pub fn factory<T, F>(build: F) -> Token
where
    T: Injectable,
    F: Fn(&Instances<'_>) -> Result<T> + Send + Sync + 'static,
{
    scoped_factory(build)
}

/// A factory run on every resolve.
pub fn transient_factory<T, F>(build: F) -> Token
where
    T: Injectable,
    F: Fn(&Instances<'_>) -> Result<T> + Send + Sync + 'static,
{
    Token::from_factory(Lifetime::Transient, &Factory::new(build))
}

/// A transient token resolving to whatever `name` resolves to in the
/// resolving container.
///
/// # Examples
///
/// ```rust
/// use token_injector::{alias, factory, Container, Tokens};
/// use std::sync::Arc;
///
/// struct Counter;
///
/// let container = Container::create(
///     Tokens::new()
///         .add("counter", factory(|_| Ok(Counter)))
///         .add("counter_alias", alias("counter")),
/// )
/// .unwrap();
///
/// let a = container.get::<Counter>("counter").unwrap();
/// let b = container.get::<Counter>("counter_alias").unwrap();
/// assert!(Arc::ptr_eq(&a, &b));
/// ```
pub fn alias(name: impl Into<String>) -> Token {
    let name: String = name.into();
    Token::new(
        Lifetime::Transient,
        Target::erased("alias", Arc::new(move |instances| instances.get_any(&name))),
    )
}

/// A pre-built value, shared as-is with every container that resolves it.
pub fn value<T: Injectable>(value: T) -> Token {
    let shared: Instance = Arc::new(value);
    Token::new(
        Lifetime::Singleton,
        Target::erased(
            std::any::type_name::<T>(),
            Arc::new(move |_| Ok(Arc::clone(&shared))),
        ),
    )
}

// =============================================================================
// Tokens - ordered registration map
// =============================================================================

/// Ordered mapping from token name to [`Token`], supplied in bulk when a
/// container is created.
///
/// Adding a name twice replaces the earlier token but keeps its position.
/// Registration order is the order of eager instantiation.
#[derive(Clone, Debug, Default)]
pub struct Tokens {
    entries: Vec<(String, Token)>,
}

impl Tokens {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a token and continue the chain
    pub fn add(mut self, name: impl Into<String>, token: impl Into<Token>) -> Self {
        self.insert(name, token);
        self
    }

    /// Add a constructible type as a scoped token
    pub fn add_type<T: Construct>(self, name: impl Into<String>) -> Self {
        self.add(name, scoped::<T>())
    }

    /// Insert a token in place
    pub fn insert(&mut self, name: impl Into<String>, token: impl Into<Token>) {
        let name = name.into();
        let token = token.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = token,
            None => self.entries.push((name, token)),
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

    /// Registered names in order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&Token> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, token)| token)
    }
}

impl IntoIterator for Tokens {
    type Item = (String, Token);
    type IntoIter = std::vec::IntoIter<(String, Token)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<N: Into<String>, T: Into<Token>> FromIterator<(N, T)> for Tokens {
    fn from_iter<I: IntoIterator<Item = (N, T)>>(iter: I) -> Self {
        let mut tokens = Tokens::new();
        for (name, token) in iter {
            tokens.insert(name, token);
        }
        tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TargetKey;
    use std::any::TypeId;

    struct Service;

    impl Construct for Service {
        fn construct(_: &Instances<'_>) -> Result<Self> {
            Ok(Service)
        }
    }

    #[test]
    fn test_builders_set_lifetime() {
        assert_eq!(singleton::<Service>().lifetime(), Lifetime::Singleton);
        assert_eq!(scoped::<Service>().lifetime(), Lifetime::Scoped);
        assert_eq!(transient::<Service>().lifetime(), Lifetime::Transient);
        assert_eq!(singleton_factory(|_| Ok(1u8)).lifetime(), Lifetime::Singleton);
        assert_eq!(factory(|_| Ok(1u8)).lifetime(), Lifetime::Scoped);
        assert_eq!(transient_factory(|_| Ok(1u8)).lifetime(), Lifetime::Transient);
        assert_eq!(alias("x").lifetime(), Lifetime::Transient);
        assert_eq!(value(1u8).lifetime(), Lifetime::Singleton);
    }

    #[test]
    fn test_type_token_targets_type_id() {
        let token = scoped::<Service>();
        assert_eq!(token.target().key(), TargetKey::Type(TypeId::of::<Service>()));
    }

    #[test]
    fn test_factory_token_keeps_identity() {
        let f = Factory::new(|_| Ok(Service));
        let token: Token = f.clone().into();

        assert_eq!(token.lifetime(), Lifetime::Scoped);
        assert_eq!(token.target().key(), TargetKey::Factory(f.id()));
    }

    #[test]
    fn test_lazy_flag() {
        assert_eq!(scoped::<Service>().lazy_flag(), None);
        assert_eq!(scoped::<Service>().lazy(true).lazy_flag(), Some(true));
        assert_eq!(scoped::<Service>().lazy(false).lazy_flag(), Some(false));
    }

    #[test]
    fn test_tokens_last_write_wins_keeps_position() {
        let tokens = Tokens::new()
            .add("a", scoped::<Service>())
            .add("b", scoped::<Service>())
            .add("a", singleton::<Service>());

        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens.names().collect::<Vec<_>>(), ["a", "b"]);
        assert_eq!(tokens.get("a").unwrap().lifetime(), Lifetime::Singleton);
    }

    #[test]
    fn test_add_type_is_scoped() {
        let tokens = Tokens::new().add_type::<Service>("service");
        assert_eq!(tokens.get("service").unwrap().lifetime(), Lifetime::Scoped);
    }

    #[test]
    fn test_tokens_from_iter() {
        let tokens: Tokens = vec![("one", value(1u32)), ("two", value(2u32))]
            .into_iter()
            .collect();
        assert_eq!(tokens.names().collect::<Vec<_>>(), ["one", "two"]);
    }
}
