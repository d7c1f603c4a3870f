//! Provider traits for dependency injection
//!
//! These traits define what types can be injected and how they are built.

use crate::{Instances, Result};
use std::any::Any;
use std::sync::Arc;

/// A type-erased, shared instance as stored in the caches.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Marker trait for types that can be held by a container.
///
/// This is automatically implemented for all types that are `Send + Sync + 'static`.
/// You never need to implement this manually.
pub trait Injectable: Send + Sync + 'static {}

// Blanket implementation - everything that's Send + Sync + 'static is Injectable
impl<T: Send + Sync + 'static> Injectable for T {}

/// A type the container can build itself.
///
/// The type receives the resolving container's [`Instances`] view as its only
/// argument and pulls its dependencies from it by name.
///
/// # Examples
///
/// ```rust
/// use token_injector::{scoped, Construct, Container, Instances, Result, Tokens};
/// use std::sync::Arc;
///
/// struct Config { url: String }
///
/// struct Database { config: Arc<Config> }
///
/// impl Construct for Config {
///     fn construct(_: &Instances<'_>) -> Result<Self> {
///         Ok(Config { url: "postgres://localhost".into() })
///     }
/// }
///
/// impl Construct for Database {
///     fn construct(instances: &Instances<'_>) -> Result<Self> {
///         Ok(Database { config: instances.get("config")? })
///     }
/// }
///
/// let container = Container::create(
///     Tokens::new()
///         .add_type::<Config>("config")
///         .add("database", scoped::<Database>()),
/// )
/// .unwrap();
///
/// let db = container.get::<Database>("database").unwrap();
/// assert_eq!(db.config.url, "postgres://localhost");
/// ```
pub trait Construct: Injectable + Sized {
    /// Build an instance, resolving dependencies through `instances`.
    fn construct(instances: &Instances<'_>) -> Result<Self>;
}

/// How long a token's instances live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Lifetime {
    /// One instance per defining container, shared with all its descendants
    Singleton,

    /// One instance per resolving container
    #[default]
    Scoped,

    /// New instance created on every resolve
    Transient,
}

impl Lifetime {
    /// Whether instances of this lifetime are cached at all.
    #[inline]
    pub fn is_cached(self) -> bool {
        !matches!(self, Lifetime::Transient)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Lifetime::Singleton => "singleton",
            Lifetime::Scoped => "scoped",
            Lifetime::Transient => "transient",
        }
    }
}

impl std::fmt::Display for Lifetime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_lifetime_is_scoped() {
        assert_eq!(Lifetime::default(), Lifetime::Scoped);
    }

    #[test]
    fn test_transient_is_not_cached() {
        assert!(Lifetime::Singleton.is_cached());
        assert!(Lifetime::Scoped.is_cached());
        assert!(!Lifetime::Transient.is_cached());
        assert_eq!(Lifetime::Transient.to_string(), "transient");
    }
}
