//! References accepted by [`Container::resolve_any`](crate::Container::resolve_any)

use crate::factory::{Target, TargetKey};
use crate::{Construct, Factory, Injectable};

/// What to resolve: a token name, a constructible type or a factory.
///
/// Types and factories are matched against the registries' reverse index;
/// when registered, they resolve exactly like their token name, otherwise
/// they build an uncached instance.
#[derive(Clone, Debug)]
pub enum Resolvable {
    /// A registered token name
    Name(String),
    /// A constructible type
    Type(Target),
    /// A factory function
    Factory(Target),
}

impl Resolvable {
    /// Reference a constructible type
    #[inline]
    pub fn of<T: Construct>() -> Self {
        Resolvable::Type(Target::of_type::<T>())
    }

    /// The reverse-index key, for type and factory references
    pub fn target_key(&self) -> Option<TargetKey> {
        match self {
            Resolvable::Name(_) => None,
            Resolvable::Type(target) | Resolvable::Factory(target) => Some(target.key()),
        }
    }
}

impl From<&str> for Resolvable {
    fn from(name: &str) -> Self {
        Resolvable::Name(name.to_owned())
    }
}

impl From<String> for Resolvable {
    fn from(name: String) -> Self {
        Resolvable::Name(name)
    }
}

impl From<&String> for Resolvable {
    fn from(name: &String) -> Self {
        Resolvable::Name(name.clone())
    }
}

impl<T: Injectable> From<&Factory<T>> for Resolvable {
    fn from(factory: &Factory<T>) -> Self {
        Resolvable::Factory(Target::from(factory))
    }
}

impl std::fmt::Display for Resolvable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Resolvable::Name(name) => write!(f, "'{name}'"),
            Resolvable::Type(target) => write!(f, "type {}", target.type_name()),
            Resolvable::Factory(target) => write!(f, "factory of {}", target.type_name()),
        }
    }
}
