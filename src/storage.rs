//! Token registry storage
//!
//! Each container owns one [`TokenRegistry`]. Registries are filled once at
//! container construction and are read-only afterwards, so they are plain
//! hash maps behind an `Arc`. Like the containers themselves they are linked
//! to their parent registry for lookups along the ancestor chain.

use crate::factory::TargetKey;
use crate::{ContainerId, Lifetime, Token, Tokens};
use ahash::RandomState;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

#[cfg(feature = "logging")]
use tracing::trace;

/// A token as stored in a registry, with its laziness resolved at
/// registration time.
#[derive(Debug)]
pub(crate) struct RegisteredToken {
    pub(crate) token: Token,
    /// `token.lazy ?? container.lazy`, fixed when registered
    pub(crate) lazy: bool,
}

impl RegisteredToken {
    /// Whether the defining container builds this token during construction
    #[inline]
    pub(crate) fn is_eager(&self) -> bool {
        self.token.lifetime().is_cached() && !self.lazy
    }
}

/// Per-container token storage plus the reverse index from target identity
/// to token name.
pub(crate) struct TokenRegistry {
    /// Id of the container owning this registry
    owner: ContainerId,
    /// Tokens in registration order
    entries: Vec<(String, RegisteredToken)>,
    /// Name -> position in `entries`
    index: HashMap<String, usize, RandomState>,
    /// Target identity -> name, non-transient tokens only
    targets: HashMap<TargetKey, String, RandomState>,
    parent: Option<Arc<TokenRegistry>>,
}

impl TokenRegistry {
    /// Create a registry and register every token in `tokens`.
    pub(crate) fn new(
        owner: ContainerId,
        tokens: Tokens,
        container_lazy: bool,
        parent: Option<Arc<TokenRegistry>>,
    ) -> Self {
        let capacity = tokens.len();
        let mut registry = Self {
            owner,
            entries: Vec::with_capacity(capacity),
            index: HashMap::with_capacity_and_hasher(capacity, RandomState::new()),
            targets: HashMap::with_capacity_and_hasher(capacity, RandomState::new()),
            parent,
        };

        for (name, token) in tokens {
            registry.register(name, token, container_lazy);
        }

        registry
    }

    /// Register a token under `name`. Last write wins.
    fn register(&mut self, name: String, token: Token, container_lazy: bool) {
        #[cfg(feature = "logging")]
        trace!(
            target: "token_injector",
            token = %name,
            lifetime = token.lifetime().as_str(),
            target_type = token.target().type_name(),
            container_id = self.owner.id(),
            "Registering token"
        );

        if token.lifetime() != Lifetime::Transient {
            self.targets.insert(token.target().key(), name.clone());
        }

        let entry = RegisteredToken {
            lazy: token.lazy_flag().unwrap_or(container_lazy),
            token,
        };

        match self.index.get(&name) {
            Some(&position) => self.entries[position].1 = entry,
            None => {
                self.index.insert(name.clone(), self.entries.len());
                self.entries.push((name, entry));
            }
        }
    }

    /// Local lookup only
    #[inline]
    pub(crate) fn lookup(&self, name: &str) -> Option<&RegisteredToken> {
        self.index.get(name).map(|&position| &self.entries[position].1)
    }

    /// Find the nearest registration of `name`, starting here and walking
    /// the parent chain. Returns the defining container's id with the token.
    pub(crate) fn locate(&self, name: &str) -> Option<(ContainerId, &RegisteredToken)> {
        let mut current = Some(self);
        while let Some(registry) = current {
            if let Some(token) = registry.lookup(name) {
                return Some((registry.owner, token));
            }
            current = registry.parent.as_deref();
        }
        None
    }

    /// Name a target was registered under, here or in any ancestor.
    pub(crate) fn name_for_target(&self, key: &TargetKey) -> Option<&str> {
        let mut current = Some(self);
        while let Some(registry) = current {
            if let Some(name) = registry.targets.get(key) {
                return Some(name.as_str());
            }
            current = registry.parent.as_deref();
        }
        None
    }

    /// Check if a name is registered here or in any ancestor.
    #[inline]
    pub(crate) fn contains_in_chain(&self, name: &str) -> bool {
        self.locate(name).is_some()
    }

    /// Union of the names registered here and in every ancestor, local
    /// names first, each name once.
    pub(crate) fn names_in_chain(&self) -> Vec<String> {
        let mut seen: HashSet<&str, RandomState> = HashSet::with_hasher(RandomState::new());
        let mut names = Vec::new();

        let mut current = Some(self);
        while let Some(registry) = current {
            for (name, _) in &registry.entries {
                if seen.insert(name.as_str()) {
                    names.push(name.clone());
                }
            }
            current = registry.parent.as_deref();
        }

        names
    }

    /// Names of local tokens built during construction, in registration order
    pub(crate) fn eager_names(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.is_eager())
            .map(|(name, _)| name.as_str())
    }

    /// Local names in registration order
    pub(crate) fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for TokenRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenRegistry")
            .field("owner", &self.owner)
            .field("count", &self.len())
            .field("has_parent", &self.parent.is_some())
            .finish()
    }
}
