//! Resolution chain for cycle detection
//!
//! Every container tracks the names it is currently building. The chain is
//! kept per thread so that concurrent top-level resolutions on one container
//! never see each other's entries. Entries are pushed through a
//! [`ChainGuard`], which pops on drop, so the chain is restored on success,
//! on error and on unwind alike.

use crate::{DiError, Result};
use ahash::RandomState;
use dashmap::DashMap;
use std::thread::ThreadId;

/// Names being resolved on each thread's current call path.
pub(crate) struct ResolutionChain {
    active: DashMap<ThreadId, Vec<String>, RandomState>,
}

impl ResolutionChain {
    pub(crate) fn new() -> Self {
        Self {
            active: DashMap::with_capacity_and_hasher_and_shard_amount(0, RandomState::new(), 4),
        }
    }

    /// Push `name` for the current thread, failing with
    /// [`DiError::CircularDependency`] if it is already being resolved.
    pub(crate) fn enter<'a>(&'a self, name: &str) -> Result<ChainGuard<'a>> {
        let thread = std::thread::current().id();
        let mut names = self.active.entry(thread).or_default();

        if names.iter().any(|active| active == name) {
            return Err(DiError::circular(name, &names));
        }

        names.push(name.to_owned());
        Ok(ChainGuard { chain: self, thread })
    }

    /// Snapshot of the current thread's chain
    pub(crate) fn current(&self) -> Vec<String> {
        self.active
            .get(&std::thread::current().id())
            .map(|names| names.value().clone())
            .unwrap_or_default()
    }

    fn leave(&self, thread: ThreadId) {
        // drop the thread's slot once its chain is empty again
        self.active.remove_if_mut(&thread, |_, names| {
            names.pop();
            names.is_empty()
        });
    }
}

/// Pops its chain entry when dropped.
pub(crate) struct ChainGuard<'a> {
    chain: &'a ResolutionChain,
    thread: ThreadId,
}

impl Drop for ChainGuard<'_> {
    fn drop(&mut self) {
        self.chain.leave(self.thread);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_pops_on_drop() {
        let chain = ResolutionChain::new();
        {
            let _a = chain.enter("a").unwrap();
            let _b = chain.enter("b").unwrap();
            assert_eq!(chain.current(), ["a", "b"]);
        }
        assert!(chain.current().is_empty());
    }

    #[test]
    fn test_reentry_is_circular() {
        let chain = ResolutionChain::new();
        let _a = chain.enter("a").unwrap();
        let _b = chain.enter("b").unwrap();

        let err = chain.enter("a").err().unwrap();
        assert_eq!(
            err,
            DiError::CircularDependency {
                dependency: "a".into(),
                chain: vec!["a".into(), "b".into(), "a".into()],
            }
        );

        // the failed entry left the chain untouched
        assert_eq!(chain.current(), ["a", "b"]);
    }

    #[test]
    fn test_chains_are_per_thread() {
        let chain = ResolutionChain::new();
        let _a = chain.enter("a").unwrap();

        std::thread::scope(|scope| {
            scope.spawn(|| {
                let _other = chain.enter("a").unwrap();
                assert_eq!(chain.current(), ["a"]);
            });
        });

        assert_eq!(chain.current(), ["a"]);
    }
}
