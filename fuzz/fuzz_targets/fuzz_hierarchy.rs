#![no_main]

//! Fuzz target for container trees
//!
//! Builds arbitrary trees of containers with overriding registrations and
//! checks the sharing rules: singletons are shared below the defining
//! container, scoped instances are per resolving container.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use std::sync::Arc;
use token_injector::{Container, Tokens, factory, singleton_factory, value};

#[derive(Debug, Arbitrary)]
enum Op {
    /// Child of the container at this index
    CreateChild { parent: u8, override_scoped: bool, override_singleton: bool },
    ResolveScoped(u8),
    ResolveSingleton(u8),
    ResolveValue(u8),
    Drop(u8),
}

fn root() -> Container {
    Container::create(
        Tokens::new()
            .add("value", value(0u32))
            .add("scoped", factory(|i| Ok(*i.get::<u32>("value")?)))
            .add("singleton", singleton_factory(|i| Ok(*i.get::<u32>("value")?))),
    )
    .expect("root tokens are acyclic")
}

fuzz_target!(|ops: Vec<Op>| {
    let mut containers = vec![root()];
    let mut next_value = 1u32;

    for op in ops.into_iter().take(64) {
        let pick = |i: u8, len: usize| i as usize % len;
        match op {
            Op::CreateChild { parent, override_scoped, override_singleton } => {
                if containers.len() >= 32 {
                    continue;
                }
                let parent = &containers[pick(parent, containers.len())];
                let mut tokens = Tokens::new().add("value", value(next_value));
                next_value += 1;
                if override_scoped {
                    tokens = tokens.add("scoped", factory(|i| Ok(*i.get::<u32>("value")?)));
                }
                if override_singleton {
                    tokens = tokens.add("singleton", singleton_factory(|i| Ok(*i.get::<u32>("value")?)));
                }
                let child = parent.create_child(tokens).expect("child tokens are acyclic");
                assert_eq!(child.depth(), parent.depth() + 1);
                assert_eq!(child.root().id().id(), 0);
                containers.push(child);
            }
            Op::ResolveScoped(i) => {
                let c = &containers[pick(i, containers.len())];
                let a = c.get::<u32>("scoped").expect("scoped resolves");
                let b = c.get::<u32>("scoped").expect("scoped resolves");
                assert!(Arc::ptr_eq(&a, &b));
                // built with the resolving container's view
                assert_eq!(*a, *c.get::<u32>("value").expect("value resolves"));
                if let Some(parent) = c.parent() {
                    let p = parent.get::<u32>("scoped").expect("scoped resolves");
                    assert!(!Arc::ptr_eq(&a, &p));
                }
            }
            Op::ResolveSingleton(i) => {
                let c = &containers[pick(i, containers.len())];
                let a = c.get::<u32>("singleton").expect("singleton resolves");
                assert!(Arc::ptr_eq(&a, &c.get::<u32>("singleton").expect("singleton resolves")));
            }
            Op::ResolveValue(i) => {
                let c = &containers[pick(i, containers.len())];
                let _ = c.get::<u32>("value").expect("value resolves");
            }
            Op::Drop(i) => {
                // never drop the root
                if containers.len() > 1 {
                    let idx = 1 + pick(i, containers.len() - 1);
                    containers.remove(idx);
                }
            }
        }
    }

    for c in &containers {
        assert!(c.resolution_chain().is_empty());
        assert!(c.keys().iter().any(|k| k == "singleton"));
    }
});
