#![no_main]

//! Fuzz target for resolution over arbitrary token graphs
//!
//! Dependency graphs may contain cycles and dangling names. Container
//! creation and every resolve must either succeed or fail with a cycle or
//! missing-token error, and must never leave a stale resolution chain.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use std::sync::Arc;
use token_injector::{Container, ContainerOptions, DiError, Factory, Lifetime, Token, Tokens};

const NAMES: u8 = 8;

#[derive(Debug, Arbitrary)]
struct TokenSpec {
    name: u8,
    lifetime: u8,
    lazy: Option<bool>,
    deps: Vec<u8>,
}

#[derive(Debug, Arbitrary)]
struct Input {
    lazy: bool,
    tokens: Vec<TokenSpec>,
    queries: Vec<u8>,
}

fn name(n: u8) -> String {
    format!("t{}", n % NAMES)
}

fn lifetime(n: u8) -> Lifetime {
    match n % 3 {
        0 => Lifetime::Singleton,
        1 => Lifetime::Scoped,
        _ => Lifetime::Transient,
    }
}

fn token(spec: &TokenSpec) -> Token {
    // one extra slot maps to a name that is never registered
    let deps: Vec<String> = spec
        .deps
        .iter()
        .take(4)
        .map(|d| match d % (NAMES + 1) {
            NAMES => "missing".to_string(),
            n => name(n),
        })
        .collect();
    let id = spec.name % NAMES;
    let token = Token::from_factory(
        lifetime(spec.lifetime),
        &Factory::new(move |instances| {
            for dep in &deps {
                instances.get_any(dep.as_str())?;
            }
            Ok(id)
        }),
    );
    match spec.lazy {
        Some(lazy) => token.lazy(lazy),
        None => token,
    }
}

fn expected(err: &DiError) -> bool {
    matches!(
        err,
        DiError::CircularDependency { .. } | DiError::UnregisteredToken { .. }
    )
}

fuzz_target!(|input: Input| {
    let tokens: Tokens = input
        .tokens
        .iter()
        .take(16)
        .map(|spec| (name(spec.name), token(spec)))
        .collect();

    let container = match Container::create_with_options(tokens, ContainerOptions::new().lazy(input.lazy)) {
        Ok(container) => container,
        Err(err) => {
            assert!(expected(&err), "unexpected error: {err}");
            return;
        }
    };

    for query in input.queries.into_iter().take(32) {
        let name = name(query);
        match container.get::<u8>(&name) {
            Ok(first) => {
                let second = container.get::<u8>(&name).expect("resolved once, resolves again");
                assert_eq!(first, second);
            }
            Err(err) => assert!(expected(&err), "unexpected error: {err}"),
        }
        assert!(container.resolution_chain().is_empty());
    }

    // cached lifetimes hand out one instance per container
    for name in container.local_names() {
        if let (Ok(a), Ok(b)) = (container.get::<u8>(&name), container.get::<u8>(&name)) {
            let cached = container.has_cached(&name);
            if cached {
                assert!(Arc::ptr_eq(&a, &b));
            }
        }
    }
});
