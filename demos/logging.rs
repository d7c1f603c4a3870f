//! Example demonstrating the container's tracing output
//!
//! Run with JSON logging (production):
//! ```bash
//! cargo run --example logging --features logging-json
//! ```
//!
//! Run with pretty logging (development):
//! ```bash
//! cargo run --example logging --features logging-pretty
//! ```

use token_injector::{
    ContainerOptions, Container, Tokens, alias, factory, singleton_factory, transient_factory, value,
};

struct Database {
    url: String,
}

struct RequestContext {
    request_id: String,
}

fn main() {
    token_injector::logging::builder()
        .trace()
        .injector_only()
        .from_env()
        .pretty()
        .init();

    println!("=== token-injector logging demo ===\n");

    // logs: "Creating DI container", "Eagerly instantiating token", "Building token instance"
    let root = Container::create(
        Tokens::new()
            .add("database_url", value("postgres://localhost/app"))
            .add(
                "database",
                singleton_factory(|i| {
                    Ok(Database {
                        url: i.get::<&str>("database_url")?.to_string(),
                    })
                }),
            )
            .add("db", alias("database")),
    )
    .expect("root container");

    // logs: "Token resolved from cache" (singleton_store)
    let db = root.get::<Database>("db").expect("database");
    println!("database: {}", db.url);

    // a lazy child only builds on demand
    let request = root
        .create_child_with_options(
            Tokens::new()
                .add("request", factory(|_| Ok(RequestContext { request_id: "req-12345".into() })))
                .add("nonce", transient_factory(|_| Ok(rand_like()))),
            ContainerOptions::new().lazy(true),
        )
        .expect("request container");

    let ctx = request.get::<RequestContext>("request").expect("request context");
    println!("request: {}", ctx.request_id);

    // logs: "Token not found in container or parent chain"
    assert!(request.try_get::<Database>("missing").is_none());

    // logs: "Token defined by ancestor, building with this container's view"
    let _ = request.get::<Database>("database").expect("database from child");
    let _ = request.get::<u64>("nonce").expect("nonce");

    println!("\n=== Demo complete ===");
    println!("Set RUST_LOG=token_injector=debug to drop the cache-hit events.");
}

fn rand_like() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos() as u64)
        .unwrap_or_default()
}
