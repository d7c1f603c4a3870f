//! Example demonstrating #[derive(Construct)]
//!
//! Run with:
//!   cargo run --example derive --features derive

use token_injector::{Construct, Container, Tokens, scoped, singleton, value};
use std::sync::Arc;

struct Database {
    url: String,
}

struct Cache {
    size: usize,
}

#[derive(Construct)]
struct UserService {
    #[inject]
    database: Arc<Database>,
    #[inject("session_cache")]
    cache: Arc<Cache>,
    #[inject(optional)]
    audit_log: Option<Arc<String>>,
    // Non-injected field uses Default
    request_count: u64,
}

impl UserService {
    fn describe(&self) -> String {
        let audit = match &self.audit_log {
            Some(target) => format!("auditing to {target}"),
            None => "without auditing".to_string(),
        };
        format!(
            "UserService on {} with cache size {} ({}, requests: {})",
            self.database.url, self.cache.size, audit, self.request_count
        )
    }
}

#[derive(Construct)]
struct ApiController {
    #[inject("users")]
    users: Arc<UserService>,
}

fn main() {
    println!("=== token-injector derive demo ===\n");

    let root = Container::create(
        Tokens::new()
            .add("database", value(Database { url: "postgres://localhost:5432/app".into() }))
            .add("session_cache", value(Cache { size: 1024 }))
            .add("users", scoped::<UserService>())
            .add("api", singleton::<ApiController>()),
    )
    .expect("root container");

    // audit_log is not registered anywhere, so it stays None
    let users = root.get::<UserService>("users").expect("users");
    println!("root:  {}", users.describe());

    // A child registering audit_log gets its own UserService that sees it
    let request = root
        .create_child(Tokens::new().add("audit_log", value(String::from("stdout"))))
        .expect("request container");
    let request_users = request.get::<UserService>("users").expect("users");
    println!("child: {}", request_users.describe());

    let api = root.get::<ApiController>("api").expect("api");
    assert!(Arc::ptr_eq(&api.users, &users));

    println!("\n=== Demo complete ===");
}
