//! # token-injector - Hierarchical Dependency Injection by Name
//!
//! A dependency injection runtime where services are registered as named
//! tokens, containers form a parent/child tree, and every token declares how
//! long its instances live.
//!
//! ## Features
//!
//! - **Named tokens** - register constructible types, factories, aliases and
//!   plain values under string names
//! - **Three lifetimes** - singleton (shared below the defining container),
//!   scoped (one per resolving container), transient (fresh every time)
//! - **Container hierarchy** - children see everything their ancestors
//!   register and may override any of it
//! - **Cycle detection** - circular dependencies fail with the full chain
//! - **Eager or lazy** - tokens are built at container creation unless marked
//!   lazy, per token or per container
//! - **Lock-free caches** - `DashMap` storage, safe to resolve from many
//!   threads
//! - **Observable** - optional `tracing` events with JSON or pretty output
//!
//! ## Quick Start
//!
//! ```rust
//! use token_injector::{factory, singleton_factory, value, Container, Tokens};
//!
//! struct Database { url: String }
//! struct UserService { db: std::sync::Arc<Database> }
//!
//! let container = Container::create(
//!     Tokens::new()
//!         .add("url", value("postgres://localhost"))
//!         .add("db", singleton_factory(|i| {
//!             Ok(Database { url: i.get::<&str>("url")?.to_string() })
//!         }))
//!         .add("users", factory(|i| Ok(UserService { db: i.get("db")? }))),
//! )
//! .unwrap();
//!
//! let users = container.get::<UserService>("users").unwrap();
//! assert_eq!(users.db.url, "postgres://localhost");
//! ```
//!
//! ## Lifetimes
//!
//! ```rust
//! use token_injector::{scoped_factory, singleton_factory, transient_factory, Container, Tokens};
//! use std::sync::Arc;
//!
//! struct Config;
//! struct Session;
//! struct RequestId;
//!
//! let root = Container::create(
//!     Tokens::new()
//!         .add("config", singleton_factory(|_| Ok(Config)))
//!         .add("session", scoped_factory(|_| Ok(Session)))
//!         .add("request_id", transient_factory(|_| Ok(RequestId))),
//! )
//! .unwrap();
//! let child = root.create_child(Tokens::new()).unwrap();
//!
//! // one instance for the whole subtree
//! assert!(Arc::ptr_eq(&root.get::<Config>("config").unwrap(), &child.get::<Config>("config").unwrap()));
//! // one instance per container
//! assert!(!Arc::ptr_eq(&root.get::<Session>("session").unwrap(), &child.get::<Session>("session").unwrap()));
//! // a new instance per resolve
//! assert!(!Arc::ptr_eq(&child.get::<RequestId>("request_id").unwrap(), &child.get::<RequestId>("request_id").unwrap()));
//! ```
//!
//! ## Overrides
//!
//! ```rust
//! use token_injector::{factory, value, Container, Tokens};
//!
//! let root = Container::create(
//!     Tokens::new()
//!         .add("env", value("production"))
//!         .add("banner", factory(|i| Ok(format!("running in {}", i.get::<&str>("env")?)))),
//! )
//! .unwrap();
//! let test = root.create_child(Tokens::new().add("env", value("test"))).unwrap();
//!
//! // tokens inherited from the root are built with the child's overrides
//! assert_eq!(*test.get::<String>("banner").unwrap(), "running in test");
//! assert_eq!(*root.get::<String>("banner").unwrap(), "running in production");
//! ```

// Lets `#[derive(Construct)]` expand to `::token_injector` paths inside this crate
#[cfg(feature = "derive")]
extern crate self as token_injector;

mod cache;
mod chain;
mod container;
mod error;
mod factory;
mod instances;
#[cfg(feature = "logging")]
pub mod logging;
mod provider;
mod resolvable;
mod storage;
mod token;

pub use container::*;
pub use error::*;
pub use factory::{Factory, FactoryId, Target, TargetKey};
pub use instances::*;
pub use provider::*;
pub use resolvable::*;
pub use token::*;

#[cfg(feature = "derive")]
pub use token_injector_derive::Construct;

// Re-export tracing macros for convenience when logging feature is enabled
#[cfg(feature = "logging")]
pub use tracing::{debug, error, info, trace, warn};

// Re-export for convenience
pub use std::sync::Arc;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        Construct, Container, ContainerOptions, DiError, Factory, Injectable, Instances, Lifetime,
        Resolvable, Result, Token, Tokens, alias, factory, scoped, scoped_factory, singleton,
        singleton_factory, transient, transient_factory, value,
    };
    pub use std::sync::Arc;
}
