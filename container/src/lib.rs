//! # Open Container
//!
//! A dependency-resolution container. Callers register how to produce a value
//! for an id (a type, a builder, or a ready instance) and later resolve the id
//! to get a fully built value.
//!
//! ## Core Concepts
//!
//! - **Recipes**: a type implementing [`FromContainer`] or a builder closure.
//!   Both receive the container so they can resolve their own dependencies.
//!   Shared recipes are built once and cached; [`Container::flush_instance`]
//!   drops the cached value so the next resolution rebuilds it.
//! - **Instances**: values registered as-is and returned unchanged.
//! - **Deferred containers**: [`Container::to_deferred`] forks a container into
//!   a mode where resolution hands out [`Proxy`] stand-ins and only builds on
//!   first use. Mutually dependent registrations can then be wired together.
//!
//! ## Quick Start
//!
//! ```
//! use open_container::{Container, Resolved};
//!
//! struct Alpha {
//!   beta: Resolved<Beta>,
//! }
//!
//! struct Beta {
//!   alpha: Resolved<Alpha>,
//!   name: &'static str,
//! }
//!
//! let container = Container::new();
//! container.register_builder("alpha", |c| Alpha {
//!   beta: c.resolve("beta").unwrap(),
//! });
//! container.register_builder("beta", |c| Beta {
//!   alpha: c.resolve("alpha").unwrap(),
//!   name: "beta",
//! });
//!
//! let deferred = container.to_deferred();
//! let alpha = deferred.resolve::<Alpha>("alpha").unwrap();
//! assert!(!deferred.is_resolved("alpha"));
//!
//! // The first access builds `alpha`; `beta` is built when it is touched.
//! assert_eq!(alpha.beta.alpha.beta.name, "beta");
//! assert!(deferred.is_resolved("alpha"));
//! ```

mod builder;
mod container;
mod core;
mod deferred;
mod error;
mod global;
mod lookup;
mod macros;
mod registry;

pub use builder::ContainerBuilder;
pub use container::{Container, FromContainer};
pub use crate::core::{Instance, Lifetime, TypeDescriptor};
pub use deferred::{Proxy, Resolved};
pub use error::{Error, Result};
pub use global::global;
pub use lookup::ServiceLookup;
