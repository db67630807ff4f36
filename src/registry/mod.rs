//! Named piece registries.
//!
//! Resolvers, preconditions and commands are all looked up by name (or alias)
//! at the moment they are needed, so a registry may keep growing while
//! dispatches are in flight. `Registry<T>` is the shared storage behind
//! [`ArgumentRegistry`](crate::args::ArgumentRegistry),
//! [`PreconditionRegistry`](crate::precondition::PreconditionRegistry) and
//! [`CommandRegistry`](crate::command::CommandRegistry).
//!
//! ## Usage
//!
//! ```
//! use bck::registry::{Named, Registry};
//! use std::sync::Arc;
//!
//! struct Greeting(&'static str);
//!
//! impl Named for Greeting {
//!     fn name(&self) -> &str {
//!         self.0
//!     }
//!
//!     fn aliases(&self) -> Vec<String> {
//!         vec!["hi".to_string()]
//!     }
//! }
//!
//! let registry: Registry<Greeting> = Registry::new("greeting");
//! registry.register(Arc::new(Greeting("hello"))).unwrap();
//!
//! assert!(registry.get("hello").is_some());
//! assert!(registry.get("hi").is_some());
//! ```

mod error;
mod registry;

pub use error::{RegistryError, RegistryResult};
pub use registry::{Named, Registry};
