//! Typed argument reading.
//!
//! A command body receives an [`Args`] bound to its parameters and pulls
//! values out of it in the order it needs them:
//!
//! ```ignore
//! let member: Member = args.pick("member").await?;
//! let days: f64 = args.pick_with("number", ArgOptions::new().minimum(0.0)).await?;
//! let reason: String = args.rest("string").await?;
//! ```
//!
//! Each read names a [`Resolver`]; resolvers live in an [`ArgumentRegistry`]
//! and are looked up when the read happens.

mod error;
mod reader;
mod resolver;
pub mod resolvers;
mod value;

pub use error::{ArgsError, ArgumentError, ArgumentResult};
pub use reader::Args;
pub use resolver::{ArgOptions, ArgType, ArgumentRegistry, FnResolver, Resolver, ResolverContext};
pub use value::ArgValue;

#[cfg(test)]
mod tests;
