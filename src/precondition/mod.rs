//! Precondition engine.
//!
//! A command is gated by a tree of named predicates:
//!
//! - [`PreconditionNode::Single`] runs one predicate from the
//!   [`PreconditionRegistry`], handing it the node's own context payload
//! - [`PreconditionNode::And`] passes when every child passes and stops at
//!   the first failure
//! - [`PreconditionNode::Or`] passes at the first child that passes; when all
//!   fail, the last failure is reported
//!
//! Predicates that declare a [`Precondition::position`] are global: they run
//! for every command, in ascending position order, before the command's own
//! tree.

mod builtins;
mod cooldown;
mod error;
mod node;
mod traits;

pub use builtins::{
    validate_payload, ClientPermissions, Cooldown, DmOnly, Enabled, GuildOnly, NewsOnly, OwnerOnly,
    TextOnly, UserPermissions,
};
pub use cooldown::{BucketKey, BucketScope, CooldownManager, CooldownOptions};
#[cfg(test)]
pub(crate) use cooldown::SWEEP_INTERVAL;
pub use error::{PreconditionError, PreconditionResult};
pub use node::{PreconditionEntry, PreconditionNode};
pub use traits::{AccessPolicy, Precondition, PreconditionContext, PreconditionRegistry};

#[cfg(test)]
mod tests;
