//! Precondition trees.

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use super::traits::run_contained;
use super::{validate_payload, PreconditionContext, PreconditionError, PreconditionRegistry, PreconditionResult};
use crate::identifiers::Identifier;

/// A composable gate.
#[derive(Debug, Clone, PartialEq)]
pub enum PreconditionNode {
    /// One registered precondition with its own payload.
    Single {
        /// Registry name or alias.
        name: String,
        /// Payload handed to the precondition as `ctx.parameters`.
        context: Value,
    },
    /// Every child must pass.
    And(Vec<PreconditionNode>),
    /// At least one child must pass.
    Or(Vec<PreconditionNode>),
}

impl Default for PreconditionNode {
    fn default() -> Self {
        Self::And(Vec::new())
    }
}

impl PreconditionNode {
    /// A single precondition without payload.
    pub fn single(name: impl Into<String>) -> Self {
        Self::Single {
            name: name.into(),
            context: Value::Null,
        }
    }

    /// A single precondition with a payload.
    pub fn single_with(name: impl Into<String>, context: Value) -> Self {
        Self::Single {
            name: name.into(),
            context,
        }
    }

    /// Whether evaluating this node can never deny.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::And(children) if children.iter().all(Self::is_empty))
    }

    /// Check every payload in the tree with [`validate_payload`].
    ///
    /// Returns the first malformed payload found, depth first.
    pub fn validate(&self) -> PreconditionResult {
        match self {
            Self::Single { name, context } => validate_payload(name, context),
            Self::And(children) | Self::Or(children) => children.iter().try_for_each(Self::validate),
        }
    }

    /// Evaluate the tree.
    ///
    /// `And` stops at the first failure. `Or` stops at the first success and
    /// otherwise reports the last failure; an `Or` without children is
    /// unsatisfiable.
    pub fn run<'a>(
        &'a self,
        registry: &'a PreconditionRegistry,
        ctx: &'a PreconditionContext<'a>,
    ) -> BoxFuture<'a, PreconditionResult> {
        async move {
            match self {
                Self::Single { name, context } => {
                    let Some(precondition) = registry.get(name) else {
                        warn!(precondition = %name, "precondition is not registered");
                        return Err(PreconditionError::new(
                            name.as_str(),
                            Identifier::UnavailablePrecondition,
                            format!("The precondition \"{name}\" is not available."),
                        ));
                    };
                    let ctx = ctx.with_parameters(context);
                    run_contained(precondition.as_ref(), &ctx).await
                }
                Self::And(children) => {
                    for child in children {
                        child.run(registry, ctx).await?;
                    }
                    Ok(())
                }
                Self::Or(children) => {
                    let mut last = None;
                    for child in children {
                        match child.run(registry, ctx).await {
                            Ok(()) => return Ok(()),
                            Err(error) => last = Some(error),
                        }
                    }
                    Err(last.unwrap_or_else(|| {
                        PreconditionError::new(
                            "Or",
                            Identifier::PreconditionUnsatisfiable,
                            "None of the alternative preconditions can be satisfied.",
                        )
                    }))
                }
            }
        }
        .boxed()
    }
}

/// Declarative form of a [`PreconditionNode`], as written in configuration.
///
/// ```toml
/// preconditions = [
///     "GuildOnly",
///     { any = ["OwnerOnly", { name = "HasPermission", context = { permissions = ["BAN_MEMBERS"] } }] },
/// ]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PreconditionEntry {
    /// A precondition by name.
    Name(String),
    /// All entries must pass.
    All {
        /// Child entries.
        all: Vec<PreconditionEntry>,
    },
    /// One entry must pass.
    Any {
        /// Child entries.
        any: Vec<PreconditionEntry>,
    },
    /// A precondition with a payload.
    Single {
        /// Registry name or alias.
        name: String,
        /// Payload handed to the precondition.
        #[serde(default)]
        context: Value,
    },
}

impl PreconditionEntry {
    /// Build an entry with a payload.
    pub fn with_context(name: impl Into<String>, context: Value) -> Self {
        Self::Single {
            name: name.into(),
            context,
        }
    }
}

impl From<&str> for PreconditionEntry {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<&PreconditionEntry> for PreconditionNode {
    fn from(entry: &PreconditionEntry) -> Self {
        match entry {
            PreconditionEntry::Name(name) => Self::single(name.as_str()),
            PreconditionEntry::Single { name, context } => Self::single_with(name.as_str(), context.clone()),
            PreconditionEntry::All { all } => Self::And(all.iter().map(Self::from).collect()),
            PreconditionEntry::Any { any } => Self::Or(any.iter().map(Self::from).collect()),
        }
    }
}
