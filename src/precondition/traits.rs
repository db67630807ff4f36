//! The precondition contract and its registry.

use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::FutureExt;
use serde_json::Value;
use tracing::{debug, warn};

use super::builtins;
use super::{CooldownManager, PreconditionError, PreconditionResult};
use crate::command::Command;
use crate::fault::panic_message;
use crate::identifiers::Identifier;
use crate::model::{ChatClient, Message, RunContext, Snowflake};
use crate::registry::{Named, Registry};

/// Process-wide access rules consulted by the built-in preconditions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessPolicy {
    /// Users allowed through `OwnerOnly`.
    pub owners: Vec<Snowflake>,
    /// Commands switched off regardless of their own `enabled` flag.
    pub disabled_commands: HashSet<String>,
}

impl AccessPolicy {
    /// Whether `user` is a bot owner.
    pub fn is_owner(&self, user: Snowflake) -> bool {
        self.owners.contains(&user)
    }
}

/// What a precondition may inspect.
#[derive(Clone, Copy)]
pub struct PreconditionContext<'a> {
    /// The message that triggered the command.
    pub message: &'a Message,
    /// The command being gated.
    pub command: &'a Command,
    /// How the command was invoked.
    pub run_context: &'a RunContext,
    /// Client used for live lookups.
    pub client: &'a dyn ChatClient,
    /// Owners and disabled commands.
    pub access: &'a AccessPolicy,
    /// Payload attached to the node being evaluated.
    pub parameters: &'a Value,
}

impl<'a> PreconditionContext<'a> {
    /// The same context with a different node payload.
    pub fn with_parameters<'b>(&self, parameters: &'b Value) -> PreconditionContext<'b>
    where
        'a: 'b,
    {
        PreconditionContext {
            message: self.message,
            command: self.command,
            run_context: self.run_context,
            client: self.client,
            access: self.access,
            parameters,
        }
    }
}

/// A named check run before a command executes.
///
/// Checks should only inspect the context. The cooldown check is the one
/// built-in exception: it records the permitted invocation.
#[async_trait]
pub trait Precondition: Send + Sync {
    /// Registry name, e.g. `GuildOnly`.
    fn name(&self) -> &str;

    /// Alternative registry names.
    fn aliases(&self) -> Vec<String> {
        Vec::new()
    }

    /// Global ordering. `Some` makes the check run for every command.
    fn position(&self) -> Option<i32> {
        None
    }

    /// Decide whether the invocation may proceed.
    async fn run(&self, ctx: &PreconditionContext<'_>) -> PreconditionResult;
}

impl Named for dyn Precondition {
    fn name(&self) -> &str {
        Precondition::name(self)
    }

    fn aliases(&self) -> Vec<String> {
        Precondition::aliases(self)
    }
}

/// Preconditions by name. Clones share storage.
pub type PreconditionRegistry = Registry<dyn Precondition>;

impl Registry<dyn Precondition> {
    /// Registry pre-populated with the built-in preconditions.
    pub fn with_defaults(cooldowns: CooldownManager) -> Self {
        let registry = Self::new("precondition");
        for precondition in builtins::defaults(cooldowns) {
            if let Some(previous) = registry.register_or_replace(precondition) {
                warn!(precondition = Precondition::name(previous.as_ref()), "replaced built-in precondition");
            }
        }
        registry
    }

    /// Global preconditions in evaluation order.
    pub fn globals(&self) -> Vec<Arc<dyn Precondition>> {
        let mut globals: Vec<(i32, Arc<dyn Precondition>)> = self
            .values()
            .into_iter()
            .filter_map(|precondition| precondition.position().map(|position| (position, precondition)))
            .collect();
        globals.sort_by_key(|(position, _)| *position);
        globals.into_iter().map(|(_, precondition)| precondition).collect()
    }

    /// Run every global precondition, stopping at the first denial.
    pub async fn run_global(&self, ctx: &PreconditionContext<'_>) -> PreconditionResult {
        let parameters = Value::Null;
        let ctx = ctx.with_parameters(&parameters);
        for precondition in self.globals() {
            run_contained(precondition.as_ref(), &ctx).await?;
        }
        Ok(())
    }
}

/// Run one precondition, turning a panic into a denial.
pub(crate) async fn run_contained(precondition: &dyn Precondition, ctx: &PreconditionContext<'_>) -> PreconditionResult {
    let name = Precondition::name(precondition);
    match AssertUnwindSafe(precondition.run(ctx)).catch_unwind().await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(error)) => {
            debug!(precondition = name, identifier = %error.identifier, "precondition denied");
            Err(error)
        }
        Err(payload) => {
            let reason = panic_message(payload);
            warn!(precondition = name, %reason, "precondition panicked");
            Err(PreconditionError::new(
                name,
                Identifier::PreconditionPanicked,
                format!("The precondition panicked: {reason}"),
            ))
        }
    }
}
