//! Built-in preconditions.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::time::Instant;
use tracing::warn;

use super::{
    BucketKey, CooldownManager, CooldownOptions, Precondition, PreconditionContext, PreconditionError,
    PreconditionResult,
};
use crate::identifiers::Identifier;
use crate::model::{ChannelKind, Permissions};

/// Every built-in precondition, sharing `cooldowns` for the `Cooldown` check.
pub(super) fn defaults(cooldowns: CooldownManager) -> Vec<Arc<dyn Precondition>> {
    vec![
        Arc::new(Enabled),
        Arc::new(GuildOnly),
        Arc::new(DmOnly),
        Arc::new(TextOnly),
        Arc::new(NewsOnly),
        Arc::new(OwnerOnly),
        Arc::new(ClientPermissions),
        Arc::new(UserPermissions),
        Arc::new(Cooldown::new(cooldowns)),
    ]
}

fn deny(precondition: &str, identifier: Identifier, message: impl Into<String>) -> PreconditionResult {
    Err(PreconditionError::new(precondition, identifier, message))
}

fn malformed(precondition: &str, reason: impl fmt::Display) -> PreconditionError {
    let reason = reason.to_string();
    warn!(precondition, %reason, "rejecting malformed precondition payload");
    PreconditionError::new(
        precondition,
        Identifier::PreconditionMalformedPayload,
        format!("The precondition \"{precondition}\" is misconfigured: {reason}"),
    )
}

/// Permissions listed under `permissions` in the node payload.
///
/// The list is required; an explicit empty list requires nothing.
fn required_permissions(precondition: &str, parameters: &Value) -> Result<Permissions, PreconditionError> {
    match parameters.get("permissions") {
        None | Some(Value::Null) => Err(malformed(precondition, "no \"permissions\" list was given")),
        Some(value) => serde_json::from_value(value.clone()).map_err(|error| malformed(precondition, error)),
    }
}

fn cooldown_options(parameters: &Value) -> Result<CooldownOptions, PreconditionError> {
    serde_json::from_value(parameters.clone()).map_err(|error| malformed("Cooldown", error))
}

/// Check the payload a built-in reads without running it.
///
/// Only the permission and cooldown built-ins take a payload; any other name
/// is accepted.
pub fn validate_payload(name: &str, parameters: &Value) -> PreconditionResult {
    match name {
        "ClientPermissions" | "UserPermissions" | "HasPermission" => {
            required_permissions(name, parameters).map(|_| ())
        }
        "Cooldown" => cooldown_options(parameters).map(|_| ()),
        _ => Ok(()),
    }
}

fn missing_context(missing: Permissions) -> Value {
    json!({ "missing": missing.names() })
}

/// Denies commands switched off on the command or in the access policy.
pub struct Enabled;

#[async_trait]
impl Precondition for Enabled {
    fn name(&self) -> &str {
        "Enabled"
    }

    fn position(&self) -> Option<i32> {
        Some(10)
    }

    async fn run(&self, ctx: &PreconditionContext<'_>) -> PreconditionResult {
        if ctx.command.enabled() && !ctx.access.disabled_commands.contains(ctx.command.name()) {
            return Ok(());
        }
        deny("Enabled", Identifier::CommandDisabled, "This message command is disabled.")
    }
}

/// Allows only messages sent inside a guild.
pub struct GuildOnly;

#[async_trait]
impl Precondition for GuildOnly {
    fn name(&self) -> &str {
        "GuildOnly"
    }

    async fn run(&self, ctx: &PreconditionContext<'_>) -> PreconditionResult {
        if ctx.message.guild_id().is_some() {
            return Ok(());
        }
        deny(
            "GuildOnly",
            Identifier::PreconditionGuildOnly,
            "You cannot run this message command in DMs.",
        )
    }
}

/// Allows only direct messages.
pub struct DmOnly;

#[async_trait]
impl Precondition for DmOnly {
    fn name(&self) -> &str {
        "DMOnly"
    }

    async fn run(&self, ctx: &PreconditionContext<'_>) -> PreconditionResult {
        if ctx.message.channel.is_dm() {
            return Ok(());
        }
        deny(
            "DMOnly",
            Identifier::PreconditionDmOnly,
            "You cannot run this message command outside DMs.",
        )
    }
}

/// Allows only guild text channels.
pub struct TextOnly;

#[async_trait]
impl Precondition for TextOnly {
    fn name(&self) -> &str {
        "TextOnly"
    }

    async fn run(&self, ctx: &PreconditionContext<'_>) -> PreconditionResult {
        if ctx.message.channel.kind == ChannelKind::Text {
            return Ok(());
        }
        deny(
            "TextOnly",
            Identifier::PreconditionTextOnly,
            "You can only run this message command in text channels.",
        )
    }
}

/// Allows only news channels.
pub struct NewsOnly;

#[async_trait]
impl Precondition for NewsOnly {
    fn name(&self) -> &str {
        "NewsOnly"
    }

    async fn run(&self, ctx: &PreconditionContext<'_>) -> PreconditionResult {
        if ctx.message.channel.kind == ChannelKind::News {
            return Ok(());
        }
        deny(
            "NewsOnly",
            Identifier::PreconditionNewsOnly,
            "You can only run this message command in news channels.",
        )
    }
}

/// Allows only the owners listed in the access policy.
pub struct OwnerOnly;

#[async_trait]
impl Precondition for OwnerOnly {
    fn name(&self) -> &str {
        "OwnerOnly"
    }

    async fn run(&self, ctx: &PreconditionContext<'_>) -> PreconditionResult {
        if ctx.access.is_owner(ctx.message.author.id) {
            return Ok(());
        }
        deny(
            "OwnerOnly",
            Identifier::PreconditionOwnerOnly,
            "This message command can only be used by the bot owners.",
        )
    }
}

/// Checks that the bot holds the permissions in the payload.
pub struct ClientPermissions;

#[async_trait]
impl Precondition for ClientPermissions {
    fn name(&self) -> &str {
        "ClientPermissions"
    }

    async fn run(&self, ctx: &PreconditionContext<'_>) -> PreconditionResult {
        let required = required_permissions("ClientPermissions", ctx.parameters)?;
        if required.is_empty() {
            return Ok(());
        }

        let granted = ctx.client.permissions_in(&ctx.message.channel, ctx.client.user_id()).await;
        let missing = granted.missing(required);
        if missing.is_empty() {
            return Ok(());
        }
        Err(PreconditionError::new(
            "ClientPermissions",
            Identifier::PreconditionClientPermissions,
            format!("I am missing the following permissions to run this command: {missing}"),
        )
        .with_context(missing_context(missing)))
    }
}

/// Checks that the author holds the permissions in the payload.
pub struct UserPermissions;

#[async_trait]
impl Precondition for UserPermissions {
    fn name(&self) -> &str {
        "UserPermissions"
    }

    fn aliases(&self) -> Vec<String> {
        vec!["HasPermission".to_string()]
    }

    async fn run(&self, ctx: &PreconditionContext<'_>) -> PreconditionResult {
        let required = required_permissions("UserPermissions", ctx.parameters)?;
        if required.is_empty() {
            return Ok(());
        }

        let granted = ctx.client.permissions_in(&ctx.message.channel, ctx.message.author.id).await;
        let missing = granted.missing(required);
        if missing.is_empty() {
            return Ok(());
        }
        Err(PreconditionError::new(
            "UserPermissions",
            Identifier::PreconditionUserPermissions,
            format!("You are missing the following permissions to run this command: {missing}"),
        )
        .with_context(missing_context(missing)))
    }
}

/// Rate limits a command per bucket. The payload is a [`CooldownOptions`].
pub struct Cooldown {
    manager: CooldownManager,
}

impl Cooldown {
    /// A cooldown check recording into `manager`.
    pub fn new(manager: CooldownManager) -> Self {
        Self { manager }
    }
}

#[async_trait]
impl Precondition for Cooldown {
    fn name(&self) -> &str {
        "Cooldown"
    }

    async fn run(&self, ctx: &PreconditionContext<'_>) -> PreconditionResult {
        let options = cooldown_options(ctx.parameters)?;
        if options.delay_ms == 0 {
            return Ok(());
        }

        let key = BucketKey {
            command: ctx.command.name().to_string(),
            bucket: options.scope.bucket(ctx.message),
            delay_ms: options.delay_ms,
        };
        match self.manager.acquire(key, Instant::now()) {
            Ok(()) => Ok(()),
            Err(remaining) => {
                let remaining_ms = u64::try_from(remaining.as_millis()).unwrap_or(u64::MAX);
                let seconds = remaining_ms.div_ceil(1_000);
                Err(PreconditionError::new(
                    "Cooldown",
                    Identifier::PreconditionCooldown,
                    format!("You have just used this command. Try again in {seconds} second(s)."),
                )
                .with_context(json!({ "remaining": remaining_ms })))
            }
        }
    }
}
