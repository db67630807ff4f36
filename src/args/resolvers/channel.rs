use async_trait::async_trait;

use crate::args::{ArgValue, ArgumentError, Resolver, ResolverContext};
use crate::identifiers::Identifier;
use crate::model::mentions::parse_channel_mention;
use crate::model::{Channel, ChannelKind};

/// Any channel by mention or id. Inside a guild only that guild's channels match.
pub struct ChannelResolver;

/// A news channel.
pub struct NewsChannelResolver;

/// A text channel.
pub struct TextChannelResolver;

async fn resolve_channel(parameter: &str, ctx: &ResolverContext<'_>) -> Option<Channel> {
    let id = parse_channel_mention(parameter)?;
    let channel = ctx.client.channel(id).await?;
    match ctx.message.guild_id() {
        Some(guild_id) if channel.guild_id != Some(guild_id) => None,
        _ => Some(channel),
    }
}

async fn resolve_kind(
    parameter: &str,
    ctx: &ResolverContext<'_>,
    kind: ChannelKind,
    identifier: Identifier,
    message: &str,
) -> Result<ArgValue, ArgumentError> {
    match resolve_channel(parameter, ctx).await {
        Some(channel) if channel.kind == kind => Ok(ArgValue::Channel(channel)),
        _ => Err(ctx.error(parameter, identifier, message)),
    }
}

#[async_trait]
impl Resolver for ChannelResolver {
    fn name(&self) -> &str {
        "channel"
    }

    async fn resolve(&self, parameter: &str, ctx: &ResolverContext<'_>) -> Result<ArgValue, ArgumentError> {
        resolve_channel(parameter, ctx)
            .await
            .map(ArgValue::Channel)
            .ok_or_else(|| {
                ctx.error(
                    parameter,
                    Identifier::ArgumentChannelError,
                    "The argument did not resolve to a channel.",
                )
            })
    }
}

#[async_trait]
impl Resolver for NewsChannelResolver {
    fn name(&self) -> &str {
        "newsChannel"
    }

    async fn resolve(&self, parameter: &str, ctx: &ResolverContext<'_>) -> Result<ArgValue, ArgumentError> {
        resolve_kind(
            parameter,
            ctx,
            ChannelKind::News,
            Identifier::ArgumentNewsChannelError,
            "The argument did not resolve to a news channel.",
        )
        .await
    }
}

#[async_trait]
impl Resolver for TextChannelResolver {
    fn name(&self) -> &str {
        "textChannel"
    }

    async fn resolve(&self, parameter: &str, ctx: &ResolverContext<'_>) -> Result<ArgValue, ArgumentError> {
        resolve_kind(
            parameter,
            ctx,
            ChannelKind::Text,
            Identifier::ArgumentTextChannelError,
            "The argument did not resolve to a text channel.",
        )
        .await
    }
}
