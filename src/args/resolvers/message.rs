use async_trait::async_trait;

use crate::args::{ArgValue, ArgumentError, Resolver, ResolverContext};
use crate::identifiers::Identifier;
use crate::model::mentions::{parse_message_link, parse_snowflake};
use crate::model::Message;

/// A message by id (in the current channel) or by link (in the current guild).
pub struct MessageResolver;

async fn resolve_message(parameter: &str, ctx: &ResolverContext<'_>) -> Option<Message> {
    if let Some(id) = parse_snowflake(parameter) {
        return ctx.client.fetch_message(ctx.message.channel.id, id).await;
    }

    let link = parse_message_link(parameter)?;
    if link.guild_id != ctx.message.guild_id() {
        return None;
    }
    ctx.client.fetch_message(link.channel_id, link.message_id).await
}

#[async_trait]
impl Resolver for MessageResolver {
    fn name(&self) -> &str {
        "message"
    }

    async fn resolve(&self, parameter: &str, ctx: &ResolverContext<'_>) -> Result<ArgValue, ArgumentError> {
        resolve_message(parameter, ctx)
            .await
            .map(ArgValue::from)
            .ok_or_else(|| {
                ctx.error(
                    parameter,
                    Identifier::ArgumentMessageError,
                    "The argument did not resolve to a message.",
                )
            })
    }
}
