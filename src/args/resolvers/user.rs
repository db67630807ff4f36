use async_trait::async_trait;

use crate::args::{ArgValue, ArgumentError, Resolver, ResolverContext};
use crate::identifiers::Identifier;
use crate::model::mentions::{parse_snowflake, parse_user_mention};

/// A user by mention or id.
pub struct UserResolver;

/// A member of the current guild by mention, id, or name.
pub struct MemberResolver;

#[async_trait]
impl Resolver for UserResolver {
    fn name(&self) -> &str {
        "user"
    }

    async fn resolve(&self, parameter: &str, ctx: &ResolverContext<'_>) -> Result<ArgValue, ArgumentError> {
        let user = match parse_user_mention(parameter) {
            Some(id) => ctx.client.fetch_user(id).await,
            None => None,
        };
        user.map(ArgValue::User).ok_or_else(|| {
            ctx.error(
                parameter,
                Identifier::ArgumentUserError,
                "The argument did not resolve to a user.",
            )
        })
    }
}

#[async_trait]
impl Resolver for MemberResolver {
    fn name(&self) -> &str {
        "member"
    }

    async fn resolve(&self, parameter: &str, ctx: &ResolverContext<'_>) -> Result<ArgValue, ArgumentError> {
        let Some(guild_id) = ctx.message.guild_id() else {
            return Err(ctx.error(
                parameter,
                Identifier::ArgumentMemberMissingGuild,
                "The argument must be run on a guild.",
            ));
        };

        let by_id = match parse_user_mention(parameter).or_else(|| parse_snowflake(parameter)) {
            Some(id) => ctx.client.fetch_member(guild_id, id).await,
            None => None,
        };
        let member = match by_id {
            Some(member) => Some(member),
            None => ctx
                .client
                .search_members(guild_id, parameter, 1)
                .await
                .into_iter()
                .next(),
        };

        member.map(ArgValue::Member).ok_or_else(|| {
            ctx.error(
                parameter,
                Identifier::ArgumentMemberError,
                "The argument did not resolve to a member.",
            )
        })
    }
}
