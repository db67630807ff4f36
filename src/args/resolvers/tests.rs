use super::*;
use crate::args::{ArgOptions, ArgValue, ResolverContext};
use crate::identifiers::Identifier;
use crate::model::{
    Channel, ChannelKind, ChatClient, InMemoryClient, Member, Message, RunContext, Snowflake, User,
};

const GUILD: Snowflake = 100000000000000001;
const OTHER_GUILD: Snowflake = 100000000000000002;
const TEXT: Snowflake = 200000000000000001;
const NEWS: Snowflake = 200000000000000002;
const FOREIGN: Snowflake = 200000000000000003;
const ALICE: Snowflake = 300000000000000001;
const BOB: Snowflake = 300000000000000002;

fn client() -> InMemoryClient {
    let client = InMemoryClient::new(1);
    client.insert_channel(Channel::guild(TEXT, GUILD, "general", ChannelKind::Text));
    client.insert_channel(Channel::guild(NEWS, GUILD, "news", ChannelKind::News));
    client.insert_channel(Channel::guild(FOREIGN, OTHER_GUILD, "elsewhere", ChannelKind::Text));
    client.insert_member(Member::new(User::new(ALICE, "alice"), GUILD));
    client.insert_member(Member::new(User::new(BOB, "bob"), GUILD).with_nickname("Bobby"));
    client
}

fn guild_message() -> Message {
    Message::new(
        400000000000000001,
        "!test",
        User::new(ALICE, "alice"),
        Channel::guild(TEXT, GUILD, "general", ChannelKind::Text),
    )
}

fn dm_message() -> Message {
    Message::new(400000000000000002, "!test", User::new(ALICE, "alice"), Channel::dm(500))
}

async fn resolve(
    resolver: &dyn Resolver,
    parameter: &str,
    message: &Message,
    client: &dyn ChatClient,
    options: ArgOptions,
) -> Result<ArgValue, crate::args::ArgumentError> {
    let context = RunContext::default();
    let ctx = ResolverContext {
        argument: resolver.name(),
        message,
        context: &context,
        client,
        options: &options,
    };
    resolver.resolve(parameter, &ctx).await
}

#[tokio::test]
async fn test_string_bounds() {
    let client = client();
    let message = guild_message();

    let value = resolve(&StringResolver, "hello", &message, &client, ArgOptions::new().minimum(2.0)).await;
    assert_eq!(value, Ok(ArgValue::String("hello".to_string())));

    let error = resolve(&StringResolver, "hi", &message, &client, ArgOptions::new().minimum(5.0))
        .await
        .unwrap_err();
    assert_eq!(error.identifier, Identifier::ArgumentStringTooShort);
    assert_eq!(error.message, "The argument must be longer than 5 characters.");

    let error = resolve(&StringResolver, "hello", &message, &client, ArgOptions::new().maximum(3.0))
        .await
        .unwrap_err();
    assert_eq!(error.identifier, Identifier::ArgumentStringTooLong);
    assert_eq!(error.context["maximum"], 3.0);
}

#[tokio::test]
async fn test_number_and_integer() {
    let client = client();
    let message = guild_message();

    let value = resolve(&NumberResolver, "2.5", &message, &client, ArgOptions::new()).await;
    assert_eq!(value, Ok(ArgValue::Number(2.5)));

    let error = resolve(&NumberResolver, "NaN", &message, &client, ArgOptions::new())
        .await
        .unwrap_err();
    assert_eq!(error.identifier, Identifier::ArgumentNumberError);

    let error = resolve(&NumberResolver, "-1", &message, &client, ArgOptions::new().minimum(0.0))
        .await
        .unwrap_err();
    assert_eq!(error.identifier, Identifier::ArgumentNumberTooSmall);
    assert_eq!(error.message, "The argument must be greater than 0.");

    let error = resolve(&IntegerResolver, "1.5", &message, &client, ArgOptions::new())
        .await
        .unwrap_err();
    assert_eq!(error.identifier, Identifier::ArgumentIntegerError);

    let error = resolve(&IntegerResolver, "11", &message, &client, ArgOptions::new().maximum(10.0))
        .await
        .unwrap_err();
    assert_eq!(error.identifier, Identifier::ArgumentIntegerTooBig);
    assert_eq!(error.message, "The argument must be smaller than 10.");
}

#[tokio::test]
async fn test_boolean_words() {
    let client = client();
    let message = guild_message();

    for word in ["true", "YES", "on", "1"] {
        let value = resolve(&BooleanResolver, word, &message, &client, ArgOptions::new()).await;
        assert_eq!(value, Ok(ArgValue::Boolean(true)), "{word}");
    }
    for word in ["false", "No", "off", "0"] {
        let value = resolve(&BooleanResolver, word, &message, &client, ArgOptions::new()).await;
        assert_eq!(value, Ok(ArgValue::Boolean(false)), "{word}");
    }

    let options = ArgOptions::new().extra(serde_json::json!({ "truths": ["sure"] }));
    let value = resolve(&BooleanResolver, "sure", &message, &client, options).await;
    assert_eq!(value, Ok(ArgValue::Boolean(true)));

    let error = resolve(&BooleanResolver, "maybe", &message, &client, ArgOptions::new())
        .await
        .unwrap_err();
    assert_eq!(error.identifier, Identifier::ArgumentBooleanError);
}

#[tokio::test]
async fn test_date_formats_and_bounds() {
    let client = client();
    let message = guild_message();

    let value = resolve(&DateResolver, "2024-03-01", &message, &client, ArgOptions::new())
        .await
        .unwrap();
    let ArgValue::Date(date) = value else {
        panic!("expected a date");
    };
    assert_eq!(date.to_rfc3339(), "2024-03-01T00:00:00+00:00");

    assert!(resolve(&DateResolver, "2024-03-01T10:00:00Z", &message, &client, ArgOptions::new())
        .await
        .is_ok());

    let error = resolve(&DateResolver, "yesterday", &message, &client, ArgOptions::new())
        .await
        .unwrap_err();
    assert_eq!(error.identifier, Identifier::ArgumentDateError);

    let minimum = date.timestamp_millis() as f64 + 1.0;
    let error = resolve(&DateResolver, "2024-03-01", &message, &client, ArgOptions::new().minimum(minimum))
        .await
        .unwrap_err();
    assert_eq!(error.identifier, Identifier::ArgumentDateTooSmall);
}

#[tokio::test]
async fn test_user_by_mention() {
    let client = client();
    let message = guild_message();

    let value = resolve(&UserResolver, &format!("<@!{ALICE}>"), &message, &client, ArgOptions::new()).await;
    assert!(matches!(value, Ok(ArgValue::User(user)) if user.id == ALICE));

    let error = resolve(&UserResolver, "@nobody", &message, &client, ArgOptions::new())
        .await
        .unwrap_err();
    assert_eq!(error.identifier, Identifier::ArgumentUserError);
    assert_eq!(error.parameter, "@nobody");
}

#[tokio::test]
async fn test_member_lookup_order() {
    let client = client();
    let message = guild_message();

    let value = resolve(&MemberResolver, &format!("<@{BOB}>"), &message, &client, ArgOptions::new()).await;
    assert!(matches!(value, Ok(ArgValue::Member(member)) if member.user.id == BOB));

    let value = resolve(&MemberResolver, "bobby", &message, &client, ArgOptions::new()).await;
    assert!(matches!(value, Ok(ArgValue::Member(member)) if member.display_name() == "Bobby"));

    let error = resolve(&MemberResolver, "@user", &message, &client, ArgOptions::new())
        .await
        .unwrap_err();
    assert_eq!(error.identifier, Identifier::ArgumentMemberError);

    let error = resolve(&MemberResolver, "alice", &dm_message(), &client, ArgOptions::new())
        .await
        .unwrap_err();
    assert_eq!(error.identifier, Identifier::ArgumentMemberMissingGuild);
}

#[tokio::test]
async fn test_channels() {
    let client = client();
    let message = guild_message();

    let value = resolve(&ChannelResolver, &format!("<#{NEWS}>"), &message, &client, ArgOptions::new()).await;
    assert!(matches!(value, Ok(ArgValue::Channel(channel)) if channel.id == NEWS));

    let error = resolve(&ChannelResolver, &FOREIGN.to_string(), &message, &client, ArgOptions::new())
        .await
        .unwrap_err();
    assert_eq!(error.identifier, Identifier::ArgumentChannelError);

    assert!(resolve(&NewsChannelResolver, &NEWS.to_string(), &message, &client, ArgOptions::new())
        .await
        .is_ok());
    let error = resolve(&NewsChannelResolver, &TEXT.to_string(), &message, &client, ArgOptions::new())
        .await
        .unwrap_err();
    assert_eq!(error.identifier, Identifier::ArgumentNewsChannelError);

    let error = resolve(&TextChannelResolver, &NEWS.to_string(), &message, &client, ArgOptions::new())
        .await
        .unwrap_err();
    assert_eq!(error.identifier, Identifier::ArgumentTextChannelError);
}

#[tokio::test]
async fn test_message_by_id_and_link() {
    let client = client();
    let message = guild_message();
    let target = Message::new(
        600000000000000001,
        "look at this",
        User::new(BOB, "bob"),
        Channel::guild(NEWS, GUILD, "news", ChannelKind::News),
    );
    client.insert_message(target.clone());

    let link = format!("https://discord.com/channels/{GUILD}/{NEWS}/{}", target.id);
    let value = resolve(&MessageResolver, &link, &message, &client, ArgOptions::new()).await;
    assert_eq!(value, Ok(ArgValue::from(target.clone())));

    // Bare ids only look in the current channel.
    let error = resolve(&MessageResolver, &target.id.to_string(), &message, &client, ArgOptions::new())
        .await
        .unwrap_err();
    assert_eq!(error.identifier, Identifier::ArgumentMessageError);

    let foreign = format!("https://discord.com/channels/{OTHER_GUILD}/{NEWS}/{}", target.id);
    assert!(resolve(&MessageResolver, &foreign, &message, &client, ArgOptions::new())
        .await
        .is_err());
}

#[test]
fn test_defaults_registered() {
    let registry = crate::args::ArgumentRegistry::with_defaults();
    for name in [
        "string", "number", "float", "integer", "boolean", "date", "user", "member", "channel",
        "newsChannel", "textChannel", "message",
    ] {
        assert!(registry.contains(name), "{name}");
    }
    assert_eq!(registry.len(), 11);
}
