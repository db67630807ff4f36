//! Mention, id and message link recognition.

use std::sync::OnceLock;

use regex::Regex;

use super::Snowflake;

fn user_mention() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(?:<@!?)?(\d{17,20})>?$").expect("valid user mention pattern"))
}

fn channel_mention() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(?:<#)?(\d{17,20})>?$").expect("valid channel mention pattern"))
}

fn snowflake() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{17,20}$").expect("valid snowflake pattern"))
}

fn message_link() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^https?://(?:(?:ptb|canary)\.)?discord(?:app)?\.com/channels/(\d{17,20}|@me)/(\d{17,20})/(\d{17,20})$",
        )
        .expect("valid message link pattern")
    })
}

/// Parse a bare id.
pub fn parse_snowflake(input: &str) -> Option<Snowflake> {
    if !snowflake().is_match(input) {
        return None;
    }
    input.parse().ok()
}

/// Parse a user mention (`<@id>`, `<@!id>`) or a bare id.
pub fn parse_user_mention(input: &str) -> Option<Snowflake> {
    user_mention()
        .captures(input)
        .and_then(|captures| captures.get(1))
        .and_then(|id| id.as_str().parse().ok())
}

/// Parse a channel mention (`<#id>`) or a bare id.
pub fn parse_channel_mention(input: &str) -> Option<Snowflake> {
    channel_mention()
        .captures(input)
        .and_then(|captures| captures.get(1))
        .and_then(|id| id.as_str().parse().ok())
}

/// A parsed message link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageLink {
    /// Guild id, `None` for `@me` (direct messages).
    pub guild_id: Option<Snowflake>,
    /// Channel id.
    pub channel_id: Snowflake,
    /// Message id.
    pub message_id: Snowflake,
}

/// Parse a message link.
pub fn parse_message_link(input: &str) -> Option<MessageLink> {
    let captures = message_link().captures(input)?;
    let guild_id = match &captures[1] {
        "@me" => None,
        id => Some(id.parse().ok()?),
    };
    Some(MessageLink {
        guild_id,
        channel_id: captures[2].parse().ok()?,
        message_id: captures[3].parse().ok()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: Snowflake = 123456789012345678;

    #[test]
    fn test_user_mentions() {
        assert_eq!(parse_user_mention("<@123456789012345678>"), Some(ID));
        assert_eq!(parse_user_mention("<@!123456789012345678>"), Some(ID));
        assert_eq!(parse_user_mention("123456789012345678"), Some(ID));
        assert_eq!(parse_user_mention("@user"), None);
        assert_eq!(parse_user_mention("<@12>"), None);
    }

    #[test]
    fn test_channel_mentions() {
        assert_eq!(parse_channel_mention("<#123456789012345678>"), Some(ID));
        assert_eq!(parse_channel_mention("<@123456789012345678>"), None);
    }

    #[test]
    fn test_snowflake() {
        assert_eq!(parse_snowflake("123456789012345678"), Some(ID));
        assert_eq!(parse_snowflake("12345"), None);
    }

    #[test]
    fn test_message_link() {
        let link = parse_message_link(
            "https://discord.com/channels/223456789012345678/323456789012345678/423456789012345678",
        )
        .unwrap();
        assert_eq!(link.guild_id, Some(223456789012345678));
        assert_eq!(link.channel_id, 323456789012345678);
        assert_eq!(link.message_id, 423456789012345678);

        let link = parse_message_link(
            "https://canary.discord.com/channels/@me/323456789012345678/423456789012345678",
        )
        .unwrap();
        assert_eq!(link.guild_id, None);

        assert!(parse_message_link("https://example.com/channels/1/2/3").is_none());
    }
}
