//! Chat entities seen by resolvers and preconditions.

use serde::{Deserialize, Serialize};

use super::Permissions;

/// Platform-wide unique id.
pub type Snowflake = u64;

/// An account on the chat platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User id.
    pub id: Snowflake,
    /// Account name.
    pub name: String,
    /// Whether the account is automated.
    #[serde(default)]
    pub bot: bool,
}

impl User {
    /// Create a human user.
    pub fn new(id: Snowflake, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            bot: false,
        }
    }

    /// Mark the user as a bot account.
    pub fn into_bot(mut self) -> Self {
        self.bot = true;
        self
    }

    /// `<@id>` mention markup.
    pub fn mention(&self) -> String {
        format!("<@{}>", self.id)
    }
}

/// A user as a member of one guild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// The underlying user.
    pub user: User,
    /// Guild the membership belongs to.
    pub guild_id: Snowflake,
    /// Guild-specific nickname.
    #[serde(default)]
    pub nickname: Option<String>,
    /// Guild-level permissions.
    #[serde(default)]
    pub permissions: Permissions,
}

impl Member {
    /// Create a member without nickname or permissions.
    pub fn new(user: User, guild_id: Snowflake) -> Self {
        Self {
            user,
            guild_id,
            nickname: None,
            permissions: Permissions::NONE,
        }
    }

    /// Set the nickname.
    pub fn with_nickname(mut self, nickname: impl Into<String>) -> Self {
        self.nickname = Some(nickname.into());
        self
    }

    /// Set the permissions.
    pub fn with_permissions(mut self, permissions: Permissions) -> Self {
        self.permissions = permissions;
        self
    }

    /// Nickname if set, account name otherwise.
    pub fn display_name(&self) -> &str {
        self.nickname.as_deref().unwrap_or(&self.user.name)
    }
}

/// Kind of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    /// Guild text channel.
    Text,
    /// Guild announcement channel.
    News,
    /// Direct message channel.
    Dm,
    /// Guild voice channel.
    Voice,
    /// Thread inside a text or news channel.
    Thread,
}

/// A place messages are sent to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    /// Channel id.
    pub id: Snowflake,
    /// Owning guild, `None` for direct messages.
    #[serde(default)]
    pub guild_id: Option<Snowflake>,
    /// Channel name.
    #[serde(default)]
    pub name: String,
    /// Channel kind.
    pub kind: ChannelKind,
}

impl Channel {
    /// Create a guild channel.
    pub fn guild(id: Snowflake, guild_id: Snowflake, name: impl Into<String>, kind: ChannelKind) -> Self {
        Self {
            id,
            guild_id: Some(guild_id),
            name: name.into(),
            kind,
        }
    }

    /// Create a direct message channel.
    pub fn dm(id: Snowflake) -> Self {
        Self {
            id,
            guild_id: None,
            name: String::new(),
            kind: ChannelKind::Dm,
        }
    }

    /// Whether this is a direct message channel.
    pub fn is_dm(&self) -> bool {
        self.guild_id.is_none()
    }
}

/// An inbound chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Message id.
    pub id: Snowflake,
    /// Raw text.
    pub content: String,
    /// Who sent it.
    pub author: User,
    /// Set when the message was sent through a webhook.
    #[serde(default)]
    pub webhook_id: Option<Snowflake>,
    /// Where it was sent.
    pub channel: Channel,
    /// The author's membership when sent inside a guild.
    #[serde(default)]
    pub member: Option<Member>,
}

impl Message {
    /// Create a message.
    pub fn new(id: Snowflake, content: impl Into<String>, author: User, channel: Channel) -> Self {
        Self {
            id,
            content: content.into(),
            author,
            webhook_id: None,
            channel,
            member: None,
        }
    }

    /// Attach the author's guild membership.
    pub fn with_member(mut self, member: Member) -> Self {
        self.member = Some(member);
        self
    }

    /// Guild the message was sent in.
    pub fn guild_id(&self) -> Option<Snowflake> {
        self.channel.guild_id
    }

    /// Whether the message came from a bot or a webhook.
    pub fn is_automated(&self) -> bool {
        self.author.bot || self.webhook_id.is_some()
    }
}

/// How a command was invoked.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunContext {
    /// Command name as the user typed it.
    pub command_name: String,
    /// The prefix text that matched, e.g. `!` or `<@123>`.
    pub command_prefix: String,
    /// The configured prefix that produced the match.
    pub prefix: String,
}
