//! Permission bit-set.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Chat permission flags.
///
/// Implemented as a `u64` newtype with manual bitwise operations. Serialized as
/// a list of flag names (`["BAN_MEMBERS", "MANAGE_GUILD"]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Permissions(u64);

macro_rules! permission_flags {
    ($( $(#[$doc:meta])* $name:ident = $bit:expr, $readable:expr; )*) => {
        impl Permissions {
            $(
                $(#[$doc])*
                pub const $name: Self = Self(1 << $bit);
            )*

            const FLAGS: &'static [(Self, &'static str, &'static str)] = &[
                $( (Self::$name, stringify!($name), $readable), )*
            ];
        }
    };
}

permission_flags! {
    /// Create instant invites.
    CREATE_INSTANT_INVITE = 0, "Create Instant Invite";
    /// Kick members.
    KICK_MEMBERS = 1, "Kick Members";
    /// Ban members.
    BAN_MEMBERS = 2, "Ban Members";
    /// Bypasses every other check.
    ADMINISTRATOR = 3, "Administrator";
    /// Manage channels.
    MANAGE_CHANNELS = 4, "Manage Channels";
    /// Manage the server.
    MANAGE_GUILD = 5, "Manage Server";
    /// Add reactions.
    ADD_REACTIONS = 6, "Add Reactions";
    /// View the audit log.
    VIEW_AUDIT_LOG = 7, "View Audit Log";
    /// Priority speaker in voice.
    PRIORITY_SPEAKER = 8, "Priority Speaker";
    /// Stream video.
    STREAM = 9, "Stream";
    /// See the channel.
    VIEW_CHANNEL = 10, "Read Messages";
    /// Send messages.
    SEND_MESSAGES = 11, "Send Messages";
    /// Send text-to-speech messages.
    SEND_TTS_MESSAGES = 12, "Send TTS Messages";
    /// Delete or pin messages of others.
    MANAGE_MESSAGES = 13, "Manage Messages";
    /// Embed links.
    EMBED_LINKS = 14, "Embed Links";
    /// Attach files.
    ATTACH_FILES = 15, "Attach Files";
    /// Read message history.
    READ_MESSAGE_HISTORY = 16, "Read Message History";
    /// Mention everyone.
    MENTION_EVERYONE = 17, "Mention Everyone";
    /// Use emojis from other servers.
    USE_EXTERNAL_EMOJIS = 18, "Use External Emojis";
    /// View server insights.
    VIEW_GUILD_INSIGHTS = 19, "View Guild Insights";
    /// Connect to voice.
    CONNECT = 20, "Connect";
    /// Speak in voice.
    SPEAK = 21, "Speak";
    /// Mute members in voice.
    MUTE_MEMBERS = 22, "Mute Members";
    /// Deafen members in voice.
    DEAFEN_MEMBERS = 23, "Deafen Members";
    /// Move members between voice channels.
    MOVE_MEMBERS = 24, "Move Members";
    /// Use voice activity detection.
    USE_VAD = 25, "Use Voice Activity";
    /// Change own nickname.
    CHANGE_NICKNAME = 26, "Change Nickname";
    /// Change nicknames of others.
    MANAGE_NICKNAMES = 27, "Manage Nicknames";
    /// Manage roles.
    MANAGE_ROLES = 28, "Manage Roles";
    /// Manage webhooks.
    MANAGE_WEBHOOKS = 29, "Manage Webhooks";
    /// Manage emojis.
    MANAGE_EMOJIS = 30, "Manage Emojis";
}

impl Permissions {
    /// The empty set.
    pub const NONE: Self = Self(0);

    /// What a bot can do in a direct message channel.
    pub const DM_DEFAULT: Self = Self(
        Self::VIEW_CHANNEL.0
            | Self::SEND_MESSAGES.0
            | Self::SEND_TTS_MESSAGES.0
            | Self::EMBED_LINKS.0
            | Self::ATTACH_FILES.0
            | Self::READ_MESSAGE_HISTORY.0
            | Self::MENTION_EVERYONE.0
            | Self::USE_EXTERNAL_EMOJIS.0
            | Self::ADD_REACTIONS.0,
    );

    /// Create a set from raw bits.
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// Return the raw bits.
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Check whether this set contains *all* bits of `other`.
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Combine two sets (bitwise OR).
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Whether no flag is set.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Flags of `required` that this set lacks. Administrators lack nothing.
    pub fn missing(self, required: Self) -> Self {
        if self.contains(Self::ADMINISTRATOR) {
            return Self::NONE;
        }
        Self(required.0 & !self.0)
    }

    /// Look up a flag by its constant name, e.g. `BAN_MEMBERS`.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::FLAGS
            .iter()
            .find(|(_, flag_name, _)| flag_name.eq_ignore_ascii_case(name))
            .map(|(flag, _, _)| *flag)
    }

    /// Constant names of the set flags, lowest bit first.
    pub fn names(self) -> Vec<&'static str> {
        Self::FLAGS
            .iter()
            .filter(|(flag, _, _)| self.contains(*flag))
            .map(|(_, name, _)| *name)
            .collect()
    }

    /// Human readable names of the set flags, lowest bit first.
    pub fn readable_names(self) -> Vec<&'static str> {
        Self::FLAGS
            .iter()
            .filter(|(flag, _, _)| self.contains(*flag))
            .map(|(_, _, readable)| *readable)
            .collect()
    }
}

impl std::ops::BitOr for Permissions {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for Permissions {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl std::ops::BitAnd for Permissions {
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.readable_names().join(", "))
    }
}

impl TryFrom<Vec<String>> for Permissions {
    type Error = String;

    fn try_from(names: Vec<String>) -> Result<Self, Self::Error> {
        names.iter().try_fold(Self::NONE, |acc, name| {
            Self::from_name(name)
                .map(|flag| acc | flag)
                .ok_or_else(|| format!("unknown permission '{name}'"))
        })
    }
}

impl From<Permissions> for Vec<String> {
    fn from(permissions: Permissions) -> Self {
        permissions.names().into_iter().map(str::to_string).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing() {
        let held = Permissions::SEND_MESSAGES | Permissions::KICK_MEMBERS;
        let required = Permissions::BAN_MEMBERS | Permissions::KICK_MEMBERS;

        assert_eq!(held.missing(required), Permissions::BAN_MEMBERS);
        assert!(held.missing(Permissions::KICK_MEMBERS).is_empty());
        assert!(Permissions::ADMINISTRATOR.missing(required).is_empty());
    }

    #[test]
    fn test_readable_names() {
        let permissions = Permissions::MANAGE_GUILD | Permissions::BAN_MEMBERS | Permissions::VIEW_CHANNEL;
        assert_eq!(
            permissions.readable_names(),
            vec!["Ban Members", "Manage Server", "Read Messages"]
        );
        assert_eq!(permissions.to_string(), "Ban Members, Manage Server, Read Messages");
    }

    #[test]
    fn test_dm_defaults() {
        assert!(Permissions::DM_DEFAULT.contains(Permissions::SEND_MESSAGES));
        assert!(Permissions::DM_DEFAULT.contains(Permissions::ADD_REACTIONS));
        assert!(!Permissions::DM_DEFAULT.contains(Permissions::MANAGE_MESSAGES));
    }

    #[test]
    fn test_serde_names() {
        let permissions: Permissions = serde_json::from_str("[\"BAN_MEMBERS\", \"kick_members\"]").unwrap();
        assert_eq!(permissions, Permissions::BAN_MEMBERS | Permissions::KICK_MEMBERS);

        let json = serde_json::to_string(&permissions).unwrap();
        assert_eq!(json, "[\"KICK_MEMBERS\",\"BAN_MEMBERS\"]");

        let err = serde_json::from_str::<Permissions>("[\"FLY\"]").unwrap_err();
        assert!(err.to_string().contains("FLY"));
    }
}
