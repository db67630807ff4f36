//! Machine-readable error identifiers shared by resolvers and preconditions.
//!
//! Every user-facing failure carries one of these next to its human message so
//! listeners can branch on the kind of failure without parsing text.

use std::fmt;

/// Stable identifier attached to argument and precondition errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identifier {
    /// The parameter is not a recognised boolean word.
    ArgumentBooleanError,
    /// The parameter did not resolve to a channel.
    ArgumentChannelError,
    /// The parameter is not a valid date.
    ArgumentDateError,
    /// The date is earlier than the requested minimum.
    ArgumentDateTooSmall,
    /// The date is later than the requested maximum.
    ArgumentDateTooBig,
    /// The parameter is not a valid integer.
    ArgumentIntegerError,
    /// The integer is smaller than the requested minimum.
    ArgumentIntegerTooSmall,
    /// The integer is bigger than the requested maximum.
    ArgumentIntegerTooBig,
    /// The parameter did not resolve to a guild member.
    ArgumentMemberError,
    /// A member was requested outside of a guild.
    ArgumentMemberMissingGuild,
    /// The parameter did not resolve to a message.
    ArgumentMessageError,
    /// The channel exists but is not a news channel.
    ArgumentNewsChannelError,
    /// The channel exists but is not a text channel.
    ArgumentTextChannelError,
    /// The parameter is not a valid number.
    ArgumentNumberError,
    /// The number is smaller than the requested minimum.
    ArgumentNumberTooSmall,
    /// The number is bigger than the requested maximum.
    ArgumentNumberTooBig,
    /// The string is shorter than the requested minimum.
    ArgumentStringTooShort,
    /// The string is longer than the requested maximum.
    ArgumentStringTooLong,
    /// The parameter did not resolve to a user.
    ArgumentUserError,
    /// A resolver panicked while handling the parameter.
    ArgumentResolverPanicked,
    /// A resolver produced a value of a different type than the caller asked for.
    UnexpectedArgumentType,
    /// The token stream ran out before a required read.
    MissingArguments,
    /// No resolver is registered under the requested name.
    UnavailableArgument,
    /// The command is disabled.
    CommandDisabled,
    /// The caller is still on cooldown.
    PreconditionCooldown,
    /// The command may only run in direct messages.
    PreconditionDmOnly,
    /// The command may only run inside a guild.
    PreconditionGuildOnly,
    /// The command may only run in news channels.
    PreconditionNewsOnly,
    /// The command may only run in text channels.
    PreconditionTextOnly,
    /// The command is restricted to bot owners.
    PreconditionOwnerOnly,
    /// The bot lacks permissions required by the command.
    PreconditionClientPermissions,
    /// The caller lacks permissions required by the command.
    PreconditionUserPermissions,
    /// An `Or` node without alternatives was evaluated.
    PreconditionUnsatisfiable,
    /// A precondition panicked while running.
    PreconditionPanicked,
    /// A precondition payload is missing or does not match what the precondition reads.
    PreconditionMalformedPayload,
    /// No precondition is registered under the requested name.
    UnavailablePrecondition,
    /// Application-defined identifier.
    Custom(String),
}

impl Identifier {
    /// The stable string form of the identifier.
    pub fn as_str(&self) -> &str {
        match self {
            Self::ArgumentBooleanError => "booleanError",
            Self::ArgumentChannelError => "channelError",
            Self::ArgumentDateError => "dateError",
            Self::ArgumentDateTooSmall => "dateTooSmall",
            Self::ArgumentDateTooBig => "dateTooBig",
            Self::ArgumentIntegerError => "integerError",
            Self::ArgumentIntegerTooSmall => "integerTooSmall",
            Self::ArgumentIntegerTooBig => "integerTooBig",
            Self::ArgumentMemberError => "memberError",
            Self::ArgumentMemberMissingGuild => "memberMissingGuild",
            Self::ArgumentMessageError => "messageError",
            Self::ArgumentNewsChannelError => "newsChannelError",
            Self::ArgumentTextChannelError => "textChannelError",
            Self::ArgumentNumberError => "numberError",
            Self::ArgumentNumberTooSmall => "numberTooSmall",
            Self::ArgumentNumberTooBig => "numberTooBig",
            Self::ArgumentStringTooShort => "stringTooShort",
            Self::ArgumentStringTooLong => "stringTooLong",
            Self::ArgumentUserError => "userError",
            Self::ArgumentResolverPanicked => "argumentResolverPanicked",
            Self::UnexpectedArgumentType => "unexpectedArgumentType",
            Self::MissingArguments => "MissingArguments",
            Self::UnavailableArgument => "UnavailableArgument",
            Self::CommandDisabled => "commandDisabled",
            Self::PreconditionCooldown => "preconditionCooldown",
            Self::PreconditionDmOnly => "preconditionDmOnly",
            Self::PreconditionGuildOnly => "preconditionGuildOnly",
            Self::PreconditionNewsOnly => "preconditionNewsOnly",
            Self::PreconditionTextOnly => "preconditionTextOnly",
            Self::PreconditionOwnerOnly => "preconditionOwnerOnly",
            Self::PreconditionClientPermissions => "preconditionClientPermissions",
            Self::PreconditionUserPermissions => "preconditionUserPermissions",
            Self::PreconditionUnsatisfiable => "preconditionUnsatisfiable",
            Self::PreconditionPanicked => "preconditionPanicked",
            Self::PreconditionMalformedPayload => "preconditionMalformedPayload",
            Self::UnavailablePrecondition => "UnavailablePrecondition",
            Self::Custom(identifier) => identifier,
        }
    }

    /// Whether the identifier points at a configuration defect (a missing
    /// resolver or predicate, a type mismatch, an empty `Or`, a malformed
    /// payload) rather than bad user input.
    pub fn is_configuration_defect(&self) -> bool {
        matches!(
            self,
            Self::UnavailableArgument
                | Self::UnavailablePrecondition
                | Self::UnexpectedArgumentType
                | Self::PreconditionUnsatisfiable
                | Self::PreconditionMalformedPayload
        )
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Identifier {
    fn from(value: &str) -> Self {
        Self::Custom(value.to_string())
    }
}
