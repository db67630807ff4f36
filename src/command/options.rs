//! Declarative command options.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::lexer::NameFilter;
use crate::model::Permissions;
use crate::precondition::{BucketScope, CooldownOptions, PreconditionEntry};

/// Where a command may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunIn {
    /// Any guild channel.
    Guild,
    /// Direct messages.
    Dm,
    /// Guild text channels.
    Text,
    /// News channels.
    News,
}

impl RunIn {
    /// Name of the precondition enforcing this restriction.
    pub fn precondition(self) -> &'static str {
        match self {
            Self::Guild => "GuildOnly",
            Self::Dm => "DMOnly",
            Self::Text => "TextOnly",
            Self::News => "NewsOnly",
        }
    }
}

/// Options describing a command.
///
/// Deserializable so commands can be declared in configuration:
///
/// ```toml
/// [[commands]]
/// name = "ban"
/// aliases = ["hammer"]
/// run_in = ["guild"]
/// required_user_permissions = ["BAN_MEMBERS"]
/// cooldown = { delay = 5000, scope = "user" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandOptions {
    /// Primary name. Lowercased when the command is built.
    pub name: String,
    /// Alternative names.
    pub aliases: Vec<String>,
    /// One-line description.
    pub description: String,
    /// Longer help text.
    pub detailed_description: String,
    /// Whether the command accepts invocations.
    pub enabled: bool,
    /// Channel restrictions; any one of them is enough.
    pub run_in: Vec<RunIn>,
    /// Extra preconditions, all of which must pass.
    pub preconditions: Vec<PreconditionEntry>,
    /// Permissions the bot needs in the channel.
    pub required_client_permissions: Permissions,
    /// Permissions the author needs in the channel.
    pub required_user_permissions: Permissions,
    /// Optional rate limit.
    pub cooldown: Option<CooldownOptions>,
    /// Accepted flag names.
    pub flags: NameFilter,
    /// Accepted option names.
    pub options: NameFilter,
    /// Quote pairs for the lexer; `None` keeps the defaults.
    pub quotes: Option<Vec<(String, String)>>,
    /// Also register dash-less versions of dashed names.
    pub generate_dash_less_aliases: bool,
}

impl Default for CommandOptions {
    fn default() -> Self {
        Self {
            name: String::new(),
            aliases: Vec::new(),
            description: String::new(),
            detailed_description: String::new(),
            enabled: true,
            run_in: Vec::new(),
            preconditions: Vec::new(),
            required_client_permissions: Permissions::NONE,
            required_user_permissions: Permissions::NONE,
            cooldown: None,
            flags: NameFilter::default(),
            options: NameFilter::default(),
            quotes: None,
            generate_dash_less_aliases: false,
        }
    }
}

impl CommandOptions {
    /// Options for a command called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Add an alias.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Set the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Enable or disable the command.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Allow the command in `run_in`.
    pub fn run_in(mut self, run_in: RunIn) -> Self {
        if !self.run_in.contains(&run_in) {
            self.run_in.push(run_in);
        }
        self
    }

    /// Add a precondition entry.
    pub fn precondition(mut self, entry: impl Into<PreconditionEntry>) -> Self {
        self.preconditions.push(entry.into());
        self
    }

    /// Require permissions for the bot.
    pub fn client_permissions(mut self, permissions: Permissions) -> Self {
        self.required_client_permissions |= permissions;
        self
    }

    /// Require permissions for the author.
    pub fn user_permissions(mut self, permissions: Permissions) -> Self {
        self.required_user_permissions |= permissions;
        self
    }

    /// Rate limit the command.
    pub fn cooldown(mut self, delay: Duration, scope: BucketScope) -> Self {
        self.cooldown = Some(CooldownOptions::new(delay, scope));
        self
    }

    /// Set accepted flag names.
    pub fn flags(mut self, flags: NameFilter) -> Self {
        self.flags = flags;
        self
    }

    /// Set accepted option names.
    pub fn options(mut self, options: NameFilter) -> Self {
        self.options = options;
        self
    }

    /// Replace the lexer quote pairs.
    pub fn quotes(mut self, quotes: Vec<(String, String)>) -> Self {
        self.quotes = Some(quotes);
        self
    }

    /// Generate dash-less aliases.
    pub fn dash_less_aliases(mut self, generate: bool) -> Self {
        self.generate_dash_less_aliases = generate;
        self
    }
}
