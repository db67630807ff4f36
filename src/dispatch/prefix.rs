//! Prefix matching.

use std::fmt;

use async_trait::async_trait;
use regex::Regex;

use crate::model::Message;

/// What a message has to start with to be treated as a command.
#[derive(Debug, Clone)]
pub enum Prefix {
    /// A literal prefix, e.g. `!`.
    Text(String),
    /// Any of several literals; the first match wins.
    Many(Vec<String>),
    /// A pattern that must match at the start of the message.
    Pattern(Regex),
    /// No text prefix; only mentions of the bot apply.
    MentionOnly,
}

impl Prefix {
    /// A literal prefix.
    pub fn text(prefix: impl Into<String>) -> Self {
        Self::Text(prefix.into())
    }

    /// Find the prefix at the start of `content`, returning the matched text.
    pub fn find<'c>(&self, content: &'c str, case_insensitive: bool) -> Option<&'c str> {
        match self {
            Self::Text(prefix) => match_literal(prefix, content, case_insensitive),
            Self::Many(prefixes) => prefixes
                .iter()
                .find_map(|prefix| match_literal(prefix, content, case_insensitive)),
            Self::Pattern(pattern) => pattern
                .find(content)
                .filter(|found| found.start() == 0 && !found.is_empty())
                .map(|found| found.as_str()),
            Self::MentionOnly => None,
        }
    }
}

fn match_literal<'c>(prefix: &str, content: &'c str, case_insensitive: bool) -> Option<&'c str> {
    if prefix.is_empty() {
        return None;
    }
    let head = content.get(..prefix.len())?;
    let matches = if case_insensitive {
        head.to_lowercase() == prefix.to_lowercase()
    } else {
        head == prefix
    };
    matches.then_some(head)
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(prefix) => f.write_str(prefix),
            Self::Many(prefixes) => f.write_str(&prefixes.join(" ")),
            Self::Pattern(pattern) => f.write_str(pattern.as_str()),
            Self::MentionOnly => Ok(()),
        }
    }
}

impl From<&str> for Prefix {
    fn from(prefix: &str) -> Self {
        Self::text(prefix)
    }
}

/// Decides the prefix for each message.
///
/// Implement this to support per-guild or per-user prefixes; a plain
/// [`Prefix`] resolves to itself.
#[async_trait]
pub trait PrefixResolver: Send + Sync {
    /// The prefix that applies to `message`.
    async fn resolve(&self, message: &Message) -> Prefix;
}

#[async_trait]
impl PrefixResolver for Prefix {
    async fn resolve(&self, _message: &Message) -> Prefix {
        self.clone()
    }
}

/// Strip a mention of `bot` (`<@id>` or `<@!id>`) from the start of `content`.
pub(crate) fn strip_mention(content: &str, bot: u64) -> Option<(&str, &str)> {
    [format!("<@{bot}>"), format!("<@!{bot}>")]
        .iter()
        .find_map(|mention| content.starts_with(mention.as_str()).then(|| content.split_at(mention.len())))
}
