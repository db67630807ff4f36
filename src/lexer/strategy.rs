//! Flag and option recognition.
//!
//! Tokens such as `--silent`, `-s`, `--reason=spam` or `—days:3` are pulled out
//! of the ordered sequence and keyed by name. Which names are accepted is
//! decided per command.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::Token;

/// Which flag or option names a strategy accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NameFilter {
    /// `true` accepts every name, `false` accepts none.
    All(bool),
    /// Only the listed names.
    Only(Vec<String>),
}

impl Default for NameFilter {
    fn default() -> Self {
        Self::All(false)
    }
}

impl NameFilter {
    /// Accept only the given names.
    pub fn only<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Only(names.into_iter().map(Into::into).collect())
    }

    /// Whether `name` passes the filter.
    pub fn accepts(&self, name: &str) -> bool {
        match self {
            Self::All(all) => *all,
            Self::Only(names) => names.iter().any(|n| n == name),
        }
    }
}

/// Output of an [`UnorderedStrategy`] pass over a token list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParserOutput {
    /// Positional tokens in input order.
    pub ordered: Vec<Token>,
    /// Flags that were present.
    pub flags: HashSet<String>,
    /// Option values per name, in the order they appeared.
    pub options: HashMap<String, Vec<String>>,
}

/// Separates flags and options from positional tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnorderedStrategy {
    flags: NameFilter,
    options: NameFilter,
    prefixes: Vec<String>,
    separators: Vec<String>,
}

impl Default for UnorderedStrategy {
    fn default() -> Self {
        Self::new(NameFilter::default(), NameFilter::default())
    }
}

impl UnorderedStrategy {
    /// Create a strategy with the default prefixes (`--`, `-`, `—`) and
    /// separators (`=`, `:`).
    pub fn new(flags: NameFilter, options: NameFilter) -> Self {
        Self {
            flags,
            options,
            prefixes: vec!["--".to_string(), "-".to_string(), "\u{2014}".to_string()],
            separators: vec!["=".to_string(), ":".to_string()],
        }
    }

    /// Replace the flag/option prefixes. Longer prefixes are tried first.
    pub fn with_prefixes(mut self, prefixes: Vec<String>) -> Self {
        self.prefixes = prefixes;
        self.prefixes.sort_by(|a, b| b.len().cmp(&a.len()));
        self
    }

    /// Replace the option separators.
    pub fn with_separators(mut self, separators: Vec<String>) -> Self {
        self.separators = separators;
        self
    }

    fn strip_prefix<'a>(&self, input: &'a str) -> Option<&'a str> {
        self.prefixes
            .iter()
            .find_map(|prefix| input.strip_prefix(prefix.as_str()))
    }

    /// Recognise `input` as a flag and return its name.
    pub fn match_flag(&self, input: &str) -> Option<String> {
        let name = self.strip_prefix(input)?;
        if name.is_empty() || self.separators.iter().any(|s| name.contains(s.as_str())) {
            return None;
        }
        self.flags.accepts(name).then(|| name.to_string())
    }

    /// Recognise `input` as an option and return `(name, value)`.
    pub fn match_option(&self, input: &str) -> Option<(String, String)> {
        let body = self.strip_prefix(input)?;
        let (index, separator) = self
            .separators
            .iter()
            .filter_map(|s| body.find(s.as_str()).map(|i| (i, s)))
            .min_by_key(|(i, _)| *i)?;

        let name = &body[..index];
        if name.is_empty() || !self.options.accepts(name) {
            return None;
        }
        Some((name.to_string(), body[index + separator.len()..].to_string()))
    }

    /// Split `tokens` into ordered tokens, flags and options.
    ///
    /// An option written with an empty value (`--reason=`) takes the next plain
    /// token as its value. Quoted tokens are never flags or options.
    pub fn parse(&self, tokens: Vec<Token>) -> ParserOutput {
        let mut output = ParserOutput::default();
        let mut pending: Option<String> = None;

        for token in tokens {
            if token.is_quoted() {
                match pending.take() {
                    Some(name) => output.options.entry(name).or_default().push(token.value),
                    None => output.ordered.push(token),
                }
                continue;
            }

            if let Some(flag) = self.match_flag(&token.value) {
                pending = None;
                output.flags.insert(flag);
                continue;
            }

            if let Some((name, value)) = self.match_option(&token.value) {
                if value.is_empty() {
                    pending = Some(name);
                } else {
                    pending = None;
                    output.options.entry(name).or_default().push(value);
                }
                continue;
            }

            match pending.take() {
                Some(name) => output.options.entry(name).or_default().push(token.value),
                None => output.ordered.push(token),
            }
        }

        output
    }
}
