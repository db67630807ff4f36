//! The resolver contract and the argument registry.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ArgValue, ArgumentError};
use crate::identifiers::Identifier;
use crate::model::{ChatClient, Message, RunContext};
use crate::registry::{Named, Registry};

/// Caller-supplied options forwarded to a resolver.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArgOptions {
    /// Lower bound (length for strings, value for numbers, epoch millis for dates).
    #[serde(default)]
    pub minimum: Option<f64>,
    /// Upper bound, same units as `minimum`.
    #[serde(default)]
    pub maximum: Option<f64>,
    /// Maximum number of repetitions for `repeat`.
    #[serde(default)]
    pub times: Option<usize>,
    /// Resolver-specific extras.
    #[serde(default)]
    pub extra: Value,
}

impl ArgOptions {
    /// Empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the lower bound.
    pub fn minimum(mut self, minimum: f64) -> Self {
        self.minimum = Some(minimum);
        self
    }

    /// Set the upper bound.
    pub fn maximum(mut self, maximum: f64) -> Self {
        self.maximum = Some(maximum);
        self
    }

    /// Set the repetition limit.
    pub fn times(mut self, times: usize) -> Self {
        self.times = Some(times);
        self
    }

    /// Set resolver-specific extras.
    pub fn extra(mut self, extra: Value) -> Self {
        self.extra = extra;
        self
    }
}

/// Everything a resolver may look at.
#[derive(Clone, Copy)]
pub struct ResolverContext<'a> {
    /// Name of the resolver being run.
    pub argument: &'a str,
    /// The message that triggered the command.
    pub message: &'a Message,
    /// How the command was invoked.
    pub context: &'a RunContext,
    /// Client used for live lookups.
    pub client: &'a dyn ChatClient,
    /// Caller-supplied options.
    pub options: &'a ArgOptions,
}

impl ResolverContext<'_> {
    /// Build an error attributed to the running resolver.
    pub fn error(
        &self,
        parameter: &str,
        identifier: Identifier,
        message: impl Into<String>,
    ) -> ArgumentError {
        ArgumentError::new(self.argument, parameter, identifier, message)
    }
}

/// Converts raw parameter text into a typed value.
#[async_trait]
pub trait Resolver: Send + Sync {
    /// Registry name, e.g. `number`.
    fn name(&self) -> &str;

    /// Alternative registry names.
    fn aliases(&self) -> Vec<String> {
        Vec::new()
    }

    /// Resolve one parameter.
    async fn resolve(&self, parameter: &str, ctx: &ResolverContext<'_>) -> Result<ArgValue, ArgumentError>;
}

impl Named for dyn Resolver {
    fn name(&self) -> &str {
        Resolver::name(self)
    }

    fn aliases(&self) -> Vec<String> {
        Resolver::aliases(self)
    }
}

/// Resolvers by name. Clones share storage.
pub type ArgumentRegistry = Registry<dyn Resolver>;

impl Registry<dyn Resolver> {
    /// Registry pre-populated with the built-in resolvers.
    pub fn with_defaults() -> Self {
        let registry = Self::new("argument");
        super::resolvers::register_defaults(&registry);
        registry
    }
}

/// Resolver backed by a synchronous closure.
pub struct FnResolver<F> {
    name: String,
    resolve: F,
}

impl<F> FnResolver<F>
where
    F: Fn(&str, &ResolverContext<'_>) -> Result<ArgValue, ArgumentError> + Send + Sync,
{
    /// Wrap `resolve` under `name`.
    pub fn new(name: impl Into<String>, resolve: F) -> Self {
        Self {
            name: name.into(),
            resolve,
        }
    }
}

#[async_trait]
impl<F> Resolver for FnResolver<F>
where
    F: Fn(&str, &ResolverContext<'_>) -> Result<ArgValue, ArgumentError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn resolve(&self, parameter: &str, ctx: &ResolverContext<'_>) -> Result<ArgValue, ArgumentError> {
        (self.resolve)(parameter, ctx)
    }
}

/// Which resolver a read should use.
#[derive(Clone)]
pub enum ArgType {
    /// Look the resolver up in the registry at read time.
    Named(String),
    /// Use this resolver directly.
    Resolver(Arc<dyn Resolver>),
}

impl ArgType {
    /// Name of the requested resolver.
    pub fn name(&self) -> &str {
        match self {
            Self::Named(name) => name,
            Self::Resolver(resolver) => Resolver::name(resolver.as_ref()),
        }
    }
}

impl fmt::Debug for ArgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.debug_tuple("Named").field(name).finish(),
            Self::Resolver(resolver) => f.debug_tuple("Resolver").field(&Resolver::name(resolver.as_ref())).finish(),
        }
    }
}

impl From<&str> for ArgType {
    fn from(name: &str) -> Self {
        Self::Named(name.to_string())
    }
}

impl From<String> for ArgType {
    fn from(name: String) -> Self {
        Self::Named(name)
    }
}

impl From<Arc<dyn Resolver>> for ArgType {
    fn from(resolver: Arc<dyn Resolver>) -> Self {
        Self::Resolver(resolver)
    }
}

impl From<&Arc<dyn Resolver>> for ArgType {
    fn from(resolver: &Arc<dyn Resolver>) -> Self {
        Self::Resolver(Arc::clone(resolver))
    }
}
