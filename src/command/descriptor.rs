//! The command descriptor and its registry.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::warn;

use super::CommandOptions;
use crate::args::{ArgumentRegistry, Args};
use crate::lexer::{Lexer, TokenStream, UnorderedStrategy};
use crate::model::{ChatClient, Message, RunContext};
use crate::precondition::{PreconditionContext, PreconditionNode, PreconditionRegistry, PreconditionResult};
use crate::registry::{Named, Registry};

/// The body of a command.
///
/// Argument failures are plain values; bubble them up with `?` and they
/// reach listeners as a command error.
#[async_trait]
pub trait CommandRun: Send + Sync {
    /// Execute the command.
    async fn run(&self, message: &Message, args: &mut Args, context: &RunContext) -> anyhow::Result<Value>;
}

/// A registered command.
pub struct Command {
    name: String,
    aliases: Vec<String>,
    options: CommandOptions,
    preconditions: PreconditionNode,
    lexer: Lexer,
    strategy: UnorderedStrategy,
    body: Arc<dyn CommandRun>,
}

impl Command {
    /// Build a command from its options and body.
    pub fn new(options: CommandOptions, body: impl CommandRun + 'static) -> Self {
        Self::with_body(options, Arc::new(body))
    }

    /// Build a command around a shared body.
    pub fn with_body(options: CommandOptions, body: Arc<dyn CommandRun>) -> Self {
        let name = options.name.to_lowercase();
        let mut aliases: Vec<String> = Vec::new();
        for alias in options.aliases.iter().map(|alias| alias.to_lowercase()) {
            if alias != name && !aliases.contains(&alias) {
                aliases.push(alias);
            }
        }

        if options.generate_dash_less_aliases {
            let dashed: Vec<String> = std::iter::once(&name)
                .chain(aliases.iter())
                .filter(|candidate| candidate.contains('-'))
                .map(|candidate| candidate.replace('-', ""))
                .collect();
            for alias in dashed {
                if alias != name && !alias.is_empty() && !aliases.contains(&alias) {
                    aliases.push(alias);
                }
            }
        }

        let lexer = match &options.quotes {
            Some(quotes) => Lexer::with_quotes(quotes.clone()),
            None => Lexer::new(),
        };
        let strategy = UnorderedStrategy::new(options.flags.clone(), options.options.clone());
        let preconditions = derive_preconditions(&options);

        Self {
            name,
            aliases,
            options,
            preconditions,
            lexer,
            strategy,
            body,
        }
    }

    /// Lowercased primary name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lowercased aliases, including generated ones.
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// One-line description.
    pub fn description(&self) -> &str {
        &self.options.description
    }

    /// Longer help text.
    pub fn detailed_description(&self) -> &str {
        &self.options.detailed_description
    }

    /// Whether the command accepts invocations.
    pub fn enabled(&self) -> bool {
        self.options.enabled
    }

    /// The options the command was built from.
    pub fn options(&self) -> &CommandOptions {
        &self.options
    }

    /// The command's own precondition tree.
    pub fn preconditions(&self) -> &PreconditionNode {
        &self.preconditions
    }

    /// Evaluate the command's own precondition tree.
    pub async fn check(&self, registry: &PreconditionRegistry, ctx: &PreconditionContext<'_>) -> PreconditionResult {
        self.preconditions.run(registry, ctx).await
    }

    /// Tokenize `parameters` and bind a fresh reader to them.
    pub fn pre_parse(
        &self,
        message: Arc<Message>,
        parameters: &str,
        context: Arc<RunContext>,
        client: Arc<dyn ChatClient>,
        arguments: ArgumentRegistry,
    ) -> Args {
        let output = self.strategy.parse(self.lexer.lex(parameters));
        Args::new(message, TokenStream::new(output), context, client, arguments)
    }

    /// Run the body.
    pub async fn run(&self, message: &Message, args: &mut Args, context: &RunContext) -> anyhow::Result<Value> {
        self.body.run(message, args, context).await
    }
}

/// `And[run-in, client permissions, user permissions, declared..., cooldown]`.
fn derive_preconditions(options: &CommandOptions) -> PreconditionNode {
    let mut nodes = Vec::new();

    match options.run_in.as_slice() {
        [] => {}
        [only] => nodes.push(PreconditionNode::single(only.precondition())),
        many => nodes.push(PreconditionNode::Or(
            many.iter()
                .map(|run_in| PreconditionNode::single(run_in.precondition()))
                .collect(),
        )),
    }

    if !options.required_client_permissions.is_empty() {
        nodes.push(PreconditionNode::single_with(
            "ClientPermissions",
            json!({ "permissions": options.required_client_permissions }),
        ));
    }
    if !options.required_user_permissions.is_empty() {
        nodes.push(PreconditionNode::single_with(
            "UserPermissions",
            json!({ "permissions": options.required_user_permissions }),
        ));
    }

    nodes.extend(options.preconditions.iter().map(PreconditionNode::from));

    if let Some(cooldown) = &options.cooldown {
        match serde_json::to_value(cooldown) {
            Ok(context) => nodes.push(PreconditionNode::single_with("Cooldown", context)),
            Err(error) => warn!(command = %options.name, %error, "dropping unserializable cooldown"),
        }
    }

    PreconditionNode::And(nodes)
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("enabled", &self.options.enabled)
            .field("preconditions", &self.preconditions)
            .finish()
    }
}

impl Named for Command {
    fn name(&self) -> &str {
        &self.name
    }

    fn aliases(&self) -> Vec<String> {
        self.aliases.clone()
    }
}

/// Commands by name and alias. Clones share storage.
pub type CommandRegistry = Registry<Command>;
