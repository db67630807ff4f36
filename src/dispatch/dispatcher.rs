//! The dispatch pipeline.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use serde_json::Value;
use tokio::sync::broadcast;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::event::{DispatchEvent, DispatchPayload, EventBus};
use super::prefix::strip_mention;
use super::{ExecutionError, PrefixResolver};
use crate::args::ArgumentRegistry;
use crate::command::CommandRegistry;
use crate::fault::panic_message;
use crate::model::{ChatClient, Message, RunContext};
use crate::precondition::{AccessPolicy, CooldownManager, PreconditionContext, PreconditionError, PreconditionRegistry};

/// Pipeline switches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatcherOptions {
    /// Fold command names to lowercase before lookup.
    pub case_insensitive_commands: bool,
    /// Compare literal prefixes ignoring case.
    pub case_insensitive_prefixes: bool,
    /// Accept a mention of the bot as a prefix.
    pub mention_prefix: bool,
    /// Owners and disabled commands.
    pub access: AccessPolicy,
    /// Events buffered per subscriber.
    pub event_capacity: usize,
}

impl Default for DispatcherOptions {
    fn default() -> Self {
        Self {
            case_insensitive_commands: false,
            case_insensitive_prefixes: false,
            mention_prefix: true,
            access: AccessPolicy::default(),
            event_capacity: 256,
        }
    }
}

/// How [`Dispatcher::handle_message`] ended. Mirrors the terminal event.
#[derive(Debug)]
pub enum DispatchOutcome {
    /// Sent by a bot or webhook.
    Ignored,
    /// No prefix matched.
    NotPrefixed,
    /// The message only mentioned the bot.
    MentionPrefixOnly,
    /// A prefix matched with nothing after it.
    UnknownCommandName,
    /// No command under that name.
    UnknownCommand {
        /// The name that was looked up.
        name: String,
    },
    /// A precondition denied the invocation.
    Denied {
        /// The command name.
        command: String,
        /// Why it was denied.
        error: Arc<PreconditionError>,
    },
    /// The body returned a value.
    Succeeded {
        /// The command name.
        command: String,
        /// What the body returned.
        result: Arc<Value>,
    },
    /// The body failed or panicked.
    Failed {
        /// The command name.
        command: String,
        /// The failure.
        error: Arc<ExecutionError>,
    },
}

impl DispatchOutcome {
    /// Whether a command body ran and succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }
}

/// Emits `CommandFinish` when dropped, so completion is reported exactly
/// once even if the caller drops the dispatch future mid-body.
///
/// A body that never reported an outcome was cancelled: the guard emits
/// `CommandError` with [`ExecutionError::Cancelled`] before finishing.
struct FinishGuard {
    events: EventBus,
    payload: Arc<DispatchPayload>,
    started: Instant,
    success: bool,
    reported: bool,
}

impl Drop for FinishGuard {
    fn drop(&mut self) {
        let duration = self.started.elapsed();
        if !self.reported {
            warn!(
                command = self.payload.command.name(),
                invocation = %self.payload.id,
                "command cancelled"
            );
            self.events.emit(DispatchEvent::CommandError {
                payload: Arc::clone(&self.payload),
                error: Arc::new(ExecutionError::Cancelled),
            });
        }
        info!(
            command = self.payload.command.name(),
            invocation = %self.payload.id,
            duration_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
            success = self.success,
            "command finished"
        );
        self.events.emit(DispatchEvent::CommandFinish {
            payload: Arc::clone(&self.payload),
            duration,
            success: self.success,
        });
    }
}

/// Turns messages into command invocations.
pub struct Dispatcher {
    client: Arc<dyn ChatClient>,
    prefix: Arc<dyn PrefixResolver>,
    options: DispatcherOptions,
    commands: CommandRegistry,
    arguments: ArgumentRegistry,
    preconditions: PreconditionRegistry,
    cooldowns: CooldownManager,
    events: EventBus,
}

impl Dispatcher {
    /// A dispatcher with default options and the built-in resolvers and preconditions.
    pub fn new(client: Arc<dyn ChatClient>, prefix: impl PrefixResolver + 'static) -> Self {
        Self::with_options(client, prefix, DispatcherOptions::default())
    }

    /// A dispatcher with explicit options.
    pub fn with_options(
        client: Arc<dyn ChatClient>,
        prefix: impl PrefixResolver + 'static,
        options: DispatcherOptions,
    ) -> Self {
        let cooldowns = CooldownManager::new();
        Self {
            client,
            prefix: Arc::new(prefix),
            events: EventBus::new(options.event_capacity),
            options,
            commands: CommandRegistry::new("command"),
            arguments: ArgumentRegistry::with_defaults(),
            preconditions: PreconditionRegistry::with_defaults(cooldowns.clone()),
            cooldowns,
        }
    }

    /// Registered commands.
    pub fn commands(&self) -> &CommandRegistry {
        &self.commands
    }

    /// Registered argument resolvers.
    pub fn arguments(&self) -> &ArgumentRegistry {
        &self.arguments
    }

    /// Registered preconditions.
    pub fn preconditions(&self) -> &PreconditionRegistry {
        &self.preconditions
    }

    /// The cooldown table shared with the `Cooldown` precondition.
    pub fn cooldowns(&self) -> &CooldownManager {
        &self.cooldowns
    }

    /// The event bus.
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Subscribe to dispatch events.
    pub fn subscribe(&self) -> broadcast::Receiver<DispatchEvent> {
        self.events.subscribe()
    }

    /// Pipeline switches.
    pub fn options(&self) -> &DispatcherOptions {
        &self.options
    }

    /// Run one message through the pipeline.
    pub async fn handle_message(&self, message: impl Into<Arc<Message>>) -> DispatchOutcome {
        let message: Arc<Message> = message.into();
        self.events.emit(DispatchEvent::MessageReceived {
            message: Arc::clone(&message),
        });

        if message.is_automated() {
            debug!(message = message.id, "ignoring automated message");
            return DispatchOutcome::Ignored;
        }

        let content = message.content.as_str();
        let mention = if self.options.mention_prefix {
            strip_mention(content, self.client.user_id())
        } else {
            None
        };

        let configured = self.prefix.resolve(&message).await;
        let (matched, remainder) = match mention {
            Some((mention, rest)) => {
                if rest.trim().is_empty() {
                    self.events.emit(DispatchEvent::MentionPrefixOnly {
                        message: Arc::clone(&message),
                    });
                    return DispatchOutcome::MentionPrefixOnly;
                }
                (mention, rest)
            }
            None => match configured.find(content, self.options.case_insensitive_prefixes) {
                Some(prefix) => (prefix, &content[prefix.len()..]),
                None => {
                    self.events.emit(DispatchEvent::NonPrefixedMessage {
                        message: Arc::clone(&message),
                    });
                    return DispatchOutcome::NotPrefixed;
                }
            },
        };
        let matched = matched.to_string();

        self.events.emit(DispatchEvent::PrefixedMessage {
            message: Arc::clone(&message),
            prefix: matched.clone(),
        });

        let remainder = remainder.trim();
        let (typed_name, parameters) = match remainder.split_once(char::is_whitespace) {
            Some((name, parameters)) => (name, parameters.trim()),
            None => (remainder, ""),
        };
        if typed_name.is_empty() {
            self.events.emit(DispatchEvent::UnknownCommandName {
                message: Arc::clone(&message),
                prefix: matched,
            });
            return DispatchOutcome::UnknownCommandName;
        }

        let lookup = if self.options.case_insensitive_commands {
            typed_name.to_lowercase()
        } else {
            typed_name.to_string()
        };
        let Some(command) = self.commands.get(&lookup) else {
            debug!(name = %lookup, "unknown command");
            self.events.emit(DispatchEvent::UnknownCommand {
                message: Arc::clone(&message),
                prefix: matched,
                name: lookup.clone(),
            });
            return DispatchOutcome::UnknownCommand { name: lookup };
        };

        let context = Arc::new(RunContext {
            command_name: typed_name.to_string(),
            command_prefix: matched,
            prefix: configured.to_string(),
        });
        let payload = Arc::new(DispatchPayload {
            id: Uuid::new_v4(),
            message: Arc::clone(&message),
            command: Arc::clone(&command),
            parameters: parameters.to_string(),
            context: Arc::clone(&context),
        });
        self.events.emit(DispatchEvent::PreCommandRun {
            payload: Arc::clone(&payload),
        });

        let no_parameters = Value::Null;
        let ctx = PreconditionContext {
            message: &message,
            command: &command,
            run_context: &context,
            client: self.client.as_ref(),
            access: &self.options.access,
            parameters: &no_parameters,
        };
        let gate = match self.preconditions.run_global(&ctx).await {
            Ok(()) => command.check(&self.preconditions, &ctx).await,
            Err(error) => Err(error),
        };
        if let Err(error) = gate {
            info!(
                command = command.name(),
                invocation = %payload.id,
                precondition = %error.precondition,
                identifier = %error.identifier,
                "command denied"
            );
            let error = Arc::new(error);
            self.events.emit(DispatchEvent::CommandDenied {
                payload: Arc::clone(&payload),
                error: Arc::clone(&error),
            });
            return DispatchOutcome::Denied {
                command: command.name().to_string(),
                error,
            };
        }

        self.events.emit(DispatchEvent::CommandAccepted {
            payload: Arc::clone(&payload),
        });
        self.execute(payload).await
    }

    async fn execute(&self, payload: Arc<DispatchPayload>) -> DispatchOutcome {
        let command = Arc::clone(&payload.command);
        let mut args = command.pre_parse(
            Arc::clone(&payload.message),
            &payload.parameters,
            Arc::clone(&payload.context),
            Arc::clone(&self.client),
            self.arguments.clone(),
        );

        let mut finish = FinishGuard {
            events: self.events.clone(),
            payload: Arc::clone(&payload),
            started: Instant::now(),
            success: false,
            reported: false,
        };
        self.events.emit(DispatchEvent::CommandRun {
            payload: Arc::clone(&payload),
        });

        let run = command.run(&payload.message, &mut args, &payload.context);
        let result = match AssertUnwindSafe(run).catch_unwind().await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(error)) => Err(ExecutionError::Failed(error)),
            Err(panic) => {
                let reason = panic_message(panic);
                warn!(command = command.name(), invocation = %payload.id, %reason, "command panicked");
                Err(ExecutionError::Panicked(reason))
            }
        };

        finish.reported = true;
        let outcome = match result {
            Ok(value) => {
                finish.success = true;
                let result = Arc::new(value);
                self.events.emit(DispatchEvent::CommandSuccess {
                    payload: Arc::clone(&payload),
                    result: Arc::clone(&result),
                });
                DispatchOutcome::Succeeded {
                    command: command.name().to_string(),
                    result,
                }
            }
            Err(error) => {
                warn!(command = command.name(), invocation = %payload.id, %error, "command failed");
                let error = Arc::new(error);
                self.events.emit(DispatchEvent::CommandError {
                    payload: Arc::clone(&payload),
                    error: Arc::clone(&error),
                });
                DispatchOutcome::Failed {
                    command: command.name().to_string(),
                    error,
                }
            }
        };
        drop(finish);
        outcome
    }
}
