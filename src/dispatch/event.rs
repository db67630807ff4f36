//! Dispatch events and the bus that carries them.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{debug, trace};
use uuid::Uuid;

use super::ExecutionError;
use crate::command::Command;
use crate::model::{Message, RunContext};
use crate::precondition::PreconditionError;

/// Everything known about an invocation once its command is resolved.
#[derive(Debug)]
pub struct DispatchPayload {
    /// Unique id of this invocation.
    pub id: Uuid,
    /// The triggering message.
    pub message: Arc<Message>,
    /// The resolved command.
    pub command: Arc<Command>,
    /// Raw parameter text after the command name.
    pub parameters: String,
    /// How the command was invoked.
    pub context: Arc<RunContext>,
}

/// One observation from the dispatch pipeline.
#[derive(Debug, Clone)]
pub enum DispatchEvent {
    /// A message entered the pipeline.
    MessageReceived {
        /// The message.
        message: Arc<Message>,
    },
    /// The message did not start with a prefix.
    NonPrefixedMessage {
        /// The message.
        message: Arc<Message>,
    },
    /// The message was nothing but a mention of the bot.
    MentionPrefixOnly {
        /// The message.
        message: Arc<Message>,
    },
    /// A prefix matched.
    PrefixedMessage {
        /// The message.
        message: Arc<Message>,
        /// The matched prefix text.
        prefix: String,
    },
    /// A prefix matched but no command name followed it.
    UnknownCommandName {
        /// The message.
        message: Arc<Message>,
        /// The matched prefix text.
        prefix: String,
    },
    /// No command is registered under the given name.
    UnknownCommand {
        /// The message.
        message: Arc<Message>,
        /// The matched prefix text.
        prefix: String,
        /// The name that was looked up.
        name: String,
    },
    /// A command was resolved and is about to be gated.
    PreCommandRun {
        /// The invocation.
        payload: Arc<DispatchPayload>,
    },
    /// A precondition denied the invocation.
    CommandDenied {
        /// The invocation.
        payload: Arc<DispatchPayload>,
        /// Why it was denied.
        error: Arc<PreconditionError>,
    },
    /// Every precondition passed.
    CommandAccepted {
        /// The invocation.
        payload: Arc<DispatchPayload>,
    },
    /// The command body is about to run.
    CommandRun {
        /// The invocation.
        payload: Arc<DispatchPayload>,
    },
    /// The command body returned a value.
    CommandSuccess {
        /// The invocation.
        payload: Arc<DispatchPayload>,
        /// What the body returned.
        result: Arc<Value>,
    },
    /// The command body failed or panicked.
    CommandError {
        /// The invocation.
        payload: Arc<DispatchPayload>,
        /// The failure.
        error: Arc<ExecutionError>,
    },
    /// The invocation finished, successfully or not.
    CommandFinish {
        /// The invocation.
        payload: Arc<DispatchPayload>,
        /// Time spent running the body.
        duration: Duration,
        /// Whether the body succeeded.
        success: bool,
    },
}

impl DispatchEvent {
    /// Stable event name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::MessageReceived { .. } => "messageReceived",
            Self::NonPrefixedMessage { .. } => "nonPrefixedMessage",
            Self::MentionPrefixOnly { .. } => "mentionPrefixOnly",
            Self::PrefixedMessage { .. } => "prefixedMessage",
            Self::UnknownCommandName { .. } => "unknownCommandName",
            Self::UnknownCommand { .. } => "unknownCommand",
            Self::PreCommandRun { .. } => "preCommandRun",
            Self::CommandDenied { .. } => "commandDenied",
            Self::CommandAccepted { .. } => "commandAccepted",
            Self::CommandRun { .. } => "commandRun",
            Self::CommandSuccess { .. } => "commandSuccess",
            Self::CommandError { .. } => "commandError",
            Self::CommandFinish { .. } => "commandFinish",
        }
    }

    /// The message behind the event.
    pub fn message(&self) -> &Arc<Message> {
        match self {
            Self::MessageReceived { message }
            | Self::NonPrefixedMessage { message }
            | Self::MentionPrefixOnly { message }
            | Self::PrefixedMessage { message, .. }
            | Self::UnknownCommandName { message, .. }
            | Self::UnknownCommand { message, .. } => message,
            Self::PreCommandRun { payload }
            | Self::CommandDenied { payload, .. }
            | Self::CommandAccepted { payload }
            | Self::CommandRun { payload }
            | Self::CommandSuccess { payload, .. }
            | Self::CommandError { payload, .. }
            | Self::CommandFinish { payload, .. } => &payload.message,
        }
    }

    /// The invocation, once a command has been resolved.
    pub fn payload(&self) -> Option<&Arc<DispatchPayload>> {
        match self {
            Self::PreCommandRun { payload }
            | Self::CommandDenied { payload, .. }
            | Self::CommandAccepted { payload }
            | Self::CommandRun { payload }
            | Self::CommandSuccess { payload, .. }
            | Self::CommandError { payload, .. }
            | Self::CommandFinish { payload, .. } => Some(payload),
            _ => None,
        }
    }
}

/// Typed broadcast channel for [`DispatchEvent`]s.
///
/// Emitting never blocks. Slow subscribers lag and miss events rather than
/// holding the pipeline up.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<DispatchEvent>,
}

impl EventBus {
    /// A bus that buffers up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Receive every event emitted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<DispatchEvent> {
        self.sender.subscribe()
    }

    /// Number of live subscribers.
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Publish an event.
    pub fn emit(&self, event: DispatchEvent) {
        match event.payload() {
            Some(payload) => debug!(
                event = event.name(),
                invocation = %payload.id,
                command = payload.command.name(),
                "dispatch event"
            ),
            None => debug!(event = event.name(), message = event.message().id, "dispatch event"),
        }
        if self.sender.send(event).is_err() {
            trace!("no dispatch event subscribers");
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
