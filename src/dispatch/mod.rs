//! Message dispatch.
//!
//! [`Dispatcher::handle_message`] walks a message through the pipeline:
//!
//! 1. drop messages from bots and webhooks
//! 2. match the prefix (static, per-message or a mention of the bot)
//! 3. look the command up by name or alias
//! 4. run global, then command preconditions
//! 5. bind a fresh argument reader to the parameters
//! 6. run the command body, containing errors and panics
//! 7. report completion exactly once
//!
//! Every step is published on the [`EventBus`] as a [`DispatchEvent`].

mod dispatcher;
mod error;
mod event;
mod prefix;

pub use dispatcher::{DispatchOutcome, Dispatcher, DispatcherOptions};
pub use error::ExecutionError;
pub use event::{DispatchEvent, DispatchPayload, EventBus};
pub use prefix::{Prefix, PrefixResolver};
