//! Bot Command Kit (BCK) - command dispatch for chat bots
//!
//! BCK provides a set of feature-gated modules for turning chat messages into
//! command invocations:
//!
//! - **`lexer`** - Quote-aware tokenizer, flag/option strategy and token stream
//! - **`args`** - Typed argument reader with save/restore backtracking
//! - **`commands`** - Precondition engine (AND/OR trees, cooldowns) and command descriptors
//! - **`dispatch`** - The message dispatch pipeline and its event stream
//! - **`config`** - TOML configuration and environment loading
//! - **`observability`** - Markdown audit log fed by dispatch events
//!
//! # Features
//!
//! Enable the features you need in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! bck = { version = "0.3", default-features = false, features = ["args"] }
//! # Or enable everything:
//! bck = { version = "0.3", features = ["all"] }
//! ```
//!
//! # Example: Dispatching a message
//!
//! ```ignore
//! use bck::prelude::*;
//! use std::sync::Arc;
//!
//! let client = Arc::new(InMemoryClient::new(1));
//! let dispatcher = Dispatcher::new(client, Prefix::text("!"));
//! dispatcher.commands().register(Arc::new(Command::new(
//!     CommandOptions::new("ping"),
//!     PingCommand,
//! )))?;
//!
//! let mut events = dispatcher.subscribe();
//! let outcome = dispatcher.handle_message(message).await;
//! ```
//!
//! # Example: Reading arguments inside a command
//!
//! ```ignore
//! let member: Member = args.pick("member").await?;
//! let days: f64 = args.pick_with("number", ArgOptions::new().minimum(0.0)).await?;
//! let reason: String = args.rest("string").await?;
//! ```

#![warn(missing_docs)]

/// Machine-readable error identifiers (always available)
pub mod identifiers;

#[cfg(feature = "args")]
mod fault;

/// Named piece registries (enabled with the `args` feature)
#[cfg(feature = "args")]
pub mod registry;

/// Tokenizer and token stream (enabled with the `lexer` feature)
#[cfg(feature = "lexer")]
pub mod lexer;

/// Chat object model and client contract (enabled with the `model` feature)
#[cfg(feature = "model")]
pub mod model;

/// Argument reader and resolvers (enabled with the `args` feature)
#[cfg(feature = "args")]
pub mod args;

/// Precondition engine (enabled with the `commands` feature)
#[cfg(feature = "commands")]
pub mod precondition;

/// Command descriptors (enabled with the `commands` feature)
#[cfg(feature = "commands")]
pub mod command;

/// Dispatch pipeline (enabled with the `dispatch` feature)
#[cfg(feature = "dispatch")]
pub mod dispatch;

/// Configuration management (enabled with the `config` feature)
#[cfg(feature = "config")]
pub mod config;

/// Observability utilities (enabled with the `observability` feature)
#[cfg(feature = "observability")]
pub mod observability;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::identifiers::Identifier;

    #[cfg(feature = "lexer")]
    pub use crate::lexer::{Lexer, NameFilter, Token, TokenStream, UnorderedStrategy};

    #[cfg(feature = "model")]
    pub use crate::model::{
        Channel, ChannelKind, ChatClient, InMemoryClient, Member, Message, Permissions,
        RunContext, Snowflake, User,
    };

    #[cfg(feature = "args")]
    pub use crate::args::{
        ArgOptions, ArgType, ArgValue, ArgumentError, ArgumentRegistry, ArgumentResult, Args,
        ArgsError, Resolver, ResolverContext,
    };

    #[cfg(feature = "args")]
    pub use crate::registry::{Named, Registry, RegistryError};

    #[cfg(feature = "commands")]
    pub use crate::precondition::{
        BucketScope, CooldownManager, Precondition, PreconditionContext, PreconditionEntry,
        PreconditionError, PreconditionNode, PreconditionRegistry, PreconditionResult,
    };

    #[cfg(feature = "commands")]
    pub use crate::command::{Command, CommandOptions, CommandRegistry, CommandRun, RunIn};

    #[cfg(feature = "dispatch")]
    pub use crate::dispatch::{
        DispatchEvent, DispatchOutcome, DispatchPayload, Dispatcher, DispatcherOptions,
        EventBus, ExecutionError, Prefix, PrefixResolver,
    };

    #[cfg(feature = "config")]
    pub use crate::config::{ConfigurationLoader, EnvironmentLoader, FrameworkConfig};

    #[cfg(feature = "observability")]
    pub use crate::observability::AuditLogger;
}
