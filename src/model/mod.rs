//! Chat object model and the client collaborator.
//!
//! The dispatcher never talks to a chat platform directly. Everything it needs
//! (users, members, channels, messages, permission bit-sets) is described by
//! the types here and fetched through a [`ChatClient`].

mod client;
mod entities;
pub mod mentions;
mod permissions;

pub use client::{ChatClient, InMemoryClient};
pub use entities::{Channel, ChannelKind, Member, Message, RunContext, Snowflake, User};
pub use permissions::Permissions;
