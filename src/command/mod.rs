//! Command descriptors.
//!
//! A [`Command`] couples declarative [`CommandOptions`] (names, run-in
//! restrictions, permissions, cooldown, lexer settings) with the body that
//! runs once every precondition has passed.

mod descriptor;
mod options;

pub use descriptor::{Command, CommandRegistry, CommandRun};
pub use options::{CommandOptions, RunIn};
