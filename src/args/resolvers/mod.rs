//! Built-in resolvers.
//!
//! | Name          | Produces                  | Bounds                   |
//! |---------------|---------------------------|--------------------------|
//! | `string`      | [`ArgValue::String`]      | length in characters     |
//! | `number`      | [`ArgValue::Number`]      | value                    |
//! | `integer`     | [`ArgValue::Integer`]     | value                    |
//! | `boolean`     | [`ArgValue::Boolean`]     |                          |
//! | `date`        | [`ArgValue::Date`]        | epoch milliseconds       |
//! | `user`        | [`ArgValue::User`]        |                          |
//! | `member`      | [`ArgValue::Member`]      |                          |
//! | `channel`     | [`ArgValue::Channel`]     |                          |
//! | `newsChannel` | [`ArgValue::Channel`]     |                          |
//! | `textChannel` | [`ArgValue::Channel`]     |                          |
//! | `message`     | [`ArgValue::Message`]     |                          |
//!
//! [`ArgValue::String`]: crate::args::ArgValue::String
//! [`ArgValue::Number`]: crate::args::ArgValue::Number
//! [`ArgValue::Integer`]: crate::args::ArgValue::Integer
//! [`ArgValue::Boolean`]: crate::args::ArgValue::Boolean
//! [`ArgValue::Date`]: crate::args::ArgValue::Date
//! [`ArgValue::User`]: crate::args::ArgValue::User
//! [`ArgValue::Member`]: crate::args::ArgValue::Member
//! [`ArgValue::Channel`]: crate::args::ArgValue::Channel
//! [`ArgValue::Message`]: crate::args::ArgValue::Message

use std::sync::Arc;

use tracing::warn;

use super::{ArgumentRegistry, Resolver};

mod boolean;
mod channel;
mod date;
mod message;
mod number;
mod string;
mod user;

pub use boolean::BooleanResolver;
pub use channel::{ChannelResolver, NewsChannelResolver, TextChannelResolver};
pub use date::DateResolver;
pub use message::MessageResolver;
pub use number::{IntegerResolver, NumberResolver};
pub use string::{resolve_string, StringResolver};
pub use user::{MemberResolver, UserResolver};

/// Every built-in resolver.
pub fn defaults() -> Vec<Arc<dyn Resolver>> {
    vec![
        Arc::new(StringResolver),
        Arc::new(NumberResolver),
        Arc::new(IntegerResolver),
        Arc::new(BooleanResolver),
        Arc::new(DateResolver),
        Arc::new(UserResolver),
        Arc::new(MemberResolver),
        Arc::new(ChannelResolver),
        Arc::new(NewsChannelResolver),
        Arc::new(TextChannelResolver),
        Arc::new(MessageResolver),
    ]
}

/// Register the built-in resolvers, replacing same-named entries.
pub fn register_defaults(registry: &ArgumentRegistry) {
    for resolver in defaults() {
        if let Some(previous) = registry.register_or_replace(resolver) {
            warn!(argument = previous.name(), "replaced an existing resolver with the built-in one");
        }
    }
}

#[cfg(test)]
mod tests;
