//! Values produced by resolvers.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::model::{Channel, Member, Message, User};

/// A resolved argument.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum ArgValue {
    /// Free text.
    String(String),
    /// Floating point number.
    Number(f64),
    /// Whole number.
    Integer(i64),
    /// Boolean.
    Boolean(bool),
    /// Point in time.
    Date(DateTime<Utc>),
    /// Platform user.
    User(User),
    /// Guild member.
    Member(Member),
    /// Channel.
    Channel(Channel),
    /// Message.
    Message(Box<Message>),
    /// Anything a custom resolver wants to hand back.
    Json(Value),
}

impl ArgValue {
    /// Short name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Number(_) => "number",
            Self::Integer(_) => "integer",
            Self::Boolean(_) => "boolean",
            Self::Date(_) => "date",
            Self::User(_) => "user",
            Self::Member(_) => "member",
            Self::Channel(_) => "channel",
            Self::Message(_) => "message",
            Self::Json(_) => "json",
        }
    }
}

macro_rules! arg_value_conversions {
    ($( $variant:ident($ty:ty) ),* $(,)?) => {
        $(
            impl From<$ty> for ArgValue {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }

            impl TryFrom<ArgValue> for $ty {
                type Error = ArgValue;

                fn try_from(value: ArgValue) -> Result<Self, Self::Error> {
                    match value {
                        ArgValue::$variant(inner) => Ok(inner),
                        other => Err(other),
                    }
                }
            }
        )*
    };
}

arg_value_conversions! {
    String(String),
    Number(f64),
    Integer(i64),
    Boolean(bool),
    Date(DateTime<Utc>),
    User(User),
    Member(Member),
    Channel(Channel),
    Json(Value),
}

impl From<Message> for ArgValue {
    fn from(value: Message) -> Self {
        Self::Message(Box::new(value))
    }
}

impl TryFrom<ArgValue> for Message {
    type Error = ArgValue;

    fn try_from(value: ArgValue) -> Result<Self, Self::Error> {
        match value {
            ArgValue::Message(inner) => Ok(*inner),
            other => Err(other),
        }
    }
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}
