use async_trait::async_trait;
use serde_json::json;

use crate::args::{ArgValue, ArgumentError, Resolver, ResolverContext};
use crate::identifiers::Identifier;

/// Free text with optional length bounds (in characters).
pub struct StringResolver;

/// Check `parameter` against the length bounds in `ctx.options`.
pub fn resolve_string(parameter: &str, ctx: &ResolverContext<'_>) -> Result<String, ArgumentError> {
    let length = parameter.chars().count() as f64;

    if let Some(minimum) = ctx.options.minimum {
        if length < minimum {
            return Err(ctx
                .error(
                    parameter,
                    Identifier::ArgumentStringTooShort,
                    format!("The argument must be longer than {minimum} characters."),
                )
                .with_context(json!({ "minimum": minimum })));
        }
    }

    if let Some(maximum) = ctx.options.maximum {
        if length > maximum {
            return Err(ctx
                .error(
                    parameter,
                    Identifier::ArgumentStringTooLong,
                    format!("The argument must be shorter than {maximum} characters."),
                )
                .with_context(json!({ "maximum": maximum })));
        }
    }

    Ok(parameter.to_string())
}

#[async_trait]
impl Resolver for StringResolver {
    fn name(&self) -> &str {
        "string"
    }

    async fn resolve(&self, parameter: &str, ctx: &ResolverContext<'_>) -> Result<ArgValue, ArgumentError> {
        resolve_string(parameter, ctx).map(ArgValue::String)
    }
}
