use async_trait::async_trait;
use serde_json::json;

use crate::args::{ArgValue, ArgumentError, Resolver, ResolverContext};
use crate::identifiers::Identifier;

/// Floating point number with optional bounds.
pub struct NumberResolver;

/// Whole number with optional bounds.
pub struct IntegerResolver;

fn check_bounds(
    parameter: &str,
    value: f64,
    ctx: &ResolverContext<'_>,
    too_small: Identifier,
    too_big: Identifier,
) -> Result<(), ArgumentError> {
    if let Some(minimum) = ctx.options.minimum {
        if value < minimum {
            return Err(ctx
                .error(parameter, too_small, format!("The argument must be greater than {minimum}."))
                .with_context(json!({ "minimum": minimum })));
        }
    }
    if let Some(maximum) = ctx.options.maximum {
        if value > maximum {
            return Err(ctx
                .error(parameter, too_big, format!("The argument must be smaller than {maximum}."))
                .with_context(json!({ "maximum": maximum })));
        }
    }
    Ok(())
}

#[async_trait]
impl Resolver for NumberResolver {
    fn name(&self) -> &str {
        "number"
    }

    fn aliases(&self) -> Vec<String> {
        vec!["float".to_string()]
    }

    async fn resolve(&self, parameter: &str, ctx: &ResolverContext<'_>) -> Result<ArgValue, ArgumentError> {
        let value = parameter
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| {
                ctx.error(
                    parameter,
                    Identifier::ArgumentNumberError,
                    "The argument did not resolve to a valid number.",
                )
            })?;

        check_bounds(
            parameter,
            value,
            ctx,
            Identifier::ArgumentNumberTooSmall,
            Identifier::ArgumentNumberTooBig,
        )?;
        Ok(ArgValue::Number(value))
    }
}

#[async_trait]
impl Resolver for IntegerResolver {
    fn name(&self) -> &str {
        "integer"
    }

    async fn resolve(&self, parameter: &str, ctx: &ResolverContext<'_>) -> Result<ArgValue, ArgumentError> {
        let value = parameter.parse::<i64>().map_err(|_| {
            ctx.error(
                parameter,
                Identifier::ArgumentIntegerError,
                "The argument did not resolve to a valid integer.",
            )
        })?;

        check_bounds(
            parameter,
            value as f64,
            ctx,
            Identifier::ArgumentIntegerTooSmall,
            Identifier::ArgumentIntegerTooBig,
        )?;
        Ok(ArgValue::Integer(value))
    }
}
