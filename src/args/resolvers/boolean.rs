use async_trait::async_trait;

use crate::args::{ArgValue, ArgumentError, Resolver, ResolverContext};
use crate::identifiers::Identifier;

const TRUTHS: &[&str] = &["true", "t", "yes", "y", "on", "enable", "enabled", "1", "+"];
const FALSES: &[&str] = &["false", "f", "no", "n", "off", "disable", "disabled", "0", "-"];

/// Boolean words. `extra.truths` / `extra.falses` add more words.
pub struct BooleanResolver;

fn listed(extra: &serde_json::Value, key: &str, word: &str) -> bool {
    extra
        .get(key)
        .and_then(|words| words.as_array())
        .is_some_and(|words| {
            words
                .iter()
                .filter_map(|w| w.as_str())
                .any(|w| w.eq_ignore_ascii_case(word))
        })
}

#[async_trait]
impl Resolver for BooleanResolver {
    fn name(&self) -> &str {
        "boolean"
    }

    async fn resolve(&self, parameter: &str, ctx: &ResolverContext<'_>) -> Result<ArgValue, ArgumentError> {
        let word = parameter.to_lowercase();
        let extra = &ctx.options.extra;

        if TRUTHS.contains(&word.as_str()) || listed(extra, "truths", &word) {
            return Ok(ArgValue::Boolean(true));
        }
        if FALSES.contains(&word.as_str()) || listed(extra, "falses", &word) {
            return Ok(ArgValue::Boolean(false));
        }

        Err(ctx.error(
            parameter,
            Identifier::ArgumentBooleanError,
            "The argument did not resolve to a boolean.",
        ))
    }
}
