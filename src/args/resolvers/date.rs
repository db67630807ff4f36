use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, SecondsFormat, TimeZone, Utc};
use serde_json::json;

use crate::args::{ArgValue, ArgumentError, Resolver, ResolverContext};
use crate::identifiers::Identifier;

/// RFC 3339 timestamp or `YYYY-MM-DD`. Bounds are epoch milliseconds.
pub struct DateResolver;

fn parse_date(parameter: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc3339(parameter) {
        return Some(date.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(parameter, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn describe(millis: f64) -> String {
    Utc.timestamp_millis_opt(millis as i64)
        .single()
        .map(|date| date.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_else(|| millis.to_string())
}

#[async_trait]
impl Resolver for DateResolver {
    fn name(&self) -> &str {
        "date"
    }

    async fn resolve(&self, parameter: &str, ctx: &ResolverContext<'_>) -> Result<ArgValue, ArgumentError> {
        let date = parse_date(parameter).ok_or_else(|| {
            ctx.error(
                parameter,
                Identifier::ArgumentDateError,
                "The argument did not resolve to a date.",
            )
        })?;
        let millis = date.timestamp_millis() as f64;

        if let Some(minimum) = ctx.options.minimum {
            if millis < minimum {
                return Err(ctx
                    .error(
                        parameter,
                        Identifier::ArgumentDateTooSmall,
                        format!("The argument must be after {}.", describe(minimum)),
                    )
                    .with_context(json!({ "minimum": minimum })));
            }
        }
        if let Some(maximum) = ctx.options.maximum {
            if millis > maximum {
                return Err(ctx
                    .error(
                        parameter,
                        Identifier::ArgumentDateTooBig,
                        format!("The argument must be before {}.", describe(maximum)),
                    )
                    .with_context(json!({ "maximum": maximum })));
            }
        }

        Ok(ArgValue::Date(date))
    }
}
