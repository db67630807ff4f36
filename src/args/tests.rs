use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures_util::FutureExt;

use super::*;
use crate::identifiers::Identifier;
use crate::lexer::{Lexer, NameFilter, TokenStream, UnorderedStrategy};
use crate::model::{Channel, ChannelKind, InMemoryClient, Message, RunContext, User};

fn args_with(input: &str, registry: ArgumentRegistry) -> Args {
    let strategy = UnorderedStrategy::new(NameFilter::All(true), NameFilter::All(true));
    let stream = TokenStream::new(strategy.parse(Lexer::new().lex(input)));
    let message = Message::new(
        1,
        format!("!test {input}"),
        User::new(2, "alice"),
        Channel::guild(3, 4, "general", ChannelKind::Text),
    );
    Args::new(
        Arc::new(message),
        stream,
        Arc::new(RunContext::default()),
        Arc::new(InMemoryClient::new(9)),
        registry,
    )
}

fn args(input: &str) -> Args {
    args_with(input, ArgumentRegistry::with_defaults())
}

fn always_fails() -> Arc<dyn Resolver> {
    Args::make("never", |parameter, ctx| {
        Err(ctx.error(parameter, Identifier::from("never"), "never resolves"))
    })
}

#[tokio::test]
async fn test_pick_consumes_each_token_once() {
    let mut args = args("1 2");
    assert_eq!(args.pick::<i64>("integer").await, Ok(1));
    assert_eq!(args.pick::<i64>("integer").await, Ok(2));
    assert_eq!(args.pick::<i64>("integer").await, Err(ArgsError::MissingArguments));
}

#[tokio::test]
async fn test_failed_pick_leaves_token() {
    let mut args = args("x 5");

    let error = args.pick::<i64>("integer").await.unwrap_err();
    assert_eq!(error.identifier(), Identifier::ArgumentIntegerError);
    assert_eq!(error.parameter(), Some("x"));

    assert_eq!(args.pick::<String>("string").await.unwrap(), "x");
    assert_eq!(args.pick::<i64>("integer").await, Ok(5));
}

#[tokio::test]
async fn test_unavailable_argument() {
    let mut args = args("x");
    let error = args.pick::<String>("colour").await.unwrap_err();
    assert_eq!(error, ArgsError::UnavailableArgument { name: "colour".to_string() });
    assert!(error.is_configuration_defect());
    assert!(!args.finished());
}

#[tokio::test]
async fn test_unexpected_type() {
    let mut args = args("5");
    let error = args.pick::<String>("integer").await.unwrap_err();
    assert_eq!(error.identifier(), Identifier::UnexpectedArgumentType);
}

#[tokio::test]
async fn test_type_mismatch_leaves_tokens_unconsumed() {
    let mut args = args("5 6 7");
    let before = args.state().clone();

    assert!(matches!(
        args.pick::<String>("integer").await,
        Err(ArgsError::UnexpectedType { .. })
    ));
    assert_eq!(args.state(), &before);
    assert!(matches!(
        args.rest::<bool>("string").await,
        Err(ArgsError::UnexpectedType { .. })
    ));
    assert_eq!(args.state(), &before);
    assert!(matches!(
        args.repeat::<String>("integer").await,
        Err(ArgsError::UnexpectedType { .. })
    ));
    assert_eq!(args.state(), &before);

    assert_eq!(args.repeat::<i64>("integer").await, Ok(vec![5, 6, 7]));
}

#[tokio::test]
async fn test_registry_lookup_happens_at_read_time() {
    let registry = ArgumentRegistry::new("argument");
    let mut args = args_with("abc", registry.clone());

    assert!(matches!(
        args.pick::<String>("string").await,
        Err(ArgsError::UnavailableArgument { .. })
    ));

    registry.register(Arc::new(resolvers::StringResolver)).unwrap();
    assert_eq!(args.pick::<String>("string").await.unwrap(), "abc");
}

#[tokio::test]
async fn test_rest_keeps_spacing() {
    let mut args = args("10 being   very rude");
    assert_eq!(args.pick::<i64>("integer").await, Ok(10));
    assert_eq!(args.rest::<String>("string").await.unwrap(), "being   very rude");
    assert!(args.finished());
    assert_eq!(args.rest::<String>("string").await, Err(ArgsError::MissingArguments));
}

#[tokio::test]
async fn test_rest_failure_restores_cursor() {
    let mut args = args("a b c");
    args.pick::<String>("string").await.unwrap();
    let before = args.state().clone();

    let result = args.rest_result(always_fails(), ArgOptions::new()).await;
    assert!(result.is_err());
    assert_eq!(args.state(), &before);

    assert_eq!(args.rest::<String>("string").await.unwrap(), "b c");
}

#[tokio::test]
async fn test_repeat_first_failure_is_fatal() {
    let mut args = args("x 1");
    let error = args.repeat::<i64>("integer").await.unwrap_err();
    assert_eq!(error.parameter(), Some("x"));
    assert_eq!(args.state().position, 0);
}

#[tokio::test]
async fn test_repeat_stops_at_later_failure() {
    let mut args = args("1 x 2");
    assert_eq!(args.repeat::<i64>("integer").await, Ok(vec![1]));
    assert_eq!(args.state().position, 1);
    assert_eq!(args.pick::<String>("string").await.unwrap(), "x");
}

#[tokio::test]
async fn test_repeat_times_and_empty_stream() {
    let mut args = args("1 2 3");
    let values = args
        .repeat_with::<i64>("integer", ArgOptions::new().times(2))
        .await
        .unwrap();
    assert_eq!(values, vec![1, 2]);
    assert_eq!(args.repeat::<i64>("integer").await, Ok(vec![3]));
    assert_eq!(args.repeat::<i64>("integer").await, Err(ArgsError::MissingArguments));
}

#[tokio::test]
async fn test_peek_never_consumes() {
    let mut args = args("5 x");
    assert_eq!(args.peek::<i64>("integer").await, Ok(5));
    assert!(args.peek::<bool>("boolean").await.is_err());
    assert_eq!(args.state().position, 0);
    assert_eq!(args.pick::<i64>("integer").await, Ok(5));
}

#[tokio::test]
async fn test_lookahead_restores_after_callback() {
    let mut args = args("a b c");
    let consumed = args
        .lookahead(|args| async move { args.rest::<String>("string").await.ok() }.boxed())
        .await;
    assert_eq!(consumed.as_deref(), Some("a b c"));
    assert_eq!(args.pick::<String>("string").await.unwrap(), "a");
}

#[tokio::test]
async fn test_manual_save_and_restore() {
    let mut args = args("a b");

    // Nothing saved yet.
    args.restore();
    assert_eq!(args.state().position, 0);

    args.save();
    args.next();
    args.next();
    assert!(args.finished());
    args.restore();
    assert_eq!(args.next().as_deref(), Some("a"));

    args.start();
    assert_eq!(args.next().as_deref(), Some("a"));
}

#[tokio::test]
async fn test_next_with_only_consumes_on_some() {
    let mut args = args("x 7");
    assert_eq!(args.next_with(|v| v.parse::<u8>().ok()), None);
    assert_eq!(args.next().as_deref(), Some("x"));
    assert_eq!(args.next_with(|v| v.parse::<u8>().ok()), Some(7));
}

#[tokio::test]
async fn test_flags_and_options() {
    let args = args("--silent --days=3 --days=7 target");
    assert!(args.get_flags(&["s", "silent"]));
    assert!(!args.get_flags(&["loud"]));
    assert_eq!(args.get_option(&["d", "days"]).as_deref(), Some("7"));
    assert_eq!(
        args.get_options(&["days"]),
        Some(vec!["3".to_string(), "7".to_string()])
    );
    assert_eq!(args.get_option(&["reason"]), None);
}

#[tokio::test]
async fn test_made_resolver_sees_options() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let shout = Args::make("shout", move |parameter, ctx| {
        counter.fetch_add(1, Ordering::SeqCst);
        let limit = ctx.options.maximum.unwrap_or(f64::MAX);
        if parameter.len() as f64 > limit {
            return Err(ctx.error(parameter, Identifier::from("tooLoud"), "too loud"));
        }
        Ok(ArgValue::String(parameter.to_uppercase()))
    });

    let mut args = args("hey there");
    let value = args
        .pick_with::<String>(&shout, ArgOptions::new().maximum(3.0))
        .await
        .unwrap();
    assert_eq!(value, "HEY");

    let error = args
        .pick_with::<String>(&shout, ArgOptions::new().maximum(3.0))
        .await
        .unwrap_err();
    assert_eq!(error.identifier(), Identifier::from("tooLoud"));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_resolver_panic_is_contained() {
    let boom = Args::make("boom", |_, _| panic!("resolver exploded"));
    let mut args = args("x");

    let error = args.pick_result(boom, ArgOptions::new()).await.unwrap_err();
    assert_eq!(error.identifier(), Identifier::ArgumentResolverPanicked);
    assert!(error.to_string().contains("resolver exploded"));
    assert!(!args.finished());
}
