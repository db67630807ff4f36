//! The argument reader.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use tracing::{debug, warn};

use super::{
    ArgOptions, ArgType, ArgValue, ArgumentError, ArgumentRegistry, ArgumentResult, ArgsError,
    FnResolver, Resolver, ResolverContext,
};
use crate::fault::panic_message;
use crate::identifiers::Identifier;
use crate::lexer::{CursorState, TokenStream};
use crate::model::{ChatClient, Message, RunContext};

/// Reads typed arguments from a command's parameters.
///
/// Every read goes through a resolver looked up by name when the read
/// happens, so resolvers registered after the reader was built are visible.
/// A failed single read leaves its token unconsumed; `rest` restores the
/// cursor when resolution fails; `peek` always restores it.
pub struct Args {
    message: Arc<Message>,
    context: Arc<RunContext>,
    client: Arc<dyn ChatClient>,
    registry: ArgumentRegistry,
    stream: TokenStream,
    states: Vec<CursorState>,
}

impl Args {
    /// Create a reader over `stream`.
    pub fn new(
        message: Arc<Message>,
        stream: TokenStream,
        context: Arc<RunContext>,
        client: Arc<dyn ChatClient>,
        registry: ArgumentRegistry,
    ) -> Self {
        Self {
            message,
            context,
            client,
            registry,
            stream,
            states: Vec::new(),
        }
    }

    /// Build an ad-hoc resolver from a closure.
    pub fn make<F>(name: impl Into<String>, resolve: F) -> Arc<dyn Resolver>
    where
        F: Fn(&str, &ResolverContext<'_>) -> Result<ArgValue, ArgumentError> + Send + Sync + 'static,
    {
        Arc::new(FnResolver::new(name, resolve))
    }

    /// The message being handled.
    pub fn message(&self) -> &Message {
        &self.message
    }

    /// How the command was invoked.
    pub fn context(&self) -> &RunContext {
        &self.context
    }

    /// The current cursor.
    pub fn state(&self) -> &CursorState {
        self.stream.state()
    }

    /// Whether every positional token has been consumed.
    pub fn finished(&self) -> bool {
        self.stream.finished()
    }

    /// Rewind to the first token and drop saved states.
    pub fn start(&mut self) -> &mut Self {
        self.stream.reset();
        self.states.clear();
        self
    }

    fn resolver(&self, ty: &ArgType) -> ArgumentResult<Arc<dyn Resolver>> {
        match ty {
            ArgType::Resolver(resolver) => Ok(Arc::clone(resolver)),
            ArgType::Named(name) => self
                .registry
                .get(name)
                .ok_or_else(|| ArgsError::UnavailableArgument { name: name.clone() }),
        }
    }

    async fn parse_single(
        &mut self,
        resolver: &dyn Resolver,
        options: &ArgOptions,
    ) -> Option<Result<ArgValue, ArgumentError>> {
        let ctx = ResolverContext {
            argument: resolver.name(),
            message: self.message.as_ref(),
            context: self.context.as_ref(),
            client: self.client.as_ref(),
            options,
        };
        let ctx = &ctx;
        self.stream
            .single_parse(|parameter| async move { run_resolver(resolver, &parameter, ctx).await })
            .await
    }

    /// Resolve the next positional token.
    ///
    /// The token is consumed only when the resolver succeeds.
    pub async fn pick_result(&mut self, ty: impl Into<ArgType>, options: ArgOptions) -> ArgumentResult<ArgValue> {
        let resolver = self.resolver(&ty.into())?;
        match self.parse_single(resolver.as_ref(), &options).await {
            Some(result) => result.map_err(ArgsError::from),
            None => Err(ArgsError::MissingArguments),
        }
    }

    /// Resolve the next positional token into `T`.
    pub async fn pick<T>(&mut self, ty: impl Into<ArgType>) -> ArgumentResult<T>
    where
        T: TryFrom<ArgValue, Error = ArgValue>,
    {
        self.pick_with(ty, ArgOptions::default()).await
    }

    /// [`pick`](Self::pick) with resolver options.
    pub async fn pick_with<T>(&mut self, ty: impl Into<ArgType>, options: ArgOptions) -> ArgumentResult<T>
    where
        T: TryFrom<ArgValue, Error = ArgValue>,
    {
        let ty = ty.into();
        let state = self.stream.save();
        let value = self.pick_result(ty.clone(), options).await?;
        self.typed(&ty, state, value)
    }

    /// Resolve every remaining positional token as one parameter.
    ///
    /// Tokens are joined with their original trailing whitespace. On failure
    /// the cursor is put back where it was.
    pub async fn rest_result(&mut self, ty: impl Into<ArgType>, options: ArgOptions) -> ArgumentResult<ArgValue> {
        let resolver = self.resolver(&ty.into())?;
        if self.stream.finished() {
            return Err(ArgsError::MissingArguments);
        }

        let state = self.stream.save();
        let parameter: String = self
            .stream
            .many()
            .iter()
            .map(|token| format!("{}{}", token.value, token.trailing))
            .collect();

        let ctx = ResolverContext {
            argument: resolver.name(),
            message: self.message.as_ref(),
            context: self.context.as_ref(),
            client: self.client.as_ref(),
            options: &options,
        };
        let result = run_resolver(resolver.as_ref(), &parameter, &ctx).await;
        if result.is_err() {
            debug!(argument = ctx.argument, "rest read failed, restoring cursor");
            self.stream.restore(state);
        }
        result.map_err(ArgsError::from)
    }

    /// Resolve the remaining tokens into `T`.
    pub async fn rest<T>(&mut self, ty: impl Into<ArgType>) -> ArgumentResult<T>
    where
        T: TryFrom<ArgValue, Error = ArgValue>,
    {
        self.rest_with(ty, ArgOptions::default()).await
    }

    /// [`rest`](Self::rest) with resolver options.
    pub async fn rest_with<T>(&mut self, ty: impl Into<ArgType>, options: ArgOptions) -> ArgumentResult<T>
    where
        T: TryFrom<ArgValue, Error = ArgValue>,
    {
        let ty = ty.into();
        let state = self.stream.save();
        let value = self.rest_result(ty.clone(), options).await?;
        self.typed(&ty, state, value)
    }

    /// Resolve tokens one by one, up to `options.times`.
    ///
    /// A failure on the first token fails the whole read; a later failure
    /// stops the loop and leaves that token unconsumed.
    pub async fn repeat_result(&mut self, ty: impl Into<ArgType>, options: ArgOptions) -> ArgumentResult<Vec<ArgValue>> {
        let resolver = self.resolver(&ty.into())?;
        if self.stream.finished() {
            return Err(ArgsError::MissingArguments);
        }

        let times = options.times.unwrap_or(usize::MAX);
        let mut values = Vec::new();
        while values.len() < times {
            match self.parse_single(resolver.as_ref(), &options).await {
                None => break,
                Some(Ok(value)) => values.push(value),
                Some(Err(error)) if values.is_empty() => return Err(error.into()),
                Some(Err(_)) => break,
            }
        }
        Ok(values)
    }

    /// Resolve one or more tokens into `T`.
    pub async fn repeat<T>(&mut self, ty: impl Into<ArgType>) -> ArgumentResult<Vec<T>>
    where
        T: TryFrom<ArgValue, Error = ArgValue>,
    {
        self.repeat_with(ty, ArgOptions::default()).await
    }

    /// [`repeat`](Self::repeat) with resolver options.
    pub async fn repeat_with<T>(&mut self, ty: impl Into<ArgType>, options: ArgOptions) -> ArgumentResult<Vec<T>>
    where
        T: TryFrom<ArgValue, Error = ArgValue>,
    {
        let ty = ty.into();
        let state = self.stream.save();
        let converted: ArgumentResult<Vec<T>> = self
            .repeat_result(ty.clone(), options)
            .await?
            .into_iter()
            .map(|value| convert(&ty, value))
            .collect();
        if converted.is_err() {
            self.stream.restore(state);
        }
        converted
    }

    /// Resolve the next token without consuming anything.
    pub async fn peek_result(&mut self, ty: impl Into<ArgType>, options: ArgOptions) -> ArgumentResult<ArgValue> {
        let state = self.stream.save();
        let result = self.pick_result(ty, options).await;
        self.stream.restore(state);
        result
    }

    /// Resolve the next token into `T` without consuming anything.
    pub async fn peek<T>(&mut self, ty: impl Into<ArgType>) -> ArgumentResult<T>
    where
        T: TryFrom<ArgValue, Error = ArgValue>,
    {
        let ty = ty.into();
        let value = self.peek_result(ty.clone(), ArgOptions::default()).await?;
        convert(&ty, value)
    }

    /// Run an arbitrary read and put the cursor back afterwards.
    ///
    /// ```ignore
    /// let reason: Option<String> = args
    ///     .lookahead(|args| async move { args.rest("string").await.ok() }.boxed())
    ///     .await;
    /// ```
    pub async fn lookahead<T, F>(&mut self, read: F) -> T
    where
        F: for<'b> FnOnce(&'b mut Args) -> BoxFuture<'b, T>,
    {
        let state = self.stream.save();
        let result = read(self).await;
        self.stream.restore(state);
        result
    }

    /// Consume the next token without resolving it.
    pub fn next(&mut self) -> Option<String> {
        self.stream.single()
    }

    /// Map the next token; it is consumed only when `map` returns `Some`.
    pub fn next_with<T>(&mut self, map: impl FnOnce(&str) -> Option<T>) -> Option<T> {
        self.stream.single_map(map)
    }

    /// Whether any of the named flags was given.
    pub fn get_flags(&self, names: &[&str]) -> bool {
        self.stream.flag(names)
    }

    /// Last value of the first named option that was given.
    pub fn get_option(&self, names: &[&str]) -> Option<String> {
        self.stream.option(names)
    }

    /// All values of the first named option that was given.
    pub fn get_options(&self, names: &[&str]) -> Option<Vec<String>> {
        self.stream.options(names)
    }

    /// Convert a finished read, rewinding to `state` when `T` does not match.
    fn typed<T>(&mut self, ty: &ArgType, state: CursorState, value: ArgValue) -> ArgumentResult<T>
    where
        T: TryFrom<ArgValue, Error = ArgValue>,
    {
        let converted = convert(ty, value);
        if converted.is_err() {
            debug!(argument = ty.name(), "typed read mismatched, restoring cursor");
            self.stream.restore(state);
        }
        converted
    }

    /// Push the current cursor onto the checkpoint stack.
    pub fn save(&mut self) {
        self.states.push(self.stream.save());
    }

    /// Pop the last checkpoint and rewind to it. Does nothing when the stack is empty.
    pub fn restore(&mut self) {
        if let Some(state) = self.states.pop() {
            self.stream.restore(state);
        }
    }
}

fn convert<T>(ty: &ArgType, value: ArgValue) -> ArgumentResult<T>
where
    T: TryFrom<ArgValue, Error = ArgValue>,
{
    T::try_from(value).map_err(|value| ArgsError::UnexpectedType {
        argument: ty.name().to_string(),
        found: value.kind(),
    })
}

async fn run_resolver(
    resolver: &dyn Resolver,
    parameter: &str,
    ctx: &ResolverContext<'_>,
) -> Result<ArgValue, ArgumentError> {
    match AssertUnwindSafe(resolver.resolve(parameter, ctx)).catch_unwind().await {
        Ok(result) => result,
        Err(payload) => {
            let reason = panic_message(payload);
            warn!(argument = ctx.argument, parameter, %reason, "argument resolver panicked");
            Err(ctx.error(
                parameter,
                Identifier::ArgumentResolverPanicked,
                format!("The argument resolver panicked: {reason}"),
            ))
        }
    }
}
