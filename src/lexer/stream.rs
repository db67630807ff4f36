//! Cursor over a parsed token list.

use std::collections::BTreeSet;
use std::future::Future;

use super::{ParserOutput, Token};

/// Snapshot of a [`TokenStream`] cursor.
///
/// `position_from_end` is an exclusive bound: ordered tokens at or past it are
/// out of reach of forward reads.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CursorState {
    /// Ordered-token indices that have been consumed.
    pub used_indices: BTreeSet<usize>,
    /// Forward cursor.
    pub position: usize,
    /// Backward cursor.
    pub position_from_end: usize,
}

impl CursorState {
    /// Fresh state over `len` ordered tokens.
    pub fn new(len: usize) -> Self {
        Self {
            used_indices: BTreeSet::new(),
            position: 0,
            position_from_end: len,
        }
    }
}

/// Stateful reader over a [`ParserOutput`].
#[derive(Debug, Clone)]
pub struct TokenStream {
    output: ParserOutput,
    state: CursorState,
}

impl TokenStream {
    /// Create a stream positioned at the first ordered token.
    pub fn new(output: ParserOutput) -> Self {
        let state = CursorState::new(output.ordered.len());
        Self { output, state }
    }

    /// The parsed tokens backing this stream.
    pub fn output(&self) -> &ParserOutput {
        &self.output
    }

    /// The current cursor.
    pub fn state(&self) -> &CursorState {
        &self.state
    }

    fn next_unused(&self) -> Option<usize> {
        (self.state.position..self.state.position_from_end)
            .find(|index| !self.state.used_indices.contains(index))
    }

    fn last_unused(&self) -> Option<usize> {
        (self.state.position..self.state.position_from_end)
            .rev()
            .find(|index| !self.state.used_indices.contains(index))
    }

    fn consume(&mut self, index: usize) {
        self.state.used_indices.insert(index);
        self.state.position = index + 1;
    }

    /// Whether no ordered token is left to read.
    pub fn finished(&self) -> bool {
        self.next_unused().is_none()
    }

    /// Number of ordered tokens still readable.
    pub fn remaining(&self) -> usize {
        (self.state.position..self.state.position_from_end)
            .filter(|index| !self.state.used_indices.contains(index))
            .count()
    }

    /// The next unread token, without consuming it.
    pub fn peek_token(&self) -> Option<&Token> {
        self.next_unused().map(|index| &self.output.ordered[index])
    }

    /// Consume the next token and return its value.
    pub fn single(&mut self) -> Option<String> {
        let index = self.next_unused()?;
        self.consume(index);
        Some(self.output.ordered[index].value.clone())
    }

    /// Map the next token; it is consumed only when `map` returns `Some`.
    pub fn single_map<T>(&mut self, map: impl FnOnce(&str) -> Option<T>) -> Option<T> {
        let index = self.next_unused()?;
        let mapped = map(&self.output.ordered[index].value)?;
        self.consume(index);
        Some(mapped)
    }

    /// Parse the next token asynchronously; it is consumed only on `Ok`.
    ///
    /// Returns `None` when no token is left.
    pub async fn single_parse<T, E, F, Fut>(&mut self, parse: F) -> Option<Result<T, E>>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let index = self.next_unused()?;
        let value = self.output.ordered[index].value.clone();
        let result = parse(value).await;
        if result.is_ok() {
            self.consume(index);
        }
        Some(result)
    }

    /// Consume the last unread token and return its value.
    pub fn single_from_end(&mut self) -> Option<String> {
        let index = self.last_unused()?;
        self.state.used_indices.insert(index);
        self.state.position_from_end = index;
        Some(self.output.ordered[index].value.clone())
    }

    /// Consume every remaining token.
    pub fn many(&mut self) -> Vec<Token> {
        let indices: Vec<usize> = (self.state.position..self.state.position_from_end)
            .filter(|index| !self.state.used_indices.contains(index))
            .collect();
        let tokens = indices
            .iter()
            .map(|&index| self.output.ordered[index].clone())
            .collect();
        for index in indices {
            self.consume(index);
        }
        tokens
    }

    /// Whether any of the named flags was given.
    pub fn flag(&self, names: &[&str]) -> bool {
        names.iter().any(|name| self.output.flags.contains(*name))
    }

    /// Last value of the first named option that was given.
    pub fn option(&self, names: &[&str]) -> Option<String> {
        self.options(names).and_then(|mut values| values.pop())
    }

    /// All values of the first named option that was given.
    pub fn options(&self, names: &[&str]) -> Option<Vec<String>> {
        names
            .iter()
            .filter_map(|name| self.output.options.get(*name))
            .find(|values| !values.is_empty())
            .cloned()
    }

    /// Copy of the current cursor.
    pub fn save(&self) -> CursorState {
        self.state.clone()
    }

    /// Replace the cursor with a saved one.
    pub fn restore(&mut self, state: CursorState) {
        self.state = state;
    }

    /// Rewind to the first token.
    pub fn reset(&mut self) {
        self.state = CursorState::new(self.output.ordered.len());
    }
}
