//! Quote-aware tokenizer.

use serde::{Deserialize, Serialize};

/// One lexical unit of the parameter text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// The token text with surrounding quotes removed.
    pub value: String,
    /// The token exactly as written, quotes included.
    pub raw: String,
    /// Whitespace that followed the token in the input.
    pub trailing: String,
}

impl Token {
    /// Create a token from its parts.
    pub fn new(value: impl Into<String>, raw: impl Into<String>, trailing: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            raw: raw.into(),
            trailing: trailing.into(),
        }
    }

    /// Whether the token was written as a quoted literal.
    pub fn is_quoted(&self) -> bool {
        self.raw != self.value
    }
}

/// Splits text on whitespace while keeping quoted sections together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexer {
    quotes: Vec<(String, String)>,
}

impl Default for Lexer {
    fn default() -> Self {
        Self::with_quotes(Self::default_quotes())
    }
}

impl Lexer {
    /// Create a lexer using the default quote pairs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a lexer with custom `(open, close)` quote pairs. An empty list
    /// disables quoting entirely.
    pub fn with_quotes(quotes: Vec<(String, String)>) -> Self {
        let quotes = quotes
            .into_iter()
            .filter(|(open, close)| !open.is_empty() && !close.is_empty())
            .collect();
        Self { quotes }
    }

    /// `"…"`, `“…”` and `「…」`.
    pub fn default_quotes() -> Vec<(String, String)> {
        vec![
            ("\"".to_string(), "\"".to_string()),
            ("\u{201C}".to_string(), "\u{201D}".to_string()),
            ("\u{300C}".to_string(), "\u{300D}".to_string()),
        ]
    }

    /// The configured quote pairs.
    pub fn quotes(&self) -> &[(String, String)] {
        &self.quotes
    }

    /// Split `input` into tokens.
    ///
    /// Leading whitespace is skipped. A quote that is never closed swallows the
    /// rest of the input.
    pub fn lex(&self, input: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut rest = input.trim_start();

        while !rest.is_empty() {
            let (value, raw, after) = match self.match_quoted(rest) {
                Some(quoted) => quoted,
                None => {
                    let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
                    (&rest[..end], &rest[..end], &rest[end..])
                }
            };

            let trailing_end = after
                .find(|c: char| !c.is_whitespace())
                .unwrap_or(after.len());
            tokens.push(Token::new(value, raw, &after[..trailing_end]));
            rest = &after[trailing_end..];
        }

        tokens
    }

    /// Returns `(value, raw, remaining input)` when `input` opens with a quote.
    fn match_quoted<'a>(&self, input: &'a str) -> Option<(&'a str, &'a str, &'a str)> {
        for (open, close) in &self.quotes {
            let Some(body) = input.strip_prefix(open.as_str()) else {
                continue;
            };
            return Some(match body.find(close.as_str()) {
                Some(end) => {
                    let raw_end = open.len() + end + close.len();
                    (&body[..end], &input[..raw_end], &input[raw_end..])
                }
                None => (body, input, ""),
            });
        }
        None
    }
}
