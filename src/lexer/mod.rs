//! Tokenizer, flag/option strategy and token stream.
//!
//! Raw parameter text goes through three steps before arguments are read
//! from it:
//!
//! 1. [`Lexer::lex`] splits it into [`Token`]s, keeping quoted sections
//!    together and remembering the whitespace after each token.
//! 2. [`UnorderedStrategy::parse`] pulls flags and options out, leaving the
//!    positional tokens in a [`ParserOutput`].
//! 3. [`TokenStream`] walks the positional tokens with a cursor that can be
//!    saved and restored.
//!
//! ```
//! use bck::lexer::{Lexer, NameFilter, TokenStream, UnorderedStrategy};
//!
//! let tokens = Lexer::new().lex("10 --silent \"being rude\"");
//! let strategy = UnorderedStrategy::new(NameFilter::All(true), NameFilter::All(false));
//! let mut stream = TokenStream::new(strategy.parse(tokens));
//!
//! assert!(stream.flag(&["silent"]));
//! assert_eq!(stream.single().as_deref(), Some("10"));
//! assert_eq!(stream.single().as_deref(), Some("being rude"));
//! ```

mod strategy;
mod stream;
mod token;

pub use strategy::{NameFilter, ParserOutput, UnorderedStrategy};
pub use stream::{CursorState, TokenStream};
pub use token::{Lexer, Token};
