//! Lexer for the BASIC interpreter.
//!
//! [`SourceBuffer`] prepares the text, [`Lexer`] hands out one token per
//! call, and [`tokenize`] drains a whole source. Keywords are recognized
//! case-insensitively; identifiers fold to upper case before interning.

mod lexer;
mod source;

pub use lexer::{tokenize, Lexer};
pub use source::{Cursor, SourceBuffer};
