//! Scanning and parsing of the host language
//!
//! - [`lexer`]: token stream with comments and layout tokens
//! - [`parser`]: recursive-descent parser producing [`crate::tree::Node`] trees

pub mod lexer;
pub mod parser;
pub mod token;

pub use lexer::{decode_string, tokenize, trivia_tokens};
pub use parser::{SpanRetention, is_keyword, parse_expression, parse_module};
pub use token::{Token, TokenKind, TokenSpan, TriviaToken};
