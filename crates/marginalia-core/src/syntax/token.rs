//! Token types produced by the scanner

use crate::span::Scope;
use serde::Serialize;
use std::ops::Range;

/// Byte range of a token in its source
pub type TokenSpan = Range<usize>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    /// Identifier or keyword
    Name,
    Int,
    Float,
    /// String literal, quotes included
    Str,
    /// Operator or delimiter
    Op,
    /// End of a logical line
    Newline,
    Indent,
    Dedent,
    /// `#` comment, marker and text included
    Comment,
    EndMarker,
}

impl TokenKind {
    /// Layout tokens carry no text of their own.
    pub fn is_layout(&self) -> bool {
        matches!(
            self,
            TokenKind::Newline | TokenKind::Indent | TokenKind::Dedent | TokenKind::EndMarker
        )
    }
}

/// A token with its kind and source span
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: TokenSpan,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, span: TokenSpan) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }

    pub fn is_op(&self, op: &str) -> bool {
        self.kind == TokenKind::Op && self.text == op
    }

    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.kind == TokenKind::Name && self.text == keyword
    }
}

/// A comment as handed to the splicing pipeline.
///
/// `text` is everything after the leading `#`, trailing whitespace removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TriviaToken {
    pub text: String,
    pub scope: Scope,
}

impl TriviaToken {
    pub fn new(text: impl Into<String>, scope: Scope) -> Self {
        Self {
            text: text.into(),
            scope,
        }
    }
}
