//! Scanner for the host language
//!
//! Produces the full token stream, comments included, with indentation
//! turned into `Indent`/`Dedent` tokens. Blank and comment-only lines never
//! affect indentation and produce no `Newline`. Line breaks inside brackets
//! or after a backslash are joined.

use crate::error::MarginaliaError;
use crate::result::Result;
use crate::span::LineIndex;
use crate::syntax::token::{Token, TokenKind, TokenSpan, TriviaToken};

const THREE_CHAR_OPS: [&str; 5] = ["**=", "//=", ">>=", "<<=", "..."];
const TWO_CHAR_OPS: [&str; 19] = [
    "**", "//", "<<", ">>", "<=", ">=", "==", "!=", "->", "+=", "-=", "*=", "/=", "%=", "&=",
    "|=", "^=", "@=", ":=",
];
const ONE_CHAR_OPS: &str = "+-*/%@&|^~<>()[]{},:.;=";

/// Scan `source` into tokens.
pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    Lexer::new(source).run()
}

/// Comments of `source` in source order.
pub fn trivia_tokens(source: &str) -> Result<Vec<TriviaToken>> {
    let index = LineIndex::new(source);
    Ok(tokenize(source)?
        .into_iter()
        .filter(|token| token.kind == TokenKind::Comment)
        .map(|token| {
            TriviaToken::new(
                &token.text[1..],
                index.scope(token.span.start, token.span.end),
            )
        })
        .collect())
}

struct Lexer<'a> {
    source: &'a str,
    pos: usize,
    depth: usize,
    indents: Vec<usize>,
    tokens: Vec<Token>,
    index: LineIndex,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            depth: 0,
            indents: vec![0],
            tokens: Vec::new(),
            index: LineIndex::new(source),
        }
    }

    fn run(mut self) -> Result<Vec<Token>> {
        let mut at_line_start = true;
        while self.pos < self.source.len() {
            if at_line_start && self.depth == 0 {
                if self.blank_line() {
                    continue;
                }
                self.indentation()?;
            }
            at_line_start = false;

            let Some(current) = self.peek() else { break };
            let start = self.pos;
            match current {
                ' ' | '\t' | '\x0c' => self.pos += 1,
                '\r' | '\n' => {
                    self.consume_line_break();
                    if self.depth == 0 {
                        self.push(TokenKind::Newline, start, self.pos);
                        at_line_start = true;
                    }
                }
                '\\' => {
                    self.pos += 1;
                    if !matches!(self.peek(), Some('\r' | '\n')) {
                        return Err(self.error("unexpected character after line continuation", start));
                    }
                    self.consume_line_break();
                }
                '#' => self.comment(),
                '"' | '\'' => self.string()?,
                c if c.is_ascii_digit() => self.number(),
                '.' if self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) => self.number(),
                c if is_name_start(c) => self.name(),
                _ => self.operator()?,
            }
        }

        let ends_logical_line = self
            .tokens
            .iter()
            .rev()
            .find(|token| token.kind != TokenKind::Comment)
            .is_some_and(|token| !token.kind.is_layout());
        let end = self.source.len();
        if ends_logical_line {
            self.push(TokenKind::Newline, end, end);
        }
        while self.indents.len() > 1 {
            self.indents.pop();
            self.push(TokenKind::Dedent, end, end);
        }
        self.push(TokenKind::EndMarker, end, end);
        Ok(self.tokens)
    }

    /// Skip a line holding nothing but whitespace and an optional comment.
    fn blank_line(&mut self) -> bool {
        let rest = &self.source[self.pos..];
        let content = rest.trim_start_matches([' ', '\t', '\x0c']);
        let offset = rest.len() - content.len();
        match content.chars().next() {
            None => {
                self.pos = self.source.len();
                true
            }
            Some('\r' | '\n') => {
                self.pos += offset;
                self.consume_line_break();
                true
            }
            Some('#') => {
                self.pos += offset;
                self.comment();
                self.consume_line_break();
                true
            }
            Some(_) => false,
        }
    }

    fn indentation(&mut self) -> Result<()> {
        let mut width = 0;
        while let Some(c) = self.peek() {
            match c {
                ' ' => width += 1,
                '\t' => width = (width / 8 + 1) * 8,
                '\x0c' => width = 0,
                _ => break,
            }
            self.pos += 1;
        }

        let current = self.indents.last().copied().unwrap_or(0);
        if width > current {
            self.indents.push(width);
            self.push(TokenKind::Indent, self.pos, self.pos);
        } else {
            while self.indents.last().is_some_and(|&level| width < level) {
                self.indents.pop();
                self.push(TokenKind::Dedent, self.pos, self.pos);
            }
            if self.indents.last() != Some(&width) {
                return Err(self.error(
                    "unindent does not match any outer indentation level",
                    self.pos,
                ));
            }
        }
        Ok(())
    }

    fn consume_line_break(&mut self) {
        match self.peek() {
            Some('\r') => {
                self.pos += 1;
                if self.peek() == Some('\n') {
                    self.pos += 1;
                }
            }
            Some('\n') => self.pos += 1,
            _ => {}
        }
    }

    fn comment(&mut self) {
        let start = self.pos;
        let rest = &self.source[start..];
        let line_len = rest.find(['\r', '\n']).unwrap_or(rest.len());
        let text = rest[..line_len].trim_end();
        self.pos = start + line_len;
        self.push(TokenKind::Comment, start, start + text.len());
    }

    fn string(&mut self) -> Result<()> {
        let start = self.pos;
        let rest = &self.source[start..];
        let Some(quote) = rest.chars().next() else {
            return Ok(());
        };
        let triple: String = std::iter::repeat_n(quote, 3).collect();
        let long = rest.starts_with(&triple);
        let mut offset = if long { 3 } else { 1 };

        loop {
            let Some(c) = rest[offset..].chars().next() else {
                return Err(self.error("unterminated string literal", start));
            };
            match c {
                '\\' => {
                    offset += 1;
                    if let Some(escaped) = rest[offset..].chars().next() {
                        offset += escaped.len_utf8();
                    }
                }
                '\r' | '\n' if !long => {
                    return Err(self.error("unterminated string literal", start));
                }
                c if c == quote && (!long || rest[offset..].starts_with(&triple)) => {
                    offset += if long { 3 } else { 1 };
                    break;
                }
                c => offset += c.len_utf8(),
            }
        }

        self.pos = start + offset;
        self.push(TokenKind::Str, start, self.pos);
        Ok(())
    }

    fn number(&mut self) {
        let start = self.pos;
        let bytes = self.source.as_bytes();
        let mut end = start;
        let mut float = false;

        let radix = bytes.get(start) == Some(&b'0')
            && matches!(
                bytes.get(start + 1),
                Some(b'x' | b'X' | b'o' | b'O' | b'b' | b'B')
            );
        if radix {
            end += 2;
            while end < bytes.len() && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'_') {
                end += 1;
            }
        } else {
            while end < bytes.len() && (bytes[end].is_ascii_digit() || bytes[end] == b'_') {
                end += 1;
            }
            if bytes.get(end) == Some(&b'.') {
                float = true;
                end += 1;
                while end < bytes.len() && (bytes[end].is_ascii_digit() || bytes[end] == b'_') {
                    end += 1;
                }
            }
            if matches!(bytes.get(end), Some(b'e' | b'E')) {
                let mut exponent = end + 1;
                if matches!(bytes.get(exponent), Some(b'+' | b'-')) {
                    exponent += 1;
                }
                if bytes.get(exponent).is_some_and(|b| b.is_ascii_digit()) {
                    float = true;
                    end = exponent;
                    while end < bytes.len() && bytes[end].is_ascii_digit() {
                        end += 1;
                    }
                }
            }
            if matches!(bytes.get(end), Some(b'j' | b'J')) {
                float = true;
                end += 1;
            }
        }

        self.pos = end;
        let kind = if float { TokenKind::Float } else { TokenKind::Int };
        self.push(kind, start, end);
    }

    fn name(&mut self) {
        let start = self.pos;
        let len = self.source[start..]
            .char_indices()
            .find(|&(_, c)| !is_name_continue(c))
            .map(|(offset, _)| offset)
            .unwrap_or(self.source.len() - start);
        self.pos = start + len;
        self.push(TokenKind::Name, start, self.pos);
    }

    fn operator(&mut self) -> Result<()> {
        let start = self.pos;
        let rest = &self.source[start..];
        let len = if THREE_CHAR_OPS.iter().any(|op| rest.starts_with(op)) {
            3
        } else if TWO_CHAR_OPS.iter().any(|op| rest.starts_with(op)) {
            2
        } else if rest.starts_with(|c: char| ONE_CHAR_OPS.contains(c)) {
            1
        } else {
            let found = rest.chars().next().unwrap_or_default();
            return Err(self.error(format!("unexpected character {found:?}"), start));
        };

        match &rest[..1] {
            "(" | "[" | "{" => self.depth += 1,
            ")" | "]" | "}" => self.depth = self.depth.saturating_sub(1),
            _ => {}
        }
        self.pos = start + len;
        self.push(TokenKind::Op, start, self.pos);
        Ok(())
    }

    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.source.get(self.pos + offset..)?.chars().next()
    }

    fn push(&mut self, kind: TokenKind, start: usize, end: usize) {
        self.tokens
            .push(Token::new(kind, &self.source[start..end], span(start, end)));
    }

    fn error(&self, message: impl Into<String>, offset: usize) -> MarginaliaError {
        MarginaliaError::syntax(message, self.index.location(offset))
    }
}

fn span(start: usize, end: usize) -> TokenSpan {
    start..end
}

fn is_name_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_name_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

/// Decode a string literal token (quotes included) into its value.
pub fn decode_string(raw: &str) -> String {
    let quote_len = if raw.starts_with("\"\"\"") || raw.starts_with("'''") {
        3
    } else {
        1
    };
    let body = raw
        .get(quote_len..raw.len().saturating_sub(quote_len))
        .unwrap_or_default();

    let mut value = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            value.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => value.push('\n'),
            Some('t') => value.push('\t'),
            Some('r') => value.push('\r'),
            Some('0') => value.push('\0'),
            Some('\\') => value.push('\\'),
            Some('\'') => value.push('\''),
            Some('"') => value.push('"'),
            Some('\n') => {}
            Some('x') => {
                let hex: String = chars.by_ref().take(2).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => value.push(decoded),
                    None => {
                        value.push_str("\\x");
                        value.push_str(&hex);
                    }
                }
            }
            Some(other) => {
                value.push('\\');
                value.push(other);
            }
            None => value.push('\\'),
        }
    }
    value
}
