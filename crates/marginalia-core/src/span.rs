//! Source positions and spans
//!
//! Lines are 1-based and columns are 0-based byte offsets into the line, the
//! convention shared by the scanner, the parser and every consumer of spans.

use serde::Serialize;
use std::fmt;

/// A position in source text.
///
/// Ordering is lexicographic: line first, then column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Half-open span `[start, end)` over two locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Scope {
    pub start: Location,
    pub end: Location,
}

impl Scope {
    pub fn new(start: Location, end: Location) -> Self {
        debug_assert!(start <= end, "scope start {start} is after end {end}");
        Self { start, end }
    }

    /// True when `other` lies entirely inside this scope (bounds inclusive).
    pub fn contains(&self, other: &Scope) -> bool {
        self.start <= other.start && self.end >= other.end
    }

    /// True when this scope is over by the time `other` starts.
    pub fn ends_before(&self, other: &Scope) -> bool {
        self.end <= other.start
    }

    /// True when this scope begins at or after the end of `other`.
    pub fn starts_after(&self, other: &Scope) -> bool {
        self.start >= other.end
    }

    /// Smallest scope covering both.
    pub fn cover(&self, other: &Scope) -> Scope {
        Scope {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Maps byte offsets to [`Location`]s using precomputed line starts.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            source
                .bytes()
                .enumerate()
                .filter(|(_, byte)| *byte == b'\n')
                .map(|(offset, _)| offset + 1),
        );
        Self {
            line_starts,
            len: source.len(),
        }
    }

    /// Convert a byte offset into a location; offsets past the end clamp to it.
    pub fn location(&self, offset: usize) -> Location {
        let offset = offset.min(self.len);
        let line = self.line_starts.partition_point(|&start| start <= offset);
        Location {
            line,
            column: offset - self.line_starts[line - 1],
        }
    }

    /// Convert a location back into a byte offset, if it exists in the source.
    pub fn offset(&self, location: Location) -> Option<usize> {
        let start = *self.line_starts.get(location.line.checked_sub(1)?)?;
        let offset = start + location.column;
        (offset <= self.len).then_some(offset)
    }

    pub fn scope(&self, start: usize, end: usize) -> Scope {
        Scope::new(self.location(start), self.location(end))
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}
