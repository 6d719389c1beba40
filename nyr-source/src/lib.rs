//! Source code representation and position tracking.

use std::fmt;

/// A location inside source code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    /// Line number, starting at `1`.
    pub line: usize,
    /// Column on the line, counted in characters, starting at `0`.
    pub column: usize,
    /// Absolute byte offset into the source.
    pub offset: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Represents source code.
pub struct Source<'a> {
    /// The full source text.
    pub content: &'a str,
    /// Byte offsets of the first character of every line.
    line_starts: Vec<usize>,
}

impl<'a> Source<'a> {
    /// Create a new `Source` with the specified `content`.
    pub fn new(content: &'a str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(content.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self {
            content,
            line_starts,
        }
    }

    /// Returns the number of lines in the source.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Resolves a byte `offset` into a [`Position`].
    /// Offsets past the end are clamped to the end of the source.
    pub fn position(&self, offset: usize) -> Position {
        let offset = offset.min(self.content.len());
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let line_start = self.line_starts[line];
        let column = self
            .content
            .get(line_start..offset)
            .map_or(offset - line_start, |text| text.chars().count());

        Position {
            line: line + 1,
            column,
            offset,
        }
    }

    /// Returns the text of the 1-based line `line` without its line break.
    pub fn line(&self, line: usize) -> Option<&'a str> {
        let start = *self.line_starts.get(line.checked_sub(1)?)?;
        Some(self.rest_of_line(start))
    }

    /// Returns the text from `offset` up to the end of its line.
    pub fn rest_of_line(&self, offset: usize) -> &'a str {
        let rest = self.content.get(offset..).unwrap_or("");
        match rest.find('\n') {
            Some(end) => rest[..end].trim_end_matches('\r'),
            None => rest,
        }
    }
}

impl<'a> From<&'a str> for Source<'a> {
    fn from(content: &'a str) -> Self {
        Source::new(content)
    }
}
