//! Source location tracking.
//!
//! Every token and AST node carries a `Span` of byte offsets into the source.
//! Diagnostics convert those offsets to line/column pairs with `LineIndex`.

/// A span in the source code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Span {
    /// Byte offset of the start.
    pub start: u32,
    /// Byte offset of the end (exclusive).
    pub end: u32,
}

impl Span {
    /// Create a new span.
    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Create an empty span at a position.
    #[inline]
    pub const fn empty(pos: u32) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    /// Length of the span in bytes.
    #[inline]
    pub const fn len(&self) -> u32 {
        self.end - self.start
    }

    /// Check if the span is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Merge two spans into one that covers both.
    #[inline]
    pub const fn merge(self, other: Span) -> Span {
        Span {
            start: if self.start < other.start {
                self.start
            } else {
                other.start
            },
            end: if self.end > other.end {
                self.end
            } else {
                other.end
            },
        }
    }

    /// Slice the source text covered by this span.
    ///
    /// Returns an empty string if the span does not fall on character boundaries.
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        source
            .get(self.start as usize..self.end as usize)
            .unwrap_or("")
    }
}

/// Maps byte offsets to 1-based line and column numbers.
#[derive(Debug)]
pub struct LineIndex {
    /// Byte offsets of the start of each line.
    line_starts: Vec<u32>,
}

impl LineIndex {
    /// Build a line index from source code.
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        let bytes = source.as_bytes();
        for (i, c) in source.char_indices() {
            match c {
                // "\r\n" counts once, at the "\n"
                '\r' if bytes.get(i + 1) == Some(&b'\n') => {}
                '\n' | '\r' | '\u{2028}' | '\u{2029}' => {
                    line_starts.push((i + c.len_utf8()) as u32);
                }
                _ => {}
            }
        }
        Self { line_starts }
    }

    /// Convert a byte offset to a (line, column) pair, both 1-based.
    pub fn line_col(&self, offset: u32) -> (u32, u32) {
        let line = self
            .line_starts
            .binary_search(&offset)
            .unwrap_or_else(|i| i.saturating_sub(1));
        let col = offset - self.line_starts[line];
        (line as u32 + 1, col + 1)
    }

    /// Get the total number of lines.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_merge() {
        let a = Span::new(5, 10);
        let b = Span::new(8, 15);
        assert_eq!(a.merge(b), Span::new(5, 15));
        assert_eq!(b.merge(a), Span::new(5, 15));
    }

    #[test]
    fn test_span_text() {
        let source = "let x = 1;";
        assert_eq!(Span::new(4, 5).text(source), "x");
        assert_eq!(Span::new(4, 50).text(source), "");
    }

    #[test]
    fn test_line_index() {
        let source = "line1\nline2\r\nline3";
        let index = LineIndex::new(source);

        assert_eq!(index.line_col(0), (1, 1));
        assert_eq!(index.line_col(5), (1, 6));
        assert_eq!(index.line_col(6), (2, 1));
        assert_eq!(index.line_col(13), (3, 1));
        assert_eq!(index.line_count(), 3);
    }
}
