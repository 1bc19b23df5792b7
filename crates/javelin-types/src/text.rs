//! Line/column bookkeeping over a source snapshot.

use crate::Span;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct LineCol {
    /// Zero-based line.
    pub line: u32,
    /// Zero-based UTF-8 byte column.
    pub col: u32,
}

/// Pre-computed line start offsets for a particular text snapshot.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LineIndex {
    line_starts: Vec<usize>,
    line_ends: Vec<usize>,
    text_len: usize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let bytes = text.as_bytes();
        let mut line_starts = Vec::with_capacity(128);
        let mut line_ends = Vec::with_capacity(128);
        line_starts.push(0);

        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\n' => {
                    line_ends.push(i);
                    line_starts.push(i + 1);
                    i += 1;
                }
                b'\r' => {
                    line_ends.push(i);
                    if i + 1 < bytes.len() && bytes[i + 1] == b'\n' {
                        line_starts.push(i + 2);
                        i += 2;
                    } else {
                        line_starts.push(i + 1);
                        i += 1;
                    }
                }
                _ => i += 1,
            }
        }

        line_ends.push(text.len());

        Self {
            line_starts,
            line_ends,
            text_len: text.len(),
        }
    }

    pub fn line_count(&self) -> u32 {
        self.line_starts.len() as u32
    }

    pub fn line_start(&self, line: u32) -> Option<usize> {
        self.line_starts.get(line as usize).copied()
    }

    /// Line end excluding the terminator.
    pub fn line_end(&self, line: u32) -> Option<usize> {
        self.line_ends.get(line as usize).copied()
    }

    /// Start offsets of every line, in order. This is the unit's line-number
    /// table; external consumers (disassembly oracles) index it directly.
    pub fn line_starts(&self) -> &[usize] {
        &self.line_starts
    }

    fn line_index(&self, offset: usize) -> usize {
        // Offsets past the end refer to EOF.
        let offset = offset.min(self.text_len);
        match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(insert) => insert.saturating_sub(1),
        }
    }

    pub fn line_col(&self, offset: usize) -> LineCol {
        let offset = offset.min(self.text_len);
        let line = self.line_index(offset);
        let line_start = self.line_starts[line];
        let line_end = self.line_ends[line];
        LineCol {
            line: line as u32,
            col: (offset.min(line_end) - line_start) as u32,
        }
    }

    /// Span of the full line containing `offset`, terminator excluded.
    pub fn line_span(&self, offset: usize) -> Span {
        let line = self.line_index(offset);
        Span::new(self.line_starts[line], self.line_ends[line])
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn line_col_over_mixed_terminators() {
        let text = "ab\ncd\r\nef";
        let index = LineIndex::new(text);

        assert_eq!(index.line_count(), 3);
        assert_eq!(index.line_col(0), LineCol { line: 0, col: 0 });
        assert_eq!(index.line_col(4), LineCol { line: 1, col: 1 });
        assert_eq!(index.line_col(7), LineCol { line: 2, col: 0 });
        // Past EOF clamps.
        assert_eq!(index.line_col(99), LineCol { line: 2, col: 2 });
    }

    #[test]
    fn line_span_excludes_terminator() {
        let text = "first\nsecond\n";
        let index = LineIndex::new(text);

        assert_eq!(index.line_span(2), Span::new(0, 5));
        assert_eq!(index.line_span(8), Span::new(6, 12));
    }
}
