use text_size::TextSize;

use super::Position;

/// Maps byte offsets to 1-indexed line/column positions.
///
/// Built once per file at parse time; the parser stamps every identifier
/// with a `Position` derived through this index.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Byte offset at which each line starts; `line_starts[0] == 0`.
    line_starts: Vec<u32>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i as u32 + 1);
            }
        }
        Self { line_starts }
    }

    /// Convert a byte offset into a 1-indexed line/column pair.
    pub fn position(&self, offset: TextSize) -> Position {
        let offset: u32 = offset.into();
        let line = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        Position::new(line as u32 + 1, offset - self.line_starts[line] + 1)
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_line_starts_at_one_one() {
        let index = LineIndex::new("abc\ndef");
        assert_eq!(index.position(TextSize::new(0)), Position::new(1, 1));
        assert_eq!(index.position(TextSize::new(2)), Position::new(1, 3));
    }

    #[test]
    fn offsets_after_newline_map_to_next_line() {
        let index = LineIndex::new("abc\ndef\n");
        assert_eq!(index.position(TextSize::new(4)), Position::new(2, 1));
        assert_eq!(index.position(TextSize::new(6)), Position::new(2, 3));
        assert_eq!(index.line_count(), 3);
    }
}
