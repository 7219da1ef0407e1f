//! Offset ↔ line/character mapping.
//!
//! Editors (and LSP) address text by 0-indexed line and UTF-16 character
//! offset; the tree stores byte offsets. [`LineIndex`] converts between
//! the two for one file's text.

use serde::{Deserialize, Serialize};

/// Position in a source file (editor coordinates, 0-indexed).
///
/// `character` counts UTF-16 code units from the line start, per the LSP
/// specification.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Position {
    /// Line number (0-indexed)
    pub line: u32,
    /// Character offset within the line (0-indexed, UTF-16 code units)
    pub character: u32,
}

impl Position {
    /// Create a new position.
    #[must_use]
    pub const fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

/// Line-start table for one file's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    text: String,
    /// Byte offset of the start of each line; `line_starts[0] == 0`.
    line_starts: Vec<usize>,
}

impl LineIndex {
    /// Build a line index for `text`.
    #[must_use]
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        for (offset, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(offset + 1);
            }
        }
        Self {
            text: text.to_string(),
            line_starts,
        }
    }

    /// Convert a byte offset to a position. Offsets past the end of the
    /// text clamp to the final position; offsets inside a multi-byte
    /// character floor to its start.
    #[must_use]
    pub fn position(&self, offset: usize) -> Position {
        let mut offset = offset.min(self.text.len());
        while offset > 0 && !self.text.is_char_boundary(offset) {
            offset -= 1;
        }
        let line = self
            .line_starts
            .partition_point(|start| *start <= offset)
            .saturating_sub(1);
        let line_start = self.line_starts[line];
        let character = self.text[line_start..offset]
            .chars()
            .map(char::len_utf16)
            .sum::<usize>();
        Position::new(line as u32, character as u32)
    }

    /// Convert a position back to a byte offset. Returns `None` when the
    /// line does not exist; character offsets past the end of a line clamp
    /// to the line end.
    #[must_use]
    pub fn offset(&self, position: Position) -> Option<usize> {
        let line_start = *self.line_starts.get(position.line as usize)?;
        let line_end = self
            .line_starts
            .get(position.line as usize + 1)
            .map_or(self.text.len(), |next| next - 1);

        let mut remaining = position.character as usize;
        let mut offset = line_start;
        for ch in self.text[line_start..line_end].chars() {
            if remaining == 0 {
                break;
            }
            let units = ch.len_utf16();
            if units > remaining {
                break;
            }
            remaining -= units;
            offset += ch.len_utf8();
        }
        Some(offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_round_trip() {
        let index = LineIndex::new("{\n  \"a\": 1,\n  \"b\": 2\n}");
        let offset = 7; // the '1'... actually the ':' column; value is positional
        let pos = index.position(offset);
        assert_eq!(pos, Position::new(1, 5));
        assert_eq!(index.offset(pos), Some(offset));
    }

    #[test]
    fn test_first_line() {
        let index = LineIndex::new("abc\ndef");
        assert_eq!(index.position(2), Position::new(0, 2));
        assert_eq!(index.offset(Position::new(0, 0)), Some(0));
    }

    #[test]
    fn test_utf16_characters() {
        // '😀' is 4 bytes / 2 UTF-16 units; 'é' is 2 bytes / 1 unit.
        let text = "\"😀é\": 1";
        let index = LineIndex::new(text);
        let after_emoji = 1 + '😀'.len_utf8();
        assert_eq!(index.position(after_emoji), Position::new(0, 3));
        assert_eq!(index.offset(Position::new(0, 3)), Some(after_emoji));
    }

    #[test]
    fn test_offset_clamps_past_line_end() {
        let index = LineIndex::new("ab\ncd");
        assert_eq!(index.offset(Position::new(0, 99)), Some(2));
        assert_eq!(index.offset(Position::new(9, 0)), None);
    }

    #[test]
    fn test_position_clamps_past_text_end() {
        let index = LineIndex::new("ab\ncd");
        assert_eq!(index.position(999), Position::new(1, 2));
    }
}
