//! The editable document an animation is played against.
//!
//! The host surface (an editor, a file, a terminal view) implements
//! [`EditBuffer`]. All offsets crossing this trait are in the host's storage
//! units, described by [`StorageEncoding`].

use std::ops::Range;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::BufferError;

/// Line terminator convention of a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    /// Single-unit `\n`.
    #[default]
    Lf,
    /// Two-unit `\r\n`.
    CrLf,
}

impl LineEnding {
    /// Guess the convention from the first line terminator in `text`.
    ///
    /// Text without any terminator is treated as `Lf`.
    pub fn detect(text: &str) -> Self {
        match text.find('\n') {
            Some(idx) if text[..idx].ends_with('\r') => Self::CrLf,
            _ => Self::Lf,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
        }
    }

    /// Rewrite every `\r\n`, lone `\r`, and lone `\n` in `text` to this
    /// convention.
    pub fn normalize(&self, text: &str) -> String {
        let eol = self.as_str();
        let mut out = String::with_capacity(text.len());
        let mut chars = text.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '\r' => {
                    if chars.peek() == Some(&'\n') {
                        chars.next();
                    }
                    out.push_str(eol);
                }
                '\n' => out.push_str(eol),
                _ => out.push(c),
            }
        }

        out
    }
}

/// Native addressable unit of a buffer's text representation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageEncoding {
    /// Bytes of UTF-8.
    Utf8,
    /// UTF-16 code units; characters outside the BMP take two.
    #[default]
    Utf16,
    /// One unit per codepoint.
    Codepoint,
}

impl StorageEncoding {
    /// Storage width of a single character.
    #[inline]
    pub fn width(&self, c: char) -> usize {
        match self {
            Self::Utf8 => c.len_utf8(),
            Self::Utf16 => c.len_utf16(),
            Self::Codepoint => 1,
        }
    }

    /// Storage length of a string.
    pub fn len(&self, text: &str) -> usize {
        match self {
            Self::Utf8 => text.len(),
            Self::Utf16 => text.encode_utf16().count(),
            Self::Codepoint => text.chars().count(),
        }
    }

    /// Convert a storage offset into a byte offset of `text`.
    pub fn byte_offset(&self, text: &str, offset: usize) -> Result<usize, BufferError> {
        let mut units = 0;
        for (byte_idx, c) in text.char_indices() {
            if units == offset {
                return Ok(byte_idx);
            }
            units += self.width(c);
            if units > offset {
                return Err(BufferError::NotOnCharBoundary { offset });
            }
        }

        if units == offset {
            Ok(text.len())
        } else {
            Err(BufferError::InvalidPosition { offset, len: units })
        }
    }

    /// Slice `text` by a storage range.
    pub fn slice<'a>(&self, text: &'a str, range: Range<usize>) -> Result<&'a str, BufferError> {
        if range.start > range.end {
            return Err(BufferError::InvalidPosition {
                offset: range.start,
                len: range.end,
            });
        }
        let start = self.byte_offset(text, range.start)?;
        let end = self.byte_offset(text, range.end)?;
        Ok(&text[start..end])
    }
}

/// A mutable document that an animation edits piece by piece.
///
/// Implementations must be exclusively owned by one animation run for its
/// whole duration.
#[async_trait]
pub trait EditBuffer: Send {
    /// Full current content.
    fn text(&self) -> String;

    /// Line terminator convention the buffer normalizes to.
    fn line_ending(&self) -> LineEnding;

    /// Unit in which offsets are expressed.
    fn encoding(&self) -> StorageEncoding;

    /// Offset of the end of the document.
    fn end_offset(&self) -> usize {
        self.encoding().len(&self.text())
    }

    fn cursor(&self) -> usize;

    fn set_cursor(&mut self, offset: usize);

    /// Scroll so that `range` is visible. Best effort.
    fn reveal(&mut self, _range: Range<usize>) {}

    /// Insert `text` at `offset` and return the text actually committed,
    /// which may differ from `text` (e.g. after line ending normalization).
    ///
    /// Inserting at the cursor leaves the cursor after the inserted text.
    async fn insert(&mut self, offset: usize, text: &str) -> Result<String, BufferError>;

    /// Remove `range`.
    async fn delete(&mut self, range: Range<usize>) -> Result<(), BufferError>;

    /// Replace the whole document with exactly `text`, in a single edit.
    ///
    /// Unlike [`insert`](Self::insert), line endings are kept as given.
    async fn replace_all(&mut self, text: &str) -> Result<(), BufferError>;
}

/// In-memory document with editor-like behavior.
///
/// Inserted line terminators are converted to the buffer's convention and
/// the cursor follows edits made around it.
#[derive(Debug, Clone, Default)]
pub struct TextBuffer {
    text: String,
    line_ending: LineEnding,
    encoding: StorageEncoding,
    /// Length of `text` in `encoding` units.
    len: usize,
    cursor: usize,
    revealed: Option<Range<usize>>,
}

impl TextBuffer {
    /// Create a buffer holding `text` as-is, with the line ending detected
    /// from its content.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let encoding = StorageEncoding::default();
        Self {
            line_ending: LineEnding::detect(&text),
            len: encoding.len(&text),
            encoding,
            text,
            ..Default::default()
        }
    }

    pub fn with_line_ending(mut self, line_ending: LineEnding) -> Self {
        self.line_ending = line_ending;
        self
    }

    pub fn with_encoding(mut self, encoding: StorageEncoding) -> Self {
        self.encoding = encoding;
        self.len = encoding.len(&self.text);
        self
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Range passed to the most recent [`EditBuffer::reveal`] call.
    pub fn last_revealed(&self) -> Option<Range<usize>> {
        self.revealed.clone()
    }

    fn insert_now(&mut self, offset: usize, text: &str) -> Result<String, BufferError> {
        // appends skip the walk from the start of the text
        let byte_idx = if offset == self.len {
            self.text.len()
        } else {
            self.encoding.byte_offset(&self.text, offset)?
        };
        let committed = self.line_ending.normalize(text);
        let width = self.encoding.len(&committed);
        self.text.insert_str(byte_idx, &committed);
        self.len += width;

        if self.cursor >= offset {
            self.cursor += width;
        }

        Ok(committed)
    }

    fn delete_now(&mut self, range: Range<usize>) -> Result<(), BufferError> {
        if range.start > range.end {
            return Err(BufferError::Rejected(format!(
                "inverted range {}..{}",
                range.start, range.end
            )));
        }
        let start = self.encoding.byte_offset(&self.text, range.start)?;
        let end = self.encoding.byte_offset(&self.text, range.end)?;
        self.text.replace_range(start..end, "");
        self.len -= range.end - range.start;

        if self.cursor >= range.end {
            self.cursor -= range.end - range.start;
        } else if self.cursor > range.start {
            self.cursor = range.start;
        }

        Ok(())
    }
}

#[async_trait]
impl EditBuffer for TextBuffer {
    fn text(&self) -> String {
        self.text.clone()
    }

    fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    fn encoding(&self) -> StorageEncoding {
        self.encoding
    }

    fn end_offset(&self) -> usize {
        self.len
    }

    fn cursor(&self) -> usize {
        self.cursor
    }

    fn set_cursor(&mut self, offset: usize) {
        self.cursor = offset.min(self.len);
    }

    fn reveal(&mut self, range: Range<usize>) {
        self.revealed = Some(range);
    }

    async fn insert(&mut self, offset: usize, text: &str) -> Result<String, BufferError> {
        self.insert_now(offset, text)
    }

    async fn delete(&mut self, range: Range<usize>) -> Result<(), BufferError> {
        self.delete_now(range)
    }

    async fn replace_all(&mut self, text: &str) -> Result<(), BufferError> {
        self.text = text.to_string();
        self.len = self.encoding.len(text);
        self.cursor = 0;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_detect_line_ending() {
        assert_eq!(LineEnding::detect("a\r\nb\nc"), LineEnding::CrLf);
        assert_eq!(LineEnding::detect("a\nb\r\nc"), LineEnding::Lf);
        assert_eq!(LineEnding::detect("no newline"), LineEnding::Lf);
    }

    #[test]
    fn test_normalize_line_endings() {
        assert_eq!(LineEnding::CrLf.normalize("a\nb\r\nc\rd"), "a\r\nb\r\nc\r\nd");
        assert_eq!(LineEnding::Lf.normalize("a\nb\r\nc\rd"), "a\nb\nc\nd");
    }

    #[test]
    fn test_storage_widths() {
        let text = "a𝟘é";
        assert_eq!(StorageEncoding::Utf8.len(text), 1 + 4 + 2);
        assert_eq!(StorageEncoding::Utf16.len(text), 1 + 2 + 1);
        assert_eq!(StorageEncoding::Codepoint.len(text), 3);
    }

    #[test]
    fn test_byte_offset_rejects_split_character() {
        let text = "a𝟘b";
        assert_eq!(StorageEncoding::Utf16.byte_offset(text, 3).unwrap(), 5);
        assert!(matches!(
            StorageEncoding::Utf16.byte_offset(text, 2),
            Err(BufferError::NotOnCharBoundary { offset: 2 })
        ));
        assert!(matches!(
            StorageEncoding::Utf16.byte_offset(text, 9),
            Err(BufferError::InvalidPosition { offset: 9, len: 4 })
        ));
    }

    #[tokio::test]
    async fn test_insert_reports_committed_text() {
        let mut buffer = TextBuffer::new("ab").with_line_ending(LineEnding::CrLf);
        let committed = buffer.insert(1, "\n").await.unwrap();
        assert_eq!(committed, "\r\n");
        assert_eq!(buffer.as_str(), "a\r\nb");
    }

    #[tokio::test]
    async fn test_cursor_follows_edits() {
        let mut buffer = TextBuffer::new("hello");
        buffer.set_cursor(2);
        buffer.insert(2, "XY").await.unwrap();
        assert_eq!(buffer.cursor(), 4);

        buffer.delete(1..3).await.unwrap();
        assert_eq!(buffer.cursor(), 2);
        assert_eq!(buffer.as_str(), "hYllo");

        buffer.set_cursor(3);
        buffer.delete(2..5).await.unwrap();
        assert_eq!(buffer.cursor(), 2);
    }

    #[tokio::test]
    async fn test_utf16_offsets() {
        let mut buffer = TextBuffer::new("𝟘b");
        buffer.insert(2, "x").await.unwrap();
        assert_eq!(buffer.as_str(), "𝟘xb");
        buffer.delete(0..2).await.unwrap();
        assert_eq!(buffer.as_str(), "xb");
    }

    #[tokio::test]
    async fn test_inverted_delete_is_rejected() {
        let mut buffer = TextBuffer::new("abc");
        assert!(buffer.delete(2..1).await.is_err());
    }

    #[tokio::test]
    async fn test_replace_all_keeps_line_endings() {
        let mut buffer = TextBuffer::new("a\r\nb").with_line_ending(LineEnding::CrLf);
        buffer.replace_all("x\ny\r\nz").await.unwrap();
        assert_eq!(buffer.as_str(), "x\ny\r\nz");
        assert_eq!(buffer.line_ending(), LineEnding::CrLf);
        assert_eq!(buffer.cursor(), 0);
    }

    #[tokio::test]
    async fn test_end_offset_tracks_edits() {
        for encoding in [
            StorageEncoding::Utf16,
            StorageEncoding::Utf8,
            StorageEncoding::Codepoint,
        ] {
            let mut buffer = TextBuffer::new("𝟘b\n").with_encoding(encoding);
            assert_eq!(buffer.end_offset(), encoding.len("𝟘b\n"));

            let end = buffer.end_offset();
            buffer.insert(end, "é\n").await.unwrap();
            buffer.insert(0, "z").await.unwrap();
            assert_eq!(buffer.end_offset(), encoding.len(buffer.as_str()));

            let end = buffer.end_offset();
            buffer.delete(end - 1..end).await.unwrap();
            assert_eq!(buffer.as_str(), "z𝟘b\né");
            assert_eq!(buffer.end_offset(), encoding.len(buffer.as_str()));

            buffer.replace_all("").await.unwrap();
            assert_eq!(buffer.end_offset(), 0);
        }
    }
}
