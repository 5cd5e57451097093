//! A file on disk as an animation target.

use std::ops::Range;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use larch_motion::{BufferError, EditBuffer, LineEnding, StorageEncoding, TextBuffer};

/// Document loaded from a file and written back on [`save`](Self::save).
///
/// In live mode every edit is written through immediately, so an editor
/// watching the file replays the animation.
#[derive(Debug)]
pub struct FileBuffer {
    path: PathBuf,
    inner: TextBuffer,
    live: bool,
}

impl FileBuffer {
    /// Load `path`, or start empty if it does not exist.
    pub async fn open(path: impl Into<PathBuf>, live: bool) -> Result<Self, BufferError> {
        let path = path.into();
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            inner: TextBuffer::new(content).with_encoding(StorageEncoding::Utf8),
            live,
        })
    }

    /// Override the detected line ending.
    pub fn with_line_ending(mut self, line_ending: LineEnding) -> Self {
        self.inner = self.inner.with_line_ending(line_ending);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn content(&self) -> &str {
        self.inner.as_str()
    }

    /// Write the current content to disk.
    pub async fn save(&self) -> Result<(), BufferError> {
        tokio::fs::write(&self.path, self.inner.as_str()).await?;
        Ok(())
    }

    async fn write_through(&self) -> Result<(), BufferError> {
        if self.live {
            self.save().await?;
        }
        Ok(())
    }
}

#[async_trait]
impl EditBuffer for FileBuffer {
    fn text(&self) -> String {
        self.inner.text()
    }

    fn line_ending(&self) -> LineEnding {
        self.inner.line_ending()
    }

    fn encoding(&self) -> StorageEncoding {
        self.inner.encoding()
    }

    fn end_offset(&self) -> usize {
        self.inner.end_offset()
    }

    fn cursor(&self) -> usize {
        self.inner.cursor()
    }

    fn set_cursor(&mut self, offset: usize) {
        self.inner.set_cursor(offset);
    }

    fn reveal(&mut self, range: Range<usize>) {
        self.inner.reveal(range);
    }

    async fn insert(&mut self, offset: usize, text: &str) -> Result<String, BufferError> {
        let committed = self.inner.insert(offset, text).await?;
        self.write_through().await?;
        Ok(committed)
    }

    async fn delete(&mut self, range: Range<usize>) -> Result<(), BufferError> {
        self.inner.delete(range).await?;
        self.write_through().await
    }

    async fn replace_all(&mut self, text: &str) -> Result<(), BufferError> {
        self.inner.replace_all(text).await?;
        self.write_through().await
    }
}
