//! Append-only output buffer with mark/truncate rollback.
//!
//! Handlers write speculatively: take a [`mark`](OutputBuffer::mark), write,
//! and [`truncate`](OutputBuffer::truncate) back to the mark when the construct
//! turns out to be empty.

use std::fmt;

/// Position in an [`OutputBuffer`] recorded before a speculative write.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Mark(usize);

impl Mark {
    /// Byte offset of the mark.
    pub fn offset(self) -> usize {
        self.0
    }
}

/// Growable text accumulator owned by one render session.
#[derive(Clone, Debug, Default)]
pub struct OutputBuffer {
    text: String,
}

impl OutputBuffer {
    /// Create an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty buffer with preallocated capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            text: String::with_capacity(capacity),
        }
    }

    /// Current length in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Whether nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Record the current length so later writes can be rolled back.
    pub fn mark(&self) -> Mark {
        Mark(self.text.len())
    }

    /// Whether anything was written since `mark`.
    pub fn wrote_since(&self, mark: Mark) -> bool {
        self.text.len() > mark.0
    }

    /// Number of bytes written since `mark`.
    pub fn len_since(&self, mark: Mark) -> usize {
        self.text.len().saturating_sub(mark.0)
    }

    /// Discard everything written after `mark`.
    ///
    /// Marks always sit on a boundary between two writes, so the cut never
    /// splits a character.
    pub fn truncate(&mut self, mark: Mark) {
        self.text.truncate(mark.0);
    }

    /// Remove and return everything written after `mark`.
    pub fn split_off(&mut self, mark: Mark) -> String {
        self.text.split_off(mark.0)
    }

    /// Text written since `mark`.
    pub fn since(&self, mark: Mark) -> &str {
        &self.text[mark.0..]
    }

    /// Append a string.
    pub fn push_str(&mut self, s: &str) {
        self.text.push_str(s);
    }

    /// Append a single character.
    pub fn push(&mut self, c: char) {
        self.text.push(c);
    }

    /// Append `c` repeated `count` times.
    pub fn push_repeated(&mut self, c: char, count: usize) {
        self.text.extend(std::iter::repeat_n(c, count));
    }

    /// Append formatted text.
    ///
    /// Shadows [`fmt::Write::write_fmt`] so `write!` on a buffer needs no
    /// result handling.
    pub fn write_fmt(&mut self, args: fmt::Arguments<'_>) {
        // Formatting into a String only fails if a Display impl fails.
        let _ = fmt::Write::write_fmt(&mut self.text, args);
    }

    /// Buffer contents.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Consume the buffer, returning its contents.
    pub fn into_string(self) -> String {
        self.text
    }
}

impl fmt::Write for OutputBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.text.push_str(s);
        Ok(())
    }
}

impl fmt::Display for OutputBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
