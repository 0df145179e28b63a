//! Line splitting with a hard per-line ceiling.

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::config::INITIAL_LINE_BUFFER_BYTES;
use crate::error_handling::SourceError;

type BoxedReader = Box<dyn AsyncBufRead + Unpin + Send>;

/// Reads `\n`-terminated lines from a byte stream.
///
/// The line buffer starts at 64KB and grows with the longest line seen, up to
/// `max_line_bytes`. A longer line fails with `RecordTooLarge` instead of
/// being truncated. `\r\n` endings are normalized and invalid UTF-8 is
/// replaced rather than rejected.
pub(crate) struct BoundedLineReader {
    inner: Option<BoxedReader>,
    buf: Vec<u8>,
    max_line_bytes: usize,
    line_number: u64,
}

impl BoundedLineReader {
    pub(crate) fn new(reader: BoxedReader, max_line_bytes: usize) -> Self {
        Self {
            inner: Some(reader),
            buf: Vec::with_capacity(INITIAL_LINE_BUFFER_BYTES.min(max_line_bytes)),
            max_line_bytes,
            line_number: 0,
        }
    }

    /// Lines returned so far.
    pub(crate) fn line_number(&self) -> u64 {
        self.line_number
    }

    #[cfg(test)]
    pub(crate) fn is_closed(&self) -> bool {
        self.inner.is_none()
    }

    /// Returns the next line without its terminator, or `None` at end of stream
    /// or after [`close`](Self::close).
    pub(crate) async fn next_line(&mut self) -> Result<Option<String>, SourceError> {
        let Some(reader) = self.inner.as_mut() else {
            return Ok(None);
        };

        self.buf.clear();
        loop {
            let available = reader
                .fill_buf()
                .await
                .map_err(|source| SourceError::Read {
                    line_number: self.line_number,
                    source,
                })?;

            if available.is_empty() {
                if self.buf.is_empty() {
                    return Ok(None);
                }
                // Last line without a trailing newline
                break;
            }

            let (consumed, complete) = match available.iter().position(|&b| b == b'\n') {
                Some(pos) => (pos + 1, true),
                None => (available.len(), false),
            };
            let content = if complete { consumed - 1 } else { consumed };

            // One extra byte for the `\r` of a CRLF ending
            if self.buf.len() + content > self.max_line_bytes.saturating_add(1) {
                return Err(too_large(self.line_number + 1, self.max_line_bytes));
            }

            self.buf.extend_from_slice(&available[..content]);
            reader.consume(consumed);

            if complete {
                break;
            }
        }

        if self.buf.last() == Some(&b'\r') {
            self.buf.pop();
        }
        if self.buf.len() > self.max_line_bytes {
            return Err(too_large(self.line_number + 1, self.max_line_bytes));
        }
        self.line_number += 1;
        Ok(Some(String::from_utf8_lossy(&self.buf).into_owned()))
    }

    /// Drops the underlying stream. Further calls are no-ops.
    pub(crate) fn close(&mut self) -> bool {
        self.inner.take().is_some()
    }
}

fn too_large(line_number: u64, limit: usize) -> SourceError {
    SourceError::RecordTooLarge { line_number, limit }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader_over(data: &'static [u8], max_line_bytes: usize) -> BoundedLineReader {
        BoundedLineReader::new(Box::new(data), max_line_bytes)
    }

    async fn collect(reader: &mut BoundedLineReader) -> Vec<String> {
        let mut lines = Vec::new();
        while let Some(line) = reader.next_line().await.expect("read should succeed") {
            lines.push(line);
        }
        lines
    }

    #[tokio::test]
    async fn test_reads_lines_and_strips_terminators() {
        let mut reader = reader_over(b"a\tb\nc\td\r\ne\tf", 1024);
        assert_eq!(collect(&mut reader).await, vec!["a\tb", "c\td", "e\tf"]);
        assert_eq!(reader.line_number(), 3);
    }

    #[tokio::test]
    async fn test_empty_lines_are_returned() {
        let mut reader = reader_over(b"first\n\nthird\n", 1024);
        assert_eq!(collect(&mut reader).await, vec!["first", "", "third"]);
    }

    #[tokio::test]
    async fn test_empty_stream_yields_none() {
        let mut reader = reader_over(b"", 1024);
        assert!(reader.next_line().await.expect("read").is_none());
        assert_eq!(reader.line_number(), 0);
    }

    #[tokio::test]
    async fn test_line_longer_than_internal_buffer_is_not_truncated() {
        // Larger than both the 64KB initial capacity and tokio's 8KB BufReader chunks
        let long = "x".repeat(200 * 1024);
        let data: &'static [u8] = Box::leak(format!("{long}\nshort\n").into_bytes().into_boxed_slice());
        let reader = tokio::io::BufReader::with_capacity(8 * 1024, data);
        let mut reader = BoundedLineReader::new(Box::new(reader), 1024 * 1024);
        let lines = collect(&mut reader).await;
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].len(), 200 * 1024);
        assert_eq!(lines[1], "short");
    }

    #[tokio::test]
    async fn test_line_at_limit_is_accepted() {
        let mut reader = reader_over(b"12345\n", 5);
        assert_eq!(collect(&mut reader).await, vec!["12345"]);
    }

    #[tokio::test]
    async fn test_line_over_limit_fails() {
        let mut reader = reader_over(b"ok\n123456\n", 5);
        assert_eq!(reader.next_line().await.expect("first line").as_deref(), Some("ok"));
        match reader.next_line().await {
            Err(SourceError::RecordTooLarge { line_number, limit }) => {
                assert_eq!(line_number, 2);
                assert_eq!(limit, 5);
            }
            other => panic!("expected RecordTooLarge, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_crlf_line_at_limit_is_accepted() {
        let mut reader = reader_over(b"12345\r\nabcde\r", 5);
        assert_eq!(collect(&mut reader).await, vec!["12345", "abcde"]);
    }

    #[tokio::test]
    async fn test_crlf_line_over_limit_fails() {
        let mut reader = reader_over(b"123456\r\n", 5);
        assert!(matches!(
            reader.next_line().await,
            Err(SourceError::RecordTooLarge { line_number: 1, limit: 5 })
        ));
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_replaced() {
        let mut reader = reader_over(b"caf\xe9\n", 1024);
        let line = reader.next_line().await.expect("read").expect("line");
        assert!(line.starts_with("caf"));
        assert!(line.contains('\u{FFFD}'));
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let mut reader = reader_over(b"a\nb\n", 1024);
        assert_eq!(reader.next_line().await.expect("read").as_deref(), Some("a"));
        assert!(reader.close());
        assert!(reader.is_closed());
        assert!(!reader.close());
        assert!(reader.next_line().await.expect("read after close").is_none());
    }
}
