//! Chunked reads off the socket.

use std::io;

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt};

use super::READ_CHUNK_SIZE;

/// Reads newline-terminated chunks from a byte stream.
///
/// A chunk is whatever arrived up to a read that left the buffer ending in
/// `\n`. It may hold several CRLF-terminated lines; use
/// [`split_lines`](super::split_lines) to separate them.
#[derive(Debug)]
pub struct FrameReader<R> {
    reader: R,
    buf: BytesMut,
}

impl<R: AsyncRead + Unpin> FrameReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: BytesMut::with_capacity(READ_CHUNK_SIZE),
        }
    }

    /// Read the next chunk.
    ///
    /// Returns `Ok(None)` once the peer has closed the stream and nothing
    /// is buffered. A partial chunk before end-of-stream is still returned.
    /// Invalid UTF-8 is replaced rather than rejected.
    pub async fn read_chunk(&mut self) -> io::Result<Option<String>> {
        loop {
            self.buf.reserve(READ_CHUNK_SIZE);
            let n = self.reader.read_buf(&mut self.buf).await?;
            if n == 0 {
                if self.buf.is_empty() {
                    return Ok(None);
                }
                break;
            }
            if self.buf.ends_with(b"\n") {
                break;
            }
        }
        let chunk = self.buf.split();
        Ok(Some(String::from_utf8_lossy(&chunk).into_owned()))
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}
