//! Incremental message framing.
//!
//! A [`FrameReader`] pulls chunks from a byte stream until one complete
//! HTTP message is buffered: the header section up to `\r\n\r\n` plus as
//! many body bytes as the `Content-Length` header declares.

use bytes::BytesMut;
use std::fmt;
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Size of a single read from the underlying stream.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Upper bound on the header section before the separator shows up.
pub const DEFAULT_MAX_HEADER_BYTES: usize = 64 * 1024;

const SEPARATOR: &[u8] = b"\r\n\r\n";

#[derive(Debug)]
pub enum FrameError {
    Io(io::Error),
    HeadersTooLarge(usize),
    InvalidContentLength(String),
    InvalidUtf8,
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::Io(e) => write!(f, "i/o error while reading request: {}", e),
            FrameError::HeadersTooLarge(limit) => {
                write!(f, "header section exceeds {} bytes", limit)
            }
            FrameError::InvalidContentLength(value) => {
                write!(f, "invalid Content-Length value {:?}", value)
            }
            FrameError::InvalidUtf8 => f.write_str("request is not valid UTF-8"),
        }
    }
}

impl std::error::Error for FrameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FrameError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for FrameError {
    fn from(e: io::Error) -> Self {
        FrameError::Io(e)
    }
}

/// The bytes of one message as read off the wire.
///
/// `complete` is false when the peer closed the stream before the header
/// section or the declared body was fully received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    bytes: Vec<u8>,
    complete: bool,
}

impl Frame {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Decodes the frame as UTF-8 text.
    pub fn into_text(self) -> Result<String, FrameError> {
        String::from_utf8(self.bytes).map_err(|_| FrameError::InvalidUtf8)
    }
}

#[derive(Debug, Clone, Copy)]
struct Head {
    body_start: usize,
    content_length: usize,
}

pub struct FrameReader<R> {
    io: R,
    buffer: BytesMut,
    head: Option<Head>,
    scanned: usize,
    chunk_size: usize,
    max_header_bytes: usize,
}

impl<R: AsyncRead + Unpin> FrameReader<R> {
    pub fn new(io: R) -> Self {
        Self {
            io,
            buffer: BytesMut::with_capacity(DEFAULT_CHUNK_SIZE),
            head: None,
            scanned: 0,
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_header_bytes: DEFAULT_MAX_HEADER_BYTES,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn with_max_header_bytes(mut self, max_header_bytes: usize) -> Self {
        self.max_header_bytes = max_header_bytes;
        self
    }

    /// Reads until one full message is buffered or the peer closes.
    ///
    /// Closing early is not an error: the bytes received so far come back
    /// in a frame with `is_complete() == false` and the parser decides
    /// what to make of them.
    pub async fn read_frame(&mut self) -> Result<Frame, FrameError> {
        let mut chunk = vec![0u8; self.chunk_size];

        let frame = loop {
            let n = self.io.read(&mut chunk).await?;

            if n == 0 {
                tracing::trace!(buffered = self.buffer.len(), "Peer closed before frame completed");
                break Frame {
                    bytes: self.buffer.split().to_vec(),
                    complete: false,
                };
            }

            self.buffer.extend_from_slice(&chunk[..n]);

            if let Some(frame_len) = self.frame_len()? {
                let bytes = self.buffer.split_to(frame_len).to_vec();
                if !self.buffer.is_empty() {
                    tracing::debug!(
                        discarded = self.buffer.len(),
                        "Discarding bytes past end of frame"
                    );
                    self.buffer.clear();
                }
                break Frame {
                    bytes,
                    complete: true,
                };
            }
        };

        self.head = None;
        self.scanned = 0;
        Ok(frame)
    }

    /// Returns the total frame length once everything has arrived.
    fn frame_len(&mut self) -> Result<Option<usize>, FrameError> {
        if self.head.is_none() {
            // Resume a few bytes back in case the separator straddles chunks.
            let from = self.scanned.saturating_sub(SEPARATOR.len() - 1);

            match find_separator(&self.buffer[from..]) {
                Some(pos) => {
                    let header_end = from + pos;
                    if header_end > self.max_header_bytes {
                        return Err(FrameError::HeadersTooLarge(self.max_header_bytes));
                    }
                    let content_length = scan_content_length(&self.buffer[..header_end])?;
                    self.head = Some(Head {
                        body_start: header_end + SEPARATOR.len(),
                        content_length,
                    });
                }
                None => {
                    self.scanned = self.buffer.len();
                    if self.buffer.len() > self.max_header_bytes {
                        return Err(FrameError::HeadersTooLarge(self.max_header_bytes));
                    }
                    return Ok(None);
                }
            }
        }

        let Some(head) = self.head else {
            return Ok(None);
        };

        let body_length = self.buffer.len() - head.body_start;
        if body_length >= head.content_length {
            Ok(Some(head.body_start + head.content_length))
        } else {
            Ok(None)
        }
    }
}

fn find_separator(buf: &[u8]) -> Option<usize> {
    buf.windows(SEPARATOR.len()).position(|w| w == SEPARATOR)
}

/// Finds the declared body length in a header section (request line
/// included). Matching is case-insensitive and the last occurrence wins.
fn scan_content_length(header: &[u8]) -> Result<usize, FrameError> {
    let text = std::str::from_utf8(header).map_err(|_| FrameError::InvalidUtf8)?;

    let mut content_length = 0;
    for line in text.split("\r\n").skip(1) {
        let Some((key, value)) = line.split_once(": ") else {
            continue;
        };
        if key.eq_ignore_ascii_case("content-length") {
            content_length = value
                .trim()
                .parse()
                .map_err(|_| FrameError::InvalidContentLength(value.to_string()))?;
        }
    }

    Ok(content_length)
}
