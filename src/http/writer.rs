use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::response::{Response, StatusCode};

const HTTP_VERSION: &str = "HTTP/1.1";

/// Serializes a response: status line, `Content-Type`, `Content-Length`,
/// `Connection: close`, blank line, body.
pub fn serialize_response(resp: &Response) -> Vec<u8> {
    let body = resp.body.as_bytes();
    let mut buf = Vec::with_capacity(128 + body.len());

    // Status line
    let status_line = format!(
        "{} {} {}\r\n",
        HTTP_VERSION,
        resp.status.as_u16(),
        resp.status.reason_phrase()
    );
    buf.extend_from_slice(status_line.as_bytes());

    // Headers, fixed order
    let headers = [
        ("Content-Type", resp.content_type.clone()),
        ("Content-Length", body.len().to_string()),
        ("Connection", "close".to_string()),
    ];
    for (k, v) in &headers {
        buf.extend_from_slice(k.as_bytes());
        buf.extend_from_slice(b": ");
        buf.extend_from_slice(v.as_bytes());
        buf.extend_from_slice(b"\r\n");
    }

    // Header/body separator
    buf.extend_from_slice(b"\r\n");

    // Body
    buf.extend_from_slice(body);

    buf
}

/// Builds the wire bytes for a status, body and content type.
///
/// ```
/// # use wicket::http::writer::build_response;
/// let bytes = build_response(200, "OK", "text/plain");
/// assert_eq!(
///     bytes,
///     b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 2\r\nConnection: close\r\n\r\nOK"
/// );
/// ```
pub fn build_response(status: u16, body: &str, content_type: &str) -> Vec<u8> {
    serialize_response(&Response::new(StatusCode::from_u16(status), body).with_content_type(content_type))
}

pub struct ResponseWriter {
    buffer: Vec<u8>,
    written: usize,
}

impl ResponseWriter {
    pub fn new(response: &Response) -> Self {
        Self {
            buffer: serialize_response(response),
            written: 0,
        }
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.written
    }

    pub async fn write_to_stream<W>(&mut self, stream: &mut W) -> anyhow::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        while self.written < self.buffer.len() {
            let n = stream.write(&self.buffer[self.written..]).await?;

            if n == 0 {
                return Err(anyhow::anyhow!("connection closed while writing"));
            }

            self.written += n;
        }

        stream.flush().await?;
        Ok(())
    }
}
