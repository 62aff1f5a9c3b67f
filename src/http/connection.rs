use std::fmt;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::config::Config;
use crate::http::frame::{FrameError, FrameReader};
use crate::http::parser::{ParseError, parse_http_request};
use crate::http::request::Request;
use crate::http::response::Response;
use crate::http::writer::ResponseWriter;
use crate::router::Router;

/// Most unread input discarded after rejecting a request.
const DRAIN_LIMIT: usize = 64 * 1024;

/// How long to wait for unread input after rejecting a request.
const DRAIN_TIMEOUT: Duration = Duration::from_millis(100);

/// Why a request could not be turned into a [`Request`].
#[derive(Debug)]
pub enum RequestError {
    Frame(FrameError),
    Parse(ParseError),
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::Frame(e) => fmt::Display::fmt(e, f),
            RequestError::Parse(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl std::error::Error for RequestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RequestError::Frame(e) => Some(e),
            RequestError::Parse(e) => Some(e),
        }
    }
}

impl From<FrameError> for RequestError {
    fn from(e: FrameError) -> Self {
        RequestError::Frame(e)
    }
}

impl From<ParseError> for RequestError {
    fn from(e: ParseError) -> Self {
        RequestError::Parse(e)
    }
}

/// One request/response exchange over a stream.
///
/// The connection is always closed after the response; there is no
/// keep-alive.
pub struct Connection<'a, S> {
    stream: S,
    router: &'a Router,
    read_chunk_size: usize,
    max_header_bytes: usize,
    rejected: bool,
    state: ConnectionState,
}

pub enum ConnectionState {
    Reading,
    Processing(Request),
    Writing(ResponseWriter),
    Closed,
}

impl<'a, S> Connection<'a, S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, router: &'a Router, cfg: &Config) -> Self {
        Self {
            stream,
            router,
            read_chunk_size: cfg.read_chunk_size,
            max_header_bytes: cfg.max_header_bytes,
            rejected: false,
            state: ConnectionState::Reading,
        }
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            match &mut self.state {
                ConnectionState::Reading => {
                    self.state = match self.read_request().await {
                        Ok(Some(req)) => ConnectionState::Processing(req),
                        Ok(None) => ConnectionState::Closed,
                        Err(RequestError::Frame(FrameError::Io(e))) => return Err(e.into()),
                        Err(e) => {
                            tracing::warn!(error = %e, "Rejecting malformed request");
                            let response = Response::bad_request("Bad Request");
                            self.rejected = true;
                            ConnectionState::Writing(ResponseWriter::new(&response))
                        }
                    };
                }

                ConnectionState::Processing(req) => {
                    let response = self.router.dispatch(req);
                    tracing::info!(
                        method = %req.method,
                        path = %req.path,
                        status = response.status.as_u16(),
                        "Handled request"
                    );
                    self.state = ConnectionState::Writing(ResponseWriter::new(&response));
                }

                ConnectionState::Writing(writer) => {
                    writer.write_to_stream(&mut self.stream).await?;
                    self.stream.shutdown().await?;
                    if self.rejected {
                        self.drain().await;
                    }
                    self.state = ConnectionState::Closed;
                }

                ConnectionState::Closed => {
                    break;
                }
            }
        }

        Ok(())
    }

    /// Discards input the client is still sending so closing the socket
    /// does not reset the connection before the 400 is read.
    async fn drain(&mut self) {
        let mut chunk = vec![0u8; self.read_chunk_size.max(1)];
        let mut discarded = 0;

        let drained = tokio::time::timeout(DRAIN_TIMEOUT, async {
            while discarded < DRAIN_LIMIT {
                match self.stream.read(&mut chunk).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => discarded += n,
                }
            }
        })
        .await;

        tracing::debug!(discarded, timed_out = drained.is_err(), "Drained rejected request");
    }

    /// Reads and parses one request.
    ///
    /// Returns `Ok(None)` when the peer closed without sending anything.
    /// A peer that closes mid-request still gets its partial bytes parsed.
    pub async fn read_request(&mut self) -> Result<Option<Request>, RequestError> {
        let frame = FrameReader::new(&mut self.stream)
            .with_chunk_size(self.read_chunk_size)
            .with_max_header_bytes(self.max_header_bytes)
            .read_frame()
            .await?;

        if frame.is_empty() {
            return Ok(None);
        }
        if !frame.is_complete() {
            tracing::debug!(received = frame.len(), "Parsing incomplete request");
        }

        let text = frame.into_text()?;
        Ok(Some(parse_http_request(&text)?))
    }
}
