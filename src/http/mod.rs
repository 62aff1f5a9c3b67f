//! HTTP protocol implementation.
//!
//! This module implements a minimal HTTP/1.1 server: one request per
//! connection, bodies delimited by `Content-Length`, `Connection: close` on
//! every response.
//!
//! # Architecture
//!
//! The HTTP layer is organized into several submodules:
//!
//! - **`frame`**: Accumulates bytes until a full message (headers + declared body) is buffered
//! - **`parser`**: Parses a framed message into a request
//! - **`request`**: HTTP request representation and lookup helpers
//! - **`response`**: Status codes and the response value handlers return
//! - **`writer`**: Serializes and writes HTTP responses to the client
//! - **`connection`**: The per-connection state machine tying the above together
//! - **`mime`**: MIME type detection based on file extensions
//!
//! # Connection State Machine
//!
//! Each client connection goes through a state machine:
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Frame and parse one request
//!        └──────┬──────┘
//!               │ Request received (malformed → 400, skip to Writing)
//!               ▼
//!        ┌──────────────────┐
//!        │   Processing     │ ← Route dispatch
//!        └──────┬───────────┘
//!               │ Response ready
//!               ▼
//!        ┌──────────────────┐
//!        │    Writing       │ ← Send response to client
//!        └──────┬───────────┘
//!               │ Response sent
//!               ▼
//!            Closed
//! ```
//!
//! # Example
//!
//! ```ignore
//! use wicket::config::Config;
//! use wicket::http::connection::Connection;
//! use wicket::router::Router;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let cfg = Config::default();
//!     let router = Router::with_defaults("static");
//!     let listener = TcpListener::bind(cfg.listen_addr()).await?;
//!
//!     loop {
//!         let (socket, _addr) = listener.accept().await?;
//!         let mut conn = Connection::new(socket, &router, &cfg);
//!         if let Err(e) = conn.run().await {
//!             eprintln!("Connection error: {}", e);
//!         }
//!     }
//! }
//! ```

pub mod connection;
pub mod frame;
pub mod mime;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
