//! Wicket - a small HTTP/1.1 server over raw TCP sockets.
//!
//! Core library for framing, parsing, routing and response serialization.

pub mod config;
pub mod http;
pub mod router;
pub mod server;
