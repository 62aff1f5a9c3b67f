//! End-to-end tests over real sockets and in-memory streams.

use std::fs;
use std::net::SocketAddr;
use std::path::Path;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use wicket::config::Config;
use wicket::http::connection::Connection;
use wicket::router::Router;
use wicket::server::listener;

fn test_config(static_dir: &Path) -> Config {
    Config {
        port: 0,
        static_dir: static_dir.to_path_buf(),
        ..Config::default()
    }
}

async fn spawn_server(static_dir: &Path) -> SocketAddr {
    let cfg = test_config(static_dir);
    let listener = listener::bind(&cfg).await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let router = Router::with_defaults(cfg.static_dir.clone());
        let _ = listener::serve(listener, &router, &cfg).await;
    });

    addr
}

/// Sends `raw`, half-closes the socket and returns everything the server wrote.
async fn exchange(addr: SocketAddr, raw: &[u8]) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(raw).await.unwrap();
    stream.shutdown().await.unwrap();

    let mut out = Vec::new();
    stream.read_to_end(&mut out).await.unwrap();
    String::from_utf8(out).unwrap()
}

#[tokio::test]
async fn test_get_static_index() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("index.html"), "<p>hi</p>").unwrap();
    let addr = spawn_server(dir.path()).await;

    let response = exchange(addr, b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n").await;

    assert_eq!(
        response,
        "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: 9\r\nConnection: close\r\n\r\n<p>hi</p>"
    );
}

#[tokio::test]
async fn test_sequential_connections_are_all_served() {
    let dir = tempfile::tempdir().unwrap();
    let addr = spawn_server(dir.path()).await;

    for _ in 0..3 {
        let response = exchange(addr, b"GET /missing HTTP/1.1\r\n\r\n").await;
        assert!(response.starts_with("HTTP/1.1 404 Not Found\r\n"));
        assert!(response.ends_with("\r\n\r\nPage Not Found"));
    }
}

#[tokio::test]
async fn test_post_json_with_short_body_is_400() {
    let dir = tempfile::tempdir().unwrap();
    let addr = spawn_server(dir.path()).await;

    let response = exchange(
        addr,
        b"POST / HTTP/1.1\r\nContent-Type: application/json\r\nContent-Length: 13\r\n\r\n{\"a\": 1}xxxx",
    )
    .await;

    assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"));
    assert!(response.contains("Connection: close\r\n"));
    assert!(response.ends_with("\r\n\r\nInvalid JSON"));
}

#[tokio::test]
async fn test_post_json_answered_without_client_close() {
    let dir = tempfile::tempdir().unwrap();
    let addr = spawn_server(dir.path()).await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"POST /api HTTP/1.1\r\nContent-Type: application/json\r\nContent-Length: 8\r\n\r\n{\"a\": 1}")
        .await
        .unwrap();

    let mut out = Vec::new();
    stream.read_to_end(&mut out).await.unwrap();
    let response = String::from_utf8(out).unwrap();

    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
    assert_eq!(response.matches("HTTP/1.1").count(), 1);
    assert!(response.ends_with("Received JSON:\n{\n  \"a\": 1\n}"));
}

#[tokio::test]
async fn test_unsupported_method_is_405() {
    let dir = tempfile::tempdir().unwrap();
    let addr = spawn_server(dir.path()).await;

    let response = exchange(addr, b"DELETE /thing HTTP/1.1\r\n\r\n").await;

    assert!(response.starts_with("HTTP/1.1 405 Method Not Allowed\r\n"));
    assert!(response.ends_with("Method DELETE Not Allowed"));
}

#[tokio::test]
async fn test_malformed_request_line_is_400_and_server_survives() {
    let dir = tempfile::tempdir().unwrap();
    let addr = spawn_server(dir.path()).await;

    let bad = exchange(addr, b"NONSENSE\r\n\r\n").await;
    assert!(bad.starts_with("HTTP/1.1 400 Bad Request\r\n"));

    let good = exchange(addr, b"GET /missing HTTP/1.1\r\n\r\n").await;
    assert!(good.starts_with("HTTP/1.1 404 Not Found\r\n"));
}

#[tokio::test]
async fn test_silent_client_gets_no_response() {
    let dir = tempfile::tempdir().unwrap();
    let addr = spawn_server(dir.path()).await;

    let response = exchange(addr, b"").await;

    assert_eq!(response, "");
}

#[tokio::test]
async fn test_connection_over_duplex_stream() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = test_config(dir.path());
    let router = Router::with_defaults(dir.path());
    let (mut client, server) = tokio::io::duplex(4096);

    client
        .write_all(b"POST /form HTTP/1.1\r\nContent-Type: application/x-www-form-urlencoded\r\nContent-Length: 7\r\n\r\nq=hello")
        .await
        .unwrap();

    let mut conn = Connection::new(server, &router, &cfg);
    conn.run().await.unwrap();

    let mut out = Vec::new();
    client.read_to_end(&mut out).await.unwrap();
    let response = String::from_utf8(out).unwrap();

    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(response.ends_with("Received Form Data:\n{\n  \"q\": [\n    \"hello\"\n  ]\n}"));
}

/// Runs one connection over an in-memory stream and returns what it wrote.
async fn run_duplex(cfg: &Config, raw: &[u8]) -> String {
    let router = Router::with_defaults(cfg.static_dir.clone());
    let (mut client, server) = tokio::io::duplex(4096);

    client.write_all(raw).await.unwrap();
    client.shutdown().await.unwrap();

    let mut conn = Connection::new(server, &router, cfg);
    conn.run().await.unwrap();

    let mut out = Vec::new();
    client.read_to_end(&mut out).await.unwrap();
    String::from_utf8(out).unwrap()
}

#[tokio::test]
async fn test_bad_content_length_is_400() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = test_config(dir.path());

    let response = run_duplex(&cfg, b"POST / HTTP/1.1\r\nContent-Length: -5\r\n\r\n").await;

    assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"));
    assert!(response.ends_with("\r\n\r\nBad Request"));
}

#[tokio::test]
async fn test_oversized_headers_are_400() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = Config {
        max_header_bytes: 64,
        ..test_config(dir.path())
    };
    let mut raw = b"GET / HTTP/1.1\r\nX-Filler: ".to_vec();
    raw.extend(std::iter::repeat_n(b'a', 512));

    let response = run_duplex(&cfg, &raw).await;

    assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"));
}

#[tokio::test]
async fn test_oversized_headers_are_400_over_tcp() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = Config {
        max_header_bytes: 64,
        ..test_config(dir.path())
    };
    let listener = listener::bind(&cfg).await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let router = Router::with_defaults(cfg.static_dir.clone());
        let _ = listener::serve(listener, &router, &cfg).await;
    });

    let mut raw = b"GET / HTTP/1.1\r\nX-Filler: ".to_vec();
    raw.extend(std::iter::repeat_n(b'a', 8 * 1024));
    raw.extend_from_slice(b"\r\n\r\n");

    let response = exchange(addr, &raw).await;

    assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"));
}
