use std::fs;

use wicket::http::request::RequestBuilder;
use wicket::http::response::StatusCode;
use wicket::router::{Handler, Router, StaticFiles};

fn get(path: &str) -> wicket::http::request::Request {
    RequestBuilder::new().method("GET").path(path).build().unwrap()
}

fn site() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("index.html"), "<h1>home</h1>").unwrap();
    fs::write(dir.path().join("notes.txt"), "plain notes\n").unwrap();
    fs::write(dir.path().join("blob.xyz"), "opaque").unwrap();
    fs::write(dir.path().join("binary.txt"), [0xffu8, 0xfe, 0x00]).unwrap();
    fs::create_dir(dir.path().join("css")).unwrap();
    fs::write(dir.path().join("css").join("site.css"), "body {}").unwrap();
    dir
}

#[test]
fn test_root_serves_index() {
    let dir = site();
    let response = StaticFiles::new(dir.path()).handle(&get("/"));

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.content_type, "text/html");
    assert_eq!(response.body, "<h1>home</h1>");
}

#[test]
fn test_nested_file_and_query_string() {
    let dir = site();
    let response = StaticFiles::new(dir.path()).handle(&get("/css/site.css?v=3"));

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.content_type, "text/css");
    assert_eq!(response.body, "body {}");
}

#[test]
fn test_text_file_content_type() {
    let dir = site();
    let response = StaticFiles::new(dir.path()).handle(&get("/notes.txt"));

    assert_eq!(response.content_type, "text/plain");
    assert_eq!(response.body, "plain notes\n");
}

#[test]
fn test_unknown_extension_falls_back_to_octet_stream() {
    let dir = site();
    let response = StaticFiles::new(dir.path()).handle(&get("/blob.xyz"));

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.content_type, "application/octet-stream");
}

#[test]
fn test_missing_file_is_404() {
    let dir = site();
    let response = StaticFiles::new(dir.path()).handle(&get("/nope.html"));

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body, "Page Not Found");
}

#[test]
fn test_directory_is_404() {
    let dir = site();
    let response = StaticFiles::new(dir.path()).handle(&get("/css"));

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[test]
fn test_traversal_is_404() {
    let dir = site();
    let inner = dir.path().join("public");
    fs::create_dir(&inner).unwrap();

    let response = StaticFiles::new(&inner).handle(&get("/../index.html"));

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[test]
fn test_unreadable_text_is_500_without_details() {
    let dir = site();
    let response = StaticFiles::new(dir.path()).handle(&get("/binary.txt"));

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body, "Internal Server Error");
}

#[test]
fn test_default_router_serves_get() {
    let dir = site();
    let response = Router::with_defaults(dir.path()).dispatch(&get("/index.html"));

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, "<h1>home</h1>");
}
