//! Static file serving for GET requests.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::http::mime;
use crate::http::request::Request;
use crate::http::response::{Response, ResponseBuilder, StatusCode};
use crate::router::Handler;

const INDEX: &str = "index.html";

/// Serves UTF-8 text files from a base directory.
#[derive(Debug, Clone)]
pub struct StaticFiles {
    base_dir: PathBuf,
}

impl StaticFiles {
    pub fn new<P: Into<PathBuf>>(base: P) -> Self {
        Self { base_dir: base.into() }
    }

    /// Maps a URL path under the base directory. Anything that would climb
    /// out of it (`..`, absolute or prefixed components) maps to nothing.
    pub fn map_path(&self, url_path: &str) -> Option<PathBuf> {
        let url_path = url_path.trim_start_matches('/');
        let url_path = if url_path.is_empty() { INDEX } else { url_path };

        let mut pb = self.base_dir.clone();
        for comp in Path::new(url_path).components() {
            match comp {
                Component::Normal(s) => pb.push(s),
                Component::CurDir => {}
                _ => return None,
            }
        }
        Some(pb)
    }

    /// Reads the file behind `url_path` with its guessed content type.
    ///
    /// Missing files, directories and rejected paths come back as
    /// `io::ErrorKind::NotFound`.
    pub fn load(&self, url_path: &str) -> io::Result<(String, &'static str)> {
        let path = self
            .map_path(url_path)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "invalid path"))?;
        if !path.is_file() {
            return Err(io::Error::new(io::ErrorKind::NotFound, "file not found"));
        }
        let body = fs::read_to_string(&path)?;
        Ok((body, mime::guess_or_default(&path)))
    }
}

impl Handler for StaticFiles {
    fn handle(&self, req: &Request) -> Response {
        match self.load(req.path_only()) {
            Ok((body, content_type)) => ResponseBuilder::new(StatusCode::OK)
                .content_type(content_type)
                .body(body)
                .build(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Response::not_found(),
            Err(e) => {
                // The error text stays in the log; clients only see the status.
                tracing::error!(path = %req.path, error = %e, "Failed to read static file");
                Response::internal_error()
            }
        }
    }
}
