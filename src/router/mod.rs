//! Route dispatch.
//!
//! A [`Router`] is an ordered list of bindings from a method and a
//! [`PathMatcher`] to a [`Handler`]. The first binding that accepts both
//! the method and the path answers the request. Every request gets
//! exactly one response: handlers turn their own failures into error
//! responses, and unmatched requests become 404 or 405.
//!
//! The default table serves static files for GET and echoes JSON or form
//! payloads for POST:
//!
//! ```ignore
//! let router = Router::with_defaults("static");
//! let response = router.dispatch(&request);
//! ```

pub mod handler;
pub mod payload;
pub mod statics;

use std::path::PathBuf;

use crate::http::request::{Method, Request};
use crate::http::response::Response;

pub use handler::Handler;
pub use payload::PayloadEcho;
pub use statics::StaticFiles;

/// Decides which request paths a route accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathMatcher {
    /// Every path
    Any,
    /// Exactly this path (query string ignored)
    Exact(String),
    /// Paths starting with this prefix (query string ignored)
    Prefix(String),
}

impl PathMatcher {
    pub fn matches(&self, path: &str) -> bool {
        let path = path.split_once('?').map(|(p, _)| p).unwrap_or(path);
        match self {
            PathMatcher::Any => true,
            PathMatcher::Exact(expected) => path == expected,
            PathMatcher::Prefix(prefix) => path.starts_with(prefix.as_str()),
        }
    }
}

struct Route {
    method: Method,
    matcher: PathMatcher,
    handler: Box<dyn Handler>,
}

#[derive(Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// GET on any path serves files under `static_dir`; POST on any path
    /// echoes the decoded payload.
    pub fn with_defaults(static_dir: impl Into<PathBuf>) -> Self {
        Self::new()
            .get(PathMatcher::Any, StaticFiles::new(static_dir))
            .post(PathMatcher::Any, PayloadEcho)
    }

    /// Appends a binding. Earlier bindings take precedence.
    pub fn route(mut self, method: Method, matcher: PathMatcher, handler: impl Handler + 'static) -> Self {
        self.routes.push(Route {
            method,
            matcher,
            handler: Box::new(handler),
        });
        self
    }

    pub fn get(self, matcher: PathMatcher, handler: impl Handler + 'static) -> Self {
        self.route(Method::GET, matcher, handler)
    }

    pub fn post(self, matcher: PathMatcher, handler: impl Handler + 'static) -> Self {
        self.route(Method::POST, matcher, handler)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn dispatch(&self, req: &Request) -> Response {
        let method = req.known_method();
        let mut path_matched = false;

        for route in &self.routes {
            if !route.matcher.matches(&req.path) {
                continue;
            }
            if Some(route.method) == method {
                return route.handler.handle(req);
            }
            path_matched = true;
        }

        let method_registered = method
            .map(|m| self.routes.iter().any(|r| r.method == m))
            .unwrap_or(false);

        if path_matched || !method_registered {
            Response::method_not_allowed(&req.method)
        } else {
            Response::not_found()
        }
    }
}
