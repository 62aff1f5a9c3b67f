/// Content type used when a response does not name one.
pub const DEFAULT_CONTENT_TYPE: &str = "text/plain";

/// An HTTP status code.
///
/// Any integer can be carried, so a handler may answer with codes the
/// server has no reason phrase for. Well-known codes used by the server:
/// - `OK` (200): Request successful
/// - `BAD_REQUEST` (400): Malformed request or payload
/// - `NOT_FOUND` (404): Resource not found
/// - `METHOD_NOT_ALLOWED` (405): HTTP method not supported
/// - `UNSUPPORTED_MEDIA_TYPE` (415): POST body in an unknown format
/// - `INTERNAL_SERVER_ERROR` (500): Server error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusCode(u16);

impl StatusCode {
    /// 200 OK
    pub const OK: StatusCode = StatusCode(200);
    /// 400 Bad Request
    pub const BAD_REQUEST: StatusCode = StatusCode(400);
    /// 404 Not Found
    pub const NOT_FOUND: StatusCode = StatusCode(404);
    /// 405 Method Not Allowed
    pub const METHOD_NOT_ALLOWED: StatusCode = StatusCode(405);
    /// 415 Unsupported Media Type
    pub const UNSUPPORTED_MEDIA_TYPE: StatusCode = StatusCode(415);
    /// 500 Internal Server Error
    pub const INTERNAL_SERVER_ERROR: StatusCode = StatusCode(500);

    pub const fn from_u16(code: u16) -> Self {
        StatusCode(code)
    }

    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use wicket::http::response::StatusCode;
    /// assert_eq!(StatusCode::OK.as_u16(), 200);
    /// assert_eq!(StatusCode::NOT_FOUND.as_u16(), 404);
    /// ```
    pub fn as_u16(&self) -> u16 {
        self.0
    }

    /// Returns the reason phrase for this status code.
    ///
    /// Codes outside the server's table get the literal `"unknown"`.
    ///
    /// # Example
    ///
    /// ```
    /// # use wicket::http::response::StatusCode;
    /// assert_eq!(StatusCode::OK.reason_phrase(), "OK");
    /// assert_eq!(StatusCode::from_u16(999).reason_phrase(), "unknown");
    /// ```
    pub fn reason_phrase(&self) -> &'static str {
        match self.0 {
            200 => "OK",
            400 => "Bad Request",
            404 => "Not Found",
            405 => "Method Not Allowed",
            415 => "Unsupported Media Type",
            500 => "Internal Server Error",
            _ => "unknown",
        }
    }
}

impl From<u16> for StatusCode {
    fn from(code: u16) -> Self {
        StatusCode(code)
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.0, self.reason_phrase())
    }
}

/// What a handler answers with: status, content type and body.
///
/// The remaining response headers (`Content-Length`, `Connection`) are
/// derived when the response is serialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// The HTTP status code
    pub status: StatusCode,
    /// Value of the Content-Type header
    pub content_type: String,
    /// Response body as text
    pub body: String,
}

/// Builder for constructing HTTP responses in a fluent style.
///
/// # Example
///
/// ```
/// # use wicket::http::response::{ResponseBuilder, StatusCode};
/// let response = ResponseBuilder::new(StatusCode::OK)
///     .content_type("application/json")
///     .body("{}")
///     .build();
/// assert_eq!(response.content_type, "application/json");
/// ```
pub struct ResponseBuilder {
    status: StatusCode,
    content_type: Option<String>,
    body: String,
}

impl ResponseBuilder {
    /// Creates a new response builder with the specified status code.
    pub fn new(status: impl Into<StatusCode>) -> Self {
        Self {
            status: status.into(),
            content_type: None,
            body: String::new(),
        }
    }

    /// Sets the Content-Type header value.
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Sets the response body.
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Builds the final Response, defaulting the content type to `text/plain`.
    pub fn build(self) -> Response {
        Response {
            status: self.status,
            content_type: self
                .content_type
                .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
            body: self.body,
        }
    }
}

impl Response {
    /// Creates a `text/plain` response.
    pub fn new(status: impl Into<StatusCode>, body: impl Into<String>) -> Self {
        ResponseBuilder::new(status).body(body).build()
    }

    /// Creates a simple 200 OK response with the given body.
    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(StatusCode::OK, body)
    }

    /// Creates a 400 Bad Request response.
    pub fn bad_request(body: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, body)
    }

    /// Creates a 404 Not Found response.
    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "Page Not Found")
    }

    /// Creates a 405 response naming the rejected method.
    pub fn method_not_allowed(method: &str) -> Self {
        Self::new(
            StatusCode::METHOD_NOT_ALLOWED,
            format!("Method {} Not Allowed", method),
        )
    }

    /// Creates a 415 response naming the rejected content type.
    pub fn unsupported_media_type(content_type: &str) -> Self {
        Self::new(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            format!("Unsupported Content-Type: {}", content_type),
        )
    }

    /// Creates a 500 Internal Server Error response.
    pub fn internal_error() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
    }

    /// Replaces the content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }
}
