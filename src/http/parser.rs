use crate::http::request::Request;
use std::collections::HashMap;
use std::fmt;

const CRLF: &str = "\r\n";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The request line did not split into exactly method, path and version.
    MalformedRequestLine(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::MalformedRequestLine(line) => {
                write!(f, "malformed request line {:?}", line)
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// Parses the text of one framed request.
///
/// Header lines without `": "` are ignored. The body is only taken when
/// the exact header name `Content-Length` is present; any text after the
/// header boundary is otherwise dropped.
pub fn parse_http_request(text: &str) -> Result<Request, ParseError> {
    let mut lines = text.split(CRLF);

    // Request line
    let request_line = lines.next().unwrap_or("");
    let mut parts = request_line.split_whitespace();

    let (Some(method), Some(path), Some(version), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(ParseError::MalformedRequestLine(request_line.to_string()));
    };

    // Headers
    let mut headers = HashMap::new();
    let mut offset = request_line.len() + CRLF.len();
    let mut body_start = None;

    for line in lines {
        offset += line.len() + CRLF.len();

        if line.is_empty() {
            body_start = Some(offset);
            break;
        }

        match line.split_once(": ") {
            Some((key, value)) => {
                headers.insert(key.to_string(), value.to_string());
            }
            None => tracing::trace!(line, "Skipping malformed header line"),
        }
    }

    // Body
    let body = match (headers.get("Content-Length"), body_start) {
        (Some(declared), Some(start)) => {
            let rest = text.get(start..).unwrap_or("");
            let declared = declared.trim().parse::<usize>().ok();
            match declared {
                Some(len) if rest.len() > len => {
                    // Never split a character; back off to the nearest boundary.
                    let cut = (0..=len)
                        .rev()
                        .find(|&i| rest.is_char_boundary(i))
                        .unwrap_or(0);
                    &rest[..cut]
                }
                _ => rest,
            }
        }
        _ => "",
    };

    Ok(Request {
        method: method.to_string(),
        path: path.to_string(),
        version: version.to_string(),
        headers,
        body: body.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_get() {
        let req = "GET / HTTP/1.1\r\nHost: example.com\r\n\r\n";

        let parsed = parse_http_request(req).unwrap();

        assert_eq!(parsed.path, "/");
        assert_eq!(parsed.headers.get("Host").unwrap(), "example.com");
        assert_eq!(parsed.body, "");
    }

    #[test]
    fn missing_boundary_leaves_body_empty() {
        let req = "POST / HTTP/1.1\r\nContent-Length: 3";

        let parsed = parse_http_request(req).unwrap();

        assert_eq!(parsed.headers.get("Content-Length").unwrap(), "3");
        assert_eq!(parsed.body, "");
    }
}
