//! POST payload decoding.
//!
//! Bodies are decoded according to their `Content-Type` and echoed back as
//! pretty-printed JSON.

use serde_json::{Map, Value};

use crate::http::request::Request;
use crate::http::response::Response;
use crate::router::Handler;

const JSON: &str = "application/json";
const FORM: &str = "application/x-www-form-urlencoded";

/// Echoes JSON and url-encoded form bodies.
#[derive(Debug, Clone, Copy, Default)]
pub struct PayloadEcho;

impl Handler for PayloadEcho {
    fn handle(&self, req: &Request) -> Response {
        let content_type = req.header("Content-Type").unwrap_or("").to_lowercase();

        if content_type.starts_with(JSON) {
            match serde_json::from_str::<Value>(&req.body) {
                Ok(value) => Response::ok(format!("Received JSON:\n{}", pretty(&value))),
                Err(e) => {
                    tracing::debug!(error = %e, "Rejecting JSON body");
                    Response::bad_request("Invalid JSON")
                }
            }
        } else if content_type.starts_with(FORM) {
            let fields = decode_form(&req.body);
            Response::ok(format!("Received Form Data:\n{}", pretty(&fields)))
        } else {
            Response::unsupported_media_type(&content_type)
        }
    }
}

/// Groups url-encoded pairs into `{"key": ["value", ...]}`, dropping
/// pairs with a blank value.
pub fn decode_form(body: &str) -> Value {
    let mut fields = Map::new();

    for (key, value) in url::form_urlencoded::parse(body.as_bytes()) {
        if value.is_empty() {
            continue;
        }
        let values = fields
            .entry(key.into_owned())
            .or_insert_with(|| Value::Array(Vec::new()));
        if let Value::Array(list) = values {
            list.push(Value::String(value.into_owned()));
        }
    }

    Value::Object(fields)
}

fn pretty(value: &Value) -> String {
    // Serializing a `Value` cannot fail.
    serde_json::to_string_pretty(value).unwrap_or_default()
}
