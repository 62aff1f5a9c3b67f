use crate::http::request::Request;
use crate::http::response::Response;

/// Produces a response for a routed request.
///
/// Handlers must not fail: anything that goes wrong is reported through
/// the returned [`Response`].
pub trait Handler: Send + Sync {
    fn handle(&self, req: &Request) -> Response;
}

impl<F> Handler for F
where
    F: Fn(&Request) -> Response + Send + Sync,
{
    fn handle(&self, req: &Request) -> Response {
        self(req)
    }
}
