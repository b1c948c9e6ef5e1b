//! Request ID generation.
//!
//! Clients may supply their own `x-request-id`; otherwise a UUID v4 is
//! generated before tracing starts so every log line of the request carries it.

use axum::http::{HeaderName, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Generates UUID v4 request IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeGatewayRequestId;

impl MakeRequestId for MakeGatewayRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generates_distinct_uuids() {
        let request = Request::new(());
        let mut make = MakeGatewayRequestId;

        let a = make.make_request_id(&request).unwrap();
        let b = make.make_request_id(&request).unwrap();
        let a = a.header_value().to_str().unwrap().to_string();

        assert!(Uuid::parse_str(&a).is_ok());
        assert_ne!(a, b.header_value().to_str().unwrap());
    }
}
