use axum::http::HeaderValue;
use tower_http::request_id::{MakeRequestId, RequestId, SetRequestIdLayer};
use uuid::Uuid;

/// Stamps each request with a UUIDv7 `x-request-id`. v7 ids sort by time,
/// which keeps correlated log lines in issue order when grepping.
#[derive(Clone, Default)]
pub struct RequestIdFactory;

impl MakeRequestId for RequestIdFactory {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let value = HeaderValue::from_str(&Uuid::now_v7().to_string()).ok()?;
        Some(RequestId::new(value))
    }
}

pub fn request_id_layer() -> SetRequestIdLayer<RequestIdFactory> {
    SetRequestIdLayer::x_request_id(RequestIdFactory)
}
