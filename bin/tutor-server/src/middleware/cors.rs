use axum::http::{HeaderName, Method, header};
use tower_http::cors::{Any, CorsLayer};

/// Headers browsers may send on a cross-origin call to the relay. `apikey`
/// and `x-client-info` are set by hosted-function client SDKs.
const ALLOWED_HEADERS: [HeaderName; 4] = [
    header::AUTHORIZATION,
    HeaderName::from_static("x-client-info"),
    HeaderName::from_static("apikey"),
    header::CONTENT_TYPE,
];

/// Permissive CORS: any origin, the headers above, and the relay's methods.
///
/// Every `OPTIONS` request is answered by this layer directly with an empty
/// 200 response, so preflights never reach a handler.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(ALLOWED_HEADERS)
        .allow_methods([Method::POST, Method::OPTIONS, Method::GET])
}
