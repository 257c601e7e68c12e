//! Ingress headers and their echo onto responses in debug mode.

use hyper::{HeaderMap, Response, header::{CONTENT_TYPE, HeaderName, HeaderValue}};

pub const FORMAT_HEADER: &str = "x-format";
pub const CODE_HEADER: &str = "x-code";
pub const ORIGINAL_URI_HEADER: &str = "x-original-uri";
pub const NAMESPACE_HEADER: &str = "x-namespace";
pub const INGRESS_NAME_HEADER: &str = "x-ingress-name";
pub const SERVICE_NAME_HEADER: &str = "x-service-name";
pub const SERVICE_PORT_HEADER: &str = "x-service-port";
pub const REQUEST_ID_HEADER: &str = "x-request-id";

const ECHOED_HEADERS: [HeaderName; 9] = [
    HeaderName::from_static(FORMAT_HEADER),
    HeaderName::from_static(CODE_HEADER),
    CONTENT_TYPE,
    HeaderName::from_static(ORIGINAL_URI_HEADER),
    HeaderName::from_static(NAMESPACE_HEADER),
    HeaderName::from_static(INGRESS_NAME_HEADER),
    HeaderName::from_static(SERVICE_NAME_HEADER),
    HeaderName::from_static(SERVICE_PORT_HEADER),
    HeaderName::from_static(REQUEST_ID_HEADER),
];

/// Copies the ingress headers of the request onto the response.
///
/// Headers missing from the request are echoed empty. The response keeps its
/// own `Content-Type`; the echoed one only shows up when none was set.
pub fn add_debug_headers<B>(response: Response<B>, request_headers: &HeaderMap) -> Response<B> {
    let (mut parts, body) = response.into_parts();

    for name in ECHOED_HEADERS {
        if name == CONTENT_TYPE && parts.headers.contains_key(CONTENT_TYPE) {
            continue;
        }
        let value = request_headers
            .get(&name)
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static(""));
        parts.headers.insert(name, value);
    }

    Response::from_parts(parts, body)
}
