use hyper::{Response, StatusCode, header::{CONTENT_TYPE, X_CONTENT_TYPE_OPTIONS}};
use http_body_util::Full;
use bytes::Bytes;
use crate::error::{AppError, Result};

/// The plain 404 sent when no error file matches the request.
pub fn not_found_response() -> Result<Response<Full<Bytes>>> {
    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header(CONTENT_TYPE, "text/plain; charset=utf-8")
        .header(X_CONTENT_TYPE_OPTIONS, "nosniff")
        .body(Full::new(Bytes::from("404 page not found\n")))
        .map_err(AppError::from)
}

pub fn error_response(_err: AppError) -> Result<Response<Full<Bytes>>> {
    Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .body(Full::new(Bytes::from("500 Internal Server Error")))
        .map_err(AppError::from)
}

pub fn healthz_response() -> Result<Response<Full<Bytes>>> {
    Response::builder()
        .status(StatusCode::OK)
        .body(Full::new(Bytes::new()))
        .map_err(AppError::from)
}

pub fn metrics_response(content_type: &str, body: Vec<u8>) -> Result<Response<Full<Bytes>>> {
    Response::builder()
        .header(CONTENT_TYPE, content_type)
        .body(Full::new(Bytes::from(body)))
        .map_err(AppError::from)
}
