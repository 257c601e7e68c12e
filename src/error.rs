use std::{io, path::PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {

    #[error("No file extension known for default format: {format}")]
    UnknownDefaultFormat {
        format: String,
    },

    #[error("Invalid bind address: {address}")]
    InvalidBindAddress {
        address: String,
    },

    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source] source: std::io::Error,
    },

    #[error("HTTP error: {source}")]
    Http {
        #[from] source: hyper::http::Error,
    },

    #[error("Metrics error: {source}")]
    Metrics {
        #[from] source: prometheus::Error,
    },

    #[error("IO error: {source}")]
    StdIo {
        #[from] source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, AppError>;
