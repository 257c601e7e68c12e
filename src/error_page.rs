//! Locating and serving the error file for a status code and format.

use std::{
    borrow::Cow,
    path::{Path, PathBuf},
};

use bytes::Bytes;
use http_body_util::Full;
use hyper::{HeaderMap, Response, StatusCode, header::{ACCEPT, CONTENT_TYPE}};
use tokio::{fs::File, io::AsyncReadExt};
use tracing::{info, warn};

use crate::{
    config::Config,
    debug_headers::{add_debug_headers, CODE_HEADER, FORMAT_HEADER},
    error::{AppError, Result},
    format::{self, Format},
    responses::not_found_response,
};

/// Parses the `X-Code` header, defaulting to 404.
///
/// Informational codes are rejected: a 1xx cannot carry a final response.
pub fn status_code(raw: Option<&str>) -> StatusCode {
    let Some(raw) = raw.filter(|raw| !raw.trim().is_empty()) else {
        return StatusCode::NOT_FOUND;
    };
    match raw
        .trim()
        .parse::<u16>()
        .ok()
        .and_then(|code| StatusCode::from_u16(code).ok())
        .filter(|code| !code.is_informational())
    {
        Some(code) => code,
        None => {
            warn!(code = raw, "Invalid status code requested, using 404");
            StatusCode::NOT_FOUND
        }
    }
}

/// The exact-code file followed by the status class wildcard, e.g.
/// `/www/503.html` then `/www/5xx.html`.
pub fn candidate_paths(root: &Path, code: StatusCode, extension: &str) -> [PathBuf; 2] {
    let code = code.as_u16();
    [
        root.join(format!("{}{}", code, extension)),
        root.join(format!("{}xx{}", code / 100, extension)),
    ]
}

/// Returns the first candidate file that can be read, with its contents.
pub async fn find_error_page(
    root: &Path,
    code: StatusCode,
    extension: &str,
) -> Option<(PathBuf, Vec<u8>)> {
    for path in candidate_paths(root, code, extension) {
        match read_file(&path).await {
            Ok(content) => return Some((path, content)),
            Err(e) => warn!(error = %e, "Unable to open error file"),
        }
    }
    None
}

async fn read_file(path: &Path) -> Result<Vec<u8>> {
    let mut file = File::open(path).await.map_err(|source| AppError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut content = Vec::new();
    file.read_to_end(&mut content)
        .await
        .map_err(|source| AppError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(content)
}

/// A header that is present but not visible ASCII still counts as given;
/// the replacement characters make it fail the later parse.
fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<Cow<'a, str>> {
    headers
        .get(name)
        .map(|value| String::from_utf8_lossy(value.as_bytes()))
}

/// Renders the error page described by the request headers.
pub async fn serve_error_page(headers: &HeaderMap, config: &Config) -> Result<Response<Full<Bytes>>> {
    let Format { media_type, extension } = format::resolve(
        header_str(headers, FORMAT_HEADER).as_deref(),
        header_str(headers, ACCEPT.as_str()).as_deref(),
        &config.default_format,
    );
    let code = status_code(header_str(headers, CODE_HEADER).as_deref());

    let response = match find_error_page(&config.error_files_path, code, &extension).await {
        Some((path, content)) => {
            info!(
                code = code.as_u16(),
                format = %media_type,
                file = %path.display(),
                "Serving custom error response"
            );
            Response::builder()
                .status(code)
                .header(CONTENT_TYPE, media_type.as_str())
                .body(Full::new(Bytes::from(content)))?
        }
        None => {
            warn!(
                code = code.as_u16(),
                format = %media_type,
                "No error file found, responding with plain 404"
            );
            not_found_response()?
        }
    };

    Ok(if config.debug {
        add_debug_headers(response, headers)
    } else {
        response
    })
}
