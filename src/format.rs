//! Selection of the response media type and the file extension used to find
//! the error page on disk.

use mime::Mime;
use tracing::{info, warn};

/// Media types that `Accept` negotiation is allowed to pick.
const NEGOTIABLE_TYPES: [&str; 2] = ["application/json", "text/html"];

/// A media type paired with the file extension its error pages use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Format {
    pub media_type: String,
    pub extension: String,
}

impl Format {
    /// Looks up the extension registered for `media_type`.
    ///
    /// Parameters such as `charset` are ignored for the lookup but the media
    /// type is kept verbatim, since it becomes the `Content-Type` of the reply.
    pub fn lookup(media_type: &str) -> Option<Self> {
        let media_type = media_type.trim();
        extension_for(media_type).map(|extension| Self {
            media_type: media_type.to_string(),
            extension,
        })
    }
}

pub fn extension_for(media_type: &str) -> Option<String> {
    let mime: Mime = media_type.parse().ok()?;
    if mime.type_() == mime::STAR || mime.subtype() == mime::STAR {
        return None;
    }
    mime_guess::get_mime_extensions_str(mime.essence_str())
        .and_then(|extensions| extensions.first())
        .map(|ext| normalize_extension(ext))
}

/// Adds the leading dot and maps the legacy `.htm` to `.html`.
pub fn normalize_extension(ext: &str) -> String {
    let ext = if ext.starts_with('.') {
        ext.to_string()
    } else {
        format!(".{}", ext)
    };
    if ext == ".htm" {
        ".html".to_string()
    } else {
        ext
    }
}

/// Splits an `Accept` header into media types ordered by descending quality.
///
/// A missing or unparsable `q` counts as 1.0. Entries of equal quality keep
/// the order in which they appear in the header.
pub fn parse_accept_header(header: &str) -> impl Iterator<Item = &str> {
    let mut entries: Vec<(&str, f64)> = header
        .split(',')
        .map(|part| {
            let part = part.trim();
            match part.split_once(";q=") {
                Some((media_type, quality)) => (media_type.trim(), parse_quality(quality)),
                None => (part, 1.0),
            }
        })
        .collect();

    entries.sort_by(|a, b| b.1.total_cmp(&a.1));
    entries.into_iter().map(|(media_type, _)| media_type)
}

fn parse_quality(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(q) if q.is_finite() => q.clamp(0.0, 1.0),
        _ => 1.0,
    }
}

/// Picks the first negotiable type from `accept`, else the default format.
pub fn select_format(accept: &str, default: &Format) -> Format {
    parse_accept_header(accept)
        .filter_map(|candidate| {
            NEGOTIABLE_TYPES
                .iter()
                .find(|supported| supported.eq_ignore_ascii_case(candidate))
        })
        .find_map(|supported| Format::lookup(supported))
        .unwrap_or_else(|| default.clone())
}

/// Resolves the format of a reply from the `X-Format` and `Accept` headers.
///
/// A non-empty explicit format always wins over `Accept`; if its extension is
/// unknown the default format is used instead.
pub fn resolve(explicit: Option<&str>, accept: Option<&str>, default: &Format) -> Format {
    let format = match explicit.map(str::trim).filter(|f| !f.is_empty()) {
        Some(requested) => Format::lookup(requested).unwrap_or_else(|| {
            warn!(
                requested,
                fallback = %default.media_type,
                "Unknown format requested, using default"
            );
            default.clone()
        }),
        None => select_format(accept.unwrap_or_default(), default),
    };
    info!(format = %format.media_type, extension = %format.extension, "Selected format");
    format
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn html() -> Format {
        Format::lookup("text/html").unwrap()
    }

    #[rstest]
    #[case("htm", ".html")]
    #[case(".htm", ".html")]
    #[case("json", ".json")]
    #[case(".xml", ".xml")]
    #[case("html", ".html")]
    fn test_normalize_extension(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalize_extension(raw), expected);
    }

    #[rstest]
    #[case("text/html", ".html")]
    #[case("application/json", ".json")]
    #[case("text/html; charset=utf-8", ".html")]
    #[case("TEXT/HTML", ".html")]
    fn test_extension_for_known_types(#[case] media_type: &str, #[case] expected: &str) {
        assert_eq!(extension_for(media_type).as_deref(), Some(expected));
    }

    #[test]
    fn test_extension_for_unknown_types() {
        assert_eq!(extension_for("application/x-not-a-real-type"), None);
        assert_eq!(extension_for("not a media type"), None);
        assert_eq!(extension_for("*/*"), None);
        assert_eq!(extension_for("text/*"), None);
    }

    #[test]
    fn test_accept_quality_ordering() {
        let order: Vec<_> = parse_accept_header("text/html;q=0.8, application/json;q=0.9").collect();
        assert_eq!(order, vec!["application/json", "text/html"]);
    }

    #[test]
    fn test_accept_without_quality_keeps_input_order() {
        let order: Vec<_> = parse_accept_header("application/xml, application/json, text/html").collect();
        assert_eq!(order, vec!["application/xml", "application/json", "text/html"]);
    }

    #[test]
    fn test_accept_ties_are_stable() {
        let order: Vec<_> =
            parse_accept_header("a/a;q=0.5, b/b, c/c;q=0.5, d/d;q=bogus").collect();
        assert_eq!(order, vec!["b/b", "d/d", "a/a", "c/c"]);
    }

    #[test]
    fn test_accept_empty_header() {
        let order: Vec<_> = parse_accept_header("").collect();
        assert_eq!(order, vec![""]);
    }

    #[test]
    fn test_resolve_prefers_higher_quality() {
        let format = resolve(None, Some("text/html;q=0.8, application/json;q=0.9"), &html());
        assert_eq!(format.media_type, "application/json");
        assert_eq!(format.extension, ".json");
    }

    #[test]
    fn test_resolve_skips_unsupported_accept_types() {
        let format = resolve(None, Some("image/png, application/json;q=0.1"), &html());
        assert_eq!(format.media_type, "application/json");
    }

    #[test]
    fn test_resolve_unsupported_accept_uses_default() {
        let json = Format::lookup("application/json").unwrap();
        let format = resolve(None, Some("image/png, */*;q=0.8"), &json);
        assert_eq!(format, json);
    }

    #[test]
    fn test_resolve_missing_headers_use_default() {
        assert_eq!(resolve(None, None, &html()), html());
        assert_eq!(resolve(Some(""), None, &html()), html());
    }

    #[test]
    fn test_resolve_explicit_overrides_accept() {
        let format = resolve(Some("application/json"), Some("text/html"), &html());
        assert_eq!(format.media_type, "application/json");
        assert_eq!(format.extension, ".json");
    }

    #[test]
    fn test_resolve_explicit_is_not_limited_to_negotiable_types() {
        let format = resolve(Some("application/pdf"), None, &html());
        assert_eq!(format.media_type, "application/pdf");
        assert_eq!(format.extension, ".pdf");
    }

    #[test]
    fn test_resolve_unknown_explicit_uses_default() {
        let format = resolve(Some("application/x-unknown"), Some("application/json"), &html());
        assert_eq!(format, html());
    }
}
