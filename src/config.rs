use clap::Parser;
use std::path::PathBuf;
use crate::error::{AppError, Result};
use crate::format::Format;

#[derive(Parser, Debug)]
#[command(version = concat!(
    env!("CARGO_PKG_VERSION"),
    " (commit: ", env!("GIT_HASH"), ")"
),
    about="Default backend that renders static error pages for an ingress controller")
]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Bind address (IPv4 or IPv6)
    #[arg(short, long, value_name="ADDRESS", env = "BIND_ADDRESS", default_value = "0.0.0.0")]
    pub bind: String,

    /// Directory holding the error files (`404.html`, `4xx.json`, ...)
    #[arg(long, env = "ERROR_FILES_PATH", default_value = "/www")]
    pub error_files_path: String,

    /// Media type used when no usable format can be resolved from the request
    #[arg(long, env = "DEFAULT_RESPONSE_FORMAT", default_value = "text/html")]
    pub default_response_format: String,

    /// Echo the ingress headers back on every error page (any non-empty value)
    #[arg(long, env = "DEBUG", value_name = "VALUE", num_args = 0..=1, default_missing_value = "1")]
    pub debug: Option<String>,

    /// Logging level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

pub struct Config {
    pub args: Args,
    pub error_files_path: PathBuf,
    pub default_format: Format,
    pub debug: bool,
}

impl Config {
    pub fn new() -> Result<Self> {
        Self::from_args(Args::parse())
    }

    /// Resolves the default format up front; a default without a known
    /// extension would break every fallback, so it is a startup error.
    pub fn from_args(args: Args) -> Result<Self> {
        let error_files_path = non_empty(&args.error_files_path).unwrap_or("/www");
        let default_media_type = non_empty(&args.default_response_format).unwrap_or("text/html");

        let default_format = Format::lookup(default_media_type).ok_or_else(|| {
            AppError::UnknownDefaultFormat {
                format: default_media_type.to_string(),
            }
        })?;

        let debug = args.debug.as_deref().and_then(non_empty).is_some();

        Ok(Self {
            error_files_path: PathBuf::from(error_files_path),
            default_format,
            debug,
            args,
        })
    }
}

fn non_empty(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("custom-error-pages").chain(argv.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_args(parse(&[
            "--error-files-path", "/www",
            "--default-response-format", "text/html",
            "--debug", "",
        ]))
        .unwrap();
        assert_eq!(config.error_files_path, PathBuf::from("/www"));
        assert_eq!(config.default_format.media_type, "text/html");
        assert_eq!(config.default_format.extension, ".html");
        assert!(!config.debug);
    }

    #[test]
    fn test_empty_values_fall_back_to_defaults() {
        let config = Config::from_args(parse(&[
            "--error-files-path", "",
            "--default-response-format", "",
        ]))
        .unwrap();
        assert_eq!(config.error_files_path, PathBuf::from("/www"));
        assert_eq!(config.default_format.extension, ".html");
    }

    #[test]
    fn test_json_default_format() {
        let config = Config::from_args(parse(&["--default-response-format", "application/json"]))
            .unwrap();
        assert_eq!(config.default_format.extension, ".json");
    }

    #[test]
    fn test_unknown_default_format_is_fatal() {
        let result = Config::from_args(parse(&["--default-response-format", "application/x-nope"]));
        assert!(matches!(
            result,
            Err(AppError::UnknownDefaultFormat { format }) if format == "application/x-nope"
        ));
    }

    #[test]
    fn test_debug_flag() {
        assert!(Config::from_args(parse(&["--debug"])).unwrap().debug);
        assert!(Config::from_args(parse(&["--debug", "yes"])).unwrap().debug);
        assert!(!Config::from_args(parse(&["--debug", ""])).unwrap().debug);
    }
}
