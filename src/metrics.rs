//! Request metrics for the error page route.
//!
//! The collectors live in a registry owned by [`Metrics`] rather than the
//! process-wide default registry, so every server (and every test) gets its
//! own accumulators.

use std::time::Duration;

use hyper::Version;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};

const NAMESPACE: &str = "default_http_backend";
const SUBSYSTEM: &str = "http";

pub struct Metrics {
    registry: Registry,
    request_count: IntCounterVec,
    request_duration: HistogramVec,
}

impl Metrics {
    /// Creates and registers the request counter and duration histogram.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let request_count = IntCounterVec::new(
            Opts::new("request_count_total", "Total number of HTTP requests made.")
                .namespace(NAMESPACE)
                .subsystem(SUBSYSTEM),
            &["proto"],
        )?;

        let request_duration = HistogramVec::new(
            HistogramOpts::new(
                "request_duration_seconds",
                "Histogram of the duration (in seconds) of HTTP requests.",
            )
            .namespace(NAMESPACE)
            .subsystem(SUBSYSTEM)
            .buckets(prometheus::DEFAULT_BUCKETS.to_vec()),
            &["proto"],
        )?;

        registry.register(Box::new(request_count.clone()))?;
        registry.register(Box::new(request_duration.clone()))?;

        Ok(Self {
            registry,
            request_count,
            request_duration,
        })
    }

    /// Counts one request and records how long it took.
    pub fn observe(&self, version: Version, elapsed: Duration) {
        let proto = protocol_label(version);
        self.request_count.with_label_values(&[proto]).inc();
        self.request_duration
            .with_label_values(&[proto])
            .observe(elapsed.as_secs_f64());
    }

    /// Renders every collector in the text exposition format.
    pub fn encode(&self) -> Result<(String, Vec<u8>), prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok((encoder.format_type().to_string(), buffer))
    }

    #[cfg(test)]
    pub fn request_count(&self, proto: &str) -> u64 {
        self.request_count.with_label_values(&[proto]).get()
    }

    #[cfg(test)]
    pub fn observation_count(&self, proto: &str) -> u64 {
        self.request_duration
            .with_label_values(&[proto])
            .get_sample_count()
    }
}

/// Formats a protocol version as `major.minor`.
pub fn protocol_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_11 => "1.1",
        Version::HTTP_2 => "2.0",
        Version::HTTP_3 => "3.0",
        _ => "unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Version::HTTP_10, "1.0")]
    #[case(Version::HTTP_11, "1.1")]
    #[case(Version::HTTP_2, "2.0")]
    fn test_protocol_label(#[case] version: Version, #[case] expected: &str) {
        assert_eq!(protocol_label(version), expected);
    }

    #[test]
    fn test_counts_are_kept_per_protocol() {
        let metrics = Metrics::new().unwrap();

        for _ in 0..3 {
            metrics.observe(Version::HTTP_11, Duration::from_millis(2));
        }
        for _ in 0..5 {
            metrics.observe(Version::HTTP_2, Duration::from_millis(7));
        }

        assert_eq!(metrics.request_count("1.1"), 3);
        assert_eq!(metrics.request_count("2.0"), 5);
        assert_eq!(metrics.observation_count("1.1"), 3);
        assert_eq!(metrics.observation_count("2.0"), 5);
        assert_eq!(metrics.request_count("1.0"), 0);
    }

    #[test]
    fn test_registries_are_independent() {
        let first = Metrics::new().unwrap();
        let second = Metrics::new().unwrap();

        first.observe(Version::HTTP_11, Duration::ZERO);

        assert_eq!(first.request_count("1.1"), 1);
        assert_eq!(second.request_count("1.1"), 0);
    }

    #[test]
    fn test_encode_text_exposition() {
        let metrics = Metrics::new().unwrap();
        metrics.observe(Version::HTTP_11, Duration::from_millis(1));

        let (content_type, body) = metrics.encode().unwrap();
        let text = String::from_utf8(body).unwrap();

        assert!(content_type.starts_with("text/plain"));
        assert!(text.contains("default_http_backend_http_request_count_total{proto=\"1.1\"} 1"));
        assert!(text.contains("default_http_backend_http_request_duration_seconds_count{proto=\"1.1\"} 1"));
    }
}
