// Internal modules
mod config;
mod debug_headers;
mod error;
mod error_page;
mod format;
mod metrics;
mod responses;

// Standard library imports
use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
    time::Instant,
};

// External crate imports
use http_body_util::Full;
use hyper::{body::Bytes, service::service_fn, Request, Response};
use hyper_util::{
    rt::{TokioExecutor, TokioIo},
    server::conn::auto,
};
use tokio::net::TcpListener;
use tracing::{error, info, Instrument, Level};
use tracing_subscriber::{filter::LevelFilter, fmt, EnvFilter};

// Internal crate imports
use crate::{
    config::Config,
    error::{AppError, Result},
    error_page::serve_error_page,
    metrics::Metrics,
    responses::{healthz_response, metrics_response},
};

/// Everything a request handler needs, shared by all connections.
struct AppState {
    config: Config,
    metrics: Metrics,
}

async fn handle_request<B>(state: Arc<AppState>, req: Request<B>) -> Result<Response<Full<Bytes>>> {
    // The body is never read, only the head matters.
    let (parts, _) = req.into_parts();

    match parts.uri.path() {
        "/healthz" => healthz_response(),
        "/metrics" => {
            let (content_type, body) = state.metrics.encode()?;
            metrics_response(&content_type, body)
        }
        _ => {
            let start = Instant::now();
            let response = serve_error_page(&parts.headers, &state.config).await;
            state.metrics.observe(parts.version, start.elapsed());
            response
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::new()?;

    // Initialize tracing subscriber with CLI-configured log level
    fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(
                    config
                        .args
                        .log_level
                        .parse()
                        .unwrap_or_else(|_| LevelFilter::INFO.into()),
                )
                .from_env_lossy(),
        )
        .init();

    let ip_addr: IpAddr = config.args.bind.parse().map_err(|_| AppError::InvalidBindAddress {
        address: config.args.bind.clone(),
    })?;
    let addr = SocketAddr::new(ip_addr, config.args.port);

    info!(
        path = %config.error_files_path.display(),
        default_format = %config.default_format.media_type,
        default_extension = %config.default_format.extension,
        debug = config.debug,
        "Serving error pages"
    );

    let state = Arc::new(AppState {
        config,
        metrics: Metrics::new()?,
    });

    let listener = TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    loop {
        let (stream, _) = listener.accept().await?;
        let io = TokioIo::new(stream);
        let state = state.clone();

        tokio::task::spawn(async move {
            if let Err(err) = auto::Builder::new(TokioExecutor::new())
                .serve_connection(
                    io,
                    service_fn(move |req| {
                        let span = tracing::span!(
                            Level::INFO,
                            "request",
                            method = %req.method(),
                            uri = %req.uri(),
                            version = ?req.version(),
                        );
                        let state = state.clone();

                        async move {
                            match handle_request(state, req).await {
                                Ok(response) => Ok(response),
                                Err(e) => {
                                    error!(error=%e, "Request failed");
                                    crate::responses::error_response(e)
                                }
                            }
                        }
                        .instrument(span)
                    }),
                )
                .await
            {
                error!(error=%err, "Connection failed");
            }
        });
    }
}
