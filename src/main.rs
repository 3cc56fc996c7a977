//! Demo service wiring the full observability pipeline.
//!
//! Serves a couple of routes behind the request logging stage so the whole
//! chain can be exercised end to end: correlation ids, multi-sink routing,
//! redaction, and error capture.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Router};
use clap::Parser;
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::timeout::TimeoutLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use logpipe::config::{load_config, PipelineConfig};
use logpipe::error::{ErrorCaptureStage, ErrorReporter, HttpReporter, NoopReporter};
use logpipe::http::RequestLogLayer;
use logpipe::logger::Logger;

#[derive(Parser)]
#[command(about = "HTTP request observability pipeline demo service")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "config/logpipe.toml")]
    config: PathBuf,

    /// Force debug mode regardless of the config file.
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // The fallback channel: pipeline-internal diagnostics go to stderr.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "logpipe=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let mut config = if args.config.exists() {
        load_config(&args.config)?
    } else {
        tracing::warn!(path = %args.config.display(), "config file not found, using defaults");
        PipelineConfig::default()
    };
    if args.debug {
        config.debug = true;
    }

    tracing::info!(
        log_directory = %config.log_directory,
        sinks = config.sinks.len(),
        debug = config.debug,
        "Configuration loaded"
    );

    let logger = Logger::from_config(&config)?;

    let reporter: Arc<dyn ErrorReporter> = if config.reporting.enabled {
        Arc::new(HttpReporter::new(&config.reporting))
    } else {
        Arc::new(NoopReporter)
    };
    let capture = ErrorCaptureStage::new(logger.clone(), Arc::clone(&reporter), config.errors.suppress_default);
    capture.install();

    logger.info("Pipeline initialized", json!({ "debug": config.debug }));

    let app = Router::new()
        .route("/", get(index))
        .route("/boom", get(boom))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(RequestLogLayer::new(logger.clone()).verbose(config.debug));

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "HTTP server starting");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Teardown: best-effort fatal capture, then drain sinks and reporter.
    capture.capture_shutdown();
    logger.flush().await;
    reporter.flush(Duration::from_secs(2));

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn index() -> &'static str {
    "ok\n"
}

/// Deliberately panicking route, for exercising the capture path.
async fn boom() -> &'static str {
    panic!("demo handler failure");
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received");
}
