//! For setting up logging.

use super::config::LoggingConfig;
use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{trace::Tracer, Resource};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_error::ErrorLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Flushes logs upon being dropped.
#[derive(Debug)]
pub struct LogGuard {
    _guards: Vec<WorkerGuard>,
    otlp: bool,
}

impl Drop for LogGuard {
    fn drop(&mut self) {
        if self.otlp {
            opentelemetry::global::shutdown_tracer_provider();
        }
    }
}

/// Initializes logging.
pub fn init_logging(config: &LoggingConfig) -> color_eyre::Result<LogGuard> {
    let log_level = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "info,tower_http=debug,answer_king=debug".into());
    let mut guards = Vec::new();

    let (non_blocking_stdout, stdout_guard) = tracing_appender::non_blocking(std::io::stdout());
    guards.push(stdout_guard);
    let stdout = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_stdout)
        .with_filter(EnvFilter::new(&log_level));

    let file = config.directory.as_ref().map(|directory| {
        let file_appender = tracing_appender::rolling::hourly(directory, "log.");
        let (non_blocking_file_appender, file_guard) =
            tracing_appender::non_blocking(file_appender);
        guards.push(file_guard);
        tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(non_blocking_file_appender)
            .json()
            .with_filter(EnvFilter::new(&log_level))
    });

    let opentelemetry = match &config.otlp_endpoint {
        Some(endpoint) => {
            let tracer = otlp_tracer(endpoint)?;
            Some(
                tracing_opentelemetry::layer()
                    .with_tracer(tracer)
                    .with_filter(EnvFilter::new(&log_level)),
            )
        }
        None => None,
    };
    let otlp = opentelemetry.is_some();

    tracing_subscriber::registry()
        .with(stdout)
        .with(file)
        .with(opentelemetry)
        .with(ErrorLayer::default())
        .try_init()?;

    Ok(LogGuard {
        _guards: guards,
        otlp,
    })
}

/// Builds a tracer exporting spans to an OTLP collector over gRPC.
fn otlp_tracer(endpoint: &str) -> color_eyre::Result<Tracer> {
    let app_name = env!("CARGO_PKG_NAME");
    let tracer = opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(
            opentelemetry_otlp::new_exporter()
                .tonic()
                .with_endpoint(endpoint),
        )
        .with_trace_config(
            opentelemetry_sdk::trace::config()
                .with_resource(Resource::new(vec![KeyValue::new("service.name", app_name)])),
        )
        .install_batch(opentelemetry_sdk::runtime::Tokio)?;
    Ok(tracer)
}
