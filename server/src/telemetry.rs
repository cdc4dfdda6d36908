//! Logging and tracing setup, plus per-request store query counting.

use crate::AppState;
use axum::{
    body::Body,
    extract::State,
    http::{HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use opentelemetry::trace::TracerProvider;
use opentelemetry_appender_tracing::layer::OpenTelemetryTracingBridge;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::logs::SdkLoggerProvider;
use opentelemetry_sdk::trace::SdkTracerProvider;
use std::env;
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc,
};
use std::time::Duration;
use tracing::{span::Id, Subscriber};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{layer::Context, registry::LookupSpan, Layer};

pub const DB_QUERY_COUNT_HEADER: &str = "X-DB-Query-Count";

tokio::task_local! {
    /// Task-local counter for store queries in the current request.
    /// This follows the async task across await points and thread migrations.
    static DB_QUERY_COUNTER: Arc<AtomicU32>;
}

/// Get the current store query count for this request, if available.
pub fn get_query_count() -> Option<u32> {
    DB_QUERY_COUNTER
        .try_with(|counter| counter.load(Ordering::Relaxed))
        .ok()
}

/// A tracing Layer that counts db.query spans per HTTP request.
///
/// The store opens its `db.query` span on the request task before handing
/// the work to the blocking pool, so the task-local counter is in scope.
pub struct DbQueryCountingLayer;

impl<S> Layer<S> for DbQueryCountingLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, _attrs: &tracing::span::Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };

        if span.name() == "db.query" {
            let _ = DB_QUERY_COUNTER.try_with(|counter| {
                counter.fetch_add(1, Ordering::Relaxed);
            });
        }
    }
}

/// Middleware that initializes the per-request query counter.
///
/// Must be the outermost layer so the counter covers the whole request.
pub async fn query_counting_middleware(request: Request<Body>, next: Next) -> Response {
    let counter = Arc::new(AtomicU32::new(0));
    DB_QUERY_COUNTER.scope(counter, next.run(request)).await
}

/// Middleware that adds the X-DB-Query-Count header to responses when
/// enabled in configuration.
pub async fn db_query_count_header_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;

    if state.track_db_query_count {
        if let Some(count) = get_query_count() {
            if let Ok(value) = HeaderValue::from_str(&count.to_string()) {
                response.headers_mut().insert(DB_QUERY_COUNT_HEADER, value);
            }
        }
    }

    response
}

/// Exporters to flush on shutdown. Empty when only console logging is on.
#[derive(Default)]
pub struct TelemetryGuard {
    tracer_provider: Option<SdkTracerProvider>,
    logger_provider: Option<SdkLoggerProvider>,
}

impl TelemetryGuard {
    pub fn shutdown(self) {
        if let Some(provider) = self.tracer_provider {
            if let Err(e) = provider.shutdown() {
                eprintln!("failed to flush traces: {e}");
            }
        }
        if let Some(provider) = self.logger_provider {
            if let Err(e) = provider.shutdown() {
                eprintln!("failed to flush logs: {e}");
            }
        }
    }
}

fn collector_reachable(endpoint: &str) -> bool {
    let host_port = endpoint
        .trim_start_matches("http://")
        .trim_start_matches("https://")
        .trim_end_matches('/');

    // Quick TCP check to see if the collector is up (resolve hostname first)
    host_port
        .to_socket_addrs()
        .ok()
        .and_then(|mut addrs| addrs.next())
        .map(|addr| TcpStream::connect_timeout(&addr, Duration::from_millis(100)).is_ok())
        .unwrap_or(false)
}

fn otel_providers(
    endpoint: &str,
    service_name: &str,
) -> Result<(SdkTracerProvider, SdkLoggerProvider), String> {
    let resource = opentelemetry_sdk::Resource::builder()
        .with_service_name(service_name.to_string())
        .build();

    let trace_exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()
        .map_err(|e| format!("failed to create OTLP trace exporter: {e}"))?;

    let tracer_provider = SdkTracerProvider::builder()
        .with_batch_exporter(trace_exporter)
        .with_resource(resource.clone())
        .build();

    let log_exporter = opentelemetry_otlp::LogExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()
        .map_err(|e| format!("failed to create OTLP log exporter: {e}"))?;

    let logger_provider = SdkLoggerProvider::builder()
        .with_batch_exporter(log_exporter)
        .with_resource(resource)
        .build();

    Ok((tracer_provider, logger_provider))
}

/// Initialize telemetry with optional OpenTelemetry export.
/// If OTEL_EXPORTER_OTLP_ENDPOINT is set and reachable, traces and logs are
/// sent to the collector. Otherwise, only console logging is used.
pub fn init_telemetry() -> TelemetryGuard {
    let fmt_layer = tracing_subscriber::fmt::layer();
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let Some(endpoint) = env::var("OTEL_EXPORTER_OTLP_ENDPOINT").ok() else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .with(DbQueryCountingLayer)
            .init();
        tracing::debug!("OTEL_EXPORTER_OTLP_ENDPOINT not set, using console logging only");
        return TelemetryGuard::default();
    };

    let service_name =
        env::var("OTEL_SERVICE_NAME").unwrap_or_else(|_| "larder-server".to_string());

    let providers = if collector_reachable(&endpoint) {
        otel_providers(&endpoint, &service_name)
    } else {
        Err(format!("OpenTelemetry endpoint {} not reachable", endpoint))
    };

    match providers {
        Ok((tracer_provider, logger_provider)) => {
            let tracer = tracer_provider.tracer("larder-server");
            opentelemetry::global::set_tracer_provider(tracer_provider.clone());

            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .with(DbQueryCountingLayer)
                .with(tracing_opentelemetry::layer().with_tracer(tracer))
                .with(OpenTelemetryTracingBridge::new(&logger_provider))
                .init();

            tracing::info!(
                "OpenTelemetry enabled, exporting traces and logs to {} as {}",
                endpoint,
                service_name
            );

            TelemetryGuard {
                tracer_provider: Some(tracer_provider),
                logger_provider: Some(logger_provider),
            }
        }
        Err(reason) => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .with(DbQueryCountingLayer)
                .init();

            tracing::info!("{}, using console logging only", reason);
            TelemetryGuard::default()
        }
    }
}
