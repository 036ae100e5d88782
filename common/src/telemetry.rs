// Telemetry module for structured logging and metrics

use anyhow::Result;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};
use uuid::Uuid;

/// Initialize structured logging with JSON formatting.
///
/// Log levels come from `RUST_LOG` when set, otherwise from configuration.
pub fn init_logging(log_level: &str) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .map_err(|e| anyhow::anyhow!("Failed to create env filter: {}", e))?;

    let json_layer = fmt::layer()
        .json()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_filter(env_filter);

    tracing_subscriber::registry()
        .with(json_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing subscriber: {}", e))?;

    Ok(())
}

/// Initialize the Prometheus metrics exporter (watch mode only).
///
/// Registered metrics:
/// - scan_success_total / scan_failed_total: scan outcomes
/// - scan_duration_seconds: duration of each scan cycle
/// - day_fetch_failed_total: days that exhausted their retry budget
/// - open_slots_found_total: matching slots across all scans
pub fn init_metrics(metrics_port: u16) -> Result<()> {
    let addr: SocketAddr = format!("0.0.0.0:{}", metrics_port)
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid metrics port: {}", e))?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus exporter: {}", e))?;

    describe_counter!("scan_success_total", "Total number of completed scans");
    describe_counter!("scan_failed_total", "Total number of failed scans");
    describe_histogram!("scan_duration_seconds", "Duration of scan cycles in seconds");
    describe_counter!(
        "day_fetch_failed_total",
        "Days whose availability fetch exhausted its retry budget"
    );
    describe_counter!(
        "open_slots_found_total",
        "Bookable slots found inside the configured window"
    );

    tracing::info!(
        metrics_port = metrics_port,
        "Prometheus metrics exporter initialized"
    );

    Ok(())
}

#[inline]
pub fn record_scan_success(scan_id: &Uuid) {
    counter!("scan_success_total", "scan_id" => scan_id.to_string()).increment(1);
}

#[inline]
pub fn record_scan_failure(scan_id: &Uuid, reason: &str) {
    counter!(
        "scan_failed_total",
        "scan_id" => scan_id.to_string(),
        "reason" => reason.to_string()
    )
    .increment(1);
}

#[inline]
pub fn record_scan_duration(duration_seconds: f64) {
    histogram!("scan_duration_seconds").record(duration_seconds);
}

#[inline]
pub fn record_day_fetch_failure(date: &str) {
    counter!("day_fetch_failed_total", "date" => date.to_string()).increment(1);
}

#[inline]
pub fn record_open_slots(count: u64) {
    counter!("open_slots_found_total").increment(count);
}
