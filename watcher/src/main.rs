// Watcher binary entry point
//
// Default mode runs exactly one scan and exits, which is what an external
// scheduler invokes on a timer. `--watch` keeps the process alive and
// repeats the scan at a fixed interval until interrupted.

use anyhow::Result;
use common::client::BookingClient;
use common::config::Settings;
use common::models::DayStatus;
use common::notify::{LogNotifier, Notifier, TelegramNotifier};
use common::retry::ExponentialBackoff;
use common::scanner::Scanner;
use common::telemetry;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let settings = Settings::load().map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;

    // Initialize tracing
    telemetry::init_logging(&settings.observability.log_level)?;

    info!("Starting slot availability watcher");

    settings
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

    info!(
        service_id = %settings.booking.service_id,
        location_id = %settings.booking.location_id,
        "Configuration loaded"
    );

    if !settings.watcher.enabled {
        info!("Watcher is disabled, exiting");
        return Ok(());
    }

    // validate() already proved these parse; propagate anyway
    let tz = settings
        .window
        .tz()
        .map_err(|e| anyhow::anyhow!("Timezone error: {}", e))?;
    let selection = settings
        .window
        .selection()
        .map_err(|e| anyhow::anyhow!("Day selection error: {}", e))?;
    let time_window = settings
        .window
        .time_window()
        .map_err(|e| anyhow::anyhow!("Time window error: {}", e))?;

    let client = BookingClient::new(&settings.booking)
        .map_err(|e| anyhow::anyhow!("HTTP client error: {}", e))?;

    let notifier: Arc<dyn Notifier> = if settings.telegram.is_configured() {
        let telegram = TelegramNotifier::from_config(&settings.telegram, tz)
            .map_err(|e| anyhow::anyhow!("Telegram notifier error: {}", e))?;
        info!("Telegram notifier initialized");
        Arc::new(telegram)
    } else {
        warn!("Telegram is not configured, findings will be logged only");
        Arc::new(LogNotifier::new(tz))
    };

    let strategy = Arc::new(ExponentialBackoff::with_config(
        settings.watcher.retry_base_delay_seconds,
        settings.watcher.retry_max_delay_seconds,
        0.1,
        settings.watcher.max_retries,
    ));

    let scanner = Scanner::new(client, notifier, strategy, selection, time_window, tz);

    let watch_mode = std::env::args()
        .nth(1)
        .map(|arg| arg == "--watch" || arg == "watch")
        .unwrap_or(false);

    if watch_mode {
        run_watch_loop(scanner, &settings).await
    } else {
        run_once(&scanner).await
    }
}

/// Single scan, exit code reflects the scan outcome
async fn run_once(scanner: &Scanner) -> Result<()> {
    let report = scanner
        .run_scan()
        .await
        .map_err(|e| anyhow::anyhow!("Scan failed: {}", e))?;

    let failed_days = report
        .days
        .iter()
        .filter(|d| matches!(d.status, DayStatus::Failed { .. }))
        .count();
    info!(
        scan_id = %report.scan_id,
        open_days = report.open_days().count(),
        open_slots = report.total_open_slots(),
        failed_days = failed_days,
        "Scan completed"
    );
    Ok(())
}

/// Repeat the scan at a fixed interval until interrupted. A failing
/// iteration is logged and the loop continues; ctrl-c lets the in-flight
/// scan finish before the process exits.
async fn run_watch_loop(scanner: Scanner, settings: &Settings) -> Result<()> {
    if let Some(port) = settings.observability.metrics_port {
        telemetry::init_metrics(port)?;
    }

    let poll_interval = Duration::from_secs(settings.watcher.poll_interval_seconds);
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

    let loop_handle = tokio::spawn(async move {
        let mut interval = tokio::time::interval(poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match scanner.run_scan().await {
                        Ok(report) => info!(
                            scan_id = %report.scan_id,
                            open_days = report.open_days().count(),
                            open_slots = report.total_open_slots(),
                            "Scan completed"
                        ),
                        Err(e) => error!(error = %e, "Scan failed"),
                    }
                }
                _ = shutdown_rx.changed() => break,
            }
        }
    });

    info!(
        poll_interval_seconds = settings.watcher.poll_interval_seconds,
        "Watcher is running. Press Ctrl+C to shutdown gracefully"
    );

    match signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received, finishing in-flight scan"),
        Err(e) => error!(error = %e, "Failed to listen for shutdown signal"),
    }

    let _ = shutdown_tx.send(true);
    let _ = loop_handle.await;

    info!("Watcher shutdown complete");
    Ok(())
}
