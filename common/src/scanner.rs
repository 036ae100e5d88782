// Scan orchestration: resolve days, fetch with retry, filter, notify

use crate::client::BookingClient;
use crate::errors::ScanError;
use crate::models::{DayQuery, DayReport, DayStatus, ScanReport, Slot};
use crate::notify::Notifier;
use crate::retry::RetryStrategy;
use crate::telemetry;
use crate::window::{DaySelection, TimeWindow};
use chrono::Utc;
use chrono_tz::Tz;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Runs one scan cycle: inspect every selected day, then deliver a single
/// aggregated notification when anything is open.
#[derive(Clone)]
pub struct Scanner {
    client: BookingClient,
    notifier: Arc<dyn Notifier>,
    strategy: Arc<dyn RetryStrategy>,
    selection: DaySelection,
    window: TimeWindow,
    tz: Tz,
}

impl Scanner {
    pub fn new(
        client: BookingClient,
        notifier: Arc<dyn Notifier>,
        strategy: Arc<dyn RetryStrategy>,
        selection: DaySelection,
        window: TimeWindow,
        tz: Tz,
    ) -> Self {
        Self {
            client,
            notifier,
            strategy,
            selection,
            window,
            tz,
        }
    }

    /// One failed day never aborts the scan; at most one notification is
    /// delivered per scan, and only when at least one day is open. The
    /// report is complete before delivery is attempted, so a notification
    /// failure never loses the scan's findings.
    #[tracing::instrument(skip(self), fields(scan_id = tracing::field::Empty))]
    pub async fn run_scan(&self) -> Result<ScanReport, ScanError> {
        let scan_id = Uuid::new_v4();
        tracing::Span::current().record("scan_id", tracing::field::display(scan_id));

        let started_at = Utc::now();
        let today = started_at.with_timezone(&self.tz).date_naive();
        let days = self.selection.resolve(today, self.tz);

        info!(days = days.len(), "Starting scan");

        let mut reports = Vec::with_capacity(days.len());
        for day in &days {
            let report = self.scan_day(day).await;
            match &report.status {
                DayStatus::Open => info!(
                    date = %report.day.date,
                    slots = report.slots.len(),
                    "Open slots found"
                ),
                DayStatus::NoAvailability => info!(
                    date = %report.day.date,
                    "No matching slots"
                ),
                DayStatus::Failed { reason } => {
                    telemetry::record_day_fetch_failure(&report.day.date.to_string());
                    warn!(date = %report.day.date, reason = reason, "Day fetch failed");
                }
            }
            reports.push(report);
        }

        let report = ScanReport {
            scan_id,
            days: reports,
            started_at,
            completed_at: Utc::now(),
        };

        let duration = (report.completed_at - report.started_at)
            .to_std()
            .unwrap_or_default();
        telemetry::record_scan_duration(duration.as_secs_f64());

        let open_slots = report.total_open_slots();
        if open_slots > 0 {
            telemetry::record_open_slots(open_slots as u64);
            if let Err(e) = self.notifier.notify(&report).await {
                telemetry::record_scan_failure(&scan_id, "notify");
                return Err(ScanError::Notify(e));
            }
        }

        telemetry::record_scan_success(&scan_id);
        Ok(report)
    }

    async fn scan_day(&self, day: &DayQuery) -> DayReport {
        let mut attempt = 0u32;
        loop {
            match self.client.fetch_day(day).await {
                Ok(response) => {
                    if !response.has_openings() {
                        return DayReport {
                            day: *day,
                            slots: Vec::new(),
                            status: DayStatus::NoAvailability,
                        };
                    }

                    let slots: Vec<Slot> = response
                        .available_slots
                        .into_iter()
                        .filter(|slot| {
                            slot.is_bookable() && self.window.contains(slot.time, self.tz)
                        })
                        .collect();

                    let status = if slots.is_empty() {
                        DayStatus::NoAvailability
                    } else {
                        DayStatus::Open
                    };
                    return DayReport {
                        day: *day,
                        slots,
                        status,
                    };
                }
                Err(err) if err.is_retryable() => match self.strategy.next_delay(attempt) {
                    Some(delay) => {
                        warn!(
                            date = %day.date,
                            attempt = attempt,
                            delay_ms = delay.as_millis() as u64,
                            error = %err,
                            "Fetch failed, retrying"
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                    }
                    None => {
                        return DayReport {
                            day: *day,
                            slots: Vec::new(),
                            status: DayStatus::Failed {
                                reason: err.to_string(),
                            },
                        };
                    }
                },
                Err(err) => {
                    return DayReport {
                        day: *day,
                        slots: Vec::new(),
                        status: DayStatus::Failed {
                            reason: err.to_string(),
                        },
                    };
                }
            }
        }
    }
}
