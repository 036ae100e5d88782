// Scan result notification delivery
//
// Telegram is the only delivery channel; when it is unconfigured the
// rendered message is logged instead so a scan never silently discards
// its findings.

use crate::config::TelegramConfig;
use crate::errors::NotifyError;
use crate::models::ScanReport;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use reqwest::Client;
use std::time::Duration;

/// Notification delivery interface
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, report: &ScanReport) -> Result<(), NotifyError>;
}

/// Render the human-readable notification text: one block per open day,
/// slot times in the configured timezone. Days without openings are
/// omitted entirely.
pub fn render_message(report: &ScanReport, tz: Tz) -> String {
    let mut message = String::new();
    for day in report.open_days() {
        message.push_str(&format!("Slots available on {}:\n", day.day.date));
        for slot in &day.slots {
            let time = DateTime::<Utc>::from_timestamp(slot.time, 0)
                .map(|instant| instant.with_timezone(&tz).format("%H:%M").to_string())
                .unwrap_or_else(|| slot.time.to_string());
            match slot.staff_id {
                Some(staff) => message.push_str(&format!(" - {} (staff: {})\n", time, staff)),
                None => message.push_str(&format!(" - {}\n", time)),
            }
        }
    }
    message
}

/// Delivers scan results through the Telegram Bot API
pub struct TelegramNotifier {
    client: Client,
    api_base: String,
    bot_token: String,
    chat_id: String,
    tz: Tz,
}

impl TelegramNotifier {
    pub fn from_config(config: &TelegramConfig, tz: Tz) -> Result<Self, NotifyError> {
        let (Some(bot_token), Some(chat_id)) = (&config.bot_token, &config.chat_id) else {
            return Err(NotifyError::NotConfigured);
        };

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| NotifyError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            bot_token: bot_token.clone(),
            chat_id: chat_id.clone(),
            tz,
        })
    }

    /// The bot token is part of the request URL, so reqwest error strings
    /// can leak it. Everything that leaves this notifier goes through here.
    fn redact(&self, text: String) -> String {
        text.replace(&self.bot_token, "<redacted>")
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    #[tracing::instrument(skip(self, report), fields(scan_id = %report.scan_id))]
    async fn notify(&self, report: &ScanReport) -> Result<(), NotifyError> {
        let text = render_message(report, self.tz);
        let url = format!("{}/bot{}/sendMessage", self.api_base, self.bot_token);
        let params = [("chat_id", self.chat_id.as_str()), ("text", text.as_str())];

        let response = self
            .client
            .post(&url)
            .form(&params)
            .send()
            .await
            .map_err(|e| NotifyError::Transport(self.redact(e.to_string())))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body: self.redact(body),
            });
        }

        tracing::info!(
            open_days = report.open_days().count(),
            open_slots = report.total_open_slots(),
            "Notification delivered"
        );
        Ok(())
    }
}

/// Fallback notifier used when Telegram is unconfigured
pub struct LogNotifier {
    tz: Tz,
}

impl LogNotifier {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, report: &ScanReport) -> Result<(), NotifyError> {
        tracing::info!(
            scan_id = %report.scan_id,
            message = %render_message(report, self.tz),
            "Open slots found (Telegram not configured)"
        );
        Ok(())
    }
}
