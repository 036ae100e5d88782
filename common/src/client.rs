// Booking platform availability client

use crate::config::BookingConfig;
use crate::errors::FetchError;
use crate::models::{AvailabilityResponse, DayQuery};
use reqwest::header::COOKIE;
use reqwest::Client;
use std::time::Duration;

const AVAILABILITY_PATH: &str = "/api/get_available_slots";

/// How much of an error body is kept for logs
const BODY_SNIPPET_LIMIT: usize = 512;

/// Client for the booking platform's availability endpoint.
///
/// Authentication is a long-lived session cookie; the platform also expects
/// the cookie-consent marker alongside it.
#[derive(Debug, Clone)]
pub struct BookingClient {
    client: Client,
    base_url: String,
    service_id: String,
    location_id: String,
    client_session: String,
}

impl BookingClient {
    pub fn new(config: &BookingConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| FetchError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            service_id: config.service_id.clone(),
            location_id: config.location_id.clone(),
            client_session: config.client_session.clone(),
        })
    }

    /// Fetch availability for a single day.
    ///
    /// A reply with `success != 1` is not an error: the platform reports
    /// "no openings" that way and the decoded response simply carries no
    /// usable slots.
    #[tracing::instrument(skip(self), fields(date = %day.date))]
    pub async fn fetch_day(&self, day: &DayQuery) -> Result<AvailabilityResponse, FetchError> {
        let url = format!("{}{}", self.base_url, AVAILABILITY_PATH);
        let timestamp = day.timestamp.to_string();

        tracing::debug!(url = %url, timestamp = %timestamp, "Requesting availability");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("service_id", self.service_id.as_str()),
                ("location_id", self.location_id.as_str()),
                ("date", timestamp.as_str()),
                ("day_only", "1"),
            ])
            .header(
                COOKIE,
                format!("cookie_message=0; client_session={}", self.client_session),
            )
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: snippet(&body),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        serde_json::from_str(&body).map_err(|e| FetchError::Decode(e.to_string()))
    }
}

fn snippet(body: &str) -> String {
    if body.len() <= BODY_SNIPPET_LIMIT {
        return body.to_string();
    }
    let mut end = BODY_SNIPPET_LIMIT;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
