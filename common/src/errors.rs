// Error types, one enum per concern

use thiserror::Error;

/// Day selection and time window errors
#[derive(Error, Debug)]
pub enum WindowError {
    #[error("Invalid date '{value}': expected YYYY-MM-DD")]
    InvalidDate { value: String },

    #[error("Invalid time '{value}': expected HH:MM")]
    InvalidTime { value: String },

    #[error("Invalid time window: start {start} is after end {end}")]
    InvertedWindow { start: String, end: String },

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),
}

/// Availability fetch errors
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    #[error("Availability request failed: {0}")]
    Transport(String),

    #[error("Availability request returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode availability response: {0}")]
    Decode(String),
}

impl FetchError {
    /// Transport failures and server errors are worth retrying; a 4xx means
    /// the session cookie or the configured ids are wrong and a retry cannot
    /// change the outcome.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Transport(_) => true,
            FetchError::Status { status, .. } => *status >= 500,
            FetchError::ClientBuild(_) | FetchError::Decode(_) => false,
        }
    }
}

/// Notification delivery errors
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Notifier is not configured")]
    NotConfigured,

    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    #[error("Notification delivery failed: {0}")]
    Transport(String),

    #[error("Notification rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Scan orchestration errors
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Notification delivery failed: {0}")]
    Notify(#[from] NotifyError),
}
