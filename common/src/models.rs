use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Wire types
// ============================================================================

/// A single bookable opening as reported by the booking platform.
///
/// The platform encodes availability as a 0/1 integer and may include fields
/// this watcher does not care about; unknown fields are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slot {
    /// Start of the slot as Unix seconds
    pub time: i64,
    #[serde(default)]
    pub staff_id: Option<i64>,
    #[serde(default)]
    pub is_available: i64,
}

impl Slot {
    pub fn is_bookable(&self) -> bool {
        self.is_available == 1
    }
}

/// Reply of the availability endpoint for a single day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityResponse {
    /// 1 when the day has any openings at all
    #[serde(default)]
    pub success: i64,
    #[serde(default)]
    pub available_slots: Vec<Slot>,
}

impl AvailabilityResponse {
    pub fn has_openings(&self) -> bool {
        self.success == 1
    }
}

// ============================================================================
// Scan types
// ============================================================================

/// A single day to inspect: the civil date plus the Unix timestamp of that
/// day's midnight in the configured timezone, which is what the API expects
/// in its `date` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayQuery {
    pub date: NaiveDate,
    pub timestamp: i64,
}

/// Outcome of inspecting one day
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DayStatus {
    /// At least one bookable slot inside the configured window
    Open,
    /// The day was reachable but nothing matched
    NoAvailability,
    /// The fetch failed after exhausting the retry budget
    Failed { reason: String },
}

/// Scan result for one day
#[derive(Debug, Clone)]
pub struct DayReport {
    pub day: DayQuery,
    /// Matching slots, in the order the platform returned them
    pub slots: Vec<Slot>,
    pub status: DayStatus,
}

/// Aggregate result of one scan cycle
#[derive(Debug, Clone)]
pub struct ScanReport {
    pub scan_id: Uuid,
    pub days: Vec<DayReport>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl ScanReport {
    pub fn open_days(&self) -> impl Iterator<Item = &DayReport> {
        self.days
            .iter()
            .filter(|d| matches!(d.status, DayStatus::Open))
    }

    pub fn total_open_slots(&self) -> usize {
        self.open_days().map(|d| d.slots.len()).sum()
    }

    pub fn has_failures(&self) -> bool {
        self.days
            .iter()
            .any(|d| matches!(d.status, DayStatus::Failed { .. }))
    }
}
