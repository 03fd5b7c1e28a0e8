//! Engine input records.
//!
//! Both types are read-only snapshots built by the caller for a single
//! scoring call; the engine never stores them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One tracked page visit as seen by the scoring engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BrowsingSession {
    /// Hostname with any leading `www.` removed.
    pub domain: String,
    pub title: Option<String>,
    pub url: String,
    /// Actively engaged time, already capped at the ingestion boundary.
    pub engaged_ms: u64,
    /// Maximum observed scroll fraction.
    pub scroll_depth: Option<f64>,
    pub started_at: DateTime<Utc>,
}

impl BrowsingSession {
    pub fn engaged_minutes(&self) -> f64 {
        self.engaged_ms as f64 / 60_000.0
    }
}

/// Aggregates over the owning user's history, relative to a session's domain.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalContext {
    /// Sessions on the same domain in the trailing 7 days, current one included.
    pub repeat_visit_count_7d: u64,
    /// Distinct domains visited in the trailing 48 hours.
    pub unique_domain_count_48h: u64,
}
