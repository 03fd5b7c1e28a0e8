//! Stored browsing events.
//!
//! An `Event` is one finalized page visit as uploaded by the extension,
//! plus the analysis written back once it has been scored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::{ContentIdea, ThemeAnalysis};
use crate::models::{BrowsingSession, Topic};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EventSource {
    Chrome,
}

impl EventSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventSource::Chrome => "chrome",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventAnalysis {
    pub interest_score: u8,
    pub topic: Topic,
    pub themes: ThemeAnalysis,
    pub ideas: Vec<ContentIdea>,
    pub analyzed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub user_id: String,
    pub url: String,
    pub title: Option<String>,
    pub domain: String,
    pub engaged_ms: u64,
    pub scroll_depth: Option<f64>,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub source: EventSource,
    pub analysis: Option<EventAnalysis>,
    pub created_at: DateTime<Utc>,
}

impl Event {
    pub fn is_analyzed(&self) -> bool {
        self.analysis.is_some()
    }

    pub fn to_browsing_session(&self) -> BrowsingSession {
        BrowsingSession {
            domain: self.domain.clone(),
            title: self.title.clone(),
            url: self.url.clone(),
            engaged_ms: self.engaged_ms,
            scroll_depth: self.scroll_depth,
            started_at: self.started_at,
        }
    }

    pub fn session_seconds(&self) -> u64 {
        (self.engaged_ms as f64 / 1000.0).round() as u64
    }

    pub fn scroll_percent(&self) -> Option<u8> {
        self.scroll_depth
            .map(|depth| (depth.clamp(0.0, 1.0) * 100.0).round() as u8)
    }
}

/// Event plus the display figures the listing shows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventView {
    #[serde(flatten)]
    pub event: Event,
    /// Engaged minutes rounded to one decimal.
    pub minutes: f64,
    pub scroll_percent: Option<u8>,
}

impl From<Event> for EventView {
    fn from(event: Event) -> Self {
        let minutes = (event.engaged_ms as f64 / 60_000.0 * 10.0).round() / 10.0;
        let scroll_percent = event.scroll_percent();
        Self {
            event,
            minutes,
            scroll_percent,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPage {
    pub events: Vec<EventView>,
    pub total: u64,
    pub has_more: bool,
}
