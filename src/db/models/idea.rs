//! Topic-level content ideas and their review lifecycle.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Topic;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum IdeaStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
    Posted,
}

impl IdeaStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdeaStatus::Pending => "pending",
            IdeaStatus::Accepted => "accepted",
            IdeaStatus::Rejected => "rejected",
            IdeaStatus::Posted => "posted",
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "pending" => Ok(IdeaStatus::Pending),
            "accepted" => Ok(IdeaStatus::Accepted),
            "rejected" => Ok(IdeaStatus::Rejected),
            "posted" => Ok(IdeaStatus::Posted),
            other => Err(anyhow!("unknown idea status {other}")),
        }
    }
}

/// One of the highest-scoring pages behind an idea.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IdeaSource {
    pub url: String,
    pub title: Option<String>,
    pub score: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IdeaBreakdown {
    /// Mean interest score of the topic's events, 0-100.
    pub interest: f64,
    pub event_count: u64,
    pub top_sources: Vec<IdeaSource>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TopicIdea {
    pub id: String,
    pub user_id: String,
    pub topic: Topic,
    pub source_urls: Vec<String>,
    pub source_event_ids: Vec<String>,
    /// `breakdown.interest` normalized to 0-1.
    pub score: f64,
    pub breakdown: IdeaBreakdown,
    pub tags: Vec<String>,
    pub status: IdeaStatus,
    pub created_at: DateTime<Utc>,
}
