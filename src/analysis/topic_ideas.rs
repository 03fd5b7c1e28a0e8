use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::{Event, IdeaBreakdown, IdeaSource, IdeaStatus, TopicIdea};
use crate::models::Topic;

pub(crate) const IDEA_WINDOW_HOURS: i64 = 48;
pub(crate) const IDEA_EVENT_LIMIT: usize = 50;
const TOP_TOPICS: usize = 5;
const SOURCES_PER_IDEA: usize = 3;
const AUTO_TAG: &str = "auto-generated";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicIdeaReport {
    pub ideas: Vec<TopicIdea>,
    pub topics_analyzed: usize,
    pub events_processed: usize,
}

fn topic_slug(topic: Topic) -> String {
    topic
        .label()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

/// One idea per topic for the five topics with the highest summed interest.
///
/// `events` should be newest first; among equal scores the newer page is
/// listed as a source first. Unanalyzed events are ignored.
pub fn rank_topic_ideas(user_id: &str, events: &[Event], now: DateTime<Utc>) -> Vec<TopicIdea> {
    let mut by_topic: HashMap<Topic, Vec<(&Event, u8)>> = HashMap::new();
    for event in events {
        if let Some(analysis) = &event.analysis {
            by_topic
                .entry(analysis.topic)
                .or_default()
                .push((event, analysis.interest_score));
        }
    }

    let mut ranked: Vec<(Topic, u64, Vec<(&Event, u8)>)> = by_topic
        .into_iter()
        .map(|(topic, scored)| {
            let total = scored.iter().map(|(_, score)| u64::from(*score)).sum();
            (topic, total, scored)
        })
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.label().cmp(b.0.label())));
    ranked.truncate(TOP_TOPICS);

    ranked
        .into_iter()
        .map(|(topic, total, mut scored)| {
            let event_count = scored.len() as u64;
            let interest = total as f64 / event_count as f64;
            scored.sort_by(|a, b| b.1.cmp(&a.1));
            scored.truncate(SOURCES_PER_IDEA);

            TopicIdea {
                id: Uuid::new_v4().to_string(),
                user_id: user_id.to_string(),
                topic,
                source_urls: scored.iter().map(|(event, _)| event.url.clone()).collect(),
                source_event_ids: scored.iter().map(|(event, _)| event.id.clone()).collect(),
                score: interest / 100.0,
                breakdown: IdeaBreakdown {
                    interest,
                    event_count,
                    top_sources: scored
                        .iter()
                        .map(|(event, score)| IdeaSource {
                            url: event.url.clone(),
                            title: event.title.clone(),
                            score: *score,
                        })
                        .collect(),
                },
                tags: vec![topic_slug(topic), AUTO_TAG.to_string()],
                status: IdeaStatus::Pending,
                created_at: now,
            }
        })
        .collect()
}
