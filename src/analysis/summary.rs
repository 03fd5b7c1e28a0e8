use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::db::Event;
use crate::models::Topic;

/// Aggregate over every analyzed event that landed in one topic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TopicSummary {
    pub topic: Topic,
    pub event_count: u64,
    pub engaged_ms: u64,
    pub average_score: f64,
    /// Share of total engaged time, 0-100.
    pub percentage: f64,
}

#[derive(Default)]
struct Accumulator {
    event_count: u64,
    engaged_ms: u64,
    score_sum: u64,
}

/// Group analyzed events by topic. Unanalyzed events are skipped.
pub fn topic_summary(events: &[Event]) -> Vec<TopicSummary> {
    let mut by_topic: HashMap<Topic, Accumulator> = HashMap::new();
    for event in events {
        let Some(analysis) = &event.analysis else {
            continue;
        };
        let entry = by_topic.entry(analysis.topic).or_default();
        entry.event_count += 1;
        entry.engaged_ms = entry.engaged_ms.saturating_add(event.engaged_ms);
        entry.score_sum += u64::from(analysis.interest_score);
    }

    let total_ms: u64 = by_topic.values().map(|acc| acc.engaged_ms).sum();

    let mut summaries: Vec<TopicSummary> = by_topic
        .into_iter()
        .map(|(topic, acc)| TopicSummary {
            topic,
            event_count: acc.event_count,
            engaged_ms: acc.engaged_ms,
            average_score: round_one(acc.score_sum as f64 / acc.event_count as f64),
            percentage: if total_ms == 0 {
                0.0
            } else {
                round_one(acc.engaged_ms as f64 / total_ms as f64 * 100.0)
            },
        })
        .collect();

    summaries.sort_by(|a, b| {
        b.engaged_ms
            .cmp(&a.engaged_ms)
            .then_with(|| a.topic.label().cmp(b.topic.label()))
    });
    summaries
}

fn round_one(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{EventAnalysis, EventSource};
    use crate::engine::ThemeAnalysis;
    use chrono::{TimeZone, Utc};

    fn event(id: &str, engaged_ms: u64, analysis: Option<(Topic, u8)>) -> Event {
        let at = Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap();
        Event {
            id: id.into(),
            user_id: "local".into(),
            url: format!("https://example.com/{id}"),
            title: None,
            domain: "example.com".into(),
            engaged_ms,
            scroll_depth: None,
            started_at: at,
            ended_at: at,
            source: EventSource::Chrome,
            analysis: analysis.map(|(topic, interest_score)| EventAnalysis {
                interest_score,
                topic,
                themes: ThemeAnalysis::default(),
                ideas: Vec::new(),
                analyzed_at: at,
            }),
            created_at: at,
        }
    }

    #[test]
    fn groups_by_topic_and_sorts_by_engaged_time() {
        let events = vec![
            event("a", 60_000, Some((Topic::DevOps, 10))),
            event("b", 240_000, Some((Topic::AiAgents, 16))),
            event("c", 100_000, Some((Topic::DevOps, 13))),
            event("d", 500_000, None),
        ];
        let summary = topic_summary(&events);

        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].topic, Topic::AiAgents);
        assert_eq!(summary[0].percentage, 60.0);
        assert_eq!(summary[1].topic, Topic::DevOps);
        assert_eq!(summary[1].event_count, 2);
        assert_eq!(summary[1].engaged_ms, 160_000);
        assert_eq!(summary[1].average_score, 11.5);
        assert_eq!(summary[1].percentage, 40.0);
    }

    #[test]
    fn ties_break_on_label() {
        let events = vec![
            event("a", 1_000, Some((Topic::Startups, 5))),
            event("b", 1_000, Some((Topic::Blockchain, 5))),
        ];
        let summary = topic_summary(&events);
        assert_eq!(summary[0].topic, Topic::Blockchain);
        assert_eq!(summary[1].topic, Topic::Startups);
    }

    #[test]
    fn zero_engaged_time_yields_zero_percentages() {
        let summary = topic_summary(&[event("a", 0, Some((Topic::GeneralTech, 2)))]);
        assert_eq!(summary[0].percentage, 0.0);
        assert!(topic_summary(&[]).is_empty());
    }
}
