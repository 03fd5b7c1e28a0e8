//! Drives the engine over stored events and writes the results back.

mod assistant;
mod summary;
mod topic_ideas;

use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::db::{Database, Event, EventAnalysis};
use crate::engine::{
    basic_ideas, basic_theme_analysis, classify_topic, compute_interest_score_with,
    IdeaContext, PageMetadata, PageRef, ScoringConfig,
};
use crate::settings::Preferences;

pub use assistant::{ContentAssistant, KeywordAssistant};
pub use summary::{topic_summary, TopicSummary};
pub use topic_ideas::{rank_topic_ideas, TopicIdeaReport};

const ENABLE_LOGS: bool = true;
const RECENT_TOPIC_LIMIT: usize = 5;

use crate::{log_error, log_info, log_warn};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeReport {
    pub analyzed: usize,
    pub failed: usize,
}

pub struct Analyzer {
    db: Database,
    assistant: Arc<dyn ContentAssistant>,
    config: ScoringConfig,
    preferences: Preferences,
}

impl Analyzer {
    pub fn new(db: Database, assistant: Arc<dyn ContentAssistant>) -> Self {
        Self {
            db,
            assistant,
            config: ScoringConfig::default(),
            preferences: Preferences::default(),
        }
    }

    pub fn with_config(mut self, config: ScoringConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_preferences(mut self, preferences: Preferences) -> Self {
        self.preferences = preferences;
        self
    }

    /// Score, classify and enrich one stored event.
    ///
    /// Already-analyzed events come back untouched unless `force` is set.
    pub async fn analyze_event(
        &self,
        event_id: &str,
        now: DateTime<Utc>,
        force: bool,
    ) -> Result<Event> {
        let mut event = self
            .db
            .get_event(event_id)
            .await?
            .ok_or_else(|| anyhow!("event {event_id} not found"))?;

        if event.is_analyzed() && !force {
            return Ok(event);
        }

        let history = self
            .db
            .historical_context(&event.user_id, &event.domain, now)
            .await?;
        let session = event.to_browsing_session();
        let interest_score = compute_interest_score_with(&session, &history, now, &self.config);
        let topic = classify_topic(&event.url, event.title.as_deref(), &event.domain);

        let metadata = PageMetadata::default();
        let page = PageRef {
            url: &event.url,
            title: event.title.as_deref(),
            domain: &event.domain,
        };
        let themes = match self.assistant.analyze_themes(&metadata, page).await {
            Ok(themes) => themes.truncated(),
            Err(err) => {
                log_warn!("Theme analysis failed for {event_id}, using keyword rules: {err:#}");
                basic_theme_analysis(&metadata, page)
            }
        };

        let context = IdeaContext {
            url: event.url.clone(),
            title: event.title.clone(),
            domain: event.domain.clone(),
            interest_score,
            session_seconds: event.session_seconds(),
            scroll_percent: event.scroll_percent().unwrap_or(0),
            themes: themes.clone(),
            recent_topics: self
                .db
                .recent_topics(&event.user_id, RECENT_TOPIC_LIMIT)
                .await?
                .into_iter()
                .map(|topic| topic.label().to_string())
                .collect(),
            user_expertise: self.preferences.extracted_expertise.clone(),
            weekly_interests: self
                .preferences
                .weekly_themes
                .iter()
                .chain(&self.preferences.general_interests)
                .cloned()
                .collect(),
        };
        let ideas = match self.assistant.generate_ideas(&context).await {
            Ok(ideas) => ideas,
            Err(err) => {
                log_warn!("Idea generation failed for {event_id}, using templates: {err:#}");
                basic_ideas(&context)
            }
        };

        let analysis = EventAnalysis {
            interest_score,
            topic,
            themes,
            ideas,
            analyzed_at: now,
        };
        self.db.save_analysis(event_id, &analysis).await?;
        log_info!(
            "Analyzed {event_id} ({}): score={interest_score} topic={topic}",
            event.domain
        );

        event.analysis = Some(analysis);
        Ok(event)
    }

    /// Analyze up to `limit` unanalyzed events, oldest first.
    pub async fn analyze_pending(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<AnalyzeReport> {
        let pending = self.db.list_unanalyzed_events(user_id, limit).await?;
        let mut report = AnalyzeReport::default();

        for event in pending {
            match self.analyze_event(&event.id, now, false).await {
                Ok(_) => report.analyzed += 1,
                Err(err) => {
                    log_error!("Failed to analyze {}: {err:#}", event.id);
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }

    /// Rank the last 48 hours by topic and store one idea per top topic.
    ///
    /// Events in the window that were never analyzed are analyzed first.
    pub async fn generate_topic_ideas(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<TopicIdeaReport> {
        let since = now - Duration::hours(topic_ideas::IDEA_WINDOW_HOURS);
        let recent = self
            .db
            .list_events_since(user_id, since, topic_ideas::IDEA_EVENT_LIMIT)
            .await?;

        let mut events = Vec::with_capacity(recent.len());
        for event in recent {
            if event.is_analyzed() {
                events.push(event);
                continue;
            }
            match self.analyze_event(&event.id, now, false).await {
                Ok(analyzed) => events.push(analyzed),
                Err(err) => log_error!("Skipping {} for ideas: {err:#}", event.id),
            }
        }

        let ideas = rank_topic_ideas(user_id, &events, now);
        self.db.insert_topic_ideas(&ideas).await?;
        log_info!(
            "Generated {} topic ideas from {} events for {user_id}",
            ideas.len(),
            events.len()
        );

        Ok(TopicIdeaReport {
            topics_analyzed: ideas.len(),
            events_processed: events.len(),
            ideas,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::EventSource;
    use crate::engine::{ContentIdea, IdeaFormat, ThemeAnalysis};
    use crate::models::Topic;
    use anyhow::bail;
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone};

    struct FailingAssistant;

    #[async_trait]
    impl ContentAssistant for FailingAssistant {
        async fn analyze_themes(
            &self,
            _metadata: &PageMetadata,
            _page: PageRef<'_>,
        ) -> Result<ThemeAnalysis> {
            bail!("upstream unavailable")
        }

        async fn generate_ideas(&self, _context: &IdeaContext) -> Result<Vec<ContentIdea>> {
            bail!("upstream unavailable")
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 12, 0, 0).unwrap()
    }

    fn event(id: &str, domain: &str, title: &str, engaged_ms: u64, age: Duration) -> Event {
        let started_at = now() - age;
        Event {
            id: id.into(),
            user_id: "local".into(),
            url: format!("https://{domain}/{id}"),
            title: Some(title.into()),
            domain: domain.into(),
            engaged_ms,
            scroll_depth: Some(0.8),
            started_at,
            ended_at: started_at + Duration::milliseconds(engaged_ms as i64),
            source: EventSource::Chrome,
            analysis: None,
            created_at: now(),
        }
    }

    async fn seeded_db(dir: &tempfile::TempDir) -> Database {
        let db = Database::new(dir.path().join("analysis.sqlite3")).unwrap();
        let mut events = vec![event(
            "target",
            "blog.example.com",
            "Intro to transformers",
            240_000,
            Duration::minutes(10),
        )];
        // Four earlier visits to the same domain and three other domains.
        for i in 0..4 {
            events.push(event(
                &format!("repeat-{i}"),
                "blog.example.com",
                "Notes",
                30_000,
                Duration::hours(30 + i),
            ));
        }
        for (i, domain) in ["a.dev", "b.dev", "c.dev"].iter().enumerate() {
            events.push(event(&format!("other-{i}"), domain, "Misc", 30_000, Duration::hours(2)));
        }
        db.insert_events(&events).await.unwrap();
        db
    }

    #[tokio::test]
    async fn analyze_event_scores_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let db = seeded_db(&dir).await;
        let analyzer = Analyzer::new(db.clone(), Arc::new(KeywordAssistant));

        let analyzed = analyzer.analyze_event("target", now(), false).await.unwrap();
        let analysis = analyzed.analysis.expect("analysis attached");
        // 5 visits in 7 days (15), 4 domains in 48h (5), four minutes at 80% scroll.
        assert_eq!(analysis.interest_score, 16);
        assert_eq!(analysis.topic, Topic::MachineLearning);
        assert_eq!(analysis.ideas.last().unwrap().format, IdeaFormat::Tweet);

        let stored = db.get_event("target").await.unwrap().unwrap();
        assert_eq!(stored.analysis.unwrap().interest_score, 16);
    }

    #[tokio::test]
    async fn analyzed_events_are_left_alone_unless_forced() {
        let dir = tempfile::tempdir().unwrap();
        let db = seeded_db(&dir).await;
        let analyzer = Analyzer::new(db.clone(), Arc::new(KeywordAssistant));

        let first = analyzer.analyze_event("target", now(), false).await.unwrap();
        let later = now() + Duration::days(30);
        let cached = analyzer.analyze_event("target", later, false).await.unwrap();
        assert_eq!(cached.analysis, first.analysis);

        let forced = analyzer.analyze_event("target", later, true).await.unwrap();
        let forced = forced.analysis.unwrap();
        assert_eq!(forced.analyzed_at, later);
        assert!(forced.interest_score < first.analysis.unwrap().interest_score);
    }

    #[tokio::test]
    async fn assistant_failures_fall_back_to_keyword_rules() {
        let dir = tempfile::tempdir().unwrap();
        let db = seeded_db(&dir).await;
        let analyzer = Analyzer::new(db, Arc::new(FailingAssistant));

        let analyzed = analyzer.analyze_event("target", now(), false).await.unwrap();
        let analysis = analyzed.analysis.unwrap();
        assert_eq!(analysis.themes.themes, vec!["Technology", "General"]);
        assert!(!analysis.ideas.is_empty());
    }

    #[tokio::test]
    async fn missing_event_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(dir.path().join("empty.sqlite3")).unwrap();
        let analyzer = Analyzer::new(db, Arc::new(KeywordAssistant));
        assert!(analyzer.analyze_event("nope", now(), false).await.is_err());
    }

    #[tokio::test]
    async fn analyze_pending_respects_limit_and_summarizes() {
        let dir = tempfile::tempdir().unwrap();
        let db = seeded_db(&dir).await;
        let analyzer = Analyzer::new(db.clone(), Arc::new(KeywordAssistant));

        let report = analyzer.analyze_pending("local", now(), 3).await.unwrap();
        assert_eq!(report, AnalyzeReport { analyzed: 3, failed: 0 });

        let report = analyzer.analyze_pending("local", now(), 100).await.unwrap();
        assert_eq!(report, AnalyzeReport { analyzed: 5, failed: 0 });

        let analyzed = db.list_analyzed_events("local").await.unwrap();
        assert_eq!(analyzed.len(), 8);
        let summary = topic_summary(&analyzed);
        let total_events: u64 = summary.iter().map(|s| s.event_count).sum();
        assert_eq!(total_events, 8);
    }

    #[tokio::test]
    async fn custom_weights_change_the_stored_score_and_unlock_deep_dives() {
        let dir = tempfile::tempdir().unwrap();
        let db = seeded_db(&dir).await;
        let analyzer = Analyzer::new(db.clone(), Arc::new(KeywordAssistant)).with_config(
            ScoringConfig {
                weight_time: 2.0,
                weight_scroll: 1.0,
                weight_repeat: 1.0,
                weight_recency: 1.0,
                weight_diversity: 1.0,
            },
        );

        let analyzed = analyzer.analyze_event("target", now(), false).await.unwrap();
        let analysis = analyzed.analysis.unwrap();
        // 2 * 20 + 16 + 15 + 10 + 5
        assert_eq!(analysis.interest_score, 86);
        let formats: Vec<_> = analysis.ideas.iter().map(|idea| idea.format).collect();
        assert_eq!(formats, vec![IdeaFormat::Thread, IdeaFormat::Tweet]);

        let stored = db.get_event("target").await.unwrap().unwrap();
        assert_eq!(stored.analysis.unwrap().interest_score, 86);
    }

    #[tokio::test]
    async fn recent_topics_feed_the_idea_context() {
        struct RecordingAssistant(std::sync::Mutex<Vec<Vec<String>>>);

        #[async_trait]
        impl ContentAssistant for RecordingAssistant {
            async fn analyze_themes(
                &self,
                metadata: &PageMetadata,
                page: PageRef<'_>,
            ) -> Result<ThemeAnalysis> {
                Ok(basic_theme_analysis(metadata, page))
            }

            async fn generate_ideas(&self, context: &IdeaContext) -> Result<Vec<ContentIdea>> {
                self.0.lock().unwrap().push(context.recent_topics.clone());
                Ok(basic_ideas(context))
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let db = seeded_db(&dir).await;
        let assistant = Arc::new(RecordingAssistant(std::sync::Mutex::new(Vec::new())));
        let analyzer = Analyzer::new(db, assistant.clone());

        analyzer.analyze_event("target", now(), false).await.unwrap();
        analyzer.analyze_event("other-0", now(), false).await.unwrap();

        let seen = assistant.0.lock().unwrap();
        assert!(seen[0].is_empty());
        assert_eq!(seen[1], vec!["Machine Learning"]);
    }

    #[tokio::test]
    async fn topic_ideas_rank_the_last_two_days() {
        let dir = tempfile::tempdir().unwrap();
        let db = seeded_db(&dir).await;
        db.insert_events(&[event(
            "stale",
            "old.example.com",
            "Kubernetes deployment",
            600_000,
            Duration::hours(60),
        )])
        .await
        .unwrap();
        let analyzer = Analyzer::new(db.clone(), Arc::new(KeywordAssistant));

        let report = analyzer.generate_topic_ideas("local", now()).await.unwrap();
        // Seeded events are all under 34h old; the stale one is outside the window.
        assert_eq!(report.events_processed, 8);
        assert!(report.topics_analyzed >= 1 && report.topics_analyzed <= 5);
        assert!(report.ideas.iter().all(|idea| idea.topic != Topic::DevOps));
        assert!(report
            .ideas
            .iter()
            .any(|idea| idea.topic == Topic::MachineLearning
                && idea.source_event_ids == vec!["target"]));

        let stored = db.list_ideas("local", 20).await.unwrap();
        assert_eq!(stored.len(), report.ideas.len());
        assert!(db.get_event("stale").await.unwrap().unwrap().analysis.is_none());
    }
}
