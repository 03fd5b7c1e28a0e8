use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Row};

use crate::db::{
    connection::Database,
    helpers::{format_datetime, parse_datetime, parse_json, parse_optional_datetime, to_i64, to_u64},
    models::{Event, EventAnalysis, EventPage, EventSource, EventView},
};
use crate::models::{HistoricalContext, Topic};

const EVENT_COLUMNS: &str = "id, user_id, url, title, domain, engaged_ms, scroll_depth, started_at, ended_at, source, created_at,
     interest_score, topic, themes_json, ideas_json, analyzed_at";

const REPEAT_VISIT_WINDOW_DAYS: i64 = 7;
const DOMAIN_DIVERSITY_WINDOW_HOURS: i64 = 48;

fn parse_source(value: &str) -> Result<EventSource> {
    match value {
        "chrome" => Ok(EventSource::Chrome),
        other => Err(anyhow!("unknown event source {other}")),
    }
}

fn row_to_analysis(row: &Row) -> Result<Option<EventAnalysis>> {
    let analyzed_at: Option<String> = row.get("analyzed_at")?;
    let Some(analyzed_at) = parse_optional_datetime(analyzed_at, "analyzed_at")? else {
        return Ok(None);
    };

    let interest_score: i64 = row.get("interest_score")?;
    let topic: String = row.get("topic")?;
    let themes_json: String = row.get("themes_json")?;
    let ideas_json: String = row.get("ideas_json")?;

    Ok(Some(EventAnalysis {
        interest_score: u8::try_from(interest_score)
            .map_err(|_| anyhow!("interest_score out of range: {interest_score}"))?,
        topic: Topic::from_label(&topic).ok_or_else(|| anyhow!("unknown topic {topic}"))?,
        themes: parse_json(&themes_json, "themes_json")?,
        ideas: parse_json(&ideas_json, "ideas_json")?,
        analyzed_at,
    }))
}

fn row_to_event(row: &Row) -> Result<Event> {
    let engaged_ms: i64 = row.get("engaged_ms")?;
    let started_at: String = row.get("started_at")?;
    let ended_at: String = row.get("ended_at")?;
    let created_at: String = row.get("created_at")?;
    let source: String = row.get("source")?;

    Ok(Event {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        url: row.get("url")?,
        title: row.get("title")?,
        domain: row.get("domain")?,
        engaged_ms: to_u64(engaged_ms, "engaged_ms")?,
        scroll_depth: row.get("scroll_depth")?,
        started_at: parse_datetime(&started_at, "started_at")?,
        ended_at: parse_datetime(&ended_at, "ended_at")?,
        source: parse_source(&source)?,
        analysis: row_to_analysis(row)?,
        created_at: parse_datetime(&created_at, "created_at")?,
    })
}

impl Database {
    /// Batch insert events in one transaction.
    pub async fn insert_events(&self, events: &[Event]) -> Result<usize> {
        let events = events.to_vec();
        self.execute(move |conn| {
            let tx = conn.transaction()?;

            for event in &events {
                tx.execute(
                    "INSERT INTO events (
                        id,
                        user_id,
                        url,
                        title,
                        domain,
                        engaged_ms,
                        scroll_depth,
                        started_at,
                        ended_at,
                        source,
                        created_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                    params![
                        event.id,
                        event.user_id,
                        event.url,
                        event.title,
                        event.domain,
                        to_i64(event.engaged_ms)?,
                        event.scroll_depth,
                        format_datetime(event.started_at),
                        format_datetime(event.ended_at),
                        event.source.as_str(),
                        format_datetime(event.created_at),
                    ],
                )
                .with_context(|| format!("failed to insert event {}", event.id))?;
            }

            tx.commit()?;
            Ok(events.len())
        })
        .await
    }

    pub async fn get_event(&self, event_id: &str) -> Result<Option<Event>> {
        let event_id = event_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {EVENT_COLUMNS}
                 FROM events
                 WHERE id = ?1"
            ))?;

            let mut rows = stmt.query(params![event_id])?;
            let event = match rows.next()? {
                Some(row) => Some(row_to_event(row)?),
                None => None,
            };
            Ok(event)
        })
        .await
    }

    /// Newest-first page of a user's events.
    pub async fn list_events(&self, user_id: &str, limit: usize, offset: usize) -> Result<EventPage> {
        let user_id = user_id.to_string();
        let limit = limit as i64;
        let offset = offset as i64;
        self.execute(move |conn| {
            let total: i64 = conn.query_row(
                "SELECT COUNT(*) FROM events WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            )?;

            let mut stmt = conn.prepare(&format!(
                "SELECT {EVENT_COLUMNS}
                 FROM events
                 WHERE user_id = ?1
                 ORDER BY started_at DESC, id ASC
                 LIMIT ?2 OFFSET ?3"
            ))?;

            let mut rows = stmt.query(params![user_id, limit, offset])?;
            let mut events = Vec::new();
            while let Some(row) = rows.next()? {
                events.push(EventView::from(row_to_event(row)?));
            }

            let total = to_u64(total, "total")?;
            Ok(EventPage {
                events,
                has_more: ((offset + limit) as u64) < total,
                total,
            })
        })
        .await
    }

    /// Oldest-first events that have not been scored yet.
    pub async fn list_unanalyzed_events(&self, user_id: &str, limit: usize) -> Result<Vec<Event>> {
        let user_id = user_id.to_string();
        let limit = limit as i64;
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {EVENT_COLUMNS}
                 FROM events
                 WHERE user_id = ?1 AND analyzed_at IS NULL
                 ORDER BY started_at ASC
                 LIMIT ?2"
            ))?;

            let mut rows = stmt.query(params![user_id, limit])?;
            let mut events = Vec::new();
            while let Some(row) = rows.next()? {
                events.push(row_to_event(row)?);
            }
            Ok(events)
        })
        .await
    }

    pub async fn list_analyzed_events(&self, user_id: &str) -> Result<Vec<Event>> {
        let user_id = user_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {EVENT_COLUMNS}
                 FROM events
                 WHERE user_id = ?1 AND analyzed_at IS NOT NULL
                 ORDER BY started_at DESC"
            ))?;

            let mut rows = stmt.query(params![user_id])?;
            let mut events = Vec::new();
            while let Some(row) = rows.next()? {
                events.push(row_to_event(row)?);
            }
            Ok(events)
        })
        .await
    }

    /// Newest-first events started at or after `since`, analyzed or not.
    pub async fn list_events_since(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Event>> {
        let user_id = user_id.to_string();
        let since = format_datetime(since);
        let limit = limit as i64;
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {EVENT_COLUMNS}
                 FROM events
                 WHERE user_id = ?1 AND started_at >= ?2
                 ORDER BY started_at DESC, id ASC
                 LIMIT ?3"
            ))?;

            let mut rows = stmt.query(params![user_id, since, limit])?;
            let mut events = Vec::new();
            while let Some(row) = rows.next()? {
                events.push(row_to_event(row)?);
            }
            Ok(events)
        })
        .await
    }

    /// Distinct topics of analyzed events, most recently visited first.
    pub async fn recent_topics(&self, user_id: &str, limit: usize) -> Result<Vec<Topic>> {
        let user_id = user_id.to_string();
        let limit = limit as i64;
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT topic
                 FROM events
                 WHERE user_id = ?1 AND analyzed_at IS NOT NULL
                 GROUP BY topic
                 ORDER BY MAX(started_at) DESC, topic ASC
                 LIMIT ?2",
            )?;

            let mut rows = stmt.query(params![user_id, limit])?;
            let mut topics = Vec::new();
            while let Some(row) = rows.next()? {
                let label: String = row.get(0)?;
                topics.push(
                    Topic::from_label(&label).ok_or_else(|| anyhow!("unknown topic {label}"))?,
                );
            }
            Ok(topics)
        })
        .await
    }

    /// Aggregates the scorer needs, relative to `now`.
    ///
    /// Counts whatever is stored, so an already-persisted session counts
    /// towards its own repeat visits.
    pub async fn historical_context(
        &self,
        user_id: &str,
        domain: &str,
        now: DateTime<Utc>,
    ) -> Result<HistoricalContext> {
        let user_id = user_id.to_string();
        let domain = domain.to_string();
        let repeat_since = format_datetime(now - Duration::days(REPEAT_VISIT_WINDOW_DAYS));
        let diversity_since = format_datetime(now - Duration::hours(DOMAIN_DIVERSITY_WINDOW_HOURS));
        self.execute(move |conn| {
            let repeat_visits: i64 = conn.query_row(
                "SELECT COUNT(*) FROM events
                 WHERE user_id = ?1 AND domain = ?2 AND started_at >= ?3",
                params![user_id, domain, repeat_since],
                |row| row.get(0),
            )?;

            let unique_domains: i64 = conn.query_row(
                "SELECT COUNT(DISTINCT domain) FROM events
                 WHERE user_id = ?1 AND started_at >= ?2",
                params![user_id, diversity_since],
                |row| row.get(0),
            )?;

            Ok(HistoricalContext {
                repeat_visit_count_7d: to_u64(repeat_visits, "repeat_visits")?,
                unique_domain_count_48h: to_u64(unique_domains, "unique_domains")?,
            })
        })
        .await
    }

    pub async fn save_analysis(&self, event_id: &str, analysis: &EventAnalysis) -> Result<()> {
        let event_id = event_id.to_string();
        let themes_json =
            serde_json::to_string(&analysis.themes).context("failed to serialize themes")?;
        let ideas_json =
            serde_json::to_string(&analysis.ideas).context("failed to serialize ideas")?;
        let interest_score = analysis.interest_score;
        let topic = analysis.topic.label();
        let analyzed_at = format_datetime(analysis.analyzed_at);
        self.execute(move |conn| {
            let rows_affected = conn.execute(
                "UPDATE events
                 SET interest_score = ?1,
                     topic = ?2,
                     themes_json = ?3,
                     ideas_json = ?4,
                     analyzed_at = ?5
                 WHERE id = ?6",
                params![
                    interest_score,
                    topic,
                    themes_json,
                    ideas_json,
                    analyzed_at,
                    event_id
                ],
            )?;

            if rows_affected == 0 {
                return Err(anyhow!("Event {event_id} not found"));
            }
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ThemeAnalysis;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 10, 18, 0, 0).unwrap()
    }

    fn open() -> (TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(dir.path().join("events.sqlite3")).unwrap();
        (dir, db)
    }

    fn event(id: &str, user: &str, domain: &str, age: Duration) -> Event {
        let started_at = now() - age;
        Event {
            id: id.into(),
            user_id: user.into(),
            url: format!("https://{domain}/{id}"),
            title: Some(format!("Page {id}")),
            domain: domain.into(),
            engaged_ms: 120_000,
            scroll_depth: Some(0.5),
            started_at,
            ended_at: started_at + Duration::minutes(2),
            source: EventSource::Chrome,
            analysis: None,
            created_at: now(),
        }
    }

    #[tokio::test]
    async fn inserted_events_round_trip() {
        let (_dir, db) = open();
        let original = event("a", "u1", "example.com", Duration::hours(1));
        assert_eq!(db.insert_events(&[original.clone()]).await.unwrap(), 1);

        let loaded = db.get_event("a").await.unwrap().unwrap();
        assert_eq!(loaded, original);
        assert!(db.get_event("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn historical_context_respects_windows_and_user() {
        let (_dir, db) = open();
        db.insert_events(&[
            event("1", "u1", "rust-lang.org", Duration::hours(1)),
            event("2", "u1", "rust-lang.org", Duration::days(3)),
            event("3", "u1", "rust-lang.org", Duration::days(8)),
            event("4", "u1", "docs.rs", Duration::hours(30)),
            event("5", "u1", "github.com", Duration::hours(50)),
            event("6", "u2", "rust-lang.org", Duration::hours(2)),
            event("7", "u2", "crates.io", Duration::hours(2)),
        ])
        .await
        .unwrap();

        let history = db
            .historical_context("u1", "rust-lang.org", now())
            .await
            .unwrap();
        assert_eq!(history.repeat_visit_count_7d, 2);
        assert_eq!(history.unique_domain_count_48h, 2);
    }

    #[tokio::test]
    async fn listing_pages_newest_first() {
        let (_dir, db) = open();
        db.insert_events(&[
            event("old", "u1", "a.com", Duration::hours(5)),
            event("mid", "u1", "b.com", Duration::hours(3)),
            event("new", "u1", "c.com", Duration::hours(1)),
            event("other", "u2", "d.com", Duration::hours(1)),
        ])
        .await
        .unwrap();

        let page = db.list_events("u1", 2, 0).await.unwrap();
        let ids: Vec<_> = page.events.iter().map(|v| v.event.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "mid"]);
        assert_eq!(page.total, 3);
        assert!(page.has_more);
        assert_eq!(page.events[0].minutes, 2.0);

        let page = db.list_events("u1", 2, 2).await.unwrap();
        assert_eq!(page.events.len(), 1);
        assert!(!page.has_more);
    }

    #[tokio::test]
    async fn saved_analysis_moves_event_out_of_pending() {
        let (_dir, db) = open();
        db.insert_events(&[
            event("x", "u1", "a.com", Duration::hours(2)),
            event("y", "u1", "b.com", Duration::hours(1)),
        ])
        .await
        .unwrap();

        let analysis = EventAnalysis {
            interest_score: 12,
            topic: Topic::Cloud,
            themes: ThemeAnalysis {
                themes: vec!["Technology".into()],
                ..ThemeAnalysis::default()
            },
            ideas: Vec::new(),
            analyzed_at: now(),
        };
        db.save_analysis("x", &analysis).await.unwrap();

        let pending = db.list_unanalyzed_events("u1", 10).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, "y");

        let analyzed = db.list_analyzed_events("u1").await.unwrap();
        assert_eq!(analyzed.len(), 1);
        assert_eq!(analyzed[0].analysis.as_ref(), Some(&analysis));

        assert!(db.save_analysis("nope", &analysis).await.is_err());
    }

    fn analysis(topic: Topic) -> EventAnalysis {
        EventAnalysis {
            interest_score: 10,
            topic,
            themes: ThemeAnalysis::default(),
            ideas: Vec::new(),
            analyzed_at: now(),
        }
    }

    #[tokio::test]
    async fn recent_topics_are_distinct_and_newest_first() {
        let (_dir, db) = open();
        db.insert_events(&[
            event("a", "u1", "a.com", Duration::hours(9)),
            event("b", "u1", "b.com", Duration::hours(5)),
            event("c", "u1", "c.com", Duration::hours(1)),
            event("d", "u1", "d.com", Duration::hours(3)),
            event("pending", "u1", "e.com", Duration::minutes(5)),
        ])
        .await
        .unwrap();
        db.save_analysis("a", &analysis(Topic::Cloud)).await.unwrap();
        db.save_analysis("b", &analysis(Topic::Security)).await.unwrap();
        db.save_analysis("c", &analysis(Topic::Cloud)).await.unwrap();
        db.save_analysis("d", &analysis(Topic::DevOps)).await.unwrap();

        let topics = db.recent_topics("u1", 5).await.unwrap();
        assert_eq!(topics, vec![Topic::Cloud, Topic::DevOps, Topic::Security]);
        assert_eq!(db.recent_topics("u1", 2).await.unwrap().len(), 2);
        assert!(db.recent_topics("u2", 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn events_since_respects_window_and_limit() {
        let (_dir, db) = open();
        db.insert_events(&[
            event("in-1", "u1", "a.com", Duration::hours(47)),
            event("in-2", "u1", "b.com", Duration::hours(2)),
            event("out", "u1", "c.com", Duration::hours(49)),
        ])
        .await
        .unwrap();

        let since = now() - Duration::hours(48);
        let events = db.list_events_since("u1", since, 50).await.unwrap();
        let ids: Vec<_> = events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["in-2", "in-1"]);
        assert_eq!(db.list_events_since("u1", since, 1).await.unwrap().len(), 1);
    }
}
