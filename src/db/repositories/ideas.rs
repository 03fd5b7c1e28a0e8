use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Row};

use crate::db::{
    connection::Database,
    helpers::{format_datetime, parse_datetime, parse_json},
    models::{IdeaStatus, TopicIdea},
};
use crate::models::Topic;

const IDEA_COLUMNS: &str = "id, user_id, topic, source_urls_json, source_event_ids_json, score,
     breakdown_json, tags_json, status, created_at";

fn row_to_idea(row: &Row) -> Result<TopicIdea> {
    let topic: String = row.get("topic")?;
    let source_urls_json: String = row.get("source_urls_json")?;
    let source_event_ids_json: String = row.get("source_event_ids_json")?;
    let breakdown_json: String = row.get("breakdown_json")?;
    let tags_json: String = row.get("tags_json")?;
    let status: String = row.get("status")?;
    let created_at: String = row.get("created_at")?;

    Ok(TopicIdea {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        topic: Topic::from_label(&topic).ok_or_else(|| anyhow!("unknown topic {topic}"))?,
        source_urls: parse_json(&source_urls_json, "source_urls_json")?,
        source_event_ids: parse_json(&source_event_ids_json, "source_event_ids_json")?,
        score: row.get("score")?,
        breakdown: parse_json(&breakdown_json, "breakdown_json")?,
        tags: parse_json(&tags_json, "tags_json")?,
        status: IdeaStatus::parse(&status)?,
        created_at: parse_datetime(&created_at, "created_at")?,
    })
}

impl Database {
    pub async fn insert_topic_ideas(&self, ideas: &[TopicIdea]) -> Result<usize> {
        let ideas = ideas.to_vec();
        self.execute(move |conn| {
            let tx = conn.transaction()?;

            for idea in &ideas {
                tx.execute(
                    "INSERT INTO ideas (
                        id,
                        user_id,
                        topic,
                        source_urls_json,
                        source_event_ids_json,
                        score,
                        breakdown_json,
                        tags_json,
                        status,
                        created_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                    params![
                        idea.id,
                        idea.user_id,
                        idea.topic.label(),
                        serde_json::to_string(&idea.source_urls)?,
                        serde_json::to_string(&idea.source_event_ids)?,
                        idea.score,
                        serde_json::to_string(&idea.breakdown)?,
                        serde_json::to_string(&idea.tags)?,
                        idea.status.as_str(),
                        format_datetime(idea.created_at),
                    ],
                )
                .with_context(|| format!("failed to insert idea {}", idea.id))?;
            }

            tx.commit()?;
            Ok(ideas.len())
        })
        .await
    }

    /// Newest batch first; within a batch, highest score first.
    pub async fn list_ideas(&self, user_id: &str, limit: usize) -> Result<Vec<TopicIdea>> {
        let user_id = user_id.to_string();
        let limit = limit as i64;
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {IDEA_COLUMNS}
                 FROM ideas
                 WHERE user_id = ?1
                 ORDER BY created_at DESC, score DESC, id ASC
                 LIMIT ?2"
            ))?;

            let mut rows = stmt.query(params![user_id, limit])?;
            let mut ideas = Vec::new();
            while let Some(row) = rows.next()? {
                ideas.push(row_to_idea(row)?);
            }
            Ok(ideas)
        })
        .await
    }

    /// Move an idea through review; returns the updated row.
    pub async fn set_idea_status(&self, idea_id: &str, status: IdeaStatus) -> Result<TopicIdea> {
        let idea_id = idea_id.to_string();
        self.execute(move |conn| {
            let rows_affected = conn.execute(
                "UPDATE ideas SET status = ?1 WHERE id = ?2",
                params![status.as_str(), idea_id],
            )?;
            if rows_affected == 0 {
                return Err(anyhow!("Idea {idea_id} not found"));
            }

            let mut stmt =
                conn.prepare(&format!("SELECT {IDEA_COLUMNS} FROM ideas WHERE id = ?1"))?;
            let mut rows = stmt.query(params![idea_id])?;
            match rows.next()? {
                Some(row) => row_to_idea(row),
                None => Err(anyhow!("Idea {idea_id} not found")),
            }
        })
        .await
    }
}
