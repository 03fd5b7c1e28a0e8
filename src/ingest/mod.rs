//! Ingestion boundary for batches uploaded by the browser extension.
//!
//! Everything the scoring engine assumes about its inputs (www-stripped
//! domains, capped engaged time, scroll in `[0, 1]`) is enforced here.

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::db::{Database, Event, EventSource};
use crate::settings::IngestSettings;

const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

/// One finalized tab session as the extension reports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub ms: f64,
    #[serde(default)]
    pub scroll_depth: Option<f64>,
    /// Epoch milliseconds.
    pub ts_start: f64,
    /// Epoch milliseconds.
    pub ts_end: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestBatch {
    pub events: Vec<RawEvent>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IngestReport {
    pub saved: usize,
    pub excluded: usize,
    pub rejected: usize,
}

/// Lowercased host with a leading `www.` removed.
pub fn normalize_domain(raw_url: &str) -> Result<String> {
    let url = Url::parse(raw_url).with_context(|| format!("invalid url {raw_url}"))?;
    let host = url
        .host_str()
        .filter(|host| !host.is_empty())
        .ok_or_else(|| anyhow!("url {raw_url} has no host"))?
        .to_lowercase();
    if let Some(stripped) = host.strip_prefix("www.") {
        return Ok(stripped.to_string());
    }
    Ok(host)
}

fn clamp_engaged_ms(ms: f64, max_engaged_ms: u64) -> u64 {
    if !ms.is_finite() {
        return 0;
    }
    ms.trunc().clamp(0.0, max_engaged_ms as f64) as u64
}

fn clamp_scroll(depth: Option<f64>) -> Option<f64> {
    depth
        .filter(|depth| depth.is_finite())
        .map(|depth| depth.clamp(0.0, 1.0))
}

/// Stored timestamps are four-digit-year RFC 3339 strings.
const STORABLE_YEARS: std::ops::RangeInclusive<i32> = 0..=9999;

fn parse_epoch_ms(value: f64, field: &str) -> Result<DateTime<Utc>> {
    if !value.is_finite() {
        bail!("{field} is not a finite timestamp");
    }
    let instant = Utc
        .timestamp_millis_opt(value.trunc() as i64)
        .single()
        .ok_or_else(|| anyhow!("{field} out of range: {value}"))?;
    if !STORABLE_YEARS.contains(&instant.year()) {
        bail!("{field} year {} is outside 0..=9999", instant.year());
    }
    Ok(instant)
}

/// Validate and clamp a single raw event into a storable row.
pub fn normalize_event(
    raw: &RawEvent,
    user_id: &str,
    settings: &IngestSettings,
    now: DateTime<Utc>,
) -> Result<Event> {
    let domain = normalize_domain(&raw.url)?;
    let title = raw
        .title
        .as_ref()
        .map(|title| title.chars().take(settings.max_title_chars).collect::<String>());

    Ok(Event {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        url: raw.url.clone(),
        title,
        domain,
        engaged_ms: clamp_engaged_ms(raw.ms, settings.max_engaged_ms),
        scroll_depth: clamp_scroll(raw.scroll_depth),
        started_at: parse_epoch_ms(raw.ts_start, "tsStart")?,
        ended_at: parse_epoch_ms(raw.ts_end, "tsEnd")?,
        source: EventSource::Chrome,
        analysis: None,
        created_at: now,
    })
}

/// Normalize, filter and store a batch; bad events are skipped, not fatal.
pub async fn ingest_batch(
    db: &Database,
    user_id: &str,
    batch: &IngestBatch,
    settings: &IngestSettings,
    now: DateTime<Utc>,
) -> Result<IngestReport> {
    let excluded = db.list_excluded_domains(user_id).await?;
    let mut report = IngestReport::default();
    let mut rows = Vec::with_capacity(batch.events.len());

    for raw in &batch.events {
        let event = match normalize_event(raw, user_id, settings, now) {
            Ok(event) => event,
            Err(err) => {
                log_warn!("Rejected event for {}: {err:#}", raw.url);
                report.rejected += 1;
                continue;
            }
        };

        if excluded.iter().any(|entry| entry.covers(&event.domain)) {
            report.excluded += 1;
            continue;
        }

        rows.push(event);
    }

    report.saved = db.insert_events(&rows).await?;
    log_info!(
        "Ingested batch for {user_id}: saved={} excluded={} rejected={}",
        report.saved,
        report.excluded,
        report.rejected
    );
    Ok(report)
}
