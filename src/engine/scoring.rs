use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::config::ScoringConfig;
use crate::models::{BrowsingSession, HistoricalContext};

const TIME_SCORE_MAX: f64 = 40.0;
const TIME_SCORE_FLOOR: f64 = 5.0;
const SCROLL_SCORE_MAX: f64 = 20.0;

/// Sessions shorter than this get the fixed floor instead of the sigmoid.
const MIN_SIGMOID_MINUTES: f64 = 0.5;
/// Sessions longer than this get the ceiling without evaluating the sigmoid.
const MAX_SIGMOID_MINUTES: f64 = 20.0;
const SIGMOID_CENTER_MINUTES: f64 = 4.0;
const SIGMOID_STEEPNESS: f64 = 0.5;

const MAX_SCORE: f64 = 100.0;

/// Every sub-score on its own scale plus the weighted, clamped total.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub time: f64,
    pub scroll: f64,
    pub repeat: f64,
    pub recency: f64,
    pub diversity: f64,
    pub total: u8,
}

/// Interest score in `[0, 100]` using the default weights.
pub fn compute_interest_score(
    session: &BrowsingSession,
    history: &HistoricalContext,
    now: DateTime<Utc>,
) -> u8 {
    compute_interest_score_with(session, history, now, &ScoringConfig::default())
}

pub fn compute_interest_score_with(
    session: &BrowsingSession,
    history: &HistoricalContext,
    now: DateTime<Utc>,
    config: &ScoringConfig,
) -> u8 {
    score_breakdown(session, history, now, config).total
}

/// Compute the five sub-scores and their weighted sum.
pub fn score_breakdown(
    session: &BrowsingSession,
    history: &HistoricalContext,
    now: DateTime<Utc>,
    config: &ScoringConfig,
) -> ScoreBreakdown {
    let time = score_time(session.engaged_minutes());
    let scroll = score_scroll(session.scroll_depth);
    let repeat = score_repeat_visits(history.repeat_visit_count_7d);
    let recency = score_recency(hours_between(session.started_at, now));
    let diversity = score_diversity(history.unique_domain_count_48h);

    let weighted = config.weight_time * time
        + config.weight_scroll * scroll
        + config.weight_repeat * repeat
        + config.weight_recency * recency
        + config.weight_diversity * diversity;

    ScoreBreakdown {
        time,
        scroll,
        repeat,
        recency,
        diversity,
        total: clamp_score(weighted),
    }
}

/// Logistic curve over engaged minutes, centred at 4 minutes, 0-40.
pub(crate) fn score_time(minutes: f64) -> f64 {
    if minutes.is_nan() || minutes < MIN_SIGMOID_MINUTES {
        return TIME_SCORE_FLOOR;
    }
    if minutes > MAX_SIGMOID_MINUTES {
        return TIME_SCORE_MAX;
    }
    TIME_SCORE_MAX * sigmoid(SIGMOID_STEEPNESS * (minutes - SIGMOID_CENTER_MINUTES))
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Scroll fraction scaled to 0-20; missing or non-finite depth counts as 0.
pub(crate) fn score_scroll(scroll_depth: Option<f64>) -> f64 {
    let depth = scroll_depth
        .filter(|depth| depth.is_finite())
        .unwrap_or(0.0)
        .clamp(0.0, 1.0);
    depth * SCROLL_SCORE_MAX
}

/// Scale: 1 visit = 0, 2-3 = 10, 4-6 = 15, 7+ = 20.
pub(crate) fn score_repeat_visits(visit_count: u64) -> f64 {
    match visit_count {
        0..=1 => 0.0,
        2..=3 => 10.0,
        4..=6 => 15.0,
        _ => 20.0,
    }
}

/// Step down from 10 (last hour) to 0 (older than a week).
pub(crate) fn score_recency(hours_ago: f64) -> f64 {
    if hours_ago.is_nan() || hours_ago < 1.0 {
        10.0
    } else if hours_ago < 6.0 {
        8.0
    } else if hours_ago < 24.0 {
        6.0
    } else if hours_ago < 48.0 {
        4.0
    } else if hours_ago < 168.0 {
        2.0
    } else {
        0.0
    }
}

/// Scale: 1-2 domains = 0, 3-5 = 5, 6-10 = 8, 11+ = 10.
pub(crate) fn score_diversity(unique_domains: u64) -> f64 {
    match unique_domains {
        0..=2 => 0.0,
        3..=5 => 5.0,
        6..=10 => 8.0,
        _ => 10.0,
    }
}

fn hours_between(started_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    (now - started_at).num_milliseconds() as f64 / 3_600_000.0
}

fn clamp_score(weighted: f64) -> u8 {
    if !weighted.is_finite() {
        return 0;
    }
    weighted.round().clamp(0.0, MAX_SCORE) as u8
}
