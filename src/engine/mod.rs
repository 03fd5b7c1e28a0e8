//! Stateless engagement scoring engine.
//!
//! Everything in here is a pure function of its arguments: no I/O, no clock
//! reads, no shared state. Callers fetch history and pass `now` explicitly.

pub mod config;
pub mod ideas;
pub mod scoring;
pub mod themes;
pub mod topics;

pub use config::ScoringConfig;
pub use ideas::{basic_ideas, ContentIdea, EstimatedReach, IdeaContext, IdeaFormat};
pub use scoring::{compute_interest_score, compute_interest_score_with, score_breakdown, ScoreBreakdown};
pub use themes::{basic_theme_analysis, ContentType, PageMetadata, PageRef, TechnicalLevel, ThemeAnalysis};
pub use topics::classify_topic;
