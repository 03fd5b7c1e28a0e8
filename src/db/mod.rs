mod connection;
mod helpers;
mod migrations;
pub mod models;
mod repositories;

pub use connection::Database;
pub use models::{
    Event, EventAnalysis, EventPage, EventSource, EventView, ExcludedDomain, IdeaBreakdown,
    IdeaSource, IdeaStatus, TopicIdea,
};
