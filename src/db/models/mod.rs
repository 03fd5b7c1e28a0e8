pub mod event;
pub mod excluded_domain;
pub mod idea;

pub use event::{Event, EventAnalysis, EventPage, EventSource, EventView};
pub use excluded_domain::ExcludedDomain;
pub use idea::{IdeaBreakdown, IdeaSource, IdeaStatus, TopicIdea};
