pub mod session;
pub mod topic;

pub use session::{BrowsingSession, HistoricalContext};
pub use topic::Topic;
