use std::path::PathBuf;

use clap::{Parser, Subcommand};

const DEFAULT_PAGE_SIZE: usize = 50;
const DEFAULT_ANALYZE_LIMIT: usize = 100;
const DEFAULT_IDEA_LIST_LIMIT: usize = 20;

#[derive(Parser)]
#[command(name = "attentrack")]
#[command(about = "Score and classify browsing sessions uploaded by the attentrack extension.")]
pub(crate) struct Cli {
    /// Directory holding the SQLite store and settings.json.
    #[arg(
        long,
        global = true,
        env = "ATTENTRACK_DATA_DIR",
        default_value = ".attentrack"
    )]
    pub(crate) data_dir: PathBuf,

    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Store a JSON batch of extension events (`{"events": [...]}`).
    Ingest { file: PathBuf },
    /// Score, classify and enrich stored events.
    Analyze {
        /// Analyze a single event instead of the pending queue.
        #[arg(long)]
        event_id: Option<String>,

        /// Re-analyze even if the event already has results.
        #[arg(long)]
        force: bool,

        /// Max pending events to process.
        #[arg(long, default_value_t = DEFAULT_ANALYZE_LIMIT)]
        limit: usize,
    },
    /// List stored events, newest first.
    Events {
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        limit: usize,

        #[arg(long, default_value_t = 0)]
        offset: usize,
    },
    /// Engaged time per topic over analyzed events.
    Topics,
    /// Topic-level content ideas from the last 48 hours.
    Ideas {
        #[command(subcommand)]
        action: IdeasAction,
    },
    /// Manage domains that are never stored.
    Exclude {
        #[command(subcommand)]
        action: ExcludeAction,
    },
    /// Show or replace the interests handed to idea generation.
    Preferences {
        #[command(subcommand)]
        action: PreferencesAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum IdeasAction {
    /// Rank recent topics and store one idea per top topic.
    Generate,
    List {
        #[arg(long, default_value_t = DEFAULT_IDEA_LIST_LIMIT)]
        limit: usize,
    },
    Accept { id: String },
    Reject { id: String },
    /// Mark an idea as published.
    Posted { id: String },
}

#[derive(Subcommand)]
pub(crate) enum ExcludeAction {
    List,
    Add { domain: String },
    Remove { domain: String },
}

#[derive(Subcommand)]
pub(crate) enum PreferencesAction {
    Show,
    Set {
        /// Theme for this week (repeatable).
        #[arg(long = "weekly-theme")]
        weekly_themes: Vec<String>,

        /// Long-running interest (repeatable).
        #[arg(long = "interest")]
        general_interests: Vec<String>,

        /// Area of expertise (repeatable).
        #[arg(long = "expertise")]
        extracted_expertise: Vec<String>,
    },
}
