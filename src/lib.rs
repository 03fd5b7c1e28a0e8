pub mod analysis;
mod cli;
pub mod db;
pub mod engine;
pub mod ingest;
pub mod models;
pub mod settings;
mod utils;

use std::{fs, path::Path, sync::Arc};

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::Parser;
use serde::Serialize;

use analysis::{topic_summary, Analyzer, KeywordAssistant};
use cli::{Cli, Command, ExcludeAction, IdeasAction, PreferencesAction};
use db::{Database, EventView, IdeaStatus};
use ingest::IngestBatch;
use settings::{Preferences, SettingsStore};

pub use engine::{classify_topic, compute_interest_score};
pub use models::{BrowsingSession, HistoricalContext, Topic};

const DB_FILE_NAME: &str = "attentrack.sqlite3";
const SETTINGS_FILE_NAME: &str = "settings.json";

pub fn run() -> Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let cli = Cli::parse();

    fs::create_dir_all(&cli.data_dir)
        .with_context(|| format!("failed to create data dir {}", cli.data_dir.display()))?;
    let database = Database::new(cli.data_dir.join(DB_FILE_NAME))?;
    let settings = SettingsStore::new(cli.data_dir.join(SETTINGS_FILE_NAME))?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start tokio runtime")?;

    runtime.block_on(execute(cli.command, database, settings))
}

async fn execute(command: Command, db: Database, settings: SettingsStore) -> Result<()> {
    let user_id = settings.user_id();
    let now = Utc::now();

    match command {
        Command::Ingest { file } => {
            let batch = read_batch(&file)?;
            let report =
                ingest::ingest_batch(&db, &user_id, &batch, &settings.ingest(), now).await?;
            print_json(&report)
        }
        Command::Analyze {
            event_id,
            force,
            limit,
        } => {
            let analyzer = Analyzer::new(db, Arc::new(KeywordAssistant))
                .with_preferences(settings.preferences());
            match event_id {
                Some(event_id) => {
                    let event = analyzer.analyze_event(&event_id, now, force).await?;
                    print_json(&EventView::from(event))
                }
                None => {
                    let report = analyzer.analyze_pending(&user_id, now, limit).await?;
                    print_json(&report)
                }
            }
        }
        Command::Events { limit, offset } => {
            print_json(&db.list_events(&user_id, limit, offset).await?)
        }
        Command::Topics => {
            let analyzed = db.list_analyzed_events(&user_id).await?;
            print_json(&topic_summary(&analyzed))
        }
        Command::Ideas { action } => match action {
            IdeasAction::Generate => {
                let analyzer = Analyzer::new(db, Arc::new(KeywordAssistant))
                    .with_preferences(settings.preferences());
                print_json(&analyzer.generate_topic_ideas(&user_id, now).await?)
            }
            IdeasAction::List { limit } => print_json(&db.list_ideas(&user_id, limit).await?),
            IdeasAction::Accept { id } => {
                print_json(&db.set_idea_status(&id, IdeaStatus::Accepted).await?)
            }
            IdeasAction::Reject { id } => {
                print_json(&db.set_idea_status(&id, IdeaStatus::Rejected).await?)
            }
            IdeasAction::Posted { id } => {
                print_json(&db.set_idea_status(&id, IdeaStatus::Posted).await?)
            }
        },
        Command::Exclude { action } => {
            match action {
                ExcludeAction::List => {}
                ExcludeAction::Add { domain } => {
                    let domain = normalize_excluded_domain(&domain)?;
                    db.add_excluded_domain(&user_id, &domain, now).await?;
                }
                ExcludeAction::Remove { domain } => {
                    let domain = normalize_excluded_domain(&domain)?;
                    db.remove_excluded_domain(&user_id, &domain).await?;
                }
            }
            print_json(&db.list_excluded_domains(&user_id).await?)
        }
        Command::Preferences { action } => {
            if let PreferencesAction::Set {
                weekly_themes,
                general_interests,
                extracted_expertise,
            } = action
            {
                settings.update_preferences(Preferences {
                    weekly_themes,
                    general_interests,
                    extracted_expertise,
                })?;
            }
            print_json(&settings.preferences())
        }
    }
}

fn read_batch(path: &Path) -> Result<IngestBatch> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read batch from {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse batch in {}", path.display()))
}

/// Accepts either a bare host or a full URL.
fn normalize_excluded_domain(raw: &str) -> Result<String> {
    let raw = raw.trim();
    if raw.contains("://") {
        return ingest::normalize_domain(raw);
    }
    let domain = raw.trim_end_matches('/').to_lowercase();
    let domain = domain.strip_prefix("www.").unwrap_or(&domain).to_string();
    if domain.is_empty() || domain.contains('/') {
        bail!("invalid domain: {raw}");
    }
    Ok(domain)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
