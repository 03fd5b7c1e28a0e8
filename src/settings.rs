use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::PathBuf,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

pub const DEFAULT_USER_ID: &str = "local";

/// Limits applied to raw extension events before they are stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct IngestSettings {
    pub max_engaged_ms: u64,
    pub max_title_chars: usize,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            max_engaged_ms: 6 * 60 * 60 * 1000,
            max_title_chars: 512,
        }
    }
}

/// What the user is focusing on; handed to the content assistant.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    pub weekly_themes: Vec<String>,
    pub general_interests: Vec<String>,
    pub extracted_expertise: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct UserSettings {
    user_id: String,
    ingest: IngestSettings,
    preferences: Preferences,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            user_id: DEFAULT_USER_ID.into(),
            ingest: IngestSettings::default(),
            preferences: Preferences::default(),
        }
    }
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<UserSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                log::warn!(
                    "Ignoring malformed settings at {}: {err}",
                    path.display()
                );
                UserSettings::default()
            })
        } else {
            UserSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    fn read(&self) -> RwLockReadGuard<'_, UserSettings> {
        match self.data.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, UserSettings> {
        match self.data.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn user_id(&self) -> String {
        self.read().user_id.clone()
    }

    pub fn ingest(&self) -> IngestSettings {
        self.read().ingest.clone()
    }

    pub fn preferences(&self) -> Preferences {
        self.read().preferences.clone()
    }

    pub fn update_preferences(&self, preferences: Preferences) -> Result<()> {
        let mut guard = self.write();
        guard.preferences = preferences;
        self.persist(&guard)
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}
