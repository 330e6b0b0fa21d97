//! Per-chat settings store, persisted as JSON.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Upper bound on a configurable cooldown.
pub const MAX_COOLDOWN_SECS: u64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSettings {
    pub enabled: bool,
    /// Forum topic the bot is pinned to, if any. Action chains posted
    /// in other topics are dropped before rate limiting.
    pub topic_id: Option<i64>,
    pub auto_react: bool,
    pub cooldown_secs: u64,
}

impl ChatSettings {
    fn with_cooldown(cooldown_secs: u64) -> Self {
        Self {
            enabled: true,
            topic_id: None,
            auto_react: true,
            cooldown_secs: cooldown_secs.min(MAX_COOLDOWN_SECS),
        }
    }

    pub fn set_cooldown(&mut self, secs: u64) {
        self.cooldown_secs = secs.min(MAX_COOLDOWN_SECS);
    }
}

pub struct SettingsStore {
    chats: HashMap<i64, ChatSettings>,
    default_cooldown_secs: u64,
    path: Option<PathBuf>,
}

impl SettingsStore {
    pub fn new(default_cooldown_secs: u64) -> Self {
        Self {
            chats: HashMap::new(),
            default_cooldown_secs,
            path: None,
        }
    }

    pub fn load_or_new(path: &Path, default_cooldown_secs: u64) -> Self {
        let mut store = if path.exists() {
            match Self::load(path, default_cooldown_secs) {
                Ok(store) => store,
                Err(e) => {
                    warn!("Failed to load settings: {e}");
                    Self::new(default_cooldown_secs)
                }
            }
        } else {
            Self::new(default_cooldown_secs)
        };
        store.path = Some(path.to_path_buf());
        store
    }

    fn load(path: &Path, default_cooldown_secs: u64) -> Result<Self, String> {
        let json = std::fs::read_to_string(path).map_err(|e| format!("Failed to read: {e}"))?;
        let chats: HashMap<i64, ChatSettings> =
            serde_json::from_str(&json).map_err(|e| format!("Failed to parse: {e}"))?;
        info!("Loaded settings for {} chat(s)", chats.len());
        Ok(Self { chats, default_cooldown_secs, path: None })
    }

    pub fn save(&self) -> Result<(), String> {
        let Some(ref path) = self.path else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(&self.chats)
            .map_err(|e| format!("Failed to serialize: {e}"))?;
        std::fs::write(path, json).map_err(|e| format!("Failed to write: {e}"))
    }

    /// Settings for a chat, created lazily with defaults.
    pub fn get(&self, chat_id: i64) -> ChatSettings {
        self.chats
            .get(&chat_id)
            .cloned()
            .unwrap_or_else(|| ChatSettings::with_cooldown(self.default_cooldown_secs))
    }

    /// Mutate a chat's settings in place, creating defaults first.
    pub fn update(&mut self, chat_id: i64, f: impl FnOnce(&mut ChatSettings)) -> ChatSettings {
        let entry = self
            .chats
            .entry(chat_id)
            .or_insert_with(|| ChatSettings::with_cooldown(self.default_cooldown_secs));
        f(entry);
        entry.cooldown_secs = entry.cooldown_secs.min(MAX_COOLDOWN_SECS);
        entry.clone()
    }
}
