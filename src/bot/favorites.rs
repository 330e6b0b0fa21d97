//! Per-user favorite media and the append-only suggestion log.

use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Saved URLs per action per user.
pub const FAVORITES_CAP: usize = 25;

#[derive(Debug, PartialEq)]
pub enum FavoriteOutcome {
    Added,
    AlreadySaved,
    Full,
}

#[derive(Default)]
pub struct FavoritesStore {
    /// user id → action → saved URLs, oldest first.
    users: HashMap<i64, HashMap<String, Vec<String>>>,
    path: Option<PathBuf>,
}

impl FavoritesStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_or_new(path: &Path) -> Self {
        let users = if path.exists() {
            match std::fs::read_to_string(path)
                .map_err(|e| format!("Failed to read: {e}"))
                .and_then(|json| {
                    serde_json::from_str(&json).map_err(|e| format!("Failed to parse: {e}"))
                }) {
                Ok(users) => users,
                Err(e) => {
                    warn!("Failed to load favorites: {e}");
                    HashMap::new()
                }
            }
        } else {
            HashMap::new()
        };
        Self { users, path: Some(path.to_path_buf()) }
    }

    pub fn save(&self) -> Result<(), String> {
        let Some(ref path) = self.path else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(&self.users)
            .map_err(|e| format!("Failed to serialize: {e}"))?;
        std::fs::write(path, json).map_err(|e| format!("Failed to write: {e}"))
    }

    pub fn add(&mut self, user_id: i64, action: &str, url: &str) -> FavoriteOutcome {
        let list = self
            .users
            .entry(user_id)
            .or_default()
            .entry(action.to_string())
            .or_default();
        if list.iter().any(|u| u == url) {
            return FavoriteOutcome::AlreadySaved;
        }
        if list.len() >= FAVORITES_CAP {
            return FavoriteOutcome::Full;
        }
        list.push(url.to_string());
        FavoriteOutcome::Added
    }

    pub fn remove(&mut self, user_id: i64, action: &str, url: &str) -> bool {
        let Some(list) = self.users.get_mut(&user_id).and_then(|m| m.get_mut(action)) else {
            return false;
        };
        let before = list.len();
        list.retain(|u| u != url);
        list.len() != before
    }

    pub fn count(&self, user_id: i64, action: &str) -> usize {
        self.users
            .get(&user_id)
            .and_then(|m| m.get(action))
            .map_or(0, Vec::len)
    }

    /// A random saved URL for `fav-use`.
    pub fn random_for(&self, user_id: i64, action: &str) -> Option<String> {
        self.users
            .get(&user_id)
            .and_then(|m| m.get(action))
            .and_then(|list| list.choose(&mut rand::rng()))
            .cloned()
    }

    /// Per-action counts for the `favs` listing, sorted by name.
    pub fn overview(&self, user_id: i64) -> Vec<(String, usize)> {
        let mut entries: Vec<(String, usize)> = self
            .users
            .get(&user_id)
            .map(|m| m.iter().map(|(k, v)| (k.clone(), v.len())).collect())
            .unwrap_or_default();
        entries.retain(|(_, n)| *n > 0);
        entries.sort();
        entries
    }
}

/// One action-name suggestion from a user. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    pub chat_id: i64,
    pub user_id: i64,
    pub name: String,
    pub timestamp: String,
}

#[derive(Default)]
pub struct SuggestionLog {
    entries: Vec<Suggestion>,
    path: Option<PathBuf>,
}

impl SuggestionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_or_new(path: &Path) -> Self {
        let entries = if path.exists() {
            match std::fs::read_to_string(path)
                .map_err(|e| format!("Failed to read: {e}"))
                .and_then(|json| {
                    serde_json::from_str(&json).map_err(|e| format!("Failed to parse: {e}"))
                }) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("Failed to load suggestions: {e}");
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };
        Self { entries, path: Some(path.to_path_buf()) }
    }

    pub fn save(&self) -> Result<(), String> {
        let Some(ref path) = self.path else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| format!("Failed to serialize: {e}"))?;
        std::fs::write(path, json).map_err(|e| format!("Failed to write: {e}"))
    }

    pub fn append(&mut self, chat_id: i64, user_id: i64, name: &str) {
        self.entries.push(Suggestion {
            chat_id,
            user_id,
            name: name.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
