//! Usage counters: global, per-chat, per-user. Monotonic, persisted
//! after every increment by the caller.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Counters {
    pub total: u64,
    #[serde(default)]
    pub per_action: HashMap<String, u64>,
}

impl Counters {
    fn bump(&mut self, action: &str) {
        self.total += 1;
        *self.per_action.entry(action.to_string()).or_default() += 1;
    }

    fn top_actions(&self, n: usize) -> Vec<(String, u64)> {
        let mut entries: Vec<(String, u64)> =
            self.per_action.iter().map(|(k, v)| (k.clone(), *v)).collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        entries.truncate(n);
        entries
    }
}

#[derive(Default, Serialize, Deserialize)]
struct StatsState {
    global: Counters,
    #[serde(default)]
    per_chat: HashMap<i64, Counters>,
    #[serde(default)]
    per_user: HashMap<i64, u64>,
}

#[derive(Default)]
pub struct StatsStore {
    state: StatsState,
    path: Option<PathBuf>,
}

impl StatsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_or_new(path: &Path) -> Self {
        let state = if path.exists() {
            match std::fs::read_to_string(path)
                .map_err(|e| format!("Failed to read: {e}"))
                .and_then(|json| {
                    serde_json::from_str(&json).map_err(|e| format!("Failed to parse: {e}"))
                }) {
                Ok(state) => state,
                Err(e) => {
                    warn!("Failed to load stats: {e}");
                    StatsState::default()
                }
            }
        } else {
            StatsState::default()
        };
        Self { state, path: Some(path.to_path_buf()) }
    }

    pub fn save(&self) -> Result<(), String> {
        let Some(ref path) = self.path else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(&self.state)
            .map_err(|e| format!("Failed to serialize: {e}"))?;
        std::fs::write(path, json).map_err(|e| format!("Failed to write: {e}"))
    }

    pub fn record(&mut self, chat_id: i64, user_id: i64, action: &str) {
        self.state.global.bump(action);
        self.state.per_chat.entry(chat_id).or_default().bump(action);
        *self.state.per_user.entry(user_id).or_default() += 1;
    }

    pub fn global_total(&self) -> u64 {
        self.state.global.total
    }

    pub fn chat_total(&self, chat_id: i64) -> u64 {
        self.state.per_chat.get(&chat_id).map_or(0, |c| c.total)
    }

    pub fn user_total(&self, user_id: i64) -> u64 {
        self.state.per_user.get(&user_id).copied().unwrap_or(0)
    }

    /// Human-readable summary for the `stats` command.
    pub fn summary(&self, chat_id: i64, user_id: i64) -> String {
        let mut out = format!(
            "📊 Fun stats\nGlobal uses: {}\nThis chat: {}\nYou: {}",
            self.state.global.total,
            self.chat_total(chat_id),
            self.user_total(user_id),
        );
        let top = self
            .state
            .per_chat
            .get(&chat_id)
            .map(|c| c.top_actions(5))
            .unwrap_or_default();
        if !top.is_empty() {
            out.push_str("\nTop here:");
            for (action, count) in top {
                out.push_str(&format!("\n  {action} × {count}"));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_bumps_all_levels() {
        let mut stats = StatsStore::new();
        stats.record(1, 100, "hug");
        stats.record(1, 100, "hug");
        stats.record(2, 200, "pat");

        assert_eq!(stats.global_total(), 3);
        assert_eq!(stats.chat_total(1), 2);
        assert_eq!(stats.chat_total(2), 1);
        assert_eq!(stats.user_total(100), 2);
        assert_eq!(stats.user_total(200), 1);
    }

    #[test]
    fn test_summary_lists_top_actions() {
        let mut stats = StatsStore::new();
        for _ in 0..3 {
            stats.record(1, 100, "hug");
        }
        stats.record(1, 100, "pat");

        let summary = stats.summary(1, 100);
        assert!(summary.contains("hug × 3"));
        assert!(summary.contains("pat × 1"));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.json");

        let mut stats = StatsStore::load_or_new(&path);
        stats.record(1, 100, "hug");
        stats.save().unwrap();

        let reloaded = StatsStore::load_or_new(&path);
        assert_eq!(reloaded.global_total(), 1);
        assert_eq!(reloaded.chat_total(1), 1);
    }
}
