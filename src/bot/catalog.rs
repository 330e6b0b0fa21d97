//! Action catalogue: name → known media URLs + aliases, persisted as JSON.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::bot::assets;

/// Media URLs kept per action, most-recently-added first.
pub const MEDIA_CAP: usize = 12;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionEntry {
    #[serde(default)]
    pub urls: Vec<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
}

/// Result of looking up an action token.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    Known(String),
    /// Token was neither an action nor an alias; a placeholder action
    /// was created for it.
    AutoCreated(String),
}

impl Resolved {
    pub fn name(&self) -> &str {
        match self {
            Resolved::Known(n) | Resolved::AutoCreated(n) => n,
        }
    }
}

pub struct ActionCatalog {
    actions: HashMap<String, ActionEntry>,
    path: Option<PathBuf>,
}

impl ActionCatalog {
    /// Empty catalogue seeded with the builtin action names.
    pub fn new() -> Self {
        let actions = assets::BUILTIN_ACTIONS
            .iter()
            .map(|name| (name.to_string(), ActionEntry::default()))
            .collect();
        Self { actions, path: None }
    }

    pub fn load_or_new(path: &Path) -> Self {
        let mut catalog = if path.exists() {
            match Self::load(path) {
                Ok(catalog) => catalog,
                Err(e) => {
                    warn!("Failed to load action catalogue: {e}");
                    Self::new()
                }
            }
        } else {
            info!("No action catalogue file, starting with builtins");
            Self::new()
        };
        catalog.path = Some(path.to_path_buf());
        catalog
    }

    fn load(path: &Path) -> Result<Self, String> {
        let json = std::fs::read_to_string(path).map_err(|e| format!("Failed to read: {e}"))?;
        let mut actions: HashMap<String, ActionEntry> =
            serde_json::from_str(&json).map_err(|e| format!("Failed to parse: {e}"))?;
        // Builtins are always present even if the file predates them.
        for name in assets::BUILTIN_ACTIONS {
            actions.entry(name.to_string()).or_default();
        }
        info!("Loaded action catalogue from {:?} ({} actions)", path, actions.len());
        Ok(Self { actions, path: None })
    }

    pub fn save(&self) -> Result<(), String> {
        let Some(ref path) = self.path else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(&self.actions)
            .map_err(|e| format!("Failed to serialize: {e}"))?;
        std::fs::write(path, json).map_err(|e| format!("Failed to write: {e}"))
    }

    /// Resolve a token through the alias table to its canonical name.
    pub fn canonical(&self, token: &str) -> Option<String> {
        let token = token.to_ascii_lowercase();
        if self.actions.contains_key(&token) {
            return Some(token);
        }
        self.actions
            .iter()
            .find(|(_, entry)| entry.aliases.iter().any(|a| a == &token))
            .map(|(name, _)| name.clone())
    }

    /// Resolve a token, auto-creating a placeholder action when unknown.
    pub fn resolve_or_create(&mut self, token: &str) -> Resolved {
        if let Some(name) = self.canonical(token) {
            return Resolved::Known(name);
        }
        let name = token.to_ascii_lowercase();
        self.actions.insert(name.clone(), ActionEntry::default());
        info!("Auto-created action '{name}'");
        Resolved::AutoCreated(name)
    }

    pub fn urls(&self, name: &str) -> &[String] {
        self.actions.get(name).map_or(&[], |entry| entry.urls.as_slice())
    }

    /// Merge freshly fetched URLs into an action: new entries first,
    /// deduplicated, capped.
    pub fn merge_urls(&mut self, name: &str, fresh: Vec<String>) {
        let entry = self.actions.entry(name.to_string()).or_default();
        let mut merged: Vec<String> = Vec::with_capacity(MEDIA_CAP);
        for url in fresh.into_iter().chain(std::mem::take(&mut entry.urls)) {
            if !url.is_empty() && !merged.contains(&url) {
                merged.push(url);
            }
            if merged.len() >= MEDIA_CAP {
                break;
            }
        }
        entry.urls = merged;
    }

    /// Explicitly register an action. Returns false if it already exists.
    pub fn register(&mut self, name: &str) -> bool {
        let name = name.to_ascii_lowercase();
        if self.canonical(&name).is_some() {
            return false;
        }
        self.actions.insert(name, ActionEntry::default());
        true
    }

    /// Remove an action and its aliases. Returns false if unknown.
    pub fn remove(&mut self, name: &str) -> bool {
        self.actions.remove(&name.to_ascii_lowercase()).is_some()
    }

    /// Add an alias for an existing action. An alias may not collide
    /// with a canonical action name or another alias.
    pub fn add_alias(&mut self, action: &str, alias: &str) -> Result<(), String> {
        let alias = alias.to_ascii_lowercase();
        if self.canonical(&alias).is_some() {
            return Err(format!("'{alias}' is already taken"));
        }
        let Some(entry) = self.canonical(action).and_then(|name| self.actions.get_mut(&name))
        else {
            return Err(format!("no action named '{action}'"));
        };
        entry.aliases.push(alias);
        Ok(())
    }

    /// All canonical action names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.actions.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for ActionCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_are_known() {
        let catalog = ActionCatalog::new();
        assert_eq!(catalog.canonical("hug"), Some("hug".to_string()));
        assert_eq!(catalog.canonical("HUG"), Some("hug".to_string()));
        assert_eq!(catalog.canonical("nonexistent"), None);
    }

    #[test]
    fn test_resolve_or_create() {
        let mut catalog = ActionCatalog::new();
        assert_eq!(catalog.resolve_or_create("hug"), Resolved::Known("hug".into()));
        assert_eq!(catalog.resolve_or_create("yeet"), Resolved::AutoCreated("yeet".into()));
        // Second time around it is known.
        assert_eq!(catalog.resolve_or_create("yeet"), Resolved::Known("yeet".into()));
        assert!(catalog.urls("yeet").is_empty());
    }

    #[test]
    fn test_alias_resolution() {
        let mut catalog = ActionCatalog::new();
        catalog.add_alias("hug", "hugs").unwrap();
        assert_eq!(catalog.canonical("hugs"), Some("hug".to_string()));
        assert_eq!(catalog.resolve_or_create("hugs"), Resolved::Known("hug".into()));
    }

    #[test]
    fn test_alias_cannot_collide_with_action_name() {
        let mut catalog = ActionCatalog::new();
        assert!(catalog.add_alias("hug", "slap").is_err());
        assert!(catalog.add_alias("hug", "hug").is_err());
    }

    #[test]
    fn test_alias_for_unknown_action_fails() {
        let mut catalog = ActionCatalog::new();
        assert!(catalog.add_alias("nonexistent", "x").is_err());
    }

    #[test]
    fn test_merge_urls_dedup_and_cap() {
        let mut catalog = ActionCatalog::new();
        catalog.merge_urls("hug", vec!["a".into(), "b".into(), "a".into()]);
        assert_eq!(catalog.urls("hug"), ["a", "b"]);

        // New entries land in front of old ones.
        catalog.merge_urls("hug", vec!["c".into(), "b".into()]);
        assert_eq!(catalog.urls("hug"), ["c", "b", "a"]);

        let many: Vec<String> = (0..20).map(|i| format!("u{i}")).collect();
        catalog.merge_urls("hug", many);
        assert_eq!(catalog.urls("hug").len(), MEDIA_CAP);
    }

    #[test]
    fn test_register_and_remove() {
        let mut catalog = ActionCatalog::new();
        assert!(catalog.register("snuggle"));
        assert!(!catalog.register("snuggle"));
        assert!(catalog.remove("snuggle"));
        assert!(!catalog.remove("snuggle"));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("actions.json");

        let mut catalog = ActionCatalog::load_or_new(&path);
        catalog.merge_urls("hug", vec!["https://x/a.gif".into()]);
        catalog.add_alias("hug", "hugs").unwrap();
        catalog.save().unwrap();

        let reloaded = ActionCatalog::load_or_new(&path);
        assert_eq!(reloaded.urls("hug"), ["https://x/a.gif"]);
        assert_eq!(reloaded.canonical("hugs"), Some("hug".to_string()));
    }
}
