//! Member directory: users the bot has seen per chat.
//!
//! Telegram offers no way to enumerate group members, so targets are
//! resolved against text-mention entities on the message itself plus
//! this directory of previously seen users.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::bot::message::Mention;
use crate::bot::parser::TargetToken;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub user_id: i64,
    pub username: Option<String>,
    pub display_name: String,
}

#[derive(Default)]
pub struct MemberDirectory {
    chats: HashMap<i64, HashMap<i64, Member>>,
    path: Option<PathBuf>,
}

impl MemberDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_or_new(path: &Path) -> Self {
        let chats = if path.exists() {
            match std::fs::read_to_string(path)
                .map_err(|e| format!("Failed to read: {e}"))
                .and_then(|json| {
                    serde_json::from_str(&json).map_err(|e| format!("Failed to parse: {e}"))
                }) {
                Ok(chats) => chats,
                Err(e) => {
                    warn!("Failed to load member directory: {e}");
                    HashMap::new()
                }
            }
        } else {
            HashMap::new()
        };
        Self { chats, path: Some(path.to_path_buf()) }
    }

    pub fn save(&self) -> Result<(), String> {
        let Some(ref path) = self.path else {
            return Ok(());
        };
        let json = serde_json::to_string(&self.chats)
            .map_err(|e| format!("Failed to serialize: {e}"))?;
        std::fs::write(path, json).map_err(|e| format!("Failed to write: {e}"))
    }

    /// Record a user sighting. Returns true when the entry changed.
    pub fn observe(&mut self, chat_id: i64, member: Member) -> bool {
        let chat = self.chats.entry(chat_id).or_default();
        match chat.get(&member.user_id) {
            Some(existing) if *existing == member => false,
            _ => {
                chat.insert(member.user_id, member);
                true
            }
        }
    }

    pub fn get(&self, chat_id: i64, user_id: i64) -> Option<&Member> {
        self.chats.get(&chat_id)?.get(&user_id)
    }

    /// Resolve a target token. Order: explicit text-mentions on the
    /// message, then numeric id, then exact `@username`, then
    /// display-name/username match (case-insensitive). First match wins.
    pub fn resolve(
        &self,
        chat_id: i64,
        token: &TargetToken,
        mentions: &[Mention],
    ) -> Option<Member> {
        match token {
            TargetToken::Id(id) => {
                if let Some(mention) = mentions.iter().find(|m| m.user_id == *id) {
                    return Some(mention_member(mention));
                }
                self.get(chat_id, *id).cloned()
            }
            TargetToken::Name(name) => {
                if let Some(mention) = mentions.iter().find(|m| {
                    m.username.as_deref().is_some_and(|u| u.eq_ignore_ascii_case(name))
                        || m.display_name.eq_ignore_ascii_case(name)
                }) {
                    return Some(mention_member(mention));
                }

                let chat = self.chats.get(&chat_id)?;
                // Exact username match first.
                if let Some(member) = chat.values().find(|m| {
                    m.username.as_deref().is_some_and(|u| u.eq_ignore_ascii_case(name))
                }) {
                    return Some(member.clone());
                }
                chat.values()
                    .find(|m| m.display_name.eq_ignore_ascii_case(name))
                    .cloned()
            }
        }
    }
}

fn mention_member(mention: &Mention) -> Member {
    Member {
        user_id: mention.user_id,
        username: mention.username.clone(),
        display_name: mention.display_name.clone(),
    }
}
