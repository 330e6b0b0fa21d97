//! Per-chat recency tracker to avoid showing the same GIF twice in a row.

use std::collections::{HashMap, VecDeque};

/// How many recently shown URLs each chat remembers.
pub const RETENTION: usize = 12;

#[derive(Default)]
pub struct RecentMedia {
    per_chat: HashMap<i64, VecDeque<String>>,
}

impl RecentMedia {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `url` as just shown in `chat_id`, most-recent-first.
    pub fn push(&mut self, chat_id: i64, url: &str) {
        let list = self.per_chat.entry(chat_id).or_default();
        list.retain(|u| u != url);
        list.push_front(url.to_string());
        list.truncate(RETENTION);
    }

    pub fn contains(&self, chat_id: i64, url: &str) -> bool {
        self.per_chat
            .get(&chat_id)
            .is_some_and(|list| list.iter().any(|u| u == url))
    }

    #[cfg(test)]
    pub fn len(&self, chat_id: i64) -> usize {
        self.per_chat.get(&chat_id).map_or(0, VecDeque::len)
    }
}
