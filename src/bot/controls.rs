//! Interactive control state machine for sent responses.
//!
//! Each response message carries six inline buttons. The registry maps
//! message id → pending context and turns button presses into outcome
//! values; the engine translates outcomes into platform calls, so this
//! whole machine is testable without the UI layer.
//!
//! An entry is destroyed when its controls are closed, hidden, or time
//! out. `register` also sweeps timed-out entries, so the map never
//! holds more than the responses of the last timeout window.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Inactivity timeout after which a control set stops responding.
pub const CONTROL_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    ReactBack,
    Repeat,
    Favorite,
    Shuffle,
    Hide,
    Close,
}

impl Control {
    /// Callback-data token for this control.
    pub fn data(self) -> &'static str {
        match self {
            Control::ReactBack => "fc:back",
            Control::Repeat => "fc:again",
            Control::Favorite => "fc:fav",
            Control::Shuffle => "fc:shuffle",
            Control::Hide => "fc:hide",
            Control::Close => "fc:close",
        }
    }

    pub fn from_data(data: &str) -> Option<Self> {
        match data {
            "fc:back" => Some(Control::ReactBack),
            "fc:again" => Some(Control::Repeat),
            "fc:fav" => Some(Control::Favorite),
            "fc:shuffle" => Some(Control::Shuffle),
            "fc:hide" => Some(Control::Hide),
            "fc:close" => Some(Control::Close),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Control::ReactBack => "💞 back",
            Control::Repeat => "🔁 again",
            Control::Favorite => "⭐ fav",
            Control::Shuffle => "🎲 shuffle",
            Control::Hide => "🙈 hide",
            Control::Close => "❌ close",
        }
    }

    pub const ALL: [Control; 6] = [
        Control::ReactBack,
        Control::Repeat,
        Control::Favorite,
        Control::Shuffle,
        Control::Hide,
        Control::Close,
    ];
}

/// Context behind one sent response. Lives until its controls are
/// closed, hidden, or expire.
#[derive(Debug, Clone)]
pub struct PendingResponse {
    pub chat_id: i64,
    pub author_id: i64,
    pub author_name: String,
    pub target_id: i64,
    pub target_name: String,
    /// The user whose message triggered the chain (usually the author).
    pub sender_id: i64,
    pub action: String,
    pub media_url: String,
}

struct Entry {
    ctx: PendingResponse,
    created: Instant,
}

/// What the engine should do in response to a button press.
#[derive(Debug)]
pub enum ControlOutcome {
    /// Expired, closed or unknown message: acknowledge silently.
    Ignored,
    /// Press from someone outside {author, target, sender}.
    Denied(&'static str),
    ReactBack(PendingResponse),
    Repeat(PendingResponse),
    Favorite { action: String, url: String },
    Shuffle(PendingResponse),
    Hide(PendingResponse),
    Close,
}

#[derive(Default)]
pub struct ControlRegistry {
    pending: HashMap<i64, Entry>,
}

impl ControlRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, message_id: i64, ctx: PendingResponse, now: Instant) {
        self.pending
            .retain(|_, entry| now.duration_since(entry.created) <= CONTROL_TIMEOUT);
        self.pending.insert(message_id, Entry { ctx, created: now });
    }

    pub fn handle(
        &mut self,
        message_id: i64,
        control: Control,
        invoker_id: i64,
        now: Instant,
    ) -> ControlOutcome {
        let Some(entry) = self.pending.get(&message_id) else {
            return ControlOutcome::Ignored;
        };

        // Expiry first: a timed-out control set silently stops
        // responding, even to its own participants.
        if now.duration_since(entry.created) > CONTROL_TIMEOUT {
            self.pending.remove(&message_id);
            return ControlOutcome::Ignored;
        }

        let ctx = &entry.ctx;
        let authorized = invoker_id == ctx.author_id
            || invoker_id == ctx.target_id
            || invoker_id == ctx.sender_id;
        if !authorized {
            return ControlOutcome::Denied("These buttons belong to someone else.");
        }

        match control {
            Control::ReactBack => ControlOutcome::ReactBack(ctx.clone()),
            Control::Repeat => ControlOutcome::Repeat(ctx.clone()),
            Control::Favorite => ControlOutcome::Favorite {
                action: ctx.action.clone(),
                url: ctx.media_url.clone(),
            },
            Control::Shuffle => ControlOutcome::Shuffle(ctx.clone()),
            Control::Hide => {
                let ctx = ctx.clone();
                self.pending.remove(&message_id);
                ControlOutcome::Hide(ctx)
            }
            Control::Close => {
                self.pending.remove(&message_id);
                ControlOutcome::Close
            }
        }
    }

    /// Update the stored media URL after a shuffle edit.
    pub fn update_media(&mut self, message_id: i64, url: &str) {
        if let Some(entry) = self.pending.get_mut(&message_id) {
            entry.ctx.media_url = url.to_string();
        }
    }

    #[cfg(test)]
    fn contains(&self, message_id: i64) -> bool {
        self.pending.contains_key(&message_id)
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> PendingResponse {
        PendingResponse {
            chat_id: 1,
            author_id: 100,
            author_name: "Alice".into(),
            target_id: 200,
            target_name: "Bob".into(),
            sender_id: 100,
            action: "hug".into(),
            media_url: "https://x/a.gif".into(),
        }
    }

    #[test]
    fn test_unknown_message_is_ignored() {
        let mut reg = ControlRegistry::new();
        let outcome = reg.handle(999, Control::Repeat, 100, Instant::now());
        assert!(matches!(outcome, ControlOutcome::Ignored));
    }

    #[test]
    fn test_outsider_is_denied() {
        let mut reg = ControlRegistry::new();
        let now = Instant::now();
        reg.register(1, ctx(), now);
        let outcome = reg.handle(1, Control::Repeat, 555, now);
        assert!(matches!(outcome, ControlOutcome::Denied(_)));
    }

    #[test]
    fn test_target_may_press() {
        let mut reg = ControlRegistry::new();
        let now = Instant::now();
        reg.register(1, ctx(), now);
        let outcome = reg.handle(1, Control::ReactBack, 200, now);
        assert!(matches!(outcome, ControlOutcome::ReactBack(_)));
    }

    #[test]
    fn test_favorite_carries_current_media() {
        let mut reg = ControlRegistry::new();
        let now = Instant::now();
        reg.register(1, ctx(), now);
        reg.update_media(1, "https://x/b.gif");

        match reg.handle(1, Control::Favorite, 100, now) {
            ControlOutcome::Favorite { action, url } => {
                assert_eq!(action, "hug");
                assert_eq!(url, "https://x/b.gif");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_close_destroys_entry() {
        let mut reg = ControlRegistry::new();
        let now = Instant::now();
        reg.register(1, ctx(), now);

        assert!(matches!(reg.handle(1, Control::Close, 100, now), ControlOutcome::Close));
        assert!(!reg.contains(1));

        // Every later press on the same message, close included, is
        // silently acknowledged.
        assert!(matches!(reg.handle(1, Control::Close, 100, now), ControlOutcome::Ignored));
        for control in [Control::ReactBack, Control::Repeat, Control::Favorite, Control::Shuffle, Control::Hide] {
            assert!(matches!(reg.handle(1, control, 100, now), ControlOutcome::Ignored));
        }
    }

    #[test]
    fn test_expiry_silences_and_destroys() {
        let mut reg = ControlRegistry::new();
        let start = Instant::now();
        reg.register(1, ctx(), start);

        let later = start + CONTROL_TIMEOUT + Duration::from_secs(1);
        assert!(matches!(reg.handle(1, Control::Repeat, 100, later), ControlOutcome::Ignored));
        assert!(!reg.contains(1));
        assert!(matches!(reg.handle(1, Control::Close, 100, later), ControlOutcome::Ignored));
    }

    #[test]
    fn test_register_sweeps_expired_entries() {
        let mut reg = ControlRegistry::new();
        let start = Instant::now();
        reg.register(1, ctx(), start);
        reg.register(2, ctx(), start);

        // A later registration evicts everything past the timeout,
        // whether or not those entries are ever pressed again.
        let later = start + CONTROL_TIMEOUT + Duration::from_secs(1);
        reg.register(3, ctx(), later);
        assert!(!reg.contains(1));
        assert!(!reg.contains(2));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_hide_drops_entry() {
        let mut reg = ControlRegistry::new();
        let now = Instant::now();
        reg.register(1, ctx(), now);

        assert!(matches!(reg.handle(1, Control::Hide, 100, now), ControlOutcome::Hide(_)));
        assert!(!reg.contains(1));
        assert!(matches!(reg.handle(1, Control::Repeat, 100, now), ControlOutcome::Ignored));
    }

    #[test]
    fn test_callback_data_round_trip() {
        for control in Control::ALL {
            assert_eq!(Control::from_data(control.data()), Some(control));
        }
        assert_eq!(Control::from_data("fc:nope"), None);
    }
}
