//! Tracing layer that relays WARN/ERROR events to a Telegram chat.

use teloxide::prelude::*;
use teloxide::types::ChatId;
use tokio::sync::mpsc;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

/// Telegram caps messages at 4096 chars; leave headroom for the prefix.
const MAX_LOG_CHARS: usize = 4000;

pub struct LogRelayLayer {
    tx: mpsc::UnboundedSender<String>,
}

impl LogRelayLayer {
    pub fn new(bot: Bot, chat_id: ChatId) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();

        tokio::spawn(async move {
            while let Some(text) = rx.recv().await {
                let text = if text.chars().count() > MAX_LOG_CHARS {
                    let truncated: String = text.chars().take(MAX_LOG_CHARS).collect();
                    format!("{truncated}...")
                } else {
                    text
                };
                if let Err(e) = bot.send_message(chat_id, &text).await {
                    eprintln!("Failed to relay log to Telegram: {e}");
                }
            }
        });

        Self { tx }
    }
}

struct MessageVisitor {
    message: String,
}

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else if self.message.is_empty() {
            self.message = format!("{} = {:?}", field.name(), value);
        } else {
            self.message
                .push_str(&format!(", {} = {:?}", field.name(), value));
        }
    }
}

impl<S: Subscriber> Layer<S> for LogRelayLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let level = *event.metadata().level();
        if level > Level::WARN {
            return;
        }

        let mut visitor = MessageVisitor { message: String::new() };
        event.record(&mut visitor);

        let prefix = if level == Level::ERROR { "❌" } else { "⚠️" };
        if self.tx.send(format!("{prefix} {}", visitor.message)).is_err() {
            eprintln!("Log relay channel closed, message dropped");
        }
    }
}
