//! Telegram client using teloxide.

use teloxide::prelude::*;
use teloxide::types::{
    CallbackQueryId, ChatMemberKind, InlineKeyboardButton, InlineKeyboardMarkup, InputFile,
    InputMedia, InputMediaAnimation, MessageId, ReactionType,
};
use tracing::{info, warn};

use crate::bot::controls::Control;
use crate::bot::engine::ChatSink;

/// Telegram API client.
pub struct TelegramClient {
    bot: Bot,
}

impl TelegramClient {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    fn media_file(url: &str) -> Result<InputFile, String> {
        let parsed = reqwest::Url::parse(url).map_err(|e| format!("Bad media URL '{url}': {e}"))?;
        Ok(InputFile::url(parsed))
    }

    /// Two rows of three buttons under every action response.
    fn control_keyboard() -> InlineKeyboardMarkup {
        let rows: Vec<Vec<InlineKeyboardButton>> = Control::ALL
            .chunks(3)
            .map(|row| {
                row.iter()
                    .map(|c| InlineKeyboardButton::callback(c.label(), c.data()))
                    .collect()
            })
            .collect();
        InlineKeyboardMarkup::new(rows)
    }
}

impl ChatSink for TelegramClient {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<i64, String> {
        self.bot
            .send_message(ChatId(chat_id), text)
            .await
            .map(|msg| msg.id.0 as i64)
            .map_err(|e| format!("Failed to send: {e}"))
    }

    async fn send_action(&self, chat_id: i64, caption: &str, media_url: &str) -> Result<i64, String> {
        info!("🎞️ Sending animation to chat {}", chat_id);
        self.bot
            .send_animation(ChatId(chat_id), Self::media_file(media_url)?)
            .caption(caption)
            .reply_markup(Self::control_keyboard())
            .await
            .map(|msg| msg.id.0 as i64)
            .map_err(|e| format!("Failed to send animation: {e}"))
    }

    async fn send_media(&self, chat_id: i64, caption: &str, media_url: &str) -> Result<i64, String> {
        self.bot
            .send_animation(ChatId(chat_id), Self::media_file(media_url)?)
            .caption(caption)
            .await
            .map(|msg| msg.id.0 as i64)
            .map_err(|e| format!("Failed to send animation: {e}"))
    }

    async fn edit_media(&self, chat_id: i64, message_id: i64, media_url: &str) -> Result<(), String> {
        let media = InputMedia::Animation(InputMediaAnimation::new(Self::media_file(media_url)?));
        self.bot
            .edit_message_media(ChatId(chat_id), MessageId(message_id as i32), media)
            .reply_markup(Self::control_keyboard())
            .await
            .map(|_| ())
            .map_err(|e| format!("Failed to edit media: {e}"))
    }

    async fn disable_controls(&self, chat_id: i64, message_id: i64) -> Result<(), String> {
        self.bot
            .edit_message_reply_markup(ChatId(chat_id), MessageId(message_id as i32))
            .reply_markup(InlineKeyboardMarkup::default())
            .await
            .map(|_| ())
            .map_err(|e| format!("Failed to remove keyboard: {e}"))
    }

    async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<(), String> {
        info!("🗑️ Deleting message {} in chat {}", message_id, chat_id);
        self.bot
            .delete_message(ChatId(chat_id), MessageId(message_id as i32))
            .await
            .map(|_| ())
            .map_err(|e| format!("Failed to delete message: {e}"))
    }

    async fn add_flair(&self, chat_id: i64, message_id: i64, emojis: (&str, &str)) -> Result<(), String> {
        // Telegram shows at most one bot reaction per message; the first
        // of the pair wins, the second rides along where supported.
        let reactions = vec![
            ReactionType::Emoji { emoji: emojis.0.to_string() },
            ReactionType::Emoji { emoji: emojis.1.to_string() },
        ];
        self.bot
            .set_message_reaction(ChatId(chat_id), MessageId(message_id as i32))
            .reaction(reactions)
            .await
            .map(|_| ())
            .map_err(|e| format!("Failed to add reaction: {e}"))
    }

    async fn answer_private(&self, callback_id: &str, text: &str) -> Result<(), String> {
        let mut request = self
            .bot
            .answer_callback_query(CallbackQueryId(callback_id.to_string()));
        if !text.is_empty() {
            request = request.text(text);
        }
        request
            .await
            .map(|_| ())
            .map_err(|e| format!("Failed to answer callback: {e}"))
    }

    async fn is_admin(&self, chat_id: i64, user_id: i64) -> bool {
        match self
            .bot
            .get_chat_member(ChatId(chat_id), UserId(user_id as u64))
            .await
        {
            Ok(member) => matches!(
                member.kind,
                ChatMemberKind::Owner(_) | ChatMemberKind::Administrator(_)
            ),
            Err(e) => {
                warn!("Failed to get chat member: {e}");
                false
            }
        }
    }
}
