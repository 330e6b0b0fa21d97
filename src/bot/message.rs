//! Inbound message types, flattened from the platform layer.

/// A user referenced by a text-mention entity in the message.
#[derive(Debug, Clone)]
pub struct Mention {
    pub user_id: i64,
    pub username: Option<String>,
    pub display_name: String,
}

/// An inbound group message.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    pub message_id: i64,
    pub chat_id: i64,
    /// Forum topic the message was posted in, if any.
    pub thread_id: Option<i64>,
    pub user_id: i64,
    pub username: Option<String>,
    pub display_name: String,
    pub text: String,
    pub mentions: Vec<Mention>,
}
