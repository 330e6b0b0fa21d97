//! Bot module - social action commands with GIF responses.

pub mod assets;
pub mod caption;
pub mod catalog;
pub mod controls;
pub mod directory;
pub mod engine;
pub mod favorites;
pub mod limiter;
pub mod message;
pub mod parser;
pub mod recent;
pub mod resolver;
pub mod settings;
pub mod stats;
pub mod telegram;
pub mod tenor;


pub use engine::{ChatSink, Engine, EngineConfig};
pub use message::{IncomingMessage, Mention};
pub use telegram::TelegramClient;
pub use tenor::TenorClient;
