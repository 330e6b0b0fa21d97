mod bot;
mod config;
mod log_relay;

use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::types::{ChatKind, MessageEntityKind};
use tracing::{info, warn};
use tracing_subscriber::prelude::*;

use bot::{Engine, EngineConfig, IncomingMessage, Mention, TelegramClient, TenorClient};
use config::Config;

struct BotState {
    config: Config,
    engine: Engine<TelegramClient, TenorClient>,
}

impl BotState {
    fn new(config: Config, bot: &Bot) -> Self {
        let engine_config = EngineConfig {
            trigger: config.trigger.clone(),
            admin_ids: config.admin_ids.iter().map(|u| u.0 as i64).collect(),
            default_cooldown_secs: config.default_cooldown_secs,
            data_dir: Some(config.data_dir.clone()),
        };

        let tenor = match config.tenor_api_key {
            Some(ref key) => Some(TenorClient::new(key.clone())),
            None => {
                info!("No Tenor API key, GIF search disabled");
                None
            }
        };

        let telegram = Arc::new(TelegramClient::new(bot.clone()));
        let engine = Engine::new(engine_config, telegram, tenor);

        Self { config, engine }
    }
}

#[tokio::main]
async fn main() {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "owomi.json".to_string());
    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let bot = Bot::new(&config.telegram_bot_token);

    // Setup logging
    let log_dir = config.data_dir.join("logs");
    std::fs::create_dir_all(&log_dir).ok();
    let log_file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("owomi.log"))
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Failed to open log file: {e}");
            std::process::exit(1);
        }
    };
    let (non_blocking, _guard) = tracing_appender::non_blocking(log_file);

    let registry = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                ),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                ),
        );

    if let Some(log_chat_id) = config.log_chat_id {
        let relay = log_relay::LogRelayLayer::new(bot.clone(), log_chat_id);
        registry.with(relay).init();
    } else {
        registry.init();
    }

    info!("🚀 Starting owomi...");
    info!("Loaded config from {config_path}");
    info!("Trigger word: {}", config.trigger);
    info!("Admin IDs: {:?}", config.admin_ids);

    let state = Arc::new(BotState::new(config, &bot));

    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint(handle_new_message))
        .branch(Update::filter_callback_query().endpoint(handle_callback_query));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

async fn handle_new_message(msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    // Group chats only
    if !matches!(msg.chat.kind, ChatKind::Public(_)) {
        return Ok(());
    }
    if !state.config.is_allowed_group(msg.chat.id) {
        return Ok(());
    }

    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };
    if user.is_bot {
        return Ok(());
    }
    let Some(text) = msg.text() else {
        return Ok(());
    };

    let incoming = IncomingMessage {
        message_id: msg.id.0 as i64,
        chat_id: msg.chat.id.0,
        thread_id: msg.thread_id.map(|t| t.0.0 as i64),
        user_id: user.id.0 as i64,
        username: user.username.clone(),
        display_name: user.full_name(),
        text: text.to_string(),
        mentions: extract_mentions(&msg),
    };

    state.engine.handle_message(incoming).await;
    Ok(())
}

async fn handle_callback_query(q: CallbackQuery, state: Arc<BotState>) -> ResponseResult<()> {
    let Some(data) = q.data.as_deref() else {
        return Ok(());
    };
    let Some(ref message) = q.message else {
        warn!("Callback query without a message, skipping");
        return Ok(());
    };

    state
        .engine
        .handle_control(
            message.chat().id.0,
            message.id().0 as i64,
            q.from.id.0 as i64,
            data,
            &q.id.0,
        )
        .await;
    Ok(())
}

/// Text-mention entities carry the full user object; plain `@username`
/// mentions stay in the text and resolve against the member directory.
fn extract_mentions(msg: &Message) -> Vec<Mention> {
    msg.entities()
        .unwrap_or_default()
        .iter()
        .filter_map(|entity| match &entity.kind {
            MessageEntityKind::TextMention { user } => Some(Mention {
                user_id: user.id.0 as i64,
                username: user.username.clone(),
                display_name: user.full_name(),
            }),
            _ => None,
        })
        .collect()
}
