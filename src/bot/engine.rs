//! Engine: turns parsed commands into sends, edits and store updates.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::bot::assets;
use crate::bot::caption;
use crate::bot::catalog::{ActionCatalog, Resolved};
use crate::bot::controls::{Control, ControlOutcome, ControlRegistry, PendingResponse};
use crate::bot::directory::{Member, MemberDirectory};
use crate::bot::favorites::{FavoriteOutcome, FavoritesStore, SuggestionLog};
use crate::bot::limiter::{RateLimiter, Verdict};
use crate::bot::message::IncomingMessage;
use crate::bot::parser::{self, Command, SettingChange};
use crate::bot::recent::RecentMedia;
use crate::bot::resolver::{self, GifSearch};
use crate::bot::settings::{SettingsStore, MAX_COOLDOWN_SECS};
use crate::bot::stats::StatsStore;

/// Outbound platform collaborator. The Telegram client implements
/// this; tests plug in a recording fake.
pub trait ChatSink: Send + Sync {
    /// Plain text message.
    fn send_text(
        &self,
        chat_id: i64,
        text: &str,
    ) -> impl Future<Output = Result<i64, String>> + Send;

    /// Caption + media with the interactive control set attached.
    fn send_action(
        &self,
        chat_id: i64,
        caption: &str,
        media_url: &str,
    ) -> impl Future<Output = Result<i64, String>> + Send;

    /// Caption + media without controls (`fav-use`).
    fn send_media(
        &self,
        chat_id: i64,
        caption: &str,
        media_url: &str,
    ) -> impl Future<Output = Result<i64, String>> + Send;

    /// Swap the media on an existing response in place.
    fn edit_media(
        &self,
        chat_id: i64,
        message_id: i64,
        media_url: &str,
    ) -> impl Future<Output = Result<(), String>> + Send;

    /// Strip the control buttons from an existing response.
    fn disable_controls(
        &self,
        chat_id: i64,
        message_id: i64,
    ) -> impl Future<Output = Result<(), String>> + Send;

    fn delete_message(
        &self,
        chat_id: i64,
        message_id: i64,
    ) -> impl Future<Output = Result<(), String>> + Send;

    /// Flair reaction pair on the triggering message.
    fn add_flair(
        &self,
        chat_id: i64,
        message_id: i64,
        emojis: (&str, &str),
    ) -> impl Future<Output = Result<(), String>> + Send;

    /// Private acknowledgement of a button press. Empty text just
    /// clears the pending state client-side.
    fn answer_private(
        &self,
        callback_id: &str,
        text: &str,
    ) -> impl Future<Output = Result<(), String>> + Send;

    fn is_admin(&self, chat_id: i64, user_id: i64) -> impl Future<Output = bool> + Send;
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Trigger word for commands (default "owo").
    pub trigger: String,
    /// Users treated as admins everywhere, on top of chat admins.
    pub admin_ids: Vec<i64>,
    pub default_cooldown_secs: u64,
    /// Directory for the JSON stores. `None` keeps everything in memory.
    pub data_dir: Option<PathBuf>,
}

pub struct Engine<S: ChatSink, G: GifSearch> {
    config: EngineConfig,
    sink: Arc<S>,
    search: Option<G>,
    catalog: Mutex<ActionCatalog>,
    settings: Mutex<SettingsStore>,
    stats: Mutex<StatsStore>,
    favorites: Mutex<FavoritesStore>,
    suggestions: Mutex<SuggestionLog>,
    directory: Mutex<MemberDirectory>,
    limiter: Mutex<RateLimiter>,
    recent: Mutex<RecentMedia>,
    controls: Mutex<ControlRegistry>,
}

fn persist_or_warn(result: Result<(), String>, what: &str) {
    if let Err(e) = result {
        warn!("Failed to save {what}: {e}");
    }
}

impl<S: ChatSink, G: GifSearch> Engine<S, G> {
    pub fn new(config: EngineConfig, sink: Arc<S>, search: Option<G>) -> Self {
        let (catalog, settings, stats, favorites, suggestions, directory) =
            match config.data_dir {
                Some(ref dir) => (
                    ActionCatalog::load_or_new(&dir.join("actions.json")),
                    SettingsStore::load_or_new(&dir.join("settings.json"), config.default_cooldown_secs),
                    StatsStore::load_or_new(&dir.join("stats.json")),
                    FavoritesStore::load_or_new(&dir.join("favorites.json")),
                    SuggestionLog::load_or_new(&dir.join("suggestions.json")),
                    MemberDirectory::load_or_new(&dir.join("members.json")),
                ),
                None => (
                    ActionCatalog::new(),
                    SettingsStore::new(config.default_cooldown_secs),
                    StatsStore::new(),
                    FavoritesStore::new(),
                    SuggestionLog::new(),
                    MemberDirectory::new(),
                ),
            };

        Self {
            config,
            sink,
            search,
            catalog: Mutex::new(catalog),
            settings: Mutex::new(settings),
            stats: Mutex::new(stats),
            favorites: Mutex::new(favorites),
            suggestions: Mutex::new(suggestions),
            directory: Mutex::new(directory),
            limiter: Mutex::new(RateLimiter::new()),
            recent: Mutex::new(RecentMedia::new()),
            controls: Mutex::new(ControlRegistry::new()),
        }
    }

    /// Handle one inbound group message.
    pub async fn handle_message(&self, msg: IncomingMessage) {
        self.observe_members(&msg).await;

        let Some(command) = parser::parse(&msg.text, &self.config.trigger) else {
            return;
        };

        match command {
            Command::Help => {
                self.send(msg.chat_id, &self.help_text()).await;
            }
            Command::Enable
            | Command::Disable
            | Command::Settings(_)
            | Command::AddAction(_)
            | Command::RemoveAction(_)
            | Command::Alias { .. } => {
                self.handle_admin(&msg, command).await;
            }
            Command::ActionList => {
                let names = self.catalog.lock().await.names();
                self.send(msg.chat_id, &format!("🎬 Actions ({}):\n{}", names.len(), names.join(", ")))
                    .await;
            }
            Command::Stats => {
                let summary = self.stats.lock().await.summary(msg.chat_id, msg.user_id);
                self.send(msg.chat_id, &summary).await;
            }
            Command::Suggest(name) => {
                {
                    let mut suggestions = self.suggestions.lock().await;
                    suggestions.append(msg.chat_id, msg.user_id, &name);
                    persist_or_warn(suggestions.save(), "suggestions");
                }
                self.send(msg.chat_id, &format!("💡 Noted! '{name}' goes on the pile."))
                    .await;
            }
            Command::Favorites => {
                let overview = self.favorites.lock().await.overview(msg.user_id);
                let text = if overview.is_empty() {
                    "No favorites yet. Press ⭐ under a GIF you like.".to_string()
                } else {
                    let lines: Vec<String> = overview
                        .iter()
                        .map(|(action, n)| format!("  {action} × {n}"))
                        .collect();
                    format!("⭐ Your favorites:\n{}", lines.join("\n"))
                };
                self.send(msg.chat_id, &text).await;
            }
            Command::FavUse(token) => {
                let action = self
                    .catalog
                    .lock()
                    .await
                    .canonical(&token)
                    .unwrap_or(token);
                let saved = self.favorites.lock().await.random_for(msg.user_id, &action);
                match saved {
                    Some(url) => {
                        let text = format!("⭐ {}'s favorite {action}", msg.display_name);
                        if let Err(e) = self.sink.send_media(msg.chat_id, &text, &url).await {
                            warn!("Failed to send favorite: {e}");
                        }
                    }
                    None => {
                        self.send(msg.chat_id, &format!("No favorites saved for '{action}' yet."))
                            .await;
                    }
                }
            }
            Command::Chain(steps) => {
                self.dispatch_chain(&msg, &steps).await;
            }
        }
    }

    /// Handle a button press on a response message.
    pub async fn handle_control(
        &self,
        chat_id: i64,
        message_id: i64,
        invoker_id: i64,
        data: &str,
        callback_id: &str,
    ) {
        let Some(control) = Control::from_data(data) else {
            return;
        };

        let outcome = self
            .controls
            .lock()
            .await
            .handle(message_id, control, invoker_id, Instant::now());

        match outcome {
            ControlOutcome::Ignored => {
                self.answer(callback_id, "").await;
            }
            ControlOutcome::Denied(text) => {
                self.answer(callback_id, text).await;
            }
            ControlOutcome::ReactBack(ctx) => {
                // Swapped roles: the original target answers back.
                self.emit_followup(&ctx, callback_id, true).await;
            }
            ControlOutcome::Repeat(ctx) => {
                self.emit_followup(&ctx, callback_id, false).await;
            }
            ControlOutcome::Favorite { action, url } => {
                let outcome = {
                    let mut favorites = self.favorites.lock().await;
                    let outcome = favorites.add(invoker_id, &action, &url);
                    if outcome == FavoriteOutcome::Added {
                        persist_or_warn(favorites.save(), "favorites");
                    }
                    outcome
                };
                let text = match outcome {
                    FavoriteOutcome::Added => "⭐ Saved to your favorites.",
                    FavoriteOutcome::AlreadySaved => "Already in your favorites.",
                    FavoriteOutcome::Full => "Favorites for that action are full (25).",
                };
                self.answer(callback_id, text).await;
            }
            ControlOutcome::Shuffle(ctx) => {
                match self.resolve_media(ctx.chat_id, &ctx.action).await {
                    Some(url) => match self.sink.edit_media(chat_id, message_id, &url).await {
                        Ok(()) => {
                            self.controls.lock().await.update_media(message_id, &url);
                            self.answer(callback_id, "").await;
                        }
                        Err(e) => {
                            warn!("Failed to shuffle media: {e}");
                            self.answer(callback_id, "Couldn't shuffle that one.").await;
                        }
                    },
                    None => {
                        self.answer(callback_id, "Nothing to shuffle to.").await;
                    }
                }
            }
            ControlOutcome::Hide(_ctx) => match self.sink.delete_message(chat_id, message_id).await {
                Ok(()) => self.answer(callback_id, "🙈 Hidden.").await,
                Err(e) => {
                    warn!("Failed to hide response: {e}");
                    self.answer(callback_id, "Couldn't delete that (missing permission?).")
                        .await;
                }
            },
            ControlOutcome::Close => {
                if let Err(e) = self.sink.disable_controls(chat_id, message_id).await {
                    warn!("Failed to disable controls: {e}");
                }
                self.answer(callback_id, "").await;
            }
        }
    }

    async fn observe_members(&self, msg: &IncomingMessage) {
        let mut directory = self.directory.lock().await;
        let mut changed = directory.observe(
            msg.chat_id,
            Member {
                user_id: msg.user_id,
                username: msg.username.clone(),
                display_name: msg.display_name.clone(),
            },
        );
        for mention in &msg.mentions {
            changed |= directory.observe(
                msg.chat_id,
                Member {
                    user_id: mention.user_id,
                    username: mention.username.clone(),
                    display_name: mention.display_name.clone(),
                },
            );
        }
        if changed {
            persist_or_warn(directory.save(), "member directory");
        }
    }

    async fn handle_admin(&self, msg: &IncomingMessage, command: Command) {
        let is_admin = self.config.admin_ids.contains(&msg.user_id)
            || self.sink.is_admin(msg.chat_id, msg.user_id).await;
        if !is_admin {
            self.send(msg.chat_id, "❌ Admin only command.").await;
            return;
        }

        match command {
            Command::Enable => {
                let mut settings = self.settings.lock().await;
                settings.update(msg.chat_id, |s| {
                    s.enabled = true;
                    s.topic_id = msg.thread_id;
                });
                persist_or_warn(settings.save(), "settings");
                drop(settings);
                self.send(msg.chat_id, "✅ Fun commands enabled here.").await;
            }
            Command::Disable => {
                let mut settings = self.settings.lock().await;
                settings.update(msg.chat_id, |s| s.enabled = false);
                persist_or_warn(settings.save(), "settings");
                drop(settings);
                self.send(msg.chat_id, "💤 Fun commands disabled.").await;
            }
            Command::Settings(None) => {
                let s = self.settings.lock().await.get(msg.chat_id);
                let topic = s
                    .topic_id
                    .map(|t| t.to_string())
                    .unwrap_or_else(|| "any".to_string());
                let text = format!(
                    "⚙️ Settings\nenabled: {}\ntopic: {}\nauto-react: {}\ncooldown: {}s",
                    s.enabled, topic, s.auto_react, s.cooldown_secs,
                );
                self.send(msg.chat_id, &text).await;
            }
            Command::Settings(Some(change)) => {
                let mut settings = self.settings.lock().await;
                let updated = settings.update(msg.chat_id, |s| match change {
                    SettingChange::Cooldown(secs) => s.set_cooldown(secs),
                    SettingChange::AutoReact(on) => s.auto_react = on,
                });
                persist_or_warn(settings.save(), "settings");
                drop(settings);
                self.send(
                    msg.chat_id,
                    &format!(
                        "⚙️ Updated: cooldown {}s (max {MAX_COOLDOWN_SECS}), auto-react {}",
                        updated.cooldown_secs, updated.auto_react,
                    ),
                )
                .await;
            }
            Command::AddAction(name) => {
                let added = {
                    let mut catalog = self.catalog.lock().await;
                    let added = catalog.register(&name);
                    if added {
                        persist_or_warn(catalog.save(), "catalogue");
                    }
                    added
                };
                let text = if added {
                    format!("✅ Action '{name}' registered.")
                } else {
                    format!("'{name}' already exists.")
                };
                self.send(msg.chat_id, &text).await;
            }
            Command::RemoveAction(name) => {
                let removed = {
                    let mut catalog = self.catalog.lock().await;
                    let removed = catalog.remove(&name);
                    if removed {
                        persist_or_warn(catalog.save(), "catalogue");
                    }
                    removed
                };
                let text = if removed {
                    format!("🗑️ Action '{name}' removed.")
                } else {
                    format!("No action named '{name}'.")
                };
                self.send(msg.chat_id, &text).await;
            }
            Command::Alias { action, alias } => {
                let result = {
                    let mut catalog = self.catalog.lock().await;
                    let result = catalog.add_alias(&action, &alias);
                    if result.is_ok() {
                        persist_or_warn(catalog.save(), "catalogue");
                    }
                    result
                };
                let text = match result {
                    Ok(()) => format!("✅ '{alias}' now means '{action}'."),
                    Err(e) => format!("❌ {e}."),
                };
                self.send(msg.chat_id, &text).await;
            }
            _ => {}
        }
    }

    async fn dispatch_chain(&self, msg: &IncomingMessage, steps: &[parser::ActionStep]) {
        let settings = self.settings.lock().await.get(msg.chat_id);
        if !settings.enabled {
            return;
        }
        // Pinned-topic pre-filter: silent drop, not a per-step check.
        if let Some(topic) = settings.topic_id
            && msg.thread_id != Some(topic)
        {
            return;
        }

        let cooldown = Duration::from_secs(settings.cooldown_secs);
        let mut target: Option<Member> = None;
        let mut flaired = false;

        for (i, step) in steps.iter().enumerate() {
            // First step's target anchors the chain; later steps reuse
            // it unless they name their own.
            if let Some(ref token) = step.target {
                let resolved = self
                    .directory
                    .lock()
                    .await
                    .resolve(msg.chat_id, token, &msg.mentions);
                match resolved {
                    Some(member) => target = Some(member),
                    None if i == 0 => return,
                    None => continue,
                }
            }
            let Some(target) = target.clone() else {
                return;
            };

            // Re-checked per step; recorded only after an actual send.
            let verdict = self
                .limiter
                .lock()
                .await
                .check(msg.user_id, cooldown, Instant::now());
            match verdict {
                Verdict::Allowed => {}
                Verdict::Cooldown { remaining_secs } => {
                    self.send(
                        msg.chat_id,
                        &format!("⏳ {}, wait {remaining_secs}s before the next one.", msg.display_name),
                    )
                    .await;
                    return;
                }
                Verdict::TooFast => {
                    self.send(msg.chat_id, "🐢 Too fast! Give it a moment.").await;
                    return;
                }
            }

            let action = {
                let mut catalog = self.catalog.lock().await;
                let resolved = catalog.resolve_or_create(&step.action);
                if matches!(resolved, Resolved::AutoCreated(_)) {
                    persist_or_warn(catalog.save(), "catalogue");
                }
                resolved.name().to_string()
            };

            let media = self.resolve_media(msg.chat_id, &action).await;
            let text = caption::compose(&action, &msg.display_name, &target.display_name);

            let sent = match media {
                Some(ref url) => self.sink.send_action(msg.chat_id, &text, url).await,
                None => self.sink.send_text(msg.chat_id, &text).await,
            };
            let message_id = match sent {
                Ok(id) => id,
                Err(e) => {
                    warn!("Failed to send '{action}' step: {e}");
                    continue;
                }
            };

            if let Some(url) = media {
                self.controls.lock().await.register(
                    message_id,
                    PendingResponse {
                        chat_id: msg.chat_id,
                        author_id: msg.user_id,
                        author_name: msg.display_name.clone(),
                        target_id: target.user_id,
                        target_name: target.display_name.clone(),
                        sender_id: msg.user_id,
                        action: action.clone(),
                        media_url: url,
                    },
                    Instant::now(),
                );
            }

            {
                let mut stats = self.stats.lock().await;
                stats.record(msg.chat_id, msg.user_id, &action);
                persist_or_warn(stats.save(), "stats");
            }
            self.limiter.lock().await.record(msg.user_id, Instant::now());

            if !flaired && settings.auto_react {
                flaired = true;
                let emojis = assets::flair_reactions(&action);
                if let Err(e) = self.sink.add_flair(msg.chat_id, msg.message_id, emojis).await {
                    warn!("Failed to add flair reactions: {e}");
                }
            }

            info!("🎬 {} {}s {} (chat {})", msg.display_name, action, target.display_name, msg.chat_id);
        }
    }

    /// Emit a follow-up response from a react-back or repeat press.
    async fn emit_followup(&self, ctx: &PendingResponse, callback_id: &str, swap: bool) {
        let (author_id, author_name, target_id, target_name) = if swap {
            (ctx.target_id, ctx.target_name.clone(), ctx.author_id, ctx.author_name.clone())
        } else {
            (ctx.author_id, ctx.author_name.clone(), ctx.target_id, ctx.target_name.clone())
        };

        let url = self
            .resolve_media(ctx.chat_id, &ctx.action)
            .await
            .unwrap_or_else(|| ctx.media_url.clone());
        let text = caption::compose(&ctx.action, &author_name, &target_name);

        match self.sink.send_action(ctx.chat_id, &text, &url).await {
            Ok(new_id) => {
                self.controls.lock().await.register(
                    new_id,
                    PendingResponse {
                        chat_id: ctx.chat_id,
                        author_id,
                        author_name,
                        target_id,
                        target_name,
                        sender_id: ctx.sender_id,
                        action: ctx.action.clone(),
                        media_url: url,
                    },
                    Instant::now(),
                );
                self.answer(callback_id, "").await;
            }
            Err(e) => {
                warn!("Failed to send follow-up: {e}");
                self.answer(callback_id, "Couldn't send that.").await;
            }
        }
    }

    async fn resolve_media(&self, chat_id: i64, action: &str) -> Option<String> {
        let mut catalog = self.catalog.lock().await;
        let mut recent = self.recent.lock().await;
        resolver::resolve(&mut catalog, &mut recent, self.search.as_ref(), chat_id, action).await
    }

    fn help_text(&self) -> String {
        let trigger = &self.config.trigger;
        let mut out = format!(
            "💫 Fun command list\nUsage: {trigger} <action> @user, <action>@user, or chain with 'then'.\n"
        );
        for (title, actions) in assets::category_groups() {
            out.push_str(&format!("\n{title}: {}", actions.join(", ")));
        }
        out.push_str(&format!(
            "\n\nMore: {trigger} action-list · stats · favs · fav-use <action> · suggest <name>"
        ));
        out
    }

    async fn send(&self, chat_id: i64, text: &str) {
        if let Err(e) = self.sink.send_text(chat_id, text).await {
            warn!("Failed to send message: {e}");
        }
    }

    async fn answer(&self, callback_id: &str, text: &str) {
        if let Err(e) = self.sink.answer_private(callback_id, text).await {
            warn!("Failed to answer callback: {e}");
        }
    }
}
