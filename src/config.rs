use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use teloxide::types::{ChatId, UserId};

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read the config file.
    ReadFile { path: PathBuf, source: std::io::Error },
    /// Failed to parse JSON.
    ParseJson { path: PathBuf, source: serde_json::Error },
    /// Validation error.
    Validation(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadFile { path, source } => {
                write!(f, "failed to read config file '{}': {}", path.display(), source)
            }
            Self::ParseJson { path, source } => {
                write!(f, "failed to parse config file '{}': {}", path.display(), source)
            }
            Self::Validation(msg) => write!(f, "config validation error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ReadFile { source, .. } => Some(source),
            Self::ParseJson { source, .. } => Some(source),
            Self::Validation(_) => None,
        }
    }
}

#[derive(Deserialize)]
struct ConfigFile {
    admin_ids: Vec<u64>,
    telegram_bot_token: String,
    /// Tenor API key for GIF search. Without it the bot only serves
    /// cached and builtin media.
    tenor_api_key: Option<String>,
    /// Trigger word for commands.
    #[serde(default = "default_trigger")]
    trigger: String,
    #[serde(default = "default_cooldown_secs")]
    default_cooldown_secs: u64,
    /// Group chats the bot listens in. Empty = all groups.
    #[serde(default)]
    allowed_groups: Vec<i64>,
    log_chat_id: Option<i64>,
    /// Directory for state files (stores, logs). Defaults to current directory.
    data_dir: Option<String>,
}

fn default_trigger() -> String {
    "owo".to_string()
}

fn default_cooldown_secs() -> u64 {
    5
}

pub struct Config {
    /// Admin IDs - always allowed to run admin commands, in any chat.
    pub admin_ids: Vec<UserId>,
    pub telegram_bot_token: String,
    pub tenor_api_key: Option<String>,
    pub trigger: String,
    pub default_cooldown_secs: u64,
    pub allowed_groups: HashSet<ChatId>,
    pub log_chat_id: Option<ChatId>,
    /// Directory for state files (stores, logs).
    pub data_dir: PathBuf,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config_path = path.as_ref().to_path_buf();
        let content = std::fs::read_to_string(&config_path)
            .map_err(|e| ConfigError::ReadFile { path: config_path.clone(), source: e })?;
        let file: ConfigFile = serde_json::from_str(&content)
            .map_err(|e| ConfigError::ParseJson { path: config_path.clone(), source: e })?;

        // Validate required fields
        if file.admin_ids.is_empty() {
            return Err(ConfigError::Validation("admin_ids must contain at least one admin ID".into()));
        }
        if file.telegram_bot_token.is_empty() {
            return Err(ConfigError::Validation("telegram_bot_token is required".into()));
        }
        // Telegram tokens are formatted as {bot_id}:{secret} where bot_id is numeric
        let token_parts: Vec<&str> = file.telegram_bot_token.split(':').collect();
        if token_parts.len() != 2 || token_parts[0].parse::<u64>().is_err() || token_parts[1].is_empty() {
            return Err(ConfigError::Validation(
                "telegram_bot_token appears invalid (expected format: 123456789:ABCdefGHI...)".into()
            ));
        }
        if file.trigger.is_empty() || file.trigger.chars().any(char::is_whitespace) {
            return Err(ConfigError::Validation("trigger must be a single word".into()));
        }

        let data_dir = file
            .data_dir
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Self {
            admin_ids: file.admin_ids.into_iter().map(UserId).collect(),
            telegram_bot_token: file.telegram_bot_token,
            tenor_api_key: file.tenor_api_key.filter(|k| !k.is_empty()),
            trigger: file.trigger.to_lowercase(),
            default_cooldown_secs: file.default_cooldown_secs,
            allowed_groups: file.allowed_groups.into_iter().map(ChatId).collect(),
            log_chat_id: file.log_chat_id.map(ChatId),
            data_dir,
        })
    }

    pub fn is_admin(&self, user_id: UserId) -> bool {
        self.admin_ids.contains(&user_id)
    }

    pub fn is_allowed_group(&self, chat_id: ChatId) -> bool {
        self.allowed_groups.is_empty() || self.allowed_groups.contains(&chat_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn assert_err<T>(result: Result<T, ConfigError>) -> ConfigError {
        match result {
            Ok(_) => panic!("expected error, got Ok"),
            Err(e) => e,
        }
    }

    #[test]
    fn test_valid_config() {
        let file = write_config(r#"{
            "admin_ids": [123456],
            "telegram_bot_token": "123456789:ABCdefGHIjklMNOpqrsTUVwxyz"
        }"#);
        let config = Config::load(file.path()).expect("should load valid config");
        assert_eq!(config.admin_ids, vec![UserId(123456)]);
        assert_eq!(config.trigger, "owo");
        assert_eq!(config.default_cooldown_secs, 5);
        assert_eq!(config.tenor_api_key, None);
        assert!(config.is_allowed_group(ChatId(-100)));
    }

    #[test]
    fn test_full_config() {
        let file = write_config(r#"{
            "admin_ids": [123456],
            "telegram_bot_token": "123456789:ABCdef",
            "tenor_api_key": "tenor-key",
            "trigger": "UwU",
            "default_cooldown_secs": 10,
            "allowed_groups": [-1001, -1002],
            "log_chat_id": -1003,
            "data_dir": "/var/lib/owomi"
        }"#);
        let config = Config::load(file.path()).expect("should load valid config");
        assert_eq!(config.trigger, "uwu");
        assert_eq!(config.default_cooldown_secs, 10);
        assert_eq!(config.tenor_api_key.as_deref(), Some("tenor-key"));
        assert!(config.is_allowed_group(ChatId(-1001)));
        assert!(!config.is_allowed_group(ChatId(-999)));
        assert_eq!(config.log_chat_id, Some(ChatId(-1003)));
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/owomi"));
    }

    #[test]
    fn test_empty_admin_ids() {
        let file = write_config(r#"{
            "admin_ids": [],
            "telegram_bot_token": "123456789:ABCdef"
        }"#);
        let err = assert_err(Config::load(file.path()));
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("admin_ids"));
    }

    #[test]
    fn test_empty_token() {
        let file = write_config(r#"{
            "admin_ids": [123],
            "telegram_bot_token": ""
        }"#);
        let err = assert_err(Config::load(file.path()));
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("telegram_bot_token"));
    }

    #[test]
    fn test_invalid_token_format() {
        for token in ["no_colon_here", "notanumber:ABCdef", "123456789:"] {
            let file = write_config(&format!(r#"{{
                "admin_ids": [123],
                "telegram_bot_token": "{token}"
            }}"#));
            let err = assert_err(Config::load(file.path()));
            assert!(matches!(err, ConfigError::Validation(_)), "token {token:?}");
        }
    }

    #[test]
    fn test_invalid_trigger() {
        let file = write_config(r#"{
            "admin_ids": [123],
            "telegram_bot_token": "123456789:ABCdef",
            "trigger": "two words"
        }"#);
        let err = assert_err(Config::load(file.path()));
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_empty_tenor_key_is_none() {
        let file = write_config(r#"{
            "admin_ids": [123],
            "telegram_bot_token": "123456789:ABCdef",
            "tenor_api_key": ""
        }"#);
        let config = Config::load(file.path()).expect("should load valid config");
        assert_eq!(config.tenor_api_key, None);
    }

    #[test]
    fn test_file_not_found() {
        let err = assert_err(Config::load("/nonexistent/path/config.json"));
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }

    #[test]
    fn test_invalid_json() {
        let file = write_config("{ invalid json }");
        let err = assert_err(Config::load(file.path()));
        assert!(matches!(err, ConfigError::ParseJson { .. }));
    }
}
