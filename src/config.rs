use std::path::{Path, PathBuf};
use std::time::Duration;

use eyre::{Result, WrapErr};
use log::debug;
use serde::{Deserialize, Serialize};

pub const DEFAULT_SOURCES: [&str; 3] = ["https://invidious.io", "https://yewtu.be", "https://invidious.snopyta.org"];
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_USER_AGENT: &str = "LearnTube Educational Platform";
pub const DEFAULT_PLAYLIST_LIMIT: usize = 50;
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o";
pub const DEFAULT_MAX_TOKENS: u32 = 1024;
pub const DEFAULT_CHAT_TIMEOUT_SECS: u64 = 60;
pub const OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub listen_addr: Option<String>,
    pub sources: Option<Vec<String>>,
    pub timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
    pub playlist_limit: Option<usize>,
    pub chat: ChatSection,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ChatSection {
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub timeout_secs: Option<u64>,
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub openai_base_url: Option<String>,
    pub anthropic_base_url: Option<String>,
}

/// Settings for the mirror-backed video and playlist lookups
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub sources: Vec<String>,
    pub timeout: Duration,
    pub user_agent: String,
    pub playlist_limit: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            sources: DEFAULT_SOURCES.iter().map(|s| s.to_string()).collect(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            playlist_limit: DEFAULT_PLAYLIST_LIMIT,
        }
    }
}

/// Settings for the chat proxy
#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub model: String,
    pub max_tokens: u32,
    pub timeout: Duration,
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub openai_base_url: String,
    pub anthropic_base_url: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_CHAT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: Duration::from_secs(DEFAULT_CHAT_TIMEOUT_SECS),
            openai_api_key: None,
            anthropic_api_key: None,
            openai_base_url: OPENAI_BASE_URL.to_string(),
            anthropic_base_url: ANTHROPIC_BASE_URL.to_string(),
        }
    }
}

impl Config {
    /// Load config from ~/.config/learntube/config.toml if it exists
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path())
    }

    /// Load config from an explicit path, falling back to defaults when it is missing
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            debug!("Loading config from {}", path.display());
            let content = std::fs::read_to_string(path)?;
            let config: Config =
                toml::from_str(&content).wrap_err_with(|| format!("invalid config file {}", path.display()))?;
            Ok(config)
        } else {
            debug!("No config file found at {}", path.display());
            Ok(Config::default())
        }
    }

    /// Fill unset API keys from the environment
    pub fn with_env_keys(mut self) -> Self {
        if self.chat.openai_api_key.is_none() {
            self.chat.openai_api_key = std::env::var("OPENAI_API_KEY").ok();
        }
        if self.chat.anthropic_api_key.is_none() {
            self.chat.anthropic_api_key = std::env::var("ANTHROPIC_API_KEY").ok();
        }
        self
    }

    pub fn listen_addr(&self) -> String {
        self.listen_addr.clone().unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string())
    }

    pub fn fetch_config(&self) -> FetchConfig {
        let defaults = FetchConfig::default();
        FetchConfig {
            sources: self.sources.clone().unwrap_or(defaults.sources),
            timeout: self.timeout_secs.map(Duration::from_secs).unwrap_or(defaults.timeout),
            user_agent: self.user_agent.clone().unwrap_or(defaults.user_agent),
            playlist_limit: self.playlist_limit.unwrap_or(defaults.playlist_limit),
        }
    }

    pub fn chat_config(&self) -> ChatConfig {
        let defaults = ChatConfig::default();
        let chat = &self.chat;
        ChatConfig {
            model: chat.model.clone().unwrap_or(defaults.model),
            max_tokens: chat.max_tokens.unwrap_or(defaults.max_tokens),
            timeout: chat.timeout_secs.map(Duration::from_secs).unwrap_or(defaults.timeout),
            openai_api_key: chat.openai_api_key.clone(),
            anthropic_api_key: chat.anthropic_api_key.clone(),
            openai_base_url: chat.openai_base_url.clone().unwrap_or(defaults.openai_base_url),
            anthropic_base_url: chat.anthropic_base_url.clone().unwrap_or(defaults.anthropic_base_url),
        }
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("learntube")
        .join("config.toml")
}
