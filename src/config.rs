use std::net::SocketAddr;

use dotenvy::dotenv;
use teloxide::types::ChatId;
use thiserror::Error;
use url::Url;

const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} should be set")]
    Missing(&'static str),
    #[error("MANAGER_CHAT_ID is not a chat id: {0}")]
    ManagerChat(#[source] std::num::ParseIntError),
    #[error("WEBHOOK_URL can't be parsed: {0}")]
    WebhookUrl(#[source] url::ParseError),
    #[error("WEBHOOK_ADDR can't be parsed: {0}")]
    WebhookAddr(#[source] std::net::AddrParseError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookConfig {
    pub url: Url,
    pub addr: SocketAddr,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub token: String,
    pub log_level: String,
    pub manager_chat: Option<ChatId>,
    pub webhook: Option<WebhookConfig>,
}

impl Config {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let token = var("TELOXIDE_TOKEN").ok_or(ConfigError::Missing("TELOXIDE_TOKEN"))?;
        let log_level = var("LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_owned());

        let manager_chat = var("MANAGER_CHAT_ID")
            .map(|id| id.trim().parse::<i64>().map(ChatId))
            .transpose()
            .map_err(ConfigError::ManagerChat)?;

        let url = var("WEBHOOK_URL")
            .map(|url| url.parse::<Url>())
            .transpose()
            .map_err(ConfigError::WebhookUrl)?;
        let addr = var("WEBHOOK_ADDR")
            .map(|addr| addr.parse::<SocketAddr>())
            .transpose()
            .map_err(ConfigError::WebhookAddr)?;

        let webhook = match (url, addr) {
            (Some(url), Some(addr)) => Some(WebhookConfig { url, addr }),
            _ => None,
        };

        Ok(Self {
            token,
            log_level,
            manager_chat,
            webhook,
        })
    }
}
