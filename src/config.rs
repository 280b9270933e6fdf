use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://api.together.xyz/v1";
pub const DEFAULT_MODEL: &str = "meta-llama/Llama-3.3-70B-Instruct-Turbo";
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} should be set")]
    Missing(&'static str),

    #[error("{name} can't be parsed: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

/// Public URL Telegram posts to and the local address the listener binds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookConfig {
    pub url: Url,
    pub addr: SocketAddr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub telegram_token: String,
    pub completion: CompletionConfig,
    pub webhook: Option<WebhookConfig>,
}

impl Config {
    /// Reads the process environment, after loading `.env` if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let require = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        let completion = CompletionConfig {
            api_key: require("TOGETHER_API_KEY")?,
            base_url: get("TOGETHER_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into()),
            model: get("TOGETHER_MODEL").unwrap_or_else(|| DEFAULT_MODEL.into()),
        };

        let webhook = match (get("WEBHOOK_URL"), get("WEBHOOK_ADDR")) {
            (Some(raw_url), Some(raw_addr)) => Some(WebhookConfig {
                url: raw_url.parse::<Url>().map_err(|e| ConfigError::Invalid {
                    name: "WEBHOOK_URL",
                    reason: e.to_string(),
                })?,
                addr: raw_addr
                    .parse::<SocketAddr>()
                    .map_err(|e| ConfigError::Invalid {
                        name: "WEBHOOK_ADDR",
                        reason: e.to_string(),
                    })?,
            }),
            _ => None,
        };

        Ok(Self {
            telegram_token: require("TELOXIDE_TOKEN")?,
            completion,
            webhook,
        })
    }
}

/// Log filter directive, `LOG_LEVEL` or [`DEFAULT_LOG_LEVEL`].
pub fn log_level() -> String {
    dotenvy::dotenv().ok();
    std::env::var("LOG_LEVEL").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.into())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config =
            Config::from_lookup(lookup(&[("TELOXIDE_TOKEN", "t"), ("TOGETHER_API_KEY", "k")]))
                .unwrap();
        assert_eq!(config.telegram_token, "t");
        assert_eq!(config.completion.api_key, "k");
        assert_eq!(config.completion.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.completion.model, DEFAULT_MODEL);
        assert_eq!(config.webhook, None);
    }

    #[test]
    fn test_missing_required() {
        assert_eq!(
            Config::from_lookup(lookup(&[("TOGETHER_API_KEY", "k")])),
            Err(ConfigError::Missing("TELOXIDE_TOKEN"))
        );
        assert_eq!(
            Config::from_lookup(lookup(&[("TELOXIDE_TOKEN", "t"), ("TOGETHER_API_KEY", " ")])),
            Err(ConfigError::Missing("TOGETHER_API_KEY"))
        );
    }

    #[test]
    fn test_webhook() {
        let config = Config::from_lookup(lookup(&[
            ("TELOXIDE_TOKEN", "t"),
            ("TOGETHER_API_KEY", "k"),
            ("WEBHOOK_URL", "https://example.org/bot"),
            ("WEBHOOK_ADDR", "0.0.0.0:8443"),
        ]))
        .unwrap();
        let webhook = config.webhook.unwrap();
        assert_eq!(webhook.url.as_str(), "https://example.org/bot");
        assert_eq!(webhook.addr.port(), 8443);
    }

    #[test]
    fn test_invalid_webhook_addr() {
        let err = Config::from_lookup(lookup(&[
            ("TELOXIDE_TOKEN", "t"),
            ("TOGETHER_API_KEY", "k"),
            ("WEBHOOK_URL", "https://example.org/bot"),
            ("WEBHOOK_ADDR", "not an address"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "WEBHOOK_ADDR", .. }));
    }
}
