// src/config.rs
//! Bot configuration: TOML file with env overrides, in the usual
//! path-from-env / defaults-if-missing arrangement.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_CONFIG_PATH: &str = "config/bot.toml";
pub const ENV_CONFIG_PATH: &str = "ALERT_BOT_CONFIG_PATH";
pub const ENV_WEBHOOK_URL: &str = "ALERT_BOT_WEBHOOK_URL";

pub const DEFAULT_MAX_SPEC_LEN: usize = 512;
const DEFAULT_TIMEOUT_SECS: u64 = 5;
const DEFAULT_MAX_RETRIES: u8 = 3;
const DEFAULT_COOLDOWN_SECS: i64 = 0;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BotConfig {
    #[serde(default)]
    pub matching: MatchingSection,
    #[serde(default)]
    pub notify: NotifySection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSection {
    /// Cap on subscriber specification length; overlong specs are truncated
    /// with a warning before parsing.
    #[serde(default = "default_max_spec_len")]
    pub max_spec_len: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotifySection {
    #[serde(default)]
    pub webhook_url: Option<String>,
    #[serde(default)]
    pub fallback_webhook_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u8,
    /// Per-subscriber alert cooldown; 0 disables the gate.
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: i64,
}

impl Default for MatchingSection {
    fn default() -> Self {
        Self {
            max_spec_len: DEFAULT_MAX_SPEC_LEN,
        }
    }
}

impl Default for NotifySection {
    fn default() -> Self {
        Self {
            webhook_url: None,
            fallback_webhook_url: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
            cooldown_secs: DEFAULT_COOLDOWN_SECS,
        }
    }
}

impl BotConfig {
    /// Load from $ALERT_BOT_CONFIG_PATH, falling back to `config/bot.toml`,
    /// falling back to built-in defaults when neither exists. A `.env` file
    /// is picked up first in local/dev runs; env vars win over the file.
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let path = std::env::var(ENV_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

        let mut cfg = if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("reading bot config at {}", path.display()))?;
            Self::from_toml_str(&content)?
        } else {
            Self::default()
        };

        if let Ok(url) = std::env::var(ENV_WEBHOOK_URL) {
            if !url.trim().is_empty() {
                cfg.notify.webhook_url = Some(url);
            }
        }
        Ok(cfg)
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("parsing bot config TOML")
    }
}

fn default_max_spec_len() -> usize {
    DEFAULT_MAX_SPEC_LEN
}
fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
fn default_max_retries() -> u8 {
    DEFAULT_MAX_RETRIES
}
fn default_cooldown_secs() -> i64 {
    DEFAULT_COOLDOWN_SECS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let cfg = BotConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.matching.max_spec_len, DEFAULT_MAX_SPEC_LEN);
        assert_eq!(cfg.notify.max_retries, DEFAULT_MAX_RETRIES);
        assert!(cfg.notify.webhook_url.is_none());
    }

    #[test]
    fn partial_sections_fill_in() {
        let cfg = BotConfig::from_toml_str(
            r#"
[matching]
max_spec_len = 128

[notify]
webhook_url = "https://example.test/hook"
cooldown_secs = 60
"#,
        )
        .unwrap();
        assert_eq!(cfg.matching.max_spec_len, 128);
        assert_eq!(cfg.notify.cooldown_secs, 60);
        assert_eq!(cfg.notify.timeout_secs, 5);
        assert_eq!(
            cfg.notify.webhook_url.as_deref(),
            Some("https://example.test/hook")
        );
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(BotConfig::from_toml_str("not [valid").is_err());
    }
}
