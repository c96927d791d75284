// src/notify/mod.rs
//! Notification delivery: event payload, the `Notifier` seam, a
//! primary-then-fallback mux, and the cooldown-gated `AlertDispatcher`.
//! Concrete transports live in submodules.

pub mod cooldown;
pub mod webhook;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::config::BotConfig;
use cooldown::AlertCooldown;
use webhook::WebhookNotifier;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEvent {
    pub chat_id: i64,
    /// Original (un-normalized) message text, for display.
    pub message_text: String,
    /// Terms that triggered the match, as the subscriber wrote them.
    pub matched_keywords: Vec<String>,
    pub timestamp_iso: String, // UTC ISO 8601
}

impl NotificationEvent {
    pub fn new(chat_id: i64, message_text: impl Into<String>, matched_keywords: Vec<String>) -> Self {
        Self {
            chat_id,
            message_text: message_text.into(),
            matched_keywords,
            timestamp_iso: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, event: &NotificationEvent) -> Result<()>;
}

// Shared handles forward, so callers can keep a handle to a notifier they
// hand the dispatcher (tests do this to observe deliveries).
#[async_trait]
impl<N: Notifier + ?Sized> Notifier for std::sync::Arc<N> {
    async fn send(&self, event: &NotificationEvent) -> Result<()> {
        (**self).send(event).await
    }
}

/// Tries notifiers in order and stops at the first success. The usual wiring
/// is one primary webhook plus a fallback.
#[derive(Default)]
pub struct NotifierMux {
    notifiers: Vec<Box<dyn Notifier>>,
}

impl NotifierMux {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.notifiers.push(notifier);
        self
    }

    pub fn len(&self) -> usize {
        self.notifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }

    /// Build the primary + fallback webhook chain from config, applying the
    /// configured timeout and retry budget to each. Empty when no URLs are
    /// set, in which case every send errors.
    pub fn from_config(cfg: &BotConfig) -> Self {
        let mut mux = Self::new();
        for url in [&cfg.notify.webhook_url, &cfg.notify.fallback_webhook_url]
            .into_iter()
            .flatten()
        {
            mux = mux.with_notifier(Box::new(
                WebhookNotifier::new(url.clone())
                    .with_timeout(cfg.notify.timeout_secs)
                    .with_retries(cfg.notify.max_retries),
            ));
        }
        mux
    }
}

#[async_trait]
impl Notifier for NotifierMux {
    async fn send(&self, event: &NotificationEvent) -> Result<()> {
        let mut last_err = anyhow!("no notifiers configured");
        for notifier in &self.notifiers {
            match notifier.send(event).await {
                Ok(()) => return Ok(()),
                Err(err) => {
                    warn!(chat_id = event.chat_id, error = ?err, "notifier failed; trying fallback");
                    last_err = err;
                }
            }
        }
        Err(last_err)
    }
}

/// Delivery front door: every outgoing alert passes the per-chat cooldown
/// gate before it reaches the notifier chain. Only a delivered alert arms
/// the gate, so a failed send does not eat the window.
pub struct AlertDispatcher {
    notifier: Box<dyn Notifier>,
    cooldown: Mutex<AlertCooldown>,
}

impl AlertDispatcher {
    pub fn new(notifier: Box<dyn Notifier>, cooldown_secs: i64) -> Self {
        Self {
            notifier,
            cooldown: Mutex::new(AlertCooldown::new(cooldown_secs)),
        }
    }

    pub fn from_config(cfg: &BotConfig) -> Self {
        Self::new(
            Box::new(NotifierMux::from_config(cfg)),
            cfg.notify.cooldown_secs,
        )
    }

    /// Deliver one event unless the chat is still cooling down.
    /// Returns `Ok(true)` if sent, `Ok(false)` if suppressed.
    pub async fn dispatch(&self, event: &NotificationEvent) -> Result<bool> {
        self.dispatch_at(event, Utc::now()).await
    }

    pub async fn dispatch_at(
        &self,
        event: &NotificationEvent,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        if !self.cooldown.lock().await.should_alert(event.chat_id, now) {
            debug!(chat_id = event.chat_id, "alert suppressed by cooldown");
            return Ok(false);
        }
        self.notifier.send(event).await?;
        let mut gate = self.cooldown.lock().await;
        gate.record_alert(event.chat_id, now);
        gate.sweep(now);
        Ok(true)
    }
}
