// src/notify/webhook.rs
//! Webhook transport with timeout and bounded exponential-backoff retries.
//! Payload shape follows the common embed format Discord-style webhooks use.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use super::{NotificationEvent, Notifier};

const SNIPPET_CHARS: usize = 300;

#[derive(Clone)]
pub struct WebhookNotifier {
    webhook: String,
    client: Client,
    timeout: Duration,
    max_retries: u8,
}

impl WebhookNotifier {
    pub fn new(webhook: String) -> Self {
        Self {
            webhook,
            client: Client::new(),
            timeout: Duration::from_secs(5),
            max_retries: 3,
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    pub fn with_retries(mut self, retries: u8) -> Self {
        self.max_retries = retries;
        self
    }

    pub async fn send_alert(&self, event: &NotificationEvent) -> Result<()> {
        let title = "Keyword alert".to_string();
        let keywords = if event.matched_keywords.is_empty() {
            "—".to_string()
        } else {
            event.matched_keywords.join(" · ")
        };
        let description = format!(
            "**Matched:** {}\n**Message:** {}\n**Time (UTC):** {}",
            keywords,
            snippet(&event.message_text),
            event.timestamp_iso
        );

        let payload = WebhookPayload::embed(&title, &description);

        let mut attempt: u8 = 0;
        loop {
            attempt += 1;
            let res = self
                .client
                .post(&self.webhook)
                .timeout(self.timeout)
                .json(&payload)
                .send()
                .await;

            match res {
                Ok(rsp) => {
                    if let Err(e) = rsp.error_for_status_ref() {
                        if attempt < self.max_retries {
                            tokio::time::sleep(Duration::from_millis(500u64 << (attempt - 1)))
                                .await;
                            continue;
                        }
                        return Err(anyhow!("webhook HTTP error: {e}"));
                    }
                    return Ok(());
                }
                Err(e) => {
                    if attempt < self.max_retries {
                        tokio::time::sleep(Duration::from_millis(500u64 << (attempt - 1))).await;
                        continue;
                    }
                    return Err(anyhow!("webhook request failed: {e}"));
                }
            }
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, event: &NotificationEvent) -> Result<()> {
        self.send_alert(event).await
    }
}

fn snippet(text: &str) -> String {
    if text.chars().count() <= SNIPPET_CHARS {
        return text.to_string();
    }
    let mut out: String = text.chars().take(SNIPPET_CHARS).collect();
    out.push('…');
    out
}

#[derive(Serialize)]
struct WebhookEmbed {
    title: String,
    description: String,
}

#[derive(Serialize)]
struct WebhookPayload {
    content: Option<String>,
    embeds: Vec<WebhookEmbed>,
}

impl WebhookPayload {
    fn embed(title: &str, description: &str) -> Self {
        Self {
            content: None,
            embeds: vec![WebhookEmbed {
                title: title.to_string(),
                description: description.to_string(),
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snippet_caps_long_messages() {
        let long = "x".repeat(1_000);
        let s = snippet(&long);
        assert_eq!(s.chars().count(), SNIPPET_CHARS + 1);
        assert!(s.ends_with('…'));
        assert_eq!(snippet("short"), "short");
    }
}
