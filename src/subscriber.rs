// src/subscriber.rs
//! Subscriber records and the storage seam the pipeline talks to.
//! Durable persistence lives behind `SubscriberStore`; the in-memory
//! implementation covers tests and small single-process deployments.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscriber {
    pub chat_id: i64,
    /// Comma-separated include specification; empty means "never notify".
    pub keywords: String,
    /// Optional comma-separated veto specification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_keywords: Option<String>,
}

impl Subscriber {
    pub fn new(chat_id: i64, keywords: impl Into<String>) -> Self {
        Self {
            chat_id,
            keywords: keywords.into(),
            ignore_keywords: None,
        }
    }

    pub fn with_ignore(mut self, ignore: impl Into<String>) -> Self {
        self.ignore_keywords = Some(ignore.into());
        self
    }
}

#[async_trait]
pub trait SubscriberStore: Send + Sync {
    async fn all(&self) -> Result<Vec<Subscriber>>;
    async fn upsert(&self, subscriber: Subscriber) -> Result<()>;
    async fn remove(&self, chat_id: i64) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct InMemorySubscriberStore {
    inner: RwLock<HashMap<i64, Subscriber>>,
}

impl InMemorySubscriberStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SubscriberStore for InMemorySubscriberStore {
    async fn all(&self) -> Result<Vec<Subscriber>> {
        let map = self.inner.read().await;
        let mut subs: Vec<Subscriber> = map.values().cloned().collect();
        // Stable order keeps notification output deterministic.
        subs.sort_by_key(|s| s.chat_id);
        Ok(subs)
    }

    async fn upsert(&self, subscriber: Subscriber) -> Result<()> {
        self.inner.write().await.insert(subscriber.chat_id, subscriber);
        Ok(())
    }

    async fn remove(&self, chat_id: i64) -> Result<()> {
        self.inner.write().await.remove(&chat_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upsert_replaces_existing_record() {
        let store = InMemorySubscriberStore::new();
        store.upsert(Subscriber::new(1, "java")).await.unwrap();
        store
            .upsert(Subscriber::new(1, "kotlin").with_ignore("intern*"))
            .await
            .unwrap();
        let subs = store.all().await.unwrap();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].keywords, "kotlin");
        assert_eq!(subs[0].ignore_keywords.as_deref(), Some("intern*"));
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let store = InMemorySubscriberStore::new();
        store.upsert(Subscriber::new(7, "rust")).await.unwrap();
        store.remove(7).await.unwrap();
        store.remove(7).await.unwrap();
        assert!(store.all().await.unwrap().is_empty());
    }

    #[test]
    fn subscriber_serializes_without_empty_ignore() {
        let v = serde_json::to_value(Subscriber::new(5, "go")).unwrap();
        assert_eq!(v["chat_id"], serde_json::json!(5));
        assert!(v.get("ignore_keywords").is_none());
    }
}
