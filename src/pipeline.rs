// src/pipeline.rs
//! Per-message evaluation loop: normalize once, then parse and evaluate each
//! subscriber's keyword expressions against the message. Diagnostics log a
//! short hashed id of the text, never the text itself.

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::config::BotConfig;
use crate::evaluator::{evaluate, MatchResult};
use crate::expression::KeywordParser;
use crate::normalize::normalize_message;
use crate::subscriber::SubscriberStore;

/// Short anonymized id for a message text (first 6 bytes of SHA-256, hex).
pub(crate) fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// One subscriber the message matched, with the explanation to notify with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriberMatch {
    pub chat_id: i64,
    pub result: MatchResult,
}

pub struct MatchPipeline {
    parser: KeywordParser,
    max_spec_len: usize,
}

impl MatchPipeline {
    pub fn new(max_spec_len: usize) -> Self {
        Self {
            parser: KeywordParser::default(),
            max_spec_len,
        }
    }

    pub fn from_config(cfg: &BotConfig) -> Self {
        Self::new(cfg.matching.max_spec_len)
    }

    /// Evaluate one raw message against every stored subscriber and return
    /// the subscribers to notify. Subscribers with an empty include spec are
    /// skipped; parsing happens per pass (pure, no cache needed).
    pub async fn process_message(
        &self,
        raw_text: &str,
        store: &dyn SubscriberStore,
    ) -> Result<Vec<SubscriberMatch>> {
        let text = normalize_message(raw_text);
        let id = anon_hash(&text);
        let subscribers = store.all().await?;
        debug!(%id, subscribers = subscribers.len(), "processing message");

        let mut hits = Vec::new();
        for sub in subscribers {
            let spec = self.bounded_spec(&sub.keywords);
            if spec.trim().is_empty() {
                continue;
            }
            let include = self.parser.parse(spec);
            let ignore = sub
                .ignore_keywords
                .as_deref()
                .map(|s| self.parser.parse(self.bounded_spec(s)));

            let result = evaluate(&text, &include, ignore.as_ref());
            if result.blocked_by_ignore {
                debug!(
                    chat_id = sub.chat_id,
                    %id,
                    ignored = ?result.ignored_keywords,
                    "match vetoed by ignore list"
                );
                continue;
            }
            if result.is_match {
                info!(
                    chat_id = sub.chat_id,
                    %id,
                    matched = ?result.matched_keywords,
                    "subscriber matched"
                );
                hits.push(SubscriberMatch {
                    chat_id: sub.chat_id,
                    result,
                });
            }
        }
        Ok(hits)
    }

    /// Truncate overlong specs at a char boundary; subscribers should never
    /// be able to feed unbounded input into the parser.
    fn bounded_spec<'a>(&self, spec: &'a str) -> &'a str {
        match spec.char_indices().nth(self.max_spec_len) {
            Some((cut, _)) => {
                warn!(
                    len = spec.chars().count(),
                    cap = self.max_spec_len,
                    "keyword spec over length cap; truncating"
                );
                &spec[..cut]
            }
            None => spec,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anon_hash_is_short_and_stable() {
        let a = anon_hash("some message");
        let b = anon_hash("some message");
        assert_eq!(a, b);
        assert_eq!(a.len(), 12);
        assert_ne!(anon_hash("other message"), a);
    }

    #[test]
    fn bounded_spec_cuts_at_char_boundary() {
        let p = MatchPipeline::new(4);
        assert_eq!(p.bounded_spec("java"), "java");
        assert_eq!(p.bounded_spec("javascript"), "java");
        // Multibyte input must not split inside a char.
        assert_eq!(p.bounded_spec("питон și go"), "пито");
    }
}
