// src/lib.rs
// Public library surface for integration tests (and embedding into a bot binary).

pub mod config;
pub mod evaluator;
pub mod expression;
pub mod matching;
pub mod normalize;
pub mod pipeline;
pub mod subscriber;

// Notification delivery & flood control
pub mod notify;

// ---- Re-exports for stable public API ----
pub use crate::config::BotConfig;
pub use crate::evaluator::{evaluate, MatchResult};
pub use crate::expression::{parse, KeywordParser, ParsedExpression};
pub use crate::normalize::normalize_message;
pub use crate::notify::{AlertDispatcher, NotificationEvent, Notifier, NotifierMux};
pub use crate::pipeline::{MatchPipeline, SubscriberMatch};
pub use crate::subscriber::{InMemorySubscriberStore, Subscriber, SubscriberStore};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Enable compact tracing logs in development only.
/// Activation requires BOTH:
///   - dev environment (debug build OR ALERT_BOT_ENV in {local, development, dev})
///   - ALERT_BOT_DEV_LOG=1
pub fn enable_dev_tracing() {
    let dev_flag = std::env::var("ALERT_BOT_DEV_LOG")
        .ok()
        .is_some_and(|v| v == "1");

    let is_dev_env = cfg!(debug_assertions)
        || matches!(
            std::env::var("ALERT_BOT_ENV")
                .unwrap_or_default()
                .to_ascii_lowercase()
                .as_str(),
            "local" | "development" | "dev"
        );

    if !(dev_flag && is_dev_env) {
        return;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("channel_alert_bot=info,warn"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}
