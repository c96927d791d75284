// src/notify/cooldown.rs
//! Per-chat alert cooldown so one busy channel cannot flood a subscriber.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct AlertCooldown {
    cooldown: Duration,
    last_alert_at: HashMap<i64, DateTime<Utc>>,
}

impl AlertCooldown {
    /// `cooldown_secs = 0` disables the gate.
    pub fn new(cooldown_secs: i64) -> Self {
        Self {
            cooldown: Duration::seconds(cooldown_secs),
            last_alert_at: HashMap::new(),
        }
    }

    /// Returns true if `chat_id` may be alerted at time `now`.
    pub fn should_alert(&self, chat_id: i64, now: DateTime<Utc>) -> bool {
        match self.last_alert_at.get(&chat_id) {
            None => true,
            Some(last) => now - *last >= self.cooldown,
        }
    }

    pub fn record_alert(&mut self, chat_id: i64, now: DateTime<Utc>) {
        self.last_alert_at.insert(chat_id, now);
    }

    /// Drop entries whose window already expired, keeping the map bounded to
    /// chats alerted within the current window. The dispatcher calls this
    /// after each recorded alert.
    pub fn sweep(&mut self, now: DateTime<Utc>) {
        self.last_alert_at
            .retain(|_, last| now - *last < self.cooldown);
    }
}
