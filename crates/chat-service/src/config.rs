//! # Service Configuration
//!
//! [`ServiceConfig`] deserializes with serde so hosts can load it from their
//! own config files; missing fields take the defaults below.

use crate::error::{Result, ServiceError};
use serde::{Deserialize, Deserializer};
use std::time::Duration;

/// Shortest delay between two typing notifications.
pub const MIN_TYPING_INTERVAL_MS: u64 = 1_000;

/// Longest delay between two typing notifications. The platform hides the
/// indicator ten seconds after the last one.
pub const MAX_TYPING_INTERVAL_MS: u64 = 10_000;

/// Settings shared by every client built from one configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Environment variable holding the bot token.
    pub token_var: String,
    /// Delay between typing notifications while a typing guard is alive.
    #[serde(deserialize_with = "clamped_typing_interval")]
    pub typing_interval_ms: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            token_var: "DISCORD_TOKEN".to_string(),
            typing_interval_ms: 9_500,
        }
    }
}

fn clamp_typing_interval(ms: u64) -> u64 {
    ms.clamp(MIN_TYPING_INTERVAL_MS, MAX_TYPING_INTERVAL_MS)
}

fn clamped_typing_interval<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<u64, D::Error> {
    u64::deserialize(deserializer).map(clamp_typing_interval)
}

impl ServiceConfig {
    pub fn with_token_var(mut self, var: impl Into<String>) -> Self {
        self.token_var = var.into();
        self
    }

    pub fn with_typing_interval(mut self, interval: Duration) -> Self {
        self.typing_interval_ms = clamp_typing_interval(interval.as_millis() as u64);
        self
    }

    pub fn typing_interval(&self) -> Duration {
        Duration::from_millis(self.typing_interval_ms)
    }

    /// Read the bot token from [`token_var`](Self::token_var).
    pub fn token(&self) -> Result<String> {
        std::env::var(&self.token_var).map_err(|_| ServiceError::MissingToken {
            var: self.token_var.clone(),
        })
    }
}
