//! Client configuration.
//!
//! Values come from compiled defaults, then CLI flags in the binary, then
//! environment variable overrides (highest priority). Invalid env values are
//! ignored with a warning, falling back to the previous layer.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Fixed path of the control channel on the serving host.
pub const CONTROL_PATH: &str = "/ws_recall";

/// Default delay between reconnect attempts in milliseconds.
const DEFAULT_RECONNECT_DELAY_MS: u64 = 5_000;

/// Default playback position poll interval in milliseconds.
const DEFAULT_POSITION_POLL_MS: u64 = 250;

/// Default cap on inbound frame size in bytes.
const DEFAULT_MAX_MESSAGE_BYTES: usize = 64 * 1024;

/// Configuration for the recall client.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Controller host (and optional port) serving the control channel.
    pub host: String,
    /// Connect with `wss://` instead of `ws://`.
    pub secure: bool,
    /// Fixed delay between reconnect attempts in milliseconds.
    pub reconnect_delay_ms: u64,
    /// Position poll interval in milliseconds (the `timeupdate` analog
    /// driving the interval watch).
    pub position_poll_ms: u64,
    /// Inbound frames larger than this are discarded without parsing.
    pub max_message_bytes: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1:8000".into(),
            secure: false,
            reconnect_delay_ms: DEFAULT_RECONNECT_DELAY_MS,
            position_poll_ms: DEFAULT_POSITION_POLL_MS,
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
        }
    }
}

impl ClientConfig {
    /// The control-channel endpoint derived from the configured host.
    #[must_use]
    pub fn endpoint(&self) -> String {
        let scheme = if self.secure { "wss" } else { "ws" };
        format!("{scheme}://{}{CONTROL_PATH}", self.host)
    }

    /// Apply environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        if let Some(v) = read_env_string("RECALL_HOST") {
            self.host = v;
        }
        if let Some(v) = read_env_bool("RECALL_SECURE") {
            self.secure = v;
        }
        if let Some(v) = read_env_u64("RECALL_RECONNECT_DELAY_MS", 10, 600_000) {
            self.reconnect_delay_ms = v;
        }
        if let Some(v) = read_env_u64("RECALL_POSITION_POLL_MS", 10, 60_000) {
            self.position_poll_ms = v;
        }
    }
}

// ── Pure parsing functions (testable without env vars) ──────────────────────

/// Parse a string as a boolean.
///
/// Accepts (case-insensitive): `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`.
pub(crate) fn parse_bool(val: &str) -> Option<bool> {
    match val.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a string as a `u64` within a range.
pub(crate) fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

// ── Env var readers (thin wrappers) ─────────────────────────────────────────

fn read_env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn read_env_bool(name: &str) -> Option<bool> {
    let val = std::env::var(name).ok()?;
    let result = parse_bool(&val);
    if result.is_none() {
        warn!(key = name, value = %val, "invalid boolean env var, ignoring");
    }
    result
}

fn read_env_u64(name: &str, min: u64, max: u64) -> Option<u64> {
    let val = std::env::var(name).ok()?;
    let result = parse_u64_range(&val, min, max);
    if result.is_none() {
        warn!(key = name, value = %val, "invalid u64 env var, ignoring");
    }
    result
}
