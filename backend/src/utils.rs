// Shared utility helpers for timestamps and outbound messaging.

use std::time::{SystemTime, UNIX_EPOCH};

use tokio::sync::broadcast;
use tokio::time::Instant;

use crate::protocol::ServerMessage;

pub fn now_epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

pub fn monotonic_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

/// Serializes and broadcasts an outbound message. Best-effort: send
/// failures (no subscribers) are ignored.
pub fn send_message(tx: &broadcast::Sender<String>, message: &ServerMessage) {
    if let Ok(payload) = serde_json::to_string(message) {
        let _ = tx.send(payload);
    }
}
