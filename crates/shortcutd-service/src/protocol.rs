//! Line-based control protocol for the local message bus
//!
//! Datagrams are UTF-8 lines of the form `<topic>` or `<topic> <json>`.
//! Everything is validated here at the boundary; the rest of the service
//! only ever sees typed [`ServiceEvent`]s.

use shortcutd_core::prelude::*;
use shortcutd_core::{ControlSignal, PinOutcome, ServiceEvent, ShortcutBatch, ShortcutDescriptor};

// Inbound topics
pub const TOPIC_REQUEST: &str = "/request";
pub const TOPIC_STOP: &str = "/stop";
pub const TOPIC_NEXT: &str = "/next";
pub const TOPIC_REPEAT: &str = "/repeat";
pub const TOPIC_PIN_DONE: &str = "/pin/done";
pub const TOPIC_PIN_REJECTED: &str = "/pin/rejected";
pub const TOPIC_QUIT: &str = "/quit";

// Outbound topic
pub const TOPIC_RESULT: &str = "/result";

/// Parse one inbound datagram into a typed event.
///
/// Returns `None` for unknown topics and malformed payloads; both are
/// logged and dropped so a confused peer cannot wedge the service.
pub fn parse_datagram(line: &str) -> Option<ServiceEvent> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    let (topic, payload) = match trimmed.split_once(' ') {
        Some((topic, payload)) => (topic, payload.trim()),
        None => (trimmed, ""),
    };

    match topic {
        TOPIC_REQUEST => parse_batch(payload).map(ServiceEvent::Batch),
        TOPIC_STOP => Some(ServiceEvent::Control(ControlSignal::Stop)),
        TOPIC_NEXT => Some(ServiceEvent::Control(ControlSignal::Next)),
        TOPIC_REPEAT => Some(ServiceEvent::Control(ControlSignal::Repeat)),
        TOPIC_PIN_DONE => Some(ServiceEvent::PinResolved(PinOutcome::Confirmed)),
        TOPIC_PIN_REJECTED => Some(ServiceEvent::PinResolved(PinOutcome::Rejected)),
        TOPIC_QUIT => Some(ServiceEvent::Quit),
        _ => {
            warn!(topic, "unknown control topic, ignoring");
            None
        }
    }
}

fn parse_batch(payload: &str) -> Option<ShortcutBatch> {
    match serde_json::from_str::<ShortcutBatch>(payload) {
        Ok(batch) => Some(batch),
        Err(err) => {
            warn!(%err, "malformed batch payload, dropping");
            None
        }
    }
}

/// Encode an outbound result datagram.
///
/// `None` becomes the JSON null marker the GUI reads as "nothing was
/// pinned" (exhausted, stopped, or unsupported).
pub fn encode_result(descriptor: Option<&ShortcutDescriptor>) -> String {
    // Serialization of Option<&ShortcutDescriptor> cannot fail: the type
    // is all strings.
    let payload =
        serde_json::to_string(&descriptor).unwrap_or_else(|_| "null".to_string());
    format!("{TOPIC_RESULT} {payload}")
}
